//! # Equipment Interface
//!
//! This module defines the interface structures which will be sent to and from the legs.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod leg;
pub mod leg_msg;
