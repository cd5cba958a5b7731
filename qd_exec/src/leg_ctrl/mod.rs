//! Leg control module
//!
//! Converts toe position targets for each of the four legs into hip, shoulder and elbow joint
//! angles.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod limb;
mod params;
mod robot;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use limb::*;
pub use params::*;
pub use robot::*;
pub use state::*;

use util::{archive::ArchiveError, params::LoadError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LegCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum LegCtrlError {
    #[error("Link length {0} must be finite and greater than zero, found {1}")]
    InvalidLinkLength(&'static str, f32),

    #[error("Could not load the LegCtrl parameters: {0}")]
    ParamLoad(LoadError),

    #[error("Could not initialise the LegCtrl archives: {0}")]
    ArchiveInit(ArchiveError),

    #[error("LegCtrl has not been initialised")]
    NotInitialised,
}
