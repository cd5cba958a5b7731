//! # Leg control telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::eqpt::leg::{JointAngles, Legs};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command that can be completed by leg control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LegCmd {
    /// Place each toe at a target position and solve the joint angles with inverse kinematics.
    ///
    /// The targets are re-solved every cycle until a different command is received.
    Ik {
        /// Toe target of each leg.
        ///
        /// Units: meters,
        /// Frame: Robot body
        targets_m_rb: Legs<[f32; 3]>,
    },

    /// Drive the joints directly to the given angles, bypassing inverse kinematics.
    ///
    /// Used for calibration. The angles are held until a different command is received.
    Direct { angles_rad: Legs<JointAngles> },

    /// Hold the current joint angles.
    Stop,
}
