//! Parameters structure for LegCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::leg::{Legs, NUM_LEGS};
use nalgebra::Vector3;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for leg control.
///
/// Per-leg arrays are in the fixed leg order: front right, front left, back right, back left.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    // ---- GEOMETRY ----
    /// Distance from the hip joint to the shoulder joint.
    ///
    /// Units: meters
    pub hip_to_shoulder_m: f32,

    /// Distance from the shoulder joint to the elbow joint.
    ///
    /// Units: meters
    pub shoulder_to_elbow_m: f32,

    /// Distance from the elbow joint to the toe.
    ///
    /// Units: meters
    pub elbow_to_toe_m: f32,

    /// The position of each hip joint.
    ///
    /// Units: meters,
    /// Frame: Robot body
    pub root_offsets_m_rb: [[f32; 3]; NUM_LEGS],

    // ---- STANCE ----
    /// Toe targets held after initialisation, before any command arrives.
    ///
    /// Units: meters,
    /// Frame: Robot body
    pub stance_targets_m_rb: [[f32; 3]; NUM_LEGS],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    pub fn root_offsets_m_rb(&self) -> Legs<Vector3<f32>> {
        Legs::from_array(self.root_offsets_m_rb).map(|_, p| Vector3::from(*p))
    }

    pub fn stance_targets_m_rb(&self) -> Legs<Vector3<f32>> {
        Legs::from_array(self.stance_targets_m_rb).map(|_, p| Vector3::from(*p))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::leg::LegConfig;

    const PARAMS: &str = r#"
hip_to_shoulder_m = 0.05
shoulder_to_elbow_m = 0.1
elbow_to_toe_m = 0.1
root_offsets_m_rb = [
    [0.1, 0.2, 0.0],
    [-0.1, 0.2, 0.0],
    [0.1, -0.2, 0.0],
    [-0.1, -0.2, 0.0],
]
stance_targets_m_rb = [
    [0.15, 0.2, -0.15],
    [-0.15, 0.2, -0.15],
    [0.15, -0.2, -0.15],
    [-0.15, -0.2, -0.15],
]
"#;

    #[test]
    fn test_params_leg_order() {
        let p: Params = toml::from_str(PARAMS).unwrap();

        assert_eq!(p.hip_to_shoulder_m, 0.05);

        let roots = p.root_offsets_m_rb();
        assert_eq!(roots[LegConfig::FrontLeft], Vector3::new(-0.1, 0.2, 0.0));
        assert_eq!(roots[LegConfig::BackRight], Vector3::new(0.1, -0.2, 0.0));

        let stance = p.stance_targets_m_rb();
        assert_eq!(stance[LegConfig::BackLeft], Vector3::new(-0.15, -0.2, -0.15));
    }
}
