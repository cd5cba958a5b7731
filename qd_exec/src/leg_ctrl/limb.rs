//! Single leg geometry and inverse kinematics
//!
//! Each leg is a hip-shoulder-elbow-toe chain:
//!
//! - the hip rotates about the local vertical (`z`) axis and carries the
//!   shoulder at a fixed horizontal offset `l0`,
//! - the shoulder and elbow rotate in the plane containing the shoulder and
//!   the toe, with upper and lower link lengths `l1` and `l2`.
//!
//! All four legs share one solver by expressing targets in a canonical
//! right-side frame, see [`Limb::normalize_target`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Rotation3, Vector3};
use std::f32::consts::{FRAC_PI_2, PI};

// Internal
use super::LegCtrlError;
use comms_if::eqpt::leg::{Joint, JointAngles, LegConfig};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Bias added to every solved angle so that the actuator's zero point sits at
/// the centre of its range.
///
/// Units: radians
pub const ACTUATOR_BIAS_RAD: f32 = PI;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One leg of the robot.
#[derive(Debug, Clone)]
pub struct Limb {
    config: LegConfig,

    /// Position of the hip joint.
    ///
    /// Units: meters,
    /// Frame: Robot body
    root_offset_m: Vector3<f32>,

    /// Hip to shoulder length.
    ///
    /// Units: meters
    l0_m: f32,
    l0sq_m2: f32,

    /// Shoulder to elbow length.
    ///
    /// Units: meters
    l1_m: f32,
    l1sq_m2: f32,

    /// Elbow to toe length.
    ///
    /// Units: meters
    l2_m: f32,
    l2sq_m2: f32,

    /// Current joint angles, including the actuator bias.
    angles: JointAngles,

    /// Set if the last solved target was out of reach.
    unreachable_goal: bool,
}

/// Output of the shoulder/elbow triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Triangle {
    /// Included angle at the elbow.
    elbow_rad: f32,

    /// Angle between the upper link and the shoulder-toe line.
    shoulder_rad: f32,

    /// The triangle could not be closed and the leg is fully extended.
    saturated: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Limb {
    /// Create a new limb.
    ///
    /// All link lengths must be finite and strictly positive.
    pub fn new(
        config: LegConfig,
        root_offset_m: Vector3<f32>,
        hip_to_shoulder_m: f32,
        shoulder_to_elbow_m: f32,
        elbow_to_toe_m: f32,
    ) -> Result<Self, LegCtrlError> {
        check_link_length("hip_to_shoulder", hip_to_shoulder_m)?;
        check_link_length("shoulder_to_elbow", shoulder_to_elbow_m)?;
        check_link_length("elbow_to_toe", elbow_to_toe_m)?;

        Ok(Self {
            config,
            root_offset_m,
            l0_m: hip_to_shoulder_m,
            l0sq_m2: hip_to_shoulder_m * hip_to_shoulder_m,
            l1_m: shoulder_to_elbow_m,
            l1sq_m2: shoulder_to_elbow_m * shoulder_to_elbow_m,
            l2_m: elbow_to_toe_m,
            l2sq_m2: elbow_to_toe_m * elbow_to_toe_m,
            angles: JointAngles::default(),
            unreachable_goal: false,
        })
    }

    pub fn config(&self) -> LegConfig {
        self.config
    }

    pub fn root_offset_m(&self) -> &Vector3<f32> {
        &self.root_offset_m
    }

    /// The link lengths `[l0, l1, l2]`.
    pub fn link_lengths_m(&self) -> [f32; 3] {
        [self.l0_m, self.l1_m, self.l2_m]
    }

    /// Express a body frame target in this limb's canonical frame.
    ///
    /// The target is made relative to the hip joint. Left side limbs are
    /// additionally rotated by half a turn about the body `y` axis so that
    /// they can be solved as if they were right side limbs.
    pub fn normalize_target(&self, target_m_rb: &Vector3<f32>) -> Vector3<f32> {
        let local_m = target_m_rb - self.root_offset_m;

        if self.config.is_left() {
            mirror_rotation(PI) * local_m
        } else {
            local_m
        }
    }

    /// Inverse of [`Limb::normalize_target`].
    pub fn denormalize_target(&self, normalized_m: &Vector3<f32>) -> Vector3<f32> {
        let local_m = if self.config.is_left() {
            mirror_rotation(-PI) * normalized_m
        } else {
            *normalized_m
        };

        local_m + self.root_offset_m
    }

    /// Solve the joint angles which place the toe at `target_m`.
    ///
    /// `target_m` must already be in this limb's canonical frame (see
    /// [`Limb::normalize_target`]).
    ///
    /// # Notes
    ///
    /// - The horizontal distance from the hip to the target must be at least
    ///   `l0`. Closer targets have no solution and produce NaN angles, which
    ///   are stored as they are.
    /// - If the target is beyond the reach of the shoulder-elbow pair the leg
    ///   is fully extended towards it and `unreachable_goal()` is set.
    pub fn calc_ik_angles(&mut self, target_m: &Vector3<f32>) {
        // ---- HIP ----

        // Find the point where the line to the target touches the circle of
        // radius l0 swept by the shoulder around the hip.
        let planar_dist_m = (target_m.x * target_m.x + target_m.y * target_m.y).sqrt();
        let tangent_rad = (self.l0_m / planar_dist_m).acos();
        let n = 1.0 / planar_dist_m;
        let unit_dir = Vector3::new(target_m.x * n, target_m.y * n, 0.0);
        let shoulder_m =
            Rotation3::from_axis_angle(&Vector3::z_axis(), tangent_rad) * unit_dir * self.l0_m;

        let mut hip_rad = -shoulder_m.y.atan2(shoulder_m.x);

        // ---- SHOULDER AND ELBOW ----

        let shoulder_to_toe_m = target_m - shoulder_m;
        let dist_sq_m2 = shoulder_to_toe_m.dot(&shoulder_to_toe_m);
        let dist_m = dist_sq_m2.sqrt();

        // Tilt of the shoulder-toe line above the horizontal
        let tilt_rad = (target_m.z / dist_m).asin();

        let tri = self.triangle(dist_m, dist_sq_m2);
        self.unreachable_goal = tri.saturated;

        // ---- ASSEMBLY ----

        let (shoulder_rad, elbow_rad) = if self.config.is_left() {
            (tilt_rad + tri.shoulder_rad - FRAC_PI_2, PI - tri.elbow_rad)
        } else {
            hip_rad = -hip_rad;
            (FRAC_PI_2 - (tilt_rad + tri.shoulder_rad), tri.elbow_rad - PI)
        };

        self.angles = JointAngles::new(
            hip_rad + ACTUATOR_BIAS_RAD,
            shoulder_rad + ACTUATOR_BIAS_RAD,
            elbow_rad + ACTUATOR_BIAS_RAD,
        );
    }

    /// Solve the shoulder-elbow-toe triangle for a shoulder-toe distance
    /// `dist_m`.
    ///
    /// The triangle is only closed when `l1 + l2 > dist_m`, otherwise the leg
    /// is straight (elbow angle of pi, no shoulder offset).
    fn triangle(&self, dist_m: f32, dist_sq_m2: f32) -> Triangle {
        if self.l1_m + self.l2_m > dist_m {
            Triangle {
                elbow_rad: (0.5 * (self.l1sq_m2 + self.l2sq_m2 - dist_sq_m2)
                    / (self.l1_m * self.l2_m))
                    .acos(),
                shoulder_rad: (0.5 * (self.l1sq_m2 + dist_sq_m2 - self.l2sq_m2)
                    / (self.l1_m * dist_m))
                    .acos(),
                saturated: false,
            }
        } else {
            Triangle {
                elbow_rad: PI,
                shoulder_rad: 0.0,
                saturated: true,
            }
        }
    }

    /// The current joint angles.
    pub fn angles(&self) -> JointAngles {
        self.angles
    }

    pub fn angle(&self, joint: Joint) -> f32 {
        self.angles.get(joint)
    }

    /// Overwrite a single joint angle, bypassing inverse kinematics.
    pub fn set_angle(&mut self, joint: Joint, value_rad: f32) {
        self.angles.set(joint, value_rad);
    }

    /// Overwrite all joint angles, bypassing inverse kinematics.
    pub fn set_angles(&mut self, angles: JointAngles) {
        self.angles = angles;
    }

    /// True if the last solved target was out of reach.
    pub fn unreachable_goal(&self) -> bool {
        self.unreachable_goal
    }

    /// Squared hip to shoulder length.
    pub fn l0sq_m2(&self) -> f32 {
        self.l0sq_m2
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Rotation mapping the left side of the body onto the right side.
fn mirror_rotation(angle_rad: f32) -> Rotation3<f32> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), angle_rad)
}

fn check_link_length(name: &'static str, length_m: f32) -> Result<(), LegCtrlError> {
    if length_m.is_finite() && length_m > 0.0 {
        Ok(())
    } else {
        Err(LegCtrlError::InvalidLinkLength(name, length_m))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    const TAU: f32 = std::f32::consts::PI * 2.0;

    fn limb(config: LegConfig) -> Limb {
        Limb::new(config, Vector3::new(6.0, -4.0, 2.5), 5.0, 10.0, 10.0).unwrap()
    }

    fn sample_targets() -> Vec<Vector3<f32>> {
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 15.0, -10.0),
            Vector3::new(-20.0, 3.5, 7.25),
            Vector3::new(100.0, -250.0, 0.001),
        ]
    }

    #[test]
    fn test_normalize_round_trip() {
        for config in LegConfig::ALL.iter() {
            let l = limb(*config);
            for t in sample_targets() {
                let back = l.denormalize_target(&l.normalize_target(&t));
                assert_relative_eq!(back, t, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_right_normalize_is_offset_only() {
        for config in [LegConfig::FrontRight, LegConfig::BackRight].iter() {
            let l = limb(*config);
            for t in sample_targets() {
                assert_eq!(l.normalize_target(&t), t - l.root_offset_m());
                assert_eq!(l.denormalize_target(&t), t + l.root_offset_m());
            }
        }
    }

    #[test]
    fn test_left_normalize_mirrors() {
        let l = limb(LegConfig::FrontLeft);
        let n = l.normalize_target(&(l.root_offset_m() + Vector3::new(3.0, 15.0, -10.0)));

        assert_relative_eq!(n, Vector3::new(-3.0, 15.0, 10.0), epsilon = 1e-5);
    }

    #[test]
    fn test_invalid_link_lengths() {
        let root = Vector3::zeros();

        assert!(Limb::new(LegConfig::FrontRight, root, 0.0, 1.0, 1.0).is_err());
        assert!(Limb::new(LegConfig::FrontRight, root, 1.0, -1.0, 1.0).is_err());
        assert!(Limb::new(LegConfig::FrontRight, root, 1.0, 1.0, f32::NAN).is_err());
        assert!(Limb::new(LegConfig::FrontRight, root, 1.0, 1.0, 1.0).is_ok());
    }

    #[test]
    fn test_reachable_targets_are_finite() {
        for config in LegConfig::ALL.iter() {
            let mut l = limb(*config);
            for t in [
                Vector3::new(0.0, 15.0, -10.0),
                Vector3::new(5.0, 5.0, 0.0),
                Vector3::new(-8.0, 6.0, -12.0),
                Vector3::new(0.0, -6.0, 4.0),
            ]
            .iter()
            {
                l.calc_ik_angles(t);
                assert!(l.angles().is_finite(), "{:?} {:?}", config, t);
                assert!(!l.unreachable_goal());
            }
        }
    }

    #[test]
    fn test_known_right_solution() {
        let mut l = limb(LegConfig::FrontRight);
        l.calc_ik_angles(&Vector3::new(0.0, 15.0, -10.0));

        // Shoulder sits at l0 * (-sin e, cos e) with cos e = 1/3, giving a
        // shoulder-toe distance of sqrt(300), a 120 deg elbow and a 30 deg
        // shoulder offset.
        let hip_raw = (1.666_667f32).atan2(-4.714_045);
        let tilt = (-10.0 / 300f32.sqrt()).asin();
        let a = l.angles();

        assert_relative_eq!(a.hip_rad, hip_raw + PI, epsilon = 1e-4);
        assert_relative_eq!(
            a.shoulder_rad,
            FRAC_PI_2 - (tilt + PI / 6.0) + PI,
            epsilon = 1e-4
        );
        assert_relative_eq!(a.elbow_rad, 2.0 * PI / 3.0 - PI + PI, epsilon = 1e-4);
    }

    #[test]
    fn test_in_plane_mirror_symmetry() {
        let mut right = limb(LegConfig::BackRight);
        let mut left = limb(LegConfig::BackLeft);

        for t in [
            Vector3::new(0.0, 15.0, 0.0),
            Vector3::new(7.0, 9.0, 0.0),
            Vector3::new(-12.0, -3.0, 0.0),
        ]
        .iter()
        {
            right.calc_ik_angles(t);
            left.calc_ik_angles(t);

            let r = right.angles();
            let l = left.angles();

            assert_relative_eq!(l.hip_rad, TAU - r.hip_rad, epsilon = 1e-4);
            assert_relative_eq!(l.shoulder_rad, TAU - r.shoulder_rad, epsilon = 1e-4);
            assert_relative_eq!(l.elbow_rad, TAU - r.elbow_rad, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_triangle_saturates_at_full_reach() {
        let l = limb(LegConfig::FrontRight);

        assert_eq!(
            l.triangle(20.0, 400.0),
            Triangle {
                elbow_rad: PI,
                shoulder_rad: 0.0,
                saturated: true
            }
        );

        let closed = l.triangle(19.0, 361.0);
        assert!(!closed.saturated);
        assert!(closed.elbow_rad < PI);
        assert!(closed.shoulder_rad > 0.0);
    }

    #[test]
    fn test_unreachable_target_fully_extends() {
        let mut right = limb(LegConfig::FrontRight);
        let mut left = limb(LegConfig::FrontLeft);
        let target = Vector3::new(0.0, 60.0, 0.0);

        right.calc_ik_angles(&target);
        left.calc_ik_angles(&target);

        assert!(right.unreachable_goal());
        assert!(left.unreachable_goal());

        // Straight leg: elbow at the bias, shoulder pointing along the target
        assert_eq!(right.angle(Joint::Elbow), ACTUATOR_BIAS_RAD);
        assert_eq!(left.angle(Joint::Elbow), ACTUATOR_BIAS_RAD);
        assert_relative_eq!(right.angle(Joint::Shoulder), FRAC_PI_2 + PI, epsilon = 1e-5);
        assert_relative_eq!(left.angle(Joint::Shoulder), PI - FRAC_PI_2, epsilon = 1e-5);

        // Coming back into reach clears the flag
        right.calc_ik_angles(&Vector3::new(0.0, 15.0, -10.0));
        assert!(!right.unreachable_goal());
    }

    #[test]
    fn test_inside_hip_radius_is_nan() {
        let mut l = limb(LegConfig::FrontRight);

        l.calc_ik_angles(&Vector3::new(1.0, 1.0, -10.0));
        assert!(l.angle(Joint::Hip).is_nan());

        l.calc_ik_angles(&Vector3::zeros());
        assert!(!l.angles().is_finite());
    }

    #[test]
    fn test_direct_angle_access() {
        let mut l = limb(LegConfig::BackLeft);
        assert_eq!(l.angles(), JointAngles::default());

        for (i, joint) in Joint::ALL.iter().enumerate() {
            l.set_angle(*joint, i as f32 + 0.5);
        }

        assert_eq!(l.angle(Joint::Hip), 0.5);
        assert_eq!(l.angle(Joint::Shoulder), 1.5);
        assert_eq!(l.angle(Joint::Elbow), 2.5);
        assert_eq!(
            Joint::from_index(1).map(|j| l.angle(j)),
            Some(1.5)
        );

        l.set_angles(JointAngles::new(1.0, 2.0, 3.0));
        assert_eq!(l.angles(), JointAngles::new(1.0, 2.0, 3.0));
    }
}
