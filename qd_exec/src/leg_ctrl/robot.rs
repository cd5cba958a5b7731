//! Four legged robot built from [`Limb`]s

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use nalgebra::Vector3;
use std::io;

// Internal
use super::{LegCtrlError, Limb};
use comms_if::eqpt::{
    leg::{JointAngles, LegConfig, Legs},
    leg_msg::{Feedback, Pose},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The four limbs of the robot and their pending inverse kinematics targets.
///
/// Targets are stored in each limb's canonical frame. Setting targets does not solve them, the
/// joint angles only follow the targets once [`Robot::update`] has been called.
#[derive(Debug, Clone)]
pub struct Robot {
    limbs: Legs<Limb>,

    /// Normalised toe target of each limb.
    ///
    /// Units: meters
    ik_targets: Legs<Vector3<f32>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Robot {
    /// Build a robot whose legs share the same link lengths, with hips at `root_offsets_m_rb`.
    pub fn new(
        hip_to_shoulder_m: f32,
        shoulder_to_elbow_m: f32,
        elbow_to_toe_m: f32,
        root_offsets_m_rb: &Legs<Vector3<f32>>,
    ) -> Result<Self, LegCtrlError> {
        let limb = |leg: LegConfig| {
            Limb::new(
                leg,
                root_offsets_m_rb[leg],
                hip_to_shoulder_m,
                shoulder_to_elbow_m,
                elbow_to_toe_m,
            )
        };

        Ok(Self {
            limbs: Legs {
                front_right: limb(LegConfig::FrontRight)?,
                front_left: limb(LegConfig::FrontLeft)?,
                back_right: limb(LegConfig::BackRight)?,
                back_left: limb(LegConfig::BackLeft)?,
            },
            ik_targets: Legs::splat(Vector3::zeros()),
        })
    }

    /// Set the toe target of every leg.
    ///
    /// Targets are given in the robot body frame and are normalised by their own limb before
    /// being stored.
    pub fn set_ik_targets(&mut self, targets_m_rb: &Legs<Vector3<f32>>) {
        let limbs = &self.limbs;
        self.ik_targets = targets_m_rb.map(|leg, t| limbs[leg].normalize_target(t));
    }

    /// Drive every joint to the given angles, bypassing inverse kinematics.
    pub fn set_angles(&mut self, hips: &Legs<f32>, shoulders: &Legs<f32>, elbows: &Legs<f32>) {
        for leg in LegConfig::ALL.iter().copied() {
            self.limbs[leg].set_angles(JointAngles::new(hips[leg], shoulders[leg], elbows[leg]));
        }
    }

    /// Adopt the measured angles in a feedback message as the current angles.
    pub fn set_angles_from_feedback(&mut self, feedback: &Feedback) {
        let angles = feedback.angles();

        for leg in LegConfig::ALL.iter().copied() {
            self.limbs[leg].set_angles(angles[leg]);
        }
    }

    /// Solve every limb for its stored target, in leg order.
    pub fn update(&mut self) {
        for leg in LegConfig::ALL.iter().copied() {
            self.limbs[leg].calc_ik_angles(&self.ik_targets[leg]);
        }
    }

    pub fn limb(&self, leg: LegConfig) -> &Limb {
        &self.limbs[leg]
    }

    /// The stored target of a leg, in that limb's canonical frame.
    pub fn ik_target(&self, leg: LegConfig) -> &Vector3<f32> {
        &self.ik_targets[leg]
    }

    /// Current angles of every leg.
    pub fn angles(&self) -> Legs<JointAngles> {
        self.limbs.map(|_, l| l.angles())
    }

    /// Which legs were given a target they could not reach on the last update.
    pub fn unreachable_goals(&self) -> Legs<bool> {
        self.limbs.map(|_, l| l.unreachable_goal())
    }

    /// Pack the current angles into a pose message.
    pub fn pose(&self, timestamp: u32) -> Pose {
        Pose::from_angles(&self.angles(), timestamp)
    }

    /// Write one line per leg giving its joint angles in degrees.
    pub fn write_ik_angles<W: io::Write>(&self, w: &mut W) -> io::Result<()> {
        for (leg, limb) in self.limbs.iter() {
            writeln!(w, "{}", angle_line(leg, &limb.angles()))?;
        }

        Ok(())
    }

    /// Log the joint angles of each leg in degrees.
    pub fn print_ik_angles(&self) {
        for (leg, limb) in self.limbs.iter() {
            info!("{}", angle_line(leg, &limb.angles()));
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn angle_line(leg: LegConfig, angles: &JointAngles) -> String {
    let [hip_deg, shoulder_deg, elbow_deg] = angles.to_degrees();

    format!(
        "{}: {:.2}, {:.2}, {:.2}",
        leg.label(),
        hip_deg,
        shoulder_deg,
        elbow_deg
    )
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
