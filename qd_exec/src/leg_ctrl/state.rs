//! Implementations for the LegCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use nalgebra::Vector3;
use serde::Serialize;

// Internal
use super::{LegCtrlError, Params, Robot};
use comms_if::{
    eqpt::leg::{JointAngles, LegConfig, Legs},
    tc::leg_ctrl::LegCmd,
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Leg control module state
#[derive(Default)]
pub struct LegCtrl {
    pub(crate) params: Params,

    robot: Option<Robot>,

    /// True while the robot's angles follow its IK targets, false while the
    /// current angles are being held.
    following_targets: bool,

    pub(crate) current_cmd: Option<LegCmd>,

    pub(crate) report: StatusReport,

    pub(crate) output: Legs<JointAngles>,

    num_cycles: u64,
    arch_angles: Archiver,
}

/// Input data to Leg Control.
#[derive(Default)]
pub struct InputData {
    /// The leg command to be executed, or `None` if there is no new command
    /// on this cycle.
    pub cmd: Option<LegCmd>,
}

/// The joint angle demands for each leg.
///
/// Units: radians
pub type OutputData = Legs<JointAngles>;

/// Status report for LegCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Legs which were given a target they cannot reach and have been fully
    /// extended towards it instead.
    pub unreachable: Legs<bool>,

    /// Legs whose output contains a NaN or infinite angle, which happens when
    /// a target lies inside the hip radius.
    pub non_finite: Legs<bool>,
}

/// One archived cycle of LegCtrl output.
#[derive(Serialize)]
struct AngleRecord {
    cycle: u64,
    time_s: f64,
    fr_hip_deg: f32,
    fr_shoulder_deg: f32,
    fr_elbow_deg: f32,
    fl_hip_deg: f32,
    fl_shoulder_deg: f32,
    fl_elbow_deg: f32,
    br_hip_deg: f32,
    br_shoulder_deg: f32,
    br_elbow_deg: f32,
    bl_hip_deg: f32,
    bl_shoulder_deg: f32,
    bl_elbow_deg: f32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for LegCtrl {
    type InitData = &'static str;
    type InitError = LegCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = LegCtrlError;

    /// Initialise the LegCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params = params::load(init_data).map_err(LegCtrlError::ParamLoad)?;

        self.init_with_params(params, session)
    }

    /// Perform cyclic processing of Leg Control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let robot = self.robot.as_mut().ok_or(LegCtrlError::NotInitialised)?;

        self.report = StatusReport::default();

        let new_cmd = input_data.cmd.is_some();

        if let Some(ref cmd) = input_data.cmd {
            debug!("New LegCtrl command: {:?}", cmd);

            match cmd {
                LegCmd::Ik { targets_m_rb } => {
                    robot.set_ik_targets(&targets_m_rb.map(|_, t| Vector3::from(*t)));
                    self.following_targets = true;
                }
                LegCmd::Direct { angles_rad } => {
                    robot.set_angles(
                        &angles_rad.map(|_, a| a.hip_rad),
                        &angles_rad.map(|_, a| a.shoulder_rad),
                        &angles_rad.map(|_, a| a.elbow_rad),
                    );
                    self.following_targets = false;
                }
                LegCmd::Stop => self.following_targets = false,
            }

            self.current_cmd = Some(cmd.clone());
        }

        if self.following_targets {
            robot.update();
            self.report.unreachable = robot.unreachable_goals();
        }

        let output = robot.angles();
        self.report.non_finite = output.map(|_, a| !a.is_finite());

        if new_cmd {
            robot.print_ik_angles();

            for (leg, unreachable) in self.report.unreachable.iter() {
                if *unreachable {
                    warn!("{} target is out of reach, leg fully extended", leg.label());
                }
            }
            for (leg, non_finite) in self.report.non_finite.iter() {
                if *non_finite {
                    warn!("{} has a non-finite joint angle", leg.label());
                }
            }
        }

        trace!("LegCtrl output: {:?}", output);

        self.output = output;
        self.num_cycles += 1;

        Ok((output, self.report))
    }
}

impl Archived for LegCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        let deg = self.output.map(|_, a| a.to_degrees());
        let [fr, fl, br, bl] = deg.to_array();

        self.arch_angles.serialise(AngleRecord {
            cycle: self.num_cycles,
            time_s: session::get_elapsed_seconds(),
            fr_hip_deg: fr[0],
            fr_shoulder_deg: fr[1],
            fr_elbow_deg: fr[2],
            fl_hip_deg: fl[0],
            fl_shoulder_deg: fl[1],
            fl_elbow_deg: fl[2],
            br_hip_deg: br[0],
            br_shoulder_deg: br[1],
            br_elbow_deg: br[2],
            bl_hip_deg: bl[0],
            bl_shoulder_deg: bl[1],
            bl_elbow_deg: bl[2],
        })
    }
}

impl LegCtrl {
    /// Initialise the module from already loaded parameters.
    ///
    /// The robot is built from the geometry parameters and solved for the
    /// stance targets, which it then follows until the first command.
    pub fn init_with_params(&mut self, params: Params, session: &Session) -> Result<(), LegCtrlError> {
        let mut robot = Robot::new(
            params.hip_to_shoulder_m,
            params.shoulder_to_elbow_m,
            params.elbow_to_toe_m,
            &params.root_offsets_m_rb(),
        )?;

        robot.set_ik_targets(&params.stance_targets_m_rb());
        robot.update();

        // Create the arch folder for leg_ctrl
        std::fs::create_dir_all(session.arch_root.join("leg_ctrl"))
            .map_err(|e| LegCtrlError::ArchiveInit(ArchiveError::FileError(e)))?;

        self.arch_angles = Archiver::from_path(session, "leg_ctrl/angles.csv")
            .map_err(LegCtrlError::ArchiveInit)?;

        self.output = robot.angles();
        self.robot = Some(robot);
        self.following_targets = true;
        self.params = params;

        Ok(())
    }

    /// Stop following targets and hold the current angles.
    pub fn make_safe(&mut self) {
        self.current_cmd = Some(LegCmd::Stop);
        self.following_targets = false;
    }

    /// The robot being controlled, if the module has been initialised.
    pub fn robot(&self) -> Option<&Robot> {
        self.robot.as_ref()
    }

    /// Check whether a leg's output was finite on the last cycle.
    pub fn is_finite(&self, leg: LegConfig) -> bool {
        !self.report.non_finite[leg]
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
