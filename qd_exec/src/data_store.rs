//! # Data Store

use log::{info, warn};

use crate::leg_ctrl;

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the robot has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    MakeSafeTc,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time at the start of the cycle
    pub session_time_s: f64,

    // Safe mode variables
    /// Determines if the robot is in safe mode.
    pub safe: bool,

    /// Gives the reason for the robot being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // LegCtrl
    pub leg_ctrl: leg_ctrl::LegCtrl,
    pub leg_ctrl_input: leg_ctrl::InputData,
    pub leg_ctrl_output: leg_ctrl::OutputData,
    pub leg_ctrl_status_rpt: leg_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the robot into safe mode with the given cause.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            // Make leg_ctrl safe
            self.leg_ctrl.make_safe();
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled, or `Err(())`
    /// otherwise. To remove safe mode the provided cause must match the initial reason for safe
    /// mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) => {
                if cause == root_cause {
                    self.safe = false;
                    self.safe_cause = None;
                    info!("Make unsafe requested, root cause match, safe mode disabled");
                    Ok(())
                } else {
                    Err(())
                }
            }
            None => Ok(()),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128) == 0;

        self.leg_ctrl_input = leg_ctrl::InputData::default();
        self.leg_ctrl_status_rpt = leg_ctrl::StatusReport::default();

        self.session_time_s = util::session::get_elapsed_seconds();
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_safe_mode() {
        let mut ds = DataStore::default();

        // Already unsafe
        assert!(ds.make_unsafe(SafeModeCause::MakeSafeTc).is_ok());

        ds.make_safe(SafeModeCause::MakeSafeTc);
        assert!(ds.safe);
        assert_eq!(ds.safe_cause, Some(SafeModeCause::MakeSafeTc));

        assert!(ds.make_unsafe(SafeModeCause::MakeSafeTc).is_ok());
        assert!(!ds.safe);
        assert_eq!(ds.safe_cause, None);
    }

    #[test]
    fn test_cycle_flags() {
        let root = tempfile::tempdir().unwrap();
        util::session::Session::new_in("ds_test", root.path().to_path_buf()).unwrap();

        let mut ds = DataStore::default();

        ds.cycle_start(10.0);
        assert!(ds.is_1_hz_cycle);
        ds.cycle_end();

        ds.cycle_start(10.0);
        assert!(!ds.is_1_hz_cycle);
        assert_eq!(ds.num_cycles, 1);
    }
}
