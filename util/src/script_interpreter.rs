//! # QD script interpreter module
//!
//! This module provides an interpreter for QD scripts, allowing telecommands
//! to be executed at fixed times from the start of the session.
//!
//! A script is a sequence of `<time_s>: <tc_json>;` entries, for example:
//!
//! ```text
//! 0.5: {"type": "LEG", "payload": "Stop"};
//! ```
//!
//! Anything that doesn't match this pattern (such as comment lines) is
//! ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use crate::session::get_elapsed_seconds;
use comms_if::tc::{Tc, TcParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The Telecommand to run
    tc: Tc,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_tcs` to acquire a list of telecommands that need executing.
pub struct ScriptInterpreter {
    _script_path: PathBuf,
    cmds: VecDeque<Command>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)"
    )]
    InvalidTimestamp(String),

    #[error("Script contains an invalid TC at {0} s: {1}")]
    InvalidTc(f64, TcParseError),
}

#[derive(Debug, PartialEq)]
pub enum PendingTcs {
    None,
    Some(Vec<Tc>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        let cmds = Self::parse(&script)?;

        Ok(ScriptInterpreter {
            _script_path: path,
            cmds,
        })
    }

    /// Return the pending TCs based on the time elapsed in the session.
    pub fn get_pending_tcs(&mut self) -> PendingTcs {
        self.get_pending_tcs_at(get_elapsed_seconds())
    }

    /// Return a vector of TCs scheduled before `current_time_s`, or `None` if
    /// no TCs need executing now.
    pub fn get_pending_tcs_at(&mut self, current_time_s: f64) -> PendingTcs {
        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.is_empty() {
            return PendingTcs::EndOfScript;
        }

        let mut tc_vec: Vec<Tc> = vec![];

        // Pop items from the queue while the head's exec time is lower than
        // the current time.
        while let Some(cmd) = self.cmds.front() {
            if cmd.exec_time_s >= current_time_s {
                break;
            }
            if let Some(cmd) = self.cmds.pop_front() {
                tc_vec.push(cmd.tc);
            }
        }

        if tc_vec.is_empty() {
            PendingTcs::None
        } else {
            PendingTcs::Some(tc_vec)
        }
    }

    /// Get the number of TCs remaining in the script
    pub fn get_num_tcs(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64,
        }
    }

    fn parse(script: &str) -> Result<VecDeque<Command>, ScriptError> {
        let mut tc_queue: VecDeque<Command> = VecDeque::new();

        // The pattern is a literal, so it always compiles
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("Script regex is invalid");

        for cap in re.captures_iter(script) {
            let time_str = &cap[1];
            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}: {}", time_str, e)))?;

            // The scripts contain JSON only.
            let tc = Tc::from_json(&cap[3])
                .map_err(|e| ScriptError::InvalidTc(exec_time_s, e))?;

            tc_queue.push_back(Command { exec_time_s, tc });
        }

        if tc_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(tc_queue)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::tc::leg_ctrl::LegCmd;
    use std::io::Write;

    const SCRIPT: &str = r#"
# Hold, go safe, come back
0.0: {"type": "LEG", "payload": "Stop"};
1.0: {"type": "SAFE"};
1.0: {"type": "UNSAFE"};
"#;

    fn script_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_script_timing() {
        let file = script_file(SCRIPT);
        let mut si = ScriptInterpreter::new(file.path()).unwrap();

        assert_eq!(si.get_num_tcs(), 3);
        assert_eq!(si.get_duration(), 1.0);

        assert_eq!(si.get_pending_tcs_at(0.0), PendingTcs::None);
        assert_eq!(
            si.get_pending_tcs_at(0.5),
            PendingTcs::Some(vec![Tc::LegCtrl(LegCmd::Stop)])
        );
        assert_eq!(si.get_pending_tcs_at(0.9), PendingTcs::None);
        assert_eq!(
            si.get_pending_tcs_at(1.1),
            PendingTcs::Some(vec![Tc::MakeSafe, Tc::MakeUnsafe])
        );
        assert_eq!(si.get_pending_tcs_at(2.0), PendingTcs::EndOfScript);
    }

    #[test]
    fn test_script_errors() {
        assert!(matches!(
            ScriptInterpreter::new("/does/not/exist.qds"),
            Err(ScriptError::ScriptNotFound(_))
        ));

        let empty = script_file("# nothing here\n");
        assert!(matches!(
            ScriptInterpreter::new(empty.path()),
            Err(ScriptError::ScriptEmpty)
        ));

        let bad_tc = script_file("2.0: {\"type\": \"JUMP\"};\n");
        assert!(matches!(
            ScriptInterpreter::new(bad_tc.path()),
            Err(ScriptError::InvalidTc(t, _)) if t == 2.0
        ));
    }
}
