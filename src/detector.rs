//! The external time zone detector under test.

use std::{ffi::OsString, process::Command};

use log::debug;

use crate::{error::DstRulesError, DstRulesResult};

/// Text the detector prints when one of its self-checks fails.
///
/// Classification depends on this exact wording; if the detector's
/// assertion messages change, failures go unnoticed.
pub const FAILURE_MARKER: &str = "Assertion failed";

/// A detector that can be asked to identify a zone from its live behavior.
pub trait Detector {
    /// Runs detection once for `zone`.
    ///
    /// An `Err` means detection could not be attempted at all; a detection
    /// that ran and failed is reported through [`Detection::passed`].
    fn detect(&self, zone: &str) -> DstRulesResult<Detection>;
}

/// The captured result of one detector run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Everything the detector printed.
    pub output: String,
    /// Whether the detector itself reported success through its exit status.
    pub exit_ok: bool,
}

impl Detection {
    pub fn new(output: impl Into<String>, exit_ok: bool) -> Self {
        Self {
            output: output.into(),
            exit_ok,
        }
    }

    /// A run passes when the detector exited cleanly and printed no
    /// [`FAILURE_MARKER`]. Any other output is irrelevant.
    pub fn passed(&self) -> bool {
        self.exit_ok && !self.output.contains(FAILURE_MARKER)
    }
}

/// A [`Detector`] backed by an external program.
///
/// The program is invoked as `program [args...] <zone>`; stdout is captured,
/// followed by stderr when the latter is not empty.
#[derive(Debug, Clone)]
pub struct ProcessDetector {
    program: OsString,
    args: Vec<OsString>,
}

impl ProcessDetector {
    pub fn new<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<OsString>,
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for ProcessDetector {
    fn default() -> Self {
        Self::new("node", ["test.js"])
    }
}

impl Detector for ProcessDetector {
    fn detect(&self, zone: &str) -> DstRulesResult<Detection> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(zone);
        debug!(target: "dst_rules", "running detector: {command:?}");

        let output = command
            .output()
            .map_err(|error| DstRulesError::DetectorInvocation {
                zone: zone.into(),
                error,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.stderr.is_empty() {
            text.push_str(&String::from_utf8_lossy(&output.stderr));
        }

        Ok(Detection::new(text, output.status.success()))
    }
}
