//! Printing of validation results.
//!
//! Failures are printed one line per occurrence as they are recorded;
//! success is only ever reported once, in aggregate.

use std::io::{self, Write};

use crate::driver::{TestOutcome, TestRun};

/// Writes detector outcomes to `out`.
#[derive(Debug)]
pub struct Reporter<W> {
    out: W,
    include_success: bool,
}

impl<W: Write> Reporter<W> {
    /// With `include_success`, passing outcomes are printed as well.
    pub fn new(out: W, include_success: bool) -> Self {
        Self {
            out,
            include_success,
        }
    }

    /// Prints `outcome` if it failed, or unconditionally when successes are
    /// included. The output is joined onto a single line.
    ///
    /// An errored outcome's output is the invocation error, which already
    /// names the zone.
    pub fn record(&mut self, outcome: &TestOutcome) -> io::Result<()> {
        if outcome.passed() && !self.include_success {
            return Ok(());
        }
        writeln!(self.out, "{}", outcome.output.replace('\n', ""))
    }

    /// Prints the success summary if `run` had no failures.
    pub fn finish(&mut self, run: &TestRun) -> io::Result<()> {
        if run.succeeded() {
            writeln!(
                self.out,
                "All tests succeeded ({} zones successfully detected)",
                run.total
            )?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DetectionStatus;

    fn outcome(zone: &str, status: DetectionStatus, output: &str) -> TestOutcome {
        TestOutcome {
            zone: zone.into(),
            status,
            output: output.into(),
        }
    }

    fn printed(reporter: Reporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn success_is_one_summary_line() {
        let mut reporter = Reporter::new(Vec::new(), false);
        let mut run = TestRun::default();
        for zone in ["Asia/Gaza", "UTC", "Europe/London"] {
            let outcome = outcome(zone, DetectionStatus::Passed, "detected\n");
            reporter.record(&outcome).unwrap();
            run.total += 1;
        }
        reporter.finish(&run).unwrap();
        assert_eq!(
            printed(reporter),
            "All tests succeeded (3 zones successfully detected)\n"
        );
    }

    #[test]
    fn failures_print_per_occurrence_without_summary() {
        let mut reporter = Reporter::new(Vec::new(), false);
        let failures = vec![
            outcome("Asia/Gaza", DetectionStatus::Failed, "Assertion failed:\nAsia/Gaza\n"),
            outcome(
                "Asia/Omsk",
                DetectionStatus::Errored,
                "`Asia/Omsk`: could not run detector: permission denied",
            ),
        ];
        reporter
            .record(&outcome("UTC", DetectionStatus::Passed, "UTC\n"))
            .unwrap();
        for failure in &failures {
            reporter.record(failure).unwrap();
        }
        reporter
            .finish(&TestRun { total: 3, failures })
            .unwrap();
        assert_eq!(
            printed(reporter),
            "Assertion failed:Asia/Gaza\n`Asia/Omsk`: could not run detector: permission denied\n"
        );
    }

    #[test]
    fn include_success_prints_everything() {
        let mut reporter = Reporter::new(Vec::new(), true);
        reporter
            .record(&outcome("UTC", DetectionStatus::Passed, "UTC\nok\n"))
            .unwrap();
        reporter
            .finish(&TestRun {
                total: 1,
                failures: Vec::new(),
            })
            .unwrap();
        assert_eq!(
            printed(reporter),
            "UTCok\nAll tests succeeded (1 zones successfully detected)\n"
        );
    }
}
