//! Runs the detector over every catalogued zone and classifies the results.

use std::io::Write;

use log::{debug, warn};
use rayon::prelude::*;

use crate::{
    catalog::{catalog_of, Catalog},
    detector::Detector,
    report::Reporter,
    DstRulesResult,
};

/// How a single zone fared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionStatus {
    Passed,
    /// The detector ran and reported a failed self-check.
    Failed,
    /// The detector could not be run.
    Errored,
}

/// The outcome of detecting one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub zone: String,
    pub status: DetectionStatus,
    /// The detector's raw output, or the invocation error for
    /// [`DetectionStatus::Errored`].
    pub output: String,
}

impl TestOutcome {
    /// Runs `detector` once for `zone`.
    pub fn run<D: Detector + ?Sized>(detector: &D, zone: &str) -> Self {
        match detector.detect(zone) {
            Ok(detection) => {
                let status = if detection.passed() {
                    DetectionStatus::Passed
                } else {
                    DetectionStatus::Failed
                };
                Self {
                    zone: zone.into(),
                    status,
                    output: detection.output,
                }
            }
            Err(e) => Self {
                zone: zone.into(),
                status: DetectionStatus::Errored,
                output: e.to_string(),
            },
        }
    }

    pub fn passed(&self) -> bool {
        self.status == DetectionStatus::Passed
    }

    /// The catalog listing this outcome's zone, if any.
    pub fn catalog(&self) -> Option<Catalog> {
        catalog_of(&self.zone)
    }
}

/// The result of a validation run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TestRun {
    /// Number of zones attempted.
    pub total: usize,
    /// Failed and errored outcomes, in zone order.
    pub failures: Vec<TestOutcome>,
}

impl TestRun {
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of failures among the zones of `catalog`.
    pub fn failures_in(&self, catalog: Catalog) -> usize {
        self.failures
            .iter()
            .filter(|outcome| outcome.catalog() == Some(catalog))
            .count()
    }

    fn push(&mut self, outcome: TestOutcome) {
        self.total += 1;
        if !outcome.passed() {
            self.failures.push(outcome);
        }
    }
}

/// Runs `detector` exactly once for each of `zones` and feeds every outcome
/// to `reporter` in zone order.
///
/// Failures never stop the run. With `parallel` set, zones are detected
/// concurrently and reported once all of them have finished.
pub fn run_detection<D, W>(
    detector: &D,
    zones: &[&str],
    parallel: bool,
    reporter: &mut Reporter<W>,
) -> DstRulesResult<TestRun>
where
    D: Detector + Sync + ?Sized,
    W: Write,
{
    let mut run = TestRun::default();

    if parallel {
        let outcomes: Vec<_> = zones
            .par_iter()
            .map(|zone| TestOutcome::run(detector, zone))
            .collect();
        for outcome in outcomes {
            record(&mut run, reporter, outcome)?;
        }
    } else {
        for zone in zones {
            record(&mut run, reporter, TestOutcome::run(detector, zone))?;
        }
    }

    reporter.finish(&run)?;
    Ok(run)
}

fn record<W: Write>(
    run: &mut TestRun,
    reporter: &mut Reporter<W>,
    outcome: TestOutcome,
) -> DstRulesResult<()> {
    let catalog = outcome.catalog().map_or("uncatalogued", Catalog::as_str);
    match outcome.status {
        DetectionStatus::Passed => {
            debug!(target: "dst_rules", "`{}` ({catalog}): passed", outcome.zone)
        }
        DetectionStatus::Failed => {
            warn!(target: "dst_rules", "`{}` ({catalog}): FAILED", outcome.zone)
        }
        DetectionStatus::Errored => {
            warn!(target: "dst_rules", "`{}` ({catalog}): detector did not run", outcome.zone)
        }
    }
    reporter.record(&outcome)?;
    run.push(outcome);
    Ok(())
}
