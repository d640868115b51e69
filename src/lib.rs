//! The `dst_rules` crate generates and validates the DST disambiguation
//! ruleset consumed by offset-based time zone detection.
//!
//! A detector that only sees a raw UTC offset cannot tell apart zones that
//! share that offset. For the zones where this matters (the
//! [ambiguous catalog][catalog::AMBIGUOUS_ZONES]) the detector compares the
//! local DST transitions against a shipped ruleset. This crate:
//!
//! - **generates** that ruleset by asking an external [`RuleOracle`] for the
//!   transition rules of every ambiguous zone over a [`YearRange`], and
//!   serializes the result deterministically as JSON or as a loadable script
//!   ([`ArtifactFormat`]);
//! - **validates** the detector by running it once per zone across all three
//!   catalogs and reporting the zones it failed to identify.
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use dst_rules::{generate_ruleset, DstRulesResult, RuleOracle, TransitionRules, YearRange};
//!
//! struct NoDst;
//!
//! impl RuleOracle for NoDst {
//!     fn transition_rules(
//!         &self,
//!         _zone: &str,
//!         years: &YearRange,
//!     ) -> DstRulesResult<BTreeMap<i32, TransitionRules>> {
//!         Ok(years.iter().map(|y| (y, serde_json::Value::Bool(false).into())).collect())
//!     }
//! }
//!
//! let ruleset = generate_ruleset(&NoDst, ["Asia/Gaza"], YearRange::single(2008)).unwrap();
//! assert_eq!(ruleset.zones[0].name, "Asia/Gaza");
//! assert_eq!(ruleset.zones[0].rules.len(), 1);
//! ```
//!
//! Neither DST computation nor zone detection happens here: both are
//! delegated to external programs ([`ProcessOracle`], [`ProcessDetector`]).
#![cfg_attr(not(test), forbid(clippy::unwrap_used))]
#![allow(
    clippy::module_name_repetitions,
    clippy::redundant_pub_crate,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

pub mod aggregate;
pub mod catalog;
pub mod detector;
pub mod driver;
pub mod error;
pub mod oracle;
pub mod report;
pub mod ruleset;
pub mod years;

#[doc(inline)]
pub use error::{DstRulesError, OracleError};

/// The `dst_rules` result type
pub type DstRulesResult<T> = Result<T, DstRulesError>;

pub use aggregate::{generate_artifact, generate_ruleset};
pub use catalog::{catalog_of, Catalog};
pub use detector::{Detection, Detector, ProcessDetector, FAILURE_MARKER};
pub use driver::{run_detection, DetectionStatus, TestOutcome, TestRun};
pub use oracle::{parse_oracle_response, ProcessOracle, RuleOracle};
pub use report::Reporter;
pub use ruleset::{
    write_artifact, ArtifactFormat, Ruleset, TransitionRules, ZoneRules, DEFAULT_NAMESPACE,
};
pub use years::YearRange;
