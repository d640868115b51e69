//! Assembles per-zone oracle answers into a [`Ruleset`].

use std::path::Path;

use jiff::Timestamp;
use log::info;
use rustc_hash::FxHashSet;

use crate::{
    error::DstRulesError,
    oracle::RuleOracle,
    ruleset::{validate_namespace, write_artifact, ArtifactFormat, Ruleset, ZoneRules},
    years::YearRange,
    DstRulesResult,
};

/// Builds the ruleset for `zones` over `years`, querying `oracle` once per
/// zone in the given order.
///
/// The first oracle failure aborts the whole run; no partial ruleset is
/// returned.
pub fn generate_ruleset<'a, O, I>(oracle: &O, zones: I, years: YearRange) -> DstRulesResult<Ruleset>
where
    O: RuleOracle + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    let mut ruleset = Ruleset::new(years);
    let mut seen = FxHashSet::default();

    for zone in zones {
        if !seen.insert(zone) {
            return Err(DstRulesError::DuplicateZone(zone.into()));
        }
        info!(target: "dst_rules", "{zone}");

        let rules = oracle.transition_rules(zone, &years)?;
        ruleset.zones.push(ZoneRules {
            name: zone.into(),
            rules,
        });
    }

    info!(
        target: "dst_rules",
        "collected rules for {} zones over {years}",
        ruleset.zones.len()
    );
    Ok(ruleset)
}

/// Generates the ruleset for `zones` and writes it to `path` in `format`.
///
/// The artifact is fully rendered before `path` is opened, so a failed run
/// leaves whatever was at `path` untouched.
pub fn generate_artifact<'a, O, I>(
    oracle: &O,
    zones: I,
    years: YearRange,
    format: ArtifactFormat,
    namespace: &str,
    built_at: Timestamp,
    path: &Path,
) -> DstRulesResult<Ruleset>
where
    O: RuleOracle + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    if format == ArtifactFormat::Module {
        validate_namespace(namespace)?;
    }
    let ruleset = generate_ruleset(oracle, zones, years)?;
    let rendered = ruleset.render(format, namespace, built_at)?;
    write_artifact(path, &rendered)?;
    info!(target: "dst_rules", "wrote {format} ruleset to {}", path.display());
    Ok(ruleset)
}
