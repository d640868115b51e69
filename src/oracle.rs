//! The rule oracle adapter.
//!
//! The oracle is the authority on DST transition instants. It is called once
//! per zone with the full list of years and answers with one rule set per
//! year; fanning the years out is the oracle's job, not ours.

use std::{collections::BTreeMap, ffi::OsString, process::Command};

use log::debug;
use serde_json::Value;

use crate::{
    error::{DstRulesError, OracleError},
    ruleset::TransitionRules,
    years::YearRange,
    DstRulesResult,
};

/// A source of per-year transition rules for a zone.
pub trait RuleOracle {
    /// Returns the transition rules of `zone` for every year in `years`.
    ///
    /// A successful result holds exactly one entry per year of the range.
    fn transition_rules(
        &self,
        zone: &str,
        years: &YearRange,
    ) -> DstRulesResult<BTreeMap<i32, TransitionRules>>;
}

/// A [`RuleOracle`] backed by an external program.
///
/// The program is invoked as `program [args...] <zone> <year>...` and must
/// print a JSON document on stdout.
#[derive(Debug, Clone)]
pub struct ProcessOracle {
    program: OsString,
    args: Vec<OsString>,
}

impl ProcessOracle {
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

    fn command(&self, zone: &str, years: &YearRange) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(zone)
            .args(years.iter().map(|year| year.to_string()));
        command
    }
}

impl Default for ProcessOracle {
    fn default() -> Self {
        Self::new("node", ["dst.js"])
    }
}

impl RuleOracle for ProcessOracle {
    fn transition_rules(
        &self,
        zone: &str,
        years: &YearRange,
    ) -> DstRulesResult<BTreeMap<i32, TransitionRules>> {
        let mut command = self.command(zone, years);
        debug!(target: "dst_rules", "running oracle: {command:?}");

        let output = command
            .output()
            .map_err(|e| DstRulesError::oracle(zone, OracleError::Spawn(e)))?;

        if !output.status.success() {
            return Err(DstRulesError::oracle(
                zone,
                OracleError::Exit {
                    code: output.status.code(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                },
            ));
        }

        parse_oracle_response(years, &output.stdout).map_err(|e| DstRulesError::oracle(zone, e))
    }
}

/// Parses an oracle response into one rule set per requested year.
///
/// Two shapes are accepted: an array holding one entry per year in range
/// order, or an object keyed by year. Anything else, including an empty
/// response or a response that does not cover the range exactly, is an error.
pub fn parse_oracle_response(
    years: &YearRange,
    response: &[u8],
) -> Result<BTreeMap<i32, TransitionRules>, OracleError> {
    if response.iter().all(u8::is_ascii_whitespace) {
        return Err(OracleError::Empty);
    }

    match serde_json::from_slice::<Value>(response)? {
        Value::Array(entries) => {
            if entries.len() != years.len() {
                return Err(OracleError::YearCountMismatch {
                    expected: years.len(),
                    found: entries.len(),
                });
            }
            Ok(years
                .iter()
                .zip(entries)
                .map(|(year, value)| (year, TransitionRules::new(value)))
                .collect())
        }
        Value::Object(entries) => {
            let mut rules = BTreeMap::new();
            for (key, value) in entries {
                let year = key
                    .trim()
                    .parse::<i32>()
                    .ok()
                    .filter(|year| years.contains(*year))
                    .ok_or_else(|| OracleError::UnexpectedYear(key.clone()))?;
                if rules.insert(year, TransitionRules::new(value)).is_some() {
                    return Err(OracleError::UnexpectedYear(key));
                }
            }
            if let Some(missing) = years.iter().find(|year| !rules.contains_key(year)) {
                return Err(OracleError::MissingYear(missing));
            }
            Ok(rules)
        }
        Value::Null => Err(OracleError::UnexpectedShape("null")),
        Value::Bool(_) => Err(OracleError::UnexpectedShape("a boolean")),
        Value::Number(_) => Err(OracleError::UnexpectedShape("a number")),
        Value::String(_) => Err(OracleError::UnexpectedShape("a string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn years(first: i32, last: i32) -> YearRange {
        YearRange::new(first, last).unwrap()
    }

    #[test]
    fn positional_response() {
        let response = br#"[{"end": 1225612800000, "start": 1205053200000}, false]"#;
        let rules = parse_oracle_response(&years(2008, 2009), response).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules[&2008].as_value(),
            &json!({"start": 1205053200000_i64, "end": 1225612800000_i64})
        );
        assert_eq!(rules[&2009].as_value(), &json!(false));
    }

    #[test]
    fn keyed_response() {
        let response = br#"{"2009": [], "2008": [{"at": 1}]}"#;
        let rules = parse_oracle_response(&years(2008, 2009), response).unwrap();
        assert_eq!(rules.keys().copied().collect::<Vec<_>>(), [2008, 2009]);
        assert_eq!(rules[&2008].as_value(), &json!([{"at": 1}]));
    }

    #[test]
    fn empty_response() {
        assert!(matches!(
            parse_oracle_response(&years(2008, 2009), b" \n"),
            Err(OracleError::Empty)
        ));
    }

    #[test]
    fn malformed_response() {
        assert!(matches!(
            parse_oracle_response(&years(2008, 2009), b"[false,"),
            Err(OracleError::Malformed(_))
        ));
        assert!(matches!(
            parse_oracle_response(&years(2008, 2009), b"\"nope\""),
            Err(OracleError::UnexpectedShape("a string"))
        ));
    }

    #[test]
    fn gaps_are_rejected() {
        assert!(matches!(
            parse_oracle_response(&years(2008, 2010), b"[false, false]"),
            Err(OracleError::YearCountMismatch {
                expected: 3,
                found: 2
            })
        ));
        assert!(matches!(
            parse_oracle_response(&years(2008, 2010), br#"{"2008": false, "2010": false}"#),
            Err(OracleError::MissingYear(2009))
        ));
        assert!(matches!(
            parse_oracle_response(&years(2008, 2008), br#"{"2008": false, "1999": false}"#),
            Err(OracleError::UnexpectedYear(key)) if key == "1999"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn process_oracle_receives_zone_and_years() {
        // Echoes its arguments back as a keyed response.
        let script = r#"zone="$1"; shift; printf '{'; sep=''; for y in "$@"; do printf '%s"%s": "%s"' "$sep" "$y" "$zone"; sep=','; done; printf '}'"#;
        let oracle = ProcessOracle::new("sh", ["-c", script, "oracle"]);
        let rules = oracle
            .transition_rules("Asia/Gaza", &years(2008, 2010))
            .unwrap();
        assert_eq!(rules.len(), 3);
        assert!(rules.values().all(|r| r.as_value() == &json!("Asia/Gaza")));
    }

    #[cfg(unix)]
    #[test]
    fn process_oracle_failure_is_fatal() {
        let oracle = ProcessOracle::new("sh", ["-c", "echo broken >&2; exit 3", "oracle"]);
        let err = oracle
            .transition_rules("Asia/Gaza", &years(2008, 2008))
            .unwrap_err();
        match err {
            DstRulesError::Oracle {
                zone,
                error: OracleError::Exit { code, stderr },
            } => {
                assert_eq!(zone, "Asia/Gaza");
                assert_eq!(code, Some(3));
                assert_eq!(stderr.trim(), "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_oracle_program() {
        let oracle = ProcessOracle::new("dst-rules-oracle-that-does-not-exist", Vec::<String>::new());
        assert!(matches!(
            oracle.transition_rules("UTC", &years(2008, 2008)),
            Err(DstRulesError::Oracle {
                error: OracleError::Spawn(_),
                ..
            })
        ));
    }
}
