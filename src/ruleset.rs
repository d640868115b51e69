//! The generated ruleset and its serialized forms.
//!
//! A [`Ruleset`] is rendered either as a standalone JSON document or as a
//! loadable script that assigns the same JSON to a namespace field read by
//! the detector. Both forms carry byte-identical rule content; only the
//! envelope differs.

use core::{fmt, str::FromStr};
use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::Path,
};

use jiff::Timestamp;
use serde::{Serialize, Serializer};
use serde_json::{ser::PrettyFormatter, Map, Value};

use crate::{error::DstRulesError, years::YearRange, DstRulesResult};

/// The namespace field the detector reads its rules from.
pub const DEFAULT_NAMESPACE: &str = "jstz.olson.dst_rules";

/// The transition rules the oracle reported for one zone in one year.
///
/// The content is opaque and passed through as-is, apart from object keys
/// being held in sorted order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TransitionRules(Value);

impl TransitionRules {
    pub fn new(value: Value) -> Self {
        Self(canonicalize(value))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for TransitionRules {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

// Rebuilds objects in sorted key order, which holds even when serde_json's
// `preserve_order` feature is enabled elsewhere in the build.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
            Value::Object(sorted.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// All years of transition rules for one zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneRules {
    pub name: String,
    /// Keyed by year, serialized as an array in year order: the detector
    /// indexes `rules` by the position of the year in [`Ruleset::years`].
    #[serde(serialize_with = "serialize_in_year_order")]
    pub rules: BTreeMap<i32, TransitionRules>,
}

fn serialize_in_year_order<S: Serializer>(
    rules: &BTreeMap<i32, TransitionRules>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(rules.values())
}

/// The complete generation artifact.
///
/// Field order matches sorted key order, so the serialized form is stable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ruleset {
    pub years: YearRange,
    pub zones: Vec<ZoneRules>,
}

impl Ruleset {
    pub fn new(years: YearRange) -> Self {
        Self {
            years,
            zones: Vec::new(),
        }
    }

    /// Renders the ruleset as a 4-space indented JSON document with sorted keys.
    pub fn to_json_string(&self) -> DstRulesResult<String> {
        let mut json = pretty_json(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Renders the ruleset as a script assigning it to `namespace`, stamped
    /// with the build time.
    pub fn to_module_string(&self, namespace: &str, built_at: Timestamp) -> DstRulesResult<String> {
        validate_namespace(namespace)?;
        let json = pretty_json(self)?;
        Ok(format!(
            "//@generated\n// (by `dst-rulegen` in dst_rules, built {})\n\n{namespace} = {json};\n",
            built_at.strftime("%Y-%m-%dT%H:%M:%SZ")
        ))
    }

    /// Renders the ruleset in `format`. `namespace` and `built_at` only apply
    /// to [`ArtifactFormat::Module`].
    pub fn render(
        &self,
        format: ArtifactFormat,
        namespace: &str,
        built_at: Timestamp,
    ) -> DstRulesResult<String> {
        match format {
            ArtifactFormat::Json => self.to_json_string(),
            ArtifactFormat::Module => self.to_module_string(namespace, built_at),
        }
    }
}

fn pretty_json<T: Serialize>(value: &T) -> DstRulesResult<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

pub(crate) fn validate_namespace(namespace: &str) -> DstRulesResult<()> {
    let is_identifier = |segment: &str| {
        let mut chars = segment.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    };
    if namespace.split('.').all(is_identifier) {
        Ok(())
    } else {
        Err(DstRulesError::InvalidNamespace(namespace.into()))
    }
}

/// Writes a fully rendered artifact to `path`, creating parent directories.
pub fn write_artifact(path: &Path, contents: &str) -> DstRulesResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = io::BufWriter::new(fs::File::create(path)?);
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(())
}

/// The serialized form of a [`Ruleset`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// A standalone JSON document.
    #[default]
    Json,
    /// A script assigning the JSON document to a namespace field.
    Module,
}

impl ArtifactFormat {
    /// The file the artifact is written to when no path is given.
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::Json => "rules.json",
            Self::Module => "dst_rules.js",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParseArtifactFormatError;

impl fmt::Display for ParseArtifactFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("provided string was not a valid artifact format (expected `json` or `module`)")
    }
}

impl std::error::Error for ParseArtifactFormatError {}

impl FromStr for ArtifactFormat {
    type Err = ParseArtifactFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "module" => Ok(Self::Module),
            _ => Err(ParseArtifactFormatError),
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Module => "module",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gaza_2008() -> Ruleset {
        let mut rules = BTreeMap::new();
        rules.insert(
            2008,
            TransitionRules::new(json!({"start": 1206655200000_i64, "end": 1222639200000_i64})),
        );
        Ruleset {
            years: YearRange::single(2008),
            zones: vec![ZoneRules {
                name: "Asia/Gaza".into(),
                rules,
            }],
        }
    }

    #[test]
    fn json_layout() {
        let expected = r#"{
    "years": [
        2008
    ],
    "zones": [
        {
            "name": "Asia/Gaza",
            "rules": [
                {
                    "end": 1222639200000,
                    "start": 1206655200000
                }
            ]
        }
    ]
}
"#;
        assert_eq!(gaza_2008().to_json_string().unwrap(), expected);
    }

    #[test]
    fn nested_keys_are_sorted() {
        let rules = TransitionRules::new(json!([{"z": 1, "a": {"y": false, "b": null}}]));
        assert_eq!(
            serde_json::to_string(&rules).unwrap(),
            r#"[{"a":{"b":null,"y":false},"z":1}]"#
        );
    }

    #[test]
    fn module_wraps_identical_json() {
        let ruleset = gaza_2008();
        let built_at: Timestamp = "2014-03-01T10:20:30.5Z".parse().unwrap();
        let module = ruleset.to_module_string(DEFAULT_NAMESPACE, built_at).unwrap();
        let json = ruleset.to_json_string().unwrap();

        assert!(module.starts_with(
            "//@generated\n// (by `dst-rulegen` in dst_rules, built 2014-03-01T10:20:30Z)\n\n"
        ));
        let body = module
            .split_once("jstz.olson.dst_rules = ")
            .map(|(_, body)| body)
            .unwrap();
        assert_eq!(body, format!("{};\n", json.trim_end()));
    }

    #[test]
    fn module_only_differs_by_timestamp() {
        let ruleset = gaza_2008();
        let a = ruleset
            .to_module_string(DEFAULT_NAMESPACE, "2020-01-01T00:00:00Z".parse().unwrap())
            .unwrap();
        let b = ruleset
            .to_module_string(DEFAULT_NAMESPACE, "2021-06-15T12:00:00Z".parse().unwrap())
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(
            a.lines().skip(2).collect::<Vec<_>>(),
            b.lines().skip(2).collect::<Vec<_>>()
        );
    }

    #[test]
    fn namespace_validation() {
        let ruleset = gaza_2008();
        let now = Timestamp::UNIX_EPOCH;
        assert!(ruleset.to_module_string("window.$rules", now).is_ok());
        for bad in ["", "jstz..dst", "1jstz", "jstz.olson-dst", "jstz = {}; x"] {
            assert!(
                matches!(
                    ruleset.to_module_string(bad, now),
                    Err(DstRulesError::InvalidNamespace(_))
                ),
                "{bad}"
            );
        }
    }

    #[test]
    fn artifact_format_parsing() {
        assert_eq!("json".parse::<ArtifactFormat>().unwrap(), ArtifactFormat::Json);
        assert_eq!("module".parse::<ArtifactFormat>().unwrap(), ArtifactFormat::Module);
        assert!("yaml".parse::<ArtifactFormat>().is_err());
        assert_eq!(ArtifactFormat::Module.to_string(), "module");
        assert_eq!(ArtifactFormat::Json.default_file_name(), "rules.json");
    }

    #[test]
    fn rules_are_positional_by_year() {
        let years = YearRange::new(2008, 2010).unwrap();
        let rules = years
            .iter()
            .map(|year| (year, TransitionRules::new(json!({"year": year}))))
            .collect();
        let ruleset = Ruleset {
            years,
            zones: vec![ZoneRules {
                name: "America/Denver".into(),
                rules,
            }],
        };

        let json: Value = serde_json::from_str(&ruleset.to_json_string().unwrap()).unwrap();
        let serialized = json["zones"][0]["rules"].as_array().unwrap();
        assert_eq!(serialized.len(), years.len());
        for (k, year) in years.iter().enumerate() {
            assert_eq!(json["years"][k], json!(year));
            assert_eq!(serialized[k], json!({"year": year}));
        }
    }
}
