//! The immunization rule table: built-in national schedule and YAML override.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::offset::parse_offset_spec;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// One row of the national immunization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImmunizationRule {
    /// Display label for the age group ("Birth", "6 Weeks", ...).
    #[serde(rename = "age")]
    pub age_label: String,
    pub vaccine: String,
    pub protection_against: String,
    /// Age offset spec. Defaults to the age label when omitted.
    #[serde(default, rename = "offset")]
    offset_override: Option<String>,
    /// Footnote marker ("*", "**", ...) when the rule has a caveat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ImmunizationRule {
    pub fn new(age_label: &str, vaccine: &str, protection_against: &str) -> Self {
        Self {
            age_label: age_label.to_string(),
            vaccine: vaccine.to_string(),
            protection_against: protection_against.to_string(),
            offset_override: None,
            note: None,
        }
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    /// The offset spec the resolver parses: the explicit override when the
    /// display label and the schedule age differ, otherwise the age label.
    pub fn offset_spec(&self) -> &str {
        self.offset_override.as_deref().unwrap_or(&self.age_label)
    }
}

/// An ordered immunization rule table plus its display footnotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    #[serde(default)]
    pub footnotes: Vec<String>,
    pub rules: Vec<ImmunizationRule>,
}

impl RuleTable {
    /// The built-in national immunization schedule.
    pub fn builtin() -> Self {
        let rules = vec![
            ImmunizationRule::new("Birth", "BCG", "Tuberculosis"),
            ImmunizationRule::new("Birth", "OPV 0", "Polio"),
            ImmunizationRule::new("6 Weeks", "OPV 1", "Polio"),
            ImmunizationRule::new(
                "6 Weeks",
                "DPT-HepB-Hib 1",
                "Diphtheria, Pertussis, Tetanus, Hepatitis B, Haemophilus influenzae type b",
            ),
            ImmunizationRule::new("6 Weeks", "PCV 1", "Pneumococcal disease"),
            ImmunizationRule::new("6 Weeks", "Rotavirus 1", "Rotavirus diarrhoea"),
            ImmunizationRule::new("10 Weeks", "OPV 2", "Polio"),
            ImmunizationRule::new(
                "10 Weeks",
                "DPT-HepB-Hib 2",
                "Diphtheria, Pertussis, Tetanus, Hepatitis B, Haemophilus influenzae type b",
            ),
            ImmunizationRule::new("10 Weeks", "PCV 2", "Pneumococcal disease"),
            ImmunizationRule::new("10 Weeks", "Rotavirus 2", "Rotavirus diarrhoea"),
            ImmunizationRule::new("14 Weeks", "OPV 3", "Polio"),
            ImmunizationRule::new(
                "14 Weeks",
                "DPT-HepB-Hib 3",
                "Diphtheria, Pertussis, Tetanus, Hepatitis B, Haemophilus influenzae type b",
            ),
            ImmunizationRule::new("14 Weeks", "PCV 3", "Pneumococcal disease"),
            ImmunizationRule::new("14 Weeks", "Rotavirus 3", "Rotavirus diarrhoea")
                .with_note("*"),
            ImmunizationRule::new("6 Months", "Vitamin A", "Vitamin A deficiency")
                .with_note("**"),
            ImmunizationRule::new("9-12 Months", "Measles-Rubella 1", "Measles, Rubella"),
            ImmunizationRule::new("9-12 Months", "Yellow Fever", "Yellow fever"),
            ImmunizationRule::new("1 Year", "Influenza", "Seasonal influenza").with_note("***"),
            ImmunizationRule::new("18 Months", "Measles-Rubella 2", "Measles, Rubella"),
        ];
        Self {
            footnotes: vec![
                "* Rotavirus 3rd dose alternate schedule".to_string(),
                "** Vitamin A is given every 6 months up to 5 years and during lactation"
                    .to_string(),
                "*** One dose annually".to_string(),
            ],
            rules,
        }
    }

    /// Load a rule table from a YAML file.
    ///
    /// Entries that fail validation are skipped with a warning rather than
    /// failing the whole table; an empty result is an error.
    pub fn from_yaml_file(path: &Path) -> Result<Self, RuleError> {
        let contents = fs::read_to_string(path)?;
        let table: RuleTable = serde_yaml::from_str(&contents)?;
        table.validated()
    }

    /// Drop invalid entries (empty names, duplicate vaccine+offset pairs),
    /// warning per rejected rule. Unparseable offset specs are kept: they
    /// resolve to doses with no due date, which the reconciler ignores.
    pub fn validated(self) -> Result<Self, RuleError> {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut rules = Vec::with_capacity(self.rules.len());

        for rule in self.rules {
            if rule.vaccine.trim().is_empty() || rule.age_label.trim().is_empty() {
                warn!(
                    age = %rule.age_label,
                    vaccine = %rule.vaccine,
                    "skipping rule with empty age label or vaccine name"
                );
                continue;
            }
            let key = (rule.vaccine.clone(), rule.offset_spec().to_string());
            if !seen.insert(key) {
                warn!(
                    age = %rule.age_label,
                    vaccine = %rule.vaccine,
                    "skipping duplicate rule for vaccine at same offset"
                );
                continue;
            }
            if parse_offset_spec(rule.offset_spec()).is_none() {
                warn!(
                    age = %rule.age_label,
                    vaccine = %rule.vaccine,
                    offset = %rule.offset_spec(),
                    "rule has unparseable offset spec; its dose will have no due date"
                );
            }
            rules.push(rule);
        }

        if rules.is_empty() {
            return Err(RuleError::Validation(
                "rule table contains no valid rules".to_string(),
            ));
        }

        Ok(Self {
            footnotes: self.footnotes,
            rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_table_is_valid() {
        let table = RuleTable::builtin().validated().unwrap();
        assert!(table.rules.len() >= 15);
        // Every built-in offset spec must parse.
        for rule in &table.rules {
            assert!(
                parse_offset_spec(rule.offset_spec()).is_some(),
                "built-in spec {:?} must parse",
                rule.offset_spec()
            );
        }
    }

    #[test]
    fn validation_drops_empty_and_duplicate_rules() {
        let table = RuleTable {
            footnotes: vec![],
            rules: vec![
                ImmunizationRule::new("Birth", "BCG", "Tuberculosis"),
                ImmunizationRule::new("Birth", "", "nothing"),
                ImmunizationRule::new("Birth", "BCG", "Tuberculosis again"),
                ImmunizationRule::new("6 Weeks", "BCG", "different offset is fine"),
            ],
        };
        let validated = table.validated().unwrap();
        let vaccines: Vec<_> = validated
            .rules
            .iter()
            .map(|r| (r.vaccine.as_str(), r.offset_spec()))
            .collect();
        assert_eq!(vaccines, vec![("BCG", "Birth"), ("BCG", "6 Weeks")]);
    }

    #[test]
    fn empty_table_is_an_error() {
        let table = RuleTable {
            footnotes: vec![],
            rules: vec![ImmunizationRule::new("", "", "")],
        };
        assert!(matches!(table.validated(), Err(RuleError::Validation(_))));
    }

    #[test]
    fn yaml_override_round_trip() {
        let yaml = r#"
footnotes:
  - "* given at the clinic"
rules:
  - age: Birth
    vaccine: BCG
    protection_against: Tuberculosis
  - age: "At first visit"
    offset: "6 Weeks"
    vaccine: OPV 1
    protection_against: Polio
    note: "*"
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let table = RuleTable::from_yaml_file(file.path()).unwrap();
        assert_eq!(table.rules.len(), 2);
        assert_eq!(table.rules[0].offset_spec(), "Birth");
        assert_eq!(table.rules[1].offset_spec(), "6 Weeks");
        assert_eq!(table.rules[1].age_label, "At first visit");
        assert_eq!(table.rules[1].note.as_deref(), Some("*"));
        assert_eq!(table.footnotes.len(), 1);
    }

    #[test]
    fn yaml_garbage_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"rules: [not, a, rule").unwrap();
        assert!(matches!(
            RuleTable::from_yaml_file(file.path()),
            Err(RuleError::Parse(_))
        ));
    }
}
