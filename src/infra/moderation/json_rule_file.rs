// JSON rule table loader.
//
// File shape:
// {
//   "rules": [
//     { "label": "bare-url", "tier": "restricted", "pattern": "https?://" },
//     { "label": "admin-identity", "tier": "restricted", "allOf": ["jane", "doe"] }
//   ],
//   "reservedNames": ["admin"]
// }
//
// Either section may be left out to keep the built-in defaults for it.

use crate::core::moderation::{ContentClassifier, RuleSet, RuleSetError};
use std::path::{Path, PathBuf};

pub struct JsonRuleFile {
    path: PathBuf,
}

impl JsonRuleFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the rule table. Every pattern is compiled here, so a
    /// broken rules file fails at startup instead of on the first comment.
    pub fn load(&self) -> Result<RuleSet, RuleSetError> {
        let file = std::fs::File::open(&self.path)?;
        let rules: RuleSet = serde_json::from_reader(std::io::BufReader::new(file))?;
        ContentClassifier::new(&rules)?;

        tracing::info!(
            path = %self.path.display(),
            rules = rules.rules.len(),
            reserved_names = rules.reserved_names.len(),
            "Loaded moderation rules"
        );
        Ok(rules)
    }

    /// Like `load`, but a missing file means the built-in table.
    pub fn load_or_default(&self) -> Result<RuleSet, RuleSetError> {
        if !self.path.exists() {
            tracing::warn!(
                path = %self.path.display(),
                "Rules file not found, using built-in rules"
            );
            return Ok(RuleSet::default());
        }
        self.load()
    }

    /// Write a rule table, e.g. to export the defaults for editing.
    pub fn save(&self, rules: &RuleSet) -> Result<(), RuleSetError> {
        let file = std::fs::File::create(&self.path)?;
        serde_json::to_writer_pretty(file, rules)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::{RuleDefinition, RuleTier, VerdictReason};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_custom_rules() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "rules": [
                    {{"label": "spoilers", "tier": "moderated", "pattern": "\\bspoiler\\b"}},
                    {{"label": "owner", "tier": "restricted", "allOf": ["jane", "doe"]}}
                ],
                "reservedNames": ["jane"]
            }}"#
        )
        .unwrap();

        let rules = JsonRuleFile::new(file.path()).load().unwrap();
        let classifier = ContentClassifier::new(&rules).unwrap();

        assert_eq!(
            classifier.classify_comment("Spoiler alert").reason,
            VerdictReason::ModeratedLanguage
        );
        assert_eq!(
            classifier.classify_comment("Doe, Jane").reason,
            VerdictReason::RestrictedContent
        );
        assert!(classifier.is_username_restricted("JaneD"));
    }

    #[test]
    fn test_invalid_pattern_fails_at_load() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"rules": [{{"label": "broken", "tier": "restricted", "pattern": "[a-"}}]}}"#
        )
        .unwrap();

        let err = JsonRuleFile::new(file.path()).load().unwrap_err();
        assert!(matches!(err, RuleSetError::InvalidPattern { .. }));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = JsonRuleFile::new(file.path()).load().unwrap_err();
        assert!(matches!(err, RuleSetError::Serialization(_)));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let rule_file = JsonRuleFile::new(dir.path().join("rules.json"));
        assert_eq!(rule_file.path(), dir.path().join("rules.json"));

        assert_eq!(rule_file.load_or_default().unwrap(), RuleSet::default());
        assert!(matches!(rule_file.load(), Err(RuleSetError::Io(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let rule_file = JsonRuleFile::new(dir.path().join("rules.json"));
        let rules = RuleSet {
            rules: vec![RuleDefinition::pattern("x", RuleTier::Moderated, "xyz")],
            reserved_names: vec!["owner".to_string()],
        };

        rule_file.save(&rules).unwrap();
        assert_eq!(rule_file.load().unwrap(), rules);
    }
}
