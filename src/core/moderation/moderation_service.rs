// Comment classification service - core business logic for moderation.
//
// This service handles:
// - Restricted content (hard block, never persisted)
// - Moderated language (soft flag, stored but withheld from rendering)
// - Reserved display names
//
// NO rendering or storage dependencies here - just pure domain logic.

use super::moderation_models::{RuleDefinition, RuleMatcher, RuleSet, RuleTier, Verdict};
use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("Rule '{label}' has an invalid pattern: {source}")]
    InvalidPattern {
        label: String,
        #[source]
        source: regex::Error,
    },

    #[error("Rule '{0}' has nothing to match")]
    EmptyRule(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Problems the author can fix and resubmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a comment")]
    EmptyComment,

    #[error("Please enter a display name")]
    EmptyDisplayName,
}

/// What was refused. The message stays generic so it can't be used to probe the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictionKind {
    Content,
    Username,
}

impl std::fmt::Display for RestrictionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestrictionKind::Content => {
                write!(f, "Your comment contains content that is not permitted")
            }
            RestrictionKind::Username => write!(f, "This display name is not allowed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Restricted(RestrictionKind),
}

impl SubmissionError {
    /// "Fix and resubmit" as opposed to "not permitted".
    pub fn is_correctable(&self) -> bool {
        matches!(self, SubmissionError::Validation(_))
    }
}

// ============================================================================
// COMPILED RULES
// ============================================================================

#[derive(Debug)]
enum CompiledMatcher {
    Pattern(Regex),
    /// Lower-cased terms
    AllOf(Vec<String>),
}

#[derive(Debug)]
struct CompiledRule {
    label: String,
    matcher: CompiledMatcher,
}

impl CompiledRule {
    fn compile(definition: &RuleDefinition) -> Result<Self, RuleSetError> {
        let matcher = match &definition.matcher {
            RuleMatcher::Pattern { pattern } => {
                if pattern.trim().is_empty() {
                    return Err(RuleSetError::EmptyRule(definition.label.clone()));
                }
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| RuleSetError::InvalidPattern {
                        label: definition.label.clone(),
                        source,
                    })?;
                CompiledMatcher::Pattern(regex)
            }
            RuleMatcher::AllOf { all_of } => {
                let terms: Vec<String> = all_of
                    .iter()
                    .map(|term| term.trim().to_lowercase())
                    .filter(|term| !term.is_empty())
                    .collect();
                if terms.is_empty() {
                    return Err(RuleSetError::EmptyRule(definition.label.clone()));
                }
                CompiledMatcher::AllOf(terms)
            }
        };

        Ok(Self {
            label: definition.label.clone(),
            matcher,
        })
    }

    /// `lowered` is `content` already lower-cased.
    fn is_match(&self, content: &str, lowered: &str) -> bool {
        match &self.matcher {
            CompiledMatcher::Pattern(regex) => regex.is_match(content),
            CompiledMatcher::AllOf(terms) => terms.iter().all(|term| lowered.contains(term)),
        }
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Classifies comments and display names against a rule table.
///
/// Immutable once built, so one instance can be shared (`Arc`) by every
/// request handler without locking.
#[derive(Debug)]
pub struct ContentClassifier {
    restricted: Vec<CompiledRule>,
    moderated: Vec<CompiledRule>,
    /// Lower-cased
    reserved_names: Vec<String>,
}

impl ContentClassifier {
    /// Compile a rule table. Fails on the first invalid rule.
    pub fn new(rules: &RuleSet) -> Result<Self, RuleSetError> {
        let compile_tier = |tier: RuleTier| -> Result<Vec<CompiledRule>, RuleSetError> {
            rules.tier(tier).map(CompiledRule::compile).collect()
        };

        let reserved_names = rules
            .reserved_names
            .iter()
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();

        Ok(Self {
            restricted: compile_tier(RuleTier::Restricted)?,
            moderated: compile_tier(RuleTier::Moderated)?,
            reserved_names,
        })
    }

    /// Classifier over the built-in rule table.
    pub fn with_default_rules() -> Self {
        Self::new(&RuleSet::default()).expect("built-in moderation rules must compile")
    }

    pub fn rule_count(&self) -> usize {
        self.restricted.len() + self.moderated.len()
    }

    /// Classify a comment body.
    ///
    /// Restricted rules are checked before moderated ones, so text matching both
    /// is always hard-blocked. Within a tier the first rule in table order wins.
    pub fn classify_comment(&self, content: &str) -> Verdict {
        let lowered = content.to_lowercase();

        if let Some(rule) = first_match(&self.restricted, content, &lowered) {
            tracing::debug!(rule = %rule.label, "Comment matched restricted rule");
            return Verdict::restricted(rule.label.clone());
        }

        if let Some(rule) = first_match(&self.moderated, content, &lowered) {
            tracing::debug!(rule = %rule.label, "Comment matched moderated rule");
            return Verdict::moderated(rule.label.clone());
        }

        Verdict::clean()
    }

    /// Check a display name against the reserved names, in both directions.
    ///
    /// "superadmin123" contains "admin"; "ad" is contained in "admin". Both are
    /// restricted. Empty names are not: they are missing, not reserved.
    pub fn is_username_restricted(&self, name: &str) -> bool {
        let candidate = name.trim().to_lowercase();
        if candidate.is_empty() {
            return false;
        }

        self.reserved_names
            .iter()
            .any(|reserved| candidate.contains(reserved.as_str()) || reserved.contains(&candidate))
    }

    /// Validate a display name the viewer wants to save.
    ///
    /// Returns the trimmed name.
    pub fn validate_display_name(&self, name: &str) -> Result<String, SubmissionError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyDisplayName.into());
        }
        if self.is_username_restricted(trimmed) {
            return Err(SubmissionError::Restricted(RestrictionKind::Username));
        }
        Ok(trimmed.to_string())
    }

    /// Screen a full submission: the author's name first, then the body.
    pub fn screen_submission(&self, author_name: &str, content: &str) -> Verdict {
        if self.is_username_restricted(author_name) {
            return Verdict::username_restricted();
        }
        self.classify_comment(content)
    }
}

fn first_match<'r>(
    rules: &'r [CompiledRule],
    content: &str,
    lowered: &str,
) -> Option<&'r CompiledRule> {
    rules.iter().find(|rule| rule.is_match(content, lowered))
}

// ============================================================================
// DEFAULT INSTANCE
// ============================================================================

/// Shared classifier over the built-in rules.
pub fn default_classifier() -> &'static ContentClassifier {
    static DEFAULT: OnceLock<ContentClassifier> = OnceLock::new();
    DEFAULT.get_or_init(ContentClassifier::with_default_rules)
}

/// Classify a comment with the built-in rules.
pub fn classify_comment(content: &str) -> Verdict {
    default_classifier().classify_comment(content)
}

/// Check a display name against the built-in reserved names.
pub fn is_username_restricted(name: &str) -> bool {
    default_classifier().is_username_restricted(name)
}

// ============================================================================
// TESTS
// ============================================================================
