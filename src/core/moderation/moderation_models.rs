// Moderation domain models - rule tables and verdicts.
//
// These are pure domain types with no rendering or storage dependencies.
// The comment service persists verdicts, the render layer turns them into views.

use serde::{Deserialize, Serialize};

/// Why a piece of content got the verdict it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictReason {
    /// Nothing matched
    None,
    /// Hard-blocked content: never stored, never shown
    RestrictedContent,
    /// The author's display name is reserved
    UsernameRestricted,
    /// Stored, but the body is withheld until revealed or approved
    ModeratedLanguage,
}

impl std::fmt::Display for VerdictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerdictReason::None => write!(f, "None"),
            VerdictReason::RestrictedContent => write!(f, "Restricted content"),
            VerdictReason::UsernameRestricted => write!(f, "Username restricted"),
            VerdictReason::ModeratedLanguage => write!(f, "Moderated language"),
        }
    }
}

impl VerdictReason {
    /// Inverse of `Display`, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        [
            VerdictReason::RestrictedContent,
            VerdictReason::UsernameRestricted,
            VerdictReason::ModeratedLanguage,
        ]
        .into_iter()
        .find(|reason| reason.to_string().eq_ignore_ascii_case(label))
    }
}

/// Result of classifying a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Whether the comment may be persisted at all
    pub allowed: bool,
    pub reason: VerdictReason,
    /// Whether the body must be withheld from the render layer
    pub should_blur: bool,
    /// Label of the rule that fired. For audit logs only, never shown to authors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<String>,
}

impl Verdict {
    /// Create a "nothing matched" verdict
    pub fn clean() -> Self {
        Self {
            allowed: true,
            reason: VerdictReason::None,
            should_blur: false,
            matched_rule: None,
        }
    }

    /// Create a hard-block verdict
    pub fn restricted(rule: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: VerdictReason::RestrictedContent,
            should_blur: false,
            matched_rule: Some(rule.into()),
        }
    }

    /// Create a soft-flag verdict
    pub fn moderated(rule: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: VerdictReason::ModeratedLanguage,
            should_blur: true,
            matched_rule: Some(rule.into()),
        }
    }

    pub fn username_restricted() -> Self {
        Self {
            allowed: false,
            reason: VerdictReason::UsernameRestricted,
            should_blur: false,
            matched_rule: None,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.reason == VerdictReason::None
    }
}

/// Which deny list a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleTier {
    /// Hard block. Checked first.
    Restricted,
    /// Soft flag. Checked only when no restricted rule matched.
    Moderated,
}

/// How a rule matches text. Always case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleMatcher {
    /// A regular expression.
    Pattern { pattern: String },
    /// Every term must appear somewhere, in any order.
    AllOf {
        #[serde(rename = "allOf")]
        all_of: Vec<String>,
    },
}

/// One row of the rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub label: String,
    pub tier: RuleTier,
    #[serde(flatten)]
    pub matcher: RuleMatcher,
}

impl RuleDefinition {
    pub fn pattern(label: &str, tier: RuleTier, pattern: &str) -> Self {
        Self {
            label: label.to_string(),
            tier,
            matcher: RuleMatcher::Pattern {
                pattern: pattern.to_string(),
            },
        }
    }

    pub fn all_of(label: &str, tier: RuleTier, terms: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            tier,
            matcher: RuleMatcher::AllOf {
                all_of: terms.iter().map(|t| t.to_string()).collect(),
            },
        }
    }
}

/// The full moderation configuration.
///
/// Rules are evaluated in list order within each tier; the first match wins.
/// Sections missing from a rules file fall back to the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    #[serde(default = "super::default_rules::default_rules")]
    pub rules: Vec<RuleDefinition>,
    /// Names nobody but the admin may use
    #[serde(default = "super::default_rules::default_reserved_names")]
    pub reserved_names: Vec<String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: super::default_rules::default_rules(),
            reserved_names: super::default_rules::default_reserved_names(),
        }
    }
}

impl RuleSet {
    pub fn tier(&self, tier: RuleTier) -> impl Iterator<Item = &RuleDefinition> {
        self.rules.iter().filter(move |rule| rule.tier == tier)
    }
}
