// Built-in moderation rule table.
//
// Used when no rules file is configured. Deployments override this with a
// JSON file (see `infra::moderation::JsonRuleFile`).

use super::moderation_models::{RuleDefinition, RuleTier};

pub fn default_rules() -> Vec<RuleDefinition> {
    use RuleTier::{Moderated, Restricted};

    vec![
        // Hard blocks
        RuleDefinition::all_of(
            "admin-identity",
            Restricted,
            &["eldrex", "delos reyes", "bula"],
        ),
        RuleDefinition::pattern(
            "credential-probe",
            Restricted,
            r"admin.{0,12}password|password.{0,12}admin",
        ),
        RuleDefinition::pattern(
            "exploit-vocabulary",
            Restricted,
            r"\b(hack(s|ed|er|ers|ing)?|exploit(s|ed|ing)?|sql\s*injection|xss|phishing)\b",
        ),
        RuleDefinition::pattern(
            "url-shortener",
            Restricted,
            r"\b(bit\.ly|tinyurl|goo\.gl|shorturl|t\.co/|ow\.ly|is\.gd)",
        ),
        RuleDefinition::pattern("bare-url", Restricted, r"(https?://|www\.)"),
        RuleDefinition::pattern(
            "email-address",
            Restricted,
            r"[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}",
        ),
        RuleDefinition::pattern(
            "bare-domain",
            Restricted,
            r"\b[a-z0-9-]+\.(com|net|org|io|co|info|biz|xyz)\b",
        ),
        RuleDefinition::pattern(
            "phone-number",
            Restricted,
            r"\+?\d(?:[\s().-]?\d){9,}",
        ),
        // Soft flags
        RuleDefinition::pattern(
            "second-person-insult",
            Moderated,
            r"\byou\b.*\b(suck|stupid|idiot|dumb|loser|pathetic)",
        ),
        RuleDefinition::pattern(
            "insult",
            Moderated,
            r"\b(idiot|stupid|dumb|moron|ugly|loser)\b",
        ),
        RuleDefinition::pattern(
            "threat",
            Moderated,
            r"\b(hate|kill|die|death|murder)\b",
        ),
        RuleDefinition::pattern(
            "profanity",
            Moderated,
            r"\b(shit\w*|fuck\w*|damn|bitch\w*|asshole\w*|bastard)\b",
        ),
        RuleDefinition::pattern(
            "bigotry",
            Moderated,
            r"\b(racist|sexist|homophobic|transphobic)\b",
        ),
        RuleDefinition::pattern(
            "slur",
            Moderated,
            r"\b(nigg\w*|fag\w*|retard\w*|spastic)",
        ),
    ]
}

pub fn default_reserved_names() -> Vec<String> {
    [
        "eldrex",
        "delos reyes",
        "bula",
        "admin",
        "administrator",
        "moderator",
    ]
    .iter()
    .map(|name| name.to_string())
    .collect()
}
