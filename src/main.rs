// Rule audit tool for the Emberflare moderation engine.
//
// Reads one item per line from stdin and prints one JSON result per line, so a
// rule change can be checked against a corpus of real comments before deploy.
//
// Usage:
//   emberflare-audit                      classify each line as a comment
//   emberflare-audit names                check each line as a display name
//   emberflare-audit export-rules <path>  write the active rule table as JSON
//
// This file's job is to:
// 1. Load configuration
// 2. Load and compile the rule table
// 3. Run the requested audit

use anyhow::{bail, Context, Result};
use emberflare::core::moderation::{ContentClassifier, RuleSet};
use emberflare::infra::config::EngineSettings;
use emberflare::infra::moderation::JsonRuleFile;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuditMode {
    Comments,
    Names,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NameResult<'a> {
    name: &'a str,
    restricted: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentResult<'a> {
    content: &'a str,
    #[serde(flatten)]
    verdict: emberflare::core::moderation::Verdict,
}

fn load_rules(settings: &EngineSettings) -> Result<RuleSet> {
    match &settings.rules_path {
        Some(path) => {
            let rule_file = JsonRuleFile::new(path);
            rule_file.load_or_default().with_context(|| {
                format!(
                    "Failed to load moderation rules from {}",
                    rule_file.path().display()
                )
            })
        }
        None => {
            tracing::info!("MODERATION_RULES_PATH not set, using built-in rules");
            Ok(RuleSet::default())
        }
    }
}

async fn run_audit(classifier: &ContentClassifier, mode: AuditMode) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut total = 0usize;
    let mut flagged = 0usize;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        total += 1;

        let output = match mode {
            AuditMode::Comments => {
                let verdict = classifier.classify_comment(line);
                if !verdict.is_clean() {
                    flagged += 1;
                }
                serde_json::to_string(&CommentResult {
                    content: line,
                    verdict,
                })?
            }
            AuditMode::Names => {
                let restricted = classifier.is_username_restricted(line);
                if restricted {
                    flagged += 1;
                }
                serde_json::to_string(&NameResult {
                    name: line,
                    restricted,
                })?
            }
        };
        println!("{}", output);
    }

    tracing::info!(?mode, total, flagged, "Audit finished");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists) before anything reads them
    dotenv::dotenv().ok();

    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let settings = EngineSettings::from_env();
    let rules = load_rules(&settings)?;
    let classifier = ContentClassifier::new(&rules).context("Invalid moderation rules")?;

    tracing::info!(
        rules = classifier.rule_count(),
        reserved_names = rules.reserved_names.len(),
        "Moderation engine ready"
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("comments") => run_audit(&classifier, AuditMode::Comments).await,
        Some("names") => run_audit(&classifier, AuditMode::Names).await,
        Some("export-rules") => {
            let Some(path) = args.get(1) else {
                bail!("Usage: emberflare-audit export-rules <path>");
            };
            let rule_file = JsonRuleFile::new(path);
            rule_file.save(&rules).with_context(|| {
                format!("Failed to write rules to {}", rule_file.path().display())
            })?;
            tracing::info!(path = %rule_file.path().display(), "Exported rule table");
            Ok(())
        }
        Some(other) => bail!("Unknown mode '{}'. Expected comments, names or export-rules", other),
    }
}
