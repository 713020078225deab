//! Pattern-based secret redaction.
//!
//! Credential-shaped substrings are replaced with [`REDACTED`]; PEM private
//! key blocks collapse to [`REDACTED_PRIVATE_KEY`]. Patterns are compiled
//! once and applied in a fixed order, most specific first. When a value is
//! ambiguous the rules lean towards redacting it.
//!
//! Not detected: passwords inside connection-string URLs and secrets written
//! as prose instead of `key=value` / `key: value`.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

/// Replacement for a redacted value.
pub const REDACTED: &str = "[REDACTED]";
/// Replacement for a whole PEM private key block.
pub const REDACTED_PRIVATE_KEY: &str = "[REDACTED PRIVATE KEY]";

/// Family of the rule that matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretKind {
    /// `-----BEGIN ... PRIVATE KEY-----` through the matching END line.
    PrivateKeyBlock,
    /// Vendor token with a well-known prefix (`ghp_`, `sk-`, `xoxb-`, ...).
    VendorToken,
    /// Cloud access key id, or a labeled secret access key.
    CloudAccessKey,
    /// `api_key: "..."` style assignment of a quoted value.
    KeyedValue,
    /// `SOME_TOKEN=...` environment-variable assignment.
    EnvAssignment,
    /// Any `=`/`:` assignment of a long base64 or hex run.
    GenericAssignment,
}

struct Rule {
    kind: SecretKind,
    regex: Regex,
    /// Replacement for one match, or `None` to keep the match as it is.
    rewrite: fn(&Captures<'_>) -> Option<String>,
}

impl Rule {
    fn new(kind: SecretKind, pattern: &str, rewrite: fn(&Captures<'_>) -> Option<String>) -> Self {
        Self {
            kind,
            regex: Regex::new(pattern).expect("secret patterns are valid regexes"),
            rewrite,
        }
    }
}

fn whole(_: &Captures<'_>) -> Option<String> {
    Some(REDACTED.to_string())
}

fn keep_label(caps: &Captures<'_>) -> Option<String> {
    Some(format!("{}{REDACTED}", &caps["label"]))
}

fn keep_label_and_quotes(caps: &Captures<'_>) -> Option<String> {
    if &caps["value"] == REDACTED {
        return None;
    }
    let open = caps.name("open").map_or("", |m| m.as_str());
    let close = caps.name("close").map_or("", |m| m.as_str());
    Some(format!("{}{open}{REDACTED}{close}", &caps["label"]))
}

fn keep_label_in_quotes(caps: &Captures<'_>) -> Option<String> {
    let (quote, value) = match (caps.name("dq"), caps.name("sq")) {
        (Some(value), _) => ('"', value),
        (None, Some(value)) => ('\'', value),
        (None, None) => return None,
    };
    if value.as_str() == REDACTED {
        return None;
    }
    Some(format!("{}{quote}{REDACTED}{quote}", &caps["label"]))
}

fn generic_value(caps: &Captures<'_>) -> Option<String> {
    // Two or more separators look like a file path rather than a secret.
    if caps["value"].matches('/').count() >= 2 {
        return None;
    }
    keep_label(caps)
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            SecretKind::PrivateKeyBlock,
            r"(?s)-----BEGIN [A-Z0-9 ]*PRIVATE KEY-----(?:.*?-----END [A-Z0-9 ]*PRIVATE KEY-----|.*)",
            |_| Some(REDACTED_PRIVATE_KEY.to_string()),
        ),
        Rule::new(
            SecretKind::VendorToken,
            r"\b(?:sk-ant-|sk-proj-|sk-|sk_live_|sk_test_|rk_live_|ghp_|gho_|ghu_|ghs_|ghr_|github_pat_|glpat-|xox[abprs]-|npm_|hf_)[A-Za-z0-9_-]{30,}",
            whole,
        ),
        Rule::new(
            SecretKind::CloudAccessKey,
            r"\b(?:AKIA|ASIA|ABIA|ACCA|AGPA|AIDA|AIPA|ANPA|ANVA|AROA|APKA)[A-Z0-9]{16}\b",
            whole,
        ),
        Rule::new(
            SecretKind::CloudAccessKey,
            r#"(?i)(?P<label>secret[_\s-]?access[_\s-]?key["']?\s*[:=]\s*["']?)(?P<value>[A-Za-z0-9/+=]{20,})"#,
            keep_label,
        ),
        Rule::new(
            SecretKind::KeyedValue,
            r#"(?i)(?P<label>(?:api[_-]?key|access[_-]?token|secret[_-]?key|bearer[_-]?token|auth[_-]?token|refresh[_-]?token|client[_-]?secret|private[_-]?key|password|passwd)["']?\s*[:=]\s*)(?:"(?P<dq>[^"\s]{8,})"|'(?P<sq>[^'\s]{8,})')"#,
            keep_label_in_quotes,
        ),
        Rule::new(
            SecretKind::EnvAssignment,
            r#"\b(?P<label>[A-Z][A-Z0-9_]*(?:KEY|TOKEN|SECRET|PASSWORD|AUTH)[A-Z0-9_]*=)(?P<open>["']?)(?P<value>[^\s"']{8,})"#,
            keep_label_and_quotes,
        ),
        Rule::new(
            SecretKind::GenericAssignment,
            r#"(?P<label>[=:]\s*["']?)(?P<value>[A-Za-z0-9+/=]{32,})"#,
            generic_value,
        ),
    ]
});

/// Redacted text plus the families that matched, in rule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redaction {
    pub text: String,
    pub findings: Vec<SecretKind>,
}

impl Redaction {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Redact `text` and report what was found.
#[must_use]
pub fn scan(text: &str) -> Redaction {
    let mut current = text.to_string();
    let mut findings = Vec::new();

    for rule in RULES.iter() {
        let mut hits = 0usize;
        let replaced = rule.regex.replace_all(&current, |caps: &Captures<'_>| {
            if let Some(replacement) = (rule.rewrite)(caps) {
                hits += 1;
                replacement
            } else {
                caps[0].to_string()
            }
        });
        if hits > 0 {
            current = replaced.into_owned();
            findings.extend(std::iter::repeat_n(rule.kind, hits));
        }
    }

    Redaction {
        text: current,
        findings,
    }
}

/// Redact credential-shaped substrings in `text`.
#[must_use]
pub fn redact(text: &str) -> String {
    scan(text).text
}
