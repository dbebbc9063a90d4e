//! Domain Router: ordered rule table mapping an utterance to one intent.

use crate::keywords::{collapse_whitespace, contains_any};
use crate::types::Intent;
use serde::{Deserialize, Serialize};

/// Marker that forces code generation regardless of keywords.
pub const CODE_REQUEST_MARKER: &str = "[CODEREQUEST]";

pub const CODE_KEYWORDS: &[&str] = &[
    "code",
    "program",
    "script",
    "function",
    "algorithm",
    "python",
    "java",
    "javascript",
    "c++",
    "cpp",
];

pub const WRITE_KEYWORDS: &[&str] = &[
    "write",
    "essay",
    "compose",
    "article",
    "poem",
    "story",
    "document about",
];

pub const CALC_KEYWORDS: &[&str] = &[
    "calculate",
    "calc",
    "compute",
    "evaluate",
    "plus",
    "minus",
    "times",
    "divided by",
];

pub const SYSTEM_KEYWORDS: &[&str] = &["brightness", "volume", "bluetooth"];

pub const FILE_KEYWORDS: &[&str] = &[
    "file",
    "files",
    "folder",
    "folders",
    "directory",
    "directories",
    "list",
    "delete",
    "remove",
    "copy",
    "move",
    "rename",
    "drive",
    "mkdir",
    "save",
];

pub const LAUNCH_KEYWORDS: &[&str] = &["open", "launch", "start", "run", "app", "application"];

#[derive(Debug, Clone)]
pub enum Matcher {
    Keywords(&'static [&'static str]),
    /// Bare arithmetic such as `3+5*2`.
    Arithmetic,
}

impl Matcher {
    fn matches(&self, lowered: &str) -> bool {
        match self {
            Matcher::Keywords(keywords) => contains_any(lowered, keywords),
            Matcher::Arithmetic => is_bare_arithmetic(lowered),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pub intent: Intent,
    pub matcher: Matcher,
}

impl RouteRule {
    pub fn new(intent: Intent, matcher: Matcher) -> Self {
        Self { intent, matcher }
    }
}

/// Rules in precedence order. Code generation precedes writing, and both
/// precede file and launch rules, so "write code to open a file" is code.
pub fn default_rules() -> Vec<RouteRule> {
    vec![
        RouteRule::new(Intent::GenerateCode, Matcher::Keywords(CODE_KEYWORDS)),
        RouteRule::new(Intent::WriteContent, Matcher::Keywords(WRITE_KEYWORDS)),
        RouteRule::new(Intent::Calculate, Matcher::Arithmetic),
        RouteRule::new(Intent::Calculate, Matcher::Keywords(CALC_KEYWORDS)),
        RouteRule::new(Intent::SystemControl, Matcher::Keywords(SYSTEM_KEYWORDS)),
        RouteRule::new(Intent::FileOp, Matcher::Keywords(FILE_KEYWORDS)),
        RouteRule::new(Intent::LaunchApp, Matcher::Keywords(LAUNCH_KEYWORDS)),
    ]
}

fn is_bare_arithmetic(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || "+-*/(). ".contains(c))
        && trimmed.chars().any(|c| c.is_ascii_digit())
        && trimmed.chars().any(|c| "+-*/".contains(c))
}

/// Routing decision for one utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub intent: Intent,
    /// Utterance with any override marker removed.
    pub text: String,
    /// True when the override marker decided the intent.
    pub forced: bool,
}

#[derive(Debug, Clone)]
pub struct Router {
    rules: Vec<RouteRule>,
    default_intent: Intent,
}

impl Router {
    pub fn new(default_intent: Intent) -> Self {
        Self {
            rules: default_rules(),
            default_intent,
        }
    }

    pub fn with_rules(rules: Vec<RouteRule>, default_intent: Intent) -> Self {
        Self {
            rules,
            default_intent,
        }
    }

    pub fn default_intent(&self) -> Intent {
        self.default_intent
    }

    pub fn classify(&self, utterance: &str) -> Intent {
        self.route(utterance).intent
    }

    pub fn route(&self, utterance: &str) -> Route {
        if let Some(stripped) = strip_marker(utterance) {
            tracing::info!(intent = %Intent::GenerateCode, "Code request marker present");
            return Route {
                intent: Intent::GenerateCode,
                text: stripped,
                forced: true,
            };
        }

        let lowered = utterance.to_lowercase();
        let intent = self
            .rules
            .iter()
            .find(|rule| rule.matcher.matches(&lowered))
            .map(|rule| rule.intent)
            .unwrap_or_else(|| {
                tracing::debug!(default = %self.default_intent, "No routing rule matched");
                self.default_intent
            });

        tracing::info!(%intent, "Routed utterance");
        Route {
            intent,
            text: utterance.trim().to_string(),
            forced: false,
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(Intent::LaunchApp)
    }
}

/// Removes every occurrence of the marker (any case). `None` if absent.
fn strip_marker(utterance: &str) -> Option<String> {
    let marker = CODE_REQUEST_MARKER.to_lowercase();
    let lowered = utterance.to_lowercase();
    if !lowered.contains(&marker) {
        return None;
    }

    if lowered.len() != utterance.len() {
        return Some(collapse_whitespace(&lowered.replace(&marker, " ")));
    }

    let mut out = String::with_capacity(utterance.len());
    let mut rest = utterance;
    let mut rest_lower = lowered.as_str();
    while let Some(at) = rest_lower.find(&marker) {
        out.push_str(&rest[..at]);
        out.push(' ');
        rest = &rest[at + marker.len()..];
        rest_lower = &rest_lower[at + marker.len()..];
    }
    out.push_str(rest);
    Some(collapse_whitespace(&out))
}
