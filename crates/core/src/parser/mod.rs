//! Per-domain command parsers.
//!
//! Every parser tries a structured JSON payload first and falls back to
//! ordered keyword/regex rules. None of them fail: a guess comes back as
//! [`ParseOutcome::Defaulted`](crate::types::ParseOutcome::Defaulted).

pub mod app;
pub mod calc;
pub mod code;
pub mod file;
pub mod system;
pub mod write;

pub use app::parse_app_command;
pub use calc::parse_calc_command;
pub use code::parse_code_command;
pub use file::parse_file_command;
pub use system::parse_system_command;
pub use write::parse_write_command;

use crate::resolver::PathResolver;
use crate::router::Route;
use crate::types::{EditorId, Intent, ParseOutcome, ParsedCommand};
use regex::Regex;
use std::sync::OnceLock;

/// Values parsers fall back to when the utterance leaves a field out.
#[derive(Debug, Clone)]
pub struct ParseDefaults {
    pub editor: EditorId,
}

/// Runs the parser that belongs to the routed intent.
pub fn parse_route(
    route: &Route,
    resolver: &PathResolver,
    defaults: &ParseDefaults,
) -> ParseOutcome<ParsedCommand> {
    let text = route.text.as_str();
    match route.intent {
        Intent::LaunchApp => parse_app_command(text).map(ParsedCommand::LaunchApp),
        Intent::WriteContent => {
            parse_write_command(text, &defaults.editor).map(ParsedCommand::WriteContent)
        }
        Intent::FileOp => parse_file_command(text, resolver).map(ParsedCommand::FileOp),
        Intent::GenerateCode => {
            parse_code_command(text, &defaults.editor).map(ParsedCommand::GenerateCode)
        }
        Intent::Calculate => parse_calc_command(text).map(ParsedCommand::Calculate),
        Intent::SystemControl => parse_system_command(text).map(ParsedCommand::SystemControl),
    }
}

/// Compiles a pattern once. A pattern that fails to compile is logged and
/// treated as never matching, so parsing keeps degrading instead of panicking.
pub(crate) fn cached_regex(
    cell: &'static OnceLock<Option<Regex>>,
    pattern: &str,
) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!(%pattern, error = %e, "Invalid parser pattern");
            None
        }
    })
    .as_ref()
}

/// Trims whitespace, trailing sentence punctuation and wrapping quotes.
pub(crate) fn clean_fragment(text: &str) -> String {
    let trimmed = text
        .trim()
        .trim_end_matches(['?', '!', ',', ';'])
        .trim_end_matches('.')
        .trim();
    trimmed
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}

/// Editor programs and the words that name them, checked in order.
pub const EDITORS: &[(&str, &[&str])] = &[
    ("notepad.exe", &["notepad", "notepad.exe"]),
    ("wordpad.exe", &["wordpad", "wordpad.exe"]),
    ("winword.exe", &["word", "ms word", "winword", "winword.exe"]),
    ("gedit", &["gedit"]),
    ("kate", &["kate"]),
    ("TextEdit", &["textedit"]),
];

/// Editor named anywhere in `lowered`, with the keyword that matched.
pub(crate) fn detect_editor(lowered: &str) -> Option<(EditorId, &'static str)> {
    EDITORS.iter().find_map(|(program, keywords)| {
        keywords
            .iter()
            .find(|kw| crate::keywords::contains_keyword(lowered, kw))
            .map(|kw| (EditorId::new(*program), *kw))
    })
}

/// Every editor keyword, for stripping editor mentions out of free text.
pub(crate) fn editor_keywords() -> Vec<&'static str> {
    EDITORS.iter().flat_map(|(_, kws)| kws.iter().copied()).collect()
}

/// Parses `input` as a JSON object if it looks like one.
pub(crate) fn structured<T: serde::de::DeserializeOwned>(input: &str) -> Option<T> {
    let trimmed = input.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    match serde_json::from_str(trimmed) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "Structured payload rejected, using natural language");
            None
        }
    }
}
