use super::structured;
use crate::keywords::{collapse_whitespace, find_keyword, strip_keywords};
use crate::types::{CalcCommand, ParseOutcome};
use serde::Deserialize;

pub const COMMAND_WORDS: &[&str] = &[
    "calculator",
    "calculate",
    "calc",
    "compute",
    "evaluate",
    "what is",
    "open",
    ".exe",
];

/// Spoken operators, longest phrase first.
const SPOKEN_OPERATORS: &[(&str, &str)] = &[
    ("multiplied by", "*"),
    ("divided by", "/"),
    ("times", "*"),
    ("plus", "+"),
    ("minus", "-"),
    ("over", "/"),
];

#[derive(Debug, Deserialize)]
struct CalcPayload {
    expression: String,
}

pub fn is_expression_char(c: char) -> bool {
    c.is_ascii_digit() || "+-*/(). ".contains(c)
}

pub fn parse_calc_command(input: &str) -> ParseOutcome<CalcCommand> {
    if let Some(payload) = structured::<CalcPayload>(input) {
        let expression = longest_expression(&payload.expression).unwrap_or_default();
        return finish(expression);
    }

    let stripped = strip_keywords(input, COMMAND_WORDS);
    let spoken = replace_spoken_operators(&stripped);
    finish(longest_expression(&spoken).unwrap_or_default())
}

fn finish(expression: String) -> ParseOutcome<CalcCommand> {
    if expression.is_empty() {
        ParseOutcome::defaulted(CalcCommand { expression }, "no arithmetic expression found")
    } else {
        tracing::debug!(%expression, "Expression extracted");
        ParseOutcome::parsed(CalcCommand { expression })
    }
}

fn replace_spoken_operators(text: &str) -> String {
    let mut out = text.to_string();
    for (phrase, symbol) in SPOKEN_OPERATORS {
        loop {
            let lowered = out.to_lowercase();
            if lowered.len() != out.len() {
                return out;
            }
            match find_keyword(&lowered, phrase) {
                Some(at) => out.replace_range(at..at + phrase.len(), &format!(" {} ", symbol)),
                None => break,
            }
        }
    }
    out
}

/// Longest run of expression characters that holds at least one digit.
/// Ties go to the earliest run.
fn longest_expression(text: &str) -> Option<String> {
    text.split(|c: char| !is_expression_char(c))
        .map(str::trim)
        .filter(|run| run.chars().any(|c| c.is_ascii_digit()))
        .fold(None::<&str>, |best, run| match best {
            Some(b) if b.len() >= run.len() => Some(b),
            _ => Some(run),
        })
        .map(collapse_whitespace)
}
