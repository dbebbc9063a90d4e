use super::{clean_fragment, structured};
use crate::keywords::strip_keywords;
use crate::types::{AppLaunchCommand, ParseOutcome};
use serde::Deserialize;

const FILLER: &[&str] = &[
    "can you",
    "could you",
    "would you",
    "for me",
    "please",
    "open up",
    "open",
    "launch",
    "start",
    "run",
    "the",
    "application",
    "app",
    "program",
];

#[derive(Debug, Deserialize)]
struct AppPayload {
    #[serde(alias = "app", alias = "name")]
    app_name: String,
}

/// Pulls the application name out of a launch request.
pub fn parse_app_command(input: &str) -> ParseOutcome<AppLaunchCommand> {
    let app_name = match structured::<AppPayload>(input) {
        Some(payload) => clean_fragment(&payload.app_name),
        None => clean_fragment(&strip_keywords(input, FILLER)),
    };

    if app_name.is_empty() {
        return ParseOutcome::defaulted(AppLaunchCommand { app_name }, "no application named");
    }
    ParseOutcome::parsed(AppLaunchCommand { app_name })
}
