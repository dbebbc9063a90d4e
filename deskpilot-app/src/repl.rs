//! Chat shell loop: reads lines from an [`Interface`], handles the shell's
//! own commands and hands everything else to the [`Session`].

use crate::session::Session;
use deskpilot_interfaces::Interface;
use deskpilot_memory::Role;
use std::path::Path;

pub const HELP_TEXT: &str = "\
Commands:
  exit, quit       Leave the session
  help             Show this message
  history          Show the conversation so far
  clear            Forget the conversation so far
  /export <file>   Save the conversation as JSON
  /route <text>    Show how <text> would be handled without running it

Anything else is a request, e.g. 'open notepad', 'calculate 3+5*2',
'create folder named Reports in D drive', 'increase brightness'.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand<'a> {
    Empty,
    Exit,
    Help,
    History,
    Clear,
    Export(&'a str),
    Route(&'a str),
    Utterance(&'a str),
}

pub fn parse_shell_command(line: &str) -> ShellCommand<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }
    if let Some(rest) = strip_command(line, "/export") {
        return ShellCommand::Export(rest);
    }
    if let Some(rest) = strip_command(line, "/route") {
        return ShellCommand::Route(rest);
    }
    match line.to_lowercase().as_str() {
        "exit" | "quit" => ShellCommand::Exit,
        "help" => ShellCommand::Help,
        "history" => ShellCommand::History,
        "clear" => ShellCommand::Clear,
        _ => ShellCommand::Utterance(line),
    }
}

fn strip_command<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(name)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

pub fn render_history(session: &Session) -> String {
    if session.history().is_empty() {
        return "(no messages yet)".to_string();
    }
    session
        .history()
        .messages()
        .iter()
        .map(|m| {
            let who = match m.role {
                Role::User => "You",
                Role::Assistant => "Assistant",
            };
            format!("{}: {}", who, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_preview(session: &Session, text: &str) -> String {
    let (route, outcome) = session.preview(text);
    let parsed = serde_json::to_string_pretty(&outcome).unwrap_or_else(|_| format!("{:?}", outcome));
    format!(
        "intent: {}{}\n{}",
        route.intent,
        if route.forced { " (forced)" } else { "" },
        parsed
    )
}

/// Runs until the user exits or input closes.
pub async fn run(session: &mut Session, ui: &dyn Interface) -> anyhow::Result<()> {
    ui.show_status("Type 'help' for commands, 'exit' to leave.").await;

    while let Some(line) = ui.receive_input().await {
        match parse_shell_command(&line) {
            ShellCommand::Empty => continue,
            ShellCommand::Exit => {
                ui.send_output("Goodbye!").await;
                break;
            }
            ShellCommand::Help => ui.send_output(HELP_TEXT).await,
            ShellCommand::History => ui.send_output(&render_history(session)).await,
            ShellCommand::Clear => {
                session.clear_history();
                ui.show_status("History cleared").await;
            }
            ShellCommand::Export("") => ui.show_error("Usage: /export <file>").await,
            ShellCommand::Export(file) => match session.export(Path::new(file)).await {
                Ok(()) => {
                    ui.show_status(&format!(
                        "Exported {} messages to {}",
                        session.history().len(),
                        file
                    ))
                    .await
                }
                Err(e) => ui.show_error(&format!("Export failed: {}", e)).await,
            },
            ShellCommand::Route("") => ui.show_error("Usage: /route <text>").await,
            ShellCommand::Route(text) => ui.send_output(&render_preview(session, text)).await,
            ShellCommand::Utterance(text) => {
                let reply = session.turn(text).await;
                ui.send_output(&reply).await;
            }
        }
    }

    tracing::info!(messages = session.history().len(), "Session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_commands() {
        assert_eq!(parse_shell_command("  "), ShellCommand::Empty);
        assert_eq!(parse_shell_command("QUIT"), ShellCommand::Exit);
        assert_eq!(parse_shell_command("help"), ShellCommand::Help);
        assert_eq!(
            parse_shell_command("/export chat.json"),
            ShellCommand::Export("chat.json")
        );
        assert_eq!(parse_shell_command("/export"), ShellCommand::Export(""));
        assert_eq!(
            parse_shell_command("/route open notepad"),
            ShellCommand::Route("open notepad")
        );
    }

    #[test]
    fn test_lookalikes_are_utterances() {
        assert_eq!(
            parse_shell_command("/exporter"),
            ShellCommand::Utterance("/exporter")
        );
        assert_eq!(
            parse_shell_command("clear the d drive folder list"),
            ShellCommand::Utterance("clear the d drive folder list")
        );
    }
}
