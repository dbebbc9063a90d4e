use super::{cached_regex, clean_fragment, detect_editor, editor_keywords, structured};
use crate::keywords::strip_keywords;
use crate::types::{EditorId, ParseOutcome, WriteCommand};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

const VERBS: &[&str] = &["please", "write", "compose", "draft", "create", "generate"];
const DANGLING: &[&str] = &["in", "using", "with", "and", "open", "then", "on"];

#[derive(Debug, Deserialize)]
struct WritePayload {
    topic: String,
    editor: Option<String>,
}

fn topic_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(
        &RE,
        r"(?i)\b(?:write|compose|draft|create|generate)\b.*?\b(?:about|on|regarding|describing)\s+(.+)",
    )
}

/// Extracts the topic of a writing request and the editor to show it in.
pub fn parse_write_command(input: &str, default_editor: &EditorId) -> ParseOutcome<WriteCommand> {
    if let Some(payload) = structured::<WritePayload>(input) {
        let editor = payload
            .editor
            .as_deref()
            .and_then(|e| detect_editor(&e.to_lowercase()))
            .map(|(id, _)| id)
            .unwrap_or_else(|| default_editor.clone());
        return finish(clean_fragment(&payload.topic), editor, true);
    }

    let editor = detect_editor(&input.to_lowercase())
        .map(|(id, _)| id)
        .unwrap_or_else(|| default_editor.clone());

    let mut noise = editor_keywords();
    noise.sort_by_key(|kw| std::cmp::Reverse(kw.len()));
    let text = strip_keywords(input, &noise);

    let clause = topic_regex()
        .and_then(|re| re.captures(&text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    match clause {
        Some(topic) => finish(trim_dangling(&topic), editor, true),
        None => finish(trim_dangling(&strip_keywords(&text, VERBS)), editor, false),
    }
}

fn finish(topic: String, editor: EditorId, had_clause: bool) -> ParseOutcome<WriteCommand> {
    let command = WriteCommand { topic, editor };
    if command.topic.is_empty() {
        ParseOutcome::defaulted(command, "no topic given")
    } else if !had_clause {
        ParseOutcome::defaulted(command, "no about-clause, using the whole request as topic")
    } else {
        ParseOutcome::parsed(command)
    }
}

fn trim_dangling(text: &str) -> String {
    let mut words: Vec<&str> = text.split_whitespace().collect();
    while words
        .last()
        .is_some_and(|w| DANGLING.contains(&w.to_lowercase().as_str()))
    {
        words.pop();
    }
    while words
        .first()
        .is_some_and(|w| DANGLING.contains(&w.to_lowercase().as_str()))
    {
        words.remove(0);
    }
    clean_fragment(&words.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notepad() -> EditorId {
        EditorId::new("notepad.exe")
    }

    #[test]
    fn test_topic_after_about() {
        let outcome = parse_write_command("write an essay about Climate Change", &notepad());
        assert!(!outcome.is_defaulted());
        let cmd = outcome.into_value();
        assert_eq!(cmd.topic, "Climate Change");
        assert_eq!(cmd.editor, notepad());
    }

    #[test]
    fn test_editor_mentions_removed() {
        let cmd = parse_write_command("open wordpad.exe and write about the sea", &notepad())
            .into_value();
        assert_eq!(cmd.topic, "the sea");
        assert_eq!(cmd.editor, EditorId::new("wordpad.exe"));

        let cmd = parse_write_command("compose a poem on autumn leaves in ms word", &notepad())
            .into_value();
        assert_eq!(cmd.topic, "autumn leaves");
        assert_eq!(cmd.editor, EditorId::new("winword.exe"));
    }

    #[test]
    fn test_without_clause_is_defaulted() {
        let outcome = parse_write_command("write a haiku", &EditorId::new("gedit"));
        assert!(outcome.is_defaulted());
        assert_eq!(outcome.value().topic, "a haiku");
        assert_eq!(outcome.value().editor, EditorId::new("gedit"));
    }

    #[test]
    fn test_structured_payload() {
        let outcome = parse_write_command(r#"{"topic": "rust", "editor": "kate"}"#, &notepad());
        assert!(!outcome.is_defaulted());
        assert_eq!(outcome.value().editor, EditorId::new("kate"));
    }
}
