use super::{clean_fragment, detect_editor, editor_keywords, structured};
use crate::keywords::{collapse_whitespace, contains_keyword, strip_keywords};
use crate::types::{CodeGenCommand, EditorId, Language, ParseOutcome};
use serde::Deserialize;

/// Checked in order; the first language with a matching keyword wins.
pub const LANGUAGES: &[(Language, &[&str])] = &[
    (Language::Python, &["python", "py"]),
    (Language::Java, &["java"]),
    (Language::Cpp, &["c++", "cpp"]),
    (Language::JavaScript, &["javascript", "js", "node"]),
];

const REQUEST_PHRASES: &[&str] = &[
    "code for",
    "program for",
    "script for",
    "function for",
    "code to",
    "program to",
    "script to",
    "function to",
    "code that",
    "program that",
];

const LEADING_NOISE: &[&str] = &[
    "please", "write", "generate", "create", "make", "give", "me", "a", "an", "the", "some",
    "code", "program", "script", "function", "for", "to",
];

const TRAILING_NOISE: &[&str] = &["in", "using", "with", "on", "and", "open", "code", "please"];

#[derive(Debug, Deserialize)]
struct CodePayload {
    language: Option<String>,
    problem: Option<String>,
    editor: Option<String>,
}

pub fn detect_language(lowered: &str) -> Option<Language> {
    LANGUAGES.iter().find_map(|(language, keywords)| {
        keywords
            .iter()
            .any(|kw| contains_keyword(lowered, kw))
            .then_some(*language)
    })
}

/// Parses a code generation request.
///
/// `language; problem; editor` is split on `;`. Without a delimiter the
/// whole input is the problem and language/editor names are picked out of
/// it. Missing fields fall back to Python and `default_editor`.
pub fn parse_code_command(input: &str, default_editor: &EditorId) -> ParseOutcome<CodeGenCommand> {
    if let Some(payload) = structured::<CodePayload>(input) {
        return from_fields(
            payload.language.as_deref(),
            payload.problem.as_deref().unwrap_or_default(),
            payload.editor.as_deref(),
            default_editor,
        );
    }

    if input.contains(';') {
        let mut fields = input.splitn(3, ';').map(str::trim);
        let language = fields.next().filter(|f| !f.is_empty());
        let problem = fields.next().unwrap_or_default();
        let editor = fields.next().filter(|f| !f.is_empty());
        return from_fields(language, problem, editor, default_editor);
    }

    let lowered = input.to_lowercase();
    let language = detect_language(&lowered);
    let editor = detect_editor(&lowered).map(|(editor, _)| editor);
    let problem = extract_problem(input);

    tracing::debug!(?language, ?editor, %problem, "Code request extracted");
    finish(language, problem, editor, default_editor)
}

fn from_fields(
    language: Option<&str>,
    problem: &str,
    editor: Option<&str>,
    default_editor: &EditorId,
) -> ParseOutcome<CodeGenCommand> {
    let language = language.and_then(|l| detect_language(&l.to_lowercase()));
    let editor = editor.map(|e| {
        detect_editor(&e.to_lowercase())
            .map(|(id, _)| id)
            .unwrap_or_else(|| EditorId::new(e.trim()))
    });
    finish(language, clean_fragment(problem), editor, default_editor)
}

fn finish(
    language: Option<Language>,
    problem: String,
    editor: Option<EditorId>,
    default_editor: &EditorId,
) -> ParseOutcome<CodeGenCommand> {
    let command = CodeGenCommand {
        language: language.unwrap_or_default(),
        problem,
        editor: editor.unwrap_or_else(|| default_editor.clone()),
    };

    if command.problem.is_empty() {
        ParseOutcome::defaulted(command, "no problem statement")
    } else if language.is_none() {
        ParseOutcome::defaulted(command, "language not stated, using python")
    } else {
        ParseOutcome::parsed(command)
    }
}

fn extract_problem(input: &str) -> String {
    let mut noise: Vec<&str> = LANGUAGES.iter().flat_map(|(_, kws)| kws.iter().copied()).collect();
    noise.extend(editor_keywords());
    noise.extend(REQUEST_PHRASES);
    // "notepad.exe" before "notepad", "ms word" before "word".
    noise.sort_by_key(|kw| std::cmp::Reverse(kw.len()));

    let stripped = strip_keywords(input, &noise);
    let mut words: Vec<&str> = stripped.split_whitespace().collect();

    while let Some(first) = words.first() {
        if LEADING_NOISE.contains(&first.to_lowercase().as_str()) {
            words.remove(0);
        } else {
            break;
        }
    }
    while let Some(last) = words.last() {
        if TRAILING_NOISE.contains(&last.to_lowercase().as_str()) {
            words.pop();
        } else {
            break;
        }
    }

    clean_fragment(&collapse_whitespace(&words.join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notepad() -> EditorId {
        EditorId::new("notepad.exe")
    }

    #[test]
    fn test_keyword_scan() {
        let outcome = parse_code_command("write python code for fibonacci in notepad", &notepad());
        assert!(!outcome.is_defaulted());
        let cmd = outcome.into_value();
        assert_eq!(cmd.language, Language::Python);
        assert_eq!(cmd.problem, "fibonacci");
        assert_eq!(cmd.editor, notepad());
    }

    #[test]
    fn test_java_is_not_javascript() {
        let cmd = parse_code_command("JavaScript function to debounce events", &notepad()).into_value();
        assert_eq!(cmd.language, Language::JavaScript);
        assert_eq!(cmd.problem, "debounce events");

        let cmd = parse_code_command("generate a Java program to reverse a string in wordpad", &notepad())
            .into_value();
        assert_eq!(cmd.language, Language::Java);
        assert_eq!(cmd.problem, "reverse a string");
        assert_eq!(cmd.editor, EditorId::new("wordpad.exe"));
    }

    #[test]
    fn test_delimited_fields() {
        let cmd = parse_code_command("c++; binary search over a sorted vector; word", &notepad())
            .into_value();
        assert_eq!(cmd.language, Language::Cpp);
        assert_eq!(cmd.problem, "binary search over a sorted vector");
        assert_eq!(cmd.editor, EditorId::new("winword.exe"));
    }

    #[test]
    fn test_delimited_missing_fields_use_defaults() {
        let outcome = parse_code_command("; bubble sort", &notepad());
        assert!(outcome.is_defaulted());
        let cmd = outcome.into_value();
        assert_eq!(cmd.language, Language::Python);
        assert_eq!(cmd.problem, "bubble sort");
        assert_eq!(cmd.editor, notepad());
    }

    #[test]
    fn test_unknown_editor_field_kept_verbatim() {
        let cmd = parse_code_command("python; hello world; mousepad", &notepad()).into_value();
        assert_eq!(cmd.editor, EditorId::new("mousepad"));
    }

    #[test]
    fn test_no_language_is_defaulted() {
        let outcome = parse_code_command("write code to open a file", &notepad());
        assert!(outcome.is_defaulted());
        assert_eq!(outcome.value().language, Language::Python);
        assert_eq!(outcome.value().problem, "open a file");
    }

    #[test]
    fn test_structured_payload() {
        let outcome = parse_code_command(
            r#"{"language": "javascript", "problem": "fizzbuzz", "editor": "notepad"}"#,
            &EditorId::new("gedit"),
        );
        assert!(!outcome.is_defaulted());
        let cmd = outcome.into_value();
        assert_eq!(cmd.language, Language::JavaScript);
        assert_eq!(cmd.problem, "fizzbuzz");
        assert_eq!(cmd.editor, notepad());
    }
}
