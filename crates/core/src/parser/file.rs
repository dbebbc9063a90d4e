use super::{cached_regex, clean_fragment, structured};
use crate::keywords::contains_keyword;
use crate::resolver::PathResolver;
use crate::types::{FileCommand, FileOperation, ParseOutcome};
use regex::Regex;
use serde::Deserialize;
use std::ops::Range;
use std::sync::OnceLock;

#[derive(Debug, Deserialize)]
struct FilePayload {
    operation: Option<String>,
    path: Option<String>,
    name: Option<String>,
    destination: Option<String>,
    content: Option<String>,
}

/// Words skipped in front of an operation's object ("delete *the file* x").
const OBJECT_FILLER: &[&str] = &[
    "the", "a", "an", "my", "this", "that", "new", "all", "of", "file", "files", "folder",
    "folders", "directory", "directories", "contents", "content", "everything",
];

/// Words that end an object and start another clause.
const CLAUSE_STOP: &[&str] = &[
    "in", "at", "on", "inside", "under", "from", "to", "into", "named", "called", "as", "with",
    "containing", "saying",
];

const TRAILING_NOUNS: &[&str] = &["folder", "directory", "file", "drive folder"];

fn operation_patterns(op: FileOperation) -> Option<&'static Regex> {
    static LIST: OnceLock<Option<Regex>> = OnceLock::new();
    static CREATE_FOLDER: OnceLock<Option<Regex>> = OnceLock::new();
    static CREATE_FILE: OnceLock<Option<Regex>> = OnceLock::new();
    static DELETE: OnceLock<Option<Regex>> = OnceLock::new();
    static COPY: OnceLock<Option<Regex>> = OnceLock::new();
    static MOVE: OnceLock<Option<Regex>> = OnceLock::new();
    static OPEN_FILE: OnceLock<Option<Regex>> = OnceLock::new();
    static SAVE_CONTENT: OnceLock<Option<Regex>> = OnceLock::new();

    match op {
        FileOperation::List => cached_regex(
            &LIST,
            r"(?i)\b(?:list|ls|contents\s+of|what'?s\s+in|show\s+(?:me\s+)?(?:the\s+)?(?:files|folders|contents))\b",
        ),
        FileOperation::CreateFolder => cached_regex(
            &CREATE_FOLDER,
            r"(?i)\b(?:(?:create|make|add)\s+(?:a\s+)?(?:new\s+)?(?:folder|directory)|new\s+(?:folder|directory)|mkdir)\b",
        ),
        FileOperation::CreateFile => cached_regex(
            &CREATE_FILE,
            r"(?i)\b(?:(?:create|make|add)\s+(?:a\s+)?(?:new\s+)?(?:\w+\s+)?file|new\s+file|touch)\b",
        ),
        FileOperation::Delete => {
            cached_regex(&DELETE, r"(?i)\b(?:delete|remove|erase|trash)\b")
        }
        FileOperation::Copy => cached_regex(&COPY, r"(?i)\b(?:copy|duplicate)\b"),
        FileOperation::Move => cached_regex(&MOVE, r"(?i)\b(?:move|rename)\b"),
        FileOperation::OpenFile => {
            cached_regex(&OPEN_FILE, r"(?i)\b(?:open|read|show|view|display)\b")
        }
        FileOperation::SaveContent => {
            cached_regex(&SAVE_CONTENT, r"(?i)\b(?:save|write|store|put)\b")
        }
    }
}

fn name_clause() -> Option<&'static Regex> {
    static NAME: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(
        &NAME,
        r#"(?i)\b(?:named|called|as)\s+"?([^"]+?)"?(?:\s+(?:in|at|on|inside|under|into|to|from|with|containing|saying)\b|$)"#,
    )
}

fn location_clause() -> Option<&'static Regex> {
    static LOCATION: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(
        &LOCATION,
        r"(?i)\b(?:in|at|on|inside|under|from)\s+(.+?)(?:\s+(?:named|called|as|to|into|with|containing|saying)\b|$)",
    )
}

fn destination_clause() -> Option<&'static Regex> {
    static DESTINATION: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(
        &DESTINATION,
        r"(?i)\b(?:to|into)\s+(.+?)(?:\s+(?:in|at|on|inside|under|with|containing|saying)\b|$)",
    )
}

fn content_clause() -> Option<&'static Regex> {
    static CONTENT: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(
        &CONTENT,
        r#"(?i)\b(?:saying|containing|with\s+(?:the\s+)?(?:content|text))\s+(?:"([^"]*)"|(.+)$)"#,
    )
}

fn quoted() -> Option<&'static Regex> {
    static QUOTED: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&QUOTED, r#""([^"]*)""#)
}

fn location_separator() -> Option<&'static Regex> {
    static SEPARATOR: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&SEPARATOR, r"(?i)\s+(?:in|inside|under)\s+")
}

/// Parses a file-system command.
///
/// The operation is the first entry of [`FileOperation::PRIORITY`] whose
/// keywords appear, so ties never depend on word order. Paths are composed
/// as `join(location, name)` and resolved through `resolver`.
pub fn parse_file_command(input: &str, resolver: &PathResolver) -> ParseOutcome<FileCommand> {
    if let Some(payload) = structured::<FilePayload>(input) {
        return from_payload(payload, resolver);
    }
    parse_natural(input, resolver)
}

fn from_payload(payload: FilePayload, resolver: &PathResolver) -> ParseOutcome<FileCommand> {
    let operation = payload.operation.as_deref().and_then(FileOperation::parse_name);
    let raw_path = resolver.join(
        payload.path.as_deref().unwrap_or_default(),
        payload.name.as_deref().unwrap_or_default(),
    );

    let command = FileCommand {
        operation: operation.unwrap_or(FileOperation::List),
        path: resolver.resolve(&raw_path),
        destination: payload.destination.as_deref().map(|d| resolver.resolve(d)),
        content: payload.content,
    };

    match (operation, raw_path.is_empty()) {
        (None, _) => ParseOutcome::defaulted(command, "unknown or missing operation, listing"),
        (Some(_), true) => ParseOutcome::defaulted(command, "no path given, using working directory"),
        (Some(_), false) => ParseOutcome::parsed(command),
    }
}

fn parse_natural(input: &str, resolver: &PathResolver) -> ParseOutcome<FileCommand> {
    let original = input.trim();
    let detected_op = FileOperation::PRIORITY
        .iter()
        .copied()
        .find(|op| operation_patterns(*op).is_some_and(|re| re.is_match(original)));

    // Content is free text; its prepositions must not be read as a location.
    let content = detected_op.and_then(|op| content_span(original, op));
    let masked = match &content {
        Some((span, _)) => blank(original, span.clone()),
        None => original.to_string(),
    };
    let text = masked.trim_end();
    let content = content.map(|(_, value)| value);

    let detected = FileOperation::PRIORITY.iter().find_map(|op| {
        operation_patterns(*op)
            .and_then(|re| re.find(text))
            .map(|m| (*op, m.end()))
    });

    let Some((operation, verb_end)) = detected else {
        let location = location(text, resolver).unwrap_or_default();
        let command = FileCommand {
            operation: FileOperation::List,
            path: resolver.resolve(&location),
            destination: None,
            content: None,
        };
        return ParseOutcome::defaulted(command, "no operation keyword, listing");
    };

    let name = capture(name_clause(), text);
    let object = object_after(&text[verb_end..]);
    let location = location(text, resolver);
    let destination_raw = match operation {
        FileOperation::Copy | FileOperation::Move | FileOperation::SaveContent => {
            capture(destination_clause(), text).map(|d| clean_segment(&d))
        }
        _ => None,
    };

    let target = match operation {
        // "save 'x' to notes.txt": the destination clause names the file.
        FileOperation::SaveContent => name.or(destination_raw.clone()).or(object),
        _ => name.or(object),
    };

    let raw_path = resolver.join(
        location.as_deref().unwrap_or_default(),
        target.as_deref().unwrap_or_default(),
    );

    let destination = match operation {
        FileOperation::Copy | FileOperation::Move => destination_raw.map(|dest| {
            // A bare new name ("rename a.txt to b.txt") stays beside the source.
            match &location {
                Some(loc) if !looks_like_location(&dest, resolver) => resolver.join(loc, &dest),
                _ => dest,
            }
        }),
        _ => None,
    };

    tracing::debug!(
        ?operation,
        path = %raw_path,
        destination = ?destination,
        "File command extracted"
    );

    let command = FileCommand {
        operation,
        path: resolver.resolve(&raw_path),
        destination: destination.as_deref().map(|d| resolver.resolve(d)),
        content,
    };

    if raw_path.is_empty() {
        return ParseOutcome::defaulted(command, "no path given, using working directory");
    }
    if matches!(operation, FileOperation::Copy | FileOperation::Move) && command.destination.is_none() {
        return ParseOutcome::defaulted(command, "no destination given");
    }
    ParseOutcome::parsed(command)
}

fn capture(re: Option<&'static Regex>, text: &str) -> Option<String> {
    re.and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| clean_fragment(m.as_str()))
        .filter(|s| !s.is_empty())
}

/// Location clause with nested "in X folder" segments folded into one path.
fn location(text: &str, resolver: &PathResolver) -> Option<String> {
    let raw = capture(location_clause(), text)?;

    let segments: Vec<String> = match location_separator() {
        Some(re) => re.split(&raw).map(clean_segment).collect(),
        None => vec![clean_segment(&raw)],
    };

    // Roots ("d drive", "D:\") go first whatever order they were spoken in.
    let (mut roots, rest): (Vec<String>, Vec<String>) = segments
        .into_iter()
        .filter(|s| !s.is_empty())
        .partition(|s| looks_like_location(s, resolver));
    roots.extend(rest);

    let joined = roots
        .iter()
        .fold(String::new(), |acc, seg| resolver.join(&acc, seg));
    (!joined.is_empty()).then_some(joined)
}

fn clean_segment(segment: &str) -> String {
    let mut cleaned = clean_fragment(segment);
    for article in ["the ", "my "] {
        if cleaned.to_lowercase().starts_with(article) {
            cleaned = cleaned[article.len()..].trim().to_string();
        }
    }
    for noun in TRAILING_NOUNS {
        let lowered = cleaned.to_lowercase();
        if lowered.len() > noun.len() && lowered.ends_with(noun) {
            let cut = cleaned.len() - noun.len();
            if cleaned[..cut].ends_with(' ') {
                cleaned = cleaned[..cut].trim().to_string();
            }
        }
    }
    cleaned
}

fn looks_like_location(text: &str, resolver: &PathResolver) -> bool {
    let lowered = text.to_lowercase();
    text.contains(['/', '\\', ':'])
        || resolver
            .shortcuts()
            .iter()
            .any(|s| contains_keyword(&lowered, &s.phrase))
}

/// First run of words after the operation keyword, skipping filler and
/// stopping at the next clause.
fn object_after(rest: &str) -> Option<String> {
    let mut words = Vec::new();
    let mut started = false;
    for word in rest.split_whitespace() {
        let lowered = word.to_lowercase();
        let bare = lowered.trim_matches(|c: char| !c.is_alphanumeric());
        if !started && OBJECT_FILLER.contains(&bare) {
            continue;
        }
        if CLAUSE_STOP.contains(&bare) {
            break;
        }
        started = true;
        words.push(word);
    }
    let object = clean_fragment(&words.join(" "));
    (!object.is_empty()).then_some(object)
}

/// Byte span of the content clause (or of the quoted text a save carries)
/// together with the content it holds.
fn content_span(text: &str, operation: FileOperation) -> Option<(Range<usize>, String)> {
    if let Some(caps) = content_clause().and_then(|re| re.captures(text)) {
        let whole = caps.get(0)?;
        let value = caps.get(1).or_else(|| caps.get(2))?;
        return Some((whole.range(), value.as_str().to_string()));
    }
    if operation == FileOperation::SaveContent {
        let caps = quoted().and_then(|re| re.captures(text))?;
        let whole = caps.get(0)?;
        let value = caps.get(1)?;
        return Some((whole.range(), value.as_str().to_string()));
    }
    None
}

/// `text` with `span` replaced by spaces; byte offsets outside it are unchanged.
fn blank(text: &str, span: Range<usize>) -> String {
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..span.start]);
    out.push_str(&" ".repeat(span.len()));
    out.push_str(&text[span.end..]);
    out
}
