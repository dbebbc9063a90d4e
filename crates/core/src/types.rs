use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability domain selected for an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    LaunchApp,
    WriteContent,
    FileOp,
    GenerateCode,
    Calculate,
    SystemControl,
}

impl Intent {
    pub const ALL: [Intent; 6] = [
        Intent::LaunchApp,
        Intent::WriteContent,
        Intent::FileOp,
        Intent::GenerateCode,
        Intent::Calculate,
        Intent::SystemControl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::LaunchApp => "launch_app",
            Intent::WriteContent => "write_content",
            Intent::FileOp => "file_op",
            Intent::GenerateCode => "generate_code",
            Intent::Calculate => "calculate",
            Intent::SystemControl => "system_control",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absolute, separator-normalized filesystem path.
///
/// Only [`crate::resolver::PathResolver`] builds these from free text, so the
/// wrapped string always uses the resolver's separator convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    pub(crate) fn new(path: String) -> Self {
        Self(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for CanonicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::path::Path> for CanonicalPath {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOperation {
    List,
    CreateFolder,
    CreateFile,
    Delete,
    Copy,
    Move,
    OpenFile,
    SaveContent,
}

impl FileOperation {
    /// Fixed priority order used to break keyword ties.
    pub const PRIORITY: [FileOperation; 8] = [
        FileOperation::List,
        FileOperation::CreateFolder,
        FileOperation::CreateFile,
        FileOperation::Delete,
        FileOperation::Copy,
        FileOperation::Move,
        FileOperation::OpenFile,
        FileOperation::SaveContent,
    ];

    /// Operations that modify the filesystem and must stay under an allowed root.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, FileOperation::List | FileOperation::OpenFile)
    }

    pub fn verb(&self) -> &'static str {
        match self {
            FileOperation::List => "list",
            FileOperation::CreateFolder | FileOperation::CreateFile => "create",
            FileOperation::Delete => "delete",
            FileOperation::Copy => "copy",
            FileOperation::Move => "move",
            FileOperation::OpenFile => "open",
            FileOperation::SaveContent => "save",
        }
    }

    pub fn parse_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "list" | "ls" => Some(FileOperation::List),
            "create_folder" | "mkdir" | "create_dir" => Some(FileOperation::CreateFolder),
            "create_file" | "touch" => Some(FileOperation::CreateFile),
            "delete" | "remove" => Some(FileOperation::Delete),
            "copy" => Some(FileOperation::Copy),
            "move" | "rename" => Some(FileOperation::Move),
            "open_file" | "open" | "read" => Some(FileOperation::OpenFile),
            "save_content" | "save" | "write" => Some(FileOperation::SaveContent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCommand {
    pub operation: FileOperation,
    pub path: CanonicalPath,
    pub destination: Option<CanonicalPath>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    Java,
    #[serde(rename = "c++")]
    Cpp,
    JavaScript,
}

impl Language {
    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "c++",
            Language::JavaScript => "javascript",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::JavaScript => "js",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Program used to display generated text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditorId(String);

impl EditorId {
    pub fn new(program: impl Into<String>) -> Self {
        Self(program.into())
    }

    pub fn program(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeGenCommand {
    pub language: Language,
    pub problem: String,
    pub editor: EditorId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalcCommand {
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppLaunchCommand {
    pub app_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteCommand {
    pub topic: String,
    pub editor: EditorId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemTarget {
    Brightness,
    Volume,
    Bluetooth,
}

impl fmt::Display for SystemTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SystemTarget::Brightness => "brightness",
            SystemTarget::Volume => "volume",
            SystemTarget::Bluetooth => "bluetooth",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    Enable,
    Disable,
}

/// Level targets take a [`Direction`], radios take a [`Toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "lowercase")]
pub enum SystemControlCommand {
    Brightness { direction: Direction },
    Volume { direction: Direction },
    Bluetooth { state: Toggle },
}

impl SystemControlCommand {
    pub fn target(&self) -> SystemTarget {
        match self {
            SystemControlCommand::Brightness { .. } => SystemTarget::Brightness,
            SystemControlCommand::Volume { .. } => SystemTarget::Volume,
            SystemControlCommand::Bluetooth { .. } => SystemTarget::Bluetooth,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum ParsedCommand {
    LaunchApp(AppLaunchCommand),
    WriteContent(WriteCommand),
    FileOp(FileCommand),
    GenerateCode(CodeGenCommand),
    Calculate(CalcCommand),
    SystemControl(SystemControlCommand),
}

impl ParsedCommand {
    pub fn intent(&self) -> Intent {
        match self {
            ParsedCommand::LaunchApp(_) => Intent::LaunchApp,
            ParsedCommand::WriteContent(_) => Intent::WriteContent,
            ParsedCommand::FileOp(_) => Intent::FileOp,
            ParsedCommand::GenerateCode(_) => Intent::GenerateCode,
            ParsedCommand::Calculate(_) => Intent::Calculate,
            ParsedCommand::SystemControl(_) => Intent::SystemControl,
        }
    }
}

/// Why a parser fell back to a default instead of a confident parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultReason(String);

impl DefaultReason {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DefaultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a best-effort parse. Parsers never fail; a guess is tagged
/// `Defaulted` so callers can tell it apart from a confident parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ParseOutcome<T> {
    Parsed { value: T },
    Defaulted { value: T, reason: DefaultReason },
}

impl<T> ParseOutcome<T> {
    pub fn parsed(value: T) -> Self {
        ParseOutcome::Parsed { value }
    }

    pub fn defaulted(value: T, reason: impl Into<String>) -> Self {
        ParseOutcome::Defaulted {
            value,
            reason: DefaultReason::new(reason),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            ParseOutcome::Parsed { value } | ParseOutcome::Defaulted { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            ParseOutcome::Parsed { value } | ParseOutcome::Defaulted { value, .. } => value,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, ParseOutcome::Defaulted { .. })
    }

    pub fn reason(&self) -> Option<&DefaultReason> {
        match self {
            ParseOutcome::Parsed { .. } => None,
            ParseOutcome::Defaulted { reason, .. } => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseOutcome<U> {
        match self {
            ParseOutcome::Parsed { value } => ParseOutcome::Parsed { value: f(value) },
            ParseOutcome::Defaulted { value, reason } => ParseOutcome::Defaulted {
                value: f(value),
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_serializes_snake_case() {
        let json = serde_json::to_string(&Intent::GenerateCode).unwrap();
        assert_eq!(json, "\"generate_code\"");
        let back: Intent = serde_json::from_str("\"system_control\"").unwrap();
        assert_eq!(back, Intent::SystemControl);
    }

    #[test]
    fn test_file_operation_names() {
        assert_eq!(
            FileOperation::parse_name("create folder"),
            Some(FileOperation::CreateFolder)
        );
        assert_eq!(FileOperation::parse_name("MOVE"), Some(FileOperation::Move));
        assert_eq!(FileOperation::parse_name("explode"), None);
    }

    #[test]
    fn test_mutating_operations() {
        assert!(!FileOperation::List.is_mutating());
        assert!(!FileOperation::OpenFile.is_mutating());
        assert!(FileOperation::Delete.is_mutating());
        assert!(FileOperation::CreateFolder.is_mutating());
    }

    #[test]
    fn test_parse_outcome_map_keeps_reason() {
        let outcome = ParseOutcome::defaulted(2, "no number found").map(|n| n * 10);
        assert_eq!(outcome.value(), &20);
        assert_eq!(outcome.reason().unwrap().as_str(), "no number found");
        assert!(outcome.is_defaulted());
    }
}
