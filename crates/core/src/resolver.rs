//! Natural-language location references to canonical filesystem paths.

use crate::keywords::find_keyword;
use crate::types::CanonicalPath;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Working directory unavailable: {0}")]
    WorkingDirectory(#[from] std::io::Error),
    #[error("Home directory unavailable")]
    HomeUnavailable,
}

/// Separator and absolute-path convention used when building paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    Windows,
    Posix,
}

impl PathStyle {
    pub fn host() -> Self {
        if cfg!(windows) {
            PathStyle::Windows
        } else {
            PathStyle::Posix
        }
    }

    pub fn separator(&self) -> char {
        match self {
            PathStyle::Windows => '\\',
            PathStyle::Posix => '/',
        }
    }

    pub fn is_absolute(&self, path: &str) -> bool {
        match self {
            PathStyle::Windows => has_drive_prefix(path) || is_unc(path),
            PathStyle::Posix => path.starts_with('/'),
        }
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn is_unc(path: &str) -> bool {
    path.starts_with("\\\\") || path.starts_with("//")
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// A phrase such as "d drive" that stands for a filesystem root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveShortcut {
    pub phrase: String,
    pub root: String,
}

impl DriveShortcut {
    pub fn new(phrase: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into().to_lowercase(),
            root: root.into(),
        }
    }

    pub fn windows_defaults() -> Vec<Self> {
        vec![
            Self::new("d drive", "D:\\"),
            Self::new("e drive", "E:\\"),
            Self::new("d-desk", "D:\\"),
            Self::new("e-desk", "E:\\"),
            Self::new("c drive", "C:\\"),
        ]
    }

    pub fn posix_defaults(home: &str) -> Vec<Self> {
        let home = home.trim_end_matches('/');
        vec![
            Self::new("home folder", home),
            Self::new("home", home),
            Self::new("desktop", format!("{}/Desktop", home)),
            Self::new("documents", format!("{}/Documents", home)),
            Self::new("downloads", format!("{}/Downloads", home)),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    style: PathStyle,
    shortcuts: Vec<DriveShortcut>,
    base_dir: Option<String>,
    allowed_roots: Vec<String>,
}

impl PathResolver {
    pub fn new(style: PathStyle, shortcuts: Vec<DriveShortcut>) -> Self {
        Self {
            style,
            shortcuts,
            base_dir: None,
            allowed_roots: Vec::new(),
        }
    }

    /// Resolve relative paths against `dir` instead of the process working directory.
    pub fn with_base_dir(mut self, dir: impl Into<String>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn with_allowed_roots(mut self, roots: Vec<String>) -> Self {
        self.allowed_roots = roots;
        self
    }

    pub fn style(&self) -> PathStyle {
        self.style
    }

    pub fn shortcuts(&self) -> &[DriveShortcut] {
        &self.shortcuts
    }

    pub fn allowed_roots(&self) -> &[String] {
        &self.allowed_roots
    }

    /// Never fails: on an internal error the input comes back unchanged.
    pub fn resolve(&self, raw: &str) -> CanonicalPath {
        match self.try_resolve(raw) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(input = %raw, error = %e, "Path resolution degraded, returning input");
                CanonicalPath::new(raw.to_string())
            }
        }
    }

    pub fn try_resolve(&self, raw: &str) -> Result<CanonicalPath, ResolveError> {
        let trimmed = raw.trim();

        // Absolute input is already canonical modulo cleanup; substituting
        // shortcuts there would rewrite real directory names.
        let substituted = if self.style.is_absolute(trimmed) {
            trimmed.to_string()
        } else {
            self.substitute_shortcut(trimmed)
        };

        let expanded = self.expand_home(&substituted)?;
        let normalized: String = expanded
            .chars()
            .map(|c| if is_separator(c) { self.style.separator() } else { c })
            .collect();

        let absolute = if self.style.is_absolute(&normalized) {
            normalized
        } else {
            self.join_base(&normalized)?
        };

        let canonical = self.clean(&absolute);
        tracing::debug!(input = %raw, resolved = %canonical, "Resolved path");
        Ok(CanonicalPath::new(canonical))
    }

    /// True when `path` equals or sits below one of the allowed roots.
    /// With no roots configured nothing is allowed.
    pub fn is_allowed(&self, path: &CanonicalPath) -> bool {
        let candidate = self.fold_case(path.as_str());
        self.allowed_roots.iter().any(|root| {
            let root = self.fold_case(self.resolve(root).as_str());
            if candidate == root {
                return true;
            }
            let mut prefix = root;
            if !prefix.ends_with(self.style.separator()) {
                prefix.push(self.style.separator());
            }
            candidate.starts_with(&prefix)
        })
    }

    /// True when `path` is one of the allowed roots itself rather than
    /// something below it.
    pub fn is_allowed_root(&self, path: &CanonicalPath) -> bool {
        let candidate = self.fold_case(path.as_str());
        let sep = self.style.separator();
        self.allowed_roots.iter().any(|root| {
            let root = self.fold_case(self.resolve(root).as_str());
            candidate.trim_end_matches(sep) == root.trim_end_matches(sep)
        })
    }

    /// Joins a location clause and a name clause with the style separator.
    pub fn join(&self, location: &str, name: &str) -> String {
        let location = location.trim();
        let name = name.trim();
        if location.is_empty() {
            return name.to_string();
        }
        if name.is_empty() {
            return location.to_string();
        }
        format!("{}{}{}", location, self.style.separator(), name)
    }

    fn fold_case(&self, path: &str) -> String {
        match self.style {
            PathStyle::Windows => path.to_lowercase(),
            PathStyle::Posix => path.to_string(),
        }
    }

    fn substitute_shortcut(&self, input: &str) -> String {
        let lowered = input.to_lowercase();
        // Offsets from the lowered copy are only valid if lower-casing kept byte lengths.
        let source = if lowered.len() == input.len() { input } else { lowered.as_str() };

        for shortcut in &self.shortcuts {
            if let Some(at) = find_keyword(&lowered, &shortcut.phrase) {
                let rest = &source[at + shortcut.phrase.len()..];
                tracing::debug!(phrase = %shortcut.phrase, root = %shortcut.root, "Drive shortcut matched");
                // Anything before the phrase is relative phrasing ("the", "my").
                return format!("{}{}{}", shortcut.root, self.style.separator(), rest.trim());
            }
        }
        input.to_string()
    }

    fn expand_home(&self, path: &str) -> Result<String, ResolveError> {
        if self.style != PathStyle::Posix {
            return Ok(path.to_string());
        }
        if path == "~" || path.starts_with("~/") {
            let home = std::env::var("HOME").map_err(|_| ResolveError::HomeUnavailable)?;
            return Ok(format!("{}{}", home, &path[1..]));
        }
        Ok(path.to_string())
    }

    fn join_base(&self, relative: &str) -> Result<String, ResolveError> {
        let base = match &self.base_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?.to_string_lossy().to_string(),
        };

        let sep = self.style.separator();
        if self.style == PathStyle::Windows && relative.starts_with(sep) && has_drive_prefix(&base) {
            return Ok(format!("{}{}", &base[..2], relative));
        }
        Ok(format!("{}{}{}", base, sep, relative))
    }

    /// Lexical cleanup: collapses separators, drops `.`, applies `..` without
    /// climbing past the root, upper-cases drive letters and gives bare drive
    /// roots their trailing separator.
    fn clean(&self, path: &str) -> String {
        let sep = self.style.separator();
        let (prefix, rest) = match self.style {
            PathStyle::Windows if has_drive_prefix(path) => {
                let letter = path[..1].to_ascii_uppercase();
                (format!("{}:{}", letter, sep), &path[2..])
            }
            PathStyle::Windows if is_unc(path) => (format!("{}{}", sep, sep), &path[2..]),
            PathStyle::Posix if path.starts_with('/') => (sep.to_string(), &path[1..]),
            _ => (String::new(), path),
        };

        let mut components: Vec<&str> = Vec::new();
        for part in rest.split(is_separator).map(str::trim) {
            match part {
                "" | "." => {}
                ".." => {
                    components.pop();
                }
                other => components.push(other),
            }
        }

        format!("{}{}", prefix, components.join(&sep.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn windows() -> PathResolver {
        PathResolver::new(PathStyle::Windows, DriveShortcut::windows_defaults())
            .with_base_dir("C:\\work")
            .with_allowed_roots(vec!["D:\\".to_string(), "E:\\".to_string()])
    }

    fn posix() -> PathResolver {
        PathResolver::new(PathStyle::Posix, DriveShortcut::posix_defaults("/home/ada"))
            .with_base_dir("/srv/work")
            .with_allowed_roots(vec!["/home/ada".to_string()])
    }

    #[test]
    fn test_drive_shortcut_substitution() {
        let r = windows();
        assert_eq!(r.resolve("D drive").as_str(), "D:\\");
        assert_eq!(r.resolve("d drive/Reports").as_str(), "D:\\Reports");
        assert_eq!(r.resolve("the e-desk\\projects\\rust").as_str(), "E:\\projects\\rust");
    }

    #[test]
    fn test_first_shortcut_wins() {
        let r = PathResolver::new(
            PathStyle::Windows,
            vec![DriveShortcut::new("d drive", "D:\\"), DriveShortcut::new("drive", "Z:\\")],
        )
        .with_base_dir("C:\\work");
        assert_eq!(r.resolve("d drive").as_str(), "D:\\");
    }

    #[test]
    fn test_relative_paths_join_base() {
        assert_eq!(windows().resolve("notes\\todo.txt").as_str(), "C:\\work\\notes\\todo.txt");
        assert_eq!(windows().resolve("\\temp").as_str(), "C:\\temp");
        assert_eq!(posix().resolve("notes/todo.txt").as_str(), "/srv/work/notes/todo.txt");
        assert_eq!(posix().resolve("").as_str(), "/srv/work");
    }

    #[test]
    fn test_bare_drive_gets_trailing_separator() {
        assert_eq!(windows().resolve("d:").as_str(), "D:\\");
        assert_eq!(windows().resolve("e:/").as_str(), "E:\\");
    }

    #[test]
    fn test_separators_and_dots_normalized() {
        assert_eq!(windows().resolve("D:/a//b/./c/../d").as_str(), "D:\\a\\b\\d");
        assert_eq!(posix().resolve("/a\\b//c/..").as_str(), "/a/b");
        assert_eq!(posix().resolve("/../..").as_str(), "/");
    }

    #[test]
    fn test_absolute_input_keeps_shortcut_words() {
        let r = posix();
        assert_eq!(r.resolve("/data/desktop/home").as_str(), "/data/desktop/home");
        assert_eq!(r.resolve("desktop/todo").as_str(), "/home/ada/Desktop/todo");
    }

    #[test]
    fn test_allow_list() {
        let r = windows();
        assert!(r.is_allowed(&r.resolve("D:\\Reports")));
        assert!(r.is_allowed(&r.resolve("d:\\")));
        assert!(!r.is_allowed(&r.resolve("C:\\Windows")));
        assert_eq!(r.resolve("D:\\..\\secret").as_str(), "D:\\secret");

        let p = posix();
        assert!(p.is_allowed(&p.resolve("/home/ada/notes")));
        assert!(!p.is_allowed(&p.resolve("/home/adam")));
        assert!(!p.is_allowed(&p.resolve("/home/ada/../bob")));

        assert!(r.is_allowed_root(&r.resolve("D drive")));
        assert!(!r.is_allowed_root(&r.resolve("D:\\Reports")));
        assert!(p.is_allowed_root(&p.resolve("/home/ada/")));
    }

    #[test]
    fn test_empty_allow_list_denies() {
        let r = PathResolver::new(PathStyle::Posix, Vec::new()).with_base_dir("/");
        assert!(!r.is_allowed(&r.resolve("/tmp")));
    }

    proptest! {
        #[test]
        fn prop_windows_resolve_is_idempotent(raw in "[a-zA-Z0-9 ._:~/\\\\-]{0,40}") {
            let r = windows();
            let once = r.resolve(&raw);
            prop_assert_eq!(r.resolve(once.as_str()), once);
        }

        #[test]
        fn prop_posix_resolve_is_idempotent(raw in "[a-zA-Z0-9 ._/\\\\-]{0,40}") {
            let r = posix();
            let once = r.resolve(&raw);
            prop_assert_eq!(r.resolve(once.as_str()), once);
        }
    }
}
