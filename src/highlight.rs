//! Wrap piped text in a fenced code block so Mattermost renders it with syntax
//! highlighting.
//!
//! The language is either named explicitly or guessed by a
//! [LanguageDetector]. Guessing is best-effort: a wrong guess only changes the
//! colours.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use syntect::parsing::{SyntaxReference, SyntaxSet};
use thiserror::Error;
use tracing::debug;

/// How, if at all, piped text should be fenced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HighlightMode {
    /// Pass text through untouched.
    No,
    /// Guess the language.
    Auto,
    /// Use this literal language tag.
    Language(String),
}

impl From<&str> for HighlightMode {
    fn from(x: &str) -> Self {
        match x.trim() {
            "no" => HighlightMode::No,
            "auto" | "" => HighlightMode::Auto,
            tag => HighlightMode::Language(tag.to_owned()),
        }
    }
}

impl fmt::Display for HighlightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightMode::No => write!(f, "no"),
            HighlightMode::Auto => write!(f, "auto"),
            HighlightMode::Language(tag) => write!(f, "{}", tag),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Empty content provided")]
pub struct EmptyContent;

/// Anything that can guess a fence tag for a piece of source code.
pub trait LanguageDetector {
    fn detect(&self, content: &str) -> Option<String>;
}

/// Apply `mode` to `content`. Whitespace-only content is refused whatever the
/// mode, including [HighlightMode::No].
///
/// ```
/// let x = format("print('hi')", &HighlightMode::Language("python".into()), &Heuristics);
/// assert_eq!(x, Ok("```python\nprint('hi')\n```".into()));
/// ```
pub fn format(
    content: &str,
    mode: &HighlightMode,
    detector: &dyn LanguageDetector,
) -> Result<String, EmptyContent> {
    if content.trim().is_empty() {
        return Err(EmptyContent);
    }

    match mode {
        HighlightMode::No => Ok(content.to_owned()),
        HighlightMode::Language(tag) => Ok(fence(tag, content)),
        HighlightMode::Auto => {
            let tag = detector.detect(content).unwrap_or_default();
            debug!("Detected language {:?}", tag);
            Ok(fence(&tag, content))
        }
    }
}

fn fence(tag: &str, content: &str) -> String {
    format!("```{}\n{}\n```", tag, content)
}

/// A keyword-scoring rule for one language. Each pattern that matches anywhere
/// in the content scores a point.
struct Rule {
    tag: &'static str,
    patterns: Vec<Regex>,
}

// Earlier rules win ties.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    let table: &[(&'static str, &[&str])] = &[
        (
            "python",
            &[
                r"(?m)^\s*def\s+\w+\s*\(.*\)\s*(->\s*[^:]+)?:\s*$",
                r"(?m)^\s*(import\s+[\w.]+|from\s+[\w.]+\s+import\s+.+)\s*$",
                r"\b(True|False|None)\b",
                r"(?m)^\s*(elif|except)\b.*:\s*$",
                r"(?m)^\s*class\s+\w+(\(.*\))?:\s*$",
            ],
        ),
        (
            "rust",
            &[
                r"\bfn\s+\w+\s*[<(]",
                r"\blet\s+mut\b",
                r"(?m)^\s*use\s+\w+(::[\w{}*, ]+)+;",
                r"(?m)^\s*(pub\s+)?(struct|enum|trait|impl)\b",
                r"\w+!\(",
            ],
        ),
        (
            "go",
            &[
                r"(?m)^package\s+\w+\s*$",
                r"\bfunc\s+(\(\w+\s+\*?\w+\)\s*)?\w+\s*\(",
                r"\w+\s*:=",
                r"\bfmt\.\w+\(",
            ],
        ),
        (
            "javascript",
            &[
                r"\b(const|let|var)\s+\w+\s*=",
                r"\bfunction\s*\w*\s*\(",
                r"=>",
                r"\bconsole\.\w+\(",
                r"\brequire\(",
            ],
        ),
        (
            "java",
            &[
                r"\bpublic\s+(static\s+)?(final\s+)?(class|void|interface)\b",
                r"\bSystem\.out\.print",
                r"(?m)^\s*import\s+java\.",
            ],
        ),
        (
            "c",
            &[
                r#"(?m)^\s*#include\s*[<"]"#,
                r"\bint\s+main\s*\(",
                r"\bprintf\s*\(",
            ],
        ),
        (
            "bash",
            &[
                r"(?m)^\s*(if\s+\[|then|fi|done|esac)\b",
                r"\$\{\w+\}",
                r"(?m)^\s*(echo|export|cd|sudo|apt-get|curl)\s",
            ],
        ),
        (
            "sql",
            &[
                r"(?im)^\s*select\s+.+\s+from\s+\w+",
                r"(?im)^\s*insert\s+into\s+\w+",
                r"(?im)^\s*(create|alter|drop)\s+table\b",
                r"(?im)^\s*(update\s+\w+\s+set|delete\s+from)\b",
            ],
        ),
        (
            "diff",
            &[r"(?m)^(\+\+\+|---) \S", r"(?m)^@@ -\d+(,\d+)? \+\d+"],
        ),
        (
            "html",
            &[
                r"(?i)<!doctype\s+html",
                r"(?i)<(html|head|body|div|span|p|a|ul|li)\b[^>]*>",
                r"</\w+>",
            ],
        ),
        (
            "yaml",
            &[r"(?m)^---\s*$", r"(?m)^\s*[\w-]+:\s+\S", r"(?m)^\s*-\s+[\w-]+:"],
        ),
    ];

    table
        .iter()
        .map(|&(tag, patterns)| Rule {
            tag,
            patterns: patterns
                .iter()
                .map(|p| Regex::new(p).expect("language rule pattern compiles"))
                .collect(),
        })
        .collect()
});

/// Syntect's bundled syntaxes, only loaded if something needs guessing.
static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// The built-in [LanguageDetector]:
///
/// 1. a first-line match against syntect's bundled syntaxes (shebangs,
///    `<?xml`, editor modelines),
/// 2. anything that parses as a JSON object or array,
/// 3. the best-scoring keyword [Rule].
pub struct Heuristics;

impl Heuristics {
    fn by_first_line(&self, content: &str) -> Option<String> {
        let line = content.lines().find(|l| !l.trim().is_empty())?;
        SYNTAXES.find_syntax_by_first_line(line).map(fence_tag)
    }
}

impl LanguageDetector for Heuristics {
    fn detect(&self, content: &str) -> Option<String> {
        if let Some(tag) = self.by_first_line(content) {
            return Some(tag);
        }

        let trimmed = content.trim();
        if (trimmed.starts_with('{') || trimmed.starts_with('['))
            && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
        {
            return Some("json".into());
        }

        by_rules(content).map(str::to_owned)
    }
}

fn by_rules(content: &str) -> Option<&'static str> {
    let mut best: Option<(&'static str, usize)> = None;

    for rule in RULES.iter() {
        let score = rule.patterns.iter().filter(|p| p.is_match(content)).count();
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((rule.tag, score));
        }
    }

    best.map(|(tag, _)| tag)
}

/// Single-word syntax names make the most readable tags (`Python` ->
/// `python`); anything else falls back to its first file extension.
fn fence_tag(syntax: &SyntaxReference) -> String {
    let name = syntax.name.to_lowercase();

    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '#') {
        name
    } else {
        syntax.file_extensions.first().cloned().unwrap_or(name)
    }
}
