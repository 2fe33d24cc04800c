//! Conservative cleanup of text extracted from PDFs
//!
//! Each step is a pure `&str -> String` function and can be called on its own.
//! [`clean_extracted_text`] composes them in the only order that works:
//! hyphenation repair needs `\n` as the sole line separator and needs to see
//! the indentation after the break, so it runs after newline normalization and
//! before inline whitespace is collapsed.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::CleaningConfig;
use crate::error::{Error, Result};

/// Non-breaking space
const NBSP: char = '\u{00A0}';
/// Zero-width space
const ZERO_WIDTH_SPACE: char = '\u{200B}';
/// Soft hyphen
const SOFT_HYPHEN: char = '\u{00AD}';

/// Default number of consecutive line feeds kept by [`collapse_blank_lines`]
pub const DEFAULT_MAX_BLANK_LINES: usize = 2;

static HYPHENATED_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\p{Alphabetic})-\n[ \t]*(\p{Alphabetic})").expect("valid hyphenation pattern")
});

static INLINE_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("valid whitespace pattern"));

static LINE_FEED_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n+").expect("valid line feed pattern"));

/// Replace NBSP with a plain space and drop zero-width spaces and soft hyphens.
pub fn normalize_unicode_whitespace(text: &str) -> String {
    text.chars()
        .filter(|&c| c != ZERO_WIDTH_SPACE && c != SOFT_HYPHEN)
        .map(|c| if c == NBSP { ' ' } else { c })
        .collect()
}

/// Convert Windows (`\r\n`) and classic Mac (`\r`) line endings to `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Join words split across a line break by hyphenation.
///
/// `"exac-\n erbation"` becomes `"exacerbation"`. Only letter-hyphen-newline-letter
/// is joined, so numeric ranges such as `"1-\n2"` are left alone.
pub fn fix_hyphenation_linebreaks(text: &str) -> String {
    HYPHENATED_BREAK.replace_all(text, "${1}${2}").into_owned()
}

/// Collapse runs of spaces and tabs to a single space. Line feeds are kept.
pub fn collapse_inline_whitespace(text: &str) -> String {
    INLINE_WHITESPACE.replace_all(text, " ").into_owned()
}

/// Reduce runs of more than `max_consecutive` line feeds to exactly that many,
/// then trim the result.
pub fn collapse_blank_lines(text: &str, max_consecutive: usize) -> Result<String> {
    if max_consecutive < 1 {
        return Err(Error::invalid_argument("max_consecutive must be >= 1"));
    }
    Ok(cap_line_feed_runs(text, max_consecutive))
}

/// Caller guarantees `max_consecutive >= 1`
fn cap_line_feed_runs(text: &str, max_consecutive: usize) -> String {
    LINE_FEED_RUN
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let run = &caps[0];
            if run.len() <= max_consecutive {
                run.to_string()
            } else {
                "\n".repeat(max_consecutive)
            }
        })
        .trim()
        .to_string()
}

/// Full cleaning pipeline with the default blank-line limit.
pub fn clean_extracted_text(text: &str) -> String {
    TextCleaner::default().clean(text)
}

/// Cleaning pipeline with a configured blank-line limit
#[derive(Debug, Clone, Copy)]
pub struct TextCleaner {
    max_blank_lines: usize,
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self {
            max_blank_lines: DEFAULT_MAX_BLANK_LINES,
        }
    }
}

impl TextCleaner {
    /// Create a cleaner; fails when `max_blank_lines` is zero
    pub fn new(max_blank_lines: usize) -> Result<Self> {
        if max_blank_lines < 1 {
            return Err(Error::invalid_argument("max_blank_lines must be >= 1"));
        }
        Ok(Self { max_blank_lines })
    }

    /// Create a cleaner from configuration
    pub fn from_config(config: &CleaningConfig) -> Result<Self> {
        Self::new(config.max_blank_lines)
    }

    pub fn max_blank_lines(&self) -> usize {
        self.max_blank_lines
    }

    /// Apply every cleaning step in order
    pub fn clean(&self, text: &str) -> String {
        let text = normalize_unicode_whitespace(text);
        let text = normalize_newlines(&text);
        let text = fix_hyphenation_linebreaks(&text);
        let text = collapse_inline_whitespace(&text);
        cap_line_feed_runs(&text, self.max_blank_lines)
    }
}
