//! Recover identifiers from what the tool prints on stderr.
//!
//! gpg has no structured output for verify and import, so callers go through
//! [`DiagnosticScraper`] and never see which text format is being read.

use serde::{Deserialize, Serialize};

/// Pulls signer and key identifiers out of a finished run's diagnostics.
///
/// Implementations never fail: an identifier that cannot be found is `None`.
pub trait DiagnosticScraper: Send + Sync {
    /// Arguments the scraper needs on verify and import invocations.
    fn extra_args(&self) -> &'static [&'static str] {
        &[]
    }

    fn signer_id(&self, diagnostics: &str) -> Option<String>;

    fn imported_key_id(&self, diagnostics: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticMode {
    /// Human-readable messages, locale and version dependent.
    #[default]
    Text,
    /// `--status-fd` lines.
    Status,
}

impl DiagnosticMode {
    pub fn scraper(self) -> Box<dyn DiagnosticScraper> {
        match self {
            DiagnosticMode::Text => Box::new(TextScraper),
            DiagnosticMode::Status => Box::new(StatusScraper),
        }
    }
}

const SIGNER_MARKER: &str = "using ";
const IMPORT_MARKERS: [&str; 2] = ["public key", "not changed"];
const KEY_MARKER: &str = "key ";

fn trailing_token(line: &str) -> Option<String> {
    let token =
        line.split_whitespace().last()?.trim_end_matches(|c: char| c.is_ascii_punctuation());
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Reads English gpg messages such as `gpg:                using RSA key 0123...`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextScraper;

impl DiagnosticScraper for TextScraper {
    fn signer_id(&self, diagnostics: &str) -> Option<String> {
        diagnostics.lines().find_map(|line| {
            let (_, rest) = line.split_once(SIGNER_MARKER)?;
            let mut words = rest.split_whitespace();
            let _algorithm = words.next()?;
            if words.next()? != "key" {
                return None;
            }
            trailing_token(line)
        })
    }

    // gpg: key 0123456789ABCDEF: public key "Foo <foo@example.org>" imported
    // gpg: key 0123456789ABCDEF: "Foo <foo@example.org>" not changed
    fn imported_key_id(&self, diagnostics: &str) -> Option<String> {
        diagnostics
            .lines()
            .filter(|line| IMPORT_MARKERS.iter().any(|m| line.contains(m)))
            .find_map(|line| {
                let (_, rest) = line.split_once(KEY_MARKER)?;
                let id = rest.split_whitespace().next()?.strip_suffix(':')?;
                if id.is_empty() {
                    None
                } else {
                    Some(id.to_string())
                }
            })
    }
}

const STATUS_PREFIX: &str = "[GNUPG:] ";

fn status_field(diagnostics: &str, keyword: &str, index: usize) -> Option<String> {
    diagnostics.lines().find_map(|line| {
        let mut words = line.strip_prefix(STATUS_PREFIX)?.split_whitespace();
        if words.next()? != keyword {
            return None;
        }
        words.nth(index).map(|w| w.to_string())
    })
}

/// Reads `--status-fd 2` lines, which stay stable across locales.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusScraper;

impl DiagnosticScraper for StatusScraper {
    fn extra_args(&self) -> &'static [&'static str] {
        &["--status-fd", "2"]
    }

    fn signer_id(&self, diagnostics: &str) -> Option<String> {
        status_field(diagnostics, "VALIDSIG", 0).or_else(|| status_field(diagnostics, "GOODSIG", 0))
    }

    fn imported_key_id(&self, diagnostics: &str) -> Option<String> {
        status_field(diagnostics, "IMPORT_OK", 1)
            .or_else(|| status_field(diagnostics, "IMPORTED", 0))
    }
}
