//! Regex scanning over raw bytes.
//!
//! Wraps `regex::bytes` so the whole pipeline stays on bytes end-to-end:
//! no UTF-8 decode of the input is ever required, and offsets are byte
//! offsets by construction. Each pattern is compiled separately, so
//! occurrences are non-overlapping per pattern while matches of
//! different patterns may overlap freely.

use regex::bytes::Regex;

/// A single regex match with the bytes it covered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexMatch {
    /// Index of the pattern in the build-time pattern list
    pub pattern_id: u32,
    /// Byte offset of the first matched byte, relative to the scanned slice
    pub start: usize,
    /// Byte offset one past the last matched byte
    pub end: usize,
    /// The exact bytes the pattern matched
    pub matched: Vec<u8>,
}

/// Record of a pattern that failed to compile and was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternDiagnostic {
    /// Index of the pattern in the build-time pattern list
    pub pattern_id: u32,
    /// The pattern source as provided
    pub source: String,
    /// The compiler's error message
    pub error: String,
}

/// A set of byte-level regex patterns compiled for scanning.
///
/// Compilation failures are soft: the offending pattern is dropped,
/// a diagnostic is recorded, and the remaining patterns stay usable.
pub struct RegexEngine {
    compiled: Vec<(u32, Regex)>,
    sources: Vec<String>,
    skipped: Vec<PatternDiagnostic>,
}

impl RegexEngine {
    /// Compile each pattern. Never fails: invalid patterns land in
    /// [`skipped`](Self::skipped) instead of aborting the build.
    pub fn build<I>(patterns: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let sources: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();

        let mut compiled = Vec::new();
        let mut skipped = Vec::new();
        for (id, source) in sources.iter().enumerate() {
            match Regex::new(source) {
                Ok(regex) => compiled.push((id as u32, regex)),
                Err(err) => skipped.push(PatternDiagnostic {
                    pattern_id: id as u32,
                    source: source.clone(),
                    error: err.to_string(),
                }),
            }
        }

        Self {
            compiled,
            sources,
            skipped,
        }
    }

    /// Find all matches of every compiled pattern in `haystack`.
    ///
    /// Offsets are relative to the slice. Results are sorted by
    /// `(start, end, pattern_id)`.
    pub fn scan(&self, haystack: &[u8]) -> Vec<RegexMatch> {
        let mut matches = Vec::new();
        for (pattern_id, regex) in &self.compiled {
            for m in regex.find_iter(haystack) {
                matches.push(RegexMatch {
                    pattern_id: *pattern_id,
                    start: m.start(),
                    end: m.end(),
                    matched: m.as_bytes().to_vec(),
                });
            }
        }
        matches.sort_unstable_by_key(|m| (m.start, m.end, m.pattern_id));
        matches
    }

    /// Diagnostics for patterns that failed to compile, in pattern order.
    pub fn skipped(&self) -> &[PatternDiagnostic] {
        &self.skipped
    }

    /// Number of successfully compiled patterns.
    pub fn pattern_count(&self) -> usize {
        self.compiled.len()
    }

    /// The source of a pattern by id, compiled or not.
    pub fn source(&self, pattern_id: u32) -> Option<&str> {
        self.sources.get(pattern_id as usize).map(String::as_str)
    }
}
