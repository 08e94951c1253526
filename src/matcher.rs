//! Match coordination: one ordered record stream from both engines.
//!
//! The [`Matcher`] owns an optional Aho-Corasick automaton for literal
//! patterns and an optional regex engine, drives both over the same byte
//! region, and merges their results into a single record stream sorted by
//! `(start, end, kind, pattern_id)` with stream-absolute offsets.
//!
//! Two modes:
//! - **batch**: [`Matcher::match_bytes`] scans one complete buffer.
//! - **streaming**: [`Matcher::feed`] accepts arbitrary-sized chunks. A
//!   ring buffer retains a tail of `max_pattern_length - 1` bytes across
//!   calls so the engines see enough context for matches that straddle a
//!   chunk boundary. A record is emitted exactly once: in the `feed` call
//!   where its final byte arrives.

use crate::ac::ACAutomaton;
use crate::error::{MatcherError, Result};
use crate::regex_engine::{PatternDiagnostic, RegexEngine};
use crate::ring_buffer::{RingBuffer, DEFAULT_CAPACITY};

use serde::{Serialize, Serializer};
use std::fmt;

/// Streaming retention floor when regex patterns are present.
///
/// A regex has no derivable worst-case match length, so the retained
/// boundary context is capped: a regex match longer than this may be
/// split by a chunk boundary. Literal patterns are never affected.
const REGEX_WINDOW: usize = 256;

/// Which engine produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Exact byte-literal match found by the AC automaton
    Literal,
    /// Regular-expression match
    Regex,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::Literal => write!(f, "literal"),
            MatchKind::Regex => write!(f, "regex"),
        }
    }
}

/// One reported occurrence of a pattern.
///
/// Offsets are byte offsets measured from the start of the logical input
/// stream: in batch mode that is the scanned buffer, in streaming mode
/// the very first byte ever fed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    /// Which engine produced the record
    pub kind: MatchKind,
    /// Index of the pattern in its engine's build-time list
    pub pattern_id: u32,
    /// The source pattern as provided (literal bytes decoded lossily)
    pub pattern: String,
    /// Absolute offset of the first matched byte
    pub start: usize,
    /// Absolute offset one past the last matched byte
    pub end: usize,
    /// The exact matched bytes; populated for regex records only
    /// (a literal's bytes are the pattern itself)
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_matched"
    )]
    pub matched: Option<Vec<u8>>,
}

fn serialize_matched<S: Serializer>(
    bytes: &Option<Vec<u8>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match bytes {
        Some(b) => serializer.serialize_str(&String::from_utf8_lossy(b)),
        None => serializer.serialize_none(),
    }
}

fn sort_records(records: &mut [MatchRecord]) {
    records.sort_by(|a, b| {
        (a.start, a.end, a.kind, a.pattern_id).cmp(&(b.start, b.end, b.kind, b.pattern_id))
    });
}

/// Multi-pattern scanner over literal and regex patterns.
///
/// # Example
/// ```
/// use fastmatcher::Matcher;
///
/// let mut matcher = Matcher::new(["error"], [r"\d{4}-\d{2}-\d{2}"], false)?;
/// let records = matcher.match_bytes(b"error on 2024-01-15")?;
///
/// assert_eq!(records.len(), 2);
/// assert_eq!((records[0].start, records[0].end), (0, 5));
/// assert_eq!((records[1].start, records[1].end), (9, 19));
/// # Ok::<(), fastmatcher::MatcherError>(())
/// ```
pub struct Matcher {
    ac: Option<ACAutomaton>,
    regex: Option<RegexEngine>,
    /// Literal pattern sources decoded once at build for record output
    literal_reprs: Vec<String>,
    buffer: Option<RingBuffer>,
    requested_capacity: Option<usize>,
    streaming: bool,
    built: bool,
    /// Longest span a match may cover for boundary retention purposes
    retention: usize,
    total_matches: usize,
    /// Absolute offset of the first byte still held in the ring buffer
    stream_base: usize,
    /// Total bytes ever fed; doubles as the emission watermark
    bytes_fed: usize,
}

impl Matcher {
    /// Create a matcher and build its engines eagerly.
    ///
    /// An empty pattern list leaves the corresponding engine absent;
    /// a matcher with no engines at all matches nothing.
    pub fn new<L, R>(literals: L, regexes: R, streaming: bool) -> Result<Self>
    where
        L: IntoIterator,
        L::Item: AsRef<[u8]>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let mut matcher = Self::unbuilt(streaming);
        matcher.build(literals, regexes)?;
        Ok(matcher)
    }

    fn unbuilt(streaming: bool) -> Self {
        Self {
            ac: None,
            regex: None,
            literal_reprs: Vec::new(),
            buffer: None,
            requested_capacity: None,
            streaming,
            built: false,
            retention: 0,
            total_matches: 0,
            stream_base: 0,
            bytes_fed: 0,
        }
    }

    /// Build or rebuild both engines from scratch.
    ///
    /// Replacement is atomic: both engines are compiled before any prior
    /// state is touched, so a failed build leaves the matcher as it was.
    /// Stream state (buffer contents, offsets, the match counter) is not
    /// affected; use [`reset`](Self::reset) for that.
    pub fn build<L, R>(&mut self, literals: L, regexes: R) -> Result<()>
    where
        L: IntoIterator,
        L::Item: AsRef<[u8]>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let literals: Vec<Vec<u8>> = literals.into_iter().map(|p| p.as_ref().to_vec()).collect();

        let ac = if literals.is_empty() {
            None
        } else {
            Some(ACAutomaton::build(&literals)?)
        };
        let regex = {
            let engine = RegexEngine::build(regexes);
            if engine.pattern_count() == 0 && engine.skipped().is_empty() {
                None
            } else {
                Some(engine)
            }
        };

        let mut retention = ac.as_ref().map(|a| a.max_pattern_len()).unwrap_or(0);
        if regex.as_ref().map_or(false, |e| e.pattern_count() > 0) {
            retention = retention.max(REGEX_WINDOW);
        }

        self.literal_reprs = ac
            .as_ref()
            .map(|a| {
                a.patterns()
                    .iter()
                    .map(|p| String::from_utf8_lossy(p).into_owned())
                    .collect()
            })
            .unwrap_or_default();
        self.ac = ac;
        self.regex = regex;
        self.retention = retention;
        self.built = true;

        if self.streaming {
            self.ensure_buffer();
        }
        Ok(())
    }

    /// Allocate (or enlarge) the streaming buffer so at least one byte
    /// beyond the retained tail always fits.
    fn ensure_buffer(&mut self) {
        let required = self
            .requested_capacity
            .unwrap_or(DEFAULT_CAPACITY)
            .max(2 * self.retention);
        let adequate = matches!(&self.buffer, Some(buf) if buf.capacity() >= required);
        if !adequate {
            let mut fresh = RingBuffer::new(required);
            if let Some(old) = self.buffer.as_mut() {
                let pending = old.read(0);
                fresh.write(&pending);
            }
            self.buffer = Some(fresh);
        }
    }

    /// Scan one complete buffer (batch mode).
    ///
    /// Returns every literal and regex occurrence sorted by
    /// `(start, end, kind, pattern_id)`, literal records preceding regex
    /// records on identical spans. No scanning state persists between
    /// calls; only `total_matches` accumulates.
    pub fn match_bytes(&mut self, text: &[u8]) -> Result<Vec<MatchRecord>> {
        if !self.built {
            return Err(MatcherError::NotBuilt(
                "call build() before matching".to_string(),
            ));
        }
        if self.streaming {
            return Err(MatcherError::Mode(
                "match_bytes() is batch-only; use feed() on a streaming matcher".to_string(),
            ));
        }

        let mut records = Vec::new();
        self.collect_matches(text, 0, 0, &mut records);
        sort_records(&mut records);
        self.total_matches += records.len();
        Ok(records)
    }

    /// Feed a chunk of the input stream (streaming mode).
    ///
    /// Records carry absolute offsets and each is emitted exactly once,
    /// in the call where its final byte arrives; the retained boundary
    /// tail is re-scanned only as warm-up context. An empty chunk
    /// flushes: the retained tail is released and scanning context is
    /// dropped. No input byte is ever lost: a chunk larger than the
    /// buffer's free space is absorbed in several write/scan rounds
    /// within the same call.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<MatchRecord>> {
        if !self.built {
            return Err(MatcherError::NotBuilt(
                "call build() before feeding".to_string(),
            ));
        }
        if !self.streaming || self.buffer.is_none() {
            return Err(MatcherError::Mode(
                "feed() requires streaming mode; use match_bytes() on a batch matcher".to_string(),
            ));
        }

        if chunk.is_empty() {
            // Flush: every match ending in buffered bytes was already
            // emitted when its final byte arrived, so only the tail is
            // released.
            if let Some(buf) = self.buffer.as_mut() {
                self.stream_base += buf.available_data();
                buf.clear();
            }
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut offset = 0;
        while offset < chunk.len() {
            let watermark = self.bytes_fed;
            let (written, data) = match self.buffer.as_mut() {
                Some(buf) => {
                    let written = buf.write(&chunk[offset..]);
                    (written, buf.peek(0))
                }
                None => unreachable!("checked above"),
            };
            debug_assert!(written > 0, "capacity floor guarantees room past the tail");
            offset += written;
            self.bytes_fed += written;

            // Scan the whole buffer: the retained prefix warms up the
            // engines, but only matches ending in new bytes are emitted.
            self.collect_matches(&data, self.stream_base, watermark + 1, &mut records);

            let keep = self.retention.saturating_sub(1).min(data.len());
            let discard = data.len() - keep;
            if let Some(buf) = self.buffer.as_mut() {
                buf.consume(discard);
            }
            self.stream_base += discard;
        }

        sort_records(&mut records);
        self.total_matches += records.len();
        Ok(records)
    }

    /// Signal end of stream. Equivalent to `feed(b"")`.
    pub fn finish(&mut self) -> Result<Vec<MatchRecord>> {
        self.feed(&[])
    }

    /// Run both engines over `data` and append records whose absolute
    /// end offset is at least `min_end`.
    fn collect_matches(
        &self,
        data: &[u8],
        base: usize,
        min_end: usize,
        out: &mut Vec<MatchRecord>,
    ) {
        if let Some(ac) = &self.ac {
            for m in ac.search(data) {
                let end = base + m.end;
                if end < min_end {
                    continue;
                }
                out.push(MatchRecord {
                    kind: MatchKind::Literal,
                    pattern_id: m.pattern_id,
                    pattern: self.literal_reprs[m.pattern_id as usize].clone(),
                    start: base + m.start,
                    end,
                    matched: None,
                });
            }
        }
        if let Some(engine) = &self.regex {
            for m in engine.scan(data) {
                let end = base + m.end;
                if end < min_end {
                    continue;
                }
                out.push(MatchRecord {
                    kind: MatchKind::Regex,
                    pattern_id: m.pattern_id,
                    pattern: engine
                        .source(m.pattern_id)
                        .unwrap_or_default()
                        .to_string(),
                    start: base + m.start,
                    end,
                    matched: Some(m.matched),
                });
            }
        }
    }

    /// Zero the match counter and all stream state. Compiled engines are
    /// kept as-is.
    pub fn reset(&mut self) {
        self.total_matches = 0;
        self.stream_base = 0;
        self.bytes_fed = 0;
        if let Some(buf) = self.buffer.as_mut() {
            buf.clear();
        }
    }

    /// Total records returned across all `match_bytes`/`feed` calls
    /// since construction or the last [`reset`](Self::reset).
    pub fn total_matches(&self) -> usize {
        self.total_matches
    }

    /// Whether this matcher was created in streaming mode.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Capacity of the streaming ring buffer, or `None` in batch mode.
    pub fn stream_capacity(&self) -> Option<usize> {
        self.buffer.as_ref().map(|buf| buf.capacity())
    }

    /// Diagnostics for regex patterns that failed to compile and were
    /// dropped at build time.
    pub fn skipped_patterns(&self) -> &[PatternDiagnostic] {
        self.regex.as_ref().map(|e| e.skipped()).unwrap_or(&[])
    }
}

impl Default for Matcher {
    /// An unbuilt batch-mode matcher; every scan operation fails with
    /// [`MatcherError::NotBuilt`] until [`Matcher::build`] is called.
    fn default() -> Self {
        Self::unbuilt(false)
    }
}

/// Incremental construction of a [`Matcher`].
///
/// # Example
/// ```
/// use fastmatcher::MatcherBuilder;
///
/// let mut matcher = MatcherBuilder::new()
///     .literal("needle")
///     .regex(r"[0-9]+")
///     .streaming(true)
///     .build()?;
///
/// let records = matcher.feed(b"a needle costs 42 cents")?;
/// assert_eq!(records.len(), 2);
/// # Ok::<(), fastmatcher::MatcherError>(())
/// ```
#[derive(Default)]
pub struct MatcherBuilder {
    literals: Vec<Vec<u8>>,
    regexes: Vec<String>,
    streaming: bool,
    capacity: Option<usize>,
}

impl MatcherBuilder {
    /// Start an empty builder (batch mode, no patterns).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one literal byte pattern.
    pub fn literal(mut self, pattern: impl AsRef<[u8]>) -> Self {
        self.literals.push(pattern.as_ref().to_vec());
        self
    }

    /// Add many literal byte patterns.
    pub fn literals<I>(mut self, patterns: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        self.literals
            .extend(patterns.into_iter().map(|p| p.as_ref().to_vec()));
        self
    }

    /// Add one regex pattern.
    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regexes.push(pattern.into());
        self
    }

    /// Add many regex patterns.
    pub fn regexes<I>(mut self, patterns: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.regexes
            .extend(patterns.into_iter().map(|p| p.as_ref().to_string()));
        self
    }

    /// Enable or disable streaming mode.
    pub fn streaming(mut self, enabled: bool) -> Self {
        self.streaming = enabled;
        self
    }

    /// Request a streaming buffer capacity. The effective capacity is
    /// raised to `2 × max_pattern_length` when the patterns demand more
    /// boundary retention than requested.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Build the matcher.
    pub fn build(self) -> Result<Matcher> {
        let mut matcher = Matcher::unbuilt(self.streaming);
        matcher.requested_capacity = self.capacity;
        matcher.build(self.literals, self.regexes)?;
        Ok(matcher)
    }
}
