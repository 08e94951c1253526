//! Fastmatcher - High-Throughput Multi-Pattern Text Scanner
//!
//! Fastmatcher reports every occurrence of a set of literal byte patterns
//! and a set of regex patterns inside an input byte stream. Literals are
//! matched by an Aho-Corasick automaton in a single pass independent of
//! pattern count; regexes run byte-level through `regex::bytes`. Both
//! result streams are merged into one ordered record sequence with
//! stream-absolute byte offsets.
//!
//! # Quick Start - Batch
//!
//! ```rust
//! use fastmatcher::{Matcher, MatchKind};
//!
//! let mut matcher = Matcher::new(
//!     ["error", "warning"],
//!     [r"\d{4}-\d{2}-\d{2}"],
//!     false,
//! )?;
//!
//! let records = matcher.match_bytes(b"error on 2024-01-15")?;
//! assert_eq!(records[0].kind, MatchKind::Literal);
//! assert_eq!(&records[0].pattern, "error");
//! assert_eq!(records[1].kind, MatchKind::Regex);
//! assert_eq!((records[1].start, records[1].end), (9, 19));
//! # Ok::<(), fastmatcher::MatcherError>(())
//! ```
//!
//! # Quick Start - Streaming
//!
//! Chunks may be sliced anywhere; a match spanning two chunks is reported
//! with its true absolute offsets in the `feed` call that completes it:
//!
//! ```rust
//! use fastmatcher::Matcher;
//!
//! let mut matcher = Matcher::new(["banana"], Vec::<&str>::new(), true)?;
//! assert!(matcher.feed(b"bana")?.is_empty());
//!
//! let records = matcher.feed(b"nana")?;
//! assert_eq!((records[0].start, records[0].end), (0, 6));
//! # Ok::<(), fastmatcher::MatcherError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! patterns ──build──► ACAutomaton (literals)
//!                     RegexEngine (regexes)
//!
//! bytes ──► Matcher ──► RingBuffer (streaming retention)
//!                │
//!                ├──► ACAutomaton ──┐
//!                └──► RegexEngine ──┴──► merged, sorted MatchRecords
//! ```
//!
//! The core is single-threaded and synchronous; a built literal-only
//! matcher is immutable apart from its counters and can be shared behind
//! the usual synchronization primitives.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ac;
pub mod error;
pub mod matcher;
pub mod regex_engine;
pub mod ring_buffer;

pub use crate::ac::{ACAutomaton, ACMatch, ACState, ACStats};
pub use crate::error::{MatcherError, Result};
pub use crate::matcher::{MatchKind, MatchRecord, Matcher, MatcherBuilder};
pub use crate::regex_engine::{PatternDiagnostic, RegexEngine, RegexMatch};
pub use crate::ring_buffer::RingBuffer;

/// One-shot convenience: build a batch matcher, scan `text`, return the
/// records.
///
/// ```rust
/// let records = fastmatcher::match_text(b"id 42", ["id"], [r"\d+"])?;
/// assert_eq!(records.len(), 2);
/// # Ok::<(), fastmatcher::MatcherError>(())
/// ```
pub fn match_text<L, R>(text: &[u8], literals: L, regexes: R) -> Result<Vec<MatchRecord>>
where
    L: IntoIterator,
    L::Item: AsRef<[u8]>,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    let mut matcher = Matcher::new(literals, regexes, false)?;
    matcher.match_bytes(text)
}

// Version information
/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library major version
pub const VERSION_MAJOR: u32 = 0;

/// Library minor version
pub const VERSION_MINOR: u32 = 1;

/// Library patch version
pub const VERSION_PATCH: u32 = 0;
