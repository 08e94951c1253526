//! Aho-Corasick automaton for multi-literal matching.
//!
//! This module implements the classic three-phase construction: a byte
//! trie (goto function), failure links computed breadth-first, and output
//! sets propagated along the failure links. The built automaton finds
//! every occurrence of every pattern in a single left-to-right pass,
//! independent of the number of patterns.
//!
//! # Design
//!
//! Failure links naturally form cycles (the root fails to itself), so
//! nodes are stored as records in a single `Vec` and reference each other
//! by index. Edges are kept as `(byte, node id)` pairs sorted by byte and
//! looked up with binary search.

use crate::error::{MatcherError, Result};
use std::collections::{HashMap, VecDeque};

const ROOT: u32 = 0;

/// A single literal match: pattern id plus the byte span it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ACMatch {
    /// Index of the pattern in the build-time pattern list
    pub pattern_id: u32,
    /// Byte offset of the first matched byte
    pub start: usize,
    /// Byte offset one past the last matched byte
    pub end: usize,
}

/// Resumable scan position for cross-chunk searches.
///
/// Carries the current automaton node and the absolute offset of the next
/// byte to scan, so a search can continue over a later chunk and report
/// matches that straddle the boundary with stream-absolute offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ACState {
    node: u32,
    offset: usize,
}

impl ACState {
    /// State positioned at the automaton root, offset 0.
    pub fn new() -> Self {
        Self {
            node: ROOT,
            offset: 0,
        }
    }

    /// Absolute offset of the next byte this state will scan.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Default for ACState {
    fn default() -> Self {
        Self::new()
    }
}

/// Automaton statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ACStats {
    /// Number of patterns the automaton was built from
    pub pattern_count: usize,
    /// Number of trie nodes, including the root
    pub node_count: usize,
    /// Number of goto edges
    pub edge_count: usize,
    /// Number of nodes where at least one pattern ends
    pub terminal_count: usize,
}

/// Temporary state structure used during construction
struct BuilderState {
    transitions: HashMap<u8, u32>,
    failure: u32,
    outputs: Vec<u32>,
    terminal: bool,
}

impl BuilderState {
    fn new() -> Self {
        Self {
            transitions: HashMap::new(),
            failure: ROOT,
            outputs: Vec::new(),
            terminal: false,
        }
    }
}

/// Builder holding the mutable trie while patterns are inserted and
/// failure links are computed.
struct ACBuilder {
    states: Vec<BuilderState>,
}

impl ACBuilder {
    fn new() -> Self {
        Self {
            states: vec![BuilderState::new()], // Root
        }
    }

    /// Walk the trie from the root, creating nodes as needed, and record
    /// the pattern id on the final node.
    fn add_pattern(&mut self, pattern: &[u8], pattern_id: u32) {
        let mut current = ROOT;

        for &ch in pattern {
            if let Some(&next) = self.states[current as usize].transitions.get(&ch) {
                current = next;
            } else {
                let new_id = self.states.len() as u32;
                self.states.push(BuilderState::new());
                self.states[current as usize].transitions.insert(ch, new_id);
                current = new_id;
            }
        }

        let state = &mut self.states[current as usize];
        state.terminal = true;
        state.outputs.push(pattern_id);
    }

    /// Compute failure links breadth-first and propagate output sets.
    ///
    /// Processing in BFS order guarantees that a node's failure target is
    /// finalized before the node itself, so a single one-step output merge
    /// per node inherits the whole suffix chain.
    fn build_failure_links(&mut self) {
        let mut queue = VecDeque::new();

        // Depth-1 states fail to root
        let root_children: Vec<u32> = self.states[ROOT as usize]
            .transitions
            .values()
            .copied()
            .collect();
        for child in root_children {
            self.states[child as usize].failure = ROOT;
            queue.push_back(child);
        }

        while let Some(state_id) = queue.pop_front() {
            let transitions: Vec<(u8, u32)> = self.states[state_id as usize]
                .transitions
                .iter()
                .map(|(&ch, &next)| (ch, next))
                .collect();

            for (ch, next_state) in transitions {
                queue.push_back(next_state);

                // Follow failure links looking for a state with a
                // transition on `ch`
                let mut fail = self.states[state_id as usize].failure;
                loop {
                    if let Some(&target) = self.states[fail as usize].transitions.get(&ch) {
                        if target != next_state {
                            self.states[next_state as usize].failure = target;
                            break;
                        }
                    }
                    if fail == ROOT {
                        self.states[next_state as usize].failure = ROOT;
                        break;
                    }
                    fail = self.states[fail as usize].failure;
                }

                // Inherit the failure target's outputs (already complete
                // because it is shallower than next_state)
                let failure = self.states[next_state as usize].failure;
                if failure != next_state && !self.states[failure as usize].outputs.is_empty() {
                    let inherited = self.states[failure as usize].outputs.clone();
                    self.states[next_state as usize].outputs.extend(inherited);
                }
            }
        }
    }

    /// Freeze into the immutable automaton: sorted edge lists for binary
    /// search, output sets sorted ascending for deterministic emission.
    fn into_automaton(self, patterns: Vec<Vec<u8>>) -> ACAutomaton {
        let nodes = self
            .states
            .into_iter()
            .map(|state| {
                let mut edges: Vec<(u8, u32)> = state.transitions.into_iter().collect();
                edges.sort_unstable_by_key(|&(ch, _)| ch);

                let mut outputs = state.outputs;
                outputs.sort_unstable();
                outputs.dedup();

                ACNode {
                    edges,
                    failure: state.failure,
                    outputs,
                    terminal: state.terminal,
                }
            })
            .collect();

        ACAutomaton { nodes, patterns }
    }
}

/// A frozen trie node. Children and the failure link are node indices
/// into the automaton's node vector.
#[derive(Debug)]
struct ACNode {
    /// Outgoing edges sorted by byte value
    edges: Vec<(u8, u32)>,
    /// Failure link (ROOT when no proper suffix exists)
    failure: u32,
    /// Ids of patterns ending at this node or reachable via failure
    /// links, ascending
    outputs: Vec<u32>,
    /// True when some pattern ends exactly at this node
    terminal: bool,
}

/// Immutable Aho-Corasick automaton over byte patterns.
///
/// Built once from a pattern list; every pattern keeps the id equal to
/// its index in that list. Duplicate patterns are tolerated and each
/// occurrence reports all of their ids.
#[derive(Debug)]
pub struct ACAutomaton {
    nodes: Vec<ACNode>,
    patterns: Vec<Vec<u8>>,
}

impl ACAutomaton {
    /// Build the automaton from patterns.
    ///
    /// An empty pattern list is accepted and produces an automaton that
    /// matches nothing. An empty pattern is rejected.
    pub fn build<I>(patterns: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let patterns: Vec<Vec<u8>> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_vec())
            .collect();

        let mut builder = ACBuilder::new();
        for (id, pattern) in patterns.iter().enumerate() {
            if pattern.is_empty() {
                return Err(MatcherError::InvalidPattern("empty pattern".to_string()));
            }
            builder.add_pattern(pattern, id as u32);
        }
        builder.build_failure_links();

        Ok(builder.into_automaton(patterns))
    }

    /// Find every occurrence of every pattern in `haystack`.
    ///
    /// Matches are emitted in scan order: ascending end offset, and by
    /// ascending pattern id among patterns ending at the same offset.
    pub fn search(&self, haystack: &[u8]) -> Vec<ACMatch> {
        let (matches, _) = self.search_stateful(haystack, ACState::new());
        matches
    }

    /// Search a chunk starting from a previously returned state.
    ///
    /// Match offsets are absolute (relative to the first byte ever
    /// scanned through this state chain), so a pattern spanning two
    /// chunks is reported with its true span.
    pub fn search_stateful(&self, haystack: &[u8], state: ACState) -> (Vec<ACMatch>, ACState) {
        let mut matches = Vec::new();
        let mut node = state.node;

        for (i, &ch) in haystack.iter().enumerate() {
            node = self.next_node(node, ch);

            let outputs = &self.nodes[node as usize].outputs;
            if !outputs.is_empty() {
                let end = state.offset + i + 1;
                for &pattern_id in outputs {
                    let len = self.patterns[pattern_id as usize].len();
                    matches.push(ACMatch {
                        pattern_id,
                        start: end - len,
                        end,
                    });
                }
            }
        }

        let next = ACState {
            node,
            offset: state.offset + haystack.len(),
        };
        (matches, next)
    }

    /// Advance one byte: follow the goto edge if present, otherwise walk
    /// failure links until one is found or the root gives up.
    fn next_node(&self, mut node: u32, ch: u8) -> u32 {
        loop {
            if let Some(target) = self.transition(node, ch) {
                return target;
            }
            if node == ROOT {
                return ROOT;
            }
            node = self.nodes[node as usize].failure;
        }
    }

    fn transition(&self, node: u32, ch: u8) -> Option<u32> {
        let edges = &self.nodes[node as usize].edges;
        edges
            .binary_search_by_key(&ch, |&(edge_ch, _)| edge_ch)
            .ok()
            .map(|idx| edges[idx].1)
    }

    /// The patterns this automaton was built from, in id order.
    pub fn patterns(&self) -> &[Vec<u8>] {
        &self.patterns
    }

    /// Length of the longest pattern, or 0 for an empty automaton.
    pub fn max_pattern_len(&self) -> usize {
        self.patterns.iter().map(|p| p.len()).max().unwrap_or(0)
    }

    /// Structural statistics for diagnostics and benchmarks.
    pub fn stats(&self) -> ACStats {
        ACStats {
            pattern_count: self.patterns.len(),
            node_count: self.nodes.len(),
            edge_count: self.nodes.iter().map(|n| n.edges.len()).sum(),
            terminal_count: self.nodes.iter().filter(|n| n.terminal).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(patterns: &[&str]) -> ACAutomaton {
        ACAutomaton::build(patterns).unwrap()
    }

    fn spans(matches: &[ACMatch]) -> Vec<(usize, usize, u32)> {
        matches.iter().map(|m| (m.start, m.end, m.pattern_id)).collect()
    }

    #[test]
    fn test_build_simple() {
        let ac = build(&["he", "she", "his", "hers"]);
        let stats = ac.stats();
        assert_eq!(stats.pattern_count, 4);
        assert_eq!(stats.node_count, 10);
        assert_eq!(stats.terminal_count, 4);
    }

    #[test]
    fn test_ushers_overlap() {
        // The classic overlap example: "she", "he" and "hers" all occur
        // in "ushers", two of them ending at the same offset.
        let ac = build(&["he", "she", "his", "hers"]);
        let matches = ac.search(b"ushers");

        assert_eq!(
            spans(&matches),
            vec![(2, 4, 0), (1, 4, 1), (2, 6, 3)],
            "emission is by ascending end, then ascending pattern id"
        );
    }

    #[test]
    fn test_prefix_patterns_all_reported() {
        let ac = build(&["test", "testing", "est"]);
        let matches = ac.search(b"testing");

        let mut found = spans(&matches);
        found.sort_unstable();
        assert_eq!(found, vec![(0, 4, 0), (0, 7, 1), (1, 4, 2)]);
    }

    #[test]
    fn test_overlapping_occurrences_of_same_pattern() {
        let ac = build(&["aa"]);
        let matches = ac.search(b"aaaa");
        assert_eq!(spans(&matches), vec![(0, 2, 0), (1, 3, 0), (2, 4, 0)]);
    }

    #[test]
    fn test_duplicate_patterns_keep_both_ids() {
        let ac = build(&["foo", "foo"]);
        let matches = ac.search(b"a foo b");
        assert_eq!(spans(&matches), vec![(2, 5, 0), (2, 5, 1)]);
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let err = ACAutomaton::build(["ab", ""]).unwrap_err();
        assert!(matches!(err, MatcherError::InvalidPattern(_)));
    }

    #[test]
    fn test_empty_pattern_list_matches_nothing() {
        let ac = ACAutomaton::build(Vec::<&[u8]>::new()).unwrap();
        assert!(ac.search(b"anything at all").is_empty());
        assert_eq!(ac.max_pattern_len(), 0);
    }

    #[test]
    fn test_no_match() {
        let ac = build(&["hello", "world"]);
        assert!(ac.search(b"nothing here").is_empty());
    }

    #[test]
    fn test_arbitrary_bytes() {
        let ac = ACAutomaton::build([&[0x00u8, 0xff, 0x7f][..]]).unwrap();
        let matches = ac.search(&[0x01, 0x00, 0xff, 0x7f, 0x02]);
        assert_eq!(spans(&matches), vec![(1, 4, 0)]);
    }

    #[test]
    fn test_stateful_search_across_chunks() {
        let ac = build(&["banana"]);

        let (matches, state) = ac.search_stateful(b"bana", ACState::new());
        assert!(matches.is_empty());
        assert_eq!(state.offset(), 4);

        let (matches, state) = ac.search_stateful(b"nana", state);
        assert_eq!(spans(&matches), vec![(0, 6, 0)]);
        assert_eq!(state.offset(), 8);
    }

    #[test]
    fn test_stateful_search_matches_batch() {
        let ac = build(&["he", "she", "his", "hers"]);
        let text = b"ushers and heroes hiss";

        let batch = ac.search(text);

        let mut state = ACState::new();
        let mut streamed = Vec::new();
        for chunk in text.chunks(3) {
            let (matches, next) = ac.search_stateful(chunk, state);
            streamed.extend(matches);
            state = next;
        }

        assert_eq!(spans(&streamed), spans(&batch));
    }
}
