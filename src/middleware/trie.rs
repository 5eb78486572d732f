//! Prefix trie mapping path segments to composed middleware chains.
//!
//! One node per registered segment; a node optionally carries the finalized
//! application for its prefix. Lookup walks the request path and answers
//! with the application of the deepest visited node that has one — longest
//! *registered* prefix wins, so a chain attached at `/api` also serves
//! `/api/v1/users` unless something deeper claims it.
//!
//! The trie is mutable only inside [`Stack::finalize`](super::Stack); once
//! it moves into the dispatcher there is no `&mut` path left to it, which
//! is the freeze: inserts are not rejected at run time, they are
//! unreachable.

use std::collections::HashMap;

use crate::handler::BoxedHandler;
use crate::path::{self, PrefixPath};

// ── Node ─────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Node {
    children: HashMap<String, Node>,
    app: Option<BoxedHandler>,
}

impl Node {
    fn put(&mut self, segment: &str) -> &mut Node {
        self.children.entry(segment.to_owned()).or_default()
    }

    fn get(&self, segment: &str) -> Option<&Node> {
        self.children.get(segment)
    }
}

// ── Trie ─────────────────────────────────────────────────────────────────────

pub(crate) struct Trie {
    root: Node,
    fallback: BoxedHandler,
}

impl Trie {
    /// An empty trie whose every lookup resolves to `fallback` (the bare
    /// base handler) until chains are inserted.
    pub(crate) fn new(fallback: BoxedHandler) -> Self {
        Self { root: Node::default(), fallback }
    }

    /// Attaches `app` at `prefix`, creating intermediate nodes as needed.
    /// Re-inserting the same prefix overwrites the previous application.
    pub(crate) fn insert(&mut self, prefix: &PrefixPath, app: BoxedHandler) {
        let mut node = &mut self.root;
        for segment in prefix.segments() {
            node = node.put(segment);
        }
        node.app = Some(app);
    }

    /// Resolves `path` to the application for its longest registered
    /// ancestor prefix, else the root's application, else the fallback.
    /// Never absent: the absence of middleware is not an error.
    pub(crate) fn find(&self, path: &str) -> &BoxedHandler {
        let mut node = &self.root;
        // The root node is on every walk, so a chain registered at "/" is
        // the starting candidate. "/" itself has zero segments and resolves
        // here alone.
        let mut best = node.app.as_ref();

        for segment in path::split_segments(path) {
            match node.get(segment) {
                Some(child) => {
                    node = child;
                    best = node.app.as_ref().or(best);
                }
                None => break,
            }
        }

        best.unwrap_or(&self.fallback)
    }
}
