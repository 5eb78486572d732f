//! Per-request chain selection.

use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::middleware::trie::Trie;
use crate::request::Request;

/// The read-only serving face of a finalized middleware stack.
///
/// Owns the frozen trie; shared via `Arc` across every connection task.
/// `call` is a pure lookup plus one downstream call — no retries, and
/// nothing is caught: a panicking handler propagates to whatever wraps the
/// chain.
pub(crate) struct Dispatcher {
    trie: Trie,
}

impl Dispatcher {
    pub(crate) fn new(trie: Trie) -> Self {
        Self { trie }
    }
}

impl ErasedHandler for Dispatcher {
    fn call(&self, req: Request) -> BoxFuture {
        let app: BoxedHandler = Arc::clone(self.trie.find(req.path()));
        app.call(req)
    }
}
