//! Declaration-time middleware registry and the one-time finalize step.
//!
//! During the build phase the [`Stack`] records which middleware was
//! registered under which scope prefix. Nothing is composed yet: a
//! registration inside scope `/api/v1` is stored under `/api/v1` only, and
//! ancestor accumulation happens once, in [`Stack::finalize`].

use std::sync::Arc;

use tracing::debug;

use crate::handler::BoxedHandler;
use crate::middleware::Middleware;
use crate::middleware::dispatch::Dispatcher;
use crate::middleware::trie::Trie;
use crate::path::PrefixPath;

// ── Stack ────────────────────────────────────────────────────────────────────

/// Records `(prefix, middleware)` registrations during scope declaration.
///
/// Single-threaded, build-phase only; [`finalize`](Stack::finalize) consumes
/// it.
pub(crate) struct Stack {
    /// Innermost-first is the *back*: the top of the scope context stack.
    context: Vec<PrefixPath>,
    /// Distinct prefixes in declaration order, each with its own
    /// registrations in declaration order.
    entries: Vec<(PrefixPath, Vec<Arc<dyn Middleware>>)>,
}

impl Stack {
    pub(crate) fn new() -> Self {
        Self { context: vec![PrefixPath::root()], entries: Vec::new() }
    }

    /// Appends `middleware` under the current innermost prefix.
    pub(crate) fn push(&mut self, middleware: impl Middleware) {
        self.push_arc(Arc::new(middleware));
    }

    fn push_arc(&mut self, middleware: Arc<dyn Middleware>) {
        let current = self.current().clone();
        match self.entries.iter_mut().find(|(prefix, _)| *prefix == current) {
            Some((_, list)) => list.push(middleware),
            None => self.entries.push((current, vec![middleware])),
        }
    }

    /// Runs `f` with `prefix` pushed as the innermost scope. The scope is
    /// popped on every exit path, a panic inside `f` included, so a failed
    /// declaration cannot leak its prefix into later registrations.
    pub(crate) fn scoped<R>(&mut self, prefix: &str, f: impl FnOnce(&mut Stack) -> R) -> R {
        let child = self.current().join(prefix);
        self.context.push(child);

        struct PopOnDrop<'a>(&'a mut Stack);
        impl Drop for PopOnDrop<'_> {
            fn drop(&mut self) {
                self.0.context.pop();
            }
        }

        let mut guard = PopOnDrop(self);
        f(&mut *guard.0)
    }

    fn current(&self) -> &PrefixPath {
        // The root entry is pushed at construction and only `scoped` pops.
        self.context.last().expect("scope context underflow")
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The one-time build step: composes, per registered prefix, the
    /// ancestor-accumulated chain around `app` and indexes the results in a
    /// trie behind a [`Dispatcher`].
    ///
    /// With zero registrations `app` is returned as-is — no dispatch
    /// indirection when there is nothing to dispatch between.
    pub(crate) fn finalize(self, app: BoxedHandler) -> BoxedHandler {
        if self.is_empty() {
            return app;
        }

        let mut trie = Trie::new(Arc::clone(&app));

        for (prefix, _) in &self.entries {
            let chain = self.chain_for(prefix);
            debug!(prefix = %prefix, middleware = chain.len(), "composing middleware chain");

            // The first entry belongs to the outermost scope and must run
            // first, so it wraps last.
            let wrapped = chain
                .iter()
                .rev()
                .fold(Arc::clone(&app), |next, middleware| middleware.layer(next));

            trie.insert(prefix, wrapped);
        }

        Arc::new(Dispatcher::new(trie))
    }

    /// Resolves the effective chain for `prefix`: every registered ancestor's
    /// entries, shallowest scope first, then its own, deduplicated by
    /// structural key with the first occurrence kept.
    fn chain_for(&self, prefix: &PrefixPath) -> Vec<Arc<dyn Middleware>> {
        let mut seen: Vec<String> = Vec::new();
        let mut chain = Vec::new();

        for ancestor in prefix.lineage() {
            let Some((_, list)) = self.entries.iter().find(|(p, _)| *p == ancestor) else {
                continue;
            };
            for middleware in list {
                let key = middleware.dedup_key();
                if seen.contains(&key) {
                    continue;
                }
                seen.push(key);
                chain.push(Arc::clone(middleware));
            }
        }

        chain
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;
    use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
    use crate::request::Request;
    use crate::response::Response;

    /// Test middleware that never wraps anything; only its key matters here.
    struct Named(&'static str);

    impl Middleware for Named {
        fn layer(&self, next: BoxedHandler) -> BoxedHandler {
            next
        }

        fn dedup_key(&self) -> String {
            self.0.to_owned()
        }
    }

    fn keys(stack: &Stack, prefix: &str) -> Vec<String> {
        stack
            .chain_for(&PrefixPath::parse(prefix))
            .iter()
            .map(|m| m.dedup_key())
            .collect()
    }

    #[test]
    fn child_chain_is_parent_chain_plus_own() {
        let mut stack = Stack::new();
        stack.push(Named("elapsed"));
        stack.scoped("api", |api| {
            api.push(Named("rate"));
            api.scoped("v1", |v1| {
                v1.push(Named("version"));
                v1.push(Named("deprecation"));
            });
        });

        assert_eq!(keys(&stack, "/api/v1"), ["elapsed", "rate", "version", "deprecation"]);
        assert_eq!(keys(&stack, "/api"), ["elapsed", "rate"]);
        assert_eq!(keys(&stack, "/"), ["elapsed"]);
    }

    #[test]
    fn nested_registrations_stay_under_their_own_prefix() {
        let mut stack = Stack::new();
        stack.scoped("a", |a| {
            a.scoped("b", |b| b.push(Named("inner")));
        });

        assert_eq!(keys(&stack, "/a"), Vec::<String>::new());
        assert_eq!(keys(&stack, "/a/b"), ["inner"]);
    }

    #[test]
    fn duplicate_keys_keep_first_occurrence() {
        let mut stack = Stack::new();
        stack.push(Named("auth"));
        stack.scoped("admin", |admin| {
            admin.push(Named("auth"));
            admin.push(Named("audit"));
        });

        assert_eq!(keys(&stack, "/admin"), ["auth", "audit"]);
    }

    #[test]
    fn ancestors_accumulate_by_depth_not_declaration_order() {
        let mut stack = Stack::new();
        // Deeper scope declared before its ancestor.
        stack.scoped("api/v1", |v1| v1.push(Named("version")));
        stack.scoped("api", |api| api.push(Named("rate")));

        assert_eq!(keys(&stack, "/api/v1"), ["rate", "version"]);
    }

    struct NoopApp;

    impl ErasedHandler for NoopApp {
        fn call(&self, _req: Request) -> BoxFuture {
            Box::pin(async { Response::empty(204) })
        }
    }

    #[test]
    fn finalize_with_no_registrations_returns_the_app_itself() {
        let stack = Stack::new();
        let app: BoxedHandler = Arc::new(NoopApp);
        let finalized = stack.finalize(Arc::clone(&app));
        assert!(Arc::ptr_eq(&app, &finalized), "no indirection without middleware");
    }

    #[test]
    fn scope_is_popped_on_panic() {
        let mut stack = Stack::new();
        let result = catch_unwind(AssertUnwindSafe(|| {
            stack.scoped("api", |_| panic!("declaration failed"));
        }));
        assert!(result.is_err());

        // A later registration lands at the root, not inside "/api".
        stack.push(Named("after"));
        assert_eq!(keys(&stack, "/"), ["after"]);
        assert_eq!(keys(&stack, "/api"), ["after"]);
    }
}
