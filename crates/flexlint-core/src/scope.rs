//! Explicit scope tracking for stateful checks.

/// Last-in-first-out stack of scope records.
///
/// Checks push a record when they enter a scope-opening node and pop it when
/// they leave that node. The stack never goes below empty: popping an empty
/// stack returns `None` and leaves it empty. "Am I inside any scope" is
/// answered by [`is_empty`](Self::is_empty) instead of a separate flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeStack<T> {
    records: Vec<T>,
}

impl<T> Default for ScopeStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ScopeStack<T> {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Enters a scope.
    pub fn push(&mut self, record: T) {
        self.records.push(record);
    }

    /// Leaves the innermost scope.
    pub fn pop(&mut self) -> Option<T> {
        self.records.pop()
    }

    /// Innermost scope.
    #[must_use]
    pub fn top(&self) -> Option<&T> {
        self.records.last()
    }

    /// Innermost scope, mutably.
    pub fn top_mut(&mut self) -> Option<&mut T> {
        self.records.last_mut()
    }

    /// True when no scope is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

}
