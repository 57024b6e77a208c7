//! Composable, undoable mutations.
//!
//! A [`RevertableOperation`] records how many edits it made, how many `any`
//! sites it looked at, and how to undo itself. Operations form a monoid under
//! [`combine`](RevertableOperation::combine) with [`none`](RevertableOperation::none)
//! as identity; reverting a combined operation undoes its parts in reverse
//! order.

use std::fmt;
use std::iter::Sum;

type RevertAction<M> = Box<dyn FnOnce(&mut M)>;

#[must_use = "an operation must be kept (committed) or reverted"]
pub struct RevertableOperation<M> {
    count_changes_done: usize,
    count_of_anys: usize,
    reverts: Vec<RevertAction<M>>,
}

impl<M> RevertableOperation<M> {
    /// Identity: no changes, no sites, nothing to undo.
    pub fn none() -> Self {
        RevertableOperation {
            count_changes_done: 0,
            count_of_anys: 0,
            reverts: Vec::new(),
        }
    }

    pub fn new(
        count_changes_done: usize,
        count_of_anys: usize,
        revert: impl FnOnce(&mut M) + 'static,
    ) -> Self {
        RevertableOperation {
            count_changes_done,
            count_of_anys,
            reverts: vec![Box::new(revert)],
        }
    }

    /// `count_of_anys` sites were looked at without changing anything.
    pub fn observed(count_of_anys: usize) -> Self {
        RevertableOperation {
            count_changes_done: 0,
            count_of_anys,
            reverts: Vec::new(),
        }
    }

    pub fn count_changes_done(&self) -> usize {
        self.count_changes_done
    }

    pub fn count_of_anys(&self) -> usize {
        self.count_of_anys
    }

    /// `self` followed by `other`.
    pub fn combine(mut self, other: Self) -> Self {
        self.count_changes_done += other.count_changes_done;
        self.count_of_anys += other.count_of_anys;
        self.reverts.extend(other.reverts);
        self
    }

    /// Undo every constituent edit, most recent first.
    pub fn revert(self, model: &mut M) {
        for action in self.reverts.into_iter().rev() {
            action(model);
        }
    }
}

impl<M> Default for RevertableOperation<M> {
    fn default() -> Self {
        Self::none()
    }
}

impl<M> Sum for RevertableOperation<M> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::none(), Self::combine)
    }
}

impl<M> fmt::Debug for RevertableOperation<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevertableOperation")
            .field("count_changes_done", &self.count_changes_done)
            .field("count_of_anys", &self.count_of_anys)
            .field("reverts", &self.reverts.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/revertable_tests.rs"]
mod tests;
