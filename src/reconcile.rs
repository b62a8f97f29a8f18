//! Set reconciliation between disk and store.
//!
//! Given the keys present on disk and the keys present in the store —
//! under either projection (absolute file path or session name) — compute
//! what the store is missing and what it holds without disk backing. The
//! engine is read-only set algebra: it never mutates either side, and
//! detecting a stale key does not imply deletion.

use std::collections::BTreeSet;

/// The two derived sets for one projection. Disjoint by construction;
/// `missing ⊆ disk`, `stale ⊆ store`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<K: Ord> {
    /// Present on disk, not yet reflected in the store.
    pub missing: BTreeSet<K>,
    /// Present in the store, no longer backed by a disk document.
    pub stale: BTreeSet<K>,
}

/// Compute both difference sets. Order-independent; any presentation
/// order is a sort imposed by the caller.
pub fn diff<K: Ord + Clone>(disk: &BTreeSet<K>, store: &BTreeSet<K>) -> Reconciliation<K> {
    Reconciliation {
        missing: disk.difference(store).cloned().collect(),
        stale: store.difference(disk).cloned().collect(),
    }
}
