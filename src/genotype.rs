//! Lineage record for a single organism.
//!
//! # Overview
//! A `Genotype` holds the historical attributes of one organism as reported by
//! the simulation (identity, raw parent id, tree depth, birth, death, genome)
//! together with the bookkeeping the `Genebank` keeps on it:
//!
//! - `count`: how many lineage paths currently depend on this record
//!   (one per linked child plus one per explicit hold).
//! - `coalescent`: set once every sampled lineage is known to pass through it.
//!
//! The resolved parent link is an arena handle (`NodeIndex`) owned by the
//! genebank, never a reference, so records can be moved and removed freely.
//!
//! Query-scratch state (ancestor tags) is deliberately *not* stored here; every
//! distance query keeps its own tag set, which is what makes the genebank safe
//! to share across threads once it is built.

use crate::genebank::NodeIndex;

/// Numeric organism identifier shared by the current and historic populations.
pub type GenotypeId = i64;

/// Parent id used by the simulation for organisms without a parent.
pub const NO_PARENT: GenotypeId = -1;

/// Death time reported for organisms that are still alive.
pub const ALIVE: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genotype {
    id: GenotypeId,
    parent_id: GenotypeId,
    tree_depth: i64,
    birth: i64,
    death: i64,
    genes: String,

    parent: Option<NodeIndex>,
    count: u32,
    coalescent: bool,
}

impl Genotype {
    /// Creates an unlinked record. The parent handle is resolved later by
    /// [`Genebank::link`](crate::genebank::Genebank::link).
    pub fn new(
        id: GenotypeId,
        parent_id: GenotypeId,
        tree_depth: i64,
        birth: i64,
        death: i64,
        genes: impl Into<String>,
    ) -> Self {
        Genotype {
            id,
            parent_id,
            tree_depth,
            birth,
            death,
            genes: genes.into(),
            parent: None,
            count: 0,
            coalescent: false,
        }
    }

    pub fn id(&self) -> GenotypeId {
        self.id
    }

    /// Raw, unresolved parent id as read from the input.
    pub fn parent_id(&self) -> GenotypeId {
        self.parent_id
    }

    /// Generation count from the root of the ancestry.
    pub fn tree_depth(&self) -> i64 {
        self.tree_depth
    }

    pub fn birth(&self) -> i64 {
        self.birth
    }

    pub fn death(&self) -> i64 {
        self.death
    }

    pub fn is_alive(&self) -> bool {
        self.death == ALIVE
    }

    pub fn genes(&self) -> &str {
        &self.genes
    }

    /// Sequence length in symbols.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Resolved parent handle, `None` for roots and unlinked records.
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_coalescent(&self) -> bool {
        self.coalescent
    }

    pub(crate) fn set_parent(&mut self, parent: NodeIndex) {
        self.parent = Some(parent);
    }

    pub(crate) fn increment_count(&mut self) {
        self.count += 1;
    }

    /// Drops one reference and reports whether none are left.
    ///
    /// A record that was never referenced (an unheld leaf) stays at zero, so
    /// releasing it still reports `true`.
    pub(crate) fn decrement_count(&mut self) -> bool {
        self.count = self.count.saturating_sub(1);
        self.count == 0
    }

    pub(crate) fn set_coalescent(&mut self, coalescent: bool) {
        self.coalescent = coalescent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_unlinked() {
        let g = Genotype::new(7, 3, 2, 100, ALIVE, "abcab");
        assert_eq!(g.id(), 7);
        assert_eq!(g.parent_id(), 3);
        assert_eq!(g.tree_depth(), 2);
        assert_eq!(g.birth(), 100);
        assert!(g.is_alive());
        assert_eq!(g.len(), 5);
        assert_eq!(g.parent(), None);
        assert_eq!(g.count(), 0);
        assert!(!g.is_coalescent());
    }

    #[test]
    fn test_count_bookkeeping() {
        let mut g = Genotype::new(1, NO_PARENT, 0, 0, 50, "");
        assert!(!g.is_alive());

        g.increment_count();
        g.increment_count();
        assert_eq!(g.count(), 2);
        assert!(!g.decrement_count());
        assert!(g.decrement_count());

        // Already at zero: stays there and keeps reporting zero.
        assert!(g.decrement_count());
        assert_eq!(g.count(), 0);
    }

    #[test]
    fn test_coalescent_flag() {
        let mut g = Genotype::new(1, NO_PARENT, 0, 0, ALIVE, "a");
        g.set_coalescent(true);
        assert!(g.is_coalescent());
        g.set_coalescent(false);
        assert!(!g.is_coalescent());
    }
}
