//! Reference-counted ancestry store and the distance queries run over it.
//!
//! # Overview
//! The genebank owns every `Genotype` in an arena (`Vec<Option<Genotype>>`)
//! and indexes it by organism id. Records are built in two phases:
//!
//! 1. `create` every record from the current and historic populations.
//! 2. `link` once: each record with a resolvable parent id gets a parent
//!    handle and adds one to its parent's reference count.
//!
//! After linking, `check_coalescence` is called once from one member of the
//! sampled population. It walks that member's lineage to the root and marks
//! the stretch of trunk every sampled lineage must pass through:
//!
//! ```text
//!        0  coalescent (root)
//!        |
//!        1  coalescent (parent 0 has a single child)
//!       / \
//!      2   3   not coalescent (parent 1 has two children)
//!     / \   \
//!    4   5   6
//! ```
//!
//! Only the walked path is evaluated. Other branches are never marked, which
//! is fine: every ancestor walk ends at the first coalescent node it meets,
//! and the root is always on the walked path.
//!
//! # MRCA search
//! Distance queries tag the lineage of `a` up to (and including) its first
//! coalescent ancestor, then walk the lineage of `b` until a tagged node is
//! found: that node is the most recent common ancestor. Coalescent records
//! form a single chain down from the root, so when `b` joins that chain
//! above or below `a`'s entry point the tags are extended along it. Tags
//! live in a map owned by the query, so queries never interfere with each
//! other.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::genotype::{Genotype, GenotypeId};

/// Distance value returned when a metric is undefined for a pair
/// (Hamming distance between sequences of different lengths).
pub const UNDEFINED_DISTANCE: i64 = -1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenebankError {
    #[error("Genotype {0} already exists in the genebank")]
    DuplicateGenotype(GenotypeId),

    #[error("Genotype {0} is not in the genebank")]
    UnknownGenotype(GenotypeId),

    #[error("Broken ancestry: lineage of genotype {0} ends before reaching a coalescent ancestor")]
    BrokenAncestry(GenotypeId),
}

/// Handle of a record inside the genebank arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

/// Where two lineages meet. `below_a` and `below_b` are the records just
/// under the MRCA on each side, or the input itself when it is the MRCA.
struct Meeting {
    a: NodeIndex,
    b: NodeIndex,
    mrca: NodeIndex,
    below_a: NodeIndex,
    below_b: NodeIndex,
}

/// One row of [`Genebank::summary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenotypeSummary {
    pub id: GenotypeId,
    /// Id of the resolved parent, `None` for roots.
    pub parent: Option<GenotypeId>,
    pub tree_depth: i64,
    pub count: u32,
    pub coalescent: bool,
}

#[derive(Debug, Default)]
pub struct Genebank {
    nodes: Vec<Option<Genotype>>,
    index: HashMap<GenotypeId, NodeIndex>,
}

impl Genebank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: GenotypeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: GenotypeId) -> Option<&Genotype> {
        self.index.get(&id).and_then(|&idx| self.slot(idx))
    }

    /// All stored records, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = &Genotype> {
        self.nodes.iter().flatten()
    }

    /// Inserts an unlinked record.
    ///
    /// # Errors
    /// Returns `DuplicateGenotype` if `id` is already stored.
    pub fn create(
        &mut self,
        id: GenotypeId,
        parent_id: GenotypeId,
        tree_depth: i64,
        birth: i64,
        death: i64,
        genes: impl Into<String>,
    ) -> Result<NodeIndex, GenebankError> {
        if self.index.contains_key(&id) {
            return Err(GenebankError::DuplicateGenotype(id));
        }
        let idx = NodeIndex(self.nodes.len());
        self.nodes
            .push(Some(Genotype::new(id, parent_id, tree_depth, birth, death, genes)));
        self.index.insert(id, idx);
        Ok(idx)
    }

    /// Resolves parent ids into parent handles and counts one reference on
    /// each parent per child.
    ///
    /// Records whose parent id is negative or not stored become roots. This
    /// must run exactly once after all records are created: a second call
    /// counts every child link again.
    pub fn link(&mut self) {
        let links: Vec<(NodeIndex, NodeIndex)> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                let node = slot.as_ref()?;
                if node.parent_id() < 0 {
                    return None;
                }
                match self.index.get(&node.parent_id()) {
                    Some(&parent) => Some((NodeIndex(i), parent)),
                    None => {
                        debug!(
                            "Parent {} of genotype {} not found; treating it as a root",
                            node.parent_id(),
                            node.id()
                        );
                        None
                    }
                }
            })
            .collect();

        for (child, parent) in links {
            if let Some(node) = self.nodes[child.0].as_mut() {
                node.set_parent(parent);
            }
            if let Some(node) = self.nodes[parent.0].as_mut() {
                node.increment_count();
            }
        }
    }

    /// Adds an external reference to a record, keeping it alive through
    /// [`remove`](Self::remove) calls on its descendants.
    pub fn hold(&mut self, id: GenotypeId) -> Result<(), GenebankError> {
        let idx = self.index_of(id)?;
        if let Some(node) = self.nodes[idx.0].as_mut() {
            node.increment_count();
        }
        Ok(())
    }

    /// Releases one reference on `id`. A record left without references is
    /// dropped from the store and the release continues with its parent.
    ///
    /// Returns the number of records removed. Unknown ids are a no-op.
    ///
    /// Removed records leave a vacant arena slot behind; slots are never
    /// reused or compacted, so the arena only shrinks when the genebank is
    /// dropped.
    pub fn remove(&mut self, id: GenotypeId) -> usize {
        let mut removed = 0;
        let mut cursor = self.index.get(&id).copied();

        while let Some(idx) = cursor {
            let Some(node) = self.nodes[idx.0].as_mut() else {
                break;
            };
            if !node.decrement_count() {
                break;
            }
            let Some(node) = self.nodes[idx.0].take() else {
                break;
            };
            self.index.remove(&node.id());
            removed += 1;
            cursor = node.parent();
        }

        removed
    }

    /// Marks the trunk shared by all sampled lineages as coalescent, walking
    /// from `id` up to the root or to the first record already known to be
    /// coalescent.
    ///
    /// A record is coalescent when its parent is coalescent and holds exactly
    /// one reference (or when it has no parent at all). Marking stops at the
    /// first record whose parent branches; the rest of the path stays
    /// unmarked and `false` is returned.
    pub fn check_coalescence(&mut self, id: GenotypeId) -> Result<bool, GenebankError> {
        let start = self.index_of(id)?;

        let mut path = Vec::new();
        let mut cursor = Some(start);
        while let Some(idx) = cursor {
            let node = self.slot(idx).ok_or(GenebankError::BrokenAncestry(id))?;
            if node.is_coalescent() {
                break;
            }
            path.push(idx);
            cursor = node.parent();
        }

        // Top of the path first: each parent is coalescent by the time its
        // child is looked at.
        for &idx in path.iter().rev() {
            let node = self.slot(idx).ok_or(GenebankError::BrokenAncestry(id))?;
            let single_lineage = match node.parent() {
                None => true,
                Some(parent) => {
                    self.slot(parent)
                        .ok_or(GenebankError::BrokenAncestry(id))?
                        .count()
                        == 1
                }
            };
            if !single_lineage {
                return Ok(false);
            }
            if let Some(node) = self.nodes[idx.0].as_mut() {
                node.set_coalescent(true);
            }
        }

        Ok(true)
    }

    /// Id of the most recent common ancestor of `a` and `b`.
    pub fn mrca(&self, a: GenotypeId, b: GenotypeId) -> Result<GenotypeId, GenebankError> {
        let meeting = self.meet(a, b)?;
        Ok(self.record(meeting.mrca, b)?.id())
    }

    /// Tree-depth distance through the most recent common ancestor:
    /// `depth(a) + depth(b) - 2 * depth(mrca)`.
    pub fn tree_distance(&self, a: GenotypeId, b: GenotypeId) -> Result<i64, GenebankError> {
        let meeting = self.meet(a, b)?;

        let depth_a = self.record(meeting.a, a)?.tree_depth();
        let depth_b = self.record(meeting.b, b)?.tree_depth();
        let depth_mrca = self.record(meeting.mrca, b)?.tree_depth();
        Ok(depth_a + depth_b - 2 * depth_mrca)
    }

    /// Number of positions at which the two genomes differ.
    ///
    /// Returns [`UNDEFINED_DISTANCE`] when the genomes have different lengths.
    pub fn hamming_distance(&self, a: GenotypeId, b: GenotypeId) -> Result<i64, GenebankError> {
        let ga = self.get(a).ok_or(GenebankError::UnknownGenotype(a))?;
        let gb = self.get(b).ok_or(GenebankError::UnknownGenotype(b))?;

        if ga.len() != gb.len() {
            warn!(
                "Length mismatch while calculating Hamming distance between {} ({}) and {} ({})",
                a,
                ga.len(),
                b,
                gb.len()
            );
            return Ok(UNDEFINED_DISTANCE);
        }

        let dist = ga
            .genes()
            .bytes()
            .zip(gb.genes().bytes())
            .filter(|(x, y)| x != y)
            .count();
        Ok(dist as i64)
    }

    /// Birth-time distance through the most recent common ancestor.
    ///
    /// For each side, finds the record on its lineage just below the MRCA
    /// (the MRCA's offspring on that side, or the input itself when it is the
    /// MRCA) and returns `birth(a) + birth(b) - offspring_birth(a) -
    /// offspring_birth(b)`.
    // NOTE: the historic formula for this metric subtracted twice a "minimum"
    // of the two offspring births; the plain subtraction is what is reproduced.
    pub fn mrca_birth_distance(&self, a: GenotypeId, b: GenotypeId) -> Result<i64, GenebankError> {
        let meeting = self.meet(a, b)?;

        let birth_a = self.record(meeting.a, a)?.birth();
        let birth_b = self.record(meeting.b, b)?.birth();
        let split_a = self.record(meeting.below_a, a)?.birth();
        let split_b = self.record(meeting.below_b, b)?.birth();
        Ok(birth_a + birth_b - split_a - split_b)
    }

    /// Per-record bookkeeping sorted by id, for debugging output.
    pub fn summary(&self) -> Vec<GenotypeSummary> {
        let mut rows: Vec<GenotypeSummary> = self
            .iter()
            .map(|g| GenotypeSummary {
                id: g.id(),
                parent: g.parent().and_then(|p| self.slot(p)).map(Genotype::id),
                tree_depth: g.tree_depth(),
                count: g.count(),
                coalescent: g.is_coalescent(),
            })
            .collect();
        rows.sort_by_key(|row| row.id);
        rows
    }

    fn index_of(&self, id: GenotypeId) -> Result<NodeIndex, GenebankError> {
        self.index
            .get(&id)
            .copied()
            .ok_or(GenebankError::UnknownGenotype(id))
    }

    fn slot(&self, idx: NodeIndex) -> Option<&Genotype> {
        self.nodes.get(idx.0).and_then(Option::as_ref)
    }

    /// Like `slot`, but a vacant slot reached from `from` is a broken lineage.
    fn record(&self, idx: NodeIndex, from: GenotypeId) -> Result<&Genotype, GenebankError> {
        self.slot(idx).ok_or(GenebankError::BrokenAncestry(from))
    }

    /// Finds where the lineages of `a` and `b` meet.
    ///
    /// The lineage of `a` is tagged up to its first coalescent ancestor. If
    /// `b` reaches the trunk without crossing a tag, the two entered the
    /// trunk at different points: the tags are extended to the root and the
    /// walk carries on, so the higher entry point is found either way.
    fn meet(&self, a: GenotypeId, b: GenotypeId) -> Result<Meeting, GenebankError> {
        let (ia, ib) = (self.index_of(a)?, self.index_of(b)?);

        let mut tagged = HashMap::new();
        let entry_a = self.tag_lineage(ia, a, &mut tagged)?;
        let mut extended = false;

        let mut previous = ib;
        let mut cursor = ib;
        loop {
            if let Some(&below_a) = tagged.get(&cursor) {
                return Ok(Meeting {
                    a: ia,
                    b: ib,
                    mrca: cursor,
                    below_a,
                    below_b: previous,
                });
            }
            let node = self.record(cursor, b)?;
            if node.is_coalescent() && !extended {
                self.tag_trunk(entry_a, a, &mut tagged)?;
                extended = true;
                continue;
            }
            previous = cursor;
            cursor = node.parent().ok_or(GenebankError::BrokenAncestry(b))?;
        }
    }

    /// Tags `start` and its ancestors up to and including the first
    /// coalescent one, which is returned. Each tag maps to the child it was
    /// reached from (`start` maps to itself).
    fn tag_lineage(
        &self,
        start: NodeIndex,
        from: GenotypeId,
        tagged: &mut HashMap<NodeIndex, NodeIndex>,
    ) -> Result<NodeIndex, GenebankError> {
        let mut previous = start;
        let mut cursor = start;
        loop {
            let node = self.record(cursor, from)?;
            tagged.insert(cursor, previous);
            if node.is_coalescent() {
                return Ok(cursor);
            }
            previous = cursor;
            cursor = node.parent().ok_or(GenebankError::BrokenAncestry(from))?;
        }
    }

    /// Continues tagging from a coalescent `entry` up to the root.
    fn tag_trunk(
        &self,
        entry: NodeIndex,
        from: GenotypeId,
        tagged: &mut HashMap<NodeIndex, NodeIndex>,
    ) -> Result<(), GenebankError> {
        let mut previous = entry;
        let mut cursor = self.record(entry, from)?.parent();
        while let Some(idx) = cursor {
            tagged.insert(idx, previous);
            previous = idx;
            cursor = self.record(idx, from)?.parent();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genotype::{ALIVE, NO_PARENT};
    use itertools::Itertools;

    /// ```text
    ///          0          depth 0, birth 0
    ///          |
    ///          1          depth 1, birth 10
    ///         / \
    ///        2   3        depth 2, birth 20 / 25
    ///       / \   \
    ///      4   5   6      depth 3, birth 30 / 35 / 40
    ///              |
    ///              7      depth 4, birth 50
    /// ```
    fn sample_bank() -> Genebank {
        let mut bank = Genebank::new();
        let records = [
            (0, NO_PARENT, 0, 0, "AAAA"),
            (1, 0, 1, 10, "AAAB"),
            (2, 1, 2, 20, "AABB"),
            (3, 1, 2, 25, "AAAC"),
            (4, 2, 3, 30, "ABBB"),
            (5, 2, 3, 35, "AABC"),
            (6, 3, 3, 40, "AACC"),
            (7, 6, 4, 50, "ACCC"),
        ];
        for (id, parent, depth, birth, genes) in records {
            bank.create(id, parent, depth, birth, ALIVE, genes).unwrap();
        }
        bank.link();
        bank.check_coalescence(4).unwrap();
        bank
    }

    fn coalescent_ids(bank: &Genebank) -> Vec<GenotypeId> {
        bank.summary()
            .into_iter()
            .filter(|row| row.coalescent)
            .map(|row| row.id)
            .collect()
    }

    #[test]
    fn test_duplicate_create_is_rejected() {
        let mut bank = Genebank::new();
        bank.create(1, NO_PARENT, 0, 0, ALIVE, "A").unwrap();
        assert_eq!(
            bank.create(1, NO_PARENT, 0, 0, ALIVE, "A"),
            Err(GenebankError::DuplicateGenotype(1))
        );
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn test_link_counts_one_reference_per_child() {
        let bank = sample_bank();
        let total: u32 = bank.iter().map(Genotype::count).sum();
        assert_eq!(total as usize, bank.len() - 1);

        let summary = bank.summary();
        assert_eq!(summary[0].parent, None);
        assert_eq!(summary[1].count, 2);
        assert_eq!(summary[2].count, 2);
        assert_eq!(summary[3].count, 1);
        assert_eq!(summary[7].parent, Some(6));
        assert_eq!(summary[7].count, 0);
    }

    #[test]
    fn test_missing_parent_becomes_root() {
        let mut bank = Genebank::new();
        bank.create(10, 99, 5, 0, ALIVE, "A").unwrap();
        bank.link();
        assert_eq!(bank.get(10).unwrap().parent(), None);
    }

    #[test]
    fn test_coalescence_marks_trunk_only() {
        let bank = sample_bank();
        // Root and the single-child stretch below it; 1 branches, so 2 and 4 stay unmarked.
        assert_eq!(coalescent_ids(&bank), vec![0, 1]);
    }

    #[test]
    fn test_coalescence_from_other_leaf_is_stable() {
        let mut bank = sample_bank();
        assert!(!bank.check_coalescence(7).unwrap());
        assert_eq!(coalescent_ids(&bank), vec![0, 1]);
        assert!(bank.check_coalescence(1).unwrap());
    }

    #[test]
    fn test_coalescence_on_chain_marks_everything() {
        let mut bank = Genebank::new();
        for id in 0..5 {
            bank.create(id, id - 1, id, id * 10, ALIVE, "AAAA").unwrap();
        }
        bank.link();
        assert!(bank.check_coalescence(4).unwrap());
        assert_eq!(coalescent_ids(&bank), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_mrca() {
        let bank = sample_bank();
        assert_eq!(bank.mrca(4, 5).unwrap(), 2);
        assert_eq!(bank.mrca(4, 7).unwrap(), 1);
        assert_eq!(bank.mrca(7, 6).unwrap(), 6);
        assert_eq!(bank.mrca(2, 4).unwrap(), 2);
    }

    #[test]
    fn test_tree_distance_hand_built() {
        let bank = sample_bank();
        assert_eq!(bank.tree_distance(4, 5).unwrap(), 2);
        assert_eq!(bank.tree_distance(4, 7).unwrap(), 5);
        assert_eq!(bank.tree_distance(2, 4).unwrap(), 1);
        assert_eq!(bank.tree_distance(0, 7).unwrap(), 4);
        assert_eq!(bank.tree_distance(5, 6).unwrap(), 4);
    }

    #[test]
    fn test_tree_distance_properties() {
        let bank = sample_bank();
        for id in 0..8 {
            assert_eq!(bank.tree_distance(id, id).unwrap(), 0);
            assert_eq!(bank.hamming_distance(id, id).unwrap(), 0);
        }
        for pair in (0..8).combinations(2) {
            let (a, b) = (pair[0], pair[1]);
            assert_eq!(bank.tree_distance(a, b), bank.tree_distance(b, a));
            assert_eq!(bank.hamming_distance(a, b), bank.hamming_distance(b, a));

            let mrca = bank.get(bank.mrca(a, b).unwrap()).unwrap();
            let expected = bank.get(a).unwrap().tree_depth() + bank.get(b).unwrap().tree_depth()
                - 2 * mrca.tree_depth();
            assert_eq!(bank.tree_distance(a, b).unwrap(), expected);
        }
    }

    #[test]
    fn test_trunk_member_above_entry_point() {
        let bank = sample_bank();
        // 1 and 0 are both on the trunk; b sits above a's entry point.
        assert_eq!(bank.tree_distance(1, 0).unwrap(), 1);
        assert_eq!(bank.tree_distance(4, 0).unwrap(), 3);
        assert_eq!(bank.mrca(7, 0).unwrap(), 0);
        assert_eq!(bank.mrca(0, 7).unwrap(), 0);
        // Offspring of the MRCA 0 on 4's side is 1 (birth 10).
        assert_eq!(bank.mrca_birth_distance(4, 0).unwrap(), 30 + 0 - 10 - 0);
        assert_eq!(bank.mrca_birth_distance(0, 4).unwrap(), 20);
    }

    #[test]
    fn test_chain_seeded_from_leaf_is_symmetric() {
        let mut bank = Genebank::new();
        for id in 0..5 {
            bank.create(id, id - 1, id, id * 10, ALIVE, "AAAA").unwrap();
        }
        bank.link();
        bank.check_coalescence(4).unwrap();
        for a in 0..5 {
            for b in 0..5 {
                assert_eq!(bank.tree_distance(a, b).unwrap(), (a - b).abs());
                assert_eq!(bank.mrca(a, b).unwrap(), a.min(b));
            }
        }
    }

    #[test]
    fn test_hamming_distance() {
        let bank = sample_bank();
        assert_eq!(bank.hamming_distance(0, 1).unwrap(), 1);
        assert_eq!(bank.hamming_distance(4, 7).unwrap(), 3);
        assert_eq!(bank.hamming_distance(5, 6).unwrap(), 1);
    }

    #[test]
    fn test_hamming_length_mismatch_is_undefined() {
        let mut bank = Genebank::new();
        bank.create(0, NO_PARENT, 0, 0, ALIVE, "AAAA").unwrap();
        bank.create(1, 0, 1, 1, ALIVE, "AAA").unwrap();
        bank.create(2, 0, 1, 1, ALIVE, "BBB").unwrap();
        bank.link();
        assert_eq!(bank.hamming_distance(0, 1).unwrap(), UNDEFINED_DISTANCE);
        assert_eq!(bank.hamming_distance(2, 0).unwrap(), UNDEFINED_DISTANCE);
        assert_eq!(bank.hamming_distance(1, 2).unwrap(), 3);
    }

    #[test]
    fn test_mrca_birth_distance() {
        let bank = sample_bank();
        // Siblings: each side's offspring of the MRCA is the input itself.
        assert_eq!(bank.mrca_birth_distance(4, 5).unwrap(), 0);
        // MRCA 1, offspring 2 (birth 20) and 3 (birth 25).
        assert_eq!(bank.mrca_birth_distance(4, 7).unwrap(), 30 + 50 - 20 - 25);
        assert_eq!(bank.mrca_birth_distance(7, 4).unwrap(), 35);
        // Ancestor and descendant: 2 is the MRCA and its own offspring.
        assert_eq!(bank.mrca_birth_distance(2, 4).unwrap(), 20 + 30 - 20 - 30);
        for id in 0..8 {
            assert_eq!(bank.mrca_birth_distance(id, id).unwrap(), 0);
        }
    }

    #[test]
    fn test_unrelated_lineage_is_broken_ancestry() {
        // Created after linking: 11 never gets a parent handle.
        let mut bank = sample_bank();
        bank.create(11, 10, 1, 5, ALIVE, "AAAA").unwrap();
        assert_eq!(bank.tree_distance(11, 4), Err(GenebankError::BrokenAncestry(11)));

        // Two separate roots; only the first one is on the seeded path.
        let mut split = Genebank::new();
        split.create(0, NO_PARENT, 0, 0, ALIVE, "A").unwrap();
        split.create(1, 0, 1, 1, ALIVE, "A").unwrap();
        split.create(10, NO_PARENT, 0, 0, ALIVE, "A").unwrap();
        split.create(11, 10, 1, 1, ALIVE, "A").unwrap();
        split.link();
        split.check_coalescence(1).unwrap();

        assert_eq!(split.tree_distance(11, 1), Err(GenebankError::BrokenAncestry(11)));
        assert_eq!(split.tree_distance(1, 11), Err(GenebankError::BrokenAncestry(11)));
    }

    #[test]
    fn test_unknown_genotype() {
        let bank = sample_bank();
        assert_eq!(bank.tree_distance(4, 42), Err(GenebankError::UnknownGenotype(42)));
        assert_eq!(bank.hamming_distance(42, 4), Err(GenebankError::UnknownGenotype(42)));
    }

    #[test]
    fn test_remove_leaf_releases_parent() {
        let mut bank = sample_bank();
        assert_eq!(bank.remove(4), 1);
        assert!(!bank.contains(4));
        assert_eq!(bank.get(2).unwrap().count(), 1);
    }

    #[test]
    fn test_remove_chain_stops_at_shared_ancestor() {
        let mut bank = sample_bank();
        // 7 -> 6 -> 3 go away; 1 still has child 2.
        assert_eq!(bank.remove(7), 3);
        for id in [7, 6, 3] {
            assert!(!bank.contains(id));
        }
        assert_eq!(bank.get(1).unwrap().count(), 1);
        assert_eq!(bank.len(), 5);
    }

    #[test]
    fn test_held_record_survives_release() {
        let mut bank = sample_bank();
        bank.hold(6).unwrap();
        assert_eq!(bank.remove(7), 1);
        assert!(bank.contains(6));
        assert_eq!(bank.get(6).unwrap().count(), 1);
        assert_eq!(bank.remove(6), 2);
        assert!(!bank.contains(3));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut bank = sample_bank();
        assert_eq!(bank.remove(42), 0);
        assert_eq!(bank.len(), 8);
    }
}
