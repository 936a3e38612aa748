//! Pairwise distance matrices over the sampled population.
//!
//! Three lineage metrics are available, all evaluated by the same driver:
//!
//! 1. **Tree**: generations separating two organisms through their most
//!    recent common ancestor, `depth(a) + depth(b) - 2 depth(mrca)`.
//!
//! 2. **Hamming**: number of genome positions that differ. Undefined
//!    (`UNDEFINED_DISTANCE`) for genomes of different lengths.
//!
//! 3. **MRCA birth**: time elapsed on each side since the lineages split,
//!    measured from the birth of the MRCA's offspring on each side.
//!
//! Only the current population becomes rows and columns; historic organisms
//! take part solely as ancestors.

use rayon::prelude::*;

use crate::genebank::{Genebank, GenebankError, UNDEFINED_DISTANCE};
use crate::genotype::GenotypeId;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Metric {
    #[default]
    Tree,
    Hamming,
    MrcaBirth,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Tree => "tree",
            Metric::Hamming => "Hamming",
            Metric::MrcaBirth => "MRCA birth",
        }
    }

    /// Distance between two stored genotypes under this metric.
    pub fn distance(&self, bank: &Genebank, a: GenotypeId, b: GenotypeId) -> Result<i64, GenebankError> {
        match self {
            Metric::Tree => bank.tree_distance(a, b),
            Metric::Hamming => bank.hamming_distance(a, b),
            Metric::MrcaBirth => bank.mrca_birth_distance(a, b),
        }
    }
}

/// Symmetric distance matrix with its summary statistics.
///
/// # Fields
/// - `ids`: organism id of each row/column
/// - `values`: `values[i][j]` is the distance between `ids[i]` and `ids[j]`
/// - `max_distance`: largest defined entry (0 for an empty matrix)
/// - `average_distance`: sum of all defined entries divided by N²
/// - `undefined_pairs`: unordered pairs whose entry is `UNDEFINED_DISTANCE`
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    pub ids: Vec<GenotypeId>,
    pub values: Vec<Vec<i64>>,
    pub max_distance: i64,
    pub average_distance: f64,
    pub undefined_pairs: usize,
}

impl DistanceMatrix {
    /// Computes the matrix for `population` in parallel.
    ///
    /// Every unordered pair, self-pairs included, is evaluated once and
    /// mirrored across the diagonal.
    ///
    /// # Errors
    /// Propagates the first `GenebankError` raised by a pair (unknown ids or
    /// broken ancestry).
    pub fn compute(bank: &Genebank, population: &[GenotypeId], metric: Metric) -> Result<Self, GenebankError> {
        let n = population.len();

        let pairs: Vec<(usize, usize, i64)> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| (i..n).map(move |j| (i, j)))
            .map(|(i, j)| {
                metric
                    .distance(bank, population[i], population[j])
                    .map(|dist| (i, j, dist))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_pairs(population.to_vec(), pairs))
    }

    /// Assembles a matrix from upper-triangle entries `(i, j, dist)` with `i <= j`.
    pub fn from_pairs(ids: Vec<GenotypeId>, pairs: Vec<(usize, usize, i64)>) -> Self {
        let n = ids.len();
        let mut values = vec![vec![0i64; n]; n];
        let mut max_distance = 0;
        let mut total: i64 = 0;
        let mut undefined_pairs = 0;

        for (i, j, dist) in pairs {
            values[i][j] = dist;
            values[j][i] = dist;

            if dist == UNDEFINED_DISTANCE {
                undefined_pairs += 1;
                continue;
            }
            total += if i == j { dist } else { 2 * dist };
            max_distance = max_distance.max(dist);
        }

        let average_distance = if n == 0 {
            0.0
        } else {
            total as f64 / (n * n) as f64
        };

        DistanceMatrix {
            ids,
            values,
            max_distance,
            average_distance,
            undefined_pairs,
        }
    }

    /// Builds a matrix from a full square table, reading its upper triangle.
    pub fn from_values(ids: Vec<GenotypeId>, values: Vec<Vec<i64>>) -> Self {
        let n = ids.len();
        let pairs = (0..n)
            .flat_map(|i| (i..n).map(move |j| (i, j)))
            .map(|(i, j)| (i, j, values[i][j]))
            .collect();
        Self::from_pairs(ids, pairs)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> i64 {
        self.values[i][j]
    }
}
