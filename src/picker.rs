//! Greedy selection of representative organisms and nearest-representative
//! assignment.
//!
//! # Algorithm
//! Every organism starts "unreached" at twice the largest matrix distance.
//! Each round, every organism still in the active set is scored by its
//! coverage value:
//!
//! ```text
//! coverage(i) = Σ_j max(0, nearest[j] - d(i, j))     for j in active set
//! ```
//!
//! i.e. how much picking `i` would shrink the distance to the nearest
//! representative across the unpicked population. The best candidate (first
//! in active-set order on ties) is picked, `nearest` is lowered accordingly
//! and the pick leaves the active set by swap-with-last.
//!
//! The first pick is always kept. Later picks below the cutoff end the
//! selection and are not kept. Selection also stops after `max_picks` picks
//! or when the active set runs out.
//!
//! Undefined matrix entries ([`UNDEFINED_DISTANCE`]) are skipped: they add
//! nothing to a coverage value, never lower `nearest` and never win an
//! assignment.

use std::cmp::Reverse;

use rayon::prelude::*;
use thiserror::Error;

use crate::distances::DistanceMatrix;
use crate::genebank::UNDEFINED_DISTANCE;
use crate::genotype::GenotypeId;

pub const DEFAULT_CUTOFF: i64 = 1;
pub const DEFAULT_MAX_PICKS: usize = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PickError {
    #[error("No representatives were picked; cannot assign organisms")]
    NoRepresentatives,
}

/// Which index a pick hands on to the assignment pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PickIdentity {
    /// Position of the pick inside the active set at selection time. Because
    /// the active set is compacted after every pick, this is generally not
    /// the picked organism's row; it reproduces the historic cluster files.
    #[default]
    ActiveSetPosition,
    /// Matrix row of the picked organism.
    StableRow,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PickerConfig {
    /// Minimum coverage value for picks after the first one.
    pub cutoff: i64,
    /// Hard cap on the number of picks.
    pub max_picks: usize,
    pub identity: PickIdentity,
}

impl Default for PickerConfig {
    fn default() -> Self {
        PickerConfig {
            cutoff: DEFAULT_CUTOFF,
            max_picks: DEFAULT_MAX_PICKS,
            identity: PickIdentity::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pick {
    /// Matrix row of the picked organism.
    pub row: usize,
    /// Position of the picked organism in the active set when it was picked.
    pub position: usize,
    pub coverage: i64,
}

impl Pick {
    pub fn recorded(&self, identity: PickIdentity) -> usize {
        match identity {
            PickIdentity::ActiveSetPosition => self.position,
            PickIdentity::StableRow => self.row,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PickList {
    pub identity: PickIdentity,
    /// Kept picks, in selection order.
    pub picks: Vec<Pick>,
    /// The pick that fell below the cutoff and ended the selection, if any.
    pub rejected: Option<Pick>,
}

impl PickList {
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Matrix indices handed to the assignment pass, one per kept pick.
    pub fn recorded_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.picks.iter().map(|pick| pick.recorded(self.identity))
    }
}

/// Organism assigned to its nearest representative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub organism: GenotypeId,
    pub representative: GenotypeId,
    pub distance: i64,
}

/// Greedily picks representatives from `matrix`.
pub fn pick_representatives(matrix: &DistanceMatrix, config: &PickerConfig) -> PickList {
    let n = matrix.len();
    let mut nearest = vec![2 * matrix.max_distance; n];
    let mut active: Vec<usize> = (0..n).collect();
    let mut picks: Vec<Pick> = Vec::new();
    let mut rejected = None;

    while !active.is_empty() && picks.len() < config.max_picks {
        let (position, coverage) = best_candidate(matrix, &nearest, &active);
        let row = active[position];

        for &j in &active {
            let distance = matrix.get(row, j);
            if distance != UNDEFINED_DISTANCE {
                nearest[j] = nearest[j].min(distance);
            }
        }
        active.swap_remove(position);

        let pick = Pick {
            row,
            position,
            coverage,
        };
        if !picks.is_empty() && coverage < config.cutoff {
            rejected = Some(pick);
            break;
        }
        picks.push(pick);
    }

    PickList {
        identity: config.identity,
        picks,
        rejected,
    }
}

/// Position in `active` of the candidate with the largest coverage value,
/// the earliest one on ties, together with that value.
fn best_candidate(matrix: &DistanceMatrix, nearest: &[i64], active: &[usize]) -> (usize, i64) {
    active
        .par_iter()
        .enumerate()
        .map(|(position, &candidate)| {
            let coverage: i64 = active
                .iter()
                .filter_map(|&j| {
                    let distance = matrix.get(candidate, j);
                    (distance != UNDEFINED_DISTANCE).then(|| (nearest[j] - distance).max(0))
                })
                .sum();
            (position, coverage)
        })
        .max_by_key(|&(position, coverage)| (coverage, Reverse(position)))
        .unwrap_or((0, 0))
}

/// Assigns every organism of `matrix` to the recorded pick with the smallest
/// distance, the earliest pick on ties.
///
/// An organism whose distance to every pick is undefined goes to the first
/// pick with distance [`UNDEFINED_DISTANCE`].
///
/// # Errors
/// Returns `NoRepresentatives` if `picks` is empty.
pub fn assign_to_representatives(
    matrix: &DistanceMatrix,
    picks: &PickList,
) -> Result<Vec<Assignment>, PickError> {
    if picks.is_empty() {
        return Err(PickError::NoRepresentatives);
    }
    let rows: Vec<usize> = picks.recorded_rows().collect();
    let first = *rows.first().ok_or(PickError::NoRepresentatives)?;

    let assignments = (0..matrix.len())
        .map(|i| {
            let (closest, distance) = rows
                .iter()
                .map(|&row| (row, matrix.get(i, row)))
                .filter(|&(_, distance)| distance != UNDEFINED_DISTANCE)
                .min_by_key(|&(_, distance)| distance)
                .unwrap_or((first, UNDEFINED_DISTANCE));
            Assignment {
                organism: matrix.ids[i],
                representative: matrix.ids[closest],
                distance,
            }
        })
        .collect();
    Ok(assignments)
}
