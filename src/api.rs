//! Python binding layer for lineage clustering.
//!
//! Provides a single Python function running the whole pipeline on a pair of
//! population dumps.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::distances::{DistanceMatrix, Metric};
use crate::io::load_population;
use crate::picker::{PickIdentity, PickerConfig, assign_to_representatives, pick_representatives};

type Clustering = (
    Vec<i64>,
    Vec<Vec<i64>>,
    Vec<(i64, i64)>,
    Vec<(i64, i64, i64)>,
);

/// Compute a lineage distance matrix and greedy representatives.
///
/// Args:
///     detail: Path to the current population dump (optionally .gz)
///     historic: Path to the historic population dump (optionally .gz)
///     metric: "tree", "hamming" or "mrca-birth" (default: "tree")
///     cutoff: Minimum coverage value for picks after the first (default: 1)
///     max_picks: Maximum number of picks (default: 100)
///     stable_rows: Record picked matrix rows instead of active-set positions (default: False)
///
/// Returns:
///     A tuple of (ids, distance_matrix, picks, assignments) where:
///     - ids is the list of current organism ids (matrix row order)
///     - distance_matrix is a 2D list of distances
///     - picks is a list of (organism id, coverage value)
///     - assignments is a list of (organism id, representative id, distance)
///
/// Raises:
///     ValueError: On unreadable or malformed input, unknown metric, or broken ancestry
#[pyfunction]
#[pyo3(signature = (detail, historic, metric="tree", cutoff=1, max_picks=100, stable_rows=false))]
fn cluster_population(
    detail: String,
    historic: String,
    metric: &str,
    cutoff: i64,
    max_picks: usize,
    stable_rows: bool,
) -> PyResult<Clustering> {
    let metric = match metric {
        "tree" => Metric::Tree,
        "hamming" => Metric::Hamming,
        "mrca-birth" => Metric::MrcaBirth,
        other => return Err(PyValueError::new_err(format!("Unknown metric '{}'", other))),
    };
    if max_picks == 0 {
        return Err(PyValueError::new_err("max_picks must be at least 1"));
    }

    let (bank, population) = load_population(&detail, &historic)
        .map_err(|e| PyValueError::new_err(format!("Failed to load population: {}", e)))?;

    let matrix = DistanceMatrix::compute(&bank, &population, metric)
        .map_err(|e| PyValueError::new_err(format!("Failed to compute distances: {}", e)))?;

    let config = PickerConfig {
        cutoff,
        max_picks,
        identity: if stable_rows {
            PickIdentity::StableRow
        } else {
            PickIdentity::ActiveSetPosition
        },
    };
    let picks = pick_representatives(&matrix, &config);
    let assignments = assign_to_representatives(&matrix, &picks)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

    let pick_values = picks
        .picks
        .iter()
        .map(|pick| (matrix.ids[pick.row], pick.coverage))
        .collect();
    let assigned = assignments
        .iter()
        .map(|a| (a.organism, a.representative, a.distance))
        .collect();

    Ok((matrix.ids, matrix.values, pick_values, assigned))
}

/// Python module definition
#[pymodule]
fn lineage_clusters(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(cluster_population, m)?)?;
    Ok(())
}
