//! Crate root: lightweight module orchestration and public re-exports.
//!
//! Modules:
//! - `genotype`: lineage record of a single organism.
//! - `genebank`: reference-counted ancestry store, coalescence and MRCA distances.
//! - `distances`: metric selection + parallel distance matrix builder.
//! - `picker`: greedy representative selection and nearest-representative assignment.
//! - `io`: reading population dumps and writing cluster reports.
//! - `api`: Python bindings via `pyo3` (gated behind "python" feature).

pub mod genotype;
pub mod genebank;
pub mod distances;
pub mod picker;
pub mod io;

#[cfg(feature = "python")]
pub mod api;

// Re-export frequently used types & functions
pub use genotype::{Genotype, GenotypeId};
pub use genebank::{Genebank, GenebankError, UNDEFINED_DISTANCE};
pub use distances::{DistanceMatrix, Metric};
pub use picker::{
    Assignment, PickIdentity, PickList, PickerConfig, assign_to_representatives,
    pick_representatives,
};
pub use io::{load_population, write_cluster_report, write_matrix_tsv};
