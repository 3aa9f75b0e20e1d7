use thiserror::Error;

use crate::core::models::bond::BondHash;
use crate::core::models::ids::{BondArrayId, BondId, MoleculeId};

/// Violated preconditions. These indicate a mistake by the caller; the
/// operation that raised one performed no mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("Bond array {0:?} does not exist in the document")]
    UnknownBondArray(BondArrayId),

    #[error("Bond {0:?} does not exist in the document")]
    UnknownBond(BondId),

    #[error("Molecule {0:?} does not exist in the document")]
    UnknownMolecule(MoleculeId),

    #[error("Bond already added to a bond array: {bond}")]
    AlreadyAttached { bond: String },

    #[error("Bond array is already attached to molecule '{molecule_id}'")]
    ArrayAlreadyAttached { molecule_id: String },

    #[error("Bond array is not attached to a molecule")]
    NoMoleculeContext,

    #[error("Cannot index bonds of molecule '{molecule_id}' without an atom array")]
    NoAtomRegistry { molecule_id: String },

    #[error("Insert position {position} is out of bounds for a bond array of size {size}")]
    PositionOutOfBounds { position: usize, size: usize },
}

/// Problems in the bond data itself, such as the repeated bonds found in
/// malformed chemical files. These are recoverable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexIssue {
    #[error(
        "Bond '{}' duplicates atom pair '{hash}' already indexed in molecule '{molecule_id}'",
        .bond_id.as_deref().unwrap_or("<no id>")
    )]
    DuplicateBond {
        bond_id: Option<String>,
        hash: BondHash,
        molecule_id: String,
    },

    #[error("Bond id '{bond_id}' is already indexed in molecule '{molecule_id}'")]
    DuplicateId { bond_id: String, molecule_id: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BondArrayError {
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// The bond could not be (fully) indexed. When `retained` is `true` the bond
    /// is structurally present in the array at the requested position but is
    /// missing from the index maps named by `issues`.
    #[error("Bond {bond:?} was {} with {} indexing issue(s): {}",
        outcome(.retained),
        .issues.len(),
        join_issues(.issues)
    )]
    Indexing {
        bond: BondId,
        retained: bool,
        issues: Vec<IndexIssue>,
    },
}

impl BondArrayError {
    /// Returns `true` when the failure stems from bad input data rather than
    /// from a violated precondition.
    pub fn is_data_quality(&self) -> bool {
        matches!(self, Self::Indexing { .. })
    }

    pub fn issues(&self) -> &[IndexIssue] {
        match self {
            Self::Indexing { issues, .. } => issues,
            Self::Structure(_) => &[],
        }
    }
}

fn outcome(retained: &bool) -> &'static str {
    if *retained { "retained" } else { "rejected" }
}

fn join_issues(issues: &[IndexIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
