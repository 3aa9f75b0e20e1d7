//! # Engine Module
//!
//! The stateful layer: bond arrays, the derived indexes they keep, and the
//! document that owns molecules, bond arrays, and bonds.
//!
//! ## Architecture
//!
//! - **Bond Arrays** ([`bond_array`]) - The ordered bonds of a molecule with their
//!   atom-pair hash map and id map, plus the shared indexing routine
//! - **Document** ([`document`]) - Arena storage and every mutation that spans a bond,
//!   its array, and the atoms of the owning molecule (insert, remove, reindex, attach)
//! - **Configuration** ([`config`]) - Conflict policy and attach behaviour
//! - **Error Handling** ([`error`]) - Precondition errors versus data-quality issues
//!
//! ## Invariants
//!
//! After every operation completes, the hash map and the id map of a bond array
//! only refer to bonds in its sequence, and the ligand records of the owning
//! molecule's atoms describe exactly the bonds in the hash map whose endpoints
//! resolve. `insert` is strict about duplicates; `reindex` skips them.

pub mod bond_array;
pub mod config;
pub mod document;
pub mod error;
