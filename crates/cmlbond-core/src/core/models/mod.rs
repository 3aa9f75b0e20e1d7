//! # Core Models Module
//!
//! Plain data structures describing a molecule graph: atoms with their ligand
//! records, bonds with their canonical atom-pair hash, and molecules.
//!
//! ## Key Components
//!
//! - [`atom`] - Atoms, ligand entries, and the per-molecule [`atom::AtomArray`]
//! - [`bond`] - Bonds, bond orders, and the order-independent [`bond::BondHash`]
//! - [`molecule`] - A molecule owning its atom array and referencing its bond array
//! - [`ids`] - Arena keys for molecules, bond arrays, and bonds
//!
//! ## Usage
//!
//! ```ignore
//! use cmlbond::core::models::{atom::AtomArray, bond::{Bond, BondOrder}, molecule::Molecule};
//!
//! let atoms = AtomArray::from_ids(["a1", "a2"])?;
//! let molecule = Molecule::new("m1").with_atom_array(atoms);
//! let bond = Bond::new("a1", "a2", BondOrder::Double).with_id("b1");
//! ```

pub mod atom;
pub mod bond;
pub mod ids;
pub mod molecule;
