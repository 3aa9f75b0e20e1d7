//! # cmlbond
//!
//! Bond-array indexing and atom ligand maintenance for molecules held in a
//! CML-style document.
//!
//! A molecule owns its atoms and references one bond array. The bond array
//! keeps its bonds in order and maintains two derived indexes: bonds keyed by
//! the unordered pair of atom ids they connect, and bonds keyed by their own
//! id. Every successful mutation also updates the ligand (adjacency) records
//! of the atoms a bond touches.
//!
//! ## Layers
//!
//! - **[`core`]: The Foundation.** Plain data models: atoms and their ligand
//!   records, bonds and their canonical hash, molecules.
//!
//! - **[`engine`]: The Logic Core.** The bond array, the document arena that
//!   owns everything, indexing configuration, and error types.
//!
//! ## Example
//!
//! ```
//! use cmlbond::core::models::{atom::AtomArray, bond::{Bond, BondOrder}, molecule::Molecule};
//! use cmlbond::engine::document::Document;
//!
//! let mut doc = Document::new();
//! let atoms = AtomArray::from_ids(["a1", "a2"]).unwrap();
//! let molecule = doc.add_molecule(Molecule::new("m1").with_atom_array(atoms));
//! let array = doc.create_bond_array();
//! doc.attach_bond_array(molecule, array).unwrap();
//!
//! let bond = doc.create_bond(Bond::new("a1", "a2", BondOrder::Single).with_id("b1"));
//! doc.add_bond(array, bond).unwrap();
//!
//! let bonds = doc.bond_array(array).unwrap();
//! assert_eq!(bonds.lookup_by_atom_pair("a2", "a1"), Some(bond));
//! assert_eq!(bonds.lookup_by_id("b1"), Some(bond));
//! ```

pub mod core;
pub mod engine;
