use super::error::IndexIssue;
use crate::core::models::atom::AtomArray;
use crate::core::models::bond::{Bond, BondHash};
use crate::core::models::ids::{BondId, MoleculeId};
use std::collections::HashMap;
use tracing::{debug, warn};

/// How the shared indexing routine treats conflicts.
///
/// Both modes skip a conflicting bond in the same way; they differ in who is
/// told about it. `Strict` hands every issue back to the caller of `insert`,
/// which turns them into an error. `Lenient` is used by `reindex` to recover a
/// best-effort view of loaded data: issues are logged and collected into the
/// report, and indexing carries on with the next bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    Strict,
    Lenient,
}

/// What happened to one bond during indexing.
#[derive(Debug, Default)]
pub(crate) struct IndexOutcome {
    /// The bond was entered in the hash map.
    pub hashed: bool,
    /// Ligand entries were added to both endpoint atoms.
    pub linked: bool,
    pub issues: Vec<IndexIssue>,
}

/// The ordered bonds of one molecule and the indexes derived from them.
///
/// The sequence is authoritative. The hash map (canonical atom-pair hash to
/// bond) and the id map (non-blank bond id to bond) are rebuilt from it by
/// reindexing and kept in step with it by every mutation made through
/// [`Document`](super::document::Document).
///
/// A bond array reaches its atoms only through the explicit `molecule` handle;
/// while it is `None`, no bond can be indexed.
#[derive(Debug, Clone, Default)]
pub struct BondArray {
    pub(crate) molecule: Option<MoleculeId>,
    pub(crate) order: Vec<BondId>,
    hash_index: HashMap<BondHash, BondId>,
    id_index: HashMap<String, BondId>,
}

impl BondArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// The molecule this array is attached to, if any.
    pub fn molecule(&self) -> Option<MoleculeId> {
        self.molecule
    }

    /// Number of bonds in the sequence.
    ///
    /// This can exceed [`indexed_count`](Self::indexed_count) when a conflicting
    /// bond was retained without being indexed.
    pub fn size(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of bonds present in the hash map.
    pub fn indexed_count(&self) -> usize {
        self.hash_index.len()
    }

    pub fn contains(&self, bond: BondId) -> bool {
        self.order.contains(&bond)
    }

    pub fn position(&self, bond: BondId) -> Option<usize> {
        self.order.iter().position(|&b| b == bond)
    }

    /// Returns a snapshot of the bond sequence.
    pub fn bonds_in_order(&self) -> Vec<BondId> {
        self.order.clone()
    }

    pub fn lookup_by_hash(&self, hash: &str) -> Option<BondId> {
        self.hash_index.get(hash).copied()
    }

    pub fn lookup_by_atom_pair(&self, atom1: &str, atom2: &str) -> Option<BondId> {
        let hash = BondHash::from_atom_refs(atom1, atom2)?;
        self.hash_index.get(&hash).copied()
    }

    pub fn lookup_by_id(&self, id: &str) -> Option<BondId> {
        self.id_index.get(id).copied()
    }

    /// Lists the conflicts that indexing `bond` would run into, without
    /// changing anything.
    pub(crate) fn conflicts(&self, bond: &Bond, molecule_id: &str) -> Vec<IndexIssue> {
        let mut issues = Vec::new();
        if let Some(hash) = bond.hash() {
            if self.hash_index.contains_key(&hash) {
                issues.push(duplicate_bond(bond, hash, molecule_id));
            }
        }
        if let Some(id) = bond.indexable_id() {
            if self.id_index.contains_key(id) {
                issues.push(duplicate_id(id, molecule_id));
            }
        }
        issues
    }

    /// Enters one bond in the hash and id maps and links its endpoint atoms.
    ///
    /// The hash step and the id step are independent: a conflict in one does
    /// not stop or undo the other. Ligands are only added when the hash step
    /// succeeded and both endpoints resolve in `atoms`.
    pub(crate) fn index_bond(
        &mut self,
        id: BondId,
        bond: &Bond,
        molecule_id: &str,
        atoms: Option<&mut AtomArray>,
        mode: IndexMode,
    ) -> IndexOutcome {
        let mut outcome = IndexOutcome::default();

        match bond.hash() {
            Some(hash) if self.hash_index.contains_key(&hash) => {
                outcome.issues.push(duplicate_bond(bond, hash, molecule_id));
            }
            Some(hash) => {
                self.hash_index.insert(hash, id);
                outcome.hashed = true;
                outcome.linked = atoms.is_some_and(|atoms| link_ligands(atoms, id, bond));
            }
            None => debug!("Not hashing degenerate {}", bond.describe()),
        }

        if let Some(bond_id) = bond.indexable_id() {
            if self.id_index.contains_key(bond_id) {
                outcome.issues.push(duplicate_id(bond_id, molecule_id));
            } else {
                self.id_index.insert(bond_id.to_string(), id);
            }
        }

        for issue in &outcome.issues {
            match mode {
                IndexMode::Strict => debug!("Indexing conflict: {}", issue),
                IndexMode::Lenient => warn!("Skipped while reindexing: {}", issue),
            }
        }
        if outcome.hashed && !outcome.linked {
            debug!("Endpoints of {} did not resolve to atoms", bond.describe());
        }

        outcome
    }

    /// Removes the hash and id entries of `bond`, but only those that point at `id`.
    pub(crate) fn unindex_bond(&mut self, id: BondId, bond: &Bond) {
        if let Some(hash) = bond.hash() {
            if self.hash_index.get(&hash) == Some(&id) {
                self.hash_index.remove(&hash);
            }
        }
        if let Some(bond_id) = bond.indexable_id() {
            if self.id_index.get(bond_id) == Some(&id) {
                self.id_index.remove(bond_id);
            }
        }
    }

    pub(crate) fn clear_indexes(&mut self) {
        self.hash_index.clear();
        self.id_index.clear();
    }
}

fn link_ligands(atoms: &mut AtomArray, id: BondId, bond: &Bond) -> bool {
    let Some([a, b]) = atoms.resolve_endpoints(bond) else {
        return false;
    };
    match atoms
        .add_ligand(a, id, b)
        .and_then(|()| atoms.add_ligand(b, id, a))
    {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to link ligands of {}: {}", bond.describe(), e);
            false
        }
    }
}

fn duplicate_bond(bond: &Bond, hash: BondHash, molecule_id: &str) -> IndexIssue {
    IndexIssue::DuplicateBond {
        bond_id: bond.id().map(str::to_string),
        hash,
        molecule_id: molecule_id.to_string(),
    }
}

fn duplicate_id(bond_id: &str, molecule_id: &str) -> IndexIssue {
    IndexIssue::DuplicateId {
        bond_id: bond_id.to_string(),
        molecule_id: molecule_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::bond::BondOrder;
    use slotmap::SlotMap;

    struct Fixture {
        bonds: SlotMap<BondId, Bond>,
        atoms: AtomArray,
        array: BondArray,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                bonds: SlotMap::with_key(),
                atoms: AtomArray::from_ids(["a1", "a2", "a3"]).unwrap(),
                array: BondArray::new(),
            }
        }

        fn index(&mut self, bond: Bond, mode: IndexMode) -> (BondId, IndexOutcome) {
            let id = self.bonds.insert(bond);
            self.array.order.push(id);
            let outcome =
                self.array
                    .index_bond(id, &self.bonds[id], "m1", Some(&mut self.atoms), mode);
            (id, outcome)
        }
    }

    #[test]
    fn new_array_is_empty_and_detached() {
        let array = BondArray::new();
        assert!(array.is_empty());
        assert_eq!(array.size(), 0);
        assert_eq!(array.indexed_count(), 0);
        assert!(array.molecule().is_none());
        assert!(array.bonds_in_order().is_empty());
    }

    #[test]
    fn index_bond_fills_maps_and_links_ligands() {
        let mut fx = Fixture::new();
        let (id, outcome) = fx.index(
            Bond::new("a1", "a2", BondOrder::Single).with_id("b1"),
            IndexMode::Strict,
        );

        assert!(outcome.hashed);
        assert!(outcome.linked);
        assert!(outcome.issues.is_empty());
        assert_eq!(fx.array.lookup_by_atom_pair("a2", "a1"), Some(id));
        assert_eq!(fx.array.lookup_by_hash("a1__a2"), Some(id));
        assert_eq!(fx.array.lookup_by_id("b1"), Some(id));
        assert!(fx.atoms.atom("a1").unwrap().has_ligand("a2", id));
        assert!(fx.atoms.atom("a2").unwrap().has_ligand("a1", id));
    }

    #[test]
    fn duplicate_hash_is_reported_and_id_still_indexed() {
        let mut fx = Fixture::new();
        let (first, _) = fx.index(Bond::new("a1", "a2", BondOrder::Single), IndexMode::Strict);
        let (second, outcome) = fx.index(
            Bond::new("a2", "a1", BondOrder::Double).with_id("b2"),
            IndexMode::Strict,
        );

        assert!(!outcome.hashed);
        assert!(matches!(
            outcome.issues.as_slice(),
            [IndexIssue::DuplicateBond { .. }]
        ));
        assert_eq!(fx.array.lookup_by_atom_pair("a1", "a2"), Some(first));
        assert_eq!(fx.array.lookup_by_id("b2"), Some(second));
        assert_eq!(fx.atoms.ligands_of("a1").unwrap().len(), 1);
    }

    #[test]
    fn duplicate_id_is_reported_and_hash_still_indexed() {
        let mut fx = Fixture::new();
        let (first, _) = fx.index(
            Bond::new("a1", "a2", BondOrder::Single).with_id("b1"),
            IndexMode::Strict,
        );
        let (second, outcome) = fx.index(
            Bond::new("a2", "a3", BondOrder::Single).with_id("b1"),
            IndexMode::Lenient,
        );

        assert!(outcome.hashed);
        assert!(matches!(
            outcome.issues.as_slice(),
            [IndexIssue::DuplicateId { bond_id, .. }] if bond_id == "b1"
        ));
        assert_eq!(fx.array.lookup_by_id("b1"), Some(first));
        assert_eq!(fx.array.lookup_by_atom_pair("a2", "a3"), Some(second));
    }

    #[test]
    fn unresolved_endpoints_are_hashed_but_not_linked() {
        let mut fx = Fixture::new();
        let (id, outcome) = fx.index(Bond::new("a1", "x9", BondOrder::Single), IndexMode::Strict);

        assert!(outcome.hashed);
        assert!(!outcome.linked);
        assert_eq!(fx.array.lookup_by_atom_pair("a1", "x9"), Some(id));
        assert!(fx.atoms.ligands_of("a1").unwrap().is_empty());
    }

    #[test]
    fn degenerate_bond_is_neither_hashed_nor_linked() {
        let mut fx = Fixture::new();
        let (_, outcome) = fx.index(Bond::new("a1", "a1", BondOrder::Single), IndexMode::Strict);

        assert!(!outcome.hashed);
        assert!(outcome.issues.is_empty());
        assert_eq!(fx.array.indexed_count(), 0);
    }

    #[test]
    fn conflicts_reports_both_kinds_without_mutating() {
        let mut fx = Fixture::new();
        fx.index(
            Bond::new("a1", "a2", BondOrder::Single).with_id("b1"),
            IndexMode::Strict,
        );

        let candidate = Bond::new("a2", "a1", BondOrder::Single).with_id("b1");
        let issues = fx.array.conflicts(&candidate, "m1");

        assert_eq!(issues.len(), 2);
        assert_eq!(fx.array.indexed_count(), 1);
    }

    #[test]
    fn unindex_bond_leaves_entries_owned_by_other_bonds() {
        let mut fx = Fixture::new();
        let (first, _) = fx.index(
            Bond::new("a1", "a2", BondOrder::Single).with_id("b1"),
            IndexMode::Strict,
        );
        let (second, _) = fx.index(
            Bond::new("a1", "a2", BondOrder::Single).with_id("b1"),
            IndexMode::Lenient,
        );

        let duplicate = fx.bonds[second].clone();
        fx.array.unindex_bond(second, &duplicate);
        assert_eq!(fx.array.lookup_by_atom_pair("a1", "a2"), Some(first));
        assert_eq!(fx.array.lookup_by_id("b1"), Some(first));

        let original = fx.bonds[first].clone();
        fx.array.unindex_bond(first, &original);
        assert!(fx.array.lookup_by_atom_pair("a1", "a2").is_none());
        assert!(fx.array.lookup_by_id("b1").is_none());
    }

    #[test]
    fn lookups_miss_cleanly() {
        let array = BondArray::new();
        assert!(array.lookup_by_hash("a1__a2").is_none());
        assert!(array.lookup_by_atom_pair("a1", "a2").is_none());
        assert!(array.lookup_by_atom_pair("a1", "a1").is_none());
        assert!(array.lookup_by_id("b1").is_none());
    }
}
