use super::bond::Bond;
use super::ids::BondId;
use std::collections::HashMap;
use thiserror::Error;

/// One adjacency entry of an atom: the neighbouring atom and the bond that connects them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ligand {
    /// The id of the neighbouring atom.
    pub atom_id: String,
    /// The bond realising the connection.
    pub bond: BondId,
}

/// Errors raised while editing the ligand records of an atom array.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LigandError {
    #[error("Atom '{atom}' is not registered in the atom array")]
    UnknownAtom { atom: String },
    #[error("Atom '{atom}' has no ligand '{other}' via bond {bond:?}")]
    NotFound {
        atom: String,
        other: String,
        bond: BondId,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AtomArrayError {
    #[error("Duplicate atom id '{0}' in atom array")]
    DuplicateAtomId(String),
    #[error("Atom id must not be blank")]
    BlankAtomId,
}

/// Represents an atom of a molecule together with its ligand (adjacency) record.
///
/// Ligands are maintained by the bond array that owns the molecule's bonds;
/// callers only read them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    id: String,
    ligands: Vec<Ligand>,
}

impl Atom {
    /// Creates a new `Atom` with no ligands.
    ///
    /// # Arguments
    ///
    /// * `id` - The identifier of the atom, unique within its molecule.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.trim().to_string(),
            ligands: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ligands(&self) -> &[Ligand] {
        &self.ligands
    }

    /// Returns `true` if this atom lists `other` as a ligand through `bond`.
    pub fn has_ligand(&self, other: &str, bond: BondId) -> bool {
        self.ligands
            .iter()
            .any(|l| l.bond == bond && l.atom_id == other)
    }

    fn add_ligand(&mut self, other: &str, bond: BondId) -> bool {
        if self.has_ligand(other, bond) {
            return false;
        }
        self.ligands.push(Ligand {
            atom_id: other.to_string(),
            bond,
        });
        true
    }

    fn clear_ligand(&mut self, other: &str, bond: BondId) -> bool {
        let before = self.ligands.len();
        self.ligands
            .retain(|l| !(l.bond == bond && l.atom_id == other));
        self.ligands.len() != before
    }

    fn clear_ligands(&mut self) {
        self.ligands.clear();
    }
}

/// The atoms of one molecule, addressable by id, in insertion order.
///
/// Besides storage, this is the registry through which bond indexing keeps
/// every atom's ligand record in step with the molecule's bonds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomArray {
    atoms: Vec<Atom>,
    index: HashMap<String, usize>,
}

impl AtomArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an atom array from bare atom ids.
    ///
    /// # Errors
    ///
    /// Returns [`AtomArrayError`] on a blank or repeated id.
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<Self, AtomArrayError> {
        let mut array = Self::new();
        for id in ids {
            array.add_atom(Atom::new(id))?;
        }
        Ok(array)
    }

    /// Appends an atom to the array.
    ///
    /// # Errors
    ///
    /// Returns [`AtomArrayError::DuplicateAtomId`] if an atom with the same id is
    /// already registered, or [`AtomArrayError::BlankAtomId`] for an empty id.
    pub fn add_atom(&mut self, atom: Atom) -> Result<(), AtomArrayError> {
        if atom.id.is_empty() {
            return Err(AtomArrayError::BlankAtomId);
        }
        if self.index.contains_key(&atom.id) {
            return Err(AtomArrayError::DuplicateAtomId(atom.id));
        }
        self.index.insert(atom.id.clone(), self.atoms.len());
        self.atoms.push(atom);
        Ok(())
    }

    pub fn atom(&self, id: &str) -> Option<&Atom> {
        self.index.get(id).map(|&i| &self.atoms[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter()
    }

    pub fn ligands_of(&self, id: &str) -> Option<&[Ligand]> {
        self.atom(id).map(Atom::ligands)
    }

    /// Resolves both endpoints of a bond against this array.
    ///
    /// Returns `Some` only when the bond names two distinct atoms that are
    /// both registered here.
    pub fn resolve_endpoints<'b>(&self, bond: &'b Bond) -> Option<[&'b str; 2]> {
        let [a, b] = bond.atom_refs();
        (a != b && self.contains(a) && self.contains(b)).then_some([a, b])
    }

    /// Drops the ligand record of every atom.
    pub fn clear_ligand_info(&mut self) {
        self.atoms.iter_mut().for_each(Atom::clear_ligands);
    }

    /// Records `other` as a ligand of `atom` through `bond`.
    ///
    /// Adding an entry that already exists is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`LigandError::UnknownAtom`] if `atom` is not registered.
    pub fn add_ligand(&mut self, atom: &str, bond: BondId, other: &str) -> Result<(), LigandError> {
        self.atom_mut(atom)?.add_ligand(other, bond);
        Ok(())
    }

    /// Removes the ligand entry `(other, bond)` from `atom`.
    ///
    /// # Errors
    ///
    /// Returns [`LigandError::UnknownAtom`] if `atom` is not registered, or
    /// [`LigandError::NotFound`] if the entry does not exist.
    pub fn clear_ligand(
        &mut self,
        atom: &str,
        bond: BondId,
        other: &str,
    ) -> Result<(), LigandError> {
        if self.atom_mut(atom)?.clear_ligand(other, bond) {
            Ok(())
        } else {
            Err(LigandError::NotFound {
                atom: atom.to_string(),
                other: other.to_string(),
                bond,
            })
        }
    }

    fn atom_mut(&mut self, id: &str) -> Result<&mut Atom, LigandError> {
        match self.index.get(id) {
            Some(&i) => Ok(&mut self.atoms[i]),
            None => Err(LigandError::UnknownAtom {
                atom: id.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::bond::BondOrder;
    use slotmap::KeyData;

    fn dummy_bond_id(n: u64) -> BondId {
        BondId::from(KeyData::from_ffi(n))
    }

    fn create_three_atom_array() -> AtomArray {
        AtomArray::from_ids(["a1", "a2", "a3"]).unwrap()
    }

    #[test]
    fn new_atom_has_trimmed_id_and_no_ligands() {
        let atom = Atom::new(" a1 ");
        assert_eq!(atom.id(), "a1");
        assert!(atom.ligands().is_empty());
    }

    #[test]
    fn add_atom_rejects_duplicate_and_blank_ids() {
        let mut array = create_three_atom_array();
        assert_eq!(
            array.add_atom(Atom::new("a2")),
            Err(AtomArrayError::DuplicateAtomId("a2".to_string()))
        );
        assert_eq!(array.add_atom(Atom::new("  ")), Err(AtomArrayError::BlankAtomId));
        assert_eq!(array.len(), 3);
    }

    #[test]
    fn atoms_are_kept_in_insertion_order() {
        let array = create_three_atom_array();
        let ids: Vec<&str> = array.iter().map(Atom::id).collect();
        assert_eq!(ids, vec!["a1", "a2", "a3"]);
        assert!(array.contains("a3"));
        assert!(!array.contains("a4"));
        assert!(!array.is_empty());
    }

    #[test]
    fn add_ligand_is_idempotent() {
        let mut array = create_three_atom_array();
        let bond = dummy_bond_id(1);
        array.add_ligand("a1", bond, "a2").unwrap();
        array.add_ligand("a1", bond, "a2").unwrap();

        let ligands = array.ligands_of("a1").unwrap();
        assert_eq!(ligands.len(), 1);
        assert_eq!(ligands[0].atom_id, "a2");
        assert_eq!(ligands[0].bond, bond);
        assert!(array.ligands_of("a2").unwrap().is_empty());
    }

    #[test]
    fn add_ligand_to_unknown_atom_fails() {
        let mut array = create_three_atom_array();
        assert_eq!(
            array.add_ligand("zz", dummy_bond_id(1), "a1"),
            Err(LigandError::UnknownAtom {
                atom: "zz".to_string()
            })
        );
    }

    #[test]
    fn clear_ligand_removes_only_matching_entry() {
        let mut array = create_three_atom_array();
        let b12 = dummy_bond_id(1);
        let b13 = dummy_bond_id(2);
        array.add_ligand("a1", b12, "a2").unwrap();
        array.add_ligand("a1", b13, "a3").unwrap();

        array.clear_ligand("a1", b12, "a2").unwrap();

        let atom = array.atom("a1").unwrap();
        assert!(!atom.has_ligand("a2", b12));
        assert!(atom.has_ligand("a3", b13));
    }

    #[test]
    fn clear_missing_ligand_reports_not_found() {
        let mut array = create_three_atom_array();
        let bond = dummy_bond_id(9);
        array.add_ligand("a1", dummy_bond_id(1), "a2").unwrap();

        let err = array.clear_ligand("a1", bond, "a2").unwrap_err();
        assert_eq!(
            err,
            LigandError::NotFound {
                atom: "a1".to_string(),
                other: "a2".to_string(),
                bond,
            }
        );
        assert_eq!(array.ligands_of("a1").unwrap().len(), 1);
    }

    #[test]
    fn clear_ligand_info_empties_every_atom() {
        let mut array = create_three_atom_array();
        array.add_ligand("a1", dummy_bond_id(1), "a2").unwrap();
        array.add_ligand("a2", dummy_bond_id(1), "a1").unwrap();
        array.add_ligand("a3", dummy_bond_id(2), "a2").unwrap();

        array.clear_ligand_info();

        assert!(array.iter().all(|a| a.ligands().is_empty()));
        assert_eq!(array.len(), 3);
    }

    #[test]
    fn resolve_endpoints_requires_two_registered_distinct_atoms() {
        let array = create_three_atom_array();
        let ok = Bond::new("a1", "a2", BondOrder::Single);
        let missing = Bond::new("a1", "x9", BondOrder::Single);
        let self_bond = Bond::new("a1", "a1", BondOrder::Single);

        assert_eq!(array.resolve_endpoints(&ok), Some(["a1", "a2"]));
        assert_eq!(array.resolve_endpoints(&missing), None);
        assert_eq!(array.resolve_endpoints(&self_bond), None);
    }
}
