use super::atom::AtomArray;
use super::ids::BondArrayId;

/// A molecule: an id, an optional atom array, and the handle of its bond array.
///
/// The bond array itself lives in the owning document; the molecule only
/// records which one is attached. Attaching and detaching go through
/// [`Document`](crate::engine::document::Document) so that both sides of the
/// link stay consistent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Molecule {
    id: String,
    atom_array: Option<AtomArray>,
    pub(crate) bond_array: Option<BondArrayId>,
}

impl Molecule {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            atom_array: None,
            bond_array: None,
        }
    }

    pub fn with_atom_array(mut self, atoms: AtomArray) -> Self {
        self.atom_array = Some(atoms);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn atom_array(&self) -> Option<&AtomArray> {
        self.atom_array.as_ref()
    }

    pub fn atom_array_mut(&mut self) -> Option<&mut AtomArray> {
        self.atom_array.as_mut()
    }

    /// Replaces the atom array, returning the previous one.
    ///
    /// Ligand records of the new atoms are left as they are; reindex the
    /// molecule's bond array to rebuild them.
    pub fn set_atom_array(&mut self, atoms: AtomArray) -> Option<AtomArray> {
        self.atom_array.replace(atoms)
    }

    pub fn take_atom_array(&mut self) -> Option<AtomArray> {
        self.atom_array.take()
    }

    pub fn bond_array(&self) -> Option<BondArrayId> {
        self.bond_array
    }

    /// Splits the molecule into the pieces bond indexing needs at the same time.
    pub(crate) fn indexing_context(&mut self) -> (&str, Option<&mut AtomArray>) {
        (&self.id, self.atom_array.as_mut())
    }
}
