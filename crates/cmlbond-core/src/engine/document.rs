use super::bond_array::{BondArray, IndexMode};
use super::config::{ConflictPolicy, IndexingConfig};
use super::error::{BondArrayError, IndexIssue, StructureError};
use crate::core::models::atom::{Ligand, LigandError};
use crate::core::models::bond::Bond;
use crate::core::models::ids::{BondArrayId, BondId, MoleculeId};
use crate::core::models::molecule::Molecule;
use slotmap::SlotMap;
use tracing::{debug, instrument, warn};

/// Result of removing a bond from its bond array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// The removed bond. It stays in the document, detached.
    pub bond: BondId,
    /// Where the bond sat in the sequence before removal.
    pub position: usize,
    /// Ligand entries that could not be cleared. Never fatal.
    pub ligand_failures: Vec<LigandError>,
}

impl Removal {
    pub fn is_clean(&self) -> bool {
        self.ligand_failures.is_empty()
    }
}

/// Summary of a full reindex.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReindexReport {
    /// Bonds entered in the hash map.
    pub indexed: usize,
    /// Indexed bonds whose endpoints did not both resolve to atoms.
    pub unlinked: usize,
    /// Conflicts that were skipped, in sequence order.
    pub skipped: Vec<IndexIssue>,
}

/// Owns every molecule, bond array, and bond of one document.
///
/// This is the tree the bond arrays live in: it records which array a bond
/// belongs to and which molecule an array belongs to, and performs every
/// mutation that has to touch more than one of them.
#[derive(Debug, Clone, Default)]
pub struct Document {
    molecules: SlotMap<MoleculeId, Molecule>,
    bond_arrays: SlotMap<BondArrayId, BondArray>,
    bonds: SlotMap<BondId, Bond>,
    config: IndexingConfig,
}

impl Document {
    /// Creates an empty document with the default indexing configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: IndexingConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &IndexingConfig {
        &self.config
    }

    /// Adds a molecule to the document.
    ///
    /// Any bond array handle the molecule carries is dropped; use
    /// [`attach_bond_array`](Self::attach_bond_array) to link one.
    pub fn add_molecule(&mut self, mut molecule: Molecule) -> MoleculeId {
        molecule.bond_array = None;
        self.molecules.insert(molecule)
    }

    pub fn molecule(&self, id: MoleculeId) -> Option<&Molecule> {
        self.molecules.get(id)
    }

    pub fn molecule_mut(&mut self, id: MoleculeId) -> Option<&mut Molecule> {
        self.molecules.get_mut(id)
    }

    /// Creates a new, empty bond array that is not attached to any molecule.
    pub fn create_bond_array(&mut self) -> BondArrayId {
        self.bond_arrays.insert(BondArray::new())
    }

    pub fn bond_array(&self, id: BondArrayId) -> Option<&BondArray> {
        self.bond_arrays.get(id)
    }

    /// Adds a detached bond to the document.
    ///
    /// A bond copied from an attached one is stored as a fresh, detached bond.
    pub fn create_bond(&mut self, mut bond: Bond) -> BondId {
        bond.set_parent(None);
        self.bonds.insert(bond)
    }

    pub fn bond(&self, id: BondId) -> Option<&Bond> {
        self.bonds.get(id)
    }

    /// Returns the bonds of an array in sequence order.
    pub fn bonds(&self, array: BondArrayId) -> impl Iterator<Item = (BondId, &Bond)> {
        self.bond_arrays
            .get(array)
            .map(|a| a.order.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |&id| self.bonds.get(id).map(|bond| (id, bond)))
    }

    /// Drops a detached bond from the document and hands it back.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::AlreadyAttached`] if the bond is still a child
    /// of a bond array, or [`StructureError::UnknownBond`] if it does not exist.
    pub fn discard_bond(&mut self, id: BondId) -> Result<Bond, StructureError> {
        let bond = self.bonds.get(id).ok_or(StructureError::UnknownBond(id))?;
        if bond.is_attached() {
            return Err(StructureError::AlreadyAttached {
                bond: bond.describe(),
            });
        }
        self.bonds.remove(id).ok_or(StructureError::UnknownBond(id))
    }

    /// Returns the ligand record of an atom of a molecule.
    pub fn ligands(&self, molecule: MoleculeId, atom: &str) -> Option<&[Ligand]> {
        self.molecules.get(molecule)?.atom_array()?.ligands_of(atom)
    }

    /// Attaches a bond array to a molecule.
    ///
    /// A bond array previously attached to the molecule is detached first.
    /// When [`IndexingConfig::reindex_on_attach`] is set, the array is then
    /// reindexed against the molecule's atoms; the report is `None` when no
    /// reindex ran, including when the molecule has no atom array yet.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::ArrayAlreadyAttached`] if the array already
    /// belongs to a molecule, or an unknown-id error.
    #[instrument(skip(self), level = "debug")]
    pub fn attach_bond_array(
        &mut self,
        molecule: MoleculeId,
        array: BondArrayId,
    ) -> Result<Option<ReindexReport>, StructureError> {
        let current = self
            .bond_arrays
            .get(array)
            .ok_or(StructureError::UnknownBondArray(array))?
            .molecule;
        let target = self
            .molecules
            .get(molecule)
            .ok_or(StructureError::UnknownMolecule(molecule))?;
        if let Some(owner) = current {
            let molecule_id = self
                .molecules
                .get(owner)
                .map(|m| m.id().to_string())
                .unwrap_or_default();
            return Err(StructureError::ArrayAlreadyAttached { molecule_id });
        }

        if target.bond_array.is_some() {
            self.remove_bond_array(molecule);
        }
        self.molecules[molecule].bond_array = Some(array);
        self.bond_arrays[array].molecule = Some(molecule);
        debug!("Attached bond array to molecule '{}'", self.molecules[molecule].id());

        if !self.config.reindex_on_attach {
            return Ok(None);
        }
        match self.reindex(array) {
            Ok(report) => Ok(Some(report)),
            Err(StructureError::NoAtomRegistry { molecule_id }) => {
                debug!("Molecule '{}' has no atoms yet; skipping reindex", molecule_id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Unlinks the bond array of a molecule and clears the molecule's ligand records.
    ///
    /// The array keeps its bonds and can be attached elsewhere.
    ///
    /// # Return
    ///
    /// The detached array, or `None` if the molecule had none.
    pub fn remove_bond_array(&mut self, molecule: MoleculeId) -> Option<BondArrayId> {
        let target = self.molecules.get_mut(molecule)?;
        let array = target.bond_array.take()?;
        if let Some(atoms) = target.atom_array_mut() {
            atoms.clear_ligand_info();
        }
        if let Some(bond_array) = self.bond_arrays.get_mut(array) {
            bond_array.molecule = None;
        }
        debug!("Removed bond array from molecule '{}'", target.id());
        Some(array)
    }

    /// Detaches a bond array from whichever molecule owns it.
    ///
    /// # Return
    ///
    /// The former owner, or `None` if the array was not attached.
    pub fn detach_bond_array(&mut self, array: BondArrayId) -> Option<MoleculeId> {
        let owner = self.bond_arrays.get(array)?.molecule?;
        self.remove_bond_array(owner);
        Some(owner)
    }

    /// Appends a bond to a bond array. See [`insert_bond`](Self::insert_bond).
    pub fn add_bond(&mut self, array: BondArrayId, bond: BondId) -> Result<BondId, BondArrayError> {
        let position = self
            .bond_arrays
            .get(array)
            .ok_or(StructureError::UnknownBondArray(array))?
            .size();
        self.insert_bond(array, bond, position)
    }

    /// Inserts a detached bond into a bond array at `position`.
    ///
    /// The bond is hashed by its atom pair and, when it has a non-blank id,
    /// entered in the id map. Both endpoint atoms get a ligand entry for the
    /// other once the hash step succeeds.
    ///
    /// # Errors
    ///
    /// - [`BondArrayError::Structure`] for a violated precondition: the bond is
    ///   already attached, the array has no molecule, the position is past the
    ///   end, or an id is unknown. Nothing is changed.
    /// - [`BondArrayError::Indexing`] when the atom pair or the id is already
    ///   indexed. Under [`ConflictPolicy::RetainUnindexed`] the bond stays in the
    ///   sequence (`retained: true`) and whichever index step did not conflict
    ///   is kept. Under [`ConflictPolicy::RejectAtomically`] nothing is changed.
    pub fn insert_bond(
        &mut self,
        array: BondArrayId,
        bond: BondId,
        position: usize,
    ) -> Result<BondId, BondArrayError> {
        let bond_array = self
            .bond_arrays
            .get_mut(array)
            .ok_or(StructureError::UnknownBondArray(array))?;
        let record = self
            .bonds
            .get_mut(bond)
            .ok_or(StructureError::UnknownBond(bond))?;
        if record.is_attached() {
            return Err(StructureError::AlreadyAttached {
                bond: record.describe(),
            }
            .into());
        }
        let owner = match bond_array.molecule {
            Some(m) => self.molecules.get_mut(m),
            None => None,
        };
        let (molecule_id, atoms) = owner
            .ok_or(StructureError::NoMoleculeContext)?
            .indexing_context();
        let size = bond_array.size();
        if position > size {
            return Err(StructureError::PositionOutOfBounds { position, size }.into());
        }

        if self.config.conflict_policy == ConflictPolicy::RejectAtomically {
            let issues = bond_array.conflicts(record, molecule_id);
            if !issues.is_empty() {
                debug!("Rejected {}", record.describe());
                return Err(BondArrayError::Indexing {
                    bond,
                    retained: false,
                    issues,
                });
            }
        }

        bond_array.order.insert(position, bond);
        record.set_parent(Some(array));
        let outcome = bond_array.index_bond(bond, record, molecule_id, atoms, IndexMode::Strict);

        if outcome.issues.is_empty() {
            debug!("Added {} at position {}", record.describe(), position);
            Ok(bond)
        } else {
            Err(BondArrayError::Indexing {
                bond,
                retained: true,
                issues: outcome.issues,
            })
        }
    }

    /// Removes a bond from a bond array.
    ///
    /// When both endpoints resolve to atoms, each atom's ligand entry toward the
    /// other is cleared; failures are logged and reported in
    /// [`Removal::ligand_failures`] but never stop the removal. The bond's hash
    /// and id entries are dropped when they point at this bond.
    ///
    /// # Return
    ///
    /// `None` if the bond is not a child of this array; nothing is changed then.
    pub fn remove_bond(&mut self, array: BondArrayId, bond: BondId) -> Option<Removal> {
        let bond_array = self.bond_arrays.get_mut(array)?;
        let record = self.bonds.get_mut(bond)?;
        if record.parent() != Some(array) {
            return None;
        }
        let position = bond_array.position(bond)?;

        let mut ligand_failures = Vec::new();
        let owner = match bond_array.molecule {
            Some(m) => self.molecules.get_mut(m),
            None => None,
        };
        let atoms = owner.and_then(Molecule::atom_array_mut);
        if let Some(atoms) = atoms {
            if let Some([a, b]) = atoms.resolve_endpoints(record) {
                for (atom, other) in [(a, b), (b, a)] {
                    if let Err(e) = atoms.clear_ligand(atom, bond, other) {
                        ligand_failures.push(e);
                    }
                }
            }
        }
        if !ligand_failures.is_empty() {
            warn!(
                "Trouble removing ligands of {}: {} failure(s)",
                record.describe(),
                ligand_failures.len()
            );
        }

        bond_array.order.remove(position);
        bond_array.unindex_bond(bond, record);
        record.set_parent(None);
        debug!("Removed {} from position {}", record.describe(), position);

        Some(Removal {
            bond,
            position,
            ligand_failures,
        })
    }

    /// Rebuilds the hash map, the id map, and every ligand record of the
    /// owning molecule from the bond sequence.
    ///
    /// Conflicting bonds are skipped and listed in the report rather than
    /// aborting, so this recovers a best-effort view of imperfect loaded data.
    /// Running it twice in a row yields the same indexes.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::NoMoleculeContext`] if the array is not
    /// attached, or [`StructureError::NoAtomRegistry`] if the molecule has no
    /// atom array. Nothing is changed then.
    #[instrument(skip(self), level = "debug")]
    pub fn reindex(&mut self, array: BondArrayId) -> Result<ReindexReport, StructureError> {
        let bond_array = self
            .bond_arrays
            .get_mut(array)
            .ok_or(StructureError::UnknownBondArray(array))?;
        let owner = match bond_array.molecule {
            Some(m) => self.molecules.get_mut(m),
            None => None,
        };
        let (molecule_id, atoms) = owner
            .ok_or(StructureError::NoMoleculeContext)?
            .indexing_context();
        let atoms = atoms.ok_or_else(|| StructureError::NoAtomRegistry {
            molecule_id: molecule_id.to_string(),
        })?;

        atoms.clear_ligand_info();
        bond_array.clear_indexes();

        let mut report = ReindexReport::default();
        for bond in bond_array.order.clone() {
            let Some(record) = self.bonds.get(bond) else {
                warn!("Bond {:?} in sequence is missing from the document", bond);
                continue;
            };
            let outcome =
                bond_array.index_bond(bond, record, molecule_id, Some(&mut *atoms), IndexMode::Lenient);
            if outcome.hashed {
                report.indexed += 1;
                if !outcome.linked {
                    report.unlinked += 1;
                }
            }
            report.skipped.extend(outcome.issues);
        }

        debug!(
            "Reindexed molecule '{}': {} indexed, {} skipped",
            molecule_id,
            report.indexed,
            report.skipped.len()
        );
        Ok(report)
    }
}
