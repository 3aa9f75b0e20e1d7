use super::ids::BondArrayId;
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const HASH_SEPARATOR: &str = "__";
const HASH_ESCAPE: char = '\\';

/// Bond order as carried by the `order` attribute of a CML bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
    /// The attribute was empty; CML leaves the order unspecified.
    Unknown,
}

impl BondOrder {
    /// The code written back into the `order` attribute, if the order has one.
    pub fn cml_code(self) -> Option<&'static str> {
        match self {
            Self::Single => Some("S"),
            Self::Double => Some("D"),
            Self::Triple => Some("T"),
            Self::Aromatic => Some("A"),
            Self::Unknown => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("'{0}' is not a CML bond order")]
pub struct ParseBondOrderError(pub String);

/// Accepts the letter codes `S`, `D`, `T`, `A` and the numeric forms `1`, `2`,
/// `3`. An empty attribute parses as [`BondOrder::Unknown`].
impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "S" | "1" => Ok(Self::Single),
            "D" | "2" => Ok(Self::Double),
            "T" | "3" => Ok(Self::Triple),
            "A" => Ok(Self::Aromatic),
            "" => Ok(Self::Unknown),
            other => Err(ParseBondOrderError(other.to_string())),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cml_code().unwrap_or("unknown"))
    }
}

/// Order-independent key for the atom pair a bond connects.
///
/// The two atom references are sorted lexically and joined with `__`, so
/// `hash(a, b) == hash(b, a)`. Underscores and backslashes inside a reference
/// are escaped with a backslash first, which keeps distinct pairs such as
/// `(a__b, c)` and `(a, b__c)` on distinct keys. Plain ids hash to the
/// familiar `a1__a2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BondHash(String);

impl BondHash {
    /// Computes the canonical hash of an atom pair.
    ///
    /// Returns `None` for degenerate pairs: a blank reference, or the same atom
    /// referenced twice.
    pub fn from_atom_refs(atom1: &str, atom2: &str) -> Option<Self> {
        let (a, b) = (atom1.trim(), atom2.trim());
        if a.is_empty() || b.is_empty() || a == b {
            return None;
        }
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let mut key = String::with_capacity(a.len() + b.len() + HASH_SEPARATOR.len());
        push_escaped(&mut key, first);
        key.push_str(HASH_SEPARATOR);
        push_escaped(&mut key, second);
        Some(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn push_escaped(key: &mut String, atom_ref: &str) {
    for c in atom_ref.chars() {
        if c == '_' || c == HASH_ESCAPE {
            key.push(HASH_ESCAPE);
        }
        key.push(c);
    }
}

impl Borrow<str> for BondHash {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BondHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bond between two atoms, referenced by their string ids.
///
/// The endpoints are fixed at construction. The parent handle is owned by the
/// document and only changes when the bond is inserted into or removed from a
/// bond array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bond {
    id: Option<String>,
    atom_refs: [String; 2],
    pub order: BondOrder,
    parent: Option<BondArrayId>,
}

impl Bond {
    pub fn new(atom1: &str, atom2: &str, order: BondOrder) -> Self {
        Self {
            id: None,
            atom_refs: [atom1.trim().to_string(), atom2.trim().to_string()],
            order,
            parent: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The id under which this bond is entered in the id map, if any.
    ///
    /// Blank ids are never indexed.
    pub fn indexable_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    pub fn atom_refs(&self) -> [&str; 2] {
        [&self.atom_refs[0], &self.atom_refs[1]]
    }

    pub fn hash(&self) -> Option<BondHash> {
        BondHash::from_atom_refs(&self.atom_refs[0], &self.atom_refs[1])
    }

    pub fn parent(&self) -> Option<BondArrayId> {
        self.parent
    }

    pub fn is_attached(&self) -> bool {
        self.parent.is_some()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<BondArrayId>) {
        self.parent = parent;
    }

    /// Short human-readable description used in diagnostics.
    pub fn describe(&self) -> String {
        format!(
            "bond '{}' [{} {}] (order {})",
            self.id().unwrap_or("<no id>"),
            self.atom_refs[0],
            self.atom_refs[1],
            self.order
        )
    }
}
