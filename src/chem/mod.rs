//! Native SMILES parsing and molecular descriptors.

pub mod crippen;
pub mod descriptors;
pub mod element;
mod matching;
pub mod molecule;
pub mod smiles;

pub use crippen::crippen_logp;
pub use descriptors::{molecular_formula, molecular_weight};
pub use element::Element;
pub use molecule::{Atom, Bond, BondOrder, Molecule};
pub use smiles::{SmilesError, parse};
