//! SMILES reader.
//!
//! Parses the OpenSMILES subset needed for validation and descriptors:
//! organic-subset and bracket atoms, bond symbols, branches, ring closures
//! (including `%nn`) and dot-disconnected components. Stereo marks are
//! accepted and dropped. After parsing, the graph is sanitised: aromatic
//! input is kekulized, implicit hydrogens are assigned, valences are checked
//! and Kekulé rings are perceived as aromatic.

use super::element::{Element, ParseElementError};
use super::matching::maximum_matching;
use super::molecule::{Atom, Bond, BondOrder, Molecule, ring_bond_flags};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesError {
    #[error("empty SMILES string")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("branch opened at position {0} is never closed")]
    UnclosedBranch(usize),

    #[error("unmatched ')' at position {0}")]
    UnmatchedParen(usize),

    #[error("ring bond {0} is never closed")]
    UnclosedRing(u16),

    #[error("ring bond {0} has conflicting bond orders")]
    RingBondConflict(u16),

    #[error("ring bond {0} would bond an atom to itself")]
    RingSelfBond(u16),

    #[error("duplicate bond between atoms {0} and {1}")]
    DuplicateBond(usize, usize),

    #[error("bond at position {0} is not attached to an atom")]
    DanglingBond(usize),

    #[error(transparent)]
    UnknownElement(#[from] ParseElementError),

    #[error("element {0} cannot be aromatic")]
    NotAromatic(Element),

    #[error("malformed bracket atom at position {pos}: {reason}")]
    BracketAtom { pos: usize, reason: String },

    #[error("explicit valence {valence} for atom {index} ({element}) is not allowed")]
    Valence {
        index: usize,
        element: Element,
        valence: u32,
    },

    #[error("atom {0} is marked aromatic but is not in a ring")]
    NonRingAromatic(usize),

    #[error("aromatic system could not be kekulized")]
    Kekulize,
}

/// Upper bound on bonds plus hydrogens for elements without a valence table
/// (metals, noble gases, `*`).
const MAX_UNCHECKED_VALENCE: u32 = 16;

/// Parse and sanitise a SMILES string.
pub fn parse(smiles: &str) -> Result<Molecule, SmilesError> {
    let raw = Parser::new(smiles).run()?;
    sanitize(raw)
}

struct RawAtom {
    atom: Atom,
    /// Organic-subset atoms get implicit hydrogens; bracket atoms do not.
    bracket: bool,
}

struct RawBond {
    a: usize,
    b: usize,
    /// `None` when no bond symbol was written.
    order: Option<BondOrder>,
}

struct RawMolecule {
    atoms: Vec<RawAtom>,
    bonds: Vec<RawBond>,
}

struct RingOpening {
    atom: usize,
    order: Option<BondOrder>,
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    atoms: Vec<RawAtom>,
    bonds: Vec<RawBond>,
    prev: Option<usize>,
    /// (atom the branch hangs off, position of '(', atom count when opened)
    branches: Vec<(usize, usize, usize)>,
    pending: Option<(BondOrder, usize)>,
    rings: BTreeMap<u16, RingOpening>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        let src = src.trim();
        // Anything after the first whitespace is a title, as in SMILES files.
        let src = src.split(char::is_whitespace).next().unwrap_or("");
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            prev: None,
            branches: Vec::new(),
            pending: None,
            rings: BTreeMap::new(),
        }
    }

    fn run(mut self) -> Result<RawMolecule, SmilesError> {
        if self.bytes.is_empty() {
            return Err(SmilesError::Empty);
        }

        while self.pos < self.bytes.len() {
            let c = self.bytes[self.pos];
            match c {
                b'(' => self.open_branch()?,
                b')' => self.close_branch()?,
                b'-' | b'=' | b'#' | b'$' | b':' | b'/' | b'\\' => self.bond_symbol(c)?,
                b'.' => self.dot()?,
                b'0'..=b'9' | b'%' => self.ring_closure()?,
                b'[' => {
                    let atom = self.bracket_atom()?;
                    self.add_atom(atom, true)?;
                }
                _ => {
                    let atom = self.organic_atom()?;
                    self.add_atom(atom, false)?;
                }
            }
        }

        if let Some((_, pos)) = self.pending {
            return Err(SmilesError::DanglingBond(pos));
        }
        if let Some(&(_, pos, _)) = self.branches.last() {
            return Err(SmilesError::UnclosedBranch(pos));
        }
        if let Some((&label, _)) = self.rings.iter().next() {
            return Err(SmilesError::UnclosedRing(label));
        }

        Ok(RawMolecule {
            atoms: self.atoms,
            bonds: self.bonds,
        })
    }

    fn unexpected(&self) -> SmilesError {
        let ch = self.src[self.pos..].chars().next().unwrap_or('\0');
        SmilesError::UnexpectedChar { ch, pos: self.pos }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn open_branch(&mut self) -> Result<(), SmilesError> {
        let Some(prev) = self.prev else {
            return Err(self.unexpected());
        };
        if let Some((_, pos)) = self.pending {
            return Err(SmilesError::DanglingBond(pos));
        }
        self.branches.push((prev, self.pos, self.atoms.len()));
        self.pos += 1;
        Ok(())
    }

    fn close_branch(&mut self) -> Result<(), SmilesError> {
        if let Some((_, pos)) = self.pending {
            return Err(SmilesError::DanglingBond(pos));
        }
        let Some((anchor, _, atoms_before)) = self.branches.pop() else {
            return Err(SmilesError::UnmatchedParen(self.pos));
        };
        if self.atoms.len() == atoms_before {
            return Err(self.unexpected());
        }
        self.prev = Some(anchor);
        self.pos += 1;
        Ok(())
    }

    fn bond_symbol(&mut self, c: u8) -> Result<(), SmilesError> {
        if self.pending.is_some() {
            return Err(self.unexpected());
        }
        if self.prev.is_none() {
            return Err(SmilesError::DanglingBond(self.pos));
        }
        let order = match c {
            b'=' => BondOrder::Double,
            b'#' => BondOrder::Triple,
            b'$' => BondOrder::Quadruple,
            b':' => BondOrder::Aromatic,
            _ => BondOrder::Single,
        };
        self.pending = Some((order, self.pos));
        self.pos += 1;
        Ok(())
    }

    fn dot(&mut self) -> Result<(), SmilesError> {
        if let Some((_, pos)) = self.pending {
            return Err(SmilesError::DanglingBond(pos));
        }
        if self.prev.is_none() {
            return Err(self.unexpected());
        }
        self.prev = None;
        self.pos += 1;
        Ok(())
    }

    fn ring_closure(&mut self) -> Result<(), SmilesError> {
        let Some(prev) = self.prev else {
            return Err(self.unexpected());
        };
        let label = if self.bytes[self.pos] == b'%' {
            let digits = self.bytes.get(self.pos + 1..self.pos + 3);
            match digits {
                Some([a, b]) if a.is_ascii_digit() && b.is_ascii_digit() => {
                    self.pos += 3;
                    u16::from(a - b'0') * 10 + u16::from(b - b'0')
                }
                _ => return Err(self.unexpected()),
            }
        } else {
            let d = u16::from(self.bytes[self.pos] - b'0');
            self.pos += 1;
            d
        };
        let order = self.pending.take().map(|(o, _)| o);

        match self.rings.remove(&label) {
            Some(open) => {
                if open.atom == prev {
                    return Err(SmilesError::RingSelfBond(label));
                }
                let order = match (open.order, order) {
                    (Some(a), Some(b)) if a != b => return Err(SmilesError::RingBondConflict(label)),
                    (a, b) => a.or(b),
                };
                self.push_bond(open.atom, prev, order)
            }
            None => {
                self.rings.insert(label, RingOpening { atom: prev, order });
                Ok(())
            }
        }
    }

    fn push_bond(&mut self, a: usize, b: usize, order: Option<BondOrder>) -> Result<(), SmilesError> {
        if self
            .bonds
            .iter()
            .any(|x| (x.a == a && x.b == b) || (x.a == b && x.b == a))
        {
            return Err(SmilesError::DuplicateBond(a.min(b), a.max(b)));
        }
        self.bonds.push(RawBond { a, b, order });
        Ok(())
    }

    fn add_atom(&mut self, atom: Atom, bracket: bool) -> Result<(), SmilesError> {
        let idx = self.atoms.len();
        self.atoms.push(RawAtom { atom, bracket });
        if let Some(prev) = self.prev {
            let order = self.pending.take().map(|(o, _)| o);
            self.push_bond(prev, idx, order)?;
        }
        self.prev = Some(idx);
        Ok(())
    }

    fn organic_atom(&mut self) -> Result<Atom, SmilesError> {
        let c = self.bytes[self.pos];
        let next = self.bytes.get(self.pos + 1).copied();
        let (element, aromatic, len) = match (c, next) {
            (b'C', Some(b'l')) => (Element::Cl, false, 2),
            (b'B', Some(b'r')) => (Element::Br, false, 2),
            (b'B', _) => (Element::B, false, 1),
            (b'C', _) => (Element::C, false, 1),
            (b'N', _) => (Element::N, false, 1),
            (b'O', _) => (Element::O, false, 1),
            (b'P', _) => (Element::P, false, 1),
            (b'S', _) => (Element::S, false, 1),
            (b'F', _) => (Element::F, false, 1),
            (b'I', _) => (Element::I, false, 1),
            (b'*', _) => (Element::Dummy, false, 1),
            (b'b', _) => (Element::B, true, 1),
            (b'c', _) => (Element::C, true, 1),
            (b'n', _) => (Element::N, true, 1),
            (b'o', _) => (Element::O, true, 1),
            (b'p', _) => (Element::P, true, 1),
            (b's', _) => (Element::S, true, 1),
            _ => return Err(self.unexpected()),
        };
        self.pos += len;
        let mut atom = Atom::new(element);
        atom.aromatic = aromatic;
        Ok(atom)
    }

    /// `[isotope? symbol chirality? hcount? charge? class?]`
    fn bracket_atom(&mut self) -> Result<Atom, SmilesError> {
        let start = self.pos;
        let bad = |reason: &str| SmilesError::BracketAtom {
            pos: start,
            reason: reason.into(),
        };
        self.pos += 1;

        let isotope = self.read_number();

        let (element, aromatic) = self.bracket_symbol().ok_or_else(|| bad("missing element symbol"))??;
        if aromatic && !element.can_be_aromatic() {
            return Err(SmilesError::NotAromatic(element));
        }

        // Chirality: @, @@, or @TH1 / @AL2 / @SP3 / @TB12 / @OH24.
        if self.peek() == Some(b'@') {
            self.pos += 1;
            if self.peek() == Some(b'@') {
                self.pos += 1;
            } else if self.bytes.get(self.pos..self.pos + 2).is_some_and(|s| {
                matches!(s, b"TH" | b"AL" | b"SP" | b"TB" | b"OH")
            }) {
                self.pos += 2;
                self.read_number().ok_or_else(|| bad("chirality class without a number"))?;
            }
        }

        let mut hydrogens = 0u8;
        if self.peek() == Some(b'H') {
            self.pos += 1;
            hydrogens = match self.read_number() {
                Some(n) => u8::try_from(n).map_err(|_| bad("hydrogen count out of range"))?,
                None => 1,
            };
        }

        let mut charge = 0i8;
        if let Some(sign @ (b'+' | b'-')) = self.peek() {
            let unit: i8 = if sign == b'+' { 1 } else { -1 };
            self.pos += 1;
            if let Some(n) = self.read_number() {
                let n = i8::try_from(n).map_err(|_| bad("charge out of range"))?;
                charge = unit * n;
            } else {
                charge = unit;
                while self.peek() == Some(sign) {
                    self.pos += 1;
                    charge = charge
                        .checked_add(unit)
                        .ok_or_else(|| bad("charge out of range"))?;
                }
            }
        }

        if self.peek() == Some(b':') {
            self.pos += 1;
            self.read_number().ok_or_else(|| bad("atom class without a number"))?;
        }

        if self.peek() != Some(b']') {
            return Err(bad("expected ']'"));
        }
        self.pos += 1;

        let mut atom = Atom::new(element);
        atom.aromatic = aromatic;
        atom.isotope = isotope;
        atom.hydrogens = hydrogens;
        atom.charge = charge;
        Ok(atom)
    }

    /// Element symbol inside brackets. Two-letter symbols win over one-letter
    /// ones (`[Sc]` is scandium). Lowercase symbols are aromatic.
    fn bracket_symbol(&mut self) -> Option<Result<(Element, bool), SmilesError>> {
        let rest = &self.src[self.pos..];
        let first = rest.chars().next()?;

        if first == '*' {
            self.pos += 1;
            return Some(Ok((Element::Dummy, false)));
        }

        if first.is_ascii_lowercase() {
            for sym in ["se", "as", "te", "b", "c", "n", "o", "p", "s"] {
                if rest.starts_with(sym) {
                    self.pos += sym.len();
                    let mut upper = sym.to_string();
                    upper[..1].make_ascii_uppercase();
                    return Some(upper.parse::<Element>().map(|e| (e, true)).map_err(Into::into));
                }
            }
            return Some(Err(ParseElementError(first.to_string()).into()));
        }
        if !first.is_ascii_uppercase() {
            return None;
        }

        if let Some(two) = rest.get(..2)
            && two.as_bytes()[1].is_ascii_lowercase()
            && let Ok(e) = two.parse::<Element>()
        {
            self.pos += 2;
            return Some(Ok((e, false)));
        }
        self.pos += 1;
        Some(
            rest[..1]
                .parse::<Element>()
                .map(|e| (e, false))
                .map_err(Into::into),
        )
    }

    fn read_number(&mut self) -> Option<u16> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) && self.pos - start < 4 {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        self.src[start..self.pos].parse().ok()
    }
}

fn sanitize(raw: RawMolecule) -> Result<Molecule, SmilesError> {
    let RawMolecule { atoms, bonds } = raw;

    // An aromatic bond must be part of a ring; between ring systems (the
    // biphenyl junction in `c1ccccc1c1ccccc1`) it is a plain single bond.
    let edges: Vec<(usize, usize)> = bonds.iter().map(|b| (b.a, b.b)).collect();
    let in_ring = ring_bond_flags(atoms.len(), &edges);

    let mut resolved: Vec<Bond> = bonds
        .iter()
        .zip(&in_ring)
        .map(|(rb, &ring)| {
            let order = match rb.order {
                Some(BondOrder::Aromatic) | None if !ring => BondOrder::Single,
                Some(order) => order,
                None if atoms[rb.a].atom.aromatic && atoms[rb.b].atom.aromatic => {
                    BondOrder::Aromatic
                }
                None => BondOrder::Single,
            };
            Bond::new(rb.a, rb.b, order)
        })
        .collect();

    kekulize(&atoms, &mut resolved)?;
    let mut plain: Vec<Atom> = Vec::with_capacity(atoms.len());

    for (idx, raw_atom) in atoms.iter().enumerate() {
        let mut atom = raw_atom.atom.clone();
        let bonded: u32 = resolved
            .iter()
            .filter(|b| b.a == idx || b.b == idx)
            .map(|b| u32::from(b.kekule))
            .sum();

        if raw_atom.bracket {
            let valence = bonded + u32::from(atom.hydrogens);
            let allowed = atom.element.valences_with_charge(atom.charge);
            let max = allowed.last().map_or(MAX_UNCHECKED_VALENCE, |&v| u32::from(v));
            if valence > max {
                return Err(SmilesError::Valence {
                    index: idx,
                    element: atom.element,
                    valence,
                });
            }
        } else {
            let allowed = atom.element.default_valences();
            if allowed.is_empty() {
                // `*` takes whatever it is bonded to and carries no hydrogens.
                plain.push(atom);
                continue;
            }
            match allowed.iter().find(|&&v| u32::from(v) >= bonded) {
                Some(&v) => atom.hydrogens = v - bonded as u8,
                None => {
                    return Err(SmilesError::Valence {
                        index: idx,
                        element: atom.element,
                        valence: bonded,
                    });
                }
            }
        }
        plain.push(atom);
    }

    let (plain, resolved) = Molecule::fold_explicit_hydrogens(plain, resolved);
    let mut mol = Molecule::from_parts(plain, resolved);

    if let Some(idx) = (0..mol.atoms().len()).find(|&i| mol.atom(i).aromatic && !mol.is_ring_atom(i))
    {
        return Err(SmilesError::NonRingAromatic(idx));
    }

    mol.perceive_aromaticity();
    Ok(mol)
}

/// Assign alternating double bonds to aromatic bonds so every aromatic atom
/// that needs a π bond gets exactly one. Fails when no assignment exists.
fn kekulize(atoms: &[RawAtom], bonds: &mut [Bond]) -> Result<(), SmilesError> {
    let n = atoms.len();
    if !bonds.iter().any(|b| b.order == BondOrder::Aromatic) {
        return Ok(());
    }

    let mut sigma = vec![0u32; n];
    let mut has_double = vec![false; n];
    for b in bonds.iter() {
        sigma[b.a] += u32::from(b.order.as_int());
        sigma[b.b] += u32::from(b.order.as_int());
        if b.order != BondOrder::Aromatic && b.order.as_int() >= 2 {
            has_double[b.a] = true;
            has_double[b.b] = true;
        }
    }

    let needs_pi: Vec<bool> = atoms
        .iter()
        .enumerate()
        .map(|(i, ra)| {
            let a = &ra.atom;
            if !a.aromatic || has_double[i] {
                return false;
            }
            let valence = if ra.bracket {
                a.element.valences_with_charge(a.charge).first().copied()
            } else {
                a.element.default_valences().first().copied()
            };
            let Some(valence) = valence.map(u32::from) else {
                return false;
            };
            // Organic-subset carbon always has room: missing hydrogens are
            // implicit. Everything else must have exactly one spare valence.
            let used = sigma[i] + if ra.bracket { u32::from(a.hydrogens) } else { 0 };
            if !ra.bracket && a.element == Element::C {
                return used < valence;
            }
            used + 1 == valence
        })
        .collect();

    // Graph of aromatic bonds between atoms that both need a π bond.
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for b in bonds.iter() {
        if b.order == BondOrder::Aromatic && needs_pi[b.a] && needs_pi[b.b] {
            adjacency[b.a].push(b.b);
            adjacency[b.b].push(b.a);
        }
    }

    let mates = maximum_matching(&adjacency);
    if (0..n).any(|i| needs_pi[i] && mates[i].is_none()) {
        return Err(SmilesError::Kekulize);
    }
    for b in bonds.iter_mut() {
        if mates[b.a] == Some(b.b) {
            b.kekule = 2;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula_counts(mol: &Molecule) -> (usize, u32) {
        let heavy = mol.heavy_atom_count();
        let h: u32 = (0..mol.atoms().len())
            .map(|i| u32::from(mol.total_hydrogens(i)))
            .sum();
        (heavy, h)
    }

    #[test]
    fn ethanol_gets_implicit_hydrogens() {
        let mol = parse("CCO").unwrap();
        assert_eq!(formula_counts(&mol), (3, 6));
        assert_eq!(mol.atom(2).hydrogens, 1);
    }

    #[test]
    fn aspirin_kekule_ring_is_perceived_aromatic() {
        let mol = parse("CC(=O)OC1=CC=CC=C1C(=O)O").unwrap();
        assert_eq!(formula_counts(&mol), (13, 8));
        let aromatic = mol.atoms().iter().filter(|a| a.aromatic).count();
        assert_eq!(aromatic, 6);
    }

    #[test]
    fn lowercase_benzene_kekulizes() {
        let mol = parse("c1ccccc1").unwrap();
        assert_eq!(formula_counts(&mol), (6, 6));
        let doubles = mol.bonds().iter().filter(|b| b.kekule == 2).count();
        assert_eq!(doubles, 3);
    }

    #[test]
    fn heteroaromatics_parse() {
        assert_eq!(formula_counts(&parse("c1ccncc1").unwrap()), (6, 5));
        assert_eq!(formula_counts(&parse("c1cc[nH]c1").unwrap()), (5, 5));
        assert_eq!(formula_counts(&parse("c1ccoc1").unwrap()), (5, 4));
        assert_eq!(formula_counts(&parse("c1ccsc1").unwrap()), (5, 4));
        assert_eq!(formula_counts(&parse("c1ccc2ccccc2c1").unwrap()), (10, 8));
    }

    #[test]
    fn kekule_pyrrole_is_aromatic() {
        let mol = parse("C1=CNC=C1").unwrap();
        assert!(mol.atoms().iter().all(|a| a.aromatic));
    }

    #[test]
    fn cyclohexane_is_not_aromatic() {
        let mol = parse("C1CCCCC1").unwrap();
        assert_eq!(formula_counts(&mol), (6, 12));
        assert!(mol.atoms().iter().all(|a| !a.aromatic));
        assert_eq!(mol.rings().len(), 1);
    }

    #[test]
    fn bracket_atoms_and_charges() {
        let mol = parse("[NH4+].[Cl-]").unwrap();
        assert_eq!(mol.atom(0).charge, 1);
        assert_eq!(mol.atom(0).hydrogens, 4);
        assert_eq!(mol.atom(1).charge, -1);
        assert_eq!(mol.atom(1).hydrogens, 0);

        let acetate = parse("CC(=O)[O-]").unwrap();
        assert_eq!(acetate.atom(3).charge, -1);
        assert_eq!(parse("[Fe++]").unwrap().atom(0).charge, 2);
        assert_eq!(parse("[13CH4]").unwrap().atom(0).isotope, Some(13));
    }

    #[test]
    fn stereo_marks_are_accepted() {
        assert!(parse("C[C@@H](O)CC").is_ok());
        assert!(parse("F/C=C/F").is_ok());
        assert!(parse("N[C@TH1H](C)C(=O)O").is_ok());
    }

    #[test]
    fn explicit_hydrogens_are_folded() {
        let mol = parse("[H]C([H])([H])[H]").unwrap();
        assert_eq!(mol.atoms().len(), 1);
        assert_eq!(mol.atom(0).hydrogens, 4);
    }

    #[test]
    fn ring_closure_variants() {
        assert!(parse("C%10CCCCC%10").is_ok());
        assert!(parse("C1CC=1").is_ok());
        assert_eq!(
            parse("C=1CCC#1").unwrap_err(),
            SmilesError::RingBondConflict(1)
        );
        assert!(matches!(parse("C11").unwrap_err(), SmilesError::RingSelfBond(1)));
    }

    #[test]
    fn trailing_title_is_ignored() {
        assert_eq!(formula_counts(&parse("CCO ethanol").unwrap()), (3, 6));
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(parse("").unwrap_err(), SmilesError::Empty);
        assert_eq!(parse("   ").unwrap_err(), SmilesError::Empty);
        assert_eq!(parse("C1CC").unwrap_err(), SmilesError::UnclosedRing(1));
        assert_eq!(parse("C(C").unwrap_err(), SmilesError::UnclosedBranch(1));
        assert_eq!(parse("CC)C").unwrap_err(), SmilesError::UnmatchedParen(2));
        assert_eq!(parse("CC=").unwrap_err(), SmilesError::DanglingBond(2));
        assert!(matches!(
            parse("C()C").unwrap_err(),
            SmilesError::UnexpectedChar { ch: ')', .. }
        ));
        assert!(matches!(
            parse("CXC").unwrap_err(),
            SmilesError::UnexpectedChar { ch: 'X', pos: 1 }
        ));
        assert!(matches!(
            parse("C[Xx]").unwrap_err(),
            SmilesError::UnknownElement(_)
        ));
        assert!(matches!(
            parse("[C").unwrap_err(),
            SmilesError::BracketAtom { .. }
        ));
        assert!(matches!(
            parse("not_a_smiles").unwrap_err(),
            SmilesError::UnexpectedChar { .. }
        ));
    }

    #[test]
    fn valence_errors() {
        assert!(matches!(
            parse("C(C)(C)(C)(C)C").unwrap_err(),
            SmilesError::Valence { element: Element::C, .. }
        ));
        assert!(matches!(
            parse("O=O=O").unwrap_err(),
            SmilesError::Valence { element: Element::O, .. }
        ));
        assert!(matches!(
            parse("[CH5]").unwrap_err(),
            SmilesError::Valence { .. }
        ));
        assert!(parse("C[N+](C)(C)C").is_ok());
    }

    #[test]
    fn impossible_aromatic_systems_are_rejected() {
        assert_eq!(parse("c1cccc1").unwrap_err(), SmilesError::Kekulize);
        assert_eq!(parse("c1ccnc1").unwrap_err(), SmilesError::Kekulize);
        assert!(matches!(
            parse("c").unwrap_err(),
            SmilesError::NonRingAromatic(0) | SmilesError::Kekulize
        ));
    }

    #[test]
    fn many_independent_rings_kekulize_in_polynomial_time() {
        let started = std::time::Instant::now();
        let unsolvable = format!("{}c1cccc1", "c1ccccc1.".repeat(22));
        assert_eq!(parse(&unsolvable).unwrap_err(), SmilesError::Kekulize);

        let solvable = format!("{}c1ccc[nH]1", "c1ccccc1.".repeat(60));
        let mol = parse(&solvable).unwrap();
        assert_eq!(mol.heavy_atom_count(), 60 * 6 + 5);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }

    #[test]
    fn hydrogen_count_cannot_overflow() {
        assert!(matches!(
            parse("[FeH255][H]").unwrap_err(),
            SmilesError::Valence { element: Element::Fe, valence: 256, .. }
        ));
        assert!(matches!(
            parse("[PtH20]").unwrap_err(),
            SmilesError::Valence { element: Element::Pt, valence: 20, .. }
        ));
        let mol = parse("[FeH2]").unwrap();
        assert_eq!(mol.total_hydrogens(0), 2);
    }

    #[test]
    fn bond_between_aromatic_rings_is_single() {
        let implicit = parse("c1ccccc1c1ccccc1").unwrap();
        let explicit = parse("c1ccccc1-c1ccccc1").unwrap();
        let junction = implicit.bond_between(5, 6).unwrap();
        assert_eq!(junction.order, BondOrder::Single);
        assert_eq!(junction.kekule, 1);
        assert_eq!(
            implicit.bonds().iter().filter(|b| b.order == BondOrder::Aromatic).count(),
            12
        );
        assert_eq!(implicit.bonds(), explicit.bonds());
    }

    #[test]
    fn wildcard_and_heavy_elements() {
        for smiles in ["[Pd]", "[Gd+3]", "C*", "[*]", "[Mo]", "[Zr+4]", "[U]", "*c1ccccc1"] {
            assert!(parse(smiles).is_ok(), "{smiles}");
        }
        let mol = parse("C*").unwrap();
        assert_eq!(mol.atom(1).element, Element::Dummy);
        assert_eq!(mol.atom(0).hydrogens, 3);
        assert_eq!(mol.atom(1).hydrogens, 0);
        assert_eq!(parse("[Gd+3]").unwrap().atom(0).charge, 3);
    }
}
