//! Wildman–Crippen logP.
//!
//! Every heavy atom and every hydrogen is assigned one of the atom types from
//! Wildman & Crippen, J. Chem. Inf. Comput. Sci. 1999, 39, 868–873, and the
//! per-type contributions are summed. Types are tried in table order and the
//! first match wins, so each classifier below mirrors that ordering.

use super::element::Element;
use super::molecule::{BondOrder, Molecule};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrippenType {
    pub label: &'static str,
    pub logp: f64,
}

const fn t(label: &'static str, logp: f64) -> CrippenType {
    CrippenType { label, logp }
}

const C1: CrippenType = t("C1", 0.1441);
const C2: CrippenType = t("C2", 0.0);
const C3: CrippenType = t("C3", -0.2035);
const C4: CrippenType = t("C4", -0.2051);
const C5: CrippenType = t("C5", -0.2783);
const C6: CrippenType = t("C6", 0.1551);
const C7: CrippenType = t("C7", 0.0017);
const C8: CrippenType = t("C8", 0.08452);
const C9: CrippenType = t("C9", -0.1444);
const C10: CrippenType = t("C10", -0.0516);
const C11: CrippenType = t("C11", 0.1193);
const C12: CrippenType = t("C12", -0.0967);
const C13: CrippenType = t("C13", -0.5443);
const C14: CrippenType = t("C14", 0.0);
const C15: CrippenType = t("C15", 0.245);
const C16: CrippenType = t("C16", 0.198);
const C17: CrippenType = t("C17", 0.0);
const C18: CrippenType = t("C18", 0.1581);
const C19: CrippenType = t("C19", 0.2955);
const C20: CrippenType = t("C20", 0.2713);
const C21: CrippenType = t("C21", 0.136);
const C22: CrippenType = t("C22", 0.4619);
const C23: CrippenType = t("C23", 0.5437);
const C24: CrippenType = t("C24", 0.1893);
const C25: CrippenType = t("C25", -0.8186);
const C26: CrippenType = t("C26", 0.264);
const C27: CrippenType = t("C27", 0.2148);
const CS: CrippenType = t("CS", 0.08129);

const H1: CrippenType = t("H1", 0.123);
const H2: CrippenType = t("H2", -0.2677);
const H3: CrippenType = t("H3", 0.2142);
const H4: CrippenType = t("H4", 0.298);
const HS: CrippenType = t("HS", 0.1125);

const N1: CrippenType = t("N1", -1.019);
const N2: CrippenType = t("N2", -0.7096);
const N3: CrippenType = t("N3", -1.027);
const N4: CrippenType = t("N4", -0.5188);
const N5: CrippenType = t("N5", 0.08387);
const N6: CrippenType = t("N6", 0.1836);
const N7: CrippenType = t("N7", -0.3187);
const N8: CrippenType = t("N8", -0.4458);
const N9: CrippenType = t("N9", 0.01508);
const N10: CrippenType = t("N10", -1.95);
const N11: CrippenType = t("N11", -0.3239);
const N12: CrippenType = t("N12", -1.119);
const N13: CrippenType = t("N13", -0.3396);
const N14: CrippenType = t("N14", 0.2887);
const NS: CrippenType = t("NS", -0.4806);

const O1: CrippenType = t("O1", 0.1552);
const O2: CrippenType = t("O2", -0.2893);
const O3: CrippenType = t("O3", -0.0684);
const O4: CrippenType = t("O4", -0.4195);
const O5: CrippenType = t("O5", 0.0335);
const O6: CrippenType = t("O6", -0.3339);
const O7: CrippenType = t("O7", -1.189);
const O8: CrippenType = t("O8", 0.1788);
const O9: CrippenType = t("O9", -0.1526);
const O10: CrippenType = t("O10", 0.1129);
const O11: CrippenType = t("O11", 0.4833);
const O12: CrippenType = t("O12", -1.326);
const OS: CrippenType = t("OS", -0.1188);

const F: CrippenType = t("F", 0.4202);
const CL: CrippenType = t("Cl", 0.6895);
const BR: CrippenType = t("Br", 0.8456);
const I: CrippenType = t("I", 0.8857);
const HAL: CrippenType = t("Hal", -2.996);
const P: CrippenType = t("P", 0.8612);
const S1: CrippenType = t("S1", 0.6482);
const S2: CrippenType = t("S2", -0.0024);
const S3: CrippenType = t("S3", 0.6237);
const ME1: CrippenType = t("Me1", -0.3808);
const ME2: CrippenType = t("Me2", -0.0025);

/// Contribution of one atom plus the hydrogens it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomContribution {
    pub atom: usize,
    pub atom_type: CrippenType,
    pub hydrogen_type: Option<CrippenType>,
    pub hydrogens: u8,
}

impl AtomContribution {
    pub fn logp(&self) -> f64 {
        self.atom_type.logp
            + self
                .hydrogen_type
                .map_or(0.0, |h| h.logp * f64::from(self.hydrogens))
    }
}

/// Octanol/water partition coefficient estimate.
pub fn crippen_logp(mol: &Molecule) -> f64 {
    atom_contributions(mol).iter().map(|c| c.logp()).sum()
}

pub fn atom_contributions(mol: &Molecule) -> Vec<AtomContribution> {
    (0..mol.atoms().len())
        .map(|i| {
            let hydrogens = mol.atom(i).hydrogens;
            AtomContribution {
                atom: i,
                atom_type: classify(mol, i),
                hydrogen_type: (hydrogens > 0).then(|| hydrogen_type(mol, i)),
                hydrogens,
            }
        })
        .collect()
}

fn classify(mol: &Molecule, i: usize) -> CrippenType {
    let atom = mol.atom(i);
    match atom.element {
        Element::H => match mol.neighbors(i).next() {
            Some((parent, _)) if mol.atom(parent).element == Element::H => H1,
            Some((parent, _)) => hydrogen_type(mol, parent),
            None => HS,
        },
        Element::C if atom.aromatic => aromatic_carbon(mol, i),
        Element::C => aliphatic_carbon(mol, i),
        Element::N => nitrogen(mol, i),
        Element::O => oxygen(mol, i),
        Element::S if atom.aromatic => S3,
        Element::S if atom.charge == 0 => S1,
        Element::S => S2,
        Element::P => P,
        e if e.is_halogen() && atom.charge != 0 => HAL,
        Element::F => F,
        Element::Cl => CL,
        Element::Br => BR,
        Element::I => I,
        e if e.is_alkali_metal() => ME1,
        _ => ME2,
    }
}

/// Local view of one atom's surroundings, shared by the classifiers.
struct Env<'m> {
    mol: &'m Molecule,
    h: u8,
    x: usize,
    heavy: Vec<(usize, BondOrder)>,
}

impl<'m> Env<'m> {
    fn new(mol: &'m Molecule, i: usize) -> Self {
        Self {
            mol,
            h: mol.total_hydrogens(i),
            x: mol.total_degree(i),
            heavy: mol
                .heavy_neighbors(i)
                .map(|(n, b)| (n, b.order))
                .collect(),
        }
    }

    fn element(&self, n: usize) -> Element {
        self.mol.atom(n).element
    }

    fn aromatic(&self, n: usize) -> bool {
        self.mol.atom(n).aromatic
    }

    fn aliphatic_c(&self, n: usize) -> bool {
        self.element(n) == Element::C && !self.aromatic(n)
    }

    fn aromatic_c(&self, n: usize) -> bool {
        self.element(n) == Element::C && self.aromatic(n)
    }

    /// `[N,O,P,S,F,Cl,Br,I]`: aliphatic heteroatoms.
    fn aliphatic_hetero(&self, n: usize) -> bool {
        !self.aromatic(n)
            && matches!(
                self.element(n),
                Element::N
                    | Element::O
                    | Element::P
                    | Element::S
                    | Element::F
                    | Element::Cl
                    | Element::Br
                    | Element::I
            )
    }

    fn count(&self, pred: impl Fn(usize, BondOrder) -> bool) -> usize {
        self.heavy.iter().filter(|&&(n, o)| pred(n, o)).count()
    }

    fn any(&self, pred: impl Fn(usize, BondOrder) -> bool) -> bool {
        self.count(pred) > 0
    }

    fn all_aliphatic(&self) -> bool {
        self.heavy.iter().all(|&(n, _)| !self.aromatic(n))
    }
}

/// Bond written without a symbol in a SMARTS pattern: single or aromatic.
fn plain(o: BondOrder) -> bool {
    matches!(o, BondOrder::Single | BondOrder::Aromatic)
}

fn aliphatic_carbon(mol: &Molecule, i: usize) -> CrippenType {
    let env = Env::new(mol, i);
    let (h, x, deg) = (env.h, env.x, env.heavy.len());
    let c_plain = env.count(|n, o| env.aliphatic_c(n) && plain(o));
    let hetero = env.any(|n, o| env.aliphatic_hetero(n) && plain(o));
    let any_aromatic = env.any(|n, _| env.aromatic(n));
    let double_to_c = env.any(|n, o| o == BondOrder::Double && env.aliphatic_c(n));

    if h == 4 || (h == 3 && c_plain >= 1) || (h == 2 && c_plain >= 2) {
        return C1;
    }
    if (h == 1 && c_plain >= 3) || (h == 0 && c_plain >= 4) {
        return C2;
    }
    if h == 3 && hetero {
        return C3;
    }
    if hetero
        && env.all_aliphatic()
        && x == 4
        && ((h == 2 && deg >= 2) || (h == 1 && deg >= 3) || (h == 0 && deg >= 4))
    {
        return if h == 2 { C3 } else { C4 };
    }
    if env.any(|n, o| {
        o == BondOrder::Double && !env.aromatic(n) && env.element(n) != Element::C
    }) {
        return C5;
    }
    if double_to_c && !any_aromatic {
        return C6;
    }
    if x == 2 && env.any(|n, o| o == BondOrder::Triple && !env.aromatic(n)) {
        return C7;
    }
    if x == 4 && any_aromatic {
        return match h {
            3 if env.any(|n, _| env.aromatic_c(n)) => C8,
            3 => C9,
            2 => C10,
            1 => C11,
            _ => C12,
        };
    }
    if (double_to_c && any_aromatic)
        || env.any(|n, o| o == BondOrder::Double && env.aromatic_c(n))
    {
        return C26;
    }
    if x == 4
        && env.any(|n, o| {
            plain(o) && !env.aromatic(n) && !env.aliphatic_c(n) && !env.aliphatic_hetero(n)
        })
    {
        return C27;
    }
    CS
}

fn aromatic_carbon(mol: &Molecule, i: usize) -> CrippenType {
    let env = Env::new(mol, i);
    if env.h == 0
        && env.any(|n, o| {
            o == BondOrder::Single
                && !env.aromatic(n)
                && !matches!(
                    env.element(n),
                    Element::C
                        | Element::N
                        | Element::O
                        | Element::S
                        | Element::F
                        | Element::Cl
                        | Element::Br
                        | Element::I
                )
        })
    {
        return C13;
    }
    for (halogen, ty) in [
        (Element::F, C14),
        (Element::Cl, C15),
        (Element::Br, C16),
        (Element::I, C17),
    ] {
        if env.any(|n, o| plain(o) && env.element(n) == halogen) {
            return ty;
        }
    }
    if env.h == 1 {
        return C18;
    }

    let ring_bonds = env.count(|n, o| o == BondOrder::Aromatic && env.aromatic(n));
    if ring_bonds >= 3 {
        return C19;
    }
    if ring_bonds == 2 {
        let single = |pred: &dyn Fn(usize) -> bool| {
            env.any(|n, o| o == BondOrder::Single && pred(n))
        };
        if single(&|n| env.aromatic(n)) {
            return C20;
        }
        if single(&|n| env.aliphatic_c(n)) {
            return C21;
        }
        if single(&|n| !env.aromatic(n) && env.element(n) == Element::N) {
            return C22;
        }
        if single(&|n| !env.aromatic(n) && env.element(n) == Element::O) {
            return C23;
        }
        if single(&|n| !env.aromatic(n) && env.element(n) == Element::S) {
            return C24;
        }
        if env.any(|n, o| {
            o == BondOrder::Double
                && !env.aromatic(n)
                && matches!(env.element(n), Element::C | Element::N | Element::O)
        }) {
            return C25;
        }
    }
    CS
}

fn nitrogen(mol: &Molecule, i: usize) -> CrippenType {
    let atom = mol.atom(i);
    if atom.aromatic {
        return match atom.charge {
            0 => N11,
            c if c > 0 => N12,
            _ => NS,
        };
    }

    let env = Env::new(mol, i);
    let h = env.h;
    let aliphatic = env.count(|n, o| !env.aromatic(n) && plain(o));
    let aromatic = env.count(|n, o| env.aromatic(n) && plain(o));
    let has_double = env.any(|_, o| o == BondOrder::Double);
    let has_triple = env.any(|n, o| o == BondOrder::Triple && !env.aromatic(n));

    if atom.charge == 0 {
        return match h {
            2 if aliphatic >= 1 => N1,
            1 if aliphatic >= 2 => N2,
            2 if aromatic >= 1 => N3,
            1 if aromatic >= 1 && aromatic + aliphatic >= 2 => N4,
            1 if has_double => N5,
            0 if has_double && env.heavy.len() >= 2 => N6,
            0 if aliphatic >= 3 => N7,
            0 if aromatic >= 1 && aromatic + aliphatic >= 3 => N8,
            0 if has_triple => N9,
            _ => NS,
        };
    }

    if atom.charge > 0 {
        if h > 0 {
            return N10;
        }
        if has_triple {
            return N14;
        }
        if env.all_aliphatic() && (aliphatic >= 4 || has_double) {
            return N13;
        }
        return NS;
    }

    N14
}

fn oxygen(mol: &Molecule, i: usize) -> CrippenType {
    let atom = mol.atom(i);
    if atom.aromatic {
        return O1;
    }
    let env = Env::new(mol, i);

    if atom.charge == 0 {
        if env.h >= 1 {
            return O2;
        }
        if env.heavy.len() == 2 {
            return if env.all_aliphatic() { O3 } else { O4 };
        }
        if let Some(&(p, BondOrder::Double)) = env.heavy.first() {
            return match env.element(p) {
                Element::N | Element::O => O5,
                Element::C if env.aromatic(p) => O8,
                Element::C => carbonyl_oxygen(mol, i, p),
                _ => OS,
            };
        }
        return OS;
    }

    if atom.charge == -1
        && let Some(&(p, _)) = env.heavy.first()
    {
        return match env.element(p) {
            Element::N => O5,
            Element::S => O6,
            Element::C
                if mol.neighbors(p).any(|(n, b)| {
                    n != i && b.order == BondOrder::Double && mol.atom(n).element == Element::O
                }) =>
            {
                O12
            }
            _ => O7,
        };
    }
    OS
}

/// Carbonyl oxygen on aliphatic carbon `p`: aliphatic (O9), aromatic (O10)
/// or attached to two heteroatoms (O11).
fn carbonyl_oxygen(mol: &Molecule, o: usize, p: usize) -> CrippenType {
    let env = Env::new(mol, p);
    let others: Vec<(usize, BondOrder)> = env
        .heavy
        .iter()
        .copied()
        .filter(|&(n, _)| n != o)
        .collect();

    let aliph_c = |n: usize| env.aliphatic_c(n);
    let arom_c = |n: usize| env.aromatic_c(n);
    let aliph_heavy = |n: usize| !env.aromatic(n);
    let aromatic = |n: usize| env.aromatic(n);

    match (env.h, others.as_slice()) {
        (2, []) => O9,
        (1, [(n, o)])
            if plain(*o)
                && (aliph_c(*n)
                    || (aliph_heavy(*n) && matches!(env.element(*n), Element::N | Element::O))) =>
        {
            O9
        }
        (1, [(n, o)]) if plain(*o) && arom_c(*n) => O10,
        (0, [(a, oa), (b, ob)]) if plain(*oa) && plain(*ob) => {
            let pair = |f: &dyn Fn(usize) -> bool, g: &dyn Fn(usize) -> bool| {
                (f(*a) && g(*b)) || (f(*b) && g(*a))
            };
            let non_c = |n: usize| env.element(n) != Element::C;
            if pair(&aliph_c, &aliph_heavy) {
                O9
            } else if pair(&|n| aliph_c(n) || arom_c(n), &aromatic) || pair(&arom_c, &aliph_heavy) {
                O10
            } else if pair(&non_c, &non_c) {
                O11
            } else {
                OS
            }
        }
        (0, [(n, BondOrder::Double)]) if env.element(*n) == Element::O && env.x == 2 => O9,
        _ => OS,
    }
}

/// Type of the hydrogens attached to `parent`.
fn hydrogen_type(mol: &Molecule, parent: usize) -> CrippenType {
    let atom = mol.atom(parent);
    match atom.element {
        Element::C | Element::H => H1,
        Element::N => H3,
        Element::O => {
            let others: Vec<usize> = mol.heavy_neighbors(parent).map(|(n, _)| n).collect();
            let [q] = others.as_slice() else {
                return if mol.total_hydrogens(parent) >= 2 { H2 } else { HS };
            };
            let q = *q;
            let qa = mol.atom(q);
            let carbon_x4 = qa.element == Element::C && !qa.aromatic && mol.total_degree(q) == 4;
            let aromatic_c = qa.element == Element::C && qa.aromatic;
            let exotic = !matches!(qa.element, Element::C | Element::N | Element::O | Element::S);
            if carbon_x4 || aromatic_c || exotic {
                return H2;
            }
            if qa.element == Element::N {
                return H3;
            }
            let acid = qa.element == Element::C
                && mol.neighbors(q).any(|(n, b)| {
                    n != parent
                        && b.order == BondOrder::Double
                        && matches!(
                            mol.atom(n).element,
                            Element::C | Element::N | Element::O | Element::S
                        )
                });
            if acid || matches!(qa.element, Element::O | Element::S) {
                return H4;
            }
            HS
        }
        _ => H2,
    }
}
