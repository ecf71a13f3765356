use super::element::Element;
use super::molecule::Molecule;
use std::collections::BTreeMap;

/// Average molecular weight in g/mol, hydrogens included.
pub fn molecular_weight(mol: &Molecule) -> f64 {
    let hydrogen = Element::H.atomic_mass();
    mol.atoms()
        .iter()
        .map(|a| a.mass() + f64::from(a.hydrogens) * hydrogen)
        .sum()
}

/// Hill-order molecular formula: C first, then H, then the rest
/// alphabetically. Without carbon everything is alphabetical. Net charge is
/// appended as a suffix (`+`, `2-`).
pub fn molecular_formula(mol: &Molecule) -> String {
    let mut counts: BTreeMap<&'static str, u32> = BTreeMap::new();
    let mut charge: i32 = 0;
    for atom in mol.atoms() {
        *counts.entry(atom.element.symbol()).or_default() += 1;
        if atom.hydrogens > 0 {
            *counts.entry("H").or_default() += u32::from(atom.hydrogens);
        }
        charge += i32::from(atom.charge);
    }

    let mut out = String::new();
    let mut push = |sym: &str, n: u32| {
        out.push_str(sym);
        if n > 1 {
            out.push_str(&n.to_string());
        }
    };

    if let Some(c) = counts.remove("C") {
        push("C", c);
        if let Some(h) = counts.remove("H") {
            push("H", h);
        }
    }
    for (sym, n) in counts {
        push(sym, n);
    }

    match charge {
        0 => {}
        1 => out.push('+'),
        -1 => out.push('-'),
        c if c > 0 => out.push_str(&format!("{c}+")),
        c => out.push_str(&format!("{}-", -c)),
    }
    out
}
