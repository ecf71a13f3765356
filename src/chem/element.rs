use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported element symbol: '{0}'")]
pub struct ParseElementError(pub String);

/// Periodic table plus the SMILES wildcard `*` at atomic number 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Element {
    /// Wildcard atom `*`.
    Dummy = 0,
    H,
    He,
    Li,
    Be,
    B,
    C,
    N,
    O,
    F,
    Ne,
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    Ar,
    K,
    Ca,
    Sc,
    Ti,
    V,
    Cr,
    Mn,
    Fe,
    Co,
    Ni,
    Cu,
    Zn,
    Ga,
    Ge,
    As,
    Se,
    Br,
    Kr,
    Rb,
    Sr,
    Y,
    Zr,
    Nb,
    Mo,
    Tc,
    Ru,
    Rh,
    Pd,
    Ag,
    Cd,
    In,
    Sn,
    Sb,
    Te,
    I,
    Xe,
    Cs,
    Ba,
    La,
    Ce,
    Pr,
    Nd,
    Pm,
    Sm,
    Eu,
    Gd,
    Tb,
    Dy,
    Ho,
    Er,
    Tm,
    Yb,
    Lu,
    Hf,
    Ta,
    W,
    Re,
    Os,
    Ir,
    Pt,
    Au,
    Hg,
    Tl,
    Pb,
    Bi,
    Po,
    At,
    Rn,
    Fr,
    Ra,
    Ac,
    Th,
    Pa,
    U,
    Np,
    Pu,
    Am,
    Cm,
    Bk,
    Cf,
    Es,
    Fm,
    Md,
    No,
    Lr,
    Rf,
    Db,
    Sg,
    Bh,
    Hs,
    Mt,
    Ds,
    Rg,
    Cn,
    Nh,
    Fl,
    Mc,
    Lv,
    Ts,
    Og,
}

const ALL: [Element; 119] = [
    Element::Dummy,
    Element::H,
    Element::He,
    Element::Li,
    Element::Be,
    Element::B,
    Element::C,
    Element::N,
    Element::O,
    Element::F,
    Element::Ne,
    Element::Na,
    Element::Mg,
    Element::Al,
    Element::Si,
    Element::P,
    Element::S,
    Element::Cl,
    Element::Ar,
    Element::K,
    Element::Ca,
    Element::Sc,
    Element::Ti,
    Element::V,
    Element::Cr,
    Element::Mn,
    Element::Fe,
    Element::Co,
    Element::Ni,
    Element::Cu,
    Element::Zn,
    Element::Ga,
    Element::Ge,
    Element::As,
    Element::Se,
    Element::Br,
    Element::Kr,
    Element::Rb,
    Element::Sr,
    Element::Y,
    Element::Zr,
    Element::Nb,
    Element::Mo,
    Element::Tc,
    Element::Ru,
    Element::Rh,
    Element::Pd,
    Element::Ag,
    Element::Cd,
    Element::In,
    Element::Sn,
    Element::Sb,
    Element::Te,
    Element::I,
    Element::Xe,
    Element::Cs,
    Element::Ba,
    Element::La,
    Element::Ce,
    Element::Pr,
    Element::Nd,
    Element::Pm,
    Element::Sm,
    Element::Eu,
    Element::Gd,
    Element::Tb,
    Element::Dy,
    Element::Ho,
    Element::Er,
    Element::Tm,
    Element::Yb,
    Element::Lu,
    Element::Hf,
    Element::Ta,
    Element::W,
    Element::Re,
    Element::Os,
    Element::Ir,
    Element::Pt,
    Element::Au,
    Element::Hg,
    Element::Tl,
    Element::Pb,
    Element::Bi,
    Element::Po,
    Element::At,
    Element::Rn,
    Element::Fr,
    Element::Ra,
    Element::Ac,
    Element::Th,
    Element::Pa,
    Element::U,
    Element::Np,
    Element::Pu,
    Element::Am,
    Element::Cm,
    Element::Bk,
    Element::Cf,
    Element::Es,
    Element::Fm,
    Element::Md,
    Element::No,
    Element::Lr,
    Element::Rf,
    Element::Db,
    Element::Sg,
    Element::Bh,
    Element::Hs,
    Element::Mt,
    Element::Ds,
    Element::Rg,
    Element::Cn,
    Element::Nh,
    Element::Fl,
    Element::Mc,
    Element::Lv,
    Element::Ts,
    Element::Og,
];

/// Symbol and standard atomic weight, indexed by atomic number. Elements
/// without a stable isotope use the mass number of the longest-lived one.
const DATA: [(&str, f64); 119] = [
    ("*", 0.0),
    ("H", 1.008),
    ("He", 4.003),
    ("Li", 6.941),
    ("Be", 9.012),
    ("B", 10.812),
    ("C", 12.011),
    ("N", 14.007),
    ("O", 15.999),
    ("F", 18.998),
    ("Ne", 20.18),
    ("Na", 22.99),
    ("Mg", 24.305),
    ("Al", 26.982),
    ("Si", 28.086),
    ("P", 30.974),
    ("S", 32.067),
    ("Cl", 35.453),
    ("Ar", 39.948),
    ("K", 39.098),
    ("Ca", 40.078),
    ("Sc", 44.956),
    ("Ti", 47.867),
    ("V", 50.942),
    ("Cr", 51.996),
    ("Mn", 54.938),
    ("Fe", 55.845),
    ("Co", 58.933),
    ("Ni", 58.693),
    ("Cu", 63.546),
    ("Zn", 65.39),
    ("Ga", 69.723),
    ("Ge", 72.61),
    ("As", 74.922),
    ("Se", 78.96),
    ("Br", 79.904),
    ("Kr", 83.8),
    ("Rb", 85.468),
    ("Sr", 87.62),
    ("Y", 88.906),
    ("Zr", 91.224),
    ("Nb", 92.906),
    ("Mo", 95.94),
    ("Tc", 98.0),
    ("Ru", 101.07),
    ("Rh", 102.906),
    ("Pd", 106.42),
    ("Ag", 107.868),
    ("Cd", 112.412),
    ("In", 114.818),
    ("Sn", 118.711),
    ("Sb", 121.76),
    ("Te", 127.6),
    ("I", 126.904),
    ("Xe", 131.29),
    ("Cs", 132.905),
    ("Ba", 137.328),
    ("La", 138.906),
    ("Ce", 140.116),
    ("Pr", 140.908),
    ("Nd", 144.24),
    ("Pm", 145.0),
    ("Sm", 150.36),
    ("Eu", 151.964),
    ("Gd", 157.25),
    ("Tb", 158.925),
    ("Dy", 162.5),
    ("Ho", 164.93),
    ("Er", 167.259),
    ("Tm", 168.934),
    ("Yb", 173.04),
    ("Lu", 174.967),
    ("Hf", 178.49),
    ("Ta", 180.948),
    ("W", 183.84),
    ("Re", 186.207),
    ("Os", 190.23),
    ("Ir", 192.217),
    ("Pt", 195.078),
    ("Au", 196.967),
    ("Hg", 200.59),
    ("Tl", 204.383),
    ("Pb", 207.2),
    ("Bi", 208.98),
    ("Po", 209.0),
    ("At", 210.0),
    ("Rn", 222.0),
    ("Fr", 223.0),
    ("Ra", 226.0),
    ("Ac", 227.0),
    ("Th", 232.038),
    ("Pa", 231.036),
    ("U", 238.029),
    ("Np", 237.0),
    ("Pu", 244.0),
    ("Am", 243.0),
    ("Cm", 247.0),
    ("Bk", 247.0),
    ("Cf", 251.0),
    ("Es", 252.0),
    ("Fm", 257.0),
    ("Md", 258.0),
    ("No", 259.0),
    ("Lr", 262.0),
    ("Rf", 267.0),
    ("Db", 268.0),
    ("Sg", 271.0),
    ("Bh", 272.0),
    ("Hs", 270.0),
    ("Mt", 276.0),
    ("Ds", 281.0),
    ("Rg", 280.0),
    ("Cn", 285.0),
    ("Nh", 284.0),
    ("Fl", 289.0),
    ("Mc", 288.0),
    ("Lv", 293.0),
    ("Ts", 292.0),
    ("Og", 294.0),
];

impl Element {
    pub fn atomic_number(&self) -> u8 {
        *self as u8
    }

    /// Standard atomic weight (IUPAC, conventional values).
    pub fn atomic_mass(&self) -> f64 {
        DATA[*self as usize].1
    }

    /// Mass of a specific isotope. Common labels use their measured mass;
    /// anything else falls back to the mass number.
    pub fn isotope_mass(&self, mass_number: u16) -> f64 {
        match (self, mass_number) {
            (Element::H, 1) => 1.007825,
            (Element::H, 2) => 2.014102,
            (Element::H, 3) => 3.016049,
            (Element::C, 12) => 12.0,
            (Element::C, 13) => 13.003355,
            (Element::C, 14) => 14.003242,
            (Element::N, 14) => 14.003074,
            (Element::N, 15) => 15.000109,
            (Element::O, 16) => 15.994915,
            (Element::O, 17) => 16.999132,
            (Element::O, 18) => 17.99916,
            (Element::F, 18) => 18.000938,
            (Element::F, 19) => 18.998403,
            (Element::P, 32) => 31.973907,
            (Element::S, 34) => 33.967867,
            (Element::S, 35) => 34.969032,
            (Element::Cl, 35) => 34.968853,
            (Element::Cl, 37) => 36.965903,
            (Element::Br, 79) => 78.918338,
            (Element::Br, 81) => 80.916291,
            (Element::I, 125) => 124.904631,
            (Element::I, 127) => 126.904473,
            (Element::I, 131) => 130.906125,
            _ => f64::from(mass_number),
        }
    }

    /// Allowed valences for a neutral atom, lowest first. Empty means the
    /// element is not valence-checked (metals, noble gases).
    pub fn default_valences(&self) -> &'static [u8] {
        match self {
            Element::H => &[1],
            Element::B => &[3],
            Element::C => &[4],
            Element::N => &[3],
            Element::O => &[2],
            Element::F => &[1],
            Element::Si => &[4],
            Element::P => &[3, 5],
            Element::S => &[2, 4, 6],
            Element::Cl => &[1],
            Element::Ge => &[4],
            Element::As => &[3, 5],
            Element::Se => &[2, 4, 6],
            Element::Br => &[1],
            Element::Te => &[2, 4, 6],
            Element::I => &[1, 3, 5],
            Element::Li | Element::Na | Element::K | Element::Rb | Element::Cs => &[1],
            Element::Be | Element::Mg | Element::Ca | Element::Sr | Element::Ba => &[2],
            Element::Al => &[3],
            _ => &[],
        }
    }

    /// Allowed valences once a formal charge is applied. Charged main-group
    /// atoms take the valences of their isoelectronic neutral neighbour
    /// (N+ behaves like C, O- like F). Returns an empty slice when the
    /// shifted element is not valence-checked.
    pub fn valences_with_charge(&self, charge: i8) -> &'static [u8] {
        if charge == 0 {
            return self.default_valences();
        }
        if !self.is_main_group_nonmetal() {
            return &[];
        }
        let shifted = i16::from(self.atomic_number()) - i16::from(charge);
        ALL.iter()
            .copied()
            .find(|e| i16::from(e.atomic_number()) == shifted && e.is_main_group_nonmetal())
            .map(|e| e.default_valences())
            .unwrap_or(&[])
    }

    fn is_main_group_nonmetal(&self) -> bool {
        matches!(
            self,
            Element::B
                | Element::C
                | Element::N
                | Element::O
                | Element::F
                | Element::Al
                | Element::Si
                | Element::P
                | Element::S
                | Element::Cl
                | Element::Ge
                | Element::As
                | Element::Se
                | Element::Br
                | Element::Sb
                | Element::Te
                | Element::I
        )
    }

    /// Elements that may appear as lowercase aromatic atoms.
    pub fn can_be_aromatic(&self) -> bool {
        matches!(
            self,
            Element::B
                | Element::C
                | Element::N
                | Element::O
                | Element::P
                | Element::S
                | Element::As
                | Element::Se
                | Element::Te
        )
    }

    pub fn is_halogen(&self) -> bool {
        matches!(self, Element::F | Element::Cl | Element::Br | Element::I)
    }

    pub fn is_alkali_metal(&self) -> bool {
        matches!(
            self,
            Element::Li | Element::Na | Element::K | Element::Rb | Element::Cs
        )
    }

    pub fn symbol(&self) -> &'static str {
        DATA[*self as usize].0
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL.iter()
            .copied()
            .find(|e| e.symbol() == s)
            .ok_or_else(|| ParseElementError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_round_trip_through_from_str() {
        for e in ALL {
            assert_eq!(e.symbol().parse::<Element>().unwrap(), e);
        }
    }

    #[test]
    fn unknown_symbol_is_rejected() {
        assert_eq!(
            "Xx".parse::<Element>().unwrap_err(),
            ParseElementError("Xx".into())
        );
        assert!("c".parse::<Element>().is_err());
    }

    #[test]
    fn atomic_numbers_match_periodic_table() {
        assert_eq!(Element::C.atomic_number(), 6);
        assert_eq!(Element::Sr.atomic_number(), 38);
        assert_eq!(Element::Ag.atomic_number(), 47);
        assert_eq!(Element::I.atomic_number(), 53);
        assert_eq!(Element::Pt.atomic_number(), 78);
        assert_eq!(Element::Bi.atomic_number(), 83);
        assert_eq!(Element::Gd.atomic_number(), 64);
        assert_eq!(Element::U.atomic_number(), 92);
        assert_eq!(Element::Og.atomic_number(), 118);
        assert_eq!(Element::Dummy.atomic_number(), 0);
    }

    #[test]
    fn whole_table_is_indexed_by_atomic_number() {
        for (i, e) in ALL.iter().enumerate() {
            assert_eq!(usize::from(e.atomic_number()), i);
        }
        assert_eq!("Pd".parse::<Element>().unwrap(), Element::Pd);
        assert_eq!("*".parse::<Element>().unwrap(), Element::Dummy);
        assert!((Element::Mo.atomic_mass() - 95.94).abs() < 1e-9);
        assert_eq!(Element::Dummy.atomic_mass(), 0.0);
    }

    #[test]
    fn charged_atoms_use_isoelectronic_valences() {
        assert_eq!(Element::N.valences_with_charge(1), &[4]);
        assert_eq!(Element::O.valences_with_charge(-1), &[1]);
        assert_eq!(Element::O.valences_with_charge(1), &[3]);
        assert_eq!(Element::C.valences_with_charge(-1), &[3]);
        assert!(Element::Na.valences_with_charge(1).is_empty());
        assert!(Element::Fe.valences_with_charge(2).is_empty());
    }

    #[test]
    fn isotope_mass_falls_back_to_mass_number() {
        assert!((Element::C.isotope_mass(13) - 13.003355).abs() < 1e-6);
        assert!((Element::Fe.isotope_mass(56) - 56.0).abs() < f64::EPSILON);
    }
}
