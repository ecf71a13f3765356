//! In-memory molecular graph produced by the SMILES parser.
//!
//! A [`Molecule`] only exists once parsing and sanitisation succeeded, so
//! every descriptor can take `&Molecule` without re-checking validity.

use super::element::Element;
use std::collections::{BTreeSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
}

impl BondOrder {
    /// Integer order for a non-aromatic bond.
    pub fn as_int(&self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Quadruple => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    pub aromatic: bool,
    pub charge: i8,
    pub isotope: Option<u16>,
    /// Hydrogens carried on this atom (implicit, bracket count, or folded
    /// from explicit `[H]` neighbours).
    pub hydrogens: u8,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            aromatic: false,
            charge: 0,
            isotope: None,
            hydrogens: 0,
        }
    }

    pub fn mass(&self) -> f64 {
        match self.isotope {
            Some(n) => self.element.isotope_mass(n),
            None => self.element.atomic_mass(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub a: usize,
    pub b: usize,
    pub order: BondOrder,
    /// Localised order used for valence bookkeeping. Equals `order.as_int()`
    /// except for aromatic bonds, which carry their Kekulé assignment.
    pub kekule: u8,
}

impl Bond {
    pub fn new(a: usize, b: usize, order: BondOrder) -> Self {
        Self {
            a,
            b,
            order,
            kekule: order.as_int(),
        }
    }

    pub fn other(&self, idx: usize) -> usize {
        if self.a == idx { self.b } else { self.a }
    }
}

#[derive(Debug, Clone)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    adjacency: Vec<Vec<usize>>,
    rings: Vec<Vec<usize>>,
}

impl Molecule {
    /// Build the graph and perceive rings. Callers are expected to have
    /// validated valences already.
    pub(crate) fn from_parts(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        let adjacency = build_adjacency(atoms.len(), &bonds);
        let mut mol = Self {
            atoms,
            bonds,
            adjacency,
            rings: Vec::new(),
        };
        mol.rings = smallest_rings(&mol.atoms, &mol.bonds, &mol.adjacency);
        mol
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom(&self, idx: usize) -> &Atom {
        &self.atoms[idx]
    }

    /// Smallest ring through each ring bond, deduplicated. Atoms are listed in
    /// ring order.
    pub fn rings(&self) -> &[Vec<usize>] {
        &self.rings
    }

    /// Neighbouring atom indices paired with the connecting bond.
    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = (usize, &Bond)> + '_ {
        self.adjacency[idx].iter().map(move |&bi| {
            let bond = &self.bonds[bi];
            (bond.other(idx), bond)
        })
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<&Bond> {
        self.neighbors(a).find(|(n, _)| *n == b).map(|(_, bond)| bond)
    }

    /// Hydrogens on `idx`, counting both the carried count and any explicit
    /// hydrogen atoms still in the graph (isotopic or charged ones).
    pub fn total_hydrogens(&self, idx: usize) -> u8 {
        let explicit = self
            .neighbors(idx)
            .filter(|(n, _)| self.atoms[*n].element == Element::H)
            .count();
        let explicit = u8::try_from(explicit).unwrap_or(u8::MAX);
        self.atoms[idx].hydrogens.saturating_add(explicit)
    }

    /// Non-hydrogen neighbours.
    pub fn heavy_neighbors(&self, idx: usize) -> impl Iterator<Item = (usize, &Bond)> + '_ {
        self.neighbors(idx)
            .filter(|(n, _)| self.atoms[*n].element != Element::H)
    }

    pub fn heavy_degree(&self, idx: usize) -> usize {
        self.heavy_neighbors(idx).count()
    }

    /// Total connections including hydrogens (the SMARTS `X` primitive).
    pub fn total_degree(&self, idx: usize) -> usize {
        self.adjacency[idx].len() + self.atoms[idx].hydrogens as usize
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms
            .iter()
            .filter(|a| a.element != Element::H)
            .count()
    }

    pub fn is_ring_atom(&self, idx: usize) -> bool {
        self.rings.iter().any(|r| r.contains(&idx))
    }

    /// Mark Kekulé rings that satisfy Hückel's rule as aromatic so they are
    /// indistinguishable from rings written in lowercase.
    pub(crate) fn perceive_aromaticity(&mut self) {
        let mut newly_aromatic: Vec<usize> = Vec::new();
        for (ri, ring) in self.rings.iter().enumerate() {
            if ring.iter().all(|&i| self.atoms[i].aromatic) {
                continue;
            }
            if let Some(electrons) = self.ring_pi_electrons(ring)
                && electrons >= 2
                && (electrons - 2) % 4 == 0
            {
                newly_aromatic.push(ri);
            }
        }

        for ri in newly_aromatic {
            let ring = self.rings[ri].clone();
            for &i in &ring {
                self.atoms[i].aromatic = true;
            }
            for w in 0..ring.len() {
                let (a, b) = (ring[w], ring[(w + 1) % ring.len()]);
                if let Some(&bi) = self.adjacency[a]
                    .iter()
                    .find(|&&bi| self.bonds[bi].other(a) == b)
                {
                    self.bonds[bi].order = BondOrder::Aromatic;
                }
            }
        }
    }

    /// π electrons the ring atoms contribute, or `None` if some atom cannot
    /// take part in a conjugated ring.
    fn ring_pi_electrons(&self, ring: &[usize]) -> Option<u32> {
        let mut total = 0u32;
        for &i in ring {
            let atom = &self.atoms[i];
            let double = self.neighbors(i).find(|(_, b)| b.kekule == 2);
            let electrons = match double {
                Some((n, _)) if ring.contains(&n) || self.is_ring_atom(n) => 1,
                Some((n, _)) => {
                    let partner = self.atoms[n].element;
                    if atom.element == Element::C
                        && matches!(partner, Element::O | Element::N | Element::S)
                    {
                        0
                    } else {
                        return None;
                    }
                }
                None if self.neighbors(i).any(|(_, b)| b.kekule == 3) => return None,
                None => match (atom.element, atom.charge) {
                    (Element::C, c) if c < 0 => 2,
                    (Element::C, c) if c > 0 => 0,
                    (Element::B, 0) => 0,
                    (Element::N | Element::P | Element::As, 0) if self.total_degree(i) == 3 => 2,
                    (Element::O | Element::S | Element::Se | Element::Te, 0)
                        if self.total_degree(i) == 2 =>
                    {
                        2
                    }
                    (Element::N, -1) => 2,
                    _ => return None,
                },
            };
            total += electrons;
        }
        Some(total)
    }

    /// Remove hydrogen atoms that are plain substituents of a heavy atom and
    /// add them to that atom's hydrogen count. Isotopic or charged hydrogens
    /// and H2 stay in the graph.
    pub(crate) fn fold_explicit_hydrogens(atoms: Vec<Atom>, bonds: Vec<Bond>) -> (Vec<Atom>, Vec<Bond>) {
        let mut degree = vec![0usize; atoms.len()];
        for b in &bonds {
            degree[b.a] += 1;
            degree[b.b] += 1;
        }
        let foldable = |i: usize| {
            let a = &atoms[i];
            a.element == Element::H
                && a.isotope.is_none()
                && a.charge == 0
                && a.hydrogens == 0
                && degree[i] == 1
        };

        let mut remove = vec![false; atoms.len()];
        let mut extra = vec![0u8; atoms.len()];
        for b in &bonds {
            for (h, heavy) in [(b.a, b.b), (b.b, b.a)] {
                if foldable(h) && atoms[heavy].element != Element::H && b.order == BondOrder::Single {
                    remove[h] = true;
                    extra[heavy] = extra[heavy].saturating_add(1);
                }
            }
        }

        let mut remap = vec![usize::MAX; atoms.len()];
        let mut kept = Vec::with_capacity(atoms.len());
        for (i, mut atom) in atoms.into_iter().enumerate() {
            if remove[i] {
                continue;
            }
            atom.hydrogens = atom.hydrogens.saturating_add(extra[i]);
            remap[i] = kept.len();
            kept.push(atom);
        }
        let bonds = bonds
            .into_iter()
            .filter(|b| !remove[b.a] && !remove[b.b])
            .map(|b| Bond {
                a: remap[b.a],
                b: remap[b.b],
                ..b
            })
            .collect();
        (kept, bonds)
    }
}

/// For each edge, whether it lies on a cycle. Edges that are bridges
/// (removing them disconnects the graph) get `false`.
pub(crate) fn ring_bond_flags(n: usize, edges: &[(usize, usize)]) -> Vec<bool> {
    let mut adj: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
    for (ei, &(a, b)) in edges.iter().enumerate() {
        adj[a].push((b, ei));
        adj[b].push((a, ei));
    }

    let mut in_ring = vec![true; edges.len()];
    let mut disc = vec![usize::MAX; n];
    let mut low = vec![0usize; n];
    let mut clock = 0usize;

    for root in 0..n {
        if disc[root] != usize::MAX {
            continue;
        }
        disc[root] = clock;
        low[root] = clock;
        clock += 1;
        // (vertex, edge used to reach it, next adjacency slot)
        let mut stack = vec![(root, usize::MAX, 0usize)];
        while let Some(top) = stack.last_mut() {
            let (v, via, slot) = *top;
            top.2 += 1;
            if let Some(&(to, ei)) = adj[v].get(slot) {
                if ei == via {
                    continue;
                }
                if disc[to] == usize::MAX {
                    disc[to] = clock;
                    low[to] = clock;
                    clock += 1;
                    stack.push((to, ei, 0));
                } else {
                    low[v] = low[v].min(disc[to]);
                }
                continue;
            }
            stack.pop();
            if let Some(&(parent, _, _)) = stack.last() {
                low[parent] = low[parent].min(low[v]);
                if low[v] > disc[parent] {
                    in_ring[via] = false;
                }
            }
        }
    }
    in_ring
}

fn build_adjacency(n: usize, bonds: &[Bond]) -> Vec<Vec<usize>> {
    let mut adj = vec![Vec::new(); n];
    for (i, b) in bonds.iter().enumerate() {
        adj[b.a].push(i);
        adj[b.b].push(i);
    }
    adj
}

/// For every bond, the shortest cycle through it (BFS from one end to the
/// other with the bond itself removed). Duplicates are dropped.
fn smallest_rings(atoms: &[Atom], bonds: &[Bond], adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut seen: BTreeSet<Vec<usize>> = BTreeSet::new();
    let mut rings = Vec::new();

    for (bi, bond) in bonds.iter().enumerate() {
        let mut prev = vec![usize::MAX; atoms.len()];
        let mut visited = vec![false; atoms.len()];
        let mut queue = VecDeque::from([bond.a]);
        visited[bond.a] = true;

        while let Some(cur) = queue.pop_front() {
            if cur == bond.b {
                break;
            }
            for &nbi in &adjacency[cur] {
                if nbi == bi {
                    continue;
                }
                let next = bonds[nbi].other(cur);
                if !visited[next] {
                    visited[next] = true;
                    prev[next] = cur;
                    queue.push_back(next);
                }
            }
        }

        if !visited[bond.b] {
            continue;
        }
        let mut path = vec![bond.b];
        let mut cur = bond.b;
        while cur != bond.a {
            cur = prev[cur];
            path.push(cur);
        }
        let mut key = path.clone();
        key.sort_unstable();
        if seen.insert(key) {
            rings.push(path);
        }
    }
    rings
}
