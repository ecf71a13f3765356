//! Maximum matching on general graphs (Edmonds' blossom algorithm).
//!
//! Kekulization is a perfect-matching problem on the atoms that still need a
//! π bond. Aromatic graphs contain odd rings, so a bipartite augmenting-path
//! search is not enough; blossoms are contracted while searching. Runs in
//! O(V³) regardless of how many independent ring systems the input holds.

use std::collections::VecDeque;

const NONE: usize = usize::MAX;

/// Maximum matching over `adjacency`. Returns each vertex's partner.
pub(crate) fn maximum_matching(adjacency: &[Vec<usize>]) -> Vec<Option<usize>> {
    let mut search = Search::new(adjacency);
    for root in 0..adjacency.len() {
        if search.mate[root] == NONE
            && let Some(end) = search.augmenting_path(root)
        {
            search.augment(end);
        }
    }
    search
        .mate
        .into_iter()
        .map(|m| (m != NONE).then_some(m))
        .collect()
}

struct Search<'g> {
    adj: &'g [Vec<usize>],
    mate: Vec<usize>,
    parent: Vec<usize>,
    base: Vec<usize>,
    used: Vec<bool>,
    blossom: Vec<bool>,
}

impl<'g> Search<'g> {
    fn new(adj: &'g [Vec<usize>]) -> Self {
        let n = adj.len();
        Self {
            adj,
            mate: vec![NONE; n],
            parent: vec![NONE; n],
            base: (0..n).collect(),
            used: vec![false; n],
            blossom: vec![false; n],
        }
    }

    fn lowest_common_base(&self, mut a: usize, mut b: usize) -> usize {
        let mut seen = vec![false; self.adj.len()];
        loop {
            a = self.base[a];
            seen[a] = true;
            if self.mate[a] == NONE {
                break;
            }
            a = self.parent[self.mate[a]];
        }
        loop {
            b = self.base[b];
            if seen[b] {
                return b;
            }
            b = self.parent[self.mate[b]];
        }
    }

    fn mark_path(&mut self, mut v: usize, b: usize, mut child: usize) {
        while self.base[v] != b {
            self.blossom[self.base[v]] = true;
            self.blossom[self.base[self.mate[v]]] = true;
            self.parent[v] = child;
            child = self.mate[v];
            v = self.parent[self.mate[v]];
        }
    }

    /// BFS from an unmatched `root`; returns the free vertex that ends an
    /// augmenting path, with `parent` links leading back to the root.
    fn augmenting_path(&mut self, root: usize) -> Option<usize> {
        let n = self.adj.len();
        self.used.fill(false);
        self.parent.fill(NONE);
        for (i, b) in self.base.iter_mut().enumerate() {
            *b = i;
        }

        let adj = self.adj;
        self.used[root] = true;
        let mut queue = VecDeque::from([root]);
        while let Some(v) = queue.pop_front() {
            for &to in &adj[v] {
                if self.base[v] == self.base[to] || self.mate[v] == to {
                    continue;
                }
                if to == root || (self.mate[to] != NONE && self.parent[self.mate[to]] != NONE) {
                    let cur = self.lowest_common_base(v, to);
                    self.blossom.fill(false);
                    self.mark_path(v, cur, to);
                    self.mark_path(to, cur, v);
                    for i in 0..n {
                        if self.blossom[self.base[i]] {
                            self.base[i] = cur;
                            if !self.used[i] {
                                self.used[i] = true;
                                queue.push_back(i);
                            }
                        }
                    }
                } else if self.parent[to] == NONE {
                    self.parent[to] = v;
                    if self.mate[to] == NONE {
                        return Some(to);
                    }
                    let next = self.mate[to];
                    self.used[next] = true;
                    queue.push_back(next);
                }
            }
        }
        None
    }

    fn augment(&mut self, mut v: usize) {
        while v != NONE {
            let pv = self.parent[v];
            let next = self.mate[pv];
            self.mate[v] = pv;
            self.mate[pv] = v;
            v = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(n: usize) -> Vec<Vec<usize>> {
        (0..n).map(|i| vec![(i + n - 1) % n, (i + 1) % n]).collect()
    }

    fn matched(m: &[Option<usize>]) -> usize {
        m.iter().filter(|x| x.is_some()).count()
    }

    #[test]
    fn even_ring_is_perfect() {
        let m = maximum_matching(&ring(6));
        assert_eq!(matched(&m), 6);
        for (i, p) in m.iter().enumerate() {
            assert_eq!(m[p.unwrap()], Some(i));
        }
    }

    #[test]
    fn odd_ring_leaves_one_free() {
        assert_eq!(matched(&maximum_matching(&ring(5))), 4);
    }

    #[test]
    fn odd_ring_with_pendant_is_perfect() {
        // The pendant is only reachable through the five-membered cycle.
        let mut adj = ring(5);
        adj[0].push(5);
        adj.push(vec![0]);
        let m = maximum_matching(&adj);
        assert_eq!(matched(&m), 6);
        assert_eq!(m[5], Some(0));
    }

    #[test]
    fn many_components_stay_polynomial() {
        let mut adj: Vec<Vec<usize>> = Vec::new();
        for _ in 0..200 {
            let offset = adj.len();
            adj.extend(ring(6).into_iter().map(|n| n.into_iter().map(|x| x + offset).collect()));
        }
        let offset = adj.len();
        adj.extend(ring(5).into_iter().map(|n| n.into_iter().map(|x| x + offset).collect::<Vec<_>>()));
        assert_eq!(matched(&maximum_matching(&adj)), 1204);
    }
}
