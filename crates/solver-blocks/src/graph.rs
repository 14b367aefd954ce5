use std::collections::{BTreeSet, HashMap};

use crate::instances::SubjectInstance;

/// Mutual-exclusion graph over the instance arena. Nodes are instance indices.
#[derive(Clone, Debug, Default)]
pub struct ConflictGraph {
    adj: Vec<BTreeSet<usize>>,
    edges: usize,
}

impl ConflictGraph {
    pub fn with_nodes(n: usize) -> Self {
        Self {
            adj: vec![BTreeSet::new(); n],
            edges: 0,
        }
    }

    /// Roster-overlap edges followed by sibling edges between sessions of one group.
    pub fn build(instances: &[SubjectInstance], students: usize) -> Self {
        let mut g = Self::with_nodes(instances.len());

        let mut attending: Vec<Vec<usize>> = vec![Vec::new(); students];
        for (i, inst) in instances.iter().enumerate() {
            for &s in &inst.roster {
                attending[s].push(i);
            }
        }
        for list in &attending {
            for (k, &a) in list.iter().enumerate() {
                for &b in &list[k + 1..] {
                    g.add_edge(a, b);
                }
            }
        }

        g.add_sibling_edges(instances);
        g
    }

    /// Sessions of the same subject group never share a block, even with an
    /// empty roster.
    pub fn add_sibling_edges(&mut self, instances: &[SubjectInstance]) {
        let mut groups: HashMap<(&str, &str), Vec<usize>> = HashMap::new();
        for (i, inst) in instances.iter().enumerate() {
            groups
                .entry((inst.code.0.as_str(), inst.group.as_str()))
                .or_default()
                .push(i);
        }
        for members in groups.values() {
            for (k, &a) in members.iter().enumerate() {
                for &b in &members[k + 1..] {
                    self.add_edge(a, b);
                }
            }
        }
    }

    /// Returns `false` when the edge already existed or is a self-loop.
    pub fn add_edge(&mut self, a: usize, b: usize) -> bool {
        if a == b || !self.adj[a].insert(b) {
            return false;
        }
        self.adj[b].insert(a);
        self.edges += 1;
        true
    }

    pub fn conflicts(&self, a: usize, b: usize) -> bool {
        self.adj[a].contains(&b)
    }

    pub fn degree(&self, i: usize) -> usize {
        self.adj[i].len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Most-constrained first; equal degrees keep their input order.
    pub fn degree_order<I: IntoIterator<Item = usize>>(&self, nodes: I) -> Vec<usize> {
        let mut order: Vec<usize> = nodes.into_iter().collect();
        order.sort_by(|&a, &b| self.degree(b).cmp(&self.degree(a)));
        order
    }
}
