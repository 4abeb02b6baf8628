//! Global node numbering shared by independently discretized members

use log::debug;

use crate::config::FrameLimits;
use crate::error::{StructuresError, StructuresResult};

/// Largest rounded coordinate key that is still exact in an f64
const MAX_KEY: f64 = 9.007_199_254_740_992e15;

/// Deduplicated nodes and connectivity of a set of members
///
/// Two member nodes are the same global node exactly when their
/// coordinates agree after rounding to the configured number of decimals.
/// Global nodes are sorted lexicographically by rounded coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    nodes: Vec<[f64; 3]>,
    member_nodes: Vec<Vec<usize>>,
    elements: Vec<(usize, usize)>,
    keys: Vec<Vec<[i64; 3]>>,
    decimals: i32,
}

impl Topology {
    /// Build the topology of the given member node lists
    ///
    /// Consecutive nodes of a member form one element each, in member
    /// order.
    pub fn build<M: AsRef<[[f64; 3]]>>(
        members: &[M],
        limits: &FrameLimits,
    ) -> StructuresResult<Self> {
        let decimals = limits.node_decimals;
        let keys = members
            .iter()
            .enumerate()
            .map(|(k, nodes)| member_keys(k, nodes.as_ref(), decimals))
            .collect::<StructuresResult<Vec<_>>>()?;

        let mut unique: Vec<[i64; 3]> = keys.iter().flatten().copied().collect();
        unique.sort_unstable();
        unique.dedup();
        let n_elements: usize = keys.iter().map(|k| k.len().saturating_sub(1)).sum();
        check_capacity(unique.len(), n_elements, limits)?;

        let mut member_nodes = Vec::with_capacity(keys.len());
        let mut elements = Vec::with_capacity(n_elements);
        for (k, member) in keys.iter().enumerate() {
            let globals = member
                .iter()
                .map(|key| global_index(&unique, key, k))
                .collect::<StructuresResult<Vec<_>>>()?;
            for (e, pair) in globals.windows(2).enumerate() {
                if pair[0] == pair[1] {
                    return Err(StructuresError::DegenerateElement {
                        member: k,
                        element: e,
                    });
                }
                elements.push((pair[0], pair[1]));
            }
            member_nodes.push(globals);
        }

        let scale = 10f64.powi(decimals);
        let nodes = unique
            .iter()
            .map(|key| key.map(|v| v as f64 / scale))
            .collect();

        debug!(
            "Built topology: {} members, {} unique nodes, {} elements",
            members.len(),
            unique.len(),
            elements.len()
        );

        Ok(Self {
            nodes,
            member_nodes,
            elements,
            keys,
            decimals,
        })
    }

    /// Topology of one member with its nodes kept in member order
    ///
    /// Node `i` is local node `i` and element `i` joins nodes `i` and
    /// `i + 1`. A node that repeats after rounding is an error.
    pub fn chain(nodes: &[[f64; 3]], limits: &FrameLimits) -> StructuresResult<Self> {
        let decimals = limits.node_decimals;
        let keys = member_keys(0, nodes, decimals)?;
        let n = keys.len();
        check_capacity(n, n.saturating_sub(1), limits)?;

        for (i, key) in keys.iter().enumerate() {
            if let Some(j) = keys[..i].iter().position(|k| k == key) {
                return Err(if j + 1 == i {
                    StructuresError::DegenerateElement {
                        member: 0,
                        element: j,
                    }
                } else {
                    StructuresError::InvalidInput(format!(
                        "node {} repeats node {} of the member",
                        i, j
                    ))
                });
            }
        }

        let scale = 10f64.powi(decimals);
        let nodes = keys
            .iter()
            .map(|key| key.map(|v| v as f64 / scale))
            .collect();
        Ok(Self {
            nodes,
            member_nodes: vec![(0..n).collect()],
            elements: (1..n).map(|i| (i - 1, i)).collect(),
            keys: vec![keys],
            decimals,
        })
    }

    /// Whether `members` has the same rounded node layout this topology
    /// was built from
    pub fn matches<M: AsRef<[[f64; 3]]>>(&self, members: &[M], decimals: i32) -> bool {
        if decimals != self.decimals || members.len() != self.keys.len() {
            return false;
        }
        members
            .iter()
            .zip(&self.keys)
            .enumerate()
            .all(|(k, (nodes, keys))| {
                member_keys(k, nodes.as_ref(), decimals).is_ok_and(|new| new == *keys)
            })
    }

    /// Global node coordinates, rounded
    pub fn nodes(&self) -> &[[f64; 3]] {
        &self.nodes
    }

    /// Element connectivity as global node pairs, in member order
    pub fn elements(&self) -> &[(usize, usize)] {
        &self.elements
    }

    /// Global index of every local node of `member`
    pub fn member_nodes(&self, member: usize) -> Option<&[usize]> {
        self.member_nodes.get(member).map(Vec::as_slice)
    }

    /// Global index of local node `local` of `member`
    pub fn global_node(&self, member: usize, local: usize) -> Option<usize> {
        self.member_nodes
            .get(member)
            .and_then(|nodes| nodes.get(local))
            .copied()
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn n_members(&self) -> usize {
        self.member_nodes.len()
    }
}

fn check_capacity(n_nodes: usize, n_elements: usize, limits: &FrameLimits) -> StructuresResult<()> {
    if n_nodes > limits.max_nodes {
        return Err(StructuresError::CapacityExceeded {
            what: "node",
            count: n_nodes,
            max: limits.max_nodes,
        });
    }
    if n_elements > limits.max_elements {
        return Err(StructuresError::CapacityExceeded {
            what: "element",
            count: n_elements,
            max: limits.max_elements,
        });
    }
    Ok(())
}

/// Position of `key` in the sorted unique node keys
fn global_index(unique: &[[i64; 3]], key: &[i64; 3], member: usize) -> StructuresResult<usize> {
    unique.binary_search(key).map_err(|_| {
        StructuresError::GeometryLookup(format!(
            "node {:?} of member {} is missing from the global node list",
            key, member
        ))
    })
}

/// Round every coordinate half-to-even into an integer key
fn member_keys(
    member: usize,
    nodes: &[[f64; 3]],
    decimals: i32,
) -> StructuresResult<Vec<[i64; 3]>> {
    let scale = 10f64.powi(decimals);
    nodes
        .iter()
        .enumerate()
        .map(|(i, xyz)| {
            let mut key = [0i64; 3];
            for (k, v) in key.iter_mut().zip(xyz) {
                let scaled = (v * scale).round_ties_even();
                if !scaled.is_finite() || scaled.abs() > MAX_KEY {
                    return Err(StructuresError::NonFinite(format!(
                        "node {} of member {} has coordinate {}",
                        i, member, v
                    )));
                }
                *k = scaled as i64;
            }
            Ok(key)
        })
        .collect()
}
