use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::adjacency::AdjacencyMatrix;
use crate::duplex_structs::{DuplexIntervals, Interval, Side};
use crate::error::{Error, Result};

pub type ClusterId = usize;

/// Interval index to cluster id, as handed back by a clusterer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterMembership {
    assignments: FxHashMap<usize, ClusterId>,
}

impl ClusterMembership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, idx: usize, cluster: ClusterId) {
        self.assignments.insert(idx, cluster);
    }

    pub fn cluster_of(&self, idx: usize) -> Option<ClusterId> {
        self.assignments.get(&idx).copied()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Members of `cluster` in ascending index order.
    pub fn members(&self, cluster: ClusterId) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .assignments
            .iter()
            .filter(|&(_, &c)| c == cluster)
            .map(|(&i, _)| i)
            .collect();
        radsort::sort(&mut out);
        out
    }

    /// Cluster sizes, keyed by cluster id.
    pub fn sizes(&self) -> FxHashMap<ClusterId, usize> {
        let mut sizes = FxHashMap::default();
        for &c in self.assignments.values() {
            *sizes.entry(c).or_insert(0) += 1;
        }
        sizes
    }

    /// Ids of the `n` largest clusters, largest first, ties to the smaller id.
    pub fn largest(&self, n: usize) -> Vec<ClusterId> {
        let mut by_size: Vec<(ClusterId, usize)> = self.sizes().into_iter().collect();
        by_size.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        by_size.into_iter().take(n).map(|(c, _)| c).collect()
    }
}

impl FromIterator<(usize, ClusterId)> for ClusterMembership {
    fn from_iter<I: IntoIterator<Item = (usize, ClusterId)>>(iter: I) -> Self {
        ClusterMembership {
            assignments: iter.into_iter().collect(),
        }
    }
}

/// Turns a similarity graph into cluster memberships.
pub trait Clusterer {
    fn cluster(&self, adjacency: &AdjacencyMatrix) -> ClusterMembership;
}

/// Every connected component of the retained edges is a cluster.
///
/// Nodes without an edge form singleton clusters. Cluster ids are numbered
/// in order of each component's smallest index.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectedComponents;

impl ConnectedComponents {
    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }
}

impl Clusterer for ConnectedComponents {
    fn cluster(&self, adjacency: &AdjacencyMatrix) -> ClusterMembership {
        let n = adjacency.size();
        let mut parent: Vec<usize> = (0..n).collect();
        for e in adjacency.edges() {
            let a = Self::find(&mut parent, e.idx);
            let b = Self::find(&mut parent, e.idx2);
            if a != b {
                parent[a.max(b)] = a.min(b);
            }
        }

        let mut ids: FxHashMap<usize, ClusterId> = FxHashMap::default();
        let mut membership = ClusterMembership::new();
        for i in 0..n {
            let root = Self::find(&mut parent, i);
            let next = ids.len();
            let id = *ids.entry(root).or_insert(next);
            membership.assign(i, id);
        }
        debug!("{} connected components over {} intervals", ids.len(), n);
        membership
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedInterval {
    pub cluster: ClusterId,
    pub side: Side,
    /// Index of the interval in its source collection.
    pub idx: usize,
    pub interval: Interval,
}

/// Left and right arms of the selected clusters, tagged with cluster and side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterIntervals {
    pub name: String,
    pub intervals: Vec<TaggedInterval>,
}

/// Collect the arms of `clusters`, in the given cluster order and, within a
/// cluster, all left arms before all right arms. A cluster listed twice is
/// emitted once.
pub fn extract_clusters(
    intervals: &DuplexIntervals,
    membership: &ClusterMembership,
    clusters: &[ClusterId],
) -> Result<ClusterIntervals> {
    let n = intervals.left.len().min(intervals.right.len());
    let mut out = Vec::new();
    let mut done: FxHashSet<ClusterId> = FxHashSet::default();

    for &cluster in clusters {
        if !done.insert(cluster) {
            continue;
        }
        let members = membership.members(cluster);
        if let Some(&bad) = members.iter().find(|&&i| i >= n) {
            return Err(Error::Parameter(format!(
                "cluster {cluster} references interval {bad}, but the collection has {n}"
            )));
        }
        let sides = [(Side::Left, &intervals.left), (Side::Right, &intervals.right)];
        for (side, collection) in sides {
            out.extend(members.iter().map(|&idx| TaggedInterval {
                cluster,
                side,
                idx,
                interval: collection.intervals[idx],
            }));
        }
    }

    Ok(ClusterIntervals {
        name: intervals.left.name.clone(),
        intervals: out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::{build_adjacency, AdjacencyResult};
    use crate::config::{AdjacencyMode, MatrixConfig};
    use crate::duplex_structs::IntervalCollection;

    fn duplex() -> DuplexIntervals {
        let left = IntervalCollection::from_slices("RNA1", &[1, 11, 21, 31], &[5, 15, 25, 35]);
        let right = IntervalCollection::from_slices("RNA1", &[50, 60, 70, 80], &[55, 65, 75, 85]);
        let gap = IntervalCollection::from_slices("RNA1", &[5, 15, 25, 35], &[50, 60, 70, 80]);
        DuplexIntervals { left, right, gap }
    }

    #[test]
    fn test_extract_orders_clusters_then_sides() {
        let membership: ClusterMembership =
            vec![(0, 7), (1, 3), (2, 7), (3, 3)].into_iter().collect();
        let out = extract_clusters(&duplex(), &membership, &[7, 3, 7]).unwrap();
        let tags: Vec<(ClusterId, Side, usize)> =
            out.intervals.iter().map(|t| (t.cluster, t.side, t.idx)).collect();
        assert_eq!(
            tags,
            vec![
                (7, Side::Left, 0),
                (7, Side::Left, 2),
                (7, Side::Right, 0),
                (7, Side::Right, 2),
                (3, Side::Left, 1),
                (3, Side::Left, 3),
                (3, Side::Right, 1),
                (3, Side::Right, 3),
            ]
        );
        assert_eq!(out.intervals[2].interval, Interval::new(50, 55));
    }

    #[test]
    fn test_out_of_range_member_is_rejected() {
        let membership: ClusterMembership = vec![(9, 0)].into_iter().collect();
        assert!(extract_clusters(&duplex(), &membership, &[0]).is_err());
        assert!(extract_clusters(&duplex(), &membership, &[1])
            .unwrap()
            .intervals
            .is_empty());
    }

    #[test]
    fn test_largest_clusters() {
        let membership: ClusterMembership =
            vec![(0, 2), (1, 2), (2, 0), (3, 1), (4, 1), (5, 5)].into_iter().collect();
        assert_eq!(membership.largest(2), vec![1, 2]);
        assert_eq!(membership.members(1), vec![3, 4]);
    }

    #[test]
    fn test_connected_components() {
        let gap = IntervalCollection::from_slices("gap", &[1, 8, 15, 100], &[10, 16, 20, 110]);
        let res =
            build_adjacency(&gap, AdjacencyMode::None, 0.0, &MatrixConfig::default()).unwrap();
        let AdjacencyResult::Matrix(m) = res else {
            panic!("expected a matrix");
        };
        let membership = ConnectedComponents.cluster(&m);
        assert_eq!(membership.len(), 4);
        assert_eq!(membership.members(0), vec![0, 1, 2]);
        assert_eq!(membership.members(1), vec![3]);
    }
}
