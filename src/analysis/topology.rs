use crate::store::{NodeId, Registry};

/// Returns `roots` together with all of their ancestors, ascending by id.
///
/// Parents always carry smaller ids than their children, so a single sweep
/// from the highest id down to zero closes the set: by the time a node is
/// visited, every child that could mark it has already been visited.
pub fn support(registry: &Registry, roots: &[NodeId]) -> Vec<NodeId> {
    let count = registry.count();
    let mut marked = vec![false; count];
    for root in roots {
        if root.index() < count {
            marked[root.index()] = true;
        }
    }

    for idx in (0..count).rev() {
        if marked[idx] {
            for &parent in registry.get_parents(NodeId::new(idx)) {
                marked[parent.index()] = true;
            }
        }
    }

    marked
        .iter()
        .enumerate()
        .filter(|&(_, &m)| m)
        .map(|(i, _)| NodeId::new(i))
        .collect()
}

/// Every node, ascending. Used when a full forward simulation is wanted.
pub fn all_nodes(registry: &Registry) -> Vec<NodeId> { (0..registry.count()).map(NodeId::new).collect() }
