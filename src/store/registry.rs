//! registry.rs
//! Append-only columnar arena of nodes.
//!
//! Ids are dense and assigned in insertion order. Callers guarantee that every
//! parent precedes its child, so the id order is a topological order and no
//! sort or cycle check is ever required.

use super::types::*;
use crate::type_system::AtomicType;

#[derive(Debug, Clone, Default)]
pub struct Registry {
    // Columnar Arrays
    pub kinds: Vec<NodeKind>,
    /// Output domain per node. For distributions this is the declared output
    /// of their samples; factors have none.
    pub value_types: Vec<Option<AtomicType>>,

    // Topology (CSR parents + linked-list children)
    pub parents_flat: Vec<NodeId>,
    pub parents_ranges: Vec<(u32, u32)>, // (start, count)

    pub first_child: Vec<u32>,
    pub child_targets: Vec<NodeId>,
    pub next_child: Vec<u32>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }
    pub fn count(&self) -> usize { self.kinds.len() }

    /// The id the next insertion will receive.
    pub fn next_id(&self) -> NodeId { NodeId::new(self.kinds.len()) }

    pub fn contains(&self, id: NodeId) -> bool { id.index() < self.kinds.len() }

    /// Appends a node. Validation is the caller's job; this never fails.
    pub fn add_node(&mut self, kind: NodeKind, parents: &[NodeId], value_type: Option<AtomicType>) -> NodeId {
        let id = self.next_id();
        debug_assert!(parents.iter().all(|p| *p < id), "parent ids must precede {}", id);

        // 1. Register Parents
        let start = self.parents_flat.len() as u32;
        let count = parents.len() as u32;
        self.parents_flat.extend_from_slice(parents);
        self.parents_ranges.push((start, count));

        // 2. Register Children (Adjacency list for downstream lookups)
        for &parent in parents {
            let p_idx = parent.index();
            let head = self.first_child[p_idx];
            let new_edge = self.child_targets.len() as u32;
            self.child_targets.push(id);
            self.next_child.push(head);
            self.first_child[p_idx] = new_edge;
        }

        // 3. Metadata
        self.kinds.push(kind);
        self.value_types.push(value_type);
        self.first_child.push(u32::MAX);

        id
    }

    #[inline(always)]
    pub fn get_parents(&self, id: NodeId) -> &[NodeId] {
        let (start, count) = self.parents_ranges[id.index()];
        &self.parents_flat[start as usize..(start + count) as usize]
    }

    /// Children in reverse insertion order.
    pub fn get_children(&self, id: NodeId) -> Vec<NodeId> {
        let mut children = Vec::new();
        let mut edge_idx = self.first_child[id.index()];
        while edge_idx != u32::MAX {
            children.push(self.child_targets[edge_idx as usize]);
            edge_idx = self.next_child[edge_idx as usize];
        }
        children
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind { &self.kinds[id.index()] }

    pub fn value_type(&self, id: NodeId) -> Option<AtomicType> { self.value_types[id.index()] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_system::Value;

    #[test]
    fn test_ids_are_dense_and_parents_recorded() {
        let mut reg = Registry::new();
        let a = reg.add_node(NodeKind::Constant(Value::Real(1.0)), &[], Some(AtomicType::Real));
        let b = reg.add_node(NodeKind::Constant(Value::Real(2.0)), &[], Some(AtomicType::Real));
        let c = reg.add_node(NodeKind::Operator(OperatorType::Add), &[a, b], Some(AtomicType::Real));
        let d = reg.add_node(NodeKind::Operator(OperatorType::Negate), &[c], Some(AtomicType::Real));

        assert_eq!([a, b, c, d], [NodeId(0), NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(reg.get_parents(c), &[a, b]);
        assert_eq!(reg.get_parents(a), &[] as &[NodeId]);
        assert_eq!(reg.get_children(a), vec![c]);
        assert_eq!(reg.get_children(c), vec![d]);
        assert_eq!(reg.next_id(), NodeId(4));
    }
}
