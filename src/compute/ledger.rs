use crate::store::NodeId;
use crate::type_system::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationError {
    #[error("node {0} was read before it was evaluated")]
    Unevaluated(NodeId),
    #[error("node {node} produced {value:?}, outside its parameter domain")]
    Domain { node: NodeId, value: Value },
    #[error("no handler available for {0}")]
    MissingHandler(String),
    #[error("Structural mismatch: {msg}")]
    Mismatch { msg: String },
}

/// Per-trial value slots, indexed by node id.
///
/// Distribution and factor nodes, and nodes outside the simulated support,
/// keep an empty slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    values: Vec<Option<Value>>,
}

impl Ledger {
    pub fn new() -> Self { Self::default() }

    pub fn with_size(size: usize) -> Self { Self { values: vec![None; size] } }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    #[inline]
    pub fn get(&self, node_id: NodeId) -> Option<&Value> {
        self.values.get(node_id.index())?.as_ref()
    }

    /// Reads a slot that the program guarantees has been written.
    #[inline]
    pub fn read(&self, node_id: NodeId) -> Result<Value, ComputationError> {
        self.get(node_id).copied().ok_or(ComputationError::Unevaluated(node_id))
    }

    pub fn insert(&mut self, node_id: NodeId, value: Value) {
        let idx = node_id.index();
        if idx >= self.values.len() {
            self.values.resize(idx + 1, None);
        }
        self.values[idx] = Some(value);
    }

    /// Evaluated slots in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Value)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|v| (NodeId::new(i), v)))
    }
}
