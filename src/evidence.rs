//! Observation and query bookkeeping, and the trial acceptance predicate.

use crate::compute::ledger::{ComputationError, Ledger};
use crate::store::NodeId;
use crate::type_system::Value;
use std::collections::BTreeMap;

/// Evidence and result-collection metadata attached to a graph.
///
/// Both sets are append-only. Node-kind and type checks happen in the graph
/// before anything is recorded here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evidence {
    observations: BTreeMap<NodeId, Value>,
    queries: Vec<NodeId>,
}

impl Evidence {
    pub fn new() -> Self { Self::default() }

    pub fn is_observed(&self, node: NodeId) -> bool { self.observations.contains_key(&node) }

    pub fn observed_value(&self, node: NodeId) -> Option<&Value> { self.observations.get(&node) }

    /// Records an observation. Returns `false` (and changes nothing) if the
    /// node already carries one.
    pub fn record_observation(&mut self, node: NodeId, value: Value) -> bool {
        if self.is_observed(node) {
            return false;
        }
        self.observations.insert(node, value);
        true
    }

    /// Registers a query and returns its index. Re-querying a node returns
    /// the index it already has.
    pub fn add_query(&mut self, node: NodeId) -> usize {
        if let Some(idx) = self.queries.iter().position(|&q| q == node) {
            return idx;
        }
        self.queries.push(node);
        self.queries.len() - 1
    }

    /// Observations ordered by node id.
    pub fn observations(&self) -> impl Iterator<Item = (NodeId, &Value)> {
        self.observations.iter().map(|(&id, v)| (id, v))
    }

    pub fn queries(&self) -> &[NodeId] { &self.queries }

    /// Nodes a trial must simulate, before closing over ancestors.
    pub fn roots(&self) -> Vec<NodeId> {
        self.observations.keys().chain(self.queries.iter()).copied().collect()
    }

    /// A trial is accepted iff every observed node's simulated value equals
    /// its observed value exactly.
    pub fn accepts(&self, ledger: &Ledger) -> bool {
        self.observations.iter().all(|(&id, observed)| ledger.get(id) == Some(observed))
    }

    /// Queried values of an accepted trial, in query order.
    pub fn collect(&self, ledger: &Ledger) -> Result<Vec<Value>, ComputationError> {
        self.queries.iter().map(|&id| ledger.read(id)).collect()
    }
}
