//! Human-readable renderings of a graph.
use crate::compute::Ledger;
use crate::graph::Graph;
use crate::store::{NodeId, NodeKind};
use std::collections::HashMap;
use std::fmt::Write;

/// One line per node in id order, with type, parents, children and any
/// evidence attached.
pub fn format_graph(graph: &Graph) -> String {
    let mut out = String::new();
    let query_index: HashMap<NodeId, usize> =
        graph.evidence.queries().iter().enumerate().map(|(i, &q)| (q, i)).collect();

    for idx in 0..graph.store.count() {
        let id = NodeId::new(idx);
        let _ = write!(out, "{} {}", id, describe(graph, id));
        if let Some(ty) = graph.store.value_type(id) {
            let _ = write!(out, " : {}", ty);
        }
        let children = graph.store.get_children(id);
        if !children.is_empty() {
            let mut sorted = children;
            sorted.sort();
            let _ = write!(out, " -> {}", join(&sorted));
        }
        if let Some(value) = graph.evidence.observed_value(id) {
            let _ = write!(out, " [observed = {}]", value);
        }
        if let Some(q) = query_index.get(&id) {
            let _ = write!(out, " [query {}]", q);
        }
        out.push('\n');
    }
    out
}

/// Renders the ancestry of `target` as a tree. When a ledger is supplied,
/// each value node shows its value from that trial.
pub fn format_trace(graph: &Graph, ledger: Option<&Ledger>, target: NodeId) -> String {
    let mut tracer = Tracer { graph, ledger, visited_at_level: HashMap::new(), output: String::new() };

    if target.index() < graph.store.count() {
        let _ = writeln!(tracer.output, "TRACE for node {}:", target);
        let _ = writeln!(tracer.output, "--------------------------------------------------");
        tracer.trace_node(target, 1, "");
    } else {
        let _ = writeln!(tracer.output, "Error: Invalid Node ID {}", target);
    }
    tracer.output
}

struct Tracer<'a> {
    graph: &'a Graph,
    ledger: Option<&'a Ledger>,
    visited_at_level: HashMap<NodeId, usize>,
    output: String,
}

impl<'a> Tracer<'a> {
    fn trace_node(&mut self, node_id: NodeId, level: usize, prefix: &str) {
        if let Some(&first_seen) = self.visited_at_level.get(&node_id) {
            let _ = writeln!(self.output, "{}{} (Ref to L{})", prefix, node_id, first_seen);
            return;
        }
        self.visited_at_level.insert(node_id, level);

        let value = self
            .ledger
            .and_then(|l| l.get(node_id))
            .map(|v| format!(" [{}]", v))
            .unwrap_or_default();
        let _ = writeln!(self.output, "{}[L{}] {} {}{}", prefix, level, node_id, describe(self.graph, node_id), value);

        let parents = self.graph.store.get_parents(node_id);
        let stem = prefix.replace("`--", "   ").replace("|--", "|  ");
        for (i, &parent) in parents.iter().enumerate() {
            let connector = if i == parents.len() - 1 { "`--" } else { "|--" };
            self.trace_node(parent, level + 1, &format!("{}{}", stem, connector));
        }
    }
}

impl std::fmt::Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&format_graph(self)) }
}

fn describe(graph: &Graph, id: NodeId) -> String {
    let parents = graph.store.get_parents(id);
    match graph.store.kind(id) {
        NodeKind::Constant(value) => format!("Constant({})", value),
        NodeKind::Distribution(kind) => format!("{:?}({})", kind, join(parents)),
        NodeKind::Operator(kind) => format!("{:?}({})", kind, join(parents)),
        NodeKind::Factor(kind) => format!("Factor::{:?}({})", kind, join(parents)),
    }
}

fn join(ids: &[NodeId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DistributionType, OperatorType};
    use crate::type_system::AtomicType;

    fn coin() -> (Graph, NodeId) {
        let mut g = Graph::new();
        let p = g.add_constant_probability(0.5).unwrap();
        let d = g.add_distribution(DistributionType::Bernoulli, AtomicType::Boolean, &[p]).unwrap();
        let x = g.add_operator(OperatorType::Sample, &[d]).unwrap();
        let y = g.add_operator(OperatorType::Sample, &[d]).unwrap();
        g.observe(x, true).unwrap();
        g.query(y).unwrap();
        (g, y)
    }

    #[test]
    fn test_format_graph_lists_every_node() {
        let (g, _) = coin();
        let text = format_graph(&g);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "#0 Constant(0.5000) : probability -> #1");
        assert_eq!(lines[1], "#1 Bernoulli(#0) : boolean -> #2, #3");
        assert_eq!(lines[2], "#2 Sample(#1) : boolean [observed = true]");
        assert_eq!(lines[3], "#3 Sample(#1) : boolean [query 0]");
    }

    #[test]
    fn test_format_trace_walks_ancestors() {
        let (g, y) = coin();
        let text = format_trace(&g, None, y);
        assert!(text.contains("[L1] #3 Sample(#1)"));
        assert!(text.contains("`--[L2] #1 Bernoulli(#0)"));
        assert!(text.contains("   `--[L3] #0 Constant(0.5000)"));
        assert!(format_trace(&g, None, NodeId(42)).contains("Invalid Node ID #42"));
    }
}
