//! Configuration inheritance graph and its topological ordering.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use depsync_core::configuration::Configuration;
use depsync_util::errors::DepsyncError;

/// A configuration and the names of the configurations it extends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationNode {
    name: String,
    extends: Vec<String>,
}

impl ConfigurationNode {
    pub fn new(configuration: &Configuration) -> Self {
        Self {
            name: configuration.name.clone(),
            extends: configuration.extends.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extended configurations, in declaration order.
    pub fn neighbors(&self) -> &[String] {
        &self.extends
    }
}

/// Configurations of a manifest, in declaration order, with an edge from
/// each configuration to every configuration it extends.
///
/// Edge weights are the position of the target in the extending
/// configuration's `extends` list.
#[derive(Debug, Default)]
pub struct ConfigurationGraph {
    graph: DiGraph<ConfigurationNode, usize>,
    index: HashMap<String, NodeIndex>,
    order: Vec<NodeIndex>,
}

impl ConfigurationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configurations<'a, I>(configurations: I) -> Self
    where
        I: IntoIterator<Item = &'a Configuration>,
    {
        let mut graph = Self::new();
        for configuration in configurations {
            graph.add_node(ConfigurationNode::new(configuration));
        }
        graph
    }

    /// Add a node and its extends edges. Targets not yet in the graph are
    /// linked when they are added. A second node with an existing name
    /// replaces the first one's extends list but keeps its position.
    pub fn add_node(&mut self, node: ConfigurationNode) -> NodeIndex {
        let idx = match self.index.get(node.name()) {
            Some(&idx) => {
                self.graph
                    .retain_edges(|g, e| g.edge_endpoints(e).map_or(true, |(from, _)| from != idx));
                self.graph[idx] = node;
                idx
            }
            None => {
                let name = node.name.clone();
                let idx = self.graph.add_node(node);
                self.index.insert(name.clone(), idx);
                self.order.push(idx);

                let waiting: Vec<(NodeIndex, usize)> = self
                    .order
                    .iter()
                    .filter(|&&from| from != idx)
                    .flat_map(|&from| {
                        self.graph[from]
                            .neighbors()
                            .iter()
                            .enumerate()
                            .filter(|(_, target)| **target == name)
                            .map(move |(pos, _)| (from, pos))
                    })
                    .collect();
                for (from, pos) in waiting {
                    self.graph.add_edge(from, idx, pos);
                }
                idx
            }
        };

        let outgoing: Vec<(NodeIndex, usize)> = self.graph[idx]
            .neighbors()
            .iter()
            .enumerate()
            .filter_map(|(pos, target)| self.index.get(target).map(|&to| (to, pos)))
            .collect();
        for (to, pos) in outgoing {
            self.graph.add_edge(idx, to, pos);
        }
        idx
    }

    pub fn node(&self, name: &str) -> Option<&ConfigurationNode> {
        self.index.get(name).map(|&idx| &self.graph[idx])
    }

    /// Extended configurations present in the graph, in declaration order.
    fn extends(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut targets: Vec<(usize, NodeIndex)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (*e.weight(), e.target()))
            .collect();
        targets.sort_unstable();
        targets.into_iter().map(|(_, to)| to).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Order configurations so that each appears after everything it extends.
///
/// Depth-first post-order from every unvisited node in declaration order.
/// Extends targets missing from the graph are ignored. Revisiting a node
/// that is still in progress fails with [`DepsyncError::CyclicConfiguration`].
pub fn topo_sort(graph: &ConfigurationGraph) -> Result<Vec<String>, DepsyncError> {
    let mut marks = vec![Mark::Unvisited; graph.graph.node_count()];
    let mut order = Vec::with_capacity(graph.len());
    let mut path = Vec::new();
    for &idx in &graph.order {
        if marks[idx.index()] == Mark::Unvisited {
            visit(graph, idx, &mut marks, &mut path, &mut order)?;
        }
    }
    Ok(order)
}

fn visit(
    graph: &ConfigurationGraph,
    idx: NodeIndex,
    marks: &mut [Mark],
    path: &mut Vec<NodeIndex>,
    order: &mut Vec<String>,
) -> Result<(), DepsyncError> {
    marks[idx.index()] = Mark::InProgress;
    path.push(idx);

    for next in graph.extends(idx) {
        match marks[next.index()] {
            Mark::Done => {}
            Mark::Unvisited => visit(graph, next, marks, path, order)?,
            Mark::InProgress => {
                let start = path.iter().position(|&p| p == next).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..]
                    .iter()
                    .map(|&p| graph.graph[p].name().to_string())
                    .collect();
                cycle.push(graph.graph[next].name().to_string());
                return Err(DepsyncError::CyclicConfiguration { cycle });
            }
        }
    }

    path.pop();
    marks[idx.index()] = Mark::Done;
    order.push(graph.graph[idx].name().to_string());
    Ok(())
}
