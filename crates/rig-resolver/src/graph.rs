//! Dependency graph construction, cycle detection and ordering.
//!
//! Edges point from a node to the nodes it requires. Node indices follow
//! declaration order, which is what breaks ties in [`DependencyGraph::topological_order`].

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use rig_core::descriptor::DependencyNode;
use rig_util::errors::{Result, RigError};

/// Directed graph of plugins and libraries backed by petgraph.
pub struct DependencyGraph {
    graph: DiGraph<DependencyNode, ()>,
    index: HashMap<String, NodeIndex>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Pending work while drawing a tree.
enum Walk {
    Expand {
        idx: NodeIndex,
        prefix: String,
        depth: usize,
    },
    Line {
        idx: NodeIndex,
        prefix: String,
        is_last: bool,
        depth: usize,
    },
    Leave(NodeIndex),
}

impl DependencyGraph {
    /// Build the graph from declared nodes.
    ///
    /// # Errors
    ///
    /// [`RigError::UnresolvedReference`] when a node requires an id that was
    /// never declared.
    pub fn build(nodes: &[DependencyNode]) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for node in nodes {
            if index.contains_key(&node.id) {
                return Err(RigError::Generic {
                    message: format!("dependency '{}' is declared more than once", node.id),
                });
            }
            let idx = graph.add_node(node.clone());
            index.insert(node.id.clone(), idx);
        }

        for node in nodes {
            let from = index[&node.id];
            for required in &node.requires {
                let Some(&to) = index.get(required) else {
                    return Err(RigError::UnresolvedReference {
                        kind: "dependency",
                        name: required.clone(),
                        referenced_by: node.id.clone(),
                    });
                };
                if graph.find_edge(from, to).is_none() {
                    graph.add_edge(from, to, ());
                }
            }
        }

        tracing::debug!(
            "dependency graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(Self { graph, index })
    }

    pub fn find(&self, id: &str) -> Option<&DependencyNode> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    /// Nodes this node requires, in declaration order.
    fn requirements(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut seen = HashSet::new();
        self.graph[idx]
            .requires
            .iter()
            .filter_map(|id| self.index.get(id).copied())
            .filter(|child| seen.insert(*child))
            .collect()
    }

    /// Nodes that require this node, in declaration order.
    fn dependents(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut sources: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.source())
            .collect();
        sources.sort();
        sources
    }

    /// Depth-first search with recursion-stack tracking.
    ///
    /// Returns the ids on the first cycle found, in the order the cycle is
    /// walked, starting from the node that closes it.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut marks = vec![Mark::Unvisited; self.graph.node_count()];
        let mut stack = Vec::new();
        for idx in self.graph.node_indices() {
            if marks[idx.index()] == Mark::Unvisited {
                if let Some(cycle) = self.visit(idx, &mut marks, &mut stack) {
                    return Some(
                        cycle
                            .into_iter()
                            .map(|i| self.graph[i].id.clone())
                            .collect(),
                    );
                }
            }
        }
        None
    }

    /// Iterative DFS from `root`. Each frame holds a node, its requirements
    /// and a cursor into them; `stack` mirrors the frames' nodes.
    fn visit(
        &self,
        root: NodeIndex,
        marks: &mut [Mark],
        stack: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        marks[root.index()] = Mark::OnStack;
        stack.push(root);
        let mut frames = vec![(root, self.requirements(root), 0usize)];

        while let Some((idx, children, cursor)) = frames.last_mut() {
            let Some(&child) = children.get(*cursor) else {
                marks[idx.index()] = Mark::Done;
                frames.pop();
                stack.pop();
                continue;
            };
            *cursor += 1;

            match marks[child.index()] {
                Mark::OnStack => {
                    let start = stack.iter().position(|&i| i == child).unwrap_or(0);
                    return Some(stack[start..].to_vec());
                }
                Mark::Unvisited => {
                    marks[child.index()] = Mark::OnStack;
                    stack.push(child);
                    frames.push((child, self.requirements(child), 0));
                }
                Mark::Done => {}
            }
        }
        None
    }

    /// Order nodes so every node comes after everything it requires.
    ///
    /// Kahn's algorithm over the reversed edges: nodes whose requirements
    /// are all placed become ready, and the earliest-declared ready node is
    /// placed next.
    ///
    /// # Errors
    ///
    /// [`RigError::Cycle`] naming every node on the cycle.
    pub fn topological_order(&self) -> Result<Vec<&DependencyNode>> {
        if let Some(nodes) = self.find_cycle() {
            return Err(RigError::Cycle {
                kind: "dependency",
                nodes,
            });
        }

        let mut pending: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| self.graph.edges_directed(idx, Direction::Outgoing).count())
            .collect();
        let mut ready: BinaryHeap<Reverse<NodeIndex>> = self
            .graph
            .node_indices()
            .filter(|idx| pending[idx.index()] == 0)
            .map(Reverse)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(idx)) = ready.pop() {
            order.push(&self.graph[idx]);
            for dependent in self.dependents(idx) {
                pending[dependent.index()] -= 1;
                if pending[dependent.index()] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }
        Ok(order)
    }

    /// Render the graph as a tree: every node nothing else requires is a
    /// root, children are its requirements. Roots are grouped under
    /// `[kind]` headers when more than one kind is present.
    pub fn print_tree(&self, max_depth: Option<usize>) -> String {
        let mut output = String::new();
        let roots: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&idx| self.dependents(idx).is_empty())
            .collect();

        let mut kinds: Vec<&str> = Vec::new();
        for &idx in &roots {
            let kind = self.graph[idx].kind.as_str();
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        let show_headers = kinds.len() > 1;

        let mut visited = HashSet::new();
        for kind in kinds {
            if show_headers {
                output.push_str(&format!("[{kind}]\n"));
            }
            for &idx in roots.iter().filter(|&&i| self.graph[i].kind == kind) {
                output.push_str(&format!("{}\n", self.graph[idx]));
                self.render_branches(&mut output, idx, max_depth, &mut visited, Self::requirements);
            }
        }
        output
    }

    /// Draw the branches below `root`, following `next` from each node.
    /// A node already on the current path is printed but not expanded.
    fn render_branches(
        &self,
        output: &mut String,
        root: NodeIndex,
        max_depth: Option<usize>,
        visited: &mut HashSet<NodeIndex>,
        next: impl Fn(&Self, NodeIndex) -> Vec<NodeIndex>,
    ) {
        let mut work = vec![Walk::Expand {
            idx: root,
            prefix: String::new(),
            depth: 1,
        }];

        while let Some(step) = work.pop() {
            match step {
                Walk::Expand { idx, prefix, depth } => {
                    if max_depth.is_some_and(|max| depth > max) || !visited.insert(idx) {
                        continue;
                    }
                    work.push(Walk::Leave(idx));
                    let children = next(self, idx);
                    let count = children.len();
                    for (i, child) in children.into_iter().enumerate().rev() {
                        work.push(Walk::Line {
                            idx: child,
                            prefix: prefix.clone(),
                            is_last: i == count - 1,
                            depth,
                        });
                    }
                }
                Walk::Line {
                    idx,
                    prefix,
                    is_last,
                    depth,
                } => {
                    let connector = if is_last { "└── " } else { "├── " };
                    output.push_str(&format!("{prefix}{connector}{}\n", self.graph[idx]));
                    work.push(Walk::Expand {
                        idx,
                        prefix: format!("{prefix}{}", if is_last { "    " } else { "│   " }),
                        depth: depth + 1,
                    });
                }
                Walk::Leave(idx) => {
                    visited.remove(&idx);
                }
            }
        }
    }

    /// Render what requires `id`, transitively. Empty when `id` is unknown.
    pub fn print_inverted_tree(&self, id: &str) -> String {
        let mut output = String::new();
        let Some(&idx) = self.index.get(id) else {
            return output;
        };

        output.push_str(&format!("{}\n", self.graph[idx]));
        let mut visited = HashSet::new();
        self.render_branches(&mut output, idx, None, &mut visited, Self::dependents);
        output
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
