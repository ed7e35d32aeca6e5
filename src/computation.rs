use crate::operations::{BinaryOperation, UnaryOperation};
use crate::registry::ElementaryId;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Provenance of an uncertain number.
///
/// Each derived number records the operation that produced it and the nodes
/// of its operands. Nodes are shared between numbers, so a computation forms
/// a DAG; the traversal methods below visit it as a tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ComputationNode {
    /// A declared elementary quantity
    Elementary { id: ElementaryId },

    /// An exactly known operand
    Constant { value: f64 },

    /// Binary operation node combining two operands
    Binary {
        left: Arc<ComputationNode>,
        right: Arc<ComputationNode>,
        operation: BinaryOperation,
    },

    /// Unary operation node transforming a single operand
    Unary {
        operand: Arc<ComputationNode>,
        operation: UnaryOperation,
    },
}

impl ComputationNode {
    /// Creates a new elementary leaf
    #[must_use]
    pub fn elementary(id: ElementaryId) -> Self {
        ComputationNode::Elementary { id }
    }

    /// Creates a new constant leaf
    #[must_use]
    pub fn constant(value: f64) -> Self {
        ComputationNode::Constant { value }
    }

    /// Creates a new binary operation node
    #[must_use]
    pub fn binary_op(
        left: Arc<ComputationNode>,
        right: Arc<ComputationNode>,
        operation: BinaryOperation,
    ) -> Self {
        ComputationNode::Binary {
            left,
            right,
            operation,
        }
    }

    /// Creates a new unary operation node
    #[must_use]
    pub fn unary_op(operand: Arc<ComputationNode>, operation: UnaryOperation) -> Self {
        ComputationNode::Unary { operand, operation }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            ComputationNode::Elementary { .. } | ComputationNode::Constant { .. }
        )
    }

    /// Short name of the node kind or operation
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ComputationNode::Elementary { .. } => "Elementary",
            ComputationNode::Constant { .. } => "Constant",
            ComputationNode::Binary { operation, .. } => operation.name(),
            ComputationNode::Unary { operation, .. } => operation.name(),
        }
    }

    /// Counts the number of nodes in the computation graph
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            ComputationNode::Elementary { .. } | ComputationNode::Constant { .. } => 1,
            ComputationNode::Binary { left, right, .. } => {
                1 + left.node_count() + right.node_count()
            }
            ComputationNode::Unary { operand, .. } => 1 + operand.node_count(),
        }
    }

    /// Gets the depth of the computation graph
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            ComputationNode::Elementary { .. } | ComputationNode::Constant { .. } => 1,
            ComputationNode::Binary { left, right, .. } => 1 + left.depth().max(right.depth()),
            ComputationNode::Unary { operand, .. } => 1 + operand.depth(),
        }
    }

    /// Every elementary quantity reachable from this node.
    ///
    /// This can be a superset of the keys of the sensitivity vector, which
    /// drops ancestors whose influence cancelled.
    #[must_use]
    pub fn elementary_ids(&self) -> BTreeSet<ElementaryId> {
        let mut ids = BTreeSet::new();
        self.walk(&mut |node, _| {
            if let ComputationNode::Elementary { id } = node {
                ids.insert(*id);
            }
        });
        ids
    }

    /// Pre-order depth-first traversal; the visitor receives each node and its depth.
    pub fn walk<F>(&self, visitor: &mut F)
    where
        F: FnMut(&ComputationNode, usize),
    {
        self.walk_at(visitor, 0);
    }

    fn walk_at<F>(&self, visitor: &mut F, depth: usize)
    where
        F: FnMut(&ComputationNode, usize),
    {
        visitor(self, depth);
        match self {
            ComputationNode::Elementary { .. } | ComputationNode::Constant { .. } => {}
            ComputationNode::Binary { left, right, .. } => {
                left.walk_at(visitor, depth + 1);
                right.walk_at(visitor, depth + 1);
            }
            ComputationNode::Unary { operand, .. } => operand.walk_at(visitor, depth + 1),
        }
    }
}

/// Computation graph visualizer for debugging and analysis
pub struct GraphVisualizer;

impl GraphVisualizer {
    /// Generates a DOT graph representation for visualization
    #[must_use]
    pub fn to_dot(node: &ComputationNode) -> String {
        let mut dot = String::from("digraph G {\n");
        let mut node_id = 0;
        Self::add_node_to_dot(node, &mut dot, &mut node_id);
        dot.push_str("}\n");
        dot
    }

    fn add_node_to_dot(node: &ComputationNode, dot: &mut String, node_id: &mut usize) -> usize {
        use std::fmt::Write;
        let current_id = *node_id;
        *node_id += 1;

        match node {
            ComputationNode::Elementary { id } => {
                let _ = writeln!(dot, "  {current_id} [label=\"{id}\", shape=circle];");
            }
            ComputationNode::Constant { value } => {
                let _ = writeln!(dot, "  {current_id} [label=\"{value}\", shape=plaintext];");
            }
            ComputationNode::Binary {
                left,
                right,
                operation,
            } => {
                let op_name = operation.name();
                let _ = writeln!(dot, "  {current_id} [label=\"{op_name}\", shape=box];");

                let left_id = Self::add_node_to_dot(left, dot, node_id);
                let right_id = Self::add_node_to_dot(right, dot, node_id);

                let _ = writeln!(dot, "  {current_id} -> {left_id};");
                let _ = writeln!(dot, "  {current_id} -> {right_id};");
            }
            ComputationNode::Unary { operand, operation } => {
                let op_name = operation.name();
                let _ = writeln!(dot, "  {current_id} [label=\"{op_name}\", shape=box];");
                let operand_id = Self::add_node_to_dot(operand, dot, node_id);
                let _ = writeln!(dot, "  {current_id} -> {operand_id};");
            }
        }

        current_id
    }

    /// Renders an indented text tree of the computation graph
    #[must_use]
    pub fn render_tree(node: &ComputationNode) -> String {
        use std::fmt::Write;
        let mut tree = String::new();
        node.walk(&mut |node, depth| {
            let prefix = "  ".repeat(depth);
            let _ = match node {
                ComputationNode::Elementary { id } => writeln!(tree, "{prefix}{id}"),
                ComputationNode::Constant { value } => writeln!(tree, "{prefix}{value}"),
                other => writeln!(tree, "{prefix}{}", other.name()),
            };
        });
        tree
    }
}
