//! Management hierarchy models.
//!
//! The forest owns every [`HierarchyNode`] in one arena and keeps a side
//! index from employee identifier to arena slot, so lookups are O(1) and
//! parent/child links are plain identifiers. Only the nodes are serialized;
//! roots and the index are rebuilt on deserialize.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{MetricsSnapshot, RoleType};

/// One active employee placed in the management hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// The employee identifier.
    pub employee_id: String,
    /// The employee's display name.
    pub name: String,
    /// The canonical team the employee was classified into.
    pub team: String,
    /// The label the team was resolved from.
    pub position: String,
    /// The employee's role type.
    pub role_type: RoleType,
    /// Distance from the node's root (roots are 0).
    pub depth: usize,
    /// The resolved manager, `None` for roots.
    pub parent_id: Option<String>,
    /// Direct reports, in input order.
    pub child_ids: Vec<String>,
    /// KPIs over the node's subordinates, present when it has any.
    pub metrics: Option<MetricsSnapshot>,
}

impl HierarchyNode {
    /// Returns true if the node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Returns true if the node manages at least one employee.
    pub fn is_manager(&self) -> bool {
        !self.child_ids.is_empty()
    }
}

/// A forest of hierarchy nodes with an identifier index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<HierarchyNode>", into = "Vec<HierarchyNode>")]
pub struct HierarchyForest {
    nodes: Vec<HierarchyNode>,
    roots: Vec<String>,
    index: HashMap<String, usize>,
}

impl HierarchyForest {
    /// Assembles a forest from fully linked nodes.
    ///
    /// Roots keep the order in which they appear in `nodes`.
    pub(crate) fn from_nodes(nodes: Vec<HierarchyNode>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.employee_id.clone(), slot))
            .collect();
        let roots = nodes
            .iter()
            .filter(|node| node.is_root())
            .map(|node| node.employee_id.clone())
            .collect();
        Self {
            nodes,
            roots,
            index,
        }
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the forest has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over every node in input order.
    pub fn iter(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.nodes.iter()
    }

    /// Iterates over the root nodes.
    pub fn roots(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.roots.iter().filter_map(|id| self.get(id))
    }

    /// Looks up a node by employee identifier.
    pub fn get(&self, employee_id: &str) -> Option<&HierarchyNode> {
        self.index
            .get(employee_id)
            .and_then(|&slot| self.nodes.get(slot))
    }

    /// Returns the node's manager.
    pub fn parent(&self, employee_id: &str) -> Option<&HierarchyNode> {
        self.get(employee_id)
            .and_then(|node| node.parent_id.as_deref())
            .and_then(|parent| self.get(parent))
    }

    /// Returns the node's direct reports.
    pub fn children(&self, employee_id: &str) -> Vec<&HierarchyNode> {
        self.get(employee_id)
            .map(|node| {
                node.child_ids
                    .iter()
                    .filter_map(|child| self.get(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the management chain above a node, nearest manager first.
    pub fn ancestors(&self, employee_id: &str) -> Vec<&HierarchyNode> {
        let mut chain = Vec::new();
        let mut current = self.parent(employee_id);
        while let Some(node) = current {
            // Bounded by the node count even if the forest were malformed.
            if chain.len() >= self.nodes.len() {
                break;
            }
            chain.push(node);
            current = self.parent(&node.employee_id);
        }
        chain
    }

    /// Returns every node below `employee_id`, depth-first in child order.
    pub fn descendants(&self, employee_id: &str) -> Vec<&HierarchyNode> {
        let mut found = Vec::new();
        let mut stack: Vec<&HierarchyNode> = self.children(employee_id);
        stack.reverse();
        while let Some(node) = stack.pop() {
            if found.len() >= self.nodes.len() {
                break;
            }
            found.push(node);
            let mut children = self.children(&node.employee_id);
            children.reverse();
            stack.extend(children);
        }
        found
    }

    /// Returns the deepest node depth, 0 for an empty forest.
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }
}

impl From<Vec<HierarchyNode>> for HierarchyForest {
    fn from(nodes: Vec<HierarchyNode>) -> Self {
        Self::from_nodes(nodes)
    }
}

impl From<HierarchyForest> for Vec<HierarchyNode> {
    fn from(forest: HierarchyForest) -> Self {
        forest.nodes
    }
}
