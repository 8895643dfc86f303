//! Guide tree storage and text renderings.
//!
//! Nodes live in a single arena and refer to their children by index, so a completed tree
//! owns every node exactly once and drops them together.
use std::convert::TryFrom;
use std::fmt;
use std::io;
use std::ops::Index;
use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};

/// Position of a node in the tree arena.
pub type NodeId = usize;

/// Separator placed between the two child identifiers of an internal node.
pub const ID_SEPARATOR: char = '|';

/// Characters with a meaning in bracket notation or in composite identifiers.
pub const RESERVED: [char; 9] = ['(', ')', ',', ';', ':', '[', ']', '\'', ID_SEPARATOR];

/// Checks that `id` can be written unquoted into bracket notation.
///
/// # Errors
///
/// `InvalidInput` for an empty identifier, or one holding whitespace or a [`RESERVED`] character.
pub fn validate_label(id: &str) -> Result<()> {
	if id.is_empty() {
		return Err(Error::InvalidInput("Empty Identifier.".to_string()));
	}
	match id.chars().find(|c| c.is_whitespace() || RESERVED.contains(c)) {
		Some(c) => Err(Error::InvalidInput(format!("Identifier {:?} Contains Reserved Character {:?}.", id, c))),
		None => Ok(())
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One vertex of the guide tree.
pub struct TreeNode {
	/// Input key for leaves, `left|right` for internal nodes.
	pub id: String,
	/// Left and right child, `None` for leaves.
	pub children: Option<(NodeId, NodeId)>,
	/// Raw residues, leaves only.
	pub sequence: Option<Vec<char>>,
	/// Height above the deepest leaf below this node; zero for leaves.
	pub depth: usize,
	/// Still eligible for merging.
	pub active: bool
}

impl TreeNode {
	pub fn leaf(id: String, sequence: Vec<char>) -> TreeNode {
		TreeNode {
			id,
			children: None,
			sequence: Some(sequence),
			depth: 0,
			active: true
		}
	}

	/// Builds the parent of two nodes, taking its identifier from both children.
	pub fn internal(left: (NodeId, &TreeNode), right: (NodeId, &TreeNode)) -> TreeNode {
		TreeNode {
			id: format!("{}{}{}", left.1.id, ID_SEPARATOR, right.1.id),
			children: Some((left.0, right.0)),
			sequence: None,
			depth: left.1.depth.max(right.1.depth) + 1,
			active: true
		}
	}

	/// A leaf known only by its identifier, e.g. one taken from a distance matrix.
	pub fn label(id: String) -> TreeNode {
		TreeNode {
			id,
			children: None,
			sequence: None,
			depth: 0,
			active: true
		}
	}

	pub fn is_leaf(&self) -> bool { self.children.is_none() }

	/// Branch length written to bracket notation.
	pub fn branch_length(&self) -> f64 { self.depth as f64 }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawGuideTree")]
/// A completed binary guide tree.
pub struct GuideTree {
	nodes: Vec<TreeNode>,
	root: NodeId
}

#[derive(Deserialize)]
struct RawGuideTree {
	nodes: Vec<TreeNode>,
	root: NodeId
}

impl TryFrom<RawGuideTree> for GuideTree {
	type Error = Error;

	/// Accepts only arenas where every child precedes its parent and the root is in range,
	/// so every walk from the root terminates inside the arena.
	fn try_from(raw: RawGuideTree) -> Result<GuideTree> {
		if raw.root >= raw.nodes.len() {
			return Err(Error::InvalidInput(format!("Root {} Outside Arena of {} Nodes.", raw.root, raw.nodes.len())));
		}
		for (index, node) in raw.nodes.iter().enumerate() {
			if let Some((left, right)) = node.children {
				if left >= index || right >= index {
					return Err(Error::InvalidInput(format!("Node {} Has Children ({}, {}) Not Before It.", index, left, right)));
				}
			}
		}
		Ok(GuideTree { nodes: raw.nodes, root: raw.root })
	}
}

impl Index<NodeId> for GuideTree {
	type Output = TreeNode;

	fn index(&self, index: NodeId) -> &TreeNode { &self.nodes[index] }
}

impl GuideTree {
	pub(crate) fn new(nodes: Vec<TreeNode>, root: NodeId) -> GuideTree {
		GuideTree { nodes, root }
	}

	pub fn root_index(&self) -> NodeId { self.root }

	pub fn root(&self) -> &TreeNode { &self.nodes[self.root] }

	pub fn node(&self, index: NodeId) -> Option<&TreeNode> { self.nodes.get(index) }

	/// All nodes, leaves first in input order, then internal nodes in merge order.
	pub fn nodes(&self) -> &[TreeNode] { &self.nodes }

	pub fn num_nodes(&self) -> usize { self.nodes.len() }

	pub fn num_leaves(&self) -> usize { self.nodes.iter().filter(|x| x.is_leaf()).count() }

	pub fn num_internal(&self) -> usize { self.num_nodes() - self.num_leaves() }

	/// Leaf indices from left to right.
	pub fn leaf_order(&self) -> Vec<NodeId> {
		let mut order: Vec<NodeId> = Vec::with_capacity(self.num_leaves());
		self.collect_leaves(self.root, &mut order);
		order
	}

	fn collect_leaves(&self, index: NodeId, order: &mut Vec<NodeId>) {
		match self.nodes[index].children {
			Some((left, right)) => {
				self.collect_leaves(left, order);
				self.collect_leaves(right, order);
			},
			None => order.push(index)
		}
	}

	/// Leaf identifiers in the order a post-order walk meets them.
	pub fn alignment_order(&self) -> Vec<&str> {
		self.leaf_order().into_iter().map(|x| self.nodes[x].id.as_str()).collect()
	}

	/// Serializes the tree into bracket notation, terminated with `;`.
	///
	/// Leaves print their identifier; internal nodes print
	/// `(left,right)identifier:branch_length`.
	pub fn serialize_newick(&self) -> String {
		let mut newick = String::new();
		self.build_newick(self.root, &mut newick);
		newick.push(';');
		newick
	}

	fn build_newick(&self, index: NodeId, newick: &mut String) {
		let node = &self.nodes[index];
		match node.children {
			Some((left, right)) => {
				newick.push('(');
				self.build_newick(left, newick);
				newick.push(',');
				self.build_newick(right, newick);
				newick.push(')');
				newick.push_str(&node.id);
				newick.push_str(&format!(":{}", node.branch_length()));
			},
			None => newick.push_str(&node.id)
		}
	}

	/// Writes the bracket notation followed by a newline.
	pub fn write_newick<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
		writer.write_all(self.serialize_newick().as_bytes())?;
		writer.write_all(b"\n")?;
		writer.flush()
	}

	/// Indented diagram of the tree, one node per line.
	///
	/// ```text
	/// 0|1|2
	/// +-- 0|1
	/// |   +-- 0
	/// |   `-- 1
	/// `-- 2
	/// ```
	pub fn ascii(&self) -> String {
		let mut diagram = String::new();
		diagram.push_str(&self.root().id);
		diagram.push('\n');
		if let Some((left, right)) = self.root().children {
			self.build_ascii(left, "", false, &mut diagram);
			self.build_ascii(right, "", true, &mut diagram);
		}
		diagram
	}

	fn build_ascii(&self, index: NodeId, prefix: &str, last: bool, diagram: &mut String) {
		let node = &self.nodes[index];
		diagram.push_str(prefix);
		diagram.push_str(if last { "`-- " } else { "+-- " });
		diagram.push_str(&node.id);
		diagram.push('\n');
		if let Some((left, right)) = node.children {
			let child_prefix = format!("{}{}", prefix, if last { "    " } else { "|   " });
			self.build_ascii(left, &child_prefix, false, diagram);
			self.build_ascii(right, &child_prefix, true, diagram);
		}
	}
}

impl fmt::Display for GuideTree {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(&self.ascii())
	}
}
