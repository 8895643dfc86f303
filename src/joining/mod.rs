//! Neighbor-joining construction of guide trees.
//!
//! The builder keeps one canonical table mapping matrix rows to arena nodes. Every merge
//! rebuilds that table and the working matrix together: surviving nodes keep their
//! relative order and the new node takes the last row. Both are checked against each other
//! at the start of every step.
use std::convert::TryFrom;
use ndarray::Array2;
use log::{debug, info, trace, warn};
use indexmap::IndexSet;
use serde::{Serialize, Deserialize};
use crate::alignment::PairwiseAligner;
use crate::clade::{validate_label, GuideTree, NodeId, TreeNode};
use crate::distance::DistanceMatrix;
use crate::error::{Error, Result};
use crate::seq::SequenceSet;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
/// How alignment scores become clustering distances.
pub enum ClusterCriterion {
	/// Distance is the negated score, so the most similar pair merges first.
	NegatedScore,
	/// Scores are used as distances unchanged, so the lowest-scoring pair merges first.
	RawScore
}

impl Default for ClusterCriterion {
	fn default() -> ClusterCriterion { ClusterCriterion::NegatedScore }
}

impl ClusterCriterion {
	pub fn distances(&self, scores: &DistanceMatrix) -> DistanceMatrix {
		match self {
			ClusterCriterion::NegatedScore => scores.negated(),
			ClusterCriterion::RawScore => scores.clone()
		}
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// One clustering step: `left` and `right` became children of `node`.
pub struct MergeRecord {
	pub left: NodeId,
	pub right: NodeId,
	pub node: NodeId,
	pub distance: i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
	Initialized,
	Clustering,
	Done
}

#[derive(Debug)]
/// Clustering state: the node arena, the active table and the working matrix.
pub struct GuideTreeBuilder {
	nodes: Vec<TreeNode>,
	active: Vec<NodeId>,
	matrix: DistanceMatrix,
	scores: Option<DistanceMatrix>,
	history: Vec<MergeRecord>
}

impl GuideTreeBuilder {
	/// Creates one leaf per sequence, in set order, and scores every pair.
	///
	/// # Errors
	///
	/// `InvalidInput` for an empty set, raised before any matrix is allocated.
	/// `UnknownSymbol` if a sequence cannot be scored.
	pub fn new(sequences: SequenceSet, aligner: &PairwiseAligner, criterion: ClusterCriterion) -> Result<GuideTreeBuilder> {
		if sequences.is_empty() {
			return Err(Error::InvalidInput("At Least One Sequence Is Required to Build a Guide Tree.".to_string()));
		}
		let scores = DistanceMatrix::build(&sequences, aligner)?;
		let matrix = criterion.distances(&scores);
		let nodes: Vec<TreeNode> = sequences.into_members()
			.into_iter()
			.map(|seq| TreeNode::leaf(seq.id, seq.sites))
			.collect();
		info!("Initialized Guide Tree Builder With {} Leaves ({:?}).", nodes.len(), criterion);
		Ok(GuideTreeBuilder {
			active: (0..nodes.len()).collect(),
			nodes,
			matrix,
			scores: Some(scores),
			history: Vec::new()
		})
	}

	/// Starts from a precomputed distance matrix whose rows follow `labels`.
	///
	/// Leaves created this way carry no sequence, so the resulting tree can be serialized
	/// but not progressively aligned.
	///
	/// # Errors
	///
	/// `InvalidInput` for no labels, a label count that differs from the matrix size,
	/// duplicate labels or labels rejected by [`validate_label`].
	pub fn from_distances(labels: Vec<String>, matrix: DistanceMatrix) -> Result<GuideTreeBuilder> {
		if labels.is_empty() {
			return Err(Error::InvalidInput("At Least One Label Is Required to Build a Guide Tree.".to_string()));
		}
		if labels.len() != matrix.dim() {
			return Err(Error::InvalidInput(format!("{} Labels Supplied for a {}x{} Matrix.",
				labels.len(), matrix.dim(), matrix.dim())));
		}
		for label in labels.iter() {
			validate_label(label)?;
		}
		let unique: IndexSet<&String> = labels.iter().collect();
		if unique.len() != labels.len() {
			return Err(Error::InvalidInput("Leaf Labels Must Be Unique.".to_string()));
		}
		let nodes: Vec<TreeNode> = labels.into_iter().map(TreeNode::label).collect();
		Ok(GuideTreeBuilder {
			active: (0..nodes.len()).collect(),
			nodes,
			matrix,
			scores: None,
			history: Vec::new()
		})
	}

	pub fn state(&self) -> BuildState {
		if self.active.len() <= 1 {
			BuildState::Done
		} else if self.history.is_empty() {
			BuildState::Initialized
		} else {
			BuildState::Clustering
		}
	}

	/// Arena indices of the active nodes, in matrix row order.
	pub fn active(&self) -> &[NodeId] { &self.active }

	pub fn active_count(&self) -> usize { self.active.len() }

	/// Current working distances, rows aligned with [`GuideTreeBuilder::active`].
	pub fn matrix(&self) -> &DistanceMatrix { &self.matrix }

	/// Raw pairwise alignment scores, when the builder was started from sequences.
	pub fn scores(&self) -> Option<&DistanceMatrix> { self.scores.as_ref() }

	pub fn history(&self) -> &[MergeRecord] { &self.history }

	pub fn nodes(&self) -> &[TreeNode] { &self.nodes }

	fn check_invariants(&self) -> Result<()> {
		if self.active.len() != self.matrix.dim() {
			return Err(Error::IndexInvariantViolation { active: self.active.len(), rows: self.matrix.dim() });
		}
		Ok(())
	}

	/// Lowest-distance pair of matrix rows; the first pair in row-major order wins ties.
	fn closest_pair(&self) -> Result<(usize, usize, i32)> {
		let n = self.active.len();
		let mut best: Option<(usize, usize, i32)> = None;
		for i in 0..n {
			for j in (i + 1)..n {
				let distance = self.matrix.get(i, j);
				match best {
					Some((_, _, min)) if distance >= min => {},
					_ => best = Some((i, j, distance))
				}
			}
		}
		best.ok_or(Error::EmptyFrontier { active: n })
	}

	/// Merges the closest active pair into a new internal node.
	///
	/// The reduced matrix copies every distance between survivors and sets the distance
	/// from the new node `u` to a survivor `k` to `(d(i,k) + d(j,k) - d(i,j)) / 2`, with
	/// integer division truncating toward zero.
	///
	/// # Errors
	///
	/// `IndexInvariantViolation` if the active table and matrix disagree, `EmptyFrontier`
	/// if fewer than two nodes are active, `InvalidInput` if a reduced distance leaves the
	/// `i32` range. The builder is unchanged when a step fails.
	pub fn step(&mut self) -> Result<MergeRecord> {
		self.check_invariants()?;
		let (i, j, distance) = self.closest_pair()?;
		let n = self.active.len();
		let (left, right) = (self.active[i], self.active[j]);

		let survivors: Vec<usize> = (0..n).filter(|&k| k != i && k != j).collect();
		let last = n - 2;
		let mut cells: Array2<i32> = Array2::zeros((n - 1, n - 1));
		for (row, &k) in survivors.iter().enumerate() {
			for (col, &l) in survivors.iter().enumerate() {
				cells[[row, col]] = self.matrix.get(k, l);
			}
			let joined = (i64::from(self.matrix.get(i, k)) + i64::from(self.matrix.get(j, k))
				- i64::from(self.matrix.get(i, j))) / 2;
			let joined = i32::try_from(joined)
				.map_err(|_| Error::InvalidInput(format!("Reduced Distance {} Overflows i32.", joined)))?;
			cells[[row, last]] = joined;
			cells[[last, row]] = joined;
		}

		let parent = TreeNode::internal((left, &self.nodes[left]), (right, &self.nodes[right]));
		let node = self.nodes.len();
		self.nodes[left].active = false;
		self.nodes[right].active = false;
		self.nodes.push(parent);

		let mut active: Vec<NodeId> = survivors.iter().map(|&k| self.active[k]).collect();
		active.push(node);
		self.active = active;
		self.matrix = DistanceMatrix::from_array(cells);

		let record = MergeRecord { left, right, node, distance };
		debug!("Merged {} and {} Into {} at Distance {}; {} Active.",
			self.nodes[left].id, self.nodes[right].id, node, distance, self.active.len());
		trace!("Reduced Matrix:\n{}", self.matrix);
		self.history.push(record.clone());
		Ok(record)
	}

	/// Steps until a single node is active, returning the root's arena index.
	pub fn run(&mut self) -> Result<NodeId> {
		if self.active.len() == 1 && self.history.is_empty() {
			warn!("Only One Sequence Supplied; Guide Tree Is a Single Leaf.");
		}
		while self.active.len() > 1 {
			self.step()?;
		}
		self.check_invariants()?;
		let root = self.active.first().copied().ok_or(Error::EmptyFrontier { active: 0 })?;
		info!("Guide Tree Complete After {} Merges, Root {}.", self.history.len(), self.nodes[root].id);
		Ok(root)
	}

	/// Hands the finished arena over as a tree.
	///
	/// # Errors
	///
	/// `InvalidInput` if clustering has not reached a single active node.
	pub fn into_tree(self) -> Result<GuideTree> {
		if self.active.len() != 1 {
			return Err(Error::InvalidInput(format!("Clustering Unfinished, {} Nodes Still Active.", self.active.len())));
		}
		let root = self.active[0];
		Ok(GuideTree::new(self.nodes, root))
	}

	/// Runs clustering to completion and returns the tree.
	pub fn build(mut self) -> Result<GuideTree> {
		self.run()?;
		self.into_tree()
	}
}
