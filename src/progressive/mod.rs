//! Tree-guided progressive alignment.
//!
//! Each guide tree node resolves to a [`Block`]. Leaves hold their raw sequence; an internal
//! node pairwise-aligns the texts of its two child blocks and keeps the column consensus as
//! its own text. This is a cascade of pairwise alignments, not a profile alignment: only the
//! two texts are compared, the member rows just follow the gaps the traceback inserts.
use log::{debug, info};
use serde::{Serialize, Deserialize};
use crate::alignment::{Alignment, AlignmentResult, PairwiseAligner, Step};
use crate::clade::{GuideTree, NodeId};
use crate::error::{Error, Result};
use crate::scoring::GAP;
use crate::seq::Seq;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
/// Order in which blocks are combined.
pub enum Schedule {
	/// Resolve both subtrees of every internal node, then align them.
	Tree,
	/// Fold the leaves left to right, the growing block always the left operand.
	LeftFold
}

impl Default for Schedule {
	fn default() -> Schedule { Schedule::Tree }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// Text of a (partial) alignment plus the gapped rows of the leaves it covers.
pub struct Block {
	pub text: Vec<char>,
	pub rows: Vec<(NodeId, Seq)>,
	/// Score of the pairwise alignment that produced this block, zero for leaves.
	pub score: i32
}

/// Consensus symbol of an alignment column: any gap wins, a mismatch keeps the left symbol.
fn consensus(a: char, b: char) -> char {
	if a == GAP || b == GAP { GAP } else { a }
}

impl Block {
	pub fn leaf(index: NodeId, seq: Seq) -> Block {
		Block {
			text: seq.sites.clone(),
			rows: vec![(index, seq)],
			score: 0
		}
	}

	pub fn text_string(&self) -> String { self.text.iter().collect() }

	/// Aligns the two block texts and pads every member row with the inserted gap columns.
	pub fn merge(left: Block, right: Block, aligner: &PairwiseAligner) -> Result<Block> {
		let result = aligner.align(&left.text, &right.text)?;
		let text: Vec<char> = result.aligned_a.iter()
			.zip(result.aligned_b.iter())
			.map(|(&a, &b)| consensus(a, b))
			.collect();

		let mut rows: Vec<(NodeId, Seq)> = Vec::with_capacity(left.rows.len() + right.rows.len());
		for (index, seq) in left.rows {
			rows.push((index, project(&seq, &result, true)));
		}
		for (index, seq) in right.rows {
			rows.push((index, project(&seq, &result, false)));
		}
		Ok(Block { text, rows, score: result.score })
	}
}

/// Replays the traceback on one member row, inserting a gap wherever its side did not advance.
fn project(row: &Seq, result: &AlignmentResult, first: bool) -> Seq {
	let mut sites = row.sites.iter();
	let projected: Vec<char> = result.path.iter().map(|step| {
		let advances = match step {
			Step::Diagonal => true,
			Step::Up => first,
			Step::Left => !first
		};
		if advances { sites.next().copied().unwrap_or(GAP) } else { GAP }
	}).collect();
	Seq::new(row.id.clone(), projected)
}

#[derive(Serialize, Deserialize, Debug, Clone)]
/// Outcome of progressive alignment over a guide tree.
pub struct ProgressiveResult {
	/// Text of the final block.
	pub text: String,
	/// One gapped row per leaf, in leaf (input) order.
	pub alignment: Alignment<Seq>,
	/// Score of the last pairwise merge.
	pub score: i32,
	pub merges: usize
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressiveAligner {
	aligner: PairwiseAligner,
	schedule: Schedule
}

impl ProgressiveAligner {
	pub fn new(aligner: PairwiseAligner, schedule: Schedule) -> ProgressiveAligner {
		ProgressiveAligner { aligner, schedule }
	}

	pub fn schedule(&self) -> Schedule { self.schedule }

	/// Resolves the root of `tree` into its final block.
	pub fn resolve(&self, tree: &GuideTree) -> Result<(Block, usize)> {
		match self.schedule {
			Schedule::Tree => {
				let mut merges = 0;
				let block = self.resolve_node(tree, tree.root_index(), &mut merges)?;
				Ok((block, merges))
			},
			Schedule::LeftFold => {
				let mut leaves = tree.leaf_order().into_iter();
				let first = leaves.next().ok_or(Error::EmptyFrontier { active: 0 })?;
				let mut block = self.leaf_block(tree, first)?;
				let mut merges = 0;
				for leaf in leaves {
					block = Block::merge(block, self.leaf_block(tree, leaf)?, &self.aligner)?;
					merges += 1;
				}
				Ok((block, merges))
			}
		}
	}

	fn resolve_node(&self, tree: &GuideTree, index: NodeId, merges: &mut usize) -> Result<Block> {
		match tree[index].children {
			Some((left, right)) => {
				let left_block = self.resolve_node(tree, left, merges)?;
				let right_block = self.resolve_node(tree, right, merges)?;
				let block = Block::merge(left_block, right_block, &self.aligner)?;
				*merges += 1;
				debug!("Aligned Block {} (Score {}): {}", tree[index].id, block.score, block.text_string());
				Ok(block)
			},
			None => self.leaf_block(tree, index)
		}
	}

	fn leaf_block(&self, tree: &GuideTree, index: NodeId) -> Result<Block> {
		let node = &tree[index];
		match &node.sequence {
			Some(sites) => Ok(Block::leaf(index, Seq::new(node.id.clone(), sites.clone()))),
			None => Err(Error::InvalidInput(format!("Leaf {} Carries No Sequence.", node.id)))
		}
	}

	/// Aligns every leaf sequence of `tree`, returning the final text and one row per leaf.
	pub fn align(&self, tree: &GuideTree) -> Result<ProgressiveResult> {
		let (block, merges) = self.resolve(tree)?;
		let text = block.text_string();
		let score = block.score;
		let mut rows = block.rows;
		rows.sort_by_key(|(index, _)| *index);
		let alignment = Alignment::<Seq>::from(rows.into_iter().map(|(_, seq)| seq).collect())
			.ok_or_else(|| Error::InvalidInput("Aligned Rows Differ in Length.".to_string()))?;
		info!("Progressive Alignment of {} Sequences ({:?}): {} Columns After {} Merges.",
			alignment.members.len(), self.schedule, alignment.len(), merges);
		Ok(ProgressiveResult { text, alignment, score, merges })
	}
}
