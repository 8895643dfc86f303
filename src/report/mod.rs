//! One-call pipeline from input sequences to guide tree and multiple alignment.
use log::info;
use serde::{Serialize, Deserialize};
use crate::alignment::{Alignment, PairwiseAligner};
use crate::clade::GuideTree;
use crate::distance::DistanceMatrix;
use crate::error::{Error, Result};
use crate::joining::{ClusterCriterion, GuideTreeBuilder, MergeRecord};
use crate::progressive::{ProgressiveAligner, Schedule};
use crate::scoring::ScoringScheme;
use crate::seq::{Seq, SequenceSet};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Every knob of a run.
pub struct MsaConfig {
	#[serde(default)]
	pub scoring: ScoringScheme,
	#[serde(default)]
	pub criterion: ClusterCriterion,
	#[serde(default)]
	pub schedule: Schedule
}

impl MsaConfig {
	/// Reads a configuration from JSON; omitted sections take their defaults.
	pub fn from_json(contents: &str) -> Result<MsaConfig> {
		let config: MsaConfig = serde_json::from_str(contents)?;
		config.scoring.validate()?;
		Ok(config)
	}
}

#[derive(Serialize, Deserialize, Debug, Clone)]
/// Everything a run produces.
pub struct MsaReport {
	pub ids: Vec<String>,
	/// Pairwise alignment scores in input order.
	pub scores: Vec<Vec<i32>>,
	pub merges: Vec<MergeRecord>,
	pub tree: GuideTree,
	pub newick: String,
	pub diagram: String,
	pub order: Vec<String>,
	/// Text of the root block.
	pub consensus: String,
	pub alignment: Alignment<Seq>
}

impl MsaReport {
	/// Scores all pairs, clusters them into a guide tree and aligns along it.
	pub fn build(sequences: SequenceSet, config: &MsaConfig) -> Result<MsaReport> {
		let aligner = PairwiseAligner::new(config.scoring)?;
		let ids = sequences.id_list();

		let mut builder = GuideTreeBuilder::new(sequences, &aligner, config.criterion)?;
		let scores = builder.scores()
			.map(|x| x.rows())
			.ok_or_else(|| Error::InvalidInput("Builder Holds No Alignment Scores.".to_string()))?;
		builder.run()?;
		let merges = builder.history().to_vec();
		let tree = builder.into_tree()?;

		let progressive = ProgressiveAligner::new(aligner, config.schedule).align(&tree)?;
		info!("Aligned {} Sequences Into {} Columns.", ids.len(), progressive.alignment.len());

		Ok(MsaReport {
			ids,
			scores,
			merges,
			newick: tree.serialize_newick(),
			diagram: tree.ascii(),
			order: tree.alignment_order().into_iter().map(String::from).collect(),
			consensus: progressive.text,
			alignment: progressive.alignment,
			tree
		})
	}

	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string_pretty(self)?)
	}

	/// Score grid as CSV with identifiers as header and first column.
	pub fn scores_csv(&self) -> Result<String> {
		DistanceMatrix::from_rows(self.scores.clone())?.to_csv(Some(&self.ids[..]))
	}

	pub fn fasta(&self) -> String {
		self.alignment.serialize_fasta()
	}
}
