//! Global pairwise alignment (Needleman-Wunsch) and containers for aligned sequences.
use ndarray::Array2;
use log::trace;
use serde::{Serialize, Deserialize};
use crate::error::Result;
use crate::scoring::{ScoringScheme, Symbol, GAP};
use crate::seq::{Seq, SeqData};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
/// Direction taken from a cell of the dynamic programming matrix.
pub enum Step {
	/// Both sequences advance.
	Diagonal,
	/// The first sequence advances against a gap.
	Up,
	/// The second sequence advances against a gap.
	Left
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// Two equal-length gapped sequences with their alignment score.
pub struct AlignmentResult {
	pub aligned_a: Vec<char>,
	pub aligned_b: Vec<char>,
	pub score: i32,
	/// One step per alignment column, first column first.
	pub path: Vec<Step>
}

impl AlignmentResult {
	/// Number of alignment columns.
	pub fn len(&self) -> usize { self.path.len() }

	pub fn is_empty(&self) -> bool { self.path.is_empty() }

	pub fn aligned_a_string(&self) -> String { self.aligned_a.iter().collect() }

	pub fn aligned_b_string(&self) -> String { self.aligned_b.iter().collect() }
}

/// Optimal end-to-end alignment of two sequences under a fixed scoring scheme.
///
/// Boundary cells carry the cumulative gap cost, so leading and trailing gaps are
/// penalised like any other. Equal-scoring predecessors are resolved diagonal first,
/// then up, then left, which makes the traceback reproducible.
#[derive(Debug, Clone, Copy)]
pub struct PairwiseAligner {
	scheme: ScoringScheme
}

impl Default for PairwiseAligner {
	fn default() -> PairwiseAligner {
		PairwiseAligner { scheme: ScoringScheme::default() }
	}
}

impl PairwiseAligner {
	/// Creates an aligner, checking the scheme's sign conventions.
	pub fn new(scheme: ScoringScheme) -> Result<PairwiseAligner> {
		scheme.validate()?;
		Ok(PairwiseAligner { scheme })
	}

	pub fn scheme(&self) -> &ScoringScheme { &self.scheme }

	/// Aligns two sequences, returning both gapped rows, the score and the traceback path.
	///
	/// # Errors
	///
	/// `UnknownSymbol` if either input holds a character outside A, C, G, T and `-`.
	pub fn align(&self, a: &[char], b: &[char]) -> Result<AlignmentResult> {
		let enc_a = self.scheme.encode(a)?;
		let enc_b = self.scheme.encode(b)?;
		let (scores, traces) = self.fill(&enc_a, &enc_b);
		trace!("Score Matrix {}x{}:\n{}", a.len() + 1, b.len() + 1, scores);

		let score = scores[[a.len(), b.len()]];
		let (aligned_a, aligned_b, path) = PairwiseAligner::traceback(a, b, &traces);
		Ok(AlignmentResult { aligned_a, aligned_b, score, path })
	}

	/// Aligns two strings; convenience wrapper around [`PairwiseAligner::align`].
	pub fn align_str(&self, a: &str, b: &str) -> Result<AlignmentResult> {
		let a: Vec<char> = a.chars().collect();
		let b: Vec<char> = b.chars().collect();
		self.align(&a, &b)
	}

	/// Global alignment score only, keeping two matrix rows instead of the full tables.
	pub fn score(&self, a: &[char], b: &[char]) -> Result<i32> {
		let enc_a = self.scheme.encode(a)?;
		let enc_b = self.scheme.encode(b)?;
		let gap = self.scheme.gap;

		let mut previous: Vec<i32> = (0..=enc_b.len()).map(|j| j as i32 * gap).collect();
		let mut current: Vec<i32> = vec![0; enc_b.len() + 1];
		for (i, &x) in enc_a.iter().enumerate() {
			current[0] = (i as i32 + 1) * gap;
			for (j, &y) in enc_b.iter().enumerate() {
				let diagonal = previous[j] + self.scheme.substitution(x, y);
				let up = previous[j + 1] + gap;
				let left = current[j] + gap;
				current[j + 1] = diagonal.max(up).max(left);
			}
			std::mem::swap(&mut previous, &mut current);
		}
		Ok(previous[enc_b.len()])
	}

	/// The filled (|a|+1)x(|b|+1) score matrix, for inspection.
	pub fn score_matrix(&self, a: &[char], b: &[char]) -> Result<Array2<i32>> {
		let enc_a = self.scheme.encode(a)?;
		let enc_b = self.scheme.encode(b)?;
		Ok(self.fill(&enc_a, &enc_b).0)
	}

	fn fill(&self, a: &[Symbol], b: &[Symbol]) -> (Array2<i32>, Array2<Step>) {
		let rows = a.len() + 1;
		let cols = b.len() + 1;
		let gap = self.scheme.gap;
		let mut scores: Array2<i32> = Array2::zeros((rows, cols));
		let mut traces: Array2<Step> = Array2::from_elem((rows, cols), Step::Diagonal);

		for j in 0..cols {
			scores[[0, j]] = j as i32 * gap;
			traces[[0, j]] = Step::Left;
		}
		for i in 0..rows {
			scores[[i, 0]] = i as i32 * gap;
			traces[[i, 0]] = Step::Up;
		}

		for i in 1..rows {
			for j in 1..cols {
				let diagonal = scores[[i - 1, j - 1]] + self.scheme.substitution(a[i - 1], b[j - 1]);
				let up = scores[[i - 1, j]] + gap;
				let left = scores[[i, j - 1]] + gap;
				let best = diagonal.max(up).max(left);

				scores[[i, j]] = best;
				traces[[i, j]] = if best == diagonal {
					Step::Diagonal
				} else if best == up {
					Step::Up
				} else {
					Step::Left
				};
			}
		}
		(scores, traces)
	}

	fn traceback(a: &[char], b: &[char], traces: &Array2<Step>) -> (Vec<char>, Vec<char>, Vec<Step>) {
		let mut i = a.len();
		let mut j = b.len();
		let mut aligned_a: Vec<char> = Vec::with_capacity(i + j);
		let mut aligned_b: Vec<char> = Vec::with_capacity(i + j);
		let mut path: Vec<Step> = Vec::with_capacity(i + j);

		while i > 0 || j > 0 {
			let step = match traces[[i, j]] {
				Step::Diagonal if i > 0 && j > 0 => Step::Diagonal,
				Step::Up | Step::Diagonal if i > 0 => Step::Up,
				_ => Step::Left
			};
			match step {
				Step::Diagonal => {
					aligned_a.push(a[i - 1]);
					aligned_b.push(b[j - 1]);
					i -= 1;
					j -= 1;
				},
				Step::Up => {
					aligned_a.push(a[i - 1]);
					aligned_b.push(GAP);
					i -= 1;
				},
				Step::Left => {
					aligned_a.push(GAP);
					aligned_b.push(b[j - 1]);
					j -= 1;
				}
			}
			path.push(step);
		}

		aligned_a.reverse();
		aligned_b.reverse();
		path.reverse();
		(aligned_a, aligned_b, path)
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
/// Gapped rows of equal length, one per aligned sequence.
pub struct Alignment<T: SeqData> {
	pub members: Vec<T>
}

impl<T: SeqData> Alignment<T> {
	pub fn new() -> Alignment<T> {
		Alignment::<T> { members: Vec::new() }
	}

	/// Wraps already gapped rows; `None` if any row differs in length from the first.
	pub fn from(rows: Vec<T>) -> Option<Alignment<T>> {
		let width = rows.first().map_or(0, |x| x.len());
		if rows.iter().all(|row| row.len() == width) {
			Some(Alignment::<T> { members: rows })
		} else {
			None
		}
	}

	/// Row identifiers, top to bottom.
	pub fn id_list(&self) -> Vec<String> {
		self.members.iter().map(|row| row.id().to_string()).collect()
	}

	pub fn get(&self, id: &str) -> Option<&T> {
		self.members.iter().find(|row| row.id() == id)
	}

	/// Each row with its gap placeholders stripped, recovering the input residues.
	pub fn degap(&self) -> Vec<Seq> {
		self.members.iter()
			.map(|row| Seq::new(row.id().to_string(), row.seq().into_iter().filter(|&c| c != GAP).collect()))
			.collect()
	}

	/// Number of columns; zero without rows.
	pub fn len(&self) -> usize {
		self.members.first().map_or(0, |row| row.len())
	}

	pub fn is_empty(&self) -> bool { self.len() == 0 }

	/// Strict PHYLIP text: a `rows columns` header, then each identifier padded or cut to
	/// ten characters followed by its residues. Empty when there are no rows.
	pub fn serialize_phylip(&self) -> String {
		if self.members.is_empty() {
			return String::new();
		}
		let mut text = format!("{} {}\n", self.members.len(), self.len());
		for row in &self.members {
			let label: String = format!("{:<10}", row.id()).chars().take(10).collect();
			let residues: String = row.seq().into_iter().collect();
			text.push_str(&label);
			text.push_str(&residues);
			text.push('\n');
		}
		text
	}

	/// FASTA text with residues wrapped at 80 columns.
	pub fn serialize_fasta(&self) -> String {
		let mut text = String::new();
		for row in &self.members {
			text.push('>');
			text.push_str(row.id());
			text.push('\n');
			let residues = row.seq();
			if residues.is_empty() {
				text.push('\n');
			}
			for chunk in residues.chunks(80) {
				text.extend(chunk.iter());
				text.push('\n');
			}
		}
		text
	}
}
