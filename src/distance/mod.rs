//! All-pairs alignment score matrices.
use std::fmt;
use std::io;
use ndarray::Array2;
use log::{debug, trace};
use crate::alignment::PairwiseAligner;
use crate::error::{Error, Result};
use crate::seq::SequenceSet;

#[derive(Debug, Clone, PartialEq)]
/// Square, symmetric integer matrix with a zero diagonal.
///
/// Row and column `i` always refer to the same element; which element that is depends on
/// the caller (input order for a freshly built matrix, active-node order during clustering).
pub struct DistanceMatrix {
	cells: Array2<i32>
}

impl DistanceMatrix {
	/// Aligns every pair of sequences and records the global alignment scores.
	///
	/// # Errors
	///
	/// `InvalidInput` for an empty set (before anything is allocated), `UnknownSymbol` from
	/// the aligner.
	pub fn build(sequences: &SequenceSet, aligner: &PairwiseAligner) -> Result<DistanceMatrix> {
		if sequences.is_empty() {
			return Err(Error::InvalidInput("No Sequences to Compare.".to_string()));
		}
		let n = sequences.len();
		let members: Vec<_> = sequences.iter().collect();
		let mut cells: Array2<i32> = Array2::zeros((n, n));
		for i in 0..n {
			for j in (i + 1)..n {
				let score = aligner.score(&members[i].sites, &members[j].sites)?;
				cells[[i, j]] = score;
				cells[[j, i]] = score;
			}
		}
		debug!("Built {}x{} Score Matrix.", n, n);
		trace!("\n{}", cells);
		Ok(DistanceMatrix { cells })
	}

	/// Takes a caller-supplied matrix given as rows.
	///
	/// # Errors
	///
	/// `InvalidInput` unless the rows form a non-empty square, symmetric matrix with a zero
	/// diagonal.
	pub fn from_rows(rows: Vec<Vec<i32>>) -> Result<DistanceMatrix> {
		let n = rows.len();
		if n == 0 {
			return Err(Error::InvalidInput("Empty Distance Matrix.".to_string()));
		}
		if let Some(bad) = rows.iter().position(|row| row.len() != n) {
			return Err(Error::InvalidInput(format!("Row {} Has {} Columns, Expected {}.", bad, rows[bad].len(), n)));
		}
		let flat: Vec<i32> = rows.into_iter().flatten().collect();
		let cells = Array2::from_shape_vec((n, n), flat)
			.map_err(|e| Error::InvalidInput(format!("Malformed Distance Matrix: {}", e)))?;
		let matrix = DistanceMatrix { cells };
		if !matrix.is_symmetric() {
			return Err(Error::InvalidInput("Distance Matrix Must Be Symmetric With a Zero Diagonal.".to_string()));
		}
		Ok(matrix)
	}

	pub(crate) fn from_array(cells: Array2<i32>) -> DistanceMatrix {
		DistanceMatrix { cells }
	}

	/// Number of rows (and columns).
	pub fn dim(&self) -> usize { self.cells.dim().0 }

	pub fn get(&self, i: usize, j: usize) -> i32 { self.cells[[i, j]] }

	/// Whether the matrix mirrors across its diagonal and the diagonal is zero.
	pub fn is_symmetric(&self) -> bool {
		let n = self.dim();
		(0..n).all(|i| self.cells[[i, i]] == 0 && ((i + 1)..n).all(|j| self.cells[[i, j]] == self.cells[[j, i]]))
	}

	/// Row-major copy of the cells.
	pub fn rows(&self) -> Vec<Vec<i32>> {
		let n = self.dim();
		(0..n).map(|i| (0..n).map(|j| self.cells[[i, j]]).collect()).collect()
	}

	/// Every cell negated, turning similarity scores into distances.
	pub fn negated(&self) -> DistanceMatrix {
		DistanceMatrix { cells: self.cells.mapv(|x| -x) }
	}

	/// Writes the grid as CSV, optionally with a header row and a leading label column.
	pub fn write_csv<W: io::Write>(&self, writer: W, labels: Option<&[String]>) -> Result<()> {
		if let Some(labels) = labels {
			if labels.len() != self.dim() {
				return Err(Error::InvalidInput(format!("{} Labels for a {}x{} Matrix.", labels.len(), self.dim(), self.dim())));
			}
		}
		let mut wtr = csv::Writer::from_writer(writer);
		if let Some(labels) = labels {
			let mut header = vec![String::new()];
			header.extend(labels.iter().cloned());
			wtr.write_record(&header)?;
		}
		for (i, row) in self.rows().into_iter().enumerate() {
			let mut record: Vec<String> = Vec::with_capacity(row.len() + 1);
			if let Some(labels) = labels {
				record.push(labels[i].clone());
			}
			record.extend(row.iter().map(|x| x.to_string()));
			wtr.write_record(&record)?;
		}
		wtr.flush()?;
		Ok(())
	}

	/// CSV text of the grid.
	pub fn to_csv(&self, labels: Option<&[String]>) -> Result<String> {
		let mut buffer: Vec<u8> = Vec::new();
		self.write_csv(&mut buffer, labels)?;
		String::from_utf8(buffer).map_err(|e| Error::InvalidInput(e.to_string()))
	}
}

impl fmt::Display for DistanceMatrix {
	/// Space separated rows, one per line.
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for row in self.rows() {
			let line: Vec<String> = row.iter().map(|x| x.to_string()).collect();
			writeln!(f, "{}", line.join(" "))?;
		}
		Ok(())
	}
}
