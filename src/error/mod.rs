//! Errors raised while aligning sequences and building guide trees.
use std::fmt;
use std::error::Error as StdError;
use std::io;

/// Errors representing invalid input, broken clustering state, and export failures.
#[derive(Debug)]
pub enum Error {
	/// Too few sequences, mismatched identifier / sequence counts, duplicate identifiers
	/// or an unusable scoring configuration.
	InvalidInput(String),
	/// A clustering step found no active pair to merge.
	EmptyFrontier { active: usize },
	/// The active node table and the working distance matrix disagree on size.
	IndexInvariantViolation { active: usize, rows: usize },
	/// A character outside the nucleotide alphabet (plus gap) was scored.
	UnknownSymbol { symbol: char, position: usize },
	Io(io::Error),
	Csv(csv::Error),
	Json(serde_json::Error)
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::InvalidInput(reason) => write!(f, "Invalid Input: {}", reason),
			Error::EmptyFrontier { active } =>
				write!(f, "No Mergeable Pair Found Among {} Active Nodes.", active),
			Error::IndexInvariantViolation { active, rows } =>
				write!(f, "Active Node Table ({}) Out of Step With Distance Matrix ({} Rows).", active, rows),
			Error::UnknownSymbol { symbol, position } =>
				write!(f, "Unknown Symbol '{}' at Position {}.", symbol, position),
			Error::Io(e) => write!(f, "I/O Error: {}", e),
			Error::Csv(e) => write!(f, "CSV Export Error: {}", e),
			Error::Json(e) => write!(f, "JSON Error: {}", e)
		}
	}
}

impl StdError for Error {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		match self {
			Error::Io(e) => Some(e),
			Error::Csv(e) => Some(e),
			Error::Json(e) => Some(e),
			_ => None
		}
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Error { Error::Io(e) }
}

impl From<csv::Error> for Error {
	fn from(e: csv::Error) -> Error { Error::Csv(e) }
}

impl From<serde_json::Error> for Error {
	fn from(e: serde_json::Error) -> Error { Error::Json(e) }
}
