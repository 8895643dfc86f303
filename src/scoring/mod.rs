//! Scoring configuration for nucleotide alignments.
//!
//! Bases are compared through a fixed symmetric table: identical bases score the match
//! value, transversions score the mismatch penalty and transitions (A/G, C/T) score the
//! negated mismatch penalty. Anything compared against a gap costs the gap penalty, which
//! lets already-gapped alignment blocks be re-aligned as ordinary strings.
use serde::{Serialize, Deserialize};
use phf::{phf_map, Map};
use crate::error::{Error, Result};

/// Gap placeholder used in aligned output and accepted in input blocks.
pub const GAP: char = '-';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A single encoded alignment column symbol.
pub enum Symbol {
	Base(usize),
	Gap
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Substitution {
	Identity,
	Transition,
	Transversion
}

use self::Substitution::{Identity, Transition, Transversion};

/// Substitution classes indexed in A, C, G, T order.
const SUBSTITUTIONS: [[Substitution; 4]; 4] = [
	[Identity, Transversion, Transition, Transversion],
	[Transversion, Identity, Transversion, Transition],
	[Transition, Transversion, Identity, Transversion],
	[Transversion, Transition, Transversion, Identity],
];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
/// Match / mismatch / gap values for a global alignment.
pub struct ScoringScheme {
	pub match_score: i32,
	pub mismatch: i32,
	pub gap: i32
}

impl Default for ScoringScheme {
	fn default() -> ScoringScheme {
		ScoringScheme {
			match_score: 3,
			mismatch: -1,
			gap: -2
		}
	}
}

impl ScoringScheme {
	/// Maps nucleotide symbols to their row in the substitution table.
	const BASE_INDEX: Map<char, usize> = phf_map! {
		'A' => 0, 'C' => 1, 'G' => 2, 'T' => 3
	};

	pub fn new(match_score: i32, mismatch: i32, gap: i32) -> ScoringScheme {
		ScoringScheme { match_score, mismatch, gap }
	}

	/// Checks the sign conventions: positive match, negative mismatch and gap.
	pub fn validate(&self) -> Result<()> {
		if self.match_score <= 0 {
			return Err(Error::InvalidInput(format!("Match Score Must Be Positive, Got {}.", self.match_score)));
		}
		if self.mismatch >= 0 {
			return Err(Error::InvalidInput(format!("Mismatch Penalty Must Be Negative, Got {}.", self.mismatch)));
		}
		if self.gap >= 0 {
			return Err(Error::InvalidInput(format!("Gap Penalty Must Be Negative, Got {}.", self.gap)));
		}
		Ok(())
	}

	/// Reads a scheme from a JSON object such as `{"match_score":3,"mismatch":-1,"gap":-2}`.
	pub fn from_json(contents: &str) -> Result<ScoringScheme> {
		let scheme: ScoringScheme = serde_json::from_str(contents)?;
		scheme.validate()?;
		Ok(scheme)
	}

	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}

	/// Encodes a sequence for scoring.
	///
	/// # Errors
	///
	/// Fails with `UnknownSymbol` on the first character that is neither a nucleotide
	/// (uppercase A, C, G, T) nor the gap placeholder.
	pub fn encode(&self, sites: &[char]) -> Result<Vec<Symbol>> {
		sites.iter().enumerate().map(|(position, &c)| {
			if c == GAP {
				Ok(Symbol::Gap)
			} else {
				match ScoringScheme::BASE_INDEX.get(&c) {
					Some(index) => Ok(Symbol::Base(*index)),
					None => Err(Error::UnknownSymbol { symbol: c, position })
				}
			}
		}).collect()
	}

	/// Score for placing two symbols in the same column.
	pub fn substitution(&self, a: Symbol, b: Symbol) -> i32 {
		match (a, b) {
			(Symbol::Base(x), Symbol::Base(y)) => match SUBSTITUTIONS[x][y] {
				Identity => self.match_score,
				Transition => -self.mismatch,
				Transversion => self.mismatch
			},
			_ => self.gap
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sym(c: char) -> Symbol {
		ScoringScheme::default().encode(&[c]).unwrap()[0]
	}

	#[test]
	fn substitution_table_is_symmetric() {
		let scheme = ScoringScheme::default();
		for a in "ACGT-".chars() {
			for b in "ACGT-".chars() {
				assert_eq!(scheme.substitution(sym(a), sym(b)), scheme.substitution(sym(b), sym(a)));
			}
		}
	}

	#[test]
	fn transitions_score_negated_mismatch() {
		let scheme = ScoringScheme::default();
		assert_eq!(scheme.substitution(sym('A'), sym('A')), 3);
		assert_eq!(scheme.substitution(sym('A'), sym('G')), 1);
		assert_eq!(scheme.substitution(sym('C'), sym('T')), 1);
		assert_eq!(scheme.substitution(sym('A'), sym('C')), -1);
		assert_eq!(scheme.substitution(sym('G'), sym('T')), -1);
		assert_eq!(scheme.substitution(sym('-'), sym('T')), -2);
		assert_eq!(scheme.substitution(sym('-'), sym('-')), -2);
	}

	#[test]
	fn unknown_symbols_are_reported_with_position() {
		let sites: Vec<char> = "ACNT".chars().collect();
		match ScoringScheme::default().encode(&sites) {
			Err(Error::UnknownSymbol { symbol, position }) => {
				assert_eq!(symbol, 'N');
				assert_eq!(position, 2);
			},
			other => panic!("unexpected result {:?}", other)
		}
	}

	#[test]
	fn json_round_trip_and_validation() {
		let scheme = ScoringScheme::from_json(r#"{"match_score":2,"mismatch":-3,"gap":-4}"#).unwrap();
		assert_eq!(scheme, ScoringScheme::new(2, -3, -4));
		assert_eq!(ScoringScheme::from_json(&scheme.to_json().unwrap()).unwrap(), scheme);

		assert!(matches!(ScoringScheme::new(3, 1, -2).validate(), Err(Error::InvalidInput(_))));
		assert!(matches!(ScoringScheme::from_json(r#"{"match_score":0,"mismatch":-1,"gap":-2}"#),
			Err(Error::InvalidInput(_))));
		assert!(matches!(ScoringScheme::from_json("{"), Err(Error::Json(_))));
	}
}
