//! Labelled nucleotide sequences and ordered input sets.
use serde::{Serialize, Deserialize};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use crate::clade::validate_label;
use crate::error::{Error, Result};
use crate::scoring::GAP;

pub trait SeqData: Clone {
	fn len(&self) -> usize;
	fn id(&self) -> &str;
	fn seq(&self) -> Vec<char>;
	fn is_empty(&self) -> bool;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Seq {
	pub sites: Vec<char>,
	pub id: String
}

impl SeqData for Seq {
	fn len(&self) -> usize { self.sites.len() }
	fn id(&self) -> &str { &self.id }
	fn seq(&self) -> Vec<char> { self.sites.clone() }
	fn is_empty(&self) -> bool { self.sites.is_empty() }
}

impl Seq {
	pub fn new(id: String, sites: Vec<char>) -> Seq {
		Seq {
			id,
			sites
		}
	}

	/// Builds a sequence from an identifier and a residue string.
	pub fn from_residues(id: &str, residues: &str) -> Seq {
		Seq::new(id.to_string(), residues.chars().collect())
	}

	/// Residues as a string, gaps included.
	pub fn as_string(&self) -> String {
		self.sites.iter().collect()
	}

	/// The sequence with every gap placeholder removed.
	pub fn degapped(&self) -> Seq {
		let mut compact = self.sites.clone();
		compact.retain(|x| *x != GAP);
		Seq::new(self.id.clone(), compact)
	}

	pub fn serialize_fasta(&self) -> String {
		format!(">{}\n{}", self.id(), self.as_string())
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
/// How an identifier -> sequence mapping is turned into an ordered input set.
pub enum InputOrder {
	/// Sort by identifier.
	Lexicographic,
	/// Keep the mapping's own iteration order (only meaningful for ordered maps).
	Insertion
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
/// Ordered, uniquely identified input sequences.
///
/// Leaf order in the guide tree and row order in the distance matrix follow the order
/// of this set, so it must never be derived from an unordered map's iteration order.
pub struct SequenceSet {
	members: Vec<Seq>
}

impl SequenceSet {
	/// Consumes an iterator of sequences once, naming them `0`, `1`, ... in order.
	pub fn from_sequences<I, S>(sequences: I) -> SequenceSet
		where I: IntoIterator<Item = S>, S: AsRef<str> {
		SequenceSet {
			members: sequences.into_iter()
				.enumerate()
				.map(|(i, s)| Seq::from_residues(&i.to_string(), s.as_ref()))
				.collect()
		}
	}

	/// Pairs identifiers with sequences positionally.
	///
	/// # Errors
	///
	/// The two vectors must have the same length and identifiers must be unique.
	pub fn from_parts(ids: Vec<String>, sequences: Vec<String>) -> Result<SequenceSet> {
		if ids.len() != sequences.len() {
			return Err(Error::InvalidInput(format!("{} Identifiers Supplied for {} Sequences.",
				ids.len(), sequences.len())));
		}
		SequenceSet::from_seqs(ids.into_iter()
			.zip(sequences.into_iter())
			.map(|(id, s)| Seq::new(id, s.chars().collect()))
			.collect())
	}

	/// Takes an unordered mapping, ordered lexicographically by identifier.
	pub fn from_map(map: &HashMap<String, String>) -> Result<SequenceSet> {
		let mut ids: Vec<&String> = map.keys().collect();
		ids.sort();
		SequenceSet::from_seqs(ids.into_iter().map(|id| Seq::from_residues(id, &map[id])).collect())
	}

	/// Takes an ordered mapping, either in its insertion order or sorted by identifier.
	pub fn from_index_map(map: IndexMap<String, String>, order: InputOrder) -> Result<SequenceSet> {
		let mut members: Vec<Seq> = map.into_iter()
			.map(|(id, s)| Seq::new(id, s.chars().collect()))
			.collect();
		if order == InputOrder::Lexicographic {
			members.sort_by(|a, b| a.id.cmp(&b.id));
		}
		SequenceSet::from_seqs(members)
	}

	/// Wraps already-built sequences.
	///
	/// # Errors
	///
	/// `InvalidInput` for duplicate identifiers, or identifiers that cannot be written
	/// into bracket notation (see [`validate_label`]).
	pub fn from_seqs(members: Vec<Seq>) -> Result<SequenceSet> {
		let mut seen: IndexSet<&str> = IndexSet::new();
		for seq in members.iter() {
			validate_label(seq.id())?;
			if !seen.insert(seq.id()) {
				return Err(Error::InvalidInput(format!("Duplicate Sequence Identifier {}.", seq.id())));
			}
		}
		Ok(SequenceSet { members })
	}

	pub fn len(&self) -> usize { self.members.len() }

	pub fn is_empty(&self) -> bool { self.members.is_empty() }

	pub fn get(&self, index: usize) -> Option<&Seq> { self.members.get(index) }

	pub fn iter(&self) -> std::slice::Iter<'_, Seq> { self.members.iter() }

	/// Identifiers in set order.
	pub fn id_list(&self) -> Vec<String> {
		self.members.iter().map(|x| x.id().to_string()).collect()
	}

	pub fn into_members(self) -> Vec<Seq> { self.members }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn list_input_is_numbered_in_order() {
		let set = SequenceSet::from_sequences(vec!["ACGT", "GG"]);
		assert_eq!(set.id_list(), vec!["0", "1"]);
		assert_eq!(set.get(1).unwrap().as_string(), "GG");
	}

	#[test]
	fn unordered_maps_are_sorted_by_identifier() {
		let mut map = HashMap::new();
		for (id, s) in &[("zeta", "A"), ("alpha", "C"), ("mu", "G")] {
			map.insert(id.to_string(), s.to_string());
		}
		assert_eq!(SequenceSet::from_map(&map).unwrap().id_list(), vec!["alpha", "mu", "zeta"]);
	}

	#[test]
	fn index_maps_keep_insertion_order_on_request() {
		let mut map = IndexMap::new();
		map.insert("b".to_string(), "A".to_string());
		map.insert("a".to_string(), "C".to_string());
		assert_eq!(SequenceSet::from_index_map(map.clone(), InputOrder::Insertion).unwrap().id_list(), vec!["b", "a"]);
		assert_eq!(SequenceSet::from_index_map(map, InputOrder::Lexicographic).unwrap().id_list(), vec!["a", "b"]);
	}

	#[test]
	fn mismatched_parts_and_duplicates_are_rejected() {
		let mismatched = SequenceSet::from_parts(vec!["a".to_string()], vec![]);
		assert!(matches!(mismatched, Err(Error::InvalidInput(_))));

		let duplicated = SequenceSet::from_parts(
			vec!["a".to_string(), "a".to_string()],
			vec!["AC".to_string(), "GT".to_string()]);
		assert!(matches!(duplicated, Err(Error::InvalidInput(_))));
	}

	#[test]
	fn identifiers_must_fit_bracket_notation() {
		let ids = vec!["a,b".to_string(), "c)".to_string(), "d".to_string()];
		let sequences = vec!["ACGT".to_string(), "ACG".to_string(), "AGT".to_string()];
		assert!(matches!(SequenceSet::from_parts(ids, sequences), Err(Error::InvalidInput(_))));

		let mut map = HashMap::new();
		map.insert("x|y".to_string(), "A".to_string());
		assert!(matches!(SequenceSet::from_map(&map), Err(Error::InvalidInput(_))));

		let mut ordered = IndexMap::new();
		ordered.insert("has space".to_string(), "A".to_string());
		assert!(SequenceSet::from_index_map(ordered, InputOrder::Insertion).is_err());
	}

	#[test]
	fn degapping_strips_placeholders() {
		assert_eq!(Seq::from_residues("x", "A-C--G").degapped().as_string(), "ACG");
	}
}
