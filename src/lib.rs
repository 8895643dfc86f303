//! # Phylo MSA
//!
//! `phylo_msa` builds neighbor-joining guide trees from global pairwise alignment scores
//! and uses them to progressively align nucleotide sequences.
//!
//! ```
//! use phylo_msa::report::{MsaConfig, MsaReport};
//! use phylo_msa::seq::SequenceSet;
//!
//! let sequences = SequenceSet::from_sequences(vec!["ATGCGA", "ATGGACGA", "ATCCA"]);
//! let report = MsaReport::build(sequences, &MsaConfig::default()).unwrap();
//! assert_eq!(report.merges.len(), 2);
//! assert!(report.newick.ends_with(';'));
//! ```
pub mod error;
pub mod scoring;
pub mod seq;
pub mod alignment;
pub mod distance;
pub mod clade;
pub mod joining;
pub mod progressive;
pub mod report;

pub use crate::error::{Error, Result};
