use phylo_msa::alignment::PairwiseAligner;
use phylo_msa::clade::GuideTree;
use phylo_msa::distance::DistanceMatrix;
use phylo_msa::joining::{BuildState, ClusterCriterion, GuideTreeBuilder};
use phylo_msa::progressive::{ProgressiveAligner, Schedule};
use phylo_msa::seq::{SeqData, SequenceSet};
use phylo_msa::Error;
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

const FIXTURE: [&str; 5] = ["ATGCGA", "ATGGACGA", "ATCCA", "ATGGA", "CTGCAA"];

fn builder_for(sequences: SequenceSet) -> GuideTreeBuilder {
	GuideTreeBuilder::new(sequences, &PairwiseAligner::default(), ClusterCriterion::NegatedScore).unwrap()
}

/// Labels written at leaf positions, i.e. right after '(' or ','.
fn leaf_labels(newick: &str) -> Vec<String> {
	let mut labels = Vec::new();
	let mut current = String::new();
	let mut in_leaf = true;
	for c in newick.chars() {
		match c {
			'(' | ',' => {
				if in_leaf && !current.is_empty() {
					labels.push(current.clone());
				}
				current.clear();
				in_leaf = true;
			}
			')' | ';' => {
				if in_leaf && !current.is_empty() {
					labels.push(current.clone());
				}
				current.clear();
				in_leaf = false;
			}
			_ => current.push(c),
		}
	}
	labels
}

fn assert_well_formed(tree: &GuideTree, ids: &[String]) {
	let newick = tree.serialize_newick();
	assert!(newick.ends_with(';'));
	assert_eq!(newick.matches(';').count(), 1);
	let mut depth: i64 = 0;
	for c in newick.chars() {
		match c {
			'(' => depth += 1,
			')' => depth -= 1,
			_ => {}
		}
		assert!(depth >= 0);
	}
	assert_eq!(depth, 0);

	let mut labels = leaf_labels(&newick);
	labels.sort();
	let mut expected = ids.to_vec();
	expected.sort();
	assert_eq!(labels, expected);
}

#[test]
fn test_fixture_completes_in_four_merges() {
	let mut builder = builder_for(SequenceSet::from_sequences(FIXTURE.iter()));
	let root = builder.run().unwrap();
	assert_eq!(builder.history().len(), 4);
	assert_eq!(builder.active(), &[root]);
	assert_eq!(builder.state(), BuildState::Done);

	let tree = builder.into_tree().unwrap();
	assert_eq!(tree.num_leaves(), 5);
	assert_eq!(tree.num_internal(), 4);
	assert_eq!(tree.nodes().iter().filter(|x| x.active).count(), 1);
	assert!(tree.root().active);
	let expected = [
		"2|3|4|0|1",
		"+-- 2|3",
		"|   +-- 2",
		"|   `-- 3",
		"`-- 4|0|1",
		"    +-- 4",
		"    `-- 0|1",
		"        +-- 0",
		"        `-- 1",
	];
	assert_eq!(tree.ascii(), format!("{}\n", expected.join("\n")));
}

#[test]
fn test_every_merge_applies_the_reduction_formula() {
	let mut builder = builder_for(SequenceSet::from_sequences(FIXTURE.iter()));
	while builder.active_count() > 1 {
		let before = builder.matrix().clone();
		let active_before = builder.active().to_vec();
		let record = builder.step().unwrap();
		let i = active_before.iter().position(|&x| x == record.left).unwrap();
		let j = active_before.iter().position(|&x| x == record.right).unwrap();
		assert_eq!(before.get(i, j), record.distance);

		let after = builder.matrix();
		assert_eq!(after.dim(), before.dim() - 1);
		assert_eq!(after.dim(), builder.active_count());
		assert!(after.is_symmetric());
		assert_eq!(*builder.active().last().unwrap(), record.node);

		let new_row = after.dim() - 1;
		for (row, node) in builder.active()[..new_row].iter().enumerate() {
			let k = active_before.iter().position(|x| x == node).unwrap();
			let expected = (before.get(i, k) + before.get(j, k) - before.get(i, j)) / 2;
			assert_eq!(after.get(row, new_row), expected);
			for (col, other) in builder.active()[..new_row].iter().enumerate() {
				let l = active_before.iter().position(|x| x == other).unwrap();
				assert_eq!(after.get(row, col), before.get(k, l));
			}
		}
	}
}

#[test]
fn test_random_inputs_merge_n_minus_one_times() {
	let mut rng = StdRng::from_seed([3; 32]);
	let base = Uniform::new(0usize, 4);
	for _ in 0..8 {
		let count = rng.sample(Uniform::new_inclusive(2usize, 9));
		let sequences: Vec<String> = (0..count)
			.map(|_| {
				let len = rng.sample(Uniform::new_inclusive(1usize, 12));
				(0..len).map(|_| ['A', 'C', 'G', 'T'][rng.sample(base)]).collect()
			})
			.collect();
		let set = SequenceSet::from_sequences(sequences.clone());
		let ids = set.id_list();
		let mut builder = builder_for(set);
		builder.run().unwrap();
		assert_eq!(builder.history().len(), count - 1);
		assert_eq!(builder.active_count(), 1);

		let tree = builder.into_tree().unwrap();
		assert_well_formed(&tree, &ids);

		let result = ProgressiveAligner::default().align(&tree).unwrap();
		let degapped: Vec<String> = result.alignment.degap().iter().map(|x| x.as_string()).collect();
		assert_eq!(degapped, sequences);
		assert!(result.alignment.members.iter().all(|x| x.len() == result.alignment.len()));
	}
}

#[test]
fn test_identical_inputs_are_deterministic() {
	let run = || {
		let mut builder = builder_for(SequenceSet::from_sequences(FIXTURE.iter()));
		builder.run().unwrap();
		let history = builder.history().to_vec();
		(history, builder.into_tree().unwrap().serialize_newick())
	};
	let (first_history, first_newick) = run();
	for _ in 0..5 {
		let (history, newick) = run();
		assert_eq!(history, first_history);
		assert_eq!(newick, first_newick);
	}
}

#[test]
fn test_map_input_is_ordered_by_identifier() {
	let mut map = HashMap::new();
	for (id, seq) in ["e", "d", "c", "b", "a"].iter().zip(FIXTURE.iter()) {
		map.insert(id.to_string(), seq.to_string());
	}
	let set = SequenceSet::from_map(&map).unwrap();
	assert_eq!(set.id_list(), vec!["a", "b", "c", "d", "e"]);
	let ids = set.id_list();

	let tree = builder_for(set).build().unwrap();
	assert_well_formed(&tree, &ids);
	let repeat = builder_for(SequenceSet::from_map(&map).unwrap()).build().unwrap();
	assert_eq!(tree.serialize_newick(), repeat.serialize_newick());
}

#[test]
fn test_labels_with_distance_matrix() {
	let matrix = DistanceMatrix::from_rows(vec![
		vec![0, 2, 6],
		vec![2, 0, 6],
		vec![6, 6, 0],
	]).unwrap();
	let labels: Vec<String> = vec!["human".to_string(), "chimp".to_string(), "mouse".to_string()];
	let tree = GuideTreeBuilder::from_distances(labels.clone(), matrix).unwrap().build().unwrap();
	assert_eq!(tree.serialize_newick(), "(mouse,(human,chimp)human|chimp:1)mouse|human|chimp:2;");
	assert_well_formed(&tree, &labels);

	// Leaves built from a bare matrix have nothing to align.
	for schedule in &[Schedule::Tree, Schedule::LeftFold] {
		let result = ProgressiveAligner::new(PairwiseAligner::default(), *schedule).align(&tree);
		assert!(matches!(result, Err(Error::InvalidInput(_))));
	}
}

#[test]
fn test_identifiers_with_notation_characters_are_rejected() {
	let ids: Vec<String> = vec!["a,b".to_string(), "c)".to_string(), "d".to_string()];
	let sequences: Vec<String> = FIXTURE[..3].iter().map(|x| x.to_string()).collect();
	assert!(matches!(SequenceSet::from_parts(ids, sequences.clone()), Err(Error::InvalidInput(_))));

	let ids: Vec<String> = vec!["seq_a".to_string(), "seq.b".to_string(), "seq-c".to_string()];
	let set = SequenceSet::from_parts(ids.clone(), sequences).unwrap();
	let tree = builder_for(set).build().unwrap();
	assert_well_formed(&tree, &ids);
}

#[test]
fn test_degenerate_inputs() {
	let empty = SequenceSet::from_sequences(Vec::<String>::new());
	let err = GuideTreeBuilder::new(empty, &PairwiseAligner::default(), ClusterCriterion::default()).unwrap_err();
	assert!(matches!(err, Error::InvalidInput(_)));

	let mut single = builder_for(SequenceSet::from_sequences(vec!["ACGT"]));
	assert_eq!(single.run().unwrap(), 0);
	assert!(single.history().is_empty());
	let tree = single.into_tree().unwrap();
	assert_eq!(tree.num_nodes(), 1);
	assert_eq!(tree.alignment_order(), vec!["0"]);
}
