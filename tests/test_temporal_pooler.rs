//! Temporal pooler integration tests.
//!
//! Exercises the full activate/predict/learn loop on a region whose
//! columns are wired one-to-one to the input bits, so every expected
//! state can be written down exactly.

use cortical::{Bitset, Region, RegionParameters};

const WIDTH: usize = 64;
const HEIGHT: usize = 8;

fn bits(length: usize, indices: &[usize]) -> Bitset {
    let mut b = Bitset::new(length);
    b.set_indices(indices).unwrap();
    b
}

/// A region where column `i` senses exactly input bit `i`.
fn identity_region(seed: u64) -> Region {
    let mut region = Region::new(RegionParameters {
        name: "0-tp".to_string(),
        learning: true,
        height: HEIGHT,
        width: WIDTH,
        input_length: WIDTH,
        maximum_firing_columns: 2,
        minimum_input_overlap: 1,
        seed,
    });
    for i in 0..WIDTH {
        region.reset_column_synapses(i, &[i]);
    }
    region
}

#[test]
fn test_learn_a_to_b_stepwise() {
    let mut region = identity_region(1979);
    let input_a = bits(WIDTH, &[1]);
    let input_b = bits(WIDTH, &[8]);
    let cells = WIDTH * HEIGHT;

    // Show A: column 1 bursts, nothing is predicted yet.
    region.consume_input(&input_a).unwrap();
    let mut expected_active = Bitset::new(cells);
    expected_active.set_range(HEIGHT, 2 * HEIGHT).unwrap();
    assert_eq!(*region.active_state(), expected_active);
    assert!(region.predictive_state().is_zero());

    // Show B: column 8 bursts, and its first cell is chosen to learn the
    // A-to-B transition.
    region.consume_input(&input_b).unwrap();
    expected_active.reset();
    expected_active.set_range(8 * HEIGHT, 9 * HEIGHT).unwrap();
    assert_eq!(*region.active_state(), expected_active);
    assert!(region.predictive_state().is_zero());
    let b_cell = region.column(8).cell_id(0);
    assert!(region.learning_active_state().is_set(b_cell));

    // Show A again: column 1 bursts and cell (8, 0) is now predicted.
    region.consume_input(&input_a).unwrap();
    expected_active.reset();
    expected_active.set_range(HEIGHT, 2 * HEIGHT).unwrap();
    assert_eq!(*region.active_state(), expected_active);
    assert_eq!(*region.predictive_state(), bits(cells, &[b_cell]));
    let a_cell = region.column(1).cell_id(0);
    assert!(region.learning_active_state().is_set(a_cell));

    // Show B: the prediction comes true, so only cell (8, 0) activates,
    // and A's learning cell is predicted back.
    region.consume_input(&input_b).unwrap();
    assert_eq!(*region.active_state(), bits(cells, &[b_cell]));
    assert_eq!(*region.predictive_state(), bits(cells, &[a_cell]));
    assert!(region.learning_active_state().is_set(b_cell));
}

#[test]
fn test_learn_aab() {
    let mut region = identity_region(304050);
    let input_a = bits(WIDTH, &[1]);
    let input_b = bits(WIDTH, &[8]);

    for _ in 0..100 {
        region.consume_input(&input_a).unwrap();
        region.consume_input(&input_a).unwrap();
        region.consume_input(&input_b).unwrap();
    }

    let mut a_or_b = input_a.clone();
    a_or_b.or(&input_b).unwrap();

    // After ...,B comes A.
    assert_eq!(region.predicted_input().unwrap(), input_a);

    // After ...,A comes A.
    region.consume_input(&input_a).unwrap();
    assert_eq!(region.predicted_input().unwrap(), input_a);

    // After ...,A,A comes A or B.
    region.consume_input(&input_a).unwrap();
    assert_eq!(region.predicted_input().unwrap(), a_or_b);
}

#[test]
fn test_sensed_input_reflects_winners() {
    let mut region = identity_region(7);
    let input = bits(WIDTH, &[3]);
    region.consume_input(&input).unwrap();
    assert_eq!(region.sensed_input().unwrap(), input);
}

#[test]
fn test_feedback_decodes_bursting_cells() {
    let mut region = identity_region(1979);
    let input_a = bits(WIDTH, &[1]);
    let input_b = bits(WIDTH, &[8]);
    let cells = WIDTH * HEIGHT;

    // Train the A-to-B-to-A loop for a few steps so both columns own
    // distal segments.
    for _ in 0..4 {
        region.consume_input(&input_a).unwrap();
        region.consume_input(&input_b).unwrap();
    }

    // A bursting column decodes to its own connected input bits.
    let mut output_a = Bitset::new(cells);
    output_a.set_range(HEIGHT, 2 * HEIGHT).unwrap();
    assert_eq!(region.feedback(&output_a).unwrap(), input_a);

    let mut output_b = Bitset::new(cells);
    output_b.set_range(8 * HEIGHT, 9 * HEIGHT).unwrap();
    assert_eq!(region.feedback(&output_b).unwrap(), input_b);
}

#[test]
fn test_learning_can_be_disabled() {
    let mut region = identity_region(7);
    region.set_learning(false);
    let input = bits(WIDTH, &[5]);
    region.consume_input(&input).unwrap();
    region.consume_input(&input).unwrap();
    // Without learning no distal segments grow and nothing is predicted.
    assert!(region.predictive_state().is_zero());
    assert!(region.learning_active_state().is_zero());
    // The spatial path still works.
    assert_eq!(region.active_state().num_set_bits(), HEIGHT);
}
