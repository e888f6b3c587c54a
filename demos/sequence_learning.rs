//! Temporal sequence learning on a periodic input.
//!
//! Feeds the region the repeating sequence A, A, B and watches its
//! prediction converge: after a B the region expects an A, after a
//! single A another A, and after two consecutive As either an A or a B.

use cortical::{Bitset, Region, RegionParameters, Result};

fn main() -> Result<()> {
    let mut region = Region::new(RegionParameters {
        name: "0-tp".to_string(),
        learning: true,
        height: 8,
        width: 64,
        input_length: 64,
        maximum_firing_columns: 2,
        minimum_input_overlap: 1,
        seed: 304050,
    });
    // Wire column i one-to-one to input bit i so the decoded predictions
    // read directly as input bits.
    for i in 0..64 {
        region.reset_column_synapses(i, &[i]);
    }

    let mut input_a = Bitset::new(64);
    input_a.set(1)?;
    let mut input_b = Bitset::new(64);
    input_b.set(8)?;

    println!("=== Learning the sequence A, A, B ===");
    for cycle in 0..100 {
        region.consume_input(&input_a)?;
        region.consume_input(&input_a)?;
        region.consume_input(&input_b)?;
        if cycle % 20 == 19 {
            println!(
                "cycle {:3}: after B the region predicts {}",
                cycle + 1,
                region.predicted_input()?
            );
        }
    }

    println!("\ninput A = {}", input_a);
    println!("input B = {}", input_b);
    println!("\nafter ...,B   -> predicted {}", region.predicted_input()?);
    region.consume_input(&input_a)?;
    println!("after ...,A   -> predicted {}", region.predicted_input()?);
    region.consume_input(&input_a)?;
    println!("after ...,A,A -> predicted {}", region.predicted_input()?);

    println!();
    let mut stdout = std::io::stdout();
    region.print(&mut stdout)?;
    Ok(())
}
