//! A scalar sensor driving a region, step by step.
//!
//! Generates a dripping-faucet series of values, encodes each one, and
//! dumps the sensed bits and the region's cell state after every step.
//! Run with `RUST_LOG`-style tracing by installing any `log` logger; the
//! engine's trace lines show the winner selection and learning phases.

use cortical::{Encoder, Region, RegionParameters, Result, ScalarSensor};

fn main() -> Result<()> {
    let mut sensor = ScalarSensor::new(64, 2, 0.0, 12000.0)?;
    let mut region = Region::new(RegionParameters {
        name: "0-drip".to_string(),
        learning: true,
        height: 9,
        width: 100,
        input_length: 64,
        maximum_firing_columns: 3,
        minimum_input_overlap: 1,
        seed: 1979,
    });
    region.randomize_columns(2);

    let mut drops = Vec::new();
    for i in 0..10u64 {
        let den = (i * i).max(1);
        drops.push((100_000 / den % 12_000) as i64);
    }

    let mut stdout = std::io::stdout();
    for step in 0..30 {
        let value = drops[step % drops.len()];
        println!("\n>>> step {}: drop = {}", step + 1, value);
        sensor.encode(value)?;
        Encoder::<i64>::get(&sensor).print(16, &mut stdout)?;
        region.consume_input(Encoder::<i64>::get(&sensor))?;
        region.print(&mut stdout)?;
        if let Some(decoded) = sensor.decode_int(&region.predicted_input()?) {
            println!("predicted next drop ~ {}", decoded);
        }
    }
    Ok(())
}
