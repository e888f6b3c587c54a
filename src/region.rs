//! Region - the orchestrator of spatial and temporal pooling.
//!
//! A region owns a flat array of columns plus the pooled per-cell state of
//! the whole group. Each step it selects the top-k columns by proximal
//! overlap (spatial pooling), activates their predicted cells or bursts
//! them (temporal pooling phase 1), recomputes every cell's prediction
//! against the fresh active state (phase 2), and exports the union of
//! active and predicted cells as its output.
//!
//! All cells are addressed by the global id `column * height + cell`. The
//! region's state bitsets are pre-allocated at construction and reset in
//! place; the step loop does not allocate.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::io::Write;

use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::bitset::Bitset;
use crate::column::Column;
use crate::error::{CorticalError, Result};

/// Parameters describing a region. Immutable once the region is built,
/// except for the learning flag.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionParameters {
    /// Name of the region, used in trace output.
    pub name: String,
    /// Whether learning is on.
    pub learning: bool,
    /// Number of cells in each column.
    pub height: usize,
    /// Number of columns.
    pub width: usize,
    /// Size of the input, in bits.
    pub input_length: usize,
    /// Maximum number of columns that can fire each step.
    pub maximum_firing_columns: usize,
    /// Minimum overlap between the input and a column's proximal dendrite
    /// to trigger activation.
    pub minimum_input_overlap: usize,
    /// Seed for the region's random number generator.
    pub seed: u64,
}

/// A column index with its boosted overlap score.
#[derive(Clone, Copy, Debug)]
struct ScoredColumn {
    index: usize,
    score: f32,
}

impl PartialEq for ScoredColumn {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredColumn {}

impl PartialOrd for ScoredColumn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredColumn {
    /// Score first; equal scores rank the lower index smaller, so it is
    /// the one a capped min-heap evicts.
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// An HTM cortical region: an online, unsupervised sequence learner over
/// sparse binary inputs.
///
/// # Examples
///
/// ```
/// use cortical::{Bitset, Region, RegionParameters};
///
/// let mut region = Region::new(RegionParameters {
///     name: "L1".to_string(),
///     learning: true,
///     height: 8,
///     width: 64,
///     input_length: 2048,
///     maximum_firing_columns: 2,
///     minimum_input_overlap: 1,
///     seed: 42,
/// });
/// region.randomize_columns(28);
///
/// let mut input = Bitset::new(2048);
/// input.set_range(0, 28).unwrap();
/// region.consume_input(&input).unwrap();
/// assert_eq!(region.output().len(), 64 * 8);
/// ```
pub struct Region {
    params: RegionParameters,
    columns: Vec<Column>,

    output: Bitset,
    active: Bitset,
    last_active: Bitset,
    predictive: Bitset,
    last_predictive: Bitset,
    learn_active_state: Bitset,
    learn_active_state_last: Bitset,
    learn_predictive_state: Bitset,

    scores: BinaryHeap<Reverse<ScoredColumn>>,
    winners: Vec<ScoredColumn>,
    rng: StdRng,
}

impl Region {
    /// Create a region. Columns start with empty proximal segments; call
    /// [`randomize_columns`] or [`reset_column_synapses`] before feeding
    /// input.
    ///
    /// [`randomize_columns`]: Region::randomize_columns
    /// [`reset_column_synapses`]: Region::reset_column_synapses
    pub fn new(params: RegionParameters) -> Self {
        let num_cells = params.width * params.height;
        let columns = (0..params.width)
            .map(|i| Column::new(params.input_length, params.height, i))
            .collect();
        let region = Self {
            rng: StdRng::seed_from_u64(params.seed),
            columns,
            output: Bitset::new(num_cells),
            active: Bitset::new(num_cells),
            last_active: Bitset::new(num_cells),
            predictive: Bitset::new(num_cells),
            last_predictive: Bitset::new(num_cells),
            learn_active_state: Bitset::new(num_cells),
            learn_active_state_last: Bitset::new(num_cells),
            learn_predictive_state: Bitset::new(num_cells),
            scores: BinaryHeap::with_capacity(params.maximum_firing_columns + 1),
            winners: Vec::with_capacity(params.maximum_firing_columns),
            params,
        };
        trace!("region created: {:?}", region.params);
        region
    }

    /// The region's parameters.
    pub fn params(&self) -> &RegionParameters {
        &self.params
    }

    /// The region's name.
    pub fn name(&self) -> &str {
        &self.params.name
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.params.width
    }

    /// Cells per column.
    pub fn height(&self) -> usize {
        self.params.height
    }

    /// Whether learning is on.
    pub fn learning(&self) -> bool {
        self.params.learning
    }

    /// Turn learning on or off.
    pub fn set_learning(&mut self, learning: bool) {
        self.params.learning = learning;
    }

    /// Borrow column `i`.
    pub fn column(&self, i: usize) -> &Column {
        &self.columns[i]
    }

    /// The exported representation: active and predicted cells.
    pub fn output(&self) -> &Bitset {
        &self.output
    }

    /// Cells firing this step.
    pub fn active_state(&self) -> &Bitset {
        &self.active
    }

    /// Cells predicted for the next step.
    pub fn predictive_state(&self) -> &Bitset {
        &self.predictive
    }

    /// The learning subsample of the active state: one cell per winning
    /// column.
    pub fn learning_active_state(&self) -> &Bitset {
        &self.learn_active_state
    }

    /// The learning subsample of the predictive state.
    pub fn learning_predictive_state(&self) -> &Bitset {
        &self.learn_predictive_state
    }

    /// Reset every column's proximal segment to `w` input bits sampled at
    /// random, with a tiny random boost.
    pub fn randomize_columns(&mut self, w: usize) {
        let mut sample = vec![0usize; w];
        for column in &mut self.columns {
            for slot in sample.iter_mut() {
                *slot = self.rng.gen_range(0..self.params.input_length);
            }
            column.reset_connections(&sample);
            column.set_boost(self.rng.gen::<f32>() * 1e-5);
        }
    }

    /// Reset column `i`'s proximal segment to exactly the listed input
    /// bits, with a tiny random boost.
    pub fn reset_column_synapses(&mut self, i: usize, connected: &[usize]) {
        let column = &mut self.columns[i];
        column.reset_connections(connected);
        column.set_boost(self.rng.gen::<f32>() * 1e-5);
    }

    /// Run one step: select winners, activate, predict, export output, and
    /// learn when the learning flag is on.
    ///
    /// Fails only when `input` does not match the region's input length.
    pub fn consume_input(&mut self, input: &Bitset) -> Result<()> {
        if input.len() != self.params.input_length {
            return Err(CorticalError::LengthMismatch {
                expected: self.params.input_length,
                actual: input.len(),
            });
        }
        trace!(
            "============ {} consume(learning={}, input={})",
            self.params.name,
            self.params.learning,
            input
        );

        // Spatial pooling: top-k columns by boosted proximal overlap.
        self.scores.clear();
        for i in 0..self.columns.len() {
            let column = &mut self.columns[i];
            column.clear_active();
            let overlap = column.connected().overlap(input)?;
            if overlap >= self.params.minimum_input_overlap {
                let score = overlap as f32 + column.boost();
                self.scores.push(Reverse(ScoredColumn { index: i, score }));
                if self.scores.len() > self.params.maximum_firing_columns {
                    self.scores.pop();
                }
            }
        }
        self.winners.clear();
        self.winners
            .extend(self.scores.drain().map(|Reverse(el)| el));

        // Temporal pooling phase 1: winning columns activate their
        // predicted cells, or burst.
        self.last_active.reset_to(&self.active)?;
        self.active.reset();
        let height = self.params.height;
        for w in 0..self.winners.len() {
            let index = self.winners[w].index;
            self.columns[index].activate()?;
            self.active
                .set_from_bitset_at(self.columns[index].active_cells(), index * height)?;
        }

        // Phase 2: every cell with a distal segment matching the new
        // active state becomes predictive.
        self.last_predictive.reset_to(&self.predictive)?;
        self.predictive.reset();
        for i in 0..self.columns.len() {
            self.columns[i].predict(&self.active, self.params.minimum_input_overlap)?;
            self.predictive
                .set_from_bitset_at(self.columns[i].predictive_cells(), i * height)?;
        }

        // The output for the next level is the union of active and
        // predicted cells.
        self.output.reset_to(&self.active)?;
        self.output.or(&self.predictive)?;
        trace!(
            "inference finished. output(t)={} active(t)={} predictive(t)={}",
            self.output,
            self.active,
            self.predictive
        );

        if self.params.learning {
            self.learn(input)?;
        }
        Ok(())
    }

    /// Temporal and spatial learning bookkeeping for one step.
    fn learn(&mut self, input: &Bitset) -> Result<()> {
        // Apply the updates queued on the previous step. The sign is
        // whether those cells became active this step.
        for column in &mut self.columns {
            column.adapt_segments();
        }

        // Learn that the last active state predicts this one.
        trace!(
            "learning sequences. lActive(t-1)={} lPredictive(t-1)={}",
            self.learn_active_state,
            self.learn_predictive_state
        );
        self.learn_active_state_last
            .reset_to(&self.learn_active_state)?;
        self.learn_active_state.reset();
        for w in 0..self.winners.len() {
            let index = self.winners[w].index;
            if !self.columns[index].confirm_prediction(&self.learn_predictive_state) {
                self.columns[index]
                    .learn_sequence(&self.learn_active_state_last, &mut self.rng)?;
            }
            if let Some(cell_id) = self.columns[index].learning_cell_id() {
                self.learn_active_state.set(cell_id)?;
            }
        }

        // Select one cell per column to learn the transition from the
        // current input to the next.
        self.learn_predictive_state.reset();
        for i in 0..self.columns.len() {
            if self.columns[i].learn_prediction(
                &self.learn_active_state,
                self.params.minimum_input_overlap,
                &mut self.rng,
            )? {
                if let Some(cell_id) = self.columns[i].learning_cell_id() {
                    self.learn_predictive_state.set(cell_id)?;
                }
            }
        }
        trace!(
            "sequence learning finished. lActive(t)={} lPredictive(t)={}",
            self.learn_active_state,
            self.learn_predictive_state
        );

        // Spatial pooler learning.
        for column in &mut self.columns {
            column.learn_from_input(input, self.params.minimum_input_overlap)?;
        }
        Ok(())
    }

    /// Union of the connected input bits of every column with active
    /// cells: the input the region currently senses.
    pub fn sensed_input(&self) -> Result<Bitset> {
        let mut dest = Bitset::new(self.params.input_length);
        for column in &self.columns {
            if !column.active_cells().is_zero() {
                dest.or(column.connected())?;
            }
        }
        Ok(dest)
    }

    /// Union of the connected input bits of every column with predicted
    /// cells: the input the region expects next.
    pub fn predicted_input(&self) -> Result<Bitset> {
        let mut dest = Bitset::new(self.params.input_length);
        for column in &self.columns {
            if !column.predictive_cells().is_zero() {
                dest.or(column.connected())?;
            }
        }
        Ok(dest)
    }

    /// Decode a higher region's output back into the sensed bits.
    ///
    /// Cells without an active distal segment against `output` were
    /// activated by bursting rather than prediction; their columns'
    /// connected bits make up the decoded input.
    pub fn feedback(&self, output: &Bitset) -> Result<Bitset> {
        let num_cells = self.params.width * self.params.height;
        if output.len() != num_cells {
            return Err(CorticalError::LengthMismatch {
                expected: num_cells,
                actual: output.len(),
            });
        }
        let mut dest = Bitset::new(self.params.input_length);
        for cell_id in output.iter_set() {
            let column = &self.columns[cell_id / self.params.height];
            let cell = cell_id % self.params.height;
            if !column
                .distal(cell)
                .has_active_segment(output, self.params.minimum_input_overlap)?
            {
                dest.or(column.connected())?;
            }
        }
        Ok(dest)
    }

    /// Glyph for cell `cell_id`: `v` active and previously predicted, `!`
    /// active surprise, `o` previously predicted only, `-` quiet.
    pub fn to_char(&self, cell_id: usize) -> char {
        match (
            self.active.is_set(cell_id),
            self.last_predictive.is_set(cell_id),
        ) {
            (true, true) => 'v',
            (true, false) => '!',
            (false, true) => 'o',
            (false, false) => '-',
        }
    }

    /// Render the region's cell state with offset rulers.
    pub fn print<W: Write>(&self, writer: &mut W) -> Result<()> {
        const GROUP: usize = 20;
        const LINE: usize = 80;
        writeln!(
            writer,
            "=== {} (learning: {}) ===",
            self.params.name, self.params.learning
        )?;
        let num_cells = self.params.width * self.params.height;
        for line_start in (0..num_cells).step_by(LINE) {
            for group_start in (line_start..(line_start + LINE).min(num_cells)).step_by(GROUP) {
                write!(writer, "{:<20}", group_start)?;
            }
            writeln!(writer)?;
            for cell_id in line_start..(line_start + LINE).min(num_cells) {
                if cell_id > line_start && cell_id % GROUP == 0 {
                    write!(writer, " ")?;
                }
                write!(writer, "{}", self.to_char(cell_id))?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(())
    }
}
