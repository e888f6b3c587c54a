//! Column - a group of cells sharing one proximal segment.
//!
//! Every cell of a column sees the same feed-forward input through the
//! shared proximal dendrite, but carries its own distal segment group, so
//! different cells can represent the same input in different temporal
//! contexts.

use std::fmt;
use std::io::Write;

use rand::rngs::StdRng;

use crate::bitset::Bitset;
use crate::error::Result;
use crate::segment::{DendriteSegment, DistalSegmentGroup};

/// One cortical column: proximal segment, per-cell distal groups, and the
/// local activation/prediction/learning state.
pub struct Column {
    index: usize,
    proximal: DendriteSegment,

    /// Cells firing this step.
    active: Bitset,
    /// Cells predicted to fire next step.
    predictive: Bitset,

    /// Cell chosen for learning this step, if any.
    learning: Option<usize>,
    /// Round-robin pointer for distributing new sequence segments.
    learning_target: usize,

    /// One distal segment group per cell.
    distal: Vec<DistalSegmentGroup>,
}

impl Column {
    /// Create column `index` with `height` cells over `input_length` input
    /// bits.
    pub fn new(input_length: usize, height: usize, index: usize) -> Self {
        Self {
            index,
            proximal: DendriteSegment::new(input_length),
            active: Bitset::new(height),
            predictive: Bitset::new(height),
            learning: None,
            learning_target: 0,
            distal: (0..height).map(|_| DistalSegmentGroup::new()).collect(),
        }
    }

    /// This column's position in its region.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cells per column.
    pub fn height(&self) -> usize {
        self.active.len()
    }

    /// The region-global id of cell `cell`.
    pub fn cell_id(&self, cell: usize) -> usize {
        self.index * self.height() + cell
    }

    /// The connected synapses of the proximal segment.
    pub fn connected(&self) -> &Bitset {
        self.proximal.connected()
    }

    /// The proximal segment.
    pub fn proximal(&self) -> &DendriteSegment {
        &self.proximal
    }

    /// The distal segment group of cell `cell`.
    pub fn distal(&self, cell: usize) -> &DistalSegmentGroup {
        &self.distal[cell]
    }

    /// Cells firing this step.
    pub fn active_cells(&self) -> &Bitset {
        &self.active
    }

    /// Cells predicted for the next step.
    pub fn predictive_cells(&self) -> &Bitset {
        &self.predictive
    }

    /// The homeostatic boost added to this column's overlap score.
    pub fn boost(&self) -> f32 {
        self.proximal.boost
    }

    /// Set the homeostatic boost.
    pub fn set_boost(&mut self, boost: f32) {
        self.proximal.boost = boost;
    }

    /// The cell chosen for learning this step.
    pub fn learning_cell(&self) -> Option<usize> {
        self.learning
    }

    /// The region-global id of the learning cell.
    pub fn learning_cell_id(&self) -> Option<usize> {
        self.learning.map(|cell| self.cell_id(cell))
    }

    /// Reconnect the proximal segment to the listed input bits.
    pub fn reset_connections(&mut self, connected: &[usize]) {
        self.proximal.reset(connected);
    }

    pub(crate) fn clear_active(&mut self) {
        self.active.reset();
    }

    /// Temporal pooler phase 1: activate the predicted cells, or burst the
    /// whole column when none were predicted.
    pub fn activate(&mut self) -> Result<()> {
        if !self.predictive.is_zero() {
            self.active.reset_to(&self.predictive)
        } else {
            self.active.set_range(0, self.height())
        }
    }

    /// Temporal pooler phase 2: mark each cell whose distal segments match
    /// the region's active state.
    pub fn predict(&mut self, region_active: &Bitset, min_overlap: usize) -> Result<()> {
        self.predictive.reset();
        for cell in 0..self.height() {
            if self.distal[cell].has_active_segment(region_active, min_overlap)? {
                self.predictive.assign(cell, true);
            }
        }
        Ok(())
    }

    /// The best matching distal segment across all cells, as
    /// `(cell, segment, overlap)`. First cell wins ties; stops early once
    /// the overlap covers the whole state.
    pub fn find_best_segment(
        &self,
        state: &Bitset,
        min_overlap: usize,
        weak: bool,
    ) -> Result<Option<(usize, usize, usize)>> {
        let target = state.num_set_bits();
        let mut best: Option<(usize, usize, usize)> = None;
        for cell in 0..self.height() {
            if let Some((segment, overlap)) =
                self.distal[cell].compute_active(state, min_overlap, weak)?
            {
                if best.map_or(true, |(_, _, top)| overlap > top) {
                    best = Some((cell, segment, overlap));
                    if overlap == target {
                        break;
                    }
                }
            }
        }
        Ok(best)
    }

    /// Queue a reinforcement on the cell whose segment best matches the
    /// learning-active state. Returns whether such a segment exists; the
    /// chosen cell becomes this column's learning cell.
    pub fn learn_prediction(
        &mut self,
        learn_active: &Bitset,
        min_overlap: usize,
        rng: &mut StdRng,
    ) -> Result<bool> {
        self.learning = None;
        if let Some((cell, segment, _)) = self.find_best_segment(learn_active, min_overlap, false)? {
            let update =
                self.distal[cell].create_update(Some(segment), learn_active, min_overlap, rng)?;
            self.distal[cell].add_update(update);
            self.learning = Some(cell);
            return Ok(true);
        }
        Ok(false)
    }

    /// Whether this column's learning cell was in the learning-predictive
    /// state of the previous step.
    pub fn confirm_prediction(&self, learn_predictive: &Bitset) -> bool {
        self.learning
            .map_or(false, |cell| learn_predictive.is_set(self.cell_id(cell)))
    }

    /// Learn that the previous learning-active state leads to this column.
    ///
    /// Reinforces the best weakly-matching segment, or grows a new one on
    /// the round-robin target cell. Applied immediately, not queued. On a
    /// cold start (empty previous state) only the learning cell is chosen.
    pub fn learn_sequence(&mut self, last_learn_active: &Bitset, rng: &mut StdRng) -> Result<()> {
        if last_learn_active.is_zero() {
            self.learning = Some(self.learning_target);
            return Ok(());
        }
        let (cell, target) = match self.find_best_segment(last_learn_active, 1, true)? {
            Some((cell, segment, _)) => (cell, Some(segment)),
            None => {
                let cell = self.learning_target;
                self.learning_target = (self.learning_target + 1) % self.height();
                (cell, None)
            }
        };
        let update = self.distal[cell].create_update(target, last_learn_active, 1, rng)?;
        self.distal[cell].apply(&update, true);
        self.learning = Some(cell);
        Ok(())
    }

    /// Drain the learning cell's pending updates, reinforcing when the
    /// prediction came true (the cell fired this step).
    pub fn adapt_segments(&mut self) {
        if let Some(cell) = self.learning {
            let positive = self.active.is_set(cell);
            self.distal[cell].apply_all(positive);
        }
    }

    /// Spatial learning: train the proximal segment on this step's input.
    pub fn learn_from_input(&mut self, input: &Bitset, min_overlap: usize) -> Result<()> {
        self.proximal
            .learn(input, !self.active.is_zero(), min_overlap)
    }

    /// Glyph for cell `cell`: `x` active and predicted, `!` active only,
    /// `o` predicted only, `-` neither.
    pub fn to_char(&self, cell: usize) -> char {
        match (self.active.is_set(cell), self.predictive.is_set(cell)) {
            (true, true) => 'x',
            (true, false) => '!',
            (false, true) => 'o',
            (false, false) => '-',
        }
    }

    /// Render the cells as glyphs, wrapping every `width` columns.
    pub fn print<W: Write>(&self, width: usize, writer: &mut W) -> Result<()> {
        for cell in 0..self.height() {
            write!(writer, "{}", self.to_char(cell))?;
            if (cell + 1) % width == 0 {
                writeln!(writer)?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Column{{index={}, active={}, predicted={}, connected={}}}",
            self.index,
            self.active.num_set_bits(),
            self.predictive.num_set_bits(),
            self.connected()
        )
    }
}
