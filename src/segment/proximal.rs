//! Proximal dendrite segment - the feed-forward learning unit of a column.
//!
//! Owns a permanence map over the region's input space plus the homeostatic
//! machinery that keeps starved columns alive: an activity boost and two
//! trailing activity histories.

use std::fmt;

use crate::bitset::Bitset;
use crate::cycle_history::CycleHistory;
use crate::error::Result;
use crate::segment::permanence_map::{PermanenceConfig, PermanenceMap};

/// Length of the activation and overlap histories, in steps.
pub const ACTIVITY_WINDOW: usize = 1000;

/// Proximal segment: permanence map, boost, and activity bookkeeping.
///
/// `narrow` sharpens an already-firing column toward its current input;
/// `broaden` slowly enlarges the receptive field of a starved one.
pub struct DendriteSegment {
    permanences: PermanenceMap,

    /// Minimum firing rate for this segment.
    pub min_activity_ratio: f32,
    /// Homeostatic boost added to the column's overlap score and to the
    /// permanence of broadened synapses. Cleared whenever the column fires.
    pub boost: f32,

    overlap_history: CycleHistory,
    activation_history: CycleHistory,
}

impl DendriteSegment {
    /// Create a segment over `num_bits` input bits.
    pub fn new(num_bits: usize) -> Self {
        Self {
            permanences: PermanenceMap::new(num_bits),
            min_activity_ratio: 0.02,
            boost: 0.0,
            overlap_history: CycleHistory::new(ACTIVITY_WINDOW),
            activation_history: CycleHistory::new(ACTIVITY_WINDOW),
        }
    }

    /// Drop all synapses and connect the listed input bits at the initial
    /// permanence.
    pub fn reset(&mut self, connected: &[usize]) {
        self.permanences.reset(connected);
    }

    /// The input-space length.
    pub fn len(&self) -> usize {
        self.permanences.len()
    }

    /// Whether the input space is empty.
    pub fn is_empty(&self) -> bool {
        self.permanences.is_empty()
    }

    /// The connected synapses.
    pub fn connected(&self) -> &Bitset {
        self.permanences.connected()
    }

    /// The receptive field.
    pub fn receptive_field(&self) -> &Bitset {
        self.permanences.receptive_field()
    }

    /// The learning parameters.
    pub fn config(&self) -> PermanenceConfig {
        self.permanences.config()
    }

    /// The permanence of synapse `k`.
    pub fn get(&self, k: usize) -> f32 {
        self.permanences.get(k)
    }

    /// Count of input bits matching the connected synapses (or the whole
    /// receptive field when `weak`).
    pub fn overlap(&self, input: &Bitset, weak: bool) -> Result<usize> {
        self.permanences.overlap(input, weak)
    }

    /// One learning step against `input`.
    ///
    /// An active column narrows onto the input and clears its boost; an
    /// inactive one broadens toward it and, when its firing rate has been
    /// below `min_activity_ratio`, grows the boost.
    pub fn learn(&mut self, input: &Bitset, active: bool, min_overlap: usize) -> Result<()> {
        self.activation_history.record(active);
        if active {
            self.permanences.narrow(input);
            self.boost = 0.0;
        } else {
            self.broaden(input, min_overlap)?;
            if let Some(avg) = self.activation_history.average() {
                if avg < self.min_activity_ratio {
                    self.boost *= 1.05;
                }
            }
        }
        Ok(())
    }

    /// Enlarge the receptive field toward `input`.
    ///
    /// New synapses start at `minimum + boost`, capped at the connection
    /// threshold; existing synapses are only ever raised. When the recent
    /// overlap rate is below `min_activity_ratio`, every permanence grows
    /// by 1%.
    pub fn broaden(&mut self, input: &Bitset, min_overlap: usize) -> Result<()> {
        let config = self.permanences.config();
        let new_permanence = (config.minimum + self.boost).min(config.threshold);
        let overlap_count = self.permanences.broaden_through(new_permanence, input)?;
        self.overlap_history.record(overlap_count >= min_overlap);
        if let Some(avg) = self.overlap_history.average() {
            if avg < self.min_activity_ratio {
                self.permanences.scale(1.01);
            }
        }
        Ok(())
    }
}

impl fmt::Display for DendriteSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let activation = self.activation_history.average().unwrap_or(0.0);
        let overlap = self.overlap_history.average().unwrap_or(0.0);
        write!(
            f,
            "Dendrite{{activation_avg={:.4}, overlap_avg={:.4}, boost={:.6}, perm={}}}",
            activation, overlap, self.boost, self.permanences
        )
    }
}
