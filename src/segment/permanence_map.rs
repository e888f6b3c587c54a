//! Permanence map - sparse synapse strengths with derived connectivity.
//!
//! Each potential synapse is binary (connected or not), but the durability
//! of the connection is a real value in `[0.0, 1.0]`: synapses that
//! activate often are strengthened, unused ones decay. Above a threshold a
//! synapse counts as connected; below a minimum it is dropped from the map
//! entirely to contain memory growth.

use std::fmt;

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::bitset::Bitset;
use crate::error::Result;

/// Immutable per-map learning parameters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PermanenceConfig {
    /// Permanence at or above which a synapse is connected.
    pub threshold: f32,
    /// Permanence given to newly created synapses. Slightly above the
    /// threshold so fresh segments start out connected.
    pub initial: f32,
    /// Permanence below which a synapse is removed from the map.
    pub minimum: f32,
    /// Reinforcement step for active synapses.
    pub increment: f32,
    /// Decay step for inactive or punished synapses.
    pub decrement: f32,
}

impl Default for PermanenceConfig {
    fn default() -> Self {
        Self {
            threshold: 0.60,
            initial: 0.66,
            minimum: 0.30,
            increment: 0.05,
            decrement: 0.05,
        }
    }
}

/// Sparse map from bit index to permanence, with derived bitsets.
///
/// Invariants, maintained by every mutation:
///
/// - index `k` is in the map iff its permanence is at least
///   `config.minimum`;
/// - `connected[k]` iff the permanence is at least `config.threshold`;
/// - `receptive_field[k]` iff `k` is in the map;
/// - stored permanences are clamped to `[0.0, 1.0]`.
#[derive(Clone, Debug)]
pub struct PermanenceMap {
    config: PermanenceConfig,
    permanence: FxHashMap<usize, f32>,
    connected: Bitset,
    receptive_field: Bitset,
}

impl PermanenceMap {
    /// Create an empty map over `num_bits` potential synapses.
    pub fn new(num_bits: usize) -> Self {
        Self::with_config(num_bits, PermanenceConfig::default())
    }

    /// Create an empty map with explicit parameters.
    pub fn with_config(num_bits: usize, config: PermanenceConfig) -> Self {
        Self {
            config,
            permanence: FxHashMap::default(),
            connected: Bitset::new(num_bits),
            receptive_field: Bitset::new(num_bits),
        }
    }

    /// Create a map with every set bit of `bits` at the initial permanence.
    pub fn from_bits(bits: &Bitset) -> Self {
        let mut map = Self::new(bits.len());
        let initial = map.config.initial;
        for k in bits.iter_set() {
            map.set(k, initial);
        }
        map
    }

    /// The learning parameters.
    pub fn config(&self) -> PermanenceConfig {
        self.config
    }

    /// The number of potential synapses.
    pub fn len(&self) -> usize {
        self.connected.len()
    }

    /// Whether the input space is empty.
    pub fn is_empty(&self) -> bool {
        self.connected.is_empty()
    }

    /// The number of synapses currently in the map.
    pub fn num_synapses(&self) -> usize {
        self.permanence.len()
    }

    /// Drop all synapses, then insert each listed index at the initial
    /// permanence.
    pub fn reset(&mut self, connected: &[usize]) {
        if !self.permanence.is_empty() {
            self.permanence.clear();
            self.connected.reset();
            self.receptive_field.reset();
        }
        let initial = self.config.initial;
        for &k in connected {
            self.set(k, initial);
        }
    }

    /// The permanence of synapse `k`, or `0.0` when absent.
    pub fn get(&self, k: usize) -> f32 {
        self.permanence.get(&k).copied().unwrap_or(0.0)
    }

    /// Store a permanence, clamping to `[0.0, 1.0]` and re-deriving both
    /// bitsets. Values below the minimum remove the synapse.
    pub fn set(&mut self, k: usize, v: f32) {
        let v = v.clamp(0.0, 1.0);
        if v < self.config.minimum {
            self.connected.assign(k, false);
            self.receptive_field.assign(k, false);
            self.permanence.remove(&k);
            return;
        }
        self.permanence.insert(k, v);
        self.receptive_field.assign(k, true);
        self.connected.assign(k, v >= self.config.threshold);
    }

    /// The synapses at or above the connection threshold.
    pub fn connected(&self) -> &Bitset {
        &self.connected
    }

    /// Every synapse the map currently knows about, connected or not.
    pub fn receptive_field(&self) -> &Bitset {
        &self.receptive_field
    }

    /// Count of input bits matching the connected synapses, or the whole
    /// receptive field when `weak`.
    pub fn overlap(&self, input: &Bitset, weak: bool) -> Result<usize> {
        if weak {
            self.receptive_field.overlap(input)
        } else {
            self.connected.overlap(input)
        }
    }

    /// Hebbian reinforcement toward `input`: synapses present in the input
    /// grow by the increment, absent ones decay by the decrement.
    pub fn narrow(&mut self, input: &Bitset) {
        let keys: Vec<usize> = self.permanence.keys().copied().collect();
        for k in keys {
            let mut v = self.get(k);
            if input.is_set(k) {
                v += self.config.increment;
            } else {
                v -= self.config.decrement;
            }
            self.set(k, v);
        }
    }

    /// Punish the synapses present in `input` by the decrement. Used on
    /// incorrectly predicted transitions.
    pub fn weaken(&mut self, input: &Bitset) {
        let keys: Vec<usize> = self.permanence.keys().copied().collect();
        for k in keys {
            let mut v = self.get(k);
            if input.is_set(k) {
                v -= self.config.decrement;
            }
            self.set(k, v);
        }
    }

    /// Raise every synapse listed in `input` to at least `new_permanence`,
    /// returning how many were already connected on entry.
    pub fn broaden_through(&mut self, new_permanence: f32, input: &Bitset) -> Result<usize> {
        let connected_before = self.connected.overlap(input)?;
        for k in input.iter_set() {
            if self.get(k) < new_permanence {
                self.set(k, new_permanence);
            }
        }
        Ok(connected_before)
    }

    /// Multiply every permanence by `factor`, re-deriving the bitsets.
    pub fn scale(&mut self, factor: f32) {
        let keys: Vec<usize> = self.permanence.keys().copied().collect();
        for k in keys {
            let v = self.get(k);
            self.set(k, v * factor);
        }
    }
}

impl fmt::Display for PermanenceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}/{} connected)",
            self.connected.num_set_bits(),
            self.receptive_field.num_set_bits()
        )
    }
}
