//! Cortical - Hierarchical Temporal Memory Region Engine
//!
//! Cortical is an online, unsupervised sequence learner modeled on the
//! neocortex. A region consumes a stream of sparse binary vectors and
//! produces, at each step, a new sparse representation of the current
//! input and a prediction of the next input's representation.
//!
//! # Key Characteristics
//!
//! - Memory-efficient bit-packed pattern processing
//! - Permanence-based synaptic plasticity with homeostatic boosting
//! - Spatial pooling: top-k column selection over proximal dendrites
//! - Temporal pooling: per-cell context via distal dendrite segments
//!
//! # Architecture
//!
//! The engine is built from four tightly coupled layers, leaves first:
//!
//! - **Bitset**: fixed-length bit container with word-level bulk operations
//! - **PermanenceMap / segments**: sparse synapse strengths with derived
//!   connectivity, and the narrow/broaden/weaken learning operators
//! - **Column**: one proximal segment shared by a group of cells, one
//!   distal segment group per cell
//! - **Region**: top-k selection, activate/burst, predict, and the
//!   learning-state bookkeeping
//!
//! # Examples
//!
//! ```
//! use cortical::{Bitset, Region, RegionParameters};
//!
//! let mut region = Region::new(RegionParameters {
//!     name: "L1".to_string(),
//!     learning: true,
//!     height: 8,
//!     width: 64,
//!     input_length: 64,
//!     maximum_firing_columns: 2,
//!     minimum_input_overlap: 1,
//!     seed: 42,
//! });
//! region.randomize_columns(2);
//!
//! let mut input = Bitset::new(64);
//! input.set(1).unwrap();
//! region.consume_input(&input).unwrap();
//!
//! // The output is the union of active and predicted cells.
//! assert_eq!(*region.output(), {
//!     let mut union = region.active_state().clone();
//!     union.or(region.predictive_state()).unwrap();
//!     union
//! });
//! ```
//!
//! # Tracing
//!
//! The engine emits `log::trace!` lines describing each step. With no
//! logger installed the calls cost nothing; install any `log`-compatible
//! logger and enable the `TRACE` level to watch the region work.
//!
//! # Safety
//!
//! Hot paths bound-check with `debug_assert!`, giving full validation in
//! development and zero-cost checks in release builds. Everything else
//! goes through the fallible `Result` API.

pub mod bitset;
pub mod column;
pub mod cycle_history;
pub mod error;
pub mod region;
pub mod segment;
pub mod sensor;

pub use bitset::{Bitset, SetBits, Word, BITS_PER_WORD};
pub use column::Column;
pub use cycle_history::CycleHistory;
pub use error::{CorticalError, Result};
pub use region::{Region, RegionParameters};
pub use segment::{
    DendriteSegment, DistalSegment, DistalSegmentGroup, PermanenceConfig, PermanenceMap,
    SegmentUpdate, ACTIVITY_WINDOW,
};
pub use sensor::{CategorySensor, Encoder, ScalarSensor};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name
pub const NAME: &str = "Cortical";

/// Get version string
pub fn version() -> String {
    format!("{} v{}", NAME, VERSION)
}
