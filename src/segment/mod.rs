//! Dendrite segments: the synaptic learning units of the region.
//!
//! A segment is a sparse mapping from input-bit index to a real-valued
//! permanence, with two derived bitsets (`connected`, `receptive_field`).
//! The proximal segment connects a column to the external input; distal
//! segments connect a cell laterally to the other cells of its region.

pub mod distal;
pub mod permanence_map;
pub mod proximal;

pub use distal::{DistalSegment, DistalSegmentGroup, SegmentUpdate};
pub use permanence_map::{PermanenceConfig, PermanenceMap};
pub use proximal::{DendriteSegment, ACTIVITY_WINDOW};
