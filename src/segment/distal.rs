//! Distal dendrite segments - lateral connections between cells.
//!
//! A distal segment connects a cell to other cells in the same region; a
//! cell owns a group of them plus a queue of pending reinforcement updates
//! that is drained once the outcome of a prediction is known.

use log::trace;
use rand::rngs::StdRng;
use rand::Rng;

use crate::bitset::Bitset;
use crate::error::Result;
use crate::segment::permanence_map::PermanenceMap;

/// A lateral dendrite segment over the region's cell space.
#[derive(Clone, Debug)]
pub struct DistalSegment {
    permanences: PermanenceMap,
}

impl DistalSegment {
    fn from_bits(bits: &Bitset) -> Self {
        Self {
            permanences: PermanenceMap::from_bits(bits),
        }
    }

    /// The cells this segment is connected to.
    pub fn connected(&self) -> &Bitset {
        self.permanences.connected()
    }

    /// The cells in this segment's receptive field.
    pub fn receptive_field(&self) -> &Bitset {
        self.permanences.receptive_field()
    }

    /// The permanence toward cell `k`.
    pub fn get(&self, k: usize) -> f32 {
        self.permanences.get(k)
    }

    /// Count of active cells matching this segment.
    pub fn overlap(&self, state: &Bitset, weak: bool) -> Result<usize> {
        self.permanences.overlap(state, weak)
    }
}

/// A pending reinforcement: which segment to adapt (or create), and the
/// cell bits to adapt it toward.
#[derive(Clone, Debug)]
pub struct SegmentUpdate {
    target: Option<usize>,
    bits: Bitset,
}

impl SegmentUpdate {
    /// The segment index to adapt, or `None` to create a new segment.
    pub fn target(&self) -> Option<usize> {
        self.target
    }

    /// The cell bits the update applies.
    pub fn bits(&self) -> &Bitset {
        &self.bits
    }
}

/// The distal segments of one cell, plus its pending-updates queue.
///
/// Segments are append-only, so indices handed out by
/// [`compute_active`] stay stable.
///
/// [`compute_active`]: DistalSegmentGroup::compute_active
#[derive(Clone, Debug, Default)]
pub struct DistalSegmentGroup {
    segments: Vec<DistalSegment>,
    updates: Vec<SegmentUpdate>,
}

impl DistalSegmentGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self {
            segments: Vec::with_capacity(15),
            updates: Vec::with_capacity(10),
        }
    }

    /// The number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the cell has grown any segments yet.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Borrow segment `i`.
    pub fn segment(&self, i: usize) -> &DistalSegment {
        &self.segments[i]
    }

    /// The best-matching segment against `state`: highest overlap of at
    /// least `min_overlap`, ties broken by lower index. Returns
    /// `(segment index, overlap)`.
    pub fn compute_active(
        &self,
        state: &Bitset,
        min_overlap: usize,
        weak: bool,
    ) -> Result<Option<(usize, usize)>> {
        let mut best: Option<(usize, usize)> = None;
        for (i, segment) in self.segments.iter().enumerate() {
            let overlap = segment.overlap(state, weak)?;
            if overlap >= min_overlap && best.map_or(true, |(_, top)| overlap > top) {
                best = Some((i, overlap));
            }
        }
        Ok(best)
    }

    /// Whether any segment's connected cells match `state` with at least
    /// `min_overlap` bits.
    pub fn has_active_segment(&self, state: &Bitset, min_overlap: usize) -> Result<bool> {
        for segment in &self.segments {
            if segment.connected().overlap(state)? >= min_overlap {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Build a reinforcement toward `state` for segment `target` (`None`
    /// creates a new segment).
    ///
    /// Starts from the target segment's connected cells, ORs in the state,
    /// then pads with uniformly random cells until at least `min_synapses`
    /// bits are set.
    pub fn create_update(
        &self,
        target: Option<usize>,
        state: &Bitset,
        min_synapses: usize,
        rng: &mut StdRng,
    ) -> Result<SegmentUpdate> {
        let mut bits = Bitset::new(state.len());
        if let Some(i) = target {
            bits.reset_to(self.segments[i].connected())?;
        }
        bits.or(state)?;
        while bits.num_set_bits() < min_synapses {
            bits.set(rng.gen_range(0..state.len()))?;
        }
        Ok(SegmentUpdate { target, bits })
    }

    /// Queue an update for a later [`apply_all`].
    ///
    /// [`apply_all`]: DistalSegmentGroup::apply_all
    pub fn add_update(&mut self, update: SegmentUpdate) {
        self.updates.push(update);
    }

    /// Whether any update is pending.
    pub fn has_updates(&self) -> bool {
        !self.updates.is_empty()
    }

    /// Drain the queue, reinforcing (`positive`) or punishing every queued
    /// update.
    pub fn apply_all(&mut self, positive: bool) {
        let mut drained = std::mem::take(&mut self.updates);
        for update in drained.drain(..) {
            self.apply(&update, positive);
        }
        self.updates = drained;
    }

    /// Apply one update: create the segment, or narrow/weaken the target.
    pub fn apply(&mut self, update: &SegmentUpdate, positive: bool) {
        match update.target {
            None => {
                self.segments.push(DistalSegment::from_bits(&update.bits));
            }
            Some(i) => {
                let segment = &mut self.segments[i];
                if positive {
                    segment.permanences.narrow(&update.bits);
                } else {
                    segment.permanences.weaken(&update.bits);
                }
            }
        }
        if let Some(i) = update.target.or_else(|| self.segments.len().checked_sub(1)) {
            trace!(
                "reinforced segment {} (positive={}) => {}",
                i,
                positive,
                self.segments[i].permanences
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn bits(length: usize, indices: &[usize]) -> Bitset {
        let mut b = Bitset::new(length);
        b.set_indices(indices).unwrap();
        b
    }

    fn group_with_segment(length: usize, indices: &[usize]) -> DistalSegmentGroup {
        let mut group = DistalSegmentGroup::new();
        let update = SegmentUpdate {
            target: None,
            bits: bits(length, indices),
        };
        group.apply(&update, true);
        group
    }

    #[test]
    fn test_apply_creates_segment() {
        let group = group_with_segment(128, &[1, 2, 3]);
        assert_eq!(group.len(), 1);
        let segment = group.segment(0);
        assert_eq!(segment.connected().num_set_bits(), 3);
        assert!(segment.connected().is_set(2));
    }

    #[test]
    fn test_compute_active_picks_highest_overlap() {
        let mut group = group_with_segment(128, &[1, 2, 3]);
        let update = SegmentUpdate {
            target: None,
            bits: bits(128, &[1, 2, 3, 4, 5]),
        };
        group.apply(&update, true);

        let state = bits(128, &[1, 2, 3, 4, 5]);
        assert_eq!(group.compute_active(&state, 1, false).unwrap(), Some((1, 5)));

        // Ties go to the lower index.
        let tied = bits(128, &[1, 2, 3]);
        assert_eq!(group.compute_active(&tied, 1, false).unwrap(), Some((0, 3)));
    }

    #[test]
    fn test_compute_active_requires_min_overlap() {
        let group = group_with_segment(128, &[1, 2, 3]);
        let state = bits(128, &[3, 60, 61]);
        assert_eq!(group.compute_active(&state, 2, false).unwrap(), None);
        assert_eq!(group.compute_active(&state, 1, false).unwrap(), Some((0, 1)));
    }

    #[test]
    fn test_compute_active_weak_selects_receptive_field_match() {
        // Two segments grown from queued updates: one over {1, 10}, one
        // over {2, 20}.
        let mut group = DistalSegmentGroup::new();
        let mut rng = StdRng::seed_from_u64(42);
        let u1 = group.create_update(None, &bits(64, &[1, 10]), 2, &mut rng).unwrap();
        let u2 = group.create_update(None, &bits(64, &[2, 20]), 2, &mut rng).unwrap();
        group.add_update(u1);
        group.add_update(u2);

        let active = bits(64, &[10]);
        assert!(!group.has_active_segment(&active, 1).unwrap());
        group.apply_all(true);
        assert!(group.has_active_segment(&active, 1).unwrap());
        assert_eq!(group.compute_active(&active, 1, false).unwrap(), Some((0, 1)));

        // Disconnect bits 2 and 20 in segment 1; they stay in its
        // receptive field.
        let minimum = group.segments[1].permanences.config().minimum;
        group.segments[1].permanences.set(2, minimum);
        group.segments[1].permanences.set(20, minimum);

        // This state is weakly better matched by segment 1 but strongly
        // by segment 0, so the flag flips which segment is selected.
        let state = bits(64, &[1, 2, 20]);
        assert_eq!(group.compute_active(&state, 1, true).unwrap(), Some((1, 2)));
        assert_eq!(group.compute_active(&state, 1, false).unwrap(), Some((0, 1)));
    }

    #[test]
    fn test_has_active_segment() {
        let group = group_with_segment(128, &[1, 2, 3]);
        let state = bits(128, &[2, 3]);
        assert!(group.has_active_segment(&state, 2).unwrap());
        assert!(!group.has_active_segment(&state, 3).unwrap());
    }

    #[test]
    fn test_create_update_pads_to_min_synapses() {
        let group = DistalSegmentGroup::new();
        let mut rng = StdRng::seed_from_u64(42);
        let state = bits(128, &[7]);
        let update = group.create_update(None, &state, 5, &mut rng).unwrap();
        assert!(update.bits().num_set_bits() >= 5);
        assert!(update.bits().is_set(7));
        assert_eq!(update.target(), None);
    }

    #[test]
    fn test_create_update_starts_from_target_connections() {
        let group = group_with_segment(128, &[1, 2, 3]);
        let mut rng = StdRng::seed_from_u64(42);
        let state = bits(128, &[9]);
        let update = group.create_update(Some(0), &state, 1, &mut rng).unwrap();
        assert!(update.bits().all_set(&[1, 2, 3, 9]));
        assert_eq!(update.target(), Some(0));
    }

    #[test]
    fn test_apply_all_drains_queue() {
        let mut group = group_with_segment(128, &[1, 2, 3]);
        let mut rng = StdRng::seed_from_u64(42);
        let state = bits(128, &[1, 2]);
        let update = group.create_update(Some(0), &state, 1, &mut rng).unwrap();
        group.add_update(update);
        assert!(group.has_updates());

        let initial = group.segment(0).get(1);
        group.apply_all(true);
        assert!(!group.has_updates());
        assert!(group.segment(0).get(1) > initial);
    }

    #[test]
    fn test_apply_negative_weakens() {
        let mut group = group_with_segment(128, &[1, 2, 3]);
        let state = bits(128, &[1]);
        let update = SegmentUpdate {
            target: Some(0),
            bits: state,
        };
        let initial = group.segment(0).get(1);
        let untouched = group.segment(0).get(2);
        group.apply(&update, false);
        assert!(group.segment(0).get(1) < initial);
        assert_eq!(group.segment(0).get(2), untouched);
    }
}
