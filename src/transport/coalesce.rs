//! Move Coalescer
//!
//! Collapses bursts of `pointerMoved` updates into one emission per pointer
//! per flush window. Pending moves are keyed by pointer id; a later move for
//! the same id overwrites the earlier one field by field. Only the first
//! move of a window asks the driver to schedule a flush, so at most one
//! flush is pending at any time.

use std::collections::HashMap;

use crate::model::PointerPatch;

/// Pending-map of pointer moves awaiting the next frame
#[derive(Debug, Default)]
pub struct MoveCoalescer {
    pending: HashMap<String, PointerPatch>,
    /// Ids in first-arrival order within the window
    order: Vec<String>,
    flush_scheduled: bool,
}

impl MoveCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a move
    ///
    /// Returns `true` when the caller must schedule a flush (first move of
    /// the window); `false` when a flush is already pending.
    pub fn push(&mut self, patch: PointerPatch) -> bool {
        match self.pending.get_mut(&patch.id) {
            Some(existing) => existing.merge(patch),
            None => {
                self.order.push(patch.id.clone());
                self.pending.insert(patch.id.clone(), patch);
            }
        }

        if self.flush_scheduled {
            false
        } else {
            self.flush_scheduled = true;
            true
        }
    }

    /// Take every pending move, one per pointer, in first-arrival order
    ///
    /// Closes the window: the next [`push`](Self::push) schedules again.
    pub fn drain(&mut self) -> Vec<PointerPatch> {
        self.flush_scheduled = false;
        let mut pending = std::mem::take(&mut self.pending);
        std::mem::take(&mut self.order)
            .into_iter()
            .filter_map(|id| pending.remove(&id))
            .collect()
    }

    /// Drop pending moves without emitting them (e.g. on disconnect)
    pub fn clear(&mut self) {
        self.pending.clear();
        self.order.clear();
        self.flush_scheduled = false;
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_flush_scheduled(&self) -> bool {
        self.flush_scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LatLng;

    fn mv(id: &str, lat: f64, lng: f64) -> PointerPatch {
        PointerPatch::moved(id, LatLng::new(lat, lng))
    }

    #[test]
    fn test_same_id_collapses_to_last_position() {
        let mut c = MoveCoalescer::new();
        assert!(c.push(mv("a", 1.0, 1.0)));
        assert!(!c.push(mv("a", 2.0, 2.0)));
        assert!(!c.push(mv("a", 3.0, 4.0)));

        let out = c.drain();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].position(), Some(LatLng::new(3.0, 4.0)));
    }

    #[test]
    fn test_any_sequence_yields_one_emission_per_id() {
        let mut c = MoveCoalescer::new();
        let mut flushes = 0;
        for step in 0..50 {
            let id = ["a", "b", "c"][step % 3];
            if c.push(mv(id, step as f64, 0.0)) {
                flushes += 1;
            }
        }
        assert_eq!(flushes, 1);

        let out = c.drain();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].id, "a");
        assert_eq!(out[0].latitude, Some(48.0));
        assert_eq!(out[1].latitude, Some(49.0));
        assert_eq!(out[2].latitude, Some(47.0));
    }

    #[test]
    fn test_drain_reopens_window() {
        let mut c = MoveCoalescer::new();
        assert!(c.push(mv("a", 1.0, 1.0)));
        assert!(c.is_flush_scheduled());
        c.drain();
        assert!(!c.is_flush_scheduled());
        assert_eq!(c.pending_len(), 0);
        assert!(c.push(mv("a", 2.0, 2.0)));
    }

    #[test]
    fn test_partial_moves_merge() {
        let mut c = MoveCoalescer::new();
        let mut named = mv("a", 1.0, 1.0);
        named.device_name = Some("Truck".to_string());
        c.push(named);
        c.push(mv("a", 9.0, 9.0));

        let out = c.drain();
        assert_eq!(out[0].device_name.as_deref(), Some("Truck"));
        assert_eq!(out[0].latitude, Some(9.0));
    }

    #[test]
    fn test_clear() {
        let mut c = MoveCoalescer::new();
        c.push(mv("a", 1.0, 1.0));
        c.clear();
        assert!(c.drain().is_empty());
        assert!(c.push(mv("b", 1.0, 1.0)));
    }
}
