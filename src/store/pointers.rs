//! Pointer Store
//!
//! Client-side mirror of the server's pointer set for the multi-pointer
//! page. Keeps arrival order so chips and markers stay stable.

use chrono::{DateTime, Utc};

use crate::model::{Pointer, PointerPatch};
use crate::protocol::ServerEvent;

/// Currently tracked pointers
#[derive(Debug, Clone, Default)]
pub struct PointerStore {
    pointers: Vec<Pointer>,
    last_update: Option<DateTime<Utc>>,
}

impl PointerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointers(&self) -> &[Pointer] {
        &self.pointers
    }

    pub fn get(&self, id: &str) -> Option<&Pointer> {
        self.pointers.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    /// When the set last changed
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// Replace the whole set (`pointers`)
    pub fn replace_all(&mut self, pointers: Vec<Pointer>) {
        self.pointers = pointers;
        self.touch();
    }

    /// Insert a pointer, replacing one with the same id (`pointerAdded`)
    pub fn add(&mut self, pointer: Pointer) {
        match self.pointers.iter_mut().find(|p| p.id == pointer.id) {
            Some(existing) => *existing = pointer,
            None => self.pointers.push(pointer),
        }
        self.touch();
    }

    /// Remove by id (`pointerRemoved`); absent ids are a no-op
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.pointers.len();
        self.pointers.retain(|p| p.id != id);
        let removed = self.pointers.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Patch a pointer in place (`pointerMoved`); unknown ids are ignored
    pub fn apply_move(&mut self, patch: &PointerPatch) -> bool {
        let moved = self
            .pointers
            .iter_mut()
            .find(|p| p.id == patch.id)
            .map(|p| p.apply(patch))
            .unwrap_or(false);
        if moved {
            self.touch();
        } else {
            tracing::trace!(id = %patch.id, "Move for untracked pointer ignored");
        }
        moved
    }

    /// Apply one inbound event; returns whether the set changed
    pub fn apply(&mut self, event: &ServerEvent) -> bool {
        match event {
            ServerEvent::Pointers(pointers) => {
                self.replace_all(pointers.clone());
                true
            }
            ServerEvent::PointerAdded(pointer) => {
                self.add(pointer.clone());
                true
            }
            ServerEvent::PointerRemoved(r) => self.remove(&r.id),
            ServerEvent::PointerMoved(patch) => self.apply_move(patch),
            _ => false,
        }
    }

    /// "1 device currently tracked" / "N devices currently tracked"
    pub fn count_label(&self) -> String {
        let n = self.pointers.len();
        format!("{} device{} currently tracked", n, if n == 1 { "" } else { "s" })
    }

    fn touch(&mut self) {
        self.last_update = Some(Utc::now());
    }
}
