use std::collections::HashMap;

use crate::errors::GameError;
use crate::player::PlayerId;

/// Cyclic, insertion-ordered collection of entries keyed by player id.
///
/// Membership lives in an arena (`order` + `entries`); rotation is a plain index
/// into `order`. The cursor is unset until the first [`advance`](Self::advance),
/// after which it always points at a live entry, or is unset again once the
/// ring empties.
#[derive(Debug, Clone)]
pub struct PlayerRing<T> {
    order: Vec<PlayerId>,
    entries: HashMap<PlayerId, T>,
    cursor: Option<usize>,
}

impl<T> Default for PlayerRing<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PlayerRing<T> {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
            cursor: None,
        }
    }

    /// Insert at the tail.
    pub fn add_entry(&mut self, id: PlayerId, value: T) -> Result<(), GameError> {
        if self.entries.contains_key(&id) {
            return Err(GameError::DuplicateId(id));
        }
        self.order.push(id.clone());
        self.entries.insert(id, value);
        Ok(())
    }

    /// Remove an entry. If the cursor pointed at it, the cursor moves on to the
    /// entry that followed (wrapping), or becomes unset when nothing is left.
    /// The next [`advance`](Self::advance) steps past that entry, so it loses
    /// its turn as current.
    pub fn remove_entry(&mut self, id: &PlayerId) -> Option<T> {
        let value = self.entries.remove(id)?;
        let Some(index) = self.order.iter().position(|entry| entry == id) else {
            return Some(value);
        };
        self.order.remove(index);

        self.cursor = match self.cursor {
            _ if self.order.is_empty() => None,
            Some(current) if index < current => Some(current - 1),
            Some(current) if index == current => Some(current % self.order.len()),
            other => other,
        };
        Some(value)
    }

    /// Step the cursor forward one position and return the new current entry.
    pub fn advance(&mut self) -> Option<(&PlayerId, &T)> {
        if self.order.is_empty() {
            self.cursor = None;
            return None;
        }
        let next = match self.cursor {
            Some(current) => (current + 1) % self.order.len(),
            None => 0,
        };
        self.cursor = Some(next);
        self.entry_at(next)
    }

    /// Current entry without moving. Before the first advance this is the head.
    pub fn peek(&self) -> Option<(&PlayerId, &T)> {
        self.entry_at(self.cursor.unwrap_or(0))
    }

    pub fn get(&self, id: &PlayerId) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &PlayerId) -> Option<&mut T> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn ids(&self) -> &[PlayerId] {
        &self.order
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &T)> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|value| (id, value)))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.iter().map(|(_, value)| value)
    }

    fn entry_at(&self, index: usize) -> Option<(&PlayerId, &T)> {
        let id = self.order.get(index)?;
        self.entries.get(id).map(|value| (id, value))
    }
}
