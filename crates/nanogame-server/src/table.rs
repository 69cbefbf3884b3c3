//! Bounded connection storage with O(1) insert and swap-remove.
//!
//! Values live in a dense vector so iteration touches only live entries.
//! Removing an entry moves the last one into its place, so positions are not
//! stable; callers hold a [`ConnectionId`] instead, which stays valid until
//! its own entry is removed and is detected as stale afterwards.

use std::fmt;

/// Handle to an entry in a [`ConnectionTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId {
    key: u32,
    generation: u32,
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.key, self.generation)
    }
}

/// Returned by [`ConnectionTable::insert`] when the table is full; carries the
/// rejected value back to the caller.
#[derive(Debug)]
pub struct TableFull<T>(pub T);

#[derive(Debug, Clone, Copy)]
struct KeySlot {
    generation: u32,
    /// Position in the dense storage while the key is in use.
    index: Option<usize>,
}

pub struct ConnectionTable<T> {
    capacity: usize,
    entries: Vec<(u32, T)>,
    keys: Vec<KeySlot>,
    free: Vec<u32>,
}

impl<T> ConnectionTable<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
            keys: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn insert(&mut self, value: T) -> Result<ConnectionId, TableFull<T>> {
        if self.is_full() {
            return Err(TableFull(value));
        }
        let index = self.entries.len();
        let key = match self.free.pop() {
            Some(key) => key,
            None => {
                self.keys.push(KeySlot {
                    generation: 0,
                    index: None,
                });
                (self.keys.len() - 1) as u32
            }
        };
        let slot = &mut self.keys[key as usize];
        slot.index = Some(index);
        self.entries.push((key, value));
        Ok(ConnectionId {
            key,
            generation: slot.generation,
        })
    }

    fn index_of(&self, id: ConnectionId) -> Option<usize> {
        let slot = self.keys.get(id.key as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.index
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: ConnectionId) -> Option<&T> {
        let index = self.index_of(id)?;
        Some(&self.entries[index].1)
    }

    pub fn get_mut(&mut self, id: ConnectionId) -> Option<&mut T> {
        let index = self.index_of(id)?;
        Some(&mut self.entries[index].1)
    }

    /// Remove an entry and hand it back. The last entry moves into the freed
    /// position; every other id keeps resolving to its own value.
    pub fn remove(&mut self, id: ConnectionId) -> Option<T> {
        let index = self.index_of(id)?;
        let (_, value) = self.entries.swap_remove(index);
        if let Some((moved_key, _)) = self.entries.get(index) {
            self.keys[*moved_key as usize].index = Some(index);
        }
        let slot = &mut self.keys[id.key as usize];
        slot.index = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.key);
        Some(value)
    }

    /// Snapshot of the live ids, safe to iterate while removing.
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.entries
            .iter()
            .map(|(key, _)| ConnectionId {
                key: *key,
                generation: self.keys[*key as usize].generation,
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().map(|(_, value)| value)
    }
}
