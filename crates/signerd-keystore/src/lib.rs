//! `signerd-keystore` — indexed container for HSM-backed private keys.
//!
//! The signing pipeline resolves the keys named by a zone's signing
//! configuration into per-session handles; this store maps the integer
//! index handed out at key creation to the underlying key object. The
//! store owns its keys: dropping it at session teardown releases every
//! remaining handle.

/// Ordered index → key container.
///
/// Duplicate indices are allowed; lookup and removal act on the first
/// match in insertion order, and removing an unknown index is a no-op.
pub struct KeyStore<K> {
    entries: Vec<(i32, K)>,
}

impl<K> KeyStore<K> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a key under `index`, after every existing entry.
    pub fn add_key(&mut self, index: i32, key: K) {
        self.entries.push((index, key));
    }

    /// First key stored under `index`, if any.
    pub fn get_key(&self, index: i32) -> Option<&K> {
        self.entries
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, key)| key)
    }

    pub fn get_key_mut(&mut self, index: i32) -> Option<&mut K> {
        self.entries
            .iter_mut()
            .find(|(i, _)| *i == index)
            .map(|(_, key)| key)
    }

    /// Remove (and drop) the first key stored under `index`. Removing an
    /// index that is not present does nothing.
    pub fn remove_key(&mut self, index: i32) {
        if let Some(pos) = self.entries.iter().position(|(i, _)| *i == index) {
            self.entries.remove(pos);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &K)> {
        self.entries.iter().map(|(i, key)| (*i, key))
    }
}

impl<K> Default for KeyStore<K> {
    fn default() -> Self {
        Self::new()
    }
}
