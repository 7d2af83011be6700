//! [`OrderedMap`]: a string-keyed map that remembers insertion order.
//!
//! The map itself is format-agnostic; the JSON codec lives in
//! [`crate::encoder`] and [`crate::decoder`].

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::ops::{Deref, DerefMut};

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::pair::{Pair, PairStore};
use crate::value::Value;

/// Insertion-ordered map from `String` to [`Value`].
///
/// Backed by an `IndexMap`, so lookups are hashed and iteration follows
/// insertion order. `set` on an existing key keeps its position; only
/// decoding repositions duplicated keys (see [`crate::decoder`]).
///
/// The map has no interior mutability. A nested map reached through
/// [`OrderedMap::get_mut`] is a borrow of this map's storage, so edits to it
/// are edits to the parent, and the borrow checker enforces a single writer.
/// [`Clone`] produces fully independent storage.
#[derive(Debug, Clone)]
pub struct OrderedMap {
    store: PairStore,
    escape_html: bool,
}

impl Default for OrderedMap {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for OrderedMap {
    /// Order-sensitive: same keys, same order, equal values.
    fn eq(&self, other: &Self) -> bool {
        self.store == other.store
    }
}

impl OrderedMap {
    pub fn new() -> Self {
        Self {
            store: PairStore::default(),
            escape_html: true,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: PairStore::with_capacity(capacity),
            escape_html: true,
        }
    }

    /// Builds a map from pairs in document order, where a repeated key takes
    /// the value and the position of its last occurrence.
    pub(crate) fn from_decoded(pairs: Vec<Pair>, escape_html: bool) -> Self {
        let (store, dropped) = PairStore::from_pairs(pairs);
        if dropped > 0 {
            trace!(dropped, "repositioned duplicate keys");
        }
        Self { store, escape_html }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.store.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.store.get(key)
    }

    /// Live handle into the map's storage.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.store.get_mut(key)
    }

    /// Inserts or updates. An existing key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.store.upsert(key.into(), value.into());
    }

    /// Removes `key`, shifting later pairs down. Absent keys are a no-op.
    /// For bulk removal prefer [`OrderedMap::retain`], which is a single pass.
    pub fn delete(&mut self, key: &str) -> Option<Value> {
        self.store.remove(key)
    }

    /// Keeps only the pairs for which `keep` returns `true`, in order.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&str, &mut Value) -> bool,
    {
        self.store.retain(keep);
    }

    /// Snapshot of the current key order.
    pub fn keys(&self) -> Vec<String> {
        self.store.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Unordered snapshot of the contents.
    pub fn values(&self) -> HashMap<String, Value> {
        self.store
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.store.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_> {
        IterMut {
            inner: self.store.iter_mut(),
        }
    }

    /// Raw access to the pair sequence as a `Vec<Pair>`. Keys may be edited,
    /// reordered or repeated; the index is rebuilt when the guard drops, with
    /// the last occurrence of a repeated key winning.
    pub fn pairs_mut(&mut self) -> PairsMut<'_> {
        let pairs = self.store.take_pairs();
        PairsMut {
            store: &mut self.store,
            pairs,
        }
    }

    /// Rebuilds the key index from the pair sequence. Duplicate keys keep
    /// their last occurrence. Idempotent.
    pub fn init_values(&mut self) {
        drop(self.pairs_mut());
    }

    /// Reorders the map by sorting its key sequence with `sort`.
    ///
    /// `sort` receives every key in current order and must leave a
    /// permutation of them behind; otherwise the map is left untouched.
    pub fn sort_keys<F>(&mut self, sort: F) -> Result<()>
    where
        F: FnOnce(&mut [String]),
    {
        let mut keys = self.keys();
        sort(&mut keys);
        self.set_keys(&keys)
    }

    /// Reorders pairs with a "less than" predicate over whole pairs, so the
    /// ordering may depend on values. Stable. A predicate that is not a
    /// strict weak order gives an unspecified order but never panics.
    pub fn sort<F>(&mut self, less: F)
    where
        F: FnMut(&Pair, &Pair) -> bool,
    {
        self.store.sort_by_less(less);
    }

    /// Reorders pairs with a comparator over whole pairs. Stable.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Pair, &Pair) -> Ordering,
    {
        self.store
            .sort_by_less(|a, b| compare(a, b) == Ordering::Less);
    }

    /// Adopts an explicit order. `order` must be exactly a permutation of the
    /// current keys.
    pub fn set_keys<S: AsRef<str>>(&mut self, order: &[S]) -> Result<()> {
        let positions = match self.permutation(order) {
            Ok(positions) => positions,
            Err(err) => {
                debug!(error = %err, "rejected key order");
                return Err(err);
            }
        };
        self.store.permute(&positions);
        Ok(())
    }

    fn permutation<S: AsRef<str>>(&self, order: &[S]) -> Result<Vec<usize>> {
        if order.len() != self.len() {
            return Err(Error::permutation(format!(
                "expected {} keys, got {}",
                self.len(),
                order.len()
            )));
        }
        let mut seen = HashSet::with_capacity(order.len());
        let mut positions = Vec::with_capacity(order.len());
        for key in order {
            let key = key.as_ref();
            let position = self
                .store
                .position(key)
                .ok_or_else(|| Error::permutation(format!("unknown key `{key}`")))?;
            if !seen.insert(position) {
                return Err(Error::permutation(format!("duplicate key `{key}`")));
            }
            positions.push(position);
        }
        Ok(positions)
    }

    /// Deep copy with `overrides` applied in order using [`OrderedMap::set`]
    /// rules. Chain several mappings to apply them one after another.
    pub fn clone_with<I, K, V>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut copy = self.clone();
        copy.extend(overrides);
        copy
    }

    /// Whether `<`, `>` and `&` are escaped when this map is encoded.
    pub fn escape_html(&self) -> bool {
        self.escape_html
    }

    /// Sets the escaping policy on this map and every map nested in it.
    pub fn set_escape_html(&mut self, escape_html: bool) {
        self.escape_html = escape_html;
        for (_, value) in self.iter_mut() {
            value.propagate_escape_html(escape_html);
        }
    }

    /// Order-insensitive structural comparison.
    pub fn deep_equal(&self, other: &OrderedMap) -> bool {
        crate::equal::maps_equal(self, other)
    }
}

/// Guard returned by [`OrderedMap::pairs_mut`].
pub struct PairsMut<'a> {
    store: &'a mut PairStore,
    pairs: Vec<Pair>,
}

impl Deref for PairsMut<'_> {
    type Target = Vec<Pair>;

    fn deref(&self) -> &Vec<Pair> {
        &self.pairs
    }
}

impl DerefMut for PairsMut<'_> {
    fn deref_mut(&mut self) -> &mut Vec<Pair> {
        &mut self.pairs
    }
}

impl Drop for PairsMut<'_> {
    fn drop(&mut self) {
        let (store, dropped) = PairStore::from_pairs(std::mem::take(&mut self.pairs));
        if dropped > 0 {
            trace!(dropped, "dropped duplicate pairs while rebuilding index");
        }
        *self.store = store;
    }
}

pub struct Iter<'a> {
    inner: indexmap::map::Iter<'a, String, Value>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k.as_str(), v))
    }
}

impl ExactSizeIterator for Iter<'_> {}

pub struct IterMut<'a> {
    inner: indexmap::map::IterMut<'a, String, Value>,
}

impl<'a> Iterator for IterMut<'a> {
    type Item = (&'a str, &'a mut Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for IterMut<'_> {}

impl<'a> IntoIterator for &'a OrderedMap {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut OrderedMap {
    type Item = (&'a str, &'a mut Value);
    type IntoIter = IterMut<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl IntoIterator for OrderedMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.store.into_entries().into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for OrderedMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for OrderedMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        map.extend(iter);
        map
    }
}
