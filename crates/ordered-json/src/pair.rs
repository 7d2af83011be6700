//! Pair storage: the ordered entry sequence and its key index, kept in one
//! `IndexMap` so the two can never disagree.
//!
//! The store has no notion of the document format. Keys are unique and
//! positions are dense (`0..len`).

use indexmap::IndexMap;

use crate::value::Value;

/// One key/value entry of an ordered map.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    key: String,
    value: Value,
}

impl Pair {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub fn into_parts(self) -> (String, Value) {
        (self.key, self.value)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PairStore {
    entries: IndexMap<String, Value>,
}

impl PairStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Builds a store from a raw sequence in which a key may repeat. The last
    /// occurrence wins, for the value and for the position. Returns the store
    /// and the number of pairs dropped. Linear in the sequence length.
    pub fn from_pairs(pairs: Vec<Pair>) -> (Self, usize) {
        let total = pairs.len();
        let mut entries = IndexMap::with_capacity(total);
        for pair in pairs.into_iter().rev() {
            entries.entry(pair.key).or_insert(pair.value);
        }
        entries.reverse();
        let dropped = total - entries.len();
        (Self { entries }, dropped)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, Value> {
        self.entries.iter_mut()
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.get_index_of(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Updates in place when the key exists, appends otherwise.
    pub fn upsert(&mut self, key: String, value: Value) {
        self.entries.insert(key, value);
    }

    /// Removes `key` and closes the gap. O(n) in the pairs after it.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &mut Value) -> bool,
    {
        self.entries.retain(|key, value| keep(key, value));
    }

    /// Moves every pair out, leaving the store empty.
    pub fn take_pairs(&mut self) -> Vec<Pair> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .map(|(key, value)| Pair { key, value })
            .collect()
    }

    /// Reorders the pairs by a permutation of positions: `order[n]` is the
    /// current position of the pair that must end up at position `n`.
    pub fn permute(&mut self, order: &[usize]) {
        let pairs = self.take_pairs();
        self.entries = arrange(pairs, order);
    }

    /// Stable sort driven by a "less than" predicate over whole pairs.
    pub fn sort_by_less<F>(&mut self, less: F)
    where
        F: FnMut(&Pair, &Pair) -> bool,
    {
        let pairs = self.take_pairs();
        let order = sorted_positions(&pairs, less);
        self.entries = arrange(pairs, &order);
    }

    pub fn into_entries(self) -> IndexMap<String, Value> {
        self.entries
    }
}

/// `IndexMap` equality ignores order; the store's does not.
impl PartialEq for PairStore {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

fn arrange(pairs: Vec<Pair>, order: &[usize]) -> IndexMap<String, Value> {
    let mut slots: Vec<Option<Pair>> = pairs.into_iter().map(Some).collect();
    order
        .iter()
        .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
        .map(|pair| (pair.key, pair.value))
        .collect()
}

/// Bottom-up merge sort over positions. The predicate is only ever asked
/// whether the right candidate precedes the left one, so ties keep their
/// input order and a predicate that is not a strict weak order still yields a
/// permutation instead of a panic.
fn sorted_positions<F>(pairs: &[Pair], mut less: F) -> Vec<usize>
where
    F: FnMut(&Pair, &Pair) -> bool,
{
    let n = pairs.len();
    let mut src: Vec<usize> = (0..n).collect();
    let mut dst = vec![0; n];
    let mut width = 1;
    while width < n {
        let mut start = 0;
        while start < n {
            let mid = (start + width).min(n);
            let end = (start + 2 * width).min(n);
            let (mut i, mut j) = (start, mid);
            for slot in &mut dst[start..end] {
                if j < end && (i >= mid || less(&pairs[src[j]], &pairs[src[i]])) {
                    *slot = src[j];
                    j += 1;
                } else {
                    *slot = src[i];
                    i += 1;
                }
            }
            start = end;
        }
        std::mem::swap(&mut src, &mut dst);
        width *= 2;
    }
    src
}
