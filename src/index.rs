//! Label index: an ordered sequence of cell values serving as row or group
//! labels, plus an optional name.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::value::{canonical_text, Cell};

/// An ordered, possibly-duplicated sequence of labels with optional name.
///
/// Label → position lookup returns the first occurrence; it's backed by a
/// `HashMap` keyed on each label's canonical text rendering (the same
/// composed-key trick group-by and join use), which is the only indexing
/// this crate does — no persisted structure, just in-memory hashing.
#[derive(Debug, Clone)]
pub struct Index {
    labels: Vec<Cell>,
    name: Option<String>,
    first_position: HashMap<String, usize>,
}

fn build_lookup(labels: &[Cell]) -> HashMap<String, usize> {
    let mut map = HashMap::with_capacity(labels.len());
    for (pos, label) in labels.iter().enumerate() {
        map.entry(canonical_text(label)).or_insert(pos);
    }
    map
}

impl Index {
    /// Construct from a label sequence with no name.
    pub fn new(labels: Vec<Cell>) -> Self {
        let first_position = build_lookup(&labels);
        Index {
            labels,
            name: None,
            first_position,
        }
    }

    /// Construct from a label sequence with a name.
    pub fn with_name(labels: Vec<Cell>, name: impl Into<String>) -> Self {
        let mut idx = Self::new(labels);
        idx.name = Some(name.into());
        idx
    }

    /// A default range index `0..n`.
    pub fn range(n: usize) -> Self {
        Self::new((0..n as i64).map(Cell::Int).collect())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn labels(&self) -> &[Cell] {
        &self.labels
    }

    /// Label at `pos`. `Error::OutOfRange` if `pos >= len()`.
    pub fn label_at(&self, pos: usize) -> Result<&Cell> {
        self.labels.get(pos).ok_or(Error::OutOfRange {
            index: pos,
            length: self.labels.len(),
        })
    }

    /// Position of the first occurrence of `label`. `Error::NotFound` if
    /// absent.
    pub fn position_of(&self, label: &Cell) -> Result<usize> {
        self.first_position
            .get(&canonical_text(label))
            .copied()
            .ok_or_else(|| Error::NotFound(format!("label {label}")))
    }

    pub fn contains(&self, label: &Cell) -> bool {
        self.first_position.contains_key(&canonical_text(label))
    }

    /// `[start, end)` sub-index; keeps the index's name.
    pub fn slice(&self, start: usize, end: usize) -> Index {
        let end = end.min(self.labels.len());
        let start = start.min(end);
        let mut idx = Index::new(self.labels[start..end].to_vec());
        idx.name = self.name.clone();
        idx
    }

    /// A copy with `label` appended.
    pub fn append(&self, label: Cell) -> Index {
        let mut labels = self.labels.clone();
        labels.push(label);
        let mut idx = Index::new(labels);
        idx.name = self.name.clone();
        idx
    }

    pub fn copy(&self) -> Index {
        self.clone()
    }

    /// A fresh default range index of the same length, keeping the name.
    pub fn reset_to_range(&self) -> Index {
        let mut idx = Index::range(self.labels.len());
        idx.name = self.name.clone();
        idx
    }

    /// Canonical text rendering of every label, in order.
    pub fn render_all(&self) -> Vec<String> {
        self.labels.iter().map(canonical_text).collect()
    }

    /// Same length and structurally equal labels (name is not compared).
    pub fn equals(&self, other: &Index) -> bool {
        self.labels == other.labels
    }

    /// De-duplicated union, preserving first-appearance order of `self`
    /// then `other`.
    pub fn union(&self, other: &Index) -> Index {
        let mut seen: HashMap<String, ()> = HashMap::new();
        let mut out = Vec::new();
        for label in self.labels.iter().chain(other.labels.iter()) {
            let key = canonical_text(label);
            if !seen.contains_key(&key) {
                seen.insert(key, ());
                out.push(label.clone());
            }
        }
        Index::new(out)
    }

    /// De-duplicated intersection, preserving first-appearance order of
    /// `self`.
    pub fn intersection(&self, other: &Index) -> Index {
        let other_keys: std::collections::HashSet<String> =
            other.labels.iter().map(canonical_text).collect();
        let mut seen: HashMap<String, ()> = HashMap::new();
        let mut out = Vec::new();
        for label in &self.labels {
            let key = canonical_text(label);
            if other_keys.contains(&key) && !seen.contains_key(&key) {
                seen.insert(key, ());
                out.push(label.clone());
            }
        }
        Index::new(out)
    }

    /// De-duplicated difference (`self` minus `other`), preserving
    /// first-appearance order of `self`.
    pub fn difference(&self, other: &Index) -> Index {
        let other_keys: std::collections::HashSet<String> =
            other.labels.iter().map(canonical_text).collect();
        let mut seen: HashMap<String, ()> = HashMap::new();
        let mut out = Vec::new();
        for label in &self.labels {
            let key = canonical_text(label);
            if !other_keys.contains(&key) && !seen.contains_key(&key) {
                seen.insert(key, ());
                out.push(label.clone());
            }
        }
        Index::new(out)
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}
