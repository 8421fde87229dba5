//! Group-by: a single-threaded scan that buckets row positions by composed
//! key, plus aggregation/apply/filter/transform over the buckets.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::index::Index;
use crate::value::{compose_key as compose_cells, is_na, try_as_f64, Cell};
use crate::vector::Vector;

/// A pure vector → cell reduction used by `agg`/`single`.
pub type Aggregator = fn(&[Cell]) -> Cell;

pub fn agg_sum(cells: &[Cell]) -> Cell {
    Cell::Float(cells.iter().filter_map(try_as_f64).sum())
}

pub fn agg_mean(cells: &[Cell]) -> Cell {
    Cell::Float(Vector::from_cells(cells.to_vec()).mean())
}

pub fn agg_min(cells: &[Cell]) -> Cell {
    Vector::from_cells(cells.to_vec()).min()
}

pub fn agg_max(cells: &[Cell]) -> Cell {
    Vector::from_cells(cells.to_vec()).max()
}

pub fn agg_count(cells: &[Cell]) -> Cell {
    Cell::Int(cells.iter().filter(|c| !is_na(c)).count() as i64)
}

pub fn agg_std(cells: &[Cell]) -> Cell {
    Cell::Float(Vector::from_cells(cells.to_vec()).std())
}

pub fn agg_var(cells: &[Cell]) -> Cell {
    Cell::Float(Vector::from_cells(cells.to_vec()).var())
}

pub fn agg_first(cells: &[Cell]) -> Cell {
    cells.first().cloned().unwrap_or(Cell::Na)
}

pub fn agg_last(cells: &[Cell]) -> Cell {
    cells.last().cloned().unwrap_or(Cell::Na)
}

/// Groups of a frame's rows by the composed-key value of `keys`.
pub struct GroupBy<'a> {
    frame: &'a Frame,
    keys: Vec<String>,
    /// Composed key, in first-appearance order.
    order: Vec<String>,
    /// Composed key → row positions, in scan order.
    groups: HashMap<String, Vec<usize>>,
}

impl<'a> GroupBy<'a> {
    /// Validates that every key names a column, then scans rows once.
    pub fn new(frame: &'a Frame, keys: Vec<String>) -> Result<GroupBy<'a>> {
        for key in &keys {
            if !frame.columns().contains(key) {
                return Err(Error::NotFound(key.clone()));
            }
        }
        let mut order = Vec::new();
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for pos in 0..frame.nrows() {
            let composed = compose_key(frame, &keys, pos)?;
            if !groups.contains_key(&composed) {
                order.push(composed.clone());
            }
            groups.entry(composed).or_default().push(pos);
        }
        Ok(GroupBy {
            frame,
            keys,
            order,
            groups,
        })
    }

    pub fn n_groups(&self) -> usize {
        self.order.len()
    }

    pub fn groups_map(&self) -> &HashMap<String, Vec<usize>> {
        &self.groups
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Composed keys in first-appearance order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn frame(&self) -> &Frame {
        self.frame
    }

    /// Emits a frame with the key columns and a `size` integer column.
    pub fn size(&self) -> Result<Frame> {
        let mut key_cols: Vec<Vec<Cell>> = vec![Vec::with_capacity(self.order.len()); self.keys.len()];
        let mut sizes = Vec::with_capacity(self.order.len());
        for key in &self.order {
            let positions = &self.groups[key];
            let key_values = self.key_values(positions[0])?;
            for (col, value) in key_cols.iter_mut().zip(key_values) {
                col.push(value);
            }
            sizes.push(Cell::Int(positions.len() as i64));
        }
        let mut columns: Vec<(String, Vec<Cell>)> =
            self.keys.iter().cloned().zip(key_cols).collect();
        columns.push(("size".to_string(), sizes));
        Frame::from_columns(columns)
    }

    /// Materializes a per-group frame, preserving the source column order
    /// and a fresh range index.
    pub fn get_group_frame(&self, positions: &[usize]) -> Result<Frame> {
        let mut columns = Vec::with_capacity(self.frame.ncols());
        for name in self.frame.columns() {
            let source = self.frame.get_column(name)?;
            columns.push((name.clone(), positions.iter().map(|&p| source[p].clone()).collect()));
        }
        Frame::from_columns(columns)
    }

    /// Key-column cell values at `pos`, recovered from the original frame
    /// (the composed key is for bucketing only).
    fn key_values(&self, pos: usize) -> Result<Vec<Cell>> {
        self.keys
            .iter()
            .map(|k| self.frame.get_column(k).map(|col| col[pos].clone()))
            .collect()
    }

    /// Leading columns are group keys; trailing columns are named
    /// `"<column>_<k>"` for the k-th aggregator applied to that column.
    /// Groups are emitted in first-appearance order.
    pub fn agg(&self, map: &[(String, Vec<Aggregator>)]) -> Result<Frame> {
        for (column, _) in map {
            if !self.frame.columns().contains(column) {
                return Err(Error::NotFound(column.clone()));
            }
        }
        let mut key_cols: Vec<Vec<Cell>> = vec![Vec::with_capacity(self.order.len()); self.keys.len()];
        let mut out_cols: Vec<Vec<Cell>> = map.iter().flat_map(|(_, aggs)| aggs.iter().map(|_| Vec::new())).collect();

        for key in &self.order {
            let positions = &self.groups[key];
            let key_values = self.key_values(positions[0])?;
            for (col, value) in key_cols.iter_mut().zip(key_values) {
                col.push(value);
            }
            let mut out_idx = 0;
            for (column, aggs) in map {
                let source = self.frame.get_column(column)?;
                let cells: Vec<Cell> = positions.iter().map(|&p| source[p].clone()).collect();
                for agg in aggs {
                    out_cols[out_idx].push(agg(&cells));
                    out_idx += 1;
                }
            }
        }

        let mut columns: Vec<(String, Vec<Cell>)> = self.keys.iter().cloned().zip(key_cols).collect();
        let mut out_idx = 0;
        for (column, aggs) in map {
            for (k, _) in aggs.iter().enumerate() {
                columns.push((format!("{column}_{k}"), std::mem::take(&mut out_cols[out_idx])));
                out_idx += 1;
            }
        }
        Frame::from_columns(columns)
    }

    /// Applies one aggregator to every listed column (or every non-key
    /// column, if `columns` is empty), naming outputs `"<column>_<suffix>"`.
    pub fn single(&self, aggregator: Aggregator, suffix: &str, columns: &[&str]) -> Result<Frame> {
        let target_columns: Vec<String> = if columns.is_empty() {
            self.frame
                .columns()
                .iter()
                .filter(|c| !self.keys.contains(c))
                .cloned()
                .collect()
        } else {
            columns.iter().map(|s| s.to_string()).collect()
        };
        let map: Vec<(String, Vec<Aggregator>)> =
            target_columns.into_iter().map(|c| (c, vec![aggregator])).collect();
        let frame = self.agg(&map)?;
        // agg() names columns "<column>_0"; rename to the requested suffix.
        let mut renamed: Vec<(String, Vec<Cell>)> = Vec::with_capacity(frame.ncols());
        for name in frame.columns() {
            let cells = frame.get_column(name)?.to_vec();
            let final_name = match name.strip_suffix("_0") {
                Some(base) if map_has_base(&map, base) => format!("{base}_{suffix}"),
                _ => name.clone(),
            };
            renamed.push((final_name, cells));
        }
        Frame::from_columns(renamed)
    }

    /// Per-group frame fed to `f`; non-empty results are concatenated
    /// under the first non-empty result's column layout, with a fresh
    /// range index.
    pub fn apply(&self, f: impl Fn(&Frame) -> Option<Frame>) -> Result<Frame> {
        let mut frames = Vec::new();
        for key in &self.order {
            let positions = &self.groups[key];
            let group_frame = self.get_group_frame(positions)?;
            if let Some(result) = f(&group_frame) {
                frames.push(result);
            }
        }
        crate::concat::concat(&frames)
    }

    /// Keeps all rows of groups whose predicate holds over the group's
    /// frame; retained rows are re-sorted to source order and the index
    /// resets to a fresh range.
    pub fn filter(&self, predicate: impl Fn(&Frame) -> bool) -> Result<Frame> {
        let mut keep = Vec::new();
        for key in &self.order {
            let positions = &self.groups[key];
            let group_frame = self.get_group_frame(positions)?;
            if predicate(&group_frame) {
                keep.extend_from_slice(positions);
            }
        }
        keep.sort_unstable();
        let mut columns = Vec::with_capacity(self.frame.ncols());
        for name in self.frame.columns() {
            let source = self.frame.get_column(name)?;
            columns.push((name.clone(), keep.iter().map(|&p| source[p].clone()).collect()));
        }
        Frame::from_columns(columns)
    }

    /// Applies `f` per-group to a vector of `column`'s cells, then
    /// scatters the result back to the original row positions. Short
    /// per-group results pad the remaining positions with NA.
    pub fn transform(&self, column: &str, f: impl Fn(&Vector) -> Vector) -> Result<Vector> {
        let source = self.frame.get_column(column)?;
        let mut out = vec![Cell::Na; source.len()];
        for key in &self.order {
            let positions = &self.groups[key];
            let group_vector = Vector::from_cells(positions.iter().map(|&p| source[p].clone()).collect());
            let result = f(&group_vector);
            for (i, &pos) in positions.iter().enumerate() {
                out[pos] = result.values().get(i).cloned().unwrap_or(Cell::Na);
            }
        }
        Ok(Vector::from_cells_named(None::<String>, out))
    }
}

fn map_has_base(map: &[(String, Vec<Aggregator>)], base: &str) -> bool {
    map.iter().any(|(c, _)| c == base)
}

fn compose_key(frame: &Frame, keys: &[String], pos: usize) -> Result<String> {
    let mut cells = Vec::with_capacity(keys.len());
    for key in keys {
        cells.push(&frame.get_column(key)?[pos]);
    }
    Ok(compose_cells(cells))
}
