//! Two-dimensional labeled table: an ordered column name list, per-column
//! cell storage, and one shared row index.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::index::Index;
use crate::value::{compare_order, is_na, normalize, Cell};
use crate::vector::Vector;

/// A rectangular table of [`Cell`]s keyed by column name, with one shared
/// [`Index`] across all columns.
#[derive(Debug, Clone)]
pub struct Frame {
    columns: Vec<String>,
    data: HashMap<String, Vec<Cell>>,
    index: Index,
}

/// One materialized row, detached from the frame.
#[derive(Debug, Clone)]
pub struct Row {
    pub label: Cell,
    pub values: Vec<(String, Cell)>,
}

/// A borrowed view of one row, used by `filter`'s predicate.
pub struct RowView<'a> {
    frame: &'a Frame,
    pos: usize,
}

impl<'a> RowView<'a> {
    pub fn label(&self) -> &Cell {
        self.frame.index.label_at(self.pos).expect("row view position is in range")
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.frame.data.get(column).map(|col| &col[self.pos])
    }
}

impl Frame {
    /// A borrowed view of the row at `pos`, without copying cells.
    pub fn row_view(&self, pos: usize) -> RowView<'_> {
        RowView { frame: self, pos }
    }
}

/// Row-side selector for the label-based 2-D accessor.
pub enum RowSelector {
    All,
    One(Cell),
    Many(Vec<Cell>),
}

/// Column-side selector for the label-based 2-D accessor.
pub enum ColSelector {
    All,
    One(String),
    Many(Vec<String>),
}

impl Frame {
    /// From a column-name → cell-sequence mapping. Fails if columns
    /// disagree in length.
    pub fn from_columns(columns: Vec<(String, Vec<Cell>)>) -> Result<Frame> {
        let nrows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        let mut names = Vec::with_capacity(columns.len());
        let mut data = HashMap::with_capacity(columns.len());
        for (name, values) in columns {
            if values.len() != nrows {
                return Err(Error::LengthMismatch {
                    expected: nrows,
                    actual: values.len(),
                });
            }
            let values: Vec<Cell> = values.into_iter().map(normalize).collect();
            names.push(name.clone());
            data.insert(name, values);
        }
        Ok(Frame {
            columns: names,
            data,
            index: Index::range(nrows),
        })
    }

    /// From row records with an explicit column-name header. Fails if a
    /// row's length doesn't match the header.
    pub fn from_rows(column_names: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Frame> {
        let ncols = column_names.len();
        let mut data: HashMap<String, Vec<Cell>> = column_names
            .iter()
            .map(|n| (n.clone(), Vec::with_capacity(rows.len())))
            .collect();
        for row in rows {
            if row.len() != ncols {
                return Err(Error::LengthMismatch {
                    expected: ncols,
                    actual: row.len(),
                });
            }
            for (name, cell) in column_names.iter().zip(row.into_iter()) {
                data.get_mut(name).expect("header covers every column").push(normalize(cell));
            }
        }
        let nrows = data.values().next().map(|v| v.len()).unwrap_or(0);
        Ok(Frame {
            columns: column_names,
            data,
            index: Index::range(nrows),
        })
    }

    // ---- Accessors -----------------------------------------------------

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn nrows(&self) -> usize {
        self.index.len()
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn get_column(&self, name: &str) -> Result<&[Cell]> {
        self.data
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Overwrites (or appends, if new) a column in place. Length must
    /// match the frame's row count.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Cell>) -> Result<()> {
        let name = name.into();
        if values.len() != self.nrows() {
            return Err(Error::LengthMismatch {
                expected: self.nrows(),
                actual: values.len(),
            });
        }
        let values: Vec<Cell> = values.into_iter().map(normalize).collect();
        if !self.data.contains_key(&name) {
            self.columns.push(name.clone());
        }
        self.data.insert(name, values);
        Ok(())
    }

    /// `set_column` on a cloned frame.
    pub fn add_column(&self, name: impl Into<String>, values: Vec<Cell>) -> Result<Frame> {
        let mut out = self.clone();
        out.set_column(name, values)?;
        Ok(out)
    }

    pub fn drop_columns(&self, names: &[&str]) -> Frame {
        let columns: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !names.contains(&c.as_str()))
            .cloned()
            .collect();
        let mut data = HashMap::with_capacity(columns.len());
        for name in &columns {
            data.insert(name.clone(), self.data[name].clone());
        }
        Frame {
            columns,
            data,
            index: self.index.clone(),
        }
    }

    /// Remaps names, leaving unmentioned columns untouched, preserving
    /// order.
    pub fn rename(&self, mapping: &HashMap<String, String>) -> Frame {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| mapping.get(c).cloned().unwrap_or_else(|| c.clone()))
            .collect();
        let mut data = HashMap::with_capacity(columns.len());
        for (old, new) in self.columns.iter().zip(columns.iter()) {
            data.insert(new.clone(), self.data[old].clone());
        }
        Frame {
            columns,
            data,
            index: self.index.clone(),
        }
    }

    // ---- Cell / row access ----------------------------------------------

    /// Resolves `row_label` via the index, then reads `column` at that
    /// position.
    pub fn at(&self, row_label: &Cell, column: &str) -> Result<&Cell> {
        let pos = self.index.position_of(row_label)?;
        let col = self.data.get(column).ok_or_else(|| Error::NotFound(column.to_string()))?;
        col.get(pos).ok_or(Error::OutOfRange {
            index: pos,
            length: col.len(),
        })
    }

    pub fn row(&self, pos: usize) -> Result<Row> {
        let label = self.index.label_at(pos)?.clone();
        let values = self
            .columns
            .iter()
            .map(|name| (name.clone(), self.data[name][pos].clone()))
            .collect();
        Ok(Row { label, values })
    }

    // ---- Slicing ---------------------------------------------------------

    pub fn head(&self, n: usize) -> Frame {
        self.select_positional(0, n.min(self.nrows()), 0, self.ncols())
    }

    pub fn tail(&self, n: usize) -> Frame {
        let nrows = self.nrows();
        self.select_positional(nrows.saturating_sub(n), nrows, 0, self.ncols())
    }

    pub fn slice(&self, row_start: usize, row_end: usize) -> Frame {
        self.select_positional(row_start, row_end, 0, self.ncols())
    }

    /// Rectangular window clamped to bounds on both axes.
    pub fn select_positional(
        &self,
        row_start: usize,
        row_end: usize,
        col_start: usize,
        col_end: usize,
    ) -> Frame {
        let row_end = row_end.min(self.nrows());
        let row_start = row_start.min(row_end);
        let col_end = col_end.min(self.ncols());
        let col_start = col_start.min(col_end);

        let columns: Vec<String> = self.columns[col_start..col_end].to_vec();
        let mut data = HashMap::with_capacity(columns.len());
        for name in &columns {
            data.insert(name.clone(), self.data[name][row_start..row_end].to_vec());
        }
        Frame {
            columns,
            data,
            index: self.index.slice(row_start, row_end),
        }
    }

    /// Label-based selector. Unknown row labels are silently skipped;
    /// unknown column names are silently dropped.
    pub fn select_labels(&self, rows: RowSelector, cols: ColSelector) -> Frame {
        let row_positions: Vec<usize> = match rows {
            RowSelector::All => (0..self.nrows()).collect(),
            RowSelector::One(label) => self.index.position_of(&label).into_iter().collect(),
            RowSelector::Many(labels) => labels
                .iter()
                .filter_map(|label| self.index.position_of(label).ok())
                .collect(),
        };
        let columns: Vec<String> = match cols {
            ColSelector::All => self.columns.clone(),
            ColSelector::One(name) => {
                if self.columns.contains(&name) {
                    vec![name]
                } else {
                    Vec::new()
                }
            }
            ColSelector::Many(names) => names.into_iter().filter(|n| self.columns.contains(n)).collect(),
        };

        let mut data = HashMap::with_capacity(columns.len());
        for name in &columns {
            let col = &self.data[name];
            data.insert(name.clone(), row_positions.iter().map(|&p| col[p].clone()).collect());
        }
        let labels: Vec<Cell> = row_positions
            .iter()
            .map(|&p| self.index.label_at(p).expect("resolved position is in range").clone())
            .collect();
        Frame {
            columns,
            data,
            index: Index::new(labels),
        }
    }

    // ---- Filter / sort -----------------------------------------------------

    /// Retains rows passing `pred`, carrying over their original labels.
    /// Stable with respect to source order.
    pub fn filter(&self, pred: impl Fn(&RowView) -> bool) -> Frame {
        let keep: Vec<usize> = (0..self.nrows())
            .filter(|&pos| pred(&self.row_view(pos)))
            .collect();
        self.select_positions(&keep)
    }

    /// Stable sort by one column. NA-last ascending, NA-first descending;
    /// numeric-first then lexicographic tie-break. Permutation is applied
    /// uniformly to every column and the index.
    pub fn sort_by(&self, column: &str, ascending: bool) -> Result<Frame> {
        let col = self.data.get(column).ok_or_else(|| Error::NotFound(column.to_string()))?;
        let (mut non_na, mut na) = (Vec::new(), Vec::new());
        for pos in 0..self.nrows() {
            if is_na(&col[pos]) {
                na.push(pos);
            } else {
                non_na.push(pos);
            }
        }
        non_na.sort_by(|&a, &b| {
            let ord = compare_order(&col[a], &col[b]);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        let order: Vec<usize> = if ascending {
            non_na.into_iter().chain(na).collect()
        } else {
            na.into_iter().chain(non_na).collect()
        };
        Ok(self.select_positions(&order))
    }

    /// A new frame keeping exactly the rows at `positions`, in the given
    /// order, each carrying its original label. Positions may repeat.
    pub fn select_positions(&self, order: &[usize]) -> Frame {
        let mut data = HashMap::with_capacity(self.columns.len());
        for name in &self.columns {
            let col = &self.data[name];
            data.insert(name.clone(), order.iter().map(|&pos| col[pos].clone()).collect());
        }
        let labels: Vec<Cell> = order
            .iter()
            .map(|&pos| self.index.label_at(pos).expect("permutation index is in range").clone())
            .collect();
        Frame {
            columns: self.columns.clone(),
            data,
            index: Index::new(labels),
        }
    }

    /// Summary frame: rows are the original columns (indexed by column
    /// name under index name "column"); columns are fixed: count, mean,
    /// std, min, max.
    pub fn describe(&self) -> Frame {
        let mut count = Vec::with_capacity(self.ncols());
        let mut mean = Vec::with_capacity(self.ncols());
        let mut std = Vec::with_capacity(self.ncols());
        let mut min = Vec::with_capacity(self.ncols());
        let mut max = Vec::with_capacity(self.ncols());
        for name in &self.columns {
            let vector = Vector::from_cells(self.data[name].clone());
            count.push(Cell::Int(vector.count() as i64));
            mean.push(Cell::Float(vector.mean()));
            std.push(Cell::Float(vector.std()));
            min.push(vector.min());
            max.push(vector.max());
        }
        let mut data = HashMap::with_capacity(5);
        data.insert("count".to_string(), count);
        data.insert("mean".to_string(), mean);
        data.insert("std".to_string(), std);
        data.insert("min".to_string(), min);
        data.insert("max".to_string(), max);
        Frame {
            columns: vec!["count", "mean", "std", "min", "max"].into_iter().map(String::from).collect(),
            data,
            index: Index::with_name(self.columns.iter().map(|c| Cell::Text(c.clone())).collect(), "column"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frame {
        Frame::from_columns(vec![
            ("a".to_string(), vec![Cell::Int(1), Cell::Int(2), Cell::Int(3)]),
            (
                "b".to_string(),
                vec![Cell::Text("x".into()), Cell::Text("y".into()), Cell::Text("z".into())],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn from_columns_rejects_unequal_lengths() {
        let err = Frame::from_columns(vec![
            ("a".to_string(), vec![Cell::Int(1), Cell::Int(2)]),
            ("b".to_string(), vec![Cell::Int(1)]),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { .. }));
    }

    #[test]
    fn from_rows_rejects_length_mismatch() {
        let err = Frame::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Cell::Int(1)]],
        )
        .unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { .. }));
    }

    #[test]
    fn set_column_appends_new_name() {
        let mut f = sample();
        f.set_column("c", vec![Cell::Bool(true), Cell::Bool(false), Cell::Bool(true)]).unwrap();
        assert_eq!(f.columns(), &["a", "b", "c"]);
        assert!(f.set_column("a", vec![Cell::Int(1)]).is_err());
    }

    #[test]
    fn head_tail_preserve_labels() {
        let f = sample();
        let h = f.head(2);
        assert_eq!(h.nrows(), 2);
        assert_eq!(h.index().labels(), &[Cell::Int(0), Cell::Int(1)]);
        let t = f.tail(1);
        assert_eq!(t.index().labels(), &[Cell::Int(2)]);
    }

    #[test]
    fn filter_keeps_order_and_labels() {
        let f = sample();
        let out = f.filter(|row| matches!(row.get("a"), Some(Cell::Int(n)) if *n >= 2));
        assert_eq!(out.nrows(), 2);
        assert_eq!(out.index().labels(), &[Cell::Int(1), Cell::Int(2)]);
    }

    #[test]
    fn sort_by_places_na_correctly() {
        let f = Frame::from_columns(vec![("v".to_string(), vec![Cell::Int(2), Cell::Na, Cell::Int(1)])]).unwrap();
        let asc = f.sort_by("v", true).unwrap();
        assert_eq!(asc.get_column("v").unwrap(), &[Cell::Int(1), Cell::Int(2), Cell::Na]);
        let desc = f.sort_by("v", false).unwrap();
        assert_eq!(desc.get_column("v").unwrap(), &[Cell::Na, Cell::Int(2), Cell::Int(1)]);
    }

    #[test]
    fn label_selector_silently_skips_unknown() {
        let f = sample();
        let selected = f.select_labels(
            RowSelector::Many(vec![Cell::Int(0), Cell::Int(99)]),
            ColSelector::Many(vec!["a".to_string(), "nope".to_string()]),
        );
        assert_eq!(selected.nrows(), 1);
        assert_eq!(selected.columns(), &["a"]);
    }

    #[test]
    fn describe_shape_and_index_name() {
        let f = sample_numeric();
        let d = f.describe();
        assert_eq!(d.columns(), &["count", "mean", "std", "min", "max"]);
        assert_eq!(d.index().name(), Some("column"));
        assert_eq!(d.nrows(), 1);
    }

    fn sample_numeric() -> Frame {
        Frame::from_columns(vec![("a".to_string(), vec![Cell::Int(1), Cell::Int(2), Cell::Int(3)])]).unwrap()
    }
}
