//! One-dimensional labeled column: `(name, dtype, cells, index)`.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::index::Index;
use crate::value::{canonical_text, coerce, compare_order, infer_dtype, is_na, normalize, try_as_f64, Cell, Dtype};

/// A labeled, type-erased column.
#[derive(Debug, Clone)]
pub struct Vector {
    name: Option<String>,
    dtype: Dtype,
    cells: Vec<Cell>,
    index: Index,
}

/// The right-hand side of a [`Vector`] arithmetic op: either a broadcast
/// scalar or another vector co-iterated by position.
pub enum Operand<'a> {
    Scalar(Cell),
    Vector(&'a Vector),
}

#[derive(Clone, Copy)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl Vector {
    /// Opaque sequence; dtype inferred from the first non-NA cell. Raw text
    /// NA markers ("", "NA", "NaN", "null") are normalized to `Cell::Na`.
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self::from_cells_named(None::<String>, cells)
    }

    pub fn from_cells_named(name: Option<impl Into<String>>, cells: Vec<Cell>) -> Self {
        let cells: Vec<Cell> = cells.into_iter().map(normalize).collect();
        let dtype = infer_dtype(&cells);
        let index = Index::range(cells.len());
        Vector {
            name: name.map(Into::into),
            dtype,
            cells,
            index,
        }
    }

    /// Opaque sequence with an explicit index. Fails if lengths disagree.
    pub fn with_index(
        name: Option<impl Into<String>>,
        cells: Vec<Cell>,
        index: Index,
    ) -> Result<Self> {
        if cells.len() != index.len() {
            return Err(Error::LengthMismatch {
                expected: cells.len(),
                actual: index.len(),
            });
        }
        let cells: Vec<Cell> = cells.into_iter().map(normalize).collect();
        let dtype = infer_dtype(&cells);
        Ok(Vector {
            name: name.map(Into::into),
            dtype,
            cells,
            index,
        })
    }

    pub fn from_i64(name: Option<impl Into<String>>, values: Vec<i64>) -> Self {
        let cells = values.into_iter().map(Cell::Int).collect();
        let index = Index::range(cells.len());
        Vector {
            name: name.map(Into::into),
            dtype: Dtype::Int64,
            cells,
            index,
        }
    }

    /// Narrower integer convenience constructor; widens to the same
    /// `Int64` representation `from_i64` uses (`Cell` carries no i32).
    pub fn from_i32(name: Option<impl Into<String>>, values: Vec<i32>) -> Self {
        Self::from_i64(name, values.into_iter().map(i64::from).collect())
    }

    pub fn from_f64(name: Option<impl Into<String>>, values: Vec<f64>) -> Self {
        let cells: Vec<Cell> = values.into_iter().map(Cell::Float).collect();
        let index = Index::range(cells.len());
        let dtype = infer_dtype(&cells);
        Vector {
            name: name.map(Into::into),
            dtype,
            cells,
            index,
        }
    }

    pub fn from_text(name: Option<impl Into<String>>, values: Vec<String>) -> Self {
        let cells: Vec<Cell> = values.into_iter().map(Cell::Text).map(normalize).collect();
        let index = Index::range(cells.len());
        let dtype = infer_dtype(&cells);
        Vector {
            name: name.map(Into::into),
            dtype,
            cells,
            index,
        }
    }

    /// Crate-internal: assemble a vector from already-computed parts
    /// without re-running inference, for callers (the parallel fabric)
    /// that must reproduce a specific sequential-path dtype exactly.
    pub(crate) fn from_parts(name: Option<String>, dtype: Dtype, cells: Vec<Cell>, index: Index) -> Self {
        Vector { name, dtype, cells, index }
    }

    pub fn from_bool(name: Option<impl Into<String>>, values: Vec<bool>) -> Self {
        let cells: Vec<Cell> = values.into_iter().map(Cell::Bool).collect();
        let index = Index::range(cells.len());
        Vector {
            name: name.map(Into::into),
            dtype: Dtype::Bool,
            cells,
            index,
        }
    }

    // ---- Accessors ---------------------------------------------------

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn values(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, pos: usize) -> Result<&Cell> {
        self.cells.get(pos).ok_or(Error::OutOfRange {
            index: pos,
            length: self.cells.len(),
        })
    }

    pub fn get_by_label(&self, label: &Cell) -> Result<&Cell> {
        let pos = self.index.position_of(label)?;
        self.get(pos)
    }

    pub fn set(&mut self, pos: usize, value: Cell) -> Result<()> {
        if pos >= self.cells.len() {
            return Err(Error::OutOfRange {
                index: pos,
                length: self.cells.len(),
            });
        }
        self.cells[pos] = normalize(value);
        Ok(())
    }

    // ---- Slicing -------------------------------------------------------

    pub fn head(&self, n: usize) -> Vector {
        self.slice(0, n.min(self.len()))
    }

    pub fn tail(&self, n: usize) -> Vector {
        let len = self.len();
        let start = len.saturating_sub(n);
        self.slice(start, len)
    }

    pub fn slice(&self, start: usize, end: usize) -> Vector {
        let end = end.min(self.len());
        let start = start.min(end);
        Vector {
            name: self.name.clone(),
            dtype: self.dtype,
            cells: self.cells[start..end].to_vec(),
            index: self.index.slice(start, end),
        }
    }

    // ---- Statistics (NA-aware) ------------------------------------------

    fn numeric_values(&self) -> Vec<f64> {
        self.cells.iter().filter_map(try_as_f64).collect()
    }

    pub fn sum(&self) -> f64 {
        self.numeric_values().iter().sum()
    }

    pub fn mean(&self) -> f64 {
        let values = self.numeric_values();
        if values.is_empty() {
            f64::NAN
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }

    pub fn median(&self) -> f64 {
        let mut values = self.numeric_values();
        if values.is_empty() {
            return f64::NAN;
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let n = values.len();
        if n % 2 == 1 {
            values[n / 2]
        } else {
            (values[n / 2 - 1] + values[n / 2]) / 2.0
        }
    }

    pub fn var(&self) -> f64 {
        let values = self.numeric_values();
        let n = values.len();
        if n <= 1 {
            return f64::NAN;
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        let sum_sq = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        sum_sq / (n - 1) as f64
    }

    pub fn std(&self) -> f64 {
        self.var().sqrt()
    }

    pub fn min(&self) -> Cell {
        self.numeric_values()
            .into_iter()
            .fold(None, |acc: Option<f64>, v| match acc {
                Some(a) if a <= v => Some(a),
                _ => Some(v),
            })
            .map(Cell::Float)
            .unwrap_or(Cell::Na)
    }

    pub fn max(&self) -> Cell {
        self.numeric_values()
            .into_iter()
            .fold(None, |acc: Option<f64>, v| match acc {
                Some(a) if a >= v => Some(a),
                _ => Some(v),
            })
            .map(Cell::Float)
            .unwrap_or(Cell::Na)
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|c| !is_na(c)).count()
    }

    /// Cells in first-occurrence order, de-duplicated by canonical text
    /// form.
    pub fn unique(&self) -> Vec<Cell> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for cell in &self.cells {
            let key = canonical_text(cell);
            if seen.insert(key) {
                out.push(cell.clone());
            }
        }
        out
    }

    pub fn nunique(&self) -> usize {
        self.unique().len()
    }

    /// Index = unique cells, values = integer frequencies. Rendering order
    /// is insertion order; no total-order guarantee across runs.
    pub fn value_counts(&self) -> Vector {
        let mut order: Vec<Cell> = Vec::new();
        let mut counts: HashMap<String, i64> = HashMap::new();
        for cell in &self.cells {
            let key = canonical_text(cell);
            if !counts.contains_key(&key) {
                order.push(cell.clone());
            }
            *counts.entry(key).or_insert(0) += 1;
        }
        let values: Vec<Cell> = order
            .iter()
            .map(|c| Cell::Int(counts[&canonical_text(c)]))
            .collect();
        Vector {
            name: self.name.clone(),
            dtype: Dtype::Int64,
            cells: values,
            index: Index::new(order),
        }
    }

    // ---- Transforms ------------------------------------------------------

    pub fn apply(&self, f: impl Fn(&Cell) -> Cell) -> Vector {
        let cells: Vec<Cell> = self.cells.iter().map(|c| normalize(f(c))).collect();
        Vector {
            name: self.name.clone(),
            dtype: Dtype::Opaque,
            cells,
            index: self.index.clone(),
        }
    }

    /// Replace values present in `lookup` (matched by canonical text);
    /// leave everything else untouched.
    pub fn map(&self, lookup: &[(Cell, Cell)]) -> Vector {
        let table: HashMap<String, Cell> = lookup
            .iter()
            .map(|(k, v)| (canonical_text(k), v.clone()))
            .collect();
        let cells: Vec<Cell> = self
            .cells
            .iter()
            .map(|c| table.get(&canonical_text(c)).cloned().unwrap_or_else(|| c.clone()))
            .collect();
        Vector {
            name: self.name.clone(),
            dtype: self.dtype,
            cells,
            index: self.index.clone(),
        }
    }

    pub fn fill_na(&self, value: Cell) -> Vector {
        let cells: Vec<Cell> = self
            .cells
            .iter()
            .map(|c| if is_na(c) { value.clone() } else { c.clone() })
            .collect();
        Vector {
            name: self.name.clone(),
            dtype: self.dtype,
            cells,
            index: self.index.clone(),
        }
    }

    /// Drops NA cells and their aligned labels.
    pub fn drop_na(&self) -> Vector {
        let mut cells = Vec::new();
        let mut labels = Vec::new();
        for (cell, label) in self.cells.iter().zip(self.index.labels()) {
            if !is_na(cell) {
                cells.push(cell.clone());
                labels.push(label.clone());
            }
        }
        Vector {
            name: self.name.clone(),
            dtype: self.dtype,
            cells,
            index: Index::new(labels),
        }
    }

    pub fn is_na_vector(&self) -> Vector {
        let cells: Vec<Cell> = self.cells.iter().map(|c| Cell::Bool(is_na(c))).collect();
        Vector {
            name: self.name.clone(),
            dtype: Dtype::Bool,
            cells,
            index: self.index.clone(),
        }
    }

    pub fn not_na_vector(&self) -> Vector {
        let cells: Vec<Cell> = self.cells.iter().map(|c| Cell::Bool(!is_na(c))).collect();
        Vector {
            name: self.name.clone(),
            dtype: Dtype::Bool,
            cells,
            index: self.index.clone(),
        }
    }

    /// Per-cell coercion; aborts on the first failure, carrying its
    /// position.
    pub fn as_type(&self, target: Dtype) -> Result<Vector> {
        let cells = self
            .cells
            .iter()
            .enumerate()
            .map(|(i, c)| coerce(c, target, i))
            .collect::<Result<Vec<_>>>()?;
        Ok(Vector {
            name: self.name.clone(),
            dtype: target,
            cells,
            index: self.index.clone(),
        })
    }

    /// Stable sort. NA-last ascending, NA-first descending; numeric-first
    /// then lexicographic tie-break among non-NA cells.
    pub fn sort_values(&self, ascending: bool) -> Vector {
        let mut pairs: Vec<(Cell, Cell)> = self
            .cells
            .iter()
            .cloned()
            .zip(self.index.labels().iter().cloned())
            .collect();

        let (mut non_na, mut na): (Vec<_>, Vec<_>) = (Vec::new(), Vec::new());
        for pair in pairs.drain(..) {
            if is_na(&pair.0) {
                na.push(pair);
            } else {
                non_na.push(pair);
            }
        }
        non_na.sort_by(|a, b| {
            let ord = compare_order(&a.0, &b.0);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });

        let ordered: Vec<(Cell, Cell)> = if ascending {
            non_na.into_iter().chain(na.into_iter()).collect()
        } else {
            na.into_iter().chain(non_na.into_iter()).collect()
        };

        let (cells, labels): (Vec<Cell>, Vec<Cell>) = ordered.into_iter().unzip();
        Vector {
            name: self.name.clone(),
            dtype: self.dtype,
            cells,
            index: Index::new(labels),
        }
    }

    // ---- Arithmetic --------------------------------------------------

    pub fn add(&self, rhs: Operand) -> Vector {
        self.arith(rhs, ArithOp::Add)
    }

    pub fn sub(&self, rhs: Operand) -> Vector {
        self.arith(rhs, ArithOp::Sub)
    }

    pub fn mul(&self, rhs: Operand) -> Vector {
        self.arith(rhs, ArithOp::Mul)
    }

    pub fn div(&self, rhs: Operand) -> Vector {
        self.arith(rhs, ArithOp::Div)
    }

    fn arith(&self, rhs: Operand, op: ArithOp) -> Vector {
        let n = self.len();
        let cells: Vec<Cell> = match rhs {
            Operand::Scalar(scalar) => {
                let rv = try_as_f64(&scalar);
                self.cells
                    .iter()
                    .map(|c| combine(try_as_f64(c), rv, op))
                    .collect()
            }
            Operand::Vector(other) => (0..n)
                .map(|i| {
                    let lv = try_as_f64(&self.cells[i]);
                    let rv = if i < other.len() {
                        try_as_f64(&other.cells[i])
                    } else {
                        None
                    };
                    combine(lv, rv, op)
                })
                .collect(),
        };
        Vector {
            name: self.name.clone(),
            dtype: Dtype::Float64,
            cells,
            index: self.index.clone(),
        }
    }
}

fn combine(lv: Option<f64>, rv: Option<f64>, op: ArithOp) -> Cell {
    match (lv, rv) {
        (Some(l), Some(r)) => {
            if matches!(op, ArithOp::Div) && r == 0.0 {
                return Cell::Float(f64::NAN);
            }
            let result = match op {
                ArithOp::Add => l + r,
                ArithOp::Sub => l - r,
                ArithOp::Mul => l * r,
                ArithOp::Div => l / r,
            };
            Cell::Float(result)
        }
        _ => Cell::Na,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_skip_na() {
        let v = Vector::from_cells(vec![Cell::Int(1), Cell::Na, Cell::Int(3)]);
        assert_eq!(v.sum(), 4.0);
        assert_eq!(v.count(), 2);
        assert_eq!(v.mean(), 2.0);
    }

    #[test]
    fn median_even_and_odd() {
        let odd = Vector::from_cells(vec![Cell::Int(1), Cell::Int(3), Cell::Int(2)]);
        assert_eq!(odd.median(), 2.0);
        let even = Vector::from_cells(vec![Cell::Int(1), Cell::Int(2), Cell::Int(3), Cell::Int(4)]);
        assert_eq!(even.median(), 2.5);
    }

    #[test]
    fn var_requires_two_values() {
        let single = Vector::from_cells(vec![Cell::Int(5)]);
        assert!(single.var().is_nan());
        let v = Vector::from_cells(vec![Cell::Int(2), Cell::Int(4), Cell::Int(6)]);
        assert_eq!(v.var(), 4.0);
        assert_eq!(v.std(), 2.0);
    }

    #[test]
    fn min_max_na_when_empty() {
        let empty = Vector::from_cells(vec![Cell::Na, Cell::Na]);
        assert_eq!(empty.min(), Cell::Na);
        assert_eq!(empty.max(), Cell::Na);
        let v = Vector::from_cells(vec![Cell::Int(3), Cell::Int(1), Cell::Int(2)]);
        assert_eq!(v.min(), Cell::Float(1.0));
        assert_eq!(v.max(), Cell::Float(3.0));
    }

    #[test]
    fn unique_and_value_counts() {
        let v = Vector::from_cells(vec![
            Cell::Text("a".into()),
            Cell::Text("b".into()),
            Cell::Text("a".into()),
        ]);
        assert_eq!(v.nunique(), 2);
        let vc = v.value_counts();
        assert_eq!(vc.len(), 2);
        assert_eq!(vc.index().labels()[0], Cell::Text("a".into()));
        assert_eq!(vc.values()[0], Cell::Int(2));
    }

    #[test]
    fn sort_values_stable_na_placement() {
        let v = Vector::from_cells(vec![Cell::Int(2), Cell::Na, Cell::Int(1)]);
        let asc = v.sort_values(true);
        assert_eq!(asc.values(), &[Cell::Int(1), Cell::Int(2), Cell::Na]);
        let desc = v.sort_values(false);
        assert_eq!(desc.values(), &[Cell::Na, Cell::Int(2), Cell::Int(1)]);
    }

    #[test]
    fn arithmetic_scalar_and_vector() {
        let v = Vector::from_cells(vec![Cell::Int(1), Cell::Int(2), Cell::Int(3)]);
        let plus_one = v.add(Operand::Scalar(Cell::Int(1)));
        assert_eq!(plus_one.values(), &[Cell::Float(2.0), Cell::Float(3.0), Cell::Float(4.0)]);

        let short = Vector::from_cells(vec![Cell::Int(10), Cell::Int(20)]);
        let added = v.add(Operand::Vector(&short));
        assert_eq!(added.values(), &[Cell::Float(11.0), Cell::Float(22.0), Cell::Na]);

        let zero = Vector::from_cells(vec![Cell::Int(0), Cell::Int(0), Cell::Int(0)]);
        let divided = v.div(Operand::Vector(&zero));
        assert!(matches!(divided.values()[0], Cell::Float(f) if f.is_nan()));
    }

    #[test]
    fn drop_na_drops_labels_too() {
        let v = Vector::from_cells(vec![Cell::Int(1), Cell::Na, Cell::Int(3)]);
        let dropped = v.drop_na();
        assert_eq!(dropped.len(), 2);
        assert!(dropped.values().iter().all(|c| !is_na(c)));
    }

    #[test]
    fn as_type_error_carries_position() {
        let v = Vector::from_cells(vec![Cell::Text("1".into()), Cell::Text("oops".into())]);
        let err = v.as_type(Dtype::Int64).unwrap_err();
        match err {
            Error::Coercion { position, .. } => assert_eq!(position, 1),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
