//! The dynamically typed cell value and its dtype tag.
//!
//! A [`Cell`] is the unit stored at one (row, column) intersection. dtype
//! inference, NA recognition, and coercion between dtypes all live here so
//! that [`crate::vector::Vector`] and [`crate::frame::Frame`] can stay
//! structural.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// The dynamically typed unit held in any column.
#[derive(Debug, Clone)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    /// Seconds since the Unix epoch (naive, no timezone).
    DateTime(i64),
    /// Any value outside the five typed variants above.
    Opaque(String),
    /// Absent/unknown.
    Na,
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Int(a), Cell::Int(b)) => a == b,
            (Cell::Float(a), Cell::Float(b)) => a == b,
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Bool(a), Cell::Bool(b)) => a == b,
            (Cell::DateTime(a), Cell::DateTime(b)) => a == b,
            (Cell::Opaque(a), Cell::Opaque(b)) => a == b,
            (Cell::Na, Cell::Na) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&canonical_text(self))
    }
}

/// Column dtype tag. Advisory: a column may hold cells of other tags, and
/// operators fall back to the opaque path when that happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dtype {
    Int64,
    Float64,
    Text,
    Bool,
    Datetime,
    Opaque,
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Dtype::Int64 => "int64",
            Dtype::Float64 => "float64",
            Dtype::Text => "text",
            Dtype::Bool => "bool",
            Dtype::Datetime => "datetime",
            Dtype::Opaque => "opaque",
        };
        f.write_str(s)
    }
}

/// `true` for the explicit absent marker and for IEEE-754 NaN floats.
///
/// Per spec, NaN is recognized as NA rather than as a distinct "computed but
/// not missing" float, which keeps statistics and arithmetic NA-skipping
/// uniform.
pub fn is_na(cell: &Cell) -> bool {
    match cell {
        Cell::Na => true,
        Cell::Float(f) => f.is_nan(),
        _ => false,
    }
}

/// Normalize a raw input cell at construction time: empty text and the
/// tokens "NA" / "NaN" / "null" become the explicit NA marker.
pub fn normalize(cell: Cell) -> Cell {
    match &cell {
        Cell::Text(s) => {
            let t = s.as_str();
            if t.is_empty() || t == "NA" || t == "NaN" || t == "null" {
                Cell::Na
            } else {
                cell
            }
        }
        _ => cell,
    }
}

/// dtype of a single non-NA cell.
pub fn dtype_of(cell: &Cell) -> Dtype {
    match cell {
        Cell::Int(_) => Dtype::Int64,
        Cell::Float(_) => Dtype::Float64,
        Cell::Text(_) => Dtype::Text,
        Cell::Bool(_) => Dtype::Bool,
        Cell::DateTime(_) => Dtype::Datetime,
        Cell::Opaque(_) | Cell::Na => Dtype::Opaque,
    }
}

/// dtype inferred from a sequence: first non-NA cell wins; all-NA infers
/// opaque.
pub fn infer_dtype<'a, I: IntoIterator<Item = &'a Cell>>(cells: I) -> Dtype {
    for cell in cells {
        if !is_na(cell) {
            return dtype_of(cell);
        }
    }
    Dtype::Opaque
}

/// Canonical string rendering used for display, text coercion, and
/// composed-key hashing in group-by/join.
pub fn canonical_text(cell: &Cell) -> String {
    match cell {
        Cell::Int(i) => i.to_string(),
        Cell::Float(v) => format!("{v:?}"),
        Cell::Text(s) => s.clone(),
        Cell::Bool(b) => b.to_string(),
        Cell::DateTime(ts) => datetime_to_text(*ts),
        Cell::Opaque(s) => s.clone(),
        Cell::Na => "NA".to_string(),
    }
}

/// Best-effort coercion to `f64`. Returns `None` (not an error) so callers
/// that skip non-coercible cells (statistics, arithmetic) can do so cheaply.
pub fn try_as_f64(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Int(i) => Some(*i as f64),
        Cell::Float(f) => Some(*f),
        Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Cell::Text(s) => s.trim().parse::<f64>().ok(),
        Cell::DateTime(ts) => Some(*ts as f64),
        Cell::Opaque(s) => s.trim().parse::<f64>().ok(),
        Cell::Na => None,
    }
}

fn try_as_i64(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Int(i) => Some(*i),
        Cell::Float(f) => Some(*f as i64),
        Cell::Bool(b) => Some(if *b { 1 } else { 0 }),
        Cell::Text(s) => s.trim().parse::<i64>().ok(),
        Cell::DateTime(ts) => Some(*ts),
        Cell::Opaque(s) => s.trim().parse::<i64>().ok(),
        Cell::Na => None,
    }
}

fn as_bool(cell: &Cell) -> bool {
    match cell {
        Cell::Bool(b) => *b,
        Cell::Int(i) => *i != 0,
        Cell::Float(f) => *f != 0.0,
        Cell::Text(s) | Cell::Opaque(s) => {
            let t = s.trim();
            !(t.is_empty() || t == "0" || t.eq_ignore_ascii_case("false"))
        }
        Cell::DateTime(_) => true,
        Cell::Na => false,
    }
}

fn try_parse_datetime_text(s: &str) -> Option<i64> {
    let t = s.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(t) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc().timestamp());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc().timestamp());
    }
    if let Ok(d) = NaiveDate::parse_from_str(t, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc().timestamp());
    }
    for fmt in ["%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc().timestamp());
        }
    }
    None
}

fn datetime_to_text(ts: i64) -> String {
    match chrono::DateTime::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}

/// Coerce `cell` to `target`. NA coerces to NA under every target.
/// `position` is carried into any `Error::Coercion` for diagnostics.
pub fn coerce(cell: &Cell, target: Dtype, position: usize) -> Result<Cell> {
    if is_na(cell) {
        return Ok(Cell::Na);
    }
    match target {
        Dtype::Int64 => try_as_i64(cell).map(Cell::Int).ok_or_else(|| Error::Coercion {
            position,
            message: format!("cannot coerce {cell} to int64"),
        }),
        Dtype::Float64 => try_as_f64(cell).map(Cell::Float).ok_or_else(|| Error::Coercion {
            position,
            message: format!("cannot coerce {cell} to float64"),
        }),
        Dtype::Text => Ok(Cell::Text(canonical_text(cell))),
        Dtype::Bool => Ok(Cell::Bool(as_bool(cell))),
        Dtype::Datetime => match cell {
            Cell::DateTime(ts) => Ok(Cell::DateTime(*ts)),
            Cell::Text(s) | Cell::Opaque(s) => {
                try_parse_datetime_text(s).map(Cell::DateTime).ok_or_else(|| Error::Coercion {
                    position,
                    message: format!("cannot parse '{s}' as datetime"),
                })
            }
            Cell::Int(i) => Ok(Cell::DateTime(*i)),
            Cell::Float(v) => Ok(Cell::DateTime(*v as i64)),
            _ => Err(Error::Coercion {
                position,
                message: format!("cannot coerce {cell} to datetime"),
            }),
        },
        Dtype::Opaque => Ok(cell.clone()),
    }
}

/// Null-separated (U+0000) concatenation of each cell's canonical text
/// rendering. Shared by group-by and join so the two use identical key
/// composition — including the fact that numerically-equal-but-
/// textually-distinct values (`1` vs `1.0`) compose to different keys.
pub fn compose_key<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> String {
    cells
        .into_iter()
        .map(canonical_text)
        .collect::<Vec<_>>()
        .join("\u{0000}")
}

/// Ordering comparator: numeric coercion first, lexicographic fallback.
/// Does not special-case NA — callers bucket NA separately (NA-last
/// ascending / NA-first descending) before invoking this.
pub fn compare_order(a: &Cell, b: &Cell) -> Ordering {
    match (try_as_f64(a), try_as_f64(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => canonical_text(a).cmp(&canonical_text(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn na_recognizes_explicit_and_nan() {
        assert!(is_na(&Cell::Na));
        assert!(is_na(&Cell::Float(f64::NAN)));
        assert!(!is_na(&Cell::Float(0.0)));
        assert!(!is_na(&Cell::Int(0)));
    }

    #[test]
    fn normalize_text_markers() {
        assert_eq!(normalize(Cell::Text(String::new())), Cell::Na);
        assert_eq!(normalize(Cell::Text("NA".into())), Cell::Na);
        assert_eq!(normalize(Cell::Text("NaN".into())), Cell::Na);
        assert_eq!(normalize(Cell::Text("null".into())), Cell::Na);
        assert_eq!(normalize(Cell::Text("hi".into())), Cell::Text("hi".into()));
    }

    #[test]
    fn infer_dtype_skips_na() {
        let cells = vec![Cell::Na, Cell::Na, Cell::Int(3)];
        assert_eq!(infer_dtype(&cells), Dtype::Int64);
        let all_na = vec![Cell::Na, Cell::Na];
        assert_eq!(infer_dtype(&all_na), Dtype::Opaque);
    }

    #[test]
    fn canonical_text_distinguishes_int_and_float() {
        assert_eq!(canonical_text(&Cell::Int(1)), "1");
        assert_eq!(canonical_text(&Cell::Float(1.0)), "1.0");
    }

    #[test]
    fn coerce_text_to_int() {
        let c = coerce(&Cell::Text("42".into()), Dtype::Int64, 0).unwrap();
        assert_eq!(c, Cell::Int(42));
    }

    #[test]
    fn coerce_failure_carries_position() {
        let err = coerce(&Cell::Text("nope".into()), Dtype::Int64, 7).unwrap_err();
        match err {
            Error::Coercion { position, .. } => assert_eq!(position, 7),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn coerce_bool_rules() {
        assert_eq!(coerce(&Cell::Text("".into()), Dtype::Bool, 0).unwrap(), Cell::Bool(false));
        assert_eq!(coerce(&Cell::Text("0".into()), Dtype::Bool, 0).unwrap(), Cell::Bool(false));
        assert_eq!(coerce(&Cell::Text("false".into()), Dtype::Bool, 0).unwrap(), Cell::Bool(false));
        assert_eq!(coerce(&Cell::Text("yes".into()), Dtype::Bool, 0).unwrap(), Cell::Bool(true));
        assert_eq!(coerce(&Cell::Int(5), Dtype::Bool, 0).unwrap(), Cell::Bool(true));
    }

    #[test]
    fn coerce_datetime_formats() {
        let formats = [
            "2024-01-02T03:04:05",
            "2024-01-02 03:04:05",
            "2024-01-02",
            "2024/01/02",
            "01/02/2024",
            "02-01-2024",
        ];
        for f in formats {
            let c = coerce(&Cell::Text(f.into()), Dtype::Datetime, 0);
            assert!(c.is_ok(), "failed to parse {f}");
        }
    }

    #[test]
    fn compare_order_numeric_first() {
        assert_eq!(compare_order(&Cell::Int(1), &Cell::Float(2.0)), Ordering::Less);
        assert_eq!(
            compare_order(&Cell::Text("a".into()), &Cell::Text("b".into())),
            Ordering::Less
        );
    }
}
