//! Vertical stacking of frames under the first frame's column layout.

use crate::error::Result;
use crate::frame::Frame;
use crate::value::Cell;

/// Stacks `frames` vertically. The first frame's column layout is
/// canonical: a later frame missing a canonical column contributes NA for
/// its rows, and columns present only in later frames are discarded. The
/// result owns a fresh range index.
pub fn concat(frames: &[Frame]) -> Result<Frame> {
    let Some(first) = frames.first() else {
        return Frame::from_columns(Vec::new());
    };
    let columns = first.columns().to_vec();
    let mut out: Vec<Vec<Cell>> = columns.iter().map(|_| Vec::new()).collect();

    for frame in frames {
        for (slot, name) in columns.iter().enumerate() {
            match frame.get_column(name) {
                Ok(cells) => out[slot].extend_from_slice(cells),
                Err(_) => out[slot].extend(std::iter::repeat(Cell::Na).take(frame.nrows())),
            }
        }
    }

    Frame::from_columns(columns.into_iter().zip(out).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacks_under_first_frame_layout() {
        let a = Frame::from_columns(vec![
            ("x".to_string(), vec![Cell::Int(1), Cell::Int(2)]),
            ("y".to_string(), vec![Cell::Text("p".into()), Cell::Text("q".into())]),
        ])
        .unwrap();
        let b = Frame::from_columns(vec![("x".to_string(), vec![Cell::Int(3)])]).unwrap();
        let out = concat(&[a, b]).unwrap();
        assert_eq!(out.nrows(), 3);
        assert_eq!(out.columns(), &["x", "y"]);
        assert_eq!(out.get_column("x").unwrap(), &[Cell::Int(1), Cell::Int(2), Cell::Int(3)]);
        assert_eq!(out.get_column("y").unwrap(), &[Cell::Text("p".into()), Cell::Text("q".into()), Cell::Na]);
    }

    #[test]
    fn drops_columns_not_in_first_frame() {
        let a = Frame::from_columns(vec![("x".to_string(), vec![Cell::Int(1)])]).unwrap();
        let b = Frame::from_columns(vec![
            ("x".to_string(), vec![Cell::Int(2)]),
            ("extra".to_string(), vec![Cell::Int(9)]),
        ])
        .unwrap();
        let out = concat(&[a, b]).unwrap();
        assert_eq!(out.columns(), &["x"]);
    }

    #[test]
    fn fresh_range_index() {
        let a = Frame::from_columns(vec![("x".to_string(), vec![Cell::Int(1), Cell::Int(2)])]).unwrap();
        let b = Frame::from_columns(vec![("x".to_string(), vec![Cell::Int(3)])]).unwrap();
        let out = concat(&[a, b]).unwrap();
        assert_eq!(out.index().labels(), &[Cell::Int(0), Cell::Int(1), Cell::Int(2)]);
    }
}
