//! Boundary traits for frame construction and export. File-format parsing
//! (CSV, Parquet, ...) is deliberately out of scope; these traits are the
//! only contract an external adapter crate needs to satisfy.

use crate::error::Result;
use crate::frame::Frame;
use crate::value::Cell;

/// A finite sequence of rows with a shared header. An absent cell,
/// including one missing at the tail of a short row, is `Cell::Na`:
/// `frame_from_provider` pads any row shorter than `header()` with
/// `Cell::Na` before handing rows to the frame constructor.
pub trait RowProvider {
    fn header(&self) -> &[String];
    fn rows(&self) -> Result<Vec<Vec<Cell>>>;
}

/// Consumed by export adapters: iterates a frame by row position,
/// delivering the row label and its (column name, cell) pairs in
/// canonical column order. Whether a concrete sink actually emits the
/// label or a header, and under what name, is the adapter's own
/// configuration — not part of this contract.
pub trait RowSink {
    fn write_row(&mut self, label: &Cell, cells: &[(String, Cell)]) -> Result<()>;
}

/// Builds a frame from any [`RowProvider`], padding short rows with
/// `Cell::Na` up to the header length per the row-provider contract.
pub fn frame_from_provider(provider: &impl RowProvider) -> Result<Frame> {
    let header = provider.header().to_vec();
    let mut rows = provider.rows()?;
    for row in &mut rows {
        if row.len() < header.len() {
            row.resize(header.len(), Cell::Na);
        }
    }
    Frame::from_rows(header, rows)
}

/// Writes every row of `frame` to `sink` in index order.
pub fn frame_to_sink(frame: &Frame, sink: &mut impl RowSink) -> Result<()> {
    for pos in 0..frame.nrows() {
        let row = frame.row(pos)?;
        sink.write_row(&row.label, &row.values)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct VecProvider {
        header: Vec<String>,
        rows: Vec<Vec<Cell>>,
    }

    impl RowProvider for VecProvider {
        fn header(&self) -> &[String] {
            &self.header
        }
        fn rows(&self) -> Result<Vec<Vec<Cell>>> {
            Ok(self.rows.clone())
        }
    }

    struct VecSink {
        written: Vec<(Cell, Vec<(String, Cell)>)>,
    }

    impl RowSink for VecSink {
        fn write_row(&mut self, label: &Cell, cells: &[(String, Cell)]) -> Result<()> {
            self.written.push((label.clone(), cells.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn round_trips_through_both_traits() {
        let provider = VecProvider {
            header: vec!["a".to_string(), "b".to_string()],
            rows: vec![vec![Cell::Int(1), Cell::Text("x".into())]],
        };
        let frame = frame_from_provider(&provider).unwrap();
        let mut sink = VecSink { written: Vec::new() };
        frame_to_sink(&frame, &mut sink).unwrap();
        assert_eq!(sink.written.len(), 1);
        assert_eq!(sink.written[0].0, Cell::Int(0));
        assert_eq!(sink.written[0].1, vec![("a".to_string(), Cell::Int(1)), ("b".to_string(), Cell::Text("x".into()))]);
    }

    #[test]
    fn pads_short_rows_with_na() {
        let provider = VecProvider {
            header: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            rows: vec![vec![Cell::Int(1)], vec![Cell::Int(2), Cell::Int(3), Cell::Int(4)]],
        };
        let frame = frame_from_provider(&provider).unwrap();
        assert_eq!(frame.get_column("b").unwrap()[0], Cell::Na);
        assert_eq!(frame.get_column("c").unwrap()[0], Cell::Na);
        assert_eq!(frame.get_column("c").unwrap()[1], Cell::Int(4));
    }
}
