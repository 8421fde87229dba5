//! In-memory columnar dataframe and analytics engine.
//!
//! A small, dependency-light analytics kernel: a dynamically typed
//! [`value::Cell`], a labeled [`vector::Vector`] column, a 2-D
//! [`frame::Frame`] table, [`groupby::GroupBy`] aggregation,
//! [`join`]/[`concat`] set operators, and a [`parallel`] fabric built on
//! `rayon` for the primitives worth parallelizing.
//!
//! No query planner, no wire protocol, no persistence: those live outside
//! this crate. Reading external formats happens through the narrow
//! [`external::RowProvider`]/[`external::RowSink`] traits, implemented by
//! adapter crates this one doesn't depend on.

pub mod concat;
pub mod error;
pub mod external;
pub mod frame;
pub mod groupby;
pub mod index;
pub mod join;
pub mod parallel;
pub mod value;
pub mod vector;

pub use concat::concat;
pub use error::{Error, Result};
pub use external::{frame_from_provider, frame_to_sink, RowProvider, RowSink};
pub use frame::{ColSelector, Frame, Row, RowSelector, RowView};
pub use groupby::GroupBy;
pub use index::Index;
pub use join::{join, merge, merge_on, JoinHow, MergeOptions};
pub use parallel::{
    chunked_apply, parallel_agg, parallel_apply, parallel_chunked_apply, parallel_filter, parallel_read,
    parallel_transform, ParallelOptions,
};
pub use value::{Cell, Dtype};
pub use vector::{Operand, Vector};
