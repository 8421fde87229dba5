//! Bounded-worker data parallelism over vectors, frames, and group-bys.
//!
//! Every primitive here must produce the same output as its sequential
//! counterpart, modulo floating-point order-of-addition differences in
//! `sum`/`mean`/`var`/`std` aggregates.

use std::collections::HashMap;
use std::sync::Mutex;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::error::Result;
use crate::frame::Frame;
use crate::groupby::{Aggregator, GroupBy};
use crate::value::{normalize, Cell, Dtype};
use crate::vector::Vector;

/// Worker/chunk sizing shared by every primitive below.
#[derive(Debug, Clone, Copy)]
pub struct ParallelOptions {
    /// 0 means auto-size from `chunk_size` and the available CPU count.
    pub num_workers: usize,
    pub chunk_size: usize,
}

impl Default for ParallelOptions {
    fn default() -> Self {
        ParallelOptions {
            num_workers: 0,
            chunk_size: 1000,
        }
    }
}

impl ParallelOptions {
    pub fn worker_count(&self, data_size: usize) -> usize {
        if self.num_workers > 0 {
            return self.num_workers;
        }
        let chunk = self.chunk_size.max(1);
        let chunks = data_size.div_ceil(chunk).max(1);
        available_parallelism().min(chunks).max(1)
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn build_pool(workers: usize) -> rayon::ThreadPool {
    ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .expect("worker count is always at least 1")
}

/// Splits `n` positions into `workers` contiguous, near-equal ranges.
fn contiguous_ranges(n: usize, workers: usize) -> Vec<(usize, usize)> {
    let workers = workers.max(1);
    let base = n / workers;
    let rem = n % workers;
    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for w in 0..workers {
        let extra = usize::from(w < rem);
        let end = start + base + extra;
        if start < end {
            ranges.push((start, end));
        }
        start = end;
    }
    ranges
}

/// Partitions cell positions into contiguous per-worker ranges and writes
/// results into a pre-allocated output at the same positions.
pub fn parallel_apply(vector: &Vector, f: impl Fn(&Cell) -> Cell + Sync, opts: &ParallelOptions) -> Vector {
    let n = vector.len();
    let mut cells = vec![Cell::Na; n];
    if n > 0 {
        let workers = opts.worker_count(n);
        let pool = build_pool(workers);
        let ranges = contiguous_ranges(n, workers);
        let chunks: Vec<Vec<Cell>> = pool.install(|| {
            ranges
                .par_iter()
                .map(|&(start, end)| {
                    (start..end)
                        .map(|i| normalize(f(&vector.values()[i])))
                        .collect()
                })
                .collect()
        });
        for ((start, end), chunk) in ranges.iter().zip(chunks) {
            cells[*start..*end].clone_from_slice(&chunk);
        }
    }
    Vector::from_parts(vector.name().map(String::from), Dtype::Opaque, cells, vector.index().clone())
}

/// Partitions rows into contiguous ranges; each worker collects passing
/// positions, the main thread concatenates per-worker lists in ascending
/// worker-id order, which preserves source order.
pub fn parallel_filter(frame: &Frame, pred: impl Fn(&crate::frame::RowView) -> bool + Sync, opts: &ParallelOptions) -> Frame {
    let n = frame.nrows();
    if n == 0 {
        return frame.select_positions(&[]);
    }
    let workers = opts.worker_count(n);
    let pool = build_pool(workers);
    let ranges = contiguous_ranges(n, workers);
    let per_worker: Vec<Vec<usize>> = pool.install(|| {
        ranges
            .par_iter()
            .map(|&(start, end)| (start..end).filter(|&pos| pred(&frame.row_view(pos))).collect())
            .collect()
    });
    let keep: Vec<usize> = per_worker.into_iter().flatten().collect();
    frame.select_positions(&keep)
}

/// Distributes columns over workers via rayon's work queue; each worker
/// calls `f` independently; writes are serialized under a mutex around
/// the result map. Column order in the result is the source order.
pub fn parallel_transform(
    frame: &Frame,
    f: impl Fn(&[Cell]) -> Vec<Cell> + Sync,
    opts: &ParallelOptions,
) -> Result<Frame> {
    let names = frame.columns().to_vec();
    let workers = opts.worker_count(names.len().max(1));
    let pool = build_pool(workers);
    let result: Mutex<HashMap<String, Vec<Cell>>> = Mutex::new(HashMap::with_capacity(names.len()));
    pool.install(|| {
        names.par_iter().for_each(|name| {
            let source = frame.get_column(name).expect("name drawn from frame.columns()");
            let transformed = f(source);
            result.lock().expect("result map mutex is never poisoned").insert(name.clone(), transformed);
        });
    });
    let map = result.into_inner().expect("pool.install joined before this point");
    let columns: Vec<(String, Vec<Cell>)> = names.into_iter().map(|n| (n.clone(), map[&n].clone())).collect();
    Frame::from_columns(columns)
}

/// Partitions *groups* (not rows) into contiguous ranges; each worker
/// computes its groups' key values and aggregates independently into a
/// disjoint result slot, keyed by first-appearance position. The main
/// thread then assembles the frame in group-appearance order.
///
/// Diverges from sequential `agg`: a missing aggregation column returns
/// an empty frame rather than `Error::NotFound`.
pub fn parallel_agg(gb: &GroupBy, map: &[(String, Vec<Aggregator>)], opts: &ParallelOptions) -> Result<Frame> {
    for (column, _) in map {
        if gb.frame().get_column(column).is_err() {
            return Frame::from_columns(Vec::new());
        }
    }

    let order = gb.order();
    let n = order.len();
    let keys = gb.keys();
    let frame = gb.frame();
    let groups = gb.groups_map();

    if n == 0 {
        let mut columns: Vec<(String, Vec<Cell>)> = keys.iter().map(|k| (k.clone(), Vec::new())).collect();
        for (column, aggs) in map {
            for k in 0..aggs.len() {
                columns.push((format!("{column}_{k}"), Vec::new()));
            }
        }
        return Frame::from_columns(columns);
    }

    let workers = opts.worker_count(n);
    let pool = build_pool(workers);
    let ranges = contiguous_ranges(n, workers);

    let chunk_results: Vec<Vec<(Vec<Cell>, Vec<Cell>)>> = pool.install(|| {
        ranges
            .par_iter()
            .map(|&(start, end)| {
                order[start..end]
                    .iter()
                    .map(|key| {
                        let positions = &groups[key];
                        let key_values: Vec<Cell> = keys
                            .iter()
                            .map(|k| frame.get_column(k).expect("validated at GroupBy::new")[positions[0]].clone())
                            .collect();
                        let mut agg_values = Vec::new();
                        for (column, aggs) in map {
                            let cells: Vec<Cell> = positions
                                .iter()
                                .map(|&p| frame.get_column(column).expect("checked above")[p].clone())
                                .collect();
                            for agg in aggs {
                                agg_values.push(agg(&cells));
                            }
                        }
                        (key_values, agg_values)
                    })
                    .collect()
            })
            .collect()
    });

    let total_agg_cols: usize = map.iter().map(|(_, aggs)| aggs.len()).sum();
    let mut key_cols: Vec<Vec<Cell>> = vec![Vec::with_capacity(n); keys.len()];
    let mut agg_cols: Vec<Vec<Cell>> = vec![Vec::with_capacity(n); total_agg_cols];

    for chunk in chunk_results {
        for (key_values, agg_values) in chunk {
            for (col, v) in key_cols.iter_mut().zip(key_values) {
                col.push(v);
            }
            for (col, v) in agg_cols.iter_mut().zip(agg_values) {
                col.push(v);
            }
        }
    }

    let mut columns: Vec<(String, Vec<Cell>)> = keys.iter().cloned().zip(key_cols).collect();
    let mut idx = 0;
    for (column, aggs) in map {
        for k in 0..aggs.len() {
            columns.push((format!("{column}_{k}"), std::mem::take(&mut agg_cols[idx])));
            idx += 1;
        }
    }
    Frame::from_columns(columns)
}

/// Applies `f` over a shared queue of identifiers, then concatenates the
/// resulting frames in input order. The first error stops emission.
pub fn parallel_read<T: Sync>(ids: &[T], f: impl Fn(&T) -> Result<Frame> + Sync, opts: &ParallelOptions) -> Result<Frame> {
    if ids.is_empty() {
        return Frame::from_columns(Vec::new());
    }
    let workers = opts.worker_count(ids.len());
    let pool = build_pool(workers);
    let frames: Vec<Frame> = pool.install(|| ids.par_iter().map(|id| f(id)).collect::<Result<Vec<Frame>>>())?;
    crate::concat::concat(&frames)
}

/// Sequential chunked map: applies `f` to each fixed-size chunk of cells
/// in order.
pub fn chunked_apply(vector: &Vector, f: impl Fn(&[Cell]) -> Vec<Cell>, chunk_size: usize) -> Vector {
    let chunk_size = chunk_size.max(1);
    let mut cells = Vec::with_capacity(vector.len());
    for chunk in vector.values().chunks(chunk_size) {
        cells.extend(f(chunk));
    }
    Vector::from_parts(vector.name().map(String::from), Dtype::Opaque, cells, vector.index().clone())
}

/// Sends fixed-size chunks through a shared index queue; each worker
/// processes one chunk at a time, and results are concatenated in
/// ascending chunk-index order.
pub fn parallel_chunked_apply(
    vector: &Vector,
    f: impl Fn(&[Cell]) -> Vec<Cell> + Sync,
    chunk_size: usize,
    opts: &ParallelOptions,
) -> Vector {
    let chunk_size = chunk_size.max(1);
    let chunks: Vec<&[Cell]> = vector.values().chunks(chunk_size).collect();
    if chunks.is_empty() {
        return Vector::from_parts(vector.name().map(String::from), Dtype::Opaque, Vec::new(), vector.index().clone());
    }
    let workers = opts.worker_count(chunks.len());
    let pool = build_pool(workers);
    let results: Vec<Vec<Cell>> = pool.install(|| chunks.par_iter().map(|chunk| f(chunk)).collect());
    let cells: Vec<Cell> = results.into_iter().flatten().collect();
    Vector::from_parts(vector.name().map(String::from), Dtype::Opaque, cells, vector.index().clone())
}
