//! Merge/join: key resolution, hash-index build/probe, and the four join
//! modes (inner, left, right, outer).

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::value::{compose_key as compose_cells, Cell};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinHow {
    Inner,
    Left,
    Right,
    Outer,
}

/// Merge configuration. Key resolution tries `on`, then `left_on`/
/// `right_on`, then auto-detects by intersecting column names.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    pub how: Option<JoinHow>,
    pub on: Vec<String>,
    pub left_on: Vec<String>,
    pub right_on: Vec<String>,
    pub suffixes: (String, String),
    pub indicator: bool,
}

impl MergeOptions {
    pub fn new(how: JoinHow) -> Self {
        MergeOptions {
            how: Some(how),
            on: Vec::new(),
            left_on: Vec::new(),
            right_on: Vec::new(),
            suffixes: ("_x".to_string(), "_y".to_string()),
            indicator: false,
        }
    }
}

struct ResolvedKeys {
    left: Vec<String>,
    right: Vec<String>,
}

fn resolve_keys(left: &Frame, right: &Frame, opts: &MergeOptions) -> Result<ResolvedKeys> {
    if !opts.on.is_empty() {
        for name in &opts.on {
            if !left.columns().contains(name) || !right.columns().contains(name) {
                return Err(Error::KeySpec(format!("join key '{name}' missing from one side")));
            }
        }
        return Ok(ResolvedKeys {
            left: opts.on.clone(),
            right: opts.on.clone(),
        });
    }
    if !opts.left_on.is_empty() && !opts.right_on.is_empty() {
        if opts.left_on.len() != opts.right_on.len() {
            return Err(Error::KeySpec("left_on/right_on length mismatch".to_string()));
        }
        for name in &opts.left_on {
            if !left.columns().contains(name) {
                return Err(Error::KeySpec(format!("left_on key '{name}' missing from left frame")));
            }
        }
        for name in &opts.right_on {
            if !right.columns().contains(name) {
                return Err(Error::KeySpec(format!("right_on key '{name}' missing from right frame")));
            }
        }
        return Ok(ResolvedKeys {
            left: opts.left_on.clone(),
            right: opts.right_on.clone(),
        });
    }
    let common: Vec<String> = left
        .columns()
        .iter()
        .filter(|c| right.columns().contains(c))
        .cloned()
        .collect();
    if common.is_empty() {
        return Err(Error::KeySpec("no common columns to auto-detect join keys".to_string()));
    }
    Ok(ResolvedKeys {
        left: common.clone(),
        right: common,
    })
}

fn composed_key(frame: &Frame, keys: &[String], pos: usize) -> Result<String> {
    let mut cells = Vec::with_capacity(keys.len());
    for key in keys {
        cells.push(&frame.get_column(key)?[pos]);
    }
    Ok(compose_cells(cells))
}

/// Runs `merge` with `on = keys`.
pub fn join(left: &Frame, right: &Frame, keys: &[&str], how: JoinHow) -> Result<Frame> {
    let mut opts = MergeOptions::new(how);
    opts.on = keys.iter().map(|s| s.to_string()).collect();
    merge(left, right, &opts)
}

/// Runs `merge` with distinct `left_on`/`right_on`.
pub fn merge_on(
    left: &Frame,
    right: &Frame,
    left_keys: &[&str],
    right_keys: &[&str],
    how: JoinHow,
) -> Result<Frame> {
    let mut opts = MergeOptions::new(how);
    opts.left_on = left_keys.iter().map(|s| s.to_string()).collect();
    opts.right_on = right_keys.iter().map(|s| s.to_string()).collect();
    merge(left, right, &opts)
}

pub fn merge(left: &Frame, right: &Frame, opts: &MergeOptions) -> Result<Frame> {
    let how = opts.how.ok_or_else(|| Error::KeySpec("merge options missing 'how'".to_string()))?;
    let keys = resolve_keys(left, right, opts)?;

    let (s_l, s_r) = if opts.suffixes.0.is_empty() && opts.suffixes.1.is_empty() {
        ("_x".to_string(), "_y".to_string())
    } else {
        opts.suffixes.clone()
    };

    // Layout: left columns first (suffixed on collision with a non-key
    // right column), key columns emitted once under the left name, then
    // remaining right columns (suffixed on collision with a non-key left
    // column).
    let mut out_names: Vec<String> = Vec::new();
    let mut left_sources: Vec<(String, bool)> = Vec::new(); // (left col name, is_key)
    for name in left.columns() {
        let is_key = keys.left.contains(name);
        let collides = !is_key && right.columns().contains(name);
        let out_name = if collides { format!("{name}{s_l}") } else { name.clone() };
        out_names.push(out_name);
        left_sources.push((name.clone(), is_key));
    }
    let mut right_sources: Vec<String> = Vec::new();
    for name in right.columns() {
        if keys.right.contains(name) {
            continue; // already emitted once, under the left key name
        }
        let collides = left.columns().contains(name);
        let out_name = if collides { format!("{name}{s_r}") } else { name.clone() };
        out_names.push(out_name);
        right_sources.push(name.clone());
    }
    if opts.indicator {
        out_names.push("_merge".to_string());
    }

    // `rows` holds, per output row, (Some(left_pos), Some(right_pos), tag).
    let rows: Vec<(Option<usize>, Option<usize>, &'static str)> = match how {
        JoinHow::Inner | JoinHow::Left => {
            let right_index = build_index(right, &keys.right)?;
            let mut out = Vec::new();
            for lp in 0..left.nrows() {
                let key = composed_key(left, &keys.left, lp)?;
                match right_index.get(&key) {
                    Some(positions) => {
                        for &rp in positions {
                            out.push((Some(lp), Some(rp), "both"));
                        }
                    }
                    None if how == JoinHow::Left => out.push((Some(lp), None, "left_only")),
                    None => {}
                }
            }
            out
        }
        JoinHow::Right => {
            let left_index = build_index(left, &keys.left)?;
            let mut out = Vec::new();
            for rp in 0..right.nrows() {
                let key = composed_key(right, &keys.right, rp)?;
                match left_index.get(&key) {
                    Some(positions) => {
                        for &lp in positions {
                            out.push((Some(lp), Some(rp), "both"));
                        }
                    }
                    None => out.push((None, Some(rp), "right_only")),
                }
            }
            out
        }
        JoinHow::Outer => {
            let right_index = build_index(right, &keys.right)?;
            let mut out = Vec::new();
            let mut matched_right: HashSet<usize> = HashSet::new();
            for lp in 0..left.nrows() {
                let key = composed_key(left, &keys.left, lp)?;
                match right_index.get(&key) {
                    Some(positions) => {
                        for &rp in positions {
                            matched_right.insert(rp);
                            out.push((Some(lp), Some(rp), "both"));
                        }
                    }
                    None => out.push((Some(lp), None, "left_only")),
                }
            }
            for rp in 0..right.nrows() {
                if !matched_right.contains(&rp) {
                    out.push((None, Some(rp), "right_only"));
                }
            }
            out
        }
    };

    let mut columns: Vec<Vec<Cell>> = vec![Vec::with_capacity(rows.len()); out_names.len()];
    for (lp, rp, tag) in &rows {
        let mut col_idx = 0;
        for (name, is_key) in &left_sources {
            let cell = if *is_key {
                match (lp, rp) {
                    (Some(p), _) => left.get_column(name)?[*p].clone(),
                    (None, Some(p)) => right.get_column(key_counterpart(&keys, name))?[*p].clone(),
                    (None, None) => Cell::Na,
                }
            } else {
                match lp {
                    Some(p) => left.get_column(name)?[*p].clone(),
                    None => Cell::Na,
                }
            };
            columns[col_idx].push(cell);
            col_idx += 1;
        }
        for name in &right_sources {
            let cell = match rp {
                Some(p) => right.get_column(name)?[*p].clone(),
                None => Cell::Na,
            };
            columns[col_idx].push(cell);
            col_idx += 1;
        }
        if opts.indicator {
            columns[col_idx].push(Cell::Text(tag.to_string()));
        }
    }

    Frame::from_columns(out_names.into_iter().zip(columns).collect())
}

/// For an outer/right-only row, the right-side key column name matching a
/// given left key column name.
fn key_counterpart<'a>(keys: &'a ResolvedKeys, left_name: &str) -> &'a str {
    keys.left
        .iter()
        .position(|k| k == left_name)
        .map(|i| keys.right[i].as_str())
        .unwrap_or(left_name)
}

fn build_index(frame: &Frame, keys: &[String]) -> Result<HashMap<String, Vec<usize>>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::with_capacity(frame.nrows());
    for pos in 0..frame.nrows() {
        let key = composed_key(frame, keys, pos)?;
        index.entry(key).or_default().push(pos);
    }
    Ok(index)
}
