use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CobertaError;

// One block per report line: file:startLine.startCol,endLine.endCol numStmt count
static BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+):(\d+)\.(\d+),(\d+)\.(\d+) (\d+) (\d+)$").unwrap());

const MODE_PREFIX: &str = "mode: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Set,
    Count,
    Atomic,
}

impl Mode {
    fn from_header(raw: &str) -> Option<Mode> {
        match raw {
            "set" => Some(Mode::Set),
            "count" => Some(Mode::Count),
            "atomic" => Some(Mode::Atomic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileBlock {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
    pub num_stmt: u32,
    pub count: u64,
}

impl ProfileBlock {
    fn same_range(&self, other: &ProfileBlock) -> bool {
        self.start_line == other.start_line
            && self.start_col == other.start_col
            && self.end_line == other.end_line
            && self.end_col == other.end_col
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub file_name: String,
    pub mode: Mode,
    pub blocks: Vec<ProfileBlock>,
}

pub fn parse_profiles(text: &str) -> Result<Vec<Profile>, CobertaError> {
    let mut lines = text.lines();
    let mode = parse_mode_line(lines.next().unwrap_or(""))?;

    let mut blocks_by_file: BTreeMap<String, Vec<ProfileBlock>> = BTreeMap::new();
    for line in lines {
        let Some((file_name, block)) = parse_block_line(line) else {
            continue;
        };
        blocks_by_file.entry(file_name).or_default().push(block);
    }

    blocks_by_file
        .into_iter()
        .map(|(file_name, blocks)| {
            let blocks = merge_same_ranges(sort_blocks(blocks), mode)?;
            Ok(Profile {
                file_name,
                mode,
                blocks,
            })
        })
        .collect()
}

fn parse_mode_line(line: &str) -> Result<Mode, CobertaError> {
    line.strip_prefix(MODE_PREFIX)
        .and_then(Mode::from_header)
        .ok_or_else(|| CobertaError::BadModeLine {
            line: line.to_string(),
        })
}

// Anything that does not match the block pattern (blank lines, stray build
// output) is skipped rather than rejected.
fn parse_block_line(line: &str) -> Option<(String, ProfileBlock)> {
    let caps = BLOCK_RE.captures(line)?;
    let field = |index: usize| caps.get(index).map(|m| m.as_str());
    Some((
        field(1)?.to_string(),
        ProfileBlock {
            start_line: field(2)?.parse().ok()?,
            start_col: field(3)?.parse().ok()?,
            end_line: field(4)?.parse().ok()?,
            end_col: field(5)?.parse().ok()?,
            num_stmt: field(6)?.parse().ok()?,
            count: field(7)?.parse().ok()?,
        },
    ))
}

fn sort_blocks(mut blocks: Vec<ProfileBlock>) -> Vec<ProfileBlock> {
    blocks.sort_by_key(|block| (block.start_line, block.start_col));
    blocks
}

// Repeated runs of the same build report the same ranges again; samples for
// an identical range accumulate as boolean-or in set mode, as a tally
// otherwise. The statement count of a range must never change between runs.
fn merge_same_ranges(
    blocks: Vec<ProfileBlock>,
    mode: Mode,
) -> Result<Vec<ProfileBlock>, CobertaError> {
    let mut merged: Vec<ProfileBlock> = Vec::with_capacity(blocks.len());
    for block in blocks {
        match merged.last_mut() {
            Some(last) if last.same_range(&block) => {
                if last.num_stmt != block.num_stmt {
                    return Err(CobertaError::InconsistentStatementCount {
                        from: last.num_stmt,
                        to: block.num_stmt,
                    });
                }
                last.count = match mode {
                    Mode::Set => last.count | block.count,
                    Mode::Count | Mode::Atomic => last.count.saturating_add(block.count),
                };
            }
            _ => merged.push(block),
        }
    }
    Ok(merged)
}
