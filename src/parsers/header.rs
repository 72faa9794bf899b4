//! # 原子数检测
//!
//! 未在命令行给出原子数时：
//! - 实时计算从输入文件 `&SYSTEM` 中的 `nat = N` 读取
//! - 重放日志从输出头部的 `number of atoms/cell      =            2` 读取
//!
//! ## 依赖关系
//! - 被 `commands/run.rs`, `commands/replay.rs` 使用

use crate::error::{EspressoError, Result};
use crate::session::transcript::read_log_lines;

use regex::Regex;
use std::path::Path;

const OUTPUT_PATTERN: &str = r"number of atoms/cell\s*=\s*(\d+)";
const INPUT_PATTERN: &str = r"(?i)\bnat\s*=\s*(\d+)";

/// 从 pw.x 输出中读取原子数；找不到时返回 `Ok(None)`
pub fn detect_atom_count(path: &Path) -> Result<Option<usize>> {
    let lines = read_log_lines(path)?;
    first_capture(&lines, OUTPUT_PATTERN)
}

/// 从 pw.x 输入中读取 `nat`；找不到时返回 `Ok(None)`
pub fn detect_input_nat(path: &Path) -> Result<Option<usize>> {
    let lines = read_log_lines(path)?;
    first_capture(&lines, INPUT_PATTERN)
}

fn first_capture(lines: &[String], pattern: &str) -> Result<Option<usize>> {
    let re = Regex::new(pattern)
        .map_err(|e| EspressoError::Other(format!("Invalid regex: {}", e)))?;

    Ok(lines
        .iter()
        .find_map(|l| re.captures(l))
        .and_then(|caps| caps[1].parse().ok()))
}
