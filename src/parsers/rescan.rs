//! # 日志重扫描
//!
//! pw.x 内部弛豫/动力学会输出多个 `!    total energy` 行，只有最后一个
//! 是最终结果。读取周期结束后重新打开持久日志，从最后一个能量行
//! 重新读取能量（以及可选的受力），以日志内容为准。
//!
//! ## 依赖关系
//! - 被 `parsers/scf_stream.rs` 调用
//! - 使用 `parsers/final_block.rs`, `session/transcript.rs`

use super::final_block::{read_final_block, FinalBlock};
use super::LogLines;
use crate::error::{EspressoError, Result};
use crate::models::ScfSettings;
use crate::session::transcript::read_log_lines;

use std::path::Path;

const LAST_ENERGY: &str = "!    total";

/// 从日志中最后一个能量行重新读取最终结果
pub fn final_block(log_path: &Path, settings: &ScfSettings) -> Result<FinalBlock> {
    let mut lines = read_log_lines(log_path)?;
    let n = lines
        .iter()
        .rposition(|l| l.contains(LAST_ENERGY))
        .ok_or_else(|| EspressoError::MalformedLog {
            path: log_path.display().to_string(),
            reason: "no total energy line found".to_string(),
        })?;

    let mut tail = lines.split_off(n).into_iter();
    let energy_line = tail.next().unwrap_or_default();
    let mut feed = LogLines::new(tail.collect());
    read_final_block(&mut feed, &energy_line, settings, settings.rescans_forces())
}
