//! # CSV 导出
//!
//! 批量重放汇总写成一行一个日志的 CSV。

use super::ReplaySummary;
use crate::error::{EspressoError, Result};

use std::path::Path;

/// 保存汇总到 CSV
pub fn save_summary_csv(summaries: &[ReplaySummary], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for summary in summaries {
        wtr.serialize(summary)?;
    }

    wtr.flush().map_err(|e| EspressoError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
