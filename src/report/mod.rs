//! # 结果报告模块
//!
//! 终端表格 (`tabled`) 与 CSV 导出 (`csv` + `serde`)。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/result.rs`
//! - 子模块: table, export

pub mod export;
pub mod table;

use crate::models::RunResult;
use serde::Serialize;

/// 批量重放中单个日志的汇总
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub file: String,
    pub status: String,
    pub energy_free_ev: Option<f64>,
    pub energy_zero_ev: Option<f64>,
    pub entropy_correction_ev: Option<f64>,
    pub max_force_ev_per_a: Option<f64>,
    pub total_magnetic_moment: Option<f64>,
    pub error: Option<String>,
}

impl ReplaySummary {
    pub fn success(file: impl Into<String>, result: &RunResult) -> Self {
        ReplaySummary {
            file: file.into(),
            status: "ok".to_string(),
            energy_free_ev: result.energy_free,
            energy_zero_ev: result.energy_zero,
            entropy_correction_ev: Some(result.entropy_correction),
            max_force_ev_per_a: result.max_force(),
            total_magnetic_moment: Some(result.total_magnetic_moment),
            error: None,
        }
    }

    pub fn failure(file: impl Into<String>, error: impl Into<String>) -> Self {
        ReplaySummary {
            file: file.into(),
            status: "failed".to_string(),
            energy_free_ev: None,
            energy_zero_ev: None,
            entropy_correction_ev: None,
            max_force_ev_per_a: None,
            total_magnetic_moment: None,
            error: Some(error.into()),
        }
    }
}
