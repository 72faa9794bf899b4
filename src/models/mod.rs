//! # 数据模型模块
//!
//! 定义计算设置、读取结果与单位换算常量。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `session/` 和 `commands/` 使用
//! - 子模块: calculation, result, units

pub mod calculation;
pub mod result;
pub mod units;

pub use calculation::{CalculationKind, Occupations, ScfSettings, SmearingKind};
pub use result::{AtomOccupation, Occupation, RunResult};
