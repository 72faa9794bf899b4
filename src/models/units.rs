//! # 单位换算常量
//!
//! pw.x 以 Rydberg 原子单位输出，这里统一换算为 eV 与 Å。
//! 数值取自 CODATA 2014。
//!
//! ## 依赖关系
//! - 被 `parsers/` 使用

/// 1 Ry 对应的 eV
pub const RYDBERG: f64 = 13.605693009;

/// 1 Bohr 对应的 Å
pub const BOHR: f64 = 0.52917721067;

/// 力的换算因子：Ry/Bohr -> eV/Å
pub const FORCE: f64 = RYDBERG / BOHR;
