//! # 计算结果数据模型
//!
//! 一次完整读取周期产出的不可变结果：能量、熵修正、受力、磁矩与
//! 原子 Hubbard 占据数。
//!
//! ## 依赖关系
//! - 被 `parsers/scf_stream.rs` 构造
//! - 被 `report/` 与 `commands/` 使用

use serde::Serialize;
use std::collections::BTreeMap;

/// 单个原子的占据数
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Occupation {
    /// 非自旋极化：Tr[ns(na)] 的一半
    Total(f64),
    /// 自旋分辨：(up, down, total)
    SpinResolved { up: f64, down: f64, total: f64 },
}

impl Occupation {
    /// up - down，仅自旋分辨时有意义
    pub fn moment(&self) -> Option<f64> {
        match self {
            Occupation::Total(_) => None,
            Occupation::SpinResolved { up, down, .. } => Some(up - down),
        }
    }
}

/// 原子的初始与自洽占据数
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AtomOccupation {
    /// 第一次迭代时的占据数
    pub start: Option<Occupation>,
    /// 自洽收敛后的占据数
    pub self_consistent: Option<Occupation>,
}

/// 一次读取周期的结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResult {
    /// 自由能 (eV)
    pub energy_free: Option<f64>,

    /// 外推到 sigma -> 0 的能量 (eV)
    pub energy_zero: Option<f64>,

    /// 展宽熵修正 -TS (eV)
    pub entropy_correction: f64,

    /// 原子受力 (eV/Å)，按原子顺序
    pub forces: Option<Vec<[f64; 3]>>,

    /// 原子磁矩 (μB)
    pub magnetic_moments: Vec<f64>,

    /// 总磁矩 (μB)
    pub total_magnetic_moment: f64,

    /// 以 0 起始原子序号为键的占据数
    pub atomic_occupations: BTreeMap<usize, AtomOccupation>,
}

impl RunResult {
    /// 最大受力分量模长
    pub fn max_force(&self) -> Option<f64> {
        self.forces.as_ref().map(|forces| {
            forces
                .iter()
                .map(|f| (f[0] * f[0] + f[1] * f[1] + f[2] * f[2]).sqrt())
                .fold(0.0, f64::max)
        })
    }
}
