//! # 计算设置数据模型
//!
//! 描述一次 pw.x 计算中与输出解析相关的设置：计算类型、占据方式、
//! 展宽类型、离子动力学、Hubbard 投影类型等。
//!
//! ## 依赖关系
//! - 被 `parsers/scf_stream.rs`, `parsers/rescan.rs` 使用
//! - 被 `cli/settings.rs` 构造

use crate::error::{EspressoError, Result};
use serde::Serialize;
use std::str::FromStr;

/// pw.x 计算类型 (`calculation = ...`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CalculationKind {
    Scf,
    Nscf,
    Bands,
    Relax,
    VcRelax,
    Md,
    VcMd,
}

impl CalculationKind {
    /// 输出中包含总能量和力的计算类型
    pub fn reports_energy(&self) -> bool {
        matches!(
            self,
            CalculationKind::Scf
                | CalculationKind::Relax
                | CalculationKind::VcRelax
                | CalculationKind::Md
                | CalculationKind::VcMd
        )
    }

    /// pw.x 内部进行离子弛豫/动力学，会输出多个能量标记行
    pub fn has_internal_relaxation(&self) -> bool {
        matches!(
            self,
            CalculationKind::Relax
                | CalculationKind::VcRelax
                | CalculationKind::Md
                | CalculationKind::VcMd
        )
    }
}

impl std::fmt::Display for CalculationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalculationKind::Scf => write!(f, "scf"),
            CalculationKind::Nscf => write!(f, "nscf"),
            CalculationKind::Bands => write!(f, "bands"),
            CalculationKind::Relax => write!(f, "relax"),
            CalculationKind::VcRelax => write!(f, "vc-relax"),
            CalculationKind::Md => write!(f, "md"),
            CalculationKind::VcMd => write!(f, "vc-md"),
        }
    }
}

/// 展宽类型 (`smearing = ...`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SmearingKind {
    Gaussian,
    MethfesselPaxton,
    MarzariVanderbilt,
    FermiDirac,
}

impl SmearingKind {
    /// 是否需要 -TS 熵修正
    ///
    /// 以 M 或 C 开头的展宽（m-p, m-v, cold）不做修正。
    pub fn needs_entropy_correction(&self) -> bool {
        matches!(self, SmearingKind::Gaussian | SmearingKind::FermiDirac)
    }
}

impl FromStr for SmearingKind {
    type Err = EspressoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gaussian" | "gauss" => Ok(SmearingKind::Gaussian),
            "methfessel-paxton" | "m-p" | "mp" => Ok(SmearingKind::MethfesselPaxton),
            "marzari-vanderbilt" | "cold" | "m-v" | "mv" => Ok(SmearingKind::MarzariVanderbilt),
            "fermi-dirac" | "f-d" | "fd" => Ok(SmearingKind::FermiDirac),
            other => Err(EspressoError::InvalidArgument(format!(
                "Unknown smearing '{}'. Use gaussian, methfessel-paxton, marzari-vanderbilt or fermi-dirac",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SmearingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SmearingKind::Gaussian => write!(f, "gaussian"),
            SmearingKind::MethfesselPaxton => write!(f, "methfessel-paxton"),
            SmearingKind::MarzariVanderbilt => write!(f, "marzari-vanderbilt"),
            SmearingKind::FermiDirac => write!(f, "fermi-dirac"),
        }
    }
}

/// 占据方式 (`occupations = ...`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Occupations {
    Smearing(SmearingKind),
    Fixed,
    Tetrahedra,
}

/// 解析器所需的计算设置
#[derive(Debug, Clone, Serialize)]
pub struct ScfSettings {
    /// 计算类型
    pub calculation: CalculationKind,

    /// 原子数
    pub natoms: usize,

    /// 占据方式
    pub occupations: Occupations,

    /// 离子动力学 (`ion_dynamics`)
    pub ion_dynamics: Option<String>,

    /// Hubbard 投影类型 (`U_projection_type`)
    pub u_projection_type: String,

    /// 是否读取原子受力
    pub compute_forces: bool,
}

impl ScfSettings {
    pub fn new(calculation: CalculationKind, natoms: usize) -> Self {
        ScfSettings {
            calculation,
            natoms,
            occupations: Occupations::Smearing(SmearingKind::Gaussian),
            ion_dynamics: None,
            u_projection_type: "atomic".to_string(),
            compute_forces: true,
        }
    }

    pub fn with_occupations(mut self, occupations: Occupations) -> Self {
        self.occupations = occupations;
        self
    }

    pub fn with_ion_dynamics(mut self, ion_dynamics: impl Into<String>) -> Self {
        self.ion_dynamics = Some(ion_dynamics.into());
        self
    }

    pub fn with_u_projection_type(mut self, projection: impl Into<String>) -> Self {
        self.u_projection_type = projection.into();
        self
    }

    pub fn without_forces(mut self) -> Self {
        self.compute_forces = false;
        self
    }

    /// 阻尼动力学
    pub fn damped_dynamics(&self) -> bool {
        self.ion_dynamics
            .as_deref()
            .map(|d| d.eq_ignore_ascii_case("damp"))
            .unwrap_or(false)
    }

    /// 能量标记行之后是否需要寻找展宽熵修正行
    pub fn needs_entropy_correction(&self) -> bool {
        match self.occupations {
            Occupations::Smearing(kind) => {
                kind.needs_entropy_correction() && !self.damped_dynamics()
            }
            _ => false,
        }
    }

    /// 是否读取受力块
    pub fn reads_forces(&self) -> bool {
        self.compute_forces && self.calculation.reports_energy()
    }

    /// 重新扫描日志时是否同时重新读取受力
    pub fn rescans_forces(&self) -> bool {
        self.compute_forces && self.u_projection_type.eq_ignore_ascii_case("atomic")
    }
}
