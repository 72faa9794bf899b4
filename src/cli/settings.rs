//! # 解析设置参数
//!
//! `run` 与 `replay` 共用的计算设置，映射到 `models::ScfSettings`。
//!
//! ## 依赖关系
//! - 被 `cli/run.rs`, `cli/replay.rs` 通过 `#[command(flatten)]` 使用
//! - 构造 `models/calculation.rs` 的 `ScfSettings`

use crate::error::Result;
use crate::models::{CalculationKind, Occupations, ScfSettings, SmearingKind};

use clap::{Args, ValueEnum};

/// pw.x 计算类型
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CalcKind {
    Scf,
    Nscf,
    Bands,
    Relax,
    VcRelax,
    Md,
    VcMd,
}

impl From<CalcKind> for CalculationKind {
    fn from(kind: CalcKind) -> Self {
        match kind {
            CalcKind::Scf => CalculationKind::Scf,
            CalcKind::Nscf => CalculationKind::Nscf,
            CalcKind::Bands => CalculationKind::Bands,
            CalcKind::Relax => CalculationKind::Relax,
            CalcKind::VcRelax => CalculationKind::VcRelax,
            CalcKind::Md => CalculationKind::Md,
            CalcKind::VcMd => CalculationKind::VcMd,
        }
    }
}

/// 占据方式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OccupationsArg {
    Smearing,
    Fixed,
    Tetrahedra,
}

/// 解析设置参数
#[derive(Args, Debug, Clone)]
pub struct ScfArgs {
    /// Calculation type as given in &CONTROL
    #[arg(long, value_enum, default_value = "scf")]
    pub calculation: CalcKind,

    /// Number of atoms (read from the input or output header when omitted)
    #[arg(long)]
    pub natoms: Option<usize>,

    /// Occupations scheme
    #[arg(long, value_enum, default_value = "smearing")]
    pub occupations: OccupationsArg,

    /// Smearing kind (gaussian, methfessel-paxton, marzari-vanderbilt, fermi-dirac or a pw.x alias)
    #[arg(long, default_value = "gaussian")]
    pub smearing: String,

    /// Ion dynamics ('damp' disables the entropy correction)
    #[arg(long)]
    pub ion_dynamics: Option<String>,

    /// Hubbard U projection type (final forces are re-read only for 'atomic')
    #[arg(long, default_value = "atomic")]
    pub u_projection_type: String,

    /// Do not read atomic forces
    #[arg(long, default_value_t = false)]
    pub no_forces: bool,
}

impl ScfArgs {
    /// 转为解析设置
    pub fn to_settings(&self, natoms: usize) -> Result<ScfSettings> {
        let occupations = match self.occupations {
            OccupationsArg::Smearing => Occupations::Smearing(self.smearing.parse::<SmearingKind>()?),
            OccupationsArg::Fixed => Occupations::Fixed,
            OccupationsArg::Tetrahedra => Occupations::Tetrahedra,
        };

        let mut settings = ScfSettings::new(self.calculation.into(), natoms)
            .with_occupations(occupations)
            .with_u_projection_type(self.u_projection_type.clone());
        if let Some(ref dynamics) = self.ion_dynamics {
            settings = settings.with_ion_dynamics(dynamics.clone());
        }
        if self.no_forces {
            settings = settings.without_forces();
        }
        Ok(settings)
    }
}
