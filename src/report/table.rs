//! # 终端表格
//!
//! 把 `RunResult` 与批量汇总渲染为 `tabled` 表格。

use super::ReplaySummary;
use crate::models::{Occupation, RunResult};

use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct EnergyRow {
    #[tabled(rename = "Quantity")]
    quantity: &'static str,
    #[tabled(rename = "Value (eV)")]
    value: String,
}

#[derive(Debug, Clone, Tabled)]
struct ForceRow {
    #[tabled(rename = "Atom")]
    atom: usize,
    #[tabled(rename = "Fx (eV/Å)")]
    fx: String,
    #[tabled(rename = "Fy (eV/Å)")]
    fy: String,
    #[tabled(rename = "Fz (eV/Å)")]
    fz: String,
}

#[derive(Debug, Clone, Tabled)]
struct OccupationRow {
    #[tabled(rename = "Atom")]
    atom: usize,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "Self-consistent")]
    self_consistent: String,
    #[tabled(rename = "Moment (μB)")]
    moment: String,
}

#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "E_free (eV)")]
    energy_free: String,
    #[tabled(rename = "E_0 (eV)")]
    energy_zero: String,
    #[tabled(rename = "max |F| (eV/Å)")]
    max_force: String,
}

#[derive(Debug, Clone, Tabled)]
struct EnsembleRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "E_xc (eV)")]
    energy: String,
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "-".to_string())
}

fn fmt_occupation(occ: Option<&Occupation>) -> String {
    match occ {
        Some(Occupation::Total(n)) => format!("{:.5}", n),
        Some(Occupation::SpinResolved { up, down, total }) => {
            format!("{:.5} / {:.5} / {:.5}", up, down, total)
        }
        None => "-".to_string(),
    }
}

/// 能量表
pub fn energy_table(result: &RunResult) -> Table {
    let rows = vec![
        EnergyRow {
            quantity: "Free energy",
            value: fmt_opt(result.energy_free, 8),
        },
        EnergyRow {
            quantity: "Energy (sigma -> 0)",
            value: fmt_opt(result.energy_zero, 8),
        },
        EnergyRow {
            quantity: "Entropy correction (-TS)",
            value: format!("{:.8}", result.entropy_correction),
        },
        EnergyRow {
            quantity: "Total magnetic moment (μB)",
            value: format!("{:.5}", result.total_magnetic_moment),
        },
    ];
    Table::new(rows)
}

/// 受力表；未读取受力时返回 `None`
pub fn force_table(result: &RunResult) -> Option<Table> {
    let forces = result.forces.as_ref()?;
    let rows: Vec<ForceRow> = forces
        .iter()
        .enumerate()
        .map(|(i, f)| ForceRow {
            atom: i + 1,
            fx: format!("{:.6}", f[0]),
            fy: format!("{:.6}", f[1]),
            fz: format!("{:.6}", f[2]),
        })
        .collect();
    Some(Table::new(rows))
}

/// 占据数与磁矩表；没有 Hubbard 输出时返回 `None`
pub fn occupation_table(result: &RunResult) -> Option<Table> {
    if result.atomic_occupations.is_empty() {
        return None;
    }
    let rows: Vec<OccupationRow> = result
        .atomic_occupations
        .iter()
        .map(|(&index, occ)| OccupationRow {
            atom: index + 1,
            start: fmt_occupation(occ.start.as_ref()),
            self_consistent: fmt_occupation(occ.self_consistent.as_ref()),
            moment: fmt_opt(
                occ.self_consistent.as_ref().and_then(Occupation::moment),
                5,
            ),
        })
        .collect();
    Some(Table::new(rows))
}

/// 批量重放汇总表
pub fn summary_table(summaries: &[ReplaySummary]) -> Table {
    let rows: Vec<SummaryRow> = summaries
        .iter()
        .map(|s| SummaryRow {
            file: s.file.clone(),
            status: s.status.clone(),
            energy_free: fmt_opt(s.energy_free_ev, 6),
            energy_zero: fmt_opt(s.energy_zero_ev, 6),
            max_force: fmt_opt(s.max_force_ev_per_a, 4),
        })
        .collect();
    Table::new(rows)
}

/// BEEF 系综能量表
pub fn ensemble_table(energies: &[f64]) -> Table {
    let rows: Vec<EnsembleRow> = energies
        .iter()
        .enumerate()
        .map(|(i, e)| EnsembleRow {
            index: i + 1,
            energy: format!("{:.8}", e),
        })
        .collect();
    Table::new(rows)
}
