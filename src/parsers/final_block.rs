//! # 能量与受力块
//!
//! 从 `!    total energy` 行开始，读取自由能、展宽熵修正与原子受力。
//! 实时流解析和日志重扫描共用这一段逻辑。
//!
//! ## 依赖关系
//! - 被 `parsers/scf_stream.rs`, `parsers/rescan.rs` 使用
//! - 使用 `parsers/marker.rs` 分类，`models/units.rs` 换算

use super::marker::{classify, ParseMarker};
use super::{next_or_eof, value_before_unit, LineFeed};
use crate::error::{EspressoError, Result};
use crate::models::units::{FORCE, RYDBERG};
use crate::models::ScfSettings;

use log::debug;

/// 能量标记行之后的最终结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalBlock {
    pub energy_free: Option<f64>,
    pub energy_zero: Option<f64>,
    pub entropy_correction: f64,
    pub forces: Option<Vec<[f64; 3]>>,
}

/// 从能量行开始读取能量（以及可选的受力）
pub fn read_final_block<F: LineFeed>(
    feed: &mut F,
    energy_line: &str,
    settings: &ScfSettings,
    with_forces: bool,
) -> Result<FinalBlock> {
    let energy_free = value_before_unit(energy_line, "total energy")? * RYDBERG;

    let entropy_correction = if settings.needs_entropy_correction() {
        read_entropy_correction(feed)?
    } else {
        0.0
    };

    let forces = if with_forces {
        Some(read_forces(feed, settings.natoms)?)
    } else {
        None
    };

    Ok(FinalBlock {
        energy_free: Some(energy_free),
        energy_zero: Some(energy_free + 0.5 * entropy_correction),
        entropy_correction,
        forces,
    })
}

/// 向后寻找 `smearing contrib. (-TS)` 行，返回 -TS (eV)
///
/// 在此之前出现 EXX 标记时不做修正，返回 0。
fn read_entropy_correction<F: LineFeed>(feed: &mut F) -> Result<f64> {
    let expected = "smearing contribution";
    let mut line = next_or_eof(feed, expected)?;
    loop {
        if classify(&line) == Some(ParseMarker::SmearingEntropyLine) {
            return Ok(-value_before_unit(&line, "smearing contribution")? * RYDBERG);
        }
        line = next_or_eof(feed, expected)?;
        if classify(&line) == Some(ParseMarker::ExxMarker) {
            debug!("EXX marker before smearing contribution, no entropy correction");
            return Ok(0.0);
        }
    }
}

/// 跳到受力块并读取 `natoms` 行受力 (eV/Å)
pub fn read_forces<F: LineFeed>(feed: &mut F, natoms: usize) -> Result<Vec<[f64; 3]>> {
    seek(feed, ParseMarker::ForcesHeaderLine, "forces block")?;

    let mut forces = Vec::with_capacity(natoms);
    for _ in 0..natoms {
        let line = seek(feed, ParseMarker::PerAtomForceLine, "atomic force line")?;
        let [fx, fy, fz] = parse_force_triple(&line)?;
        forces.push([fx * FORCE, fy * FORCE, fz * FORCE]);
    }
    Ok(forces)
}

/// 读到第一条标记为 `marker` 的行
fn seek<F: LineFeed>(feed: &mut F, marker: ParseMarker, expected: &str) -> Result<String> {
    loop {
        let line = next_or_eof(feed, expected)?;
        if classify(&line) == Some(marker) {
            return Ok(line);
        }
    }
}

/// 行末的三个受力分量 (Ry/Bohr)
fn parse_force_triple(line: &str) -> Result<[f64; 3]> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(EspressoError::malformed("force", line));
    }

    let mut triple = [0.0; 3];
    for (slot, field) in triple.iter_mut().zip(&fields[fields.len() - 3..]) {
        *slot = field
            .parse()
            .map_err(|_| EspressoError::malformed("force", line))?;
    }
    Ok(triple)
}
