//! # SCF 输出流状态机
//!
//! 逐行消费 pw.x 输出，直到遇到终止标记（总能量、stopping、
//! 不收敛）或流结束，然后读取能量与受力、区分失败类型。
//!
//! 扫描模式用一个栈表示：
//! ```text
//! Seeking ──iteration #  1──▶ InitialOccupations ──exit write_ns──▶ (pop)
//!    └──End of self-consistent calculation──▶ FinalOccupations
//! ```
//! 任何模式下遇到终止标记都立即结束扫描。
//!
//! ## 依赖关系
//! - 被 `calculator.rs` 调用
//! - 使用 `parsers/marker.rs`, `parsers/occupation.rs`, `parsers/final_block.rs`,
//!   `parsers/rescan.rs`, `parsers/error_block.rs`
//! - 使用 `session::Session` 读取与停止

use super::error_block::check_session;
use super::final_block::{read_final_block, FinalBlock};
use super::marker::{classify, ParseMarker};
use super::occupation::parse_occupation_line;
use super::{rescan, LineFeed, LiveFeed};
use crate::error::{EspressoError, Result};
use crate::models::{AtomOccupation, RunResult, ScfSettings};
use crate::session::Session;

use log::{debug, info, warn};
use std::collections::BTreeMap;

/// 扫描模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    /// 寻找终止标记
    Seeking,
    /// 第一次迭代中的初始占据数
    InitialOccupations,
    /// 自洽结束后的占据数与磁矩
    FinalOccupations,
}

/// 扫描结束的原因
#[derive(Debug, Clone, PartialEq)]
pub enum Terminal {
    TotalEnergy(String),
    Stopping,
    ConvergenceFailure,
    EndOfStream,
}

/// 扫描阶段收集到的数据
#[derive(Debug, Default)]
pub struct StreamScan {
    modes: Vec<ScanMode>,
    occupations: BTreeMap<usize, AtomOccupation>,
    magnetic_moments: Vec<f64>,
}

impl StreamScan {
    pub fn new(natoms: usize) -> Self {
        StreamScan {
            modes: vec![ScanMode::Seeking],
            occupations: BTreeMap::new(),
            magnetic_moments: vec![0.0; natoms],
        }
    }

    fn mode(&self) -> ScanMode {
        self.modes.last().copied().unwrap_or(ScanMode::Seeking)
    }

    /// 消费输入直到终止标记或流结束
    pub fn run<F: LineFeed>(&mut self, feed: &mut F) -> Result<Terminal> {
        while let Some(line) = feed.next_line()? {
            let marker = classify(&line);
            match marker {
                Some(ParseMarker::TotalEnergyLine) => return Ok(Terminal::TotalEnergy(line)),
                Some(ParseMarker::StoppingLine) => return Ok(Terminal::Stopping),
                Some(ParseMarker::ConvergenceFailureLine) => {
                    return Ok(Terminal::ConvergenceFailure)
                }
                _ => {}
            }

            match (self.mode(), marker) {
                (ScanMode::Seeking, Some(ParseMarker::IterationOneStart)) => {
                    self.modes.push(ScanMode::InitialOccupations);
                }
                (ScanMode::Seeking, Some(ParseMarker::SelfConsistentEnd)) => {
                    self.modes.push(ScanMode::FinalOccupations);
                }
                (ScanMode::InitialOccupations, Some(ParseMarker::WriteNsExit)) => {
                    self.modes.pop();
                }
                (ScanMode::InitialOccupations, Some(ParseMarker::AtomOccupationLine)) => {
                    self.record_initial(&line)?;
                }
                (ScanMode::FinalOccupations, Some(ParseMarker::AtomOccupationLine)) => {
                    self.record_final(&line)?;
                }
                _ => {}
            }
        }
        Ok(Terminal::EndOfStream)
    }

    fn record_initial(&mut self, line: &str) -> Result<()> {
        if let Some((atom, occ)) = parse_occupation_line(line)? {
            self.entry(atom, line)?.start = Some(occ);
        }
        Ok(())
    }

    fn record_final(&mut self, line: &str) -> Result<()> {
        if let Some((atom, occ)) = parse_occupation_line(line)? {
            self.entry(atom, line)?.self_consistent = Some(occ);
            if let Some(moment) = occ.moment() {
                // 磁矩按输出中的原子序号直接索引（不减 1）
                match self.magnetic_moments.get_mut(atom) {
                    Some(slot) => *slot = moment,
                    None => warn!(
                        "magnetic moment for atom {} outside of {} atoms, dropped",
                        atom,
                        self.magnetic_moments.len()
                    ),
                }
            }
        }
        Ok(())
    }

    fn entry(&mut self, atom: usize, line: &str) -> Result<&mut AtomOccupation> {
        let index = atom
            .checked_sub(1)
            .ok_or_else(|| EspressoError::malformed("occupation", line))?;
        Ok(self.occupations.entry(index).or_default())
    }
}

/// 流式阶段的结果
#[derive(Debug)]
enum Streamed {
    /// 读到能量块（或不输出能量的计算正常结束）
    Finished(FinalBlock),
    ConvergenceFailure,
    /// stopping 行，或应有能量的计算提前结束
    AbnormalEnd,
}

/// 消费输出直到终止标记，再读取能量与受力
fn stream_block<S: Session>(
    session: &mut S,
    settings: &ScfSettings,
    scan: &mut StreamScan,
) -> Result<Streamed> {
    let terminal = scan.run(&mut LiveFeed(&mut *session))?;
    debug!("stream scan ended with {:?}", terminal);

    let reports_energy = settings.calculation.reports_energy();
    Ok(match terminal {
        Terminal::ConvergenceFailure => Streamed::ConvergenceFailure,
        Terminal::Stopping => Streamed::AbnormalEnd,
        Terminal::EndOfStream if reports_energy => Streamed::AbnormalEnd,
        Terminal::TotalEnergy(ref line) if reports_energy => Streamed::Finished(read_final_block(
            &mut LiveFeed(&mut *session),
            line,
            settings,
            settings.reads_forces(),
        )?),
        _ => Streamed::Finished(FinalBlock::default()),
    })
}

/// 一次完整的读取周期
///
/// 无论成功还是失败（包括解析错误），返回时会话都已停止，日志完整。
pub fn read_run<S: Session>(session: &mut S, settings: &ScfSettings) -> Result<RunResult> {
    let mut scan = StreamScan::new(settings.natoms);
    let streamed = match stream_block(session, settings, &mut scan) {
        Ok(streamed) => streamed,
        Err(e) => {
            // 保留解析错误；停止失败只记录
            if let Err(stop_err) = session.stop() {
                warn!("failed to stop session after parse error: {}", stop_err);
            }
            return Err(e);
        }
    };

    let mut block = match streamed {
        Streamed::ConvergenceFailure => {
            session.stop()?;
            return Err(EspressoError::KohnShamConvergence);
        }
        Streamed::AbnormalEnd => {
            check_session(session)?;
            return Err(EspressoError::scf_failed());
        }
        Streamed::Finished(block) => block,
    };
    session.stop()?;

    if settings.calculation.has_internal_relaxation() {
        let last = rescan::final_block(session.log_path(), settings)?;
        info!("re-derived final energy from {}", session.log_path().display());
        block.energy_free = last.energy_free;
        block.energy_zero = last.energy_zero;
        block.entropy_correction = last.entropy_correction;
        if last.forces.is_some() {
            block.forces = last.forces;
        }
    }

    check_session(session)?;

    let total_magnetic_moment = scan.magnetic_moments.iter().sum();
    Ok(RunResult {
        energy_free: block.energy_free,
        energy_zero: block.energy_zero,
        entropy_correction: block.entropy_correction,
        forces: block.forces,
        magnetic_moments: scan.magnetic_moments,
        total_magnetic_moment,
        atomic_occupations: scan.occupations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SCF_FAILED;
    use crate::models::units::{FORCE, RYDBERG};
    use crate::models::{CalculationKind, Occupation};
    use crate::session::transcript::read_log_lines;
    use crate::test_support::{replay_session, scratch_dir};

    const BANNER: &str = "     Program PWSCF v.7.2 starts on  1Jan2024 at 12: 0: 0";
    const CITE: &str = "     P. Giannozzi et al., J. Phys.:Condens. Matter 29 465901 (2017);";
    const DELIMITER: &str =
        " %%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%";

    fn scf_output(energy: &str, entropy: &str) -> Vec<String> {
        let mut lines: Vec<String> = vec![
            BANNER,
            "",
            CITE,
            "     number of atoms/cell      =            2",
            "     iteration #  1     ecut=    30.00 Ry     beta= 0.70",
            "atom    1   Tr[ns(na)] (up, down, total) =   2.00000  1.00000  3.00000",
            "atom    2   Tr[ns(na)] (up, down, total) =   1.00000  2.00000  3.00000",
            " --- exit write_ns ---",
            "     total energy              =     -9.90000000 Ry",
            "     iteration #  2     ecut=    30.00 Ry     beta= 0.70",
            "     End of self-consistent calculation",
            "atom    1   Tr[ns(na)] (up, down, total) =   2.50000  0.50000  3.00000",
            "atom    2   Tr[ns(na)] (up, down, total) =   1.00000  2.00000  3.00000",
            "",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        lines.push(format!(
            "!    total energy              =     {} Ry",
            energy
        ));
        lines.push("     estimated scf accuracy    <       0.00000010 Ry".to_string());
        lines.push(format!("     smearing contrib. (-TS)   =     {} Ry", entropy));
        lines.extend(
            [
                "",
                "     convergence has been achieved in   2 iterations",
                "",
                "     Forces acting on atoms (cartesian axes, Ry/au):",
                "",
                "     atom    1 type  1   force =     0.00100000    0.00000000   -0.00200000",
                "     atom    2 type  1   force =    -0.00100000    0.00000000    0.00200000",
                "",
                "     Total force =     0.003162     Total SCF correction =     0.000001",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        lines
    }

    fn run_lines(name: &str, lines: &[String], settings: &ScfSettings) -> (Result<RunResult>, Vec<String>) {
        let dir = scratch_dir(name);
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let mut session = replay_session(&dir, &refs);
        session.start().unwrap();
        let result = read_run(&mut session, settings);
        assert!(!session.is_running());
        let log = read_log_lines(session.log_path()).unwrap();
        (result, log)
    }

    #[test]
    fn test_scf_success() {
        let lines = scf_output("-10.00000000", "-0.02000000");
        let settings = ScfSettings::new(CalculationKind::Scf, 2);
        let (result, log) = run_lines("stream_scf_success", &lines, &settings);
        let result = result.unwrap();

        let free = -10.0 * RYDBERG;
        let correction = 0.02 * RYDBERG;
        assert!((result.energy_free.unwrap() - free).abs() < 1e-9);
        assert!((result.energy_zero.unwrap() - (free + 0.5 * correction)).abs() < 1e-9);
        assert!((result.entropy_correction - correction).abs() < 1e-9);

        let forces = result.forces.unwrap();
        assert_eq!(forces.len(), 2);
        assert!((forces[1][2] - 0.002 * FORCE).abs() < 1e-12);

        // 初始与自洽占据数都按 0 起始序号保存
        let occ0 = &result.atomic_occupations[&0];
        assert_eq!(
            occ0.start,
            Some(Occupation::SpinResolved { up: 2.0, down: 1.0, total: 3.0 })
        );
        assert_eq!(
            occ0.self_consistent,
            Some(Occupation::SpinResolved { up: 2.5, down: 0.5, total: 3.0 })
        );

        // 磁矩按原子序号直接索引：atom 1 -> [1]，atom 2 越界被丢弃
        assert_eq!(result.magnetic_moments, vec![0.0, 2.0]);
        assert!((result.total_magnetic_moment - 2.0).abs() < 1e-12);

        // 日志是输入的完整副本
        assert_eq!(log, lines);
    }

    #[test]
    fn test_convergence_failure() {
        let lines: Vec<String> = [
            BANNER,
            CITE,
            "     iteration #  1     ecut=    30.00 Ry     beta= 0.70",
            "     convergence NOT achieved after 100 iterations: stopping",
            "     trailing line after failure",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let settings = ScfSettings::new(CalculationKind::Scf, 1);
        let (result, log) = run_lines("stream_not_converged", &lines, &settings);

        assert!(matches!(result.unwrap_err(), EspressoError::KohnShamConvergence));
        assert_eq!(log, lines);
    }

    #[test]
    fn test_stopping_without_error_block() {
        let lines: Vec<String> = [BANNER, CITE, "     stopping ...", "     JOB DONE."]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let settings = ScfSettings::new(CalculationKind::Scf, 1);
        let (result, log) = run_lines("stream_stopping_generic", &lines, &settings);

        match result.unwrap_err() {
            EspressoError::Runtime(msg) => assert_eq!(msg, SCF_FAILED),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(log, lines);
    }

    #[test]
    fn test_stopping_with_error_block() {
        let lines: Vec<String> = [
            BANNER,
            CITE,
            "     stopping ...",
            "",
            DELIMITER,
            "     Error in routine cdiaghg (159):",
            "     S matrix not positive definite",
            DELIMITER,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let settings = ScfSettings::new(CalculationKind::Scf, 1);
        let (result, _) = run_lines("stream_stopping_specific", &lines, &settings);

        match result.unwrap_err() {
            EspressoError::Runtime(msg) => assert_eq!(
                msg,
                "     Error in routine cdiaghg (159):\n     S matrix not positive definite"
            ),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_end_of_stream_is_failure_for_scf() {
        let lines: Vec<String> = [BANNER, CITE, "     iteration #  1     ecut=    30.00 Ry"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let settings = ScfSettings::new(CalculationKind::Scf, 1);
        let (result, _) = run_lines("stream_eof_scf", &lines, &settings);
        assert!(matches!(result.unwrap_err(), EspressoError::Runtime(_)));
    }

    #[test]
    fn test_end_of_stream_without_banner() {
        let lines = vec!["garbage".to_string()];
        let settings = ScfSettings::new(CalculationKind::Relax, 1);
        let (result, _) = run_lines("stream_eof_no_banner", &lines, &settings);
        match result.unwrap_err() {
            EspressoError::Runtime(msg) => assert_eq!(msg, crate::error::NOT_STARTED),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_nscf_end_of_stream_has_no_energy() {
        let lines: Vec<String> = [BANNER, CITE, "     End of band structure calculation"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let settings = ScfSettings::new(CalculationKind::Nscf, 1);
        let (result, _) = run_lines("stream_nscf", &lines, &settings);
        let result = result.unwrap();
        assert!(result.energy_free.is_none());
        assert!(result.energy_zero.is_none());
        assert!(result.forces.is_none());
    }

    #[test]
    fn test_scf_ignores_later_energy_lines() {
        // stop 排空的行里还有一个能量行，scf 不重扫描日志
        let mut lines = scf_output("-10.00000000", "-0.02000000");
        lines.extend(scf_output("-20.00000000", "-0.04000000").into_iter().skip(3));
        let settings = ScfSettings::new(CalculationKind::Scf, 2);
        let (result, log) = run_lines("stream_scf_no_rescan", &lines, &settings);

        let result = result.unwrap();
        assert!((result.energy_free.unwrap() - (-10.0 * RYDBERG)).abs() < 1e-9);
        assert_eq!(log, lines);
    }

    #[test]
    fn test_relax_uses_last_energy_in_log() {
        let mut lines = scf_output("-10.00000000", "-0.02000000");
        lines.extend(scf_output("-20.00000000", "-0.04000000").into_iter().skip(3));
        let settings = ScfSettings::new(CalculationKind::Relax, 2);
        let (result, _) = run_lines("stream_relax_rescan", &lines, &settings);

        let result = result.unwrap();
        let free = -20.0 * RYDBERG;
        assert!((result.energy_free.unwrap() - free).abs() < 1e-9);
        assert!((result.energy_zero.unwrap() - (free + 0.5 * 0.04 * RYDBERG)).abs() < 1e-9);
        assert_eq!(result.forces.unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_force_line_stops_session() {
        let lines: Vec<String> = [
            BANNER,
            CITE,
            "!    total energy              =     -10.00000000 Ry",
            "     Forces acting on atoms (cartesian axes, Ry/au):",
            "     atom    1 type  1   force =     ************    0.00000000    0.00000000",
            "     Total force =     0.000000     Total SCF correction =     0.000000",
            "     JOB DONE.",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let settings = ScfSettings::new(CalculationKind::Scf, 1)
            .with_occupations(crate::models::Occupations::Fixed);
        let (result, log) = run_lines("stream_bad_force", &lines, &settings);

        match result.unwrap_err() {
            EspressoError::MalformedLine { context, .. } => assert_eq!(context, "force"),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(log, lines);
    }

    #[test]
    fn test_malformed_occupation_line_stops_session() {
        let lines: Vec<String> = [
            BANNER,
            CITE,
            "     iteration #  1     ecut=    30.00 Ry     beta= 0.70",
            "atom   **   Tr[ns(na)] =   1.00000",
            " --- exit write_ns ---",
            "     JOB DONE.",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let settings = ScfSettings::new(CalculationKind::Scf, 1);
        let (result, log) = run_lines("stream_bad_occupation", &lines, &settings);

        assert!(matches!(
            result.unwrap_err(),
            EspressoError::MalformedLine { .. }
        ));
        assert_eq!(log, lines);
    }

    #[test]
    fn test_forces_suppressed() {
        let lines = scf_output("-10.00000000", "-0.02000000");
        let settings = ScfSettings::new(CalculationKind::Scf, 2).without_forces();
        let (result, _) = run_lines("stream_no_forces", &lines, &settings);
        assert!(result.unwrap().forces.is_none());
    }
}
