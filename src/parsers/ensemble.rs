//! # BEEF-vdW 系综能量
//!
//! 日志中 `BEEF-vdW xc energy contributions` 之后紧跟 32 行，
//! 每行最后一个冒号后是一个以 Ry 为单位的交换关联能分量。
//!
//! ## 依赖关系
//! - 被 `calculator.rs` 使用
//! - 使用 `session/transcript.rs` 读取日志

use crate::error::{EspressoError, Result};
use crate::models::units::RYDBERG;
use crate::session::transcript::read_log_lines;

use std::path::Path;

const HEADER: &str = "BEEF-vdW xc energy contributions";

/// 系综分量的个数
pub const BEEF_COMPONENTS: usize = 32;

/// 读取最后一个 BEEF 块的 32 个能量分量 (eV)
pub fn read_beef_ensemble(path: &Path) -> Result<Vec<f64>> {
    let lines = read_log_lines(path)?;
    parse_beef_ensemble(&lines).map_err(|reason| EspressoError::MalformedLog {
        path: path.display().to_string(),
        reason,
    })
}

fn parse_beef_ensemble(lines: &[String]) -> std::result::Result<Vec<f64>, String> {
    let header = lines
        .iter()
        .rposition(|l| l.contains(HEADER))
        .ok_or_else(|| format!("no '{}' block", HEADER))?;

    let body = &lines[header + 1..];
    if body.len() < BEEF_COMPONENTS {
        return Err(format!(
            "BEEF block has {} lines, expected {}",
            body.len(),
            BEEF_COMPONENTS
        ));
    }

    body[..BEEF_COMPONENTS]
        .iter()
        .map(|line| {
            line.rsplit(':')
                .next()
                .and_then(|v| v.trim().parse::<f64>().ok())
                .map(|v| v * RYDBERG)
                .ok_or_else(|| format!("bad BEEF contribution line: {:?}", line))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::scratch_dir;

    fn beef_log(n: usize) -> String {
        let mut text = String::from("     BEEF-vdW xc energy contributions\n");
        for i in 0..n {
            text.push_str(&format!("     {:>3}:   {:.8}\n", i + 1, -0.5 + i as f64 * 0.01));
        }
        text
    }

    #[test]
    fn test_read_ensemble() {
        let dir = scratch_dir("beef_ok");
        let path = dir.join("pw.log");
        std::fs::write(&path, beef_log(BEEF_COMPONENTS)).unwrap();

        let ensemble = read_beef_ensemble(&path).unwrap();
        assert_eq!(ensemble.len(), BEEF_COMPONENTS);
        assert!((ensemble[0] - (-0.5 * RYDBERG)).abs() < 1e-9);
        assert!((ensemble[31] - (-0.19 * RYDBERG)).abs() < 1e-9);
    }

    #[test]
    fn test_last_block_wins() {
        let dir = scratch_dir("beef_last");
        let path = dir.join("pw.log");
        let mut text = beef_log(BEEF_COMPONENTS).replace("-0.5", "-9.5");
        text.push_str(&beef_log(BEEF_COMPONENTS));
        std::fs::write(&path, text).unwrap();

        let ensemble = read_beef_ensemble(&path).unwrap();
        assert!((ensemble[0] - (-0.5 * RYDBERG)).abs() < 1e-9);
    }

    #[test]
    fn test_short_block() {
        let dir = scratch_dir("beef_short");
        let path = dir.join("pw.log");
        std::fs::write(&path, beef_log(10)).unwrap();

        assert!(matches!(
            read_beef_ensemble(&path).unwrap_err(),
            EspressoError::MalformedLog { .. }
        ));
    }

    #[test]
    fn test_missing_block() {
        let lines = vec!["!    total energy = -1.0 Ry".to_string()];
        assert!(parse_beef_ensemble(&lines).is_err());
    }
}
