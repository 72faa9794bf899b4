//! # Hubbard 占据数行解析
//!
//! ```text
//! atom    1   Tr[ns(na)] =   1.00000
//! atom    1   Tr[ns(na)] (up, down, total) =   4.12345  3.12345  7.24690
//! ```
//!
//! 原子序号在第 8–10 列；第 12 列起的字面量决定是否自旋分辨。
//!
//! ## 依赖关系
//! - 被 `parsers/scf_stream.rs` 使用
//! - 使用 `models/result.rs` 的 `Occupation`

use crate::error::{EspressoError, Result};
use crate::models::Occupation;

const TOTAL_LITERAL: &str = "Tr[ns(na)] = ";
const RESOLVED_LITERAL: &str = "Tr[ns(na)] (up, down, total) =";

/// 解析一行占据数，返回 (1 起始的原子序号, 占据数)
///
/// 两种字面量都不匹配时返回 `Ok(None)`。
pub fn parse_occupation_line(line: &str) -> Result<Option<(usize, Occupation)>> {
    let atom: usize = line
        .get(8..10)
        .map(str::trim)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| EspressoError::malformed("occupation", line))?;

    if line.get(12..25) == Some(TOTAL_LITERAL) {
        let values = trailing_values(line, 25)?;
        let n = values
            .first()
            .ok_or_else(|| EspressoError::malformed("occupation", line))?;
        return Ok(Some((atom, Occupation::Total(n / 2.0))));
    }

    if line.get(12..42) == Some(RESOLVED_LITERAL) {
        let values = trailing_values(line, 42)?;
        if values.len() < 3 {
            return Err(EspressoError::malformed("occupation", line));
        }
        return Ok(Some((
            atom,
            Occupation::SpinResolved {
                up: values[0],
                down: values[1],
                total: values[2],
            },
        )));
    }

    Ok(None)
}

fn trailing_values(line: &str, from: usize) -> Result<Vec<f64>> {
    line.get(from..)
        .unwrap_or("")
        .split_whitespace()
        .map(|s| s.parse::<f64>().map_err(|_| EspressoError::malformed("occupation", line)))
        .collect()
}
