//! # 错误块扫描 (checkerror)
//!
//! pw.x 出错时会在两行 `%%%%...` 之间打印诊断信息：
//!
//! ```text
//!  %%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%
//!      Error in routine cdiaghg (159):
//!      S matrix not positive definite
//!  %%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%
//! ```
//!
//! 只检查最后一次启动（最后一个含 `Giannozzi` 的行）之后的内容。
//!
//! ## 依赖关系
//! - 被 `parsers/scf_stream.rs`, `calculator.rs` 使用
//! - 使用 `session/transcript.rs` 读取日志

use crate::error::{EspressoError, Result};
use crate::session::transcript::read_log_lines;
use crate::session::Session;

use log::debug;
use std::path::Path;

/// pw.x 启动时打印的引用信息中一定包含的字样
const BANNER: &str = "Giannozzi";

/// 错误块分隔线
const DELIMITER: &str = "%%%%%%%%%%%%%%%%";

/// 在日志行中寻找错误块
///
/// - 找不到启动标志：`Err(NOT_STARTED)`
/// - 没有完整的错误块，或块中不含 "error"：`Ok(None)`
/// - 否则返回块内文本（行间以换行连接，末尾无换行）
pub fn find_error_block(lines: &[String]) -> Result<Option<String>> {
    let start = lines
        .iter()
        .rposition(|l| l.contains(BANNER))
        .ok_or_else(EspressoError::not_started)?;

    let delimiters: Vec<usize> = lines[start..]
        .iter()
        .enumerate()
        .filter(|(_, l)| l.contains(DELIMITER))
        .map(|(i, _)| start + i)
        .collect();

    if delimiters.len() < 2 {
        return Ok(None);
    }

    let open = delimiters[delimiters.len() - 2];
    let close = delimiters[delimiters.len() - 1];
    if close - open < 2 {
        return Ok(None);
    }

    let block = lines[open + 1..close].join("\n");
    if !block.to_lowercase().contains("error") {
        debug!("delimited block without error text, ignored");
        return Ok(None);
    }

    Ok(Some(block))
}

/// 检查日志文件；找到错误块时以其原文作为失败信息
pub fn check_log(path: &Path) -> Result<()> {
    let lines = read_log_lines(path)?;
    match find_error_block(&lines)? {
        Some(block) => Err(EspressoError::Runtime(block)),
        None => Ok(()),
    }
}

/// 先停止会话（日志补全），再检查日志
pub fn check_session<S: Session>(session: &mut S) -> Result<()> {
    session.stop()?;
    check_log(session.log_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NOT_STARTED;
    use crate::test_support::scratch_dir;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    const CITE: &str = "     P. Giannozzi et al., J. Phys.:Condens. Matter 21 395502 (2009);";
    const RULE: &str = "%%%%%%%%%%%%%%%%";

    #[test]
    fn test_error_block_exact_text() {
        let log = lines(&[
            CITE,
            "     some output",
            RULE,
            "     Error in routine readpp (1):",
            "     file Fe.pbe-spn-rrkjus_psl.UPF not found",
            RULE,
            "     stopping ...",
        ]);
        let block = find_error_block(&log).unwrap().unwrap();
        assert_eq!(
            block,
            "     Error in routine readpp (1):\n     file Fe.pbe-spn-rrkjus_psl.UPF not found"
        );
    }

    #[test]
    fn test_error_match_is_case_insensitive() {
        let log = lines(&[CITE, RULE, "     ERROR: bad thing", RULE]);
        assert_eq!(
            find_error_block(&log).unwrap().as_deref(),
            Some("     ERROR: bad thing")
        );
    }

    #[test]
    fn test_block_without_error_text() {
        let log = lines(&[CITE, RULE, "     Message from routine setup:", RULE]);
        assert!(find_error_block(&log).unwrap().is_none());
    }

    #[test]
    fn test_single_delimiter() {
        let log = lines(&[CITE, RULE, "     Error in routine x (1):"]);
        assert!(find_error_block(&log).unwrap().is_none());
    }

    #[test]
    fn test_adjacent_delimiters() {
        let log = lines(&[CITE, RULE, RULE]);
        assert!(find_error_block(&log).unwrap().is_none());
    }

    #[test]
    fn test_blocks_before_last_banner_are_ignored() {
        let log = lines(&[
            CITE,
            RULE,
            "     Error in routine old (1):",
            RULE,
            CITE,
            "     clean restart",
        ]);
        assert!(find_error_block(&log).unwrap().is_none());
    }

    #[test]
    fn test_last_two_delimiters_are_used() {
        let log = lines(&[
            CITE,
            RULE,
            "     Error in routine first (1):",
            RULE,
            RULE,
            "     Error in routine second (2):",
            RULE,
        ]);
        assert_eq!(
            find_error_block(&log).unwrap().as_deref(),
            Some("     Error in routine second (2):")
        );
    }

    #[test]
    fn test_missing_banner() {
        let log = lines(&["     nothing here"]);
        match find_error_block(&log).unwrap_err() {
            EspressoError::Runtime(msg) => assert_eq!(msg, NOT_STARTED),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_check_log_file() {
        let dir = scratch_dir("error_block_file");
        let path = dir.join("pw.log");
        std::fs::write(
            &path,
            format!("{}\n{}\n     Error in routine c_bands (1):\n{}\n", CITE, RULE, RULE),
        )
        .unwrap();

        match check_log(&path).unwrap_err() {
            EspressoError::Runtime(msg) => assert_eq!(msg, "     Error in routine c_bands (1):"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
