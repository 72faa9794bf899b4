//! # check 子命令实现
//!
//! 把 pw.x 输出重放进日志，停止会话后扫描日志中的错误块。
//!
//! ## 依赖关系
//! - 使用 `cli/check.rs` 定义的参数
//! - 使用 `calculator.rs` 的 checkerror 路径

use crate::cli::check::CheckArgs;
use crate::error::Result;
use crate::utils::output;

/// 执行 check
pub fn execute(args: CheckArgs) -> Result<()> {
    let (mut calculator, log_path) = super::open_replay_calculator(&args.input, &args.log_dir)?;

    calculator.check_error()?;
    output::print_success(&format!("No error block in '{}'", args.input.display()));
    output::print_info(&format!("Log written to '{}'", log_path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EspressoError;
    use crate::test_support::scratch_dir;

    const CITE: &str = "     P. Giannozzi et al., J. Phys.:Condens. Matter 29 465901 (2017);";

    #[test]
    fn test_check_reports_error_block() {
        let dir = scratch_dir("check_command");
        let input = dir.join("pw.out");
        std::fs::write(
            &input,
            format!(
                "{}\n %%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%\n     Error in routine cdiaghg (3):\n %%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%\n",
                CITE
            ),
        )
        .unwrap();
        let args = CheckArgs {
            input: input.clone(),
            log_dir: dir.join("logs"),
        };

        match execute(args).unwrap_err() {
            EspressoError::Runtime(msg) => assert_eq!(msg, "     Error in routine cdiaghg (3):"),
            other => panic!("unexpected error: {}", other),
        }
        let log = std::fs::read_to_string(dir.join("logs").join("pw.out.log")).unwrap();
        assert_eq!(log, std::fs::read_to_string(&input).unwrap());
    }

    #[test]
    fn test_check_clean_output() {
        let dir = scratch_dir("check_clean");
        let input = dir.join("pw.out");
        std::fs::write(&input, format!("{}\n     JOB DONE.\n", CITE)).unwrap();
        let args = CheckArgs {
            input,
            log_dir: dir.join("logs"),
        };

        assert!(execute(args).is_ok());
    }

    #[test]
    fn test_check_missing_input() {
        let dir = scratch_dir("check_missing");
        let args = CheckArgs {
            input: dir.join("absent.out"),
            log_dir: dir.join("logs"),
        };

        assert!(matches!(
            execute(args).unwrap_err(),
            EspressoError::FileNotFound { .. }
        ));
    }
}
