//! # run 子命令实现
//!
//! 在 scratch 目录中启动 pw.x，流式解析输出直到得到结果。
//!
//! ## 依赖关系
//! - 使用 `cli/run.rs` 定义的参数
//! - 使用 `session/process.rs`, `calculator.rs`
//! - 使用 `utils/progress.rs` 的 spinner

use crate::calculator::EspressoCalculator;
use crate::cli::run::RunArgs;
use crate::error::{EspressoError, Result};
use crate::parsers::header;
use crate::session::{LaunchConfig, ProcessSession};
use crate::utils::{output, progress};

use log::warn;
use std::path::PathBuf;

/// 执行 run
pub fn execute(args: RunArgs) -> Result<()> {
    output::print_header("Running pw.x");

    if !args.input.is_file() {
        return Err(EspressoError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }

    let natoms = match args.scf.natoms {
        Some(n) => n,
        None => header::detect_input_nat(&args.input)?.ok_or_else(|| {
            EspressoError::InvalidArgument(format!(
                "Cannot find 'nat' in '{}', pass --natoms",
                args.input.display()
            ))
        })?,
    };
    let settings = args.scf.to_settings(natoms)?;

    let launch = LaunchConfig::new(&args.pw_command, &args.input, &args.scratch)
        .with_flags(args.pw_flags.split_whitespace())
        .with_mpi(args.np, args.mpi_command.clone());
    let log_path = args.log.clone().unwrap_or_else(|| default_log_path(&args));

    output::print_field("command", &launch.command_line()?.join(" "));
    output::print_field("log", &log_path.display().to_string());

    let session = ProcessSession::new(launch, &log_path)?;
    let mut calculator = EspressoCalculator::new(session, settings);
    calculator.mark_changed();
    let settings = calculator.settings();
    output::print_field(
        "calculation",
        &format!("{} ({} atoms)", settings.calculation, settings.natoms),
    );

    let spinner = progress::create_spinner("Waiting for pw.x");
    let outcome = calculator.read();
    spinner.finish_and_clear();

    // 出错时也先排空并回收 pw.x，再报告错误
    let stopped = calculator.stop();
    if outcome.is_err() && calculator.needs_recalculation() {
        warn!("read cycle failed, recalculation still pending");
    }
    let outcome = outcome?;
    stopped?;

    match outcome {
        Some(result) => {
            super::show_result(&result);
            output::print_success(&format!("Log written to '{}'", log_path.display()));
        }
        None => output::print_warning("Nothing to recalculate"),
    }
    Ok(())
}

/// `<scratch>/<input stem>.log`
fn default_log_path(args: &RunArgs) -> PathBuf {
    let stem = args
        .input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "espresso".to_string());
    args.scratch.join(format!("{}.log", stem))
}
