//! # replay 子命令实现
//!
//! 把保存下来的 pw.x 输出当作实时流送入同一个解析器。
//!
//! ## 功能
//! - 单文件模式：打印完整结果
//! - 目录模式：并行重放，每个文件写入独立日志，输出汇总表与可选 CSV
//!
//! ## 依赖关系
//! - 使用 `cli/replay.rs` 定义的 ReplayArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `session/replay.rs`, `calculator.rs`, `report/`

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::calculator::EspressoCalculator;
use crate::cli::replay::ReplayArgs;
use crate::cli::settings::ScfArgs;
use crate::error::{EspressoError, Result};
use crate::models::RunResult;
use crate::parsers::header;
use crate::report::{export, table, ReplaySummary};
use crate::session::ReplaySession;
use crate::utils::output;

use log::warn;
use std::path::Path;

/// 执行 replay
pub fn execute(args: ReplayArgs) -> Result<()> {
    output::print_header("Replaying pw.x Output");

    super::ensure_log_dir(&args.log_dir)?;

    if args.input.is_file() {
        execute_single_file(&args)
    } else if args.input.is_dir() {
        execute_batch(&args)
    } else {
        Err(EspressoError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

/// 单文件模式
fn execute_single_file(args: &ReplayArgs) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", args.input.display()));

    let log_path = args.log_dir.join(super::log_name(&args.input, &args.input));
    let result = replay_file(&args.input, &log_path, &args.scf)?;

    super::show_result(&result);
    output::print_success(&format!("Log written to '{}'", log_path.display()));
    Ok(())
}

/// 批量处理模式
fn execute_batch(args: &ReplayArgs) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }

    output::print_info(&format!("Found {} output files", files.len()));

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(files, |file| {
        let name = file.display().to_string();
        let log_path = args.log_dir.join(super::log_name(&args.input, file));
        match replay_file(file, &log_path, &args.scf) {
            Ok(run) => ProcessResult::Success(name, run),
            Err(e) => ProcessResult::Failed(name, e.to_string()),
        }
    })?;

    let mut summaries: Vec<ReplaySummary> = result
        .outputs
        .iter()
        .map(|(name, run)| ReplaySummary::success(name.as_str(), run))
        .collect();
    summaries.extend(
        result
            .failures
            .iter()
            .map(|(name, err)| ReplaySummary::failure(name.as_str(), err.as_str())),
    );

    output::print_header("Replay Summary");
    println!("{}", table::summary_table(&summaries));

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} success, {} failed",
        result.success(),
        result.failed()
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }

    if let Some(ref csv_path) = args.output_csv {
        export::save_summary_csv(&summaries, csv_path)?;
        output::print_success(&format!("Summary saved to '{}'", csv_path.display()));
    }

    Ok(())
}

/// 重放一个输出文件
fn replay_file(output_file: &Path, log_path: &Path, scf: &ScfArgs) -> Result<RunResult> {
    let natoms = match scf.natoms {
        Some(n) => n,
        None => header::detect_atom_count(output_file)?.unwrap_or_else(|| {
            warn!(
                "no 'number of atoms/cell' in {}, assuming 0 atoms",
                output_file.display()
            );
            0
        }),
    };
    let settings = scf.to_settings(natoms)?;

    let session = ReplaySession::open_file(output_file, log_path)?;
    let mut calculator = EspressoCalculator::new(session, settings);
    calculator.mark_changed();
    calculator
        .read()?
        .ok_or_else(|| EspressoError::Other("Replay produced no result".to_string()))
}
