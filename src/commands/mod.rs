//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `calculator.rs`, `parsers/`, `report/`, `utils/`
//! - 子模块: run, replay, check, ensemble

pub mod check;
pub mod ensemble;
pub mod replay;
pub mod run;

use crate::calculator::EspressoCalculator;
use crate::cli::Commands;
use crate::error::{EspressoError, Result};
use crate::models::{CalculationKind, RunResult, ScfSettings};
use crate::report::table;
use crate::session::{ReplaySession, Session};
use crate::utils::output;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Run(args) => run::execute(args),
        Commands::Replay(args) => replay::execute(args),
        Commands::Check(args) => check::execute(args),
        Commands::Ensemble(args) => ensemble::execute(args),
    }
}

/// 创建日志目录
fn ensure_log_dir(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir).map_err(|e| EspressoError::FileWriteError {
        path: log_dir.display().to_string(),
        source: e,
    })
}

/// 日志文件名：相对输入根目录的路径，分隔符替换为 `__`
fn log_name(root: &Path, file: &Path) -> String {
    let relative: PathBuf = match file.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
        _ => file
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("espresso")),
    };
    let flat: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("{}.log", flat.join("__"))
}

/// 为整份输出的后处理（check, ensemble）打开一个已启动的重放计算器
///
/// 输出在停止时被完整排空到 `<log_dir>` 下的日志中。
fn open_replay_calculator(
    input: &Path,
    log_dir: &Path,
) -> Result<(EspressoCalculator<ReplaySession<BufReader<File>>>, PathBuf)> {
    if !input.is_file() {
        return Err(EspressoError::FileNotFound {
            path: input.display().to_string(),
        });
    }
    ensure_log_dir(log_dir)?;

    let log_path = log_dir.join(log_name(input, input));
    let mut session = ReplaySession::open_file(input, &log_path)?;
    session.start()?;
    let settings = ScfSettings::new(CalculationKind::Scf, 0);
    Ok((EspressoCalculator::new(session, settings), log_path))
}

/// 打印一次读取周期的结果
fn show_result(result: &RunResult) {
    output::print_header("Energies");
    println!("{}", table::energy_table(result));

    if let Some(forces) = table::force_table(result) {
        output::print_header("Forces");
        println!("{}", forces);
        if let Some(max) = result.max_force() {
            output::print_field("max |F| (eV/Å)", &format!("{:.6}", max));
        }
    }

    if let Some(occupations) = table::occupation_table(result) {
        output::print_header("Hubbard Occupations");
        println!("{}", occupations);
    }
}
