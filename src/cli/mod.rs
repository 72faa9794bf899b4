//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `run`: 启动 pw.x 并流式解析输出
//! - `replay`: 把已有输出文件当作实时流重放（支持目录批量）
//! - `check`: 检查日志中的错误块
//! - `ensemble`: 读取 BEEF-vdW 系综能量
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: settings, run, replay, check, ensemble

pub mod check;
pub mod ensemble;
pub mod replay;
pub mod run;
pub mod settings;

use clap::{Parser, Subcommand};

/// pwdriver - pw.x 会话驱动与输出流解析
#[derive(Parser)]
#[command(name = "pwdriver")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Drive Quantum ESPRESSO pw.x and stream-parse its output", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Launch pw.x on an existing input file and parse its output
    Run(run::RunArgs),

    /// Replay saved pw.x output through the streaming parser
    Replay(replay::ReplayArgs),

    /// Scan a pw.x log for an error block
    Check(check::CheckArgs),

    /// Extract BEEF-vdW ensemble energies from a pw.x log
    Ensemble(ensemble::EnsembleArgs),
}
