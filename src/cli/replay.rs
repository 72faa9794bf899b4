//! # replay 子命令 CLI 定义
//!
//! 把已有的 pw.x 输出文件当作实时流重放
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/replay.rs`

use super::settings::ScfArgs;
use clap::Args;
use std::path::PathBuf;

/// replay 子命令参数
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Input: pw.x output file or directory containing output files
    pub input: PathBuf,

    /// Directory for the durable logs written while replaying
    #[arg(long, default_value = "pwdriver-logs")]
    pub log_dir: PathBuf,

    /// Save a per-file summary as CSV (batch mode)
    #[arg(long)]
    pub output_csv: Option<PathBuf>,

    #[command(flatten)]
    pub scf: ScfArgs,

    // ─────────────────────────────────────────────────────────────
    // 批量处理参数
    // ─────────────────────────────────────────────────────────────
    /// Glob pattern for output files (batch mode, e.g., "*.out,*.pwo")
    #[arg(long, default_value = "*.out,*.pwo")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,
}
