//! # run 子命令 CLI 定义
//!
//! 启动参数可由环境变量提供
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/run.rs`

use super::settings::ScfArgs;
use clap::Args;
use std::path::PathBuf;

/// run 子命令参数
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Previously written pw.x input file
    pub input: PathBuf,

    /// pw.x executable
    #[arg(long, env = "ESPRESSO_PW_COMMAND", default_value = "pw.x")]
    pub pw_command: String,

    /// Extra pw.x flags (e.g. "-nk 2"), split on whitespace
    #[arg(long, env = "ESPRESSO_PW_FLAGS", default_value = "", allow_hyphen_values = true)]
    pub pw_flags: String,

    /// MPI launcher (mpirun, srun, ...), used when --np > 0
    #[arg(long)]
    pub mpi_command: Option<String>,

    /// Number of MPI processes (0 = serial)
    #[arg(long, default_value_t = 0)]
    pub np: u32,

    /// Directory pw.x runs in
    #[arg(long, env = "ESPRESSO_SCRATCH", default_value = ".")]
    pub scratch: PathBuf,

    /// Durable log file (default: <scratch>/<input stem>.log)
    #[arg(long)]
    pub log: Option<PathBuf>,

    #[command(flatten)]
    pub scf: ScfArgs,
}
