//! # check 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/check.rs`

use clap::Args;
use std::path::PathBuf;

/// check 子命令参数
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// pw.x output file to scan
    pub input: PathBuf,

    /// Directory for the durable log written while replaying
    #[arg(long, default_value = "pwdriver-logs")]
    pub log_dir: PathBuf,
}
