//! # pwdriver - pw.x 会话驱动与输出流解析
//!
//! 启动 Quantum ESPRESSO 的 pw.x（或重放其保存的输出），逐行解析日志，
//! 提取能量、受力、磁矩与 Hubbard 占据数，并区分各类失败。
//!
//! ## 子命令
//! - `run`      - 启动 pw.x 并解析
//! - `replay`   - 重放已有输出（支持目录批量）
//! - `check`    - 检查日志中的错误块
//! - `ensemble` - BEEF-vdW 系综能量
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── calculator.rs (读取周期与待重算标志)
//!   │     ├── session/      (进程会话与持久日志)
//!   │     ├── parsers/      (输出流状态机)
//!   │     ├── batch/        (并行重放)
//!   │     ├── report/       (表格与 CSV)
//!   │     └── models/       (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod calculator;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod report;
mod session;
mod utils;

#[cfg(test)]
mod test_support;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
