//! # 进程会话模块
//!
//! 管理与 pw.x 输出流的长连接：启动、逐行读取、停止（排空剩余输出）。
//! 每一行读到的输出都会立即写入持久日志 (`Transcript`)。
//!
//! 同一时间只应有一个活动计算器持有会话；该约束由调用方负责，
//! 这里不做强制。读取没有超时，pw.x 挂起时读取会一直阻塞。
//!
//! ## 依赖关系
//! - 被 `calculator.rs`, `parsers/scf_stream.rs` 使用
//! - 子模块: transcript, process, replay

pub mod process;
pub mod replay;
pub mod transcript;

pub use process::{LaunchConfig, ProcessSession};
pub use replay::ReplaySession;
pub use transcript::Transcript;

use crate::error::Result;
use std::path::Path;

/// 会话生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Running,
    /// 正在排空剩余输出
    Draining,
    Stopped,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::NotStarted => write!(f, "not started"),
            SessionState::Running => write!(f, "running"),
            SessionState::Draining => write!(f, "draining"),
            SessionState::Stopped => write!(f, "stopped"),
        }
    }
}

/// pw.x 输出源
pub trait Session {
    /// 当前状态
    fn state(&self) -> SessionState;

    /// 启动；已在运行时不做任何事
    fn start(&mut self) -> Result<()>;

    /// 停止：排空输出并全部记录到日志，关闭输入输出流
    fn stop(&mut self) -> Result<()>;

    /// 读取下一行（含换行符）并记录到日志；流结束或未运行时返回 `None`
    fn read_line(&mut self) -> Result<Option<String>>;

    /// 刷新输入端
    fn flush_input(&mut self) -> Result<()>;

    /// 持久日志路径
    fn log_path(&self) -> &Path;

    fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }
}
