//! # 统一错误处理模块
//!
//! 定义 pwdriver 的所有错误类型，使用 `thiserror` 派生。
//!
//! 计算相关的失败分为四类（按信息量从低到高）：
//! - SCF 不收敛：`KohnShamConvergence`
//! - 异常终止且无错误文本：`Runtime(SCF_FAILED)`
//! - 异常终止且日志中有错误块：`Runtime(<错误块原文>)`
//! - 可执行文件未启动：`Runtime(NOT_STARTED)`
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// 无法从日志中找到具体错误文本时的通用失败信息
pub const SCF_FAILED: &str = "SCF calculation failed";

/// 日志中找不到 pw.x 启动标志时的失败信息
pub const NOT_STARTED: &str = "Espresso executable doesn't seem to have been started.";

/// pwdriver 统一错误类型
#[derive(Error, Debug)]
pub enum EspressoError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 外部进程错误
    // ─────────────────────────────────────────────────────────────
    #[error("External command '{command}' not found in PATH")]
    CommandNotFound { command: String },

    #[error("Failed to communicate with '{command}'")]
    StreamError {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Malformed {context} line: {line:?}")]
    MalformedLine { context: String, line: String },

    #[error("Output ended while looking for {expected}")]
    UnexpectedEndOfStream { expected: String },

    #[error("Malformed log file: {path}\nReason: {reason}")]
    MalformedLog { path: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 计算失败
    // ─────────────────────────────────────────────────────────────
    #[error("scf cycles did not converge\nincrease maximum number of steps and/or decreasing mixing")]
    KohnShamConvergence,

    #[error("{0}")]
    Runtime(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl EspressoError {
    /// 通用的 SCF 失败
    pub fn scf_failed() -> Self {
        EspressoError::Runtime(SCF_FAILED.to_string())
    }

    /// pw.x 未启动
    pub fn not_started() -> Self {
        EspressoError::Runtime(NOT_STARTED.to_string())
    }

    pub fn malformed(context: &str, line: &str) -> Self {
        EspressoError::MalformedLine {
            context: context.to_string(),
            line: line.trim_end().to_string(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, EspressoError>;
