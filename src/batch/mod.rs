//! # 批量重放
//!
//! 目录模式下收集 pw.x 输出文件 (`collector`)，在固定大小的线程池中
//! 逐个重放 (`runner`)。每个文件有自己的日志，彼此之间不共享会话。
//!
//! ## 依赖关系
//! - 被 `commands/replay.rs` 使用
//! - 使用 `rayon`, `num_cpus`, `walkdir`, `glob`, `indicatif`

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchRunner, ProcessResult};
