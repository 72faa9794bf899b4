//! # 解析器模块
//!
//! pw.x 输出的流式解析：行分类、SCF 状态机、能量/受力块、
//! 日志重扫描、错误块扫描与 BEEF 系综能量。
//!
//! ## 依赖关系
//! - 被 `calculator.rs` 和 `commands/` 使用
//! - 使用 `session/` 读取输出，使用 `models/` 数据模型
//! - 子模块: marker, occupation, scf_stream, final_block, rescan, error_block, ensemble, header

pub mod ensemble;
pub mod error_block;
pub mod final_block;
pub mod header;
pub mod marker;
pub mod occupation;
pub mod rescan;
pub mod scf_stream;

use crate::error::{EspressoError, Result};
use crate::session::Session;

/// 逐行输入源：实时会话或已读入内存的日志
pub trait LineFeed {
    /// 下一行；结束时返回 `None`
    fn next_line(&mut self) -> Result<Option<String>>;
}

/// 从会话读取（每行都写入日志）
pub struct LiveFeed<'a, S: Session>(pub &'a mut S);

impl<S: Session> LineFeed for LiveFeed<'_, S> {
    fn next_line(&mut self) -> Result<Option<String>> {
        self.0.read_line()
    }
}

/// 从内存中的日志行读取
pub struct LogLines {
    lines: std::vec::IntoIter<String>,
}

impl LogLines {
    pub fn new(lines: Vec<String>) -> Self {
        LogLines {
            lines: lines.into_iter(),
        }
    }
}

impl LineFeed for LogLines {
    fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.next())
    }
}

/// 读取下一行，流结束视为错误
pub fn next_or_eof<F: LineFeed>(feed: &mut F, expected: &str) -> Result<String> {
    feed.next_line()?
        .ok_or_else(|| EspressoError::UnexpectedEndOfStream {
            expected: expected.to_string(),
        })
}

/// 取倒数第二个字段，例如 `... =     -15.85432100 Ry` 中的数值
pub fn value_before_unit(line: &str, context: &str) -> Result<f64> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(EspressoError::malformed(context, line));
    }
    fields[fields.len() - 2]
        .parse()
        .map_err(|_| EspressoError::malformed(context, line))
}
