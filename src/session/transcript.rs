//! # 持久日志
//!
//! 以追加模式打开的文本文件，记录从输出源读到的每一行。
//! 每行写入后立即 flush，保证失败时日志仍然完整。
//!
//! ## 依赖关系
//! - 被 `session/process.rs`, `session/replay.rs` 使用

use crate::error::{EspressoError, Result};

use std::fs::{File, OpenOptions};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// 持久日志
#[derive(Debug)]
pub struct Transcript {
    path: PathBuf,
    file: File,
}

impl Transcript {
    /// 以追加模式打开（不存在则创建）
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| EspressoError::FileWriteError {
                path: path.display().to_string(),
                source: e,
            })?;
        Ok(Transcript { path, file })
    }

    /// 写入一行原文并 flush
    pub fn record(&mut self, line: &str) -> Result<()> {
        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|e| EspressoError::FileWriteError {
                path: self.path.display().to_string(),
                source: e,
            })
    }

    /// 从 `reader` 读取一行（总以换行符结尾）并记录；读到流末尾时返回 `None`
    pub fn pull_line<R: BufRead>(&mut self, reader: &mut R, source: &str) -> Result<Option<String>> {
        let mut buf = Vec::new();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| EspressoError::StreamError {
                command: source.to_string(),
                source: e,
            })?;
        if n == 0 {
            return Ok(None);
        }
        // 流末尾没有换行的最后一行补上换行，后续追加不会接在同一行
        if buf.last() != Some(&b'\n') {
            buf.push(b'\n');
        }

        let line = String::from_utf8_lossy(&buf).into_owned();
        self.record(&line)?;
        Ok(Some(line))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// 读取整个日志文件为行列表（非法 UTF-8 以替换字符处理）
pub fn read_log_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path).map_err(|e| EspressoError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(|l| l.to_string())
        .collect())
}
