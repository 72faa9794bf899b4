//! # 回放会话
//!
//! 把已保存的 pw.x 输出（或任意 `BufRead`）当作实时输出流，
//! 与子进程会话遵守同一套生命周期与日志约定。
//!
//! ## 依赖关系
//! - 实现 `session::Session`
//! - 被 `commands/replay.rs` 和各模块测试使用

use super::{Session, SessionState, Transcript};
use crate::error::{EspressoError, Result};

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// 回放会话
pub struct ReplaySession<R: BufRead> {
    name: String,
    source: Option<R>,
    transcript: Transcript,
    state: SessionState,
}

impl<R: BufRead> ReplaySession<R> {
    pub fn new(name: impl Into<String>, source: R, transcript: Transcript) -> Self {
        ReplaySession {
            name: name.into(),
            source: Some(source),
            transcript,
            state: SessionState::NotStarted,
        }
    }
}

impl ReplaySession<BufReader<File>> {
    /// 打开已保存的输出文件，日志写到 `log_path`
    pub fn open_file(output: &Path, log_path: impl Into<PathBuf>) -> Result<Self> {
        let file = File::open(output).map_err(|e| EspressoError::FileReadError {
            path: output.display().to_string(),
            source: e,
        })?;
        Ok(ReplaySession::new(
            output.display().to_string(),
            BufReader::new(file),
            Transcript::open(log_path)?,
        ))
    }
}

impl<R: BufRead> Session for ReplaySession<R> {
    fn state(&self) -> SessionState {
        self.state
    }

    fn start(&mut self) -> Result<()> {
        match self.state {
            SessionState::Running => Ok(()),
            SessionState::NotStarted => {
                self.state = SessionState::Running;
                Ok(())
            }
            _ => Err(EspressoError::Runtime(format!(
                "Replay source '{}' has already been consumed",
                self.name
            ))),
        }
    }

    fn stop(&mut self) -> Result<()> {
        if self.state == SessionState::Running {
            self.state = SessionState::Draining;
            let drained = loop {
                match self.read_line() {
                    Ok(Some(_)) => continue,
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(e),
                }
            };
            self.source = None;
            self.state = SessionState::Stopped;
            drained?;
        }
        self.state = SessionState::Stopped;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        if !matches!(self.state, SessionState::Running | SessionState::Draining) {
            return Ok(None);
        }
        match self.source.as_mut() {
            Some(source) => self.transcript.pull_line(source, &self.name),
            None => Ok(None),
        }
    }

    fn flush_input(&mut self) -> Result<()> {
        Ok(())
    }

    fn log_path(&self) -> &Path {
        self.transcript.path()
    }
}
