//! # pw.x 子进程会话
//!
//! 在 scratch 目录中以 `pw.x -in <input>` 启动计算（可选 MPI 前缀），
//! 通过管道持有其 stdin/stdout。
//!
//! ## 依赖关系
//! - 实现 `session::Session`
//! - 使用 `session/transcript.rs` 记录输出

use super::{Session, SessionState, Transcript};
use crate::error::{EspressoError, Result};

use log::{debug, info, warn};
use std::fs;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

/// 启动配置
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// pw.x 可执行文件
    pub pw_command: String,
    /// 附加命令行参数（如 `-nk 2`）
    pub flags: Vec<String>,
    /// MPI 启动命令 (mpirun, srun, ...)
    pub mpi_command: Option<String>,
    /// MPI 进程数，0 表示串行
    pub nprocs: u32,
    /// 已写好的输入文件
    pub input_file: PathBuf,
    /// 运行目录
    pub scratch_dir: PathBuf,
}

impl LaunchConfig {
    pub fn new(
        pw_command: impl Into<String>,
        input_file: impl Into<PathBuf>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        LaunchConfig {
            pw_command: pw_command.into(),
            flags: Vec::new(),
            mpi_command: None,
            nprocs: 0,
            input_file: input_file.into(),
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn with_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags = flags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mpi(mut self, nprocs: u32, command: Option<String>) -> Self {
        self.nprocs = nprocs;
        self.mpi_command = command;
        self
    }

    /// 输入文件在 scratch 目录中的文件名
    fn input_name(&self) -> Result<String> {
        self.input_file
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_string())
            .ok_or_else(|| {
                EspressoError::InvalidArgument(format!(
                    "Invalid input file: {}",
                    self.input_file.display()
                ))
            })
    }

    /// 完整命令行
    pub fn command_line(&self) -> Result<Vec<String>> {
        let mut argv = Vec::new();
        if self.nprocs > 0 {
            argv.push(self.mpi_command.clone().unwrap_or_else(|| "mpirun".to_string()));
            argv.push("-np".to_string());
            argv.push(self.nprocs.to_string());
        }
        argv.push(self.pw_command.clone());
        argv.extend(self.flags.iter().cloned());
        argv.push("-in".to_string());
        argv.push(self.input_name()?);
        Ok(argv)
    }
}

/// pw.x 子进程会话
pub struct ProcessSession {
    launch: LaunchConfig,
    transcript: Transcript,
    state: SessionState,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Option<BufReader<ChildStdout>>,
}

impl ProcessSession {
    /// 创建会话（不启动），日志以追加模式打开
    pub fn new(launch: LaunchConfig, log_path: impl Into<PathBuf>) -> Result<Self> {
        Ok(ProcessSession {
            launch,
            transcript: Transcript::open(log_path)?,
            state: SessionState::NotStarted,
            child: None,
            stdin: None,
            stdout: None,
        })
    }

    /// 把输入文件放进 scratch 目录
    fn stage_input(&self) -> Result<()> {
        let src = &self.launch.input_file;
        if !src.exists() {
            return Err(EspressoError::FileNotFound {
                path: src.display().to_string(),
            });
        }

        let scratch = &self.launch.scratch_dir;
        fs::create_dir_all(scratch).map_err(|e| EspressoError::FileWriteError {
            path: scratch.display().to_string(),
            source: e,
        })?;

        let dest = scratch.join(self.launch.input_name()?);
        if same_file(src, &dest) {
            return Ok(());
        }

        fs::copy(src, &dest).map_err(|e| EspressoError::FileWriteError {
            path: dest.display().to_string(),
            source: e,
        })?;
        debug!("copied {} -> {}", src.display(), dest.display());
        Ok(())
    }

    fn drain(&mut self) -> Result<usize> {
        self.flush_input()?;
        let mut drained = 0;
        while self.read_line()?.is_some() {
            drained += 1;
        }
        Ok(drained)
    }

    fn close(&mut self) {
        self.stdin = None;
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            match child.wait() {
                Ok(status) => debug!("{} exited with {}", self.launch.pw_command, status),
                Err(e) => warn!("failed to reap {}: {}", self.launch.pw_command, e),
            }
        }
    }
}

impl Session for ProcessSession {
    fn state(&self) -> SessionState {
        self.state
    }

    fn start(&mut self) -> Result<()> {
        if self.state == SessionState::Running {
            return Ok(());
        }

        self.stage_input()?;
        let argv = self.launch.command_line()?;

        // 启动信息写入日志，便于事后排查
        self.transcript
            .record(&format!("  espresso command    : {}\n", argv.join(" ")))?;
        self.transcript.record(&format!(
            "  scratch dir         : {}\n",
            self.launch.scratch_dir.display()
        ))?;

        let mut child = Command::new(&argv[0])
            .args(&argv[1..])
            .current_dir(&self.launch.scratch_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EspressoError::CommandNotFound {
                        command: argv[0].clone(),
                    }
                } else {
                    EspressoError::StreamError {
                        command: argv[0].clone(),
                        source: e,
                    }
                }
            })?;

        self.stdin = child.stdin.take();
        self.stdout = child.stdout.take().map(BufReader::new);
        info!("started {} (pid {})", argv.join(" "), child.id());
        self.child = Some(child);
        self.state = SessionState::Running;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.state == SessionState::Running {
            self.state = SessionState::Draining;
            let drained = self.drain();
            self.close();
            self.state = SessionState::Stopped;
            let drained = drained?;
            debug!("drained {} trailing lines into {}", drained, self.transcript.path().display());
        }
        self.state = SessionState::Stopped;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        match self.stdout.as_mut() {
            Some(stdout) => self.transcript.pull_line(stdout, &self.launch.pw_command),
            None => Ok(None),
        }
    }

    fn flush_input(&mut self) -> Result<()> {
        if let Some(stdin) = self.stdin.as_mut() {
            stdin.flush().map_err(|e| EspressoError::StreamError {
                command: self.launch.pw_command.clone(),
                source: e,
            })?;
        }
        Ok(())
    }

    fn log_path(&self) -> &Path {
        self.transcript.path()
    }
}

impl Drop for ProcessSession {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            warn!("killing unfinished {} (pid {})", self.launch.pw_command, child.id());
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::transcript::read_log_lines;
    use crate::test_support::scratch_dir;

    #[test]
    fn test_command_line_with_mpi() {
        let launch = LaunchConfig::new("pw.x", "/tmp/in/input.pwi", "/tmp/scratch")
            .with_flags(["-nk", "2"])
            .with_mpi(4, None);
        assert_eq!(
            launch.command_line().unwrap(),
            vec!["mpirun", "-np", "4", "pw.x", "-nk", "2", "-in", "input.pwi"]
        );
    }

    #[test]
    fn test_missing_input_file() {
        let dir = scratch_dir("process_missing_input");
        let launch = LaunchConfig::new("pw.x", dir.join("absent.pwi"), dir.join("scratch"));
        let mut session = ProcessSession::new(launch, dir.join("pw.log")).unwrap();
        assert!(matches!(
            session.start().unwrap_err(),
            EspressoError::FileNotFound { .. }
        ));
        assert_eq!(session.state(), SessionState::NotStarted);
    }

    #[test]
    fn test_missing_executable() {
        let dir = scratch_dir("process_missing_exe");
        let input = dir.join("input.pwi");
        fs::write(&input, "&CONTROL\n/\n").unwrap();

        let launch = LaunchConfig::new("pwdriver-no-such-binary", &input, dir.join("scratch"));
        let mut session = ProcessSession::new(launch, dir.join("pw.log")).unwrap();
        assert!(matches!(
            session.start().unwrap_err(),
            EspressoError::CommandNotFound { .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_stop_drains_remaining_output() {
        let dir = scratch_dir("process_drain");
        let input = dir.join("input.pwi");
        fs::write(&input, "&CONTROL\n/\n").unwrap();

        let launch = LaunchConfig::new("sh", &input, dir.join("scratch"))
            .with_flags(["-c", "printf 'line one\\nline two\\nline three\\n'"]);
        let log = dir.join("pw.log");
        let mut session = ProcessSession::new(launch, &log).unwrap();

        session.start().unwrap();
        session.start().unwrap();
        assert_eq!(session.state(), SessionState::Running);
        assert!(dir.join("scratch").join("input.pwi").exists());
        assert_eq!(session.read_line().unwrap().as_deref(), Some("line one\n"));

        session.stop().unwrap();
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(session.read_line().unwrap().is_none());

        let lines = read_log_lines(&log).unwrap();
        assert!(lines[0].starts_with("  espresso command    : sh -c"));
        assert_eq!(&lines[2..], &["line one", "line two", "line three"]);
    }
}
