//! # 测试辅助
//!
//! 为各模块测试提供独立的临时目录与回放会话。

use crate::session::{ReplaySession, Transcript};

use std::io::Cursor;
use std::path::{Path, PathBuf};

/// 每个测试独占的临时目录（重新创建）
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join(format!("pwdriver-tests-{}", std::process::id()))
        .join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// 由若干行构造的回放会话，日志写到 `dir/pw.log`
pub fn replay_session(dir: &Path, lines: &[&str]) -> ReplaySession<Cursor<Vec<u8>>> {
    let mut text = lines.join("\n");
    text.push('\n');
    let transcript = Transcript::open(dir.join("pw.log")).unwrap();
    ReplaySession::new("fixture", Cursor::new(text.into_bytes()), transcript)
}
