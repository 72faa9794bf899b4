//! # pw.x 计算器
//!
//! 持有一个会话和一组解析设置，对外提供"读取一次计算结果"的入口。
//!
//! 待重算标志由调用方设置：输入写好（或换了一份输出要重放）后调用
//! `mark_changed()`。只有完整的读取周期（含日志重扫描和最终错误检查）
//! 成功后才清除该标志，任何失败都会保留它。
//!
//! ## 依赖关系
//! - 被 `commands/` 的全部子命令使用
//! - 使用 `session/`, `parsers/`, `models/`

use crate::error::Result;
use crate::models::{RunResult, ScfSettings};
use crate::parsers::{ensemble, error_block, scf_stream};
use crate::session::Session;

use log::{debug, info};

/// 单会话计算器
pub struct EspressoCalculator<S: Session> {
    session: S,
    settings: ScfSettings,
    recalculate: bool,
}

impl<S: Session> EspressoCalculator<S> {
    pub fn new(session: S, settings: ScfSettings) -> Self {
        EspressoCalculator {
            session,
            settings,
            recalculate: false,
        }
    }

    /// 标记需要重新计算
    pub fn mark_changed(&mut self) {
        self.recalculate = true;
    }

    pub fn needs_recalculation(&self) -> bool {
        self.recalculate
    }

    pub fn settings(&self) -> &ScfSettings {
        &self.settings
    }

    /// 一次读取周期
    ///
    /// 未启动时先启动会话，已在运行时刷新输入端。
    /// 没有待重算的变化时返回 `Ok(None)`。
    pub fn read(&mut self) -> Result<Option<RunResult>> {
        if self.session.is_running() {
            self.session.flush_input()?;
        } else {
            self.session.start()?;
        }

        if !self.recalculate {
            debug!("no pending changes, skipping read");
            return Ok(None);
        }

        let result = scf_stream::read_run(&mut self.session, &self.settings)?;
        self.recalculate = false;
        info!(
            "read cycle finished ({}, {} atoms)",
            self.settings.calculation, self.settings.natoms
        );
        Ok(Some(result))
    }

    /// 停止会话并读取 BEEF-vdW 系综能量 (eV)
    pub fn nonselfconsistent_energies(&mut self) -> Result<Vec<f64>> {
        self.session.stop()?;
        ensemble::read_beef_ensemble(self.session.log_path())
    }

    /// 停止会话并检查日志中的错误块
    pub fn check_error(&mut self) -> Result<()> {
        error_block::check_session(&mut self.session)
    }

    pub fn stop(&mut self) -> Result<()> {
        self.session.stop()
    }
}
