//! # ensemble 子命令实现
//!
//! 把 BEEF-vdW 计算的输出重放进日志，停止会话后打印 32 个非自洽交换关联能。
//!
//! ## 依赖关系
//! - 使用 `cli/ensemble.rs` 定义的参数
//! - 使用 `calculator.rs`, `report/table.rs`

use crate::cli::ensemble::EnsembleArgs;
use crate::error::Result;
use crate::report::table;
use crate::utils::output;

/// 执行 ensemble
pub fn execute(args: EnsembleArgs) -> Result<()> {
    let energies = read_energies(&args)?;
    output::print_header("BEEF-vdW Ensemble");
    println!("{}", table::ensemble_table(&energies));
    Ok(())
}

fn read_energies(args: &EnsembleArgs) -> Result<Vec<f64>> {
    let (mut calculator, _) = super::open_replay_calculator(&args.input, &args.log_dir)?;
    calculator.nonselfconsistent_energies()
}
