//! # 终端输出
//!
//! 带彩色标签的状态行、键值行与标题栏。错误写到 stderr，其余写到 stdout。
//!
//! ## 依赖关系
//! - 被 `main.rs` 与 `commands/` 使用
//! - 使用 `colored` crate

use colored::{ColoredString, Colorize};

const RULE_WIDTH: usize = 60;

fn emit(tag: ColoredString, msg: &str) {
    println!("{} {}", tag, msg);
}

pub fn print_success(msg: &str) {
    emit("[OK]".green().bold(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

pub fn print_warning(msg: &str) {
    emit("[WARN]".yellow().bold(), msg);
}

pub fn print_info(msg: &str) {
    emit("[*]".blue().bold(), msg);
}

/// 缩进的键值行，例如 `command   pw.x -in si.in`
pub fn print_field(key: &str, value: &str) {
    println!("  {:<26} {}", key.dimmed(), value);
}

fn rule() -> ColoredString {
    "─".repeat(RULE_WIDTH).dimmed()
}

/// 标题栏
pub fn print_header(title: &str) {
    println!("\n{}\n  {}\n{}\n", rule(), title.bold(), rule());
}

pub fn print_separator() {
    println!("{}", rule());
}
