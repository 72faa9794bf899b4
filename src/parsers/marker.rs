//! # pw.x 输出行分类
//!
//! 用一张有序规则表把每一行映射到至多一个标记。
//! 列范围是有意义的：pw.x 的输出是定宽格式，
//! 例如 `"!    total energy"` 必须出现在第 0–17 列。
//! 第一条命中的规则生效；都不命中的行只写入日志，不参与解析。
//!
//! ## 依赖关系
//! - 被 `parsers/scf_stream.rs`, `parsers/final_block.rs` 使用

/// 解析器识别的文本检查点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMarker {
    /// `!    total energy              =     -15.85432100 Ry`
    TotalEnergyLine,
    /// `     stopping ...`
    StoppingLine,
    /// `     convergence NOT achieved after 100 iterations: stopping`
    ConvergenceFailureLine,
    /// `     iteration #  1     ecut=    30.00 Ry     beta= 0.70`
    IterationOneStart,
    /// `     End of self-consistent calculation`
    SelfConsistentEnd,
    /// ` --- exit write_ns ---`
    WriteNsExit,
    /// `atom    1   Tr[ns(na)] =   1.00000`
    AtomOccupationLine,
    /// `     smearing contrib. (-TS)   =      -0.00012345 Ry`
    SmearingEntropyLine,
    /// `     Forces acting on atoms (cartesian axes, Ry/au):`
    ForcesHeaderLine,
    /// `     atom    1 type  1   force =     0.00100000    0.00000000   -0.00200000`
    PerAtomForceLine,
    /// 含 `EXX` 的行
    ExxMarker,
}

/// 匹配规则
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// 第 `start..end` 列恰好等于 `literal`
    Columns {
        start: usize,
        end: usize,
        literal: &'static str,
    },
    /// 行中任意位置包含 `needle`
    Contains(&'static str),
}

impl Rule {
    pub fn matches(&self, line: &str) -> bool {
        match *self {
            Rule::Columns {
                start,
                end,
                literal,
            } => line.get(start..end) == Some(literal),
            Rule::Contains(needle) => line.contains(needle),
        }
    }
}

const fn columns(start: usize, end: usize, literal: &'static str) -> Rule {
    Rule::Columns {
        start,
        end,
        literal,
    }
}

/// 有序规则表
pub const MARKER_TABLE: &[(Rule, ParseMarker)] = &[
    (columns(0, 17, "!    total energy"), ParseMarker::TotalEnergyLine),
    (columns(0, 13, "     stopping"), ParseMarker::StoppingLine),
    (columns(0, 20, "     convergence NOT"), ParseMarker::ConvergenceFailureLine),
    (columns(0, 19, "     iteration #  1"), ParseMarker::IterationOneStart),
    (
        columns(0, 39, "     End of self-consistent calculation"),
        ParseMarker::SelfConsistentEnd,
    ),
    (columns(0, 22, " --- exit write_ns ---"), ParseMarker::WriteNsExit),
    (columns(0, 5, "atom "), ParseMarker::AtomOccupationLine),
    (columns(0, 13, "     smearing"), ParseMarker::SmearingEntropyLine),
    (columns(0, 11, "     Forces"), ParseMarker::ForcesHeaderLine),
    (Rule::Contains("EXX"), ParseMarker::ExxMarker),
    (Rule::Contains("force"), ParseMarker::PerAtomForceLine),
];

/// 对一行分类
pub fn classify(line: &str) -> Option<ParseMarker> {
    MARKER_TABLE
        .iter()
        .find(|(rule, _)| rule.matches(line))
        .map(|(_, marker)| *marker)
}
