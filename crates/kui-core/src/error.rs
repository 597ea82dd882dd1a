//! 统一错误类型定义.
//!
//! 所有 Kui crate 共用的错误类型, 支持跨模块传播.
//!
//! 注意: `Unrecognized` 与 `EmptyInput` 的错误文案是对外契约的一部分
//! (调用方按 "unrecognized file format" 子串匹配), 不可随意改动.

use thiserror::Error;

/// Kui 框架统一错误类型
#[derive(Debug, Error)]
pub enum KuiError {
    /// 源数据耗尽前没有任何探测器匹配
    #[error("unrecognized file format")]
    Unrecognized,

    /// 源没有产出任何字节 (空输入, 属于 Unrecognized 的可区分子类)
    #[error("unrecognized file format (empty input)")]
    EmptyInput,

    /// 底层字节源错误, 原样透传, 不做包装
    #[error(transparent)]
    Source(#[from] std::io::Error),

    /// 会话在得出结论前被外部取消
    #[error("probe aborted")]
    Aborted,
}

impl KuiError {
    /// 是否属于 "无法识别格式" 一类 (含空输入)
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, KuiError::Unrecognized | KuiError::EmptyInput)
    }
}

/// Kui 框架统一 Result 类型
pub type KuiResult<T> = Result<T, KuiError>;
