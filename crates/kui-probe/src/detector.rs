//! 格式探测器协议.
//!
//! 每种图像容器格式实现一个 [`ImageDetector`], 作为窗口字节的纯函数,
//! 对 "这是不是我的格式, 尺寸是多少" 给出三态判定. 引擎不为探测器保存
//! 任何跨轮私有状态, 每轮都以完整窗口重新求值.

use kui_core::ImageInfo;

use crate::window::ByteWindow;

/// 一次探测器求值的三态结果
#[derive(Debug)]
pub enum Verdict {
    /// 当前窗口不足以下结论, 估计还需要至少这么多字节
    ///
    /// 该数值仅是建议, 调度器不保证一次性凑齐, 只保证有新块到达时重新求值.
    NeedMore(usize),
    /// 签名与结构均匹配, 尺寸已提取
    Matched(ImageInfo),
    /// 确定不是此格式 (含签名匹配但结构损坏的保守降级)
    Rejected,
}

/// 图像格式探测器 trait
///
/// 实现要求:
/// - `detect` 必须是窗口的纯函数, 不得依赖调用次数或分块边界;
/// - 签名匹配后发现内部不一致时返回 `Rejected`, 绝不 panic,
///   让调度器继续尝试余下候选;
/// - 线性扫描类格式必须自带扫描预算, 超出预算即 `Rejected`,
///   不得让会话无限等待.
pub trait ImageDetector: Send + Sync {
    /// 格式短名 (如 "png")
    fn name(&self) -> &'static str;

    /// 默认 MIME 类型
    ///
    /// 个别探测器 (如 AVIF/HEIC 家族) 会在 `Matched` 结果中
    /// 按实际品牌细化此值.
    fn mime(&self) -> &'static str;

    /// 对当前窗口求值
    fn detect(&self, window: &ByteWindow) -> Verdict;
}
