//! 探测器注册表.
//!
//! 固定顺序、构建后不可变的探测器集合, 进程内只读共享.
//! 顺序即优先级: 一轮求值中第一个 `Matched` 的探测器胜出,
//! 顺序由注册时刻静态决定, 与数据到达时刻无关.

use crate::detector::ImageDetector;

/// 探测器注册表
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn ImageDetector>>,
}

impl DetectorRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// 追加注册一个探测器 (排在已注册者之后)
    pub fn register(&mut self, detector: Box<dyn ImageDetector>) {
        log::debug!("注册探测器: {}", detector.name());
        self.detectors.push(detector);
    }

    /// 已注册的探测器数量
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    /// 注册表是否为空
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// 按注册顺序取第 `index` 个探测器
    pub fn get(&self, index: usize) -> Option<&dyn ImageDetector> {
        self.detectors.get(index).map(|d| d.as_ref())
    }

    /// 按注册顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &dyn ImageDetector> {
        self.detectors.iter().map(|d| d.as_ref())
    }

    /// 所有已注册格式的短名 (按优先级顺序)
    pub fn names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
