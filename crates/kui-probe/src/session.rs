//! 探测会话调度器.
//!
//! 驱动一次探测的完整生命周期: 从源拉取数据块追加进字节窗口,
//! 按注册表顺序对仍存活的探测器逐一求值, 第一个 `Matched` 胜出;
//! `Rejected` 的探测器永久出局; 存活集清空、源耗尽、源错误或外部取消
//! 都会立即终结会话. 任何终结路径都先关闭源, 再落定结果.

use kui_core::{ImageInfo, KuiError, KuiResult};

use crate::completion::AbortHandle;
use crate::registry::DetectorRegistry;
use crate::detector::Verdict;
use crate::source::{ChunkSource, SourceEvent};
use crate::window::ByteWindow;

/// 一轮求值的结果
enum RoundOutcome {
    /// 仍有探测器在等更多数据
    Continue,
    /// 某个探测器胜出
    Matched(ImageInfo),
    /// 存活集已清空
    Exhausted,
}

/// 一次探测会话
///
/// 持有字节窗口与存活探测器下标集 (只减不增), 对注册表只读共享.
pub struct ProbeSession<'r> {
    registry: &'r DetectorRegistry,
    window: ByteWindow,
    /// 注册表下标, 保持注册顺序; 被排除的探测器从中移除
    active: Vec<usize>,
    abort: AbortHandle,
}

impl<'r> ProbeSession<'r> {
    /// 创建会话, 存活集初始化为整个注册表
    pub fn new(registry: &'r DetectorRegistry) -> Self {
        Self::with_abort(registry, AbortHandle::new())
    }

    /// 创建会话并挂接外部取消句柄
    pub fn with_abort(registry: &'r DetectorRegistry, abort: AbortHandle) -> Self {
        Self {
            registry,
            window: ByteWindow::new(),
            active: (0..registry.len()).collect(),
            abort,
        }
    }

    /// 驱动会话直至终结
    ///
    /// 返回前保证 `source.close()` 已被调用, 成功、失败、取消概莫能外.
    pub fn run(mut self, source: &mut dyn ChunkSource) -> KuiResult<ImageInfo> {
        loop {
            // 取消在源事件边界生效
            if self.abort.is_aborted() {
                source.close();
                return Err(KuiError::Aborted);
            }

            match source.next_chunk() {
                SourceEvent::Chunk(chunk) => {
                    if chunk.is_empty() {
                        continue;
                    }
                    self.window.append(&chunk);
                    log::trace!(
                        "收到 {} 字节, 窗口共 {} 字节, 存活探测器 {} 个",
                        chunk.len(),
                        self.window.len(),
                        self.active.len()
                    );
                    match self.evaluate_round() {
                        RoundOutcome::Matched(info) => {
                            source.close();
                            log::debug!(
                                "命中 {}: {}x{}, 共读取 {} 字节",
                                info.format,
                                info.width,
                                info.height,
                                self.window.len()
                            );
                            return Ok(info);
                        }
                        RoundOutcome::Exhausted => {
                            source.close();
                            log::debug!("所有探测器均已排除, 读取了 {} 字节", self.window.len());
                            return Err(KuiError::Unrecognized);
                        }
                        RoundOutcome::Continue => {}
                    }
                }
                SourceEvent::End => {
                    source.close();
                    return Err(if self.window.is_empty() {
                        KuiError::EmptyInput
                    } else {
                        KuiError::Unrecognized
                    });
                }
                SourceEvent::Error(e) => {
                    source.close();
                    return Err(KuiError::Source(e));
                }
            }
        }
    }

    /// 按注册顺序对存活探测器求值一轮
    fn evaluate_round(&mut self) -> RoundOutcome {
        let mut i = 0;
        while i < self.active.len() {
            let idx = self.active[i];
            // 下标来自注册表本身, 必然有效
            let Some(detector) = self.registry.get(idx) else {
                self.active.remove(i);
                continue;
            };
            match detector.detect(&self.window) {
                Verdict::Matched(info) => return RoundOutcome::Matched(info),
                Verdict::Rejected => {
                    log::trace!("排除 {}", detector.name());
                    self.active.remove(i);
                }
                Verdict::NeedMore(n) => {
                    log::trace!("{} 还需至少 {} 字节", detector.name(), n);
                    i += 1;
                }
            }
        }
        if self.active.is_empty() {
            RoundOutcome::Exhausted
        } else {
            RoundOutcome::Continue
        }
    }
}
