//! 完成契约: 一次性结果通道.
//!
//! 每个会话只产出一个终值, 由调度器恰好一次地写入 [`Completion`].
//! 对外的两种调用习惯 (错误优先回调与阻塞等待) 都只是这同一个
//! 内部落定点上的薄适配, 不存在第二条独立的决议路径.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use kui_core::{ImageInfo, KuiError, KuiResult};

/// 错误优先回调
pub type CompletionCallback = Box<dyn FnOnce(KuiResult<ImageInfo>) + Send>;

/// 落定状态机
enum State {
    /// 尚未落定; 可能已挂接回调
    Pending { callback: Option<CompletionCallback> },
    /// 已落定; 值在被取走 (wait 或回调) 后清空
    Settled(Option<KuiResult<ImageInfo>>),
}

/// 一次性落定原语
///
/// 以互斥量内的状态机保证 "恰好落定一次": 第二次 `settle` 不会改写
/// 已落定的结果. 等待方通过条件变量唤醒.
#[derive(Clone)]
pub(crate) struct Completion {
    inner: Arc<(Mutex<State>, Condvar)>,
}

impl Completion {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new((
                Mutex::new(State::Pending { callback: None }),
                Condvar::new(),
            )),
        }
    }

    /// 写入终值 (恰好一次; 重复调用被忽略)
    pub(crate) fn settle(&self, result: KuiResult<ImageInfo>) {
        let (lock, cvar) = &*self.inner;
        let mut st = lock.lock().unwrap();
        let State::Pending { callback } = &mut *st else {
            log::warn!("完成契约被重复落定, 忽略后到的结果");
            return;
        };
        match callback.take() {
            Some(cb) => {
                *st = State::Settled(None);
                // 回调在锁外执行, 避免回调内再触碰句柄造成死锁
                drop(st);
                cb(result);
            }
            None => {
                *st = State::Settled(Some(result));
                cvar.notify_all();
            }
        }
    }

    /// 阻塞等待终值
    pub(crate) fn wait(&self) -> KuiResult<ImageInfo> {
        let (lock, cvar) = &*self.inner;
        let mut st = lock.lock().unwrap();
        loop {
            match &mut *st {
                State::Settled(value) => {
                    // 值只会被取走一次; 句柄的所有权设计保证两种模式互斥
                    return value.take().unwrap_or(Err(KuiError::Aborted));
                }
                State::Pending { .. } => st = cvar.wait(st).unwrap(),
            }
        }
    }

    /// 挂接回调; 若已落定则立即在当前线程调用
    pub(crate) fn set_callback(&self, cb: CompletionCallback) {
        let (lock, _cvar) = &*self.inner;
        let mut st = lock.lock().unwrap();
        match &mut *st {
            State::Pending { callback } => {
                *callback = Some(cb);
            }
            State::Settled(value) => {
                if let Some(result) = value.take() {
                    drop(st);
                    cb(result);
                }
            }
        }
    }
}

/// 外部取消句柄
///
/// 可克隆; `abort()` 置位后, 会话在下一个源事件边界观察到标志,
/// 关闭源并以 [`KuiError::Aborted`] 落定.
#[derive(Clone, Default)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 请求取消
    pub fn abort(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// 是否已请求取消
    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// 后台探测会话的结果句柄
///
/// 两种完成模式二选一, 均消耗句柄:
/// - [`wait`](ProbeHandle::wait): 阻塞直至落定, 返回结果;
/// - [`on_complete`](ProbeHandle::on_complete): 挂接错误优先回调,
///   落定时 (或已落定则立即) 被调用.
pub struct ProbeHandle {
    pub(crate) completion: Completion,
    pub(crate) abort: AbortHandle,
}

impl ProbeHandle {
    /// 阻塞等待探测结果
    pub fn wait(self) -> KuiResult<ImageInfo> {
        self.completion.wait()
    }

    /// 挂接错误优先回调
    pub fn on_complete(self, cb: impl FnOnce(KuiResult<ImageInfo>) + Send + 'static) {
        self.completion.set_callback(Box::new(cb));
    }

    /// 获取可克隆的取消句柄
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// 请求取消本次探测
    pub fn abort(&self) {
        self.abort.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_先落定后等待() {
        let c = Completion::new();
        c.settle(Ok(ImageInfo::new("png", "image/png", 1, 2)));
        let info = c.wait().unwrap();
        assert_eq!((info.width, info.height), (1, 2));
    }

    #[test]
    fn test_重复落定被忽略() {
        let c = Completion::new();
        c.settle(Ok(ImageInfo::new("png", "image/png", 1, 2)));
        c.settle(Err(KuiError::Unrecognized));
        assert!(c.wait().is_ok());
    }

    #[test]
    fn test_回调在落定时触发() {
        let c = Completion::new();
        let (tx, rx) = mpsc::channel();
        c.set_callback(Box::new(move |result| {
            tx.send(result.map(|i| i.width)).unwrap();
        }));
        c.settle(Ok(ImageInfo::new("gif", "image/gif", 7, 8)));
        assert_eq!(rx.recv().unwrap().unwrap(), 7);
    }

    #[test]
    fn test_落定之后挂接回调立即触发() {
        let c = Completion::new();
        c.settle(Err(KuiError::Unrecognized));
        let (tx, rx) = mpsc::channel();
        c.set_callback(Box::new(move |result| {
            tx.send(result.is_err()).unwrap();
        }));
        assert!(rx.recv().unwrap());
    }

    #[test]
    fn test_跨线程等待() {
        let c = Completion::new();
        let c2 = c.clone();
        let t = std::thread::spawn(move || c2.wait());
        std::thread::sleep(std::time::Duration::from_millis(10));
        c.settle(Ok(ImageInfo::new("bmp", "image/bmp", 3, 4)));
        let info = t.join().unwrap().unwrap();
        assert_eq!(info.height, 4);
    }
}
