//! # kui-probe
//!
//! Kui 图像探测库: 流式嗅探二进制头部, 在尽量少读的前提下
//! 得出图像的格式、MIME 与像素尺寸, 不做任何解码.
//!
//! 入口按数据来源分层:
//! - [`probe_buffer`]: 内存缓冲;
//! - [`probe_file`]: 本地文件;
//! - [`probe_url`]: HTTP(S) 资源 (需 `http` 特性);
//! - [`probe`] / [`probe_with`]: 任意 [`ChunkSource`], 同步;
//! - [`probe_spawn`]: 后台线程探测, 返回可等待/可取消的 [`ProbeHandle`].

pub mod completion;
pub mod detector;
pub mod detectors;
#[cfg(feature = "http")]
pub mod http;
pub mod registry;
pub mod session;
pub mod source;
pub mod window;

use std::sync::OnceLock;
use std::thread;

use kui_core::{ImageInfo, KuiResult};

// 重导出常用类型
pub use completion::{AbortHandle, ProbeHandle};
pub use detector::{ImageDetector, Verdict};
#[cfg(feature = "http")]
pub use http::HttpSource;
pub use registry::DetectorRegistry;
pub use session::ProbeSession;
pub use source::{BufferSource, ChannelSource, ChunkSource, ReaderSource, SourceSender, channel_source};
pub use window::ByteWindow;

/// 构造注册了全部内置探测器的注册表
pub fn default_registry() -> DetectorRegistry {
    let mut registry = DetectorRegistry::new();
    detectors::register_all(&mut registry);
    registry
}

/// 进程级共享注册表, 惰性初始化
pub fn shared_registry() -> &'static DetectorRegistry {
    static REGISTRY: OnceLock<DetectorRegistry> = OnceLock::new();
    REGISTRY.get_or_init(default_registry)
}

/// 用内置探测器同步探测一个数据源
pub fn probe(mut source: impl ChunkSource) -> KuiResult<ImageInfo> {
    probe_with(shared_registry(), &mut source)
}

/// 用指定注册表同步探测一个数据源
pub fn probe_with(registry: &DetectorRegistry, source: &mut dyn ChunkSource) -> KuiResult<ImageInfo> {
    ProbeSession::new(registry).run(source)
}

/// 探测内存缓冲
pub fn probe_buffer(data: &[u8]) -> KuiResult<ImageInfo> {
    probe(BufferSource::new(data.to_vec()))
}

/// 探测本地文件
pub fn probe_file(path: impl AsRef<std::path::Path>) -> KuiResult<ImageInfo> {
    let source = ReaderSource::open(path)?;
    probe(source)
}

/// 探测 HTTP(S) 资源
///
/// 只读取头部所需的字节, 探测落定即断开连接.
#[cfg(feature = "http")]
pub fn probe_url(url: &str) -> KuiResult<ImageInfo> {
    let source = HttpSource::open(url)?;
    probe(source)
}

/// 在后台线程探测, 立即返回结果句柄
///
/// 句柄支持阻塞等待、回调通知与中途取消, 见 [`ProbeHandle`].
pub fn probe_spawn(source: impl ChunkSource + 'static) -> ProbeHandle {
    let completion = completion::Completion::new();
    let abort = AbortHandle::new();
    let handle = ProbeHandle {
        completion: completion.clone(),
        abort: abort.clone(),
    };
    let mut source = source;
    thread::spawn(move || {
        let result = ProbeSession::with_abort(shared_registry(), abort).run(&mut source);
        completion.settle(result);
    });
    handle
}
