//! # Kui (窥)
//!
//! 纯 Rust 实现的流式图像信息探测库: 只嗅探二进制头部,
//! 在尽量少读字节的前提下得出图像的格式、MIME 与像素尺寸, 不做解码.
//!
//! 支持的格式: AVIF/HEIC/HEIF, BMP, DDS, GIF, ICNS, ICO/CUR,
//! JPEG, PNG, PSD, SVG, TIFF, WebP.
//!
//! # 快速开始
//!
//! ```rust,no_run
//! let info = kui::probe::probe_file("photo.jpg").unwrap();
//! println!("{} {}x{}", info.mime, info.width, info.height);
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `kui-core` | 结果类型与错误定义 |
//! | `kui-probe` | 探测器、数据源与会话调度 |

/// 结果类型与错误定义
pub use kui_core as core;

/// 探测器、数据源与会话调度
pub use kui_probe as probe;

pub use kui_core::{ImageInfo, KuiError, KuiResult, Units};
pub use kui_probe::{probe_buffer, probe_file, probe_spawn};
#[cfg(feature = "http")]
pub use kui_probe::probe_url;

/// 获取 Kui 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 创建已注册全部内置探测器的注册表
pub fn default_registry() -> kui_probe::DetectorRegistry {
    kui_probe::default_registry()
}
