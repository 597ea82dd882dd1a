//! # kui-core
//!
//! Kui 图像探测框架核心类型库.
//!
//! 提供所有 Kui crate 共用的错误类型与探测结果类型.

pub mod error;
pub mod image_info;

// 重导出常用类型
pub use error::{KuiError, KuiResult};
pub use image_info::{IconVariant, ImageInfo, Units};
