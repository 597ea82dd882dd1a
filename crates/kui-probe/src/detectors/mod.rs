//! 内置的各格式探测器.
//!
//! 注册顺序即评估顺序, 按格式名字母序排列; 同一输入被多个探测器
//! 认领时以先注册者为准.

mod avif;
mod bmp;
mod dds;
mod exif;
mod gif;
mod icns;
mod ico;
mod jpeg;
mod png;
mod psd;
mod svg;
mod tiff;
mod webp;

pub use avif::AvifDetector;
pub use bmp::BmpDetector;
pub use dds::DdsDetector;
pub use gif::GifDetector;
pub use icns::IcnsDetector;
pub use ico::IcoDetector;
pub use jpeg::JpegDetector;
pub use png::PngDetector;
pub use psd::PsdDetector;
pub use svg::SvgDetector;
pub use tiff::TiffDetector;
pub use webp::WebpDetector;

use crate::registry::DetectorRegistry;

/// 注册全部内置探测器
pub fn register_all(registry: &mut DetectorRegistry) {
    registry.register(Box::new(AvifDetector));
    registry.register(Box::new(BmpDetector));
    registry.register(Box::new(DdsDetector));
    registry.register(Box::new(GifDetector));
    registry.register(Box::new(IcnsDetector));
    registry.register(Box::new(IcoDetector));
    registry.register(Box::new(JpegDetector));
    registry.register(Box::new(PngDetector));
    registry.register(Box::new(PsdDetector));
    registry.register(Box::new(SvgDetector));
    registry.register(Box::new(TiffDetector));
    registry.register(Box::new(WebpDetector));
}
