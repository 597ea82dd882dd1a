//! BMP 探测器.
//!
//! "BM" 签名 + BITMAPINFOHEADER: 宽度 u32 小端 @18, 高度 i32 小端 @22.
//! 自上而下存储的 BMP 高度为负值, 取绝对值上报.

use kui_core::ImageInfo;

use crate::detector::{ImageDetector, Verdict};
use crate::window::ByteWindow;

/// 签名 + 文件头 (14) + 信息头前 12 字节
const MIN_LEN: usize = 26;

pub struct BmpDetector;

impl ImageDetector for BmpDetector {
    fn name(&self) -> &'static str {
        "bmp"
    }

    fn mime(&self) -> &'static str {
        "image/bmp"
    }

    fn detect(&self, window: &ByteWindow) -> Verdict {
        match window.matches_at(0, b"BM") {
            Some(false) => return Verdict::Rejected,
            None => return Verdict::NeedMore(MIN_LEN - window.len()),
            Some(true) => {}
        }
        if window.len() < MIN_LEN {
            return Verdict::NeedMore(MIN_LEN - window.len());
        }
        let (Some(width), Some(raw_height)) = (window.u32_le(18), window.u32_le(22)) else {
            return Verdict::Rejected;
        };
        let height = (raw_height as i32).unsigned_abs();
        if width == 0 || height == 0 || width > i32::MAX as u32 {
            log::debug!("bmp: 签名匹配但尺寸非法, 排除");
            return Verdict::Rejected;
        }
        Verdict::Matched(ImageInfo::new("bmp", "image/bmp", width, height))
    }
}
