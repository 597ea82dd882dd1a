//! PNG 探测器.
//!
//! ```text
//! 签名 (8 bytes): 89 50 4E 47 0D 0A 1A 0A
//! IHDR chunk:
//!   长度 (4 bytes, BE, 恒为 13)
//!   "IHDR" (4 bytes)
//!   宽度 (4 bytes, BE)
//!   高度 (4 bytes, BE)
//! ```

use kui_core::ImageInfo;

use crate::detector::{ImageDetector, Verdict};
use crate::window::ByteWindow;

const SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

pub struct PngDetector;

impl ImageDetector for PngDetector {
    fn name(&self) -> &'static str {
        "png"
    }

    fn mime(&self) -> &'static str {
        "image/png"
    }

    fn detect(&self, window: &ByteWindow) -> Verdict {
        match window.matches_at(0, SIGNATURE) {
            Some(false) => return Verdict::Rejected,
            None => return Verdict::NeedMore(SIGNATURE.len() - window.len()),
            Some(true) => {}
        }
        // 第一个 chunk 必须是 IHDR
        match window.matches_at(12, b"IHDR") {
            Some(false) => return Verdict::Rejected,
            None => return Verdict::NeedMore(24 - window.len()),
            Some(true) => {}
        }
        let (Some(width), Some(height)) = (window.u32_be(16), window.u32_be(20)) else {
            return Verdict::NeedMore(24 - window.len());
        };
        if width == 0 || height == 0 {
            log::debug!("png: IHDR 尺寸为零, 排除");
            return Verdict::Rejected;
        }
        Verdict::Matched(ImageInfo::new("png", "image/png", width, height))
    }
}
