//! GIF 探测器.
//!
//! 签名 "GIF87a" 或 "GIF89a", 逻辑屏幕宽高为小端 u16, 位于偏移 6/8.

use kui_core::ImageInfo;

use crate::detector::{ImageDetector, Verdict};
use crate::window::ByteWindow;

pub struct GifDetector;

impl ImageDetector for GifDetector {
    fn name(&self) -> &'static str {
        "gif"
    }

    fn mime(&self) -> &'static str {
        "image/gif"
    }

    fn detect(&self, window: &ByteWindow) -> Verdict {
        match window.matches_at(0, b"GIF8") {
            Some(false) => return Verdict::Rejected,
            None => return Verdict::NeedMore(10 - window.len()),
            Some(true) => {}
        }
        let (Some(v), Some(a)) = (window.u8(4), window.u8(5)) else {
            return Verdict::NeedMore(10 - window.len());
        };
        if !(v == b'7' || v == b'9') || a != b'a' {
            return Verdict::Rejected;
        }
        let (Some(width), Some(height)) = (window.u16_le(6), window.u16_le(8)) else {
            return Verdict::NeedMore(10 - window.len());
        };
        if width == 0 || height == 0 {
            return Verdict::Rejected;
        }
        Verdict::Matched(ImageInfo::new(
            "gif",
            "image/gif",
            u32::from(width),
            u32::from(height),
        ))
    }
}
