//! WebP 探测器.
//!
//! ```text
//! RIFF Header (12 bytes):
//!   "RIFF" + 文件大小 (u32, LE) + "WEBP"
//!
//! 第一个 chunk (offset 12): FourCC + 大小 (u32, LE), 三种可能:
//!   "VP8 "  有损:   payload+3 处同步码 9D 01 2A,
//!            宽 = u16le(payload+6) & 0x3FFF, 高 = u16le(payload+8) & 0x3FFF
//!   "VP8L"  无损:   payload[0] = 0x2F, 其后 4 字节小端位流:
//!            宽 = (bits & 0x3FFF) + 1, 高 = ((bits >> 14) & 0x3FFF) + 1
//!   "VP8X"  扩展:   payload+4 起宽-1 (u24, LE), payload+7 起高-1 (u24, LE)
//! ```
//!
//! 尺寸只认第一个 chunk; 其他 FourCC 开头的 WebP 视为损坏.

use kui_core::ImageInfo;

use crate::detector::{ImageDetector, Verdict};
use crate::window::ByteWindow;

/// chunk 载荷起点
const PAYLOAD: usize = 20;

pub struct WebpDetector;

impl WebpDetector {
    fn detect_lossy(&self, window: &ByteWindow) -> Verdict {
        match window.matches_at(PAYLOAD + 3, &[0x9D, 0x01, 0x2A]) {
            Some(false) => return Verdict::Rejected,
            None => return Verdict::NeedMore(PAYLOAD + 10 - window.len()),
            Some(true) => {}
        }
        let (Some(w), Some(h)) = (window.u16_le(PAYLOAD + 6), window.u16_le(PAYLOAD + 8)) else {
            return Verdict::NeedMore(PAYLOAD + 10 - window.len());
        };
        finish(u32::from(w & 0x3FFF), u32::from(h & 0x3FFF))
    }

    fn detect_lossless(&self, window: &ByteWindow) -> Verdict {
        match window.u8(PAYLOAD) {
            Some(0x2F) => {}
            Some(_) => return Verdict::Rejected,
            None => return Verdict::NeedMore(PAYLOAD + 5 - window.len()),
        }
        let Some(bits) = window.u32_le(PAYLOAD + 1) else {
            return Verdict::NeedMore(PAYLOAD + 5 - window.len());
        };
        finish((bits & 0x3FFF) + 1, ((bits >> 14) & 0x3FFF) + 1)
    }

    fn detect_extended(&self, window: &ByteWindow) -> Verdict {
        let (Some(w), Some(h)) = (window.u24_le(PAYLOAD + 4), window.u24_le(PAYLOAD + 7)) else {
            return Verdict::NeedMore(PAYLOAD + 10 - window.len());
        };
        finish(w + 1, h + 1)
    }
}

fn finish(width: u32, height: u32) -> Verdict {
    if width == 0 || height == 0 {
        return Verdict::Rejected;
    }
    Verdict::Matched(ImageInfo::new("webp", "image/webp", width, height))
}

impl ImageDetector for WebpDetector {
    fn name(&self) -> &'static str {
        "webp"
    }

    fn mime(&self) -> &'static str {
        "image/webp"
    }

    fn detect(&self, window: &ByteWindow) -> Verdict {
        match window.matches_at(0, b"RIFF") {
            Some(false) => return Verdict::Rejected,
            None => return Verdict::NeedMore(16 - window.len()),
            Some(true) => {}
        }
        match window.matches_at(8, b"WEBP") {
            Some(false) => return Verdict::Rejected,
            None => return Verdict::NeedMore(16 - window.len()),
            Some(true) => {}
        }
        let Some(fourcc) = window.tag4(12) else {
            return Verdict::NeedMore(16 - window.len());
        };
        match &fourcc {
            b"VP8 " => self.detect_lossy(window),
            b"VP8L" => self.detect_lossless(window),
            b"VP8X" => self.detect_extended(window),
            _ => {
                log::debug!("webp: 首个 chunk 不是 VP8/VP8L/VP8X, 排除");
                Verdict::Rejected
            }
        }
    }
}
