//! PSD (Adobe Photoshop) 探测器.
//!
//! "8BPS" 签名 + 版本 (1 = PSD, 2 = PSB), 高度 u32 大端 @14, 宽度 @18.

use kui_core::ImageInfo;

use crate::detector::{ImageDetector, Verdict};
use crate::window::ByteWindow;

const MIN_LEN: usize = 22;

pub struct PsdDetector;

impl ImageDetector for PsdDetector {
    fn name(&self) -> &'static str {
        "psd"
    }

    fn mime(&self) -> &'static str {
        "image/vnd.adobe.photoshop"
    }

    fn detect(&self, window: &ByteWindow) -> Verdict {
        match window.matches_at(0, b"8BPS") {
            Some(false) => return Verdict::Rejected,
            None => return Verdict::NeedMore(MIN_LEN - window.len()),
            Some(true) => {}
        }
        let Some(version) = window.u16_be(4) else {
            return Verdict::NeedMore(MIN_LEN - window.len());
        };
        if version != 1 && version != 2 {
            return Verdict::Rejected;
        }
        let (Some(height), Some(width)) = (window.u32_be(14), window.u32_be(18)) else {
            return Verdict::NeedMore(MIN_LEN - window.len());
        };
        if width == 0 || height == 0 {
            return Verdict::Rejected;
        }
        Verdict::Matched(ImageInfo::new(
            "psd",
            "image/vnd.adobe.photoshop",
            width,
            height,
        ))
    }
}
