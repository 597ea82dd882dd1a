//! DDS (DirectDraw Surface) 探测器.
//!
//! "DDS " 魔数, DDS_HEADER 中高度 u32 小端 @12, 宽度 @16.

use kui_core::ImageInfo;

use crate::detector::{ImageDetector, Verdict};
use crate::window::ByteWindow;

const MIN_LEN: usize = 20;

pub struct DdsDetector;

impl ImageDetector for DdsDetector {
    fn name(&self) -> &'static str {
        "dds"
    }

    fn mime(&self) -> &'static str {
        "image/vnd-ms.dds"
    }

    fn detect(&self, window: &ByteWindow) -> Verdict {
        match window.matches_at(0, b"DDS ") {
            Some(false) => return Verdict::Rejected,
            None => return Verdict::NeedMore(MIN_LEN - window.len()),
            Some(true) => {}
        }
        let (Some(height), Some(width)) = (window.u32_le(12), window.u32_le(16)) else {
            return Verdict::NeedMore(MIN_LEN - window.len());
        };
        if width == 0 || height == 0 {
            return Verdict::Rejected;
        }
        Verdict::Matched(ImageInfo::new("dds", "image/vnd-ms.dds", width, height))
    }
}
