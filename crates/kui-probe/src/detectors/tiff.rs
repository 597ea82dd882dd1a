//! TIFF 探测器.
//!
//! 字节序头 ("II"/"MM") + IFD0 目录行走, 取 ImageWidth/ImageLength 标签;
//! Orientation 标签一并上报. IFD 结构解析见 [`super::exif`].

use kui_core::ImageInfo;

use super::exif::{self, TiffParse};
use crate::detector::{ImageDetector, Verdict};
use crate::window::ByteWindow;

pub struct TiffDetector;

impl ImageDetector for TiffDetector {
    fn name(&self) -> &'static str {
        "tiff"
    }

    fn mime(&self) -> &'static str {
        "image/tiff"
    }

    fn detect(&self, window: &ByteWindow) -> Verdict {
        match exif::parse_ifd0(window.bytes(), false) {
            TiffParse::NeedMore(n) => Verdict::NeedMore(n),
            TiffParse::Invalid => Verdict::Rejected,
            TiffParse::Done(scan) => match (scan.width, scan.height) {
                (Some(width), Some(height)) if width > 0 && height > 0 => {
                    let mut info = ImageInfo::new("tiff", "image/tiff", width, height);
                    info.orientation = scan.orientation;
                    Verdict::Matched(info)
                }
                _ => {
                    log::debug!("tiff: IFD0 缺少尺寸标签, 排除");
                    Verdict::Rejected
                }
            },
        }
    }
}
