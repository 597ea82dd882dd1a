//! ICNS (Apple 图标) 探测器.
//!
//! ```text
//! 文件头 (8 bytes): "icns" + 文件总长 (u32, BE)
//! 条目 ×N: OSType (4 bytes) + 条目长 (u32, BE, 含 8 字节头) + 数据
//! ```
//!
//! 图标尺寸不在头里, 由 OSType 约定 (如 ic10 = 1024×1024).
//! 顺序行走条目, 第一个 OSType 已知的条目决定上报尺寸;
//! `TOC `/`icnV` 等元数据条目按声明长度跳过.

use kui_core::ImageInfo;

use crate::detector::{ImageDetector, Verdict};
use crate::window::ByteWindow;

/// 条目行走预算: 正常文件的首个图标条目远在此之前
const SCAN_BUDGET: usize = 1024 * 1024;

/// OSType → 边长 (正方形图标)
fn ostype_size(tag: &[u8; 4]) -> Option<u32> {
    let size = match tag {
        b"ICON" | b"ICN#" => 32,
        b"icm#" | b"icm4" | b"icm8" => 16,
        b"ics#" | b"ics4" | b"ics8" | b"is32" | b"s8mk" | b"icp4" => 16,
        b"icl4" | b"icl8" | b"il32" | b"l8mk" | b"icp5" | b"ic11" => 32,
        b"icp6" | b"ic12" => 64,
        b"ich4" | b"ich8" | b"ih32" | b"h8mk" => 48,
        b"it32" | b"t8mk" | b"ic07" => 128,
        b"ic08" | b"ic13" => 256,
        b"ic09" | b"ic14" => 512,
        b"ic10" => 1024,
        _ => return None,
    };
    Some(size)
}

pub struct IcnsDetector;

impl ImageDetector for IcnsDetector {
    fn name(&self) -> &'static str {
        "icns"
    }

    fn mime(&self) -> &'static str {
        "image/icns"
    }

    fn detect(&self, window: &ByteWindow) -> Verdict {
        match window.matches_at(0, b"icns") {
            Some(false) => return Verdict::Rejected,
            None => return Verdict::NeedMore(8 - window.len()),
            Some(true) => {}
        }
        let Some(file_len) = window.u32_be(4) else {
            return Verdict::NeedMore(8 - window.len());
        };
        if file_len < 16 {
            return Verdict::Rejected;
        }

        let mut pos = 8usize;
        loop {
            if pos >= file_len as usize {
                // 行走完整个声明范围也没有可识别的图标条目
                return Verdict::Rejected;
            }
            if pos > SCAN_BUDGET {
                log::debug!("icns: 条目行走超出预算, 排除");
                return Verdict::Rejected;
            }
            let (Some(tag), Some(entry_len)) = (window.tag4(pos), window.u32_be(pos + 4)) else {
                return Verdict::NeedMore(pos + 8 - window.len());
            };
            if entry_len < 8 {
                return Verdict::Rejected;
            }
            if let Some(size) = ostype_size(&tag) {
                return Verdict::Matched(ImageInfo::new("icns", "image/icns", size, size));
            }
            pos += entry_len as usize;
        }
    }
}
