//! ICO/CUR (Windows 图标/光标) 探测器.
//!
//! ```text
//! ICONDIR (6 bytes):
//!   保留 (u16, LE, 恒 0) + 类型 (u16, LE, 1=ICO 2=CUR) + 条目数 (u16, LE)
//! ICONDIRENTRY ×N (16 bytes):
//!   宽 u8 + 高 u8 (0 表示 256) + ...
//! ```
//!
//! 上报面积最大的条目, 全部条目尺寸放进 `variants`.

use kui_core::{IconVariant, ImageInfo};

use crate::detector::{ImageDetector, Verdict};
use crate::window::ByteWindow;

/// 目录条目数上限 (防御损坏数据; 真实图标远少于此)
const MAX_ENTRIES: u16 = 256;

pub struct IcoDetector;

impl ImageDetector for IcoDetector {
    fn name(&self) -> &'static str {
        "ico"
    }

    fn mime(&self) -> &'static str {
        "image/x-icon"
    }

    fn detect(&self, window: &ByteWindow) -> Verdict {
        let (Some(reserved), Some(kind), Some(count)) =
            (window.u16_le(0), window.u16_le(2), window.u16_le(4))
        else {
            // 头 6 字节还没到齐; 已有字节若已排除保留字段为 0 则直接出局
            if window.len() >= 2 && window.u16_le(0) != Some(0) {
                return Verdict::Rejected;
            }
            return Verdict::NeedMore(6 - window.len());
        };
        if reserved != 0 || (kind != 1 && kind != 2) || count == 0 || count > MAX_ENTRIES {
            return Verdict::Rejected;
        }

        let dir_end = 6 + usize::from(count) * 16;
        if window.len() < dir_end {
            return Verdict::NeedMore(dir_end - window.len());
        }

        let mut variants = Vec::with_capacity(usize::from(count));
        let mut best = IconVariant {
            width: 0,
            height: 0,
        };
        for i in 0..usize::from(count) {
            let base = 6 + i * 16;
            let (Some(w), Some(h)) = (window.u8(base), window.u8(base + 1)) else {
                return Verdict::Rejected;
            };
            // 0 代表 256
            let v = IconVariant {
                width: if w == 0 { 256 } else { u32::from(w) },
                height: if h == 0 { 256 } else { u32::from(h) },
            };
            if v.width * v.height > best.width * best.height {
                best = v;
            }
            variants.push(v);
        }

        let format = if kind == 1 { "ico" } else { "cur" };
        let mut info = ImageInfo::new(format, "image/x-icon", best.width, best.height);
        info.variants = variants;
        Verdict::Matched(info)
    }
}
