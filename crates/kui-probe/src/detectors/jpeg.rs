//! JPEG 探测器.
//!
//! JPEG 没有固定偏移的尺寸字段, 必须沿着标记 (marker) 序列逐段行走:
//!
//! ```text
//! SOI (FF D8)
//! 段 ×N:
//!   FF + 标记字节 (允许多个 FF 填充)
//!   长度 (u16, BE, 含长度字段自身) ── RST/TEM 等独立标记无长度
//!   载荷
//! SOFn (FF C0..CF, 除 C4/C8/CC): 精度 u8 + 高 u16 BE + 宽 u16 BE
//! SOS (FF DA): 压缩数据开始, 此前未见 SOFn 即告失败
//! ```
//!
//! 途中遇到 APP1/EXIF 段时顺带提取 Orientation; EXIF 损坏只丢弃方向,
//! 不影响尺寸判定. 行走距离有预算上限, 防止在损坏数据上无限等待.

use kui_core::ImageInfo;

use super::exif;
use crate::detector::{ImageDetector, Verdict};
use crate::window::ByteWindow;

/// 标记行走预算: SOF 不应出现在这么远之后
const SCAN_BUDGET: usize = 1024 * 1024;

pub struct JpegDetector;

impl ImageDetector for JpegDetector {
    fn name(&self) -> &'static str {
        "jpeg"
    }

    fn mime(&self) -> &'static str {
        "image/jpeg"
    }

    fn detect(&self, window: &ByteWindow) -> Verdict {
        match window.matches_at(0, &[0xFF, 0xD8, 0xFF]) {
            Some(false) => return Verdict::Rejected,
            None => return Verdict::NeedMore(3 - window.len()),
            Some(true) => {}
        }

        let mut pos = 2usize;
        let mut orientation: Option<u8> = None;

        loop {
            if pos > SCAN_BUDGET {
                log::debug!("jpeg: 标记行走超出预算, 排除");
                return Verdict::Rejected;
            }

            // 段以 FF 开头, 允许多个 FF 填充字节
            match window.u8(pos) {
                Some(0xFF) => {}
                Some(_) => return Verdict::Rejected,
                None => return Verdict::NeedMore(2),
            }
            let mut p = pos;
            while window.u8(p) == Some(0xFF) {
                p += 1;
                // 填充字节同样计入预算, 否则无尽的 FF 流会让窗口无限增长
                if p > SCAN_BUDGET {
                    log::debug!("jpeg: FF 填充超出预算, 排除");
                    return Verdict::Rejected;
                }
            }
            let Some(marker) = window.u8(p) else {
                return Verdict::NeedMore(1);
            };

            match marker {
                // SOFn: 尺寸所在 (C4=DHT, C8=JPG, CC=DAC 除外)
                0xC0..=0xCF if marker != 0xC4 && marker != 0xC8 && marker != 0xCC => {
                    let header_end = p + 1 + 7;
                    let (Some(length), Some(height), Some(width)) = (
                        window.u16_be(p + 1),
                        window.u16_be(p + 4),
                        window.u16_be(p + 6),
                    ) else {
                        return Verdict::NeedMore(header_end.saturating_sub(window.len()));
                    };
                    if length < 7 || width == 0 || height == 0 {
                        log::debug!("jpeg: SOF 段损坏, 排除");
                        return Verdict::Rejected;
                    }
                    let mut info = ImageInfo::new(
                        "jpeg",
                        "image/jpeg",
                        u32::from(width),
                        u32::from(height),
                    );
                    info.orientation = orientation;
                    return Verdict::Matched(info);
                }
                // SOS: 已进入压缩数据, 不可能再出现 SOF
                0xDA => return Verdict::Rejected,
                // EOI: 没有图像数据
                0xD9 => return Verdict::Rejected,
                // 独立标记, 无长度字段
                0x01 | 0xD0..=0xD8 => {
                    pos = p + 1;
                }
                // 其余均为长度前缀段
                _ => {
                    let Some(length) = window.u16_be(p + 1) else {
                        return Verdict::NeedMore(p + 3 - window.len());
                    };
                    if length < 2 {
                        return Verdict::Rejected;
                    }
                    // APP1: 尝试提取 EXIF Orientation (载荷此时必然已完整,
                    // 否则后续段的行走读不到字节)
                    if marker == 0xE1 && orientation.is_none() {
                        if let Some(payload) = window.slice(p + 3, usize::from(length) - 2) {
                            orientation = exif::orientation_from_exif(payload);
                        }
                    }
                    pos = p + 1 + usize::from(length);
                }
            }
        }
    }
}
