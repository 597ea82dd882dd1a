//! AVIF/HEIC/HEIF 探测器, 基于 ISO-BMFF 盒结构.
//!
//! 首盒必须是 `ftyp`, 品牌决定具体 MIME; 之后在顶层盒中寻找 `meta`,
//! 沿 `meta` -> `iprp` -> `ipco` -> `ispe` 取像素宽高.
//! `meta` 盒限定在 256 KB 之内, 超出即排除.

use kui_core::ImageInfo;

use crate::detector::{ImageDetector, Verdict};
use crate::window::ByteWindow;

/// meta 盒及其之前所有顶层盒的预算
const META_BUDGET: usize = 256 * 1024;

/// ftyp 盒的合理上限, 品牌列表不会太长
const MAX_FTYP_SIZE: usize = 4096;

pub struct AvifDetector;

impl ImageDetector for AvifDetector {
    fn name(&self) -> &'static str {
        "avif"
    }

    fn mime(&self) -> &'static str {
        "image/avif"
    }

    fn detect(&self, window: &ByteWindow) -> Verdict {
        match window.matches_at(4, b"ftyp") {
            None => return Verdict::NeedMore(8 - window.len()),
            Some(false) => return Verdict::Rejected,
            Some(true) => {}
        }
        let Some(ftyp_size) = window.u32_be(0) else {
            return Verdict::NeedMore(4 - window.len());
        };
        let ftyp_size = ftyp_size as usize;
        if ftyp_size < 16 || ftyp_size % 4 != 0 || ftyp_size > MAX_FTYP_SIZE {
            return Verdict::Rejected;
        }
        let Some(ftyp) = window.slice(0, ftyp_size) else {
            return Verdict::NeedMore(ftyp_size - window.len());
        };

        // 主品牌优先, 再看兼容品牌列表
        let mut brand_info = brand_mime(&ftyp[8..12]);
        if brand_info.is_none() {
            brand_info = ftyp[16..]
                .chunks_exact(4)
                .find_map(brand_mime);
        }
        let Some((format, mime)) = brand_info else {
            return Verdict::Rejected;
        };

        // 顶层盒遍历, 找 meta
        let mut pos = ftyp_size;
        loop {
            if pos > META_BUDGET {
                return Verdict::Rejected;
            }
            let Some(size32) = window.u32_be(pos) else {
                return Verdict::NeedMore(pos + 8 - window.len());
            };
            let Some(kind) = window.slice(pos + 4, 4) else {
                return Verdict::NeedMore(pos + 8 - window.len());
            };
            let kind: [u8; 4] = kind.try_into().unwrap();
            let (header, total) = match size32 {
                0 => return Verdict::Rejected,
                1 => {
                    let (Some(hi), Some(lo)) = (window.u32_be(pos + 8), window.u32_be(pos + 12))
                    else {
                        return Verdict::NeedMore(pos + 16 - window.len());
                    };
                    let large = (u64::from(hi) << 32) | u64::from(lo);
                    let Ok(large) = usize::try_from(large) else {
                        return Verdict::Rejected;
                    };
                    (16usize, large)
                }
                n => (8usize, n as usize),
            };
            if total < header {
                return Verdict::Rejected;
            }

            if &kind == b"meta" {
                if total > META_BUDGET {
                    return Verdict::Rejected;
                }
                let Some(payload) = window.slice(pos + header, total - header) else {
                    return Verdict::NeedMore(pos + total - window.len());
                };
                // meta 是 FullBox, 先跳过 4 字节版本与标志
                let Some(children) = payload.get(4..) else {
                    return Verdict::Rejected;
                };
                let ispe = child_box(children, b"iprp")
                    .and_then(|iprp| child_box(iprp, b"ipco"))
                    .and_then(|ipco| child_box(ipco, b"ispe"));
                let Some(ispe) = ispe else {
                    return Verdict::Rejected;
                };
                // ispe 也是 FullBox: 4 字节头 + 宽 + 高
                if ispe.len() < 12 {
                    return Verdict::Rejected;
                }
                let width = u32::from_be_bytes(ispe[4..8].try_into().unwrap());
                let height = u32::from_be_bytes(ispe[8..12].try_into().unwrap());
                if width == 0 || height == 0 {
                    return Verdict::Rejected;
                }
                return Verdict::Matched(ImageInfo::new(format, mime, width, height));
            }

            let Some(next) = pos.checked_add(total) else {
                return Verdict::Rejected;
            };
            pos = next;
        }
    }
}

/// ftyp 品牌到 (格式名, MIME) 的映射
fn brand_mime(brand: &[u8]) -> Option<(&'static str, &'static str)> {
    match brand {
        b"avif" | b"avis" => Some(("avif", "image/avif")),
        b"heic" | b"heix" | b"hevc" | b"hevx" => Some(("heic", "image/heic")),
        b"mif1" | b"msf1" => Some(("heif", "image/heif")),
        _ => None,
    }
}

/// 在完整的子盒序列中按类型找第一个盒, 返回其载荷
fn child_box<'a>(mut data: &'a [u8], name: &[u8; 4]) -> Option<&'a [u8]> {
    while data.len() >= 8 {
        let size = u32::from_be_bytes(data[..4].try_into().unwrap()) as usize;
        let kind = &data[4..8];
        let (header, total) = match size {
            0 => (8, data.len()),
            1 => {
                if data.len() < 16 {
                    return None;
                }
                let large = u64::from_be_bytes(data[8..16].try_into().unwrap());
                (16, usize::try_from(large).ok()?)
            }
            n => (8, n),
        };
        if total < header || total > data.len() {
            return None;
        }
        if kind == name {
            return Some(&data[header..total]);
        }
        data = &data[total..];
    }
    None
}
