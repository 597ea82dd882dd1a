//! TIFF/EXIF IFD 结构的共享读取器.
//!
//! TIFF 容器本身与 JPEG APP1 段内嵌的 EXIF 数据共用同一套
//! 字节序声明 + IFD0 目录结构, 这里做一份端序感知的实现:
//! - `tiff` 探测器用它从流前缀提取宽高与方向;
//! - `jpeg` 探测器用它从已完整到达的 APP1 载荷提取 EXIF 方向.
//!
//! ```text
//! TIFF Header (8 bytes):
//!   "II" (小端) 或 "MM" (大端)
//!   42 (u16, 按上述端序)
//!   IFD0 偏移 (u32)
//!
//! IFD:
//!   条目数 (u16)
//!   条目 ×N (12 bytes): tag u16, type u16, count u32, value/offset 4 bytes
//! ```

/// 对一段字节做 IFD 解析的三态结果
#[derive(Debug)]
pub(crate) enum TiffParse {
    /// 字节还不够 (估计还缺这么多), 仅在 `complete = false` 时出现
    NeedMore(usize),
    /// 结构损坏或不是 TIFF 头
    Invalid,
    /// IFD0 扫描完毕
    Done(IfdScan),
}

/// IFD0 中感兴趣的标签值
#[derive(Debug, Default)]
pub(crate) struct IfdScan {
    /// ImageWidth (tag 256)
    pub width: Option<u32>,
    /// ImageLength (tag 257)
    pub height: Option<u32>,
    /// Orientation (tag 274)
    pub orientation: Option<u8>,
}

/// IFD0 偏移上限: 头信息不该离文件开头太远
const IFD_OFFSET_BUDGET: u32 = 1024 * 1024;

/// IFD 条目数上限 (防御损坏数据)
const MAX_IFD_ENTRIES: u16 = 1024;

const TAG_IMAGE_WIDTH: u16 = 256;
const TAG_IMAGE_LENGTH: u16 = 257;
const TAG_ORIENTATION: u16 = 274;

const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;

/// 解析 `data` 开头的 TIFF 头与 IFD0
///
/// `complete = true` 表示 `data` 就是全部可用字节 (越界即 `Invalid`);
/// `false` 表示 `data` 是仍在增长的流前缀 (越界返回 `NeedMore`).
pub(crate) fn parse_ifd0(data: &[u8], complete: bool) -> TiffParse {
    let need = |end: usize| {
        if complete {
            TiffParse::Invalid
        } else {
            TiffParse::NeedMore(end - data.len())
        }
    };

    if data.len() < 4 {
        if let Some(false) = prefix_is_tiff(data) {
            return TiffParse::Invalid;
        }
        return need(4);
    }
    let le = match &data[0..4] {
        [0x49, 0x49, 0x2A, 0x00] => true,
        [0x4D, 0x4D, 0x00, 0x2A] => false,
        _ => return TiffParse::Invalid,
    };

    let Some(ifd_offset) = read_u32(data, 4, le) else {
        return need(8);
    };
    if ifd_offset < 8 || ifd_offset > IFD_OFFSET_BUDGET {
        return TiffParse::Invalid;
    }
    let ifd = ifd_offset as usize;

    let Some(count) = read_u16(data, ifd, le) else {
        return need(ifd + 2);
    };
    if count == 0 || count > MAX_IFD_ENTRIES {
        return TiffParse::Invalid;
    }

    let entries_end = ifd + 2 + count as usize * 12;
    if data.len() < entries_end {
        return need(entries_end);
    }

    let mut scan = IfdScan::default();
    for i in 0..count as usize {
        let base = ifd + 2 + i * 12;
        // 上面已保证 entries_end 在界内
        let Some(tag) = read_u16(data, base, le) else {
            return TiffParse::Invalid;
        };
        let Some(value_type) = read_u16(data, base + 2, le) else {
            return TiffParse::Invalid;
        };
        let Some(value_count) = read_u32(data, base + 4, le) else {
            return TiffParse::Invalid;
        };
        // 只关心内联存放的单值条目; 其余 (偏移存放、数组) 跳过
        if value_count != 1 {
            continue;
        }
        let value = match value_type {
            TYPE_SHORT => read_u16(data, base + 8, le).map(u32::from),
            TYPE_LONG => read_u32(data, base + 8, le),
            _ => None,
        };
        let Some(value) = value else { continue };
        match tag {
            TAG_IMAGE_WIDTH => scan.width = Some(value),
            TAG_IMAGE_LENGTH => scan.height = Some(value),
            TAG_ORIENTATION => {
                if (1..=8).contains(&value) {
                    scan.orientation = Some(value as u8);
                }
            }
            _ => {}
        }
    }
    TiffParse::Done(scan)
}

/// 从完整的 EXIF 载荷 (APP1 去掉 "Exif\0\0" 之前的部分) 提取方向
pub(crate) fn orientation_from_exif(payload: &[u8]) -> Option<u8> {
    let tiff = payload.strip_prefix(b"Exif\x00\x00")?;
    match parse_ifd0(tiff, true) {
        TiffParse::Done(scan) => scan.orientation,
        _ => None,
    }
}

/// 目前的前缀是否还可能是 TIFF 头 (None = 字节不够下结论)
fn prefix_is_tiff(data: &[u8]) -> Option<bool> {
    const LE: &[u8] = &[0x49, 0x49, 0x2A, 0x00];
    const BE: &[u8] = &[0x4D, 0x4D, 0x00, 0x2A];
    let mut le_ok = true;
    let mut be_ok = true;
    for (i, b) in data.iter().take(4).enumerate() {
        le_ok &= *b == LE[i];
        be_ok &= *b == BE[i];
    }
    if !le_ok && !be_ok {
        Some(false)
    } else if data.len() >= 4 {
        Some(true)
    } else {
        None
    }
}

fn read_u16(data: &[u8], offset: usize, le: bool) -> Option<u16> {
    let b = data.get(offset..offset.checked_add(2)?)?;
    Some(if le {
        u16::from_le_bytes([b[0], b[1]])
    } else {
        u16::from_be_bytes([b[0], b[1]])
    })
}

fn read_u32(data: &[u8], offset: usize, le: bool) -> Option<u32> {
    let b = data.get(offset..offset.checked_add(4)?)?;
    Some(if le {
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    } else {
        u32::from_be_bytes([b[0], b[1], b[2], b[3]])
    })
}
