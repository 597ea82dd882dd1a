//! 探测结果类型.
//!
//! `ImageInfo` 是一次成功探测的终值: 像素尺寸、格式名、MIME 类型,
//! 以及各格式特有的可选字段 (尺寸单位、EXIF 方向、图标多尺寸变体).

use std::fmt;

/// 尺寸单位
///
/// 位图格式恒为 `Px`; SVG 允许在 `width`/`height` 属性上声明任意 CSS 长度单位.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    /// 像素 (默认)
    #[default]
    Px,
    /// 百分比
    Percent,
    /// em (相对字号)
    Em,
    /// ex (相对 x 高度)
    Ex,
    /// 厘米
    Cm,
    /// 毫米
    Mm,
    /// 英寸
    In,
    /// 点 (1/72 英寸)
    Pt,
    /// 派卡 (12 点)
    Pc,
}

impl Units {
    /// 单位的文本形式 (与 SVG 属性中的写法一致)
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Px => "px",
            Units::Percent => "%",
            Units::Em => "em",
            Units::Ex => "ex",
            Units::Cm => "cm",
            Units::Mm => "mm",
            Units::In => "in",
            Units::Pt => "pt",
            Units::Pc => "pc",
        }
    }

    /// 从 SVG 长度值的单位后缀解析
    pub fn from_suffix(s: &str) -> Option<Units> {
        match s {
            "" | "px" => Some(Units::Px),
            "%" => Some(Units::Percent),
            "em" => Some(Units::Em),
            "ex" => Some(Units::Ex),
            "cm" => Some(Units::Cm),
            "mm" => Some(Units::Mm),
            "in" => Some(Units::In),
            "pt" => Some(Units::Pt),
            "pc" => Some(Units::Pc),
            _ => None,
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 图标容器 (ICO/CUR) 中的一个尺寸变体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconVariant {
    pub width: u32,
    pub height: u32,
}

/// 一次成功探测的结果
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    /// 宽度 (正整数)
    pub width: u32,
    /// 高度 (正整数)
    pub height: u32,
    /// 格式短名 (如 "png", "jpeg")
    pub format: &'static str,
    /// MIME 类型 (如 "image/png")
    pub mime: &'static str,
    /// 宽度单位 (仅 SVG 可能不是 px)
    pub width_units: Units,
    /// 高度单位
    pub height_units: Units,
    /// EXIF 方向 (1-8, 仅 JPEG/TIFF 且元数据存在时)
    pub orientation: Option<u8>,
    /// 图标容器的全部尺寸变体 (仅 ICO/CUR)
    pub variants: Vec<IconVariant>,
}

impl ImageInfo {
    /// 构造一个普通位图结果 (px 单位, 无可选字段)
    pub fn new(format: &'static str, mime: &'static str, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format,
            mime,
            width_units: Units::Px,
            height_units: Units::Px,
            orientation: None,
            variants: Vec::new(),
        }
    }
}

impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}x{} ({})", self.format, self.width, self.height, self.mime)
    }
}
