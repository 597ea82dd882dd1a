//! SVG 探测器.
//!
//! 文本格式, 没有魔数: 跳过可选 BOM、空白、XML 声明、注释与 DOCTYPE,
//! 根元素必须是 `<svg ...>`, 从其属性提取尺寸:
//!
//! - `width`/`height` 属性齐全时直接采用 (单位保留上报);
//! - 只有其一时借 `viewBox` 的宽高比补全另一边;
//! - 两者皆无时退回 `viewBox` 的宽高 (单位视为 px).
//!
//! 线性扫描有 64 KB 预算: 超过预算仍未确定根元素即排除,
//! 恶意或损坏的输入不会让窗口无限增长.

use kui_core::{ImageInfo, Units};

use crate::detector::{ImageDetector, Verdict};
use crate::window::ByteWindow;

/// 扫描预算: 根元素的起始标签不应出现在 64 KB 之后
const SCAN_BUDGET: usize = 64 * 1024;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub struct SvgDetector;

impl ImageDetector for SvgDetector {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn mime(&self) -> &'static str {
        "image/svg+xml"
    }

    fn detect(&self, window: &ByteWindow) -> Verdict {
        let data = window.bytes();
        // 预算之内数据不够就继续等, 预算用尽即排除
        let more = |need: usize| {
            if data.len() >= SCAN_BUDGET {
                Verdict::Rejected
            } else {
                Verdict::NeedMore(need)
            }
        };

        let mut pos = 0usize;
        match window.matches_at(0, UTF8_BOM) {
            Some(true) => pos = 3,
            Some(false) => {}
            None => return more(UTF8_BOM.len() - data.len()),
        }

        loop {
            // 标签之间只允许空白
            while pos < data.len() && data[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos >= SCAN_BUDGET {
                return Verdict::Rejected;
            }
            let Some(&b) = data.get(pos) else {
                return more(1);
            };
            if b != b'<' {
                return Verdict::Rejected;
            }

            match window.matches_at(pos, b"<svg") {
                None => return more(1),
                Some(true) => {
                    // 排除 <svgfoo> 这类以 svg 开头的其他元素
                    match data.get(pos + 4) {
                        None => return more(1),
                        Some(c) if c.is_ascii_whitespace() || *c == b'>' || *c == b'/' => {}
                        Some(_) => return Verdict::Rejected,
                    }
                    let Some(gt) = find_byte(data, pos + 4, b'>') else {
                        return more(1);
                    };
                    if gt > SCAN_BUDGET {
                        return Verdict::Rejected;
                    }
                    let Ok(tag) = std::str::from_utf8(&data[pos + 4..gt]) else {
                        return Verdict::Rejected;
                    };
                    return match dimensions_from_tag(tag) {
                        Some(info) => Verdict::Matched(info),
                        None => {
                            log::debug!("svg: 根元素缺少可用的尺寸属性, 排除");
                            Verdict::Rejected
                        }
                    };
                }
                Some(false) => {}
            }

            // 非根元素: 只容忍 XML 声明、注释和 DOCTYPE
            match data.get(pos + 1) {
                None => return more(1),
                Some(b'?') | Some(b'!') => {}
                Some(_) => return Verdict::Rejected,
            }
            if let Some(true) = window.matches_at(pos, b"<!--") {
                let Some(end) = find_subslice(data, pos + 4, b"-->") else {
                    return more(3);
                };
                pos = end + 3;
            } else if window.matches_at(pos, b"<!--").is_none() {
                return more(4 - (data.len() - pos));
            } else {
                // <?xml ...?> 或 <!DOCTYPE ...>
                let Some(gt) = find_byte(data, pos + 1, b'>') else {
                    return more(1);
                };
                pos = gt + 1;
            }
            if pos >= SCAN_BUDGET {
                return Verdict::Rejected;
            }
        }
    }
}

/// 在 `data[from..]` 中找单字节
fn find_byte(data: &[u8], from: usize, needle: u8) -> Option<usize> {
    data.get(from..)?.iter().position(|&b| b == needle).map(|i| from + i)
}

/// 在 `data[from..]` 中找子串
fn find_subslice(data: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    let hay = data.get(from..)?;
    hay.windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

/// 从 `<svg` 与 `>` 之间的属性文本求尺寸
fn dimensions_from_tag(tag: &str) -> Option<ImageInfo> {
    let width = attr_value(tag, "width").and_then(parse_length);
    let height = attr_value(tag, "height").and_then(parse_length);
    let viewbox = attr_value(tag, "viewBox").and_then(parse_viewbox);

    let (w, wu, h, hu) = match (width, height) {
        (Some((w, wu)), Some((h, hu))) => (w, wu, h, hu),
        (Some((w, wu)), None) => {
            let (vw, vh) = viewbox?;
            (w, wu, w * vh / vw, wu)
        }
        (None, Some((h, hu))) => {
            let (vw, vh) = viewbox?;
            (h * vw / vh, hu, h, hu)
        }
        (None, None) => {
            let (vw, vh) = viewbox?;
            (vw, Units::Px, vh, Units::Px)
        }
    };

    let width = round_positive(w)?;
    let height = round_positive(h)?;
    let mut info = ImageInfo::new("svg", "image/svg+xml", width, height);
    info.width_units = wu;
    info.height_units = hu;
    Some(info)
}

/// 四舍五入到正整数; 非正或非有限值视为无效
fn round_positive(v: f64) -> Option<u32> {
    if !v.is_finite() {
        return None;
    }
    let r = v.round();
    if r < 1.0 || r > f64::from(u32::MAX) {
        return None;
    }
    Some(r as u32)
}

/// 提取 `name="value"` / `name='value'` 形式的属性值
fn attr_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let bytes = tag.as_bytes();
    let mut search = 0;
    while let Some(found) = tag[search..].find(name) {
        let start = search + found;
        search = start + 1;
        // 属性名前必须是空白, 避免匹配到其他属性名的后缀
        if start == 0 || !bytes[start - 1].is_ascii_whitespace() {
            continue;
        }
        let mut i = start + name.len();
        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            continue;
        }
        i += 1;
        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        let quote = *bytes.get(i)?;
        if quote != b'"' && quote != b'\'' {
            continue;
        }
        i += 1;
        let end = tag[i..].find(quote as char)? + i;
        return Some(&tag[i..end]);
    }
    None
}

/// 解析 CSS 长度值: 数字 + 可选单位后缀
fn parse_length(s: &str) -> Option<(f64, Units)> {
    let s = s.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let value: f64 = s[..split].parse().ok()?;
    let units = Units::from_suffix(s[split..].trim())?;
    if value <= 0.0 {
        return None;
    }
    Some((value, units))
}

/// 解析 viewBox 的后两个分量 (宽高)
fn parse_viewbox(s: &str) -> Option<(f64, f64)> {
    let mut parts = s
        .split(|c: char| c.is_ascii_whitespace() || c == ',')
        .filter(|p| !p.is_empty());
    let _min_x = parts.next()?;
    let _min_y = parts.next()?;
    let w: f64 = parts.next()?.parse().ok()?;
    let h: f64 = parts.next()?.parse().ok()?;
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    Some((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect_str(s: &str) -> Verdict {
        let mut w = ByteWindow::new();
        w.append(s.as_bytes());
        SvgDetector.detect(&w)
    }

    #[test]
    fn test_宽高属性() {
        match detect_str(r#"<svg width="100" height="50"></svg>"#) {
            Verdict::Matched(info) => {
                assert_eq!((info.width, info.height), (100, 50));
                assert_eq!(info.width_units, Units::Px);
            }
            other => panic!("期望 Matched, 得到 {other:?}"),
        }
    }

    #[test]
    fn test_声明与注释之后的根元素() {
        let doc = "\u{feff}<?xml version=\"1.0\"?>\n<!-- c -->\n<!DOCTYPE svg>\n<svg width='10cm' height='20cm'/>";
        match detect_str(doc) {
            Verdict::Matched(info) => {
                assert_eq!((info.width, info.height), (10, 20));
                assert_eq!(info.width_units, Units::Cm);
            }
            other => panic!("期望 Matched, 得到 {other:?}"),
        }
    }

    #[test]
    fn test_viewbox_补全() {
        // 只有 width, 高度按 viewBox 比例推算
        match detect_str(r#"<svg width="100" viewBox="0 0 50 25">"#) {
            Verdict::Matched(info) => assert_eq!((info.width, info.height), (100, 50)),
            other => panic!("期望 Matched, 得到 {other:?}"),
        }
        // 两者皆无, 直接用 viewBox
        match detect_str(r#"<svg viewBox="0 0 640.5 480.5">"#) {
            Verdict::Matched(info) => assert_eq!((info.width, info.height), (641, 481)),
            other => panic!("期望 Matched, 得到 {other:?}"),
        }
    }

    #[test]
    fn test_百分比单位() {
        match detect_str(r#"<svg width="100%" height="100%" viewBox="0 0 1 1">"#) {
            Verdict::Matched(info) => {
                assert_eq!(info.width_units, Units::Percent);
                assert_eq!(info.width, 100);
            }
            other => panic!("期望 Matched, 得到 {other:?}"),
        }
    }

    #[test]
    fn test_其他元素排除() {
        assert!(matches!(detect_str("<html><body>"), Verdict::Rejected));
        assert!(matches!(detect_str("plain text"), Verdict::Rejected));
        assert!(matches!(detect_str("<svgfoo bar>"), Verdict::Rejected));
    }

    #[test]
    fn test_标签不完整等待() {
        assert!(matches!(detect_str("  <svg width=\"1\""), Verdict::NeedMore(_)));
        assert!(matches!(detect_str("<!-- 未闭合"), Verdict::NeedMore(_)));
    }

    #[test]
    fn test_纯空白超预算后排除() {
        let mut w = ByteWindow::new();
        let chunk = vec![0x20u8; 20000];
        // 前几块仍在预算内: 等待
        w.append(&chunk);
        assert!(matches!(SvgDetector.detect(&w), Verdict::NeedMore(_)));
        w.append(&chunk);
        w.append(&chunk);
        assert!(matches!(SvgDetector.detect(&w), Verdict::NeedMore(_)));
        // 累计 80000 字节, 超出 64 KB 预算: 排除
        w.append(&chunk);
        assert!(matches!(SvgDetector.detect(&w), Verdict::Rejected));
    }

    #[test]
    fn test_无尺寸属性排除() {
        assert!(matches!(detect_str("<svg xmlns=\"x\">"), Verdict::Rejected));
    }
}
