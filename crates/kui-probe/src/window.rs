//! 字节窗口 (chunk accumulator).
//!
//! 一次探测会话中已到达字节的只增缓冲区. 已提交的字节不可改写,
//! 所有读取都以已提交长度为界: 数据尚未到达时返回 `None`,
//! 探测器据此上报 [`Verdict::NeedMore`](crate::detector::Verdict::NeedMore),
//! 而不是读到越界数据.
//!
//! 分块无关性 (chunking independence) 正是由这组 `Option` 读取器保证的:
//! 探测器每轮都从窗口起点重新求值, 无论流被怎样切分,
//! 同一前缀字节序列总会得到同一判定序列.

/// 只增字节窗口
#[derive(Debug, Default)]
pub struct ByteWindow {
    data: Vec<u8>,
}

impl ByteWindow {
    /// 创建空窗口
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// 追加一个数据块
    pub fn append(&mut self, chunk: &[u8]) {
        self.data.extend_from_slice(chunk);
    }

    /// 已提交的字节数
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 窗口是否为空
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 读取 `offset` 处的 `len` 字节切片, 不足时返回 `None`
    pub fn slice(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        self.data.get(offset..end)
    }

    /// 读取单字节
    pub fn u8(&self, offset: usize) -> Option<u8> {
        self.data.get(offset).copied()
    }

    /// 读取 u16 大端
    pub fn u16_be(&self, offset: usize) -> Option<u16> {
        let b = self.slice(offset, 2)?;
        Some(u16::from_be_bytes([b[0], b[1]]))
    }

    /// 读取 u16 小端
    pub fn u16_le(&self, offset: usize) -> Option<u16> {
        let b = self.slice(offset, 2)?;
        Some(u16::from_le_bytes([b[0], b[1]]))
    }

    /// 读取 u24 大端 (3 字节无符号整数)
    pub fn u24_be(&self, offset: usize) -> Option<u32> {
        let b = self.slice(offset, 3)?;
        Some((u32::from(b[0]) << 16) | (u32::from(b[1]) << 8) | u32::from(b[2]))
    }

    /// 读取 u24 小端
    pub fn u24_le(&self, offset: usize) -> Option<u32> {
        let b = self.slice(offset, 3)?;
        Some(u32::from(b[0]) | (u32::from(b[1]) << 8) | (u32::from(b[2]) << 16))
    }

    /// 读取 u32 大端
    pub fn u32_be(&self, offset: usize) -> Option<u32> {
        let b = self.slice(offset, 4)?;
        Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// 读取 u32 小端
    pub fn u32_le(&self, offset: usize) -> Option<u32> {
        let b = self.slice(offset, 4)?;
        Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// 读取 4 字节标签 (FourCC)
    pub fn tag4(&self, offset: usize) -> Option<[u8; 4]> {
        let b = self.slice(offset, 4)?;
        Some([b[0], b[1], b[2], b[3]])
    }

    /// 三态前缀比对: `offset` 处是否为 `sig`
    ///
    /// - `Some(true)`: 已有字节完整匹配
    /// - `Some(false)`: 已有字节中出现不匹配 (可立即排除)
    /// - `None`: 目前为止匹配, 但字节还不够下结论
    pub fn matches_at(&self, offset: usize, sig: &[u8]) -> Option<bool> {
        for (i, expected) in sig.iter().enumerate() {
            match offset.checked_add(i).and_then(|at| self.data.get(at)) {
                Some(b) if b == expected => continue,
                Some(_) => return Some(false),
                None => return None,
            }
        }
        Some(true)
    }

    /// 窗口当前的全部字节
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_读取以提交长度为界() {
        let mut w = ByteWindow::new();
        w.append(&[0x12, 0x34, 0x56]);
        assert_eq!(w.len(), 3);
        assert_eq!(w.u16_be(0), Some(0x1234));
        assert_eq!(w.u16_le(1), Some(0x5634));
        assert_eq!(w.u24_be(0), Some(0x123456));
        assert_eq!(w.u32_be(0), None);
        assert_eq!(w.slice(2, 2), None);
        assert_eq!(w.u8(3), None);
    }

    #[test]
    fn test_追加只增不改写() {
        let mut w = ByteWindow::new();
        w.append(b"ab");
        w.append(b"cd");
        assert_eq!(w.bytes(), b"abcd");
        assert_eq!(w.u32_be(0), Some(u32::from_be_bytes(*b"abcd")));
    }

    #[test]
    fn test_三态前缀比对() {
        let mut w = ByteWindow::new();
        w.append(b"GIF8");
        assert_eq!(w.matches_at(0, b"GIF87a"), None); // 还不够
        assert_eq!(w.matches_at(0, b"GIF8"), Some(true));
        assert_eq!(w.matches_at(0, b"PNG"), Some(false));
        w.append(b"7a");
        assert_eq!(w.matches_at(0, b"GIF87a"), Some(true));
        assert_eq!(w.matches_at(0, b"GIF89a"), Some(false));
    }

    #[test]
    fn test_溢出偏移不恐慌() {
        let w = ByteWindow::new();
        assert_eq!(w.slice(usize::MAX, 2), None);
        assert_eq!(w.u32_le(usize::MAX - 1), None);
    }
}
