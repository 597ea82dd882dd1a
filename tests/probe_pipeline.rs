//! 端到端集成测试: 探测管线的完整行为.
//!
//! 覆盖: 文件/缓冲/后台三种入口、两种完成模式 (阻塞等待与回调)、
//! 无法识别与空输入的错误语义、源错误的原样传递、命中后立即停读,
//! 以及扫描预算对恶意输入的保护.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;

use bytes::Bytes;
use kui::{KuiError, probe};
use kui::probe::{BufferSource, ChunkSource, channel_source};
use kui::probe::source::SourceEvent;

/// 生成最小可解析的 JPEG: SOI + APP0(JFIF) + SOF0
fn build_jpeg(width: u16, height: u16) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];
    // APP0, 长度 16: "JFIF\0" 版本 1.1, 无缩略图
    out.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    out.extend_from_slice(b"JFIF\0");
    out.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
    // SOF0, 长度 11: 精度 8, 高, 宽, 1 个分量
    out.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08]);
    out.extend_from_slice(&height.to_be_bytes());
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&[0x01, 0x01, 0x11, 0x00]);
    out
}

#[test]
fn test_jpeg_文件探测() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(&build_jpeg(367, 187)).unwrap();

    let info = kui::probe_file(f.path()).unwrap();
    assert_eq!(info.format, "jpeg");
    assert_eq!(info.mime, "image/jpeg");
    assert_eq!((info.width, info.height), (367, 187));
}

#[test]
fn test_jpeg_缓冲探测() {
    let info = kui::probe_buffer(&build_jpeg(367, 187)).unwrap();
    assert_eq!((info.width, info.height), (367, 187));
    assert_eq!(info.mime, "image/jpeg");
}

#[test]
fn test_后台探测_阻塞等待() {
    // 小块喂给后台会话, 等待终值
    let source = BufferSource::rechunked(build_jpeg(367, 187), 7);
    let info = kui::probe_spawn(source).wait().unwrap();
    assert_eq!((info.width, info.height), (367, 187));
}

#[test]
fn test_后台探测_回调通知() {
    let source = BufferSource::rechunked(build_jpeg(367, 187), 16);
    let (tx, rx) = mpsc::channel();
    kui::probe_spawn(source).on_complete(move |result| {
        tx.send(result).unwrap();
    });
    let info = rx
        .recv_timeout(std::time::Duration::from_secs(10))
        .unwrap()
        .unwrap();
    assert_eq!(info.mime, "image/jpeg");
    assert_eq!((info.width, info.height), (367, 187));
}

#[test]
fn test_后台探测_回调收到错误() {
    // 失败也走同一条落定路径: 回调拿到的错误与同步路径一致
    let source = BufferSource::new(&b"just some plain text, nothing binary"[..]);
    let (tx, rx) = mpsc::channel();
    kui::probe_spawn(source).on_complete(move |result| {
        tx.send(result).unwrap();
    });
    let err = rx
        .recv_timeout(std::time::Duration::from_secs(10))
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, KuiError::Unrecognized));
    assert_eq!(err.to_string(), "unrecognized file format");

    // 源错误同样原样抵达回调
    let (sender, receiver) = channel_source();
    sender.fail(std::io::Error::other("stream err"));
    let (tx, rx) = mpsc::channel();
    kui::probe_spawn(receiver).on_complete(move |result| {
        tx.send(result).unwrap();
    });
    match rx
        .recv_timeout(std::time::Duration::from_secs(10))
        .unwrap()
        .unwrap_err()
    {
        KuiError::Source(e) => assert_eq!(e.to_string(), "stream err"),
        other => panic!("期望 Source, 得到 {other:?}"),
    }
}

#[test]
fn test_无法识别的输入() {
    let err = kui::probe_buffer(b"just some plain text, nothing binary").unwrap_err();
    assert!(matches!(err, KuiError::Unrecognized));
    assert_eq!(err.to_string(), "unrecognized file format");
}

#[test]
fn test_空输入() {
    let err = kui::probe_buffer(b"").unwrap_err();
    assert!(matches!(err, KuiError::EmptyInput));
    // 空输入的报错仍以同一句式开头, 便于上层统一匹配
    assert!(err.to_string().contains("unrecognized file format"));
}

#[test]
fn test_源错误原样传递() {
    let (sender, receiver) = channel_source();
    sender.fail(std::io::Error::other("stream err"));
    let err = probe::probe(receiver).unwrap_err();
    match err {
        KuiError::Source(e) => assert_eq!(e.to_string(), "stream err"),
        other => panic!("期望 Source, 得到 {other:?}"),
    }
}

#[test]
fn test_取消后台探测() {
    let (sender, receiver) = channel_source();
    let handle = kui::probe_spawn(receiver);
    handle.abort();
    // 取消在下一个源事件边界生效, 再送一块数据驱动会话醒来
    sender.send(vec![0x20u8; 64]);
    let err = handle.wait().unwrap_err();
    assert!(matches!(err, KuiError::Aborted));
}

/// 包装一个缓冲源, 统计拉取次数并记录关闭
struct CountingSource {
    inner: BufferSource,
    pulls: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl ChunkSource for CountingSource {
    fn next_chunk(&mut self) -> SourceEvent {
        self.pulls.fetch_add(1, Ordering::SeqCst);
        self.inner.next_chunk()
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        self.inner.close();
    }
}

#[test]
fn test_命中后立即停读() {
    // PNG 头 24 字节即可判定; 其后还有大量数据, 不应被继续拉取
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&640u32.to_be_bytes());
    data.extend_from_slice(&480u32.to_be_bytes());
    data.extend_from_slice(&[8, 2, 0, 0, 0]);
    data.extend_from_slice(&[0u8; 4]);
    data.extend_from_slice(&vec![0xAAu8; 512 * 1024]);

    let pulls = Arc::new(AtomicUsize::new(0));
    let closed = Arc::new(AtomicBool::new(false));
    let mut source = CountingSource {
        inner: BufferSource::rechunked(Bytes::from(data), 16 * 1024),
        pulls: pulls.clone(),
        closed: closed.clone(),
    };

    let info = probe::probe_with(probe::shared_registry(), &mut source).unwrap();
    assert_eq!((info.width, info.height), (640, 480));
    // 第一个 16 KB 块就包含完整头部
    assert_eq!(pulls.load(Ordering::SeqCst), 1);
    assert!(closed.load(Ordering::SeqCst));
}

#[test]
fn test_扫描预算防止无限缓冲() {
    // 持续送空白字符: 其他格式首块即排除, SVG 在 64 KB 预算耗尽后排除,
    // 会话应在远未读完源之前就以无法识别终结
    let pulls = Arc::new(AtomicUsize::new(0));
    let closed = Arc::new(AtomicBool::new(false));
    let mut source = CountingSource {
        inner: BufferSource::rechunked(Bytes::from(vec![0x20u8; 1024 * 1024]), 20_000),
        pulls: pulls.clone(),
        closed: closed.clone(),
    };

    let err = probe::probe_with(probe::shared_registry(), &mut source).unwrap_err();
    assert!(matches!(err, KuiError::Unrecognized));
    // 64 KB 预算在第 4 个 20 KB 块处耗尽, 1 MB 的源绝不应被读完
    assert!(pulls.load(Ordering::SeqCst) <= 5);
    assert!(closed.load(Ordering::SeqCst));
}

#[test]
fn test_图标容器的变体列表() {
    // ICO, 两个条目: 16x16 与 256x256 (0 表示 256)
    let mut data = Vec::new();
    data.extend_from_slice(&[0, 0, 1, 0, 2, 0]);
    data.extend_from_slice(&[16, 16, 0, 0, 1, 0, 32, 0]);
    data.extend_from_slice(&40u32.to_le_bytes());
    data.extend_from_slice(&38u32.to_le_bytes());
    data.extend_from_slice(&[0, 0, 0, 0, 1, 0, 32, 0]);
    data.extend_from_slice(&40u32.to_le_bytes());
    data.extend_from_slice(&1062u32.to_le_bytes());

    let info = kui::probe_buffer(&data).unwrap();
    assert_eq!(info.format, "ico");
    // 最大的变体被选为主尺寸
    assert_eq!((info.width, info.height), (256, 256));
    assert_eq!(info.variants.len(), 2);
    assert_eq!((info.variants[0].width, info.variants[0].height), (16, 16));
}

#[test]
fn test_jpeg_方向元数据() {
    // 在 APP0 后插入带方向 6 的 EXIF APP1 段
    let mut out = vec![0xFF, 0xD8];
    out.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    out.extend_from_slice(b"JFIF\0");
    out.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
    // APP1: "Exif\0\0" + 小端 TIFF, IFD0 单条方向标签
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II\x2a\x00");
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&274u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&6u16.to_le_bytes());
    tiff.extend_from_slice(&0u16.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    let payload_len = 2 + 6 + tiff.len();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&(payload_len as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    // SOF0
    out.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08]);
    out.extend_from_slice(&187u16.to_be_bytes());
    out.extend_from_slice(&367u16.to_be_bytes());
    out.extend_from_slice(&[0x01, 0x01, 0x11, 0x00]);

    let info = kui::probe_buffer(&out).unwrap();
    assert_eq!((info.width, info.height), (367, 187));
    assert_eq!(info.orientation, Some(6));
}
