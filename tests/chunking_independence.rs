//! 分块无关性测试: 同一份数据无论按多大的块到达, 探测结果必须完全一致.
//!
//! 对每种内置格式构造一个最小可解析样本, 分别以整块、逐字节和
//! 质数大小的块喂给会话, 比对终值.

use kui::ImageInfo;
use kui::probe::BufferSource;

/// 以三种分块方式探测同一份数据, 断言结果一致并返回
fn probe_all_chunkings(name: &str, data: &[u8]) -> ImageInfo {
    let whole = kui::probe_buffer(data)
        .unwrap_or_else(|e| panic!("{name}: 整块探测失败: {e}"));
    for chunk_size in [1usize, 7] {
        let source = BufferSource::rechunked(data.to_vec(), chunk_size);
        let chunked = kui::probe::probe(source)
            .unwrap_or_else(|e| panic!("{name}: {chunk_size} 字节分块探测失败: {e}"));
        assert_eq!(whole, chunked, "{name}: {chunk_size} 字节分块结果不一致");
    }
    whole
}

#[test]
fn test_png() {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&1920u32.to_be_bytes());
    data.extend_from_slice(&1080u32.to_be_bytes());
    data.extend_from_slice(&[8, 6, 0, 0, 0]);
    data.extend_from_slice(&[0u8; 4]);

    let info = probe_all_chunkings("png", &data);
    assert_eq!((info.width, info.height), (1920, 1080));
    assert_eq!(info.mime, "image/png");
}

#[test]
fn test_gif() {
    let mut data = b"GIF87a".to_vec();
    data.extend_from_slice(&320u16.to_le_bytes());
    data.extend_from_slice(&240u16.to_le_bytes());
    data.extend_from_slice(&[0u8; 3]);

    let info = probe_all_chunkings("gif", &data);
    assert_eq!((info.width, info.height), (320, 240));
    assert_eq!(info.mime, "image/gif");
}

#[test]
fn test_bmp() {
    let mut data = b"BM".to_vec();
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(&40u32.to_le_bytes());
    data.extend_from_slice(&800i32.to_le_bytes());
    // 负高度表示自上而下存储, 报告绝对值
    data.extend_from_slice(&(-600i32).to_le_bytes());
    data.extend_from_slice(&[1, 0, 24, 0]);

    let info = probe_all_chunkings("bmp", &data);
    assert_eq!((info.width, info.height), (800, 600));
    assert_eq!(info.mime, "image/bmp");
}

#[test]
fn test_dds() {
    let mut data = b"DDS ".to_vec();
    data.extend_from_slice(&124u32.to_le_bytes());
    data.extend_from_slice(&0x1007u32.to_le_bytes());
    data.extend_from_slice(&512u32.to_le_bytes());
    data.extend_from_slice(&1024u32.to_le_bytes());
    data.extend_from_slice(&[0u8; 16]);

    let info = probe_all_chunkings("dds", &data);
    assert_eq!((info.width, info.height), (1024, 512));
    assert_eq!(info.mime, "image/vnd-ms.dds");
}

#[test]
fn test_psd() {
    let mut data = b"8BPS".to_vec();
    data.extend_from_slice(&1u16.to_be_bytes());
    data.extend_from_slice(&[0u8; 6]);
    data.extend_from_slice(&3u16.to_be_bytes());
    data.extend_from_slice(&768u32.to_be_bytes());
    data.extend_from_slice(&1024u32.to_be_bytes());
    data.extend_from_slice(&8u16.to_be_bytes());
    data.extend_from_slice(&3u16.to_be_bytes());

    let info = probe_all_chunkings("psd", &data);
    assert_eq!((info.width, info.height), (1024, 768));
    assert_eq!(info.mime, "image/vnd.adobe.photoshop");
}

#[test]
fn test_webp_vp8x() {
    let mut data = b"RIFF".to_vec();
    data.extend_from_slice(&22u32.to_le_bytes());
    data.extend_from_slice(b"WEBPVP8X");
    data.extend_from_slice(&10u32.to_le_bytes());
    data.extend_from_slice(&[0x08, 0, 0, 0]);
    let w = 400u32 - 1;
    let h = 300u32 - 1;
    data.extend_from_slice(&w.to_le_bytes()[..3]);
    data.extend_from_slice(&h.to_le_bytes()[..3]);

    let info = probe_all_chunkings("webp", &data);
    assert_eq!((info.width, info.height), (400, 300));
    assert_eq!(info.mime, "image/webp");
}

#[test]
fn test_jpeg() {
    let mut data = vec![0xFF, 0xD8];
    data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    data.extend_from_slice(b"JFIF\0");
    data.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08]);
    data.extend_from_slice(&187u16.to_be_bytes());
    data.extend_from_slice(&367u16.to_be_bytes());
    data.extend_from_slice(&[0x01, 0x01, 0x11, 0x00]);

    let info = probe_all_chunkings("jpeg", &data);
    assert_eq!((info.width, info.height), (367, 187));
    assert_eq!(info.mime, "image/jpeg");
}

#[test]
fn test_tiff() {
    // 小端 TIFF, IFD0 含宽高两个 SHORT 标签
    let mut data = b"II\x2a\x00".to_vec();
    data.extend_from_slice(&8u32.to_le_bytes());
    data.extend_from_slice(&2u16.to_le_bytes());
    for (tag, value) in [(256u16, 1600u16), (257, 900)] {
        data.extend_from_slice(&tag.to_le_bytes());
        data.extend_from_slice(&3u16.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&value.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
    }
    data.extend_from_slice(&0u32.to_le_bytes());

    let info = probe_all_chunkings("tiff", &data);
    assert_eq!((info.width, info.height), (1600, 900));
    assert_eq!(info.mime, "image/tiff");
}

#[test]
fn test_ico() {
    let mut data = Vec::new();
    data.extend_from_slice(&[0, 0, 1, 0, 1, 0]);
    data.extend_from_slice(&[48, 48, 0, 0, 1, 0, 32, 0]);
    data.extend_from_slice(&40u32.to_le_bytes());
    data.extend_from_slice(&22u32.to_le_bytes());

    let info = probe_all_chunkings("ico", &data);
    assert_eq!((info.width, info.height), (48, 48));
    assert_eq!(info.mime, "image/x-icon");
}

#[test]
fn test_icns() {
    let mut data = b"icns".to_vec();
    data.extend_from_slice(&24u32.to_be_bytes());
    data.extend_from_slice(b"ic08");
    data.extend_from_slice(&16u32.to_be_bytes());
    data.extend_from_slice(&[0u8; 8]);

    let info = probe_all_chunkings("icns", &data);
    assert_eq!((info.width, info.height), (256, 256));
    assert_eq!(info.mime, "image/icns");
}

#[test]
fn test_avif() {
    fn boxed(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = (8 + payload.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(payload);
        out
    }
    let mut ftyp = b"avif".to_vec();
    ftyp.extend_from_slice(&[0u8; 4]);
    ftyp.extend_from_slice(b"avif");
    let mut ispe = vec![0u8; 4];
    ispe.extend_from_slice(&1280u32.to_be_bytes());
    ispe.extend_from_slice(&720u32.to_be_bytes());
    let mut meta = vec![0u8; 4];
    meta.extend_from_slice(&boxed(
        b"iprp",
        &boxed(b"ipco", &boxed(b"ispe", &ispe)),
    ));
    let mut data = boxed(b"ftyp", &ftyp);
    data.extend_from_slice(&boxed(b"meta", &meta));

    let info = probe_all_chunkings("avif", &data);
    assert_eq!((info.width, info.height), (1280, 720));
    assert_eq!(info.mime, "image/avif");
}

#[test]
fn test_svg() {
    let data = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"512\" height=\"256\" viewBox=\"0 0 512 256\"></svg>";

    let info = probe_all_chunkings("svg", data.as_bytes());
    assert_eq!((info.width, info.height), (512, 256));
    assert_eq!(info.mime, "image/svg+xml");
}
