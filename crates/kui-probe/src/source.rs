//! 字节源适配层.
//!
//! 把任意字节生产者 (文件、管道、内存缓冲、推送式生产者、网络流)
//! 统一成拉取式接口 [`ChunkSource`], 供会话调度器驱动.
//!
//! 关键约定:
//! - `next_chunk()` 可以阻塞等待数据;
//! - `close()` 幂等, 且调用之后不再交付任何字节: 即使数据已在途,
//!   也必须丢弃而不是交给已终结的会话;
//! - 底层错误只产出一次 `Error` 终态事件, 之后源表现为已关闭.

use std::io::{self, Read};
use std::sync::mpsc;

use bytes::Bytes;

/// 单次拉取的结果
#[derive(Debug)]
pub enum SourceEvent {
    /// 一个数据块 (长度不定, 与格式结构边界无关)
    Chunk(Bytes),
    /// 源自然耗尽
    End,
    /// 底层错误 (终态, 只产出一次)
    Error(io::Error),
}

/// 拉取式字节源
pub trait ChunkSource: Send {
    /// 拉取下一个事件, 可能阻塞
    fn next_chunk(&mut self) -> SourceEvent;

    /// 关闭源, 尽快释放底层资源; 幂等
    fn close(&mut self);
}

/// 默认读取粒度 (16 KB)
pub(crate) const READ_CHUNK_SIZE: usize = 16 * 1024;

/// 包装任意 `std::io::Read` 的字节源
///
/// 适用于文件、管道等同步读取器. 关闭时丢弃内部读取器以释放句柄.
pub struct ReaderSource<R: Read + Send> {
    reader: Option<R>,
}

impl<R: Read + Send> ReaderSource<R> {
    /// 包装一个读取器
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }
}

impl ReaderSource<std::fs::File> {
    /// 从文件路径打开 (只读)
    pub fn open(path: impl AsRef<std::path::Path>) -> io::Result<Self> {
        Ok(Self::new(std::fs::File::open(path)?))
    }
}

impl<R: Read + Send> ChunkSource for ReaderSource<R> {
    fn next_chunk(&mut self) -> SourceEvent {
        let Some(reader) = self.reader.as_mut() else {
            return SourceEvent::End;
        };
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => {
                    self.reader = None;
                    return SourceEvent::End;
                }
                Ok(n) => {
                    buf.truncate(n);
                    return SourceEvent::Chunk(Bytes::from(buf));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    // 错误是终态: 之后表现为已关闭
                    self.reader = None;
                    return SourceEvent::Error(e);
                }
            }
        }
    }

    fn close(&mut self) {
        self.reader = None;
    }
}

/// 内存缓冲字节源
///
/// 默认整块交付; `rechunked` 可按指定粒度切块交付,
/// 是验证分块无关性的测试工具.
pub struct BufferSource {
    data: Bytes,
    pos: usize,
    chunk_size: usize,
    closed: bool,
}

impl BufferSource {
    /// 整块交付
    pub fn new(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let chunk_size = data.len().max(1);
        Self {
            data,
            pos: 0,
            chunk_size,
            closed: false,
        }
    }

    /// 按 `chunk_size` 字节一块交付 (chunk_size 为 0 时按 1 处理)
    pub fn rechunked(data: impl Into<Bytes>, chunk_size: usize) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            chunk_size: chunk_size.max(1),
            closed: false,
        }
    }
}

impl ChunkSource for BufferSource {
    fn next_chunk(&mut self) -> SourceEvent {
        if self.closed || self.pos >= self.data.len() {
            return SourceEvent::End;
        }
        let end = (self.pos + self.chunk_size).min(self.data.len());
        let chunk = self.data.slice(self.pos..end);
        self.pos = end;
        SourceEvent::Chunk(chunk)
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// 推送式生产者对拉取接口的适配
///
/// 生产者持有 [`SourceSender`] 推送数据块/结束/错误,
/// 会话端以 `ChannelSource` 拉取. 关闭后通道中在途的数据被丢弃.
pub struct ChannelSource {
    rx: Option<mpsc::Receiver<SourceEvent>>,
}

/// 推送端句柄
pub struct SourceSender {
    tx: mpsc::Sender<SourceEvent>,
}

/// 创建一对推送/拉取端点
pub fn channel_source() -> (SourceSender, ChannelSource) {
    let (tx, rx) = mpsc::channel();
    (SourceSender { tx }, ChannelSource { rx: Some(rx) })
}

impl SourceSender {
    /// 推送一个数据块; 拉取端已关闭时返回 false
    pub fn send(&self, chunk: impl Into<Bytes>) -> bool {
        self.tx.send(SourceEvent::Chunk(chunk.into())).is_ok()
    }

    /// 宣告源自然结束
    pub fn finish(self) {
        let _ = self.tx.send(SourceEvent::End);
    }

    /// 宣告源错误 (终态)
    pub fn fail(self, error: io::Error) {
        let _ = self.tx.send(SourceEvent::Error(error));
    }
}

impl ChunkSource for ChannelSource {
    fn next_chunk(&mut self) -> SourceEvent {
        let Some(rx) = self.rx.as_ref() else {
            return SourceEvent::End;
        };
        match rx.recv() {
            Ok(SourceEvent::Error(e)) => {
                // 错误终态之后表现为已关闭
                self.rx = None;
                SourceEvent::Error(e)
            }
            Ok(ev) => ev,
            // 推送端丢弃即视为结束
            Err(mpsc::RecvError) => {
                self.rx = None;
                SourceEvent::End
            }
        }
    }

    fn close(&mut self) {
        // 丢弃接收端: 生产者后续 send 直接失败, 在途数据不再被读出
        self.rx = None;
    }
}
