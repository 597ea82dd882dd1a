//! HTTP 流式字节源 (feature = "http").
//!
//! 后台线程发起 GET 请求并按块读取响应体, 会话线程按需拉取.
//! 探测一旦得出结论就会 `close()`, 后台线程在下一块前观察到中止标志,
//! 丢弃连接, 不再传输多余的字节.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::{Arc, Condvar, Mutex};

use bytes::Bytes;

use crate::source::{ChunkSource, READ_CHUNK_SIZE, SourceEvent};

/// 下载线程与会话线程之间的共享状态
struct HttpShared {
    /// 已下载、尚未被拉取的数据块
    queue: VecDeque<Bytes>,
    /// 下载是否已结束 (自然结束或出错)
    finished: bool,
    /// 下载错误 (只交付一次, 保留原始错误对象)
    error: Option<io::Error>,
    /// HTTP 连接是否已建立
    connected: bool,
    /// 是否请求中止下载
    aborted: bool,
    /// 总大小 (来自 Content-Length, None 表示未知)
    total_size: Option<u64>,
}

/// HTTP 流式字节源
pub struct HttpSource {
    shared: Arc<(Mutex<HttpShared>, Condvar)>,
    closed: bool,
    total_size: Option<u64>,
}

impl HttpSource {
    /// 打开 URL 并启动后台下载线程
    ///
    /// 阻塞至连接建立 (或失败), 保证 Content-Length 在返回时已知.
    pub fn open(url: &str) -> io::Result<Self> {
        log::info!("正在连接: {}", url);

        let shared = Arc::new((
            Mutex::new(HttpShared {
                queue: VecDeque::new(),
                finished: false,
                error: None,
                connected: false,
                aborted: false,
                total_size: None,
            }),
            Condvar::new(),
        ));

        let shared_clone = Arc::clone(&shared);
        let url_owned = url.to_string();
        std::thread::spawn(move || {
            http_download_worker(&url_owned, &shared_clone);
        });

        // 等待 HTTP 连接建立或失败
        let (lock, cvar) = &*shared;
        let mut st = lock.lock().unwrap();
        while !st.connected && !st.finished {
            st = cvar.wait(st).unwrap();
        }
        if let Some(err) = st.error.take() {
            return Err(err);
        }
        let total_size = st.total_size;
        drop(st);

        Ok(Self {
            shared,
            closed: false,
            total_size,
        })
    }

    /// 响应声明的总大小 (如果有)
    pub fn content_length(&self) -> Option<u64> {
        self.total_size
    }
}

impl ChunkSource for HttpSource {
    fn next_chunk(&mut self) -> SourceEvent {
        if self.closed {
            return SourceEvent::End;
        }
        let (lock, cvar) = &*self.shared;
        let mut st = lock.lock().unwrap();
        loop {
            if let Some(chunk) = st.queue.pop_front() {
                return SourceEvent::Chunk(chunk);
            }
            if st.finished {
                return match st.error.take() {
                    Some(err) => {
                        self.closed = true;
                        SourceEvent::Error(err)
                    }
                    None => SourceEvent::End,
                };
            }
            // 等待后台线程下载更多数据
            st = cvar.wait(st).unwrap();
        }
    }

    fn close(&mut self) {
        self.closed = true;
        let (lock, cvar) = &*self.shared;
        if let Ok(mut st) = lock.lock() {
            st.aborted = true;
            st.queue.clear();
            cvar.notify_all();
        }
    }
}

impl Drop for HttpSource {
    fn drop(&mut self) {
        self.close();
    }
}


/// HTTP 后台下载工作线程
fn http_download_worker(url: &str, shared: &Arc<(Mutex<HttpShared>, Condvar)>) {
    let (lock, cvar) = &**shared;

    // 发起 HTTP 请求
    let response = match ureq::get(url).call() {
        Ok(resp) => resp,
        Err(e) => {
            log::warn!("HTTP 请求失败: {}", e);
            let mut st = lock.lock().unwrap();
            // 保留原始错误对象, 向上原样传递
            st.error = Some(io::Error::other(e));
            st.finished = true;
            st.connected = true;
            cvar.notify_all();
            return;
        }
    };

    // 提取 Content-Length 并通知会话线程连接已建立
    let content_length = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    {
        let mut st = lock.lock().unwrap();
        st.total_size = content_length;
        st.connected = true;
        cvar.notify_all();
    }
    log::debug!("HTTP 连接成功, Content-Length: {:?}", content_length);

    // 流式读取响应体
    let mut reader = response.into_body().into_reader();
    let mut buf = [0u8; READ_CHUNK_SIZE];
    loop {
        // 会话已终结时中止, 丢弃连接
        if lock.lock().unwrap().aborted {
            log::debug!("HTTP 下载被中止");
            return;
        }

        match reader.read(&mut buf) {
            Ok(0) => {
                let mut st = lock.lock().unwrap();
                st.finished = true;
                cvar.notify_all();
                return;
            }
            Ok(n) => {
                let mut st = lock.lock().unwrap();
                st.queue.push_back(Bytes::copy_from_slice(&buf[..n]));
                cvar.notify_all();
            }
            Err(e) => {
                log::warn!("网络读取错误: {}", e);
                let mut st = lock.lock().unwrap();
                st.error = Some(e);
                st.finished = true;
                cvar.notify_all();
                return;
            }
        }
    }
}
