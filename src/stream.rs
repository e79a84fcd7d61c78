//! smsd 重启日志流
//!
//! 服务端在重启 smsd 期间持续输出日志，响应体是一条不定长的字节流。
//! `RestartStream` 把它转换为按到达顺序产出的文本块；流只能消费一次。

use crate::error::ClientResult;
use crate::request::BodyStream;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

const REPLACEMENT: char = '\u{FFFD}';

/// 增量 UTF-8 解码器
///
/// 跨块截断的多字节字符会保留到下一块再输出；非法字节替换为 U+FFFD。
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut out = String::new();
        let mut input: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(input) {
                Ok(s) => {
                    out.push_str(s);
                    input = &[];
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&input[..valid]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT);
                            input = &input[valid + len..];
                        }
                        // 末尾是不完整的字符，等下一块
                        None => {
                            input = &input[valid..];
                            break;
                        }
                    }
                }
            }
        }

        let rest = input.to_vec();
        self.pending = rest;
        out
    }

    /// 流结束时调用；残留的不完整字符输出为一个 U+FFFD
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            REPLACEMENT.to_string()
        }
    }
}

/// 重启日志文本流
///
/// 传输层中途出错时产出一个 `Err`，随后流结束。
pub struct RestartStream {
    body: BodyStream,
    decoder: Utf8ChunkDecoder,
    finished: bool,
}

impl RestartStream {
    pub fn new(body: BodyStream) -> Self {
        Self {
            body,
            decoder: Utf8ChunkDecoder::new(),
            finished: false,
        }
    }
}

impl Stream for RestartStream {
    type Item = ClientResult<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if this.finished {
                return Poll::Ready(None);
            }
            match this.body.poll_next_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(bytes))) => {
                    let text = this.decoder.decode(&bytes);
                    // 整块都是半个字符时不产出空串
                    if !text.is_empty() {
                        return Poll::Ready(Some(Ok(text)));
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    this.finished = true;
                    return Poll::Ready(Some(Err(e.in_op("stream.restart_smsd"))));
                }
                Poll::Ready(None) => {
                    this.finished = true;
                    let tail = this.decoder.finish();
                    if !tail.is_empty() {
                        return Poll::Ready(Some(Ok(tail)));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    fn body(chunks: Vec<ClientResult<Vec<u8>>>) -> BodyStream {
        futures::stream::iter(chunks).boxed_local()
    }

    #[test]
    fn decoder_holds_split_character() {
        let mut d = Utf8ChunkDecoder::new();
        let bytes = "héllo".as_bytes();
        assert_eq!(d.decode(&bytes[..2]), "h");
        assert_eq!(d.decode(&bytes[2..]), "éllo");
        assert_eq!(d.finish(), "");
    }

    #[test]
    fn decoder_replaces_invalid_bytes() {
        let mut d = Utf8ChunkDecoder::new();
        assert_eq!(d.decode(b"a\xffb"), "a\u{FFFD}b");
        assert_eq!(d.decode(b"\xe2\x82"), "");
        assert_eq!(d.finish(), "\u{FFFD}");
    }

    #[tokio::test]
    async fn yields_chunks_in_order() {
        let stream = RestartStream::new(body(vec![
            Ok(b"a".to_vec()),
            Ok(b"b".to_vec()),
            Ok(b"c".to_vec()),
        ]));
        let chunks: Vec<String> = stream.map(|c| c.unwrap()).collect().await;
        assert_eq!(chunks, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn error_ends_stream() {
        let mut stream = RestartStream::new(body(vec![
            Ok(b"Stopping smsd\n".to_vec()),
            Err(ClientError::transport("connection reset")),
            Ok(b"never seen".to_vec()),
        ]));
        assert_eq!(stream.next().await.unwrap().unwrap(), "Stopping smsd\n");
        let err = stream.next().await.unwrap().unwrap_err();
        assert_eq!(err.message(), "connection reset");
        assert!(stream.next().await.is_none());
    }
}
