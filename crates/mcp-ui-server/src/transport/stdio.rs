use std::{
    pin::Pin,
    task::{Context, Poll},
};

use async_trait::async_trait;
use futures::Stream;
use mcp_ui_core::protocol::{JSONRPC_VERSION, JsonRpcMessage};
use pin_project::pin_project;
use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

use super::Transport;
use crate::TransportError;

// Large enough for tool calls carrying whole HTML documents.
const READ_BUFFER_CAPACITY: usize = 2 * 1024 * 1024;

/// Newline delimited JSON-RPC over any pair of byte streams.
#[pin_project]
pub struct ByteTransport<R, W> {
    #[pin]
    reader: BufReader<R>,
    #[pin]
    writer: W,
    // bytes of the current line seen so far, kept across polls
    line: Vec<u8>,
}

impl<R, W> ByteTransport<R, W>
where
    R: AsyncRead,
    W: AsyncWrite,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::with_capacity(READ_BUFFER_CAPACITY, reader),
            writer,
            line: Vec::new(),
        }
    }
}

/// A transport over the process's stdin and stdout.
pub fn stdio() -> ByteTransport<Stdin, Stdout> {
    ByteTransport::new(tokio::io::stdin(), tokio::io::stdout())
}

fn parse_line(bytes: Vec<u8>) -> Result<JsonRpcMessage, TransportError> {
    let line = String::from_utf8(bytes)?;
    tracing::debug!(json = %line, "incoming message");

    let value: serde_json::Value = serde_json::from_str(&line)?;
    let Some(object) = value.as_object() else {
        return Err(TransportError::InvalidMessage(
            "Message must be a JSON object".into(),
        ));
    };
    if object.get("jsonrpc").and_then(|v| v.as_str()) != Some(JSONRPC_VERSION) {
        return Err(TransportError::InvalidMessage(
            "Missing or invalid jsonrpc version".into(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}

impl<R, W> Stream for ByteTransport<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    type Item = Result<JsonRpcMessage, TransportError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            let (consumed, complete) = {
                let available = match this.reader.as_mut().poll_fill_buf(cx) {
                    Poll::Ready(Ok(available)) => available,
                    Poll::Ready(Err(e)) => return Poll::Ready(Some(Err(TransportError::Io(e)))),
                    Poll::Pending => return Poll::Pending,
                };
                if available.is_empty() {
                    // EOF; a trailing line without a newline still counts
                    if this.line.iter().all(u8::is_ascii_whitespace) {
                        this.line.clear();
                        return Poll::Ready(None);
                    }
                    let line = std::mem::take(this.line);
                    return Poll::Ready(Some(parse_line(line)));
                }
                match available.iter().position(|b| *b == b'\n') {
                    Some(i) => {
                        this.line.extend_from_slice(&available[..i]);
                        (i + 1, true)
                    }
                    None => {
                        this.line.extend_from_slice(available);
                        (available.len(), false)
                    }
                }
            };
            this.reader.as_mut().consume(consumed);

            if complete {
                let line = std::mem::take(this.line);
                if line.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                return Poll::Ready(Some(parse_line(line)));
            }
        }
    }
}

#[async_trait]
impl<R, W> Transport for ByteTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn write_message(&mut self, message: JsonRpcMessage) -> Result<(), TransportError> {
        let json = serde_json::to_string(&message)?;
        tracing::debug!(json = %json, "outgoing message");

        let writer = &mut self.writer;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }
}
