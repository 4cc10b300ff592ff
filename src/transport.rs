//! Newline-delimited stdio transport
//!
//! [`LineReader`] splits the input stream into frames and knows nothing about
//! JSON-RPC. Output goes through one writer task: every producer hands a
//! fully encoded line to a [`ResponseSink`] and only the writer touches the
//! output stream, so two responses can never interleave.

use {
    crate::{
        error::{McpError, McpResult},
        logging,
        response::JsonRpcResponse,
    },
    std::{io, mem},
    tokio::{
        io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
        sync::mpsc,
        task::JoinHandle,
    },
};

/// One unit read from the input stream
#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    /// A non-blank line, newline and trailing `\r` stripped
    Frame(Vec<u8>),
    /// A line longer than the limit; its bytes were discarded
    TooLarge(usize),
}

/// Reads newline-terminated frames, enforcing a size limit without ever
/// buffering more than the limit.
pub struct LineReader<R> {
    reader: R,
    max_message_size: usize,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    pub fn new(reader: R, max_message_size: usize) -> Self {
        Self {
            reader,
            max_message_size,
            buf: Vec::new(),
        }
    }

    /// Next frame, or `None` at end of stream.
    ///
    /// Blank lines are skipped. A final line without a trailing newline is
    /// still returned. Not cancel safe: a partially read line is lost.
    pub async fn next_line(&mut self) -> io::Result<Option<Line>> {
        loop {
            self.buf.clear();
            let mut size = 0usize;
            let mut oversized = false;

            loop {
                let available = self.reader.fill_buf().await?;
                if available.is_empty() {
                    if size == 0 {
                        return Ok(None);
                    }
                    break;
                }

                let newline = available.iter().position(|&b| b == b'\n');
                let chunk = &available[..newline.unwrap_or(available.len())];
                size += chunk.len();
                if !oversized {
                    if size > self.max_message_size {
                        oversized = true;
                        self.buf.clear();
                    } else {
                        self.buf.extend_from_slice(chunk);
                    }
                }

                let consumed = newline.map_or(available.len(), |pos| pos + 1);
                self.reader.consume(consumed);
                if newline.is_some() {
                    break;
                }
            }

            if oversized {
                logging::log_frame_too_large(size, self.max_message_size);
                return Ok(Some(Line::TooLarge(size)));
            }

            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
            if self.buf.iter().all(u8::is_ascii_whitespace) {
                logging::log_blank_line();
                continue;
            }

            logging::log_frame_received(self.buf.len());
            return Ok(Some(Line::Frame(mem::take(&mut self.buf))));
        }
    }
}

/// Producer side of the response queue
#[derive(Debug, Clone)]
pub struct ResponseSink {
    tx: mpsc::Sender<String>,
}

impl ResponseSink {
    /// Encode and queue one response. Waits while the queue is full.
    pub async fn send(&self, response: &JsonRpcResponse) -> McpResult<()> {
        let line = response.encode()?;
        self.tx
            .send(line)
            .await
            .map_err(|_| McpError::Transport("response writer has stopped".to_string()))
    }
}

/// Start the single writer task.
///
/// The task ends with `Ok` once every [`ResponseSink`] clone is dropped and
/// the queue is drained, or with the first write error.
pub fn spawn_writer<W>(writer: W, capacity: usize) -> (ResponseSink, JoinHandle<McpResult<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity);
    let handle = tokio::spawn(write_loop(writer, rx));
    (ResponseSink { tx }, handle)
}

async fn write_loop<W>(mut writer: W, mut rx: mpsc::Receiver<String>) -> McpResult<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        if let Err(e) = write_line(&mut writer, &line).await {
            logging::log_response_error(&e.to_string());
            return Err(e.into());
        }
        logging::log_response_sent(line.len());
    }
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}
