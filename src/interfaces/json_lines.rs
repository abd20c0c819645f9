use crate::domain::channel::{Channel, Envelope};
use crate::domain::ports::{Publisher, Subscription};
use crate::error::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Writes envelopes as one JSON object per line.
///
/// Each line is flushed as soon as it is written so a downstream process reading
/// through a pipe sees messages immediately.
pub struct JsonLinesPublisher<W> {
    writer: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesPublisher<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Publisher for JsonLinesPublisher<W> {
    async fn publish(&self, envelope: Envelope) -> Result<()> {
        let mut line = serde_json::to_vec(&envelope)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Reads envelopes from a line-delimited JSON source (e.g. stdin).
///
/// Blank lines are skipped, malformed lines (including ones that are not
/// UTF-8) are logged and skipped, and lines addressed to channels outside
/// `channels` are ignored. The subscription ends at end of input.
pub struct JsonLinesSubscription<R> {
    reader: R,
    buf: Vec<u8>,
    channels: Vec<Channel>,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesSubscription<R> {
    pub fn new(reader: R, channels: &[Channel]) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            channels: channels.to_vec(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Subscription for JsonLinesSubscription<R> {
    async fn recv(&mut self) -> Result<Option<Envelope>> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
                return Ok(None);
            }
            let line = self.buf.trim_ascii();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_slice::<Envelope>(line) {
                Ok(envelope) if self.channels.contains(&envelope.channel) => {
                    return Ok(Some(envelope));
                }
                Ok(envelope) => {
                    debug!("Ignoring message on {}", envelope.channel);
                }
                Err(e) => {
                    warn!("Error reading message: {}", e);
                }
            }
        }
    }
}
