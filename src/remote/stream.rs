//! Live record stream: push-driven transport, pull-driven consumer.
//!
//! The transport side holds a [`RecordSink`] and pushes records as they
//! arrive; the consumer holds a [`RecordStream`] and pulls one at a time.
//! Between them sits an unbounded FIFO channel:
//!
//! - records come out in exactly the order they were pushed, none dropped;
//! - a slow consumer only grows the queue (bounded by memory);
//! - a pull on an empty, open stream parks the task until the next push or
//!   the close;
//! - after the sink is gone, queued records drain first, then the stream
//!   ends.
//!
//! ## Ending
//!
//! A clean close ends the stream with `None`. An abnormal end (transport
//! fault, undecodable frame) yields exactly one
//! `Err(Error::StreamClosed { .. })` after the queued records, then `None`.
//!
//! Once a failure is seen, the stream refuses further pushes; every push
//! that returned `true` is still delivered before the error.
//!
//! A `RecordStream` is meant for one consumer. Each call to
//! [`crate::remote::RemoteTelemetryClient::stream`] opens a fresh connection.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::{Stream, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, AUTHORIZATION};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use super::RecordMap;
use crate::{Error, Result};

#[derive(Debug)]
enum StreamEvent {
    Record(RecordMap),
    Failed(String),
}

/// Producer half of a record stream.
///
/// Clones feed the same stream. The stream ends cleanly once every sink
/// has been closed or dropped and the consumer has drained what was
/// pushed. A [`fail`](Self::fail) from any clone ends it for all of them:
/// pushes that were accepted are still delivered, later pushes return
/// `false`.
#[derive(Debug, Clone)]
pub struct RecordSink {
    tx: mpsc::UnboundedSender<StreamEvent>,
}

impl RecordSink {
    /// Queue a record for the consumer.
    ///
    /// Returns `false` if the consumer has gone away; the record is discarded.
    pub fn push(&self, record: RecordMap) -> bool {
        self.tx.send(StreamEvent::Record(record)).is_ok()
    }

    /// Release this sink. The stream ends cleanly when the last sink is
    /// released.
    pub fn close(self) {}

    /// End the stream abnormally. The consumer sees every accepted record,
    /// then one `StreamClosed` error.
    pub fn fail(self, reason: impl Into<String>) {
        let _ = self.tx.send(StreamEvent::Failed(reason.into()));
    }

    /// True once the consumer has stopped accepting records.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half of a record stream.
///
/// Implements [`futures_util::Stream`] with `Item = Result<RecordMap>`.
/// Dropping it stops the connection reader, if one is attached.
#[derive(Debug)]
pub struct RecordStream {
    rx: mpsc::UnboundedReceiver<StreamEvent>,
    reader: Option<JoinHandle<()>>,
    failure: Option<String>,
    finished: bool,
}

/// Create a connected sink/stream pair with no transport attached.
///
/// This is the bridge the WebSocket reader uses; it is public so other
/// push-style sources (and tests) can feed a `RecordStream` directly.
#[must_use]
pub fn channel() -> (RecordSink, RecordStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        RecordSink { tx },
        RecordStream {
            rx,
            reader: None,
            failure: None,
            finished: false,
        },
    )
}

impl RecordStream {
    /// Wait for the next record.
    ///
    /// `None` means the stream has ended and will yield nothing more.
    pub async fn next_record(&mut self) -> Option<Result<RecordMap>> {
        self.next().await
    }

    /// True once the end of the stream has been observed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Open a WebSocket to `url` and pump its frames into a new stream.
    pub(crate) async fn connect(url: reqwest::Url, bearer: Option<String>) -> Result<Self> {
        let mut request = url.as_str().into_client_request()?;
        if let Some(bearer) = bearer {
            let value = HeaderValue::from_str(&bearer)
                .map_err(|e| Error::InvalidConfig(format!("credential header: {e}")))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        let (socket, response) = connect_async(request).await?;
        debug!(%url, status = response.status().as_u16(), "record stream connected");

        let (sink, mut stream) = channel();
        stream.reader = Some(tokio::spawn(pump(socket, sink)));
        Ok(stream)
    }
}

impl Stream for RecordStream {
    type Item = Result<RecordMap>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        loop {
            match this.rx.poll_recv(cx) {
                Poll::Ready(Some(StreamEvent::Record(record))) => {
                    return Poll::Ready(Some(Ok(record)));
                }
                Poll::Ready(Some(StreamEvent::Failed(reason))) => {
                    // Refuse further pushes, but deliver those already queued.
                    this.rx.close();
                    this.failure.get_or_insert(reason);
                }
                Poll::Ready(None) => {
                    this.finished = true;
                    return Poll::Ready(
                        this.failure
                            .take()
                            .map(|reason| Err(Error::StreamClosed { reason })),
                    );
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl Drop for RecordStream {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

async fn pump(mut socket: WebSocketStream<MaybeTlsStream<TcpStream>>, sink: RecordSink) {
    while let Some(message) = socket.next().await {
        let decoded = match message {
            Ok(Message::Text(text)) => serde_json::from_str::<RecordMap>(&text),
            Ok(Message::Binary(bytes)) => serde_json::from_slice::<RecordMap>(&bytes),
            Ok(Message::Close(frame)) => {
                debug!(?frame, "record stream closed by service");
                let _ = socket.close(None).await;
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "record stream transport failed");
                sink.fail(e.to_string());
                return;
            }
        };

        match decoded {
            Ok(record) => {
                if !sink.push(record) {
                    let _ = socket.close(None).await;
                    return;
                }
            }
            Err(e) => {
                warn!(error = %e, "undecodable record frame");
                sink.fail(format!("undecodable frame: {e}"));
                let _ = socket.close(None).await;
                return;
            }
        }
    }
    sink.close();
}
