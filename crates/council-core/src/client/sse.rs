use std::pin::Pin;
use std::task::{Context, Poll};

use eventsource_stream::{EventStream, Eventsource};
use futures_util::Stream;

use crate::client::error::{BackendError, BackendResult};
use crate::events::{CouncilEvent, decode_event};

/// SSE parser that converts a byte stream into `CouncilEvent`s.
///
/// Frames with an empty `data` field (keep-alives) are skipped.
pub struct CouncilEventStream<S> {
    inner: EventStream<S>,
}

impl<S> CouncilEventStream<S> {
    pub fn new(stream: S) -> Self
    where
        S: Eventsource,
    {
        Self {
            inner: stream.eventsource(),
        }
    }
}

impl<S, E> Stream for CouncilEventStream<S>
where
    S: Stream<Item = std::result::Result<bytes::Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    type Item = BackendResult<CouncilEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    if event.data.trim().is_empty() {
                        continue;
                    }
                    return Poll::Ready(Some(
                        decode_event(&event.data).map_err(BackendError::from),
                    ));
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(BackendError::stream(format!(
                        "SSE stream error: {e}"
                    )))));
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
