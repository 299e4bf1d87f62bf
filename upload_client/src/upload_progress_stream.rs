use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use more_asserts::*;

use crate::interface::{ProgressCallback, TransferProgress};

/// Block size for streamed upload bodies. Small enough that the transfer
/// text moves on slow links, large enough not to throttle fast ones.
pub(crate) const UPLOAD_STREAM_BLOCK_SIZE: usize = 1024 * 1024;

/// Byte accounting shared by every part of one batch submission. Each part
/// reports the bytes the transport has consumed; the counter folds them
/// into monotone batch-wide totals for the caller's callback.
pub(crate) struct BatchTransferCounter {
    bytes_confirmed: AtomicU64,
    total_bytes: u64,
    callback: Option<ProgressCallback>,
}

impl BatchTransferCounter {
    pub(crate) fn new(total_bytes: u64, callback: Option<ProgressCallback>) -> Arc<Self> {
        Arc::new(Self {
            bytes_confirmed: AtomicU64::new(0),
            total_bytes,
            callback,
        })
    }

    fn add_confirmed(&self, delta: u64) {
        if delta == 0 {
            return;
        }

        let bytes_loaded = self.bytes_confirmed.fetch_add(delta, Ordering::Relaxed) + delta;
        debug_assert_le!(bytes_loaded, self.total_bytes);

        if let Some(callback) = &self.callback {
            (callback)(TransferProgress {
                bytes_loaded,
                total_bytes: Some(self.total_bytes),
            });
        }
    }

    /// Tops the confirmed count off to the exact total. Called once the
    /// server acknowledges the batch; idempotent, so nothing fires if every
    /// block was already confirmed through the streams.
    pub(crate) fn finish(&self) {
        let previous = self.bytes_confirmed.swap(self.total_bytes, Ordering::Relaxed);
        if previous < self.total_bytes {
            if let Some(callback) = &self.callback {
                (callback)(TransferProgress {
                    bytes_loaded: self.total_bytes,
                    total_bytes: Some(self.total_bytes),
                });
            }
        }
    }
}

/// Streams one file's content to the transport in fixed-size blocks. A
/// block counts as transferred only when the transport comes back for the
/// next one; the final block of each part is confirmed by
/// [`BatchTransferCounter::finish`] once the response settles. Progress is
/// therefore consumption-based, not buffer-fill optimism.
pub(crate) struct UploadProgressStream {
    data: Bytes,
    block_size: usize,
    bytes_sent: usize,
    bytes_confirmed: usize,
    counter: Arc<BatchTransferCounter>,
}

impl UploadProgressStream {
    pub(crate) fn new(data: Bytes, block_size: usize, counter: Arc<BatchTransferCounter>) -> Self {
        debug_assert_gt!(block_size, 0);

        Self {
            data,
            block_size,
            bytes_sent: 0,
            bytes_confirmed: 0,
            counter,
        }
    }
}

impl Stream for UploadProgressStream {
    type Item = std::result::Result<Bytes, std::io::Error>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        debug_assert_le!(self.bytes_sent, self.data.len());

        if self.bytes_sent == self.data.len() {
            return Poll::Ready(None);
        }

        // Being polled again means the transport consumed everything handed
        // out so far; report that before slicing the next block.
        let newly_confirmed = self.bytes_sent - self.bytes_confirmed;
        if newly_confirmed > 0 {
            self.counter.add_confirmed(newly_confirmed as u64);
            let sent = self.bytes_sent;
            self.bytes_confirmed = sent;
        }

        let slice_start = self.bytes_sent;
        let slice_end = (self.bytes_sent + self.block_size).min(self.data.len());
        self.bytes_sent = slice_end;

        Poll::Ready(Some(Ok(self.data.slice(slice_start..slice_end))))
    }
}
