//! Bandwidth-shaped file bodies.

use async_stream::stream;
use axum::body::Bytes;
use futures::Stream;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::{Instant, sleep_until};

const CHUNK_SIZE: usize = 32 * 1024;

/// Streams `reader` in chunks, pacing delivery so that the average rate never
/// exceeds `rate` bytes per second. `None` or zero streams as fast as the reader
/// allows.
pub fn throttled<R>(mut reader: R, rate: Option<u64>) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let rate = rate.filter(|rate| *rate > 0);
    let chunk_size = rate.map_or(CHUNK_SIZE, |rate| usize::try_from(rate).unwrap_or(CHUNK_SIZE).clamp(1, CHUNK_SIZE));
    stream! {
        let start = Instant::now();
        let mut sent = 0u64;
        loop {
            let mut buffer = vec![0u8; chunk_size];
            let read = match reader.read(&mut buffer).await {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    yield Err(e);
                    break;
                },
            };
            buffer.truncate(read);
            sent += read as u64;
            yield Ok(Bytes::from(buffer));
            if let Some(rate) = rate {
                sleep_until(start + Duration::from_secs_f64(sent as f64 / rate as f64)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use std::io::Cursor;

    #[tokio::test(start_paused = true)]
    async fn test_unlimited_is_not_delayed() {
        let data = vec![1u8; CHUNK_SIZE * 2 + 5];
        let start = Instant::now();
        let chunks: Vec<Bytes> = throttled(Cursor::new(data.clone()), None).try_collect().await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.concat(), data);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_paces_delivery() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        let start = Instant::now();
        let chunks: Vec<Bytes> = throttled(Cursor::new(data.clone()), Some(1024)).try_collect().await.unwrap();
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|chunk| chunk.len() == 1024));
        assert_eq!(chunks.concat(), data);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4), "finished after {elapsed:?}");
        assert!(elapsed < Duration::from_secs(5), "finished after {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_reader() {
        let chunks: Vec<Bytes> = throttled(Cursor::new(Vec::new()), Some(1)).try_collect().await.unwrap();
        assert!(chunks.is_empty());
    }
}
