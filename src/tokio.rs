use std::path::PathBuf;

use bytes::{Bytes, BytesMut};
use tokio::{fs::File, sync::mpsc};
use tokio_stream::StreamExt;
use tokio_util::codec::{Decoder, FramedRead};

use crate::{
    error::{Error, Result},
    mmap::Report,
    parser::{decode_line, encode_line, line_number},
    Mapping,
};

// Tokio MAX_BUF for blocking IO: https://github.com/tokio-rs/tokio/blob/master/tokio/src/io/blocking.rs#L26
static BUFFER_SIZE: usize = 2 * 1024 * 1024;

static CHANNEL_SIZE: usize = 4096;

/// Splits a byte stream into lines, without the line terminator.
#[derive(Debug, Default)]
pub struct LineDecoder;

impl Decoder for LineDecoder {
    type Item = Bytes;
    type Error = std::io::Error;

    #[inline]
    fn decode(
        &mut self,
        src: &mut BytesMut,
    ) -> std::result::Result<Option<Self::Item>, Self::Error> {
        match memchr::memchr(b'\n', src) {
            Some(index) => {
                let mut line = src.split_to(index + 1);
                line.truncate(index);
                if line.last() == Some(&b'\r') {
                    line.truncate(index - 1);
                }
                Ok(Some(line.freeze()))
            }
            None => Ok(None),
        }
    }

    fn decode_eof(
        &mut self,
        src: &mut BytesMut,
    ) -> std::result::Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None if src.is_empty() => Ok(None),
            None => Ok(Some(src.split().freeze())),
        }
    }
}

/// Streams the key file at `path` into `map`.
///
/// A reader task decodes lines and hands them over a channel to a blocking
/// task that owns the mapping, so inserts stay on a single thread. Each key
/// is read back right after it is written; keys are not retained for a final
/// pass, unlike [`with_mmap`](crate::mmap::with_mmap).
pub async fn with_decoder<M>(path: PathBuf, mut map: M) -> Result<(M, Report)>
where
    M: Mapping + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<(u32, Bytes)>(CHANNEL_SIZE);
    let reader = tokio::spawn(async move {
        let file = File::open(&path).await?;
        let mut framed = FramedRead::with_capacity(file, LineDecoder, BUFFER_SIZE);
        let mut number = 0usize;
        while let Some(line) = framed.next().await {
            let line = line?;
            number += 1;
            if line.is_empty() {
                continue;
            }
            if tx.send((line_number(number)?, line)).await.is_err() {
                break;
            }
        }
        tracing::debug!(lines = number, path = %path.display(), "key file streamed");
        Ok::<_, Error>(())
    });

    let writer = tokio::task::spawn_blocking(move || {
        let mut report = Report::default();
        while let Some((line, key)) = rx.blocking_recv() {
            map.set(&key, &encode_line(line))?;
            if map.get_value(&key).and_then(decode_line) != Some(line) {
                report.mismatches += 1;
            }
            report.keys += 1;
        }
        report.distinct = map.len();
        Ok::<_, Error>((map, report))
    });

    reader.await.map_err(std::io::Error::other)??;
    let (map, report) = writer.await.map_err(std::io::Error::other)??;
    tracing::info!(
        keys = report.keys,
        distinct = report.distinct,
        mismatches = report.mismatches,
        "bulk load finished"
    );
    Ok((map, report))
}
