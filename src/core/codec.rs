//! Record framing on result streams.
//!
//! Each record is a postcard payload wrapped in COBS, so a frame never
//! contains a zero byte except the one that terminates it. A damaged frame
//! therefore costs exactly one record: the reader resynchronises on the
//! next delimiter.

use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use crate::models::errors::DecodeError;
use crate::models::record::Record;

pub const FRAME_DELIMITER: u8 = 0x00;

/// Encode one record into a delimited frame.
pub fn encode_record(record: &Record) -> Result<Vec<u8>, postcard::Error> {
    postcard::to_allocvec_cobs(record)
}

/// Decode a single frame, with or without its trailing delimiter.
pub fn decode_frame(frame: &mut Vec<u8>) -> Result<Record, DecodeError> {
    if frame.last() == Some(&FRAME_DELIMITER) {
        frame.pop();
    }
    Ok(postcard::from_bytes_cobs(frame.as_mut_slice())?)
}

pub struct RecordReader<R> {
    inner: BufReader<R>,
    frame: Vec<u8>,
}

impl<R: AsyncRead + Unpin> RecordReader<R> {
    pub fn new(source: R) -> Self {
        RecordReader {
            inner: BufReader::new(source),
            frame: Vec::with_capacity(128),
        }
    }

    /// Next record, `Ok(None)` once the source is exhausted.
    pub async fn next(&mut self) -> Result<Option<Record>, DecodeError> {
        self.frame.clear();
        let n = self.inner.read_until(FRAME_DELIMITER, &mut self.frame).await?;
        if n == 0 {
            return Ok(None);
        }
        decode_frame(&mut self.frame).map(Some)
    }
}

pub struct RecordWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> RecordWriter<W> {
    pub fn new(sink: W) -> Self {
        RecordWriter { inner: sink }
    }

    pub async fn write(&mut self, record: &Record) -> io::Result<()> {
        let frame = encode_record(record).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.inner.write_all(&frame).await
    }

    pub async fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().await
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
