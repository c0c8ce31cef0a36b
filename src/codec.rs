//! The record codec shared by intermediate and output files.
//!
//! A file is a stream of JSON objects shaped `{"Key": ..., "Value": ...}`,
//! written back to back. The writer puts a newline after every object, the
//! reader accepts any whitespace (or none) between them.

use std::io::{Read, Write};

use serde_json::de::IoRead;
use serde_json::StreamDeserializer;

use crate::KeyValue;

/// Encode a single record, followed by a newline.
pub fn encode_record<W: Write>(writer: &mut W, kv: &KeyValue) -> serde_json::Result<()> {
    serde_json::to_writer(&mut *writer, kv)?;
    writer.write_all(b"\n").map_err(serde_json::Error::io)
}

/// Encode every record in order.
pub fn encode_records<'a, W, I>(writer: &mut W, records: I) -> serde_json::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a KeyValue>,
{
    for kv in records {
        encode_record(writer, kv)?;
    }
    Ok(())
}

/// Streaming reader over a sequence of encoded records.
///
/// Yields records until end of stream. After the first error the stream
/// is fused and yields nothing else.
pub struct RecordReader<R: Read> {
    inner: StreamDeserializer<'static, IoRead<R>, KeyValue>,
    failed: bool,
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: serde_json::Deserializer::from_reader(reader).into_iter(),
            failed: false,
        }
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = serde_json::Result<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.inner.next()?;
        self.failed = item.is_err();
        Some(item)
    }
}

/// Decode every record in `reader`.
pub fn decode_records<R: Read>(reader: R) -> serde_json::Result<Vec<KeyValue>> {
    RecordReader::new(reader).collect()
}
