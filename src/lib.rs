//! The task-level core of a MapReduce (lite) system.
//!
//! A map task reads one input shard, runs the application's map function
//! over it and partitions the emitted pairs into one intermediate file per
//! reduce task. A reduce task later reads the intermediate file each map task
//! left for its bucket, groups values by key and writes one sorted output
//! file. The two sides never talk to each other: they agree on where data
//! goes through [`ihash`] and a shared [`names::NameScheme`].

use serde::{Deserialize, Serialize};
use std::hash::Hasher;

pub mod codec;
pub mod error;
pub mod names;
pub mod standalone;
pub mod utils;
pub mod workload;

pub use error::TaskError;

/////////////////////////////////////////////////////////////////////////////
// MapReduce application types
/////////////////////////////////////////////////////////////////////////////

/// An application map function.
///
/// Called exactly once per map task with the input file name and the entire
/// contents of that file. Most applications ignore the file name.
pub trait Mapper {
    fn map(&self, filename: &str, contents: &str) -> Vec<KeyValue>;
}

impl<F> Mapper for F
where
    F: Fn(&str, &str) -> Vec<KeyValue>,
{
    fn map(&self, filename: &str, contents: &str) -> Vec<KeyValue> {
        self(filename, contents)
    }
}

/// An application reduce function.
///
/// Called exactly once per distinct key with every value emitted for that
/// key. It returns the single reduced value.
pub trait Reducer {
    fn reduce(&self, key: &str, values: &[String]) -> String;
}

impl<F> Reducer for F
where
    F: Fn(&str, &[String]) -> String,
{
    fn reduce(&self, key: &str, values: &[String]) -> String {
        self(key, values)
    }
}

/// A map reduce application.
pub struct Workload {
    pub mapper: Box<dyn Mapper>,
    pub reducer: Box<dyn Reducer>,
}

/////////////////////////////////////////////////////////////////////////////
// Key-value pairs
/////////////////////////////////////////////////////////////////////////////

/// A single key-value pair.
///
/// On disk this is the JSON object `{"Key": ..., "Value": ...}`.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct KeyValue {
    /// The key.
    #[serde(rename = "Key")]
    pub key: String,
    /// The value.
    #[serde(rename = "Value")]
    pub value: String,
}

impl KeyValue {
    /// Construct a new key-value pair from the given key and value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Get the key of this key-value pair.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the value of this key-value pair.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Consumes the key-value pair and returns the key.
    #[inline]
    pub fn into_key(self) -> String {
        self.key
    }

    /// Consumes the key-value pair and returns the value.
    #[inline]
    pub fn into_value(self) -> String {
        self.value
    }
}

/////////////////////////////////////////////////////////////////////////////
// Partitioning
/////////////////////////////////////////////////////////////////////////////

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a.
///
/// The `fnv` crate only ships the 64-bit variant, and the bucket of every key
/// depends on these exact 32 bits, so both sides of the shuffle use this one.
#[derive(Clone, Copy, Debug)]
pub struct Fnv32aHasher(u32);

impl Default for Fnv32aHasher {
    #[inline]
    fn default() -> Self {
        Self(FNV32_OFFSET_BASIS)
    }
}

impl Hasher for Fnv32aHasher {
    #[inline]
    fn finish(&self) -> u64 {
        u64::from(self.0)
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u32::from(*byte);
            self.0 = self.0.wrapping_mul(FNV32_PRIME);
        }
    }
}

/// Hashes an intermediate key. Compute a reduce bucket for a given key
/// by calculating `ihash(key) % n_reduce`, or call [`partition`].
pub fn ihash(key: &str) -> u32 {
    let mut hasher = Fnv32aHasher::default();
    hasher.write(key.as_bytes());
    hasher.0 & 0x7fff_ffff
}

/// The reduce bucket in `[0, n_reduce)` that `key` is routed to.
///
/// Panics if `n_reduce` is zero; the executors reject that before they
/// partition anything.
#[inline]
pub fn partition(key: &str, n_reduce: usize) -> usize {
    ihash(key) as usize % n_reduce
}
