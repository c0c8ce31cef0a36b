//! A MapReduce-compatible implementation of word count.
//!

use crate::*;

pub fn map(_filename: &str, contents: &str) -> Vec<KeyValue> {
    contents
        .split(|c: char| !c.is_alphabetic())
        .filter(|s| !s.is_empty())
        .map(|word| KeyValue::new(word.to_lowercase(), "1"))
        .collect()
}

pub fn reduce(_key: &str, values: &[String]) -> String {
    values.len().to_string()
}
