//! A MapReduce-compatible implementation of `grep`.
//!

use crate::*;
use anyhow::Result;
use clap::Parser;
use itertools::Itertools;

#[derive(Parser, Debug)]
#[clap(no_binary_name = true)]
struct Args {
    #[clap(short, long, value_parser)]
    term: String,
}

/// Emits `(filename, "<line number>:<line>")` for every line containing
/// `term`. Line numbers start at 1.
#[derive(Clone, Debug)]
pub struct Grep {
    term: String,
}

impl Grep {
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into() }
    }

    /// Builds the mapper from workload arguments, e.g. `["--term", "foo"]`.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let args = Args::try_parse_from(args)?;
        Ok(Self::new(args.term))
    }
}

impl Mapper for Grep {
    fn map(&self, filename: &str, contents: &str) -> Vec<KeyValue> {
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| line.contains(&self.term))
            .map(|(i, line)| KeyValue::new(filename, format!("{}:{}", i + 1, line)))
            .collect()
    }
}

/// Orders the matches of one file by line number and joins them with
/// newlines. Values without a numeric prefix sort first.
pub fn reduce(_key: &str, values: &[String]) -> String {
    values
        .iter()
        .sorted_by_key(|value| {
            value
                .split_once(':')
                .and_then(|(n, _)| n.parse::<u64>().ok())
                .unwrap_or(0)
        })
        .join("\n")
}
