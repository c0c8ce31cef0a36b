//! Converts MapReduce application names to actual application code.
//!
//! # Example
//!
//! To get the word count application:
//! ```
//! # use anyhow::Result;
//! use mrlite::workload;
//! # fn main() -> Result<()> {
//! let wc = workload::named("wc", &[])?;
//! # Ok(())
//! # }
//! ```

use crate::Workload;
use anyhow::{bail, Result};

pub mod grep;
pub mod wc;

/// Gets the [`Workload`] named `name`, configured with `args`.
///
/// Returns `Ok(None)` if no application with the given name was found, and
/// an error if the application rejects its arguments.
pub fn try_named(name: &str, args: &[String]) -> Result<Option<Workload>> {
    let workload = match name {
        "wc" => Workload {
            mapper: Box::new(wc::map),
            reducer: Box::new(wc::reduce),
        },
        "grep" => Workload {
            mapper: Box::new(grep::Grep::from_args(args)?),
            reducer: Box::new(grep::reduce),
        },
        _ => return Ok(None),
    };
    Ok(Some(workload))
}

/// Gets the [`Workload`] named `name`, configured with `args`.
///
/// Returns an [`anyhow::Error`] if no application with the given name was found.
pub fn named(name: &str, args: &[String]) -> Result<Workload> {
    match try_named(name, args)? {
        Some(app) => Ok(app),
        None => bail!("No app named `{}` found.", name),
    }
}
