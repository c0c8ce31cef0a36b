//! Where intermediate and output files live.
//!
//! Map and reduce tasks only interoperate if they use the same scheme.

use std::path::{Path, PathBuf};

/// Maps task coordinates to file paths.
///
/// Implementations must never return the same path for two distinct
/// `(job, map_task, reduce_task)` triples.
pub trait NameScheme {
    /// The file map task `map_task` writes for reduce task `reduce_task`.
    fn intermediate(&self, job_name: &str, map_task: usize, reduce_task: usize) -> PathBuf;

    /// The output file of reduce task `reduce_task`.
    fn reduce_output(&self, job_name: &str, reduce_task: usize) -> PathBuf;
}

/// `mrtmp.<job>-<map>-<reduce>` and `mrtmp.<job>-res-<reduce>` under a
/// single directory.
#[derive(Clone, Debug)]
pub struct DefaultNames {
    dir: PathBuf,
}

impl DefaultNames {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The final file produced by [`merge`](crate::standalone::engine::merge).
    pub fn merged_output(&self, job_name: &str) -> PathBuf {
        self.dir.join(format!("mrtmp.{job_name}"))
    }
}

impl Default for DefaultNames {
    fn default() -> Self {
        Self::new(".")
    }
}

impl NameScheme for DefaultNames {
    fn intermediate(&self, job_name: &str, map_task: usize, reduce_task: usize) -> PathBuf {
        self.dir
            .join(format!("mrtmp.{job_name}-{map_task}-{reduce_task}"))
    }

    fn reduce_output(&self, job_name: &str, reduce_task: usize) -> PathBuf {
        self.dir.join(format!("mrtmp.{job_name}-res-{reduce_task}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_names() {
        let names = DefaultNames::new("/tmp/wc");
        assert_eq!(
            names.intermediate("wc", 3, 1),
            PathBuf::from("/tmp/wc/mrtmp.wc-3-1")
        );
        assert_eq!(
            names.reduce_output("wc", 1),
            PathBuf::from("/tmp/wc/mrtmp.wc-res-1")
        );
        assert_eq!(names.merged_output("wc"), PathBuf::from("/tmp/wc/mrtmp.wc"));
    }

    #[test]
    fn distinct_task_coordinates_get_distinct_paths() {
        let names = DefaultNames::default();
        let mut seen = HashSet::new();
        for m in 0..12 {
            for r in 0..12 {
                assert!(seen.insert(names.intermediate("job", m, r)));
            }
        }
        for r in 0..12 {
            assert!(seen.insert(names.reduce_output("job", r)));
        }
    }
}
