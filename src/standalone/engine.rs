use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use fnv::FnvHashMap;
use itertools::Itertools;
use tracing::{debug, error, info, info_span, warn};

use crate::codec::{encode_record, encode_records, RecordReader};
use crate::names::NameScheme;
use crate::standalone::{MissingInputs, TaskOptions, WriteMode};
use crate::utils::OutputFile;
use crate::*;

/// One intermediate file written by a map task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketFile {
    pub reduce_task: usize,
    pub path: PathBuf,
    /// Records appended to the file by this run.
    pub records: usize,
}

/// How a map task completed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapOutcome {
    /// The map function emitted nothing, so no file was touched.
    Empty,
    /// One entry per non-empty bucket, in ascending bucket order.
    Written(Vec<BucketFile>),
}

impl MapOutcome {
    pub fn files(&self) -> &[BucketFile] {
        match self {
            MapOutcome::Empty => &[],
            MapOutcome::Written(files) => files,
        }
    }
}

/// How a reduce task completed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReduceOutcome {
    pub path: PathBuf,
    /// Distinct keys reduced, which is also the number of records written.
    pub keys: usize,
}

/// Runs map task `map_task` of `job_name` over `in_file`.
///
/// The whole file is read into memory and handed to `mapper` once. Every
/// emitted pair goes to bucket [`partition`]`(key, n_reduce)`, and each
/// non-empty bucket is written to `names.intermediate(job_name, map_task, b)`
/// in emission order. Buckets already written stay on disk if a later one
/// fails; [`TaskError::written`] lists them.
pub fn perform_map<N, M>(
    names: &N,
    job_name: &str,
    map_task: usize,
    in_file: &Path,
    n_reduce: usize,
    mapper: &M,
    opts: &TaskOptions,
) -> Result<MapOutcome, TaskError>
where
    N: NameScheme + ?Sized,
    M: Mapper + ?Sized,
{
    let span = info_span!("map", job = job_name, task = map_task);
    let _guard = span.enter();

    let result = run_map(names, job_name, map_task, in_file, n_reduce, mapper, opts);
    match &result {
        Ok(MapOutcome::Empty) => info!("map function emitted nothing, no files written"),
        Ok(MapOutcome::Written(files)) => info!(files = files.len(), "map task completed"),
        Err(e) => error!(error = %e, written = e.written().len(), "map task aborted"),
    }
    result
}

fn run_map<N, M>(
    names: &N,
    job_name: &str,
    map_task: usize,
    in_file: &Path,
    n_reduce: usize,
    mapper: &M,
    opts: &TaskOptions,
) -> Result<MapOutcome, TaskError>
where
    N: NameScheme + ?Sized,
    M: Mapper + ?Sized,
{
    if n_reduce == 0 {
        return Err(TaskError::InvalidTaskCount { what: "n_reduce" });
    }

    debug!(input = %in_file.display(), "reading input");
    let contents = fs::read_to_string(in_file).map_err(|source| TaskError::InputRead {
        path: in_file.to_path_buf(),
        source,
    })?;

    debug!(bytes = contents.len(), "running map function");
    let filename = in_file.to_string_lossy();
    let records = mapper.map(&filename, &contents);
    if records.is_empty() {
        return Ok(MapOutcome::Empty);
    }

    // Group by bucket, keeping emission order inside each bucket.
    let total = records.len();
    let buckets = records
        .into_iter()
        .into_group_map_by(|kv| partition(kv.key(), n_reduce));
    debug!(records = total, buckets = buckets.len(), "partitioned map output");

    let mut files: Vec<BucketFile> = Vec::with_capacity(buckets.len());
    for (reduce_task, bucket) in buckets.into_iter().sorted_unstable_by_key(|(b, _)| *b) {
        let path = names.intermediate(job_name, map_task, reduce_task);
        let written = || files.iter().map(|f| f.path.clone()).collect::<Vec<_>>();

        let mut out = OutputFile::open(&path, opts.write_mode).map_err(|source| {
            TaskError::IntermediateOpen {
                path: path.clone(),
                written: written(),
                source,
            }
        })?;
        encode_records(&mut out, &bucket)
            .and_then(|()| out.flush().map_err(serde_json::Error::io))
            .map_err(|source| TaskError::IntermediateEncode {
                path: path.clone(),
                written: written(),
                source,
            })?;
        out.commit()
            .map_err(|source| TaskError::IntermediateCommit {
                path: path.clone(),
                written: written(),
                source,
            })?;

        debug!(file = %path.display(), records = bucket.len(), "intermediate file written");
        files.push(BucketFile {
            reduce_task,
            path,
            records: bucket.len(),
        });
    }

    Ok(MapOutcome::Written(files))
}

/// Runs reduce task `reduce_task` of `job_name`, writing to `out_file`.
///
/// Reads `names.intermediate(job_name, m, reduce_task)` for every map task
/// `m` in `0..n_map`, groups values by key in (map task, file position)
/// order, then calls `reducer` once per key in ascending byte order. The
/// output file is only opened once every input has been decoded.
pub fn perform_reduce<N, R>(
    names: &N,
    job_name: &str,
    reduce_task: usize,
    out_file: &Path,
    n_map: usize,
    reducer: &R,
    opts: &TaskOptions,
) -> Result<ReduceOutcome, TaskError>
where
    N: NameScheme + ?Sized,
    R: Reducer + ?Sized,
{
    let span = info_span!("reduce", job = job_name, task = reduce_task);
    let _guard = span.enter();

    let result = run_reduce(names, job_name, reduce_task, out_file, n_map, reducer, opts);
    match &result {
        Ok(outcome) => info!(
            output = %outcome.path.display(),
            keys = outcome.keys,
            "reduce task completed"
        ),
        Err(e) => error!(error = %e, "reduce task aborted"),
    }
    result
}

fn run_reduce<N, R>(
    names: &N,
    job_name: &str,
    reduce_task: usize,
    out_file: &Path,
    n_map: usize,
    reducer: &R,
    opts: &TaskOptions,
) -> Result<ReduceOutcome, TaskError>
where
    N: NameScheme + ?Sized,
    R: Reducer + ?Sized,
{
    if n_map == 0 {
        return Err(TaskError::InvalidTaskCount { what: "n_map" });
    }

    let mut groups: FnvHashMap<String, Vec<String>> = FnvHashMap::default();
    for map_task in 0..n_map {
        let path = names.intermediate(job_name, map_task, reduce_task);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => match opts.missing_inputs {
                MissingInputs::Skip => {
                    warn!(file = %path.display(), "intermediate file missing, skipping");
                    continue;
                }
                MissingInputs::Fail => {
                    return Err(TaskError::IntermediateMissing { path, source: e });
                }
            },
            Err(source) => {
                return Err(TaskError::IntermediateOpen {
                    path,
                    written: Vec::new(),
                    source,
                });
            }
        };

        let mut records = 0usize;
        for kv in RecordReader::new(BufReader::new(file)) {
            let KeyValue { key, value } = kv.map_err(|source| TaskError::IntermediateDecode {
                path: path.clone(),
                source,
            })?;
            groups.entry(key).or_default().push(value);
            records += 1;
        }
        debug!(file = %path.display(), records, "intermediate file read");
    }

    // Keys are distinct, so an unstable sort is still a total order.
    let groups = groups
        .into_iter()
        .sorted_unstable_by(|(a, _), (b, _)| a.cmp(b))
        .collect::<Vec<_>>();
    debug!(keys = groups.len(), "grouped intermediate records");

    let mut out = OutputFile::open(out_file, opts.write_mode).map_err(|source| {
        TaskError::OutputOpen {
            path: out_file.to_path_buf(),
            source,
        }
    })?;
    let keys = groups.len();
    for (key, values) in groups {
        let value = reducer.reduce(&key, &values);
        encode_record(&mut out, &KeyValue::new(key, value)).map_err(|source| {
            TaskError::OutputEncode {
                path: out_file.to_path_buf(),
                source,
            }
        })?;
    }
    out.flush().map_err(|e| TaskError::OutputEncode {
        path: out_file.to_path_buf(),
        source: serde_json::Error::io(e),
    })?;
    let path = out.commit().map_err(|source| TaskError::Commit {
        path: out_file.to_path_buf(),
        source,
    })?;

    Ok(ReduceOutcome { path, keys })
}

/// Merges the output of every reduce task of `job_name` into `out_file`.
///
/// Each line is `<key>: <value>`, sorted by key. The destination is always
/// replaced, never appended to. Returns the number of lines written.
pub fn merge<N>(
    names: &N,
    job_name: &str,
    n_reduce: usize,
    out_file: &Path,
) -> Result<usize, TaskError>
where
    N: NameScheme + ?Sized,
{
    let span = info_span!("merge", job = job_name);
    let _guard = span.enter();

    if n_reduce == 0 {
        return Err(TaskError::InvalidTaskCount { what: "n_reduce" });
    }

    let mut merged = BTreeMap::new();
    for reduce_task in 0..n_reduce {
        let path = names.reduce_output(job_name, reduce_task);
        debug!(file = %path.display(), "merging reduce output");
        let file = File::open(&path).map_err(|source| TaskError::InputRead {
            path: path.clone(),
            source,
        })?;
        for kv in RecordReader::new(BufReader::new(file)) {
            let KeyValue { key, value } = kv.map_err(|source| TaskError::OutputDecode {
                path: path.clone(),
                source,
            })?;
            merged.insert(key, value);
        }
    }

    let write_err = |source| TaskError::OutputWrite {
        path: out_file.to_path_buf(),
        source,
    };
    let mut out = OutputFile::open(out_file, WriteMode::Replace).map_err(|source| {
        TaskError::OutputOpen {
            path: out_file.to_path_buf(),
            source,
        }
    })?;
    for (key, value) in &merged {
        writeln!(out, "{key}: {value}").map_err(write_err)?;
    }
    out.flush().map_err(write_err)?;
    out.commit().map_err(|source| TaskError::Commit {
        path: out_file.to_path_buf(),
        source,
    })?;

    info!(output = %out_file.display(), keys = merged.len(), "merge completed");
    Ok(merged.len())
}
