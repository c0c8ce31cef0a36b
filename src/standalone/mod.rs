use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub mod engine;

/// How executors open the files they produce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum WriteMode {
    /// Create the file if absent, append if present. Re-running a task
    /// against an existing file duplicates its records.
    #[default]
    Append,
    /// Write to a staging file and rename it over the destination once
    /// every record is written. Re-running a task is idempotent.
    Replace,
}

/// What a reduce task does when a map task left no file for its bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum MissingInputs {
    /// Abort the task.
    #[default]
    Fail,
    /// Treat the file as empty.
    Skip,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskOptions {
    pub write_mode: WriteMode,
    pub missing_inputs: MissingInputs,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,

    /// Directory holding intermediate and output files
    #[arg(short, long, global = true, default_value = ".")]
    pub dir: PathBuf,

    /// How produced files are opened
    #[arg(long, global = true, value_enum, default_value_t = WriteMode::Append)]
    pub write_mode: WriteMode,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one map task over a single input file
    Map {
        /// Name of the job
        #[arg(short, long)]
        job: String,

        /// Index of this map task
        #[arg(short, long)]
        task: usize,

        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Number of reduce tasks
        #[arg(short = 'r', long)]
        n_reduce: usize,

        /// Name of the workload
        #[arg(short, long)]
        workload: String,

        /// Auxiliary arguments to pass to the MapReduce application.
        #[clap(value_parser, last = true)]
        args: Vec<String>,
    },
    /// Run one reduce task over every map task's file for its bucket
    Reduce {
        /// Name of the job
        #[arg(short, long)]
        job: String,

        /// Index of this reduce task
        #[arg(short, long)]
        task: usize,

        /// Number of map tasks
        #[arg(short = 'm', long)]
        n_map: usize,

        /// Name of the workload
        #[arg(short, long)]
        workload: String,

        /// Output file (defaults to mrtmp.<job>-res-<task> in --dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// What to do when a map task left no file for this bucket
        #[arg(long, value_enum, default_value_t = MissingInputs::Fail)]
        missing: MissingInputs,

        /// Auxiliary arguments to pass to the MapReduce application.
        #[clap(value_parser, last = true)]
        args: Vec<String>,
    },
    /// Merge every reduce task's output into one sorted text file
    Merge {
        /// Name of the job
        #[arg(short, long)]
        job: String,

        /// Number of reduce tasks
        #[arg(short = 'r', long)]
        n_reduce: usize,

        /// Output file (defaults to mrtmp.<job> in --dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
