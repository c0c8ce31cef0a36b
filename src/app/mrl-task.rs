use anyhow::{Context, Result};
use clap::Parser;
use mrlite::names::{DefaultNames, NameScheme};
use mrlite::standalone::engine::{merge, perform_map, perform_reduce, MapOutcome};
use mrlite::standalone::{Args, Commands, TaskOptions};
use mrlite::workload;
use tracing::debug;

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(verbose >= 2)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    debug!(?args, "parsed arguments");

    let names = DefaultNames::new(&args.dir);
    let mut opts = TaskOptions {
        write_mode: args.write_mode,
        ..TaskOptions::default()
    };

    match args.command {
        Commands::Map {
            job,
            task,
            input,
            n_reduce,
            workload,
            args,
        } => {
            let app = workload::named(&workload, &args)?;
            let outcome = perform_map(&names, &job, task, &input, n_reduce, &*app.mapper, &opts)
                .with_context(|| format!("map task {task} of job `{job}` failed"))?;
            if let MapOutcome::Written(files) = outcome {
                for file in files {
                    println!("{}", file.path.display());
                }
            }
        }
        Commands::Reduce {
            job,
            task,
            n_map,
            workload,
            output,
            missing,
            args,
        } => {
            let app = workload::named(&workload, &args)?;
            opts.missing_inputs = missing;
            let output = output.unwrap_or_else(|| names.reduce_output(&job, task));
            let outcome = perform_reduce(&names, &job, task, &output, n_map, &*app.reducer, &opts)
                .with_context(|| format!("reduce task {task} of job `{job}` failed"))?;
            println!("{}", outcome.path.display());
        }
        Commands::Merge {
            job,
            n_reduce,
            output,
        } => {
            let output = output.unwrap_or_else(|| names.merged_output(&job));
            merge(&names, &job, n_reduce, &output)
                .with_context(|| format!("merging job `{job}` failed"))?;
            println!("{}", output.display());
        }
    }

    Ok(())
}
