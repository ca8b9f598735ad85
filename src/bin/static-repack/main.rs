use std::{fs, io, path::Path, thread::{self, JoinHandle}, time::Instant};

use clap::Parser;
use crossbeam_channel::Sender;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use static_repack_core::{
    asset::fs::FsAssetProvider,
    errors::AssetWarning,
    pipeline::{CancelFlag, Pipeline, RunReport},
    storage::fs::FsStorage,
    ProgressState,
};

mod cli_args;
mod config;
mod report;

fn main() -> anyhow::Result<()> {
    let args = cli_args::Args::parse();
    match args.cmd {
        cli_args::Cmd::Run(ra) => {
            init_logging(ra.common.verbose);
            println!("█▀ ▀█▀ ▄▀█ ▀█▀ █ █▀▀ ▄▄ █▀█ █▀▀ █▀█ ▄▀█ █▀▀ █▄▀\n▄█  █  █▀█  █  █ █▄▄    █▀▄ ██▄ █▀▀ █▀█ █▄▄ █ █\n");
            let dt = Instant::now();
            let r = process_task(&ra)?;
            let (old, new) = r.assets.iter().fold((0, 0), |(o, n), a| (o + a.raw_size, n + a.written.first().map_or(0, |w| w.size)));
            println!(
                "Processed {} assets ({} unchanged), {} compressed files written, {} saved by minifying",
                r.processed, r.reused, r.artifacts_written, HumanBytes(old.saturating_sub(new) as u64)
            );
            println!("Done in: {:.3?}", dt.elapsed());
        }
        cli_args::Cmd::Check(common) => {
            init_logging(common.verbose);
            if config::check(common.config)? {
                println!("Config is valid");
            } else {
                println!("Config not found, a default one was created");
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

const PB_STYLE: &str = "# {pos}/{len} {wide_msg}";

fn file_progress_bar() -> ProgressBar {
    ProgressBar::new(0).with_style(
        ProgressStyle::with_template(PB_STYLE).unwrap_or_else(|_| ProgressStyle::default_bar())
    )
}

fn process_task(ra: &cli_args::RunArgs) -> anyhow::Result<RunReport> {
    let opts = cli_args::RunOpts::from_args(ra);
    if !ra.path.is_dir() {
        anyhow::bail!("{}: not a directory", ra.path.display());
    }
    fs::create_dir_all(&ra.out)?;
    if overlaps(&ra.path, &ra.out)? {
        anyhow::bail!("the destination directory cannot be the same as (or inside) the source");
    }

    let cancel = CancelFlag::new();
    let cf = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("Cancelling, the manifest will not be saved...");
        cf.cancel();
    })?;

    let manifest_name = opts.cfg.manifest_name.clone();
    let (pj, ps) = thread_progress_bar(file_progress_bar());
    let pipeline = Pipeline::new(opts.cfg, opts.cfgmap)
        .with_progress(ps)
        .with_cancel(cancel)
        .silent(opts.silent);
    debug!(settings = %pipeline.settings(), "pipeline ready");

    let provider = FsAssetProvider::new(ra.path.as_path()).exclude(manifest_name);
    let storage = FsStorage::new(ra.out.as_path());
    let result = pipeline.run(provider, &storage);
    drop(pipeline);
    pj.join().map_err(|_| anyhow::anyhow!("progress thread failed"))?;

    let r = match result {
        Ok(r) => r,
        Err(e) => {
            error!("run failed: {e}");
            return Err(e.into())
        }
    };
    print_warnings(&r.warnings);
    if let Some(p) = &ra.report {
        let mut rep = report::Report::new(p.clone().into_boxed_path());
        for a in &r.assets {
            rep.push_asset(a);
        }
        rep.save_csv()?;
    }
    Ok(r)
}

fn overlaps(src: &Path, out: &Path) -> io::Result<bool> {
    Ok(fs::canonicalize(out)?.starts_with(fs::canonicalize(src)?))
}

fn thread_progress_bar(pb: ProgressBar) -> (JoinHandle<()>, Sender<ProgressState>) {
    let (ps, pr) = crossbeam_channel::unbounded();
    let pj = thread::spawn(move || {
        use ProgressState::*;
        for st in pr {
            match st {
                Start(u) => { pb.set_length(u as u64); }
                Push(num, msg) => {
                    pb.set_position(num as u64 + 1);
                    pb.set_message(msg.to_string());
                }
                Finish => {
                    pb.finish_with_message("Saving manifest...");
                }
            }
        }
    });
    (pj, ps)
}

fn print_warnings(v: &[AssetWarning]) {
    if !v.is_empty() {
        eprintln!("Warnings found in assets:");
        for w in v {
            eprintln!(" # {w}");
        }
    }
}
