use std::{num::NonZeroU8, path::PathBuf};

use static_repack_core::{cfg::{CfgZopfli, ConfigMap}, compress::{self, Encoding}, min, pipeline::PipelineConfig};
use tracing::{info, warn};

use crate::config;


#[derive(Debug, clap::Parser)]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Cmd
}


#[derive(Debug, clap::Subcommand)]
pub enum Cmd {
    /// Minify, fingerprint and precompress static assets
    Run(RunArgs),

    /// Check the config file (a default one is created if it does not exist)
    Check(CommonArgs)
}

#[derive(Debug, clap::Args)]
pub struct RunArgs {
    /// Path to a directory of static assets
    pub path: PathBuf,

    /// Destination directory. It should not be the same as the source!
    #[arg(short = 'o', long)]
    pub out: PathBuf,

    /// Ignore the previous manifest and process every asset again
    #[arg(long)]
    pub rebuild: bool,

    /// Do not minify any asset
    #[arg(long)]
    pub no_minify: bool,

    /// Do not point `url(...)` and `@import` references of style sheets to hashed names
    #[arg(long)]
    pub keep_references: bool,

    /// Encodings to produce, separated by commas (gzip, br)
    #[arg(short = 'e', long, value_delimiter = ',')]
    pub encodings: Option<Vec<Encoding>>,

    /// Number of worker threads (0 uses one per CPU)
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Enable Zopfli compression for GZip (better, but much slower) and apply a number of iterations
    #[arg(short = 'z', long)]
    pub zopfli: Option<NonZeroU8>,

    /// (Optional) Save sizes of processed assets to a CSV file
    #[arg(long)]
    pub report: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs
}

#[derive(Debug, clap::Args)]
pub struct CommonArgs {
    /// Do not print asset warnings
    #[arg(long)]
    pub silent: bool,

    /// Print more details about the run (overridden by `RUST_LOG`)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// (Optional) Use custom .toml config file. If no path is provided, it will use `static-repack.toml`
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>
}

pub struct RunOpts {
    pub silent: bool,
    pub cfg: PipelineConfig,
    pub cfgmap: ConfigMap
}
impl RunOpts {
    pub fn from_args(args: &RunArgs) -> Self {
        let cfgmap = ConfigMap::default();
        let mut cfg = PipelineConfig::default();
        match config::read_config(args.common.config.clone()) {
            Ok(c) => {
                if let Some(x) = c.pipeline {
                    cfg = x;
                }
                if let Some(x) = c.css {
                    cfgmap.set::<min::css::MinifierCSS>(x);
                }
                if let Some(x) = c.js {
                    cfgmap.set::<min::js::MinifierJS>(x);
                }
                if let Some(x) = c.json {
                    cfgmap.set::<min::json::MinifierJSON>(x);
                }
                if let Some(x) = c.brotli {
                    cfgmap.set::<compress::brotli::CompressorBrotli>(x);
                }
                if let Some(mut x) = c.gzip {
                    if let Some(z) = args.zopfli {
                        x.use_zopfli = CfgZopfli::Iter(z.get());
                    }
                    cfgmap.set::<compress::gzip::CompressorGzip>(x);
                } else if let Some(z) = args.zopfli {
                    set_zopfli(&cfgmap, z);
                }
                info!("config loaded successfully");
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("failed to read config: {e}");
                }
                if let Some(z) = args.zopfli {
                    set_zopfli(&cfgmap, z);
                }
            }
        }
        if args.rebuild {
            cfg.rebuild = true;
        }
        if args.no_minify {
            cfg.minify_css = false;
            cfg.minify_js = false;
            cfg.minify_json = false;
        }
        if args.keep_references {
            cfg.rewrite_css_references = false;
        }
        if let Some(v) = &args.encodings {
            cfg.encodings = v.iter().copied().collect();
        }
        if let Some(j) = args.jobs {
            cfg.concurrency = j;
        }
        Self { silent: args.common.silent, cfg, cfgmap }
    }
}

fn set_zopfli(cfgmap: &ConfigMap, z: NonZeroU8) {
    cfgmap.set::<compress::gzip::CompressorGzip>(compress::gzip::GzipConfig {
        use_zopfli: CfgZopfli::Iter(z.get()),
        ..Default::default()
    });
}
