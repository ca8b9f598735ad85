use std::{fs, io, path::PathBuf};

use static_repack_core::{compress, min, pipeline::PipelineConfig};

pub const DEFAULT_CONFIG_NAME: &str = "static-repack.toml";

#[derive(serde::Deserialize, serde::Serialize)]
pub struct Config {
    pub pipeline: Option<PipelineConfig>,
    pub css: Option<min::css::CSSConfig>,
    pub js: Option<min::js::JSConfig>,
    pub json: Option<min::json::JSONConfig>,
    pub gzip: Option<compress::gzip::GzipConfig>,
    pub brotli: Option<compress::brotli::BrotliConfig>
}
impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: Some(PipelineConfig::default()),
            css: Some(min::css::CSSConfig::default()),
            js: Some(min::js::JSConfig::default()),
            json: Some(min::json::JSONConfig::default()),
            gzip: Some(compress::gzip::GzipConfig::default()),
            brotli: Some(compress::brotli::BrotliConfig::default())
        }
    }
}

fn path_to_config(path: Option<PathBuf>) -> io::Result<PathBuf> {
    match path {
        Some(p) => {
            let meta = fs::metadata(&p)?;
            Ok(if meta.is_dir() {
                p.join(DEFAULT_CONFIG_NAME)
            } else {
                p
            })
        }
        None => Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
    }
}

pub fn read_config(path: Option<PathBuf>) -> io::Result<Config> {
    let path = path_to_config(path)?;
    let f = fs::read_to_string(path)?;
    toml::from_str(&f).map_err(io::Error::other)
}

/// Checks if the config file is valid. If it does not exist, a default one is written and `false` is returned.
pub fn check(path: Option<PathBuf>) -> anyhow::Result<bool> {
    let path = path_to_config(path)?;
    let f = match fs::read_to_string(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let s = toml::to_string(&Config::default())?;
            fs::write(path, s)?;
            return Ok(false);
        }
        Err(e) => return Err(e.into())
    };
    toml::from_str::<Config>(&f)?;
    Ok(true)
}
