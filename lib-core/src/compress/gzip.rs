use std::io::{self, Write};

use crate::cfg::{acfg, ConfigHolder};

acfg!(
    /// A GZip compressor that accepts [`GzipConfig`].
    CompressorGzip: GzipConfig
);

impl ConfigHolder<CompressorGzip> {
    pub(super) fn compress(&self, b: &[u8], vout: &mut Vec<u8>) -> io::Result<()> {
        #[cfg(feature = "zopfli")]
        if let Some(ic) = self.use_zopfli.iter_count() {
            return compress_with_zopfli(b, vout, ic.get().into());
        }

        let mut enc = flate2::write::GzEncoder::new(vout, flate2::Compression::new(self.level.min(9)));
        enc.write_all(b)?;
        enc.finish()?;
        Ok(())
    }
}

#[cfg(feature = "zopfli")]
fn compress_with_zopfli(b: &[u8], vout: &mut Vec<u8>, ic: u64) -> io::Result<()> {
    use std::num::NonZeroU64;
    let zo = zopfli::Options {
        iteration_count: NonZeroU64::new(ic).unwrap_or(NonZeroU64::MIN),
        iterations_without_improvement: NonZeroU64::new(6).unwrap_or(NonZeroU64::MIN),
        ..<zopfli::Options as Default>::default()
    };
    let mut enc = zopfli::GzipEncoder::new(zo, zopfli::BlockType::Dynamic, vout)?;
    enc.write_all(b)?;
    enc.finish()?;
    Ok(())
}

/// Configuration for the GZip compressor
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GzipConfig {
    /// Compression level (0-9). Defaults to 9.
    pub level: u32,
    #[cfg(feature = "zopfli")]
    /// Enables Zopfli compression (better, but slower)
    pub use_zopfli: crate::cfg::CfgZopfli
}
impl Default for GzipConfig {
    fn default() -> Self {
        Self { level: 9, #[cfg(feature = "zopfli")] use_zopfli: crate::cfg::CfgZopfli::default() }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use crate::{cfg::ConfigMap, compress::Encoding};

    const DATA: &[u8] = b"body{color:red}body{color:red}body{color:red}body{color:red}";

    #[test]
    fn roundtrip_and_deterministic() {
        let cm = ConfigMap::default();
        let (mut a, mut b) = (Vec::new(), Vec::new());
        Encoding::Gzip.compress(&cm, DATA, &mut a).unwrap();
        Encoding::Gzip.compress(&cm, DATA, &mut b).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[..2], &[0x1f, 0x8b]);
        let mut dec = Vec::new();
        flate2::read::GzDecoder::new(&a[..]).read_to_end(&mut dec).unwrap();
        assert_eq!(dec, DATA);
    }

    #[cfg(feature = "zopfli")]
    #[test]
    fn zopfli_output_is_gzip() {
        let cm = ConfigMap::default();
        cm.set::<super::CompressorGzip>(super::GzipConfig { level: 9, use_zopfli: crate::cfg::CfgZopfli::Iter(2) });
        let mut out = Vec::new();
        Encoding::Gzip.compress(&cm, DATA, &mut out).unwrap();
        let mut dec = Vec::new();
        flate2::read::GzDecoder::new(&out[..]).read_to_end(&mut dec).unwrap();
        assert_eq!(dec, DATA);
    }
}
