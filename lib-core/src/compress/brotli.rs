use std::io;

use ::brotli::enc::BrotliEncoderParams;

use crate::cfg::{acfg, ConfigHolder};

acfg!(
    /// A Brotli compressor that accepts [`BrotliConfig`].
    CompressorBrotli: BrotliConfig
);

impl ConfigHolder<CompressorBrotli> {
    pub(super) fn compress(&self, mut b: &[u8], vout: &mut Vec<u8>) -> io::Result<()> {
        let params = BrotliEncoderParams {
            quality: i32::from(self.quality.min(11)),
            lgwin: i32::from(self.lgwin.clamp(10, 24)),
            ..BrotliEncoderParams::default()
        };
        ::brotli::BrotliCompress(&mut b, vout, &params)?;
        Ok(())
    }
}

/// Configuration for the Brotli compressor
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BrotliConfig {
    /// Compression quality (0-11). Defaults to 11.
    pub quality: u8,
    /// Base-2 logarithm of the sliding window size (10-24). Defaults to 22.
    pub lgwin: u8
}
impl Default for BrotliConfig {
    fn default() -> Self {
        Self { quality: 11, lgwin: 22 }
    }
}

#[cfg(test)]
mod tests {
    use crate::{cfg::ConfigMap, compress::Encoding};

    #[test]
    fn roundtrip_and_deterministic() {
        let data = "a{color:red}".repeat(40);
        let cm = ConfigMap::default();
        let (mut a, mut b) = (Vec::new(), Vec::new());
        Encoding::Brotli.compress(&cm, data.as_bytes(), &mut a).unwrap();
        Encoding::Brotli.compress(&cm, data.as_bytes(), &mut b).unwrap();
        assert_eq!(a, b);
        assert!(a.len() < data.len());
        let mut dec = Vec::new();
        ::brotli::BrotliDecompress(&mut &a[..], &mut dec).unwrap();
        assert_eq!(dec, data.as_bytes());
    }
}
