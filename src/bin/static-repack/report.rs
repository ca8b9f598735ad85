use std::{fs, io, path::Path, sync::Arc};

use static_repack_core::{compress::Encoding, pipeline::AssetSummary};

/// A stored output of an asset.
struct Row {
    asset: Arc<str>,
    output: Box<str>,
    encoding: &'static str,
    raw_size: usize,
    size: usize,
}

/// Sizes of every output written in a run, saved as CSV.
pub struct Report {
    path: Box<Path>,
    rows: Vec<Row>,
}
impl Report {
    pub const fn new(path: Box<Path>) -> Self {
        Self { path, rows: Vec::new() }
    }

    /// Adds a row for each output written for the asset. Reused assets add nothing.
    pub fn push_asset(&mut self, a: &AssetSummary) {
        self.rows.extend(a.written.iter().map(|w| Row {
            asset: a.name.clone(),
            output: w.name.clone(),
            encoding: w.encoding.map_or("identity", Encoding::id),
            raw_size: a.raw_size,
            size: w.size,
        }));
    }

    pub fn save_csv(&self) -> io::Result<()> {
        use io::Write;
        fn write_impl(w: &mut io::BufWriter<fs::File>, rows: &[Row]) -> io::Result<()> {
            writeln!(w, "asset,output,encoding,raw_size,size")?;
            for r in rows {
                writeln!(w, "{},{},{},{},{}", r.asset, r.output, r.encoding, r.raw_size, r.size)?;
            }
            w.flush()
        }
        let mut w = io::BufWriter::new(fs::File::create(&self.path)?);
        if let Err(e) = write_impl(&mut w, &self.rows) {
            drop(w);
            fs::remove_file(&self.path)?;
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use static_repack_core::pipeline::ArtifactSummary;

    use super::*;

    #[test]
    fn one_row_per_written_output() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("report.csv");
        let mut r = Report::new(p.clone().into_boxed_path());
        r.push_asset(&AssetSummary {
            name: "css/app.css".into(),
            hashed_name: "css/app.abc.css".into(),
            token: "abc".into(),
            raw_size: 23,
            written: vec![
                ArtifactSummary { encoding: None, name: "css/app.abc.css".into(), size: 15 },
                ArtifactSummary { encoding: Some(Encoding::Brotli), name: "css/app.abc.css.br".into(), size: 12 },
            ],
            skipped: vec![Encoding::Gzip],
            reused: false,
        });
        r.push_asset(&AssetSummary {
            name: "robots.txt".into(),
            hashed_name: "robots.def.txt".into(),
            token: "def".into(),
            raw_size: 40,
            written: Vec::new(),
            skipped: Vec::new(),
            reused: true,
        });
        r.save_csv().unwrap();
        assert_eq!(
            fs::read_to_string(p).unwrap(),
            "asset,output,encoding,raw_size,size\n\
             css/app.css,css/app.abc.css,identity,23,15\n\
             css/app.css,css/app.abc.css.br,br,23,12\n"
        );
    }
}
