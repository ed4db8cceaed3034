use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use survtd_data::{DatasetKind, SequenceData, SurvivalFrame};

/// Destination of a JSON document: a file, or stdout when no path is given.
pub struct JsonOutput {
    writer: Box<dyn Write>,
    name: String,
}

impl JsonOutput {
    pub fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self {
                writer: Box::new(io::stdout().lock()),
                name: "stdout".to_owned(),
            });
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self {
            writer: Box::new(BufWriter::new(file)),
            name: path.display().to_string(),
        })
    }

    /// Write `value` as pretty JSON followed by a newline.
    pub fn write<T>(mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut self.writer, value)
            .with_context(|| format!("Failed to write JSON to {}", self.name))?;
        writeln!(self.writer)
            .and_then(|()| self.writer.flush())
            .with_context(|| format!("Failed to flush output to {}", self.name))?;
        log::info!("wrote {}", self.name);
        Ok(())
    }
}

pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    JsonOutput::create(path)?.write(value)
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

/// Random source for one run, seeded from `seed` or from OS entropy.
pub fn seeded_rng(seed: Option<u64>) -> Pcg64 {
    let seed = seed.unwrap_or_else(rand::random);
    log::info!("random seed: {seed}");
    Pcg64::seed_from_u64(seed)
}

/// Read a survival CSV file and prepare its sequence datasets.
pub fn prepare_dataset(
    path: &Path,
    kind: DatasetKind,
    seq_len: usize,
    rng: &mut Pcg64,
) -> anyhow::Result<SequenceData> {
    let frame = SurvivalFrame::from_path(path)
        .with_context(|| format!("Failed to read dataset file: {}", path.display()))?;
    log::info!(
        "loaded {} rows with {} covariates from {}",
        frame.len(),
        frame.columns().len(),
        path.display()
    );
    let data = SequenceData::prepare(&frame, kind, seq_len, rng)
        .with_context(|| format!("Failed to prepare {} sequences", kind.name()))?;
    Ok(data)
}
