use std::path::PathBuf;

use serde::Serialize;
use survtd_data::{DatasetKind, Phase, SequenceDataset, SequenceItem};
use survtd_evaluator::ModelConfig;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PrepareSequencesArg {
    /// Survival CSV file with `x*`, `duration` and `event` columns
    input: PathBuf,
    /// Covariate layout of the file (support, metabric, gbsg)
    #[arg(long)]
    dataset: DatasetKind,
    /// Steps per sequence; 3 selects the event-quantile grid
    #[arg(long, default_value_t = 20)]
    seq_len: usize,
    /// Partition to write (train, val, test)
    #[arg(long, default_value_t = Phase::Train)]
    phase: Phase,
    /// Random seed of the train/val/test split
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SequenceDump<'a> {
    dataset: &'static str,
    phase: Phase,
    len: usize,
    seq_len: usize,
    n_features: usize,
    n_embeddings: Vec<usize>,
    columns: &'a [String],
    cuts: &'a [f64],
    taus: &'a [f64],
    config: ModelConfig,
    items: Vec<SequenceItem>,
}

impl<'a> SequenceDump<'a> {
    fn new(kind: DatasetKind, dataset: &'a SequenceDataset) -> anyhow::Result<Self> {
        Ok(Self {
            dataset: kind.name(),
            phase: dataset.phase(),
            len: dataset.len(),
            seq_len: dataset.seq_len(),
            n_features: dataset.n_features(),
            n_embeddings: dataset.n_embeddings(),
            columns: dataset.columns(),
            cuts: dataset.cuts(),
            taus: dataset.taus(),
            config: dataset.model_config()?,
            items: dataset.items().collect(),
        })
    }
}

pub(crate) fn run(arg: &PrepareSequencesArg) -> anyhow::Result<()> {
    let PrepareSequencesArg {
        input,
        dataset,
        seq_len,
        phase,
        seed,
        output,
    } = arg;

    let mut rng = util::seeded_rng(*seed);
    let data = util::prepare_dataset(input, *dataset, *seq_len, &mut rng)?;
    let part = data.phase(*phase);
    log::info!("writing {} {phase} sequences", part.len());

    util::save_json(&SequenceDump::new(*dataset, part)?, output.as_deref())?;
    Ok(())
}
