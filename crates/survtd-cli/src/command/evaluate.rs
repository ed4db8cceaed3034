use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use survtd_data::DatasetKind;
use survtd_evaluator::{
    EvaluationOptions, EvaluationReport, Evaluator, KaplanMeierModel, ModelConfig, SurvivalModel,
};

use crate::util;

const DEFAULT_SEQ_LEN: usize = 20;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Survival CSV file with `x*`, `duration` and `event` columns
    input: PathBuf,
    /// Covariate layout of the file (support, metabric, gbsg)
    #[arg(long)]
    dataset: DatasetKind,
    /// Random seed of the split and of bootstrap resampling
    #[arg(long)]
    seed: Option<u64>,
    /// Confidence level; enables bootstrap intervals
    #[arg(long)]
    confidence: Option<f64>,
    /// Number of bootstrap resamples
    #[arg(long)]
    nb_bootstrap: Option<usize>,
    /// Worker threads for bootstrap resamples
    #[arg(long)]
    threads: Option<usize>,
    /// Prediction batch size
    #[arg(long)]
    batch_size: Option<usize>,
    /// Interpolate survival curves with this many steps per grid interval
    #[arg(long)]
    interpolate: Option<usize>,
    /// JSON settings file; command line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Contents of the `--config` settings file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct EvaluateSettings {
    #[serde(flatten)]
    options: EvaluationOptions,
    seed: Option<u64>,
    seq_len: Option<usize>,
    interpolate: Option<usize>,
}

impl EvaluateSettings {
    fn load(arg: &EvaluateArg) -> anyhow::Result<Self> {
        let mut settings: Self = match &arg.config {
            Some(path) => util::read_json_file("settings", path)?,
            None => Self::default(),
        };
        let options = &mut settings.options;
        if arg.confidence.is_some() {
            options.confidence = arg.confidence;
        }
        if let Some(nb_bootstrap) = arg.nb_bootstrap {
            options.nb_bootstrap = nb_bootstrap;
        }
        if let Some(threads) = arg.threads {
            options.threads = threads;
        }
        if arg.batch_size.is_some() {
            options.batch_size = arg.batch_size;
        }
        settings.seed = arg.seed.or(settings.seed);
        settings.interpolate = arg.interpolate.or(settings.interpolate);
        Ok(settings)
    }
}

#[derive(Debug, Serialize)]
struct EvaluationOutput<'a> {
    dataset: &'static str,
    model: &'static str,
    config: &'a ModelConfig,
    options: &'a EvaluationOptions,
    interpolate: Option<usize>,
    report: EvaluationReport,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let settings = EvaluateSettings::load(arg)?;
    let mut rng = util::seeded_rng(settings.seed);
    let seq_len = settings.seq_len.unwrap_or(DEFAULT_SEQ_LEN);
    let data = util::prepare_dataset(&arg.input, arg.dataset, seq_len, &mut rng)?;

    let config = data.test.model_config()?;
    let train_labels = data.train.labels();
    let test_set = data.test.test_set()?;
    log::info!(
        "evaluating on {} test subjects at horizons {:?}",
        test_set.len(),
        config.horizons
    );

    let model = KaplanMeierModel::<Vec<f64>>::fit(config.clone(), train_labels)
        .context("Failed to fit the Kaplan-Meier baseline")?;
    let evaluator =
        Evaluator::new(&config, train_labels).context("Failed to build the evaluator")?;
    let report = match settings.interpolate {
        Some(resolution) => {
            let model = model.interpolate(resolution);
            evaluator.eval(&model, &test_set, &settings.options, &mut rng)
        }
        None => evaluator.eval(&model, &test_set, &settings.options, &mut rng),
    }
    .context("Evaluation failed")?;

    let output = EvaluationOutput {
        dataset: arg.dataset.name(),
        model: "kaplan-meier",
        config: &config,
        options: &settings.options,
        interpolate: settings.interpolate,
        report,
    };
    util::save_json(&output, arg.output.as_deref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        arg: EvaluateArg,
    }

    fn parse(args: &[&str]) -> EvaluateArg {
        Cli::parse_from(["survtd", "data.csv", "--dataset", "gbsg"].iter().chain(args)).arg
    }

    #[test]
    fn test_defaults_without_settings_file() {
        let settings = EvaluateSettings::load(&parse(&[])).unwrap();
        assert_eq!(settings.options, EvaluationOptions::default());
        assert_eq!(settings.seed, None);
        assert_eq!(settings.interpolate, None);
    }

    #[test]
    fn test_flags_override_settings_file() {
        let path =
            std::env::temp_dir().join(format!("survtd-settings-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{"confidence": 0.9, "threads": 4, "nb_bootstrap": 50, "seed": 7, "interpolate": 2}"#,
        )
        .unwrap();
        let config = path.to_str().unwrap();
        let arg = parse(&["--config", config, "--threads", "2", "--interpolate", "10"]);
        let settings = EvaluateSettings::load(&arg).unwrap();
        fs::remove_file(Path::new(config)).unwrap();

        assert_eq!(settings.options.confidence, Some(0.9));
        assert_eq!(settings.options.nb_bootstrap, 50);
        assert_eq!(settings.options.threads, 2);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.interpolate, Some(10));
        assert_eq!(arg.dataset, DatasetKind::Gbsg);
    }
}
