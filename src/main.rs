use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use hardpoint_io::{
    DEFAULT_MAPS, DEFAULT_MODE, ExperimentName, FEATURE_NAMES, FeatureExtractor, RecordFilter,
    RecordReader, ResultWriter,
};
use hardpoint_tree::{
    ClassWeights, DEFAULT_DEPTHS, DEFAULT_MAX_DEPTH, DecisionTree, DepthSweep, HoldoutSplit,
    Outcome, PipelineConfig, Prediction,
};

#[derive(Parser)]
#[command(name = "hardpoint")]
#[command(about = "Predict ranked Hardpoint match outcomes with a weighted decision tree")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for the train/test split
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for the depth sweep (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Which rows count as training data.
#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// Game mode to keep
    #[arg(long, default_value = DEFAULT_MODE)]
    mode: String,

    /// Comma-separated map pool to keep
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_MAPS.map(String::from))]
    maps: Vec<String>,
}

/// Learner and evaluation parameters.
#[derive(Args, Debug, Clone)]
struct TrainingArgs {
    /// Maximum depth of the primary model
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, allow_negative_numbers = true)]
    max_depth: i64,

    /// Comma-separated depths for the depth sweep
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_DEPTHS)]
    depths: Vec<i64>,

    /// Fraction of rows held out for testing, in (0, 1)
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f64,

    /// Class weight for losses
    #[arg(long, default_value_t = 1.0)]
    loss_weight: f64,

    /// Class weight for wins
    #[arg(long, default_value_t = 2.0)]
    win_weight: f64,
}

#[derive(Subcommand)]
enum Command {
    /// Train a model, evaluate it on a holdout set, and export statistics
    ///
    /// Writes {experiment}_model.bin and {experiment}_model_stats.json into
    /// the output directory.
    Train {
        /// Path to the match export CSV
        #[arg(long)]
        data: PathBuf,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Also write the report as an unprefixed model_stats.json, the
        /// name the match dashboard loads
        #[arg(long)]
        dashboard: bool,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        training: TrainingArgs,
    },

    /// Predict outcomes for rows of a CSV with a trained model
    Predict {
        /// Path to the trained model binary
        #[arg(long)]
        model: PathBuf,

        /// Path to the CSV with rows to predict
        #[arg(long)]
        data: PathBuf,

        /// Experiment name for output files
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct TrainOutput {
    experiment: String,
    n_records: usize,
    n_samples: usize,
    excluded: usize,
    accuracy: f64,
    tree_depth: usize,
    leaf_nodes: usize,
    true_negatives: usize,
    false_positives: usize,
    false_negatives: usize,
    true_positives: usize,
    best_depth: Option<i64>,
    best_accuracy: Option<f64>,
    top_features: Vec<FeatureOutput>,
    model_path: PathBuf,
    report_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    dashboard_path: Option<PathBuf>,
}

#[derive(Serialize)]
struct FeatureOutput {
    name: String,
    importance: f64,
}

#[derive(Serialize)]
struct PredictOutput {
    experiment: String,
    n_rows: usize,
    n_predicted: usize,
    skipped: usize,
    predicted_wins: usize,
    predicted_losses: usize,
    predictions_path: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Train {
            data,
            experiment,
            output_dir,
            dashboard,
            filter,
            training,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            // 1. Read and extract
            let records = RecordReader::new(&data)
                .read()
                .context("failed to read match CSV")?;
            let extractor = FeatureExtractor::new(
                RecordFilter::new()
                    .with_mode(filter.mode)
                    .with_maps(filter.maps),
            );
            let (dataset, summary) = extractor
                .build_dataset(&records)
                .context("failed to build dataset")?;

            // 2. Configure and run the pipeline
            let class_weights = ClassWeights::new(training.loss_weight, training.win_weight)?;
            let holdout = HoldoutSplit::new(training.test_fraction)?.with_seed(cli.seed);
            let config = PipelineConfig::new()
                .with_max_depth(training.max_depth)
                .with_class_weights(class_weights)
                .with_holdout(holdout)
                .with_sweep(DepthSweep::new(training.depths)?);
            let outcome = config.run(&dataset).context("training failed")?;

            // 3. Save model and report
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let model_path = writer.model_path();
            outcome
                .model
                .save(&model_path)
                .context("failed to save model")?;
            let report_path = writer.write_report(&outcome.report)?;
            let dashboard_path = if dashboard {
                Some(writer.write_dashboard_report(&outcome.report)?)
            } else {
                None
            };

            // 4. Print summary
            let report = &outcome.report;
            let output = TrainOutput {
                experiment,
                n_records: summary.total,
                n_samples: summary.kept,
                excluded: summary.excluded,
                accuracy: report.model_info.accuracy,
                tree_depth: report.model_info.tree_depth,
                leaf_nodes: report.model_info.leaf_nodes,
                true_negatives: report.confusion_matrix.true_negatives,
                false_positives: report.confusion_matrix.false_positives,
                false_negatives: report.confusion_matrix.false_negatives,
                true_positives: report.confusion_matrix.true_positives,
                best_depth: report.depth_analysis.best_depth,
                best_accuracy: report.depth_analysis.best_accuracy,
                top_features: report
                    .feature_importance
                    .features
                    .iter()
                    .take(3)
                    .map(|f| FeatureOutput {
                        name: f.name.clone(),
                        importance: f.importance,
                    })
                    .collect(),
                model_path,
                report_path,
                dashboard_path,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Predict {
            model,
            data,
            experiment,
            output_dir,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            // 1. Load model
            let tree = DecisionTree::load(&model).context("failed to load model")?;
            anyhow::ensure!(
                tree.feature_names().iter().map(String::as_str).eq(FEATURE_NAMES),
                "model features {:?} do not match the match feature layout",
                tree.feature_names()
            );
            info!(depth = tree.depth(), leaves = tree.n_leaves(), "model loaded");

            // 2. Read rows and extract features
            let records = RecordReader::unlabeled(&data)
                .read()
                .context("failed to read CSV")?;
            let rows = FeatureExtractor::default().extract_unlabeled(&records);

            // 3. Predict
            let predictions = rows
                .features
                .iter()
                .map(|v| tree.predict_with_confidence(v))
                .collect::<Result<Vec<Prediction>, _>>()
                .context("prediction failed")?;

            // 4. Write predictions JSON
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let predictions_path = writer.write_predictions(&rows, &predictions)?;

            // 5. Print summary
            let wins = predictions
                .iter()
                .filter(|p| p.outcome == Outcome::Win)
                .count();
            let output = PredictOutput {
                experiment,
                n_rows: rows.summary.total,
                n_predicted: predictions.len(),
                skipped: rows.summary.excluded,
                predicted_wins: wins,
                predicted_losses: predictions.len() - wins,
                predictions_path,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
