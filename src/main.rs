//! Motion ML - Activity classification from multi-sensor recordings
//!
//! `train` builds a labeled dataset from a recording directory tree and
//! evaluates a classifier on it; `merge` aligns a single recording and
//! optionally writes the merged table to CSV.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use motion_ml::data::{DatasetBuilder, SensorMerger, SensorSchema};
use motion_ml::ml::model_selection::{grid_search_forest, grid_search_knn, train_test_split};
use motion_ml::ml::{Classifier, KnnClassifier, Metrics, RandomForest};
use motion_ml::ml::{ForestConfig, WeightScheme};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "motion_ml")]
#[command(about = "Activity classification from multi-sensor recordings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ClassifierKind {
    Knn,
    Forest,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dataset and train/evaluate a classifier
    Train {
        /// Root folder containing one subfolder per class label
        #[arg(short, long)]
        path: PathBuf,

        /// Recording subfolder inside each label folder
        #[arg(short, long)]
        target: String,

        /// Classifier to train
        #[arg(short, long, value_enum, default_value_t = ClassifierKind::Knn)]
        classifier: ClassifierKind,

        /// Skip hyperparameter grid search and use defaults
        #[arg(long)]
        no_grid_search: bool,

        /// Held-out test fraction
        #[arg(long, default_value = "0.3")]
        test_ratio: f64,

        /// Random seed for the split and the models
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Optional sensor schema JSON file
        #[arg(long)]
        schema: Option<PathBuf>,
    },

    /// Merge one recording folder (or a single sensor CSV) onto a common timeline
    Merge {
        /// Recording folder or sensor CSV file
        #[arg(short, long)]
        path: PathBuf,

        /// Write the merged table to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Optional sensor schema JSON file
        #[arg(long)]
        schema: Option<PathBuf>,
    },
}

fn load_schema(path: Option<&PathBuf>) -> anyhow::Result<SensorSchema> {
    match path {
        Some(path) => Ok(SensorSchema::from_json_file(path)?),
        None => Ok(SensorSchema::default()),
    }
}

fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder().with_max_level(Level::INFO).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            path,
            target,
            classifier,
            no_grid_search,
            test_ratio,
            seed,
            schema,
        } => {
            let schema = load_schema(schema.as_ref())?;
            let builder = DatasetBuilder::new(schema);

            info!("Building dataset from {:?} (target {:?})", path, target);
            let dataset = builder.build(&path, &target)?;
            anyhow::ensure!(dataset.n_samples() > 0, "dataset is empty");

            let (x, y, classes) = dataset.to_training_data();
            info!(
                "Dataset: {} samples, {} features, {} classes",
                dataset.n_samples(),
                dataset.n_features(),
                classes.len()
            );

            let (x_train, y_train, x_test, y_test) = train_test_split(&x, &y, test_ratio, seed);
            info!("Train: {}, Test: {}", x_train.nrows(), x_test.nrows());

            let (predictions, parameters) = match (classifier, no_grid_search) {
                (ClassifierKind::Knn, false) => {
                    let result = grid_search_knn(&x_train, &y_train, 5, seed);
                    info!("Grid search CV accuracy: {:.4}", result.cv_accuracy);
                    (result.model.predict(&x_test), result.parameters)
                }
                (ClassifierKind::Knn, true) => {
                    let mut model = KnnClassifier::new(1).with_weights(WeightScheme::Uniform);
                    model.fit(&x_train, &y_train);
                    (model.predict(&x_test), "k=1, weights=uniform".to_string())
                }
                (ClassifierKind::Forest, false) => {
                    let result = grid_search_forest(&x_train, &y_train, 5, seed);
                    info!("Grid search CV accuracy: {:.4}", result.cv_accuracy);
                    (result.model.predict(&x_test), result.parameters)
                }
                (ClassifierKind::Forest, true) => {
                    let config = ForestConfig {
                        seed,
                        ..Default::default()
                    };
                    let parameters =
                        format!("n_trees={}, max_depth={}", config.n_trees, config.max_depth);
                    let mut model = RandomForest::new(config);
                    model.fit(&x_train, &y_train);
                    (model.predict(&x_test), parameters)
                }
            };

            println!("Accuracy: {:.4}", Metrics::accuracy(&y_test, &predictions));
            println!("Best Parameters: {}", parameters);
            println!();
            println!(
                "{}",
                Metrics::classification_report(&y_test, &predictions, &classes)
            );
        }

        Commands::Merge {
            path,
            output,
            schema,
        } => {
            let schema = load_schema(schema.as_ref())?;
            let merger = SensorMerger::new(schema);

            match merger.merge(&path, output.as_deref())? {
                Some(frame) => {
                    info!(
                        "Merged {} rows x {} columns",
                        frame.n_rows(),
                        frame.n_columns()
                    );
                    if let Some(out) = output {
                        println!("Merged table written to {:?}", out);
                    } else {
                        println!("Columns: {}", frame.columns.join(", "));
                        println!("Rows:    {}", frame.n_rows());
                        if let (Some(first), Some(last)) =
                            (frame.datetime(0), frame.datetime(frame.n_rows().saturating_sub(1)))
                        {
                            println!("Span:    {} .. {}", first, last);
                        }
                    }
                }
                None => println!("No data found at {:?}", path),
            }
        }
    }

    Ok(())
}
