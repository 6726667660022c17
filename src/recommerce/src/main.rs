//! Recommerce — offline e-commerce recommendation pipeline and CLI.
//!
//! `pipeline` ingests the raw listing export, engineers features, trains
//! both models and persists every artifact; `recommend` loads the persisted
//! artifacts and prints ranked recommendations for a user.

use clap::{Parser, Subcommand};
use recommerce_core::config::AppConfig;
use recommerce_core::types::{CleanListing, InteractionDataset, Strategy};
use recommerce_core::RecResult;
use recommerce_dataset::{features, loader, preprocess, split};
use recommerce_engine::Recommender;
use recommerce_models::{ArtifactStore, ContentPipeline, SvdModel};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "recommerce")]
#[command(about = "Offline e-commerce recommendation pipeline")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (overridable per-key via RECOMMERCE__* env vars)
    #[arg(long, env = "RECOMMERCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest, preprocess, train both models and persist all artifacts
    Pipeline,
    /// Produce top-N recommendations for a user from persisted artifacts
    Recommend {
        /// User identifier to recommend for
        #[arg(long)]
        user: String,

        /// Scoring strategy: collaborative or content_based
        #[arg(long, default_value = "collaborative")]
        strategy: Strategy,

        /// Number of recommendations (overrides config)
        #[arg(long)]
        top_n: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recommerce=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    match cli.command {
        Command::Pipeline => run_pipeline(&config)?,
        Command::Recommend {
            user,
            strategy,
            top_n,
        } => run_recommend(&config, &user, strategy, top_n)?,
    }

    Ok(())
}

/// The full training pipeline: read → clean → fan out reviewers → encode →
/// split → train both models → persist everything.
fn run_pipeline(config: &AppConfig) -> RecResult<()> {
    info!("Reading data...");
    let raw = loader::read_listings(Path::new(&config.data.path))?;

    info!("Preprocessing data...");
    let cleaned = preprocess::clean_listings(raw);
    let per_reviewer: Vec<CleanListing> =
        cleaned.iter().flat_map(features::split_reviewers).collect();

    info!("Extracting categories and one-hot encoding...");
    let dataset = features::encode_dataset(&per_reviewer);

    info!("Splitting data into train and test sets...");
    let (train, test) =
        split::train_test_split(&dataset, config.split.test_size, config.split.random_state)?;

    info!("Training collaborative filtering model...");
    let collaborative =
        SvdModel::fit(&train, &config.collaborative, config.split.random_state)?;

    info!("Training content based filtering model...");
    let content = ContentPipeline::fit(&train, &config.content)?;

    info!("Saving models and data...");
    let store = ArtifactStore::new(&config.artifacts.dir);
    store.save(&content, &store.cbf_model_path())?;
    store.save(&collaborative, &store.cf_model_path())?;
    store.save(&per_reviewer, &store.user_split_path())?;
    store.save(&dataset, &store.dataset_path())?;
    store.save(&train, &store.train_path())?;
    store.save(&test, &store.test_path())?;

    info!("Pipeline complete");
    Ok(())
}

/// Load the dataset and the selected model once, then serve one request.
fn run_recommend(
    config: &AppConfig,
    user: &str,
    strategy: Strategy,
    top_n: Option<usize>,
) -> RecResult<()> {
    let store = ArtifactStore::new(&config.artifacts.dir);
    let dataset: InteractionDataset = store.load_data(&store.dataset_path())?;

    let (collaborative, content) = match strategy {
        Strategy::Collaborative => {
            let model: SvdModel = store.load_model(&store.cf_model_path())?;
            info!("Collaborative filtering model loaded");
            (Some(model), None)
        }
        Strategy::ContentBased => {
            let pipeline: ContentPipeline = store.load_model(&store.cbf_model_path())?;
            info!("Content based filtering model loaded");
            (None, Some(pipeline))
        }
    };

    let recommender = Recommender::new(dataset, collaborative, content)
        .with_default_top_n(config.recommend.top_n);
    let response = recommender.get_recommendations(strategy, user, top_n)?;

    if response.items.is_empty() {
        println!("No unseen items to recommend for user {user}");
        return Ok(());
    }

    println!(
        "Top {} recommendations for user {user} ({strategy}):",
        response.items.len()
    );
    println!("{:<6} {:<32} {:>16}", "rank", "product", "predicted rating");
    for (position, item) in response.items.iter().enumerate() {
        println!(
            "{:<6} {:<32} {:>16.4}",
            position + 1,
            item.item_id,
            item.predicted_rating
        );
    }
    Ok(())
}
