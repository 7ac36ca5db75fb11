use anyhow::{bail, Result};
use breedmatch_common::{logger, AppConfig};
use breedmatch_ml::{adapt_kaggle_file, seed_dataset, train_and_save, TrainingOptions};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    } else {
        dotenv::dotenv().ok();
    }
}

#[derive(Parser)]
#[command(name = "breedmatch")]
#[command(about = "BreedMatch - dog breed recommendations from lifestyle preferences", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,

        /// Breed dataset CSV
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Model bundle directory
        #[arg(long)]
        models: Option<PathBuf>,
    },

    /// Fit the scaler and models and write the model bundle
    Train {
        /// Breed dataset CSV
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Output directory for the model bundle
        #[arg(long)]
        models: Option<PathBuf>,

        /// Random seed for k-means, the split and the forest
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of trees in the random forest
        #[arg(long, default_value = "100")]
        trees: usize,

        /// Number of k-means clusters
        #[arg(long, default_value = "5")]
        clusters: usize,

        /// Fraction of breeds held out for evaluation
        #[arg(long, default_value = "0.3")]
        test_size: f64,
    },

    /// Convert the AKC breed traits table into a BreedMatch dataset
    Adapt {
        /// AKC breed traits CSV
        #[arg(long)]
        input: PathBuf,

        /// Output dataset CSV
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Write the built-in 25 breed dataset
    Seed {
        /// Output dataset CSV
        #[arg(long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

async fn serve(config: AppConfig) -> Result<()> {
    config.validate()?;
    logger::setup_logging(&config.log_dir, &config.log_level)?;

    tracing::info!("BreedMatch starting...");
    tracing::info!("Configuration loaded:");
    tracing::info!("  Address: {}", config.server_bind_address());
    tracing::info!("  Dataset: {}", config.dataset_path.display());
    tracing::info!("  Models: {}", config.models_dir.display());

    println!("Server listening on http://{}", config.server_bind_address());

    breedmatch_server::start_server(config).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // AppConfig::from_env() also loads .env, but the project root one must
    // be in place before CLI overrides are applied
    load_dotenv_from_project_root();

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            dataset,
            models,
        }) => {
            // Override with CLI arguments
            if let Some(host) = &host {
                std::env::set_var("SERVER_HOST", host);
            }
            if let Some(port) = port {
                std::env::set_var("SERVER_PORT", port.to_string());
            }
            if let Some(dataset) = &dataset {
                std::env::set_var("DATASET_PATH", dataset);
            }
            if let Some(models) = &models {
                std::env::set_var("MODELS_DIR", models);
            }

            serve(AppConfig::from_env()?).await?;
        }
        Some(Commands::Train {
            dataset,
            models,
            seed,
            trees,
            clusters,
            test_size,
        }) => {
            let config = AppConfig::from_env()?;
            logger::setup_console_logging(&config.log_level)?;

            let dataset = dataset.unwrap_or(config.dataset_path);
            let models = models.unwrap_or(config.models_dir);
            let options = TrainingOptions {
                n_clusters: clusters,
                n_estimators: trees,
                test_size,
                seed,
                ..TrainingOptions::default()
            };

            let report = train_and_save(&dataset, &models, &options)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            println!("Model bundle written to {}", models.display());
        }
        Some(Commands::Adapt { input, output }) => {
            let config = AppConfig::from_env()?;
            logger::setup_console_logging(&config.log_level)?;

            let output = output.unwrap_or(config.dataset_path);
            let report = adapt_kaggle_file(&input, &output)?;
            println!(
                "{} breeds written to {} ({} rows skipped)",
                report.rows_written,
                output.display(),
                report.rows_skipped
            );
        }
        Some(Commands::Seed { output, force }) => {
            let config = AppConfig::from_env()?;
            logger::setup_console_logging(&config.log_level)?;

            let output = output.unwrap_or(config.dataset_path);
            if output.exists() && !force {
                bail!("{} already exists, pass --force to overwrite", output.display());
            }
            let dataset = seed_dataset();
            dataset.write_csv(&output)?;
            println!("{} breeds written to {}", dataset.len(), output.display());
        }
        None => {
            // Default: start server with default config
            serve(AppConfig::from_env()?).await?;
        }
    }

    Ok(())
}
