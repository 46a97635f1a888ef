use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use astroturf::comments::ingest::{combine_sources, load_scrape_file};
use astroturf::comments::Comment;
use astroturf::config::{AnalysisConfig, Config};
use astroturf::output::summary::BatchSummary;
use astroturf::output::{terminal, write_json};
use astroturf::pipeline;
use astroturf::topics::KeywordSummarizer;

/// Astroturf: coordinated inauthentic comment detection.
///
/// Scores TikTok and Facebook comment sections for bot-like behavior by
/// combining near-duplicate text detection, an isolation forest, and
/// density clustering.
#[derive(Parser)]
#[command(name = "astroturf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one or more scrape result files as a single batch
    Analyze {
        /// Scrape result JSON files (unified or legacy TikTok format)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Write the classified comments and run metadata as JSON
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Max suspicious comments to list in the report
        #[arg(long)]
        limit: Option<usize>,

        /// Skip the keyword summary
        #[arg(long)]
        no_keywords: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the feature vectors the detectors would see
    Features {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Write the feature table as JSON instead of printing it
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Summarize what a batch of comments is talking about
    Keywords {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Number of keywords to extract
        #[arg(long)]
        top: Option<usize>,
    },
}

/// Command-line overrides for the environment configuration.
#[derive(Args)]
struct Overrides {
    /// Expected share of anomalous comments, in (0, 0.5]
    #[arg(long)]
    contamination: Option<f64>,

    /// Number of isolation trees
    #[arg(long)]
    trees: Option<usize>,

    /// Random seed for the isolation forest
    #[arg(long)]
    seed: Option<u64>,

    /// Density clustering radius in standardized units
    #[arg(long)]
    eps: Option<f64>,

    /// Neighbors (including the point itself) needed for a dense region
    #[arg(long)]
    min_samples: Option<usize>,

    /// Similarity at or above which a comment counts as a near-duplicate
    #[arg(long)]
    duplicate_threshold: Option<f64>,

    /// Largest word n-gram used for similarity (1-3)
    #[arg(long)]
    ngram_max: Option<usize>,

    /// Minutes east of UTC for hour-of-day features
    #[arg(long, allow_hyphen_values = true)]
    utc_offset: Option<i32>,

    /// Also feed likes and reply counts to the detectors
    #[arg(long)]
    include_engagement: bool,
}

impl Overrides {
    fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(v) = self.contamination {
            config.isolation.contamination = v;
        }
        if let Some(v) = self.trees {
            config.isolation.n_trees = v;
        }
        if let Some(v) = self.seed {
            config.isolation.seed = v;
        }
        if let Some(v) = self.eps {
            config.clustering.eps = v;
        }
        if let Some(v) = self.min_samples {
            config.clustering.min_samples = v;
        }
        if let Some(v) = self.duplicate_threshold {
            config.similarity.duplicate_threshold = v;
        }
        if let Some(v) = self.ngram_max {
            config.similarity.ngram_max = v;
        }
        if let Some(v) = self.utc_offset {
            config.features.utc_offset_minutes = v;
        }
        if self.include_engagement {
            config.features.include_engagement = true;
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("astroturf=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            inputs,
            output,
            limit,
            no_keywords,
            overrides,
        } => {
            let mut config = Config::load()?;
            overrides.apply(&mut config.analysis);

            let comments = load_inputs(&inputs)?;
            let run = pipeline::run(comments, &config.analysis)?;
            let summary = BatchSummary::from_run(&run);

            terminal::display_summary(&summary);
            terminal::display_suspicious(&run, limit.unwrap_or(config.report_limit));

            if !no_keywords {
                let summarizer = KeywordSummarizer {
                    top_n_keywords: config.top_keywords,
                    ..KeywordSummarizer::default()
                };
                let texts: Vec<String> = run.records.iter().map(|r| r.comment.text.clone()).collect();
                match summarizer.summarize(&texts) {
                    Ok(keywords) => terminal::display_keywords(&keywords),
                    Err(e) => warn!(error = %e, "Keyword summary unavailable"),
                }
            }

            if let Some(path) = output {
                write_json(&run, &path)?;
                println!(
                    "\n{}",
                    format!("Results written to {}", path.display()).green()
                );
            }
        }

        Commands::Features {
            inputs,
            output,
            overrides,
        } => {
            let mut config = Config::load()?;
            overrides.apply(&mut config.analysis);

            let comments = load_inputs(&inputs)?;
            let table = pipeline::extract_features(comments, &config.analysis)?;

            match output {
                Some(path) => {
                    write_json(&table, &path)?;
                    println!("Feature table written to {}", path.display());
                }
                None => terminal::display_features(&table),
            }
        }

        Commands::Keywords { inputs, top } => {
            let config = Config::load()?;
            let comments = load_inputs(&inputs)?;
            let texts: Vec<String> = comments
                .into_iter()
                .filter(|c| !c.is_blank())
                .map(|c| c.text)
                .collect();

            let summarizer = KeywordSummarizer {
                top_n_keywords: top.unwrap_or(config.top_keywords),
                ..KeywordSummarizer::default()
            };
            let keywords = summarizer.summarize(&texts)?;
            terminal::display_keywords(&keywords);
        }
    }

    Ok(())
}

/// Load every input file and merge them into one batch, in argument order.
fn load_inputs(paths: &[PathBuf]) -> Result<Vec<Comment>> {
    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Loading [{bar:30}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?,
    );

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        pb.set_message(file_name(path));
        sources.push(load_scrape_file(path)?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let comments = combine_sources(sources);

    println!(
        "Loaded {} comments from {} file(s)",
        comments.len(),
        paths.len()
    );
    Ok(comments)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
