//! Credit-Risk CLI - Main Entry Point
//!
//! Scores one raw credit-account record at a time and explains the score.
//! Offline helpers convert the source spreadsheet and build feature tables.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use credit_risk_core::constants::{self, APP_NAME, APP_VERSION, DEFAULT_IMPORTANCE_TOP_N};
use credit_risk_core::logic::config::PipelineConfig;
use credit_risk_core::logic::dataset;
use credit_risk_core::logic::explain::{ImportanceType, TreeShapExplainer};
use credit_risk_core::logic::features::{FEATURE_COUNT, FEATURE_VERSION};
use credit_risk_core::logic::model::ModelGateway;
use credit_risk_core::logic::record::{RawRecord, RecordNormalizer};
use credit_risk_core::CreditPipeline;

/// Credit default risk scoring
#[derive(Parser, Debug)]
#[command(name = "credit-risk")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Model artifact (overrides CREDIT_MODEL_PATH)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Decision threshold (overrides CREDIT_THRESHOLD)
    #[arg(long, global = true)]
    threshold: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score one record
    Predict {
        /// JSON record file, `-` for stdin
        #[arg(long, default_value = "-")]
        input: String,

        /// Include the explanation
        #[arg(long)]
        explain: bool,
    },

    /// Per-feature attributions for one record
    Explain {
        /// JSON record file, `-` for stdin
        #[arg(long, default_value = "-")]
        input: String,

        /// Only the N largest attributions
        #[arg(long)]
        top: Option<usize>,
    },

    /// Global feature importance
    Importance {
        /// weight | gain | total_gain | cover | total_cover
        #[arg(long = "type", default_value = "gain")]
        importance_type: ImportanceType,

        #[arg(long, default_value_t = DEFAULT_IMPORTANCE_TOP_N)]
        top: usize,
    },

    /// Score and explain the built-in sample record
    Demo,

    /// Convert the source spreadsheet to CSV
    Convert {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,
    },

    /// Build the engineered feature table from a processed CSV
    Features {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let cli = Cli::parse();
    log::debug!("Starting {} v{}", APP_NAME, APP_VERSION);

    let mut config = PipelineConfig::from_env().context("invalid environment configuration")?;
    if let Some(path) = cli.model {
        config = config.with_model_path(path);
    }
    if let Some(threshold) = cli.threshold {
        config = config.with_threshold(threshold);
    }
    config.validate()?;

    match cli.command {
        Command::Predict { input, explain } => {
            let pipeline = build_pipeline(&config, ImportanceType::default())?;
            let raw = read_record(&input)?;
            if explain {
                print_json(&pipeline.assess(&raw)?)
            } else {
                print_json(&pipeline.predict(&raw)?)
            }
        }

        Command::Explain { input, top } => {
            let pipeline = build_pipeline(&config, ImportanceType::default())?;
            let explanation = pipeline.explain(&read_record(&input)?)?;
            match top {
                Some(n) => print_json(&serde_json::json!({
                    "baseline": explanation.baseline,
                    "margin": explanation.margin,
                    "attributions": explanation.top_contributors(n),
                })),
                None => print_json(&explanation),
            }
        }

        Command::Importance { importance_type, top } => {
            let pipeline = build_pipeline(&config, importance_type)?;
            let importance = pipeline.global_importance();
            print_json(&serde_json::json!({
                "importance_type": importance.importance_type,
                "scores": importance.top_n(top),
            }))
        }

        Command::Demo => {
            let pipeline = build_pipeline(&config, ImportanceType::default())?;
            let assessment = pipeline.assess(&RawRecord::sample())?;
            print_json(&serde_json::json!({
                "model": pipeline.model().metadata(),
                "prediction": assessment.prediction,
                "top_contributors": assessment.explanation.top_contributors(5),
            }))
        }

        Command::Convert { input, output } => {
            let rows = dataset::convert_xls_to_csv(&input, &output)
                .with_context(|| format!("converting {}", input.display()))?;
            println!("{} rows written to {}", rows, output.display());
            Ok(())
        }

        Command::Features { input, output } => {
            let records = dataset::load_raw_csv(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let normalizer = RecordNormalizer::new(config.record_policy);
            let rows = dataset::normalize_all(&records, &normalizer)?;
            let matrix = dataset::derive_matrix(&rows);
            let written = dataset::write_feature_csv(&output, &matrix)?;
            println!(
                "{} rows x {} features (layout v{}) written to {}",
                written,
                FEATURE_COUNT,
                FEATURE_VERSION,
                output.display()
            );
            Ok(())
        }
    }
}

fn build_pipeline(config: &PipelineConfig, importance_type: ImportanceType) -> Result<CreditPipeline> {
    let gateway = ModelGateway::new(&config.model_path);
    let pipeline = CreditPipeline::from_gateway(&gateway, config)
        .with_context(|| format!("loading model (set CREDIT_MODEL_PATH, default {})", constants::DEFAULT_MODEL_PATH))?;
    Ok(pipeline.with_explainer(Arc::new(TreeShapExplainer::new(importance_type))))
}

fn read_record(input: &str) -> Result<RawRecord> {
    let json = if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading record {}", input))?
    };
    Ok(RawRecord::from_json_str(&json)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
