use anyhow::Context;
use clap::{value_parser, Arg, ArgMatches, Command};
use nfguard_core::{discover_components, ScanConfig, ScanOrchestrator};
use nfguard_llm::{build_validator, GuidelineStore, LlmConfig, Provider};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Command::new("nfguard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("LLM-backed nf-core pipeline compliance scanner")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("validate")
                .about("Scan a pipeline for guideline compliance")
                .arg(
                    Arg::new("pipeline")
                        .required(true)
                        .help("Path to the pipeline checkout"),
                )
                .arg(
                    Arg::new("provider")
                        .long("provider")
                        .default_value("openai")
                        .help("LLM backend: openai or anthropic"),
                )
                .arg(
                    Arg::new("model")
                        .long("model")
                        .help("Model override for the selected backend"),
                )
                .arg(
                    Arg::new("guidelines")
                        .long("guidelines")
                        .help("Directory of guideline documents (.md/.txt)"),
                )
                .arg(
                    Arg::new("max-workers")
                        .long("max-workers")
                        .default_value("4")
                        .value_parser(value_parser!(usize))
                        .help("Maximum concurrent validator calls"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .help("Report path (defaults to <pipeline>_compliance_report.json)"),
                ),
        );

    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("validate", args)) => {
            if let Err(err) = run_validate(args).await {
                eprintln!("Error: {err:#}");
                std::process::exit(1);
            }
        }
        _ => {}
    }
}

async fn run_validate(args: &ArgMatches) -> anyhow::Result<()> {
    let pipeline_path = PathBuf::from(args.get_one::<String>("pipeline").unwrap());
    let provider: Provider = args.get_one::<String>("provider").unwrap().parse()?;

    let store = match args.get_one::<String>("guidelines") {
        Some(dir) => GuidelineStore::load(Path::new(dir))
            .with_context(|| format!("failed to load guidelines from {dir}"))?,
        None => GuidelineStore::empty(),
    };

    let mut config = LlmConfig::new(provider);
    if let Some(model) = args.get_one::<String>("model") {
        config = config.with_model(model);
    }
    let validator = build_validator(config, store)?;

    let components = discover_components(&pipeline_path)?;
    println!("Found {} components to validate", components.len());

    let max_workers = *args.get_one::<usize>("max-workers").unwrap();
    let orchestrator = ScanOrchestrator::new(ScanConfig::new().with_max_workers(max_workers));
    let report = orchestrator
        .scan(pipeline_path.clone(), components, validator)
        .await;

    let output = args
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(&pipeline_path));
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&output, json)
        .with_context(|| format!("failed to write report to {}", output.display()))?;

    println!("Compliance report saved to {}", output.display());
    println!("Overall compliance score: {}%", report.compliance_score());
    Ok(())
}

fn default_output_path(pipeline: &Path) -> PathBuf {
    let name = pipeline
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("pipeline");
    PathBuf::from(format!("{name}_compliance_report.json"))
}
