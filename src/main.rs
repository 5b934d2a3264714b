use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use relia_cfp::{format_cfp_report, CfpAnalysis, CfpConfig, CfpSummary, ComponentTree};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// RELIA - Critical failure path analysis for reliability trees
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the minimal critical failure paths of a system
    Analyze {
        /// Component tree (JSON)
        tree: PathBuf,

        /// Analysis configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// System root component, overrides the configuration
        #[arg(short, long)]
        root: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Score a set of failed basic components
    Score {
        /// Component tree (JSON)
        tree: PathBuf,

        /// Analysis configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// System root component, overrides the configuration
        #[arg(short, long)]
        root: Option<String>,

        /// Names of the failed basic components
        #[arg(long, value_delimiter = ',')]
        failed: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt().with_env_filter(log_level).init();

    match cli.command {
        Commands::Analyze {
            tree,
            config,
            root,
            format,
        } => {
            let output = analyze(&tree, config.as_deref(), root.as_deref(), format)?;
            print!("{}", output);
        }

        Commands::Score {
            tree,
            config,
            root,
            failed,
        } => {
            let output = score(&tree, config.as_deref(), root.as_deref(), &failed)?;
            print!("{}", output);
        }
    }

    Ok(())
}

fn load_tree(path: &Path) -> Result<ComponentTree> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tree {}", path.display()))?;
    let mut tree: ComponentTree = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse tree {}", path.display()))?;
    tree.rebuild_index()?;
    info!("Loaded {} components from {}", tree.len(), path.display());
    Ok(tree)
}

fn load_config(path: Option<&Path>, root: Option<&str>) -> Result<CfpConfig> {
    let mut config = match path {
        Some(path) => CfpConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => {
            let root = root.context("Either --config or --root is required")?;
            CfpConfig::new(root)
        }
    };
    if let Some(root) = root {
        config.system_root_component_name = root.to_string();
    }
    config.validate()?;
    Ok(config)
}

fn analyze(
    tree_path: &Path,
    config_path: Option<&Path>,
    root: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let tree = load_tree(tree_path)?;
    let config = load_config(config_path, root)?;
    let analysis = CfpAnalysis::from_config(&tree, &config)?;

    Ok(match format {
        OutputFormat::Text => format_cfp_report(&analysis, &tree),
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(&CfpSummary::from_analysis(&analysis, &tree))?;
            json.push('\n');
            json
        }
    })
}

fn score(
    tree_path: &Path,
    config_path: Option<&Path>,
    root: Option<&str>,
    failed: &[String],
) -> Result<String> {
    let tree = load_tree(tree_path)?;
    let config = load_config(config_path, root)?;
    let analysis = CfpAnalysis::from_config(&tree, &config)?;

    let mut failed_ids = Vec::with_capacity(failed.len());
    for name in failed {
        let id = analysis
            .basic_index()
            .iter()
            .map(|(_, id)| id)
            .find(|&id| tree.get(id).is_some_and(|c| c.name == *name))
            .with_context(|| {
                format!(
                    "'{}' is not a basic component of '{}'",
                    name,
                    analysis.root_name()
                )
            })?;
        failed_ids.push(id);
    }

    let state = analysis.failure_state_vector(failed_ids.iter().copied())?;
    let completed = analysis.completed_paths(failed_ids.iter().copied())?;
    let failed_set: HashSet<_> = failed_ids.into_iter().collect();
    let root_failed = tree.fails_with(analysis.root(), &failed_set)?;

    let mut output = String::new();
    output.push_str(&format!("Criticality:        {}\n", analysis.criticality(&state)));
    output.push_str(&format!(
        "Distance:           {}\n",
        analysis.distance_to_critical_failure(&state)
    ));
    output.push_str(&format!("Completed paths:    {}\n", completed.len()));
    output.push_str(&format!("System failed:      {}\n", root_failed));
    Ok(output)
}
