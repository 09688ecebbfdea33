use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use docbatch_config::Config;
use docbatch_engine::{
    DocumentId, FileTopicStore, MemoryTopicStore, Outcome, Pipeline, Strategy, TopicStore, replay,
};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser, Debug)]
#[command(name = "docbatch")]
#[command(about = "Turn webhook payloads into document batch-update requests", long_about = None)]
struct Args {
    /// Config file to use instead of ~/.config/docbatch/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured insertion strategy
    #[arg(long, global = true, value_enum)]
    strategy: Option<StrategyArg>,

    /// Override the configured anchor offset
    #[arg(long, global = true)]
    anchor: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the batch-update request for a payload
    Build {
        /// Payload file; reads stdin when omitted or "-"
        payload: Option<PathBuf>,
    },
    /// Print the text a new document would contain after the batch
    Preview {
        /// Payload file; reads stdin when omitted or "-"
        payload: Option<PathBuf>,
    },
    /// Print the acknowledgement for a payload
    Receive {
        /// Payload file; reads stdin when omitted or "-"
        payload: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum StrategyArg {
    Forward,
    Reverse,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Forward => Strategy::Forward,
            StrategyArg::Reverse => Strategy::Reverse,
        }
    }
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    let pipeline = Pipeline::new(config.anchor_offset, config.build_options())
        .with_titles(config.title);

    match &args.command {
        Commands::Build { payload } => {
            let raw = read_payload(payload.as_deref())?;
            let outcome = handle_with_store(&pipeline, &config, &raw)?;
            println!("{}", outcome.request().to_json_pretty()?);
        }
        Commands::Receive { payload } => {
            let raw = read_payload(payload.as_deref())?;
            let outcome = handle_with_store(&pipeline, &config, &raw)?;
            println!("{}", serde_json::to_string_pretty(&outcome.receipt())?);
        }
        Commands::Preview { payload } => {
            let raw = read_payload(payload.as_deref())?;
            // Always a fresh document, so nothing is recorded in the real store
            let mut store = MemoryTopicStore::new();
            let outcome = pipeline.handle(&raw, &mut store, mint_id)?;
            print!("{}", preview(&config, &outcome)?);
        }
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let loaded = match &args.config {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("config file {} does not exist", path.display()))?,
        None => {
            log::info!("Config path: {}", Config::config_path().display());
            Config::load()?.unwrap_or_default()
        }
    };
    Ok(apply_overrides(loaded, args))
}

fn apply_overrides(mut config: Config, args: &Args) -> Config {
    if let Some(strategy) = args.strategy {
        config.strategy = strategy.into();
    }
    if let Some(anchor) = args.anchor {
        config.anchor_offset = anchor;
    }
    config
}

fn read_payload(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload {}", path.display())),
        _ => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read payload from stdin")?;
            Ok(raw)
        }
    }
}

fn handle_with_store(pipeline: &Pipeline, config: &Config, raw: &str) -> Result<Outcome> {
    let mut store: Box<dyn TopicStore> = match &config.topic_store_path {
        Some(path) => Box::new(FileTopicStore::open(path)?),
        None => Box::new(MemoryTopicStore::new()),
    };
    pipeline.handle(raw, &mut *store, mint_id)
}

/// Stand-in for remote document creation
fn mint_id(_topic: &str) -> Result<DocumentId> {
    Ok(DocumentId::local())
}

/// Largest anchor `preview` will pad up to with blank lines
const MAX_PREVIEW_ANCHOR: usize = 1 << 20;

/// Replay the batch over blank lines standing in for content before the anchor
fn preview(config: &Config, outcome: &Outcome) -> Result<String> {
    anyhow::ensure!(
        config.anchor_offset <= MAX_PREVIEW_ANCHOR,
        "anchor {} is too far into the document to preview (limit {MAX_PREVIEW_ANCHOR})",
        config.anchor_offset
    );
    let existing = "\n".repeat(config.anchor_offset.saturating_sub(1));
    let doc = replay(&existing, &outcome.operations(), config.index_unit)?;
    Ok(doc.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const PAYLOAD: &str =
        r#"{"kind": "batch", "topic": "Leads", "records": [{"Name": "Ada"}, {"Name": "Bob"}]}"#;

    #[test]
    fn overrides_win_over_config() {
        let args =
            Args::try_parse_from(["docbatch", "--strategy", "reverse", "--anchor", "4", "build"])
                .unwrap();
        let config = apply_overrides(Config::default(), &args);
        assert_eq!(config.strategy, Strategy::Reverse);
        assert_eq!(config.anchor_offset, 4);
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let args = Args::try_parse_from(["docbatch", "preview", "in.json", "--anchor", "2"]).unwrap();
        assert_eq!(args.anchor, Some(2));
        assert!(matches!(args.command, Commands::Preview { payload: Some(_) }));
    }

    #[test]
    fn reads_payload_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("payload.json");
        std::fs::write(&path, PAYLOAD).unwrap();

        assert_eq!(read_payload(Some(path.as_path())).unwrap(), PAYLOAD);
        assert!(read_payload(Some(temp_dir.path().join("missing.json").as_path())).is_err());
    }

    #[test]
    fn preview_pads_content_before_the_anchor() {
        let config = Config {
            anchor_offset: 3,
            ..Config::default()
        };
        let pipeline = Pipeline::new(config.anchor_offset, config.build_options());
        let outcome = pipeline
            .handle(PAYLOAD, &mut MemoryTopicStore::new(), mint_id)
            .unwrap();

        assert_eq!(preview(&config, &outcome).unwrap(), "\n\nName\nAda\nName\nBob\n");
    }

    #[test]
    fn preview_rejects_huge_anchors_instead_of_padding() {
        let config = Config {
            anchor_offset: 10_000_000_000,
            ..Config::default()
        };
        let pipeline = Pipeline::new(config.anchor_offset, config.build_options());
        let outcome = pipeline
            .handle(
                r#"{"kind": "record", "topic": "Leads", "fields": {}}"#,
                &mut MemoryTopicStore::new(),
                mint_id,
            )
            .unwrap();

        let err = preview(&config, &outcome).unwrap_err();
        assert!(err.to_string().contains("too far"));
    }

    #[test]
    fn file_store_reuses_ids_between_runs() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            topic_store_path: Some(temp_dir.path().join("topics.json")),
            ..Config::default()
        };
        let pipeline = Pipeline::new(1, config.build_options());

        let first = handle_with_store(&pipeline, &config, PAYLOAD).unwrap();
        let second = handle_with_store(&pipeline, &config, PAYLOAD).unwrap();
        assert!(first.resolution.created);
        assert!(!second.resolution.created);
        assert_eq!(first.resolution.id, second.resolution.id);
        assert_eq!(second.resolution.end, first.batch.end());
    }
}
