//! AssetLab CLI — import datasets into the keyed store and inspect it.
//!
//! Commands:
//! - `import` — fetch, normalize, and store the named datasets (default: all)
//! - `store list` — list stored keys with their kind, shape, and source
//! - `store show` — print the head of a table or the shape of an array

use anyhow::{Context, Result};
use assetlab_core::source::HttpClient;
use assetlab_core::store::manifest::EntryKind;
use assetlab_core::{Dataset, ImportConfig, Importer, KeyedStore, DATA_STORE};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "assetlab",
    version,
    about = "AssetLab CLI — one-shot importer for reference financial and image datasets"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import datasets into the store, stopping at the first failure.
    Import {
        /// Datasets to import (wiki-prices, wiki-stocks, sp500-fred,
        /// sp500-constituents, us-equities, fred-assets, mnist, fashion-mnist).
        /// Defaults to all of them.
        datasets: Vec<String>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Store directory. Overrides the config file.
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Inspect the keyed store.
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// List every key with its kind, shape or row count, and source.
    List {
        #[arg(long, default_value = DATA_STORE)]
        store: PathBuf,
    },
    /// Print the head of a table, or the shape of an array.
    Show {
        key: String,

        /// Table rows to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,

        #[arg(long, default_value = DATA_STORE)]
        store: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assetlab=info,assetlab_core=info".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Import {
            datasets,
            config,
            store,
        } => run_import(&datasets, config, store),
        Commands::Store { action } => match action {
            StoreAction::List { store } => run_store_list(store),
            StoreAction::Show { key, rows, store } => run_store_show(&key, rows, store),
        },
    }
}

fn parse_datasets(names: &[String]) -> Result<Vec<Dataset>> {
    if names.is_empty() {
        return Ok(Dataset::ALL.to_vec());
    }
    let mut requested = Vec::with_capacity(names.len());
    for name in names {
        let dataset: Dataset = name.parse().map_err(anyhow::Error::msg)?;
        if !requested.contains(&dataset) {
            requested.push(dataset);
        }
    }
    // Canonical order regardless of how they were listed.
    Ok(Dataset::ALL
        .into_iter()
        .filter(|d| requested.contains(d))
        .collect())
}

fn run_import(names: &[String], config: Option<PathBuf>, store: Option<PathBuf>) -> Result<()> {
    let datasets = parse_datasets(names)?;

    let mut config = match config {
        Some(path) => ImportConfig::from_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ImportConfig::default(),
    };
    if let Some(store) = store {
        config.store_path = store;
    }

    let http = HttpClient::new(config.timeout(), &config.user_agent)?;
    let mut store = KeyedStore::open(&config.store_path)
        .with_context(|| format!("opening store {}", config.store_path.display()))?;

    info!(
        store = %config.store_path.display(),
        datasets = datasets.len(),
        "starting import"
    );
    let summary = Importer::new(&config, &http).import_all(&datasets, &mut store)?;

    println!();
    println!("Imported {} datasets into {}:", summary.written.len(), store.root().display());
    for (dataset, keys) in &summary.written {
        println!("  {:<20} {}", dataset.name(), keys.join(", "));
    }
    Ok(())
}

fn run_store_list(root: PathBuf) -> Result<()> {
    if !root.exists() {
        println!("Store does not exist: {}", root.display());
        return Ok(());
    }
    let store = KeyedStore::open(&root)?;
    if store.keys().next().is_none() {
        println!("Store is empty: {}", root.display());
        return Ok(());
    }

    println!("Store: {}", store.root().display());
    println!();
    println!(
        "{:<28} {:<6} {:<22} {:<18} {:<19}",
        "Key", "Kind", "Shape", "Source", "Written"
    );
    println!("{}", "-".repeat(97));
    for key in store.keys() {
        let Some(meta) = store.entry(key) else {
            continue;
        };
        let (kind, shape) = match &meta.kind {
            EntryKind::Table { columns, rows, .. } => {
                ("table", format!("{rows} rows × {} cols", columns.len()))
            }
            EntryKind::Array { shape, dtype } => ("array", format!("{shape:?} {dtype}")),
        };
        println!(
            "{:<28} {:<6} {:<22} {:<18} {:<19}",
            key,
            kind,
            shape,
            meta.source,
            meta.written_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

fn run_store_show(key: &str, rows: usize, root: PathBuf) -> Result<()> {
    let store = KeyedStore::open(&root)
        .with_context(|| format!("opening store {}", root.display()))?;
    let meta = store
        .entry(key)
        .with_context(|| format!("no key '{key}' in {}", root.display()))?;

    match &meta.kind {
        EntryKind::Table { index, .. } => {
            let frame = store.get_table(key)?;
            println!("{key}  (index: [{}], source: {})", index.join(", "), meta.source);
            println!("{}", frame.data.head(Some(rows)));
        }
        EntryKind::Array { .. } => {
            let array = store.get_array(key)?;
            println!("{key}  (source: {})", meta.source);
            println!("shape: {:?}", array.shape);
            println!("dtype: u8");
            println!("bytes: {}", array.data.len());
        }
    }
    println!("blake3: {}", meta.data_hash);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_names_means_every_dataset() {
        assert_eq!(parse_datasets(&[]).unwrap(), Dataset::ALL.to_vec());
    }

    #[test]
    fn datasets_run_in_canonical_order() {
        let names = vec!["fashion-mnist".to_string(), "wiki-prices".to_string(), "wiki-prices".to_string()];
        assert_eq!(
            parse_datasets(&names).unwrap(),
            vec![Dataset::WikiPrices, Dataset::FashionMnist]
        );
    }

    #[test]
    fn unknown_dataset_is_an_error() {
        let err = parse_datasets(&["quandl".to_string()]).unwrap_err();
        assert!(err.to_string().contains("unknown dataset"));
    }

    #[test]
    fn cli_parses_store_show() {
        let cli = Cli::try_parse_from(["assetlab", "store", "show", "sp500/fred", "--rows", "3"]).unwrap();
        match cli.command {
            Commands::Store {
                action: StoreAction::Show { key, rows, store },
            } => {
                assert_eq!(key, "sp500/fred");
                assert_eq!(rows, 3);
                assert_eq!(store, PathBuf::from("assets"));
            }
            _ => panic!("expected store show"),
        }
    }
}
