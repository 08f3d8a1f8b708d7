//! Import orchestrator: fetch → transform → store, one dataset at a time.
//!
//! Datasets are independent. They run sequentially in the order given and the
//! first failure stops the run; keys written before it stay in the store.

use crate::config::{EquitiesSource, ImportConfig};
use crate::frame::IndexedFrame;
use crate::source::fred::FredProvider;
use crate::source::openml::OpenMlProvider;
use crate::source::{csv_file, listing, wikipedia, HttpFetch, SourceError};
use crate::store::{KeyedStore, StoreError};
use crate::transform::{constituents, images, prices, reference, SeriesTable};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

pub const KEY_WIKI_PRICES: &str = "quandl/wiki/prices";
pub const KEY_WIKI_STOCKS: &str = "quandl/wiki/stocks";
pub const KEY_SP500_FRED: &str = "sp500/fred";
pub const KEY_SP500_STOCKS: &str = "sp500/stocks";
pub const KEY_US_EQUITIES: &str = "us_equities/stocks";
pub const KEY_FRED_ASSETS: &str = "fred/assets";

/// FRED series stored under `fred/assets`, with their column labels.
pub const FRED_ASSETS: [(&str, &str); 5] = [
    ("BAMLCC0A0CMTRIV", "US Corp Master TRI"),
    ("BAMLHYH0A0HYM2TRIV", "US High Yield TRI"),
    ("BAMLEMCBPITRIV", "Emerging Markets Corporate Plus TRI"),
    ("GOLDAMGBD228NLBM", "Gold (London, USD)"),
    ("DGS10", "10-Year Treasury CMR"),
];

/// The independent datasets the importer knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    WikiPrices,
    WikiStocks,
    Sp500Fred,
    Sp500Constituents,
    UsEquities,
    FredAssets,
    Mnist,
    FashionMnist,
}

impl Dataset {
    pub const ALL: [Dataset; 8] = [
        Dataset::WikiPrices,
        Dataset::WikiStocks,
        Dataset::Sp500Fred,
        Dataset::Sp500Constituents,
        Dataset::UsEquities,
        Dataset::FredAssets,
        Dataset::Mnist,
        Dataset::FashionMnist,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dataset::WikiPrices => "wiki-prices",
            Dataset::WikiStocks => "wiki-stocks",
            Dataset::Sp500Fred => "sp500-fred",
            Dataset::Sp500Constituents => "sp500-constituents",
            Dataset::UsEquities => "us-equities",
            Dataset::FredAssets => "fred-assets",
            Dataset::Mnist => "mnist",
            Dataset::FashionMnist => "fashion-mnist",
        }
    }

    /// Store keys this dataset writes.
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            Dataset::WikiPrices => &[KEY_WIKI_PRICES],
            Dataset::WikiStocks => &[KEY_WIKI_STOCKS],
            Dataset::Sp500Fred => &[KEY_SP500_FRED],
            Dataset::Sp500Constituents => &[KEY_SP500_STOCKS],
            Dataset::UsEquities => &[KEY_US_EQUITIES],
            Dataset::FredAssets => &[KEY_FRED_ASSETS],
            Dataset::Mnist => &["mnist/data", "mnist/labels"],
            Dataset::FashionMnist => &[
                "fashion_mnist/data",
                "fashion_mnist/labels",
                "fashion_mnist/label_names",
            ],
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dataset::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Dataset::ALL.iter().map(|d| d.name()).collect();
                format!("unknown dataset '{s}'. Valid: {}", valid.join(", "))
            })
    }
}

#[derive(Debug, Error)]
pub enum ImportFailure {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A dataset failed; the run stops here.
#[derive(Debug, Error)]
#[error("import of {dataset} failed: {failure}")]
pub struct ImportError {
    pub dataset: Dataset,
    #[source]
    pub failure: ImportFailure,
}

/// Keys written by a completed run.
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub written: Vec<(Dataset, Vec<String>)>,
}

impl ImportSummary {
    pub fn key_count(&self) -> usize {
        self.written.iter().map(|(_, keys)| keys.len()).sum()
    }
}

/// Runs dataset imports against one store.
pub struct Importer<'a> {
    config: &'a ImportConfig,
    http: &'a dyn HttpFetch,
}

impl<'a> Importer<'a> {
    pub fn new(config: &'a ImportConfig, http: &'a dyn HttpFetch) -> Self {
        Self { config, http }
    }

    /// Import `datasets` in order, stopping at the first failure.
    pub fn import_all(
        &self,
        datasets: &[Dataset],
        store: &mut KeyedStore,
    ) -> Result<ImportSummary, ImportError> {
        let mut summary = ImportSummary::default();
        for (i, dataset) in datasets.iter().enumerate() {
            info!("[{}/{}] importing {dataset}", i + 1, datasets.len());
            let keys = self.import(*dataset, store)?;
            summary.written.push((*dataset, keys));
        }
        info!(
            datasets = datasets.len(),
            keys = summary.key_count(),
            "import complete"
        );
        Ok(summary)
    }

    /// Import a single dataset, returning the keys it wrote.
    pub fn import(&self, dataset: Dataset, store: &mut KeyedStore) -> Result<Vec<String>, ImportError> {
        let result = match dataset {
            Dataset::WikiPrices => self.wiki_prices(store),
            Dataset::WikiStocks => self.wiki_stocks(store),
            Dataset::Sp500Fred => self.sp500_fred(store),
            Dataset::Sp500Constituents => self.sp500_constituents(store),
            Dataset::UsEquities => self.us_equities(store),
            Dataset::FredAssets => self.fred_assets(store),
            Dataset::Mnist => self.images(store, "mnist", "mnist_784", None),
            Dataset::FashionMnist => {
                self.images(store, "fashion_mnist", "Fashion-MNIST", Some(&images::FASHION_LABELS[..]))
            }
        };
        result.map_err(|failure| ImportError { dataset, failure })
    }

    fn put_table(
        store: &mut KeyedStore,
        key: &str,
        frame: &IndexedFrame,
        source: &str,
    ) -> Result<Vec<String>, ImportFailure> {
        store.put_table(key, frame, source)?;
        Ok(vec![key.to_string()])
    }

    fn wiki_prices(&self, store: &mut KeyedStore) -> Result<Vec<String>, ImportFailure> {
        let df = csv_file::read_csv(&self.config.input(&self.config.wiki_prices_file))?;
        let frame = prices::index_prices(df)?;
        Self::put_table(store, KEY_WIKI_PRICES, &frame, "quandl_wiki_csv")
    }

    fn wiki_stocks(&self, store: &mut KeyedStore) -> Result<Vec<String>, ImportFailure> {
        let df = csv_file::read_csv(&self.config.input(&self.config.wiki_stocks_file))?;
        Self::put_table(store, KEY_WIKI_STOCKS, &IndexedFrame::flat(df), "quandl_wiki_csv")
    }

    fn sp500_fred(&self, store: &mut KeyedStore) -> Result<Vec<String>, ImportFailure> {
        let fred = FredProvider::new(self.http, &self.config.fred_base_url);
        let series = fred.fetch_series("SP500", self.config.sp500_start)?;
        let frame = SeriesTable::merge(&[series])
            .rename(&[("SP500", "close")])
            .to_frame()?;
        Self::put_table(store, KEY_SP500_FRED, &frame, "fred")
    }

    fn sp500_constituents(&self, store: &mut KeyedStore) -> Result<Vec<String>, ImportFailure> {
        let table = wikipedia::fetch_first_table(self.http, &self.config.wikipedia_url)?;
        let frame = constituents::from_html_table(&table)?;
        Self::put_table(store, KEY_SP500_STOCKS, &frame, "wikipedia")
    }

    fn us_equities(&self, store: &mut KeyedStore) -> Result<Vec<String>, ImportFailure> {
        let (df, source) = match self.config.us_equities_source {
            EquitiesSource::Local => (
                csv_file::read_csv(&self.config.input(&self.config.us_equities_file))?,
                "local_csv",
            ),
            EquitiesSource::ExchangeListing => (
                listing::fetch_listings(
                    self.http,
                    &self.config.listing_url_template,
                    &self.config.listing_exchanges,
                )?,
                "exchange_listing",
            ),
        };
        let frame = reference::normalize_equities(df)?;
        Self::put_table(store, KEY_US_EQUITIES, &frame, source)
    }

    fn fred_assets(&self, store: &mut KeyedStore) -> Result<Vec<String>, ImportFailure> {
        let fred = FredProvider::new(self.http, &self.config.fred_base_url);
        let ids: Vec<&str> = FRED_ASSETS.iter().map(|(id, _)| *id).collect();
        let series = fred.fetch_many(&ids, self.config.fred_assets_start)?;

        let table = SeriesTable::merge(&series)
            .rename(&FRED_ASSETS)
            .drop_all_missing()
            .resample_business_days();
        info!(rows = table.len(), "resampled FRED assets to business days");
        Self::put_table(store, KEY_FRED_ASSETS, &table.to_frame()?, "fred")
    }

    fn images(
        &self,
        store: &mut KeyedStore,
        prefix: &str,
        openml_name: &str,
        label_names: Option<&[(u8, &str)]>,
    ) -> Result<Vec<String>, ImportFailure> {
        let openml = OpenMlProvider::new(self.http, &self.config.openml_base_url);
        let data = openml.fetch_images(openml_name, 1)?;
        let (pixels, labels) = images::to_arrays(data)?;

        let data_key = format!("{prefix}/data");
        let labels_key = format!("{prefix}/labels");
        store.put_array(&data_key, &pixels, "openml")?;
        store.put_array(&labels_key, &labels, "openml")?;
        let mut keys = vec![data_key, labels_key];

        if let Some(names) = label_names {
            let names_key = format!("{prefix}/label_names");
            store.put_table(&names_key, &images::label_names(names)?, "static")?;
            keys.push(names_key);
        }
        Ok(keys)
    }
}
