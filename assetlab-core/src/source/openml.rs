//! OpenML dataset provider.
//!
//! Resolution goes name + version -> dataset id -> description (ARFF URL and
//! default target attribute) -> ARFF payload.

use super::arff::{self, ImageData};
use super::{HttpFetch, SourceError};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct ListResponse {
    data: ListData,
}

#[derive(Debug, Deserialize)]
struct ListData {
    dataset: Vec<ListedDataset>,
}

#[derive(Debug, Deserialize)]
struct ListedDataset {
    did: u64,
}

#[derive(Debug, Deserialize)]
struct DescriptionResponse {
    data_set_description: Description,
}

#[derive(Debug, Deserialize)]
struct Description {
    name: String,
    url: String,
    default_target_attribute: Option<String>,
}

/// OpenML provider bound to an API base URL (e.g. `https://www.openml.org`).
pub struct OpenMlProvider<'a> {
    http: &'a dyn HttpFetch,
    base_url: String,
}

impl<'a> OpenMlProvider<'a> {
    pub fn new(http: &'a dyn HttpFetch, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn api(&self, path: &str) -> String {
        format!("{}/api/v1/json/{path}", self.base_url.trim_end_matches('/'))
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, SourceError> {
        let body = self.http.get_text(url)?;
        serde_json::from_str(&body)
            .map_err(|e| SourceError::ResponseFormatChanged(format!("{url}: {e}")))
    }

    /// Look up the dataset id for an active dataset name and version.
    pub fn resolve_id(&self, name: &str, version: u32) -> Result<u64, SourceError> {
        let url = self.api(&format!(
            "data/list/data_name/{name}/data_version/{version}/limit/1/status/active"
        ));
        let list: ListResponse = self.get_json(&url)?;
        list.data
            .dataset
            .first()
            .map(|d| d.did)
            .ok_or_else(|| {
                SourceError::ResponseFormatChanged(format!("no active OpenML dataset {name} v{version}"))
            })
    }

    /// Fetch and decode a dataset as u8 pixels and labels.
    pub fn fetch_images(&self, name: &str, version: u32) -> Result<ImageData, SourceError> {
        let id = self.resolve_id(name, version)?;
        let desc: DescriptionResponse = self.get_json(&self.api(&format!("data/{id}")))?;
        let desc = desc.data_set_description;
        let target = desc.default_target_attribute.as_deref().unwrap_or("class");

        info!(dataset = %desc.name, id, url = %desc.url, "downloading OpenML ARFF");
        let text = self.http.get_text(&desc.url)?;
        let data = arff::parse(&text, target)?;
        info!(dataset = %desc.name, rows = data.rows, features = data.features, "decoded OpenML dataset");
        Ok(data)
    }
}
