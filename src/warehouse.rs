use std::path::Path;

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::WarehouseConfig;
use crate::date_range::DateWindow;

const DEFAULT_CACHE_FILE: &str = "warehouse_api_key.txt";

#[derive(Debug, thiserror::Error)]
pub enum GetApiKeyError {
    #[error("warehouse API key was not specified and the cache file does not exist.")]
    MissingApiKey,
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

pub fn get_api_key(new_api_key: Option<String>) -> Result<String, GetApiKeyError> {
    let cache_file = Path::new(DEFAULT_CACHE_FILE);

    if let Some(new_api_key) = new_api_key {
        if let Err(err) = std::fs::write(cache_file, &new_api_key) {
            warn!("failed to cache new API key in file: {}", err);
        } else {
            info!("cached new API key in file");
        }
        Ok(new_api_key)
    } else if cache_file.exists() {
        let api_key = std::fs::read_to_string(cache_file)?;
        info!("loaded API key from cache file");
        Ok(api_key)
    } else {
        Err(GetApiKeyError::MissingApiKey)
    }
}

/// A blocking client for the warehouse's query endpoint: POST a SQL string,
/// get a full tabular result set back as JSON rows.
pub struct SqlClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl SqlClient {
    pub fn new(config: &WarehouseConfig, api_key: String) -> Self {
        Self { http: Client::new(), endpoint: config.endpoint.clone(), api_key }
    }

    /// Runs a query and deserializes each result row into `T`. Rows that
    /// fail to deserialize are logged and skipped rather than aborting the
    /// whole report.
    pub fn rows<T: DeserializeOwned>(&self, sql: &str) -> anyhow::Result<Vec<T>> {
        #[derive(Deserialize)]
        struct ApiResponse {
            #[serde(rename = "totalRows", default)]
            total_rows: Option<u64>,
            rows: Vec<serde_json::Value>,
        }

        let response: ApiResponse = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&serde_json::json!({ "query": sql }))
            .send()?
            .error_for_status()?
            .json()?;
        match response.total_rows {
            Some(total) => info!("received {} of {} rows", response.rows.len(), total),
            None => info!("received {} rows", response.rows.len()),
        }

        Ok(response
            .rows
            .into_iter()
            .filter_map(|value| {
                serde_json::from_value(value)
                    .inspect_err(|err| warn!("error deserializing row: {}", err))
                    .ok()
            })
            .collect())
    }
}

/// The wildcard over the dataset's daily event tables.
pub fn events_table(dataset: &str) -> String {
    format!("`{}.events_*`", dataset)
}

/// The daily-table suffix bound shared by every report query.
pub fn suffix_bounds(window: &DateWindow) -> String {
    format!("_TABLE_SUFFIX BETWEEN '{}' AND '{}'", window.start, window.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_fragments() {
        let window = DateWindow { start: "20200606".to_owned(), end: "20200701".to_owned() };
        assert_eq!(events_table("analytics_178973991"), "`analytics_178973991.events_*`");
        assert_eq!(
            suffix_bounds(&window),
            "_TABLE_SUFFIX BETWEEN '20200606' AND '20200701'"
        );
    }
}
