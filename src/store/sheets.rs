//! Spreadsheet web-app record store
//!
//! Talks to a script deployed in front of the spreadsheet:
//! - Read: `GET <url>?action=read&sheet=<Entity>` returning `{status, data, message}`
//! - Write: `POST <url>` with `{action: "update", sheet, id, row}` where `row`
//!   is the record laid out in the entity's column order
//!
//! Cells come back as JSON scalars; they are flattened to strings so every
//! adapter hands out the same `Record` shape.

use crate::errors::{FinanceError, Result};
use crate::store::{flatten_row, Entity, Record, RecordStore};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Request timeout (30 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Spreadsheet web-app client
#[derive(Debug, Clone)]
pub struct SheetsStore {
    client: Client,
    base_url: String,
}

/// Envelope returned by the web app
#[derive(Debug, Deserialize)]
struct SheetResponse {
    status: String,
    #[serde(default)]
    data: Vec<Map<String, Value>>,
    #[serde(default)]
    message: Option<String>,
}

/// Body of a write request
#[derive(Debug, Serialize)]
struct WriteRequest<'a> {
    action: &'static str,
    sheet: &'static str,
    id: &'a str,
    row: Vec<String>,
}

impl SheetsStore {
    /// Create a client for the web app deployed at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(FinanceError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Web app URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Turn the web app's read envelope into records
fn decode_read(entity: Entity, body: &str) -> Result<Vec<Record>> {
    let response: SheetResponse = serde_json::from_str(body)?;
    if response.status != "ok" {
        return Err(FinanceError::StoreRead {
            entity: entity.to_string(),
            reason: response
                .message
                .unwrap_or_else(|| "Failed to read sheet".to_string()),
        });
    }

    Ok(response.data.into_iter().map(flatten_row).collect())
}

#[async_trait]
impl RecordStore for SheetsStore {
    async fn read_all(&self, entity: Entity) -> Result<Vec<Record>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("action", "read"), ("sheet", entity.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FinanceError::StoreRead {
                entity: entity.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let body = response.text().await?;
        decode_read(entity, &body)
    }

    async fn write_record(&self, entity: Entity, id: &str, mut fields: Record) -> Result<()> {
        fields.insert("id".to_string(), id.to_string());
        let request = WriteRequest {
            action: "update",
            sheet: entity.as_str(),
            id,
            row: entity.to_row(&fields),
        };

        let write_err = |reason: String| FinanceError::StoreWrite {
            entity: entity.to_string(),
            id: id.to_string(),
            reason,
        };

        // text/plain keeps the web app from requiring a preflight
        let response = self
            .client
            .post(&self.base_url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(serde_json::to_string(&request)?)
            .send()
            .await
            .map_err(|e| write_err(e.to_string()))?;

        if !response.status().is_success() {
            return Err(write_err(format!("HTTP {}", response.status())));
        }

        // Some deployments answer with an empty or opaque body; only an explicit error status counts
        let body = response.text().await.unwrap_or_default();
        if let Ok(reply) = serde_json::from_str::<SheetResponse>(&body) {
            if reply.status != "ok" {
                return Err(write_err(
                    reply.message.unwrap_or_else(|| reply.status.clone()),
                ));
            }
        }

        Ok(())
    }
}
