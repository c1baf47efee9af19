/// SQL-over-HTTP warehouse client
///
/// Submits the configured profiles query to `POST {url}/api/v2/statements`
/// and maps the result set onto [`UpsertProfile`] by column name. Large
/// results arrive in partitions; the first comes with the submit response,
/// the rest are fetched from `GET {url}/api/v2/statements/{handle}?partition=N`.

use super::{ProfileSource, WarehouseError};
use crate::config::WarehouseConfig;
use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wizelabs_shared::models::profile::UpsertProfile;

/// Cells come back as strings, `null` for SQL NULL
type Row = Vec<Option<String>>;

#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warehouse: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ColumnType {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetMetaData {
    #[serde(default)]
    row_type: Vec<ColumnType>,
    #[serde(default)]
    partition_info: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    #[serde(default)]
    result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    data: Vec<Row>,
    statement_handle: Option<String>,
}

pub struct WarehouseClient {
    http: reqwest::Client,
    config: WarehouseConfig,
}

impl WarehouseClient {
    pub fn new(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("wizelabs-worker/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, config })
    }

    /// Runs a statement and returns its column names and every row
    async fn execute(&self, statement: &str) -> Result<(Vec<String>, Vec<Row>), WarehouseError> {
        let body = StatementRequest {
            statement,
            timeout: self.config.timeout.as_secs(),
            database: self.config.database.as_deref(),
            schema: self.config.schema.as_deref(),
            warehouse: self.config.warehouse.as_deref(),
        };

        let response = self
            .http
            .post(format!("{}/api/v2/statements", self.config.url))
            .bearer_auth(&self.config.token)
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let first = Self::read(response).await?;
        let meta = first.result_set_meta_data.unwrap_or_default();
        let columns: Vec<String> = meta.row_type.into_iter().map(|c| c.name).collect();

        if columns.is_empty() && !first.data.is_empty() {
            return Err(WarehouseError::Parse("rows without column metadata".to_string()));
        }
        let mut rows = first.data;

        if meta.partition_info.len() > 1 {
            let handle = first.statement_handle.ok_or_else(|| {
                WarehouseError::Parse("partitioned result without a statement handle".to_string())
            })?;

            for partition in 1..meta.partition_info.len() {
                let response = self
                    .http
                    .get(format!("{}/api/v2/statements/{}", self.config.url, handle))
                    .query(&[("partition", partition)])
                    .bearer_auth(&self.config.token)
                    .header(header::ACCEPT, "application/json")
                    .send()
                    .await?;

                let page = Self::read(response).await?;
                rows.extend(page.data);
            }
        }

        Ok((columns, rows))
    }

    async fn read(response: reqwest::Response) -> Result<StatementResponse, WarehouseError> {
        let status = response.status();

        if status == StatusCode::ACCEPTED {
            return Err(WarehouseError::Parse(
                "statement still running after the configured timeout".to_string(),
            ));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WarehouseError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        response
            .json::<StatementResponse>()
            .await
            .map_err(|e| WarehouseError::Parse(e.to_string()))
    }
}

/// Maps positional rows onto profiles by (case-insensitive) column name
///
/// Rows missing an email are dropped; unknown columns are ignored.
pub fn map_profiles(columns: &[String], rows: &[Row]) -> Vec<UpsertProfile> {
    let index: HashMap<String, usize> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_lowercase(), i))
        .collect();

    let cell = |row: &Row, name: &str| -> Option<String> {
        index
            .get(name)
            .and_then(|&i| row.get(i).cloned().flatten())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    rows.iter()
        .filter_map(|row| {
            Some(UpsertProfile {
                email: cell(row, "email")?,
                first_name: cell(row, "first_name").unwrap_or_default(),
                last_name: cell(row, "last_name").unwrap_or_default(),
                avatar_url: cell(row, "avatar_url"),
                department: cell(row, "department"),
                job_title: cell(row, "job_title"),
                location: cell(row, "location"),
                business_unit: cell(row, "business_unit"),
            })
        })
        .collect()
}

#[async_trait]
impl ProfileSource for WarehouseClient {
    fn name(&self) -> &str {
        "warehouse"
    }

    async fn fetch_active_profiles(&self) -> Result<Vec<UpsertProfile>, WarehouseError> {
        let (columns, rows) = self.execute(&self.config.profiles_query).await?;

        let total = rows.len();
        let profiles = map_profiles(&columns, &rows);
        if profiles.len() < total {
            tracing::warn!(dropped = total - profiles.len(), "Warehouse rows without email");
        }

        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn row(cells: &[Option<&str>]) -> Row {
        cells.iter().map(|c| c.map(str::to_string)).collect()
    }

    #[test]
    fn test_maps_by_name_case_insensitive() {
        let columns = columns(&["FIRST_NAME", "Email", "LAST_NAME", "DEPARTMENT", "EXTRA"]);
        let rows = vec![row(&[
            Some("Ada"),
            Some("ada@wizeline.com"),
            Some("Lovelace"),
            Some("Engineering"),
            Some("ignored"),
        ])];

        let profiles = map_profiles(&columns, &rows);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].email, "ada@wizeline.com");
        assert_eq!(profiles[0].first_name, "Ada");
        assert_eq!(profiles[0].last_name, "Lovelace");
        assert_eq!(profiles[0].department.as_deref(), Some("Engineering"));
        assert_eq!(profiles[0].job_title, None);
    }

    #[test]
    fn test_rows_without_email_dropped() {
        let columns = columns(&["email", "first_name"]);
        let rows = vec![
            row(&[None, Some("Ghost")]),
            row(&[Some("  "), Some("Blank")]),
            row(&[Some("grace@wizeline.com"), None]),
        ];

        let profiles = map_profiles(&columns, &rows);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].email, "grace@wizeline.com");
        assert_eq!(profiles[0].first_name, "");
    }

    #[test]
    fn test_short_rows_and_blank_cells() {
        let columns = columns(&["email", "job_title", "location"]);
        let rows = vec![row(&[Some("alan@wizeline.com"), Some(" ")])];

        let profiles = map_profiles(&columns, &rows);
        assert_eq!(profiles[0].job_title, None);
        assert_eq!(profiles[0].location, None);
    }

    #[test]
    fn test_statement_response_shape() {
        let response: StatementResponse = serde_json::from_value(json!({
            "statementHandle": "01b2-0000",
            "resultSetMetaData": {
                "numRows": 2,
                "rowType": [{"name": "EMAIL", "type": "text"}, {"name": "FIRST_NAME", "type": "text"}],
                "partitionInfo": [{"rowCount": 2}]
            },
            "data": [["a@wizeline.com", "A"], ["b@wizeline.com", null]]
        }))
        .unwrap();

        let meta = response.result_set_meta_data.unwrap();
        assert_eq!(meta.row_type.len(), 2);
        assert_eq!(meta.partition_info.len(), 1);
        assert_eq!(response.data[1][1], None);
        assert_eq!(response.statement_handle.as_deref(), Some("01b2-0000"));
    }

    #[test]
    fn test_request_body_omits_unset_context() {
        let body = StatementRequest {
            statement: "SELECT 1",
            timeout: 60,
            database: Some("HR"),
            schema: None,
            warehouse: None,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, json!({"statement": "SELECT 1", "timeout": 60, "database": "HR"}));
    }

    #[test]
    fn test_client_name() {
        let client = WarehouseClient::new(WarehouseConfig {
            url: "https://acct.warehouse.example.com".to_string(),
            token: "token".to_string(),
            database: None,
            schema: None,
            warehouse: None,
            profiles_query: "SELECT 1".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();

        assert_eq!(client.name(), "warehouse");
    }
}
