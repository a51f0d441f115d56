use std::time::Duration;

use serde::Deserialize;

use frostline_core::dataset::{DATABASE, SCHEMA};
use frostline_core::{Column, FrostlineError, QueryResult, Result, Warehouse};

use crate::http::{error_message, HttpTransport, RawResponse};

const SERVICE: &str = "warehouse";

pub const STATEMENTS_PATH: &str = "/api/v2/statements";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Runs SQL through the statements REST API and materialises every partition.
pub struct WarehouseClient<'a> {
    http: &'a dyn HttpTransport,
    warehouse: Option<String>,
    role: Option<String>,
    poll_interval: Duration,
}

impl<'a> WarehouseClient<'a> {
    pub fn new(http: &'a dyn HttpTransport) -> Self {
        Self {
            http,
            warehouse: None,
            role: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_warehouse(mut self, warehouse: Option<String>) -> Self {
        self.warehouse = warehouse;
        self
    }

    pub fn with_role(mut self, role: Option<String>) -> Self {
        self.role = role;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn submit(&self, sql: &str) -> Result<StatementBody> {
        let body = request_body(sql, self.warehouse.as_deref(), self.role.as_deref());
        let mut raw = self.http.post_json(SERVICE, STATEMENTS_PATH, &body, None)?;
        let mut polls = 0u32;
        loop {
            match parse_status(&raw)? {
                Progress::Done(body) => {
                    if polls > 0 {
                        tracing::debug!(polls, "statement finished");
                    }
                    return Ok(body);
                }
                Progress::Running(status_url) => {
                    polls += 1;
                    std::thread::sleep(self.poll_interval);
                    raw = self.http.get(SERVICE, &status_url)?;
                }
            }
        }
    }
}

impl Warehouse for WarehouseClient<'_> {
    fn query(&self, sql: &str) -> Result<QueryResult> {
        let first = self.submit(sql)?;
        let meta = first
            .result_set_meta_data
            .ok_or_else(|| FrostlineError::SqlExecution("statement returned no result set".into()))?;
        let columns: Vec<Column> = meta.row_type.iter().map(RowType::column).collect();

        let mut rows = convert_rows(first.data.unwrap_or_default(), columns.len())?;
        if meta.partition_info.len() > 1 {
            let handle = first.statement_handle.ok_or_else(|| {
                FrostlineError::SqlExecution("partitioned result without statement handle".into())
            })?;
            for partition in 1..meta.partition_info.len() {
                let raw = self.http.get(SERVICE, &partition_path(&handle, partition))?;
                let page = parse_partition(&raw)?;
                rows.extend(convert_rows(page, columns.len())?);
            }
        }
        tracing::debug!(
            columns = columns.len(),
            rows = rows.len(),
            partitions = meta.partition_info.len().max(1),
            "statement result materialised"
        );
        Ok(QueryResult { columns, rows })
    }
}

// ── Wire format ──

/// Statement submission body. Unset warehouse/role fall back to the user's defaults.
pub fn request_body(sql: &str, warehouse: Option<&str>, role: Option<&str>) -> serde_json::Value {
    let mut body = serde_json::json!({
        "statement": sql,
        "database": DATABASE,
        "schema": SCHEMA,
        "timeout": 0,
    });
    if let Some(w) = warehouse {
        body["warehouse"] = serde_json::Value::from(w);
    }
    if let Some(r) = role {
        body["role"] = serde_json::Value::from(r);
    }
    body
}

pub fn partition_path(handle: &str, partition: usize) -> String {
    format!("{STATEMENTS_PATH}/{handle}?partition={partition}")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementBody {
    statement_handle: Option<String>,
    statement_status_url: Option<String>,
    result_set_meta_data: Option<ResultMeta>,
    data: Option<Vec<Vec<serde_json::Value>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultMeta {
    #[serde(default)]
    row_type: Vec<RowType>,
    #[serde(default)]
    partition_info: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RowType {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

impl RowType {
    fn column(&self) -> Column {
        if is_numeric_type(&self.kind) {
            Column::numeric(&self.name)
        } else {
            Column::text(&self.name)
        }
    }
}

pub fn is_numeric_type(kind: &str) -> bool {
    matches!(
        kind.to_ascii_lowercase().as_str(),
        "fixed" | "real" | "decfloat"
    )
}

enum Progress {
    Done(StatementBody),
    Running(String),
}

fn parse_status(raw: &RawResponse) -> Result<Progress> {
    if raw.status >= 400 {
        return Err(FrostlineError::SqlExecution(error_message(&raw.body)));
    }
    let body: StatementBody =
        serde_json::from_str(&raw.body).map_err(|e| FrostlineError::decode(SERVICE, e))?;
    if raw.status == 202 {
        let url = body.statement_status_url.clone().ok_or_else(|| {
            FrostlineError::SqlExecution("statement still running but no status url given".into())
        })?;
        return Ok(Progress::Running(url));
    }
    Ok(Progress::Done(body))
}

fn parse_partition(raw: &RawResponse) -> Result<Vec<Vec<serde_json::Value>>> {
    if raw.status >= 400 {
        return Err(FrostlineError::SqlExecution(error_message(&raw.body)));
    }
    let body: StatementBody =
        serde_json::from_str(&raw.body).map_err(|e| FrostlineError::decode(SERVICE, e))?;
    Ok(body.data.unwrap_or_default())
}

fn convert_rows(
    data: Vec<Vec<serde_json::Value>>,
    width: usize,
) -> Result<Vec<Vec<Option<String>>>> {
    data.into_iter()
        .map(|row| {
            if row.len() != width {
                return Err(FrostlineError::SqlExecution(format!(
                    "row has {} cells, expected {width}",
                    row.len()
                )));
            }
            Ok(row.into_iter().map(cell).collect())
        })
        .collect()
}

fn cell(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
