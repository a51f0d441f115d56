use frostline_core::{Result, Warehouse};

use crate::chart::ResultView;
use crate::surface::Surface;
use crate::table;

pub const RUNNING_SQL: &str = "Running SQL...";

/// Runs generated SQL and shows the result with the view that fits its shape.
pub struct SqlExecutor<'a> {
    warehouse: &'a dyn Warehouse,
}

impl<'a> SqlExecutor<'a> {
    pub fn new(warehouse: &'a dyn Warehouse) -> Self {
        Self { warehouse }
    }

    /// Show the statement, execute it and return the markdown of the full
    /// result set.
    pub fn execute(&self, surface: &mut dyn Surface, sql: &str) -> Result<String> {
        surface.sql(sql)?;
        surface.status(RUNNING_SQL)?;
        let result = self.warehouse.query(sql)?;
        let markdown = table::to_markdown(&result);
        let view = ResultView::for_result(&result);
        tracing::info!(
            rows = result.row_count(),
            columns = result.column_count(),
            tabbed = view.is_tabbed(),
            "sql executed"
        );
        surface.result(&result, &markdown, &view)?;
        Ok(markdown)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use frostline_core::{Column, FrostlineError, QueryResult, Result, Warehouse};

    /// Returns one fixed result (or error) and records the SQL it was given.
    /// With `echo` set, the result is instead a single cell holding the SQL.
    pub struct FixedWarehouse {
        pub result: std::result::Result<QueryResult, String>,
        pub echo: bool,
        pub seen: RefCell<Vec<String>>,
    }

    impl FixedWarehouse {
        pub fn rows(n: usize) -> Self {
            Self {
                result: Ok(QueryResult {
                    columns: vec![Column::text("REGION"), Column::numeric("LTV")],
                    rows: (0..n)
                        .map(|i| vec![Some(format!("R{i}")), Some(i.to_string())])
                        .collect(),
                }),
                echo: false,
                seen: RefCell::new(Vec::new()),
            }
        }

        pub fn echo() -> Self {
            Self {
                echo: true,
                ..Self::rows(0)
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                result: Err(message.to_string()),
                echo: false,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Warehouse for FixedWarehouse {
        fn query(&self, sql: &str) -> Result<QueryResult> {
            self.seen.borrow_mut().push(sql.to_string());
            if self.echo {
                return Ok(QueryResult {
                    columns: vec![Column::text("STATEMENT")],
                    rows: vec![vec![Some(sql.to_string())]],
                });
            }
            self.result.clone().map_err(FrostlineError::SqlExecution)
        }
    }
}
