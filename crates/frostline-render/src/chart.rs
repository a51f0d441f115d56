use serde::Serialize;

use frostline_core::{ColumnKind, QueryResult};

/// How a result set is presented next to its table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ResultView {
    /// Zero or one row: the table alone.
    Table,
    /// Table plus line and bar charts of the same data.
    Tabbed { line: Chart, bar: Chart },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    /// Name of the index axis; `None` when the row position is the index.
    pub index_name: Option<String>,
    /// One label per row.
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    /// One value per row; `None` for NULL or unparseable cells.
    pub values: Vec<Option<f64>>,
}

impl ResultView {
    pub fn for_result(result: &QueryResult) -> Self {
        if result.row_count() <= 1 || result.column_count() == 0 {
            return ResultView::Table;
        }
        let (index_name, labels, series) = axes(result);
        let chart = |kind| Chart {
            kind,
            index_name: index_name.clone(),
            labels: labels.clone(),
            series: series.clone(),
        };
        ResultView::Tabbed {
            line: chart(ChartKind::Line),
            bar: chart(ChartKind::Bar),
        }
    }

    pub fn is_tabbed(&self) -> bool {
        matches!(self, ResultView::Tabbed { .. })
    }
}

fn axes(result: &QueryResult) -> (Option<String>, Vec<String>, Vec<Series>) {
    let column_values = |col: usize| -> Vec<Option<f64>> {
        (0..result.row_count()).map(|row| result.number(row, col)).collect()
    };

    if result.column_count() == 1 {
        let labels = (0..result.row_count()).map(|i| i.to_string()).collect();
        let series = vec![Series {
            name: result.columns[0].name.clone(),
            values: column_values(0),
        }];
        return (None, labels, series);
    }

    let labels = result
        .rows
        .iter()
        .map(|row| row.first().cloned().flatten().unwrap_or_default())
        .collect();
    let series = result
        .columns
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, c)| c.kind == ColumnKind::Numeric)
        .map(|(i, c)| Series {
            name: c.name.clone(),
            values: column_values(i),
        })
        .collect();
    (Some(result.columns[0].name.clone()), labels, series)
}
