use frostline_core::{ColumnKind, QueryResult};

/// Render a result set as a GitHub-style pipe table. Every row is included.
///
/// Numeric columns are right aligned, text columns left aligned. NULL cells
/// render empty; `|` inside a cell is escaped and newlines become spaces so a
/// cell never breaks the table.
pub fn to_markdown(result: &QueryResult) -> String {
    let mut out = String::new();

    out.push('|');
    for col in &result.columns {
        out.push(' ');
        out.push_str(&escape(&col.name));
        out.push_str(" |");
    }
    out.push('\n');

    out.push('|');
    for col in &result.columns {
        out.push_str(match col.kind {
            ColumnKind::Numeric => "--:|",
            ColumnKind::Text => ":--|",
        });
    }
    out.push('\n');

    for row in &result.rows {
        out.push('|');
        for cell in row {
            out.push(' ');
            if let Some(v) = cell {
                out.push_str(&escape(v));
            }
            out.push_str(" |");
        }
        out.push('\n');
    }
    out
}

fn escape(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use frostline_core::Column;

    fn sample(rows: usize) -> QueryResult {
        QueryResult {
            columns: vec![Column::text("REGION"), Column::numeric("LTV")],
            rows: (0..rows)
                .map(|i| vec![Some(format!("R{i}")), Some(format!("{}", i * 10))])
                .collect(),
        }
    }

    #[test]
    fn header_alignment_and_rows() {
        let md = to_markdown(&sample(2));
        assert_eq!(
            md,
            "| REGION | LTV |\n|:--|--:|\n| R0 | 0 |\n| R1 | 10 |\n"
        );
    }

    #[test]
    fn nulls_render_empty_and_pipes_escape() {
        let result = QueryResult {
            columns: vec![Column::text("NAME"), Column::numeric("N")],
            rows: vec![vec![Some("a|b".into()), None]],
        };
        assert_eq!(to_markdown(&result), "| NAME | N |\n|:--|--:|\n| a\\|b |  |\n");
    }

    #[test]
    fn newlines_inside_cells_are_flattened() {
        let result = QueryResult {
            columns: vec![Column::text("NOTE")],
            rows: vec![vec![Some("line one\nline two".into())]],
        };
        assert!(to_markdown(&result).contains("| line one line two |"));
    }

    #[test]
    fn never_truncates() {
        let md = to_markdown(&sample(5_000));
        assert_eq!(md.lines().count(), 5_002);
        assert!(md.contains("| R4999 | 49990 |"));
    }

    #[test]
    fn empty_result_keeps_header() {
        let md = to_markdown(&sample(0));
        assert_eq!(md, "| REGION | LTV |\n|:--|--:|\n");
    }
}
