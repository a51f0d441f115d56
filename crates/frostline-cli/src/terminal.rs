use std::io::{self, Write};

use frostline_core::{QueryResult, Role};
use frostline_render::{Chart, ResultView, Surface};

pub const RETRIEVED_PROMPT_HEADER: &str = "Using following retrieved prompt for summarization";

const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const BAR_WIDTH: usize = 30;

/// Plain-text chat surface over any writer.
pub struct TerminalSurface<W: Write> {
    out: W,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Direct access for REPL chrome (prompts, help, notices).
    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn charts(&mut self, view: &ResultView) -> io::Result<()> {
        let ResultView::Tabbed { line, bar } = view else {
            return Ok(());
        };
        writeln!(self.out, "\nLine chart{}:", index_suffix(line))?;
        for row in line_rows(line) {
            writeln!(self.out, "  {row}")?;
        }
        writeln!(self.out, "\nBar chart{}:", index_suffix(bar))?;
        for row in bar_rows(bar) {
            writeln!(self.out, "  {row}")?;
        }
        Ok(())
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn begin_message(&mut self, role: Role) -> io::Result<()> {
        writeln!(self.out, "\n── {} ──", role.display_name())
    }

    fn request_id(&mut self, id: &str) -> io::Result<()> {
        writeln!(self.out, "Request ID: {id}")
    }

    fn text(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    fn suggestions(
        &mut self,
        _message_index: usize,
        first: Option<usize>,
        suggestions: &[String],
    ) -> io::Result<()> {
        let Some(first) = first else {
            writeln!(self.out, "Suggestions (earlier):")?;
            for s in suggestions {
                writeln!(self.out, "  - {s}")?;
            }
            return Ok(());
        };
        writeln!(self.out, "Suggestions (use /pick N):")?;
        for (i, s) in suggestions.iter().enumerate() {
            writeln!(self.out, "  [{}] {s}", first + i)?;
        }
        Ok(())
    }

    fn sql(&mut self, statement: &str) -> io::Result<()> {
        writeln!(self.out, "SQL Query:\n```sql\n{}\n```", statement.trim_end())
    }

    fn result(
        &mut self,
        result: &QueryResult,
        markdown: &str,
        view: &ResultView,
    ) -> io::Result<()> {
        writeln!(self.out, "Results ({} rows):", result.row_count())?;
        write!(self.out, "{markdown}")?;
        self.charts(view)
    }

    fn cached_result(&mut self, markdown: &str) -> io::Result<()> {
        writeln!(self.out, "Results (from this session):")?;
        write!(self.out, "{markdown}")
    }

    fn status(&mut self, status: &str) -> io::Result<()> {
        writeln!(self.out, "… {status}")?;
        self.out.flush()
    }

    fn retrieved_prompt(&mut self, prompt: &str) -> io::Result<()> {
        writeln!(self.out, "\n{RETRIEVED_PROMPT_HEADER}:\n{prompt}")
    }

    fn summary(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "\nSummary:\n{text}")
    }

    fn placeholder(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }
}

// ── Chart drawing ──

fn index_suffix(chart: &Chart) -> String {
    match &chart.index_name {
        Some(name) => format!(" by {name}"),
        None => String::new(),
    }
}

fn bounds(values: &[Option<f64>]) -> Option<(f64, f64)> {
    values.iter().flatten().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// One sparkline per series, scaled to that series' own range.
pub fn sparkline(values: &[Option<f64>]) -> String {
    let Some((lo, hi)) = bounds(values) else {
        return " ".repeat(values.len());
    };
    let span = hi - lo;
    values
        .iter()
        .map(|v| match v {
            None => ' ',
            Some(_) if span == 0.0 => SPARK[SPARK.len() / 2],
            Some(v) => {
                let level = ((v - lo) / span * (SPARK.len() - 1) as f64).round() as usize;
                SPARK[level.min(SPARK.len() - 1)]
            }
        })
        .collect()
}

fn line_rows(chart: &Chart) -> Vec<String> {
    if chart.series.is_empty() {
        return vec!["(no numeric columns to plot)".to_string()];
    }
    let width = chart.series.iter().map(|s| s.name.len()).max().unwrap_or(0);
    chart
        .series
        .iter()
        .map(|s| format!("{:<width$}  {}", s.name, sparkline(&s.values)))
        .collect()
}

/// Horizontal bars for every row of every series, scaled to the largest
/// absolute value in the chart.
fn bar_rows(chart: &Chart) -> Vec<String> {
    if chart.series.is_empty() {
        return vec!["(no numeric columns to plot)".to_string()];
    }
    let max = chart
        .series
        .iter()
        .flat_map(|s| s.values.iter().flatten())
        .fold(0.0_f64, |m, v| m.max(v.abs()));
    let label_width = chart.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut rows = Vec::new();
    for series in &chart.series {
        if chart.series.len() > 1 {
            rows.push(format!("{}:", series.name));
        }
        for (label, value) in chart.labels.iter().zip(&series.values) {
            let (bar, shown) = match value {
                Some(v) if max > 0.0 => {
                    let len = (v.abs() / max * BAR_WIDTH as f64).round() as usize;
                    ("█".repeat(len), v.to_string())
                }
                Some(v) => (String::new(), v.to_string()),
                None => (String::new(), String::new()),
            };
            rows.push(format!("{label:<label_width$} │{bar} {shown}"));
        }
    }
    rows
}
