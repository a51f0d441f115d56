use std::io;

use frostline_core::{ContentItem, Result};

use crate::sql::SqlExecutor;
use crate::surface::Surface;

/// Stand-in markdown handed to summarization when a reply carried no SQL.
pub const NO_SQL_RETURNED: &str = "No SQL returned!";

/// Every suggestion a message offers, flattened in display order. Position
/// `i` here is shown as `[i + 1]`.
pub fn suggestions_in(content: &[ContentItem]) -> Vec<String> {
    content
        .iter()
        .filter_map(|item| match item {
            ContentItem::Suggestions { suggestions } => Some(suggestions.iter().cloned()),
            _ => None,
        })
        .flatten()
        .collect()
}

/// What a rendered message yielded for the rest of the turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOutcome {
    markdown: Option<String>,
}

impl RenderOutcome {
    /// Markdown of the last executed SQL item, if any.
    pub fn markdown(&self) -> Option<&str> {
        self.markdown.as_deref()
    }

    /// Markdown for summarization; the sentinel when no SQL ran.
    pub fn sql_markdown(&self) -> &str {
        self.markdown.as_deref().unwrap_or(NO_SQL_RETURNED)
    }

    pub fn has_sql(&self) -> bool {
        self.markdown.is_some()
    }
}

/// Numbers suggestion blocks so they line up with [`suggestions_in`].
struct Numbering {
    enabled: bool,
    offered: usize,
}

impl Numbering {
    fn show(
        &mut self,
        surface: &mut dyn Surface,
        message_index: usize,
        suggestions: &[String],
    ) -> io::Result<()> {
        let first = self.enabled.then_some(self.offered + 1);
        self.offered += suggestions.len();
        surface.suggestions(message_index, first, suggestions)
    }
}

/// Show a fresh message body in order, executing every SQL item.
///
/// The request id comes first when present. Suggestions are numbered across
/// blocks, so `[n]` is entry `n - 1` of [`suggestions_in`].
pub fn render_content(
    surface: &mut dyn Surface,
    content: &[ContentItem],
    request_id: Option<&str>,
    message_index: usize,
    executor: &SqlExecutor<'_>,
) -> Result<RenderOutcome> {
    if let Some(id) = request_id {
        surface.request_id(id)?;
    }
    let mut numbering = Numbering {
        enabled: true,
        offered: 0,
    };
    let mut outcome = RenderOutcome::default();

    for item in content {
        match item {
            ContentItem::Text { text } => surface.text(text)?,
            ContentItem::Suggestions { suggestions } => {
                numbering.show(surface, message_index, suggestions)?
            }
            ContentItem::Sql { statement } => {
                outcome.markdown = Some(executor.execute(surface, statement)?);
            }
        }
    }
    Ok(outcome)
}

/// Redraw a stored message body without executing anything.
///
/// The last SQL item is followed by `cached` when there is one, so replaying
/// the same message twice shows the same thing. Suggestions are numbered only
/// when `selectable`; older blocks can no longer be picked.
pub fn replay_content(
    surface: &mut dyn Surface,
    content: &[ContentItem],
    request_id: Option<&str>,
    message_index: usize,
    cached: Option<&str>,
    selectable: bool,
) -> io::Result<()> {
    if let Some(id) = request_id {
        surface.request_id(id)?;
    }
    let last_sql = content
        .iter()
        .rposition(|item| matches!(item, ContentItem::Sql { .. }));
    let mut numbering = Numbering {
        enabled: selectable,
        offered: 0,
    };

    for (pos, item) in content.iter().enumerate() {
        match item {
            ContentItem::Text { text } => surface.text(text)?,
            ContentItem::Suggestions { suggestions } => {
                numbering.show(surface, message_index, suggestions)?
            }
            ContentItem::Sql { statement } => {
                surface.sql(statement)?;
                if Some(pos) == last_sql {
                    if let Some(md) = cached {
                        surface.cached_result(md)?;
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::testing::FixedWarehouse;
    use crate::surface::{RecordingSurface, SurfaceEvent};

    fn reply() -> Vec<ContentItem> {
        vec![
            ContentItem::text("This is our interpretation of your question"),
            ContentItem::sql("SELECT region, ltv FROM ltv"),
            ContentItem::suggestions(["What about churn?", "Top ten customers?"]),
        ]
    }

    fn firsts(surface: &RecordingSurface) -> Vec<Option<usize>> {
        surface
            .events
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::Suggestions { first, .. } => Some(*first),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn live_render_executes_and_collects() {
        let wh = FixedWarehouse::rows(2);
        let exec = SqlExecutor::new(&wh);
        let mut surface = RecordingSurface::new();
        let outcome = render_content(&mut surface, &reply(), Some("req-1"), 1, &exec).unwrap();

        assert_eq!(surface.events[0], SurfaceEvent::RequestId("req-1".into()));
        assert_eq!(
            surface.events[1],
            SurfaceEvent::Text("This is our interpretation of your question".into())
        );
        assert!(outcome.has_sql());
        assert!(outcome.sql_markdown().starts_with("| REGION | LTV |"));
        assert_eq!(wh.seen.borrow().len(), 1);
        assert!(matches!(
            surface.events.last(),
            Some(SurfaceEvent::Suggestions {
                message_index: 1,
                first: Some(1),
                ..
            })
        ));
    }

    #[test]
    fn no_sql_yields_sentinel() {
        let wh = FixedWarehouse::rows(2);
        let exec = SqlExecutor::new(&wh);
        let mut surface = RecordingSurface::new();
        let outcome = render_content(
            &mut surface,
            &[ContentItem::text("I can't answer that.")],
            None,
            1,
            &exec,
        )
        .unwrap();
        assert_eq!(outcome.sql_markdown(), NO_SQL_RETURNED);
        assert_eq!(outcome.markdown(), None);
        assert!(wh.seen.borrow().is_empty());
        assert!(!surface
            .events
            .iter()
            .any(|e| matches!(e, SurfaceEvent::RequestId(_))));
    }

    #[test]
    fn last_sql_item_wins() {
        let wh = FixedWarehouse::echo();
        let exec = SqlExecutor::new(&wh);
        let mut surface = RecordingSurface::new();
        let outcome = render_content(
            &mut surface,
            &[ContentItem::sql("SELECT 1"), ContentItem::sql("SELECT 2")],
            None,
            1,
            &exec,
        )
        .unwrap();
        assert_eq!(*wh.seen.borrow(), vec!["SELECT 1", "SELECT 2"]);
        assert!(outcome.sql_markdown().contains("| SELECT 2 |"));
        assert!(!outcome.sql_markdown().contains("SELECT 1"));
    }

    #[test]
    fn live_numbering_runs_across_suggestion_blocks() {
        let wh = FixedWarehouse::rows(1);
        let exec = SqlExecutor::new(&wh);
        let content = vec![
            ContentItem::suggestions(["a", "b"]),
            ContentItem::text("or perhaps"),
            ContentItem::suggestions(["c", "d"]),
        ];
        let mut surface = RecordingSurface::new();
        render_content(&mut surface, &content, None, 1, &exec).unwrap();

        assert_eq!(firsts(&surface), vec![Some(1), Some(3)]);
        assert_eq!(suggestions_in(&content), ["a", "b", "c", "d"]);
    }

    #[test]
    fn replay_is_idempotent_and_never_executes() {
        let cached = "| N |\n|--:|\n| 1 |\n";
        let mut first = RecordingSurface::new();
        let mut second = RecordingSurface::new();
        replay_content(&mut first, &reply(), Some("req-1"), 1, Some(cached), true).unwrap();
        replay_content(&mut second, &reply(), Some("req-1"), 1, Some(cached), true).unwrap();

        assert_eq!(first.events, second.events);
        assert!(first
            .events
            .contains(&SurfaceEvent::CachedResult(cached.to_string())));
        assert_eq!(
            first.count(|e| matches!(e, SurfaceEvent::Status(_) | SurfaceEvent::Result { .. })),
            0
        );
        assert_eq!(firsts(&first), vec![Some(1)]);
    }

    #[test]
    fn cached_result_follows_only_the_last_statement() {
        let mut surface = RecordingSurface::new();
        replay_content(
            &mut surface,
            &[ContentItem::sql("SELECT 1"), ContentItem::sql("SELECT 2")],
            None,
            1,
            Some("| N |"),
            false,
        )
        .unwrap();
        assert_eq!(
            surface.events,
            vec![
                SurfaceEvent::Sql("SELECT 1".into()),
                SurfaceEvent::Sql("SELECT 2".into()),
                SurfaceEvent::CachedResult("| N |".into()),
            ]
        );
    }

    #[test]
    fn replay_without_cache_shows_statement_only() {
        let mut surface = RecordingSurface::new();
        replay_content(&mut surface, &[ContentItem::sql("SELECT 1")], None, 3, None, false)
            .unwrap();
        assert_eq!(surface.events, vec![SurfaceEvent::Sql("SELECT 1".into())]);
    }

    #[test]
    fn stale_replayed_suggestions_are_unnumbered() {
        let mut surface = RecordingSurface::new();
        replay_content(&mut surface, &[ContentItem::suggestions(["a"])], None, 1, None, false)
            .unwrap();
        assert_eq!(
            surface.events,
            vec![SurfaceEvent::Suggestions {
                message_index: 1,
                first: None,
                suggestions: vec!["a".into()],
            }]
        );
    }

    #[test]
    fn replay_surface_failure_is_an_io_error() {
        let mut surface = RecordingSurface::failing_at(1);
        let err = replay_content(&mut surface, &reply(), Some("req-1"), 1, None, true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
