//! Presentation of analyst replies: markdown result tables, chart views, the
//! [`Surface`] seam, content rendering and SQL execution.

pub mod chart;
pub mod content;
pub mod sql;
pub mod surface;
pub mod table;

pub use chart::{Chart, ChartKind, ResultView, Series};
pub use content::{
    render_content, replay_content, suggestions_in, RenderOutcome, NO_SQL_RETURNED,
};
pub use sql::{SqlExecutor, RUNNING_SQL};
pub use surface::{RecordingSurface, Surface, SurfaceEvent};
pub use table::to_markdown;
