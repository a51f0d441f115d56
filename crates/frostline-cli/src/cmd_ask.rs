use std::io;

use frostline_render::RecordingSurface;
use frostline_session::{SessionContext, TurnReport};
use frostline_store::FrostlineConfig;

use crate::connect;
use crate::terminal::TerminalSurface;

/// `frostline ask "<question>"`: one turn, then exit.
pub fn execute(question: &str, model: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = FrostlineConfig::resolve(&frostline_store::config_path())?;
    let http = connect::transport(&config)?;
    let clients = connect::Clients::new(&http, &config);
    let orchestrator = clients.orchestrator();
    let mut session = SessionContext::new(Some(connect::session_model(model, &config)?));

    if json {
        let mut surface = RecordingSurface::new();
        let report = orchestrator.turn(&mut session, &mut surface, question)?;
        println!("{}", format_json(&report)?);
    } else {
        let stdout = io::stdout();
        let mut surface = TerminalSurface::new(stdout.lock());
        orchestrator.turn(&mut session, &mut surface, question)?;
    }
    Ok(())
}

fn format_json(report: &TurnReport) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
