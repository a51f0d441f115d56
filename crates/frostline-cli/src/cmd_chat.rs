use std::io::{self, BufRead, Write};

use frostline_core::dataset::SEMANTIC_MODEL_FILE;
use frostline_core::models::SUMMARIZATION_MODELS;
use frostline_session::{replay_history, CycleOptions, Orchestrator, SessionContext};
use frostline_store::FrostlineConfig;

use crate::connect;
use crate::terminal::TerminalSurface;

pub const TITLE: &str = "Text to SQL Assistant with Snowflake Cortex";

// ── Input parsing ──

/// One line typed at the chat prompt.
#[derive(Debug, PartialEq)]
pub enum Input {
    Empty,
    Ask(String),
    Help,
    Exit,
    Reset,
    History,
    Suggestions,
    Pick(usize),
    Model(Option<String>),
    Models,
    Invalid(String),
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if !line.starts_with('/') {
        return Input::Ask(line.to_string());
    }
    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((c, a)) => (c, a.trim()),
        None => (line, ""),
    };
    match cmd {
        "/help" => Input::Help,
        "/exit" | "/quit" => Input::Exit,
        "/reset" => Input::Reset,
        "/history" => Input::History,
        "/suggestions" => Input::Suggestions,
        "/models" => Input::Models,
        "/model" if arg.is_empty() => Input::Model(None),
        "/model" => Input::Model(Some(arg.to_string())),
        "/pick" => match arg.parse::<usize>() {
            Ok(n) => Input::Pick(n),
            Err(_) => Input::Invalid("usage: /pick N".to_string()),
        },
        other => Input::Invalid(format!("unknown command: {other} (try /help)")),
    }
}

// ── REPL ──

pub fn execute(model: Option<&str>, replay: bool) -> anyhow::Result<()> {
    let config = FrostlineConfig::resolve(&frostline_store::config_path())?;
    let http = connect::transport(&config)?;
    let clients = connect::Clients::new(&http, &config);
    let orchestrator = clients.orchestrator();
    let mut session = SessionContext::new(Some(connect::session_model(model, &config)?));
    let options = CycleOptions {
        replay_history: replay || config.replay_history,
    };

    let stdout = io::stdout();
    let mut surface = TerminalSurface::new(stdout.lock());
    print_banner(surface.writer(), &session)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        write!(surface.writer(), "\n> ")?;
        surface.writer().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let keep_going = handle(
            parse_input(&line),
            &orchestrator,
            &mut session,
            &mut surface,
            options,
        )?;
        if !keep_going {
            break;
        }
    }
    writeln!(surface.writer(), "Goodbye!")?;
    Ok(())
}

/// Act on one input line. Returns `false` when the session should end.
/// Turn failures are shown and the session continues.
fn handle<W: Write>(
    input: Input,
    orchestrator: &Orchestrator<'_>,
    session: &mut SessionContext,
    surface: &mut TerminalSurface<W>,
    options: CycleOptions,
) -> anyhow::Result<bool> {
    match input {
        Input::Empty => {}
        Input::Exit => return Ok(false),
        Input::Help => print_help(surface.writer())?,
        Input::Reset => {
            session.reset();
            writeln!(surface.writer(), "Conversation history cleared.")?;
        }
        Input::History => {
            if session.transcript().is_empty() {
                writeln!(surface.writer(), "(no messages yet)")?;
            } else {
                let summary = replay_history(session, surface);
                if !summary.failed.is_empty() {
                    writeln!(
                        surface.writer(),
                        "({} of {} messages could not be shown)",
                        summary.failed.len(),
                        summary.failed.len() + summary.rendered
                    )?;
                }
            }
        }
        Input::Suggestions => print_suggestions(surface.writer(), session)?,
        Input::Pick(n) => match session.select_suggestion(n).map(str::to_string) {
            Ok(text) => {
                writeln!(surface.writer(), "Asking: {text}")?;
                run_cycle(orchestrator, session, surface, None, options)?;
            }
            Err(e) => writeln!(surface.writer(), "{e}")?,
        },
        Input::Model(None) => match session.selected_model() {
            Some(m) => writeln!(surface.writer(), "Summarization model: {m}")?,
            None => writeln!(surface.writer(), "No summarization model selected.")?,
        },
        Input::Model(Some(name)) => match session.select_model(&name) {
            Ok(m) => writeln!(surface.writer(), "Summarization model set to {m}")?,
            Err(e) => writeln!(surface.writer(), "{e}")?,
        },
        Input::Models => print_models(surface.writer(), session.selected_model())?,
        Input::Ask(query) => run_cycle(orchestrator, session, surface, Some(&query), options)?,
        Input::Invalid(msg) => writeln!(surface.writer(), "{msg}")?,
    }
    Ok(true)
}

fn run_cycle<W: Write>(
    orchestrator: &Orchestrator<'_>,
    session: &mut SessionContext,
    surface: &mut TerminalSurface<W>,
    input: Option<&str>,
    options: CycleOptions,
) -> anyhow::Result<()> {
    if let Err(e) = orchestrator.run_cycle(session, surface, input, options) {
        writeln!(surface.writer(), "Error: {e}")?;
    }
    Ok(())
}

// ── Output helpers ──

fn print_banner(out: &mut impl Write, session: &SessionContext) -> io::Result<()> {
    writeln!(out, "{TITLE}")?;
    writeln!(out, "Semantic Model: `{SEMANTIC_MODEL_FILE}`")?;
    if let Some(m) = session.selected_model() {
        writeln!(out, "Summarization model: {m}")?;
    }
    writeln!(out, "Type a question, or /help for commands.")
}

fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  /help          Show this help")?;
    writeln!(out, "  /exit          Leave the session")?;
    writeln!(out, "  /reset         Clear conversation history")?;
    writeln!(out, "  /history       Show the conversation so far")?;
    writeln!(out, "  /suggestions   List the latest suggested questions")?;
    writeln!(out, "  /pick N        Ask suggestion N")?;
    writeln!(out, "  /model [NAME]  Show or change the summarization model")?;
    writeln!(out, "  /models        List summarization models")
}

fn print_suggestions(out: &mut impl Write, session: &SessionContext) -> io::Result<()> {
    if session.suggestions().is_empty() {
        return writeln!(out, "(no suggestions)");
    }
    for (i, s) in session.suggestions().iter().enumerate() {
        writeln!(out, "  [{}] {s}", i + 1)?;
    }
    Ok(())
}

pub fn print_models(out: &mut impl Write, current: Option<&str>) -> io::Result<()> {
    for name in SUMMARIZATION_MODELS {
        let mark = if Some(*name) == current { "*" } else { " " };
        writeln!(out, "{mark} {name}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(
            parse_input("  top customers by ltv "),
            Input::Ask("top customers by ltv".into())
        );
        assert_eq!(parse_input("   "), Input::Empty);
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_input("/help"), Input::Help);
        assert_eq!(parse_input("/exit"), Input::Exit);
        assert_eq!(parse_input("/reset"), Input::Reset);
        assert_eq!(parse_input("/history"), Input::History);
        assert_eq!(parse_input("/suggestions"), Input::Suggestions);
        assert_eq!(parse_input("/models"), Input::Models);
        assert_eq!(parse_input("/pick 2"), Input::Pick(2));
        assert_eq!(parse_input("/model"), Input::Model(None));
        assert_eq!(
            parse_input("/model  mistral-large2"),
            Input::Model(Some("mistral-large2".into()))
        );
    }

    #[test]
    fn bad_commands_are_invalid() {
        assert!(matches!(parse_input("/pick two"), Input::Invalid(_)));
        assert!(matches!(parse_input("/drop"), Input::Invalid(m) if m.contains("/drop")));
    }

    #[test]
    fn models_listing_marks_current() {
        let mut out = Vec::new();
        print_models(&mut out, Some("reka-flash")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), SUMMARIZATION_MODELS.len());
        assert!(text.contains("* reka-flash\n"));
        assert!(text.contains("  claude-3-5-sonnet\n"));
    }

    // ── Session flow ──

    use std::cell::RefCell;
    use std::collections::VecDeque;

    use frostline_core::{
        Analyst, AnalystResponse, Completion, ContentItem, Message, PromptSearch, QueryResult,
        Result as TurnResult, Warehouse,
    };

    struct Scripted(RefCell<VecDeque<Vec<ContentItem>>>);

    impl Analyst for Scripted {
        fn send(&self, messages: &[Message]) -> TurnResult<AnalystResponse> {
            let content = self
                .0
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| vec![ContentItem::text("ok")]);
            Ok(AnalystResponse {
                request_id: format!("r{}", messages.len()),
                content,
            })
        }
    }

    struct Stub;

    impl PromptSearch for Stub {
        fn best_prompt(&self, _query: &str) -> TurnResult<String> {
            Ok("Summarize.".into())
        }
    }

    impl Completion for Stub {
        fn complete(&self, _model: &str, _prompt: &str) -> TurnResult<String> {
            Ok("Done.".into())
        }
    }

    impl Warehouse for Stub {
        fn query(&self, _sql: &str) -> TurnResult<QueryResult> {
            Ok(QueryResult {
                columns: Vec::new(),
                rows: Vec::new(),
            })
        }
    }

    fn take(surface: &mut TerminalSurface<Vec<u8>>) -> String {
        String::from_utf8(std::mem::take(surface.writer())).unwrap()
    }

    #[test]
    fn pick_asks_the_suggestion_shown_under_that_number() {
        let analyst = Scripted(RefCell::new(VecDeque::from([
            vec![
                ContentItem::suggestions(["a", "b"]),
                ContentItem::suggestions(["c", "d"]),
            ],
            vec![ContentItem::suggestions(["x", "y"])],
        ])));
        let orch = Orchestrator::new(&analyst, &Stub, &Stub, &Stub);
        let mut session = SessionContext::with_default_model();
        let mut surface = TerminalSurface::new(Vec::new());
        let opts = CycleOptions::default();

        handle(Input::Ask("start".into()), &orch, &mut session, &mut surface, opts).unwrap();
        let out = take(&mut surface);
        assert!(out.contains("  [1] a\n"));
        assert!(out.contains("  [3] c\n"));

        handle(Input::Pick(3), &orch, &mut session, &mut surface, opts).unwrap();
        assert!(take(&mut surface).starts_with("Asking: c\n"));

        handle(Input::History, &orch, &mut session, &mut surface, opts).unwrap();
        let out = take(&mut surface);
        assert!(out.contains("  - a\n"));
        assert!(!out.contains("[1] a"));
        assert!(out.contains("  [1] x\n"));

        handle(Input::Pick(1), &orch, &mut session, &mut surface, opts).unwrap();
        assert!(take(&mut surface).starts_with("Asking: x\n"));
    }

    #[test]
    fn banner_names_semantic_model() {
        let mut out = Vec::new();
        print_banner(&mut out, &SessionContext::with_default_model()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Text to SQL Assistant with Snowflake Cortex\n"));
        assert!(text.contains("Semantic Model: `customer_lifetime_value.yaml`"));
    }
}
