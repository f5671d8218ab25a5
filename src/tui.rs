#![cfg(feature = "tui")]

use crate::app::{self, ReplInput};
use anyhow::Context;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;
use std::io;
use tokio::sync::mpsc;
use tripstream::session::{TravelSession, EXPORT_PROMPT};
use tripstream::trip::TripForm;
use tripstream::{AgentType, EventStream, FinalResult, GuideRequest, StreamError, StreamEvent, TravelClient};

#[derive(Debug, Clone)]
struct ChatLine {
    role: &'static str,
    text: String,
}

impl ChatLine {
    fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system",
            text: text.into(),
        }
    }
}

#[derive(Debug)]
enum StreamMsg {
    Chunk(String),
    Info(String),
    Finished(FinalResult),
    Failed(String),
}

/// What a running stream will be recorded as once it finishes.
#[derive(Debug)]
enum Turn {
    Chat { user: String },
    Plan { summary: String },
    Export,
}

#[derive(Debug)]
enum Request {
    Message(String, AgentType),
    Guide(GuideRequest),
    Plan(TripForm),
}

struct ActiveStream {
    rx: mpsc::UnboundedReceiver<StreamMsg>,
    turn: Turn,
}

struct State {
    client: TravelClient,
    session: TravelSession,
    lines: Vec<ChatLine>,
    input: String,
    active: Option<ActiveStream>,
}

pub async fn run_tui(client: TravelClient) -> anyhow::Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alt screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let (ev_tx, mut ev_rx) = mpsc::unbounded_channel::<Event>();
    std::thread::spawn(move || {
        while let Ok(ev) = crossterm::event::read() {
            if ev_tx.send(ev).is_err() {
                break;
            }
        }
    });

    let mut state = State {
        client,
        session: TravelSession::new(),
        lines: vec![ChatLine::system(app::REPL_HELP)],
        input: String::new(),
        active: None,
    };

    let mut ticker = tokio::time::interval(std::time::Duration::from_millis(33));

    let res = loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = draw(&mut terminal, &state) {
                    break Err(e);
                }
            }
            Some(ev) = ev_rx.recv() => {
                if let Event::Key(key) = ev {
                    if handle_key(key, &mut state) {
                        break Ok(());
                    }
                }
            }
            Some(msg) = async {
                match &mut state.active {
                    Some(active) => active.rx.recv().await,
                    None => None,
                }
            } => {
                on_stream_msg(msg, &mut state);
            }
        }
    };

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

fn on_stream_msg(msg: StreamMsg, state: &mut State) {
    match msg {
        StreamMsg::Chunk(t) => {
            if let Some(last) = state.lines.last_mut() {
                if last.role == "assistant" {
                    last.text.push_str(&t);
                }
            }
        }
        StreamMsg::Info(t) => {
            if !t.trim().is_empty() {
                state.lines.push(ChatLine {
                    role: "trip info",
                    text: t,
                });
            }
        }
        StreamMsg::Finished(result) => {
            let Some(active) = state.active.take() else {
                return;
            };
            match active.turn {
                Turn::Plan { summary } => state.session.end_planning(&summary, Some(&result)),
                Turn::Chat { user } => {
                    state.session.record_turn(&user, &result);
                }
                Turn::Export => {}
            }
            if let Some(e) = result.error {
                state.lines.push(ChatLine {
                    role: "error",
                    text: e,
                });
            }
        }
        StreamMsg::Failed(e) => {
            if let Some(ActiveStream {
                turn: Turn::Plan { summary },
                ..
            }) = state.active.take()
            {
                state.session.end_planning(&summary, None);
            }
            state.lines.push(ChatLine {
                role: "error",
                text: e,
            });
        }
    }
}

/// Returns true when the UI should exit.
fn handle_key(key: KeyEvent, state: &mut State) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Char(c) => state.input.push(c),
        KeyCode::Backspace => {
            state.input.pop();
        }
        KeyCode::Enter => {
            let line = std::mem::take(&mut state.input);
            return submit(&line, state);
        }
        _ => {}
    }
    false
}

fn submit(line: &str, state: &mut State) -> bool {
    let input = ReplInput::parse(line);
    let starts_stream = matches!(
        input,
        ReplInput::Message(_) | ReplInput::Guide(_) | ReplInput::Plan(_) | ReplInput::Export
    );
    if starts_stream && state.active.is_some() {
        state
            .lines
            .push(ChatLine::system("(streaming in progress; wait for completion)"));
        return false;
    }

    match input {
        ReplInput::Empty => {}
        ReplInput::Quit => return true,
        ReplInput::Help => state.lines.push(ChatLine::system(app::REPL_HELP)),
        ReplInput::Clear => {
            state.session.clear();
            state.lines.clear();
        }
        ReplInput::Invalid(msg) => state.lines.push(ChatLine::system(msg)),
        ReplInput::Save(path) => {
            let text = match app::save_transcript(&state.session, &path) {
                Ok(()) => format!("saved transcript to {}", path.display()),
                Err(e) => format!("save failed: {e:#}"),
            };
            state.lines.push(ChatLine::system(text));
        }
        ReplInput::Message(msg) => {
            let req = Request::Message(msg.clone(), AgentType::Travel);
            start(state, &msg, req, Turn::Chat { user: msg.clone() });
        }
        ReplInput::Guide(name) => {
            let summary = GuideRequest::summary(&name, app::GUIDE_STYLE, false);
            let req = Request::Guide(GuideRequest::new(&name, app::GUIDE_STYLE, false));
            start(state, &summary, req, Turn::Chat { user: summary.clone() });
        }
        ReplInput::Export => {
            if !state.session.can_export() {
                state.lines.push(ChatLine::system("nothing to export yet"));
                return false;
            }
            let req = Request::Message(EXPORT_PROMPT.to_string(), AgentType::PdfGenerator);
            start(state, EXPORT_PROMPT, req, Turn::Export);
        }
        ReplInput::Plan(path) => {
            let form = match TripForm::load(&path).and_then(app::prepare_form) {
                Ok(form) => form,
                Err(e) => {
                    state.lines.push(ChatLine::system(format!("{e:#}")));
                    return false;
                }
            };
            if let Err(e) = state.session.begin_planning() {
                state.lines.push(ChatLine::system(e.to_string()));
                return false;
            }
            let summary = form.summary();
            start(state, &summary, Request::Plan(form), Turn::Plan { summary: summary.clone() });
        }
    }
    false
}

fn start(state: &mut State, shown: &str, req: Request, turn: Turn) {
    state.lines.push(ChatLine {
        role: "user",
        text: shown.to_string(),
    });
    state.lines.push(ChatLine {
        role: "assistant",
        text: String::new(),
    });

    let (tx, rx) = mpsc::unbounded_channel::<StreamMsg>();
    state.active = Some(ActiveStream { rx, turn });

    let client = state.client.clone();
    tokio::spawn(async move {
        let stream = match open(&client, &req).await {
            Ok(s) => s,
            Err(e) => {
                let _ = tx.send(StreamMsg::Failed(format!("{:#}", anyhow::Error::from(e))));
                return;
            }
        };

        let events = tx.clone();
        let res = stream
            .pump(move |event| match event {
                StreamEvent::Chunk { text } => {
                    let _ = events.send(StreamMsg::Chunk(text));
                }
                StreamEvent::InfoResult { text } => {
                    let _ = events.send(StreamMsg::Info(text));
                }
                StreamEvent::Done | StreamEvent::Error { .. } => {}
            })
            .await;

        let msg = match res {
            Ok(result) => StreamMsg::Finished(result),
            Err(e) => StreamMsg::Failed(format!("{:#}", anyhow::Error::from(e))),
        };
        let _ = tx.send(msg);
    });
}

async fn open(client: &TravelClient, req: &Request) -> Result<EventStream, StreamError> {
    match req {
        Request::Message(text, agent) => client.send_message(text, *agent).await,
        Request::Guide(guide) => client.attraction_guide(guide).await,
        Request::Plan(form) => client.plan_travel(form).await,
    }
}

fn draw(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, state: &State) -> anyhow::Result<()> {
    terminal.draw(|f| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(3)])
            .split(f.area());

        let mut text = Text::default();
        for l in &state.lines {
            let style = match l.role {
                "user" | "error" | "trip info" => Style::default().add_modifier(Modifier::BOLD),
                _ => Style::default(),
            };
            text.lines.push(Line::styled(format!("{}: ", l.role), style));
            text.lines.extend(Text::from(l.text.clone()).lines);
            text.lines.push(Line::from(""));
        }

        let status = if state.session.is_planning() {
            "generating plan…"
        } else if state.active.is_some() {
            "streaming…"
        } else {
            "ready"
        };
        let title = format!(
            "tripstream — {} — {} messages — {status}",
            state.client.base_url(),
            state.session.history().len()
        );
        let chat = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false });

        let input_w = Paragraph::new(state.input.clone())
            .block(Block::default().borders(Borders::ALL).title("input"));

        f.render_widget(chat, chunks[0]);
        f.render_widget(input_w, chunks[1]);

        f.set_cursor_position((cursor_x(chunks[1], &state.input), chunks[1].y.saturating_add(1)));
    })?;
    Ok(())
}

/// Cursor column inside the input box, clamped to its right border.
fn cursor_x(area: Rect, input: &str) -> u16 {
    let typed = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
    let x = area.x.saturating_add(1).saturating_add(typed);
    x.min(area.x.saturating_add(area.width.saturating_sub(2)))
}
