use crate::cli::PlanArgs;
use anyhow::Context;
use chrono::{Days, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use std::io::Write;
use std::path::{Path, PathBuf};
use tripstream::config::Settings;
use tripstream::session::{TravelSession, EXPORT_PROMPT};
use tripstream::trip::{self, TripForm};
use tripstream::{paths, render};
use tripstream::{AgentType, EventStream, FinalResult, GuideRequest, StreamEvent, TravelClient};

#[cfg(feature = "admin")]
use crate::cli::{AdminCommand, DeleteCommand};
#[cfg(feature = "admin")]
use tripstream::admin::{self, AdminClient, AdminUpdate, DeleteTarget, NewAdmin};

pub const INFO_HEADER: &str = "── Collected trip information ──";
const INFO_FOOTER: &str = "────────────────────────────────";
pub(crate) const GUIDE_STYLE: &str = "detailed";

pub fn build_http(settings: &Settings) -> anyhow::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    if let Some(cookie) = &settings.session_cookie {
        let mut value = HeaderValue::from_str(&format!("session={cookie}"))
            .context("session cookie contains invalid characters")?;
        value.set_sensitive(true);
        headers.insert(COOKIE, value);
    }

    let mut builder = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers);
    if let Some(timeout) = settings.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Writes stream events to a terminal as they arrive.
pub struct TerminalView<W: Write> {
    out: W,
    at_line_start: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            at_line_start: true,
        }
    }

    pub fn on_event(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::Chunk { text } => {
                if text.is_empty() {
                    return;
                }
                write!(self.out, "{text}").ok();
                self.at_line_start = text.ends_with('\n');
            }
            StreamEvent::InfoResult { text } => {
                if text.trim().is_empty() {
                    return;
                }
                self.end_line();
                writeln!(self.out, "\n{INFO_HEADER}\n{}\n{INFO_FOOTER}", text.trim_end()).ok();
                self.at_line_start = true;
            }
            StreamEvent::Done | StreamEvent::Error { .. } => self.end_line(),
        }
        self.out.flush().ok();
    }

    pub fn finish(&mut self) {
        self.end_line();
        self.out.flush().ok();
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn end_line(&mut self) {
        if !self.at_line_start {
            writeln!(self.out).ok();
            self.at_line_start = true;
        }
    }
}

async fn stream_to_stdout(stream: EventStream) -> anyhow::Result<FinalResult> {
    let endpoint = stream.endpoint();
    let mut view = TerminalView::new(std::io::stdout());
    let result = stream
        .pump(|event| view.on_event(&event))
        .await
        .with_context(|| format!("/{} stream failed", endpoint.path()))?;
    view.finish();
    Ok(result)
}

fn fail_on_error(result: &FinalResult) -> anyhow::Result<()> {
    match &result.error {
        Some(message) => anyhow::bail!("backend error: {message}"),
        None => Ok(()),
    }
}

/// Build the trip form from `plan` flags, or load it from `--form`.
pub fn trip_form(args: &PlanArgs, today: NaiveDate) -> anyhow::Result<TripForm> {
    if let Some(path) = &args.form {
        return TripForm::load(path);
    }

    let start_date = args
        .start_date
        .unwrap_or_else(|| trip::default_dates(today).0);
    let end_date = args
        .end_date
        .unwrap_or_else(|| start_date.checked_add_days(Days::new(7)).unwrap_or(start_date));

    Ok(TripForm {
        source: args.source.clone().context("--from is required")?,
        destination: args.destination.clone().context("--to is required")?,
        start_date,
        end_date,
        budget_per_person: args.budget_per_person,
        travelers: args.travelers,
        accommodation_type: args.accommodation_type.clone(),
        preferences: args.preferences.clone(),
        transportation_mode: args.transportation_mode.clone(),
        dietary_restrictions: args.dietary_restrictions.clone(),
    })
}

pub(crate) fn prepare_form(mut form: TripForm) -> anyhow::Result<TripForm> {
    form.apply_defaults();
    for warning in form.validate()? {
        tracing::warn!("{warning}");
    }
    Ok(form)
}

async fn run_plan(
    client: &TravelClient,
    session: &mut TravelSession,
    form: &TripForm,
) -> anyhow::Result<FinalResult> {
    session.begin_planning()?;
    let summary = form.summary();
    tracing::info!(destination = %form.destination, "requesting travel plan");

    let outcome = match client.plan_travel(form).await {
        Ok(stream) => stream_to_stdout(stream).await,
        Err(e) => Err(e.into()),
    };
    session.end_planning(&summary, outcome.as_ref().ok());
    outcome
}

pub(crate) fn save_transcript(session: &TravelSession, path: &Path) -> anyhow::Result<()> {
    let html = render::transcript_html("Travel plan", session.history(), session.trip_info());
    paths::write_atomic(path, html.as_bytes())?;
    tracing::info!(path = %path.display(), "saved transcript");
    Ok(())
}

pub async fn cmd_plan(client: &TravelClient, args: PlanArgs) -> anyhow::Result<()> {
    let today = chrono::Local::now().date_naive();
    let form = prepare_form(trip_form(&args, today)?)?;

    let mut session = TravelSession::new();
    let result = run_plan(client, &mut session, &form).await?;
    if let Some(path) = &args.save {
        if session.current_plan().is_some() {
            save_transcript(&session, path)?;
        }
    }
    fail_on_error(&result)
}

pub async fn cmd_chat(client: &TravelClient, message: &str, agent: AgentType) -> anyhow::Result<()> {
    let stream = client.send_message(message, agent).await?;
    let result = stream_to_stdout(stream).await?;
    fail_on_error(&result)
}

pub async fn cmd_guide(
    client: &TravelClient,
    attraction: &str,
    style: &str,
    generate_image: bool,
) -> anyhow::Result<()> {
    let req = GuideRequest::new(attraction, style, generate_image);
    let stream = client.attraction_guide(&req).await?;
    let result = stream_to_stdout(stream).await?;
    fail_on_error(&result)
}

pub(crate) const REPL_HELP: &str = "Type a message and press Enter. Commands:\n  \
    /plan FILE    request a travel plan from a TOML trip form\n  \
    /guide NAME   introduce an attraction\n  \
    /export       ask for a PDF summary of this conversation\n  \
    /save PATH    write the transcript as HTML\n  \
    /clear        forget the transcript\n  \
    /quit";

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Empty,
    Quit,
    Help,
    Clear,
    Export,
    Plan(PathBuf),
    Guide(String),
    Save(PathBuf),
    Message(String),
    Invalid(String),
}

impl ReplInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplInput::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return ReplInput::Message(line.to_string());
        };

        let (name, rest) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };
        match (name, rest) {
            ("quit" | "exit", _) => ReplInput::Quit,
            ("help", _) => ReplInput::Help,
            ("clear", _) => ReplInput::Clear,
            ("export", _) => ReplInput::Export,
            ("plan", "") => ReplInput::Invalid("usage: /plan FILE".to_string()),
            ("plan", path) => ReplInput::Plan(PathBuf::from(path)),
            ("guide", "") => ReplInput::Invalid("usage: /guide NAME".to_string()),
            ("guide", name) => ReplInput::Guide(name.to_string()),
            ("save", "") => ReplInput::Invalid("usage: /save PATH".to_string()),
            ("save", path) => ReplInput::Save(PathBuf::from(path)),
            (other, _) => ReplInput::Invalid(format!("unknown command: /{other} (try /help)")),
        }
    }
}

pub async fn cmd_repl(client: &TravelClient) -> anyhow::Result<()> {
    use tokio::io::{AsyncBufReadExt, BufReader};

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session = TravelSession::new();
    eprintln!("{REPL_HELP}");

    loop {
        eprint!("> ");
        std::io::stderr().flush().ok();

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };

        let outcome = match ReplInput::parse(&line) {
            ReplInput::Empty => continue,
            ReplInput::Quit => break,
            ReplInput::Help => {
                eprintln!("{REPL_HELP}");
                Ok(())
            }
            ReplInput::Clear => {
                session.clear();
                eprintln!("(transcript cleared)");
                Ok(())
            }
            ReplInput::Export => repl_export(client, &session).await,
            ReplInput::Plan(path) => repl_plan(client, &mut session, &path).await,
            ReplInput::Guide(name) => repl_guide(client, &mut session, &name).await,
            ReplInput::Save(path) => save_transcript(&session, &path),
            ReplInput::Message(text) => repl_message(client, &mut session, &text).await,
            ReplInput::Invalid(message) => Err(anyhow::anyhow!(message)),
        };

        if let Err(e) = outcome {
            eprintln!("error: {e:#}");
        }
    }
    Ok(())
}

async fn repl_message(
    client: &TravelClient,
    session: &mut TravelSession,
    text: &str,
) -> anyhow::Result<()> {
    let stream = client.send_message(text, AgentType::Travel).await?;
    let result = stream_to_stdout(stream).await?;
    session.record_turn(text, &result);
    fail_on_error(&result)
}

async fn repl_guide(
    client: &TravelClient,
    session: &mut TravelSession,
    attraction: &str,
) -> anyhow::Result<()> {
    let req = GuideRequest::new(attraction, GUIDE_STYLE, false);
    let stream = client.attraction_guide(&req).await?;
    let result = stream_to_stdout(stream).await?;
    session.record_turn(&GuideRequest::summary(attraction, GUIDE_STYLE, false), &result);
    fail_on_error(&result)
}

async fn repl_plan(
    client: &TravelClient,
    session: &mut TravelSession,
    path: &Path,
) -> anyhow::Result<()> {
    let form = prepare_form(TripForm::load(path)?)?;
    let result = run_plan(client, session, &form).await?;
    fail_on_error(&result)
}

async fn repl_export(client: &TravelClient, session: &TravelSession) -> anyhow::Result<()> {
    if !session.can_export() {
        anyhow::bail!("nothing to export yet");
    }
    let stream = client.send_message(EXPORT_PROMPT, AgentType::PdfGenerator).await?;
    let result = stream_to_stdout(stream).await?;
    fail_on_error(&result)
}

#[cfg(feature = "admin")]
fn delete_target(cmd: DeleteCommand) -> DeleteTarget {
    match cmd {
        DeleteCommand::User { email } => DeleteTarget::User(email),
        DeleteCommand::Conversation { id } => DeleteTarget::Conversation(id),
        DeleteCommand::Message { id } => DeleteTarget::Message(id),
        DeleteCommand::Admin { id } => DeleteTarget::Admin(id),
    }
}

#[cfg(feature = "admin")]
pub async fn cmd_admin(
    client: &AdminClient,
    cmd: AdminCommand,
    default_per_page: u32,
) -> anyhow::Result<()> {
    let mut out = std::io::stdout();
    match cmd {
        AdminCommand::List {
            resource,
            page,
            per_page,
        } => {
            let page = client
                .list(resource, page, per_page.unwrap_or(default_per_page))
                .await?;
            write!(out, "{}", admin::render_page(&page))?;
        }
        AdminCommand::Search {
            scope,
            query,
            page,
            per_page,
        } => {
            let page = client
                .search(scope, &query, page, per_page.unwrap_or(default_per_page))
                .await?;
            write!(out, "{}", admin::render_page(&page))?;
        }
        AdminCommand::User { email } => {
            let detail = client.user_detail(&email).await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&detail)?)?;
        }
        AdminCommand::Conversation { id } => {
            let detail = client.conversation_detail(&id).await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&detail)?)?;
        }
        AdminCommand::Stats => {
            let stats = client.stats().await?;
            write!(out, "{}", admin::render_stats(&stats))?;
        }
        AdminCommand::Delete { target, yes } => {
            let target = delete_target(target);
            if !yes {
                anyhow::bail!("deletion cannot be undone; re-run with --yes to delete {target:?}");
            }
            client.delete(&target).await?;
            writeln!(out, "deleted {target:?}")?;
        }
        AdminCommand::AddAdmin {
            username,
            password,
            email,
            role,
        } => {
            let new = NewAdmin {
                username,
                password,
                email,
                role,
            };
            client.add_admin(&new).await?;
            writeln!(out, "added administrator {}", new.username)?;
        }
        AdminCommand::UpdateAdmin {
            id,
            email,
            role,
            password,
        } => {
            client
                .update_admin(
                    id,
                    &AdminUpdate {
                        email,
                        role,
                        password,
                    },
                )
                .await?;
            writeln!(out, "updated administrator {id}")?;
        }
    }
    Ok(())
}
