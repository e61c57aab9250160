use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use cybershield::config::{ClientConfig, ConfigError};
use cybershield::remote::{HttpRemote, RemoteClient, RemoteError};
use cybershield::services::Feedback;
use cybershield::services::clipboard::Clipboard;
use cybershield::services::clock::{Clock, title_sequence};
use cybershield::services::dispatch::{DispatchStatus, Dispatcher};
use cybershield::services::jobs::OperationJobs;
use cybershield::services::notifications::{Phase, SETTLE_DELAY};
use cybershield::services::password::{PasswordError, PasswordPanel};
use cybershield::services::sink::DirectorySink;
use cybershield::services::telemetry::{TelemetryCounters, TelemetryPoller};
use cybershield::shell::{self, LogAction, ShellCommand};
use cybershield::state::{SelectedArtifact, Session};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use wire::{DEFAULT_PASSWORD_LENGTH, Operation, PasswordPolicy};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("could not read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} did not complete")]
    OperationFailed(Operation),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("stdin read failed: {0}")]
    Stdin(std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "cybershield", about = "CyberShield file-security client")]
struct Cli {
    #[arg(long, env = "CYBERSHIELD_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "CYBERSHIELD_DOWNLOAD_DIR", help = "Where downloaded files and log exports go")]
    download_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypt a file and save `<name>.encrypted`.
    Encrypt(FileArgs),
    /// Decrypt a file and save it without the `.encrypted` suffix.
    Decrypt(FileArgs),
    /// Compute and store a file's SHA-256.
    Hash(FileArgs),
    /// Compare a file against its stored hash.
    Verify(FileArgs),
    /// Create a timestamped backup on the service.
    Backup(FileArgs),
    /// List stored hashes.
    Hashes,
    /// Show service information.
    Info,
    /// Generate a password.
    Password(PasswordArgs),
    /// Interactive session.
    Shell,
}

#[derive(Args, Debug)]
struct FileArgs {
    file: PathBuf,

    #[arg(long, help = "MIME type sent with the upload")]
    mime: Option<String>,
}

#[derive(Args, Debug)]
struct PasswordArgs {
    #[arg(long, default_value_t = DEFAULT_PASSWORD_LENGTH, help = "Clamped into 12-32")]
    length: u8,

    #[arg(long, default_value_t = false)]
    no_upper: bool,

    #[arg(long, default_value_t = false)]
    no_lower: bool,

    #[arg(long, default_value_t = false)]
    no_digits: bool,

    #[arg(long, default_value_t = false)]
    no_symbols: bool,

    #[arg(long, default_value_t = false, help = "Copy the password to the clipboard")]
    copy: bool,
}

impl PasswordArgs {
    fn policy(&self) -> PasswordPolicy {
        let mut policy = PasswordPolicy::new(self.length);
        policy.include_upper = !self.no_upper;
        policy.include_lower = !self.no_lower;
        policy.include_digits = !self.no_digits;
        policy.include_symbols = !self.no_symbols;
        policy
    }
}

/// Everything one front-end session shares.
struct App {
    config: ClientConfig,
    remote: Arc<dyn RemoteClient>,
    feedback: Feedback,
    dispatcher: Arc<Dispatcher>,
    panel: Arc<PasswordPanel>,
    clipboard: Arc<Clipboard>,
    sink: Arc<DirectorySink>,
    session: Arc<Session>,
}

impl App {
    fn new(config: ClientConfig) -> Result<Self, CliError> {
        let remote: Arc<dyn RemoteClient> = Arc::new(HttpRemote::from_config(&config)?);
        let sink = Arc::new(DirectorySink::new(config.download_dir.clone()));
        let feedback = Feedback::new();
        let dispatcher = Arc::new(Dispatcher::new(remote.clone(), sink.clone(), feedback.clone()));
        let clipboard = Arc::new(Clipboard::system());
        let panel = Arc::new(PasswordPanel::new(dispatcher.clone(), clipboard.clone()));
        Ok(Self { config, remote, feedback, dispatcher, panel, clipboard, sink, session: Arc::new(Session::new()) })
    }

    async fn select(&self, path: &Path, mime: Option<String>) -> Result<String, CliError> {
        let mut artifact = SelectedArtifact::from_path(path)
            .await
            .map_err(|source| CliError::ReadInput { path: path.to_path_buf(), source })?;
        if let Some(mime) = mime {
            artifact = artifact.with_mime_type(mime);
        }
        Ok(self.session.select_artifact(artifact, &self.feedback))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.base_url.as_deref() {
        config = config.with_base_url(url)?;
    }
    if let Some(dir) = cli.download_dir {
        config = config.with_download_dir(dir);
    }

    let app = App::new(config)?;
    let renderer = spawn_renderer(&app.feedback);

    let result = match cli.command {
        Command::Encrypt(args) => run_file(&app, Operation::Encrypt, args).await,
        Command::Decrypt(args) => run_file(&app, Operation::Decrypt, args).await,
        Command::Hash(args) => run_file(&app, Operation::ComputeHash, args).await,
        Command::Verify(args) => run_file(&app, Operation::VerifyIntegrity, args).await,
        Command::Backup(args) => run_file(&app, Operation::Backup, args).await,
        Command::Hashes => run_query(&app, Operation::ViewHashes).await,
        Command::Info => run_query(&app, Operation::SystemInfo).await,
        Command::Password(args) => run_password(&app, &args).await,
        Command::Shell => run_shell(&app).await,
    };

    // Let pending notifications reach the visible phase before exiting.
    tokio::time::sleep(SETTLE_DELAY * 2).await;
    renderer.abort();
    result
}

// =============================================================================
// ONE-SHOT COMMANDS
// =============================================================================

async fn run_file(app: &App, operation: Operation, args: FileArgs) -> Result<(), CliError> {
    app.select(&args.file, args.mime).await?;
    run_query(app, operation).await
}

async fn run_query(app: &App, operation: Operation) -> Result<(), CliError> {
    match app.dispatcher.invoke(&app.session, operation, None).await {
        DispatchStatus::Completed => Ok(()),
        _ => Err(CliError::OperationFailed(operation)),
    }
}

async fn run_password(app: &App, args: &PasswordArgs) -> Result<(), CliError> {
    if !generate_password(app.panel.clone(), app.session.clone(), args.policy())
        .await
        .is_success()
    {
        return Err(CliError::OperationFailed(Operation::GeneratePassword));
    }
    if args.copy {
        app.panel.copy_current(&app.session)?;
    }
    Ok(())
}

// =============================================================================
// SHELL
// =============================================================================

/// Generate, then show the strength in its tier colour.
async fn generate_password(panel: Arc<PasswordPanel>, session: Arc<Session>, policy: PasswordPolicy) -> DispatchStatus {
    let status = panel.generate(&session, policy).await;
    if status.is_success()
        && let Some(line) = panel.strength_display(&session)
    {
        println!("  {line}");
    }
    status
}

/// Background feeds the shell reads from.
struct Ticker {
    counters: watch::Receiver<Option<TelemetryCounters>>,
    clock: watch::Receiver<String>,
}

async fn run_shell(app: &App) -> Result<(), CliError> {
    let (poller, counters) = TelemetryPoller::spawn(app.remote.clone(), app.config.telemetry_interval);
    let (clock, time_of_day) = Clock::spawn();
    let title = std::io::stdout()
        .is_terminal()
        .then(|| spawn_title(time_of_day.clone()));
    let ticker = Ticker { counters, clock: time_of_day };
    let mut jobs = OperationJobs::new();
    println!("cybershield shell, service at {}; `help` lists commands", app.config.base_url);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let read = loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break Ok(()),
            Err(err) => break Err(CliError::Stdin(err)),
        };
        jobs.reap();
        match shell::parse(&line) {
            Ok(ShellCommand::Quit) => break Ok(()),
            Ok(command) => handle_shell_command(app, command, &ticker, &mut jobs).await,
            Err(err) => eprintln!("{err}"),
        }
    };

    // Started operations run to completion so their outcome is logged.
    jobs.drain().await;
    if let Some(title) = title {
        title.abort();
    }
    clock.abort();
    poller.abort();
    read
}

async fn handle_shell_command(app: &App, command: ShellCommand, ticker: &Ticker, jobs: &mut OperationJobs) {
    match command {
        ShellCommand::Select(path) => match app.select(&path, None).await {
            Ok(summary) => println!("{summary}"),
            Err(err) => eprintln!("{err}"),
        },
        ShellCommand::Run(operation) => {
            let (dispatcher, session) = (app.dispatcher.clone(), app.session.clone());
            jobs.spawn(async move { dispatcher.invoke(&session, operation, None).await });
        }
        ShellCommand::Password(policy) => {
            jobs.spawn(generate_password(app.panel.clone(), app.session.clone(), policy));
        }
        ShellCommand::CopyPassword => {
            // Failures are already on the notification feed.
            let _ = app.panel.copy_current(&app.session);
        }
        ShellCommand::Log(LogAction::Save) => {
            if let Ok(path) = app.feedback.save_log(app.sink.as_ref()).await {
                println!("saved {}", path.display());
            }
        }
        ShellCommand::Log(LogAction::Copy) => {
            let _ = app.feedback.copy_log(&app.clipboard);
        }
        ShellCommand::Log(LogAction::Clear) => app.feedback.log.clear(),
        ShellCommand::Status => print_status(app, ticker),
        ShellCommand::Help => println!("{}", shell::HELP),
        ShellCommand::Empty | ShellCommand::Quit => {}
    }
}

fn print_status(app: &App, ticker: &Ticker) {
    let counters = *ticker.counters.borrow();
    let telemetry = counters.map_or_else(
        || "stored hashes: -  backup files: -".to_owned(),
        |c| format!("stored hashes: {}  backup files: {}", c.stored_hashes, c.backup_files),
    );
    let selection = app
        .session
        .artifact()
        .map_or_else(|| "none".to_owned(), |a| a.name.clone());
    let busy: Vec<&str> = Operation::ALL
        .into_iter()
        .filter(|op| app.dispatcher.is_busy(*op))
        .map(Operation::as_str)
        .collect();
    println!(
        "{}  {telemetry}  selected: {selection}  running: {}",
        *ticker.clock.borrow(),
        if busy.is_empty() { "-".to_owned() } else { busy.join(",") }
    );
}

/// Keep the terminal title showing the time of day.
fn spawn_title(mut clock: watch::Receiver<String>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let title = title_sequence(&format!("cybershield {}", *clock.borrow_and_update()));
            let written = {
                let mut out = std::io::stdout().lock();
                out.write_all(title.as_bytes()).and_then(|()| out.flush())
            };
            if written.is_err() {
                break;
            }
            if clock.changed().await.is_err() {
                break;
            }
        }
    })
}

// =============================================================================
// RENDERING
// =============================================================================

/// Print log entries as they are appended and notifications as they appear.
fn spawn_renderer(feedback: &Feedback) -> JoinHandle<()> {
    let mut log = feedback.log.subscribe();
    let mut notifications = feedback.notifications.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                entry = log.recv() => match entry {
                    Ok(entry) => println!("{}", entry.render()),
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "renderer: log entries dropped"),
                    Err(RecvError::Closed) => break,
                },
                change = notifications.recv() => match change {
                    Ok(change) if change.phase == Phase::Visible => {
                        println!("  ({}) {}", change.severity.as_str(), change.text);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "renderer: notifications dropped"),
                    Err(RecvError::Closed) => break,
                },
            }
        }
    })
}
