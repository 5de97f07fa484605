use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use pqcbench_console::{tabs, Console};
use pqcbench_core::{ConsoleConfig, Table};
use std::future::Future;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pqcbench")]
#[command(about = "pqcbench - PQC transaction encryption console", long_about = None)]
struct Cli {
    /// Backend base URL (overrides PQCBENCH_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Request timeout in seconds (overrides PQCBENCH_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Session user cookie value (overrides PQCBENCH_USER)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Table output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Html,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit one JSON transaction for encryption
    Push {
        /// Transaction JSON (reads stdin when omitted)
        json: Option<String>,

        /// Print the returned ciphertexts
        #[arg(long)]
        show_ciphertext: bool,
    },

    /// Upload a bulk transaction file
    Bulk {
        /// File to upload (CSV, JSON, ...)
        file: Option<PathBuf>,
    },

    /// Show stored benchmark sessions
    Sessions,

    /// Show live per-algorithm benchmarks
    Live,

    /// Show per-algorithm averages over all sessions
    History,

    /// Expire the session cookie and follow the logout route
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let console = Console::new(&config)?;
    tracing::debug!("Using backend {}", config.backend.base_url);

    match cli.command {
        Some(Commands::Push {
            json,
            show_ciphertext,
        }) => {
            let raw = match json {
                Some(raw) => raw,
                None => io::read_to_string(io::stdin())?,
            };
            cmd_push(&console, &raw, show_ciphertext).await?
        }
        Some(Commands::Bulk { file }) => cmd_bulk(&console, file.as_deref()).await?,
        Some(Commands::Sessions) => cmd_table(&console, tabs::SESSIONS_TAB, cli.output).await?,
        Some(Commands::Live) => cmd_table(&console, tabs::LIVE_TAB, cli.output).await?,
        Some(Commands::History) => cmd_table(&console, tabs::HISTORY_TAB, cli.output).await?,
        Some(Commands::Logout) => cmd_logout(&console).await?,
        None => run_interactive(&console, cli.output).await?,
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<ConsoleConfig> {
    let mut config = ConsoleConfig::from_env()?;
    if let Some(url) = &cli.url {
        config.backend.base_url = url.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.backend.timeout_secs = timeout;
    }
    if let Some(user) = &cli.user {
        config.session.user = Some(user.clone());
    }
    config.validate()?;
    Ok(config)
}

async fn cmd_push(console: &Console, raw: &str, show_ciphertext: bool) -> Result<()> {
    let result = console.push_single(raw).await;
    println!("{}", console.single_status());

    let encrypted = result?;
    if show_ciphertext {
        match encrypted {
            Some(e) => {
                println!("  Public key:      {}", e.public_key);
                println!("  OQS ciphertext:  {}", e.oqs_ciphertext);
                println!("  AES ciphertext:  {}", e.aes_ciphertext);
            }
            None => println!("  (backend returned no ciphertext)"),
        }
    }
    Ok(())
}

async fn cmd_bulk(console: &Console, file: Option<&Path>) -> Result<()> {
    let result = console.push_bulk(file).await;
    for line in console.bulk_log() {
        println!("  {}", line);
    }
    println!("{}", console.bulk_status());
    result?;
    Ok(())
}

async fn cmd_table(console: &Console, tab: &str, output: OutputFormat) -> Result<()> {
    console.show_tab(tab);
    let table = match tab {
        tabs::SESSIONS_TAB => console.fetch_session_benchmarks().await?,
        tabs::LIVE_TAB => console.fetch_live_benchmarks().await?,
        _ => console.fetch_history_benchmarks().await?,
    };
    print_table(&table, output);
    Ok(())
}

async fn cmd_logout(console: &Console) -> Result<()> {
    let status = console.logout().await?;
    println!("Logged out (logout route answered {})", status);
    Ok(())
}

fn print_table(table: &Table, output: OutputFormat) {
    println!();
    match output {
        OutputFormat::Html => println!("{}", table.to_html()),
        OutputFormat::Table => println!("{}", table.to_text()),
    }
    println!();
}

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand<'a> {
    Help,
    Tab(&'a str),
    Push(&'a str),
    Bulk(Option<&'a str>),
    Refresh,
    Status,
    Logout,
    Clear,
    Exit,
    Empty,
    Unknown(&'a str),
}

fn parse_line(line: &str) -> ReplCommand<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplCommand::Empty;
    }

    let (cmd, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (trimmed, ""),
    };
    let arg = (!rest.is_empty()).then_some(rest);

    match cmd.to_lowercase().as_str() {
        "help" | "h" | "?" => ReplCommand::Help,
        "tab" | "t" => match arg {
            Some(id) => ReplCommand::Tab(id),
            None => ReplCommand::Unknown(cmd),
        },
        "push" | "p" => ReplCommand::Push(rest),
        "bulk" | "b" => ReplCommand::Bulk(arg),
        "refresh" | "r" => ReplCommand::Refresh,
        "status" | "s" => ReplCommand::Status,
        "logout" => ReplCommand::Logout,
        "clear" | "cls" => ReplCommand::Clear,
        "exit" | "quit" | "q" => ReplCommand::Exit,
        _ => ReplCommand::Unknown(cmd),
    }
}

async fn run_interactive(console: &Console, output: OutputFormat) -> Result<()> {
    display_welcome(console);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        let prompt = console.active_tab().unwrap_or_else(|| "-".to_string());
        print!("[{}]> ", prompt);
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        match parse_line(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Help => display_help(console),
            ReplCommand::Tab(id) => {
                if console.show_tab(id) {
                    show_panel(console, output);
                } else {
                    println!("No such tab: {}. Tabs: {}", id, console.tab_ids().join(", "));
                }
            }
            ReplCommand::Push(raw) => {
                console.show_tab(tabs::PUSH_TAB);
                if let Err(e) = cancellable(console, console.push_single(raw)).await {
                    tracing::debug!("Push command failed: {}", e);
                }
                println!("{}", console.single_status());
            }
            ReplCommand::Bulk(path) => {
                console.show_tab(tabs::BULK_TAB);
                if let Err(e) = cancellable(console, cmd_bulk(console, path.map(Path::new))).await {
                    tracing::debug!("Bulk command failed: {}", e);
                }
            }
            ReplCommand::Refresh => match console.active_tab().as_deref() {
                Some(tab @ (tabs::SESSIONS_TAB | tabs::LIVE_TAB | tabs::HISTORY_TAB)) => {
                    if let Err(e) = cancellable(console, cmd_table(console, tab, output)).await {
                        println!("Error: {}", e);
                    }
                }
                _ => println!("Nothing to refresh on this tab."),
            },
            ReplCommand::Status => display_status(console),
            ReplCommand::Logout => {
                if let Err(e) = cancellable(console, cmd_logout(console)).await {
                    println!("Error: {}", e);
                }
                break;
            }
            ReplCommand::Clear => {
                print!("\x1B[2J\x1B[1;1H");
                stdout.flush()?;
            }
            ReplCommand::Exit => break,
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}. Type 'help' for available commands.", cmd);
            }
        }
    }

    Ok(())
}

/// Runs `fut`, cancelling the console's in-flight request on Ctrl-C.
async fn cancellable<F: Future>(console: &Console, fut: F) -> F::Output {
    tokio::pin!(fut);
    tokio::select! {
        out = &mut fut => out,
        _ = tokio::signal::ctrl_c() => {
            console.cancel();
            fut.await
        }
    }
}

/// Prints the active panel, fetching benchmark tables on first view.
fn show_panel(console: &Console, output: OutputFormat) {
    let Some(tab) = console.active_tab() else {
        return;
    };
    let cached = match tab.as_str() {
        tabs::SESSIONS_TAB => console.session_table(),
        tabs::LIVE_TAB => console.live_table(),
        tabs::HISTORY_TAB => console.history_table(),
        tabs::PUSH_TAB => {
            println!("  push <json>    submit one transaction");
            println!("  {}", console.single_status());
            return;
        }
        _ => {
            println!("  bulk <file>    upload a transaction file");
            for line in console.bulk_log() {
                println!("  {}", line);
            }
            println!("  {}", console.bulk_status());
            return;
        }
    };

    match cached {
        Some(table) => print_table(&table, output),
        None => println!("  No data yet. Use 'refresh' to fetch."),
    }
}

fn display_status(console: &Console) {
    println!();
    println!("Console Status:");
    println!("{:-<40}", "");
    println!("  Backend:     {}", console.client().base_url());
    println!("  Active tab:  {}", console.active_tab().unwrap_or_else(|| "-".to_string()));
    println!(
        "  Session:     {}",
        if console.session_cookie().is_some() { "signed in" } else { "no session cookie" }
    );
    println!("  Push:        {}", console.single_status());
    println!("  Bulk:        {}", console.bulk_status());
    println!();
}

fn display_welcome(console: &Console) {
    println!();
    println!("  pqcbench - PQC transaction encryption console");
    println!();
    println!("  Backend: {}", console.client().base_url());
    println!("  Tabs:    {}", console.tab_ids().join(", "));
    println!();
    println!("  Type 'help' for commands.");
    println!();
}

/// Once a request has been cancelled, Ctrl-C at the prompt no longer ends the process.
const CANCEL_HINT: &str = "Tip: Ctrl-C cancels a running request. It does not quit; use 'exit' or Ctrl-D.";

fn display_help(console: &Console) {
    println!();
    println!("Available Commands:");
    println!("  tab, t <id>            Switch tab ({})", console.tab_ids().join(", "));
    println!("  push, p <json>         Submit one JSON transaction");
    println!("  bulk, b <file>         Upload a bulk transaction file");
    println!("  refresh, r             Re-fetch the table on the active tab");
    println!("  status, s              Show console status");
    println!("  logout                 Clear the session cookie and log out");
    println!("  clear, cls             Clear screen");
    println!("  help, h                Show this help message");
    println!("  exit, quit, q          Leave the console");
    println!();
    println!("{}", CANCEL_HINT);
    println!();
}
