//! CLI binary for edgequake-pdfchat.
//!
//! Maps CLI flags to `ChatConfig`, then drives one `Session` from the
//! terminal: an optional PDF uploaded at start, followed by either the
//! `--question` list (one-shot) or an interactive prompt.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdfchat::config::{DEFAULT_API_BASE_URL, DEFAULT_API_KEY_ENV, DEFAULT_MODEL};
use edgequake_pdfchat::{
    inspect, ChatConfig, ChatProgressCallback, PdfChat, PdfChatError, ProgressCallback, Role,
    Session,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Busy indicator ───────────────────────────────────────────────────────────

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Shows a spinner while the PDF is processed and while the model thinks.
struct CliProgressCallback {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            spinner: Mutex::new(None),
        })
    }

    fn start(&self, prefix: &str, msg: String) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix(prefix.to_string());
        bar.set_message(msg);
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Some(old) = self.spinner.lock().unwrap().replace(bar) {
            old.finish_and_clear();
        }
    }

    fn stop(&self) {
        if let Some(bar) = self.spinner.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }
}

impl ChatProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, name: &str) {
        self.start("Processing PDF…", name.to_string());
    }

    fn on_extraction_complete(&self, page_count: usize, text_len: usize) {
        self.stop();
        eprintln!(
            "{} PDF processed successfully!  {}",
            green("✔"),
            dim(&format!("{page_count} pages, {text_len} chars"))
        );
    }

    fn on_extraction_error(&self, _error: &str) {
        self.stop();
    }

    fn on_answer_start(&self, _question: &str) {
        self.start("Thinking…", String::new());
    }

    fn on_answer_complete(&self, _answer_len: usize, _duration_ms: u64) {
        self.stop();
    }

    fn on_answer_error(&self, _error: &str) {
        self.stop();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Upload a PDF and chat interactively
  pdfchat report.pdf

  # One-shot questions
  pdfchat report.pdf -q "What is the conclusion?" -q "Who are the authors?"

  # Upload from a URL
  pdfchat https://arxiv.org/pdf/1706.03762

  # Use an edgequake-llm provider instead of Groq
  pdfchat --provider openai --model gpt-4.1-mini report.pdf

  # Inspect PDF metadata (no API key needed)
  pdfchat --inspect-only report.pdf

INTERACTIVE COMMANDS:
  /upload <path|url>   Upload a PDF (one per session)
  /history             Show the conversation so far
  /info                Show the loaded document's metadata
  /help                Show these commands
  /quit                Leave the session
  anything else        Ask a question about the PDF

ENVIRONMENT VARIABLES:
  GROQ_API_KEY         API key for the default Groq endpoint
  PDFCHAT_API_KEY_ENV  Read the key from a different variable instead
  PDFCHAT_API_BASE     Any OpenAI-compatible base URL
  PDFCHAT_MODEL        Model ID
  PDFCHAT_PROVIDER     edgequake-llm provider (openai, anthropic, gemini, ollama)
  PDFIUM_LIB_PATH      Path to libpdfium (file or directory)

  Any of these may also be set in a .env file in the working directory
  (or a parent). Values already in the environment take precedence.
"#;

/// Ask questions about a PDF using a chat-completion LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdfchat",
    version,
    about = "Ask questions about a PDF using a chat-completion LLM",
    long_about = "Upload a PDF (local file or URL) and ask natural-language questions about it. \
The full extracted text is sent as context to the model on every question.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF to upload at start: local file path or HTTP/HTTPS URL.
    pdf: Option<String>,

    /// Ask this question and exit (repeatable). Requires a PDF.
    #[arg(short = 'q', long = "question")]
    questions: Vec<String>,

    /// Chat model ID.
    #[arg(long, env = "PDFCHAT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// edgequake-llm provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "PDFCHAT_PROVIDER",
        long_help = "Answer through an edgequake-llm provider instead of the OpenAI-compatible \
          endpoint. The provider reads its own API key variable (OPENAI_API_KEY, …)."
    )]
    provider: Option<String>,

    /// OpenAI-compatible API base URL.
    #[arg(long, env = "PDFCHAT_API_BASE", default_value = DEFAULT_API_BASE_URL)]
    api_base: String,

    /// Environment variable holding the API key.
    #[arg(long, env = "PDFCHAT_API_KEY_ENV", default_value = DEFAULT_API_KEY_ENV)]
    api_key_env: String,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDFCHAT_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Max LLM output tokens per answer.
    #[arg(long, env = "PDFCHAT_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFCHAT_PASSWORD")]
    password: Option<String>,

    /// Path to a text file replacing the answering instructions.
    #[arg(long, env = "PDFCHAT_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// HTTP download timeout in seconds for URL uploads.
    #[arg(long, env = "PDFCHAT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print PDF metadata only, no chat.
    #[arg(long)]
    inspect_only: bool,

    /// Print the transcript as JSON after one-shot questions.
    #[arg(long, env = "PDFCHAT_JSON")]
    json: bool,

    /// Disable the busy spinner.
    #[arg(long, env = "PDFCHAT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFCHAT_VERBOSE")]
    verbose: bool,

    /// Suppress everything except answers and errors.
    #[arg(long, env = "PDFCHAT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A `.env` file (cwd or a parent) is loaded before argument parsing so
    // both the PDFCHAT_* fallbacks and the API key lookup see its values.
    // Variables already set in the environment win.
    let env_file = dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO logs would interleave with the spinner, so they are only shown
    // when the spinner is off.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if let Some(ref path) = env_file {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let input = cli
            .pdf
            .as_deref()
            .context("--inspect-only needs a PDF path or URL")?;
        let meta = inspect(input, cli.password.as_deref(), cli.download_timeout)
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            print_metadata(&meta);
        }
        return Ok(());
    }

    // ── Build config and handlers ────────────────────────────────────────
    // A missing credential stops the program here, before any upload.
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ChatProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb).await?;
    let chat = PdfChat::new(config).context("Failed to start")?;

    let mut session = Session::new();

    if !cli.questions.is_empty() {
        return run_one_shot(&cli, &chat, &mut session).await;
    }

    if !cli.quiet {
        eprintln!(
            "{} {}  {}",
            cyan("◆"),
            bold("Chat with your PDF"),
            dim(&format!("{} · {}", chat.backend_name(), chat.config().model))
        );
    }

    if let Some(ref pdf) = cli.pdf {
        if let Err(e) = chat.handle_upload(&mut session, pdf).await {
            eprintln!("{}", error_line(&e));
        }
    } else if !cli.quiet {
        eprintln!("{}", dim("Upload your PDF file with /upload <path|url>. Type /help for commands."));
    }

    run_interactive(&chat, &mut session).await
}

/// Answer every `--question` in order and exit. Any failure is fatal.
async fn run_one_shot(cli: &Cli, chat: &PdfChat, session: &mut Session) -> Result<()> {
    let pdf = cli
        .pdf
        .as_deref()
        .context("--question needs a PDF path or URL")?;
    chat.handle_upload(session, pdf)
        .await
        .context("Failed to load PDF")?;

    for question in &cli.questions {
        let answer = chat
            .handle_question(session, question)
            .await
            .with_context(|| format!("Failed to answer {question:?}"))?;
        if !cli.json {
            if cli.questions.len() > 1 {
                println!("{} {}", bold("Q:"), question);
            }
            println!("{}", answer.content);
        }
    }

    if cli.json {
        let json = serde_json::to_string_pretty(session.transcript())
            .context("Failed to serialise transcript")?;
        println!("{json}");
    }
    Ok(())
}

/// Read lines from stdin until `/quit` or EOF, one interaction at a time.
async fn run_interactive(chat: &PdfChat, session: &mut Session) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", cyan("›"));
        io::stdout().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            println!();
            break;
        };

        match parse_command(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => eprintln!("{}", dim(INTERACTIVE_HELP)),
            Command::History => print_history(session),
            Command::Info => match session.document() {
                Some(doc) => print_metadata(&doc.metadata),
                None => eprintln!("{}", error_line(&PdfChatError::NoDocumentLoaded)),
            },
            Command::Upload(input) => {
                if let Err(e) = chat.handle_upload(session, input).await {
                    eprintln!("{}", error_line(&e));
                }
            }
            Command::Question(question) => match chat.handle_question(session, question).await {
                Ok(answer) => {
                    println!("{} {}", green("assistant ›"), answer.content);
                }
                Err(e) => eprintln!("{}", error_line(&e)),
            },
        }
    }

    Ok(())
}

/// Session-state errors are shown as a plain notice; everything else is
/// printed raw as a failure.
fn error_line(e: &PdfChatError) -> String {
    if e.is_usage_error() {
        format!("{} {}", cyan("ℹ"), e)
    } else {
        format!("{} {}", red("✘"), red(&e.to_string()))
    }
}

const INTERACTIVE_HELP: &str = "/upload <path|url>  upload a PDF\n\
/history            show the conversation\n\
/info               show document metadata\n\
/quit               leave\n\
anything else       ask a question (sent exactly as typed)";

#[derive(Debug, PartialEq)]
enum Command<'a> {
    Empty,
    Quit,
    Help,
    History,
    Info,
    Upload(&'a str),
    Question(&'a str),
}

/// Classify one input line. Only known `/commands` are intercepted; any
/// other non-blank line is a question and is passed on untouched.
fn parse_command(line: &str) -> Command<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Question(line);
    };
    let (name, arg) = rest
        .split_once(char::is_whitespace)
        .map(|(n, a)| (n, a.trim()))
        .unwrap_or((rest, ""));
    match name {
        "quit" | "exit" => Command::Quit,
        "help" | "upload" | "load" if arg.is_empty() => Command::Help,
        "history" if arg.is_empty() => Command::History,
        "info" if arg.is_empty() => Command::Info,
        "upload" | "load" => Command::Upload(arg),
        _ => Command::Question(line),
    }
}

fn print_history(session: &Session) {
    if session.transcript().is_empty() {
        eprintln!("{}", dim("(no messages yet)"));
        return;
    }
    for turn in session.transcript() {
        let label = match turn.role() {
            Role::User => cyan("you ›"),
            Role::Assistant => green("assistant ›"),
            Role::System => dim("system ›"),
        };
        println!("{} {}", label, turn.content());
    }
}

fn print_metadata(meta: &edgequake_pdfchat::DocumentMetadata) {
    println!("File:         {}", meta.source);
    if let Some(ref t) = meta.title {
        println!("Title:        {}", t);
    }
    if let Some(ref a) = meta.author {
        println!("Author:       {}", a);
    }
    if let Some(ref s) = meta.subject {
        println!("Subject:      {}", s);
    }
    println!("Pages:        {}", meta.page_count);
    println!("PDF Version:  {}", meta.pdf_version);
    if let Some(ref p) = meta.producer {
        println!("Producer:     {}", p);
    }
    if let Some(ref c) = meta.creator {
        println!("Creator:      {}", c);
    }
}

/// Map CLI args to `ChatConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ChatConfig> {
    let mut builder = ChatConfig::builder()
        .model(cli.model.clone())
        .temperature(cli.temperature)
        .api_base_url(cli.api_base.clone())
        .api_key_env(cli.api_key_env.clone())
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(ref name) = cli.provider {
        builder = builder.provider_name(name.clone());
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
