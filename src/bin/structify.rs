//! Structify CLI: normalize BRD text and chat with the rule-based assistant.
//!
//! Usage:
//!   structify parse <FILE> [--format text|markdown|html|json]
//!   structify demo [--format ...]
//!   structify generate --transcript F --email F --document F [--format ...]
//!   structify chat [FILE] [--rules PATH] [--no-delay]
//!   structify rules [--rules PATH]

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use structify::chat::{builtin_rules, ResponseDelay, RuleTable, RuleTableError, GREETING};
use structify::generate::{ArtifactKind, GenerationPipeline, SourceArtifact, SourceBundle};
use structify::render::{render, RenderFormat};
use structify::session::{DocumentChanged, DocumentOrigin, SessionStore};
use structify::{normalize, ChatEngine, DocumentState, RejectReason, TurnOutcome};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "structify",
    version,
    about = "Business requirements document normalizer and chat assistant"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a BRD text file and print it
    Parse {
        /// Path to the raw BRD text
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Print the demonstration BRD
    Demo {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Bundle project artifacts and generate a BRD from them
    Generate {
        /// Meeting transcript files
        #[arg(long)]
        transcript: Vec<PathBuf>,
        /// Email files
        #[arg(long)]
        email: Vec<PathBuf>,
        /// Document files
        #[arg(long)]
        document: Vec<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Chat about a BRD; matching requests edit the document
    Chat {
        /// BRD text to start from (none: start empty)
        file: Option<PathBuf>,
        /// YAML rule table to use instead of the default
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Reply without the simulated typing delay
        #[arg(long)]
        no_delay: bool,
    },
    /// Print the active chat rule table
    Rules {
        /// YAML rule table to use instead of the default
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Markdown,
    Html,
    Json,
}

impl From<Format> for RenderFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => RenderFormat::Text,
            Format::Markdown => RenderFormat::Markdown,
            Format::Html => RenderFormat::Html,
            Format::Json => RenderFormat::Json,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Get the default rule table path (~/.config/structify/rules.yaml)
fn default_rules_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("structify").join("rules.yaml"))
}

/// An explicit path must load; the default path is used only if present.
fn load_rules(path: Option<PathBuf>) -> Result<RuleTable, RuleTableError> {
    if let Some(path) = path {
        return RuleTable::from_path(&path);
    }
    match default_rules_path() {
        Some(path) if path.is_file() => {
            tracing::info!(path = %path.display(), "loading rule table");
            RuleTable::from_path(&path)
        }
        _ => Ok(builtin_rules()),
    }
}

fn print_state(state: &DocumentState, format: Format) -> i32 {
    match render(state, format.into()) {
        Ok(out) => {
            print!("{}", out);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Runtime::new().map_err(|e| format!("Failed to start runtime: {}", e))
}

fn cmd_parse(file: &Path, format: Format) -> i32 {
    let raw = match std::fs::read_to_string(file) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", file.display(), e);
            return 1;
        }
    };
    print_state(&normalize(Some(&raw)), format)
}

fn cmd_demo(format: Format) -> i32 {
    let bundle = SourceBundle::new().with(SourceArtifact::new(
        ArtifactKind::Document,
        "demo",
        "Demonstration request",
    ));
    run_generation(bundle, format)
}

fn cmd_generate(transcripts: &[PathBuf], emails: &[PathBuf], documents: &[PathBuf], format: Format) -> i32 {
    let mut bundle = SourceBundle::new();
    let inputs = [
        (ArtifactKind::Transcript, transcripts),
        (ArtifactKind::Email, emails),
        (ArtifactKind::Document, documents),
    ];
    for (kind, paths) in inputs {
        for path in paths {
            match SourceArtifact::from_path(kind, path) {
                Ok(artifact) => {
                    eprintln!("Added {} '{}' ({})", kind.label(), artifact.name, artifact.size_label());
                    bundle.push(artifact);
                }
                Err(e) => {
                    eprintln!("Error: cannot read '{}': {}", path.display(), e);
                    return 1;
                }
            }
        }
    }
    run_generation(bundle, format)
}

fn run_generation(bundle: SourceBundle, format: Format) -> i32 {
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let store = Arc::new(SessionStore::new());
    let pipeline = GenerationPipeline::demo(store.clone());
    match rt.block_on(pipeline.run_with_fallback(&bundle)) {
        Ok(report) => {
            if report.origin == DocumentOrigin::Demo {
                eprintln!("Note: showing demonstration content");
            }
            print_state(&store.normalize(), format)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_rules(path: Option<PathBuf>) -> i32 {
    let table = match load_rules(path) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    for (i, rule) in table.rules().iter().enumerate() {
        println!("{}. [{}]", i + 1, rule.keywords.join(", "));
        println!("   reply:  {}", rule.response);
        if let Some(inject) = &rule.inject {
            println!("   inject: ## {} <- {}", inject.section, inject.text);
        }
    }
    println!("fallback: {}", table.fallback().response);
    0
}

/// True if any change signal arrived since the last call.
fn drain_changes(changes: &mut broadcast::Receiver<DocumentChanged>) -> bool {
    let mut changed = false;
    loop {
        match changes.try_recv() {
            Ok(DocumentChanged) | Err(TryRecvError::Lagged(_)) => changed = true,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return changed,
        }
    }
}

fn print_document_update(state: &DocumentState) {
    match state.document() {
        Some(doc) => {
            let requirements =
                doc.functional_requirements.len() + doc.non_functional_requirements.len();
            println!(
                "(document updated: {} sections, {} requirements, {} risks; /show to view)",
                doc.section_count(),
                requirements,
                doc.risks.len()
            );
        }
        None => println!("(document updated)"),
    }
}

fn cmd_chat(file: Option<PathBuf>, rules: Option<PathBuf>, no_delay: bool) -> i32 {
    let table = match load_rules(rules) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let store = Arc::new(SessionStore::new());
    if let Some(path) = &file {
        match std::fs::read_to_string(path) {
            Ok(raw) => store.replace(raw, DocumentOrigin::Live),
            Err(e) => {
                eprintln!("Error: cannot read '{}': {}", path.display(), e);
                return 1;
            }
        }
    }

    let delay = if no_delay {
        ResponseDelay::immediate()
    } else {
        ResponseDelay::default()
    };
    let engine = ChatEngine::new(store.clone()).with_rules(table).with_delay(delay);
    let mut changes = store.subscribe();

    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    println!("AI: {}", GREETING);
    println!("(commands: /show, /reset, /quit)");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        }

        let input = line.trim();
        match input {
            "/quit" => break,
            "/reset" => {
                engine.reset();
                println!("AI: {}", GREETING);
                continue;
            }
            "/show" => {
                print_state(&store.normalize(), Format::Text);
                continue;
            }
            _ => {}
        }

        match rt.block_on(engine.send(input)) {
            TurnOutcome::Answered { reply, .. } => {
                println!("AI: {}", reply.text);
                if drain_changes(&mut changes) {
                    print_document_update(&store.normalize());
                }
            }
            TurnOutcome::Rejected(RejectReason::EmptyInput) => {}
            TurnOutcome::Rejected(RejectReason::Busy) => eprintln!("Warning: still waiting for a reply"),
            TurnOutcome::Cancelled => eprintln!("Warning: reply cancelled"),
        }
    }
    0
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match cli.command {
        Commands::Parse { file, format } => cmd_parse(&file, format),
        Commands::Demo { format } => cmd_demo(format),
        Commands::Generate {
            transcript,
            email,
            document,
            format,
        } => cmd_generate(&transcript, &email, &document, format),
        Commands::Chat {
            file,
            rules,
            no_delay,
        } => cmd_chat(file, rules, no_delay),
        Commands::Rules { rules } => cmd_rules(rules),
    };
    std::process::exit(code);
}
