use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use rox::ast_printer::AstPrinter;
use rox::diagnostic::{Reporter, StderrReporter};
use rox::error::LoxError;
use rox::parser::Parser;
use rox::scanner::Scanner;
use rox::session::Session;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Script to run; starts an interactive prompt when omitted
    file: Option<PathBuf>,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs a Lox program
    Run { filename: PathBuf },

    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print one JSON object per token
        #[arg(long)]
        json: bool,
    },

    /// Parses a file and prints each top-level statement's tree
    Parse { filename: PathBuf },
}

/// Map the file and validate it as UTF‑8.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).with_context(|| format!("Failed to open file {:?}", filename))?;

    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat file {:?}", filename))?
        .len();

    // Mapping a zero-length file fails on some platforms.
    if len == 0 {
        return Ok(String::new());
    }

    // SAFETY: the map is read once, copied out, and dropped before returning.
    let map = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to map file {:?}", filename))?;

    let text = std::str::from_utf8(&map)
        .map_err(LoxError::from)
        .with_context(|| format!("File {:?} is not valid UTF-8", filename))?;

    info!("Read {} bytes from {:?}", map.len(), filename);

    Ok(text.to_owned())
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);

            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to app.log");

    Ok(())
}

fn run_file(filename: &Path) -> Result<()> {
    info!("Running {:?}", filename);

    let source = read_file(filename)?;

    let mut session = Session::new();
    let mut reporter = StderrReporter::stderr();

    let outcome = session.run(source, &mut reporter);

    io::stdout().flush().context("Failed to flush stdout")?;

    if let Err(err) = outcome.into_result() {
        let code = err.exit_code();
        debug!("Run failed ({:?}), exiting with code {}", err, code);

        process::exit(code);
    }

    info!("Program executed successfully");

    Ok(())
}

fn run_prompt() -> Result<()> {
    info!("Starting interactive prompt");

    let mut session = Session::new();
    let mut reporter = StderrReporter::stderr();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        // Each line gets a fresh outcome, so a bad line doesn't poison the next.
        let outcome = session.run(line, &mut reporter);
        debug!("Line finished: {:?}", outcome);
    }

    println!();

    Ok(())
}

fn tokenize(filename: &Path, json: bool) -> Result<()> {
    info!("Running Tokenize subcommand");

    let source = read_file(filename)?;
    let mut reporter = StderrReporter::stderr();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    for result in Scanner::new(&source) {
        match result {
            Ok(token) if token.is_semantic() => {
                if json {
                    serde_json::to_writer(&mut out, &token).context("Failed to encode token")?;
                    writeln!(out)?;
                } else {
                    writeln!(out, "{}", token)?;
                }
            }

            Ok(_) => {}

            Err(e) => reporter.report(e.line, "", &e.message),
        }
    }

    out.flush()?;

    if reporter.count() > 0 {
        let code = LoxError::Static { count: reporter.count() }.exit_code();
        debug!("Tokenization failed, exiting with code {}", code);

        process::exit(code);
    }

    info!("Tokenization completed successfully");

    Ok(())
}

fn parse(filename: &Path) -> Result<()> {
    info!("Running Parse subcommand");

    let source = read_file(filename)?;
    let mut reporter = StderrReporter::stderr();

    let mut tokens = Vec::new();
    for result in Scanner::new(&source) {
        match result {
            Ok(token) if token.is_semantic() => tokens.push(token),
            Ok(_) => {}
            Err(e) => reporter.report(e.line, "", &e.message),
        }
    }

    for result in Parser::new(&tokens) {
        match result {
            Ok(stmt) => println!("{}", AstPrinter::print_stmt(&stmt)),
            Err(e) => reporter.report(e.token.line, &e.location(), &e.message),
        }
    }

    if reporter.count() > 0 {
        let code = LoxError::Static { count: reporter.count() }.exit_code();
        debug!("Parse failed, exiting with code {}", code);

        process::exit(code);
    }

    info!("Parse subcommand completed");

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        Builder::new().filter_level(log::LevelFilter::Off).init();
    }

    info!("CLI arguments: {:?}", args);

    match (args.command, args.file) {
        (Some(Commands::Run { filename }), _) | (None, Some(filename)) => run_file(&filename),
        (Some(Commands::Tokenize { filename, json }), _) => tokenize(&filename, json),
        (Some(Commands::Parse { filename }), _) => parse(&filename),
        (None, None) => run_prompt(),
    }
}
