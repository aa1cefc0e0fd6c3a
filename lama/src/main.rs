//! Lama Interpreter CLI

use clap::{Parser, Subcommand};
use lama::error::{report_at, report_error};
use lama::interp::{Config, Interpreter, DEFAULT_MAX_CALL_DEPTH};
use lama::{CompileError, Error};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lama", version, about = "Lama Interpreter")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Lama program against stdin and stdout
    Run {
        /// Source file to run
        file: PathBuf,
        /// Maximum nested call depth
        #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
        max_depth: usize,
        /// Do not print a prompt before each `read()`
        #[arg(long)]
        no_prompt: bool,
        /// Print the program's result value after it finishes
        #[arg(long)]
        print_result: bool,
    },
    /// Parse and dump AST (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
}

fn main() {
    lama::init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run {
            file,
            max_depth,
            no_prompt,
            print_result,
        } => {
            let mut config = Config::default().with_max_call_depth(max_depth);
            if no_prompt {
                config = config.without_prompt();
            }
            run_file(&file, config, print_result)
        }
        Command::Parse { file } => parse_file(&file),
        Command::Tokens { file } => tokenize_file(&file),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_file(path: &PathBuf, config: Config, print_result: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    let executable = match lama::compile_source(&filename, &source) {
        Ok(executable) => executable,
        Err(e) => return Err(reported(&filename, &source, Error::Compile(e))),
    };

    let mut interp = Interpreter::new().with_config(config);
    match interp.execute(&executable, &[]) {
        Ok(value) => {
            if print_result {
                println!("{value}");
            }
            Ok(())
        }
        Err(e) => Err(reported(&filename, &source, Error::Runtime(e))),
    }
}

/// Print a diagnostic for `error` and turn it into the CLI's error value
fn reported(filename: &str, source: &str, error: Error) -> Box<dyn std::error::Error> {
    match &error {
        Error::Compile(e) => report_error(filename, source, e),
        Error::Runtime(e) => report_at(filename, source, "Runtime", &e.message, e.span),
    }
    Box::new(error)
}

fn parse_file(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    let ast = lama::lexer::tokenize(&source)
        .and_then(|tokens| lama::parser::parse(&filename, &source, tokens))
        .map_err(|e: CompileError| reported(&filename, &source, Error::Compile(e)))?;

    println!("{}", serde_json::to_string_pretty(&ast)?);
    Ok(())
}

fn tokenize_file(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    let tokens = lama::lexer::tokenize(&source)
        .map_err(|e| reported(&filename, &source, Error::Compile(e)))?;
    for (tok, span) in &tokens {
        println!("{:?} @ {}..{}", tok, span.start, span.end);
    }

    Ok(())
}
