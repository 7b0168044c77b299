use clap::{Parser as ClapParser, Subcommand};
use formula_lang::ParserOptions;
use formula_lang::cli::{self, CheckOptions, CliError};
use formula_lang::parser::DEFAULT_MAX_DEPTH;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "formula")]
#[command(about = "Tokenize, parse and validate business-rule formulas")]
#[command(version)]
struct Cli {
    /// Maximum expression nesting depth
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream of a formula
    Tokenize {
        /// The formula (reads from stdin if not provided)
        formula: Option<String>,

        /// Print tokens as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the syntax tree of a formula as JSON
    Parse {
        /// The formula (reads from stdin if not provided)
        formula: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Validate a formula and list the fields and functions it uses
    Check {
        /// The formula (reads from stdin if not provided)
        formula: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let options = ParserOptions {
        max_depth: cli.max_depth,
    };

    let result = match cli.command {
        Commands::Tokenize { formula, json } => read_formula(formula).and_then(|f| {
            if json {
                cli::tokens_to_json_string(&f, true)
            } else {
                cli::tokens_table(&f)
            }
        }),
        Commands::Parse { formula, pretty } => {
            read_formula(formula).and_then(|f| cli::parse_to_json(&f, options, pretty))
        }
        Commands::Check { formula } => read_formula(formula).and_then(|formula| {
            cli::execute_check(&CheckOptions {
                formula,
                parser: options,
            })
            .map(|report| report.to_string())
        }),
    };

    match result {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn read_formula(formula: Option<String>) -> Result<String, CliError> {
    match formula {
        Some(f) => Ok(f),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer.trim_end_matches(['\r', '\n']).to_string())
        }
        None => Err(CliError::NoInput),
    }
}
