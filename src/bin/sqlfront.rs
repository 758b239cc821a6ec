use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use sqlfront::{parse_file, parse_sql, Statement};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "sqlfront",
    about = "Parse SQL statements, print their category and canonical form"
)]
struct Cli {
    /// Parse SQL and exit
    #[arg(short = 'e')]
    execute: Option<String>,

    /// Parse the statements in a file and exit
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn format_statement(stmt: &Statement, format: OutputFormat) -> String {
    let kind = stmt.statement_type();
    let sql = stmt.sql_string();
    match format {
        OutputFormat::Text => format!("{}\t{};", kind, sql),
        OutputFormat::Json => serde_json::json!({
            "type": kind.as_str(),
            "sql": sql,
        })
        .to_string(),
    }
}

fn print_statements(result: sqlfront::Result<Vec<Statement>>, format: OutputFormat) -> bool {
    match result {
        Ok(statements) => {
            for stmt in &statements {
                println!("{}", format_statement(stmt, format));
            }
            true
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            false
        }
    }
}

fn run_repl(format: OutputFormat) {
    let mut rl = rustyline::DefaultEditor::new().unwrap_or_else(|e| {
        eprintln!("ERROR: Failed to initialize REPL: {}", e);
        process::exit(1);
    });

    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() {
            "sqlfront> "
        } else {
            "       -> "
        };

        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if buffer.is_empty() && (trimmed == "quit" || trimmed == "exit") {
                    break;
                }

                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(trimmed);

                // A statement is complete once the buffer ends with ;
                if buffer.trim_end().ends_with(';') {
                    let sql = buffer.trim().to_string();
                    let _ = rl.add_history_entry(&sql);
                    print_statements(parse_sql(&sql), format);
                    buffer.clear();
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                // Ctrl-C: clear current buffer
                buffer.clear();
                println!();
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                // Ctrl-D: exit
                break;
            }
            Err(e) => {
                eprintln!("ERROR: {}", e);
                break;
            }
        }
    }

    if !buffer.trim().is_empty() {
        warn!("discarding unterminated input at exit");
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if cli.execute.is_some() && cli.file.is_some() {
        eprintln!("ERROR: -e and -f are mutually exclusive");
        process::exit(2);
    }

    let ok = if let Some(sql) = &cli.execute {
        print_statements(parse_sql(sql), cli.format)
    } else if let Some(path) = &cli.file {
        debug!(path = %path.display(), "parsing file");
        print_statements(parse_file(path), cli.format)
    } else {
        run_repl(cli.format);
        true
    };

    if !ok {
        process::exit(1);
    }
}
