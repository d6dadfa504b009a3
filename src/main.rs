use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use mdnative::{Config, MarkdownView};

#[derive(Parser)]
#[command(name = "mdnative")]
#[command(about = "Render Markdown to a native UI element tree")]
struct Cli {
    /// Input Markdown file
    input: PathBuf,

    /// TOML config with tokenizer, layout and style overrides
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// What to print
    #[arg(short, long, value_enum, default_value_t = Format::Outline)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Indented text view of the render tree
    Outline,
    /// Render tree as JSON
    Json,
    /// Token tree as JSON
    Tokens,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_path(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    // Read input file
    let markdown = match fs::read_to_string(&cli.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading {}: {}", cli.input.display(), e);
            std::process::exit(1);
        }
    };

    let mut view = MarkdownView::new(&config);
    view.set_source(&markdown);

    let output = match cli.format {
        Format::Outline => Ok(view.render().outline()),
        Format::Json => serde_json::to_string_pretty(&view.render()),
        Format::Tokens => serde_json::to_string_pretty(view.tokens()),
    };

    match output {
        Ok(text) => println!("{}", text.trim_end()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
