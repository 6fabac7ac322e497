use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info};

use answer::{Config, CopyController, CopyState, Error, SystemClipboard};

/// Read from the working directory when no `--config` is given.
const DEFAULT_CONFIG_FILE: &str = "answer.toml";

#[derive(Parser)]
#[command(name = "answer")]
#[command(about = "Render a Markdown answer to HTML")]
struct Cli {
    /// Input Markdown file, or `-` for stdin
    input: PathBuf,

    /// Output HTML file (defaults to input name with .html extension, or stdout for stdin)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (defaults to ./answer.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write only the answer card instead of a full page
    #[arg(long)]
    fragment: bool,

    /// Copy the N-th code block (1-based) to the clipboard before rendering
    #[arg(long, value_name = "N")]
    copy: Option<usize>,

    /// Log debug details to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    answer::logging::init(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::try_load(path)?,
        None => Config::load(Path::new(DEFAULT_CONFIG_FILE)),
    };
    if cli.fragment {
        config.document.standalone = false;
    }

    let from_stdin = cli.input.as_os_str() == "-";
    let markdown = read_input(&cli.input, from_stdin)?;

    let state = match cli.copy {
        Some(index) => copy_code_block(&markdown, index, &config).await?,
        None => CopyState::default(),
    };

    let html = answer::render_page(&markdown, &config, &state);

    // Determine output path
    let output = cli
        .output
        .or_else(|| (!from_stdin).then(|| cli.input.with_extension("html")));

    match output {
        Some(path) => {
            fs::write(&path, html).map_err(|source| Error::Write {
                path: path.clone(),
                source,
            })?;
            println!("Created {}", path.display());
        }
        None => io::stdout().write_all(html.as_bytes())?,
    }

    Ok(())
}

fn read_input(path: &Path, from_stdin: bool) -> Result<String, Error> {
    let markdown = if from_stdin {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map(|_| buf)
    } else {
        fs::read_to_string(path)
    }
    .map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(bytes = markdown.len(), "read answer");
    Ok(markdown)
}

/// Copy one code block through the controller and return the state it
/// leaves behind. The controller is dropped on return, cancelling its reset.
async fn copy_code_block(markdown: &str, index: usize, config: &Config) -> Result<CopyState, Error> {
    let snippets = answer::code_blocks(markdown);
    let snippet = index
        .checked_sub(1)
        .and_then(|i| snippets.get(i))
        .ok_or(Error::NoSuchCodeBlock {
            index,
            available: snippets.len(),
        })?;

    let controller =
        CopyController::with_reset_after(Arc::new(SystemClipboard), config.copy.reset_after());
    if controller.copy(&snippet.code).await {
        info!(index, language = snippet.language.as_deref().unwrap_or("text"), "copied code block");
    }
    Ok(controller.state())
}
