use clap::{Args, Parser, Subcommand};
use linkcards::cards::{self, CardInput};
use linkcards::clipboard::{self, ClipboardError, CopyMethod};
use linkcards::config::{self, AppConfig, Theme};
use linkcards::session::{self, Notice};
use linkcards::store::{GenerationStore, RestStore};
use linkcards::output;
use linkcards::types::SourceKind;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "linkcards")]
#[command(version, about = "Turn video and image links into HTML cards")]
#[command(long_about = "\
Turn video and image links into HTML cards

Inputs are four plain-text lists, one entry per line, aligned by line:

  videos.txt        https://youtu.be/XYZ789
  images.txt        (optional; YouTube thumbnails are derived from the video)
  titles.txt        Intro
  descriptions.txt  Start here

YouTube links become embed URLs, Google Drive links become preview and
thumbnail URLs, direct links pass through unchanged. Every generation is
saved to the store configured by LINKCARDS_STORE_URL and LINKCARDS_STORE_KEY.

Run 'linkcards gen-config' to print a documented linkcards.toml.")]
struct Cli {
    /// Config file
    #[arg(long, default_value = "linkcards.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate cards from link lists and auto-save the generation
    Generate(GenerateArgs),
    /// List recent generations
    History {
        /// Number of generations to show
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Search generations by title or description
    Search {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Load a stored generation
    Load {
        id: String,
        /// Write the inputs and stored HTML into this directory
        #[arg(long)]
        into: Option<PathBuf>,
        /// Also write a preview page
        #[arg(long)]
        preview: Option<PathBuf>,
        #[arg(long, value_enum)]
        theme: Option<Theme>,
    },
    /// Delete a stored generation
    Delete { id: String },
    /// Copy an HTML file to the clipboard
    Copy { file: PathBuf },
    /// Wrap a cards HTML file in a standalone preview page
    Preview {
        file: PathBuf,
        #[arg(long, short)]
        output: PathBuf,
        #[arg(long, value_enum)]
        theme: Option<Theme>,
    },
    /// Print a stock linkcards.toml with all options documented
    GenConfig,
}

#[derive(Args)]
struct GenerateArgs {
    /// Directory holding videos.txt, images.txt, titles.txt, descriptions.txt
    #[arg(long)]
    input: Option<PathBuf>,
    /// Video links, one per line (overrides --input)
    #[arg(long)]
    videos: Option<PathBuf>,
    /// Image links, one per line
    #[arg(long)]
    images: Option<PathBuf>,
    /// Titles, one per line
    #[arg(long)]
    titles: Option<PathBuf>,
    /// Descriptions, one per line
    #[arg(long)]
    descriptions: Option<PathBuf>,
    #[arg(long, value_enum)]
    video_type: Option<SourceKind>,
    #[arg(long, value_enum)]
    image_type: Option<SourceKind>,
    /// Write the cards HTML here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Write a standalone preview page
    #[arg(long)]
    preview: Option<PathBuf>,
    #[arg(long, value_enum)]
    theme: Option<Theme>,
    /// Do not save the generation to the store
    #[arg(long)]
    no_save: bool,
    /// Copy the cards HTML to the clipboard
    #[arg(long)]
    copy: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Local .env for development; real deployments export the variables.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            output::print_notice(&Notice::error(e.to_string()));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.config)?;

    match cli.command {
        Command::Generate(args) => generate(&config, args).await?,
        Command::History { limit } => {
            let store = RestStore::new(&config.store)?;
            let records = session::history(&store, limit.unwrap_or(config.history.limit)).await?;
            output::print_history(&records);
        }
        Command::Search { query, limit } => {
            let store = RestStore::new(&config.store)?;
            let records =
                session::search(&store, &query, limit.unwrap_or(config.history.limit)).await?;
            output::print_search_results(&records);
        }
        Command::Load {
            id,
            into,
            preview,
            theme,
        } => {
            let store = RestStore::new(&config.store)?;
            let loaded = session::load(&store, &id).await?;
            if let Some(dir) = &into {
                loaded.write_to(dir)?;
            } else {
                println!("{}", loaded.html());
            }
            if let Some(path) = &preview {
                write_preview(path, loaded.html(), theme.unwrap_or(config.preview.theme))?;
            }
            output::print_notice(&Notice::success("Generation loaded successfully!"));
        }
        Command::Delete { id } => {
            let store = RestStore::new(&config.store)?;
            store.delete(id.trim()).await?;
            output::print_notice(&Notice::success(format!("Generation {} deleted", id.trim())));
        }
        Command::Copy { file } => {
            let html = std::fs::read_to_string(&file)?;
            output::print_notice(&copy_notice(&html));
        }
        Command::Preview {
            file,
            output: out,
            theme,
        } => {
            let html = std::fs::read_to_string(&file)?;
            write_preview(&out, html.trim(), theme.unwrap_or(config.preview.theme))?;
            output::print_notice(&Notice::success(format!("Preview written to {}", out.display())));
        }
        Command::GenConfig => unreachable!("handled before config loading"),
    }

    Ok(())
}

async fn generate(config: &AppConfig, args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let defaults = &config.generator;
    let mut input = match &args.input {
        Some(dir) => session::read_input_dir(dir, defaults.video_type, defaults.image_type)?,
        None => CardInput {
            video_type: defaults.video_type,
            image_type: defaults.image_type,
            ..CardInput::default()
        },
    };
    for (path, field) in [
        (&args.videos, &mut input.video_links),
        (&args.images, &mut input.image_links),
        (&args.titles, &mut input.titles),
        (&args.descriptions, &mut input.descriptions),
    ] {
        if let Some(path) = path {
            *field = std::fs::read_to_string(path)?;
        }
    }
    if let Some(kind) = args.video_type {
        input.video_type = kind;
    }
    if let Some(kind) = args.image_type {
        input.image_type = kind;
    }

    let generation = cards::generate(&input, defaults)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<Notice>();
    let printer = tokio::spawn(async move {
        while let Some(notice) = rx.recv().await {
            output::print_notice(&notice);
        }
    });

    let pending = if args.no_save {
        None
    } else {
        match RestStore::new(&config.store) {
            Ok(store) => {
                let store: Arc<dyn GenerationStore> = Arc::new(store);
                Some(session::dispatch_save(store, generation.record.clone(), tx.clone()))
            }
            Err(e) => {
                let _ = tx.send(Notice::error(format!("Failed to save generation: {e}")));
                None
            }
        }
    };

    match &args.output {
        Some(path) => std::fs::write(path, format!("{}\n", generation.html))?,
        None => println!("{}", generation.html),
    }
    if let Some(path) = &args.preview {
        write_preview(path, &generation.html, args.theme.unwrap_or(config.preview.theme))?;
    }
    output::print_cards(&generation.cards);
    let _ = tx.send(Notice::success("HTML cards generated successfully!"));

    if args.copy {
        let _ = tx.send(copy_notice(&generation.html));
    }

    if let Some(pending) = pending {
        pending.finish().await;
    }
    drop(tx);
    printer.await?;
    Ok(())
}

fn copy_notice(html: &str) -> Notice {
    match clipboard::copy_html(html) {
        Ok(CopyMethod::System) => Notice::success("HTML code copied to clipboard!"),
        Ok(CopyMethod::Terminal) => Notice::success("HTML code sent to the terminal clipboard"),
        Err(ClipboardError::Empty) => Notice::info("Nothing to copy"),
        Err(e) => {
            tracing::error!(error = %e, "copy failed");
            Notice::error(e.to_string())
        }
    }
}

fn write_preview(path: &Path, cards_html: &str, theme: Theme) -> std::io::Result<()> {
    let page = cards::render_preview(cards_html, theme, "Card preview");
    std::fs::write(path, page.into_string())
}
