use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use richtag_core::{
    EditorConfig, OpenTemplate, RenderOptions, Selection, TagRegistry, clear, render_with, toggle,
};

#[derive(Parser)]
#[command(version, about = "richtag - toggle inline markup and render it to HTML", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a JSON editor config with extra tags and render options
    #[arg(long, global = true, env = "RICHTAG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Toggle a tag on a selection
    Toggle {
        /// Tag name (bold, italic, color, size, link, img, ...)
        tag: String,

        /// Tag argument (color value, size, URL)
        #[arg(long)]
        value: Option<String>,

        #[command(flatten)]
        target: Target,
    },
    /// Strip all formatting from a selection, or from everything
    Clear {
        #[command(flatten)]
        target: Target,
    },
    /// Render markup to preview HTML
    Render {
        /// Escape literal text as well as image URLs
        #[arg(long)]
        escape_text: bool,

        /// Input file; stdin when omitted or `-`
        input: Option<PathBuf>,
    },
    /// List the registered tags
    Tags,
}

#[derive(Args)]
struct Target {
    /// Selection start, in characters
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Selection end, in characters (defaults to start: no selection)
    #[arg(long)]
    end: Option<usize>,

    /// Print the resulting text and selection as JSON
    #[arg(long)]
    json: bool,

    /// Input file; stdin when omitted or `-`
    input: Option<PathBuf>,
}

impl Target {
    fn selection(&self) -> Selection {
        Selection::new(self.start, self.end.unwrap_or(self.start))
    }
}

fn main() -> Result<()> {
    init_miette();
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    let input = match &cli.command {
        Commands::Toggle { target, .. } | Commands::Clear { target } => {
            read_input(target.input.as_deref())?
        }
        Commands::Render { input, .. } => read_input(input.as_deref())?,
        Commands::Tags => String::new(),
    };

    let output = run(&cli.command, &config, &input)?;
    print!("{output}");
    Ok(())
}

/// Execute `command` against `input`, returning what should be printed.
fn run(command: &Commands, config: &EditorConfig, input: &str) -> Result<String> {
    let registry = config.registry()?;
    match command {
        Commands::Toggle { tag, value, target } => {
            let edit = toggle(&registry, input, target.selection(), tag, value.as_deref())?;
            tracing::info!(
                start = edit.selection.start,
                end = edit.selection.end,
                "new selection"
            );
            format_edit(&edit, target.json)
        }
        Commands::Clear { target } => {
            let edit = clear(input, target.selection());
            format_edit(&edit, target.json)
        }
        Commands::Render { escape_text, .. } => {
            let options = RenderOptions {
                escape_text: *escape_text || config.render.escape_text,
            };
            Ok(format!("{}\n", render_with(input, &options)))
        }
        Commands::Tags => Ok(list_tags(&registry)),
    }
}

fn format_edit(edit: &richtag_core::Edit, json: bool) -> Result<String> {
    if json {
        let mut out = serde_json::to_string_pretty(edit).into_diagnostic()?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(edit.text.clone())
    }
}

fn list_tags(registry: &TagRegistry) -> String {
    registry
        .definitions()
        .map(|tag| {
            let kind = if tag.is_block { "block" } else { "inline" };
            let open = match &tag.open {
                OpenTemplate::Literal(open) => open.escape_debug().to_string(),
                OpenTemplate::Computed(_) => "(computed)".to_string(),
            };
            let validated = if tag.validator.is_some() { "validated" } else { "" };
            format!(
                "{}\t{kind}\t{open}\t{}\t{validated}\n",
                tag.name,
                tag.close.escape_debug()
            )
        })
        .collect()
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .into_diagnostic()
            .map_err(|err| err.wrap_err(format!("Failed to read {}", path.display()))),
        _ => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .into_diagnostic()?;
            Ok(input)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
