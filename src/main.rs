use clap::{Args, Parser, Subcommand};
use quire::{
    ColumnPreference, HttpExtractor, JsonFileSource, PipelineBuilder, PipelineError,
};
use std::fs;
use std::path::{Path, PathBuf};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Paginate extracted web articles into print-ready HTML pages.
#[derive(Parser)]
#[command(name = "quire", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lay an article out and write the pages.
    Layout(LayoutArgs),
}

#[derive(Args)]
struct LayoutArgs {
    /// Article JSON file.
    #[arg(required_unless_present_any = ["url", "document"], conflicts_with_all = ["url", "document"])]
    input: Option<PathBuf>,

    /// Web page to extract through the extraction service.
    #[arg(long, conflicts_with = "document")]
    url: Option<String>,

    /// PDF or DOCX file to upload to the extraction service.
    #[arg(long)]
    document: Option<PathBuf>,

    /// Base URL of the extraction service.
    #[arg(long, default_value = "http://localhost:3000")]
    extractor: String,

    /// Layout config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Theme JSON.
    #[arg(long)]
    theme: Option<PathBuf>,

    #[arg(long)]
    force_two_columns: bool,

    /// Per-section column override, e.g. `--column intro=one`.
    #[arg(long = "column", value_parser = parse_column)]
    columns: Vec<(String, ColumnPreference)>,

    /// Where to write the materialized HTML.
    #[arg(long, default_value = "article.html")]
    html: PathBuf,

    /// Also write the virtual pages as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
}

fn parse_column(value: &str) -> Result<(String, ColumnPreference), String> {
    let (id, pref) = value
        .split_once('=')
        .ok_or_else(|| format!("expected SECTION=one|two|auto, got '{}'", value))?;
    let pref = match pref.to_ascii_lowercase().as_str() {
        "one" | "1" => ColumnPreference::One,
        "two" | "2" => ColumnPreference::Two,
        "auto" => ColumnPreference::Auto,
        other => return Err(format!("unknown column preference '{}'", other)),
    };
    Ok((id.to_string(), pref))
}

fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Command::Layout(args) = Cli::parse().command;

    let mut builder = PipelineBuilder::new();
    if let Some(path) = &args.config {
        builder = builder.with_config_file(path)?;
    }
    if let Some(path) = &args.theme {
        builder = builder.with_theme_file(path)?;
    }
    if args.force_two_columns {
        builder = builder.with_force_two_columns(true);
    }
    for (id, pref) in args.columns {
        builder = builder.with_column_preference(id, pref);
    }
    let pipeline = builder.build()?;

    let (article, laid_out) = if let Some(url) = &args.url {
        let extractor = HttpExtractor::new(args.extractor.as_str())?;
        pipeline.layout_from(&extractor, url).await?
    } else if let Some(path) = &args.document {
        let extractor = HttpExtractor::new(args.extractor.as_str())?;
        let bytes = fs::read(path)?;
        let article = extractor
            .extract_document(bytes, &document_name(path))
            .await?;
        let laid_out = pipeline.layout(&article).await?;
        (article, laid_out)
    } else if let Some(path) = &args.input {
        pipeline
            .layout_from(&JsonFileSource::new(), &path.to_string_lossy())
            .await?
    } else {
        return Err(PipelineError::Config(
            "an input file, --url or --document is required".to_string(),
        ));
    };

    pipeline.write_html(&article, &laid_out, &args.html)?;
    if let Some(path) = &args.json {
        pipeline.write_json(&laid_out, path)?;
    }

    let diagnostics = &laid_out.diagnostics;
    println!(
        "'{}': {} page(s), {} split(s), {} shrunk, {} forced",
        article.title,
        laid_out.page_count(),
        diagnostics.splits,
        diagnostics.shrunk.len(),
        diagnostics.forced.len()
    );
    for gap in &diagnostics.excessive_gaps {
        println!("  page {} ends with {:.0}px of whitespace", gap.page_number, gap.spare);
    }
    Ok(())
}
