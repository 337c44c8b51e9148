use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use doc_archive_config::{Config, LoadOptions};
use doc_archive_core::{
    convert, escape_markup, ArchiveBrowser, ArchiveStats, DirectoryScanner, DocumentRecord,
    FileType, PageButton, PaginationControls, QueryState, Repository, TypeSet,
};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "DOC_ARCHIVE_LOG";
const LOAD_FAILURE: &str = "Failed to load content.";

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging();

    let mut options = LoadOptions::default();
    if let Some(path) = &cli.config {
        options = options.with_override_path(path);
    }
    let config = Config::load(options).context("failed to load configuration")?;
    let data_path = cli
        .data
        .clone()
        .unwrap_or_else(|| config.repository.path.clone());

    match cli.command {
        Command::List(args) => handle_list(&config, &data_path, args),
        Command::Render(args) => handle_render(args),
        Command::Show(args) => handle_show(&config, &data_path, args),
        Command::Stats(args) => handle_stats(&data_path, args),
        Command::Scan(args) => handle_scan(&config, args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn load_repository(path: &Path) -> Result<Repository> {
    Repository::load(path)
        .with_context(|| format!("unable to load document table {}", path.display()))
}

fn handle_list(config: &Config, data_path: &Path, args: ListArgs) -> Result<i32> {
    let ListArgs {
        search,
        types,
        page,
        page_size,
        format,
    } = args;

    let repository = load_repository(data_path)?;
    let mut browser =
        ArchiveBrowser::with_state(&repository, QueryState::from_settings(&config.browse));

    if let Some(size) = page_size {
        if !config.browse.page_size_options.contains(&size) {
            tracing::warn!(
                page_size = size,
                options = ?config.browse.page_size_options,
                "page size is not one of the configured options"
            );
        }
        browser.set_page_size(size);
    }
    if !types.is_empty() {
        browser.set_enabled_types(types.into_iter().collect::<TypeSet>());
    }
    if let Some(term) = search {
        browser.set_search_term(term);
    }
    if let Some(page) = page {
        if page != browser.state().current_page && !browser.go_to_page(page) {
            tracing::warn!(
                page,
                page_count = browser.page_count(),
                "requested page is out of range"
            );
        }
    }

    let rendered = match format.unwrap_or(ListFormatValue::Plain) {
        ListFormatValue::Plain => render_list_plain(&browser),
        ListFormatValue::Json => serde_json::to_string_pretty(&list_payload(&browser))?,
    };
    emit(&rendered)?;
    Ok(0)
}

fn render_list_plain(browser: &ArchiveBrowser<'_>) -> String {
    let view = browser.page();
    if view.items.is_empty() {
        return "No documents found.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "Showing {} of {} documents (page {} of {})\n",
        view.items.len(),
        browser.results().len(),
        view.current_page,
        view.page_count
    ));
    for record in view.items {
        output.push_str(&format!(
            "{:<24} {:<6} {:<16} {}\n",
            record.id,
            record.file_type.as_str(),
            record.category,
            record.title
        ));
    }
    if let Some(controls) = browser.controls() {
        output.push_str(&controls_line(&controls));
    }
    output
}

fn controls_line(controls: &PaginationControls) -> String {
    let mut parts = Vec::with_capacity(controls.buttons.len() + 2);
    parts.push(if controls.previous.is_some() { "<" } else { " " }.to_string());
    for button in &controls.buttons {
        parts.push(match button {
            PageButton::Page {
                number,
                current: true,
            } => format!("[{number}]"),
            PageButton::Page { number, .. } => number.to_string(),
            PageButton::Ellipsis => "...".to_string(),
        });
    }
    parts.push(if controls.next.is_some() { ">" } else { " " }.to_string());
    parts.join(" ").trim_end().to_string()
}

fn list_payload(browser: &ArchiveBrowser<'_>) -> Value {
    let view = browser.page();
    let state = browser.state();
    json!({
        "query": {
            "searchTerm": state.search_term,
            "enabledTypes": state.enabled_types.iter().collect::<Vec<_>>(),
            "pageSize": state.page_size,
        },
        "total": browser.results().len(),
        "page": view.current_page,
        "pageCount": view.page_count,
        "items": view
            .items
            .iter()
            .map(|record| item_payload(browser, record))
            .collect::<Vec<_>>(),
        "pagination": browser.controls().map(|controls| controls_payload(&controls)),
    })
}

fn item_payload(browser: &ArchiveBrowser<'_>, record: &DocumentRecord) -> Value {
    json!({
        "id": record.id,
        "title": record.title,
        "description": record.description,
        "category": record.category,
        "fileType": record.file_type,
        "titleHtml": browser.highlight(&escape_markup(&record.title)),
        "descriptionHtml": browser.highlight(&escape_markup(&record.description)),
    })
}

fn controls_payload(controls: &PaginationControls) -> Value {
    json!({
        "previous": controls.previous,
        "next": controls.next,
        "buttons": controls
            .buttons
            .iter()
            .map(|button| match button {
                PageButton::Page { number, current } => {
                    json!({ "page": number, "current": current })
                }
                PageButton::Ellipsis => json!({ "ellipsis": true }),
            })
            .collect::<Vec<_>>(),
    })
}

fn handle_render(args: RenderArgs) -> Result<i32> {
    let source = read_source(&args.file)?;
    emit(&convert(&source))?;
    Ok(0)
}

fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .lock()
            .read_to_string(&mut buffer)
            .context("failed to read markdown from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

fn handle_show(config: &Config, data_path: &Path, args: ShowArgs) -> Result<i32> {
    let repository = load_repository(data_path)?;
    let Some(record) = repository.get(&args.id) else {
        eprintln!("document '{}' not found", args.id);
        return Ok(2);
    };

    let mut output = String::new();
    output.push_str(&format!("{}\n", record.title));
    output.push_str(&format!("Category: {}\n", record.category));
    output.push_str(&format!("Type: {}\n", record.file_type.label()));
    if let Some(date) = &record.date {
        output.push_str(&format!("Date: {date}\n"));
    }
    if let Some(size) = &record.size {
        output.push_str(&format!("Size: {size}\n"));
    }
    if let Some(url) = &record.file_url {
        output.push_str(&format!("File: {url}\n"));
    }
    output.push('\n');

    let base = &config.sources.working_directory;
    match read_summary(base, record) {
        Ok(markdown) => output.push_str(&convert(&markdown)),
        Err(err) => {
            tracing::warn!(id = %record.id, error = %format!("{err:#}"), "summary unavailable");
            output.push_str(LOAD_FAILURE);
        }
    }

    emit(&output)?;
    Ok(0)
}

fn read_summary(base: &Path, record: &DocumentRecord) -> Result<String> {
    let url = record
        .markdown_url
        .as_deref()
        .context("record has no markdown summary")?;
    let path = base.join(url.trim_start_matches("./"));
    fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
}

fn handle_stats(data_path: &Path, args: StatsArgs) -> Result<i32> {
    let repository = load_repository(data_path)?;
    let stats = ArchiveStats::collect(&repository);
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let rendered = match args.format.unwrap_or(StatsFormatValue::Plain) {
        StatsFormatValue::Plain => format!(
            "Total files: {}\nCategories: {}\nTotal size: {} GB\nLast update: {}",
            stats.total_files,
            stats.categories,
            stats.total_gb_text(),
            stats.last_update_text(today)
        ),
        StatsFormatValue::Json => {
            let payload = json!({
                "stats": stats,
                "totalGB": stats.total_gb_text(),
                "lastUpdateText": stats.last_update_text(today),
            });
            serde_json::to_string_pretty(&payload)?
        }
    };
    emit(&rendered)?;
    Ok(0)
}

fn handle_scan(config: &Config, args: ScanArgs) -> Result<i32> {
    let working_dir = &config.sources.working_directory;
    let (dir, url_base) = match args.dir {
        Some(dir) => (dir, None),
        None => {
            let dir = config.scan.docs_dir.clone();
            let url_base = dir
                .strip_prefix(working_dir)
                .ok()
                .map(|relative| format!("./{}", relative.to_string_lossy().replace('\\', "/")));
            (dir, url_base)
        }
    };

    let mut scanner = DirectoryScanner::new(&config.scan);
    if let Some(base) = url_base {
        scanner = scanner.with_url_base(base);
    }
    let repository = scanner
        .scan(&dir)
        .with_context(|| format!("failed to scan {}", dir.display()))?;
    let json = serde_json::to_string_pretty(&repository.to_json_value()?)?;

    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(&path, format!("{json}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            emit(&format!(
                "Wrote {} documents to {}",
                repository.len(),
                path.display()
            ))?;
        }
        None => emit(&json)?,
    }
    Ok(0)
}

fn emit(content: &str) -> Result<()> {
    match write_stdout(content) {
        Ok(()) => Ok(()),
        Err(err) if should_ignore_pipe_error(&err) => Ok(()),
        Err(err) => Err(err).context("failed to write to stdout"),
    }
}

fn write_stdout(content: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        handle.write_all(b"\n")?;
    }
    handle.flush()
}

fn should_ignore_pipe_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::WouldBlock
    )
}

#[derive(Parser)]
#[command(
    name = "doc-archive",
    author,
    version,
    about = "Browse, search and render a document archive",
    propagate_version = true
)]
struct Cli {
    /// Use this config file instead of discovering `.doc-archive.toml`
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Document table to read (overrides `repository.path`)
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Filter, search and page through the archive
    List(ListArgs),
    /// Convert a Markdown file (or `-` for stdin) to markup
    Render(RenderArgs),
    /// Print a document and its rendered summary
    Show(ShowArgs),
    /// Print archive statistics
    Stats(StatsArgs),
    /// Build a document table from a directory of summaries
    Scan(ScanArgs),
}

#[derive(Args)]
struct ListArgs {
    /// Case-insensitive search over title, description and category
    #[arg(long, short = 's')]
    search: Option<String>,
    /// Restrict to file types (doc, img, video, audio); repeatable
    #[arg(long = "type", value_name = "TYPE", action = ArgAction::Append)]
    types: Vec<FileType>,
    /// Page to show (1-based)
    #[arg(long, value_parser = clap::value_parser!(usize))]
    page: Option<usize>,
    /// Documents per page
    #[arg(long = "page-size", value_parser = parse_positive)]
    page_size: Option<usize>,
    /// Output format
    #[arg(long, value_enum)]
    format: Option<ListFormatValue>,
}

#[derive(Args)]
struct RenderArgs {
    /// Markdown file, or `-` for stdin
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

#[derive(Args)]
struct ShowArgs {
    /// Document id
    #[arg(value_name = "ID")]
    id: String,
}

#[derive(Args)]
struct StatsArgs {
    /// Reference date for the "last update" text (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    today: Option<NaiveDate>,
    /// Output format
    #[arg(long, value_enum)]
    format: Option<StatsFormatValue>,
}

#[derive(Args)]
struct ScanArgs {
    /// Directory to scan (defaults to `scan.docs_dir`)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,
    /// Write the table to this file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ListFormatValue {
    Plain,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatsFormatValue {
    Plain,
    Json,
}

fn parse_positive(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(parsed) => Ok(parsed),
        Err(err) => Err(err.to_string()),
    }
}
