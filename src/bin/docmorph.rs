//! CLI binary for docmorph.
//!
//! A thin shim over the library crate that maps CLI flags to library calls
//! and prints results. All conversion logic lives in the library.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docmorph::{
    convert, encoding, merge_documents, split_document, summarize_document, translate_document,
    write_atomic, Conversion, DocMorphError, HttpBackend, PageRange, RemoteConfig, SourceFile,
    SplitSpec, Translator,
};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI definition ───────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "docmorph",
    version,
    about = "Convert, merge, split, summarize, and translate documents",
    long_about = "Convert documents between text formats (txt, html, csv, json, xml) locally, \
                  or through the remote conversion service for everything else. The same \
                  service handles PDF merge and split. Also produces extractive summaries \
                  and translations of text documents."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert one or more files to a target format
    Convert {
        /// Input file(s)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Target format (txt, html, csv, json, xml locally; pdf, docx, … remotely)
        #[arg(short, long)]
        to: String,

        /// Directory for converted files (defaults to each input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// API key for the remote conversion service
        #[arg(long, env = "DOCMORPH_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// How many files to convert at once
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },

    /// Merge 2–10 PDF files into one
    Merge {
        /// Input PDF files, in merge order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory for the merged file (defaults to the first input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// API key for the remote conversion service
        #[arg(long, env = "DOCMORPH_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Split a PDF file into parts
    Split {
        /// Input PDF file
        input: PathBuf,

        /// Page list, e.g. "1,3,5" or "1-5,7-10"
        #[arg(short, long, conflicts_with = "ranges")]
        pages: Option<String>,

        /// Page ranges, one output per range, e.g. "1-3,4-6"
        #[arg(short, long)]
        ranges: Option<String>,

        /// Directory for the split files (defaults to the input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// API key for the remote conversion service
        #[arg(long, env = "DOCMORPH_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Print an extractive summary of a text document
    Summarize {
        /// Input file
        input: PathBuf,
    },

    /// Translate a text document
    Translate {
        /// Input file
        input: PathBuf,

        /// Target language code (e.g. "de", "it", "fr")
        #[arg(short, long)]
        lang: String,

        /// Contact e-mail forwarded to the translation service (raises the free quota)
        #[arg(long, env = "DOCMORPH_CONTACT_EMAIL")]
        email: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Convert {
            inputs,
            to,
            output_dir,
            api_key,
            concurrency,
        } => run_convert(inputs, &to, output_dir, api_key, concurrency).await,
        Command::Merge {
            inputs,
            output_dir,
            api_key,
        } => run_merge(inputs, output_dir, api_key).await,
        Command::Split {
            input,
            pages,
            ranges,
            output_dir,
            api_key,
        } => run_split(&input, pages, ranges, output_dir, api_key).await,
        Command::Summarize { input } => run_summarize(&input),
        Command::Translate { input, lang, email } => run_translate(&input, &lang, email).await,
    }
}

// ── convert ──────────────────────────────────────────────────────────────────

async fn run_convert(
    inputs: Vec<PathBuf>,
    target: &str,
    output_dir: Option<PathBuf>,
    api_key: Option<String>,
    concurrency: usize,
) -> Result<()> {
    let config = Arc::new(config_with_key(api_key));

    let total = inputs.len();
    let results: Vec<(PathBuf, Result<PathBuf>)> = stream::iter(inputs.into_iter().map(|input| {
        let config = Arc::clone(&config);
        let output_dir = output_dir.clone();
        let target = target.to_string();
        async move {
            let result = convert_one(&input, &target, output_dir.as_deref(), &config).await;
            (input, result)
        }
    }))
    .buffer_unordered(concurrency.max(1))
    .collect()
    .await;

    let mut failed = 0usize;
    for (input, result) in &results {
        match result {
            Ok(path) => println!(
                "{} {} {} {}",
                green("✓"),
                input.display(),
                dim("→"),
                bold(&path.display().to_string())
            ),
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {e:#}", red("✗"), input.display());
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed}/{total} conversions failed");
    }
    Ok(())
}

/// Convert a single file, locally or via the remote service.
async fn convert_one(
    input: &Path,
    target: &str,
    output_dir: Option<&Path>,
    config: &RemoteConfig,
) -> Result<PathBuf> {
    let bytes = std::fs::read(input)
        .with_context(|| format!("failed to read '{}'", input.display()))?;
    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("input")
        .to_string();
    let source_ext = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("txt")
        .to_ascii_lowercase();

    use base64::Engine;
    let payload = base64::engine::general_purpose::STANDARD.encode(&bytes);

    // Local pairs never need credentials; only build the backend when the
    // pair actually routes remotely.
    let result = if docmorph::formats::is_local_pair(&source_ext, target) {
        Conversion::Local(docmorph::convert_local(
            &payload,
            &file_name,
            &source_ext,
            target,
        )?)
    } else {
        let backend = Arc::new(HttpBackend::new(config)?);
        let spinner = job_spinner(&format!("Converting {file_name} → {target} remotely…"));
        let result = convert(&payload, &file_name, &source_ext, target, backend, config).await;
        spinner.finish_and_clear();
        result?
    };

    let out_dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));

    match result {
        Conversion::Local(file) => {
            let text = encoding::decode_payload(&file.content)
                .map_err(|e| anyhow::anyhow!("converted payload unreadable: {e}"))?;
            let path = out_dir.join(&file.filename);
            write_atomic(&path, text.as_bytes()).await?;
            Ok(path)
        }
        Conversion::Remote(file) => {
            let path = out_dir.join(&file.filename);
            let bytes = download(&file.download_url).await?;
            write_atomic(&path, &bytes).await?;
            Ok(path)
        }
    }
}

async fn download(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| DocMorphError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    if !response.status().is_success() {
        return Err(DocMorphError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        }
        .into());
    }
    Ok(response
        .bytes()
        .await
        .map_err(|e| DocMorphError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?
        .to_vec())
}

// ── merge / split ────────────────────────────────────────────────────────────

async fn run_merge(
    inputs: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    api_key: Option<String>,
) -> Result<()> {
    let config = config_with_key(api_key);
    let backend = Arc::new(HttpBackend::new(&config)?);

    let mut files = Vec::with_capacity(inputs.len());
    for input in &inputs {
        files.push(source_file(input)?);
    }

    let spinner = job_spinner(&format!("Merging {} files…", files.len()));
    let merged = merge_documents(files, backend, &config).await;
    spinner.finish_and_clear();
    let merged = merged?;

    let out_dir = resolve_output_dir(output_dir, inputs.first().map(PathBuf::as_path));
    let path = out_dir.join(&merged.filename);
    let bytes = download(&merged.download_url).await?;
    write_atomic(&path, &bytes).await?;

    println!("{} merged {} files {} {}", green("✓"), inputs.len(), dim("→"), bold(&path.display().to_string()));
    Ok(())
}

async fn run_split(
    input: &Path,
    pages: Option<String>,
    ranges: Option<String>,
    output_dir: Option<PathBuf>,
    api_key: Option<String>,
) -> Result<()> {
    let spec = match (pages, ranges) {
        (Some(p), None) => SplitSpec::Pages(p),
        (None, Some(r)) => SplitSpec::Ranges(parse_ranges(&r)?),
        (None, None) => anyhow::bail!("one of --pages or --ranges is required"),
        (Some(_), Some(_)) => unreachable!("clap rejects --pages with --ranges"),
    };

    let config = config_with_key(api_key);
    let backend = Arc::new(HttpBackend::new(&config)?);

    let spinner = job_spinner(&format!("Splitting {}…", input.display()));
    let parts = split_document(source_file(input)?, spec, backend, &config).await;
    spinner.finish_and_clear();
    let parts = parts?;

    let out_dir = resolve_output_dir(output_dir, Some(input));
    for part in &parts {
        let path = out_dir.join(&part.filename);
        let bytes = download(&part.download_url).await?;
        write_atomic(&path, &bytes).await?;
        println!("{} {}", green("✓"), bold(&path.display().to_string()));
    }
    Ok(())
}

/// Parse `"1-3,4-6"` (a bare `"5"` means the single page 5) into ranges.
fn parse_ranges(s: &str) -> Result<Vec<PageRange>> {
    s.split(',')
        .map(|piece| {
            let piece = piece.trim();
            let (start, end) = match piece.split_once('-') {
                Some((a, b)) => (a.parse()?, b.parse()?),
                None => {
                    let page = piece.parse()?;
                    (page, page)
                }
            };
            Ok(PageRange { start, end })
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid page ranges '{s}' (expected e.g. '1-3,4-6')"))
}

fn source_file(input: &Path) -> Result<SourceFile> {
    Ok(SourceFile {
        payload: read_as_payload(input)?,
        file_name: input
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("input")
            .to_string(),
    })
}

fn config_with_key(api_key: Option<String>) -> RemoteConfig {
    let mut config = RemoteConfig::from_env();
    if api_key.is_some() {
        config.api_key = api_key;
    }
    config
}

fn resolve_output_dir(output_dir: Option<PathBuf>, input: Option<&Path>) -> PathBuf {
    output_dir
        .or_else(|| input.and_then(Path::parent).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn job_spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

// ── summarize ────────────────────────────────────────────────────────────────

fn run_summarize(input: &Path) -> Result<()> {
    let payload = read_as_payload(input)?;
    let summary = summarize_document(&payload)
        .with_context(|| format!("could not summarize '{}'", input.display()))?;
    println!("{summary}");
    Ok(())
}

// ── translate ────────────────────────────────────────────────────────────────

async fn run_translate(input: &Path, lang: &str, email: Option<String>) -> Result<()> {
    let mut config = RemoteConfig::from_env();
    if email.is_some() {
        config.contact_email = email;
    }

    let payload = read_as_payload(input)?;
    let translator = Translator::new(&config)?;
    let translation = translate_document(&payload, lang, &translator)
        .await
        .with_context(|| format!("could not translate '{}'", input.display()))?;

    if let Some(warning) = &translation.degraded {
        eprintln!("{} {}", red("!"), warning);
    }
    println!("{}", translation.text);
    Ok(())
}

// ── shared ───────────────────────────────────────────────────────────────────

fn read_as_payload(input: &Path) -> Result<String> {
    let bytes = std::fs::read(input)
        .with_context(|| format!("failed to read '{}'", input.display()))?;
    use base64::Engine;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}
