use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use notewright_common::library::relative_age;
use notewright_common::upload::MAX_TOTAL_PAGES;
use notewright_common::{ApiClient, ApiConfig, DocumentId, IncomingFile, UploadBatch};
use notewright_renderer::{
    EnhanceReport, ExportOptions, MathDelivery, MathOutcome, enhance_html, export_document,
};

#[derive(Parser)]
#[command(version, about = "Notewright - list, generate and export study notes", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Base URL of the notes service
    #[arg(long, global = true, env = "NOTEWRIGHT_API_URL")]
    api: Option<String>,

    /// Log request and enhancement details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List generated documents, newest first
    List,
    /// Print a document's metadata and what the enhancement pass finds in it
    Show { id: String },
    /// Request a new document
    Generate {
        #[arg(long)]
        prompt: String,

        /// Image or PDF to send along (repeatable, 10 pages total)
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    /// Write a document as a standalone HTML file
    Export {
        id: String,

        /// Output path (defaults to concept-<date>.html in the current directory)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Typeset math now instead of loading KaTeX when the file is opened
        #[arg(long)]
        prerender_math: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match cli.api.as_deref() {
        Some(url) => ApiConfig::new(url)?,
        None => ApiConfig::from_env()?,
    };
    tracing::debug!(base = %config.base_url, "using notes service");
    let client = ApiClient::new(config);

    match cli.command {
        Commands::List => list(&client).await?,
        Commands::Show { id } => show(&client, DocumentId::new(id)).await?,
        Commands::Generate { prompt, files } => generate(&client, &prompt, &files).await?,
        Commands::Export {
            id,
            out,
            prerender_math,
        } => export(&client, DocumentId::new(id), out, prerender_math).await?,
    }

    Ok(())
}

async fn list(client: &ApiClient) -> Result<()> {
    let documents = client.list_documents().await?;
    if documents.is_empty() {
        println!("No articles yet. Create your first concept to get started!");
        return Ok(());
    }

    let now = Utc::now();
    let id_width = documents
        .iter()
        .map(|doc| doc.id.as_str().len())
        .max()
        .unwrap_or(0);
    for doc in &documents {
        let age = doc
            .created_at()
            .map(|created| relative_age(created, now))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<id_width$}  {:<16}  {}",
            doc.id.as_str(),
            age,
            doc.display_title()
        );
    }
    Ok(())
}

async fn show(client: &ApiClient, id: DocumentId) -> Result<()> {
    let doc = client.get_document(&id).await?;
    println!("id:       {}", doc.id);
    println!("title:    {}", doc.display_title());
    if !doc.subtitle.is_empty() {
        println!("subtitle: {}", doc.subtitle);
    }
    if !doc.subject.is_empty() {
        println!("subject:  {}", doc.subject);
    }
    if let Some(created) = doc.created_at() {
        println!(
            "created:  {} ({})",
            created.format("%Y-%m-%d %H:%M"),
            relative_age(created, Utc::now())
        );
    }

    let (_, report) = enhance_html(&doc.content).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &EnhanceReport) {
    println!("players:  {} mounted, {} failed", report.players_mounted, report.players_failed);
    match &report.math {
        MathOutcome::Rendered(stats) => {
            println!("math:     {} typeset, {} left as text", stats.rendered, stats.failed)
        }
        MathOutcome::Scanned => println!("math:     scanned"),
        MathOutcome::Unavailable(err) => println!("math:     unavailable ({err})"),
        MathOutcome::Failed(message) => println!("math:     failed ({message})"),
    }
    println!("images:   {} with download buttons", report.images_wrapped);
}

async fn generate(client: &ApiClient, prompt: &str, files: &[PathBuf]) -> Result<()> {
    let mut incoming = Vec::with_capacity(files.len());
    for path in files {
        let bytes = tokio::fs::read(path).await.into_diagnostic()?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        incoming.push(IncomingFile::new(name, mime_from_extension(path), bytes));
    }

    let mut batch = UploadBatch::new();
    let outcome = batch.add_files(incoming);
    if let Some(err) = outcome.error {
        return Err(err.into());
    }
    for entry in batch.entries() {
        tracing::debug!(name = %entry.name, mime = %entry.mime, pages = entry.page_count, "attaching");
    }
    if !batch.is_empty() {
        println!(
            "→ Uploading {} file(s), {}/{} pages",
            batch.len(),
            batch.total_pages(),
            MAX_TOTAL_PAGES
        );
    }

    println!("→ Generating notes...");
    let started = std::time::Instant::now();
    let created = client.generate(prompt, batch.entries()).await?;
    println!("✓ Generated in {:.1}s", started.elapsed().as_secs_f64());
    println!("✓ Document id: {}", created.id);
    Ok(())
}

/// Declared type for a local file. Unknown extensions are left to sniffing.
fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        _ => "",
    }
}

async fn export(
    client: &ApiClient,
    id: DocumentId,
    out: Option<PathBuf>,
    prerender_math: bool,
) -> Result<()> {
    let doc = client.get_document(&id).await?;
    let options = ExportOptions {
        math: if prerender_math {
            MathDelivery::Prerendered
        } else {
            MathDelivery::Cdn
        },
        ..Default::default()
    };
    let exported = export_document(&doc, &options, Utc::now())?;
    let path = out.unwrap_or_else(|| PathBuf::from(&exported.file_name));
    tokio::fs::write(&path, exported.contents.as_bytes())
        .await
        .into_diagnostic()?;
    tracing::info!(path = %path.display(), bytes = exported.contents.len(), "export written");
    println!("✓ Output: {}", path.display());
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn init_miette() {
    let installed = miette::set_hook(Box::new(|_| {
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
    }));
    if let Err(err) = installed {
        eprintln!("couldn't set the miette hook: {err}");
    }
    miette::set_panic_hook();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_mime_is_case_insensitive() {
        assert_eq!(mime_from_extension(Path::new("notes/Scan.PDF")), "application/pdf");
        assert_eq!(mime_from_extension(Path::new("diagram.jpeg")), "image/jpeg");
        assert_eq!(mime_from_extension(Path::new("README")), "");
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "notewright",
            "export",
            "42",
            "--prerender-math",
            "--api",
            "http://example.test/api",
            "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.api.as_deref(), Some("http://example.test/api"));
        match cli.command {
            Commands::Export {
                id, prerender_math, ..
            } => {
                assert_eq!(id, "42");
                assert!(prerender_math);
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn generate_collects_repeated_files() {
        let cli = Cli::try_parse_from([
            "notewright",
            "generate",
            "--prompt",
            "Explain entropy",
            "--file",
            "a.pdf",
            "--file",
            "b.png",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate { prompt, files } => {
                assert_eq!(prompt, "Explain entropy");
                assert_eq!(files, vec![PathBuf::from("a.pdf"), PathBuf::from("b.png")]);
            }
            _ => panic!("expected generate"),
        }
    }
}
