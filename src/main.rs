//! Main entry point for the h3x CLI application.
//!
//! `convert` splits a file into hex parts, `parse` rebuilds it and `scan`
//! reports what the metadata and header parts contain.

use anyhow::{Context, Result};
use clap::Parser;
use std::fmt::Write;
use std::path::Path;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use h3x::cli::{Cli, Command};
use h3x::format::MetaValue;
use h3x::manifest::{Manifest, ManifestEntry};
use h3x::scan::ScanReport;
use h3x::{Classification, Classifier, DirStore, Integrity, io, pipeline};

/// Application entry point.
///
/// Installs logging on stderr and dispatches to the subcommand handler.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Command::Convert { file, output_dir } => convert(file, output_dir, &cli).await,
        Command::Parse { directory } => parse(directory, &cli).await,
        Command::Scan { directory } => scan(directory, &cli).await,
    }
}

/// Split `file` into parts under `output_dir`.
async fn convert(file: &Path, output_dir: &Path, cli: &Cli) -> Result<()> {
    let bytes = io::read_source(file).await?;
    let source_id = file.display().to_string();
    let store = DirStore::new(output_dir);

    let conversion = pipeline::convert(&Classifier::new(), &bytes, &source_id, &store).await?;

    if !cli.quiet {
        print_analysis(&conversion.classification)?;
        println!();
        print_parts(&conversion.manifest.parts);
        println!(
            "\n{} parts ({}) written to {}",
            conversion.manifest.parts.len(),
            format_size(conversion.manifest.total_size),
            store.root().display()
        );
    }

    Ok(())
}

/// Rebuild the original file stored in `directory`.
///
/// The result is written next to the parts as `output_restored<ext>`.
async fn parse(directory: &Path, cli: &Cli) -> Result<()> {
    let store = DirStore::new(directory);
    let source_id = directory.display().to_string();
    let restoration = pipeline::restore(&Classifier::new(), &store, &source_id).await?;

    let output_path = directory.join(format!(
        "output_restored{}",
        restoration.classification.extension
    ));
    if restoration.classification.file_type != restoration.manifest.file_type {
        warn!(
            restored = %restoration.classification.file_type,
            recorded = %restoration.manifest.file_type,
            "restored file classifies differently from the manifest"
        );
    }

    tokio::fs::write(&output_path, &restoration.bytes)
        .await
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if !cli.quiet {
        println!(
            "Restored {} ({}) from {} parts",
            restoration.manifest.original_file,
            format_size(restoration.bytes.len() as u64),
            restoration.manifest.parts.len()
        );
        println!("Output saved to: {}", output_path.display());
        if let Integrity::SizeMismatch { expected, actual } = restoration.integrity {
            println!("Integrity: size mismatch (expected {expected}, got {actual})");
        }
        println!();
        print_analysis(&restoration.classification)?;
    }

    Ok(())
}

/// Print the per-part summary and hidden-data findings for `directory`.
async fn scan(directory: &Path, cli: &Cli) -> Result<()> {
    let store = DirStore::new(directory);
    let (manifest, reports) = pipeline::scan(&store).await?;
    print!("{}", render_scan(&manifest, &reports, cli.quiet)?);
    Ok(())
}

/// Render a scan report.
///
/// Quiet mode drops the banner and the per-part summary, leaving only the
/// findings of parts that have any.
fn render_scan(
    manifest: &Manifest,
    reports: &[(ManifestEntry, ScanReport)],
    quiet: bool,
) -> Result<String> {
    let mut out = String::new();

    if !quiet {
        writeln!(
            out,
            "=== Hidden Data Analysis: {} ({}) ===",
            manifest.original_file, manifest.file_type
        )?;
    }

    for (entry, report) in reports {
        if quiet && report.is_empty() {
            continue;
        }
        writeln!(out, "\n--- {} ---", entry.name)?;

        if !quiet {
            writeln!(out, "Description: {}", entry.description)?;
            writeln!(out, "Size: {} bytes", entry.size)?;
            writeln!(out, "Offset: {}", entry.offset)?;
            if !entry.metadata.is_empty() {
                writeln!(out, "Metadata:")?;
                for (key, value) in &entry.metadata {
                    writeln!(out, "  {}: {}", key, value)?;
                }
            }
        }

        if !report.strings.is_empty() {
            writeln!(out, "  Readable strings found:")?;
            for s in &report.strings {
                writeln!(out, "    {:?}", s)?;
            }
        }
        for hit in &report.patterns {
            writeln!(out, "  {} detected: {}", hit.pattern, hit.matched)?;
        }
        if let Some(hex) = &report.header_hex {
            writeln!(out, "  Header hex analysis:")?;
            writeln!(out, "    First 16 bytes: {}", hex)?;
        }
        for found in &report.embedded {
            writeln!(out, "  {} signature found at offset {}", found.name, found.offset)?;
        }
    }

    Ok(out)
}

fn print_analysis(classification: &Classification) -> Result<()> {
    println!("File Analysis:");
    println!("{}", serde_json::to_string_pretty(classification)?);
    Ok(())
}

/// Print the part table in offset order.
fn print_parts(parts: &[ManifestEntry]) {
    println!(
        "{:>10}  {:>10}  {:<24}  Description",
        "Offset", "Size", "Name"
    );
    println!("{}", "-".repeat(70));

    let mut ordered: Vec<_> = parts.iter().collect();
    ordered.sort_by_key(|part| part.offset);
    for part in ordered {
        let detail = part
            .metadata
            .iter()
            .map(|(key, value)| match value {
                MetaValue::Number(_) | MetaValue::Decimal(_) => format!("{key}={value}"),
                MetaValue::Text(s) => format!("{key}={s:?}"),
            })
            .collect::<Vec<_>>()
            .join(", ");
        if detail.is_empty() {
            println!(
                "{:>10}  {:>10}  {:<24}  {}",
                part.offset, part.size, part.name, part.description
            );
        } else {
            println!(
                "{:>10}  {:>10}  {:<24}  {} [{}]",
                part.offset, part.size, part.name, part.description, detail
            );
        }
    }
}

/// Format a byte size into a human-readable string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h3x::scan::scan_segment;

    fn entry(name: &str) -> ManifestEntry {
        ManifestEntry {
            name: name.to_string(),
            file: format!("{name}.hex"),
            description: format!("{name} bytes"),
            offset: 0,
            size: 4,
            metadata: Default::default(),
        }
    }

    fn fixture() -> (Manifest, Vec<(ManifestEntry, ScanReport)>) {
        let manifest = Manifest {
            original_file: "cam.jpg".into(),
            file_type: "JPEG".into(),
            extension: ".jpg".into(),
            total_size: 8,
            timestamp: chrono::Utc::now(),
            parts: vec![entry("image_data"), entry("exif_metadata")],
        };
        let reports = vec![
            (entry("image_data"), scan_segment("image_data", b"Nikon")),
            (entry("exif_metadata"), scan_segment("exif_metadata", b"Nikon D750")),
        ];
        (manifest, reports)
    }

    #[test]
    fn scan_report_lists_every_part() {
        let (manifest, reports) = fixture();
        let text = render_scan(&manifest, &reports, false).unwrap();
        assert!(text.contains("=== Hidden Data Analysis: cam.jpg (JPEG) ==="));
        assert!(text.contains("--- image_data ---"));
        assert!(text.contains("Description: exif_metadata bytes"));
        assert!(text.contains("Camera make detected: Nikon"));
    }

    #[test]
    fn quiet_scan_keeps_only_findings() {
        let (manifest, reports) = fixture();
        let text = render_scan(&manifest, &reports, true).unwrap();
        assert!(!text.contains("Hidden Data Analysis"));
        assert!(!text.contains("--- image_data ---"));
        assert!(!text.contains("Description:"));
        assert!(text.contains("--- exif_metadata ---"));
        assert!(text.contains("Camera make detected: Nikon"));
    }

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(format_size(500), "500 bytes");
        assert_eq!(format_size(1536), "1.50 KB");
    }
}
