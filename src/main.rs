use clap::Parser;
use seo_crawl::duplicates::{DuplicateStatus, annotate_headings};
use seo_crawl::utils::report_file_name;
use seo_crawl::{Audit, AuditError, RunResult};
use std::fs;
use std::path::Path;

mod args;
use args::{Args, to_target, validate_input};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    if let Err(e) = validate_input(args.type_, &args.url) {
        ::log::error!("Invalid input: {}", e);
        std::process::exit(2);
    }

    ::log::info!("Starting audit for URL: {}", args.url);

    if let Err(e) = run(&args).await {
        ::log::error!("Audit failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<(), AuditError> {
    let mut audit = Audit::new(to_target(args.type_, &args.url));
    if let Some(path) = &args.config {
        audit = audit.with_config_file(path)?;
    }
    if let Some(concurrency) = args.concurrency {
        audit = audit.with_max_concurrency(concurrency);
    }
    if let Some(max_pages) = args.max_pages {
        audit = audit.with_max_pages(max_pages);
    }

    let start_time = std::time::Instant::now();
    let result = audit.run().await?;
    log_summary(&result, start_time.elapsed().as_secs_f64());

    let json = serde_json::to_string_pretty(&result)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json)?;
            ::log::info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    if let Some(dir) = &args.output_dir {
        write_tables(&result, &args.url, dir)?;
    }
    Ok(())
}

/// Write every non-empty table to its own JSON file
fn write_tables(result: &RunResult, input_url: &str, dir: &Path) -> Result<(), AuditError> {
    fs::create_dir_all(dir)?;
    for (name, rows) in result.tables()? {
        let path = dir.join(report_file_name(input_url, name));
        fs::write(&path, serde_json::to_string_pretty(&rows)?)?;
        ::log::debug!("Wrote {}", path.display());
    }
    Ok(())
}

fn log_summary(result: &RunResult, seconds: f64) {
    let duplicate_headings = annotate_headings(&result.headers_h1)
        .into_iter()
        .chain(annotate_headings(&result.headers_h2))
        .filter(|row| row.duplicate_status == DuplicateStatus::DuplicateFound)
        .count();

    ::log::info!(
        "Audit complete - {} URLs checked, {} pages extracted in {:.2} seconds",
        result.page_status.len(),
        result.pages_extracted(),
        seconds
    );
    ::log::info!(
        "{} missing titles, {} duplicate title rows, {} images missing alt, {} duplicate headings",
        result.meta_titles_missing.len(),
        result.meta_titles_duplicate.len(),
        result.images_missing_alt.len(),
        duplicate_headings
    );
}
