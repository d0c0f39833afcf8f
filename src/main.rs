// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Build the crawl configuration and the crawler
// 3. Wire Ctrl-C to the crawler's cancellation flag
// 4. Run the crawl and print the results (table or JSON)
// 5. Exit with proper code (0 = success, 1 = some pages failed, 2 = error)
//
// The real logic lives in src/crawl/ - this file is just the shell that
// feeds it a config and prints what comes back.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;           // src/cli.rs - command-line parsing
mod crawl;         // src/crawl/ - the crawl engine

// Import items we need from our modules
use cli::Cli;
use clap::Parser;  // Parser trait enables the parse() method
use crawl::{CrawlConfig, CrawlResult, Crawler, HttpFetcher};

// anyhow::Result is like std::result::Result but simpler for applications
// It lets us return any error type with the ? operator
use anyhow::Result;
use std::sync::atomic::Ordering;
use std::time::Duration;

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Configuration or startup failure: the crawl never began
            eprintln!("Error: {}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = crawl completed, every page fetched
//   Ok(1) = crawl completed, some pages failed to fetch
//   Err  = configuration/startup error (exit code 2)
async fn run() -> Result<i32> {
    // Parse command-line arguments into our Cli struct
    // This will automatically handle --help, --version, etc.
    let cli = Cli::parse();

    println!("🔍 Crawling website: {}", cli.root_url);
    println!("📊 Max crawl depth: {}", cli.max_depth);

    let config = CrawlConfig {
        root_url: cli.root_url,
        max_depth: cli.max_depth,
        same_domain_only: !cli.allow_external,
        workers: cli.workers,
        timeout: Duration::from_secs(cli.timeout),
        max_pages: cli.max_pages,
        user_agent: cli.user_agent,
    };

    let fetcher = HttpFetcher::new(config.timeout, &config.user_agent)?;

    // Crawler::new validates the config; a bad root URL stops us here
    let crawler = Crawler::new(config, fetcher)?;

    // Ctrl-C flips the cancellation flag: in-flight fetches finish, nothing
    // new starts, and we still print whatever was crawled
    let cancel = crawler.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n⚠️  Interrupted - letting in-flight fetches finish...");
            cancel.store(true, Ordering::Relaxed);
        }
    });

    let results = crawler.run().await;

    println!("📄 Crawled {} page(s)\n", results.len());

    // Print results and determine exit code
    print_results(&results, cli.json)?;

    // Count how many pages failed to fetch
    let failed_count = results.iter()
        .filter(|r| !r.is_ok())
        .count();

    if failed_count > 0 {
        Ok(1)  // Exit code 1 = some pages failed
    } else {
        Ok(0)  // Exit code 0 = all good
    }
}

// Prints the results either as a table or JSON
fn print_results(results: &[CrawlResult], json: bool) -> Result<()> {
    if json {
        // Serialize results to JSON and print
        let json_output = serde_json::to_string_pretty(results)?;
        println!("{}", json_output);
    } else {
        // Print human-readable table
        print_table(results);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal
fn print_table(results: &[CrawlResult]) {
    // Print table header
    println!("{:<55} {:>5} {:>6} {:<25}", "URL", "DEPTH", "LINKS", "STATUS");
    println!("{}", "=".repeat(95));

    // Print each result
    for result in results {
        let status_display = match &result.fetch_error {
            None => "✅ OK".to_string(),
            Some(error) => format!("❌ {}", error),
        };

        // Truncate URL if too long for display
        let url_display = if result.url.len() > 52 {
            format!("{}...", &result.url[..52])
        } else {
            result.url.clone()
        };

        println!(
            "{:<55} {:>5} {:>6} {:<25}",
            url_display,
            result.depth,
            result.links_found.len(),
            status_display
        );
    }

    println!();

    // Print summary
    let ok_count = results.iter().filter(|r| r.is_ok()).count();
    let failed_count = results.len() - ok_count;
    let max_depth_seen = results.iter().map(|r| r.depth).max().unwrap_or(0);
    let total_links: usize = results.iter().map(|r| r.links_found.len()).sum();

    println!("📊 Summary:");
    println!("   ✅ Crawled: {}", ok_count);
    println!("   ❌ Failed: {}", failed_count);
    println!("   🔗 Links found: {}", total_links);
    println!("   🌊 Deepest page: depth {}", max_depth_seen);
}
