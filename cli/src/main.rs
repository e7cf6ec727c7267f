//! Relwatch CLI - browse issues reported after a release

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use relwatch_lib::display::{format_date, format_relative_time};
use relwatch_lib::github::{GithubClient, GithubConfig};
use relwatch_lib::highlight::{DEFAULT_FRAGMENT_LENGTH, highlight_fragment};
use relwatch_lib::{CombinedSearchResult, Issue, IssueSearchResults};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "relwatch")]
#[command(about = "Browse GitHub issues reported after a release", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    log_verbosity: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stable released versions, newest first
    Versions {
        /// Show at most this many versions
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Search both scopes for issues mentioning a version
    Search {
        /// The version to search for (e.g., "0.74.0")
        #[arg(value_name = "VERSION")]
        version: String,

        /// Page of main-repository results
        #[arg(long, default_value_t = 1)]
        main_page: u32,

        /// Page of ecosystem results
        #[arg(long, default_value_t = 1)]
        ecosystem_page: u32,

        /// Output the combined result as JSON instead of terminal format
        #[arg(long)]
        json: bool,
    },
}

/// Initialize tracing subscriber based on verbosity and output format
fn init_tracing(verbose: u8, json: bool) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,relwatch_lib=info".to_string(),
            2 => "info,relwatch_lib=debug".to_string(),
            _ => "debug,relwatch_lib=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

async fn list_versions(client: &GithubClient, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let versions = client.list_versions().await?;

    for entry in versions.iter().take(limit) {
        match &entry.published_at {
            Some(published) => println!(
                "{:<12} {}",
                entry.version.bold(),
                format_date(published).dimmed()
            ),
            None => println!("{:<12}", entry.version.bold()),
        }
    }

    Ok(())
}

fn print_issue(client: &GithubClient, issue: &Issue, version: &str) {
    let state = if issue.state == "open" {
        format!("{}", "open".red())
    } else {
        format!("{}", "closed".green())
    };

    println!(
        "  {} {} {}",
        format!("#{}", issue.number).bold(),
        issue.title,
        format!("[{state}]")
    );
    let author = issue
        .user
        .as_ref()
        .map(|user| user.login.as_str())
        .unwrap_or("unknown");
    println!(
        "    {} by {} {}",
        issue.repository().dimmed(),
        author,
        format_relative_time(&issue.created_at).dimmed()
    );

    if let Some(body) = &issue.body {
        let excerpt = highlight_fragment(
            &client.config().identity,
            body,
            version,
            DEFAULT_FRAGMENT_LENGTH,
        );
        match excerpt.matched() {
            Some(matched) => println!(
                "    {}{}{}",
                excerpt.before_match().dimmed(),
                matched.yellow().bold(),
                excerpt.after_match().dimmed()
            ),
            None => println!("    {}", excerpt.fragment.dimmed()),
        }
    }
    println!("    {}", issue.html_url.blue());
    println!();
}

fn print_scope(client: &GithubClient, label: &str, results: &IssueSearchResults, version: &str) {
    println!(
        "{} ({} total)",
        label.bold().underline(),
        results.total_count
    );
    if results.items.is_empty() {
        println!("  no issues found");
    }
    for issue in &results.items {
        print_issue(client, issue, version);
    }
    println!();
}

fn print_results(client: &GithubClient, results: &CombinedSearchResult) {
    match &results.release {
        Some(release) => {
            let published = release
                .published_at
                .as_ref()
                .map(format_date)
                .unwrap_or_else(|| "unpublished".to_string());
            println!(
                "Release {} ({})\n{}\n",
                release.tag_name.bold(),
                published,
                release.html_url.blue()
            );
        }
        None => println!(
            "No release found for '{}'; searching without a date filter\n",
            results.version
        ),
    }
    if let Some(after) = &results.searched_after {
        println!("Showing issues created after {after}\n");
    }

    print_scope(
        client,
        "Main repository",
        &results.main_repo_issues,
        &results.version,
    );
    print_scope(
        client,
        "Ecosystem",
        &results.ecosystem_issues,
        &results.version,
    );
}

async fn search(
    client: &GithubClient,
    version: &str,
    main_page: u32,
    ecosystem_page: u32,
    as_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let results = client
        .search_issues(version, main_page, ecosystem_page)
        .await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(client, &results);
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_verbosity, cli.json);

    tracing::info!("Relwatch CLI starting");

    let client = GithubClient::new(GithubConfig::from_env());

    let outcome = match cli.command {
        Commands::Versions { limit } => list_versions(&client, limit).await,
        Commands::Search {
            version,
            main_page,
            ecosystem_page,
            json,
        } => search(&client, &version, main_page, ecosystem_page, json).await,
    };

    if let Err(error) = outcome {
        eprintln!("{} {}", "error:".red().bold(), error);
        std::process::exit(1);
    }
}
