pub mod api;
pub mod catalog;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use tokio::signal;

use anyhow::Context;
pub use config::Config;
use db::Store;
use models::ComponentRecord;
use services::{BatchEntry, SearchRequest, SearchResult};
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let mut log_level = config.general.log_level.clone();
    if config.general.suppress_connection_errors {
        log_level.push_str(",reqwest::retry=off,hyper_util=off");
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "bomarr")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "serve" | "-d" | "--daemon" => run_server(config, prometheus_handle).await,

        "search" | "s" => {
            if args.len() < 3 {
                println!("Usage: bomarr search <keyword> [--category <name>] [--no-cache]");
                println!("Example: bomarr search STM32F407");
                return Ok(());
            }
            let keyword = &args[2];
            cmd_search(&config, keyword, &args[3..]).await
        }

        "batch" | "b" => {
            if args.len() < 3 {
                println!("Usage: bomarr batch <keyword> [keyword...]");
                println!("Example: bomarr batch STM32F407 LM2596 AD8232");
                return Ok(());
            }
            cmd_batch(&config, &args[2..]).await
        }

        "cache-status" => cmd_cache_status(&config).await,

        "cache-clear" => cmd_cache_clear(&config).await,

        "init" | "--init" => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("Bomarr - Electronic Component Search Aggregator");
    println!("Searches DigiKey and Mouser in parallel with a shared result cache");
    println!();
    println!("USAGE:");
    println!("  bomarr <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  search <keyword>  Search all configured sources for components");
    println!("  batch <kw>...     Run several searches concurrently");
    println!("  cache-status      Show component cache statistics");
    println!("  cache-clear       Delete expired rows from the component cache");
    println!("  serve             Run the HTTP API server");
    println!("  init              Create default config file");
    println!("  help              Show this help message");
    println!();
    println!("SEARCH OPTIONS:");
    println!("  --category <name>  Tag results with a category (also scopes cache lookups)");
    println!("  --source <id>      Restrict to one source (digikey, mouser); repeatable");
    println!("  --limit <n>        Max results per source (default: 10)");
    println!("  --no-cache         Bypass the cache for this search");
    println!();
    println!("EXAMPLES:");
    println!("  bomarr search STM32F407                       # Search all sources");
    println!("  bomarr search LM2596 --category power_regulator");
    println!("  bomarr search STM32F4 --source mouser --no-cache");
    println!("  bomarr batch STM32F407 LM2596 AD8232          # Three searches at once");
    println!("  bomarr serve                                  # Start the HTTP API");
    println!("  bomarr cache-clear                            # Purge expired cache rows");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml to configure credentials, server port, etc.");
    println!("  Credentials can also come from the DIGIKEY_CLIENT_ID,");
    println!("  DIGIKEY_CLIENT_SECRET and MOUSER_API_KEY environment variables.");
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn flag_values(args: &[String], name: &str) -> Vec<String> {
    args.iter()
        .enumerate()
        .filter(|(_, a)| *a == name)
        .filter_map(|(i, _)| args.get(i + 1).cloned())
        .collect()
}

async fn cmd_search(config: &Config, keyword: &str, flags: &[String]) -> anyhow::Result<()> {
    let category = flag_value(flags, "--category").unwrap_or_default();
    let mut request = SearchRequest::new(keyword, category);

    if let Some(limit) = flag_value(flags, "--limit") {
        request.limit_per_source = limit.parse().context("Invalid --limit value")?;
    }

    let chosen = flag_values(flags, "--source");
    if !chosen.is_empty() {
        request.sources = chosen;
    }

    if flags.iter().any(|a| a == "--no-cache") {
        request.use_cache = false;
    }

    println!("Searching for: {keyword}");

    let state = SharedState::new(config.clone()).await?;
    let result = state.search_service.search(request).await?;

    print_search_result(&result);

    Ok(())
}

fn print_search_result(result: &SearchResult) {
    println!();
    println!(
        "Results for \"{}\": {} components in {} ms",
        result.search_term, result.total_found, result.search_time_ms
    );
    println!("{:-<70}", "");

    if result.components.is_empty() {
        println!("No components found.");
    }

    for component in &result.components {
        print_component(component);
    }

    if !result.errors.is_empty() {
        println!("Warnings:");
        for error in &result.errors {
            println!("  ⚠ {error}");
        }
        println!();
    }

    let mut counts: Vec<(&String, &usize)> = result.sources.iter().collect();
    counts.sort();
    if !counts.is_empty() {
        let summary: Vec<String> = counts.iter().map(|(s, n)| format!("{s}: {n}")).collect();
        println!("Sources: {}", summary.join(" | "));
    }
}

fn print_component(record: &ComponentRecord) {
    println!("• {} ({})", record.part_number, record.manufacturer);
    println!("  {}", record.description);

    let price = if record.pricing.unit_price.is_empty() {
        "n/a"
    } else {
        record.pricing.unit_price.as_str()
    };
    println!(
        "  Price: {} (min qty {}) | Stock: {} | {} | via {}",
        price,
        record.pricing.min_qty,
        record.availability.stock,
        record.lifecycle_status,
        record.source
    );

    if let Some(url) = &record.datasheet_url {
        println!("  Datasheet: {url}");
    }
    println!();
}

async fn cmd_batch(config: &Config, terms: &[String]) -> anyhow::Result<()> {
    println!("Running {} searches...", terms.len());

    let state = SharedState::new(config.clone()).await?;
    let requests: Vec<SearchRequest> = terms
        .iter()
        .map(|term| SearchRequest::new(term.clone(), ""))
        .collect();

    let batch = state.batch_service.search_many(requests).await;

    println!();
    println!(
        "Batch complete: {} components across {} searches",
        batch.total_components, batch.total_searches
    );
    println!("{:-<70}", "");

    for entry in &batch.results {
        match entry {
            BatchEntry::Success(result) => {
                println!(
                    "✓ \"{}\": {} components ({} ms)",
                    result.search_term, result.total_found, result.search_time_ms
                );
                for component in result.components.iter().take(3) {
                    let price = if component.pricing.unit_price.is_empty() {
                        "n/a"
                    } else {
                        component.pricing.unit_price.as_str()
                    };
                    println!(
                        "    {} ({}) - {}",
                        component.part_number, component.manufacturer, price
                    );
                }
                if result.total_found > 3 {
                    println!("    ... and {} more", result.total_found - 3);
                }
            }
            BatchEntry::Failure {
                search_term, error, ..
            } => {
                println!("✗ \"{search_term}\": {error}");
            }
        }
    }

    Ok(())
}

async fn cmd_cache_status(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let stats = store.component_cache_stats().await?;

    println!("Component Cache");
    println!("{:-<70}", "");
    println!("Total rows: {}", stats.total_cached);
    println!("Live:       {}", stats.active_components);
    println!("Expired:    {}", stats.expired_components);

    if !stats.by_source.is_empty() {
        println!();
        println!("By source:");
        let mut entries: Vec<_> = stats.by_source.iter().collect();
        entries.sort();
        for (source, count) in entries {
            println!("  {source}: {count}");
        }
    }

    if !stats.by_category.is_empty() {
        println!();
        println!("By category:");
        let mut entries: Vec<_> = stats.by_category.iter().collect();
        entries.sort();
        for (category, count) in entries {
            println!("  {category}: {count}");
        }
    }

    Ok(())
}

async fn cmd_cache_clear(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let deleted = store.sweep_expired_components().await?;

    println!("✓ Deleted {deleted} expired cache rows");

    Ok(())
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "Bomarr v{} starting in server mode...",
        env!("CARGO_PKG_VERSION")
    );

    if !config.server.enabled {
        anyhow::bail!("Server is disabled in config (server.enabled = false)");
    }

    let port = config.server.port;
    let api_state = api::create_app_state_from_config(config, prometheus_handle).await?;

    info!("Starting Web API on port {}", port);

    let app = api::router(api_state);
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("🌐 Web Server running at http://0.0.0.0:{}", port);
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Server running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    server_handle.abort();
    info!("Server stopped");

    Ok(())
}
