//! UTM Audit: tracking-parameter validation across advertising platforms.
//!
//! Main entry point: loads configuration, wires the fetcher and engine
//! together, and renders a single-dashboard or bulk audit.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};
use utm_bulk::{BulkValidator, CancelHandle, DashboardAudit, DashboardOutcome};
use utm_connectors::{DashboardFetcher, FileFetcher};
use utm_core::config::AppConfig;
use utm_core::types::Session;
use utm_engine::debug::{collect_faults, compare, infer_pattern};
use utm_engine::filter::FilterOptions;
use utm_engine::level_recommendation;

#[derive(Parser, Debug)]
#[command(name = "utm-audit")]
#[command(about = "Audit UTM tracking parameters across advertising platforms")]
#[command(version)]
struct Cli {
    /// Session token for the fetch boundary
    #[arg(long, env = "UTM_AUDIT__TOKEN")]
    token: String,

    /// Account id the session belongs to
    #[arg(long, env = "UTM_AUDIT__ACCOUNT_ID")]
    account_id: String,

    /// Directory holding dashboard payload documents (overrides config)
    #[arg(long, env = "UTM_AUDIT__DATA_DIR")]
    data_dir: Option<String>,

    /// Audit a single dashboard by id
    #[arg(long, conflicts_with = "all")]
    dashboard: Option<i64>,

    /// Audit every dashboard concurrently
    #[arg(long, default_value_t = false)]
    all: bool,

    /// Include disabled creatives
    #[arg(long, default_value_t = false)]
    show_disabled: bool,

    /// Include creatives with zero or unknown spend
    #[arg(long, default_value_t = false)]
    show_non_spend: bool,

    /// Show only creatives with no tracking string at any level
    #[arg(long, default_value_t = false)]
    show_no_utms_only: bool,

    /// Include valid creatives alongside errors and warnings
    #[arg(long, default_value_t = false)]
    show_valid_too: bool,

    /// Case-insensitive search over campaign, ad-set, and ad names/ids
    #[arg(long, default_value = "")]
    search: String,

    /// Write a CSV report next to the summary output
    #[arg(long, default_value_t = false)]
    export_csv: bool,

    /// Print per-creative fault details with found-vs-expected comparisons
    #[arg(long, default_value_t = false)]
    faults: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "utm_audit=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(data_dir) = cli.data_dir.clone() {
        config.data_dir = data_dir;
    }

    info!(
        data_dir = %config.data_dir,
        policy = ?config.engine.error_count_policy,
        "UTM Audit starting"
    );

    let session = Session::new(cli.token.clone(), cli.account_id.clone());
    let fetcher = Arc::new(FileFetcher::new(&config.data_dir));
    let options = FilterOptions {
        show_disabled: cli.show_disabled,
        show_non_spend: cli.show_non_spend,
        show_no_utms_only: cli.show_no_utms_only,
        show_valid_too: cli.show_valid_too,
        search_query: cli.search.clone(),
    };

    if cli.all {
        run_bulk(&cli, &config, fetcher, &session, &options).await
    } else {
        let dashboard_id = cli
            .dashboard
            .context("pass --dashboard <id> or --all to select what to audit")?;
        run_single(&cli, &config, fetcher.as_ref(), &session, &options, dashboard_id).await
    }
}

async fn run_single(
    cli: &Cli,
    config: &AppConfig,
    fetcher: &FileFetcher,
    session: &Session,
    options: &FilterOptions,
    dashboard_id: i64,
) -> anyhow::Result<()> {
    let fetched = fetcher.fetch_creatives(session, dashboard_id).await?;
    let audit = DashboardAudit::build(
        fetched.configs,
        fetched.recommended_utms,
        options,
        config.engine.error_count_policy,
    );

    print_summary(&format!("dashboard {dashboard_id}"), &audit);
    if cli.faults {
        print_faults(&audit, &config.engine.required_pattern);
    }
    if cli.export_csv {
        write_csv(&dashboard_id.to_string(), &audit).await?;
    }
    Ok(())
}

async fn run_bulk(
    cli: &Cli,
    config: &AppConfig,
    fetcher: Arc<FileFetcher>,
    session: &Session,
    options: &FilterOptions,
) -> anyhow::Result<()> {
    let dashboards = fetcher.list_dashboards(session).await?;
    if dashboards.is_empty() {
        warn!("no dashboards configured, nothing to audit");
        return Ok(());
    }

    let validator = BulkValidator::new(
        fetcher,
        config.bulk.clone(),
        config.engine.error_count_policy,
    );

    // Ctrl-C aborts in-flight fetches but keeps completed reports
    let (handle, token) = CancelHandle::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("cancellation requested, finishing with partial results");
            handle.cancel();
        }
    });

    let report = validator
        .validate_all_with_cancel(session, &dashboards, options, token)
        .await;

    for dashboard_report in &report.reports {
        let name = &dashboard_report.dashboard.name;
        match &dashboard_report.outcome {
            DashboardOutcome::Completed(audit) => {
                print_summary(name, audit);
                if cli.faults {
                    print_faults(audit, &config.engine.required_pattern);
                }
                if cli.export_csv {
                    write_csv(name, audit).await?;
                }
            }
            DashboardOutcome::Failed { error } => {
                println!("{name}: FAILED -- {error}");
            }
            DashboardOutcome::Cancelled => {
                println!("{name}: cancelled");
            }
        }
    }
    println!(
        "bulk run {}: {} completed, {} failed, {} cancelled",
        report.run_id,
        report.completed_count(),
        report.failed_count(),
        report.cancelled_count()
    );
    Ok(())
}

fn print_summary(label: &str, audit: &DashboardAudit) {
    let summary = &audit.summary;
    println!(
        "{label}: {} ads checked, {} valid, {} errors, {} warnings ({:.1}% with issues)",
        summary.total_ads_checked,
        summary.valid_ads,
        summary.error_count,
        summary.warning_count,
        summary.error_rate_percent
    );
    for group in &audit.groups {
        println!(
            "  [{}] {} -- {} ads, {} errors, {:.2} spend{}",
            group.platform.display_name(),
            group.campaign_name,
            group.ad_count,
            group.error_count,
            group.total_spend,
            if group.is_campaign_active {
                ""
            } else {
                " (inactive)"
            }
        );
        for ad in &group.ads {
            if let Some(advisory) = level_recommendation(&ad.effective, ad.verdict) {
                println!("    note ({}): {}", ad.creative.ad.name, advisory.message);
            }
        }
    }
}

fn print_faults(audit: &DashboardAudit, fallback_pattern: &str) {
    let pattern = audit
        .recommended_utms
        .as_deref()
        .unwrap_or(fallback_pattern);
    let faults = collect_faults(&audit.groups, pattern);
    let expected = infer_pattern(&faults);

    for fault in &faults {
        println!(
            "  {} [{}] {}: {}",
            fault.platform.display_name(),
            fault.error_type,
            fault.name,
            fault.details
        );
        if let Some(found) = &fault.found_utms {
            for row in compare(found, expected) {
                if !row.is_match {
                    println!(
                        "    {}: found \"{}\", expected \"{}\"",
                        row.key, row.found, row.expected
                    );
                }
            }
        }
    }
}

async fn write_csv(label: &str, audit: &DashboardAudit) -> anyhow::Result<()> {
    let rows = utm_export::build_rows(&audit.groups);
    let csv = utm_export::to_csv(&rows);
    let path = format!(
        "{}.csv",
        utm_export::file_stem(Some(label), Utc::now().date_naive())
    );
    tokio::fs::write(&path, csv)
        .await
        .with_context(|| format!("writing {path}"))?;
    info!(path = %path, rows = rows.len(), "report exported");
    Ok(())
}
