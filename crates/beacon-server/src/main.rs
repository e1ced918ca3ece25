//! Beacon Foundation backend executable

use beacon_core::{
    AccountManager, BeaconConfig, ContentService, EmailDispatcher, GmailClient,
    GoogleAnalyticsClient, GoogleTokenProvider, GrantService, LinkedInAnalyticsService,
    MetricoolClient, NewsletterService, SupabaseClient, TrafficAnalytics, WordPressClient,
};
use beacon_core::services::traits::ArticleSource;
use beacon_server::{build_router, utc_today, AppState};
use clap::{Arg, Command};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging with INFO as default if RUST_LOG not set
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let matches = Command::new("beacon-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Beacon Foundation site backend")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file path")
                .env("BEACON_CONFIG")
                .default_value("config/credentials.json")
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Address to bind")
                .default_value("0.0.0.0")
        )
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .value_name("PORT")
                .help("HTTP port")
                .env("PORT")
                .value_parser(clap::value_parser!(u16))
                .default_value("8080")
        )
        .arg(
            Arg::new("allowed-origin")
                .long("allowed-origin")
                .value_name("ORIGIN")
                .help("Browser origin allowed by CORS (overrides site.allowed_origin)")
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = BeaconConfig::from_file(config_path)?;
    log::info!("Loaded configuration from {}", config_path);

    let state = build_state(&config)?;

    let allowed_origin = matches
        .get_one::<String>("allowed-origin")
        .cloned()
        .or_else(|| config.site.allowed_origin.clone());
    match &allowed_origin {
        Some(origin) => log::info!("CORS restricted to {}", origin),
        None => log::warn!("No allowed origin configured, CORS accepts any origin"),
    }
    let app = build_router(state, allowed_origin.as_deref())?;

    let host = matches.get_one::<String>("host").unwrap();
    let port = *matches.get_one::<u16>("port").unwrap();
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Beacon server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Beacon server stopped");
    Ok(())
}

/// Wire clients into services. Vendors without credentials are left out and
/// their routes report a configuration error.
fn build_state(config: &BeaconConfig) -> beacon_core::Result<AppState> {
    let supabase = Arc::new(SupabaseClient::new(config.supabase.clone())?);

    let google_tokens = match config.require_google_oauth() {
        Ok(oauth) => Some(Arc::new(GoogleTokenProvider::new(oauth.clone())?)),
        Err(e) => {
            log::warn!("{}; analytics and email routes are disabled", e);
            None
        }
    };

    let traffic = match (&google_tokens, config.require_google_analytics()) {
        (Some(tokens), Ok(analytics)) => {
            let client = GoogleAnalyticsClient::new(analytics.clone(), tokens.clone())?;
            Some(Arc::new(TrafficAnalytics::new(Arc::new(client))))
        }
        (_, Err(e)) => {
            log::warn!("{}", e);
            None
        }
        _ => None,
    };

    let mailer = match (&google_tokens, config.require_gmail()) {
        (Some(tokens), Ok(gmail)) => {
            let client = GmailClient::new(gmail.clone(), tokens.clone())?;
            let sender = client.sender();
            log::info!("Email sent as {}", sender);
            Some(Arc::new(EmailDispatcher::new(Arc::new(client), sender)))
        }
        (_, Err(e)) => {
            log::warn!("{}", e);
            None
        }
        _ => None,
    };

    let linkedin = match config.require_metricool() {
        Ok(metricool) => {
            let client = MetricoolClient::new(metricool.clone())?;
            Some(Arc::new(LinkedInAnalyticsService::new(Arc::new(client))))
        }
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    };

    let articles: Option<Arc<dyn ArticleSource>> = match config.require_wordpress() {
        Ok(wordpress) => Some(Arc::new(WordPressClient::new(wordpress.clone())?) as Arc<dyn ArticleSource>),
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    };

    if config.site.contact_inbox.is_none() {
        log::warn!("site.contact_inbox not configured; contact form is disabled");
    }

    Ok(AppState {
        accounts: Arc::new(AccountManager::new(supabase.clone(), supabase.clone())),
        traffic,
        linkedin,
        mailer,
        newsletter: Arc::new(NewsletterService::new(supabase.clone())),
        grants: Arc::new(GrantService::new(supabase.clone())),
        content: Arc::new(ContentService::new(supabase, articles)),
        contact_inbox: config.site.contact_inbox.clone(),
        today: utc_today,
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
    log::info!("Shutdown signal received");
}
