//! Waveshop service entry point.
//!
//! Wires configuration, the Postgres pool, the gateway factory, and the
//! ledger into the Axum application, and runs the stale-payment sweep on
//! a timer.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use waveshop::adapters::crypto::EnvSecretCipher;
use waveshop::adapters::gateways::PaymentGatewayFactory;
use waveshop::adapters::http::payments::{payment_router, PaymentsAppState};
use waveshop::adapters::postgres::PostgresTransactionRepository;
use waveshop::adapters::queue::PostgresTaskQueue;
use waveshop::adapters::subscription::HttpSubscriptionExtender;
use waveshop::application::handlers::payment::CancelStaleTransactionsCommand;
use waveshop::config::AppConfig;
use waveshop::domain::payment::TransactionLedger;
use waveshop::ports::SecretCipher;

/// How often the stale-payment sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.server.log_level)?)
        .init();

    config.validate()?;
    tracing::info!(
        environment = ?config.server.environment,
        "Configuration loaded"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let cipher: Arc<dyn SecretCipher> = Arc::new(EnvSecretCipher);

    let subscription_token: Option<SecretString> = config
        .subscription
        .api_token
        .as_deref()
        .map(|blob| cipher.decrypt(blob))
        .transpose()?;
    let subscription_http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.subscription.timeout_secs))
        .build()?;
    let extender = Arc::new(HttpSubscriptionExtender::new(
        config.subscription.service_url.clone(),
        subscription_token,
        subscription_http,
    ));

    let repository = Arc::new(PostgresTransactionRepository::new(pool.clone()));
    let ledger = Arc::new(TransactionLedger::new(repository, extender));
    let factory = Arc::new(PaymentGatewayFactory::new(
        config.gateways.clone(),
        cipher.clone(),
    ));

    let state = PaymentsAppState {
        factory,
        ledger,
        task_queue: Arc::new(PostgresTaskQueue::new(pool)),
    };

    spawn_stale_sweep(state.clone(), config.gateways.pending_ttl_secs);

    let app = Router::new()
        .nest("/api", payment_router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .with_state(state);

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Runs the pending-transaction sweep on a fixed interval.
///
/// Abandoned checkouts go to canceled through the same ledger transition
/// webhooks use; a payment racing the sweep resolves cleanly either way.
fn spawn_stale_sweep(state: PaymentsAppState, ttl_secs: u64) {
    tokio::spawn(async move {
        let handler = state.sweep_handler();
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match handler
                .handle(CancelStaleTransactionsCommand { ttl_secs })
                .await
            {
                Ok(result) if result.canceled > 0 => {
                    tracing::info!(canceled = result.canceled, "Sweep canceled stale payments");
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(error = %err, "Stale payment sweep failed");
                }
            }
        }
    });
}
