use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::time::Duration;
use tracing::{info, warn};

use ephemera_common::{DEFAULT_HOST, DEFAULT_PORT, MAX_CONNECTIONS, MIN_KEY_BYTES, StoreConfig};
use ephemera_storage::StateStore;

#[derive(Parser, Debug)]
#[command(name = "ephemera-server", about = "Ephemera — store de estado efêmero de uso único")]
struct Args {
    #[arg(long, env = "EPHEMERA_HOST", default_value = DEFAULT_HOST)]
    host: String,
    #[arg(long, env = "EPHEMERA_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
    #[arg(long, env = "EPHEMERA_MAX_CONNECTIONS", default_value_t = MAX_CONNECTIONS)]
    max_connections: usize,
    /// Janela de validade de cada estado, em segundos
    #[arg(long, env = "EPHEMERA_TTL_SECS", default_value_t = 600)]
    ttl_secs: u64,
    /// Bytes aleatórios por chave
    #[arg(long, env = "EPHEMERA_KEY_BYTES", default_value_t = MIN_KEY_BYTES)]
    key_bytes: usize,
    /// Intervalo da varredura ativa em segundos (0 = só varredura preguiçosa)
    #[arg(long, env = "EPHEMERA_SWEEP_INTERVAL_SECS", default_value_t = 60)]
    sweep_interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ephemera_server=info,ephemera_storage=info".into()),
        )
        .init();

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    let config = StoreConfig::new(Duration::from_secs(args.ttl_secs), args.key_bytes)?;
    let store = StateStore::new(config)?;

    let sweeper = store.spawn_sweeper(Duration::from_secs(args.sweep_interval_secs));
    if sweeper.is_none() {
        warn!("varredura ativa desligada, estados expirados só saem em CREATE/COUNT");
    }

    let listener = TcpListener::bind(&addr).await?;
    info!(
        "Ephemera escutando em {addr} (ttl={}s, sweep={}s)",
        args.ttl_secs, args.sweep_interval_secs
    );

    ephemera_server::serve(listener, store, args.max_connections, async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("falha ao instalar handler de ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
        info!("shutdown signal recebido");
    })
    .await;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }

    Ok(())
}
