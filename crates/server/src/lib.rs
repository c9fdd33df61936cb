#![forbid(unsafe_code)]

mod connection;
pub mod handler;

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::{Semaphore, broadcast};
use tracing::{error, info};

use ephemera_common::Intent;
use ephemera_storage::StateStore;

pub use connection::Connection;
pub use handler::handle_connection;

/// Aceita conexões até `shutdown` completar, no máximo `max_connections`
/// simultâneas. Todas compartilham o mesmo `store`.
pub async fn serve(
    listener: TcpListener,
    store: StateStore<Intent>,
    max_connections: usize,
    shutdown: impl Future<Output = ()>,
) {
    let semaphore = Arc::new(Semaphore::new(max_connections));
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    tokio::pin!(shutdown);

    loop {
        let permit = tokio::select! {
            permit = semaphore.clone().acquire_owned() => match permit {
                Ok(p) => p,
                Err(_) => break,
            },
            _ = &mut shutdown => break,
        };

        let (socket, addr) = tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok(v) => v,
                    Err(e) => {
                        error!("erro ao aceitar conexão: {e}");
                        continue;
                    }
                }
            }
            _ = &mut shutdown => break,
        };

        info!("nova conexão: {addr}");
        let store = store.clone();
        let mut shutdown_rx = shutdown_tx.subscribe();

        tokio::spawn(async move {
            let conn = Connection::new(socket);
            if let Err(e) = handle_connection(conn, store, &mut shutdown_rx).await {
                error!("erro na conexão {addr}: {e}");
            }
            info!("conexão encerrada: {addr}");
            drop(permit);
        });
    }

    info!("shutdown: encerrando conexões");
    drop(shutdown_tx);
}
