use tokio::sync::broadcast;
use tracing::debug;

use ephemera_common::{ConnectionError, Intent};
use ephemera_protocol::{Command, Frame};
use ephemera_storage::StateStore;

use crate::Connection;

/// Loop principal de tratamento de uma conexão.
pub async fn handle_connection(
    mut conn: Connection,
    store: StateStore<Intent>,
    shutdown: &mut broadcast::Receiver<()>,
) -> Result<(), ConnectionError> {
    loop {
        let frame = tokio::select! {
            result = conn.read_frame() => result?,
            _ = shutdown.recv() => {
                return Ok(());
            }
        };

        let Some(frame) = frame else {
            return Ok(()); // EOF
        };

        let response = match Command::from_frame(frame) {
            Ok(cmd) => {
                debug!("comando recebido: {}", describe(&cmd));
                execute_command(&cmd, &store)
            }
            Err(e) => Frame::Error(format!("ERR {e}")),
        };

        conn.write_frame(&response).await?;
    }
}

/// Executa um comando e retorna o Frame de resposta.
pub fn execute_command(cmd: &Command, store: &StateStore<Intent>) -> Frame {
    match cmd {
        Command::Ping(msg) => match msg {
            Some(m) => Frame::bulk(m),
            None => Frame::Simple("PONG".into()),
        },
        Command::Create(intent) => Frame::bulk(&store.create(*intent)),
        Command::Consume(key) => match store.consume(key) {
            Some(intent) => Frame::bulk(intent.as_str()),
            None => Frame::Null,
        },
        Command::Count => Frame::Integer(store.count() as i64),
        Command::Ttl => Frame::Integer(i64::try_from(store.ttl().as_millis()).unwrap_or(i64::MAX)),
        Command::Unknown(name) => Frame::Error(format!("ERR unknown command '{name}'")),
    }
}

// Chaves não vão para o log.
fn describe(cmd: &Command) -> String {
    match cmd {
        Command::Consume(_) => "Consume(..)".to_string(),
        other => format!("{other:?}"),
    }
}
