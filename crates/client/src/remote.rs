use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use ephemera_common::{
    ConnectionError, INITIAL_BUFFER_CAPACITY, Intent, MAX_FRAME_SIZE, ProtocolError, StoreError,
};
use ephemera_protocol::{Command, Frame};
use ephemera_storage::StateBackend;

/// Backend de estado servido por um `ephemera-server`.
///
/// Uma conexão por handle, serializada por um mutex. Se a troca falha a
/// conexão é descartada e a próxima chamada reconecta; a falha em si sobe
/// como `StoreError`, nunca como ausência.
pub struct RemoteStore {
    addr: String,
    conn: Mutex<Option<Stream>>,
}

impl RemoteStore {
    /// Conecta imediatamente, para que um endereço errado falhe no start.
    pub async fn connect(addr: impl Into<String>) -> Result<Self, StoreError> {
        let addr = addr.into();
        let stream = Stream::open(&addr).await?;
        Ok(Self {
            addr,
            conn: Mutex::new(Some(stream)),
        })
    }

    /// Envia um frame arbitrário e devolve a resposta crua.
    pub async fn send(&self, frame: &Frame) -> Result<Frame, StoreError> {
        let mut guard = self.conn.lock().await;
        let mut stream = match guard.take() {
            Some(stream) => stream,
            None => {
                debug!("reconectando a {}", self.addr);
                Stream::open(&self.addr).await?
            }
        };

        match stream.exchange(frame).await {
            Ok(reply) => {
                *guard = Some(stream);
                Ok(reply)
            }
            Err(e) => {
                warn!("conexão com {} descartada: {e}", self.addr);
                Err(e.into())
            }
        }
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        match self.send(&Command::Ping(None).to_frame()).await? {
            Frame::Simple(s) if s == "PONG" => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// TTL configurado no servidor.
    pub async fn ttl(&self) -> Result<Duration, StoreError> {
        match self.send(&Command::Ttl.to_frame()).await? {
            Frame::Integer(ms) if ms > 0 => Ok(Duration::from_millis(ms as u64)),
            other => Err(unexpected(other)),
        }
    }
}

#[async_trait]
impl StateBackend for RemoteStore {
    async fn create(&self, intent: Intent) -> Result<String, StoreError> {
        key_reply(self.send(&Command::Create(intent).to_frame()).await?)
    }

    async fn consume(&self, key: &str) -> Result<Option<Intent>, StoreError> {
        intent_reply(self.send(&Command::Consume(key.to_string()).to_frame()).await?)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        count_reply(self.send(&Command::Count.to_frame()).await?)
    }
}

struct Stream {
    socket: TcpStream,
    buffer: BytesMut,
}

impl Stream {
    async fn open(addr: &str) -> Result<Self, ConnectionError> {
        let socket = TcpStream::connect(addr).await?;
        socket.set_nodelay(true)?;
        Ok(Self {
            socket,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        })
    }

    async fn exchange(&mut self, frame: &Frame) -> Result<Frame, ConnectionError> {
        let mut out = BytesMut::new();
        frame.encode(&mut out);
        self.socket.write_all(&out).await?;
        self.socket.flush().await?;

        loop {
            let mut cursor = Cursor::new(&self.buffer[..]);
            match Frame::check(&mut cursor) {
                Ok(()) => {
                    let len = cursor.position() as usize;
                    cursor.set_position(0);
                    let reply = Frame::parse(&mut cursor)?;
                    self.buffer.advance(len);
                    return Ok(reply);
                }
                Err(ProtocolError::Incomplete) => {}
                Err(e) => return Err(e.into()),
            }

            if self.buffer.len() > MAX_FRAME_SIZE {
                return Err(ProtocolError::FrameTooLarge(self.buffer.len()).into());
            }

            if self.socket.read_buf(&mut self.buffer).await? == 0 {
                return Err(ConnectionError::ConnectionReset);
            }
        }
    }
}

fn unexpected(frame: Frame) -> StoreError {
    match frame {
        Frame::Error(msg) => StoreError::Server(msg),
        other => StoreError::UnexpectedReply(format!("{other:?}")),
    }
}

fn key_reply(frame: Frame) -> Result<String, StoreError> {
    if let Some(key) = frame.as_text().filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    Err(unexpected(frame))
}

fn intent_reply(frame: Frame) -> Result<Option<Intent>, StoreError> {
    if frame == Frame::Null {
        return Ok(None);
    }
    if let Some(Ok(intent)) = frame.as_text().map(str::parse::<Intent>) {
        return Ok(Some(intent));
    }
    Err(unexpected(frame))
}

fn count_reply(frame: Frame) -> Result<usize, StoreError> {
    match frame {
        Frame::Integer(n) if n >= 0 => Ok(n as usize),
        other => Err(unexpected(other)),
    }
}
