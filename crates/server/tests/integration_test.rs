use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::Duration;
use url::Url;

use ephemera_client::RemoteStore;
use ephemera_common::{Intent, StoreConfig, StoreError};
use ephemera_protocol::Frame;
use ephemera_storage::{StateBackend, StateStore, authorize_redirect, resolve_callback};

async fn start_server(config: StoreConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let store = StateStore::new(config).unwrap();

    tokio::spawn(ephemera_server::serve(
        listener,
        store,
        64,
        std::future::pending(),
    ));
    addr
}

async fn client(addr: SocketAddr) -> RemoteStore {
    RemoteStore::connect(addr.to_string()).await.unwrap()
}

/// Manda `payload` cru e espera o servidor fechar a conexão sem responder.
async fn assert_dropped_by_server(addr: SocketAddr, payload: Vec<u8>) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut reader, mut writer) = stream.into_split();

    // O servidor pode fechar no meio da escrita.
    let writer = tokio::spawn(async move {
        let _ = writer.write_all(&payload).await;
        writer
    });

    let mut buf = [0u8; 64];
    let read = tokio::time::timeout(Duration::from_secs(5), reader.read(&mut buf))
        .await
        .expect("servidor não fechou a conexão");
    assert!(matches!(read, Ok(0) | Err(_)), "resposta inesperada: {read:?}");

    writer.abort();
}

#[tokio::test]
async fn test_ping_pong() {
    let addr = start_server(StoreConfig::default()).await;
    let remote = client(addr).await;

    remote.ping().await.unwrap();
    let reply = remote
        .send(&Frame::array_from_strs(&["PING", "hello"]))
        .await
        .unwrap();
    assert_eq!(reply, Frame::bulk("hello"));
}

#[tokio::test]
async fn test_create_consume_once() {
    let addr = start_server(StoreConfig::default()).await;
    let remote = client(addr).await;

    let key = remote.create(Intent::Employer).await.unwrap();
    assert_eq!(remote.count().await.unwrap(), 1);

    assert_eq!(remote.consume(&key).await.unwrap(), Some(Intent::Employer));
    assert_eq!(remote.consume(&key).await.unwrap(), None);
    assert_eq!(remote.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_consume_unknown_key() {
    let addr = start_server(StoreConfig::default()).await;
    let remote = client(addr).await;

    remote.create(Intent::JobSeeker).await.unwrap();
    assert_eq!(remote.consume("nonexistent").await.unwrap(), None);
    assert_eq!(remote.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_expired_state_is_absent() {
    let config = StoreConfig::with_ttl(Duration::from_millis(100)).unwrap();
    let addr = start_server(config).await;
    let remote = client(addr).await;

    assert_eq!(remote.ttl().await.unwrap(), Duration::from_millis(100));

    let key = remote.create(Intent::JobSeeker).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(remote.consume(&key).await.unwrap(), None);
    assert_eq!(remote.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_consume_across_connections() {
    let addr = start_server(StoreConfig::default()).await;
    let producer = client(addr).await;
    let key = producer.create(Intent::Employer).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let remote = client(addr).await;
        let key = key.clone();
        handles.push(tokio::spawn(async move { remote.consume(&key).await }));
    }

    let mut delivered = 0;
    for h in handles {
        if let Some(intent) = h.await.unwrap().unwrap() {
            assert_eq!(intent, Intent::Employer);
            delivered += 1;
        }
    }
    assert_eq!(delivered, 1);
}

#[tokio::test]
async fn test_redirect_between_instances() {
    // Duas instâncias da aplicação compartilhando o mesmo servidor.
    let addr = start_server(StoreConfig::default()).await;
    let instance_a = client(addr).await;
    let instance_b = client(addr).await;

    let authorize = Url::parse("https://id.example.com/authorize?client_id=jobs").unwrap();
    let redirect = authorize_redirect(&instance_a, Intent::JobSeeker, &authorize)
        .await
        .unwrap();

    let state = redirect
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    let callback =
        Url::parse(&format!("https://jobs.example.com/callback?code=1&state={state}")).unwrap();

    assert_eq!(
        resolve_callback(&instance_b, &callback).await.unwrap(),
        Some(Intent::JobSeeker)
    );
    assert_eq!(resolve_callback(&instance_a, &callback).await.unwrap(), None);
}

#[tokio::test]
async fn test_unknown_command_keeps_connection() {
    let addr = start_server(StoreConfig::default()).await;
    let remote = client(addr).await;

    let reply = remote
        .send(&Frame::array_from_strs(&["FOOBAR"]))
        .await
        .unwrap();
    match reply {
        Frame::Error(msg) => assert!(msg.contains("unknown command")),
        other => panic!("expected error frame, got {other:?}"),
    }

    remote.ping().await.unwrap();
}

#[tokio::test]
async fn test_invalid_intent_reply() {
    let addr = start_server(StoreConfig::default()).await;
    let remote = client(addr).await;

    let reply = remote
        .send(&Frame::array_from_strs(&["CREATE", "recruiter"]))
        .await
        .unwrap();
    match reply {
        Frame::Error(msg) => assert!(msg.starts_with("ERR"), "{msg}"),
        other => panic!("expected error frame, got {other:?}"),
    }
    assert_eq!(remote.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_server_gone_is_fault() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let store = StateStore::<Intent>::default();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(ephemera_server::serve(listener, store, 8, async {
        let _ = stop_rx.await;
    }));

    let remote = client(addr).await;
    let key = remote.create(Intent::Employer).await.unwrap();

    stop_tx.send(()).unwrap();
    server.await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err: StoreError = remote.consume(&key).await.unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_oversized_request_drops_connection() {
    let addr = start_server(StoreConfig::default()).await;

    // Cada bulk cabe no limite, o array inteiro não.
    let bulk = format!("$60000\r\n{}\r\n", "a".repeat(60_000));
    let payload = format!("*4\r\n{}", bulk.repeat(4)).into_bytes();
    assert_dropped_by_server(addr, payload).await;

    let remote = client(addr).await;
    remote.ping().await.unwrap();
}

#[tokio::test]
async fn test_deeply_nested_request_drops_connection() {
    let addr = start_server(StoreConfig::default()).await;

    let payload = "*1\r\n".repeat(100_000).into_bytes();
    assert_dropped_by_server(addr, payload).await;

    let remote = client(addr).await;
    let key = remote.create(Intent::JobSeeker).await.unwrap();
    assert_eq!(remote.consume(&key).await.unwrap(), Some(Intent::JobSeeker));
}
