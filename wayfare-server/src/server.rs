use crate::router;
use crate::state::AppState;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast;
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};
use wayfare_core::ipc::{AssistantRequest, AssistantResponse};

/// Unix-socket IPC server: 4-byte little-endian length prefix + MessagePack.
pub async fn run_unix_server(
    socket_path: &str,
    state: Arc<AppState>,
    mut shutdown: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    if Path::new(socket_path).exists() {
        std::fs::remove_file(socket_path)?;
    }

    let listener = UnixListener::bind(socket_path)?;
    tracing::info!("IPC Server listening on {}", socket_path);

    loop {
        tokio::select! {
            res = listener.accept() => {
                let (stream, _) = res?;
                let state = state.clone();
                tokio::spawn(async move {
                    serve_connection(stream, state).await;
                });
            }
            _ = shutdown.recv() => {
                tracing::info!("Shutting down IPC server...");
                break;
            }
        }
    }

    if Path::new(socket_path).exists() {
        std::fs::remove_file(socket_path)?;
    }

    Ok(())
}

async fn serve_connection(stream: UnixStream, state: Arc<AppState>) {
    let (read, write) = stream.into_split();
    let le_codec = || LengthDelimitedCodec::builder().little_endian().new_codec();
    let mut framed_read = FramedRead::new(read, le_codec());
    let mut framed_write = FramedWrite::new(write, le_codec());

    while let Some(frame) = framed_read.next().await {
        let bytes_mut = match frame {
            Ok(b) => b,
            Err(e) => {
                tracing::error!("Frame error: {}", e);
                break;
            }
        };

        let response = match rmp_serde::from_slice::<AssistantRequest>(&bytes_mut) {
            Ok(request) => router::handle_request(request, &state).await,
            Err(e) => AssistantResponse::err(format!("Deserialization error: {}", e)),
        };

        match rmp_serde::to_vec_named(&response) {
            Ok(resp_bytes) => {
                if let Err(e) = framed_write.send(Bytes::from(resp_bytes)).await {
                    tracing::error!("Failed to send response: {}", e);
                    break;
                }
            }
            Err(e) => {
                tracing::error!("Failed to serialize response: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfare_core::WayfareConfig;

    fn state() -> Arc<AppState> {
        let config: WayfareConfig = serde_json::from_value(serde_json::json!({
            "service": {"socket_path": "unused", "log_level": "info"},
            "database": {"url": "postgresql://localhost/wayfare", "max_connections": 1},
            "storage": {"backend": "memory"}
        }))
        .unwrap();
        Arc::new(AppState::in_memory(config, Vec::new()))
    }

    async fn roundtrip(
        socket: &str,
        payload: Vec<u8>,
    ) -> AssistantResponse {
        let stream = UnixStream::connect(socket).await.unwrap();
        let (read, write) = stream.into_split();
        let codec = || LengthDelimitedCodec::builder().little_endian().new_codec();
        let mut tx = FramedWrite::new(write, codec());
        let mut rx = FramedRead::new(read, codec());
        tx.send(Bytes::from(payload)).await.unwrap();
        let frame = rx.next().await.unwrap().unwrap();
        rmp_serde::from_slice(&frame).unwrap()
    }

    #[tokio::test]
    async fn test_ipc_ping_and_bad_frame() {
        let socket = std::env::temp_dir()
            .join(format!("wayfare-{}.sock", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .to_string();
        let (tx, _) = broadcast::channel(1);
        let server = tokio::spawn({
            let socket = socket.clone();
            let shutdown = tx.subscribe();
            async move { run_unix_server(&socket, state(), shutdown).await }
        });

        // Wait for the listener to bind.
        for _ in 0..50 {
            if Path::new(&socket).exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let ping = rmp_serde::to_vec_named(&AssistantRequest::Ping).unwrap();
        let resp = roundtrip(&socket, ping).await;
        assert!(resp.is_ok());

        let resp = roundtrip(&socket, vec![0xc1]).await;
        assert!(resp.error.unwrap().starts_with("Deserialization error"));

        tx.send(()).unwrap();
        server.await.unwrap().unwrap();
        assert!(!Path::new(&socket).exists());
    }
}
