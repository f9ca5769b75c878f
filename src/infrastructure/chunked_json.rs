// Chunked JSON streaming utilities
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::watch;

/// Create a chunked streaming response, one length-prefixed JSON document per item
pub fn chunked_json_stream<S, T>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let byte_stream = stream.then(move |msg| {
        let json = serde_json::to_vec(&msg).map_err(std::io::Error::other);
        async move { encode_chunk(json?, compress).await }
    });

    let body = Body::from_stream(byte_stream);

    // Chunks are compressed individually, so no Content-Encoding header.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-loop-stream")
        .header(header::TRANSFER_ENCODING, "chunked")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Frame one JSON document: 4-byte big-endian length, then payload
pub async fn encode_chunk(json: Vec<u8>, compress: bool) -> std::io::Result<Bytes> {
    let payload = if compress {
        brotli_compress(json).await?
    } else {
        json
    };

    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(payload.len() as u32);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Stream the current value of `rx` and then every change to it
pub fn stream_from_watch<S, T, F>(
    mut rx: watch::Receiver<S>,
    project: F,
    compress: bool,
) -> impl IntoResponse
where
    S: Send + Sync + 'static,
    T: Serialize + Send + 'static,
    F: Fn(&S) -> T + Send + 'static,
{
    let stream = async_stream::stream! {
        loop {
            let item = {
                let current = rx.borrow_and_update();
                project(&current)
            };
            yield item;
            if rx.changed().await.is_err() {
                break;
            }
        }
    };

    match chunked_json_stream(stream, compress) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
