//! Stdio transport: one JSON-RPC message per line in, one response per line out.
//!
//! Each message is handled on its own task, so responses may come back out of
//! order. Logging must not go to stdout while this transport runs.

use crate::server::McpServer;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Serve on the process's stdin and stdout until stdin closes.
pub async fn serve_stdio(server: McpServer) -> io::Result<()> {
    info!(
        tools = server.list_tools().len(),
        configured = server.is_configured(),
        "Stdio transport ready"
    );
    serve_lines(server, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    info!("Stdin closed, shutting down");
    Ok(())
}

/// Serve line-delimited messages from `reader`, writing responses to `writer`.
///
/// Returns the writer once input is exhausted and every response is flushed.
pub async fn serve_lines<R, W>(server: McpServer, reader: R, writer: W) -> io::Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(line) = rx.recv().await {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<W, io::Error>(writer)
    });

    let mut in_flight = JoinSet::new();
    let mut reader = reader;
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer).await? == 0 {
            break;
        }

        // Invalid UTF-8 is answered with a parse error instead of ending the session.
        let line = String::from_utf8_lossy(&buffer).trim().to_string();
        if line.is_empty() {
            continue;
        }

        let server = server.clone();
        let tx = tx.clone();
        in_flight.spawn(async move {
            let response = match server.handle_message(&line).await {
                Some(response) => response,
                None => return,
            };
            match serde_json::to_string(&response) {
                Ok(encoded) => {
                    if tx.send(encoded).is_err() {
                        debug!("Output closed before response was written");
                    }
                }
                Err(e) => error!(error = %e, "Failed to encode response"),
            }
        });
    }

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "Message task failed");
        }
    }
    drop(tx);

    writer_task
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}
