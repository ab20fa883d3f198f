//! Newline-delimited input reading and fixed-size chunking.

use std::path::Path;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use contracts::{Batch, Event};

use crate::error::{CliError, Result};

/// Read one event per non-blank line from a file, or stdin for `None` / `-`
pub async fn read_events(path: Option<&Path>) -> Result<Vec<Event>> {
    match path {
        Some(p) if p != Path::new("-") => {
            let name = p.display().to_string();
            let file = tokio::fs::File::open(p)
                .await
                .map_err(|e| CliError::input_read(&name, e))?;
            read_lines(BufReader::new(file))
                .await
                .map_err(|e| CliError::input_read(name, e))
        }
        _ => read_lines(BufReader::new(tokio::io::stdin()))
            .await
            .map_err(|e| CliError::input_read("stdin", e)),
    }
}

async fn read_lines<R: AsyncBufRead + Unpin>(reader: R) -> std::io::Result<Vec<Event>> {
    let mut lines = reader.lines();
    let mut events = Vec::new();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        events.push(Event::new(line.to_owned()));
    }

    Ok(events)
}

/// Split events into batches of at most `batch_size`, keeping order
pub fn into_batches(events: Vec<Event>, batch_size: usize) -> Vec<Batch> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::with_capacity(events.len().div_ceil(batch_size));
    let mut iter = events.into_iter().peekable();

    while iter.peek().is_some() {
        batches.push(iter.by_ref().take(batch_size).collect());
    }

    batches
}
