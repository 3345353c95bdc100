use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{self, ErrorKind};
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::warn;

use crate::error::ScoutError;

/// Appends `rows` to the CSV at `path`, writing `header` first if the file is new or empty.
///
/// Existing content is never rewritten. With no rows this only makes sure the file exists.
/// A file left mid-row by an interrupted write gets a line break first, so new rows stay whole.
pub(crate) async fn append_rows<T: Serialize>(
    path: &Path,
    header: &[&str],
    rows: &[T],
) -> Result<usize, ScoutError> {
    let has_content = match fs::metadata(path).await {
        Ok(meta) => meta.len() > 0,
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => return Err(e.into()),
    };
    if has_content && rows.is_empty() {
        return Ok(0);
    }

    let mut buf = Vec::new();
    if has_content && !ends_with_newline(path).await? {
        buf.push(b'\n');
    }
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(buf);
    if !has_content {
        writer.write_record(header)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ScoutError::IoError(e.into_error()))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    Ok(rows.len())
}

async fn ends_with_newline(path: &Path) -> Result<bool, ScoutError> {
    let mut file = File::open(path).await?;
    file.seek(SeekFrom::End(-1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] == b'\n')
}

/// Non-blank, trimmed values of one named column, in file order.
pub(crate) async fn read_column(path: &Path, column: &str) -> Result<Vec<String>, ScoutError> {
    let bytes = fs::read(path).await?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes.as_slice());
    let index = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| {
            io::Error::new(
                ErrorKind::InvalidData,
                format!("{} has no `{column}` column", path.display()),
            )
        })?;

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(value) = record.get(index).map(str::trim).filter(|v| !v.is_empty()) {
            values.push(value.to_string());
        }
    }
    Ok(values)
}

/// Every row of `path` decoded by header name; a missing file reads as empty.
///
/// Rows that fail to decode (say, one cut short by a crash) are logged and skipped.
pub(crate) async fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ScoutError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes.as_slice());

    let mut rows = Vec::new();
    for row in reader.deserialize::<T>() {
        match row {
            Ok(row) => rows.push(row),
            Err(e) => warn!(
                path = %path.display(),
                line = ?e.position().map(csv::Position::line),
                error = %e,
                "Skipping undecodable CSV row"
            ),
        }
    }
    Ok(rows)
}
