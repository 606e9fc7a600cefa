use futures_util::{Stream, TryStreamExt};

use crate::error::PgMapperError;

/// A row that carries exactly one byte-sequence column.
pub trait ByteRow {
    /// Decode the row's single column. `None` means SQL `NULL`.
    ///
    /// # Errors
    /// Returns `PgMapperError::DecodeError` if the row does not have exactly one
    /// column or the column is not a byte sequence.
    fn byte_column(&self) -> Result<Option<Vec<u8>>, PgMapperError>;
}

/// Drain `rows`, appending each row's byte column to one buffer in row order.
///
/// The stream is owned by this call and dropped on every return path, so the
/// underlying cursor is released on success, decode failure, and query failure
/// alike. `NULL` columns contribute nothing; zero rows yields an empty buffer.
///
/// # Errors
/// Returns the first stream error or `PgMapperError::DecodeError` for the first
/// row that cannot be decoded.
pub async fn concat_byte_rows<S, R, E>(rows: S) -> Result<Vec<u8>, PgMapperError>
where
    S: Stream<Item = Result<R, E>>,
    R: ByteRow,
    E: Into<PgMapperError>,
{
    let mut rows = std::pin::pin!(rows);
    let mut buffer = Vec::new();

    while let Some(row) = rows.try_next().await.map_err(Into::<PgMapperError>::into)? {
        if let Some(bytes) = row.byte_column()? {
            buffer.extend_from_slice(&bytes);
        }
    }

    Ok(buffer)
}
