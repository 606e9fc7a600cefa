use futures_util::stream;
use pg_mapper::{ByteRow, PgMapperError, concat_byte_rows};

enum FakeRow {
    Bytes(&'static [u8]),
    Null,
    TwoColumns,
}

impl ByteRow for FakeRow {
    fn byte_column(&self) -> Result<Option<Vec<u8>>, PgMapperError> {
        match self {
            FakeRow::Bytes(b) => Ok(Some(b.to_vec())),
            FakeRow::Null => Ok(None),
            FakeRow::TwoColumns => Err(PgMapperError::DecodeError(
                "expected exactly one bytea column, row has 2".into(),
            )),
        }
    }
}

fn rows(items: Vec<Result<FakeRow, PgMapperError>>) -> impl futures_util::Stream<Item = Result<FakeRow, PgMapperError>> {
    stream::iter(items)
}

#[tokio::test]
async fn zero_rows_is_an_empty_buffer() -> Result<(), PgMapperError> {
    let bytes = concat_byte_rows(rows(vec![])).await?;
    assert!(bytes.is_empty());
    Ok(())
}

#[tokio::test]
async fn rows_concatenate_in_order() -> Result<(), PgMapperError> {
    let bytes = concat_byte_rows(rows(vec![
        Ok(FakeRow::Bytes(b"ab")),
        Ok(FakeRow::Bytes(b"cd")),
    ]))
    .await?;
    assert_eq!(bytes, b"abcd");
    Ok(())
}

#[tokio::test]
async fn null_column_contributes_nothing() -> Result<(), PgMapperError> {
    let bytes = concat_byte_rows(rows(vec![
        Ok(FakeRow::Bytes(b"{")),
        Ok(FakeRow::Null),
        Ok(FakeRow::Bytes(b"}")),
    ]))
    .await?;
    assert_eq!(bytes, b"{}");
    Ok(())
}

#[tokio::test]
async fn decode_error_stops_accumulation() {
    let err = concat_byte_rows(rows(vec![
        Ok(FakeRow::Bytes(b"ab")),
        Ok(FakeRow::TwoColumns),
        Ok(FakeRow::Bytes(b"cd")),
    ]))
    .await
    .unwrap_err();
    assert!(matches!(err, PgMapperError::DecodeError(_)));
}

#[tokio::test]
async fn stream_error_is_propagated() {
    let err = concat_byte_rows(rows(vec![
        Ok(FakeRow::Bytes(b"ab")),
        Err(PgMapperError::ConnectionError("cursor lost".into())),
    ]))
    .await
    .unwrap_err();
    assert!(matches!(err, PgMapperError::ConnectionError(ref msg) if msg == "cursor lost"));
}

struct DropFlag(std::sync::Arc<std::sync::atomic::AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

#[tokio::test]
async fn row_stream_is_released_on_decode_error() {
    use futures_util::StreamExt;

    let released = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let guard = DropFlag(released.clone());
    let cursor = rows(vec![Ok(FakeRow::TwoColumns), Ok(FakeRow::Bytes(b"never"))]).map(move |row| {
        let _held = &guard;
        row
    });

    let result = concat_byte_rows(cursor).await;

    assert!(result.is_err());
    assert!(released.load(std::sync::atomic::Ordering::SeqCst));
}
