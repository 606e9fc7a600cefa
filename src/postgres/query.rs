use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use tokio_postgres::GenericClient;
use tokio_postgres::types::{FromSql, ToSql, Type};

use super::params::Params;
use crate::error::PgMapperError;
use crate::query::{ByteRow, concat_byte_rows};
use crate::results::ResultSet;
use crate::types::RowValues;

/// Extracts a `RowValues` from a `tokio_postgres` Row at the given index.
///
/// # Errors
/// Returns `PgMapperError::DecodeError` if the column cannot be read as the
/// Rust type matching its Postgres type, or if the type has no `RowValues`
/// mapping (`numeric`, `uuid`, arrays, ...). Cast those in SQL.
pub fn postgres_extract_value(
    row: &tokio_postgres::Row,
    idx: usize,
) -> Result<RowValues, PgMapperError> {
    let decode = |e: tokio_postgres::Error| {
        PgMapperError::DecodeError(format!("column {idx}: {e}"))
    };
    let type_info = row.columns()[idx].type_();

    let value = match *type_info {
        Type::INT2 => row
            .try_get::<_, Option<i16>>(idx)
            .map_err(decode)?
            .map(|v| RowValues::Int(i64::from(v))),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(idx)
            .map_err(decode)?
            .map(|v| RowValues::Int(i64::from(v))),
        Type::INT8 => row
            .try_get::<_, Option<i64>>(idx)
            .map_err(decode)?
            .map(RowValues::Int),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)
            .map_err(decode)?
            .map(|v| RowValues::Float(f64::from(v))),
        Type::FLOAT8 => row
            .try_get::<_, Option<f64>>(idx)
            .map_err(decode)?
            .map(RowValues::Float),
        Type::BOOL => row
            .try_get::<_, Option<bool>>(idx)
            .map_err(decode)?
            .map(RowValues::Bool),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)
            .map_err(decode)?
            .map(RowValues::Timestamp),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)
            .map_err(decode)?
            .map(|v| RowValues::Timestamp(v.naive_utc())),
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(idx)
            .map_err(decode)?
            .map(|v| RowValues::Timestamp(v.and_time(NaiveTime::MIN))),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<Value>>(idx)
            .map_err(decode)?
            .map(RowValues::JSON),
        Type::BYTEA => row
            .try_get::<_, Option<Vec<u8>>>(idx)
            .map_err(decode)?
            .map(RowValues::Blob),
        ref ty if <String as FromSql>::accepts(ty) => row
            .try_get::<_, Option<String>>(idx)
            .map_err(decode)?
            .map(RowValues::Text),
        ref ty => {
            return Err(PgMapperError::DecodeError(format!(
                "column {idx}: unsupported postgres type {ty}"
            )));
        }
    };

    Ok(value.unwrap_or(RowValues::Null))
}

/// Build a result set from raw Postgres rows.
///
/// # Errors
/// Returns errors from row value extraction.
pub fn build_result_set_from_rows(
    rows: &[tokio_postgres::Row],
) -> Result<ResultSet, PgMapperError> {
    let mut result_set = ResultSet::with_capacity(rows.len());
    if let Some(row) = rows.first() {
        let cols: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
        result_set.set_column_names(Arc::new(cols));
    }

    for row in rows {
        let col_count = row.columns().len();
        let mut row_values = Vec::with_capacity(col_count);
        for idx in 0..col_count {
            row_values.push(postgres_extract_value(row, idx)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

impl ByteRow for tokio_postgres::Row {
    fn byte_column(&self) -> Result<Option<Vec<u8>>, PgMapperError> {
        if self.len() != 1 {
            return Err(PgMapperError::DecodeError(format!(
                "expected exactly one bytea column, row has {}",
                self.len()
            )));
        }
        self.try_get::<_, Option<Vec<u8>>>(0)
            .map_err(|e| PgMapperError::DecodeError(e.to_string()))
    }
}

/// Execute a DML statement on a client or transaction.
///
/// # Errors
/// Returns driver errors from execution.
pub async fn execute_on<C>(
    client: &C,
    query: &str,
    params: &[RowValues],
) -> Result<u64, PgMapperError>
where
    C: GenericClient + Sync,
{
    let converted = Params::convert(params);
    Ok(client.execute(query, converted.as_refs()).await?)
}

/// Execute a SELECT on a client or transaction and decode every row.
///
/// # Errors
/// Returns driver errors from execution or decode errors from extraction.
pub async fn query_on<C>(
    client: &C,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, PgMapperError>
where
    C: GenericClient + Sync,
{
    let converted = Params::convert(params);
    let rows = client.query(query, converted.as_refs()).await?;
    build_result_set_from_rows(&rows)
}

/// Stream a query's rows and concatenate their single `bytea` column.
///
/// # Errors
/// Returns driver errors from execution or decode errors from any row.
pub async fn query_bytes_on<C>(
    client: &C,
    query: &str,
    params: &[RowValues],
) -> Result<Vec<u8>, PgMapperError>
where
    C: GenericClient + Sync,
{
    let refs = params.iter().map(|p| p as &(dyn ToSql + Sync));
    let rows = client.query_raw(query, refs).await?;
    concat_byte_rows(rows).await
}
