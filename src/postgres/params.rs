use std::error::Error;

use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::types::RowValues;

/// Container for Postgres parameters with lifetime tracking
pub struct Params<'a> {
    references: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Params<'a> {
    /// Borrow a slice of `RowValues` as driver parameters
    #[must_use]
    pub fn convert(params: &'a [RowValues]) -> Params<'a> {
        let mut references = Vec::with_capacity(params.len());
        for p in params {
            references.push(p as &(dyn ToSql + Sync));
        }
        Params { references }
    }

    /// Get a reference to the underlying parameter array
    #[must_use]
    pub fn as_refs(&self) -> &[&(dyn ToSql + Sync)] {
        &self.references
    }
}

impl ToSql for RowValues {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            RowValues::Int(i) => match *ty {
                // Postgres will not coerce an int8 parameter into a narrower column
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                _ => (*i).to_sql(ty, out),
            },
            RowValues::Float(f) => match *ty {
                #[allow(clippy::cast_possible_truncation)]
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                _ => (*f).to_sql(ty, out),
            },
            RowValues::Text(s) => s.to_sql(ty, out),
            RowValues::Bool(b) => (*b).to_sql(ty, out),
            RowValues::Timestamp(dt) => match *ty {
                // naive values are taken as UTC
                Type::TIMESTAMPTZ => dt.and_utc().to_sql(ty, out),
                Type::DATE => dt.date().to_sql(ty, out),
                _ => dt.to_sql(ty, out),
            },
            RowValues::Null => Ok(IsNull::Yes),
            RowValues::JSON(jsval) => jsval.to_sql(ty, out),
            RowValues::Blob(bytes) => bytes.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::TEXT
                | Type::VARCHAR
                | Type::BPCHAR
                | Type::CHAR
                | Type::NAME
                | Type::BOOL
                | Type::TIMESTAMP
                | Type::TIMESTAMPTZ
                | Type::DATE
                | Type::JSON
                | Type::JSONB
                | Type::BYTEA
        )
    }

    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 29)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    fn encode(value: &RowValues, ty: &Type) -> Vec<u8> {
        let mut out = bytes::BytesMut::new();
        value.to_sql_checked(ty, &mut out).unwrap();
        out.to_vec()
    }

    #[test]
    fn timestamp_binds_to_zoned_and_date_columns() {
        let ts = RowValues::Timestamp(noon());

        for ty in [Type::TIMESTAMP, Type::TIMESTAMPTZ, Type::DATE] {
            assert!(<RowValues as ToSql>::accepts(&ty), "{ty} rejected");
        }
        // both timestamp flavours share the microseconds-since-2000 encoding
        assert_eq!(encode(&ts, &Type::TIMESTAMPTZ), encode(&ts, &Type::TIMESTAMP));
        assert_eq!(
            encode(&ts, &Type::DATE),
            encode(&RowValues::Timestamp(noon().date().and_hms_opt(0, 0, 0).unwrap()), &Type::DATE)
        );
        assert_eq!(encode(&ts, &Type::DATE).len(), 4);
    }

    #[test]
    fn char_column_is_accepted() {
        assert!(<RowValues as ToSql>::accepts(&Type::CHAR));
    }

    #[test]
    fn int_narrows_to_column_width() {
        assert_eq!(encode(&RowValues::Int(7), &Type::INT2), 7_i16.to_be_bytes());
        assert_eq!(encode(&RowValues::Int(7), &Type::INT4), 7_i32.to_be_bytes());

        let mut out = bytes::BytesMut::new();
        assert!(RowValues::Int(i64::from(i16::MAX) + 1)
            .to_sql_checked(&Type::INT2, &mut out)
            .is_err());
    }

    #[test]
    fn uuid_is_rejected() {
        assert!(!<RowValues as ToSql>::accepts(&Type::UUID));
    }
}
