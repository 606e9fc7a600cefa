use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Values that can be stored in a database row or used as query parameters.
///
/// ```rust
/// use pg_mapper::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

macro_rules! row_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for RowValues {
                fn from(value: $ty) -> Self {
                    RowValues::$variant(value.into())
                }
            }
        )*
    };
}

row_value_from! {
    i64 => Int,
    i32 => Int,
    i16 => Int,
    f64 => Float,
    bool => Bool,
    String => Text,
    &str => Text,
    NaiveDateTime => Timestamp,
    JsonValue => JSON,
    Vec<u8> => Blob,
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// One argument handed to the parameter preparer.
///
/// The caller decides at the call site whether a value binds a single
/// placeholder or expands into one placeholder per element:
/// ```rust
/// use pg_mapper::prelude::*;
///
/// let args: Vec<SqlArg> = vec![42_i64.into(), vec!["a", "b"].into()];
/// assert!(matches!(args[1], SqlArg::List(ref items) if items.len() == 2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    /// Binds exactly one placeholder.
    Scalar(RowValues),
    /// Binds one placeholder per element, in iteration order.
    List(Vec<RowValues>),
}

impl SqlArg {
    /// Build a list argument from any iterator of convertible values.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RowValues>,
    {
        SqlArg::List(items.into_iter().map(Into::into).collect())
    }

    /// Number of placeholders this argument will consume.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        match self {
            SqlArg::Scalar(_) => 1,
            SqlArg::List(items) => items.len(),
        }
    }
}

macro_rules! scalar_arg_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for SqlArg {
                fn from(value: $ty) -> Self {
                    SqlArg::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_arg_from!(RowValues, i64, i32, i16, f64, bool, String, &str, NaiveDateTime, JsonValue);

impl<T: Into<RowValues>> From<Vec<T>> for SqlArg {
    fn from(items: Vec<T>) -> Self {
        SqlArg::list(items)
    }
}

impl<T: Clone + Into<RowValues>> From<&[T]> for SqlArg {
    fn from(items: &[T]) -> Self {
        SqlArg::list(items.iter().cloned())
    }
}

/// A SQL template and its preparer arguments bundled together.
///
/// ```rust
/// use pg_mapper::prelude::*;
///
/// let qa = QueryAndArgs::new(
///     "DELETE FROM t WHERE id IN (%s)",
///     vec![SqlArg::list([1_i64, 2, 3])],
/// );
/// assert_eq!(qa.prepare().statement, "DELETE FROM t WHERE id IN ($1,$2,$3)");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAndArgs {
    /// The SQL template containing a `%s` substitution point
    pub query: String,
    /// The arguments substituted into the template
    pub args: Vec<SqlArg>,
}

impl QueryAndArgs {
    pub fn new(query: impl Into<String>, args: Vec<SqlArg>) -> Self {
        Self {
            query: query.into(),
            args,
        }
    }

    pub fn new_without_args(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            args: Vec::new(),
        }
    }

    /// Run the parameter preparer over this template.
    #[must_use]
    pub fn prepare(&self) -> crate::prepare::Prepared {
        crate::prepare::prepare(&self.query, &self.args)
    }
}
