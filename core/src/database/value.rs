use std::fmt;

/// Raw SQL text which is emitted into statements exactly as given, never escaped.
///
/// The caller is responsible for making sure the fragment is safe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlFragment(String);

impl SqlFragment {
    pub fn new(sql: impl Into<String>) -> Self {
        SqlFragment(sql.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SqlFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single scalar value passed to or returned from the database.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Raw(SqlFragment),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Coerces the value into a non-negative row estimate the way a plan's `rows` column is read:
    /// negatives become 0, floats are truncated, text is read up to its first non-digit and
    /// anything else (including `NULL`) counts as 0.
    pub fn as_row_estimate(&self) -> u64 {
        match self {
            SqlValue::Null => 0,
            SqlValue::Bool(value) => *value as u64,
            SqlValue::Int(value) => (*value).max(0) as u64,
            SqlValue::UInt(value) => *value,
            // `as` saturates and maps NaN to 0
            SqlValue::Float(value) => *value as u64,
            SqlValue::Text(value) => leading_integer(value),
            SqlValue::Raw(fragment) => leading_integer(fragment.as_str()),
        }
    }
}

fn leading_integer(text: &str) -> u64 {
    let trimmed = text.trim_start();
    if trimmed.starts_with('-') {
        return 0;
    }
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    if end == 0 {
        return 0;
    }
    digits[..end].parse::<u64>().unwrap_or(u64::MAX)
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for SqlValue {
            fn from(value: $ty) -> Self {
                SqlValue::Int(value as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for SqlValue {
            fn from(value: $ty) -> Self {
                SqlValue::UInt(value as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<f32> for SqlValue {
    fn from(value: f32) -> Self {
        SqlValue::Float(value as f64)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<SqlFragment> for SqlValue {
    fn from(value: SqlFragment) -> Self {
        SqlValue::Raw(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => SqlValue::Null,
        }
    }
}

/// One row of a result set, keeping the column order the database returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    columns: Vec<(String, SqlValue)>,
}

impl ResultRow {
    pub fn new(columns: Vec<(String, SqlValue)>) -> Self {
        ResultRow { columns }
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns.iter().find(|(name, _)| name == column).map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for ResultRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ResultRow::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
