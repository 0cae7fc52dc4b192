//! Grouping rows by the value of a label column.

use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
};

use arrow::{
    array::{Array, ArrowPrimitiveType, BooleanArray, LargeStringArray, PrimitiveArray, StringArray},
    datatypes::{
        DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
        UInt32Type, UInt64Type, UInt8Type,
    },
};

use crate::error::{Error, Result};

/// A float label with a total order. `-0.0` and `0.0` compare equal.
#[derive(Debug, Clone, Copy)]
pub struct FloatKey(f64);

impl FloatKey {
    /// Wraps a non-NaN float.
    pub fn new(value: f64) -> Self {
        Self(if value == 0.0 { 0.0 } else { value })
    }

    /// Returns the wrapped value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for FloatKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatKey {}

impl PartialOrd for FloatKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for FloatKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// The value of a label column for one row.
///
/// Keys sort booleans first, then integers, floats and text, with
/// [`GroupKey::Missing`] last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    /// Boolean label.
    Boolean(bool),
    /// Any signed or unsigned integer label.
    Integer(i128),
    /// Floating point label (never NaN).
    Float(FloatKey),
    /// Text label.
    Text(String),
    /// Null, or NaN for float columns.
    Missing,
}

impl GroupKey {
    /// Returns true for the missing-value group.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Tagged byte encoding used to derive the group's sub-seed.
    pub fn seed_bytes(&self) -> Vec<u8> {
        match self {
            Self::Boolean(b) => vec![0, u8::from(*b)],
            Self::Integer(i) => {
                let mut bytes = vec![1];
                bytes.extend_from_slice(&i.to_le_bytes());
                bytes
            }
            Self::Float(f) => {
                let mut bytes = vec![2];
                bytes.extend_from_slice(&f.value().to_bits().to_le_bytes());
                bytes
            }
            Self::Text(s) => {
                let mut bytes = vec![3];
                bytes.extend_from_slice(s.as_bytes());
                bytes
            }
            Self::Missing => vec![4],
        }
    }

    fn from_float(value: f64) -> Self {
        if value.is_nan() {
            Self::Missing
        } else {
            Self::Float(FloatKey::new(value))
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x.value()),
            Self::Text(s) => write!(f, "{}", s),
            Self::Missing => write!(f, "{}", crate::arff::MISSING_MARKER),
        }
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Returns one key per row of a label column.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] for column types that cannot act as a
/// categorical key (lists, structs, binary, ...).
pub fn label_keys(array: &dyn Array) -> Result<Vec<GroupKey>> {
    match array.data_type() {
        DataType::Utf8 => {
            let arr = downcast::<StringArray>(array)?;
            Ok(arr
                .iter()
                .map(|v| v.map_or(GroupKey::Missing, GroupKey::from))
                .collect())
        }
        DataType::LargeUtf8 => {
            let arr = downcast::<LargeStringArray>(array)?;
            Ok(arr
                .iter()
                .map(|v| v.map_or(GroupKey::Missing, GroupKey::from))
                .collect())
        }
        DataType::Boolean => {
            let arr = downcast::<BooleanArray>(array)?;
            Ok(arr
                .iter()
                .map(|v| v.map_or(GroupKey::Missing, GroupKey::Boolean))
                .collect())
        }
        DataType::Int8 => integer_keys::<Int8Type>(array),
        DataType::Int16 => integer_keys::<Int16Type>(array),
        DataType::Int32 => integer_keys::<Int32Type>(array),
        DataType::Int64 => integer_keys::<Int64Type>(array),
        DataType::UInt8 => integer_keys::<UInt8Type>(array),
        DataType::UInt16 => integer_keys::<UInt16Type>(array),
        DataType::UInt32 => integer_keys::<UInt32Type>(array),
        DataType::UInt64 => integer_keys::<UInt64Type>(array),
        DataType::Float32 => float_keys::<Float32Type>(array),
        DataType::Float64 => float_keys::<Float64Type>(array),
        dt => Err(Error::invalid_config(format!(
            "Unsupported label type for stratification: {dt:?}"
        ))),
    }
}

/// Groups row indices by key. Each group lists its rows in ascending order;
/// the map iterates groups in key order.
pub fn group_rows(keys: &[GroupKey]) -> BTreeMap<GroupKey, Vec<usize>> {
    let mut groups: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
    for (row, key) in keys.iter().enumerate() {
        match groups.get_mut(key) {
            Some(rows) => rows.push(row),
            None => {
                groups.insert(key.clone(), vec![row]);
            }
        }
    }
    groups
}

fn downcast<T: 'static>(array: &dyn Array) -> Result<&T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::invalid_config(format!("Failed to downcast {}", array.data_type())))
}

fn integer_keys<T>(array: &dyn Array) -> Result<Vec<GroupKey>>
where
    T: ArrowPrimitiveType,
    T::Native: Into<i128>,
{
    let arr = downcast::<PrimitiveArray<T>>(array)?;
    Ok(arr
        .iter()
        .map(|v| v.map_or(GroupKey::Missing, |v| GroupKey::Integer(v.into())))
        .collect())
}

fn float_keys<T>(array: &dyn Array) -> Result<Vec<GroupKey>>
where
    T: ArrowPrimitiveType,
    T::Native: Into<f64>,
{
    let arr = downcast::<PrimitiveArray<T>>(array)?;
    Ok(arr
        .iter()
        .map(|v| v.map_or(GroupKey::Missing, |v| GroupKey::from_float(v.into())))
        .collect())
}
