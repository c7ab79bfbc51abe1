//! Typed values to [`Value`] trees.
//!
//! [`ToValue`] is implemented for scalars, strings, options, collections,
//! maps and smart pointers, and derived for structs and unit enums with
//! `#[derive(Shape)]`. Composite values register their address with the
//! [`ValueSerializer`] while their children are being visited, so a graph
//! that loops back on itself through `Rc`/`Arc` is reported instead of
//! recursing forever.

use std::any::type_name;
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use shapeguard_core::{BigDecimal, BigInt, Map, Number, Value};

use crate::error::SerializationError;

type Result<T> = std::result::Result<T, SerializationError>;

/// Types that convert into a [`Value`] tree.
pub trait ToValue {
    /// Convert `self`, registering composite values with `serializer`.
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value>;
}

/// Types usable as JSON object keys.
pub trait ToKey {
    /// Stringify the key.
    fn to_key(&self) -> Result<String>;
}

/// Drives one serialization and tracks the values currently being visited.
///
/// A value is identified by its address together with its type, so a struct
/// and its first field (which share an address) are never confused.
#[derive(Debug, Default)]
pub struct ValueSerializer {
    visiting: HashSet<(usize, &'static str)>,
}

impl ValueSerializer {
    /// Create a serializer with an empty visiting set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `value` into a fresh tree.
    ///
    /// ```rust
    /// use shapeguard_json::ValueSerializer;
    ///
    /// let tree = ValueSerializer::to_value_tree(&vec![Some(1), None]).unwrap();
    /// assert_eq!(tree.to_string(), "[1,null]");
    /// ```
    pub fn to_value_tree<T: ToValue + ?Sized>(value: &T) -> Result<Value> {
        value.to_value(&mut Self::new())
    }

    /// Visit a composite value, failing if it is already on the current path.
    ///
    /// `target` stays registered while `visit` runs and is released after,
    /// so siblings that share a value are fine.
    pub fn visit<T: ?Sized, F>(&mut self, target: &T, visit: F) -> Result<Value>
    where
        F: FnOnce(&mut Self) -> Result<Value>,
    {
        let key = (target as *const T as *const () as usize, type_name::<T>());
        if !self.visiting.insert(key) {
            return Err(SerializationError::cycle(short_type_name::<T>()));
        }
        let result = visit(self);
        self.visiting.remove(&key);
        result
    }

    /// Serialize an iterator of elements as an array, under `owner`'s visit.
    pub fn sequence<'v, O, T, I>(&mut self, owner: &O, items: I) -> Result<Value>
    where
        O: ?Sized,
        T: ToValue + 'v + ?Sized,
        I: IntoIterator<Item = &'v T>,
    {
        self.visit(owner, |ser| {
            items
                .into_iter()
                .map(|item| item.to_value(ser))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        })
    }

    /// Serialize key-value pairs as an object, under `owner`'s visit.
    pub fn mapping<'v, O, K, V, I>(&mut self, owner: &O, entries: I) -> Result<Value>
    where
        O: ?Sized,
        K: ToKey + 'v,
        V: ToValue + 'v,
        I: IntoIterator<Item = (&'v K, &'v V)>,
    {
        self.visit(owner, |ser| {
            let mut map = Map::new();
            for (key, value) in entries {
                map.insert(key.to_key()?, value.to_value(ser)?);
            }
            Ok(Value::Object(map))
        })
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or_default();
    base.rsplit("::").next().unwrap_or(base)
}

impl ToValue for Value {
    fn to_value(&self, _: &mut ValueSerializer) -> Result<Value> {
        Ok(self.clone())
    }
}

impl ToValue for bool {
    fn to_value(&self, _: &mut ValueSerializer) -> Result<Value> {
        Ok(Value::Bool(*self))
    }
}

impl ToValue for str {
    fn to_value(&self, _: &mut ValueSerializer) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }
}

impl ToValue for String {
    fn to_value(&self, _: &mut ValueSerializer) -> Result<Value> {
        Ok(Value::String(self.clone()))
    }
}

impl ToValue for Cow<'_, str> {
    fn to_value(&self, _: &mut ValueSerializer) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }
}

/// A `char` is a one-character string.
///
/// Collections of `char` (`Vec<char>`, `[char; N]`) serialize element by
/// element as arrays of one-character strings. Use `String` for text.
impl ToValue for char {
    fn to_value(&self, _: &mut ValueSerializer) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }
}

macro_rules! to_value_int {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self, _: &mut ValueSerializer) -> Result<Value> {
                    Ok(Value::Number(Number::from(*self)))
                }
            }

            impl ToKey for $ty {
                fn to_key(&self) -> Result<String> {
                    Ok(self.to_string())
                }
            }
        )*
    };
}

to_value_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl ToValue for f64 {
    fn to_value(&self, _: &mut ValueSerializer) -> Result<Value> {
        Number::from_f64(*self)
            .map(Value::Number)
            .map_err(|_| SerializationError::NonFinite(self.to_string()))
    }
}

impl ToValue for f32 {
    fn to_value(&self, _: &mut ValueSerializer) -> Result<Value> {
        Number::try_from(*self)
            .map(Value::Number)
            .map_err(|_| SerializationError::NonFinite(self.to_string()))
    }
}

impl ToValue for BigInt {
    fn to_value(&self, _: &mut ValueSerializer) -> Result<Value> {
        Ok(Value::Number(Number::integer(self.clone())))
    }
}

impl ToValue for BigDecimal {
    fn to_value(&self, _: &mut ValueSerializer) -> Result<Value> {
        Ok(Value::Number(Number::decimal(self.clone())))
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value> {
        match self {
            Some(inner) => inner.to_value(serializer),
            None => Ok(Value::Null),
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value> {
        (**self).to_value(serializer)
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value> {
        (**self).to_value(serializer)
    }
}

impl<T: ToValue + ?Sized> ToValue for Rc<T> {
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value> {
        (**self).to_value(serializer)
    }
}

impl<T: ToValue + ?Sized> ToValue for Arc<T> {
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value> {
        (**self).to_value(serializer)
    }
}

impl<T: ToValue + ?Sized> ToValue for RefCell<T> {
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value> {
        let inner = self.try_borrow().map_err(|_| SerializationError::Borrowed {
            type_name: short_type_name::<T>().to_string(),
        })?;
        inner.to_value(serializer)
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value> {
        serializer.sequence(self, self.iter())
    }
}

/// Fixed-size arrays serialize as JSON arrays, `[char; N]` included.
impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value> {
        serializer.sequence(self, self.iter())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value> {
        serializer.sequence(self, self.iter())
    }
}

impl<T: ToValue> ToValue for VecDeque<T> {
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value> {
        serializer.sequence(self, self.iter())
    }
}

impl<T: ToValue, S> ToValue for HashSet<T, S> {
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value> {
        serializer.sequence(self, self.iter())
    }
}

impl<T: ToValue> ToValue for BTreeSet<T> {
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value> {
        serializer.sequence(self, self.iter())
    }
}

impl<T: ToValue, S> ToValue for IndexSet<T, S> {
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value> {
        serializer.sequence(self, self.iter())
    }
}

impl<K: ToKey, V: ToValue, S> ToValue for HashMap<K, V, S> {
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value> {
        serializer.mapping(self, self.iter())
    }
}

impl<K: ToKey, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value> {
        serializer.mapping(self, self.iter())
    }
}

impl<K: ToKey, V: ToValue, S> ToValue for IndexMap<K, V, S> {
    fn to_value(&self, serializer: &mut ValueSerializer) -> Result<Value> {
        serializer.mapping(self, self.iter())
    }
}

impl ToKey for String {
    fn to_key(&self) -> Result<String> {
        Ok(self.clone())
    }
}

impl ToKey for str {
    fn to_key(&self) -> Result<String> {
        Ok(self.to_string())
    }
}

impl ToKey for Cow<'_, str> {
    fn to_key(&self) -> Result<String> {
        Ok(self.to_string())
    }
}

impl ToKey for char {
    fn to_key(&self) -> Result<String> {
        Ok(self.to_string())
    }
}

impl ToKey for bool {
    fn to_key(&self) -> Result<String> {
        Ok(self.to_string())
    }
}

impl<K: ToKey + ?Sized> ToKey for &K {
    fn to_key(&self) -> Result<String> {
        (**self).to_key()
    }
}

impl<K: ToKey> ToKey for Option<K> {
    fn to_key(&self) -> Result<String> {
        match self {
            Some(key) => key.to_key(),
            None => Err(SerializationError::NullKey),
        }
    }
}

impl<K: ToKey + ?Sized> ToKey for Rc<K> {
    fn to_key(&self) -> Result<String> {
        (**self).to_key()
    }
}

impl<K: ToKey + ?Sized> ToKey for Arc<K> {
    fn to_key(&self) -> Result<String> {
        (**self).to_key()
    }
}
