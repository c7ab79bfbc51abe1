//! Runtime descriptions of target types.
//!
//! A [`TypeDescriptor`] says what shape a Rust type has: a scalar, an enum
//! with named variants, an optional wrapper, a collection, a string-keyed map
//! or a struct with named fields. Schema generation and descriptor-driven
//! mapping both walk these descriptors.
//!
//! Struct fields refer to their types through a [`TypeRef`], which is
//! resolved on demand. That keeps `describe()` finite for recursive types such
//! as a tree node holding `Vec<Node>`; cycles are detected by whoever walks
//! the descriptor, not by `describe()` itself.
//!
//! ```rust
//! use shapeguard_core::{Describe, TypeKind};
//!
//! let descriptor = <Vec<Option<u8>>>::describe();
//! assert!(matches!(descriptor.kind, TypeKind::Sequence { unique: false, .. }));
//! ```

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use indexmap::{IndexMap, IndexSet};
use num_bigint::BigInt;

use crate::value::Value;

/// Primitive numeric kinds a field can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum NumberKind {
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    /// Unbounded integer.
    BigInteger,
    /// Unbounded decimal.
    Decimal,
}

impl NumberKind {
    /// Whether values of this kind must be whole numbers.
    pub fn is_integral(self) -> bool {
        !matches!(self, Self::F32 | Self::F64 | Self::Decimal)
    }

    /// Inclusive bounds for fixed-width integer kinds.
    pub fn integer_bounds(self) -> Option<(i128, u128)> {
        let bounds = match self {
            Self::I8 => (i8::MIN as i128, i8::MAX as u128),
            Self::I16 => (i16::MIN as i128, i16::MAX as u128),
            Self::I32 => (i32::MIN as i128, i32::MAX as u128),
            Self::I64 => (i64::MIN as i128, i64::MAX as u128),
            Self::I128 => (i128::MIN, i128::MAX as u128),
            Self::Isize => (isize::MIN as i128, isize::MAX as u128),
            Self::U8 => (0, u8::MAX as u128),
            Self::U16 => (0, u16::MAX as u128),
            Self::U32 => (0, u32::MAX as u128),
            Self::U64 => (0, u64::MAX as u128),
            Self::U128 => (0, u128::MAX),
            Self::Usize => (0, usize::MAX as u128),
            Self::F32 | Self::F64 | Self::BigInteger | Self::Decimal => return None,
        };
        Some(bounds)
    }
}

/// Shape of a type.
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// Text.
    String,
    /// A single character, carried as a one-character string.
    Char,
    /// `true` / `false`.
    Boolean,
    /// Any numeric kind.
    Number(NumberKind),
    /// Unit-only enum, carried as its variant name.
    Enum(Vec<String>),
    /// Value that may be absent or null.
    Optional(Box<TypeDescriptor>),
    /// Growable sequence. `unique` marks sets.
    Sequence {
        /// Element type, `None` for an untyped container.
        element: Option<Box<TypeDescriptor>>,
        /// Duplicates collapse by value equality.
        unique: bool,
    },
    /// Fixed or unsized array.
    Array {
        /// Element type, `None` when undeclared.
        element: Option<Box<TypeDescriptor>>,
        /// Required length, if fixed.
        len: Option<usize>,
    },
    /// Key-value mapping.
    Map {
        /// Key type, `None` for an untyped container.
        key: Option<Box<TypeDescriptor>>,
        /// Value type, `None` for an untyped container.
        value: Option<Box<TypeDescriptor>>,
    },
    /// Struct with named fields.
    Struct(Vec<FieldDescriptor>),
    /// A type with no structural description.
    Opaque,
}

/// Description of a type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Type identity. Derived structs use their full type path.
    pub name: Cow<'static, str>,
    /// Type-level description.
    pub description: Option<String>,
    /// Shape.
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Create a descriptor.
    pub fn new(name: impl Into<Cow<'static, str>>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// String descriptor.
    pub fn string() -> Self {
        Self::new("String", TypeKind::String)
    }

    /// Char descriptor.
    pub fn char() -> Self {
        Self::new("char", TypeKind::Char)
    }

    /// Boolean descriptor.
    pub fn boolean() -> Self {
        Self::new("bool", TypeKind::Boolean)
    }

    /// Numeric descriptor.
    pub fn number(kind: NumberKind) -> Self {
        Self::new(format!("{kind:?}").to_lowercase(), TypeKind::Number(kind))
    }

    /// Enum descriptor listing its variant names.
    pub fn enumeration<I, S>(name: impl Into<Cow<'static, str>>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            TypeKind::Enum(variants.into_iter().map(Into::into).collect()),
        )
    }

    /// Optional wrapper.
    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::new(
            format!("Option<{}>", inner.name),
            TypeKind::Optional(Box::new(inner)),
        )
    }

    /// Ordered sequence of `element`.
    pub fn sequence(element: TypeDescriptor) -> Self {
        Self::new(
            format!("Vec<{}>", element.name),
            TypeKind::Sequence {
                element: Some(Box::new(element)),
                unique: false,
            },
        )
    }

    /// Set of `element`.
    pub fn set(element: TypeDescriptor) -> Self {
        Self::new(
            format!("Set<{}>", element.name),
            TypeKind::Sequence {
                element: Some(Box::new(element)),
                unique: true,
            },
        )
    }

    /// Sequence with no declared element type.
    pub fn raw_sequence() -> Self {
        Self::new(
            "Vec",
            TypeKind::Sequence {
                element: None,
                unique: false,
            },
        )
    }

    /// Array of `element`, optionally of fixed length.
    pub fn array(element: TypeDescriptor, len: Option<usize>) -> Self {
        Self::new(
            format!("[{}]", element.name),
            TypeKind::Array {
                element: Some(Box::new(element)),
                len,
            },
        )
    }

    /// Mapping from `key` to `value`.
    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::new(
            format!("Map<{}, {}>", key.name, value.name),
            TypeKind::Map {
                key: Some(Box::new(key)),
                value: Some(Box::new(value)),
            },
        )
    }

    /// Mapping with no declared key or value type.
    pub fn raw_map() -> Self {
        Self::new(
            "Map",
            TypeKind::Map {
                key: None,
                value: None,
            },
        )
    }

    /// Struct with the given fields.
    pub fn structure(name: impl Into<Cow<'static, str>>, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(name, TypeKind::Struct(fields))
    }

    /// Type with no structural description.
    pub fn opaque(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, TypeKind::Opaque)
    }

    /// Last path component of the name, without generic arguments' paths.
    ///
    /// `my_crate::model::Person` becomes `Person`.
    pub fn short_name(&self) -> &str {
        let base = self.name.split('<').next().unwrap_or_default();
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Whether values of this type may be absent.
    pub fn is_optional(&self) -> bool {
        matches!(self.kind, TypeKind::Optional(_))
    }

    /// Whether this type can key a JSON object.
    pub fn is_string_like(&self) -> bool {
        matches!(self.kind, TypeKind::String | TypeKind::Char)
    }
}

/// A lazily or eagerly resolved field type.
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// Resolved by calling the function; used by derived code.
    Lazy(fn() -> TypeDescriptor),
    /// Already built.
    Resolved(Arc<TypeDescriptor>),
}

impl TypeRef {
    /// Reference to a [`Describe`] type.
    pub fn of<T: Describe + ?Sized>() -> Self {
        Self::Lazy(T::describe)
    }

    /// Resolve to a descriptor.
    pub fn resolve(&self) -> Arc<TypeDescriptor> {
        match self {
            Self::Lazy(describe) => Arc::new(describe()),
            Self::Resolved(descriptor) => Arc::clone(descriptor),
        }
    }
}

impl From<TypeDescriptor> for TypeRef {
    fn from(descriptor: TypeDescriptor) -> Self {
        Self::Resolved(Arc::new(descriptor))
    }
}

/// Schema markers attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMeta {
    /// Human-readable description.
    pub description: Option<String>,
    /// Field takes no part in schemas, serialization or mapping.
    pub ignore: bool,
    /// Field may be absent; the type's default is used.
    pub default: bool,
    /// Regex the whole string must match.
    pub pattern: Option<String>,
    /// Minimum string length in characters.
    pub min_length: Option<usize>,
    /// Maximum string length in characters.
    pub max_length: Option<usize>,
    /// Inclusive numeric minimum.
    pub minimum: Option<i64>,
    /// Inclusive numeric maximum.
    pub maximum: Option<i64>,
}

impl FieldMeta {
    /// Empty markers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the field as ignored.
    #[must_use]
    pub fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// Mark the field as defaulted when absent.
    #[must_use]
    pub fn default_when_missing(mut self) -> Self {
        self.default = true;
        self
    }

    /// Set the pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Set the minimum length.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    /// Set the maximum length.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Set the numeric minimum.
    #[must_use]
    pub fn minimum(mut self, min: i64) -> Self {
        self.minimum = Some(min);
        self
    }

    /// Set the numeric maximum.
    #[must_use]
    pub fn maximum(mut self, max: i64) -> Self {
        self.maximum = Some(max);
        self
    }

    /// Whether any string marker is set.
    pub fn has_string_markers(&self) -> bool {
        self.pattern.is_some() || self.min_length.is_some() || self.max_length.is_some()
    }

    /// Whether any numeric marker is set.
    pub fn has_number_markers(&self) -> bool {
        self.minimum.is_some() || self.maximum.is_some()
    }
}

/// A named struct field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name as it appears in JSON.
    pub name: Cow<'static, str>,
    /// Field type.
    pub ty: TypeRef,
    /// Markers.
    pub meta: FieldMeta,
}

impl FieldDescriptor {
    /// Create a field with empty markers.
    pub fn new(name: impl Into<Cow<'static, str>>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            meta: FieldMeta::default(),
        }
    }

    /// Replace the markers.
    #[must_use]
    pub fn with_meta(mut self, meta: FieldMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Whether the field may be absent from a JSON object.
    pub fn is_optional(&self, resolved: &TypeDescriptor) -> bool {
        self.meta.default || resolved.is_optional()
    }
}

/// Types that can describe their own shape.
///
/// Implemented for std scalars, strings, collections and maps, and derived
/// for structs and unit enums with `#[derive(Shape)]`.
pub trait Describe {
    /// Describe this type.
    fn describe() -> TypeDescriptor;
}

impl Describe for String {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::string()
    }
}

impl Describe for char {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::char()
    }
}

impl Describe for bool {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::boolean()
    }
}

macro_rules! describe_number {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::new(stringify!($ty), TypeKind::Number(NumberKind::$kind))
                }
            }
        )*
    };
}

describe_number!(
    i8 => I8, i16 => I16, i32 => I32, i64 => I64, i128 => I128, isize => Isize,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64, u128 => U128, usize => Usize,
    f32 => F32, f64 => F64, BigInt => BigInteger, BigDecimal => Decimal,
);

impl Describe for Value {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::opaque("Value")
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::optional(T::describe())
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Describe + ?Sized> Describe for Rc<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Describe + ?Sized> Describe for Arc<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(T::describe())
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(T::describe())
    }
}

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::set(T::describe())
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::set(T::describe())
    }
}

impl<T: Describe, S> Describe for IndexSet<T, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::set(T::describe())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::array(T::describe(), Some(N))
    }
}

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map(K::describe(), V::describe())
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map(K::describe(), V::describe())
    }
}

impl<K: Describe, V: Describe, S> Describe for IndexMap<K, V, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map(K::describe(), V::describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Node;

    impl Describe for Node {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::structure(
                "tests::Node",
                vec![FieldDescriptor::new("children", TypeRef::of::<Vec<Node>>())],
            )
        }
    }

    #[test]
    fn test_recursive_describe_terminates() {
        let node = Node::describe();
        let TypeKind::Struct(fields) = &node.kind else {
            panic!("expected struct");
        };
        let children = fields[0].ty.resolve();
        let TypeKind::Sequence { element: Some(element), .. } = &children.kind else {
            panic!("expected sequence");
        };
        assert_eq!(element.name, "tests::Node");
    }

    #[test]
    fn test_short_name() {
        let descriptor = TypeDescriptor::structure("app::model::Person", vec![]);
        assert_eq!(descriptor.short_name(), "Person");
        assert_eq!(String::describe().short_name(), "String");
    }

    #[test]
    fn test_collections() {
        assert!(matches!(
            <HashSet<String>>::describe().kind,
            TypeKind::Sequence { unique: true, .. }
        ));
        assert!(matches!(
            <[u8; 3]>::describe().kind,
            TypeKind::Array { len: Some(3), .. }
        ));
        let map = <BTreeMap<String, Option<i32>>>::describe();
        let TypeKind::Map { key: Some(key), value: Some(value) } = &map.kind else {
            panic!("expected typed map");
        };
        assert!(key.is_string_like());
        assert!(value.is_optional());
    }

    #[test]
    fn test_integer_bounds() {
        assert_eq!(NumberKind::U8.integer_bounds(), Some((0, 255)));
        assert_eq!(NumberKind::F64.integer_bounds(), None);
        assert!(!NumberKind::Decimal.is_integral());
        assert!(NumberKind::BigInteger.is_integral());
    }

    #[test]
    fn test_field_optional() {
        let field = FieldDescriptor::new("count", TypeRef::of::<u32>())
            .with_meta(FieldMeta::new().default_when_missing());
        assert!(field.is_optional(&field.ty.resolve()));
    }
}
