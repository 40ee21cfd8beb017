//! Converter registry keyed by declared type.

use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::converter::{self, Converter, EnumConverter, EnumSetConverter, OptionalConverter};
use crate::error::{MapperError, Result};

/// Identifies the declared type of a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Bool,
    Int32,
    Int64,
    Float64,
    Text,
    Bytes,
    Date,
    Time,
    Timestamp,
    Uuid,
    /// A [`SqlEnum`] by type name.
    Enum(&'static str),
    Optional(Box<TypeDescriptor>),
    /// A set of the named enum.
    EnumSet(&'static str),
    /// Any other user type, registered with [`ConverterRegistry::register`].
    Custom(&'static str),
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int32 => write!(f, "i32"),
            Self::Int64 => write!(f, "i64"),
            Self::Float64 => write!(f, "f64"),
            Self::Text => write!(f, "text"),
            Self::Bytes => write!(f, "bytes"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Uuid => write!(f, "uuid"),
            Self::Enum(name) => write!(f, "enum {name}"),
            Self::Optional(inner) => write!(f, "optional {inner}"),
            Self::EnumSet(name) => write!(f, "set of enum {name}"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// A type that can be declared as a column.
///
/// Implemented for the primitives, `Option<T>` and `BTreeSet<E>` of an enum.
/// Enums get an implementation from [`sql_enum!`](crate::sql_enum); custom
/// types implement `descriptor` and register their converter.
pub trait Declared: Sized + 'static {
    /// The registry key for this type.
    fn descriptor() -> TypeDescriptor;

    /// The value used when a column declares no default.
    fn fallback() -> Option<Self> {
        None
    }

    /// Finds or builds the converter for this type.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::ConverterNotRegistered`] when no converter is
    /// known for the type.
    fn infer(registry: &ConverterRegistry) -> Result<Arc<dyn Converter<Self>>> {
        registry.lookup::<Self>()
    }
}

macro_rules! declare_primitive {
    ($($ty:ty => $descriptor:ident $(, $fallback:expr)?;)*) => {
        $(
            impl Declared for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::$descriptor
                }

                $(
                    fn fallback() -> Option<Self> {
                        Some($fallback)
                    }
                )?
            }
        )*
    };
}

declare_primitive! {
    bool => Bool, false;
    i32 => Int32, 0;
    i64 => Int64, 0;
    f64 => Float64, 0.0;
    String => Text, String::new();
    Vec<u8> => Bytes, Vec::new();
    NaiveDate => Date;
    NaiveTime => Time;
    NaiveDateTime => Timestamp;
    Uuid => Uuid;
}

impl<T: Declared> Declared for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Optional(Box::new(T::descriptor()))
    }

    fn fallback() -> Option<Self> {
        Some(None)
    }

    fn infer(registry: &ConverterRegistry) -> Result<Arc<dyn Converter<Self>>> {
        let inner = T::infer(registry)?;
        Ok(Arc::new(OptionalConverter::new(inner)))
    }
}

impl<E: SqlEnum + Declared + Ord> Declared for BTreeSet<E> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::EnumSet(E::TYPE_NAME)
    }

    fn fallback() -> Option<Self> {
        Some(Self::new())
    }

    fn infer(registry: &ConverterRegistry) -> Result<Arc<dyn Converter<Self>>> {
        let element = E::infer(registry)?;
        Ok(Arc::new(EnumSetConverter::new(
            element,
            EnumSetConverter::<E>::DEFAULT_DELIMITER,
        )))
    }
}

/// A fieldless enum stored by variant name.
///
/// Usually implemented with [`sql_enum!`](crate::sql_enum).
pub trait SqlEnum: Sized + Copy + Send + Sync + 'static {
    /// Name used in descriptors and error messages.
    const TYPE_NAME: &'static str;

    /// Every variant in declaration order.
    fn variants() -> &'static [Self];

    /// The stored name of this variant.
    fn name(&self) -> &'static str;

    /// Finds the variant stored as `name`.
    fn from_name(name: &str) -> Option<Self> {
        Self::variants().iter().copied().find(|v| v.name() == name)
    }
}

/// Declares a fieldless enum usable as a column type.
///
/// Derives `Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash` and
/// implements [`SqlEnum`] and [`Declared`]. A variant is stored under its own
/// name unless a label is given.
///
/// Labels must be non-empty and must not contain `|`, the enum set
/// delimiter; anything else fails to compile.
///
/// ```rust
/// oxide_mapper::sql_enum! {
///     pub enum Rating {
///         G,
///         Pg = "PG",
///         Nc17 = "NC-17",
///     }
/// }
///
/// use oxide_mapper::SqlEnum;
/// assert_eq!(Rating::Nc17.name(), "NC-17");
/// assert_eq!(Rating::from_name("G"), Some(Rating::G));
/// ```
#[macro_export]
macro_rules! sql_enum {
    (@label $variant:ident $label:literal) => {
        $label
    };
    (@label $variant:ident) => {
        stringify!($variant)
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident $(= $label:literal)?),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::SqlEnum for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn variants() -> &'static [Self] {
                &[$(Self::$variant),+]
            }

            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $crate::sql_enum!(@label $variant $($label)?)),+
                }
            }
        }

        impl $crate::Declared for $name {
            fn descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::Enum(stringify!($name))
            }
        }

        const _: () = {
            $(assert!(
                $crate::__storable_label($crate::sql_enum!(@label $variant $($label)?)),
                concat!("label of ", stringify!($name), "::", stringify!($variant), " is empty or contains '|'")
            );)+
        };
    };
}

/// Whether `label` survives a round trip through an enum set column.
#[doc(hidden)]
#[must_use]
pub const fn __storable_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'|' {
            return false;
        }
        idx += 1;
    }
    true
}

/// Converters by declared type.
///
/// Built once at startup and shared read-only afterwards.
pub struct ConverterRegistry {
    converters: HashMap<TypeDescriptor, Arc<dyn Any + Send + Sync>>,
}

impl ConverterRegistry {
    /// A registry with no converters at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Registers `converter` for `T`, replacing any previous one.
    pub fn register<T, C>(&mut self, converter: C) -> &mut Self
    where
        T: Declared,
        C: Converter<T> + 'static,
    {
        let converter: Arc<dyn Converter<T>> = Arc::new(converter);
        self.converters.insert(T::descriptor(), Arc::new(converter));
        self
    }

    /// Registers the name-based converter for an enum.
    pub fn register_enum<E: SqlEnum + Declared>(&mut self) -> &mut Self {
        self.register::<E, _>(EnumConverter::<E>::new())
    }

    /// Returns the converter registered for exactly `T`.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::ConverterNotRegistered`] if there is none.
    pub fn lookup<T: Declared>(&self) -> Result<Arc<dyn Converter<T>>> {
        let descriptor = T::descriptor();
        self.converters
            .get(&descriptor)
            .and_then(|entry| entry.downcast_ref::<Arc<dyn Converter<T>>>())
            .cloned()
            .ok_or(MapperError::ConverterNotRegistered {
                descriptor,
                column: None,
            })
    }

    /// Returns the converter for `T`, composing wrappers for options and
    /// enum sets.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::ConverterNotRegistered`] naming the innermost
    /// unknown type.
    pub fn converter<T: Declared>(&self) -> Result<Arc<dyn Converter<T>>> {
        T::infer(self)
    }

    /// Whether a converter is registered under `descriptor`.
    #[must_use]
    pub fn contains(&self, descriptor: &TypeDescriptor) -> bool {
        self.converters.contains_key(descriptor)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register::<bool, _>(converter::bool_converter())
            .register::<i32, _>(converter::i32_converter())
            .register::<i64, _>(converter::i64_converter())
            .register::<f64, _>(converter::f64_converter())
            .register::<String, _>(converter::string_converter())
            .register::<Vec<u8>, _>(converter::bytes_converter())
            .register::<NaiveDate, _>(converter::date_converter())
            .register::<NaiveTime, _>(converter::time_converter())
            .register::<NaiveDateTime, _>(converter::timestamp_converter())
            .register::<Uuid, _>(converter::uuid_converter());
        registry
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("types", &self.converters.keys().collect::<Vec<_>>())
            .finish()
    }
}
