//! Type descriptors and the assignability relation

use std::fmt;

/// A type provided by the host platform's metadata
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostType {
    /// Fully qualified name, e.g. `System.Text.StringBuilder`
    pub name: String,
    /// Every host type this one is-a, nearest first
    pub supertypes: Vec<String>,
}

impl HostType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), supertypes: Vec::new() }
    }

    pub fn with_supertype(mut self, name: impl Into<String>) -> Self {
        self.supertypes.push(name.into());
        self
    }

    /// Is-a check against another host type, by name
    pub fn is_subtype_of(&self, other: &HostType) -> bool {
        self.name == other.name || self.supertypes.iter().any(|s| *s == other.name)
    }
}

/// Language type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
    Double,
    Char,
    String,
    /// Opaque pointer, spelled `*`
    Pointer,
    /// Native character pointer, spelled `pchar`
    NativeCharPtr,
    Array(Box<Type>),
    /// Return position only
    Void,
    Host(HostType),
}

impl Type {
    pub fn array_of(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Types that take part in numeric casts and `++`/`--`
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Double | Type::Char)
    }

    /// Whether a value of type `from` may be stored where `self` is declared.
    ///
    /// Identity, or an is-a relationship between host types. There is no
    /// implicit numeric widening here; arithmetic promotion is decided by the
    /// operator rules in the parser.
    pub fn is_assignable_from(&self, from: &Type) -> bool {
        match (self, from) {
            (Type::Host(to), Type::Host(from)) => from.is_subtype_of(to),
            _ => self == from,
        }
    }

    /// Explicit `(T) expr` conversion
    pub fn is_castable_from(&self, from: &Type) -> bool {
        self.is_assignable_from(from)
            || from.is_assignable_from(self)
            || (self.is_numeric() && from.is_numeric())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::Double => write!(f, "double"),
            Type::Char => write!(f, "char"),
            Type::String => write!(f, "string"),
            Type::Pointer => write!(f, "*"),
            Type::NativeCharPtr => write!(f, "pchar"),
            Type::Array(element) => write!(f, "{}[]", element),
            Type::Void => write!(f, "void"),
            Type::Host(host) => write!(f, "{}", host.name),
        }
    }
}

/// Assignability as a free function, `assignable(to, from)`
pub fn assignable(to: &Type, from: &Type) -> bool {
    to.is_assignable_from(from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_types_are_assignable() {
        assert!(assignable(&Type::Int, &Type::Int));
        assert!(assignable(&Type::array_of(Type::Int), &Type::array_of(Type::Int)));
    }

    #[test]
    fn no_implicit_numeric_widening() {
        assert!(!assignable(&Type::Double, &Type::Int));
        assert!(!assignable(&Type::Int, &Type::Double));
        assert!(!assignable(&Type::Int, &Type::Char));
    }

    #[test]
    fn host_subtypes_are_assignable_upwards_only() {
        let object = Type::Host(HostType::new("System.Object"));
        let builder = Type::Host(HostType::new("System.Text.StringBuilder").with_supertype("System.Object"));
        assert!(assignable(&object, &builder));
        assert!(!assignable(&builder, &object));
    }

    #[test]
    fn numeric_casts_are_allowed_but_not_bool() {
        assert!(Type::Int.is_castable_from(&Type::Double));
        assert!(Type::Char.is_castable_from(&Type::Int));
        assert!(!Type::Int.is_castable_from(&Type::Bool));
        assert!(!Type::String.is_castable_from(&Type::Int));
    }

    #[test]
    fn display_names() {
        assert_eq!(Type::array_of(Type::Double).to_string(), "double[]");
        assert_eq!(Type::Pointer.to_string(), "*");
    }
}
