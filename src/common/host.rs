//! Host platform metadata
//!
//! Identifiers that no lexical scope binds fall back to the host's declaration
//! universe: `Container.Member` names a public static field or method set of a
//! host type. The symbol table talks to the host only through
//! [`HostMetadata`], so any reflection facility (or a fake one in tests) can
//! stand behind it.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::types::{HostType, Type};

/// A public static field of a host type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostField {
    pub owner: String,
    pub name: String,
    pub ty: Type,
}

/// One overload of a public static host method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostMethod {
    pub owner: String,
    pub name: String,
    pub params: Vec<Type>,
    pub return_type: Type,
}

impl HostMethod {
    /// Every argument assignable to the corresponding parameter
    pub fn is_applicable(&self, args: &[Type]) -> bool {
        self.params.len() == args.len()
            && self.params.iter().zip(args).all(|(p, a)| p.is_assignable_from(a))
    }

    pub fn is_exact(&self, args: &[Type]) -> bool {
        self.params.as_slice() == args
    }
}

/// What a member name denotes on a host type
#[derive(Debug, Clone, PartialEq)]
pub enum HostMember {
    Field(HostField),
    /// All overloads sharing the name
    Methods(Vec<HostMethod>),
}

/// Read-only view of host declarations
pub trait HostMetadata {
    /// Resolve a fully qualified type name
    fn resolve_type(&self, qualified_name: &str) -> Option<HostType>;

    /// Look up a public static member; fields win over methods
    fn resolve_member(&self, ty: &HostType, name: &str) -> Option<HostMember>;

    /// Pick the overload to call for the given actual argument types.
    ///
    /// An exact signature match wins; otherwise the first applicable
    /// candidate in declaration order.
    fn select_overload<'m>(&self, candidates: &'m [HostMethod], args: &[Type]) -> Option<&'m HostMethod> {
        candidates
            .iter()
            .find(|m| m.is_exact(args))
            .or_else(|| candidates.iter().find(|m| m.is_applicable(args)))
    }
}

#[derive(Debug, Clone, Default)]
struct HostTypeEntry {
    ty: Option<HostType>,
    fields: HashMap<String, HostField>,
    methods: HashMap<String, Vec<HostMethod>>,
}

/// In-memory host metadata
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    types: HashMap<String, HostTypeEntry>,
}

static STANDARD: Lazy<HostRegistry> = Lazy::new(|| {
    let mut registry = HostRegistry::new();
    registry.add_type(HostType::new("System.Object"));
    registry.add_type(HostType::new("System.Text.StringBuilder").with_supertype("System.Object"));

    let math = HostType::new("System.Math").with_supertype("System.Object");
    registry.add_type(math.clone());
    registry.add_field(&math, "PI", Type::Double);
    registry.add_field(&math, "E", Type::Double);
    registry.add_method(&math, "Abs", vec![Type::Int], Type::Int);
    registry.add_method(&math, "Abs", vec![Type::Double], Type::Double);
    registry.add_method(&math, "Max", vec![Type::Int, Type::Int], Type::Int);
    registry.add_method(&math, "Max", vec![Type::Double, Type::Double], Type::Double);
    registry.add_method(&math, "Min", vec![Type::Int, Type::Int], Type::Int);
    registry.add_method(&math, "Min", vec![Type::Double, Type::Double], Type::Double);
    registry.add_method(&math, "Sqrt", vec![Type::Double], Type::Double);
    registry.add_method(&math, "Pow", vec![Type::Double, Type::Double], Type::Double);

    let console = HostType::new("System.Console").with_supertype("System.Object");
    registry.add_type(console.clone());
    for ty in [Type::Int, Type::Double, Type::Bool, Type::Char, Type::String] {
        registry.add_method(&console, "WriteLine", vec![ty.clone()], Type::Void);
        registry.add_method(&console, "Write", vec![ty], Type::Void);
    }
    registry.add_method(&console, "WriteLine", vec![], Type::Void);
    registry.add_method(&console, "ReadLine", vec![], Type::String);

    let convert = HostType::new("System.Convert").with_supertype("System.Object");
    registry.add_type(convert.clone());
    registry.add_method(&convert, "ToInt32", vec![Type::String], Type::Int);
    registry.add_method(&convert, "ToInt32", vec![Type::Double], Type::Int);
    registry.add_method(&convert, "ToDouble", vec![Type::String], Type::Double);
    registry.add_method(&convert, "ToDouble", vec![Type::Int], Type::Double);
    registry.add_method(&convert, "ToString", vec![Type::Int], Type::String);
    registry.add_method(&convert, "ToString", vec![Type::Double], Type::String);

    registry
});

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small slice of a standard library: `System.Math`, `System.Console`,
    /// `System.Convert`
    pub fn standard() -> Self {
        STANDARD.clone()
    }

    pub fn add_type(&mut self, ty: HostType) {
        let name = ty.name.clone();
        self.types.entry(name).or_default().ty = Some(ty);
    }

    pub fn add_field(&mut self, owner: &HostType, name: &str, ty: Type) {
        let field = HostField { owner: owner.name.clone(), name: name.to_string(), ty };
        self.entry(owner).fields.insert(name.to_string(), field);
    }

    pub fn add_method(&mut self, owner: &HostType, name: &str, params: Vec<Type>, return_type: Type) {
        let method = HostMethod {
            owner: owner.name.clone(),
            name: name.to_string(),
            params,
            return_type,
        };
        self.entry(owner).methods.entry(name.to_string()).or_default().push(method);
    }

    fn entry(&mut self, owner: &HostType) -> &mut HostTypeEntry {
        let entry = self.types.entry(owner.name.clone()).or_default();
        if entry.ty.is_none() {
            entry.ty = Some(owner.clone());
        }
        entry
    }
}

impl HostMetadata for HostRegistry {
    fn resolve_type(&self, qualified_name: &str) -> Option<HostType> {
        self.types.get(qualified_name).and_then(|entry| entry.ty.clone())
    }

    fn resolve_member(&self, ty: &HostType, name: &str) -> Option<HostMember> {
        let entry = self.types.get(&ty.name)?;
        if let Some(field) = entry.fields.get(name) {
            return Some(HostMember::Field(field.clone()));
        }
        entry
            .methods
            .get(name)
            .filter(|overloads| !overloads.is_empty())
            .map(|overloads| HostMember::Methods(overloads.clone()))
    }
}
