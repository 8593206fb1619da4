// vim: tw=80
//! Member signatures and the type descriptions they are built from.

use std::fmt;

/// How the engine classifies a described type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// The unit ("void") type.
    Unit,
    /// A primitive value type, never substitute-capable.
    Primitive,
    /// A named nominal type.  `mockable` is false for final/sealed types.
    Object { mockable: bool },
    /// A declared type parameter of the declaring type, e.g. `E`.
    Param,
    /// The universal top type, all static information erased.
    Top,
}

/// An opaque description of a type, as far as the engine cares: a name, a
/// substitute-capability classification, and actual type arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeDesc {
    name: String,
    kind: TypeKind,
    params: Vec<TypeDesc>,
}

impl TypeDesc {
    pub fn unit() -> Self {
        TypeDesc { name: "()".to_owned(), kind: TypeKind::Unit, params: vec![] }
    }

    pub fn primitive(name: &str) -> Self {
        TypeDesc {
            name: name.to_owned(),
            kind: TypeKind::Primitive,
            params: vec![],
        }
    }

    /// A substitute-capable nominal type.
    pub fn object(name: &str) -> Self {
        TypeDesc {
            name: name.to_owned(),
            kind: TypeKind::Object { mockable: true },
            params: vec![],
        }
    }

    /// A nominal type that can never be substituted (final/sealed).
    pub fn sealed(name: &str) -> Self {
        TypeDesc {
            name: name.to_owned(),
            kind: TypeKind::Object { mockable: false },
            params: vec![],
        }
    }

    /// A declared type parameter, resolved against the substitute's actual
    /// type arguments when chaining.
    pub fn param(name: &str) -> Self {
        TypeDesc {
            name: name.to_owned(),
            kind: TypeKind::Param,
            params: vec![],
        }
    }

    pub fn top() -> Self {
        TypeDesc { name: "<top>".to_owned(), kind: TypeKind::Top, params: vec![] }
    }

    /// Attach actual type arguments, e.g. `List` -> `List<Item>`.
    pub fn parameterized(mut self, params: Vec<TypeDesc>) -> Self {
        self.params = params;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn params(&self) -> &[TypeDesc] {
        &self.params
    }

    pub fn is_unit(&self) -> bool {
        self.kind == TypeKind::Unit
    }

    pub fn is_top(&self) -> bool {
        self.kind == TypeKind::Top
    }

    /// Can a substitute stand in for this type?
    pub fn is_mockable(&self) -> bool {
        matches!(self.kind, TypeKind::Object { mockable: true })
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.params.is_empty() {
            write!(f, "<")?;
            for (i, p) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{p}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// Identity of an invocable member: declaring type, name, parameter types,
/// return type, and declared throwables.  Two signatures are the same member
/// iff all of those agree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberSignature {
    declaring_type: String,
    declaring_params: Vec<String>,
    name: String,
    params: Vec<TypeDesc>,
    return_type: TypeDesc,
    throws: Vec<String>,
    varargs: bool,
}

impl MemberSignature {
    /// A member with no parameters and a unit return type; extend with the
    /// chaining methods.
    pub fn new(declaring_type: &str, name: &str) -> Self {
        MemberSignature {
            declaring_type: declaring_type.to_owned(),
            declaring_params: vec![],
            name: name.to_owned(),
            params: vec![],
            return_type: TypeDesc::unit(),
            throws: vec![],
            varargs: false,
        }
    }

    /// Append a formal parameter.
    pub fn param(mut self, ty: TypeDesc) -> Self {
        self.params.push(ty);
        self
    }

    pub fn returns(mut self, ty: TypeDesc) -> Self {
        self.return_type = ty;
        self
    }

    /// Declare a checked throwable this member may raise.
    pub fn throws(mut self, type_name: &str) -> Self {
        self.throws.push(type_name.to_owned());
        self
    }

    /// Mark the last formal parameter as variable-arity.
    pub fn varargs(mut self) -> Self {
        self.varargs = true;
        self
    }

    /// Name the declaring type's own type parameters, in declaration order.
    /// Needed to resolve a `TypeKind::Param` return type while chaining.
    pub fn declaring_params(mut self, names: &[&str]) -> Self {
        self.declaring_params = names.iter().map(|n| (*n).to_owned()).collect();
        self
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_types(&self) -> &[TypeDesc] {
        &self.params
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn return_type(&self) -> &TypeDesc {
        &self.return_type
    }

    pub fn declared_throwables(&self) -> &[String] {
        &self.throws
    }

    pub fn is_varargs(&self) -> bool {
        self.varargs
    }

    /// The return type with a declared type parameter substituted by the
    /// matching actual argument of `context` (positionally, by declared
    /// name).  An unresolvable parameter degrades to the top type.
    pub fn resolve_return_against(&self, context: &TypeDesc) -> TypeDesc {
        if self.return_type.kind() != &TypeKind::Param {
            return self.return_type.clone();
        }
        self.declaring_params
            .iter()
            .position(|n| n == self.return_type.name())
            .and_then(|i| context.params().get(i).cloned())
            .unwrap_or_else(TypeDesc::top)
    }
}

impl fmt::Display for MemberSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.declaring_type, self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        if self.varargs {
            write!(f, "...")?;
        }
        write!(f, ")")
    }
}
