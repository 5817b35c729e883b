use std::rc::Rc;

use crate::frontend::intern::Symbol;

/// Thin pointer to a resolved source type. Every AST node handed to lowering
/// carries one of these.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Type(Rc<TypeKind>);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// The type of a node that failed to check. Lowering never expects to see
    /// this since the checker refuses to hand over a crate containing one.
    Error,
    /// Marker type for well-formed nodes that have no value type of their own
    /// (items, the crate itself)
    Ok,
    /// !
    Div,
    /// ()
    Unit,
    /// i32
    I32,
    /// u8
    U8,
    /// bool
    Bool,
    /// &T
    Ref(Type),
    /// mut T
    ///
    /// Only appears directly beneath a reference (`&mut T`)
    Mut(Type),
    /// [T]
    Slice(Type),
    /// [T; <length>]
    Array { ty: Type, length: usize },
    /// Box<T>
    Box(Type),
    /// fn(T, U) -> V
    Fn { parameters: Rc<[Type]>, return_type: Type },
    /// A named struct or enum
    Id(Symbol),
}

impl Type {
    pub fn new(kind: TypeKind) -> Self {
        Self(Rc::new(kind))
    }

    pub fn error() -> Self {
        Self::new(TypeKind::Error)
    }

    pub fn ok() -> Self {
        Self::new(TypeKind::Ok)
    }

    pub fn div() -> Self {
        Self::new(TypeKind::Div)
    }

    pub fn unit() -> Self {
        Self::new(TypeKind::Unit)
    }

    pub fn i32() -> Self {
        Self::new(TypeKind::I32)
    }

    pub fn u8() -> Self {
        Self::new(TypeKind::U8)
    }

    pub fn bool() -> Self {
        Self::new(TypeKind::Bool)
    }

    pub fn reference(ty: Type) -> Self {
        Self::new(TypeKind::Ref(ty))
    }

    pub fn mutable_reference(ty: Type) -> Self {
        Self::reference(Self::new(TypeKind::Mut(ty)))
    }

    /// The type of a string literal (`&[u8]`)
    pub fn str() -> Self {
        Self::reference(Self::new(TypeKind::Slice(Self::u8())))
    }

    pub fn function(parameters: impl IntoIterator<Item = Type>, return_type: Type) -> Self {
        Self::new(TypeKind::Fn {
            parameters: parameters.into_iter().collect(),
            return_type,
        })
    }
}

impl core::fmt::Debug for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Type").field(&self.0).finish()
    }
}

impl core::ops::Deref for Type {
    type Target = TypeKind;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl TypeKind {
    pub fn is_unit(&self) -> bool {
        matches!(self, TypeKind::Unit)
    }

    pub fn is_div(&self) -> bool {
        matches!(self, TypeKind::Div)
    }

    /// Types which never produce a usable value
    pub fn is_valueless(&self) -> bool {
        self.is_unit() || self.is_div()
    }

    /// `Error` and `Ok` are checker bookkeeping and never describe a value
    pub fn is_erroneous(&self) -> bool {
        matches!(self, TypeKind::Error | TypeKind::Ok)
    }

    /// The name of the type node as it appears in the S-expression dump
    pub fn node_name(&self) -> &'static str {
        match self {
            TypeKind::Error => "type-error",
            TypeKind::Ok => "type-ok",
            TypeKind::Div => "type-div",
            TypeKind::Unit => "type-unit",
            TypeKind::I32 => "type-i32",
            TypeKind::U8 => "type-u8",
            TypeKind::Bool => "type-bool",
            TypeKind::Ref(_) => "type-ref",
            TypeKind::Mut(_) => "type-mut",
            TypeKind::Slice(_) | TypeKind::Array { .. } => "type-arr",
            TypeKind::Box(_) => "type-box",
            TypeKind::Fn { .. } => "type-fn",
            TypeKind::Id(_) => "type-id",
        }
    }
}

impl core::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &**self {
            TypeKind::Error => write!(f, "ERROR!"),
            TypeKind::Ok => write!(f, "ok!"),
            TypeKind::Div => write!(f, "!"),
            TypeKind::Unit => write!(f, "()"),
            TypeKind::I32 => write!(f, "i32"),
            TypeKind::U8 => write!(f, "u8"),
            TypeKind::Bool => write!(f, "bool"),
            TypeKind::Ref(ty) => write!(f, "&{ty}"),
            TypeKind::Mut(ty) => write!(f, "mut {ty}"),
            TypeKind::Slice(ty) => write!(f, "[{ty}]"),
            TypeKind::Array { ty, length } => write!(f, "[{ty};{length}]"),
            TypeKind::Box(ty) => write!(f, "Box<{ty}>"),
            TypeKind::Fn {
                parameters,
                return_type,
            } => {
                write!(f, "fn(")?;
                for (i, parameter) in parameters.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{parameter}")?;
                }
                write!(f, ") -> {return_type}")
            }
            TypeKind::Id(symbol) => write!(f, "{symbol}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_source_syntax() {
        assert_eq!(Type::mutable_reference(Type::i32()).to_string(), "&mut i32");
        assert_eq!(Type::str().to_string(), "&[u8]");
        assert_eq!(
            Type::new(TypeKind::Array {
                ty: Type::bool(),
                length: 4
            })
            .to_string(),
            "[bool;4]"
        );
        assert_eq!(
            Type::function([Type::i32(), Type::u8()], Type::unit()).to_string(),
            "fn(i32, u8) -> ()"
        );
    }

    #[test]
    fn valueless_types() {
        assert!(Type::unit().is_valueless());
        assert!(Type::div().is_valueless());
        assert!(!Type::i32().is_valueless());
        assert!(Type::error().is_erroneous());
    }
}
