use crate::middle::{
    lir::{self, ast_lowering::LoweringError},
    ty::{self, TypeKind},
};

/// Maps a resolved source type onto the IR type that represents its values
pub fn lower_type(ty: &ty::Type) -> Result<lir::Type, LoweringError> {
    match &**ty {
        TypeKind::I32 => Ok(lir::Type::I32),
        TypeKind::U8 => Ok(lir::Type::I8),
        TypeKind::Bool => Ok(lir::Type::I1),
        TypeKind::Unit | TypeKind::Div => Ok(lir::Type::Void),
        TypeKind::Ref(_) | TypeKind::Box(_) => Ok(lir::Type::Ptr),
        // mutability is a property of the place, not of the value
        TypeKind::Mut(inner) => lower_type(inner),
        TypeKind::Slice(_) | TypeKind::Array { .. } | TypeKind::Fn { .. } | TypeKind::Id(_) => {
            Err(LoweringError::unsupported(ty.node_name()))
        }
        TypeKind::Error | TypeKind::Ok => Err(LoweringError::ErroneousNode {
            node: ty.node_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{frontend::intern::Symbol, middle::ty::Type};

    #[test]
    fn scalars() {
        assert_eq!(lower_type(&Type::i32()), Ok(lir::Type::I32));
        assert_eq!(lower_type(&Type::u8()), Ok(lir::Type::I8));
        assert_eq!(lower_type(&Type::bool()), Ok(lir::Type::I1));
        assert_eq!(lower_type(&Type::unit()), Ok(lir::Type::Void));
        assert_eq!(lower_type(&Type::div()), Ok(lir::Type::Void));
    }

    #[test]
    fn every_reference_is_a_pointer() {
        assert_eq!(
            lower_type(&Type::mutable_reference(Type::i32())),
            Ok(lir::Type::Ptr)
        );
        assert_eq!(lower_type(&Type::str()), Ok(lir::Type::Ptr));
        assert_eq!(
            lower_type(&Type::new(TypeKind::Box(Type::bool()))),
            Ok(lir::Type::Ptr)
        );
        assert_eq!(
            lower_type(&Type::new(TypeKind::Mut(Type::u8()))),
            Ok(lir::Type::I8)
        );
    }

    #[test]
    fn aggregates_are_rejected_by_name() {
        let array = Type::new(TypeKind::Array {
            ty: Type::i32(),
            length: 3,
        });

        assert_eq!(
            lower_type(&array),
            Err(LoweringError::Unsupported {
                construct: "type-arr"
            })
        );
        assert_eq!(
            lower_type(&Type::new(TypeKind::Id(Symbol::new("Point")))),
            Err(LoweringError::Unsupported {
                construct: "type-id"
            })
        );
    }

    #[test]
    fn checker_bookkeeping_types_are_defects() {
        assert!(lower_type(&Type::error()).unwrap_err().is_upstream_defect());
    }
}
