//! Textual form of the IR. Tokens are colorized for the terminal;
//! [`emit_module`] strips the escapes to produce plain text.

use core::fmt::{self, Display, Write};

use colored::Colorize;
use itertools::Itertools;

use crate::{index::Index, middle::lir};

pub fn pretty_print_module(module: &lir::Module) {
    print!("{module}");
}

/// Plain textual IR without any terminal escapes
pub fn emit_module(module: &lir::Module) -> String {
    strip_ansi_escapes::strip_str(module.to_string())
}

pub(crate) fn write_constants<'a>(
    out: &mut impl Write,
    constants: impl IntoIterator<Item = &'a lir::GlobalConstant>,
) -> fmt::Result {
    for constant in constants {
        writeln!(out, "{constant}")?;
    }

    Ok(())
}

pub(crate) fn write_trailer(out: &mut impl Write, producer: &str) -> fmt::Result {
    indoc::writedoc!(
        out,
        r#"
            {} i32 @printf(ptr, ...) #1

            attributes #0 = {{ nounwind }}
            attributes #1 = {{ nounwind }}

            !llvm.ident = !{{!0}}
            !0 = !{{!"{}"}}
        "#,
        "declare".magenta(),
        producer
    )
}

impl Display for lir::Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_constants(f, &self.constants)?;

        for function in &self.function_definitions {
            writeln!(f)?;
            write!(f, "{function}")?;
        }

        writeln!(f)?;
        write_trailer(f, &self.producer)
    }
}

impl Display for lir::GlobalConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut contents = String::new();

        for byte in &self.bytes {
            match *byte {
                b'"' | b'\\' => write!(contents, "\\{byte:02X}")?,
                0x20..=0x7e => contents.push(*byte as char),
                _ => write!(contents, "\\{byte:02X}")?,
            }
        }

        write!(
            f,
            "{} = private unnamed_addr constant [{} x i8] {}",
            lir::Operand::Constant(self.id),
            self.size(),
            format!("c\"{contents}\"").green()
        )
    }
}

impl Display for lir::FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "; Function Attrs: nounwind".bright_black())?;
        writeln!(
            f,
            "{} {} {}({}) #0 {{",
            "define".magenta(),
            self.return_type,
            format!("@{}", self.symbol_name).blue(),
            self.parameters
                .iter()
                .map(|p| format!("{} {}", p.ty, lir::Operand::Parameter(p.name)))
                .join(", ")
        )?;

        for (i, block) in self.blocks.iter().enumerate() {
            if i != 0 {
                writeln!(f)?;
            }

            writeln!(f, "{}", format!("{}:", block.label).bright_red())?;

            for instruction in &block.instructions {
                writeln!(f, "  {instruction}")?;
            }
        }

        writeln!(f, "}}")
    }
}

impl Display for lir::Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            lir::Label::Entry => write!(f, "entry"),
            lir::Label::Local(kind, id) => write!(f, "{kind}.{}", id.index()),
        }
    }
}

/// A label used as an operand (`label %then.0`)
struct LabelRef(lir::Label);

impl Display for LabelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", "label".white(), format!("%{}", self.0).blue())
    }
}

impl Display for lir::RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format!("%{}", self.index()).yellow())
    }
}

impl Display for lir::Immediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            lir::Immediate::Int(value) => write!(f, "{value}"),
            lir::Immediate::Bool(value) => write!(f, "{value}"),
            lir::Immediate::Poison => write!(f, "poison"),
        }
    }
}

impl Display for lir::Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            lir::Operand::Immediate(immediate) => write!(f, "{}", immediate.to_string().purple()),
            lir::Operand::Register(register_id) => write!(f, "{register_id}"),
            lir::Operand::Parameter(name) => write!(f, "{}", format!("%{name}").yellow()),
            lir::Operand::Constant(id) => write!(f, "{}", format!("@.str.{}", id.index()).green()),
        }
    }
}

impl Display for lir::Callee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            lir::Callee::Function(name) => write!(f, "{}", format!("@{name}").blue()),
            lir::Callee::Printf => write!(f, "(ptr, ...) {}", "@printf".blue()),
        }
    }
}

impl Display for lir::Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            lir::Instruction::Alloca { destination, ty } => {
                write!(f, "{destination} = {} {ty}", "alloca".cyan())
            }
            lir::Instruction::Store { ty, value, address } => {
                write!(f, "{} {ty} {value}, ptr {address}", "store".cyan())
            }
            lir::Instruction::Load {
                destination,
                ty,
                address,
            } => write!(f, "{destination} = {} {ty}, ptr {address}", "load".cyan()),
            lir::Instruction::BinaryOperation {
                opcode,
                destination,
                ty,
                lhs,
                rhs,
            } => write!(
                f,
                "{destination} = {} {ty} {lhs}, {rhs}",
                opcode.to_string().cyan()
            ),
            lir::Instruction::Compare {
                predicate,
                destination,
                ty,
                lhs,
                rhs,
            } => write!(
                f,
                "{destination} = {} {predicate} {ty} {lhs}, {rhs}",
                "icmp".cyan()
            ),
            lir::Instruction::Materialize {
                destination,
                ty,
                value,
            } => write!(
                f,
                "{destination} = {} {ty} {} to {ty}",
                "bitcast".cyan(),
                value.to_string().purple()
            ),
            lir::Instruction::ZeroExtend {
                destination,
                from,
                value,
                to,
            } => write!(f, "{destination} = {} {from} {value} to {to}", "zext".cyan()),
            lir::Instruction::Phi {
                destination,
                ty,
                incoming,
            } => write!(
                f,
                "{destination} = {} {ty} {}",
                "phi".bright_green(),
                incoming
                    .iter()
                    .map(|(value, label)| format!("[ {value}, {} ]", format!("%{label}").blue()))
                    .join(", ")
            ),
            lir::Instruction::FunctionCall {
                destination,
                return_type,
                callee,
                arguments,
            } => {
                if let Some(destination) = destination {
                    write!(f, "{destination} = ")?;
                }

                write!(
                    f,
                    "{} {return_type} {callee}({})",
                    "call".cyan(),
                    arguments
                        .iter()
                        .map(|(ty, value)| format!("{ty} {value}"))
                        .join(", ")
                )
            }
            lir::Instruction::Jump { destination } => {
                write!(f, "{} {}", "br".cyan(), LabelRef(*destination))
            }
            lir::Instruction::Branch {
                condition,
                positive,
                negative,
            } => write!(
                f,
                "{} i1 {condition}, {}, {}",
                "br".cyan(),
                LabelRef(*positive),
                LabelRef(*negative)
            ),
            lir::Instruction::Return {
                value: Some((ty, value)),
            } => write!(f, "{} {ty} {value}", "ret".cyan()),
            lir::Instruction::Return { value: None } => write!(f, "{} void", "ret".cyan()),
            lir::Instruction::Unreachable => write!(f, "{}", "unreachable".cyan()),
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::{
        frontend::intern::Symbol,
        middle::lir::{ConstantId, LabelId, LabelKind, RegisterId},
    };

    fn plain(value: impl Display) -> String {
        strip_ansi_escapes::strip_str(value.to_string())
    }

    #[test]
    fn constants_escape_unprintable_bytes() {
        let constant = lir::GlobalConstant::nul_terminated(ConstantId::new(2), "a\"b\n");

        assert_eq!(
            plain(&constant),
            r#"@.str.2 = private unnamed_addr constant [5 x i8] c"a\22b\0A\00""#
        );
    }

    #[test]
    fn instructions() {
        let end = lir::Label::new(LabelKind::End, LabelId::new(3));
        let phi = lir::Instruction::Phi {
            destination: RegisterId::new(4),
            ty: lir::Type::I32,
            incoming: vec![
                (lir::Operand::int(1), lir::Label::Entry),
                (lir::Operand::Register(RegisterId::new(2)), end),
            ],
        };

        assert_eq!(plain(&phi), "%4 = phi i32 [ 1, %entry ], [ %2, %end.3 ]");
        assert_eq!(
            plain(lir::Instruction::Branch {
                condition: lir::Operand::Register(RegisterId::new(0)),
                positive: lir::Label::new(LabelKind::AndRhs, LabelId::new(0)),
                negative: end,
            }),
            "br i1 %0, label %and.rhs.0, label %end.3"
        );
        assert_eq!(
            plain(lir::Instruction::FunctionCall {
                destination: None,
                return_type: lir::Type::I32,
                callee: lir::Callee::Printf,
                arguments: vec![
                    (lir::Type::Ptr, lir::Operand::Constant(ConstantId::new(0))),
                    (lir::Type::I32, lir::Operand::int(7)),
                ],
            }),
            "call i32 (ptr, ...) @printf(ptr @.str.0, i32 7)"
        );
        assert_eq!(
            plain(lir::Instruction::Materialize {
                destination: RegisterId::new(1),
                ty: lir::Type::I1,
                value: lir::Immediate::Bool(true),
            }),
            "%1 = bitcast i1 true to i1"
        );
    }

    #[test]
    fn whole_module() {
        let module = lir::Module {
            constants: Vec::new(),
            function_definitions: vec![lir::FunctionDefinition {
                symbol_name: Symbol::new("id"),
                return_type: lir::Type::I32,
                parameters: vec![lir::FunctionParameter {
                    name: Symbol::new("x"),
                    ty: lir::Type::I32,
                }],
                blocks: vec![lir::Block {
                    label: lir::Label::Entry,
                    instructions: vec![lir::Instruction::Return {
                        value: Some((lir::Type::I32, lir::Operand::Parameter(Symbol::new("x")))),
                    }],
                }],
            }],
            producer: "test".to_owned(),
        };

        assert_eq!(
            emit_module(&module),
            indoc! {r#"

                ; Function Attrs: nounwind
                define i32 @id(i32 %x) #0 {
                entry:
                  ret i32 %x
                }

                declare i32 @printf(ptr, ...) #1

                attributes #0 = { nounwind }
                attributes #1 = { nounwind }

                !llvm.ident = !{!0}
                !0 = !{!"test"}
            "#}
        );
    }
}
