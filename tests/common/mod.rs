#![allow(dead_code)]

use rillc::{
    LoweringOptions,
    frontend::ast::{
        BinaryOperatorKind::*,
        Block, Crate, Expression, Item,
        build::{
            binary, bind, block, block_expression, call, expression_statement, function, i32, id,
            if_else, infinite_loop, krate, let_mut, return_statement, str, while_loop,
        },
    },
    middle::ty::Type,
};

pub fn lower(krate: &Crate) -> String {
    lower_with(krate, &LoweringOptions::default())
}

pub fn lower_with(krate: &Crate, options: &LoweringOptions) -> String {
    let module = rillc::lower_crate(krate, options).expect("crate should lower");
    rillc::emit_module(&module)
}

pub fn main_with(statements: impl IntoIterator<Item = rillc::frontend::ast::Statement>) -> Crate {
    krate([main_item(block(statements, None))])
}

pub fn main_item(body: Block) -> Item {
    function("main", [], Type::unit(), body)
}

pub fn printi(value: Expression) -> Expression {
    call("printi", [value], Type::unit())
}

pub fn prints(value: &str) -> Expression {
    call("prints", [str(value)], Type::unit())
}

/// Text of every function definition, in order
pub fn functions(text: &str) -> Vec<&str> {
    text.match_indices("define ")
        .map(|(start, _)| {
            let end = text[start..].find("\n}").map_or(text.len(), |end| start + end + 2);
            &text[start..end]
        })
        .collect()
}

/// Labels defined in `function`, in order
pub fn labels(function: &str) -> Vec<&str> {
    function
        .lines()
        .filter(|line| !line.starts_with(' ') && !line.starts_with('}'))
        .filter_map(|line| line.strip_suffix(':'))
        .collect()
}

/// Every `label %x` operand in `function`
pub fn branch_targets(function: &str) -> Vec<&str> {
    function
        .match_indices("label %")
        .map(|(start, prefix)| {
            let rest = &function[start + prefix.len()..];
            let end = rest.find([',', '\n', ' ']).unwrap_or(rest.len());
            &rest[..end]
        })
        .collect()
}

/// Instruction lines of `function` with their indentation removed
pub fn instructions(function: &str) -> Vec<&str> {
    function
        .lines()
        .filter_map(|line| line.strip_prefix("  "))
        .collect()
}

/// Numbered registers mentioned on `line`
pub fn registers(line: &str) -> Vec<usize> {
    line.match_indices('%')
        .filter_map(|(start, _)| {
            let digits = line[start + 1..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>();
            digits.parse().ok()
        })
        .collect()
}

pub fn factorial() -> Crate {
    let n = || id("n", Type::i32());

    krate([
        function(
            "fact",
            [(bind("n", Type::i32()), Type::i32())],
            Type::i32(),
            block(
                [],
                Some(if_else(
                    binary(n(), LessThanOrEqualTo, i32(1)),
                    block_expression(block([], Some(i32(1)))),
                    Some(block_expression(block(
                        [],
                        Some(binary(
                            n(),
                            Multiply,
                            call("fact", [binary(n(), Subtract, i32(1))], Type::i32()),
                        )),
                    ))),
                )),
            ),
        ),
        main_item(block(
            [expression_statement(printi(call(
                "fact",
                [i32(5)],
                Type::i32(),
            )))],
            None,
        )),
    ])
}

pub fn fizzbuzz() -> Crate {
    let i = || id("i", Type::i32());
    let divides = |n| binary(binary(i(), Remainder, i32(n)), Equals, i32(0));

    let body = block_expression(block(
        [
            expression_statement(if_else(
                binary(divides(3), LogicalAnd, divides(5)),
                block_expression(block([expression_statement(prints("fizzbuzz"))], None)),
                Some(block_expression(block(
                    [expression_statement(printi(i()))],
                    None,
                ))),
            )),
            expression_statement(binary(i(), AddAssign, i32(1))),
        ],
        None,
    ));

    main_with([
        let_mut("i", i32(1)),
        expression_statement(while_loop(binary(i(), LessThanOrEqualTo, i32(15)), body)),
    ])
}

pub fn countdown() -> Crate {
    let n = || id("n", Type::i32());

    let body = block_expression(block(
        [
            expression_statement(if_else(
                binary(n(), Equals, i32(0)),
                block_expression(block([return_statement(Some(i32(42)))], None)),
                None,
            )),
            expression_statement(printi(n())),
            expression_statement(binary(n(), SubtractAssign, i32(1))),
        ],
        None,
    ));

    krate([
        function(
            "countdown",
            [(bind("start", Type::i32()), Type::i32())],
            Type::i32(),
            block(
                [let_mut("n", id("start", Type::i32()))],
                Some(infinite_loop(body)),
            ),
        ),
        main_item(block(
            [expression_statement(printi(call(
                "countdown",
                [i32(3)],
                Type::i32(),
            )))],
            None,
        )),
    ])
}
