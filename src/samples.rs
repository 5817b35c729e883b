//! Checked sample programs bundled with the CLI, built directly as trees
//! since parsing and checking happen elsewhere.

use rillc::{
    LoweringOptions,
    frontend::ast::{
        BinaryOperatorKind::*,
        Block, Crate, Expression, Item, UnaryOperatorKind,
        build::{
            address_of_mut, binary, bind, block, block_expression, boolean, call,
            expression_statement, function, i32, id, if_else, infinite_loop, krate, let_immutable,
            let_mut, return_statement, str, unary, while_loop,
        },
    },
    middle::ty::Type,
};

pub struct Sample {
    pub name: &'static str,
    pub description: &'static str,
    pub build: fn(&LoweringOptions) -> Crate,
}

pub const SAMPLES: &[Sample] = &[
    Sample {
        name: "hello",
        description: "prints two string literals",
        build: hello,
    },
    Sample {
        name: "factorial",
        description: "recursive factorial with a value-producing if",
        build: factorial,
    },
    Sample {
        name: "fizzbuzz",
        description: "while loop with short-circuit conditions and compound assignment",
        build: fizzbuzz,
    },
    Sample {
        name: "countdown",
        description: "infinite loop left through an early return",
        build: countdown,
    },
    Sample {
        name: "pointers",
        description: "mutation through a mutable reference and a stored boolean",
        build: pointers,
    },
];

pub fn find(name: &str) -> Option<&'static Sample> {
    SAMPLES.iter().find(|sample| sample.name == name)
}

fn print_int(options: &LoweringOptions, value: Expression) -> Expression {
    call(&options.print_int, [value], Type::unit())
}

fn print_str(options: &LoweringOptions, value: &str) -> Expression {
    call(&options.print_str, [str(value)], Type::unit())
}

fn main_function(options: &LoweringOptions, body: Block) -> Item {
    function(&options.entry_point, [], Type::unit(), body)
}

fn hello(options: &LoweringOptions) -> Crate {
    krate([main_function(
        options,
        block(
            [
                expression_statement(print_str(options, "hello")),
                expression_statement(print_str(options, "world")),
            ],
            None,
        ),
    )])
}

fn factorial(options: &LoweringOptions) -> Crate {
    let n = || id("n", Type::i32());

    let body = block(
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
    );

    krate([
        function("fact", [(bind("n", Type::i32()), Type::i32())], Type::i32(), body),
        main_function(
            options,
            block(
                [expression_statement(print_int(
                    options,
                    call("fact", [i32(5)], Type::i32()),
                ))],
                None,
            ),
        ),
    ])
}

fn fizzbuzz(options: &LoweringOptions) -> Crate {
    let i = || id("i", Type::i32());
    let divides = |n| binary(binary(i(), Remainder, i32(n)), Equals, i32(0));

    let report = if_else(
        binary(divides(3), LogicalAnd, divides(5)),
        block_expression(block(
            [expression_statement(print_str(options, "fizzbuzz"))],
            None,
        )),
        Some(block_expression(block(
            [expression_statement(print_int(options, i()))],
            None,
        ))),
    );

    let body = block_expression(block(
        [
            expression_statement(report),
            expression_statement(binary(i(), AddAssign, i32(1))),
        ],
        None,
    ));

    krate([main_function(
        options,
        block(
            [
                let_mut("i", i32(1)),
                expression_statement(while_loop(
                    binary(i(), LessThanOrEqualTo, i32(15)),
                    body,
                )),
            ],
            None,
        ),
    )])
}

fn countdown(options: &LoweringOptions) -> Crate {
    let n = || id("n", Type::i32());

    let body = block_expression(block(
        [
            expression_statement(if_else(
                binary(n(), Equals, i32(0)),
                block_expression(block([return_statement(Some(i32(42)))], None)),
                None,
            )),
            expression_statement(print_int(options, n())),
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
        main_function(
            options,
            block(
                [expression_statement(print_int(
                    options,
                    call("countdown", [i32(3)], Type::i32()),
                ))],
                None,
            ),
        ),
    ])
}

fn pointers(options: &LoweringOptions) -> Crate {
    let pointer_ty = Type::mutable_reference(Type::i32());
    let x = || id("x", Type::i32());

    let bump = function(
        "bump",
        [(bind("p", pointer_ty.clone()), pointer_ty.clone())],
        Type::unit(),
        block(
            [expression_statement(binary(
                unary(UnaryOperatorKind::Deref, id("p", pointer_ty)),
                AddAssign,
                i32(1),
            ))],
            None,
        ),
    );

    krate([
        bump,
        main_function(
            options,
            block(
                [
                    let_mut("x", i32(1)),
                    expression_statement(call("bump", [address_of_mut(x())], Type::unit())),
                    let_immutable(
                        "ok",
                        binary(binary(x(), Equals, i32(2)), LogicalOr, boolean(false)),
                    ),
                    expression_statement(if_else(
                        id("ok", Type::bool()),
                        block_expression(block(
                            [expression_statement(print_int(options, x()))],
                            None,
                        )),
                        None,
                    )),
                ],
                None,
            ),
        ),
    ])
}
