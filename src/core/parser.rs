use log::{debug, info};

use super::combinator::{
    alt, charclass, continues_identifier, delimited, end_of_input, keyword, label, many0, many1,
    map, optional, padded, position, preceded, recognize, satisfy, separated0, sequence, symbol,
    terminated, try_map, Cursor, ParseResult, Parser,
};
use super::{
    BinaryOp, Block, Expected, Expr, Function, ParseError, ParseErrorKind, Program, Stmt,
    UnaryOp, RESERVED_WORDS,
};

/// Parses klox source text into a `Program`.
///
/// Every rule below is one function built from the combinators in
/// `core::combinator`; precedence falls out of which rule calls which.
///
/// ## Grammar
/// ```notrust
/// program     → function+ EOF ;
/// function    → "fn" IDENTIFIER "(" ( IDENTIFIER ( "," IDENTIFIER )* )? ")" block ;
/// block       → "{" statement+ "}" ;
///
/// statement   → "var" IDENTIFIER "=" expression ";"
///             | "if" "(" expression ")" block ( "else" block )?
///             | "while" "(" expression ")" block
///             | "return" expression ";"
///             | IDENTIFIER "=" expression ";"
///             | expression ";" ;
///
/// expression  → comparison ;
/// comparison  → sum ( ( "==" | "!=" | "<=" | ">=" | "<" | ">" ) sum )? ;
/// sum         → product ( ( "+" | "-" ) product )* ;
/// product     → unary ( ( "*" | "/" ) unary )* ;
/// unary       → "-" unary | call | atom ;
/// call        → IDENTIFIER "(" ( expression ( "," expression )* )? ")" ;
/// atom        → IDENTIFIER | NUMBER | "(" expression ")" ;
///
/// IDENTIFIER  → ALPHA ( ALPHA | DIGIT | "_" )* ;   // minus reserved words
/// NUMBER      → DIGIT+ ;
/// ```
///
/// `sum` and `product` fold their operands to the left, so `a - b - c` is
/// `(a - b) - c`. Comparisons do not chain: `a < b < c` is a syntax error.
/// Whitespace and `//` comments may appear between any two tokens.
///
/// Rules recurse on the native stack, and each level of parentheses costs
/// several frames. On a 2 MB thread stack in a debug build, nesting around
/// 100 deep parses but 150 deep overflows; run deeply nested input on a
/// thread with a bigger stack.
///
/// # Errors
/// Returns the failure that got furthest into the source, or a
/// `DuplicateFunction` error if two functions share a name.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    match program(Cursor::new(source)) {
        Ok(parsed) => {
            let program = Program::new(source, parsed.value)?;
            info!("parsed {} function(s)", program.len());
            Ok(program)
        }
        Err(failure) => {
            debug!(
                "parse failed at {}: expected {}",
                failure.position, failure.expected
            );
            Err(ParseError::new(
                source,
                failure.position,
                ParseErrorKind::Expected(failure.expected),
            ))
        }
    }
}

fn program(cursor: Cursor) -> ParseResult<Vec<(usize, Function)>> {
    terminated(many1(function), end_of_input()).parse(cursor)
}

/// A function paired with the offset of its name, for duplicate reporting.
fn function(cursor: Cursor) -> ParseResult<(usize, Function)> {
    let parameters = delimited(symbol("("), separated0(identifier, symbol(",")), symbol(")"));

    map(
        sequence((
            keyword("fn"),
            padded(position()),
            identifier,
            parameters,
            block,
        )),
        |(_, position, name, parameters, body)| {
            (
                position,
                Function {
                    name,
                    parameters,
                    body,
                },
            )
        },
    )
    .parse(cursor)
}

fn block(cursor: Cursor) -> ParseResult<Block> {
    delimited(symbol("{"), many1(statement), symbol("}")).parse(cursor)
}

fn statement(cursor: Cursor) -> ParseResult<Stmt> {
    label(
        alt((
            var_declaration,
            if_statement,
            while_statement,
            return_statement,
            assignment,
            expression_statement,
        )),
        "statement",
    )
    .parse(cursor)
}

fn var_declaration(cursor: Cursor) -> ParseResult<Stmt> {
    map(
        sequence((
            keyword("var"),
            identifier,
            symbol("="),
            expression,
            symbol(";"),
        )),
        |(_, name, _, init, _)| Stmt::Var(name, init),
    )
    .parse(cursor)
}

fn if_statement(cursor: Cursor) -> ParseResult<Stmt> {
    map(
        sequence((
            keyword("if"),
            condition,
            block,
            optional(preceded(keyword("else"), block)),
        )),
        |(_, condition, then_block, else_block)| Stmt::If(condition, then_block, else_block),
    )
    .parse(cursor)
}

fn while_statement(cursor: Cursor) -> ParseResult<Stmt> {
    map(
        sequence((keyword("while"), condition, block)),
        |(_, condition, body)| Stmt::While(condition, body),
    )
    .parse(cursor)
}

fn condition(cursor: Cursor) -> ParseResult<Expr> {
    delimited(symbol("("), expression, symbol(")")).parse(cursor)
}

fn return_statement(cursor: Cursor) -> ParseResult<Stmt> {
    map(
        delimited(keyword("return"), expression, symbol(";")),
        Stmt::Return,
    )
    .parse(cursor)
}

fn assignment(cursor: Cursor) -> ParseResult<Stmt> {
    map(
        sequence((identifier, symbol("="), expression, symbol(";"))),
        |(name, _, value, _)| Stmt::Assign(name, value),
    )
    .parse(cursor)
}

fn expression_statement(cursor: Cursor) -> ParseResult<Stmt> {
    map(terminated(expression, symbol(";")), Stmt::Expression).parse(cursor)
}

fn expression(cursor: Cursor) -> ParseResult<Expr> {
    comparison(cursor)
}

fn comparison(cursor: Cursor) -> ParseResult<Expr> {
    map(
        sequence((sum, optional(sequence((comparison_operator, sum))))),
        |(left, right)| match right {
            Some((op, right)) => Expr::binary(left, op, right),
            None => left,
        },
    )
    .parse(cursor)
}

fn comparison_operator(cursor: Cursor) -> ParseResult<BinaryOp> {
    // Two-character operators first so "<=" is not read as "<" then "=".
    alt((
        map(symbol("=="), |_| BinaryOp::Equal),
        map(symbol("!="), |_| BinaryOp::NotEqual),
        map(symbol("<="), |_| BinaryOp::LessEqual),
        map(symbol(">="), |_| BinaryOp::GreaterEqual),
        map(symbol("<"), |_| BinaryOp::Less),
        map(symbol(">"), |_| BinaryOp::Greater),
    ))
    .parse(cursor)
}

fn sum(cursor: Cursor) -> ParseResult<Expr> {
    let operator = alt((
        map(symbol("+"), |_| BinaryOp::Add),
        map(symbol("-"), |_| BinaryOp::Subtract),
    ));

    map(
        sequence((product, many0(sequence((operator, product))))),
        fold_left,
    )
    .parse(cursor)
}

fn product(cursor: Cursor) -> ParseResult<Expr> {
    let operator = alt((
        map(symbol("*"), |_| BinaryOp::Multiply),
        map(symbol("/"), |_| BinaryOp::Divide),
    ));

    map(
        sequence((unary, many0(sequence((operator, unary))))),
        fold_left,
    )
    .parse(cursor)
}

fn fold_left((first, rest): (Expr, Vec<(BinaryOp, Expr)>)) -> Expr {
    rest.into_iter()
        .fold(first, |left, (op, right)| Expr::binary(left, op, right))
}

fn unary(cursor: Cursor) -> ParseResult<Expr> {
    label(alt((negation, call, atom)), "expression").parse(cursor)
}

fn negation(cursor: Cursor) -> ParseResult<Expr> {
    map(preceded(symbol("-"), unary), |operand| {
        Expr::Unary(UnaryOp::Negate, Box::new(operand))
    })
    .parse(cursor)
}

fn call(cursor: Cursor) -> ParseResult<Expr> {
    map(
        sequence((
            identifier,
            symbol("("),
            separated0(expression, symbol(",")),
            symbol(")"),
        )),
        |(name, _, arguments, _)| Expr::Call(name, arguments),
    )
    .parse(cursor)
}

fn atom(cursor: Cursor) -> ParseResult<Expr> {
    // Ties go to the last alternative, so `number` goes last to let an
    // out-of-range literal report itself.
    alt((
        map(identifier, Expr::Variable),
        delimited(symbol("("), expression, symbol(")")),
        map(number, Expr::Number),
    ))
    .parse(cursor)
}

fn identifier(cursor: Cursor) -> ParseResult<String> {
    let word = recognize(sequence((
        satisfy(char::is_alphabetic, "identifier"),
        optional(charclass(continues_identifier, "identifier")),
    )));

    padded(try_map(word, |word: &str| {
        if RESERVED_WORDS.contains(&word) {
            Err(Expected::Construct("identifier"))
        } else {
            Ok(word.to_owned())
        }
    }))
    .parse(cursor)
}

fn number(cursor: Cursor) -> ParseResult<i64> {
    let digits = charclass(|c| c.is_ascii_digit(), "number");

    padded(try_map(digits, |digits: &str| {
        digits
            .parse::<i64>()
            .map_err(|_| Expected::Valid("integer literal in range"))
    }))
    .parse(cursor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_expr(source: &str) -> Expr {
        let parsed = terminated(expression, end_of_input())
            .parse(Cursor::new(source))
            .unwrap();
        parsed.value
    }

    fn parse_body(source: &str) -> Block {
        let program = parse(&format!("fn main() {{ {} }}", source)).unwrap();
        program.function("main").unwrap().body.clone()
    }

    fn expected_at(
        source: &str,
        position: usize,
        expected: Expected,
    ) -> Result<Program, ParseError> {
        Err(ParseError::new(
            source,
            position,
            ParseErrorKind::Expected(expected),
        ))
    }

    #[test]
    fn it_can_parse_a_number() {
        assert_eq!(Expr::Number(1234), parse_expr("1234"));
    }

    #[test]
    fn it_can_parse_an_identifier() {
        assert_eq!(Expr::Variable("snake_case2".to_owned()), parse_expr("snake_case2"));
    }

    #[test]
    fn it_can_parse_a_unary_expression() {
        assert_eq!(
            Expr::Unary(
                UnaryOp::Negate,
                Box::new(Expr::Unary(UnaryOp::Negate, Box::new(Expr::Number(1))))
            ),
            parse_expr("- -1")
        );
    }

    #[test]
    fn it_binds_unary_tighter_than_product() {
        assert_eq!("((-2) * 2)", parse_expr("-2 * 2").to_string());
    }

    #[test]
    fn it_can_parse_a_binary_expression() {
        assert_eq!(
            Expr::binary(Expr::Number(1), BinaryOp::Add, Expr::Number(2)),
            parse_expr("1 + 2")
        );
    }

    #[test]
    fn it_folds_sums_and_products_to_the_left() {
        assert_eq!("((1 + 2) - 3)", parse_expr("1 + 2 - 3").to_string());
        assert_eq!("((2 * 3) / 4)", parse_expr("2*3/4").to_string());
        assert_eq!("(1 + (2 * 3))", parse_expr("1 + 2 * 3").to_string());
    }

    #[test]
    fn it_can_parse_a_grouping_expression() {
        assert_eq!("((1 + 2) * 3)", parse_expr("(1 + 2) * 3").to_string());
        assert_eq!(Expr::Number(7), parse_expr("((7))"));
    }

    #[test]
    fn it_can_parse_every_comparison_operator() {
        for op in &["==", "!=", "<", "<=", ">", ">="] {
            let source = format!("a {} b + 1", op);
            assert_eq!(format!("(a {} (b + 1))", op), parse_expr(&source).to_string());
        }
    }

    #[test]
    fn it_does_not_chain_comparisons() {
        assert!(terminated(expression, end_of_input())
            .parse(Cursor::new("a < b < c"))
            .is_err());
    }

    #[test]
    fn it_can_parse_a_call() {
        assert_eq!("f()", parse_expr("f()").to_string());
        assert_eq!(
            "add(1, (x * 2), g(y))",
            parse_expr("add(1, x * 2, g(y))").to_string()
        );
    }

    #[test]
    fn it_can_parse_each_statement() {
        let body = parse_body(
            "var x = 1; x = x + 1; f(x); \
             if (x) { return 1; } else { return 2; } \
             while (x > 0) { x = x - 1; } \
             return x;",
        );

        assert_eq!(
            vec![
                "var x = 1;",
                "x = (x + 1);",
                "f(x);",
                "if x { return 1; } else { return 2; }",
                "while (x > 0) { x = (x - 1); }",
                "return x;",
            ],
            body.iter().map(ToString::to_string).collect::<Vec<_>>()
        );
    }

    #[test]
    fn it_allows_if_without_else() {
        assert_eq!(
            vec![Stmt::If(
                Expr::Number(0),
                vec![Stmt::Return(Expr::Number(1))],
                None
            )],
            parse_body("if (0) { return 1; }")
        );
    }

    #[test]
    fn it_can_parse_a_program() {
        let program = parse(
            "// adds things\n\
             fn add(a, b) { return a + b; }\n\
             fn main() { return add(1, 2); }\n",
        )
        .unwrap();

        assert_eq!(2, program.len());
        let add = program.function("add").unwrap();
        assert_eq!(vec!["a".to_owned(), "b".to_owned()], add.parameters);
        assert_eq!(
            vec![Stmt::Return(Expr::binary(
                Expr::Variable("a".to_owned()),
                BinaryOp::Add,
                Expr::Variable("b".to_owned())
            ))],
            add.body
        );
    }

    #[test]
    fn it_does_not_treat_keyword_prefixes_as_keywords() {
        let body = parse_body("var iffy = 1; returned = iffy; return returned;");
        assert_eq!(Stmt::Var("iffy".to_owned(), Expr::Number(1)), body[0]);
        assert_eq!(
            Stmt::Assign("returned".to_owned(), Expr::Variable("iffy".to_owned())),
            body[1]
        );
    }

    #[test]
    fn it_reports_a_stray_semicolon() {
        let source = "fn main() { return 1 + ; }";
        assert_eq!(
            expected_at(source, 23, Expected::Construct("expression")),
            parse(source)
        );
    }

    #[test]
    fn it_reports_a_missing_semicolon() {
        let source = "fn main() { return 1 }";
        assert_eq!(expected_at(source, 21, Expected::Literal(";")), parse(source));
    }

    #[test]
    fn it_reports_an_unclosed_parenthesis() {
        let source = "fn main() { return (1 + 2; }";
        assert_eq!(expected_at(source, 25, Expected::Literal(")")), parse(source));
    }

    #[test]
    fn it_rejects_reserved_words_as_names() {
        let source = "fn main() { var while = 1; return 0; }";
        assert_eq!(
            expected_at(source, 16, Expected::Construct("identifier")),
            parse(source)
        );
    }

    #[test]
    fn it_requires_at_least_one_statement_per_block() {
        let source = "fn main() { }";
        assert_eq!(
            expected_at(source, 12, Expected::Construct("statement")),
            parse(source)
        );
    }

    #[test]
    fn it_requires_at_least_one_function() {
        assert_eq!(expected_at("", 0, Expected::Literal("fn")), parse(""));
    }

    #[test]
    fn it_rejects_trailing_text() {
        let source = "fn main() { return 0; } 42";
        assert_eq!(expected_at(source, 24, Expected::EndOfInput), parse(source));
    }

    #[test]
    fn it_rejects_out_of_range_numbers() {
        let source = "fn main() { return 99999999999999999999; }";
        assert_eq!(
            expected_at(source, 19, Expected::Valid("integer literal in range")),
            parse(source)
        );
    }

    #[test]
    fn it_rejects_duplicate_functions() {
        let source = "fn f() { return 1; }\nfn f() { return 2; }";
        let error = parse(source).unwrap_err();
        assert_eq!(ParseErrorKind::DuplicateFunction("f".to_owned()), error.kind);
        assert_eq!((2, 4), (error.line, error.column));
    }

    #[test]
    fn it_parses_nested_parentheses() {
        let depth = 50;
        let source = format!(
            "fn main() {{ return {}1{}; }}",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let body = parse(&source).unwrap().function("main").unwrap().body.clone();
        assert_eq!(vec![Stmt::Return(Expr::Number(1))], body);
    }

    #[test]
    fn it_parses_deterministically() {
        let source = "fn fib(n) { if (n < 2) { return n; } return fib(n - 1) + fib(n - 2); }";
        assert_eq!(parse(source), parse(source));
    }
}
