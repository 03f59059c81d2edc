use std::fmt;
use std::result;

use super::{
    BinaryOp, Expected, Expr, Function, KloxError, ParseError, ParseErrorKind, RuntimeError,
    Stmt, UnaryOp, Value,
};

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        match self {
            Self::Negate => write!(f, "-"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        let op = match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
        };

        write!(f, "{}", op)
    }
}

/// Fully parenthesized, so the tree shape is visible: `((1 + 2) * 3)`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Variable(name) => write!(f, "{}", name),
            Self::Unary(op, operand) => write!(f, "({}{})", op, operand),
            Self::Binary(left, op, right) => write!(f, "({} {} {})", left, op, right),
            Self::Call(name, arguments) => {
                write!(f, "{}(", name)?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        match self {
            Self::Var(name, init) => write!(f, "var {} = {};", name, init),
            Self::Assign(name, value) => write!(f, "{} = {};", name, value),
            Self::Return(value) => write!(f, "return {};", value),
            Self::If(condition, then_block, else_block) => {
                write!(f, "if {} ", condition)?;
                write_block(f, then_block)?;
                if let Some(else_block) = else_block {
                    write!(f, " else ")?;
                    write_block(f, else_block)?;
                }
                Ok(())
            }
            Self::While(condition, body) => {
                write!(f, "while {} ", condition)?;
                write_block(f, body)
            }
            Self::Expression(expr) => write!(f, "{};", expr),
        }
    }
}

fn write_block(f: &mut fmt::Formatter, block: &[Stmt]) -> result::Result<(), fmt::Error> {
    write!(f, "{{")?;
    for stmt in block {
        write!(f, " {}", stmt)?;
    }
    write!(f, " }}")
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        write!(f, "<fn {}/{}>", self.name, self.arity())
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        match self {
            Self::Literal(text) => write!(f, "'{}'", text),
            Self::Construct(name) | Self::Valid(name) => write!(f, "{}", name),
            Self::EndOfInput => write!(f, "end of input"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        write!(f, "[line {}:{}] Error: ", self.line, self.column)?;
        match &self.kind {
            ParseErrorKind::Expected(expected) => write!(f, "expected {}.", expected),
            ParseErrorKind::DuplicateFunction(name) => {
                write!(f, "function '{}' is already defined.", name)
            }
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        match self {
            Self::UndefinedVariable(name) => {
                write!(f, "runtime error: Undefined variable '{}'.", name)
            }
            Self::UndefinedFunction(name) => {
                write!(f, "runtime error: Undefined function '{}'.", name)
            }
            Self::ArityMismatch {
                function,
                expected,
                got,
            } => write!(
                f,
                "runtime error: '{}' expected {} arguments but got {}.",
                function, expected, got
            ),
            Self::DivisionByZero => write!(f, "runtime error: Division by zero."),
            Self::Output(message) => write!(f, "runtime error: Could not write output: {}", message),
        }
    }
}

impl fmt::Display for KloxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        match self {
            Self::Parse(e) => write!(f, "{}", e),
            Self::Runtime(e) => write!(f, "{}", e),
        }
    }
}
