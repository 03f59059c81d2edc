use std::collections::HashMap;
use std::error;
use std::result;

pub mod combinator;
mod display;
mod environment;
mod interpreter;
mod parser;

pub type Environment = environment::Environment;
pub type Interpreter<'p, W> = interpreter::Interpreter<'p, W>;
pub type Result<T> = result::Result<T, RuntimeError>;

pub use interpreter::Flow;
pub use parser::parse;

/// Name of the builtin that writes its argument to the interpreter's output.
pub const PRINT: &str = "print";

/// Words that can never be used as identifiers.
pub const RESERVED_WORDS: [&str; 6] = ["else", "fn", "if", "return", "var", "while"];

/// What a parser wanted to see at the position it failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expected {
    /// A fixed piece of text such as `(` or `while`.
    Literal(&'static str),
    /// A named grammar construct such as `expression` or `identifier`.
    Construct(&'static str),
    /// Input of the right shape whose value was rejected, such as an integer
    /// literal too large to represent. Labels never rewrite these.
    Valid(&'static str),
    EndOfInput,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    Expected(Expected),
    /// A second function was declared with a name that is already taken.
    DuplicateFunction(String),
}

/// A syntax error, reported at the furthest position any parser reached.
///
/// `position` is a byte offset into the source; `line` and `column` are
/// 1-based and count characters, not bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub position: usize,
    pub line: usize,
    pub column: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    #[must_use]
    pub fn new(source: &str, position: usize, kind: ParseErrorKind) -> Self {
        let before = &source[..position.min(source.len())];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map_or(0, |current| current.chars().count())
            + 1;

        ParseError {
            position,
            line,
            column,
            kind,
        }
    }
}

impl error::Error for ParseError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeError {
    /// A variable was read or assigned before any `var` bound it in the
    /// current call.
    UndefinedVariable(String),
    /// A call named a function the program does not declare.
    UndefinedFunction(String),
    ArityMismatch {
        function: String,
        expected: usize,
        got: usize,
    },
    DivisionByZero,
    /// Writing to the interpreter's output sink failed.
    Output(String),
}

impl error::Error for RuntimeError {}

/// Either half of the pipeline failing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KloxError {
    Parse(ParseError),
    Runtime(RuntimeError),
}

impl From<ParseError> for KloxError {
    fn from(e: ParseError) -> Self {
        KloxError::Parse(e)
    }
}

impl From<RuntimeError> for KloxError {
    fn from(e: RuntimeError) -> Self {
        KloxError::Runtime(e)
    }
}

impl error::Error for KloxError {}

/// The only runtime type klox has.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Value(pub i64);

impl Value {
    #[must_use]
    pub fn is_truthy(self) -> bool {
        self.0 != 0
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value(i64::from(b))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    Number(i64),
    Variable(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Call(String, Vec<Expr>),
}

impl Expr {
    #[must_use]
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary(Box::new(left), op, Box::new(right))
    }
}

pub type Block = Vec<Stmt>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stmt {
    Var(String, Expr),
    Assign(String, Expr),
    Return(Expr),
    If(Expr, Block, Option<Block>),
    While(Expr, Block),
    Expression(Expr),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Function {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Block,
}

impl Function {
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// Every function of a parsed source file, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    functions: Vec<Function>,
    index: HashMap<String, usize>,
}

impl Program {
    /// Builds a program from `(name position, function)` pairs, rejecting
    /// duplicate names.
    ///
    /// # Errors
    /// Returns a `ParseError` of kind `DuplicateFunction` positioned at the
    /// name of the first function whose name was already taken.
    pub fn new(
        source: &str,
        declarations: Vec<(usize, Function)>,
    ) -> result::Result<Self, ParseError> {
        let mut functions = Vec::with_capacity(declarations.len());
        let mut index = HashMap::with_capacity(declarations.len());

        for (position, function) in declarations {
            if index.contains_key(&function.name) {
                return Err(ParseError::new(
                    source,
                    position,
                    ParseErrorKind::DuplicateFunction(function.name),
                ));
            }

            index.insert(function.name.clone(), functions.len());
            functions.push(function);
        }

        Ok(Program { functions, index })
    }

    #[must_use]
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.index.get(name).map(|&i| &self.functions[i])
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
