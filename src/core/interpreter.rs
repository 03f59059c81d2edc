use std::io::Write;
use std::mem;

use log::{debug, trace};

use super::{
    BinaryOp, Environment, Expr, Function, Program, Result, RuntimeError, Stmt, UnaryOp, Value,
    PRINT,
};

/// How control leaves a statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Normal,
    Return(Value),
}

/// Walks a parsed `Program`.
///
/// `environment` belongs to the call in progress. Calls push the caller's
/// environment onto `callers` and pop it back when the callee finishes, so a
/// callee never sees its caller's variables.
pub struct Interpreter<'p, W> {
    program: &'p Program,
    output: W,
    environment: Environment,
    callers: Vec<Environment>,
}

impl<'p, W: Write> Interpreter<'p, W> {
    /// Creates an interpreter for `program` whose `print` builtin writes to
    /// `output`.
    pub fn new(program: &'p Program, output: W) -> Self {
        Interpreter {
            program,
            output,
            environment: Environment::new(),
            callers: Vec::new(),
        }
    }

    /// Calls the function named `entry` with `args` and returns its value.
    ///
    /// # Errors
    /// `UndefinedFunction` if `entry` does not exist, or the first runtime
    /// error raised while running it.
    pub fn run(&mut self, entry: &str, args: &[Value]) -> Result<Value> {
        let program = self.program;
        let function = program
            .function(entry)
            .ok_or_else(|| RuntimeError::UndefinedFunction(entry.to_owned()))?;

        self.call(function, args.to_vec())
    }

    /// Gives back the output sink, e.g. to inspect what `print` wrote.
    pub fn into_output(self) -> W {
        self.output
    }

    fn call(&mut self, function: &'p Function, args: Vec<Value>) -> Result<Value> {
        if args.len() != function.arity() {
            return Err(RuntimeError::ArityMismatch {
                function: function.name.clone(),
                expected: function.arity(),
                got: args.len(),
            });
        }

        debug!("calling {}{:?}", function.name, args);

        let frame = function
            .parameters
            .iter()
            .cloned()
            .zip(args)
            .collect::<Environment>();
        let caller = mem::replace(&mut self.environment, frame);
        self.callers.push(caller);

        let flow = self.execute_block(&function.body);

        if let Some(caller) = self.callers.pop() {
            self.environment = caller;
        }

        let value = match flow? {
            Flow::Return(value) => value,
            Flow::Normal => Value::default(),
        };

        debug!("{} returned {}", function.name, value);
        Ok(value)
    }

    /// Evaluates `expr` in the environment of the call in progress.
    ///
    /// # Errors
    /// Unbound variables, unknown functions, arity mismatches, division by
    /// zero and failed `print` writes.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Number(n) => Ok(Value(*n)),
            Expr::Variable(name) => self.environment.get(name),
            Expr::Unary(UnaryOp::Negate, operand) => {
                let Value(n) = self.evaluate(operand)?;
                Ok(Value(n.wrapping_neg()))
            }
            Expr::Binary(left, op, right) => {
                let Value(l) = self.evaluate(left)?;
                let Value(r) = self.evaluate(right)?;

                match op {
                    BinaryOp::Add => Ok(Value(l.wrapping_add(r))),
                    BinaryOp::Subtract => Ok(Value(l.wrapping_sub(r))),
                    BinaryOp::Multiply => Ok(Value(l.wrapping_mul(r))),
                    BinaryOp::Divide => {
                        if r == 0 {
                            Err(RuntimeError::DivisionByZero)
                        } else {
                            Ok(Value(l.wrapping_div(r)))
                        }
                    }
                    BinaryOp::Equal => Ok(Value::from(l == r)),
                    BinaryOp::NotEqual => Ok(Value::from(l != r)),
                    BinaryOp::Less => Ok(Value::from(l < r)),
                    BinaryOp::LessEqual => Ok(Value::from(l <= r)),
                    BinaryOp::Greater => Ok(Value::from(l > r)),
                    BinaryOp::GreaterEqual => Ok(Value::from(l >= r)),
                }
            }
            Expr::Call(name, arguments) => {
                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                let program = self.program;
                match program.function(name) {
                    Some(function) => self.call(function, args),
                    None if name == PRINT => self.print(args),
                    None => Err(RuntimeError::UndefinedFunction(name.clone())),
                }
            }
        }
    }

    fn print(&mut self, args: Vec<Value>) -> Result<Value> {
        match args.as_slice() {
            [value] => {
                writeln!(self.output, "{}", value)
                    .map_err(|e| RuntimeError::Output(e.to_string()))?;
                Ok(*value)
            }
            _ => Err(RuntimeError::ArityMismatch {
                function: PRINT.to_owned(),
                expected: 1,
                got: args.len(),
            }),
        }
    }

    /// Runs one statement in the environment of the call in progress.
    ///
    /// # Errors
    /// Any error raised while evaluating the statement's expressions, or
    /// `UndefinedVariable` when assigning a name no `var` has bound.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        trace!("executing {}", stmt);

        match stmt {
            Stmt::Var(name, init) => {
                let value = self.evaluate(init)?;
                self.environment.define(name.clone(), value);
            }
            Stmt::Assign(name, value) => {
                let value = self.evaluate(value)?;
                self.environment.assign(name, value)?;
            }
            Stmt::Return(value) => return Ok(Flow::Return(self.evaluate(value)?)),
            Stmt::If(condition, then_block, else_block) => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute_block(then_block);
                } else if let Some(else_block) = else_block {
                    return self.execute_block(else_block);
                }
            }
            Stmt::While(condition, body) => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute_block(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }
        }

        Ok(Flow::Normal)
    }

    /// Runs `statements` in order, stopping at the first `return`.
    ///
    /// # Errors
    /// The first error any statement raises.
    pub fn execute_block(&mut self, statements: &[Stmt]) -> Result<Flow> {
        for statement in statements {
            if let Flow::Return(value) = self.execute(statement)? {
                return Ok(Flow::Return(value));
            }
        }

        Ok(Flow::Normal)
    }
}
