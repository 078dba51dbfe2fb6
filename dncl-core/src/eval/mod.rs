pub mod operators;
pub mod stdlib;

use std::{cell::RefCell, rc::Rc};

use crate::{
    environment::prelude::{Closure, DnclObject, Environment},
    lexer::prelude::Token,
    parser::prelude::{
        Alternative, Assignment, Block, BuiltInFunction, BuiltinCall, Conditional, CountedLoop,
        Direction, DoUntilLoop, Expression, FunctionDefinition, Increment, Infix, Primitive,
        Program, Statement, SystemCommand
    },
    utils::{prelude::SrcSpan, stack::ensure_sufficient_stack}
};

use operators::{eval_infix, eval_prefix};

pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// Returns early from the enclosing evaluator method when the value is an
/// error or a return value.
macro_rules! propagate {
    ($value:expr) => {{
        let value = $value;

        if value.is_signal() {
            return Ok(value);
        }

        value
    }};
}

/// Resolves a call to one of the built-in functions.
pub trait BuiltinHandler {
    fn call(&mut self, function: BuiltInFunction, arguments: Vec<DnclObject>, location: SrcSpan) -> DnclObject;
}

impl<F> BuiltinHandler for F
    where F: FnMut(BuiltInFunction, Vec<DnclObject>, SrcSpan) -> DnclObject
{
    fn call(&mut self, function: BuiltInFunction, arguments: Vec<DnclObject>, location: SrcSpan) -> DnclObject {
        self(function, arguments, location)
    }
}

/// Resolves a `【...】` command such as user input.
pub trait SystemCommandHandler {
    fn execute(&mut self, command: &SystemCommand) -> DnclObject;
}

impl<F> SystemCommandHandler for F
    where F: FnMut(&SystemCommand) -> DnclObject
{
    fn execute(&mut self, command: &SystemCommand) -> DnclObject {
        self(command)
    }
}

/// Index base visible to DNCL programs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Zero,
    #[default]
    One,
}

impl Origin {
    pub fn offset(self) -> i64 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }
}

impl TryFrom<i64> for Origin {
    type Error = EvalError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Zero),
            1 => Ok(Self::One),
            origin => Err(EvalError::InvalidOrigin { origin })
        }
    }
}

/// Failures that abort evaluation instead of producing an error value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("array origin must be 0 or 1, got {origin}")]
    InvalidOrigin { origin: i64 },

    #[error("built-in `{function}` produced a return value at {location}")]
    UnexpectedReturnValue {
        function: BuiltInFunction,
        location: SrcSpan
    },
}

pub struct Evaluator<'h> {
    builtins: Box<dyn BuiltinHandler + 'h>,
    commands: Box<dyn SystemCommandHandler + 'h>,
    origin: Origin,
    max_call_depth: usize,
    depth: usize,
}

impl<'h> Evaluator<'h> {
    pub fn new(
        builtins: impl BuiltinHandler + 'h,
        commands: impl SystemCommandHandler + 'h,
        origin: Origin
    ) -> Self {
        Self {
            builtins: Box::new(builtins),
            commands: Box::new(commands),
            origin,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            depth: 0,
        }
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn eval_program(&mut self, program: &Program) -> Result<DnclObject, EvalError> {
        self.eval_program_in(program, Environment::new_shared())
    }

    /// Evaluates `program` against `env`, so bindings survive for the next program.
    #[tracing::instrument(level = "debug", skip_all, fields(
        statements = program.statements.len(),
        origin = ?self.origin,
    ))]
    pub fn eval_program_in(
        &mut self,
        program: &Program,
        env: Rc<RefCell<Environment>>
    ) -> Result<DnclObject, EvalError> {
        self.depth = 0;

        let mut result = DnclObject::null(program.location);

        for statement in &program.statements {
            result = self.eval_statement(statement, &env)?;

            if result.is_signal() {
                break;
            }
        }

        let result = result.unwrap_return();

        if result.is_error() {
            tracing::debug!(%result, location = %result.location(), "program stopped on an error value");
        }

        Ok(result)
    }

    fn eval_block(&mut self, block: &Block, env: &Rc<RefCell<Environment>>) -> Result<DnclObject, EvalError> {
        for statement in &block.statements {
            propagate!(self.eval_statement(statement, env)?);
        }

        Ok(DnclObject::null(block.location))
    }

    /// Runs `block` in a fresh child scope of `env`.
    fn eval_scoped_block(&mut self, block: &Block, env: &Rc<RefCell<Environment>>) -> Result<DnclObject, EvalError> {
        let child = Environment::enclosed(env.clone());

        self.eval_block(block, &child)
    }

    fn eval_statement(&mut self, statement: &Statement, env: &Rc<RefCell<Environment>>) -> Result<DnclObject, EvalError> {
        let location = statement.location();

        match statement {
            Statement::Expression(expression) => self.eval_expression(expression, env),
            Statement::Assignment(assignment) => self.eval_assignment(assignment, env),
            Statement::Conditional(conditional) => self.eval_conditional(conditional, env),
            Statement::CountedLoop(loop_) => self.eval_counted_loop(loop_, env),
            Statement::WhileLoop(loop_) => {
                loop {
                    let condition = propagate!(self.eval_expression(&loop_.condition, env)?);

                    match condition {
                        DnclObject::Boolean { value: true, .. } => {
                            propagate!(self.eval_scoped_block(&loop_.body, env)?);
                        },
                        DnclObject::Boolean { value: false, .. } => break,
                        other => return Ok(condition_type_error(&other, loop_.condition.location()))
                    }
                }

                Ok(DnclObject::null(location))
            },
            Statement::DoUntilLoop(loop_) => self.eval_do_until_loop(loop_, env),
            Statement::Increment(increment) => self.eval_increment(increment, env),
            Statement::FunctionDefinition(definition) => {
                self.eval_function_definition(definition, env);

                Ok(DnclObject::null(location))
            },
            Statement::Return(ret) => {
                let value = propagate!(self.eval_expression(&ret.value, env)?);

                Ok(DnclObject::return_value(value, ret.location))
            }
        }
    }

    fn eval_assignment(&mut self, assignment: &Assignment, env: &Rc<RefCell<Environment>>) -> Result<DnclObject, EvalError> {
        let value = propagate!(self.eval_expression(&assignment.value, env)?);

        propagate!(self.assign_to(&assignment.target, value, env)?);

        Ok(DnclObject::null(assignment.location))
    }

    /// Stores `value` in an identifier or an array slot. Failures come back as
    /// the error value in `Ok`.
    fn assign_to(
        &mut self,
        target: &Expression,
        value: DnclObject,
        env: &Rc<RefCell<Environment>>
    ) -> Result<DnclObject, EvalError> {
        match target {
            Expression::Identifier(ident) => {
                env.borrow_mut().assign(ident.value.clone(), value);

                Ok(DnclObject::null(ident.location))
            },
            Expression::Index(index) => {
                let array = propagate!(self.eval_expression(&index.array, env)?);
                let position = propagate!(self.eval_expression(&index.index, env)?);

                let (elements, slot) = match self.resolve_slot(&array, &position, index.location) {
                    Ok(resolved) => resolved,
                    Err(error) => return Ok(error)
                };

                // an array must never reach itself
                if value.contains_array(&elements) {
                    return Ok(DnclObject::error("配列をその配列自身の中に入れることはできません", index.location));
                }

                elements.borrow_mut()[slot] = value;

                Ok(DnclObject::null(index.location))
            },
            other => Ok(DnclObject::error("代入できない式です", other.location()))
        }
    }

    fn eval_conditional(&mut self, conditional: &Conditional, env: &Rc<RefCell<Environment>>) -> Result<DnclObject, EvalError> {
        let condition = propagate!(self.eval_expression(&conditional.condition, env)?);

        let branch = match condition {
            DnclObject::Boolean { value: true, .. } => self.eval_scoped_block(&conditional.consequence, env)?,
            DnclObject::Boolean { value: false, .. } => match conditional.alternative.as_deref() {
                Some(Alternative::ElseIf(conditional)) => self.eval_conditional(conditional, env)?,
                Some(Alternative::Else(block)) => self.eval_scoped_block(block, env)?,
                None => DnclObject::null(conditional.location),
            },
            other => return Ok(condition_type_error(&other, conditional.condition.location()))
        };

        propagate!(branch);

        Ok(DnclObject::null(conditional.location))
    }

    fn eval_counted_loop(&mut self, loop_: &CountedLoop, env: &Rc<RefCell<Environment>>) -> Result<DnclObject, EvalError> {
        let from = propagate!(self.eval_expression(&loop_.from, env)?);
        let to = propagate!(self.eval_expression(&loop_.to, env)?);
        let step = propagate!(self.eval_expression(&loop_.step, env)?);

        let (to, step) = match (&from, &to, &step) {
            (DnclObject::Int { .. }, DnclObject::Int { value: to, .. }, DnclObject::Int { value: step, .. }) => (*to, *step),
            _ => return Ok(DnclObject::type_error(
                format!(
                    "繰り返しの範囲は整数でなければなりません ({}, {}, {})",
                    from.type_name(),
                    to.type_name(),
                    step.type_name()
                ),
                loop_.location
            ))
        };

        if step <= 0 {
            return Ok(DnclObject::error("増分は正の整数でなければなりません", loop_.step.location()));
        }

        let name = &loop_.variable.value;

        env.borrow_mut().assign(name.clone(), from);

        loop {
            let current = match env.borrow().get(name) {
                Some(DnclObject::Int { value, .. }) => value,
                Some(other) => return Ok(DnclObject::type_error(
                    format!("`{name}` が{}に変わったため繰り返しを続けられません", other.type_name()),
                    loop_.variable.location
                )),
                None => return Ok(undefined(name, loop_.variable.location))
            };

            let in_range = match loop_.direction {
                Direction::Increasing => current <= to,
                Direction::Decreasing => current >= to,
            };

            if !in_range {
                break;
            }

            propagate!(self.eval_scoped_block(&loop_.body, env)?);

            // the body may have changed the variable
            let current = match env.borrow().get(name) {
                Some(DnclObject::Int { value, .. }) => value,
                _ => current
            };

            let next = match loop_.direction {
                Direction::Increasing => current.checked_add(step),
                Direction::Decreasing => current.checked_sub(step),
            };

            match next {
                Some(next) => env.borrow_mut().assign(name.clone(), DnclObject::int(next, loop_.variable.location)),
                None => break
            }
        }

        Ok(DnclObject::null(loop_.location))
    }

    fn eval_do_until_loop(&mut self, loop_: &DoUntilLoop, env: &Rc<RefCell<Environment>>) -> Result<DnclObject, EvalError> {
        loop {
            propagate!(self.eval_scoped_block(&loop_.body, env)?);

            let condition = propagate!(self.eval_expression(&loop_.condition, env)?);

            match condition {
                DnclObject::Boolean { value: true, .. } => break,
                DnclObject::Boolean { value: false, .. } => continue,
                other => return Ok(condition_type_error(&other, loop_.condition.location()))
            }
        }

        Ok(DnclObject::null(loop_.location))
    }

    fn eval_increment(&mut self, increment: &Increment, env: &Rc<RefCell<Environment>>) -> Result<DnclObject, EvalError> {
        let current = propagate!(self.eval_expression(&increment.target, env)?);
        let amount = propagate!(self.eval_expression(&increment.amount, env)?);

        let operator = match increment.direction {
            Direction::Increasing => Token::Plus,
            Direction::Decreasing => Token::Minus,
        };

        let value = propagate!(eval_infix(&operator, current, amount, increment.location));

        propagate!(self.assign_to(&increment.target, value, env)?);

        Ok(DnclObject::null(increment.location))
    }

    fn eval_function_definition(&mut self, definition: &FunctionDefinition, env: &Rc<RefCell<Environment>>) {
        let closure = Closure {
            name: Some(definition.name.value.clone()),
            function: definition.function.clone(),
            env: env.clone(),
        };

        let function = DnclObject::Function {
            closure: Rc::new(closure),
            location: definition.location
        };

        env.borrow_mut().define(definition.name.value.clone(), function);
    }

    pub fn eval_expression(&mut self, expression: &Expression, env: &Rc<RefCell<Environment>>) -> Result<DnclObject, EvalError> {
        ensure_sufficient_stack(|| self.eval_expression_inner(expression, env))
    }

    fn eval_expression_inner(&mut self, expression: &Expression, env: &Rc<RefCell<Environment>>) -> Result<DnclObject, EvalError> {
        match expression {
            Expression::Identifier(ident) => Ok(env.borrow()
                .get(&ident.value)
                .unwrap_or_else(|| undefined(&ident.value, ident.location))),
            Expression::Primitive(primitive) => Ok(match primitive {
                Primitive::Int { value, location } => DnclObject::int(*value, *location),
                Primitive::Str { value, location } => DnclObject::string(value.clone(), *location),
                Primitive::System { location } => DnclObject::null(*location),
            }),
            Expression::Array(array) => {
                let mut elements = Vec::with_capacity(array.elements.len());

                for element in &array.elements {
                    elements.push(propagate!(self.eval_expression(element, env)?));
                }

                Ok(DnclObject::array(elements, array.location))
            },
            Expression::Prefix(prefix) => {
                let operand = propagate!(self.eval_expression(&prefix.expression, env)?);

                Ok(eval_prefix(&prefix.operator, operand, prefix.location))
            },
            Expression::Infix(infix) => self.eval_infix(infix, env),
            Expression::Index(index) => {
                let array = propagate!(self.eval_expression(&index.array, env)?);
                let position = propagate!(self.eval_expression(&index.index, env)?);

                Ok(match self.resolve_slot(&array, &position, index.location) {
                    Ok((elements, slot)) => elements.borrow()[slot].clone(),
                    Err(error) => error
                })
            },
            Expression::Call(call) => {
                let function = propagate!(self.eval_expression(&call.function, env)?);

                let mut arguments = Vec::with_capacity(call.arguments.len());

                for argument in &call.arguments {
                    arguments.push(propagate!(self.eval_expression(argument, env)?));
                }

                self.apply_function(function, arguments, call.location)
            },
            Expression::BuiltinCall(call) => self.eval_builtin_call(call, env),
            Expression::Function(function) => {
                let closure = Closure {
                    name: None,
                    function: function.clone(),
                    env: env.clone(),
                };

                Ok(DnclObject::Function {
                    closure: Rc::new(closure),
                    location: function.location
                })
            },
            Expression::SystemCommand(command) => Ok(self.commands.execute(command)),
            Expression::Nested { expression, .. } => self.eval_expression(expression, env),
        }
    }

    fn eval_infix(&mut self, infix: &Infix, env: &Rc<RefCell<Environment>>) -> Result<DnclObject, EvalError> {
        let left = propagate!(self.eval_expression(&infix.left, env)?);

        // `かつ` and `または` skip the right operand when the left decides
        match (&infix.operator, &left) {
            (Token::And, DnclObject::Boolean { value: false, .. }) => {
                return Ok(DnclObject::boolean(false, infix.location));
            },
            (Token::Or, DnclObject::Boolean { value: true, .. }) => {
                return Ok(DnclObject::boolean(true, infix.location));
            },
            _ => {}
        }

        let right = propagate!(self.eval_expression(&infix.right, env)?);

        Ok(eval_infix(&infix.operator, left, right, infix.location))
    }

    fn eval_builtin_call(&mut self, call: &BuiltinCall, env: &Rc<RefCell<Environment>>) -> Result<DnclObject, EvalError> {
        let mut arguments = Vec::with_capacity(call.arguments.len());

        for argument in &call.arguments {
            arguments.push(propagate!(self.eval_expression(argument, env)?));
        }

        let result = self.builtins.call(call.function, arguments, call.location);

        if call.function != BuiltInFunction::Return && matches!(result, DnclObject::ReturnValue { .. }) {
            return Err(EvalError::UnexpectedReturnValue {
                function: call.function,
                location: call.location
            });
        }

        Ok(result)
    }

    fn apply_function(
        &mut self,
        function: DnclObject,
        arguments: Vec<DnclObject>,
        location: SrcSpan
    ) -> Result<DnclObject, EvalError> {
        let closure = match function {
            DnclObject::Function { closure, .. } => closure,
            other => return Ok(DnclObject::type_error(
                format!("{}は呼び出せません", other.type_name()),
                location
            ))
        };

        if arguments.len() != closure.arity() {
            return Ok(DnclObject::error(
                format!(
                    "引数の数が違います: {} 個必要ですが {} 個渡されました",
                    closure.arity(),
                    arguments.len()
                ),
                location
            ));
        }

        if self.depth >= self.max_call_depth {
            return Ok(DnclObject::error(
                format!("関数の呼び出しが深すぎます (上限 {})", self.max_call_depth),
                location
            ));
        }

        let env = Environment::enclosed(closure.env.clone());

        for (parameter, argument) in closure.function.parameters.iter().zip(arguments) {
            env.borrow_mut().define(parameter.value.clone(), argument);
        }

        tracing::trace!(
            function = closure.name.as_deref().unwrap_or("<anonymous>"),
            depth = self.depth,
            "call"
        );

        self.depth += 1;
        let result = self.eval_block(&closure.function.body, &env);
        self.depth -= 1;

        Ok(match result? {
            DnclObject::ReturnValue { value, .. } => *value,
            error if error.is_error() => error,
            _ => DnclObject::null(location)
        })
    }

    /// Checks that `array[position]` exists and maps it to a storage slot.
    fn resolve_slot(
        &self,
        array: &DnclObject,
        position: &DnclObject,
        location: SrcSpan
    ) -> Result<(Rc<RefCell<Vec<DnclObject>>>, usize), DnclObject> {
        let elements = match array {
            DnclObject::Array { elements, .. } => elements,
            other => return Err(DnclObject::type_error(
                format!("{}には添字を使えません", other.type_name()),
                location
            ))
        };

        let index = match position {
            DnclObject::Int { value, .. } => *value,
            other => return Err(DnclObject::type_error(
                format!("添字は整数でなければなりません ({})", other.type_name()),
                location
            ))
        };

        let len = elements.borrow().len();

        let slot = index.checked_sub(self.origin.offset())
            .and_then(|slot| usize::try_from(slot).ok())
            .filter(|slot| *slot < len);

        match slot {
            Some(slot) => Ok((elements.clone(), slot)),
            None => Err(DnclObject::error(
                format!(
                    "添字 {index} は範囲外です ({} から {} まで)",
                    self.origin.offset(),
                    self.origin.offset() + len as i64 - 1
                ),
                location
            ))
        }
    }
}

fn undefined(name: &str, location: SrcSpan) -> DnclObject {
    DnclObject::error(format!("`{name}` は定義されていません"), location)
}

fn condition_type_error(condition: &DnclObject, location: SrcSpan) -> DnclObject {
    DnclObject::type_error(
        format!("条件は真偽値でなければなりません ({})", condition.type_name()),
        location
    )
}

#[cfg(test)]
mod tests;
