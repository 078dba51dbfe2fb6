use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use crate::parser::prelude::FunctionLiteral;
use crate::utils::prelude::SrcSpan;

use super::environment::Environment;

/// Runtime value. `location` is the span of the node that produced it.
#[derive(Debug, Clone)]
pub enum DnclObject {
    Int {
        value: i64,
        location: SrcSpan
    },
    String {
        value: String,
        location: SrcSpan
    },
    Boolean {
        value: bool,
        location: SrcSpan
    },
    /// Shared on assignment; element writes are visible through every alias.
    Array {
        elements: Rc<RefCell<Vec<DnclObject>>>,
        location: SrcSpan
    },
    Null {
        location: SrcSpan
    },
    Function {
        closure: Rc<Closure>,
        location: SrcSpan
    },
    Error {
        message: String,
        location: SrcSpan
    },
    TypeError {
        message: String,
        location: SrcSpan
    },
    /// Unwound to the nearest call boundary, or to the top of the program.
    ReturnValue {
        value: Box<DnclObject>,
        location: SrcSpan
    },
}

#[derive(Debug)]
pub struct Closure {
    pub name: Option<String>,
    pub function: Rc<FunctionLiteral>,
    pub env: Rc<RefCell<Environment>>,
}

impl Closure {
    pub fn arity(&self) -> usize {
        self.function.parameters.len()
    }
}

impl PartialEq for DnclObject {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int { value: a, .. }, Self::Int { value: b, .. }) => a == b,
            (Self::String { value: a, .. }, Self::String { value: b, .. }) => a == b,
            (Self::Boolean { value: a, .. }, Self::Boolean { value: b, .. }) => a == b,
            (Self::Array { elements: a, .. }, Self::Array { elements: b, .. }) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            },
            (Self::Null { .. }, Self::Null { .. }) => true,
            (Self::Function { closure: a, .. }, Self::Function { closure: b, .. }) => Rc::ptr_eq(a, b),
            (Self::Error { message: a, .. }, Self::Error { message: b, .. }) => a == b,
            (Self::TypeError { message: a, .. }, Self::TypeError { message: b, .. }) => a == b,
            (Self::ReturnValue { value: a, .. }, Self::ReturnValue { value: b, .. }) => a == b,
            _ => false
        }
    }
}

impl Display for DnclObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int { value, .. } => write!(f, "{value}"),
            Self::String { value, .. } => write!(f, "{value}"),
            Self::Boolean { value, .. } => write!(f, "{value}"),
            Self::Array { elements, .. } => {
                let elements = elements.borrow().iter()
                    .map(|element| element.to_string())
                    .collect::<Vec<String>>();

                write!(f, "[{}]", elements.join(", "))
            },
            Self::Null { .. } => write!(f, "null"),
            Self::Function { closure, .. } => {
                let parameters = closure.function.parameters.iter()
                    .map(|parameter| parameter.value.clone())
                    .collect::<Vec<String>>();

                write!(f, "関数 {}({})", closure.name.as_deref().unwrap_or(""), parameters.join(", "))
            },
            Self::Error { message, .. } => write!(f, "Error: {message}"),
            Self::TypeError { message, .. } => write!(f, "TypeError: {message}"),
            Self::ReturnValue { value, .. } => write!(f, "{value}"),
        }
    }
}

impl DnclObject {
    pub fn int(value: i64, location: SrcSpan) -> Self {
        Self::Int { value, location }
    }

    pub fn string(value: impl Into<String>, location: SrcSpan) -> Self {
        Self::String { value: value.into(), location }
    }

    pub fn boolean(value: bool, location: SrcSpan) -> Self {
        Self::Boolean { value, location }
    }

    pub fn array(elements: Vec<DnclObject>, location: SrcSpan) -> Self {
        Self::Array { elements: Rc::new(RefCell::new(elements)), location }
    }

    pub fn null(location: SrcSpan) -> Self {
        Self::Null { location }
    }

    pub fn error(message: impl Into<String>, location: SrcSpan) -> Self {
        Self::Error { message: message.into(), location }
    }

    pub fn type_error(message: impl Into<String>, location: SrcSpan) -> Self {
        Self::TypeError { message: message.into(), location }
    }

    pub fn return_value(value: DnclObject, location: SrcSpan) -> Self {
        Self::ReturnValue { value: Box::new(value), location }
    }

    pub fn location(&self) -> SrcSpan {
        match self {
            Self::Int { location, .. } |
            Self::String { location, .. } |
            Self::Boolean { location, .. } |
            Self::Array { location, .. } |
            Self::Null { location } |
            Self::Function { location, .. } |
            Self::Error { location, .. } |
            Self::TypeError { location, .. } |
            Self::ReturnValue { location, .. } => *location
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int { .. } => "整数",
            Self::String { .. } => "文字列",
            Self::Boolean { .. } => "真偽値",
            Self::Array { .. } => "配列",
            Self::Null { .. } => "null",
            Self::Function { .. } => "関数",
            Self::Error { .. } => "エラー",
            Self::TypeError { .. } => "型エラー",
            Self::ReturnValue { .. } => "戻り値",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::TypeError { .. })
    }

    /// Values that stop the enclosing block: errors and return values.
    pub fn is_signal(&self) -> bool {
        self.is_error() || matches!(self, Self::ReturnValue { .. })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null { .. })
    }

    /// Whether `elements` is this array or sits anywhere inside it.
    pub fn contains_array(&self, elements: &Rc<RefCell<Vec<DnclObject>>>) -> bool {
        match self {
            Self::Array { elements: own, .. } => {
                Rc::ptr_eq(own, elements) || own.borrow().iter().any(|element| element.contains_array(elements))
            },
            _ => false
        }
    }

    /// Strips a single `ReturnValue` wrapper.
    pub fn unwrap_return(self) -> Self {
        match self {
            Self::ReturnValue { value, .. } => *value,
            other => other
        }
    }
}
