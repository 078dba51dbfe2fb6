pub mod diagnostic;
pub mod src_span;
pub mod error;
pub mod explain;
pub mod stack;

pub mod prelude {
    pub use super::{
        diagnostic::*,
        src_span::*,
        error::*,
        explain::*,
    };
}
