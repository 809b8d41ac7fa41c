pub mod path;
pub mod span;

pub use path::{canonicalize, PathError, PathErrorKind};
pub use span::Span;
