pub mod error;
pub mod result;
pub mod templates;

pub use error::SwagError;
pub use result::SwagResult;
