pub mod clock;
pub mod error;
pub mod ids;
pub mod result;
pub mod visitor;

pub use clock::*;
pub use error::*;
pub use ids::*;
pub use result::*;
pub use visitor::*;
