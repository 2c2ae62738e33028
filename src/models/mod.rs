pub mod property;
pub mod response;
pub mod transaction;

pub use property::*;
pub use response::*;
pub use transaction::*;
