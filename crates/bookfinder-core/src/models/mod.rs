pub mod book;
pub mod collection;
pub mod search;

pub use book::*;
pub use collection::*;
pub use search::*;
