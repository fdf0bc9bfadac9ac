//! Document model.
//!
//! [`Page`] carries one page through the pipeline; [`Document`] is the
//! assembled result with its metadata, statistics and warnings.

mod document;
mod page;

pub use document::*;
pub use page::*;
