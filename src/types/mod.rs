//! Request and response types shared by the facades.

mod attribute;
mod common;
mod responses;

pub use attribute::*;
pub use common::*;
pub use responses::*;
