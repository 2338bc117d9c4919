mod boot;
mod error;

pub use boot::init_tracing;
pub use error::{err, Error, Kind, Result};
