pub mod error;
pub mod services;
pub mod utils;

pub use error::{AppResult, Error};
pub use services::*;
pub use services::stream_resolver_services::{StreamResolverService, StreamResolverServiceTrait};
