//! Error conversion and response classification

pub mod conversions;
pub mod response;

pub use conversions::InfraError;
pub use response::ResponseErrorMapper;
