pub mod claims;
pub mod errors;
pub mod handler;

pub use claims::ClaimSet;
pub use claims::Claims;
pub use errors::JwtError;
pub use handler::parse_algorithm;
pub use handler::JwtHandler;
