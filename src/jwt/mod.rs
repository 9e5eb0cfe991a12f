mod claims;
mod parts;
mod verify;

pub use claims::IdentityClaims;
pub use parts::{decode_unverified_header, decode_unverified_issuer, UnverifiedHeader};
pub use verify::{verify_es256, REQUIRED_ALG};
