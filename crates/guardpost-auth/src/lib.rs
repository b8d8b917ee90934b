//! # guardpost-auth
//!
//! Token lifecycle and guard dispatch core for Guardpost.
//!
//! ## Modules
//!
//! - `keys`: key material, the immutable key ring, and rotation
//! - `jwt`: claims, token encoding/decoding, and the token manager
//! - `guard`: named authentication strategies and the guard registry

pub mod guard;
pub mod jwt;
pub mod keys;

pub use guard::{Guard, GuardRegistry, Principal};
pub use jwt::{Claims, IssuedToken, TokenDecoder, TokenEncoder, TokenManager};
pub use keys::{KeyMaterial, KeyRing, KeyStore};
