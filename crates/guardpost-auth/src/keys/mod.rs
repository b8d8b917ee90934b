//! Signing key material and the rotating key ring.

pub mod material;
pub mod ring;

pub use material::KeyMaterial;
pub use ring::{KeyRing, KeyStore};
