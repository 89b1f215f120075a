//! Backend implementations, one per package kind

pub mod deb;
pub mod rpm;

pub use deb::DebSigner;
pub use rpm::RpmSigner;
