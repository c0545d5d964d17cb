//! Thin wrappers over the external Android toolchains.

pub mod gradle;
pub mod jdk;
pub mod keytool;
pub mod process;
pub mod sdk;
