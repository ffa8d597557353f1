//! Sibyl Num - Numeric value types for the Sibyl modeling core
//!
//! This crate provides the value types the expression model is built on:
//! - `Rational` for exact fraction arithmetic with ±∞ sentinels
//! - `InfRational` for bounds with a signed infinitesimal component
//! - `Lin` for symbolic linear combinations of rational-weighted terms
//! - `LBool` for three-valued truth

pub mod inf_rational;
pub mod lbool;
pub mod lin;
pub mod rational;

pub use inf_rational::InfRational;
pub use lbool::LBool;
pub use lin::{Lin, VarId};
pub use rational::Rational;
