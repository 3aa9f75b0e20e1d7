//! # Core Module
//!
//! Stateless building blocks of a molecule document. Nothing in here keeps
//! derived indexes; the [`engine`](crate::engine) layer owns those.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, and molecules

pub mod models;
