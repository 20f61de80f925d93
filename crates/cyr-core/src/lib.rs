//! # cyr-core
//!
//! Core types and error types for cyrisk.
//!
//! This crate provides the foundational types shared across all cyrisk crates:
//! - Entity structs for every pipeline stage (articles, risks, action points,
//!   project plans, threat trends)
//! - Severity scoring used for dashboard colour coding
//! - Cross-cutting error types

pub mod entities;
pub mod errors;
pub mod scoring;
