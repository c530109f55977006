//! contvoc CLI library.
//!
//! This crate provides the command implementations behind the `contvoc`
//! binary: excitation generation and codebook inspection.

pub mod commands;
