//! `include-gen` turns binary blobs into a pair of generated C artifacts: a
//! source file holding one byte-array literal per input plus an aggregate
//! pointer table, and an include file exposing index/size symbols for those
//! arrays.
//!
//! The emitted text reproduces the output of the historical `file2include`
//! generator byte-for-byte. The two near-identical variants of that tool are
//! unified here behind [`GenOptions`]; see [`HeaderStyle`] and
//! [`GenOptions::legacy_final_byte`] for the compatibility switches.
//!
//! # Modules
//! - [`Generator`] streams the two artifacts out as files are added.
//! - [`basename`] and [`mangle`] implement the symbol-name derivation rules.

mod mangle;
mod write;

pub use self::mangle::{basename, mangle};
pub use self::write::{GenOptions, Generator, HeaderStyle, GUARD_TOKEN};
