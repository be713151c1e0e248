// useful additional warnings if docs are missing, or crates imported but unused, etc.
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]
#![warn(variant_size_differences)]

//! Exhaustive verifier for star-coloring precoloring extensions.
//!
//! Given a graph, a palette size, and a precolored prefix of vertices, this
//! crate enumerates every admissible precoloring and checks whether each one
//! extends to a full star-coloring of the graph (see `SPEC_FULL.md` §1).

pub mod bitmask;
pub mod instance;
pub mod search;
pub mod util;
