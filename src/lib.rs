//! Blockfall (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so binaries, tests and
//! benches can use `blockfall::{core,engine,runtime,store,types}`.

pub use blockfall_core as core;
pub use blockfall_engine as engine;
pub use blockfall_runtime as runtime;
pub use blockfall_store as store;
pub use blockfall_types as types;
