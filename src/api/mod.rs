//! API - the worker facade exported to JavaScript

pub mod wasm;
