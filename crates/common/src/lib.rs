//! Reusable utils shared by the bridge test tooling, such as initializing the tracing framework.

pub mod logging;
