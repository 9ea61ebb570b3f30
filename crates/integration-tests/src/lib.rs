//! Cross-crate scenario tests for Linkpage live under `tests/`; this crate
//! has no library surface of its own.
