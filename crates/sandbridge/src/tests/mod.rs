//! Crate-level unit and BDD tests against an in-memory host.

mod support;
