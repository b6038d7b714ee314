//! The two independent ping backends. Both serve the same semantics
//! (`GET /ping` → `{"message": "pong"}`, JSON 404 otherwise) on
//! unrelated runtimes and feed the one shared metrics pipeline.

pub mod framework;
pub mod raw;
