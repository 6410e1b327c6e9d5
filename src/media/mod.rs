//! Latest-frame decode-and-deliver pipeline.
//!
//! Data Flow:
//! ```text
//! capture thread ──► accept_frame ──► format changed? ──► set reconfigure latch (frame dropped)
//!                        │
//!                        └─► active decoder.decode ──► pending update (single slot, late
//!                                                      frames overwrite, never queue)
//!
//! flush tick ──► flush ──► reconfigure latch set? ──► rebuild decoder binding (lazy)
//!                  │
//!                  └─► pending update? ──► decoder buffer ──► Sink::deliver (tex_size bytes)
//! ```
//!
//! Two disjoint locks protect the two producer domains: the format domain
//! (declared format, latch, decoder binding, tex_size) and the data domain
//! (the pending-update flag), so frame intake is never serialized behind a
//! slow reconfiguration.

pub mod decoder;
pub mod error;
pub mod pipe;
pub mod sink;
pub mod types;
