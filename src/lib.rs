//! voxkeep: a personal voice-intelligence pipeline daemon. Raw audio
//! from a microphone or a watched cloud-storage folder is transcribed
//! and diarized externally; this crate owns the transcript lifecycle
//! from `done/<stem>.json` through speaker identification to
//! publication in a downstream curator knowledge base.

pub mod config;
pub mod curator_writer;
pub mod embedding_client;
pub mod error;
pub mod gate;
pub mod identity;
pub mod manifest;
pub mod model;
pub mod orchestrator;
pub mod status;
pub mod watch_folder;
