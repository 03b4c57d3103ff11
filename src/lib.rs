// Library root
// ------------
// The `shortify` binary is a thin wrapper around `cli::run`; everything it
// does lives here so it can be exercised from tests.
//
// Module responsibilities:
// - `validate`: pure shape checks for URLs, short IDs and expiry strings.
// - `config`: the JSON configuration file (API key, logger colors) with
//   merge-on-write semantics.
// - `logger`: colored leveled console output and the color palette.
// - `api`: blocking HTTP client for the shortening service.
// - `commands`: one handler per CLI command, validating before acting.
// - `cli`: argument parsing, the per-run context and dispatch.
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod validate;

pub use cli::run;
