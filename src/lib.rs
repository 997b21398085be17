//! # Drop Four
//!
//! A two-player Connect Four style game for the terminal. Pieces fall to the
//! lowest open cell of the chosen column; a run of `win_length` pieces in a
//! row or column wins, a full board without one is a draw.
//!
//! ## Modules
//!
//! - [`game`] — Core game logic: board, players, move history, session state machine
//! - [`ui`] — Renderer and input traits, ratatui/crossterm implementations, app loop
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod config;
pub mod error;
pub mod game;
pub mod ui;
