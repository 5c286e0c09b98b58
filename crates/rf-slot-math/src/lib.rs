//! # rf-slot-math — Slot Round Math Engine
//!
//! Deterministic round engine for line slots with a scatter-triggered
//! free-spin feature. Boards are drawn from reel strips by constrained
//! rejection sampling, so a simulation can target an outcome class
//! (no win, base win, forced free spins, super free spins, max win) and
//! still produce boards that are legal on the strips.
//!
//! ## Features
//!
//! - **Weighted Sampling**: reel sets, scatter counts and forced reels drawn from weight tables
//! - **Constrained Boards**: scenario predicates with bounded retries
//! - **Anticipation**: per-reel suspense flags from scatter-bearing reels
//! - **Paylines**: left-to-right runs with wild substitution
//! - **Free Spins**: trigger, retrigger and one-shot super upgrade
//! - **Reel Generation**: weighted strips with quotas, stacks and spacing rules
//!
//! ## Architecture
//!
//! ```text
//! GameConfig (YAML/JSON → ConfigParser)
//!     │
//!     v
//! RoundEngine ── RoundContext { state, rng, wallet, book, result_set }
//!     │
//!     ├── BoardGenerator (DrawScenario → Board)
//!     ├── apply_anticipation
//!     ├── PayTable::evaluate → LineEvaluation
//!     └── BonusStateMachine → Transition
//!           │
//!           v
//!     RoundOutcome + Book events
//! ```

pub mod anticipation;
pub mod board;
pub mod bonus;
pub mod book;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod parser;
pub mod paytable;
pub mod reels;
pub mod result_set;
pub mod rng;
pub mod sampler;
pub mod state;
pub mod symbols;
pub mod wallet;

#[cfg(test)]
mod test_support;

pub use anticipation::*;
pub use board::*;
pub use bonus::*;
pub use book::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use parser::*;
pub use paytable::*;
pub use reels::*;
pub use result_set::*;
pub use rng::*;
pub use sampler::*;
pub use state::*;
pub use symbols::*;
pub use wallet::*;
