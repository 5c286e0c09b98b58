//! # rf-slot-sim — Batch Simulator for Slot Round Math
//!
//! Plays many independent rounds of an `rf-slot-math` game in parallel.
//! Rounds are spread over the mode's result sets by quota, replayed until
//! their criteria accepts them, and folded into a [`SimulationReport`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use rf_slot_sim::{SimulationConfig, Simulator};
//!
//! let game = rf_slot_math::GameConfig::load("games/lines_example.yaml")?;
//! let output = Simulator::new(&game, SimulationConfig::quick()).run("base")?;
//! println!("{}", output.report.to_text());
//! ```

pub mod criteria;
pub mod error;
pub mod report;
pub mod simulator;

pub use criteria::{assign_criteria, criteria_counts};
pub use error::{Result, SimError};
pub use report::{CriteriaStats, SimulationReport};
pub use simulator::{CriteriaPolicy, RoundRecord, SimulationConfig, SimulationOutput, Simulator};
