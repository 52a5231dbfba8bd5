//! Player input
//!
//! The simulation never polls devices. Each frame it receives an
//! `InputSnapshot` of the actions held down, built by whatever drives it
//! (the headless harness replays scripted snapshots from a scenario file).

mod actions;
mod state;

pub use actions::*;
pub use state::*;
