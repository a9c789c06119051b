//! Contracts for the peripheral collaborators. The flight core never touches
//! device registers; each driver lives on its own task (or inside the
//! estimator) and meets the loop at one of these seams.

pub mod attitude;
pub mod battery;
pub mod beeper;
pub mod sensors;
pub mod serial;
