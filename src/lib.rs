//! Per-agent osmotic growth and cooling rules for cell populations, with a
//! minimal population container and step drivers to run them.

pub mod agent;
pub mod output;
pub mod population;
pub mod rule;
pub mod scheduler;
pub mod setup;
pub mod simulation;

pub use agent::{Agent, GrowthParams, ThermalState};
pub use population::AgentPopulation;
pub use rule::{GrowthPhase, GrowthRule, StepDelta, ThermalUpdate};
pub use scheduler::{ParallelDriver, Scheduler, SerialDriver, StepDriver};
pub use simulation::GrowthSimulation;
