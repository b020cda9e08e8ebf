use crate::vecmath::Vec3;
use serde::{Deserialize, Serialize};

/// Per-agent values captured in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub position: Vec3,
    pub diameter: f64,
    pub volume: f64,
    pub growth_rate: f64,
    pub temperature: Option<f64>,
    pub permeability: Option<f64>,
}

/// A snapshot of the population and its growth metrics at a specific step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// The step number after which the snapshot was taken.
    pub step: u32,
    /// `step * time_step`.
    pub time: f64,
    /// The number of live agents.
    pub total_agent_count: u32,
    /// Agents whose growth-rate coefficient is positive.
    pub growing_count: u32,
    /// Shrinking agents still above their shrink floor.
    pub shrinking_count: u32,
    /// Shrinking agents at or below their shrink floor.
    pub equilibrium_count: u32,
    /// Agents with a zero growth-rate coefficient.
    pub balanced_count: u32,
    pub mean_diameter: f64,
    pub total_volume: f64,
    /// Mean over agents carrying thermal state; absent if there are none.
    pub mean_temperature: Option<f64>,
    pub mean_permeability: Option<f64>,
    pub agents: Option<Vec<AgentRecord>>,
}
