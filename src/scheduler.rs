use crate::agent::Agent;
use crate::population::AgentPopulation;
use crate::rule::step_agent;
use cryo_cell_common::SimParams;
use log::trace;
use rayon::prelude::*;

/// Applies the growth rule to every live agent for one step.
///
/// Implementations must finish every agent's update before returning; that
/// return is the step barrier.
pub trait StepDriver: Send + Sync {
    fn run_step(&self, agents: &mut [Agent], params: &SimParams);
}

/// Updates agents one after another on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialDriver;

impl StepDriver for SerialDriver {
    fn run_step(&self, agents: &mut [Agent], params: &SimParams) {
        for agent in agents.iter_mut() {
            step_agent(agent, params);
        }
    }
}

/// Updates agents on the Rayon thread pool. Each agent is visited by exactly one worker.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParallelDriver;

impl StepDriver for ParallelDriver {
    fn run_step(&self, agents: &mut [Agent], params: &SimParams) {
        agents.par_iter_mut().for_each(|agent| {
            step_agent(agent, params);
        });
    }
}

/// Drives a population for a number of steps.
pub struct Scheduler {
    driver: Box<dyn StepDriver>,
}

impl Scheduler {
    pub fn new(driver: Box<dyn StepDriver>) -> Self {
        Self { driver }
    }

    pub fn serial() -> Self {
        Self::new(Box::new(SerialDriver))
    }

    pub fn parallel() -> Self {
        Self::new(Box::new(ParallelDriver))
    }

    /// Advances the live agents one step. Staged agents are left untouched.
    pub fn step(&self, population: &mut AgentPopulation, params: &SimParams) {
        self.driver.run_step(population.agents_mut(), params);
    }

    /// Runs `steps` steps.
    pub fn simulate(&self, population: &mut AgentPopulation, params: &SimParams, steps: u32) {
        for step in 0..steps {
            self.step(population, params);
            trace!("Step {} done for {} agents.", step + 1, population.len());
        }
    }
}
