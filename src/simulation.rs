use anyhow::Result;
use crate::population::AgentPopulation;
use crate::rule::{phase, GrowthPhase};
use crate::scheduler::Scheduler;
use crate::setup::seed_population;
use cryo_cell_common::{SimParams, SimulationConfig, Snapshot};
use log::{debug, info, trace};
use rand::prelude::*;
use std::time::Instant;

/// Manages the state and execution of the cooling/growth simulation.
pub struct GrowthSimulation {
    /// The simulation configuration, including populations and rule constants.
    config: SimulationConfig,
    /// Runtime parameters derived from the configuration.
    params: SimParams,
    /// All agents of the run.
    population: AgentPopulation,
    scheduler: Scheduler,
    /// The current simulation step number.
    current_step: u32,
    /// Stores collected snapshots at record intervals.
    recorded_snapshots: Vec<Snapshot>,
}

impl GrowthSimulation {
    /// Creates a new simulation running on the Rayon pool.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Self::with_scheduler(config, Scheduler::parallel())
    }

    /// Creates a new simulation with an explicit scheduler, seeding every population.
    pub fn with_scheduler(config: SimulationConfig, scheduler: Scheduler) -> Result<Self> {
        config.validate()?;
        // The seed drives placement only; the rule itself is deterministic.
        let mut rng = StdRng::seed_from_u64(config.initial_conditions.seed);
        let population = seed_population(&config, &mut rng)?;
        let params = config.get_sim_params();

        Ok(Self {
            config,
            params,
            population,
            scheduler,
            current_step: 0,
            recorded_snapshots: Vec::new(),
        })
    }

    /// Advances the simulation by one step.
    pub fn step(&mut self) {
        self.scheduler.step(&mut self.population, &self.params);
        self.current_step += 1;
    }

    /// Runs `timing.total_steps` steps, recording snapshots at the configured interval,
    /// plus one at step 0 and one after the last step.
    pub fn run(&mut self) {
        let total_steps = self.config.timing.total_steps;
        let record_interval = self.config.timing.record_interval_steps.max(1);
        info!(
            "Starting simulation loop for {} steps (snapshot every {} steps)...",
            total_steps, record_interval
        );
        let start_time = Instant::now();

        self.record_snapshot();
        for step in 0..total_steps {
            let step_start_time = Instant::now();
            self.step();
            let step_duration = step_start_time.elapsed();

            let is_record_step = (step + 1) % record_interval == 0;
            let is_last_step = step + 1 == total_steps;
            if is_record_step || is_last_step {
                info!(
                    "Step [{}/{}] | Agents: {} | Step Time: {:6.2} ms | Elapsed: {:.2} s",
                    step + 1,
                    total_steps,
                    self.population.len(),
                    step_duration.as_secs_f64() * 1000.0,
                    start_time.elapsed().as_secs_f64()
                );
                self.record_snapshot();
            } else {
                trace!(
                    "Step [{}/{}] completed in {:.2} ms",
                    step + 1,
                    total_steps,
                    step_duration.as_secs_f64() * 1000.0
                );
            }
        }

        info!(
            "Simulation finished in {:.3} seconds.",
            start_time.elapsed().as_secs_f64()
        );
    }

    /// Appends a snapshot of the current population.
    pub fn record_snapshot(&mut self) {
        let snapshot = self.snapshot();
        debug!(
            "Snapshot at step {}: growing={} shrinking={} equilibrium={} balanced={} mean_d={:.3}",
            snapshot.step,
            snapshot.growing_count,
            snapshot.shrinking_count,
            snapshot.equilibrium_count,
            snapshot.balanced_count,
            snapshot.mean_diameter
        );
        self.recorded_snapshots.push(snapshot);
    }

    /// Builds a snapshot of the current population without storing it.
    pub fn snapshot(&self) -> Snapshot {
        let agents = self.population.agents();
        let mut counts = [0u32; 4];
        let mut diameter_sum = 0.0;
        let mut total_volume = 0.0;
        let mut thermal_count = 0u32;
        let mut temperature_sum = 0.0;
        let mut permeability_sum = 0.0;

        for agent in agents {
            let slot = match phase(agent, &self.params) {
                GrowthPhase::Growing => 0,
                GrowthPhase::Shrinking => 1,
                GrowthPhase::Equilibrium => 2,
                GrowthPhase::Balanced => 3,
            };
            counts[slot] += 1;
            diameter_sum += agent.diameter();
            total_volume += agent.volume();
            if let Some(thermal) = agent.thermal() {
                thermal_count += 1;
                temperature_sum += thermal.temperature;
                permeability_sum += thermal.permeability;
            }
        }

        let mean = |sum: f64, n: u32| if n > 0 { Some(sum / n as f64) } else { None };

        Snapshot {
            step: self.current_step,
            time: self.current_step as f64 * self.params.time_step,
            total_agent_count: agents.len() as u32,
            growing_count: counts[0],
            shrinking_count: counts[1],
            equilibrium_count: counts[2],
            balanced_count: counts[3],
            mean_diameter: mean(diameter_sum, agents.len() as u32).unwrap_or(0.0),
            total_volume,
            mean_temperature: mean(temperature_sum, thermal_count),
            mean_permeability: mean(permeability_sum, thermal_count),
            agents: if self.config.output.save_agents_in_snapshot {
                Some(agents.iter().map(|a| a.record()).collect())
            } else {
                None
            },
        }
    }

    /// Provides access to the recorded snapshots.
    pub fn recorded_snapshots(&self) -> &[Snapshot] {
        &self.recorded_snapshots
    }

    pub fn population(&self) -> &AgentPopulation {
        &self.population
    }

    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        [universe]
        min_bound = 0.0
        max_bound = 100.0

        [timing]
        total_steps = 30
        record_interval_steps = 10

        [initial_conditions]
        seed = 3

        [output]
        base_filename = "test"
        save_stats = false
        save_agents_in_snapshot = true

        [[populations]]
        name = "background"
        count = 10
        diameter = 7.5
        rule = "basic"
        growth_rate = { fixed = { value = 0.0 } }

        [[populations]]
        name = "grower"
        count = 1
        diameter = 6.0
        x_range = [20.0, 20.0]
        y_range = [50.0, 50.0]
        z_range = [50.0, 50.0]
        rule = "basic"
        growth_rate = { fixed = { value = 30.0 } }
    "#;

    #[test]
    fn run_records_initial_interval_and_final_snapshots() {
        let config = SimulationConfig::from_toml_str(CONFIG).unwrap();
        let mut sim = GrowthSimulation::with_scheduler(config, Scheduler::serial()).unwrap();
        sim.run();

        assert_eq!(sim.current_step(), 30);
        let steps: Vec<u32> = sim.recorded_snapshots().iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![0, 10, 20, 30]);

        let last = sim.recorded_snapshots().last().unwrap();
        assert_eq!(last.total_agent_count, 11);
        assert_eq!(last.growing_count, 1);
        assert_eq!(last.balanced_count, 10);
        assert_eq!(last.mean_temperature, None);
        assert_eq!(last.agents.as_ref().map(|a| a.len()), Some(11));
    }

    #[test]
    fn grower_gains_rate_times_steps() {
        let config = SimulationConfig::from_toml_str(CONFIG).unwrap();
        let mut sim = GrowthSimulation::with_scheduler(config, Scheduler::serial()).unwrap();
        let start = sim.snapshot().total_volume;
        for _ in 0..30 {
            sim.step();
        }
        // Background agents are balanced with a zero delta, so only the grower changes.
        assert!((sim.snapshot().total_volume - start - 900.0).abs() < 1e-6);
        let grower = sim.population().agents().last().unwrap();
        assert_eq!(grower.position.x, 20.0);
        assert!(grower.diameter() > 6.0);
    }
}
