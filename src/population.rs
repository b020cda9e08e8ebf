use crate::agent::Agent;

/// Holds the agents of a run.
///
/// Newly pushed agents are staged and only become visible to the scheduler after
/// [`AgentPopulation::commit`].
#[derive(Debug, Default)]
pub struct AgentPopulation {
    live: Vec<Agent>,
    staged: Vec<Agent>,
}

impl AgentPopulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves room for `additional` agents before a bulk insertion.
    pub fn reserve(&mut self, additional: usize) {
        self.staged.reserve(additional);
        self.live.reserve(additional);
    }

    /// Stages an agent; it is not live until the next commit.
    pub fn push(&mut self, agent: Agent) {
        self.staged.push(agent);
    }

    /// Makes every staged agent live. Returns the number of agents committed.
    pub fn commit(&mut self) -> usize {
        let added = self.staged.len();
        self.live.append(&mut self.staged);
        if added > 0 {
            log::debug!("Committed {} agents ({} live).", added, self.live.len());
        }
        added
    }

    /// Number of live agents.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of agents waiting for a commit.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.live
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::GrowthParams;
    use crate::rule::GrowthRule;
    use cryo_cell_common::Vec3;

    fn agent() -> Agent {
        Agent::new(
            Vec3::zero(),
            7.5,
            GrowthParams { growth_rate: 0.0, initial_radius: 7.5 },
            None,
            GrowthRule::Basic,
        )
        .unwrap()
    }

    #[test]
    fn pushed_agents_are_invisible_until_commit() {
        let mut population = AgentPopulation::new();
        population.reserve(3);
        for _ in 0..3 {
            population.push(agent());
        }
        assert!(population.is_empty());
        assert_eq!(population.staged_len(), 3);

        assert_eq!(population.commit(), 3);
        assert_eq!(population.len(), 3);
        assert_eq!(population.staged_len(), 0);
        assert_eq!(population.commit(), 0);
    }
}
