//! The round engine.
//!
//! A round has three phases, always in this order:
//!
//! 1. **Transitions.** Every host is visited once. A susceptible host becomes infected if the
//!    bucket store, built at the end of the *previous* round, records an infected host at this
//!    host's current position. An infected host ages by one round and recovers once its age
//!    reaches the infectious period `T`. Recovered hosts never change again.
//! 2. **Clear.** The bucket store is emptied.
//! 3. **Movement and rebuild.** Every host takes one uniformly random step on the torus. Hosts
//!    that are infected after phase 1 are inserted into the bucket store at their new position.
//!
//! Contact detection therefore compares where an infected host *ended* the previous round with
//! where a susceptible host *starts* this one.

use log::{debug, info, trace};
use rand::rngs::SmallRng;
use rand::Rng;

use crate::buckets::BucketStore;
use crate::error::GridSirError;
use crate::grid::{Direction, Position};
use crate::hosts::{HostId, InfectionStatus, Population};
use crate::parameters::Parameters;
use crate::random::RngStream;
use crate::summary::{Reporter, Summary};

pub struct Simulation {
    parameters: Parameters,
    population: Population,
    buckets: BucketStore,
    movement_rng: SmallRng,
    round: usize,
}

impl Simulation {
    /// Places the population and seeds the bucket store with the initial patient.
    #[must_use]
    pub fn new(parameters: Parameters) -> Self {
        let mut placement_rng = RngStream::Placement.seeded(parameters.seed);
        let population =
            Population::generate(parameters.population, &parameters.grid(), &mut placement_rng);
        Simulation::with_population(parameters, population)
    }

    /// Starts from explicit host states rather than a generated population. Every host that is
    /// infected at the start is seeded into the bucket store at its given position.
    ///
    /// # Errors
    /// Returns `GridSirError::InvalidPopulation` if the number of hosts differs from
    /// `parameters.population` or a host lies off the grid.
    pub fn from_hosts<I>(parameters: Parameters, hosts: I) -> Result<Self, GridSirError>
    where
        I: IntoIterator<Item = (Position, InfectionStatus)>,
    {
        let population = Population::from_states(hosts);
        if population.len() != parameters.population {
            return Err(GridSirError::InvalidPopulation(format!(
                "expected {} hosts, got {}",
                parameters.population,
                population.len()
            )));
        }
        let grid = parameters.grid();
        if let Some(host) = population.iter().find(|host| !grid.contains(host.position)) {
            return Err(GridSirError::InvalidPopulation(format!(
                "host {} at {} is outside the grid bound {}",
                host.id(),
                host.position,
                grid.bound()
            )));
        }
        Ok(Simulation::with_population(parameters, population))
    }

    fn with_population(parameters: Parameters, population: Population) -> Self {
        let mut buckets = BucketStore::new(parameters.grid(), parameters.slots);
        for host in population.infected() {
            trace!("seeding host {} at {}", host.id(), host.position);
            buckets.insert_host(host);
        }
        Simulation {
            movement_rng: RngStream::Movement.seeded(parameters.seed),
            parameters,
            population,
            buckets,
            round: 0,
        }
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn buckets(&self) -> &BucketStore {
        &self.buckets
    }

    /// The number of rounds executed so far.
    #[must_use]
    pub fn round(&self) -> usize {
        self.round
    }

    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::from_hosts(self.round, self.population.hosts())
    }

    /// Executes one round and returns the resulting summary.
    pub fn one_round(&mut self) -> Summary {
        self.round += 1;
        let Simulation {
            parameters,
            population,
            buckets,
            movement_rng,
            round,
        } = self;
        trace!("starting round {round}");

        for host in population.iter_mut() {
            match host.status {
                InfectionStatus::Susceptible => {
                    if buckets.is_occupied(host.position) {
                        trace!("host {} infected at {}", host.id(), host.position);
                        host.status = InfectionStatus::NEWLY_INFECTED;
                    }
                }
                InfectionStatus::Infected { age } => {
                    let age = age + 1;
                    host.status = if age >= parameters.infectious_period {
                        trace!("host {} recovered", host.id());
                        InfectionStatus::Recovered
                    } else {
                        InfectionStatus::Infected { age }
                    };
                }
                InfectionStatus::Recovered => {}
            }
        }

        buckets.clear_all();

        let grid = parameters.grid();
        for host in population.iter_mut() {
            let direction: Direction = movement_rng.random();
            host.position = grid.step(host.position, direction);
            if host.status.is_infected() {
                buckets.insert_host(host);
            }
        }

        let summary = Summary::from_hosts(*round, population.hosts());
        trace!(
            "round {} complete: S={} I={} R={}",
            summary.round,
            summary.susceptible,
            summary.infected,
            summary.recovered
        );
        summary
    }

    /// Runs rounds until no host is infected, sending every round's summary to `reporter`.
    /// Returns the summary of the final round.
    ///
    /// # Errors
    /// Returns the first error raised by `reporter`.
    pub fn run<R: Reporter>(&mut self, mut reporter: R) -> Result<Summary, GridSirError> {
        info!("starting simulation with {}", self.parameters);
        loop {
            let summary = self.one_round();
            reporter.report(&summary)?;
            if !summary.has_infected() {
                info!(
                    "no infected hosts remain after {} rounds (S={} R={})",
                    summary.round, summary.susceptible, summary.recovered
                );
                return Ok(summary);
            }
            if summary.round % 1000 == 0 {
                debug!("round {}: {} infected hosts", summary.round, summary.infected);
            }
        }
    }

    /// Looks up a host's current state.
    #[must_use]
    pub fn status(&self, id: HostId) -> Option<InfectionStatus> {
        self.population.get(id).map(|host| host.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosts::Host;

    fn parameters(k: i64, m: i64, t: i64, n: i64) -> Parameters {
        Parameters::new(k, m, t, n).unwrap()
    }

    #[test]
    fn seeds_the_initial_patient() {
        let simulation = Simulation::new(parameters(5, 20, 3, 11));
        assert_eq!(simulation.round(), 0);
        assert_eq!(simulation.buckets().len(), 1);
        assert!(simulation.buckets().is_occupied(Position::ORIGIN));
        assert_eq!(simulation.summary().infected, 1);
    }

    #[test]
    fn exact_match_under_single_slot() {
        // With one slot every cell collides.
        let mut simulation = Simulation::from_hosts(
            parameters(2, 3, 5, 1),
            [
                (Position::new(0, 0), InfectionStatus::NEWLY_INFECTED),
                (Position::new(0, 0), InfectionStatus::Susceptible),
                (Position::new(1, 1), InfectionStatus::Susceptible),
            ],
        )
        .unwrap();
        simulation.one_round();
        assert_eq!(
            simulation.status(HostId(1)),
            Some(InfectionStatus::NEWLY_INFECTED)
        );
        assert_eq!(simulation.status(HostId(2)), Some(InfectionStatus::Susceptible));
    }

    #[test]
    fn exact_match_under_hash_collision() {
        let params = parameters(1, 3, 5, 3);
        let infected_cell = Position::new(0, 0);
        let colliding_cell = Position::new(0, 1);
        let mut simulation = Simulation::from_hosts(
            params,
            [
                (infected_cell, InfectionStatus::NEWLY_INFECTED),
                (infected_cell, InfectionStatus::Susceptible),
                (colliding_cell, InfectionStatus::Susceptible),
            ],
        )
        .unwrap();
        let buckets = simulation.buckets();
        assert_eq!(buckets.slot_for(infected_cell), buckets.slot_for(colliding_cell));

        simulation.one_round();
        assert!(simulation.status(HostId(1)).unwrap().is_infected());
        assert!(simulation.status(HostId(2)).unwrap().is_susceptible());
    }

    #[test]
    fn contact_uses_positions_before_movement() {
        // Host 1 starts next to the patient; whatever either one does this round, the bucket
        // store it is checked against holds only the patient's starting cell.
        let mut simulation = Simulation::from_hosts(
            parameters(3, 2, 10, 5),
            [
                (Position::new(0, 0), InfectionStatus::NEWLY_INFECTED),
                (Position::new(1, 0), InfectionStatus::Susceptible),
            ],
        )
        .unwrap();
        simulation.one_round();
        assert!(simulation.status(HostId(1)).unwrap().is_susceptible());
        assert_eq!(simulation.buckets().len(), 1);
    }

    #[test]
    fn contact_reads_where_the_patient_ended_last_round() {
        let mut simulation = Simulation::from_hosts(
            parameters(3, 2, 10, 5),
            [
                (Position::ORIGIN, InfectionStatus::NEWLY_INFECTED),
                (Position::new(3, 3), InfectionStatus::Susceptible),
            ],
        )
        .unwrap();
        simulation.one_round();
        assert!(simulation.status(HostId(1)).unwrap().is_susceptible());

        let end_of_round_one = simulation.population().get(HostId(0)).unwrap().position;
        assert_ne!(end_of_round_one, Position::ORIGIN);
        assert!(simulation.buckets().is_occupied(end_of_round_one));
        for host in simulation.population.iter_mut() {
            if host.id() == HostId(1) {
                host.position = end_of_round_one;
            }
        }

        simulation.one_round();
        assert_eq!(
            simulation.status(HostId(1)),
            Some(InfectionStatus::NEWLY_INFECTED)
        );
        assert_eq!(
            simulation.status(HostId(0)),
            Some(InfectionStatus::Infected { age: 2 })
        );
    }

    #[test]
    fn new_infections_do_not_age_in_the_same_round() {
        let mut simulation = Simulation::from_hosts(
            parameters(0, 2, 3, 1),
            [
                (Position::ORIGIN, InfectionStatus::NEWLY_INFECTED),
                (Position::ORIGIN, InfectionStatus::Susceptible),
            ],
        )
        .unwrap();
        simulation.one_round();
        assert_eq!(
            simulation.status(HostId(0)),
            Some(InfectionStatus::Infected { age: 1 })
        );
        assert_eq!(
            simulation.status(HostId(1)),
            Some(InfectionStatus::NEWLY_INFECTED)
        );
    }

    #[test]
    fn recovers_exactly_at_infectious_period() {
        let mut simulation = Simulation::from_hosts(
            parameters(4, 1, 3, 7),
            [(Position::ORIGIN, InfectionStatus::NEWLY_INFECTED)],
        )
        .unwrap();
        assert!(simulation.one_round().has_infected());
        assert!(simulation.one_round().has_infected());
        let summary = simulation.one_round();
        assert!(!summary.has_infected());
        assert_eq!(summary.recovered, 1);
        assert!(simulation.buckets().is_empty());
    }

    #[test]
    fn buckets_hold_exactly_the_infected_hosts() {
        let mut simulation = Simulation::new(parameters(3, 60, 4, 13));
        for _ in 0..20 {
            simulation.one_round();
            let infected: Vec<&Host> = simulation.population().infected().collect();
            assert_eq!(simulation.buckets().len(), infected.len());
            for host in infected {
                let slot = simulation.buckets().slot_for(host.position);
                assert!(simulation
                    .buckets()
                    .chain(slot)
                    .any(|entry| entry.id == host.id() && entry.position == host.position));
            }
        }
    }

    #[test]
    fn transitions_are_monotonic_and_population_is_conserved() {
        let params = parameters(2, 50, 3, 7).with_seed(99);
        let mut simulation = Simulation::new(params);
        let mut previous: Vec<InfectionStatus> =
            simulation.population().iter().map(|host| host.status).collect();

        loop {
            let summary = simulation.one_round();
            assert_eq!(summary.population(), params.population);

            for (before, host) in previous.iter().zip(simulation.population().iter()) {
                let after = host.status;
                match (*before, after) {
                    (InfectionStatus::Susceptible, InfectionStatus::Susceptible)
                    | (InfectionStatus::Recovered, InfectionStatus::Recovered) => {}
                    (InfectionStatus::Susceptible, InfectionStatus::Infected { age }) => {
                        assert_eq!(age, 0);
                    }
                    (
                        InfectionStatus::Infected { age: before_age },
                        InfectionStatus::Infected { age },
                    ) => {
                        assert_eq!(age, before_age + 1);
                        assert!(age < params.infectious_period);
                    }
                    (InfectionStatus::Infected { age }, InfectionStatus::Recovered) => {
                        assert_eq!(age + 1, params.infectious_period);
                    }
                    (before, after) => panic!("illegal transition {before:?} -> {after:?}"),
                }
            }

            previous = simulation.population().iter().map(|host| host.status).collect();
            if !summary.has_infected() {
                break;
            }
        }
    }

    #[test]
    fn runs_are_deterministic() {
        let params = parameters(4, 200, 5, 17).with_seed(2024);
        let mut first: Vec<Summary> = Vec::new();
        let mut second: Vec<Summary> = Vec::new();
        Simulation::new(params).run(&mut first).unwrap();
        Simulation::new(params).run(&mut second).unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn small_run_terminates() {
        let params = parameters(1, 5, 2, 3);
        let mut summaries: Vec<Summary> = Vec::new();
        let last = Simulation::new(params).run(&mut summaries).unwrap();

        // Every host is infected for exactly `T` rounds, at most once.
        assert!(summaries.len() <= params.population * params.infectious_period as usize + 1);
        assert_eq!(last.infected, 0);
        assert_eq!(last.susceptible + last.recovered, 5);
        assert_eq!(summaries.last(), Some(&last));
        assert!(summaries[..summaries.len() - 1]
            .iter()
            .all(Summary::has_infected));
    }

    #[test]
    fn single_cell_infects_everyone_in_round_one() {
        let params = parameters(0, 10, 4, 3);
        let mut simulation = Simulation::new(params);
        assert!(simulation
            .population()
            .iter()
            .all(|host| host.position == Position::ORIGIN));

        let summary = simulation.one_round();
        assert_eq!(summary.susceptible, 0);
        assert_eq!(summary.infected, 10);
        assert_eq!(
            simulation.status(HostId(0)),
            Some(InfectionStatus::Infected { age: 1 })
        );
    }

    #[test]
    fn from_hosts_validates_population() {
        let params = parameters(1, 2, 2, 3);
        assert!(matches!(
            Simulation::from_hosts(params, [(Position::ORIGIN, InfectionStatus::Susceptible)]),
            Err(GridSirError::InvalidPopulation(_))
        ));
        assert!(matches!(
            Simulation::from_hosts(
                params,
                [
                    (Position::ORIGIN, InfectionStatus::NEWLY_INFECTED),
                    (Position::new(2, 0), InfectionStatus::Susceptible),
                ],
            ),
            Err(GridSirError::InvalidPopulation(_))
        ));
    }
}
