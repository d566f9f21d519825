use std::fmt::{self, Display};

use rand::Rng;

use crate::grid::{Grid, Position};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostId(pub usize);

impl Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Disease state of a host. `age` counts rounds spent infected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InfectionStatus {
    Susceptible,
    Infected { age: u32 },
    Recovered,
}

impl InfectionStatus {
    /// A freshly infected host.
    pub const NEWLY_INFECTED: InfectionStatus = InfectionStatus::Infected { age: 0 };

    #[must_use]
    pub fn is_susceptible(&self) -> bool {
        matches!(self, InfectionStatus::Susceptible)
    }

    #[must_use]
    pub fn is_infected(&self) -> bool {
        matches!(self, InfectionStatus::Infected { .. })
    }

    #[must_use]
    pub fn is_recovered(&self) -> bool {
        matches!(self, InfectionStatus::Recovered)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Host {
    id: HostId,
    pub position: Position,
    pub status: InfectionStatus,
}

impl Host {
    #[must_use]
    pub fn new(id: HostId, position: Position, status: InfectionStatus) -> Self {
        Host {
            id,
            position,
            status,
        }
    }

    #[must_use]
    pub fn id(&self) -> HostId {
        self.id
    }
}

/// The fixed-size set of hosts. Host `i` always has id `HostId(i)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Population {
    hosts: Vec<Host>,
}

impl Population {
    /// Host 0 starts infected at the origin; every other host starts susceptible on a uniformly
    /// drawn cell.
    pub fn generate<R: Rng + ?Sized>(size: usize, grid: &Grid, rng: &mut R) -> Self {
        let mut hosts = Vec::with_capacity(size);
        for i in 0..size {
            let host = if i == 0 {
                Host::new(HostId(0), Position::ORIGIN, InfectionStatus::NEWLY_INFECTED)
            } else {
                let position = grid.sample_position(rng);
                Host::new(HostId(i), position, InfectionStatus::Susceptible)
            };
            hosts.push(host);
        }
        Population { hosts }
    }

    /// Builds a population from explicit `(position, status)` pairs, in id order.
    pub fn from_states<I>(states: I) -> Self
    where
        I: IntoIterator<Item = (Position, InfectionStatus)>,
    {
        let hosts = states
            .into_iter()
            .enumerate()
            .map(|(i, (position, status))| Host::new(HostId(i), position, status))
            .collect();
        Population { hosts }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: HostId) -> Option<&Host> {
        self.hosts.get(id.0)
    }

    #[must_use]
    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn iter(&self) -> impl Iterator<Item = &Host> {
        self.hosts.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Host> {
        self.hosts.iter_mut()
    }

    pub fn infected(&self) -> impl Iterator<Item = &Host> {
        self.hosts.iter().filter(|host| host.status.is_infected())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn generated_population_has_one_patient() {
        let grid = Grid::new(4);
        let mut rng = SmallRng::seed_from_u64(42);
        let population = Population::generate(100, &grid, &mut rng);

        assert_eq!(population.len(), 100);
        let patient = population.get(HostId(0)).unwrap();
        assert_eq!(patient.position, Position::ORIGIN);
        assert_eq!(patient.status, InfectionStatus::NEWLY_INFECTED);
        assert_eq!(population.infected().count(), 1);
        for (i, host) in population.iter().enumerate() {
            assert_eq!(host.id(), HostId(i));
            assert!(grid.contains(host.position));
            if i > 0 {
                assert!(host.status.is_susceptible());
            }
        }
    }

    #[test]
    fn generation_is_reproducible() {
        let grid = Grid::new(10);
        let a = Population::generate(50, &grid, &mut SmallRng::seed_from_u64(1));
        let b = Population::generate(50, &grid, &mut SmallRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn from_states_assigns_ids_in_order() {
        let population = Population::from_states([
            (Position::new(1, 1), InfectionStatus::Recovered),
            (Position::new(0, 0), InfectionStatus::Susceptible),
        ]);
        assert_eq!(population.get(HostId(1)).unwrap().position, Position::ORIGIN);
        assert!(population.get(HostId(0)).unwrap().status.is_recovered());
        assert!(population.get(HostId(2)).is_none());
    }
}
