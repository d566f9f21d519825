//! Per-round state counts and the reporters that emit them.
//!
//! A `Summary` is computed after every round. Its `has_infected()` value is the simulation's
//! continuation signal; everything else is for reporting.

use std::io::Write;

use serde::Serialize;

use crate::error::GridSirError;
use crate::hosts::{Host, InfectionStatus};

pub const TEXT_HEADER: &str = "    S        I        R";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub round: usize,
    pub susceptible: usize,
    pub infected: usize,
    pub recovered: usize,
}

/// Fractions of the population in each state.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Proportions {
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
}

impl Summary {
    #[must_use]
    pub fn from_hosts(round: usize, hosts: &[Host]) -> Self {
        let mut summary = Summary {
            round,
            ..Summary::default()
        };
        for host in hosts {
            match host.status {
                InfectionStatus::Susceptible => summary.susceptible += 1,
                InfectionStatus::Infected { .. } => summary.infected += 1,
                InfectionStatus::Recovered => summary.recovered += 1,
            }
        }
        summary
    }

    #[must_use]
    pub fn population(&self) -> usize {
        self.susceptible + self.infected + self.recovered
    }

    #[must_use]
    pub fn has_infected(&self) -> bool {
        self.infected > 0
    }

    /// All zero for an empty population.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn proportions(&self) -> Proportions {
        let population = self.population();
        if population == 0 {
            return Proportions {
                susceptible: 0.0,
                infected: 0.0,
                recovered: 0.0,
            };
        }
        let total = population as f64;
        Proportions {
            susceptible: self.susceptible as f64 / total,
            infected: self.infected as f64 / total,
            recovered: self.recovered as f64 / total,
        }
    }
}

pub trait Reporter {
    /// Called once per round, including the final round with no infected hosts.
    ///
    /// # Errors
    /// Returns an error if the summary could not be written.
    fn report(&mut self, summary: &Summary) -> Result<(), GridSirError>;
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, summary: &Summary) -> Result<(), GridSirError> {
        (**self).report(summary)
    }
}

/// Collects every summary in memory.
impl Reporter for Vec<Summary> {
    fn report(&mut self, summary: &Summary) -> Result<(), GridSirError> {
        self.push(*summary);
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SummaryFormat {
    /// A header line followed by the S, I and R proportions.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    #[serde(flatten)]
    summary: &'a Summary,
    proportions: Proportions,
}

/// Writes summaries to a console stream.
pub struct ConsoleReporter<W: Write> {
    writer: W,
    format: SummaryFormat,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(writer: W, format: SummaryFormat) -> Self {
        ConsoleReporter { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, summary: &Summary) -> Result<(), GridSirError> {
        let proportions = summary.proportions();
        match self.format {
            SummaryFormat::Text => {
                writeln!(self.writer, "{TEXT_HEADER}")?;
                writeln!(
                    self.writer,
                    "{:.6} {:.6} {:.6}",
                    proportions.susceptible, proportions.infected, proportions.recovered
                )?;
            }
            SummaryFormat::Json => {
                let record = JsonRecord {
                    summary,
                    proportions,
                };
                serde_json::to_writer(&mut self.writer, &record)?;
                writeln!(self.writer)?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}
