// Loss of precision is allowable in this module's use cases.
#![allow(clippy::cast_precision_loss)]

use std::io::{self, Write};
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use humantime::format_duration;
use log::{debug, error, info};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// How frequently we update the max memory used value.
const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// A container struct for computed final statistics. If the population is empty the per host
/// statistics are zero, as they are meaningless.
#[derive(Debug)]
pub struct ExecutionStatistics {
    pub max_memory_usage: u64,
    pub cpu_time: Duration,
    pub wall_time: Duration,
    pub rounds: usize,

    // Per host stats
    pub population: usize,
    pub cpu_time_per_host: Duration,
    pub wall_time_per_host: Duration,
    pub memory_per_host: u64,
}

pub struct ExecutionProfilingCollector {
    /// Simulation start time, used to compute elapsed wall time for the simulation execution
    start_time: Instant,
    /// We keep track of the last time we refreshed so that client code doesn't have to and can
    /// just call `ExecutionProfilingCollector::refresh` once per round.
    last_refresh: Instant,
    /// The accumulated CPU time of the process in CPU-milliseconds at simulation start
    start_cpu_time: u64,
    /// The maximum amount of real memory used by the process as reported by
    /// `sysinfo::System::process::memory()`, polled during execution.
    max_memory_usage: u64,
    /// A `sysinfo::System` for polling memory use
    system: System,
    /// Current process, `None` on unsupported platforms
    process_id: Option<Pid>,
}

impl Default for ExecutionProfilingCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionProfilingCollector {
    #[must_use]
    pub fn new() -> ExecutionProfilingCollector {
        let process_id = sysinfo::get_current_pid().ok();
        let now = Instant::now();

        let mut new_stats = ExecutionProfilingCollector {
            start_time: now,
            last_refresh: now,
            start_cpu_time: 0,
            max_memory_usage: 0,
            system: System::new(),
            process_id,
        };
        if let Some(process_id) = process_id {
            debug!("Process ID: {}", process_id);
            new_stats.update_system_info(ProcessRefreshKind::nothing().with_cpu().with_memory());
            if let Some(process) = new_stats.system.process(process_id) {
                new_stats.max_memory_usage = process.memory();
                new_stats.start_cpu_time = process.accumulated_cpu_time();
            }
        }

        new_stats
    }

    /// If at least `REFRESH_INTERVAL` (1 second) has passed since the previous
    /// refresh, memory usage is polled and updated. Call this method as frequently
    /// as you like, as it takes care of limiting polling frequency itself.
    #[inline]
    pub fn refresh(&mut self) {
        if self.last_refresh.elapsed() >= REFRESH_INTERVAL {
            self.poll_memory();
            self.last_refresh = Instant::now();
        }
    }

    /// Updates maximum memory usage. This is a relatively expensive system call.
    fn poll_memory(&mut self) {
        if let Some(pid) = self.process_id {
            self.update_system_info(ProcessRefreshKind::nothing().with_memory());
            if let Some(process) = self.system.process(pid) {
                self.max_memory_usage = self.max_memory_usage.max(process.memory());
            }
        }
    }

    /// Refreshes the internal `sysinfo::System` object for this process using the given
    /// `ProcessRefreshKind`.
    #[inline]
    fn update_system_info(&mut self, process_refresh_kind: ProcessRefreshKind) {
        if let Some(pid) = self.process_id {
            if self.system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                process_refresh_kind,
            ) < 1
            {
                error!("could not refresh process statistics");
            }
        }
    }

    /// Computes the final summary statistics
    pub fn compute_final_statistics(
        &mut self,
        population: usize,
        rounds: usize,
    ) -> ExecutionStatistics {
        let mut cpu_time_millis = 0;

        if let Some(pid) = self.process_id {
            self.update_system_info(ProcessRefreshKind::nothing().with_cpu().with_memory());
            if let Some(process) = self.system.process(pid) {
                self.max_memory_usage = self.max_memory_usage.max(process.memory());
                cpu_time_millis = process
                    .accumulated_cpu_time()
                    .saturating_sub(self.start_cpu_time);
            }
        }

        let cpu_time = Duration::from_millis(cpu_time_millis);
        let wall_time = self.start_time.elapsed();

        let (cpu_time_per_host, wall_time_per_host, memory_per_host) = if population > 0 {
            (
                Duration::from_secs_f64(cpu_time_millis as f64 / population as f64 / 1000.0),
                Duration::from_secs_f64(wall_time.as_secs_f64() / population as f64),
                self.max_memory_usage / population as u64,
            )
        } else {
            (Duration::ZERO, Duration::ZERO, 0)
        };

        ExecutionStatistics {
            max_memory_usage: self.max_memory_usage,
            cpu_time,
            wall_time,
            rounds,
            population,
            cpu_time_per_host,
            wall_time_per_host,
            memory_per_host,
        }
    }
}

/// Writes execution statistics to `writer`, typically stderr.
///
/// # Errors
/// Returns any error raised by `writer`.
pub fn write_execution_statistics<W: Write>(
    writer: &mut W,
    summary: &ExecutionStatistics,
) -> io::Result<()> {
    writeln!(writer, "━━━━ Execution Summary ━━━━")?;
    if summary.max_memory_usage == 0 {
        writeln!(
            writer,
            "Memory and CPU statistics are not available on your platform."
        )?;
    } else {
        writeln!(
            writer,
            "{:<25}{}",
            "Max memory usage:",
            ByteSize::b(summary.max_memory_usage)
        )?;
        writeln!(writer, "{:<25}{}", "CPU time:", format_duration(summary.cpu_time))?;
    }

    writeln!(writer, "{:<25}{}", "Wall time:", format_duration(summary.wall_time))?;
    writeln!(writer, "{:<25}{}", "Rounds:", summary.rounds)?;

    if summary.population > 0 {
        writeln!(writer, "{:<25}{}", "Population:", summary.population)?;
        if summary.max_memory_usage > 0 {
            writeln!(
                writer,
                "{:<25}{}",
                "Memory per host:",
                ByteSize::b(summary.memory_per_host)
            )?;
            writeln!(
                writer,
                "{:<25}{}",
                "CPU time per host:",
                format_duration(summary.cpu_time_per_host)
            )?;
        }
        writeln!(
            writer,
            "{:<25}{}",
            "Wall time per host:",
            format_duration(summary.wall_time_per_host)
        )?;
    }
    Ok(())
}

/// Logs execution statistics with the logging system.
pub fn log_execution_statistics(stats: &ExecutionStatistics) {
    info!("Execution complete.");
    if stats.max_memory_usage == 0 {
        info!("Memory and CPU statistics are not available on your platform.");
    } else {
        info!("Max memory usage: {}", ByteSize::b(stats.max_memory_usage));
        info!("CPU time: {}", format_duration(stats.cpu_time));
    }
    info!("Wall time: {}", format_duration(stats.wall_time));
    info!("Rounds: {}", stats.rounds);
    if stats.population > 0 {
        info!(
            "Wall time per host: {}",
            format_duration(stats.wall_time_per_host)
        );
    }
}
