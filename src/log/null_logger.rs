/*!

This module provides a "logger" that does not output anything anywhere but satisfies the public API.

*/

use crate::log::LogConfiguration;

impl LogConfiguration {
    /// Sets the global logger to conform to this `LogConfiguration`.
    pub(in crate::log) fn set_config(&mut self) {
        // No global logger. We still keep up appearances.
        let module_max = self
            .module_configurations
            .values()
            .map(|module_config| module_config.level)
            .max()
            .unwrap_or(log::LevelFilter::Off);
        log::set_max_level(self.global_log_level.max(module_max));
    }
}
