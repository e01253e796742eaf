//! Statistics of one collection command
//!
//! Collecting basic info for an OAB touches one page per seed. Failures on
//! individual processes are counted here instead of aborting the command.

use crate::storage::Storage;
use crate::EsajError;

/// Outcome of collecting basic info for a set of seeds
#[derive(Debug, Clone, Default)]
pub struct CollectionStatistics {
    /// OAB the seeds came from
    pub oab: String,

    /// Seeds found by the enumeration
    pub seeds_found: usize,

    /// Processes whose basic info was saved
    pub collected: usize,

    /// `(process_id, error)` for every process that failed
    pub failures: Vec<(String, String)>,

    /// Processes stored for the OAB after the run, older ones included
    pub stored_for_oab: usize,
}

impl CollectionStatistics {
    pub fn new(oab: &str, seeds_found: usize) -> Self {
        Self {
            oab: oab.to_string(),
            seeds_found,
            ..Default::default()
        }
    }

    pub fn record_success(&mut self) {
        self.collected += 1;
    }

    pub fn record_failure(&mut self, process_id: &str, error: &EsajError) {
        self.failures.push((process_id.to_string(), error.to_string()));
    }

    /// Percentage of seeds collected successfully
    pub fn success_rate(&self) -> f64 {
        if self.seeds_found > 0 {
            (self.collected as f64 / self.seeds_found as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Reads how many processes storage now holds for this OAB
    pub fn load_stored_count(&mut self, storage: &dyn Storage) -> Result<(), EsajError> {
        self.stored_for_oab = storage.basic_info_by_oab(&self.oab)?.len();
        Ok(())
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CollectionStatistics) {
    println!("=== Collection Statistics (OAB {}) ===\n", stats.oab);

    println!("Overview:");
    println!("  Seeds found: {}", stats.seeds_found);
    println!("  Basic info collected: {}", stats.collected);
    println!("  Stored for this OAB: {}", stats.stored_for_oab);
    println!();

    if !stats.failures.is_empty() {
        println!("Failures ({}):", stats.failures.len());
        for (process_id, error) in &stats.failures {
            println!("  - {}: {}", process_id, error);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} processes collected)",
        stats.success_rate(),
        stats.collected,
        stats.seeds_found
    );
}
