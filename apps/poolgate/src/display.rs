//! Output rendering and formatting

use crate::error::CliError;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use poolgate_config::Config;
use poolgate_driver::SimulationReport;
use poolgate_errors::UserFacingError;
use std::io;

/// Output renderer for CLI results
#[derive(Clone, Copy)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    /// Render a finished simulation
    pub fn render_report(self, report: &SimulationReport) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Category").add_attribute(Attribute::Bold),
                Cell::new("Capacity").add_attribute(Attribute::Bold),
                Cell::new("Clients served").add_attribute(Attribute::Bold),
                Cell::new("In use at end").add_attribute(Attribute::Bold),
            ]);

        let served = report.per_category();
        for usage in &report.final_snapshot.categories {
            table.add_row(vec![
                Cell::new(usage.category.as_str()),
                Cell::new(usage.capacity),
                Cell::new(served.get(&usage.category).copied().unwrap_or(0)),
                Cell::new(usage.used),
            ]);
        }

        println!("{table}");
        println!(
            "{} clients in {} ms using {} wake strategy",
            report.outcomes.len(),
            report.elapsed_ms,
            report.strategy
        );
        println!(
            "Peak occupancy {}/{}, {} clients waited (longest {} ms)",
            report.peak_total,
            report.final_snapshot.total_capacity,
            report.waited_count(),
            report.max_wait_ms()
        );
        if report.is_drained() {
            println!("[OK] Pool drained");
        } else {
            println!("[ERROR] Pool not drained: {:?}", report.final_snapshot);
        }
        Ok(())
    }

    /// Render the effective configuration
    pub fn render_config(self, config: &Config) -> Result<(), CliError> {
        if self.json_output {
            let json = serde_json::to_string_pretty(config).map_err(io::Error::other)?;
            println!("{json}");
        } else {
            print!("{}", config.to_toml_string()?);
        }
        Ok(())
    }

    /// Render a failed command
    ///
    /// JSON mode prints a structured error object on stdout so scripted
    /// callers can parse failures the same way as reports.
    pub fn render_error(self, err: &CliError) {
        if !self.json_output {
            eprintln!("Error: {err}");
            return;
        }

        let value = match err {
            CliError::Core(e) => serde_json::json!({
                "error": e,
                "message": e.user_message(),
                "code": e.user_code(),
                "hint": e.user_hint(),
                "retryable": e.is_retryable(),
            }),
            other => serde_json::json!({ "message": other.to_string() }),
        };
        match serde_json::to_string_pretty(&value) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error: {err}"),
        }
    }
}
