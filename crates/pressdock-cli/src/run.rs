//! Run the provisioning sequence against the real toolchain.

use anyhow::{Context, Result};
use colored::Colorize;
use pressdock_core::util::SystemRunner;
use pressdock_core::ProjectConfig;
use pressdock_provision::{ProvisionReport, Sequencer};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub async fn execute(config: ProjectConfig, project_dir: &Path, progress: bool) -> Result<()> {
    debug!("Provisioning project in {:?}", project_dir);

    let runner = Arc::new(SystemRunner::new().with_working_dir(project_dir));
    let mut sequencer = Sequencer::new(config, runner).with_progress(progress);

    let result = sequencer.run().await;
    if progress {
        print_summary(sequencer.report());
    }

    result.with_context(|| format!("Provisioning stopped in state {}", failed_in(sequencer.report())))
}

/// State the run was in when it failed.
fn failed_in(report: &ProvisionReport) -> String {
    let states = &report.states;
    match states.len() {
        0 | 1 => states.first().map(ToString::to_string).unwrap_or_default(),
        n => states[n - 2].to_string(),
    }
}

fn print_summary(report: &ProvisionReport) {
    if !report.generated_keys.is_empty() {
        println!(
            "  {} {} new credential entr{}",
            "→".cyan(),
            report.generated_keys.len(),
            if report.generated_keys.len() == 1 { "y" } else { "ies" }
        );
    }
    if report.rendered_compose {
        println!("  {} rendered compose file", "→".cyan());
    }

    let changed = report.changed_steps().count();
    if changed > 0 {
        println!("  {} {} step(s) changed the site", "→".cyan(), changed);
    } else if report.is_success() {
        println!("  {} site already up to date", "→".cyan());
    }
}
