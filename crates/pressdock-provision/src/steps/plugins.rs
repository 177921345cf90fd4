//! Plugin installation and activation.

use pressdock_types::Result;
use tracing::info;

use super::StepContext;
use crate::step::{ensure, StepOutcome, StepRecord};

/// Install every configured plugin that is missing, then activate them all.
///
/// Activation runs unconditionally: a plugin can be present on disk but
/// inactive, and WP-CLI leaves already active plugins alone.
pub async fn install_plugins(ctx: &StepContext<'_>) -> Result<Vec<StepRecord>> {
    let plugins = &ctx.config.plugins;
    let mut records = Vec::with_capacity(plugins.len() + 1);

    for plugin in plugins {
        let record = ensure(
            &format!("install plugin {}", plugin),
            || ctx.wp.plugin_is_installed(plugin),
            || ctx.wp.plugin_install(plugin, true),
        )
        .await?;
        records.push(record);
    }

    if plugins.is_empty() {
        info!("No plugins configured");
        return Ok(records);
    }

    let installed = records.iter().filter(|r| r.outcome.changed()).count();
    info!("{} plugin(s) installed, {} already present", installed, plugins.len() - installed);

    ctx.wp.plugin_activate(plugins).await?;
    records.push(StepRecord::new("activate plugins", StepOutcome::Applied));
    Ok(records)
}
