//! Custom theme deployment.
//!
//! The theme directory is replaced wholesale on every run: remove, recreate,
//! copy, then normalize ownership and permissions before activating.

use pressdock_types::{Result, StepPolicy};
use tracing::debug;

use super::StepContext;
use crate::step::{StepOutcome, StepRecord};

/// Commands run in the application service, in order, before the copy.
fn prepare_commands(target: &str) -> Vec<Vec<String>> {
    vec![
        vec!["rm".into(), "-rf".into(), target.into()],
        vec!["mkdir".into(), "-p".into(), target.into()],
    ]
}

/// Commands that normalize the copied tree.
fn normalize_commands(target: &str, owner: &str, dir_mode: &str, file_mode: &str) -> Vec<Vec<String>> {
    let chmod = |kind: &str, mode: &str| -> Vec<String> {
        ["find", target, "-type", kind, "-exec", "chmod", mode, "{}", "+"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    };

    vec![
        vec!["chown".into(), "-R".into(), owner.into(), target.into()],
        chmod("d", dir_mode),
        chmod("f", file_mode),
    ]
}

/// Copy the local theme into the application service and activate it.
pub async fn deploy_theme(ctx: &StepContext<'_>) -> Result<Vec<StepRecord>> {
    let theme = &ctx.config.theme;
    let service = &ctx.config.services.application;
    let target = theme.target_dir();

    for argv in prepare_commands(&target) {
        ctx.compose.exec("prepare theme directory", service, &argv, StepPolicy::Fatal).await?;
    }

    ctx.compose
        .copy_into("copy theme", &ctx.config.paths.theme_source, service, &target)
        .await?;

    for argv in normalize_commands(&target, &theme.owner, &theme.dir_mode, &theme.file_mode) {
        ctx.compose.exec("set theme permissions", service, &argv, StepPolicy::Fatal).await?;
    }
    debug!("Theme copied to {}:{}", service, target);

    ctx.wp.theme_activate(&theme.slug).await?;

    Ok(vec![
        StepRecord::new(format!("deploy theme to {}", target), StepOutcome::Applied),
        StepRecord::new(format!("activate theme {}", theme.slug), StepOutcome::Applied),
    ])
}
