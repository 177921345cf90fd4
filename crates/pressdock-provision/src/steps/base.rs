//! WordPress core installation.

use pressdock_services::SiteInstall;
use pressdock_types::Result;

use super::StepContext;
use crate::step::{ensure, StepRecord};

/// Install WordPress core unless its tables already exist.
pub async fn install_core(ctx: &StepContext<'_>) -> Result<StepRecord> {
    let site = SiteInstall {
        url: ctx.credentials.url.clone(),
        title: ctx.credentials.title.clone(),
        admin_user: ctx.credentials.admin_user.clone(),
        admin_password: ctx.credentials.admin_password.clone(),
        admin_email: ctx.credentials.admin_email.clone(),
    };

    ensure(
        "install core",
        || ctx.wp.core_is_installed(),
        || ctx.wp.core_install(&site),
    )
    .await
}
