//! WP-CLI client.
//!
//! Commands run inside the transient helper service through
//! [`Compose::exec`]. Existence checks use the exit status of WP-CLI's own
//! `is-installed` commands; listing commands are parsed from JSON output.

use pressdock_types::{PressdockError, Result, ServiceName, Slug, StepPolicy};
use serde::Deserialize;
use tracing::debug;

use crate::compose::Compose;

/// Parameters of `wp core install`.
#[derive(Debug, Clone)]
pub struct SiteInstall {
    /// Public site URL
    pub url: String,
    /// Site title
    pub title: String,
    /// Administrator login
    pub admin_user: String,
    /// Administrator password
    pub admin_password: String,
    /// Administrator email
    pub admin_email: String,
}

#[derive(Debug, Deserialize)]
struct PostRow {
    #[serde(rename = "ID")]
    id: u64,
}

/// WP-CLI client bound to the helper service.
#[derive(Clone)]
pub struct WpCli {
    compose: Compose,
    service: ServiceName,
}

impl WpCli {
    /// Create a client issuing commands in `service`.
    pub fn new(compose: Compose, service: ServiceName) -> Self {
        Self { compose, service }
    }

    async fn wp(&self, step: &str, args: Vec<String>, policy: StepPolicy) -> Result<pressdock_types::CommandOutput> {
        let argv = wp_argv(args);
        self.compose.exec(step, &self.service, &argv, policy).await
    }

    /// Post bodies go over stdin (`-` file argument) so their size is not
    /// bounded by `ARG_MAX`.
    async fn wp_with_body(&self, step: &str, args: Vec<String>, body: &str) -> Result<pressdock_types::CommandOutput> {
        let argv = wp_argv(args);
        self.compose
            .exec_with_input(step, &self.service, &argv, body, StepPolicy::Fatal)
            .await
    }

    async fn check(&self, args: &[&str]) -> Result<bool> {
        let mut argv = vec!["wp"];
        argv.extend_from_slice(args);
        self.compose.probe(&self.service, &argv).await
    }

    /// Whether WordPress core tables exist.
    pub async fn core_is_installed(&self) -> Result<bool> {
        self.check(&["core", "is-installed"]).await
    }

    /// Run the WordPress installer.
    pub async fn core_install(&self, site: &SiteInstall) -> Result<()> {
        self.wp(
            "install core",
            vec![
                "core".into(),
                "install".into(),
                format!("--url={}", site.url),
                format!("--title={}", site.title),
                format!("--admin_user={}", site.admin_user),
                format!("--admin_password={}", site.admin_password),
                format!("--admin_email={}", site.admin_email),
                "--skip-email".into(),
            ],
            StepPolicy::Fatal,
        )
        .await?;
        Ok(())
    }

    /// Whether a plugin is present on disk.
    pub async fn plugin_is_installed(&self, plugin: &Slug) -> Result<bool> {
        self.check(&["plugin", "is-installed", plugin.as_str()]).await
    }

    /// Install a plugin from the directory, optionally activating it.
    pub async fn plugin_install(&self, plugin: &Slug, activate: bool) -> Result<()> {
        let mut args = vec!["plugin".to_string(), "install".to_string(), plugin.to_string()];
        if activate {
            args.push("--activate".to_string());
        }
        self.wp("install plugin", args, StepPolicy::Fatal).await?;
        Ok(())
    }

    /// Activate plugins; already active ones are left alone by WP-CLI.
    pub async fn plugin_activate(&self, plugins: &[Slug]) -> Result<()> {
        if plugins.is_empty() {
            return Ok(());
        }
        let mut args = vec!["plugin".to_string(), "activate".to_string()];
        args.extend(plugins.iter().map(Slug::to_string));
        self.wp("activate plugins", args, StepPolicy::Fatal).await?;
        Ok(())
    }

    /// Switch the active theme.
    pub async fn theme_activate(&self, theme: &Slug) -> Result<()> {
        self.wp(
            "activate theme",
            vec!["theme".into(), "activate".into(), theme.to_string()],
            StepPolicy::Fatal,
        )
        .await?;
        Ok(())
    }

    /// Write an option. Returns whether the write succeeded.
    ///
    /// Under [`StepPolicy::BestEffort`] a failed write is logged and
    /// reported as `Ok(false)`.
    pub async fn option_update(&self, name: &str, value: &str, policy: StepPolicy) -> Result<bool> {
        let output = self
            .wp(
                &format!("update option {}", name),
                vec!["option".into(), "update".into(), name.into(), value.into()],
                policy,
            )
            .await?;
        Ok(output.success())
    }

    /// Set a theme modification of the active theme. Returns whether the
    /// write succeeded, as for [`WpCli::option_update`].
    pub async fn theme_mod_set(&self, name: &str, value: &str, policy: StepPolicy) -> Result<bool> {
        let output = self
            .wp(
                &format!("set theme mod {}", name),
                vec!["theme".into(), "mod".into(), "set".into(), name.into(), value.into()],
                policy,
            )
            .await?;
        Ok(output.success())
    }

    /// Find a post of `post_type` by its slug, in any status.
    pub async fn post_find(&self, post_type: &str, name: &str) -> Result<Option<u64>> {
        let output = self
            .wp(
                "find post",
                vec![
                    "post".into(),
                    "list".into(),
                    format!("--post_type={}", post_type),
                    format!("--name={}", name),
                    "--post_status=any".into(),
                    "--fields=ID".into(),
                    "--format=json".into(),
                ],
                StepPolicy::Fatal,
            )
            .await?;

        let rows: Vec<PostRow> = if output.stdout.is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&output.stdout)?
        };
        debug!("{} post(s) of type {} named {}", rows.len(), post_type, name);
        Ok(rows.first().map(|row| row.id))
    }

    /// Create a published post and return its id.
    pub async fn post_create(&self, post_type: &str, name: &str, content: &str) -> Result<u64> {
        let output = self
            .wp_with_body(
                "create post",
                vec![
                    "post".into(),
                    "create".into(),
                    "-".into(),
                    format!("--post_type={}", post_type),
                    format!("--post_name={}", name),
                    format!("--post_title={}", name),
                    "--post_status=publish".into(),
                    "--porcelain".into(),
                ],
                content,
            )
            .await?;

        output.stdout.trim().parse().map_err(|_| {
            PressdockError::Other(format!(
                "wp post create returned '{}' instead of a post id",
                output.stdout
            ))
        })
    }

    /// Replace the content of an existing post.
    pub async fn post_update(&self, id: u64, content: &str) -> Result<()> {
        self.wp_with_body(
            "update post",
            vec!["post".into(), "update".into(), id.to_string(), "-".into()],
            content,
        )
        .await?;
        Ok(())
    }
}

fn wp_argv(args: Vec<String>) -> Vec<String> {
    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push("wp".to_string());
    argv.extend(args);
    argv
}
