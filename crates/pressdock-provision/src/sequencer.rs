//! Provisioning sequencer.
//!
//! Drives a project from nothing to a configured WordPress site through the
//! states of [`ProvisionState`]. Every step is idempotent, so rerunning the
//! sequencer against a provisioned stack converges without changes.
//!
//! The helper service is stopped exactly once after the stack was started,
//! whether the run succeeded, failed or was interrupted.

use pressdock_core::util::count_files;
use pressdock_core::{term, time::pretty_duration, ProjectConfig};
use pressdock_secrets::{validator, CredentialPlan, EnvStore, SiteCredentials};
use pressdock_services::{template, Compose, ComposeConfig, WpCli};
use pressdock_types::{bail, bug};
use pressdock_types::{CommandRunner, PressdockError, ProvisionState, Result, ServiceName};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::poller::{wait_until_ready, RetryPolicy};
use crate::report::ProvisionReport;
use crate::steps::{self, StepContext};

/// Owns the transient helper service for the duration of a run.
///
/// [`HelperGuard::release`] must be awaited on every path; dropping an
/// unreleased guard only logs, since stopping a service needs an async call.
pub struct HelperGuard {
    compose: Compose,
    service: ServiceName,
    released: bool,
}

impl HelperGuard {
    /// Take responsibility for stopping `service`.
    pub fn new(compose: Compose, service: ServiceName) -> Self {
        Self {
            compose,
            service,
            released: false,
        }
    }

    /// Guarded service.
    pub fn service(&self) -> &ServiceName {
        &self.service
    }

    /// Stop the helper service.
    pub async fn release(mut self) -> Result<()> {
        self.released = true;
        info!("Stopping helper service {}", self.service);
        self.compose.stop(&self.service).await
    }
}

impl Drop for HelperGuard {
    fn drop(&mut self) {
        if !self.released {
            warn!(
                "Helper service {} was left running; stop it with `docker compose stop {}`",
                self.service, self.service
            );
        }
    }
}

/// The provisioning state machine.
pub struct Sequencer {
    config: ProjectConfig,
    runner: Arc<dyn CommandRunner>,
    progress: bool,
    report: ProvisionReport,
}

impl Sequencer {
    /// Create a sequencer for a loaded project configuration.
    pub fn new(config: ProjectConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config,
            runner,
            progress: false,
            report: ProvisionReport::new(),
        }
    }

    /// Print timestamped progress lines to stdout.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Current state.
    pub fn state(&self) -> ProvisionState {
        self.report.state()
    }

    /// Record of the run so far.
    pub fn report(&self) -> &ProvisionReport {
        &self.report
    }

    /// Run the sequence, stopping early on Ctrl-C.
    pub async fn run(&mut self) -> Result<()> {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };
        self.run_until(shutdown).await
    }

    /// Run the sequence, stopping early when `shutdown` completes.
    ///
    /// On any error the sequencer ends in [`ProvisionState::Failed`] and the
    /// error is returned unchanged.
    pub async fn run_until<S>(&mut self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        if self.state() != ProvisionState::Init {
            bug!("provisioning sequence started twice");
        }

        match self.execute(shutdown).await {
            Ok(()) => {
                self.report.finish();
                self.summarize();
                Ok(())
            }
            Err(e) => {
                error!("Provisioning failed during {}: {}", self.state(), e);
                if self.state().can_transition_to(ProvisionState::Failed) {
                    self.report.states.push(ProvisionState::Failed);
                }
                self.report.fail(&e);
                Err(e)
            }
        }
    }

    fn transition(&mut self, next: ProvisionState) -> Result<()> {
        let current = self.state();
        if !current.can_transition_to(next) {
            bug!("illegal provisioning transition {} -> {}", current, next);
        }
        debug!("{} -> {}", current, next);
        self.report.states.push(next);
        Ok(())
    }

    fn announce(&self, message: &str) {
        if self.progress {
            term::step(message);
        } else {
            debug!("{}", message);
        }
    }

    fn summarize(&self) {
        let changed = self.report.changed_steps().count();
        info!(
            "Provisioning finished in {} ({} of {} steps changed something)",
            pretty_duration(self.report.duration()),
            changed,
            self.report.steps.len()
        );

        if !self.progress {
            return;
        }
        for step in self.report.tolerated_steps() {
            term::warn(&format!("{}: {}", step.name, step.outcome));
        }
        term::success(&format!(
            "Site ready at {} ({})",
            self.config.site.url,
            pretty_duration(self.report.duration())
        ));
    }

    async fn execute<S>(&mut self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        let compose = Compose::new(
            ComposeConfig::new(&self.config.paths.compose_file),
            Arc::clone(&self.runner),
        );

        self.announce("Checking prerequisites");
        self.preflight(&compose).await?;

        self.announce("Preparing credentials");
        let credentials = self.prepare_config()?;
        let compose = compose.with_redacted(credentials.secrets());
        let wp = WpCli::new(compose.clone(), self.config.services.helper.clone());

        let helper = HelperGuard::new(compose.clone(), self.config.services.helper.clone());
        let outcome = tokio::select! {
            result = self.provision(&compose, &wp, &credentials) => result,
            _ = shutdown => {
                warn!("Interrupted, cleaning up {}", helper.service());
                Err(PressdockError::Interrupted)
            }
        };

        let released = helper.release().await;
        self.report.helper_stopped = released.is_ok();

        match (outcome, released) {
            (Ok(()), Ok(())) => {
                self.transition(ProvisionState::HelperStopped)?;
                self.transition(ProvisionState::Done)
            }
            (Ok(()), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(stop_error)) => {
                warn!("Could not stop helper service: {}", stop_error);
                Err(e)
            }
        }
    }

    /// Checks that need no side effects. Nothing is written or started
    /// before these pass.
    async fn preflight(&self, compose: &Compose) -> Result<()> {
        compose.check_available().await?;

        let paths = &self.config.paths;
        if !paths.compose_file.exists() && !paths.compose_template.is_file() {
            bail!(
                MissingDependency,
                "no compose file at {:?} and no template at {:?} to render it from",
                paths.compose_file,
                paths.compose_template
            );
        }

        let stylesheet = paths.theme_source.join("style.css");
        if !stylesheet.is_file() {
            bail!(
                MissingDependency,
                "theme source {:?} has no style.css",
                paths.theme_source
            );
        }
        let files = count_files(&paths.theme_source)?;
        debug!("Theme source {:?} holds {} file(s)", paths.theme_source, files);

        if let Some(css) = &self.config.appearance.custom_css {
            if !css.is_file() {
                bail!(MissingDependency, "custom CSS file {:?} does not exist", css);
            }
        }

        Ok(())
    }

    /// Complete the credential store and render the compose file.
    fn prepare_config(&mut self) -> Result<SiteCredentials> {
        let paths = &self.config.paths;
        let mut store = EnvStore::load(&paths.env_file)?;
        let plan = CredentialPlan::for_site(&self.config.site);
        let generated = plan.apply(&mut store)?;

        let summary = validator::check(&plan, &store);
        for (key, warning) in &summary.warnings {
            warn!("{} in {:?}: {}", key, store.path(), warning);
        }
        if !summary.is_complete() {
            bug!("credential store still lacks {}", summary.missing.join(", "));
        }

        let rendered =
            template::render_if_absent(&paths.compose_template, &paths.compose_file, store.entries())?;
        let credentials = SiteCredentials::from_store(&store)?;

        self.report.generated_keys = generated;
        self.report.rendered_compose = rendered;
        self.transition(ProvisionState::ConfigReady)?;
        Ok(credentials)
    }

    async fn wait_for_database(&self, compose: &Compose, credentials: &SiteCredentials) -> Result<u32> {
        let database = &self.config.services.database;
        let argv = [
            "mariadb-admin".to_string(),
            "ping".to_string(),
            "-h".to_string(),
            "localhost".to_string(),
            "-uroot".to_string(),
            format!("-p{}", credentials.db_root_password),
            "--silent".to_string(),
        ];

        let policy = RetryPolicy::from(&self.config.readiness);
        wait_until_ready(database.as_str(), policy, |_| compose.probe(database, &argv)).await
    }

    async fn provision(
        &mut self,
        compose: &Compose,
        wp: &WpCli,
        credentials: &SiteCredentials,
    ) -> Result<()> {
        let config = self.config.clone();

        self.transition(ProvisionState::StackStarting)?;
        self.announce("Starting stack");
        compose.up(&config.services.all()).await?;
        self.transition(ProvisionState::StackReady)?;

        self.transition(ProvisionState::WaitingForDependency)?;
        self.announce(&format!("Waiting for {}", config.services.database));
        let attempts = self.wait_for_database(compose, credentials).await?;
        self.report.readiness_attempts = Some(attempts);
        self.transition(ProvisionState::DependencyReady)?;

        let ctx = StepContext {
            config: &config,
            credentials,
            compose,
            wp,
        };

        self.transition(ProvisionState::BaseInstalling)?;
        self.announce("Installing WordPress core");
        let record = steps::base::install_core(&ctx).await?;
        self.report.steps.push(record);

        self.transition(ProvisionState::PluginsInstalling)?;
        self.announce(&format!("Installing {} plugin(s)", config.plugins.len()));
        let records = steps::plugins::install_plugins(&ctx).await?;
        self.report.steps.extend(records);

        self.transition(ProvisionState::ThemeDeploying)?;
        self.announce(&format!("Deploying theme {}", config.theme.slug));
        let records = steps::theme::deploy_theme(&ctx).await?;
        self.report.steps.extend(records);

        self.transition(ProvisionState::PreferencesApplying)?;
        self.announce("Applying preferences");
        let records = steps::preferences::apply_preferences(&ctx).await?;
        self.report.steps.extend(records);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepOutcome;
    use crate::testing::FakeStack;
    use pressdock_secrets::plan::keys;
    use pressdock_types::config::ReadinessConfig;
    use std::fs;
    use tempfile::TempDir;

    const TEMPLATE: &str = "\
services:
  db:
    image: mariadb:11
    environment:
      MARIADB_ROOT_PASSWORD: \"{{MYSQL_ROOT_PASSWORD}}\"
      MARIADB_DATABASE: \"{{MYSQL_DATABASE}}\"
";

    fn project() -> (TempDir, ProjectConfig) {
        let temp_dir = TempDir::new().unwrap();
        let theme = temp_dir.path().join("theme");
        fs::create_dir(&theme).unwrap();
        fs::write(theme.join("style.css"), "/*\nTheme Name: Agency\n*/\n").unwrap();
        fs::write(theme.join("index.php"), "<?php\n").unwrap();
        fs::write(temp_dir.path().join("docker-compose.yml.template"), TEMPLATE).unwrap();

        let mut config = ProjectConfig::default();
        config.readiness = ReadinessConfig {
            max_attempts: 5,
            delay_secs: 0,
        };
        config.resolve_paths(temp_dir.path());
        (temp_dir, config)
    }

    async fn run(config: &ProjectConfig, stack: &Arc<FakeStack>) -> (Sequencer, Result<()>) {
        let mut sequencer = Sequencer::new(config.clone(), stack.clone());
        let result = sequencer.run_until(std::future::pending::<()>()).await;
        (sequencer, result)
    }

    #[tokio::test]
    async fn test_fresh_project_reaches_done() {
        let (temp_dir, config) = project();
        let stack = Arc::new(FakeStack::new());

        let (sequencer, result) = run(&config, &stack).await;
        result.unwrap();

        assert_eq!(sequencer.state(), ProvisionState::Done);
        assert_eq!(sequencer.report().states, ProvisionState::SEQUENCE.to_vec());
        assert_eq!(sequencer.report().generated_keys.len(), 17);
        assert!(sequencer.report().rendered_compose);
        assert!(sequencer.report().helper_stopped);
        assert_eq!(sequencer.report().readiness_attempts, Some(1));

        let store = EnvStore::load(temp_dir.path().join(".env")).unwrap();
        assert_eq!(store.len(), 17);
        let compose_file = fs::read_to_string(temp_dir.path().join("docker-compose.yml")).unwrap();
        assert!(compose_file.contains(store.get(keys::MYSQL_ROOT_PASSWORD).unwrap()));

        assert_eq!(stack.count("up -d db wordpress wpcli"), 1);
        assert_eq!(stack.count("wp core install"), 1);
        assert_eq!(stack.count("wp plugin install "), 3);
        assert_eq!(stack.count("wp plugin activate contact-form-7 wordpress-seo wp-mail-smtp"), 1);
        assert_eq!(stack.count("wp theme activate pressdock-theme"), 1);
        assert_eq!(stack.count("wp post create"), 1);
        assert_eq!(stack.count("wp theme mod set custom_css_post_id 1"), 1);
        assert_eq!(stack.count("stop wpcli"), 1);
        assert!(stack.last_call().ends_with("stop wpcli"));
    }

    #[tokio::test]
    async fn test_rerun_changes_nothing() {
        let (temp_dir, config) = project();
        let stack = Arc::new(FakeStack::new());

        run(&config, &stack).await.1.unwrap();
        let env_before = fs::read_to_string(temp_dir.path().join(".env")).unwrap();
        let compose_before = fs::read_to_string(temp_dir.path().join("docker-compose.yml")).unwrap();

        let (sequencer, result) = run(&config, &stack).await;
        result.unwrap();

        assert_eq!(sequencer.state(), ProvisionState::Done);
        assert!(sequencer.report().generated_keys.is_empty());
        assert!(!sequencer.report().rendered_compose);
        assert_eq!(fs::read_to_string(temp_dir.path().join(".env")).unwrap(), env_before);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("docker-compose.yml")).unwrap(),
            compose_before
        );

        assert_eq!(stack.count("wp core install"), 1);
        assert_eq!(stack.count("wp plugin install "), 3);
        assert_eq!(stack.count("wp post create"), 1);
        assert_eq!(stack.count("wp post update 1"), 1);
        assert_eq!(stack.count("wp theme mod set custom_css_post_id 1"), 2);
        assert_eq!(stack.count("stop wpcli"), 2);
    }

    #[tokio::test]
    async fn test_installed_core_is_not_reinstalled() {
        let (_temp_dir, config) = project();
        let stack = Arc::new(FakeStack::new().with_core_installed());

        let (sequencer, result) = run(&config, &stack).await;
        result.unwrap();

        assert_eq!(stack.count("wp core is-installed"), 1);
        assert_eq!(stack.count("wp core install"), 0);
        assert_eq!(sequencer.report().steps[0].outcome, StepOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_present_plugin_is_still_activated() {
        let (_temp_dir, config) = project();
        let stack = Arc::new(FakeStack::new().with_plugin("contact-form-7"));

        run(&config, &stack).await.1.unwrap();

        assert_eq!(stack.count("wp plugin install contact-form-7"), 0);
        assert_eq!(stack.count("wp plugin install wordpress-seo --activate"), 1);
        assert_eq!(stack.count("wp plugin install wp-mail-smtp --activate"), 1);
        assert_eq!(stack.count("wp plugin activate contact-form-7"), 1);
    }

    #[tokio::test]
    async fn test_existing_css_post_is_updated() {
        let (_temp_dir, config) = project();
        let stack = Arc::new(FakeStack::new().with_css_post(42));

        let (sequencer, result) = run(&config, &stack).await;
        result.unwrap();

        assert_eq!(stack.count("wp post create"), 0);
        assert_eq!(stack.count("wp post update 42"), 1);
        assert_eq!(stack.count("wp theme mod set custom_css_post_id 42"), 1);
        assert!(sequencer
            .report()
            .steps
            .iter()
            .any(|s| s.outcome == StepOutcome::Updated(42)));
    }

    #[tokio::test]
    async fn test_readiness_timeout_fails_and_stops_helper() {
        let (_temp_dir, config) = project();
        let stack = Arc::new(FakeStack::new().never_ready());

        let (sequencer, result) = run(&config, &stack).await;

        match result.unwrap_err() {
            PressdockError::ReadinessTimeout { target, attempts } => {
                assert_eq!(target, "db");
                assert_eq!(attempts, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sequencer.state(), ProvisionState::Failed);
        assert_eq!(stack.count("mariadb-admin ping"), 5);
        assert_eq!(stack.count("wp core"), 0);
        assert_eq!(stack.count("stop wpcli"), 1);
        assert!(sequencer.report().helper_stopped);
        assert_eq!(sequencer.report().error_kind, Some("readiness-timeout"));
    }

    #[tokio::test]
    async fn test_database_ready_after_retries() {
        let (_temp_dir, config) = project();
        let stack = Arc::new(FakeStack::new().ready_after(3));

        let (sequencer, result) = run(&config, &stack).await;
        result.unwrap();

        assert_eq!(sequencer.report().readiness_attempts, Some(4));
        assert_eq!(stack.count("mariadb-admin ping"), 4);
    }

    #[tokio::test]
    async fn test_best_effort_failure_does_not_abort() {
        let (_temp_dir, config) = project();
        let stack = Arc::new(FakeStack::new().failing("show_avatars"));

        let (sequencer, result) = run(&config, &stack).await;
        result.unwrap();

        assert_eq!(sequencer.state(), ProvisionState::Done);
        assert_eq!(sequencer.report().tolerated_steps().count(), 1);
        assert_eq!(stack.count("stop wpcli"), 1);
    }

    #[tokio::test]
    async fn test_fatal_failure_aborts_remaining_steps() {
        let (_temp_dir, config) = project();
        let stack = Arc::new(FakeStack::new().failing("default_comment_status"));

        let (sequencer, result) = run(&config, &stack).await;

        assert!(matches!(result, Err(PressdockError::StepExecution { .. })));
        assert_eq!(sequencer.state(), ProvisionState::Failed);
        assert_eq!(
            sequencer.report().states[sequencer.report().states.len() - 2],
            ProvisionState::PreferencesApplying
        );
        assert_eq!(stack.count("show_avatars"), 0);
        assert_eq!(stack.count("stop wpcli"), 1);
    }

    #[tokio::test]
    async fn test_preflight_failure_has_no_side_effects() {
        let (temp_dir, config) = project();
        fs::remove_file(temp_dir.path().join("theme/style.css")).unwrap();
        let stack = Arc::new(FakeStack::new());

        let (sequencer, result) = run(&config, &stack).await;

        assert!(matches!(result, Err(PressdockError::MissingDependency(_))));
        assert_eq!(sequencer.report().states, vec![ProvisionState::Init, ProvisionState::Failed]);
        assert!(!temp_dir.path().join(".env").exists());
        assert!(!temp_dir.path().join("docker-compose.yml").exists());
        assert_eq!(stack.calls().len(), 1);
        assert_eq!(stack.count("stop"), 0);
    }

    #[tokio::test]
    async fn test_missing_template_without_compose_file() {
        let (temp_dir, config) = project();
        fs::remove_file(temp_dir.path().join("docker-compose.yml.template")).unwrap();
        let stack = Arc::new(FakeStack::new());

        let (_, result) = run(&config, &stack).await;
        assert!(matches!(result, Err(PressdockError::MissingDependency(_))));
        assert_eq!(stack.count("up -d"), 0);
    }

    #[tokio::test]
    async fn test_existing_compose_file_needs_no_template() {
        let (temp_dir, config) = project();
        fs::remove_file(temp_dir.path().join("docker-compose.yml.template")).unwrap();
        fs::write(temp_dir.path().join("docker-compose.yml"), "services: {}\n").unwrap();
        let stack = Arc::new(FakeStack::new());

        let (sequencer, result) = run(&config, &stack).await;
        result.unwrap();

        assert!(!sequencer.report().rendered_compose);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("docker-compose.yml")).unwrap(),
            "services: {}\n"
        );
    }

    #[tokio::test]
    async fn test_interruption_stops_helper() {
        let (_temp_dir, config) = project();
        let stack = Arc::new(FakeStack::new().hanging_on("wp plugin install"));

        let mut sequencer = Sequencer::new(config, stack.clone());
        let watcher = stack.clone();
        let result = sequencer
            .run_until(async move { watcher.wait_until_hung().await })
            .await;

        assert!(matches!(result, Err(PressdockError::Interrupted)));
        assert_eq!(sequencer.state(), ProvisionState::Failed);
        assert_eq!(stack.count("wp core install"), 1);
        assert_eq!(stack.count("stop wpcli"), 1);
        assert!(sequencer.report().helper_stopped);
    }

    #[tokio::test]
    async fn test_sequencer_runs_once() {
        let (_temp_dir, config) = project();
        let stack = Arc::new(FakeStack::new());

        let (mut sequencer, result) = run(&config, &stack).await;
        result.unwrap();

        let again = sequencer.run_until(std::future::pending::<()>()).await;
        assert!(matches!(again, Err(PressdockError::Bug(_))));
        assert_eq!(sequencer.state(), ProvisionState::Done);
    }
}
