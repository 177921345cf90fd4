//! Docker Compose client.
//!
//! Every operation is a `docker compose -f <file> ...` invocation through the
//! shared [`CommandRunner`]. Non-zero exits become
//! [`PressdockError::StepExecution`] unless the caller asked for
//! [`StepPolicy::BestEffort`].

use pressdock_types::{
    CommandOutput, CommandRunner, Invocation, PressdockError, Result, ServiceName, StepPolicy,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Docker Compose client configuration.
#[derive(Debug, Clone)]
pub struct ComposeConfig {
    /// Orchestrator binary
    pub program: String,
    /// Rendered compose file
    pub compose_file: PathBuf,
}

impl ComposeConfig {
    /// Configuration for `docker compose` with the given file.
    pub fn new(compose_file: impl Into<PathBuf>) -> Self {
        Self {
            program: "docker".to_string(),
            compose_file: compose_file.into(),
        }
    }
}

/// Docker Compose client.
#[derive(Clone)]
pub struct Compose {
    config: ComposeConfig,
    runner: Arc<dyn CommandRunner>,
    redact: Vec<String>,
}

impl Compose {
    /// Create a new client.
    pub fn new(config: ComposeConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config,
            runner,
            redact: Vec::new(),
        }
    }

    /// Mask these values in every logged command line and error.
    pub fn with_redacted<I, S>(mut self, secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.redact.extend(secrets.into_iter().map(Into::into));
        self
    }

    fn invocation(&self) -> Invocation {
        let mut invocation = Invocation::new(&self.config.program)
            .arg("compose")
            .arg("-f")
            .arg(self.config.compose_file.to_string_lossy());
        for secret in &self.redact {
            invocation = invocation.redacting(secret.as_str());
        }
        invocation
    }

    async fn dispatch(
        &self,
        step: &str,
        invocation: Invocation,
        policy: StepPolicy,
    ) -> Result<CommandOutput> {
        let output = self.runner.run(&invocation).await?;
        if output.success() {
            return Ok(output);
        }

        match policy {
            StepPolicy::Fatal => Err(PressdockError::StepExecution {
                step: step.to_string(),
                command: invocation.display_line(),
                status: output.status,
                stderr: invocation.mask(&output.stderr),
            }),
            StepPolicy::BestEffort => {
                warn!(
                    "{}: `{}` exited with status {} (ignored): {}",
                    step,
                    invocation,
                    output.status,
                    invocation.mask(output.stderr.trim())
                );
                Ok(output)
            }
        }
    }

    /// Verify that the orchestrator is installed and answers.
    pub async fn check_available(&self) -> Result<()> {
        let invocation = Invocation::new(&self.config.program).args(["compose", "version"]);
        let output = self.runner.run(&invocation).await?;
        if !output.success() {
            return Err(PressdockError::MissingDependency(format!(
                "`{} compose` is not available: {}",
                self.config.program,
                output.stderr.trim()
            )));
        }
        debug!("Orchestrator: {}", output.stdout);
        Ok(())
    }

    /// Start services in detached mode.
    ///
    /// Success only means the orchestrator accepted the request.
    pub async fn up(&self, services: &[&ServiceName]) -> Result<()> {
        let invocation = self
            .invocation()
            .args(["up", "-d"])
            .args(services.iter().map(|s| s.as_str()));
        self.dispatch("start stack", invocation, StepPolicy::Fatal).await?;
        Ok(())
    }

    /// Stop one service.
    pub async fn stop(&self, service: &ServiceName) -> Result<()> {
        let invocation = self.invocation().arg("stop").arg(service.as_str());
        self.dispatch("stop service", invocation, StepPolicy::Fatal).await?;
        Ok(())
    }

    /// Run a command synchronously inside a running service.
    pub async fn exec<S: AsRef<str>>(
        &self,
        step: &str,
        service: &ServiceName,
        argv: &[S],
        policy: StepPolicy,
    ) -> Result<CommandOutput> {
        let invocation = self.exec_invocation(service, argv);
        self.dispatch(step, invocation, policy).await
    }

    /// Like [`Compose::exec`], feeding `input` to the command's standard input.
    pub async fn exec_with_input<S: AsRef<str>>(
        &self,
        step: &str,
        service: &ServiceName,
        argv: &[S],
        input: &str,
        policy: StepPolicy,
    ) -> Result<CommandOutput> {
        let invocation = self.exec_invocation(service, argv).with_stdin(input);
        self.dispatch(step, invocation, policy).await
    }

    fn exec_invocation<S: AsRef<str>>(&self, service: &ServiceName, argv: &[S]) -> Invocation {
        self.invocation()
            .args(["exec", "-T", service.as_str()])
            .args(argv.iter().map(|a| a.as_ref()))
    }

    /// Run a check inside a service and report whether it exited zero.
    ///
    /// Failure of the check is an answer, not an error; only a failure to
    /// launch the orchestrator is returned as `Err`.
    pub async fn probe<S: AsRef<str>>(&self, service: &ServiceName, argv: &[S]) -> Result<bool> {
        let invocation = self.exec_invocation(service, argv);
        let output = self.runner.run(&invocation).await?;
        debug!("Probe `{}` exited with status {}", invocation, output.status);
        Ok(output.success())
    }

    /// Copy the contents of a local directory into a service's filesystem.
    pub async fn copy_into(
        &self,
        step: &str,
        local_dir: &Path,
        service: &ServiceName,
        target: &str,
    ) -> Result<()> {
        let source = format!("{}/.", local_dir.to_string_lossy().trim_end_matches('/'));
        let destination = format!("{}:{}", service, target);
        let invocation = self.invocation().arg("cp").arg(source).arg(destination);
        self.dispatch(step, invocation, StepPolicy::Fatal).await?;
        Ok(())
    }
}
