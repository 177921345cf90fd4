//! Scripted stand-in for a Docker Compose WordPress stack.
//!
//! Answers the commands the sequencer issues and keeps just enough state
//! (core, plugins, the CSS post) for reruns to observe earlier writes.

use async_trait::async_trait;
use pressdock_types::{CommandOutput, CommandRunner, Invocation, Result};
use std::collections::HashSet;
use std::sync::Mutex;
use tokio::sync::Notify;

#[derive(Default)]
struct SiteState {
    core_installed: bool,
    plugins: HashSet<String>,
    css_post: Option<u64>,
    next_post_id: u64,
    probes: u32,
}

/// Recording fake runner.
pub struct FakeStack {
    state: Mutex<SiteState>,
    calls: Mutex<Vec<String>>,
    not_ready_for: u32,
    failing: Vec<String>,
    hanging: Option<String>,
    hung: Notify,
}

impl FakeStack {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SiteState {
                next_post_id: 1,
                ..SiteState::default()
            }),
            calls: Mutex::new(Vec::new()),
            not_ready_for: 0,
            failing: Vec::new(),
            hanging: None,
            hung: Notify::new(),
        }
    }

    pub fn with_core_installed(self) -> Self {
        self.state.lock().unwrap().core_installed = true;
        self
    }

    pub fn with_plugin(self, plugin: &str) -> Self {
        self.state.lock().unwrap().plugins.insert(plugin.to_string());
        self
    }

    pub fn with_css_post(self, id: u64) -> Self {
        self.state.lock().unwrap().css_post = Some(id);
        self
    }

    /// Database probe fails this many times before answering.
    pub fn ready_after(mut self, failures: u32) -> Self {
        self.not_ready_for = failures;
        self
    }

    pub fn never_ready(self) -> Self {
        self.ready_after(u32::MAX)
    }

    /// Commands containing `pattern` exit with status 1.
    pub fn failing(mut self, pattern: &str) -> Self {
        self.failing.push(pattern.to_string());
        self
    }

    /// Commands containing `pattern` never complete.
    pub fn hanging_on(mut self, pattern: &str) -> Self {
        self.hanging = Some(pattern.to_string());
        self
    }

    /// Resolves once a hanging command has been reached.
    pub async fn wait_until_hung(&self) {
        self.hung.notified().await
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pattern: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.contains(pattern)).count()
    }

    pub fn last_call(&self) -> String {
        self.calls.lock().unwrap().last().cloned().unwrap_or_default()
    }

    fn answer(&self, argv: &[String]) -> CommandOutput {
        let argv: Vec<&str> = argv.iter().map(String::as_str).collect();
        let mut state = self.state.lock().unwrap();
        let status = |ok: bool| if ok { CommandOutput::ok("") } else { CommandOutput::failed(1, "") };

        match argv.as_slice() {
            ["mariadb-admin", ..] => {
                state.probes += 1;
                status(state.probes > self.not_ready_for)
            }
            ["wp", "core", "is-installed"] => status(state.core_installed),
            ["wp", "core", "install", ..] => {
                state.core_installed = true;
                CommandOutput::ok("Success: WordPress installed successfully.")
            }
            ["wp", "plugin", "is-installed", plugin] => status(state.plugins.contains(*plugin)),
            ["wp", "plugin", "install", plugin, ..] => {
                state.plugins.insert(plugin.to_string());
                CommandOutput::ok("Success: Installed 1 of 1 plugins.")
            }
            ["wp", "post", "list", ..] => match state.css_post {
                Some(id) => CommandOutput::ok(format!(r#"[{{"ID":{}}}]"#, id)),
                None => CommandOutput::ok("[]"),
            },
            ["wp", "post", "create", ..] => {
                let id = state.next_post_id;
                state.next_post_id += 1;
                state.css_post = Some(id);
                CommandOutput::ok(id.to_string())
            }
            _ => CommandOutput::ok(""),
        }
    }
}

#[async_trait]
impl CommandRunner for FakeStack {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let line = format!("{} {}", invocation.program, invocation.args.join(" "));
        self.calls.lock().unwrap().push(line.clone());

        if self.hanging.as_deref().is_some_and(|p| line.contains(p)) {
            self.hung.notify_one();
            return std::future::pending().await;
        }
        if self.failing.iter().any(|p| line.contains(p.as_str())) {
            return Ok(CommandOutput::failed(1, "Error: simulated failure"));
        }

        let args = &invocation.args;
        match args.iter().position(|a| a == "exec") {
            // compose -f <file> exec -T <service> <argv...>
            Some(exec) if args.len() > exec + 3 => Ok(self.answer(&args[exec + 3..])),
            _ if args.get(1).map(String::as_str) == Some("version") => {
                Ok(CommandOutput::ok("Docker Compose version v2.24.6"))
            }
            _ => Ok(CommandOutput::ok("")),
        }
    }
}
