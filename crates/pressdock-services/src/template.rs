//! Compose template rendering.
//!
//! The template is a compose file with `{{KEY}}` placeholders for credential
//! store entries. It is rendered once; an existing compose file is never
//! regenerated, so local edits to it survive reruns.

use handlebars::Handlebars;
use indexmap::IndexMap;
use pressdock_types::{PressdockError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Render `template` to `output` unless `output` already exists.
///
/// Returns whether a file was written. Placeholders are resolved in strict
/// mode, so a key missing from `context` is an error rather than an empty
/// string.
pub fn render_if_absent(
    template: &Path,
    output: &Path,
    context: &IndexMap<String, String>,
) -> Result<bool> {
    if output.exists() {
        debug!("{:?} exists, not regenerating", output);
        return Ok(false);
    }

    if !template.is_file() {
        return Err(PressdockError::MissingDependency(format!(
            "compose template not found: {:?}",
            template
        )));
    }

    let source = fs::read_to_string(template)?;
    let rendered = render(&source, context)?;

    // The rendered file carries store secrets; keep it as private as the store.
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(output)?;
    file.write_all(rendered.as_bytes())?;
    file.sync_all()?;

    info!("Rendered {:?} from {:?}", output, template);
    Ok(true)
}

/// Render template text against the store entries.
pub fn render(source: &str, context: &IndexMap<String, String>) -> Result<String> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(handlebars::no_escape);

    registry
        .render_template(source, context)
        .map_err(|e| PressdockError::Template(e.to_string()))
}
