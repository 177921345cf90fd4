//! Site preferences: presentation, custom CSS and discussion settings.
//!
//! Each write names its target, its value and whether a failure aborts the
//! run. Names and values are checked before anything is sent to WP-CLI.

use once_cell::sync::Lazy;
use pressdock_core::util::slurp;
use pressdock_types::config::{AppearanceConfig, DiscussionConfig};
use pressdock_types::{PressdockError, Result, StepPolicy};
use regex::Regex;
use tracing::info;

use super::StepContext;
use crate::step::{record_write, upsert, StepOutcome, StepRecord};

static SETTING_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").unwrap());

/// Post type WordPress stores additional CSS in.
pub const CUSTOM_CSS_POST_TYPE: &str = "custom_css";

/// Theme mod linking the active theme to its CSS post.
pub const CUSTOM_CSS_THEME_MOD: &str = "custom_css_post_id";

/// Stylesheet used when no custom CSS file is configured.
pub const DEFAULT_CUSTOM_CSS: &str = "\
body { background-color: #1e1e1e; color: #e0e0e0; }
a { color: #8ab4f8; }
.site-header { border-bottom: 1px solid #333; }
";

/// Where a setting is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    /// `wp option update`
    Option,
    /// `wp theme mod set`
    ThemeMod,
}

/// One preference write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    /// Storage
    pub kind: SettingKind,
    /// Option or theme mod name
    pub name: &'static str,
    /// Value written
    pub value: String,
    /// Failure handling
    pub policy: StepPolicy,
}

impl Setting {
    fn option(name: &'static str, value: impl Into<String>, policy: StepPolicy) -> Self {
        Self { kind: SettingKind::Option, name, value: value.into(), policy }
    }

    fn theme_mod(name: &'static str, value: impl Into<String>) -> Self {
        Self { kind: SettingKind::ThemeMod, name, value: value.into(), policy: StepPolicy::Fatal }
    }

    /// Reject names WP-CLI would misparse and values spanning lines.
    pub fn validate(&self) -> Result<()> {
        if !SETTING_NAME.is_match(self.name) {
            return Err(PressdockError::Validation(format!("Invalid setting name '{}'", self.name)));
        }
        if self.value.is_empty() || self.value.contains(['\n', '\r']) {
            return Err(PressdockError::Validation(format!(
                "Setting '{}' needs a single-line, non-empty value",
                self.name
            )));
        }
        Ok(())
    }
}

fn flag(enabled: bool) -> &'static str {
    if enabled { "1" } else { "0" }
}

fn status(open: bool) -> &'static str {
    if open { "open" } else { "closed" }
}

/// Presentation writes: color scheme option and header/background theme mods.
pub fn presentation_settings(appearance: &AppearanceConfig) -> Vec<Setting> {
    vec![
        Setting::option("color_scheme", appearance.color_scheme.as_str(), StepPolicy::Fatal),
        Setting::theme_mod("header_textcolor", appearance.header_text_color.as_str()),
        Setting::theme_mod("background_color", appearance.background_color.as_str()),
    ]
}

/// Discussion writes.
///
/// Comment and ping status defaults are fatal; moderation and avatar display
/// are best effort since some hosts lock them down.
pub fn discussion_settings(discussion: &DiscussionConfig) -> Vec<Setting> {
    vec![
        Setting::option("default_comment_status", status(discussion.comments_open), StepPolicy::Fatal),
        Setting::option("default_ping_status", status(discussion.pings_open), StepPolicy::Fatal),
        Setting::option("comment_moderation", flag(discussion.moderation), StepPolicy::BestEffort),
        Setting::option("show_avatars", flag(discussion.show_avatars), StepPolicy::BestEffort),
    ]
}

async fn write(ctx: &StepContext<'_>, setting: &Setting) -> Result<StepRecord> {
    setting.validate()?;
    let applied = match setting.kind {
        SettingKind::Option => ctx.wp.option_update(setting.name, &setting.value, setting.policy).await?,
        SettingKind::ThemeMod => ctx.wp.theme_mod_set(setting.name, &setting.value, setting.policy).await?,
    };
    Ok(record_write(&format!("set {}", setting.name), setting.policy, applied))
}

/// Stylesheet body for the custom CSS post.
pub fn custom_css_body(appearance: &AppearanceConfig) -> Result<String> {
    match &appearance.custom_css {
        Some(path) => slurp(path).map_err(|e| {
            PressdockError::Config(format!("Failed to read custom CSS {:?}: {}", path, e))
        }),
        None => Ok(DEFAULT_CUSTOM_CSS.to_string()),
    }
}

/// Create or update the theme's custom CSS post and link it to the theme.
async fn apply_custom_css(ctx: &StepContext<'_>) -> Result<Vec<StepRecord>> {
    let slug = ctx.config.theme.slug.as_str();
    let css = custom_css_body(&ctx.config.appearance)?;

    let (record, id) = upsert(
        "custom css",
        || ctx.wp.post_find(CUSTOM_CSS_POST_TYPE, slug),
        |id| ctx.wp.post_update(id, &css),
        || ctx.wp.post_create(CUSTOM_CSS_POST_TYPE, slug, &css),
    )
    .await?;

    // The link is rewritten on both paths; a theme switch can drop it.
    ctx.wp
        .theme_mod_set(CUSTOM_CSS_THEME_MOD, &id.to_string(), StepPolicy::Fatal)
        .await?;

    Ok(vec![record, StepRecord::new("link custom css", StepOutcome::Applied)])
}

/// Apply presentation, custom CSS and discussion preferences, in that order.
pub async fn apply_preferences(ctx: &StepContext<'_>) -> Result<Vec<StepRecord>> {
    let mut records = Vec::new();

    for setting in presentation_settings(&ctx.config.appearance) {
        records.push(write(ctx, &setting).await?);
    }

    records.extend(apply_custom_css(ctx).await?);

    for setting in discussion_settings(&ctx.config.discussion) {
        records.push(write(ctx, &setting).await?);
    }

    let tolerated = records
        .iter()
        .filter(|r| matches!(r.outcome, StepOutcome::Tolerated(_)))
        .count();
    info!("Applied {} preference writes ({} tolerated failures)", records.len(), tolerated);
    Ok(records)
}
