use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_API_BASE: &str = "https://slack.com/api";
pub const DEFAULT_COMMAND: &str = "/approval-test";
pub const DEFAULT_SIGNATURE_MAX_AGE_SECS: u64 = 300;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Bot user OAuth token (`xoxb-...`).
    pub bot_token: String,
    pub signing_secret: String,
    /// Slack Web API base URL. Overridden in tests.
    pub slack_api_base: String,
    /// Slash command that opens the request modal.
    pub command: String,
    /// Maximum age of a signed request before it is treated as a replay.
    pub signature_max_age_secs: u64,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

/// Build a config from any key lookup (the process environment in
/// production).
pub fn from_lookup<F>(get: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

    let bot_token = non_empty("SLACK_BOT_TOKEN")
        .ok_or_else(|| anyhow::anyhow!("SLACK_BOT_TOKEN is not set"))?;

    // Older deployments shipped with the misspelt variable name.
    let signing_secret = non_empty("SLACK_SIGNING_SECRET")
        .or_else(|| non_empty("SLACK_SIGNING_SECRT"))
        .ok_or_else(|| anyhow::anyhow!("SLACK_SIGNING_SECRET is not set"))?;

    let port = match non_empty("PORT") {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid PORT: {}", raw))?,
        None => DEFAULT_PORT,
    };

    let command = non_empty("APPROVAL_COMMAND").unwrap_or_else(|| DEFAULT_COMMAND.into());
    if !command.starts_with('/') {
        anyhow::bail!("APPROVAL_COMMAND must start with '/': {}", command);
    }

    Ok(Config {
        port,
        bot_token,
        signing_secret,
        slack_api_base: non_empty("SLACK_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into()),
        command,
        signature_max_age_secs: non_empty("SLACK_SIGNATURE_MAX_AGE_SECS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_SIGNATURE_MAX_AGE_SECS),
    })
}
