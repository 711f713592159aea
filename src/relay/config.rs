use clap::Args;

/// Options of the `serve` command
#[derive(Args, Debug, Clone)]
pub struct RelayArgs {
    /// Listen address (ip:port)
    #[arg(long, env = "FOCUS_LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: String,

    /// Base URL of the messenger bot API
    #[arg(long, env = "MAX_API_URL", default_value = "https://api.max.ru/v1")]
    pub api_url: String,

    /// Bot token sent as a bearer token. Without it outgoing messages are skipped.
    #[arg(long, env = "MAX_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Mini-app URL used by open-app buttons
    #[arg(long, env = "WEBAPP_URL", default_value = "https://enionis.github.io/focus-assistant/webapp")]
    pub webapp_url: String,

    /// Seconds between reminder sweeps
    #[arg(long, env = "REMINDER_INTERVAL_SECS", default_value_t = 3600)]
    pub reminder_interval_secs: u64,

    /// Minimum hours between two reminders to the same user
    #[arg(long, env = "REMINDER_COOLDOWN_HOURS", default_value_t = 2)]
    pub reminder_cooldown_hours: i64,
}
