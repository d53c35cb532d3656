//! Connection settings from the environment.

use anyhow::{Context, Result, bail};
use postbox_smtp::{ConnectionConfig, Security};

/// Reads the configuration from the process environment.
pub fn from_env() -> Result<ConnectionConfig> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Builds the configuration from `lookup`, treating empty values as unset.
///
/// `SMTP_HOST` is required. The sender falls back to `SMTP_USER` when
/// `SMTP_FROM` is unset, and credentials apply only when both `SMTP_USER`
/// and `SMTP_PASS` are non-empty.
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<ConnectionConfig> {
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let Some(host) = get("SMTP_HOST") else {
        bail!("SMTP_HOST is not set");
    };

    let user = get("SMTP_USER");
    let pass = lookup("SMTP_PASS").filter(|v| !v.is_empty());

    let Some(from) = get("SMTP_FROM").or_else(|| user.clone()) else {
        bail!("SMTP_FROM is not set");
    };

    let security = match get("SMTP_SECURE") {
        Some(value) => value
            .parse::<Security>()
            .with_context(|| format!("invalid SMTP_SECURE value {value:?}"))?,
        None => Security::StartTls,
    };

    let mut builder = ConnectionConfig::builder(host, from).security(security);

    if let Some(port) = get("SMTP_PORT") {
        let port = port
            .parse::<u16>()
            .with_context(|| format!("invalid SMTP_PORT value {port:?}"))?;
        builder = builder.port(port);
    }
    if let (Some(user), Some(pass)) = (user, pass) {
        builder = builder.credentials(user, pass);
    }
    if let Some(name) = get("SMTP_FROM_NAME") {
        builder = builder.sender_name(name);
    }
    if let Some(name) = get("SMTP_HELO_NAME") {
        builder = builder.hello_name(name);
    }

    builder.build().context("invalid SMTP configuration")
}
