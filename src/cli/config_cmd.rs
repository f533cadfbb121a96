//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::auth::UserType;
use crate::domain::config::{AppConfig, CaptureSettings};
use crate::domain::error::ConfigError;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    ensure_valid_key(key)?;

    let mut config = store.load().await?;
    set_value(&mut config, key, value)?;
    store.save(&config).await?;

    let shown = if key == "auth_token" {
        mask_token(value)
    } else {
        value.to_string()
    };
    presenter.success(&format!("{} = {}", key, shown));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    ensure_valid_key(key)?;

    let config = store.load().await?;
    match get_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        presenter.key_value(
            key,
            &get_value(&config, key).unwrap_or_else(|| NOT_SET.to_string()),
        );
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn ensure_valid_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        })
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

/// Display value for `key`; tokens are masked
fn get_value(config: &AppConfig, key: &str) -> Option<String> {
    let capture = config.capture.as_ref();
    match key {
        "api_url" => config.api_url.clone(),
        "auth_token" => config.auth_token.as_deref().map(mask_token),
        "user_type" => config.user_type.clone(),
        "email" => config.email.clone(),
        "enforce_time_limit" => config.enforce_time_limit.map(|b| b.to_string()),
        "concurrent_recording" => config.concurrent_recording.map(|b| b.to_string()),
        "credentials_path" => config.credentials_path.clone(),
        "capture.width" => capture.and_then(|c| c.width).map(|v| v.to_string()),
        "capture.height" => capture.and_then(|c| c.height).map(|v| v.to_string()),
        "capture.video_bitrate" => capture.and_then(|c| c.video_bitrate).map(|v| v.to_string()),
        "capture.sample_rate" => capture.and_then(|c| c.sample_rate).map(|v| v.to_string()),
        "capture.camera_device" => capture.and_then(|c| c.camera_device.clone()),
        "capture.audio_device" => capture.and_then(|c| c.audio_device.clone()),
        _ => None,
    }
}

/// Validate `value` and store it under `key`
fn set_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "api_url" => {
            let url = value.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid(key, "Value must start with http:// or https://"));
            }
            config.api_url = Some(url.trim_end_matches('/').to_string());
        }
        "auth_token" => config.auth_token = Some(value.to_string()),
        "user_type" => {
            let user_type: UserType = value.parse().map_err(|e| invalid(key, format!("{}", e)))?;
            config.user_type = Some(user_type.to_string());
        }
        "email" => config.email = Some(value.trim().to_string()),
        "enforce_time_limit" => config.enforce_time_limit = Some(parse_bool_for(key, value)?),
        "concurrent_recording" => {
            config.concurrent_recording = Some(parse_bool_for(key, value)?)
        }
        "credentials_path" => config.credentials_path = Some(value.to_string()),
        "capture.width" => capture_mut(config).width = Some(parse_positive(key, value)?),
        "capture.height" => capture_mut(config).height = Some(parse_positive(key, value)?),
        "capture.video_bitrate" => {
            capture_mut(config).video_bitrate = Some(parse_positive(key, value)?)
        }
        "capture.sample_rate" => {
            capture_mut(config).sample_rate = Some(parse_positive(key, value)?)
        }
        "capture.camera_device" => capture_mut(config).camera_device = Some(value.to_string()),
        "capture.audio_device" => capture_mut(config).audio_device = Some(value.to_string()),
        _ => return Err(invalid(key, "Unknown key")),
    }
    Ok(())
}

fn capture_mut(config: &mut AppConfig) -> &mut CaptureSettings {
    config.capture.get_or_insert_with(CaptureSettings::default)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}

fn parse_bool_for(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).map_err(|_| invalid(key, "Value must be 'true' or 'false'"))
}

fn parse_positive(key: &str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(key, "Value must be a positive integer")),
    }
}

/// Mask a token for display (show first 4 and last 4 chars)
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}
