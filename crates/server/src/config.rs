use std::{collections::HashMap, env, fs};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub greeting: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8000".into(),
            greeting: "Hello from PayLens backend!".into(),
        }
    }
}

/// Defaults, overridden by an optional `server.toml`, overridden by env vars.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        apply_file_config(&mut settings, &raw);
    }

    if let Ok(v) = env::var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Ok(v) = env::var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Ok(v) = env::var("GREETING_MESSAGE") {
        settings.greeting = v;
    }
    if let Ok(v) = env::var("APP__GREETING_MESSAGE") {
        settings.greeting = v;
    }

    settings
}

fn apply_file_config(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        return;
    };
    if let Some(v) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = file_cfg.get("greeting") {
        settings.greeting = v.clone();
    }
}
