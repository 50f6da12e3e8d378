use std::{env, str::FromStr};

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Reads a boolean flag from the environment variable `name`.
pub fn env_flag(name: &str, default: bool) -> bool {
    parse_boolean_flag(env::var(name).ok(), default)
}

/// Reads and parses the environment variable `name`. Missing or unparseable values yield the reason as an error, so
/// that the caller can decide how loudly to complain before falling back to a default.
pub fn env_parse<T: FromStr>(name: &str) -> Result<T, String>
where T::Err: std::fmt::Display {
    let raw = env::var(name).map_err(|e| format!("{name}: {e}"))?;
    raw.trim().parse::<T>().map_err(|e| format!("{raw} is not a valid value for {name}. {e}"))
}
