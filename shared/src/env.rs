//! Typed access to environment variables
//!
//! Missing or empty variables fall back to the supplied default; present but
//! unparsable values are reported instead of silently defaulted.

use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("Invalid value for {key}: '{value}' ({message})")]
    Invalid {
        key: String,
        value: String,
        message: String,
    },
}

/// Read a variable, treating unset and empty the same way.
pub fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn var_or(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| default.to_string())
}

pub fn parse_var<T>(key: &str, default: T) -> Result<T, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

pub fn parse_optional_var<T>(key: &str) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var(key).map(|raw| parse_value(key, &raw)).transpose()
}

/// Only a case-insensitive `true` enables a flag.
pub fn bool_var(key: &str, default: bool) -> bool {
    var(key)
        .map(|raw| parse_flag(&raw))
        .unwrap_or(default)
}

pub fn parse_flag(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

/// Comma separated list; entries are trimmed and empty entries dropped.
pub fn list_var(key: &str) -> Vec<String> {
    var(key).map(|raw| split_list(&raw)).unwrap_or_default()
}

pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| EnvError::Invalid {
        key: key.to_string(),
        value: raw.to_string(),
        message: e.to_string(),
    })
}
