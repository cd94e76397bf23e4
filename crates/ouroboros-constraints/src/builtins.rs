//! Built-in validators
//!
//! Common rules registered by [`MapRegistry::with_builtins`]. Except for
//! `required`, every built-in treats a missing or null value as valid, so
//! they compose with `required` instead of duplicating it.
//!
//! | Name | Params | Passes when |
//! |---|---|---|
//! | `required` | | value present, not null, not an empty string |
//! | `nospaces` | | string has no spaces or tabs |
//! | `length` | `min`, `max` | character/element count within bounds |
//! | `range` | `min`, `max` | number within bounds |
//! | `pattern` | `re` | string matches the regex |
//! | `email` / `url` / `uuid` / `date` | | string has the format |

use crate::constraints::ConstraintParams;
use crate::context::ValidationContext;
use crate::registry::MapRegistry;
use crate::types::Value;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

// ============================================================================
// Pre-compiled Regex Patterns
// ============================================================================

/// Email regex pattern (RFC 5322 simplified)
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// URL regex pattern (http/https)
static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

/// UUID regex pattern (any version)
static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

/// Date regex pattern (YYYY-MM-DD)
static DATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Patterns compiled by the `pattern` validator
static PATTERN_CACHE: Lazy<Mutex<HashMap<String, Regex>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Register every built-in validator
pub fn register_builtins(registry: &mut MapRegistry) {
    registry
        .register("required", required)
        .register("nospaces", nospaces)
        .register("length", length)
        .register("range", range)
        .register("pattern", pattern)
        .register("email", |_, value, _, vctx| format_check(value, &EMAIL_REGEX, "email", vctx))
        .register("url", |_, value, _, vctx| format_check(value, &URL_REGEX, "url", vctx))
        .register("uuid", |_, value, _, vctx| format_check(value, &UUID_REGEX, "uuid", vctx))
        .register("date", date);
}

// ============================================================================
// Validators
// ============================================================================

/// Present, not null and not an empty string
pub fn required(
    _owner: &Value,
    value: Option<&Value>,
    _params: &ConstraintParams,
    vctx: &mut ValidationContext<'_>,
) -> Option<bool> {
    let valid = match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    };
    if !valid {
        vctx.set_message("Field required");
    }
    Some(valid)
}

/// No spaces or tabs
pub fn nospaces(
    _owner: &Value,
    value: Option<&Value>,
    _params: &ConstraintParams,
    vctx: &mut ValidationContext<'_>,
) -> Option<bool> {
    let valid = match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => !s.contains([' ', '\t']),
        Some(_) => false,
    };
    if !valid {
        vctx.set_message("Must not contain spaces");
    }
    Some(valid)
}

/// Character count of strings, element count of lists, within `min`..=`max`
pub fn length(
    _owner: &Value,
    value: Option<&Value>,
    params: &ConstraintParams,
    vctx: &mut ValidationContext<'_>,
) -> Option<bool> {
    let value = match value {
        None | Some(Value::Null) => return Some(true),
        Some(value) => value,
    };
    let min = params.get_f64("min").unwrap_or(f64::NEG_INFINITY);
    let max = params.get_f64("max").unwrap_or(f64::INFINITY);

    let valid = value
        .len()
        .map_or(false, |len| (len as f64) >= min && (len as f64) <= max);
    if !valid {
        vctx.set_message(format!(
            "Length must be between {} and {}",
            bound_str(min),
            bound_str(max)
        ));
        vctx.set_message_params(bounds(params));
    }
    Some(valid)
}

/// Number within `min`..=`max`
pub fn range(
    _owner: &Value,
    value: Option<&Value>,
    params: &ConstraintParams,
    vctx: &mut ValidationContext<'_>,
) -> Option<bool> {
    let value = match value {
        None | Some(Value::Null) => return Some(true),
        Some(value) => value,
    };
    let min = params.get_f64("min").unwrap_or(f64::NEG_INFINITY);
    let max = params.get_f64("max").unwrap_or(f64::INFINITY);

    let valid = value.as_f64().map_or(false, |n| n >= min && n <= max);
    if !valid {
        vctx.set_message(format!(
            "Value must be between {} and {}",
            bound_str(min),
            bound_str(max)
        ));
        vctx.set_message_params(bounds(params));
    }
    Some(valid)
}

/// String matching the `re` param
///
/// Compiled patterns are cached by their source; without an `re` param the
/// validator has no opinion.
pub fn pattern(
    _owner: &Value,
    value: Option<&Value>,
    params: &ConstraintParams,
    vctx: &mut ValidationContext<'_>,
) -> Option<bool> {
    let pattern = params.get_str("re")?;
    let s = match value {
        None | Some(Value::Null) => return Some(true),
        Some(Value::String(s)) => s,
        Some(_) => return Some(false),
    };
    match compiled(pattern) {
        Ok(re) => {
            let valid = re.is_match(s);
            if !valid {
                vctx.set_message(format!("String does not match pattern '{}'", pattern));
            }
            Some(valid)
        }
        Err(e) => {
            vctx.set_message(format!("Invalid regex pattern: {}", e));
            Some(false)
        }
    }
}

fn compiled(pattern: &str) -> Result<Regex, regex::Error> {
    let mut cache = PATTERN_CACHE.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(re) = cache.get(pattern) {
        return Ok(re.clone());
    }
    let re = Regex::new(pattern)?;
    cache.insert(pattern.to_string(), re.clone());
    Ok(re)
}

/// `YYYY-MM-DD` strings naming a calendar day, and date values
pub fn date(
    _owner: &Value,
    value: Option<&Value>,
    _params: &ConstraintParams,
    vctx: &mut ValidationContext<'_>,
) -> Option<bool> {
    match value {
        Some(Value::Date(_)) => Some(true),
        Some(Value::String(s))
            if DATE_REGEX.is_match(s) && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_err() =>
        {
            vctx.set_message(format!("Invalid date: {}", s));
            Some(false)
        }
        other => format_check(other, &DATE_REGEX, "date", vctx),
    }
}

fn format_check(
    value: Option<&Value>,
    re: &Regex,
    format: &str,
    vctx: &mut ValidationContext<'_>,
) -> Option<bool> {
    let valid = match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => re.is_match(s),
        Some(_) => false,
    };
    if !valid {
        vctx.set_message(format!("Invalid {} format", format));
    }
    Some(valid)
}

fn bounds(params: &ConstraintParams) -> Value {
    Value::object(
        ["min", "max"]
            .into_iter()
            .filter_map(|name| params.get(name).map(|v| (name, v.clone()))),
    )
}

fn bound_str(bound: f64) -> String {
    if bound.is_infinite() {
        "unbounded".to_string()
    } else {
        bound.to_string()
    }
}
