//! Reverse-geocoding address formatting
//!
//! `reverseData` is JSON text produced by the server's geocoder. Nothing
//! about it is guaranteed, so every formatter falls back to
//! [`UNKNOWN_ADDRESS`] instead of failing.

use serde::Deserialize;
use serde_json::Value;

/// Fallback for absent, malformed or empty address payloads
pub const UNKNOWN_ADDRESS: &str = "Unknown Address";

/// The address parts the dashboard uses
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AddressParts {
    #[serde(deserialize_with = "lenient")]
    pub village: String,
    #[serde(deserialize_with = "lenient")]
    pub municipality: String,
    #[serde(deserialize_with = "lenient")]
    pub county: String,
    #[serde(deserialize_with = "lenient")]
    pub state: String,
    #[serde(deserialize_with = "lenient")]
    pub country: String,
}

impl AddressParts {
    /// Parse a reverse payload; `None` when it is not a JSON object
    pub fn parse(reverse_data: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(reverse_data) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "Unparseable reverse payload");
                None
            }
        }
    }

    /// Village, municipality, county, state and country, skipping empty parts
    pub fn full(&self) -> Option<String> {
        join([
            &self.village,
            &self.municipality,
            &self.county,
            &self.state,
            &self.country,
        ])
    }

    /// `locality, region` where each side takes its first non-empty candidate
    pub fn short(&self) -> Option<String> {
        let locality = first_non_empty([&self.village, &self.municipality, &self.county]);
        let region = first_non_empty([&self.municipality, &self.county, &self.state]);
        join([locality, region])
    }
}

/// Full one-line address, or [`UNKNOWN_ADDRESS`]
pub fn format_address(reverse_data: Option<&str>) -> String {
    reverse_data
        .and_then(AddressParts::parse)
        .and_then(|parts| parts.full())
        .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string())
}

/// Short `locality, region` address, or [`UNKNOWN_ADDRESS`]
pub fn short_address(reverse_data: Option<&str>) -> String {
    reverse_data
        .and_then(AddressParts::parse)
        .and_then(|parts| parts.short())
        .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string())
}

fn first_non_empty<'a, const N: usize>(candidates: [&'a String; N]) -> &'a str {
    candidates
        .into_iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

fn join<S: AsRef<str>, const N: usize>(parts: [S; N]) -> Option<String> {
    let parts: Vec<&str> = parts
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Accept strings, numbers or null for an address part
fn lenient<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}
