//! AEL daemon protocol version detection

use serde::Serialize;

/// Version assumed when `KETTLE_AEL_PDI_DAEMON_VERSION` is unset
pub const DEFAULT_DAEMON_VERSION: &str = "2.0";

/// Numeric value used when the version variable cannot be parsed
pub const FALLBACK_DAEMON_VERSION: f64 = 1.0;

/// Wire protocol spoken by the AEL daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProtocolVersion {
    /// Zookeeper-discovered daemon
    V1,
    /// Websocket daemon
    V2,
}

/// Parsed value of the daemon version variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DaemonVersion {
    /// Numeric version, or [`FALLBACK_DAEMON_VERSION`]
    pub value: f64,
    /// False when the raw string did not parse and the fallback was used
    pub parsed: bool,
}

impl DaemonVersion {
    /// Parse a free-form version string such as `"2.0"` or `" 1 "`.
    ///
    /// Never fails: unparsable input maps to the fallback value.
    pub fn parse(raw: &str) -> Self {
        match parse_number(raw.trim()) {
            Some(value) => Self {
                value,
                parsed: true,
            },
            None => {
                tracing::debug!(version = %raw, "Unparsable daemon version, using fallback");
                Self {
                    value: FALLBACK_DAEMON_VERSION,
                    parsed: false,
                }
            }
        }
    }

    pub fn protocol(&self) -> ProtocolVersion {
        if self.value >= 2.0 {
            ProtocolVersion::V2
        } else {
            ProtocolVersion::V1
        }
    }
}

// Accepts the float-type suffixes (`2.0d`, `2f`) that version strings
// copied from JVM-side properties files sometimes carry. The only
// non-numeric spellings accepted are exactly `Infinity` and `NaN`.
fn parse_number(s: &str) -> Option<f64> {
    if s.bytes().any(|b| b.is_ascii_alphabetic() && !matches!(b, b'e' | b'E')) {
        let unsigned = s.trim_start_matches(['+', '-']);
        if unsigned.len() + 1 < s.len() {
            return None;
        }
        return match unsigned {
            "Infinity" | "NaN" => s.parse::<f64>().ok(),
            _ => parse_suffixed(s),
        };
    }
    s.parse::<f64>().ok()
}

fn parse_suffixed(s: &str) -> Option<f64> {
    let stripped = s.strip_suffix(['d', 'D', 'f', 'F'])?;
    if stripped.bytes().any(|b| b.is_ascii_alphabetic() && !matches!(b, b'e' | b'E')) {
        return None;
    }
    if stripped.ends_with(|c: char| c.is_ascii_digit() || c == '.') {
        stripped.parse::<f64>().ok()
    } else {
        None
    }
}
