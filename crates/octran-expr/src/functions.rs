//! The fixed function library (spec §4.3).
//!
//! Functions are modeled as uniform closures keyed by name, with arity
//! attached at registration -- the design note in spec §9 calls this out
//! explicitly as the replacement for the source system's reflection-based
//! dispatch.

use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDateTime, TimeZone, Utc};

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionError {
    UnknownFunction(String),
    Arity { name: String, expected: usize, found: usize },
    InvalidArgument { func: &'static str, reason: String },
}

impl fmt::Display for FunctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFunction(name) => write!(f, "unknown function `{name}`"),
            Self::Arity { name, expected, found } => {
                write!(f, "`{name}` expects {expected} argument(s), found {found}")
            }
            Self::InvalidArgument { func, reason } => write!(f, "`{func}`: {reason}"),
        }
    }
}

impl std::error::Error for FunctionError {}

type BuiltinImpl = fn(&[Value]) -> Result<Value, FunctionError>;

struct Builtin {
    arity: usize,
    implementation: BuiltinImpl,
}

/// The fixed function dispatcher: a name-keyed registry of arity-checked
/// closures.
pub struct FunctionDispatcher {
    functions: HashMap<&'static str, Builtin>,
}

impl FunctionDispatcher {
    /// Build the dispatcher with the required function set from spec §4.3.
    pub fn standard() -> Self {
        let mut functions: HashMap<&'static str, Builtin> = HashMap::new();
        functions.insert(
            "to_int",
            Builtin {
                arity: 1,
                implementation: to_int,
            },
        );
        functions.insert(
            "to_str",
            Builtin {
                arity: 1,
                implementation: to_str,
            },
        );
        functions.insert(
            "time_since_epoch",
            Builtin {
                arity: 3,
                implementation: time_since_epoch,
            },
        );
        Self { functions }
    }

    /// Whether `name` is a registered function. Used by the engine to
    /// validate an alternative's function references before evaluation
    /// (spec §4.5.b).
    pub fn has(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Validate arity and invoke the named function.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, FunctionError> {
        let builtin = self
            .functions
            .get(name)
            .ok_or_else(|| FunctionError::UnknownFunction(name.to_string()))?;
        if args.len() != builtin.arity {
            return Err(FunctionError::Arity {
                name: name.to_string(),
                expected: builtin.arity,
                found: args.len(),
            });
        }
        (builtin.implementation)(args)
    }
}

impl Default for FunctionDispatcher {
    fn default() -> Self {
        Self::standard()
    }
}

/// `to_int(v) -> float`. Accepts a string that parses as a signed decimal
/// integer; float input and float-shaped strings are refused (spec §9
/// design note: this is deliberate -- callers that want truncation must
/// compose other coercions first).
fn to_int(args: &[Value]) -> Result<Value, FunctionError> {
    let Value::Str(s) = &args[0] else {
        return Err(FunctionError::InvalidArgument {
            func: "to_int",
            reason: "argument must be a string".to_string(),
        });
    };
    let parsed: i64 = s.trim().parse().map_err(|_| FunctionError::InvalidArgument {
        func: "to_int",
        reason: format!("{s:?} is not a signed decimal integer"),
    })?;
    Ok(Value::Float(parsed as f64))
}

/// `to_str(v) -> string`. Succeeds only when `v` is already a string.
fn to_str(args: &[Value]) -> Result<Value, FunctionError> {
    match &args[0] {
        Value::Str(s) => Ok(Value::Str(s.clone())),
        Value::Float(_) => Err(FunctionError::InvalidArgument {
            func: "to_str",
            reason: "argument is not a string".to_string(),
        }),
    }
}

/// `time_since_epoch(ts, format, units) -> float`.
fn time_since_epoch(args: &[Value]) -> Result<Value, FunctionError> {
    let ts = str_arg(args, 0, "time_since_epoch")?;
    let format = str_arg(args, 1, "time_since_epoch")?;
    let units = str_arg(args, 2, "time_since_epoch")?;

    let unix_seconds = match format {
        "ntp" => parse_ntp(ts)?,
        "rfc3339" => parse_rfc3339(ts)?,
        layout => parse_go_layout(ts, layout)?,
    };

    let scaled = match units {
        "s" => unix_seconds,
        "ms" => unix_seconds * 1_000.0,
        "ns" => unix_seconds * 1_000_000_000.0,
        other => {
            return Err(FunctionError::InvalidArgument {
                func: "time_since_epoch",
                reason: format!("unknown units {other:?}, expected one of \"s\", \"ms\", \"ns\""),
            })
        }
    };
    Ok(Value::Float(scaled))
}

fn str_arg<'a>(args: &'a [Value], idx: usize, func: &'static str) -> Result<&'a str, FunctionError> {
    args[idx].as_str().ok_or(FunctionError::InvalidArgument {
        func,
        reason: format!("argument {} must be a string", idx + 1),
    })
}

const NTP_EPOCH_OFFSET: f64 = 2_208_988_800.0;

/// Parse a 64-bit NTP timestamp encoded as hex digits, with optional
/// whitespace between bytes. Unlike the source system (spec §9), a
/// malformed timestamp is a real error, never silently ignored.
fn parse_ntp(ts: &str) -> Result<f64, FunctionError> {
    let cleaned: String = ts.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.len() != 16 || !cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(FunctionError::InvalidArgument {
            func: "time_since_epoch",
            reason: format!("{ts:?} is not a 16-hex-digit NTP timestamp"),
        });
    }
    let raw = u64::from_str_radix(&cleaned, 16).map_err(|_| FunctionError::InvalidArgument {
        func: "time_since_epoch",
        reason: format!("{ts:?} is not valid hex"),
    })?;
    let seconds_since_1900 = (raw >> 32) as f64;
    let fraction = (raw & 0xFFFF_FFFF) as f64 / 4_294_967_296.0;
    Ok(seconds_since_1900 - NTP_EPOCH_OFFSET + fraction)
}

fn parse_rfc3339(ts: &str) -> Result<f64, FunctionError> {
    let dt = chrono::DateTime::parse_from_rfc3339(ts).map_err(|e| FunctionError::InvalidArgument {
        func: "time_since_epoch",
        reason: format!("{ts:?} is not a valid RFC3339 timestamp: {e}"),
    })?;
    Ok(dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1_000_000_000.0)
}

fn parse_go_layout(ts: &str, layout: &str) -> Result<f64, FunctionError> {
    let chrono_fmt = go_layout_to_chrono(layout);
    let naive = NaiveDateTime::parse_from_str(ts, &chrono_fmt).map_err(|e| FunctionError::InvalidArgument {
        func: "time_since_epoch",
        reason: format!("{ts:?} does not match layout {layout:?}: {e}"),
    })?;
    let dt = Utc.from_utc_datetime(&naive);
    Ok(dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1_000_000_000.0)
}

/// Translate a Go reference-time layout string into a `chrono` strftime
/// format string, supporting the practical subset of reference tokens
/// that show up in real NOC configs (spec §4, SPEC_FULL.md's "Go
/// reference-time layouts" resolution).
fn go_layout_to_chrono(layout: &str) -> String {
    // Longest-match-first so e.g. "2006" isn't swallowed as "2" then "006".
    const TOKENS: &[(&str, &str)] = &[
        ("January", "%B"),
        ("2006", "%Y"),
        ("Jan", "%b"),
        ("15", "%H"),
        ("01", "%m"),
        ("02", "%d"),
        ("03", "%I"),
        ("04", "%M"),
        ("05", "%S"),
        ("06", "%y"),
        ("PM", "%p"),
        ("pm", "%p"),
        ("1", "%-m"),
        ("2", "%-d"),
        ("3", "%-I"),
        ("4", "%-M"),
        ("5", "%-S"),
    ];

    let mut out = String::new();
    let mut rest = layout;
    'outer: while !rest.is_empty() {
        for (token, replacement) in TOKENS {
            if rest.starts_with(token) {
                out.push_str(replacement);
                rest = &rest[token.len()..];
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        let c = chars.next().expect("rest is non-empty");
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_int_parses_signed_decimal_string() {
        let v = to_int(&[Value::Str("2000000000".to_string())]).unwrap();
        assert_eq!(v, Value::Float(2_000_000_000.0));

        let v = to_int(&[Value::Str("-7".to_string())]).unwrap();
        assert_eq!(v, Value::Float(-7.0));
    }

    #[test]
    fn to_int_refuses_float_input_and_float_shaped_strings() {
        assert!(to_int(&[Value::Float(3.0)]).is_err());
        assert!(to_int(&[Value::Str("3.0".to_string())]).is_err());
    }

    #[test]
    fn to_int_rejects_overflow() {
        assert!(to_int(&[Value::Str("99999999999999999999999".to_string())]).is_err());
    }

    #[test]
    fn to_str_only_accepts_strings() {
        assert_eq!(
            to_str(&[Value::Str("x".to_string())]).unwrap(),
            Value::Str("x".to_string())
        );
        assert!(to_str(&[Value::Float(1.0)]).is_err());
    }

    #[test]
    fn ntp_hex_decodes_scenario_3() {
        let dispatcher = FunctionDispatcher::standard();
        let result = dispatcher
            .call(
                "time_since_epoch",
                &[
                    Value::Str("dfc4 0b68 8147 af78".to_string()),
                    Value::Str("ntp".to_string()),
                    Value::Str("s".to_string()),
                ],
            )
            .unwrap();
        let Value::Float(seconds) = result else { panic!("expected float") };
        assert!((seconds - 1545178344.505).abs() < 1e-6, "got {seconds}");
    }

    #[test]
    fn ntp_hex_decodes_scenario_4_nanoseconds() {
        let dispatcher = FunctionDispatcher::standard();
        let result = dispatcher
            .call(
                "time_since_epoch",
                &[
                    Value::Str("dfc40b688147af78".to_string()),
                    Value::Str("ntp".to_string()),
                    Value::Str("ns".to_string()),
                ],
            )
            .unwrap();
        let Value::Float(ns) = result else { panic!("expected float") };
        assert!((ns - 1545178344505000082.0).abs() / 1545178344505000082.0 < 1e-9, "got {ns}");
    }

    #[test]
    fn malformed_ntp_hex_is_an_error_not_silently_ignored() {
        let dispatcher = FunctionDispatcher::standard();
        assert!(dispatcher
            .call(
                "time_since_epoch",
                &[
                    Value::Str("not-hex-at-all".to_string()),
                    Value::Str("ntp".to_string()),
                    Value::Str("s".to_string()),
                ],
            )
            .is_err());
    }

    #[test]
    fn go_reference_layout_parses() {
        let dispatcher = FunctionDispatcher::standard();
        let result = dispatcher
            .call(
                "time_since_epoch",
                &[
                    Value::Str("2018-12-18 15:15:59".to_string()),
                    Value::Str("2006-01-02 15:04:05".to_string()),
                    Value::Str("s".to_string()),
                ],
            )
            .unwrap();
        assert_eq!(result, Value::Float(1545146159.0));
    }

    #[test]
    fn unknown_units_is_an_error() {
        let dispatcher = FunctionDispatcher::standard();
        assert!(dispatcher
            .call(
                "time_since_epoch",
                &[
                    Value::Str("2020-01-01T00:00:00Z".to_string()),
                    Value::Str("rfc3339".to_string()),
                    Value::Str("minutes".to_string()),
                ],
            )
            .is_err());
    }

    #[test]
    fn unknown_function_is_an_error() {
        let dispatcher = FunctionDispatcher::standard();
        assert!(matches!(
            dispatcher.call("no_such_fn", &[]),
            Err(FunctionError::UnknownFunction(_))
        ));
    }

    #[test]
    fn arity_mismatch_is_an_error() {
        let dispatcher = FunctionDispatcher::standard();
        assert!(matches!(
            dispatcher.call("to_int", &[]),
            Err(FunctionError::Arity { .. })
        ));
    }
}
