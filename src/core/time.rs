//! Timestamps and identifiers for audit events and JSON output.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use ulid::Ulid;

/// Unix-epoch seconds with a `Z` suffix, e.g. `1771220592Z`.
pub fn now_epoch_z() -> String {
    format!("{}Z", Utc::now().timestamp())
}

pub fn new_event_id() -> String {
    Ulid::new().to_string()
}

/// Load date stamped on database inserts, truncated to whole seconds to
/// match its stored text form.
pub fn lddate_now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}

/// Response wrapper for `--format json` output.
pub fn json_envelope(cmd: &str, status: &str, extra: JsonValue) -> JsonValue {
    let mut base = serde_json::json!({
        "ts": now_epoch_z(),
        "event_id": new_event_id(),
        "cmd": cmd,
        "status": status
    });
    if let (Some(base_obj), Some(extra_obj)) = (base.as_object_mut(), extra.as_object()) {
        for (k, v) in extra_obj {
            base_obj.insert(k.clone(), v.clone());
        }
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_epoch_z_format() {
        let result = now_epoch_z();
        assert!(result.ends_with('Z'));
        assert!(result.trim_end_matches('Z').parse::<i64>().is_ok());
    }

    #[test]
    fn test_new_event_id_is_valid_ulid() {
        let id = new_event_id();
        assert!(Ulid::from_string(&id).is_ok());
        assert_ne!(id, new_event_id());
    }

    #[test]
    fn test_lddate_has_no_fraction() {
        assert_eq!(lddate_now().timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn test_json_envelope_merges_extra() {
        let envelope = json_envelope("tables", "ok", serde_json::json!({"count": 16}));
        assert_eq!(envelope["cmd"], "tables");
        assert_eq!(envelope["status"], "ok");
        assert_eq!(envelope["count"], 16);
        assert!(envelope["event_id"].is_string());
    }
}
