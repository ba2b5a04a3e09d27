use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Event {
    pub id: String, // opaque, assigned at creation, never reused
    pub title: String,
    #[serde(default)]
    pub desc: String,
    pub date: String, // ISO YYYY-MM-DD
    #[serde(default)]
    pub time: String, // HH:MM, empty when unscheduled
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub capacity: u32, // 0 = unlimited
    #[serde(default)]
    pub image: String, // URL or data URI; empty means placeholder at render time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    pub event_id: String, // weak reference, cascaded on event delete
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub reg_id: String, // confirmation code shown to the attendee
    pub created: String,
}

/// Form payload for creating an event. Every field is optional on the
/// wire; capacity tolerates numeric strings and junk (both become 0).
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct EventDraft {
    pub title: String,
    pub desc: String,
    pub date: String,
    pub time: String,
    pub venue: String,
    #[serde(deserialize_with = "capacity_or_zero")]
    pub capacity: u32,
    pub image: String,
}

/// Partial update for an existing event. Absent fields keep their
/// stored value, image included.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub desc: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub venue: Option<String>,
    #[serde(deserialize_with = "optional_capacity")]
    pub capacity: Option<u32>,
    pub image: Option<String>,
}

fn capacity_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(coerce_capacity(Value::deserialize(deserializer)?))
}

fn optional_capacity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        other => Some(coerce_capacity(other)),
    })
}

fn coerce_capacity(value: Value) -> u32 {
    match value {
        Value::Number(number) => number
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        Value::String(text) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_capacity_accepts_numbers_and_numeric_strings() {
        let draft: EventDraft =
            serde_json::from_str(r#"{"title":"Expo","capacity":120}"#).expect("draft");
        assert_eq!(draft.capacity, 120);

        let draft: EventDraft =
            serde_json::from_str(r#"{"title":"Expo","capacity":" 45 "}"#).expect("draft");
        assert_eq!(draft.capacity, 45);
    }

    #[test]
    fn draft_capacity_falls_back_to_zero() {
        for payload in [
            r#"{"title":"Expo"}"#,
            r#"{"title":"Expo","capacity":"lots"}"#,
            r#"{"title":"Expo","capacity":-3}"#,
            r#"{"title":"Expo","capacity":null}"#,
        ] {
            let draft: EventDraft = serde_json::from_str(payload).expect("draft");
            assert_eq!(draft.capacity, 0, "payload: {payload}");
        }
    }

    #[test]
    fn patch_capacity_distinguishes_absent_from_unparsable() {
        let patch: EventPatch = serde_json::from_str(r#"{"title":"Expo"}"#).expect("patch");
        assert_eq!(patch.capacity, None);

        let patch: EventPatch = serde_json::from_str(r#"{"capacity":"n/a"}"#).expect("patch");
        assert_eq!(patch.capacity, Some(0));

        let patch: EventPatch = serde_json::from_str(r#"{"capacity":"12"}"#).expect("patch");
        assert_eq!(patch.capacity, Some(12));
    }

    #[test]
    fn registration_round_trips_with_camel_case_fields() {
        let registration = Registration {
            id: "r123".to_string(),
            event_id: "e456".to_string(),
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            phone: String::new(),
            reg_id: "RABC123".to_string(),
            created: "2026-08-01T10:00:00+00:00".to_string(),
        };
        let json = serde_json::to_string(&registration).expect("serialize");
        assert!(json.contains(r#""eventId":"e456""#));
        assert!(json.contains(r#""regId":"RABC123""#));

        let back: Registration = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.event_id, registration.event_id);
        assert_eq!(back.reg_id, registration.reg_id);
    }
}
