//! Document-to-descriptor normalization
//!
//! Pure functions, no I/O, and no failure path: any field the document
//! omits or mangles silently reverts to its default. The result is always a
//! complete, publishable descriptor.

use chrono::DateTime;
use serde_json::Value;

use super::descriptor::{PresenceDefaults, PresenceDescriptor};
use crate::config::RawPresenceConfig;

impl PresenceDescriptor {
    /// Build a complete descriptor from the raw document
    ///
    /// Field rules:
    /// - enums (`type`, `status`) are case-normalized and validated against
    ///   their closed sets; anything else reverts to the default
    /// - free-text fields take the first non-empty trimmed candidate in
    ///   priority order, then the default
    /// - the application id accepts a string or a number (stringified)
    /// - timestamps accept a number, a numeric string, or an RFC 3339 /
    ///   RFC 2822 date string; an explicit `null` pins the field to absent
    pub fn normalize(raw: &RawPresenceConfig, defaults: &PresenceDefaults) -> Self {
        let activity_type = raw
            .activity_type
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.activity_type);

        let online_status = raw
            .status
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.online_status);

        let application_id = raw
            .application_id
            .as_ref()
            .and_then(|value| match value {
                Value::String(s) => {
                    let trimmed = s.trim();
                    (!trimmed.is_empty()).then(|| trimmed.to_string())
                }
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| defaults.application_id.clone());

        Self {
            application_id,
            activity_type,
            name: first_non_empty_string(&[raw.name.as_ref()])
                .or_else(|| defaults.name.clone()),
            details: first_non_empty_string(&[raw.details.as_ref()])
                .or_else(|| defaults.details.clone()),
            state: first_non_empty_string(&[raw.state.as_ref()])
                .or_else(|| defaults.state.clone()),
            start_timestamp: normalize_timestamp(
                raw.start_timestamp.as_ref(),
                defaults.start_timestamp,
            ),
            end_timestamp: normalize_timestamp(
                raw.end_timestamp.as_ref(),
                defaults.end_timestamp,
            ),
            online_status,
            large_image: first_non_empty_string(&raw.large_image_candidates())
                .or_else(|| defaults.large_image.clone()),
            large_text: first_non_empty_string(&raw.large_text_candidates())
                .or_else(|| defaults.large_text.clone()),
            small_image: first_non_empty_string(&raw.small_image_candidates()),
            small_text: first_non_empty_string(&raw.small_text_candidates()),
        }
    }
}

/// First candidate that is a non-empty string after trimming
///
/// Non-string candidates are skipped, not errors: a wrongly-typed alias must
/// not shadow a valid lower-priority one.
fn first_non_empty_string(candidates: &[Option<&Value>]) -> Option<String> {
    candidates
        .iter()
        .copied()
        .flatten()
        .find_map(|value| match value {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            _ => None,
        })
}

/// Normalize one timestamp field to epoch milliseconds
///
/// `None` means the key was missing, so the fallback applies;
/// `Some(Value::Null)` is an explicit null and stays absent. Numbers are
/// truncated to whole milliseconds. Strings are tried as a number first,
/// then as an RFC 3339 date, then RFC 2822. Anything else falls back.
fn normalize_timestamp(value: Option<&Value>, fallback: Option<i64>) -> Option<i64> {
    let value = match value {
        None => return fallback,
        Some(Value::Null) => return None,
        Some(value) => value,
    };

    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .or(fallback),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return fallback;
            }

            if let Ok(number) = trimmed.parse::<f64>() {
                if number.is_finite() {
                    return Some(number.trunc() as i64);
                }
            }

            if let Ok(date) = DateTime::parse_from_rfc3339(trimmed) {
                return Some(date.timestamp_millis());
            }
            if let Ok(date) = DateTime::parse_from_rfc2822(trimmed) {
                return Some(date.timestamp_millis());
            }

            fallback
        }
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::descriptor::{ActivityType, OnlineStatus};

    fn raw(json: &str) -> RawPresenceConfig {
        serde_json::from_str(json).unwrap()
    }

    fn test_defaults() -> PresenceDefaults {
        PresenceDefaults {
            application_id: "999888777".to_string(),
            activity_type: ActivityType::Watching,
            name: Some("default-name".to_string()),
            details: None,
            state: None,
            start_timestamp: Some(1_700_000_000_000),
            end_timestamp: None,
            online_status: OnlineStatus::Idle,
            large_image: None,
            large_text: None,
        }
    }

    #[test]
    fn empty_document_yields_defaults() {
        let descriptor = PresenceDescriptor::normalize(&raw("{}"), &test_defaults());

        assert_eq!(descriptor.application_id, "999888777");
        assert_eq!(descriptor.activity_type, ActivityType::Watching);
        assert_eq!(descriptor.online_status, OnlineStatus::Idle);
        assert_eq!(descriptor.name.as_deref(), Some("default-name"));
        assert_eq!(descriptor.details, None);
        assert_eq!(descriptor.start_timestamp, Some(1_700_000_000_000));
        assert_eq!(descriptor.end_timestamp, None);
        assert_eq!(descriptor.large_image, None);
        assert_eq!(descriptor.small_image, None);
    }

    #[test]
    fn fully_specified_document_is_preserved() {
        let descriptor = PresenceDescriptor::normalize(
            &raw(r#"{
                "applicationId": "123",
                "type": "listening",
                "name": "Lo-fi",
                "details": "beats",
                "state": "to relax to",
                "startTimestamp": 1000,
                "endTimestamp": 2000,
                "status": "online",
                "largeImage": "big",
                "largeImageText": "big text",
                "smallImage": "small",
                "smallImageText": "small text"
            }"#),
            &test_defaults(),
        );

        assert_eq!(descriptor.application_id, "123");
        assert_eq!(descriptor.activity_type, ActivityType::Listening);
        assert_eq!(descriptor.name.as_deref(), Some("Lo-fi"));
        assert_eq!(descriptor.details.as_deref(), Some("beats"));
        assert_eq!(descriptor.state.as_deref(), Some("to relax to"));
        assert_eq!(descriptor.start_timestamp, Some(1000));
        assert_eq!(descriptor.end_timestamp, Some(2000));
        assert_eq!(descriptor.online_status, OnlineStatus::Online);
        assert_eq!(descriptor.large_image.as_deref(), Some("big"));
        assert_eq!(descriptor.large_text.as_deref(), Some("big text"));
        assert_eq!(descriptor.small_image.as_deref(), Some("small"));
        assert_eq!(descriptor.small_text.as_deref(), Some("small text"));
    }

    #[test]
    fn invalid_status_reverts_to_default() {
        let defaults = test_defaults();

        for document in [
            r#"{"status": "busy"}"#,
            r#"{"status": " online "}"#,
            r#"{"status": 42}"#,
            r#"{"status": null}"#,
        ] {
            let descriptor = PresenceDescriptor::normalize(&raw(document), &defaults);
            assert_eq!(descriptor.online_status, OnlineStatus::Idle, "{document}");
        }

        let descriptor =
            PresenceDescriptor::normalize(&raw(r#"{"status": "DND"}"#), &defaults);
        assert_eq!(descriptor.online_status, OnlineStatus::Dnd);
    }

    #[test]
    fn invalid_activity_type_reverts_to_default() {
        let defaults = test_defaults();

        let descriptor =
            PresenceDescriptor::normalize(&raw(r#"{"type": "competing"}"#), &defaults);
        assert_eq!(descriptor.activity_type, ActivityType::Competing);

        for document in [r#"{"type": "gaming"}"#, r#"{"type": 3}"#, r#"{"type": ""}"#] {
            let descriptor = PresenceDescriptor::normalize(&raw(document), &defaults);
            assert_eq!(descriptor.activity_type, ActivityType::Watching, "{document}");
        }
    }

    #[test]
    fn application_id_accepts_numbers_and_rejects_other_shapes() {
        let defaults = test_defaults();

        let descriptor =
            PresenceDescriptor::normalize(&raw(r#"{"applicationId": 424242}"#), &defaults);
        assert_eq!(descriptor.application_id, "424242");

        for document in [
            r#"{"applicationId": ""}"#,
            r#"{"applicationId": "   "}"#,
            r#"{"applicationId": {"nested": true}}"#,
        ] {
            let descriptor = PresenceDescriptor::normalize(&raw(document), &defaults);
            assert_eq!(descriptor.application_id, "999888777", "{document}");
        }
    }

    #[test]
    fn free_text_fields_are_trimmed() {
        let descriptor = PresenceDescriptor::normalize(
            &raw(r#"{"name": "  padded  ", "details": "   "}"#),
            &test_defaults(),
        );

        assert_eq!(descriptor.name.as_deref(), Some("padded"));
        // All-whitespace is empty, so the default (absent) applies.
        assert_eq!(descriptor.details, None);
    }

    #[test]
    fn alias_groups_pick_first_non_empty_in_priority_order() {
        let defaults = test_defaults();

        let descriptor = PresenceDescriptor::normalize(
            &raw(r#"{"large_image": "snake", "imageBig": "legacy"}"#),
            &defaults,
        );
        assert_eq!(descriptor.large_image.as_deref(), Some("snake"));

        let descriptor = PresenceDescriptor::normalize(
            &raw(r#"{"largeImage": "camel", "large_image": "snake"}"#),
            &defaults,
        );
        assert_eq!(descriptor.large_image.as_deref(), Some("camel"));

        // Blank and wrongly-typed candidates are skipped, not matched.
        let descriptor = PresenceDescriptor::normalize(
            &raw(r#"{"smallImage": "  ", "small_image": 42, "imageSmall": "legacy"}"#),
            &defaults,
        );
        assert_eq!(descriptor.small_image.as_deref(), Some("legacy"));

        let descriptor = PresenceDescriptor::normalize(
            &raw(r#"{"smallImageText": "tip", "small_text": "ignored"}"#),
            &defaults,
        );
        assert_eq!(descriptor.small_text.as_deref(), Some("tip"));
    }

    #[test]
    fn numeric_timestamps_pass_through() {
        assert_eq!(
            normalize_timestamp(Some(&serde_json::json!(1_234_567)), None),
            Some(1_234_567)
        );
        // Fractions truncate toward zero.
        assert_eq!(
            normalize_timestamp(Some(&serde_json::json!(1234.9)), None),
            Some(1234)
        );
    }

    #[test]
    fn numeric_strings_parse_as_numbers() {
        assert_eq!(
            normalize_timestamp(Some(&serde_json::json!("1234567")), None),
            Some(1_234_567)
        );
        assert_eq!(
            normalize_timestamp(Some(&serde_json::json!("  1e3  ")), None),
            Some(1000)
        );
    }

    #[test]
    fn date_strings_parse_to_epoch_milliseconds() {
        assert_eq!(
            normalize_timestamp(Some(&serde_json::json!("2024-01-01T00:00:00Z")), None),
            Some(1_704_067_200_000)
        );
        assert_eq!(
            normalize_timestamp(
                Some(&serde_json::json!("Mon, 01 Jan 2024 00:00:00 GMT")),
                None
            ),
            Some(1_704_067_200_000)
        );
    }

    #[test]
    fn unparsable_timestamps_fall_back() {
        let fallback = Some(579_600_000);

        assert_eq!(
            normalize_timestamp(Some(&serde_json::json!("not-a-date")), fallback),
            fallback
        );
        assert_eq!(
            normalize_timestamp(Some(&serde_json::json!(true)), fallback),
            fallback
        );
        assert_eq!(
            normalize_timestamp(Some(&serde_json::json!("")), fallback),
            fallback
        );
        assert_eq!(normalize_timestamp(None, fallback), fallback);
    }

    #[test]
    fn explicit_null_timestamp_stays_absent() {
        // null means "no timestamp", overriding the fallback.
        assert_eq!(
            normalize_timestamp(Some(&Value::Null), Some(579_600_000)),
            None
        );

        let descriptor = PresenceDescriptor::normalize(
            &raw(r#"{"startTimestamp": null}"#),
            &test_defaults(),
        );
        assert_eq!(descriptor.start_timestamp, None);
    }
}
