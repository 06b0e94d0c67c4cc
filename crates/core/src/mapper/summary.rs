//! mergeSecondarySummary: enriches an opportunity with the AWS-side summary.

use serde_json::Value;

pub const DEFAULT_ORIGIN: &str = "Partner referral";

/// (JSON pointer in the GetAwsOpportunitySummary response, key in the opportunity).
const SUMMARY_FIELDS: &[(&str, &str)] = &[
    ("/Origin", "Origin"),
    ("/InvolvementType", "InvolvementType"),
    ("/Insights/EngagementScore", "EngagementScore"),
    ("/Insights/NextBestActions", "NextBestActions"),
    ("/RelatedEntityIds/AwsProducts", "AwsProducts"),
    ("/RelatedEntityIds/Solutions", "Solutions"),
];

/// Copies the allow-listed summary fields that are present and non-null in
/// `secondary` onto `primary`. `Origin` always comes from `secondary`, falling
/// back to [`DEFAULT_ORIGIN`]. A non-object `primary` is returned unchanged.
pub fn merge_secondary_summary(mut primary: Value, secondary: &Value) -> Value {
    let Some(map) = primary.as_object_mut() else {
        return primary;
    };

    for (pointer, key) in SUMMARY_FIELDS {
        match secondary.pointer(pointer) {
            Some(Value::Null) | None => {}
            Some(value) => {
                map.insert((*key).to_string(), value.clone());
            }
        }
    }

    let secondary_origin = secondary
        .get("Origin")
        .is_some_and(|v| !v.is_null() && v.as_str() != Some(""));
    if !secondary_origin {
        map.insert("Origin".to_string(), Value::String(DEFAULT_ORIGIN.to_string()));
    }

    primary
}

/// Merges the outcome of a best-effort secondary fetch. A failed fetch is
/// logged and leaves `primary` with only the default `Origin` applied.
pub fn merge_secondary_result(primary: Value, secondary: anyhow::Result<Value>) -> Value {
    match secondary {
        Ok(summary) => merge_secondary_summary(primary, &summary),
        Err(err) => {
            tracing::warn!(error = %err, "AWS opportunity summary unavailable; showing partner view only");
            merge_secondary_summary(primary, &Value::Null)
        }
    }
}
