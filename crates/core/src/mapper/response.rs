//! flattenResponse: Selling API response -> cleaned object + display rows.

use crate::domain::opportunity::ReviewStatus;
use crate::mapper::html;
use crate::mapper::Operation;
use serde::Serialize;
use serde_json::{Map, Value};

const TRANSPORT_KEYS: &[&str] = &["$metadata", "__type"];
const EMPTY_CELL: &str = "-";

/// Fields the Selling API assigns or rejects on UpdateOpportunity.
const UPDATE_EXCLUDED_KEYS: &[&str] = &[
    "Id",
    "CreatedDate",
    "OpportunityTeam",
    "RelatedEntityIdentifiers",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DisplayRow {
    pub path: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlattenedResponse {
    pub operation: Operation,
    pub cleaned: Value,
    pub rows: Vec<DisplayRow>,
}

/// Strips transport metadata, normalizes `EstimationUrl` and decodes HTML
/// entities. Applying it to its own output changes nothing.
pub fn clean_response(mut response: Value) -> Value {
    clean_in_place(&mut response);
    html::unescape_value(&mut response);
    response
}

fn clean_in_place(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in TRANSPORT_KEYS {
                map.remove(*key);
            }
            if let Some(Value::Array(entries)) = map.get_mut("ExpectedCustomerSpend") {
                for entry in entries.iter_mut() {
                    if let Value::Object(spend) = entry {
                        spend.insert("EstimationUrl".to_string(), Value::Null);
                    }
                }
            }
            map.values_mut().for_each(clean_in_place);
        }
        Value::Array(items) => items.iter_mut().for_each(clean_in_place),
        _ => {}
    }
}

/// Cleans `response` and derives its display rows. Never fails: any JSON
/// value produces a (possibly empty) row set.
pub fn flatten_response(operation: Operation, response: Value) -> FlattenedResponse {
    let cleaned = clean_response(response);
    let rows = flatten_rows(&cleaned);
    tracing::debug!(%operation, rows = rows.len(), "flattened response");
    FlattenedResponse {
        operation,
        cleaned,
        rows,
    }
}

/// Dotted object paths with `[i]` indices. Lists of scalars become one
/// comma-joined row; null, empty strings and empty containers render as `-`.
pub fn flatten_rows(value: &Value) -> Vec<DisplayRow> {
    let mut rows = Vec::new();
    walk(value, String::new(), &mut rows);
    rows
}

fn walk(value: &Value, path: String, rows: &mut Vec<DisplayRow>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                walk(child, child_path, rows);
            }
        }
        Value::Array(items) if !items.is_empty() && items.iter().all(is_scalar) => {
            let joined = items.iter().map(cell).collect::<Vec<_>>().join(", ");
            rows.push(DisplayRow { path, value: joined });
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, child) in items.iter().enumerate() {
                walk(child, format!("{path}[{i}]"), rows);
            }
        }
        other => rows.push(DisplayRow {
            path,
            value: cell(other),
        }),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => EMPTY_CELL.to_string(),
        Value::String(s) if s.trim().is_empty() => EMPTY_CELL.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => EMPTY_CELL.to_string(),
    }
}

/// Turns a GetOpportunity response into an UpdateOpportunity payload: `Id`
/// becomes `Identifier` and vendor-assigned fields are dropped. `review_status`
/// overrides `LifeCycle.ReviewStatus` (used to simulate a review in Sandbox).
pub fn prepare_update(response: Value, review_status: Option<ReviewStatus>) -> Value {
    let mut cleaned = clean_response(response);
    if let Value::Object(map) = &mut cleaned {
        if let Some(id) = map.get("Id").cloned() {
            map.insert("Identifier".to_string(), id);
        }
        for key in UPDATE_EXCLUDED_KEYS {
            map.remove(*key);
        }

        if let Some(status) = review_status {
            let life_cycle = map
                .entry("LifeCycle")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(life_cycle) = life_cycle {
                life_cycle.insert(
                    "ReviewStatus".to_string(),
                    Value::String(status.as_str().to_string()),
                );
            }
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::FormState;
    use crate::mapper::request::{build_request, form_from_opportunity, opportunity_form_fields};
    use crate::mapper::token::ClientToken;
    use serde_json::json;

    fn get_opportunity_response() -> Value {
        json!({
            "$metadata": {"httpStatusCode": 200, "requestId": "abc"},
            "Catalog": "Sandbox",
            "Id": "O1234567",
            "Arn": "arn:aws:partnercentral:us-east-1::catalog/Sandbox/opportunity/O1234567",
            "CreatedDate": "2026-01-01T00:00:00Z",
            "LastModifiedDate": "2026-01-02T00:00:00Z",
            "Customer": {
                "Account": {"CompanyName": "Smith &amp;amp; Sons", "Duns": "111100111"},
                "Contacts": []
            },
            "LifeCycle": {"ReviewStatus": "Submitted", "Stage": "Prospect"},
            "OpportunityTeam": [{"FirstName": "Sam", "__type": "Contact"}],
            "PrimaryNeedsFromAws": ["Co-Sell - Architectural Validation", "Co-Sell - Pricing Assistance"],
            "Project": {
                "Title": "Deal",
                "ExpectedCustomerSpend": [{
                    "Amount": "100",
                    "CurrencyCode": "USD",
                    "Frequency": "Monthly",
                    "TargetCompany": "AWS",
                    "EstimationUrl": "http://x",
                    "__type": "Foo"
                }]
            },
            "RelatedEntityIdentifiers": {"Solutions": ["S-1"]}
        })
    }

    #[test]
    fn strips_type_tags_and_normalizes_estimation_url() {
        let out = flatten_response(Operation::GetOpportunity, get_opportunity_response());
        assert_eq!(
            out.cleaned["Project"]["ExpectedCustomerSpend"],
            json!([{
                "Amount": "100",
                "CurrencyCode": "USD",
                "Frequency": "Monthly",
                "TargetCompany": "AWS",
                "EstimationUrl": null
            }])
        );
        assert!(out.cleaned.get("$metadata").is_none());
        assert!(out.cleaned["OpportunityTeam"][0].get("__type").is_none());
        assert_eq!(
            out.cleaned["Customer"]["Account"]["CompanyName"],
            json!("Smith & Sons")
        );
    }

    #[test]
    fn estimation_url_is_normalized_at_any_depth() {
        let response = json!({
            "OpportunitySummaries": [
                {"Project": {"ExpectedCustomerSpend": [{"EstimationUrl": "http://y", "__type": "X"}]}}
            ]
        });
        let cleaned = clean_response(response);
        assert_eq!(
            cleaned["OpportunitySummaries"][0]["Project"]["ExpectedCustomerSpend"][0],
            json!({"EstimationUrl": null})
        );
    }

    #[test]
    fn flatten_is_idempotent() {
        let once = flatten_response(Operation::GetOpportunity, get_opportunity_response());
        let twice = flatten_response(Operation::GetOpportunity, once.cleaned.clone());
        assert_eq!(once, twice);

        let nested = json!({"Project": {"Title": "R&amp;amp;amp;amp;amp;D"}});
        let once = flatten_response(Operation::GetOpportunity, nested);
        let twice = flatten_response(Operation::GetOpportunity, once.cleaned.clone());
        assert_eq!(once.cleaned["Project"]["Title"], json!("R&D"));
        assert_eq!(once, twice);
    }

    #[test]
    fn rows_use_dotted_paths_and_render_empties() {
        let rows = flatten_rows(&json!({
            "Customer": {"Account": {"CompanyName": "Acme", "Duns": null}, "Contacts": []},
            "PrimaryNeedsFromAws": ["A", "B"],
            "Team": [{"FirstName": "Sam"}],
            "Count": 2
        }));
        let rows: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.path.as_str(), r.value.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Count", "2"),
                ("Customer.Account.CompanyName", "Acme"),
                ("Customer.Account.Duns", "-"),
                ("Customer.Contacts", "-"),
                ("PrimaryNeedsFromAws", "A, B"),
                ("Team[0].FirstName", "Sam"),
            ]
        );
    }

    #[test]
    fn never_fails_on_odd_payloads() {
        assert_eq!(
            flatten_response(Operation::ListSolutions, json!(null)).rows,
            vec![DisplayRow {
                path: String::new(),
                value: "-".to_string()
            }]
        );
        assert!(flatten_response(Operation::ListSolutions, json!({})).rows.len() == 1);
    }

    #[test]
    fn prepare_update_renames_id_and_drops_vendor_fields() {
        let update = prepare_update(get_opportunity_response(), Some(ReviewStatus::Approved));
        assert_eq!(update["Identifier"], json!("O1234567"));
        for key in ["Id", "CreatedDate", "OpportunityTeam", "RelatedEntityIdentifiers", "$metadata"] {
            assert!(update.get(key).is_none(), "{key} should be removed");
        }
        assert_eq!(update["LifeCycle"]["ReviewStatus"], json!("Approved"));
        assert_eq!(update["LifeCycle"]["Stage"], json!("Prospect"));
        assert_eq!(update["LastModifiedDate"], json!("2026-01-02T00:00:00Z"));
    }

    #[test]
    fn build_then_flatten_round_trips_form_values() {
        let form = FormState::new()
            .with_text("Catalog", "Sandbox")
            .with_text("Origin", "Partner Referral")
            .with_text("CompanyName", "R&amp;D Labs")
            .with_text("Duns", "111100111")
            .with_text("AwsAccountId", "111111111112")
            .with_text("CountryCode", "US")
            .with_text("City", "Seattle")
            .with_text("CustomerFirstName", "Jane")
            .with_text("CustomerEmail", "jane@example.com")
            .with_text("PartnerFirstName", "Sam")
            .with_text("PartnerEmail", "sam@partner.com")
            .with_text("Stage", "Qualified")
            .with_text("ReviewStatus", "Pending Submission")
            .with_text("TargetCloseDate", "2029-10-05")
            .with_list("MarketingChannels", ["Email", "Webinar"])
            .with_text("MarketingSource", "Marketing Activity")
            .with_text("NationalSecurity", "No")
            .with_text("OpportunityType", "Expansion")
            .with_list("PrimaryNeedsFromAws", ["Co-Sell - Architectural Validation"])
            .with_list("ApnPrograms", ["ISV Accelerate Program"])
            .with_list("CustomerUseCase", ["Database"])
            .with_list("DeliveryModels", ["SaaS or PaaS"])
            .with_text("ExpectedAmount", "100")
            .with_text("ExpectedCurrency", "USD")
            .with_text("ExpectedFrequency", "Monthly")
            .with_text("ExpectedTargetCompany", "AWS")
            .with_text("Title", "Migration")
            .with_text("SoftwareDeliveryModel", "Pay-as-you-go")
            .with_text("SoftwareAmount", "6000")
            .with_text("SoftwareCurrencyCode", "USD");

        let payload =
            build_request(Operation::CreateOpportunity, &form, &ClientToken::generate()).unwrap();
        let flattened = flatten_response(Operation::CreateOpportunity, payload);
        let back = form_from_opportunity(&flattened.cleaned);

        for (field, is_list) in opportunity_form_fields() {
            if is_list {
                assert_eq!(back.list(field), form.list(field), "{field}");
            } else {
                assert_eq!(back.text(field), form.text(field), "{field}");
            }
        }
    }
}
