//! buildRequest: flat form state -> exact Selling API request payload.
//!
//! Missing scalars are sent as `null` and missing lists as `[]`; nothing the
//! operation carries is silently omitted. No network I/O happens here.

use crate::domain::error::SellingError;
use crate::domain::form::FormState;
use crate::domain::nullable::Nullable;
use crate::domain::opportunity::{
    Account, Address, Contact, Customer, ExpectedCustomerSpend, LifeCycle, Marketing,
    MonetaryValue, OpportunityRequest, OpportunityType, Project, ReviewStatus, SoftwareRevenue,
    Stage,
};
use crate::domain::validation::Validator;
use crate::mapper::token::ClientToken;
use crate::mapper::Operation;
use anyhow::Context;
use serde::Serialize;
use serde_json::Value;

const INVITATION_PAYLOAD_TYPE: &str = "OpportunityInvitation";
const INVITATION_PARTICIPANT_TYPE: &str = "RECEIVER";
const SOLUTION_STATUS_ACTIVE: &str = "Active";
const SORT_DESCENDING: &str = "DESCENDING";
const SORT_ORDERS: &[&str] = &["ASCENDING", SORT_DESCENDING];
const OPPORTUNITY_DEFAULT_SORT_BY: &str = "LastModifiedDate";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdentifierRequest {
    pub catalog: String,
    pub identifier: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssociateOpportunityRequest {
    pub catalog: String,
    pub opportunity_identifier: String,
    pub related_entity_identifier: String,
    pub related_entity_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssignOpportunityRequest {
    pub catalog: String,
    pub identifier: String,
    pub assignee: Contact,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AwsSubmission {
    pub involvement_type: Nullable<String>,
    pub visibility: Nullable<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartEngagementFromOpportunityTaskRequest {
    pub catalog: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_token: Option<ClientToken>,
    pub identifier: String,
    pub aws_submission: AwsSubmission,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartEngagementByAcceptingInvitationTaskRequest {
    pub catalog: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_token: Option<ClientToken>,
    pub identifier: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RejectEngagementInvitationRequest {
    pub catalog: String,
    pub identifier: String,
    pub rejection_reason: Nullable<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetAwsOpportunitySummaryRequest {
    pub catalog: String,
    pub related_opportunity_identifier: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Sort {
    pub sort_by: String,
    pub sort_order: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LastModifiedDateFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_last_modified_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_last_modified_date: Option<String>,
}

/// Filters are only sent when the form sets them; an empty filter list is not
/// "match everything" on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListOpportunitiesRequest {
    pub catalog: String,
    pub max_results: Nullable<u32>,
    pub next_token: Nullable<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub life_cycle_stage: Vec<Stage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub life_cycle_review_status: Vec<ReviewStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<LastModifiedDateFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListEngagementInvitationsRequest {
    pub catalog: String,
    pub max_results: Nullable<u32>,
    pub next_token: Nullable<String>,
    pub participant_type: String,
    pub payload_type: Vec<String>,
    pub sort: Sort,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListSolutionsRequest {
    pub catalog: String,
    pub max_results: Nullable<u32>,
    pub next_token: Nullable<String>,
    pub sort: Sort,
    pub status: Vec<String>,
}

/// Builds the request payload for `operation` from `form`.
///
/// `token` is the form session's idempotency token; it is only emitted for
/// operations that carry a `ClientToken`. Returns a [`SellingError::LocalValidation`]
/// (inside `anyhow::Error`) when required fields are blank or a value is malformed.
pub fn build_request(
    operation: Operation,
    form: &FormState,
    token: &ClientToken,
) -> anyhow::Result<Value> {
    let required = validate(operation, form)?;
    let catalog = required.catalog;
    let identifier = required.identifier.unwrap_or_default();

    let payload = match operation {
        Operation::CreateOpportunity => to_value(opportunity_request(operation, form, catalog, token)),
        Operation::UpdateOpportunity => {
            let mut req = opportunity_request(operation, form, catalog, token);
            req.identifier = Nullable::Value(identifier);
            to_value(req)
        }
        Operation::GetOpportunity
        | Operation::GetEngagementInvitation
        | Operation::AcceptEngagementInvitation => to_value(IdentifierRequest {
            catalog,
            identifier,
        }),
        Operation::AssociateOpportunity | Operation::DisassociateOpportunity => {
            to_value(AssociateOpportunityRequest {
                catalog,
                opportunity_identifier: identifier,
                related_entity_identifier: form
                    .text("RelatedEntityIdentifier")
                    .unwrap_or_default(),
                related_entity_type: form.text("RelatedEntityType").unwrap_or_default(),
            })
        }
        Operation::AssignOpportunity => {
            let mut assignee = contact(form, "Assignee");
            assignee.phone = Nullable::Absent;
            to_value(AssignOpportunityRequest {
                catalog,
                identifier,
                assignee,
            })
        }
        Operation::StartEngagementFromOpportunityTask => {
            to_value(StartEngagementFromOpportunityTaskRequest {
                catalog,
                client_token: token_for(operation, token),
                identifier,
                aws_submission: AwsSubmission {
                    involvement_type: scalar(form, "InvolvementType"),
                    visibility: scalar(form, "Visibility"),
                },
            })
        }
        Operation::StartEngagementByAcceptingInvitationTask => {
            to_value(StartEngagementByAcceptingInvitationTaskRequest {
                catalog,
                client_token: token_for(operation, token),
                identifier,
            })
        }
        Operation::RejectEngagementInvitation => to_value(RejectEngagementInvitationRequest {
            catalog,
            identifier,
            rejection_reason: scalar(form, "RejectionReason"),
        }),
        Operation::GetAwsOpportunitySummary => to_value(GetAwsOpportunitySummaryRequest {
            catalog,
            related_opportunity_identifier: identifier,
        }),
        Operation::ListOpportunities => to_value(ListOpportunitiesRequest {
            catalog,
            max_results: required.max_results.into(),
            next_token: scalar(form, "NextToken"),
            life_cycle_stage: required.stage_filter,
            life_cycle_review_status: required.review_status_filter,
            last_modified_date: last_modified_filter(form),
            sort: opportunity_sort(form),
        }),
        Operation::ListEngagementInvitations => to_value(ListEngagementInvitationsRequest {
            catalog,
            max_results: required.max_results.into(),
            next_token: scalar(form, "NextToken"),
            participant_type: form
                .text("ParticipantType")
                .unwrap_or_else(|| INVITATION_PARTICIPANT_TYPE.to_string()),
            payload_type: list_or(form, "PayloadType", INVITATION_PAYLOAD_TYPE),
            sort: Sort {
                sort_by: "InvitationDate".to_string(),
                sort_order: SORT_DESCENDING.to_string(),
            },
        }),
        Operation::ListSolutions => to_value(ListSolutionsRequest {
            catalog,
            max_results: required.max_results.into(),
            next_token: scalar(form, "NextToken"),
            sort: Sort {
                sort_by: "CreatedDate".to_string(),
                sort_order: SORT_DESCENDING.to_string(),
            },
            status: list_or(form, "Status", SOLUTION_STATUS_ACTIVE),
        }),
    }
    .with_context(|| format!("failed to serialize {operation} request"))?;

    tracing::debug!(%operation, fields = form.len(), "built request payload");
    Ok(payload)
}

struct Required {
    catalog: String,
    identifier: Option<String>,
    max_results: Option<u32>,
    stage_filter: Vec<Stage>,
    review_status_filter: Vec<ReviewStatus>,
}

fn validate(operation: Operation, form: &FormState) -> Result<Required, SellingError> {
    let mut v = Validator::new();
    let catalog = v.require(form, "Catalog");
    let identifier = if operation.requires_identifier() {
        v.require(form, "Identifier")
    } else {
        None
    };

    if matches!(
        operation,
        Operation::AssociateOpportunity | Operation::DisassociateOpportunity
    ) {
        v.require(form, "RelatedEntityType");
        v.require(form, "RelatedEntityIdentifier");
    }

    let mut max_results = None;
    if let Some(raw) = form.text("MaxResults") {
        match raw.parse::<u32>() {
            Ok(n) if n > 0 => max_results = Some(n),
            _ => v.push("MaxResults", "MaxResults must be a positive whole number"),
        }
    }

    let mut stage_filter = Vec::new();
    let mut review_status_filter = Vec::new();
    if operation == Operation::ListOpportunities {
        stage_filter = v.check_enum_list::<Stage>(form, "LifeCycleStage");
        review_status_filter = v.check_enum_list::<ReviewStatus>(form, "LifeCycleReviewStatus");
        v.check_timestamp(form, "AfterLastModifiedDate");
        v.check_timestamp(form, "BeforeLastModifiedDate");
        if let Some(order) = form.text("SortOrder") {
            if !SORT_ORDERS.iter().any(|o| o.eq_ignore_ascii_case(&order)) {
                v.push("SortOrder", "SortOrder must be ASCENDING or DESCENDING");
            }
        }
    }

    v.check_formats(form);
    v.finish().map_err(SellingError::LocalValidation)?;

    Ok(Required {
        // `require` pushed an error for a blank catalog, so `finish` already returned.
        catalog: catalog.unwrap_or_default(),
        identifier,
        max_results,
        stage_filter,
        review_status_filter,
    })
}

fn to_value<T: Serialize>(req: T) -> serde_json::Result<Value> {
    serde_json::to_value(req)
}

fn token_for(operation: Operation, token: &ClientToken) -> Option<ClientToken> {
    operation.uses_client_token().then(|| token.retry())
}

fn last_modified_filter(form: &FormState) -> Option<LastModifiedDateFilter> {
    let after = form.text("AfterLastModifiedDate");
    let before = form.text("BeforeLastModifiedDate");
    if after.is_none() && before.is_none() {
        return None;
    }
    Some(LastModifiedDateFilter {
        after_last_modified_date: after,
        before_last_modified_date: before,
    })
}

fn opportunity_sort(form: &FormState) -> Option<Sort> {
    let sort_by = form.text("SortBy");
    let sort_order = form.text("SortOrder");
    if sort_by.is_none() && sort_order.is_none() {
        return None;
    }
    Some(Sort {
        sort_by: sort_by.unwrap_or_else(|| OPPORTUNITY_DEFAULT_SORT_BY.to_string()),
        sort_order: sort_order
            .map(|o| o.to_ascii_uppercase())
            .unwrap_or_else(|| SORT_DESCENDING.to_string()),
    })
}

fn scalar(form: &FormState, field: &str) -> Nullable<String> {
    form.text(field).into()
}

fn list_or(form: &FormState, field: &str, default: &str) -> Vec<String> {
    let values = form.list(field);
    if values.is_empty() {
        vec![default.to_string()]
    } else {
        values
    }
}

/// Contact block from `{prefix}FirstName`, `{prefix}LastName`, `{prefix}Title`,
/// `{prefix}Email` and `{prefix}Phone`.
fn contact(form: &FormState, prefix: &str) -> Contact {
    let field = |suffix: &str| scalar(form, &format!("{prefix}{suffix}"));
    Contact {
        business_title: field("Title"),
        email: field("Email"),
        first_name: field("FirstName"),
        last_name: field("LastName"),
        phone: field("Phone"),
    }
}

fn contact_list(form: &FormState, prefix: &str) -> Vec<Contact> {
    let any = ["FirstName", "LastName", "Title", "Email", "Phone"]
        .iter()
        .any(|suffix| form.contains(&format!("{prefix}{suffix}")));
    if any {
        vec![contact(form, prefix)]
    } else {
        Vec::new()
    }
}

fn any_present(form: &FormState, fields: &[&str]) -> bool {
    fields.iter().any(|f| form.contains(f))
}

fn parsed<T: std::str::FromStr>(form: &FormState, field: &str) -> Nullable<T> {
    // Values were checked by `Validator::check_formats`.
    form.text(field).and_then(|s| s.parse::<T>().ok()).into()
}

fn opportunity_request(
    operation: Operation,
    form: &FormState,
    catalog: String,
    token: &ClientToken,
) -> OpportunityRequest {
    let is_create = operation == Operation::CreateOpportunity;
    let client_token = match token_for(operation, token) {
        Some(t) => Nullable::Value(t.as_str().to_string()),
        None => Nullable::Absent,
    };

    let expected_customer_spend = if any_present(
        form,
        &[
            "ExpectedAmount",
            "ExpectedCurrency",
            "ExpectedFrequency",
            "ExpectedTargetCompany",
        ],
    ) {
        vec![ExpectedCustomerSpend {
            amount: scalar(form, "ExpectedAmount"),
            currency_code: scalar(form, "ExpectedCurrency"),
            estimation_url: Nullable::Absent,
            frequency: scalar(form, "ExpectedFrequency"),
            target_company: scalar(form, "ExpectedTargetCompany"),
        }]
    } else {
        Vec::new()
    };

    let software_revenue = if any_present(
        form,
        &[
            "SoftwareDeliveryModel",
            "SoftwareEffectiveDate",
            "SoftwareExpirationDate",
            "SoftwareAmount",
            "SoftwareCurrencyCode",
        ],
    ) {
        Nullable::Value(SoftwareRevenue {
            delivery_model: scalar(form, "SoftwareDeliveryModel"),
            effective_date: scalar(form, "SoftwareEffectiveDate"),
            expiration_date: scalar(form, "SoftwareExpirationDate"),
            value: MonetaryValue {
                amount: scalar(form, "SoftwareAmount"),
                currency_code: scalar(form, "SoftwareCurrencyCode"),
            },
        })
    } else {
        Nullable::Null
    };

    OpportunityRequest {
        catalog,
        client_token,
        identifier: Nullable::Absent,
        last_modified_date: if is_create {
            Nullable::Absent
        } else {
            scalar(form, "LastModifiedDate")
        },
        origin: scalar(form, "Origin"),
        customer: Customer {
            account: Account {
                address: Address {
                    city: scalar(form, "City"),
                    country_code: scalar(form, "CountryCode"),
                    postal_code: scalar(form, "PostalCode"),
                    state_or_region: scalar(form, "StateOrRegion"),
                    street_address: scalar(form, "StreetAddress"),
                },
                aws_account_id: scalar(form, "AwsAccountId"),
                company_name: scalar(form, "CompanyName"),
                duns: scalar(form, "Duns"),
                industry: scalar(form, "Industry"),
                other_industry: scalar(form, "OtherIndustry"),
                website_url: scalar(form, "WebsiteUrl"),
            },
            contacts: contact_list(form, "Customer"),
        },
        life_cycle: LifeCycle {
            closed_lost_reason: scalar(form, "ClosedLostReason"),
            next_steps: scalar(form, "NextSteps"),
            next_steps_history: Vec::new(),
            review_comments: scalar(form, "ReviewComments"),
            review_status: parsed::<ReviewStatus>(form, "ReviewStatus"),
            review_status_reason: scalar(form, "ReviewStatusReason"),
            stage: parsed::<Stage>(form, "Stage"),
            target_close_date: scalar(form, "TargetCloseDate"),
        },
        marketing: Marketing {
            aws_funding_used: scalar(form, "AwsFundingUsed"),
            campaign_name: scalar(form, "CampaignName"),
            channels: form.list("MarketingChannels"),
            source: scalar(form, "MarketingSource"),
            use_cases: form.list("MarketingUseCases"),
        },
        national_security: scalar(form, "NationalSecurity"),
        opportunity_team: is_create.then(|| contact_list(form, "Partner")),
        opportunity_type: parsed::<OpportunityType>(form, "OpportunityType"),
        partner_opportunity_identifier: scalar(form, "PartnerOpportunityIdentifier"),
        primary_needs_from_aws: form.list("PrimaryNeedsFromAws"),
        project: Project {
            additional_comments: scalar(form, "AdditionalComments"),
            apn_programs: form.list("ApnPrograms"),
            competitor_name: scalar(form, "CompetitorName"),
            customer_business_problem: scalar(form, "CustomerBusinessProblem"),
            customer_use_case: scalar(form, "CustomerUseCase"),
            delivery_models: form.list("DeliveryModels"),
            expected_customer_spend,
            other_competitor_names: scalar(form, "OtherCompetitorNames"),
            other_solution_description: scalar(form, "OtherSolutionDescription"),
            related_opportunity_identifier: scalar(form, "RelatedOpportunityIdentifier"),
            sales_activities: form.list("SalesActivities"),
            title: scalar(form, "Title"),
        },
        software_revenue,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    List,
}

/// Flat form field <-> JSON pointer into an opportunity record.
const OPPORTUNITY_FIELDS: &[(&str, &str, FieldKind)] = &[
    ("Catalog", "/Catalog", FieldKind::Text),
    ("Origin", "/Origin", FieldKind::Text),
    ("CompanyName", "/Customer/Account/CompanyName", FieldKind::Text),
    ("Duns", "/Customer/Account/Duns", FieldKind::Text),
    ("Industry", "/Customer/Account/Industry", FieldKind::Text),
    ("OtherIndustry", "/Customer/Account/OtherIndustry", FieldKind::Text),
    ("WebsiteUrl", "/Customer/Account/WebsiteUrl", FieldKind::Text),
    ("AwsAccountId", "/Customer/Account/AwsAccountId", FieldKind::Text),
    ("City", "/Customer/Account/Address/City", FieldKind::Text),
    ("CountryCode", "/Customer/Account/Address/CountryCode", FieldKind::Text),
    ("PostalCode", "/Customer/Account/Address/PostalCode", FieldKind::Text),
    ("StateOrRegion", "/Customer/Account/Address/StateOrRegion", FieldKind::Text),
    ("StreetAddress", "/Customer/Account/Address/StreetAddress", FieldKind::Text),
    ("CustomerFirstName", "/Customer/Contacts/0/FirstName", FieldKind::Text),
    ("CustomerLastName", "/Customer/Contacts/0/LastName", FieldKind::Text),
    ("CustomerTitle", "/Customer/Contacts/0/BusinessTitle", FieldKind::Text),
    ("CustomerEmail", "/Customer/Contacts/0/Email", FieldKind::Text),
    ("CustomerPhone", "/Customer/Contacts/0/Phone", FieldKind::Text),
    ("PartnerFirstName", "/OpportunityTeam/0/FirstName", FieldKind::Text),
    ("PartnerLastName", "/OpportunityTeam/0/LastName", FieldKind::Text),
    ("PartnerTitle", "/OpportunityTeam/0/BusinessTitle", FieldKind::Text),
    ("PartnerEmail", "/OpportunityTeam/0/Email", FieldKind::Text),
    ("PartnerPhone", "/OpportunityTeam/0/Phone", FieldKind::Text),
    ("ClosedLostReason", "/LifeCycle/ClosedLostReason", FieldKind::Text),
    ("NextSteps", "/LifeCycle/NextSteps", FieldKind::Text),
    ("ReviewComments", "/LifeCycle/ReviewComments", FieldKind::Text),
    ("ReviewStatus", "/LifeCycle/ReviewStatus", FieldKind::Text),
    ("ReviewStatusReason", "/LifeCycle/ReviewStatusReason", FieldKind::Text),
    ("Stage", "/LifeCycle/Stage", FieldKind::Text),
    ("TargetCloseDate", "/LifeCycle/TargetCloseDate", FieldKind::Text),
    ("AwsFundingUsed", "/Marketing/AwsFundingUsed", FieldKind::Text),
    ("CampaignName", "/Marketing/CampaignName", FieldKind::Text),
    ("MarketingChannels", "/Marketing/Channels", FieldKind::List),
    ("MarketingSource", "/Marketing/Source", FieldKind::Text),
    ("MarketingUseCases", "/Marketing/UseCases", FieldKind::List),
    ("NationalSecurity", "/NationalSecurity", FieldKind::Text),
    ("OpportunityType", "/OpportunityType", FieldKind::Text),
    ("PartnerOpportunityIdentifier", "/PartnerOpportunityIdentifier", FieldKind::Text),
    ("PrimaryNeedsFromAws", "/PrimaryNeedsFromAws", FieldKind::List),
    ("AdditionalComments", "/Project/AdditionalComments", FieldKind::Text),
    ("ApnPrograms", "/Project/ApnPrograms", FieldKind::List),
    ("CompetitorName", "/Project/CompetitorName", FieldKind::Text),
    ("CustomerBusinessProblem", "/Project/CustomerBusinessProblem", FieldKind::Text),
    ("CustomerUseCase", "/Project/CustomerUseCase", FieldKind::Text),
    ("DeliveryModels", "/Project/DeliveryModels", FieldKind::List),
    ("ExpectedAmount", "/Project/ExpectedCustomerSpend/0/Amount", FieldKind::Text),
    ("ExpectedCurrency", "/Project/ExpectedCustomerSpend/0/CurrencyCode", FieldKind::Text),
    ("ExpectedFrequency", "/Project/ExpectedCustomerSpend/0/Frequency", FieldKind::Text),
    ("ExpectedTargetCompany", "/Project/ExpectedCustomerSpend/0/TargetCompany", FieldKind::Text),
    ("OtherCompetitorNames", "/Project/OtherCompetitorNames", FieldKind::Text),
    ("OtherSolutionDescription", "/Project/OtherSolutionDescription", FieldKind::Text),
    ("RelatedOpportunityIdentifier", "/Project/RelatedOpportunityIdentifier", FieldKind::Text),
    ("SalesActivities", "/Project/SalesActivities", FieldKind::List),
    ("Title", "/Project/Title", FieldKind::Text),
    ("SoftwareDeliveryModel", "/SoftwareRevenue/DeliveryModel", FieldKind::Text),
    ("SoftwareEffectiveDate", "/SoftwareRevenue/EffectiveDate", FieldKind::Text),
    ("SoftwareExpirationDate", "/SoftwareRevenue/ExpirationDate", FieldKind::Text),
    ("SoftwareAmount", "/SoftwareRevenue/Value/Amount", FieldKind::Text),
    ("SoftwareCurrencyCode", "/SoftwareRevenue/Value/CurrencyCode", FieldKind::Text),
    ("LastModifiedDate", "/LastModifiedDate", FieldKind::Text),
];

/// Pre-fills a form from an opportunity record (a cleaned GetOpportunity
/// response or a built Create/Update payload). Nulls and blanks are skipped;
/// `Id` or `Identifier` becomes the `Identifier` field.
pub fn form_from_opportunity(opportunity: &Value) -> FormState {
    let mut form = FormState::new();

    for (field, pointer, kind) in OPPORTUNITY_FIELDS {
        let Some(value) = opportunity.pointer(pointer) else {
            continue;
        };
        match (kind, value) {
            (FieldKind::Text, Value::String(s)) if !s.trim().is_empty() => {
                form.set_text(*field, s.as_str());
            }
            (FieldKind::Text, Value::Number(n)) => {
                form.set_text(*field, n.to_string());
            }
            (FieldKind::List, Value::Array(items)) => {
                let values: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(str::to_string)
                    .collect();
                if !values.is_empty() {
                    form.set_list(*field, values);
                }
            }
            _ => {}
        }
    }

    let identifier = opportunity
        .get("Id")
        .or_else(|| opportunity.get("Identifier"))
        .and_then(Value::as_str);
    if let Some(id) = identifier {
        form.set_text("Identifier", id);
    }

    form
}

/// Form fields `form_from_opportunity` can produce, for callers listing editable fields.
pub fn opportunity_form_fields() -> impl Iterator<Item = (&'static str, bool)> {
    OPPORTUNITY_FIELDS
        .iter()
        .map(|(field, _, kind)| (*field, *kind == FieldKind::List))
}
