//! Typed opportunity shape shared by CreateOpportunity and UpdateOpportunity.
//!
//! Wire names are PascalCase. Scalar fields are `Nullable` so a request can say
//! "explicitly null" instead of dropping the key; list fields default to `[]`.

use crate::domain::nullable::Nullable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal $(| $alias:literal)*),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire $(, alias = $alias)*)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($wire $(| $alias)* => Ok($name::$variant),)+
                    other => Err(format!(
                        "unknown {} value {other:?} (expected one of: {})",
                        stringify!($name),
                        [$($wire),+].join(", ")
                    )),
                }
            }
        }
    };
}

wire_enum!(
    /// Approval state. Transitions are owned by the Selling API; the mapper only reads and writes it.
    ReviewStatus {
        Draft => "Draft",
        PendingSubmission => "Pending Submission",
        Submitted => "Submitted",
        InReview => "In review" | "In Review",
        Approved => "Approved",
        Rejected => "Rejected",
        ActionRequired => "Action Required",
    }
);

wire_enum!(Stage {
    Prospect => "Prospect",
    Qualified => "Qualified",
    TechnicalValidation => "Technical Validation",
    BusinessValidation => "Business Validation",
    Committed => "Committed",
    Launched => "Launched",
    ClosedLost => "Closed Lost",
});

wire_enum!(OpportunityType {
    NetNewBusiness => "Net New Business",
    Expansion => "Expansion",
    FlatRenewal => "Flat Renewal" | "Flat renewal",
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub city: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub country_code: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub postal_code: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub state_or_region: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub street_address: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Account {
    #[serde(default)]
    pub address: Address,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub aws_account_id: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub company_name: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub duns: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub industry: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub other_industry: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub website_url: Nullable<String>,
}

/// Customer contact, partner team member, or assignee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub business_title: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub email: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub first_name: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub last_name: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub phone: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Customer {
    #[serde(default)]
    pub account: Account,
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NextStepsHistoryEntry {
    pub time: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifeCycle {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub closed_lost_reason: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub next_steps: Nullable<String>,
    #[serde(default)]
    pub next_steps_history: Vec<NextStepsHistoryEntry>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub review_comments: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub review_status: Nullable<ReviewStatus>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub review_status_reason: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub stage: Nullable<Stage>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub target_close_date: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Marketing {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub aws_funding_used: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub campaign_name: Nullable<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub source: Nullable<String>,
    #[serde(default)]
    pub use_cases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpectedCustomerSpend {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub amount: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub currency_code: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub estimation_url: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub frequency: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub target_company: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub additional_comments: Nullable<String>,
    #[serde(default)]
    pub apn_programs: Vec<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub competitor_name: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub customer_business_problem: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub customer_use_case: Nullable<String>,
    #[serde(default)]
    pub delivery_models: Vec<String>,
    #[serde(default)]
    pub expected_customer_spend: Vec<ExpectedCustomerSpend>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub other_competitor_names: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub other_solution_description: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub related_opportunity_identifier: Nullable<String>,
    #[serde(default)]
    pub sales_activities: Vec<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub title: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonetaryValue {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub amount: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub currency_code: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SoftwareRevenue {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub delivery_model: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub effective_date: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub expiration_date: Nullable<String>,
    #[serde(default)]
    pub value: MonetaryValue,
}

/// Request body of CreateOpportunity and UpdateOpportunity.
///
/// `ClientToken` is only carried by creates; `Identifier` and `LastModifiedDate`
/// only by updates. `OpportunityTeam` is create-only and skipped when `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OpportunityRequest {
    pub catalog: String,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub client_token: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub identifier: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub last_modified_date: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub origin: Nullable<String>,
    #[serde(default)]
    pub customer: Customer,
    #[serde(default)]
    pub life_cycle: LifeCycle,
    #[serde(default)]
    pub marketing: Marketing,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub national_security: Nullable<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity_team: Option<Vec<Contact>>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub opportunity_type: Nullable<OpportunityType>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub partner_opportunity_identifier: Nullable<String>,
    #[serde(default)]
    pub primary_needs_from_aws: Vec<String>,
    #[serde(default)]
    pub project: Project,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub software_revenue: Nullable<SoftwareRevenue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enums_use_wire_names_and_accept_aliases() {
        assert_eq!(
            serde_json::to_value(ReviewStatus::ActionRequired).unwrap(),
            json!("Action Required")
        );
        assert_eq!("Flat renewal".parse::<OpportunityType>(), Ok(OpportunityType::FlatRenewal));
        assert_eq!(
            serde_json::from_value::<Stage>(json!("Closed Lost")).unwrap(),
            Stage::ClosedLost
        );
        assert!("Won".parse::<Stage>().is_err());
    }

    #[test]
    fn default_request_keeps_list_keys() {
        let req = OpportunityRequest {
            catalog: "Sandbox".to_string(),
            ..Default::default()
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["PrimaryNeedsFromAws"], json!([]));
        assert_eq!(v["Project"]["ApnPrograms"], json!([]));
        assert_eq!(v["Customer"]["Contacts"], json!([]));
        assert!(v.get("ClientToken").is_none());
    }
}
