//! Opportunity Payload Mapper: flat form state <-> Selling API JSON shapes.

pub mod html;
pub mod request;
pub mod response;
pub mod summary;
pub mod token;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Selling API operations the mapper can build requests for or clean responses of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateOpportunity,
    UpdateOpportunity,
    GetOpportunity,
    ListOpportunities,
    AssociateOpportunity,
    DisassociateOpportunity,
    AssignOpportunity,
    StartEngagementFromOpportunityTask,
    GetAwsOpportunitySummary,
    ListEngagementInvitations,
    GetEngagementInvitation,
    AcceptEngagementInvitation,
    RejectEngagementInvitation,
    StartEngagementByAcceptingInvitationTask,
    ListSolutions,
}

impl Operation {
    pub const ALL: &'static [Operation] = &[
        Operation::CreateOpportunity,
        Operation::UpdateOpportunity,
        Operation::GetOpportunity,
        Operation::ListOpportunities,
        Operation::AssociateOpportunity,
        Operation::DisassociateOpportunity,
        Operation::AssignOpportunity,
        Operation::StartEngagementFromOpportunityTask,
        Operation::GetAwsOpportunitySummary,
        Operation::ListEngagementInvitations,
        Operation::GetEngagementInvitation,
        Operation::AcceptEngagementInvitation,
        Operation::RejectEngagementInvitation,
        Operation::StartEngagementByAcceptingInvitationTask,
        Operation::ListSolutions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateOpportunity => "CreateOpportunity",
            Operation::UpdateOpportunity => "UpdateOpportunity",
            Operation::GetOpportunity => "GetOpportunity",
            Operation::ListOpportunities => "ListOpportunities",
            Operation::AssociateOpportunity => "AssociateOpportunity",
            Operation::DisassociateOpportunity => "DisassociateOpportunity",
            Operation::AssignOpportunity => "AssignOpportunity",
            Operation::StartEngagementFromOpportunityTask => "StartEngagementFromOpportunityTask",
            Operation::GetAwsOpportunitySummary => "GetAwsOpportunitySummary",
            Operation::ListEngagementInvitations => "ListEngagementInvitations",
            Operation::GetEngagementInvitation => "GetEngagementInvitation",
            Operation::AcceptEngagementInvitation => "AcceptEngagementInvitation",
            Operation::RejectEngagementInvitation => "RejectEngagementInvitation",
            Operation::StartEngagementByAcceptingInvitationTask => {
                "StartEngagementByAcceptingInvitationTask"
            }
            Operation::ListSolutions => "ListSolutions",
        }
    }

    /// Create/Start operations carry an idempotency `ClientToken`.
    pub fn uses_client_token(&self) -> bool {
        matches!(
            self,
            Operation::CreateOpportunity
                | Operation::StartEngagementFromOpportunityTask
                | Operation::StartEngagementByAcceptingInvitationTask
        )
    }

    /// Operations addressed at one existing opportunity or invitation. The form
    /// always names it `Identifier`, whatever the wire field is called.
    pub fn requires_identifier(&self) -> bool {
        matches!(
            self,
            Operation::UpdateOpportunity
                | Operation::GetOpportunity
                | Operation::AssociateOpportunity
                | Operation::DisassociateOpportunity
                | Operation::GetAwsOpportunitySummary
                | Operation::AssignOpportunity
                | Operation::StartEngagementFromOpportunityTask
                | Operation::GetEngagementInvitation
                | Operation::AcceptEngagementInvitation
                | Operation::RejectEngagementInvitation
                | Operation::StartEngagementByAcceptingInvitationTask
        )
    }

    /// Operations whose response is a page of summaries rather than a single record.
    pub fn summaries_key(&self) -> Option<&'static str> {
        match self {
            Operation::ListOpportunities => Some("OpportunitySummaries"),
            Operation::ListEngagementInvitations => Some("EngagementInvitationSummaries"),
            Operation::ListSolutions => Some("SolutionSummaries"),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("unknown Selling operation: {s}"))
    }
}
