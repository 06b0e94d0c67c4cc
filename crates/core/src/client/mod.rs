pub mod fixture;

use crate::domain::form::FormState;
use crate::domain::opportunity::ReviewStatus;
use crate::mapper::request::build_request;
use crate::mapper::response::clean_response;
use crate::mapper::summary::merge_secondary_result;
use crate::mapper::token::ClientToken;
use crate::mapper::Operation;
use anyhow::Context;
use serde_json::Value;
use std::collections::HashSet;

const SOLUTIONS_ENTITY_TYPE: &str = "Solutions";

/// Transport seam to the Selling API. Implementations map vendor failures
/// into [`crate::domain::error::SellingError`] so callers can `downcast_ref` them.
#[async_trait::async_trait]
pub trait SellingClient: Send + Sync {
    async fn send(&self, operation: Operation, payload: Value) -> anyhow::Result<Value>;
}

/// GetOpportunity, cleaned; approved opportunities are enriched with the
/// AWS-side summary on a best-effort basis.
pub async fn fetch_opportunity(
    client: &dyn SellingClient,
    catalog: &str,
    identifier: &str,
) -> anyhow::Result<Value> {
    let form = FormState::new()
        .with_text("Catalog", catalog)
        .with_text("Identifier", identifier);
    let token = ClientToken::generate();

    let request = build_request(Operation::GetOpportunity, &form, &token)?;
    let opportunity = clean_response(client.send(Operation::GetOpportunity, request).await?);

    let review_status = opportunity
        .pointer("/LifeCycle/ReviewStatus")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<ReviewStatus>().ok());
    if review_status != Some(ReviewStatus::Approved) {
        tracing::info!(identifier, ?review_status, "skipping AWS summary enrichment");
        return Ok(opportunity);
    }

    let summary = match build_request(Operation::GetAwsOpportunitySummary, &form, &token) {
        Ok(request) => client
            .send(Operation::GetAwsOpportunitySummary, request)
            .await
            .map(clean_response),
        Err(err) => Err(err),
    };
    Ok(merge_secondary_result(opportunity, summary))
}

/// Runs a list operation page by page, following `NextToken` until it is
/// missing, null or repeated, and returns every summary in order.
pub async fn list_all(
    client: &dyn SellingClient,
    operation: Operation,
    form: &FormState,
) -> anyhow::Result<Vec<Value>> {
    let key = operation
        .summaries_key()
        .with_context(|| format!("{operation} is not a list operation"))?;
    let mut form = form.clone();
    form.remove("NextToken");
    let token = ClientToken::generate();

    let mut summaries = Vec::new();
    let mut seen = HashSet::new();
    let mut pages = 0usize;
    loop {
        let request = build_request(operation, &form, &token)?;
        let page = clean_response(client.send(operation, request).await?);
        pages += 1;
        if let Some(Value::Array(items)) = page.get(key) {
            summaries.extend(items.iter().cloned());
        }

        let next = page
            .get("NextToken")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty());
        match next {
            Some(next) if seen.insert(next.to_string()) => {
                form.set_text("NextToken", next);
            }
            Some(next) => {
                tracing::warn!(%operation, next_token = next, "NextToken repeated; stopping");
                break;
            }
            None => break,
        }
    }

    tracing::info!(%operation, pages, count = summaries.len(), "listed all pages");
    Ok(summaries)
}

/// Swaps the solution linked to an opportunity: disassociates `old_solution`,
/// then associates `new_solution`. Nothing is associated when the first call
/// fails. Returns the AssociateOpportunity response.
pub async fn replace_solution(
    client: &dyn SellingClient,
    catalog: &str,
    opportunity_id: &str,
    old_solution: &str,
    new_solution: &str,
) -> anyhow::Result<Value> {
    let token = ClientToken::generate();
    let base = FormState::new()
        .with_text("Catalog", catalog)
        .with_text("Identifier", opportunity_id)
        .with_text("RelatedEntityType", SOLUTIONS_ENTITY_TYPE);

    let old_form = base.clone().with_text("RelatedEntityIdentifier", old_solution);
    let new_form = base.with_text("RelatedEntityIdentifier", new_solution);
    // Validate both before touching the remote side.
    let disassociate = build_request(Operation::DisassociateOpportunity, &old_form, &token)?;
    let associate = build_request(Operation::AssociateOpportunity, &new_form, &token)?;

    client
        .send(Operation::DisassociateOpportunity, disassociate)
        .await?;
    let response = client.send(Operation::AssociateOpportunity, associate).await?;
    tracing::info!(opportunity_id, old_solution, new_solution, "solution replaced");
    Ok(clean_response(response))
}
