use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use tracing::{debug, error};
use validator::Validate;

use crate::app::AppState;
use crate::chat::ChatSession;
use crate::server::types::{
    ApiError, ChatApiRequest, ChatApiResponse, ConvertParams, DeleteSessionResponse,
    HealthResponse, ValidateAddressParams,
};
use crate::tools::{chains, contracts, gas, units};
use crate::tools::{AddressValidation, ChainLookup, GasLookup, TemplateLookup, UnitConversion};

pub async fn root() -> Json<HealthResponse> {
    Json(HealthResponse::new("online"))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::new("healthy"))
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatApiRequest>,
) -> Result<Json<ChatApiResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let outcome = state
        .chat()
        .send_message(request.session_id, &request.message)
        .await
        .map_err(|e| {
            error!("Chat request failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(ChatApiResponse {
        response: outcome.response,
        session_id: outcome.session_id,
        timestamp: Utc::now(),
        usage: outcome.usage,
    }))
}

pub async fn list_sessions(State(state): State<AppState>) -> Json<Vec<ChatSession>> {
    Json(state.chat().list_sessions().await)
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<DeleteSessionResponse> {
    let existed = state.chat().delete_session(&session_id).await;
    debug!("Delete session {} (existed: {})", session_id, existed);

    // Deleting is idempotent; unknown ids get the same acknowledgement
    Json(DeleteSessionResponse {
        status: "deleted",
        session_id,
    })
}

pub async fn blockchain_info(Path(chain_name): Path<String>) -> Json<ChainLookup> {
    Json(chains::blockchain_info(&chain_name))
}

pub async fn validate_address(
    State(state): State<AppState>,
    Query(params): Query<ValidateAddressParams>,
) -> Json<AddressValidation> {
    let chain = params.chain.as_deref().unwrap_or("ethereum");
    Json(state.toolkit().address_validator().validate(&params.address, chain))
}

pub async fn gas_fees(Path(chain): Path<String>) -> Json<GasLookup> {
    Json(gas::gas_fees(&chain))
}

pub async fn contract_template(Path(contract_type): Path<String>) -> Json<TemplateLookup> {
    Json(contracts::contract_template(&contract_type))
}

pub async fn convert_units(Query(params): Query<ConvertParams>) -> Json<UnitConversion> {
    Json(units::convert(
        params.amount,
        &params.from_unit,
        &params.to_unit,
    ))
}
