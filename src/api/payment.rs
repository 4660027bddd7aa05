use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::Processor,
    data::{PaymentRequest, PaymentStatus, ProviderResponse},
    error::ProcessError,
};

#[tracing::instrument(skip_all, fields(op = "process_payment"))]
pub async fn initiate(
    State(processor): State<Processor>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<ProviderResponse>, ProcessError> {
    tracing::debug!(?request, "initiate_payment");

    let res = processor.initiate_payment(request).await?;

    Ok(Json(res))
}

#[tracing::instrument(skip_all, fields(op = "success_payment"))]
pub async fn succeed(
    State(processor): State<Processor>,
    Path(payment_id): Path<String>,
) -> Result<StatusCode, ProcessError> {
    mark(processor, &payment_id, PaymentStatus::Success).await
}

#[tracing::instrument(skip_all, fields(op = "fail_payment"))]
pub async fn fail(
    State(processor): State<Processor>,
    Path(payment_id): Path<String>,
) -> Result<StatusCode, ProcessError> {
    mark(processor, &payment_id, PaymentStatus::Failed).await
}

async fn mark(
    processor: Processor,
    payment_id: &str,
    status: PaymentStatus,
) -> Result<StatusCode, ProcessError> {
    tracing::info!(payment_id, %status, "payment_callback");

    processor.process_payment(payment_id, status).await?;

    Ok(StatusCode::OK)
}
