use actix_web::{HttpRequest, HttpResponse, route, web};
use tracing::{Instrument, instrument};

use crate::{
    api::{
        rest::{StatisticResultResponse, StatisticsRequest},
        state::AppState,
    },
    model::{apperror::ApplicationError, models::StatisticsInputType},
};

/**
 * Endpoint to compute yield statistics for a list of varieties.
 */
#[instrument(level = "info", skip(http_request, app_state), fields(service = "getStats", trace_id = get_trace_id(&http_request), result))]
#[route("/agriapi/v1/stats", method = "GET", method = "POST")]
pub async fn get_stats(http_request: HttpRequest, request_body: web::Json<StatisticsRequest>, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let statistics_query = StatisticsInputType::from(request_body).resolve()?;
    let results = app_state.statistics_service.get_statistics(statistics_query).instrument(span.clone()).await?;
    span.record("result", results.len());
    Ok(HttpResponse::Ok().json(results.into_iter().map(StatisticResultResponse::from).collect::<Vec<StatisticResultResponse>>()))
}

/**
 * Retrieves the trace ID from the HTTP request headers.
 * If the trace ID is not present, a new UUID is generated.
 */
fn get_trace_id(http_request: &HttpRequest) -> String {
    http_request.headers().get("X-Trace-ID")
        .and_then(|v| v.to_str().ok().map(std::string::ToString::to_string))
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
