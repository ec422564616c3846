use actix_web::{HttpResponse, ResponseError, http::StatusCode, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{
    apperror::{ApplicationError, ErrorType},
    models::{LocationType, StatisticResultType, StatisticType, StatisticsInputType},
};

/***************** Stats models *********************/

/**
 * Request structure for computing statistics.
 *
 * Exactly one of the location code lists must be non-empty.
 */
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsRequest {
    /**
     * The varieties to compute a statistic for, one result each.
     */
    pub varieties: Vec<String>,
    /**
     * The crop year.
     */
    pub year: i32,
    /**
     * The reduction to apply.
     */
    #[serde(rename = "type")]
    pub statistic_type: StatisticType,
    pub city_code: Option<Vec<String>>,
    pub department_code: Option<Vec<String>>,
    pub region_code: Option<Vec<String>>,
}

impl From<web::Json<StatisticsRequest>> for StatisticsInputType {
    fn from(request: web::Json<StatisticsRequest>) -> Self {
        let request = request.into_inner();
        StatisticsInputType {
            varieties: request.varieties,
            year: request.year,
            statistic_type: request.statistic_type,
            city_codes: request.city_code,
            department_codes: request.department_code,
            region_codes: request.region_code,
        }
    }
}

/**
 * Statistic of one variety in the Stats API.
 */
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticResultResponse {
    statistic_type: StatisticType,
    variety: String,
    location_type: LocationType,
    /**
     * The requested location codes.
     */
    locations: Vec<String>,
    year: i32,
    /**
     * Yield value, null when no crop matched.
     */
    #[serde(with = "rust_decimal::serde::arbitrary_precision_option")]
    value: Option<Decimal>,
}

impl From<StatisticResultType> for StatisticResultResponse {
    fn from(result: StatisticResultType) -> Self {
        StatisticResultResponse {
            statistic_type: result.statistic_type,
            variety: result.variety,
            location_type: result.location_type,
            locations: result.locations,
            year: result.year,
            value: result.value,
        }
    }
}

/***************** Error models *********************/

/**
 * Custom error response for the application.
 */
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /**
     * The error code associated with the error type.
     */
    pub code: u16,
    /**
     * A human-readable message describing the error.
     */
    pub message: String,
}

impl ResponseError for ApplicationError {
    fn status_code(&self) -> StatusCode {
        get_statuscode(&self.error_type)
    }

    /**
     * Generates an error response for the application error.
     */
    fn error_response(&self) -> HttpResponse {
        let error_response = ErrorResponse { code: get_error_code(&self.error_type), message: self.message.clone() };
        HttpResponse::build(self.status_code()).json(&error_response)
    }
}

/**
* Maps application errors to HTTP status codes.
*
* # Arguments
* `application_error`: The type of error that occurred.
*
* # Returns
* The corresponding HTTP status code.
*/
fn get_statuscode(application_error: &ErrorType) -> StatusCode {
    match application_error {
        ErrorType::Validation => StatusCode::BAD_REQUEST,
        ErrorType::ConstraintViolation => StatusCode::CONFLICT,
        ErrorType::Initialization | ErrorType::DatabaseError | ErrorType::Arithmetic => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/**
 * Maps application errors to error codes.
 *
 * # Arguments
 * `application_error`: The type of error that occurred.
 *
 * # Returns
 * The corresponding error code.
 */
fn get_error_code(application_error: &ErrorType) -> u16 {
    match application_error {
        ErrorType::Initialization => 1001,
        ErrorType::Validation => 1002,
        ErrorType::DatabaseError => 1003,
        ErrorType::Arithmetic => 1004,
        ErrorType::ConstraintViolation => 1005,
    }
}

/**
 * Json extractor configuration turning malformed bodies into validation errors.
 */
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _http_request| ApplicationError::new(ErrorType::Validation, format!("Invalid request body: {err}")).into())
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;
    use crate::{model::models::CropYieldType, service::calculator::calculate_yield};

    #[test]
    fn test_request_deserialization() {
        let request: StatisticsRequest = serde_json::from_str(r#"{"varieties":["ALIXAN","MAORI"],"year":2017,"type":"AVERAGE","cityCode":["49420"],"regionCode":[]}"#).unwrap();
        let input = StatisticsInputType::from(web::Json(request));
        assert_eq!(input.varieties, vec!["ALIXAN".to_string(), "MAORI".to_string()]);
        assert_eq!(input.statistic_type, StatisticType::Average);
        assert_eq!(input.city_codes, Some(vec!["49420".to_string()]));
        assert_eq!(input.department_codes, None);
        assert_eq!(input.region_codes, Some(vec![]));
    }

    #[test]
    fn test_request_unknown_type() {
        let request = serde_json::from_str::<StatisticsRequest>(r#"{"varieties":["ALIXAN"],"year":2017,"type":"MEDIAN","cityCode":["49420"]}"#);
        assert!(request.is_err());
    }

    #[test]
    fn test_response_serialization() {
        let result = StatisticResultType::new(StatisticType::Max, "ALIXAN".to_string(), LocationType::City, vec!["49420".to_string()], 2017, Some(Decimal::from(68)));
        let json = serde_json::to_value(StatisticResultResponse::from(result)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"statisticType": "MAX", "variety": "ALIXAN", "locationType": "CITY", "locations": ["49420"], "year": 2017, "value": 68})
        );
    }

    #[test]
    fn test_response_serialization_no_value() {
        let result = StatisticResultType::new(StatisticType::Min, "MAORI".to_string(), LocationType::Region, vec!["52".to_string()], 2020, None);
        let json = serde_json::to_value(StatisticResultResponse::from(result)).unwrap();
        assert!(json["value"].is_null());
        assert_eq!(json["locationType"], "REGION");
    }

    #[test]
    fn test_response_serialization_keeps_all_digits() {
        let value = Decimal::from_str("1.2345678901234567890").unwrap();
        let result = StatisticResultType::new(StatisticType::Average, "ALIXAN".to_string(), LocationType::City, vec!["49420".to_string()], 2017, Some(value));
        let json = serde_json::to_string(&StatisticResultResponse::from(result)).unwrap();
        assert!(json.ends_with(r#""value":1.2345678901234567890}"#));
    }

    #[test]
    fn test_response_serialization_computed_yield() {
        let crop_yield = calculate_yield(&CropYieldType::new(Decimal::from_str("123456789.0123456789").unwrap(), Decimal::from(7))).unwrap();
        let result = StatisticResultType::new(StatisticType::Max, "MAORI".to_string(), LocationType::Department, vec!["49".to_string()], 2018, Some(crop_yield));
        let json = serde_json::to_value(StatisticResultResponse::from(result)).unwrap();
        assert_eq!(json["value"].to_string(), crop_yield.to_string());
        assert_eq!(Decimal::from_str(&json["value"].to_string()).unwrap(), crop_yield);
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ApplicationError::new(ErrorType::Validation, String::new()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApplicationError::new(ErrorType::Arithmetic, String::new()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApplicationError::new(ErrorType::DatabaseError, String::new()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(get_error_code(&ErrorType::Validation), 1002);
        assert_eq!(get_error_code(&ErrorType::Arithmetic), 1004);
    }

    #[actix_web::test]
    async fn test_arithmetic_error_response() {
        let response = ApplicationError::new(ErrorType::Arithmetic, "Division by zero".to_string()).error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["code"], 1004);
        assert_eq!(body["message"], "Division by zero");
    }
}
