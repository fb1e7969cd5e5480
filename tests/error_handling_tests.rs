//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error responses are properly formatted
//! - Error conversions work correctly
//! - Error matching allows clients to handle specific cases

use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use this_params::prelude::*;

fn failed(errors: &[&str]) -> ValidationError {
    ValidationError::Failed {
        errors: errors.iter().map(|e| e.to_string()).collect(),
    }
}

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_validation_failure_returns_400() {
        let err = ParamError::Validation(failed(&["age field is required"]));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_body_returns_400() {
        let err = ParamError::Request(RequestError::InvalidBody {
            message: "expected a JSON object".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_query_returns_400() {
        let err = ParamError::Request(RequestError::InvalidQuery {
            message: "bad escape".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_config_error_returns_500() {
        let err = ParamError::Config(ConfigError::UnknownRule {
            rule: "isZipCode".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// =============================================================================
// Error Code Tests
// =============================================================================

mod error_code_tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ParamError::Validation(failed(&["x"])).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            ParamError::Config(ConfigError::DuplicateMember {
                name: "age".to_string()
            })
            .error_code(),
            "CONFIG_ERROR"
        );
        assert_eq!(
            ParamError::Request(RequestError::InvalidBody {
                message: String::new()
            })
            .error_code(),
            "INVALID_BODY"
        );
        assert_eq!(
            ParamError::Request(RequestError::InvalidQuery {
                message: String::new()
            })
            .error_code(),
            "INVALID_QUERY"
        );
    }
}

// =============================================================================
// Error Response Format Tests
// =============================================================================

mod error_response_tests {
    use super::*;

    #[test]
    fn test_validation_response_lists_every_error() {
        let err = ParamError::Validation(failed(&["age field is required", "bad email"]));

        let response = err.to_response();

        assert_eq!(response.code, "VALIDATION_ERROR");
        assert!(response.message.contains("bad email"));
        let details = response.details.unwrap();
        assert_eq!(
            details["errors"],
            json!(["age field is required", "bad email"])
        );
    }

    #[test]
    fn test_config_response_has_no_details() {
        let err = ParamError::Config(ConfigError::NonRuleElement {
            field: "age".to_string(),
            index: 2,
        });

        let response = err.to_response();

        assert_eq!(response.code, "CONFIG_ERROR");
        assert!(
            response
                .message
                .contains("validation array must contain only Rule instances")
        );
        assert!(response.details.is_none());
    }

    #[test]
    fn test_cycle_message_lists_the_chain() {
        let err = ConfigError::InheritanceCycle {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "schema inheritance cycle: a -> b -> a");
    }
}

// =============================================================================
// Error Conversion Tests
// =============================================================================

mod error_conversion_tests {
    use super::*;

    #[test]
    fn test_config_error_converts_to_param_error() {
        let config_err = ConfigError::UnknownSchema {
            name: "signup".to_string(),
        };

        let err: ParamError = config_err.into();

        assert!(matches!(err, ParamError::Config(ConfigError::UnknownSchema { .. })));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_error_converts_to_param_error() {
        let err: ParamError = failed(&["bad email"]).into();
        assert!(matches!(err, ParamError::Validation(_)));
    }

    #[tokio::test]
    async fn test_failed_report_converts_through_into_result() {
        let validator = Validator::new(
            ValidatorSchema::builder()
                .field("age", [Rule::new("isInt")])
                .build()
                .unwrap(),
        );

        let report = validator.validate(ParameterBag::new()).await.unwrap();
        let err: ParamError = report.into_result().unwrap_err().into();

        assert_eq!(err.to_response().details.unwrap()["errors"][0], "age field is required");
    }
}

// =============================================================================
// Error Pattern Matching Tests
// =============================================================================

mod error_matching_tests {
    use super::*;

    #[test]
    fn test_can_match_specific_config_errors() {
        let err = ParamError::Config(ConfigError::NonRuleElement {
            field: "age".to_string(),
            index: 1,
        });

        let location = match err {
            ParamError::Config(ConfigError::NonRuleElement { field, index }) => {
                Some(format!("{field}[{index}]"))
            }
            _ => None,
        };

        assert_eq!(location, Some("age[1]".to_string()));
    }

    #[test]
    fn test_can_match_validation_errors() {
        let err = ParamError::Validation(failed(&["a", "b"]));

        let count = match &err {
            ParamError::Validation(e) => e.errors().len(),
            _ => 0,
        };

        assert_eq!(count, 2);
    }
}

// =============================================================================
// IntoResponse Tests
// =============================================================================

mod into_response_tests {
    use super::*;

    #[tokio::test]
    async fn test_validation_error_into_response() {
        let err = ParamError::Validation(failed(&["uid field is required"]));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["details"]["errors"], json!(["uid field is required"]));
    }

    #[tokio::test]
    async fn test_config_error_into_response_omits_details() {
        let err = ParamError::Config(ConfigError::UnknownRule {
            rule: "isZipCode".to_string(),
        });

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "CONFIG_ERROR");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_request_error_into_response_status() {
        let err = ParamError::Request(RequestError::InvalidBody {
            message: "expected a JSON object".to_string(),
        });

        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
