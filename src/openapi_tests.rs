#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::OpenApi;
    use utoipa::openapi::{PathItemType, RefOr, schema::Schema};

    fn object_properties(name: &str) -> Vec<String> {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components");
        match components.schemas.get(name) {
            Some(RefOr::T(Schema::Object(obj))) => obj.properties.keys().cloned().collect(),
            other => panic!("{} should be an object schema, got {:?}", name, other),
        }
    }

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();

        let components = openapi.components.as_ref().unwrap();
        for name in ["HealthResponse", "RelayFailure", "PredictionFailure", "AnalysisResult"] {
            assert!(components.schemas.contains_key(name), "missing schema {}", name);
        }

        assert!(serde_json::to_string(&openapi).is_ok());
    }

    #[test]
    fn test_relay_failure_schema_structure() {
        let properties = object_properties("RelayFailure");
        for field in ["success", "error", "details"] {
            assert!(properties.iter().any(|p| p == field), "missing {}", field);
        }
    }

    #[test]
    fn test_prediction_failure_has_only_error() {
        assert_eq!(object_properties("PredictionFailure"), vec!["error".to_string()]);
    }

    #[test]
    fn test_recommendation_schemas() {
        let request = object_properties("RecommendationRequest");
        for field in ["portfolio", "sector_predictions", "growing_sectors", "declining_sectors", "events"] {
            assert!(request.iter().any(|p| p == field), "missing {}", field);
        }
        assert_eq!(
            object_properties("RecommendationReply"),
            vec!["recommendations".to_string(), "success".to_string()]
        );
    }

    #[test]
    fn test_openapi_paths_and_methods() {
        let openapi = ApiDoc::openapi();
        let expected = [
            ("/health", PathItemType::Get),
            ("/api/chatbot", PathItemType::Post),
            ("/api/generate-portfolio", PathItemType::Post),
            ("/api/generate-histogram", PathItemType::Get),
            ("/api/portfolio/process", PathItemType::Post),
            ("/api/explain", PathItemType::Post),
            ("/api/recommendations", PathItemType::Post),
        ];

        for (path, method) in expected {
            let item = openapi
                .paths
                .paths
                .get(path)
                .unwrap_or_else(|| panic!("missing path {}", path));
            assert!(item.operations.contains_key(&method), "{} has no {:?}", path, method);
        }
    }

    #[test]
    fn test_failure_references_use_schema_names() {
        let openapi_json = serde_json::to_string(&ApiDoc::openapi()).unwrap();

        assert!(openapi_json.contains("#/components/schemas/RelayFailure"));
        assert!(!openapi_json.contains("common.RelayFailure"));
    }
}
