//! Identification Orchestration Integration Tests
//!
//! Primary stage, best-effort enrichment, and the merge.

use std::sync::Arc;

use flora_lens::services::{IdentificationError, IdentificationService, ImageInput, ResultCache};
use flora_lens_core::{MapData, MemoryStore, ParseError, SpeciesName, DISTRIBUTION_UNAVAILABLE};
use flora_lens_llm::{GroundingTool, LlmError, PromptPart};

use crate::support::{
    maps_citation, network_error, payload, text, with_citations, ScriptedGateway, JPEG_BYTES,
};

fn service(gateway: &Arc<ScriptedGateway>) -> IdentificationService {
    IdentificationService::new(gateway.clone(), "gemini-3-flash-preview", "gemini-2.5-flash")
}

fn photo() -> ImageInput {
    ImageInput::from_bytes(JPEG_BYTES.to_vec(), Some("jpg")).unwrap()
}

#[tokio::test]
async fn test_image_identification_always_has_map_data() {
    let cases = vec![
        with_citations(
            "Native to the rainforests of southern Mexico.",
            vec![maps_citation(Some("Chiapas"), "https://maps.google.com/?cid=1")],
        ),
        text("Native range summary without citations."),
        text("   "),
        network_error(),
    ];

    for secondary in cases {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            text(&payload("Swiss Cheese Plant").to_string()),
            secondary,
        ]));
        let ident = service(&gateway).identify_from_image(&photo()).await.unwrap();
        assert!(ident.map_data.is_some());
    }
}

#[tokio::test]
async fn test_grounding_failure_returns_documented_fallback() {
    let gateway = Arc::new(ScriptedGateway::new(vec![
        text(&payload("Swiss Cheese Plant").to_string()),
        network_error(),
    ]));

    let ident = service(&gateway).identify_from_image(&photo()).await.unwrap();

    let map = ident.map_data.unwrap();
    assert_eq!(map.summary, DISTRIBUTION_UNAVAILABLE);
    assert_eq!(
        map.summary,
        "Global distribution data is currently unavailable."
    );
    assert!(map.links.is_empty());
    assert_eq!(ident.common_name, "Swiss Cheese Plant");
}

#[tokio::test]
async fn test_citations_are_mapped_with_default_title() {
    let gateway = Arc::new(ScriptedGateway::new(vec![
        text(&payload("Swiss Cheese Plant").to_string()),
        with_citations(
            "Found from Mexico to Panama.",
            vec![
                maps_citation(None, "https://maps.google.com/?cid=7"),
                maps_citation(Some("Panama"), "https://maps.google.com/?cid=8"),
            ],
        ),
    ]));

    let ident = service(&gateway).identify_from_image(&photo()).await.unwrap();
    let map = ident.map_data.unwrap();
    assert_eq!(map.links[0].title, "View Distribution");
    assert_eq!(map.links[0].uri, "https://maps.google.com/?cid=7");
    assert_eq!(map.links[1].title, "Panama");
}

#[tokio::test]
async fn test_missing_health_score_is_parse_error_and_cache_unchanged() {
    let mut bad = payload("Swiss Cheese Plant");
    bad["healthStatus"]
        .as_object_mut()
        .unwrap()
        .remove("healthScore");
    let gateway = Arc::new(ScriptedGateway::new(vec![text(&bad.to_string())]));
    let cache = ResultCache::load(Arc::new(MemoryStore::new()));

    let result = service(&gateway).identify_from_image(&photo()).await;

    assert!(matches!(
        result,
        Err(IdentificationError::Parse(ParseError::Schema(_)))
    ));
    // Only the primary call was made and nothing reached the cache
    assert_eq!(gateway.requests().len(), 1);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_name_lookup_parse_error_on_wrong_type() {
    let mut bad = payload("Basil");
    bad["toxicity"]["isToxic"] = serde_json::json!("no");
    let gateway = Arc::new(ScriptedGateway::new(vec![text(&bad.to_string())]));

    let err = service(&gateway)
        .identify_from_name(&SpeciesName::new("Basil").unwrap())
        .await
        .unwrap_err();
    match err {
        IdentificationError::Parse(ParseError::Schema(violations)) => {
            assert!(violations.iter().any(|v| v.path == "toxicity.isToxic"));
        }
        other => panic!("expected schema violation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_primary_gateway_error_is_not_retried() {
    let gateway = Arc::new(ScriptedGateway::new(vec![Err(LlmError::RateLimited {
        message: "quota exhausted".to_string(),
        retry_after: Some(30),
    })]));

    let err = service(&gateway).identify_from_image(&photo()).await.unwrap_err();
    assert!(matches!(
        err,
        IdentificationError::Gateway(LlmError::RateLimited { .. })
    ));
    assert_eq!(gateway.requests().len(), 1);
}

#[tokio::test]
async fn test_stages_run_in_order_with_species_names() {
    let gateway = Arc::new(ScriptedGateway::new(vec![
        text(&payload("Swiss Cheese Plant").to_string()),
        text("Central America."),
    ]));

    service(&gateway)
        .identify_from_name(&SpeciesName::new("monstera").unwrap())
        .await
        .unwrap();

    let requests = gateway.requests();
    assert_eq!(requests.len(), 2);

    let primary = &requests[0];
    assert!(primary.response_schema.is_some());
    assert!(primary.grounding.is_none());
    assert_eq!(primary.model.as_deref(), Some("gemini-3-flash-preview"));

    let secondary = &requests[1];
    assert_eq!(secondary.grounding, Some(GroundingTool::Maps));
    assert_eq!(secondary.model.as_deref(), Some("gemini-2.5-flash"));
    match &secondary.parts[0] {
        PromptPart::Text { text } => {
            assert!(text.contains("Swiss Cheese Plant"));
            assert!(text.contains("Monstera deliciosa"));
        }
        other => panic!("unexpected part {:?}", other),
    }
}

#[tokio::test]
async fn test_primary_map_data_is_replaced_by_enrichment() {
    let mut with_map = payload("Swiss Cheese Plant");
    with_map["mapData"] = serde_json::json!({"summary": "invented", "links": []});
    let gateway = Arc::new(ScriptedGateway::new(vec![
        text(&with_map.to_string()),
        network_error(),
    ]));

    let ident = service(&gateway).identify_from_image(&photo()).await.unwrap();
    assert_eq!(ident.map_data, Some(MapData::unavailable()));
}
