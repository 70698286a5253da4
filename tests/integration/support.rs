//! Shared test support: a scripted inference gateway and payload fixtures.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use flora_lens_core::{parse_identification, Identification};
use flora_lens_llm::{
    Citation, CitationKind, GenerateRequest, GenerateResponse, InferenceGateway, LlmError,
    LlmResult, ProviderConfig, UsageStats,
};

/// Gateway that replays canned responses in order and records every request.
pub struct ScriptedGateway {
    responses: Mutex<Vec<LlmResult<GenerateResponse>>>,
    requests: Mutex<Vec<GenerateRequest>>,
    config: ProviderConfig,
    reachable: bool,
}

impl ScriptedGateway {
    pub fn new(responses: Vec<LlmResult<GenerateResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            config: ProviderConfig {
                api_key: Some("test-key".to_string()),
                ..ProviderConfig::default()
            },
            reachable: true,
        }
    }

    /// A gateway whose health check fails.
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new(vec![])
        }
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceGateway for ScriptedGateway {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    fn supports_multimodal(&self) -> bool {
        true
    }

    fn supports_grounding(&self) -> bool {
        true
    }

    async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(LlmError::Other {
                message: "No more scripted responses".to_string(),
            })
        } else {
            responses.remove(0)
        }
    }

    async fn health_check(&self) -> LlmResult<()> {
        if self.reachable {
            Ok(())
        } else {
            Err(LlmError::NetworkError {
                message: "connection refused".to_string(),
            })
        }
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

pub fn text(text: &str) -> LlmResult<GenerateResponse> {
    with_citations(text, vec![])
}

pub fn with_citations(text: &str, citations: Vec<Citation>) -> LlmResult<GenerateResponse> {
    Ok(GenerateResponse {
        text: Some(text.to_string()),
        citations,
        usage: UsageStats::default(),
        model: "scripted-model".to_string(),
    })
}

pub fn maps_citation(title: Option<&str>, uri: &str) -> Citation {
    Citation {
        kind: CitationKind::Maps,
        title: title.map(str::to_string),
        uri: Some(uri.to_string()),
    }
}

pub fn network_error() -> LlmResult<GenerateResponse> {
    Err(LlmError::NetworkError {
        message: "connection reset by peer".to_string(),
    })
}

/// A schema-valid primary payload.
pub fn payload(common_name: &str) -> Value {
    json!({
        "commonName": common_name,
        "scientificName": "Monstera deliciosa",
        "family": "Araceae",
        "description": "A climbing evergreen with split leaves.",
        "careInstructions": {
            "watering": "Water when the top 5 cm of soil is dry",
            "sunlight": "Bright indirect light",
            "soil": "Chunky aroid mix",
            "fertilizer": "Monthly balanced feed in summer"
        },
        "toxicity": {"isToxic": true, "details": "Calcium oxalate crystals"},
        "healthStatus": {
            "isHealthy": false,
            "diagnosis": "Yellowing lower leaves",
            "treatment": "Reduce watering",
            "healthScore": 64
        },
        "isWeed": {"status": false, "reasoning": "Cultivated houseplant"},
        "suggestedReminders": [
            {"task": "Water the soil weekly", "description": "Check dryness first", "frequency": "Weekly"},
            {"task": "Wipe leaves", "description": "Remove dust", "frequency": "Monthly"}
        ]
    })
}

/// A complete identification, as the orchestrator would produce it.
pub fn identification(common_name: &str) -> Identification {
    parse_identification(&payload(common_name).to_string())
        .unwrap()
        .with_map_data(flora_lens_core::MapData::unavailable())
}

/// Smallest byte string recognised as a JPEG.
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
