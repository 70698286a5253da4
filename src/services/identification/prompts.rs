//! Identification Prompts
//!
//! Instruction text for the primary and grounding calls.

/// Instruction sent alongside a photo.
pub const IMAGE_INSTRUCTION: &str = "Identify this plant, provide detailed botanical and care info, diagnostic health info, weed status, and maintenance reminders in JSON format.";

/// Instruction for a name lookup.
///
/// No photo exists, so the model is told to report a healthy baseline.
pub fn name_instruction(name: &str) -> String {
    format!(
        "Provide detailed plant information for '{}' in the required JSON format. Assume the plant is healthy for the healthStatus field.",
        name
    )
}

/// Question for the geographic grounding call.
pub fn distribution_question(common_name: &str, scientific_name: &str) -> String {
    format!(
        "Where is the {} ({}) natively found in the world? Provide a concise summary and use Google Maps to verify the regions.",
        common_name, scientific_name
    )
}
