use crate::models::OperationMode;

/// Fixed instruction sent for one-click enhancement. Content-preserving.
pub const ENHANCE_INSTRUCTION: &str = "Enhance the overall quality and resolution of the image. Increase sharpness, clarity, and detail. Correct any noise or blurriness. Do not change the content of the image.";

pub const EDIT_SUGGESTIONS: &[&str] = &[
    "Add a retro, vintage filter",
    "Make the sky look like a van Gogh painting",
    "Add a small, friendly robot in the corner",
    "Turn this into a black and white sketch",
    "Remove the person in the background",
];

pub const ANALYZE_SUGGESTIONS: &[&str] = &[
    "Describe this image in detail",
    "What is the main subject of this photo?",
    "What emotions does this image evoke?",
    "Suggest a creative caption for this picture",
    "Is this a real place? If so, where is it?",
];

/// Prompt suggestions offered for a mode. Enhance takes no prompt.
pub fn suggestions(mode: OperationMode) -> &'static [&'static str] {
    match mode {
        OperationMode::Edit => EDIT_SUGGESTIONS,
        OperationMode::Analyze => ANALYZE_SUGGESTIONS,
        OperationMode::Enhance => &[],
    }
}
