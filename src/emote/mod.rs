//! Emote tagging: the structured description returned by the vision model
//! and the processor that produces it.

pub mod processor;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub use processor::EmoteProcessor;

/// Placeholder the model is asked to put in front of emote names.
pub const NAME_PREFIX_PLACEHOLDER: &str = "strim99";

/// Name of the function tool the model answers through.
pub const RESPONSE_TOOL: &str = "response";

/// Description of the response tool.
pub const RESPONSE_TOOL_DESCRIPTION: &str = "Return the results in a structured format";

/// Structured description of one emote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmoteDescription {
    /// Suggested emote name, prefixed.
    pub twitch_emote_name: String,
    /// Suggested file stem for the stored renditions.
    pub filename: String,
    /// Short phrase describing the image.
    pub description: String,
    /// Single-word category.
    pub category: String,
    /// Not safe for work.
    pub nsfw: bool,
    /// Plain-English description of the key colours.
    pub color_description: String,
    /// Main colour as hex.
    pub main_color: String,
    /// Secondary colour as hex.
    pub secondary_color: String,
    /// `static`, `animated` or `animated-static`.
    pub emote_type: String,
    /// `cartoon`, `realistic` or `abstract`.
    pub emote_style: String,
    /// Facial expression.
    pub emote_expression: String,
    /// File format, e.g. `png`.
    pub emote_format: String,
    /// Size in pixels.
    pub emote_size: String,
    /// `low`, `medium` or `high`.
    pub emote_quality: String,
    /// How well the 28px rendition reads in chat.
    #[serde(rename = "emoteSuitability28px")]
    pub emote_suitability_28px: String,
}

impl EmoteDescription {
    /// Replace the first placeholder occurrence in the name and file stem.
    pub fn apply_prefix(&mut self, prefix: &str) {
        self.twitch_emote_name = self
            .twitch_emote_name
            .replacen(NAME_PREFIX_PLACEHOLDER, prefix, 1);
        self.filename = self.filename.replacen(NAME_PREFIX_PLACEHOLDER, prefix, 1);
    }
}

fn string_field(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

/// JSON schema of [`EmoteDescription`], used as the tool parameters.
#[must_use]
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "twitchEmoteName": string_field(
                "Twitch emote name, must be prefixed with 'strim99' such as 'strim99Example'; \
                 if possible, use an applicable meme as the name/filename rather than the literal \
                 representation of the emote, such as 'TakeMyMoney', 'Stonks', or 'Dumpy'"
            ),
            "filename": string_field(
                "Recommended filename of the image based on the Twitch emote name; \
                 must omit the file extension"
            ),
            "description": string_field("Describe the image in a short phrase"),
            "category": string_field("Emote category; must a non-exclusive single-word adjective"),
            "nsfw": {
                "type": "boolean",
                "description": "Indicate if the image is safe vs not safe for work"
            },
            "colorDescription": string_field(
                "Verbose description of the key colors in the image, in plain English, \
                 using accurate detailed color names"
            ),
            "mainColor": string_field("Main color of the image in hexadecimal format"),
            "secondaryColor": string_field("Secondary color of the image in hexadecimal format"),
            "emoteType": string_field(
                "Type of emote; must be one of 'static', 'animated', or 'animated-static'"
            ),
            "emoteStyle": string_field(
                "Style of emote; must be one of 'cartoon', 'realistic', or 'abstract'"
            ),
            "emoteExpression": string_field(
                "Emote expression; must be one of 'happy', 'sad', 'angry', 'surprised', \
                 'disgusted', 'scared', or 'neutral'"
            ),
            "emoteFormat": string_field("Emote format; examples: 'png', 'gif', 'apng'"),
            "emoteSize": string_field("Emote size in pixels"),
            "emoteQuality": string_field(
                "Emote quality; must be one of 'low', 'medium', or 'high'"
            ),
            "emoteSuitability28px": string_field(
                "How well does the 28x28px image work as a 28x28 chat emote; must be one of \
                 'excellent', 'good', 'acceptable', or 'poor'; be mindful of the level of detail \
                 and complexity in the image; assume zooming is not available as a feature to \
                 the end user"
            ),
        },
        "required": [
            "twitchEmoteName", "filename", "description", "category", "nsfw",
            "colorDescription", "mainColor", "secondaryColor", "emoteType", "emoteStyle",
            "emoteExpression", "emoteFormat", "emoteSize", "emoteQuality", "emoteSuitability28px"
        ]
    })
}
