use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// Authoring constraints handed to the model. Nothing here is enforced locally.
pub const CANVAS_WIDTH: u32 = 1200;
pub const CANVAS_HEIGHT: u32 = 800;
pub const GROUND_Y: u32 = 750;
pub const MAX_VERTICAL_GAP: u32 = 120;
pub const MAX_HORIZONTAL_GAP: u32 = 200;

// Input: what the game sends us.
// Every field is optional and left unvalidated; values are only ever
// interpolated into prompt text.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub theme: Option<Value>,
    #[serde(default)]
    pub level: Option<Value>,
    #[serde(default)]
    pub difficulty: Option<Value>,
}

impl GenerationRequest {
    pub fn new(theme: &str, level: i64, difficulty: i64) -> Self {
        Self {
            theme: Some(Value::from(theme)),
            level: Some(Value::from(level)),
            difficulty: Some(Value::from(difficulty)),
        }
    }
}

/// Renders a request field for the prompt: strings bare, other JSON as text,
/// missing or null as `unspecified`.
struct Field<'a>(&'a Option<Value>);

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None | Some(Value::Null) => f.write_str("unspecified"),
            Some(Value::String(s)) => f.write_str(s),
            Some(other) => write!(f, "{other}"),
        }
    }
}

/// Builds the designer prompt sent to the model for one request.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let theme = Field(&request.theme);
    let level = Field(&request.level);
    let difficulty = Field(&request.difficulty);

    format!(
        r#"You are a professional game level designer. Create a challenging and creative platformer level based on this theme: "{theme}".

Level number: {level}
Difficulty: {difficulty}/5

Generate a JSON response with the following structure:
{{
    "platforms": [
        {{"x": number, "y": number, "width": number, "height": number, "color": "hex_color"}}
    ],
    "collectibles": [
        {{"x": number, "y": number}}
    ],
    "goalPosition": {{"x": number, "y": number}},
    "backgroundColor": "hex_color"
}}

Requirements:
- Canvas size is {CANVAS_WIDTH}x{CANVAS_HEIGHT}
- Create 10-20 platforms that match the theme
- Platforms should be progressively harder to reach (difficulty {difficulty})
- Add 5-15 collectibles (coins/stars) on or near platforms
- Goal should be at the end of the level
- Use colors that match the theme
- Make platforms reachable with jumps (max vertical gap: {MAX_VERTICAL_GAP}px, max horizontal gap: {MAX_HORIZONTAL_GAP}px)
- Vary platform sizes (width: 60-150, height: 15-25)
- Ground should be at y={GROUND_Y}

Be creative with platform placement to match the theme! For example:
- Pyramid shapes for Egyptian theme
- Floating platforms for space theme
- Dense foliage-like platforms for forest theme
- Neon grid patterns for cyberpunk theme"#
    )
}
