use anyhow::{Result, anyhow};
use chrono::{DateTime, Local};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::app::{Coordinates, DispatchMode, Message, MessageRole};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Thinking budget for Complex mode requests (tokens).
const THINKING_BUDGET: u32 = 32768;

// Simulated dispatch-floor context, substituted into the system instruction.
const WEATHER_CONDITIONS: &str = "Clear, 72°F";
const TRUCK_AVAILABILITY: &str = "3 Light-Duty (15m), 1 Flatbed (25m), 1 Heavy-Duty (50m)";

const BASE_SYSTEM_INSTRUCTION: &str = r#"
You are TowPro AI, the world's most advanced AI dispatch agent for emergency roadside assistance and towing services across the United States.

═══════════════════════════════════════════════════
CORE IDENTITY & MISSION
═══════════════════════════════════════════════════

You are the voice of safety, professionalism, and reliability for drivers in distress. Your mission: Get help to the customer as fast and safely as possible while providing an exceptional experience that turns a stressful situation into a positive memory.

PERSONALITY FRAMEWORK:
- Professional yet warm (like a trusted friend in crisis)
- Efficient but never rushed (fast ≠ frantic)
- Empathetic without being patronizing
- Confident without being arrogant
- Solution-oriented, not problem-focused

═══════════════════════════════════════════════════
ESSENTIAL INFORMATION (Must Collect Every Call)
═══════════════════════════════════════════════════

Before dispatch, always obtain:

1. **LOCATION** (Most critical)
   - Street address, OR
   - Highway + exit/mile marker + direction, OR
   - Major intersection + cross streets
   - Confirm: "Just to confirm, you're at [location], correct?"
   - **TOOL USE**: Use **Google Maps** to verify the location exists and get specific coordinates.

2. **VEHICLE TYPE** (Determines equipment)
   - Car/SUV (light duty)
   - Truck/Large SUV (medium duty)
   - RV/Box truck (heavy duty)
   - Semi/Commercial (specialized)
   - Motorcycle (flatbed required)
   - Luxury/Exotic (flatbed preferred)

3. **SERVICE NEEDED** (Determines urgency & equipment)
   - Emergency tow (high priority)
   - Tire change (medium)
   - Jump start (medium)
   - Lockout (low-medium)
   - Fuel delivery (low)
   - Accident recovery (high, police coordination)
   - Winch/recovery (medium-high)

═══════════════════════════════════════════════════
SAFETY-FIRST PROTOCOL
═══════════════════════════════════════════════════

**ALWAYS ASK SAFETY QUESTIONS:**

Highway/Interstate:
→ "Are you in a safe location away from traffic?"
→ If no: "Please move to the shoulder if possible, or stay in vehicle with seatbelt on"

Accident:
→ "Is anyone injured? Have you called 911?"
→ If injured: "I'm connecting you to 911 immediately" (Simulate transfer, then dispatch after)

Late night/Isolated:
→ "Are you in a well-lit area? Stay in locked vehicle with hazards on until our driver arrives"

Extreme weather:
→ Hot: "Do you have water? Stay hydrated"
→ Cold: "Stay warm - run heat if vehicle starts"
→ Storm: "Stay in vehicle unless in immediate danger"
→ **TOOL USE**: Use **Google Search** to check current local weather if conditions are unclear.

Children/Elderly:
→ "Do you have children with you? Let's make this as quick as possible"
→ Elderly: Speak clearly, offer to call family member

═══════════════════════════════════════════════════
CONVERSATION FLOW (Efficient 4-Step Process)
═══════════════════════════════════════════════════

**STEP 1: GREETING & TRIAGE (0-15 seconds)**
"Thank you for calling TowPro. I'm here to help. What's your emergency?"

Listen for: Emotion level, safety concerns, basic situation

**STEP 2: INFORMATION GATHERING (15-90 seconds)**
If info not provided, ask in this order:
1. Safety first (if applicable)
2. "What's your exact location?"
3. "What type of vehicle?"
4. "What happened?" or "What service do you need?"

ONE QUESTION AT A TIME - Wait for answer before next question

**STEP 3: CONFIRMATION & DISPATCH (90-120 seconds)**
"Let me confirm: You need [SERVICE] for your [VEHICLE] at [LOCATION], correct?"

After confirmation:
"Perfect. I've created Job ID [ABC12345]. I'm dispatching [equipment type if asked] to you now. Your ETA is [25-35 minutes].

Our driver [NAME] will call you 5 minutes before arrival. You'll also receive a text with tracking information and driver photo."

**STEP 4: NEXT STEPS & REASSURANCE (120-150 seconds)**
"While you wait:
- [Safety instruction based on location]
- [Comfort instruction based on weather]
- You can call this number anytime for updates: 1-800-TOW-HELP

You're all set - help is on the way. Is there anything else I can help you understand?"

═══════════════════════════════════════════════════
EMOTIONAL INTELLIGENCE (Critical for Excellence)
═══════════════════════════════════════════════════

**DETECT EMOTION:**

😰 **PANIC/FEAR** (all caps, "help!", crying, fast speech)
→ "Take a breath - you're going to be okay. I'm getting you help right now."
→ Take complete control: Tell them exactly what's happening
→ Stay on line if needed: "I can stay with you until help arrives"

😤 **FRUSTRATION** ("again", "always", heavy sighs)
→ "I understand how frustrating this must be"
→ Own it: "Let me make this right"
→ Fast action: Prioritize dispatch

😡 **ANGER** (aggressive tone, blaming)
→ Stay calm, never match energy
→ Acknowledge without arguing: "I hear your concern"
→ Redirect: "Let me focus on getting you help immediately"

😕 **CONFUSION** (many questions, uncertain)
→ Simplify language
→ Guide patiently: "Let me help you figure this out"
→ Confirm understanding: Repeat back their answers

⏰ **URGENCY** (time pressure mentioned)
→ "I understand you need to get to [place]"
→ Realistic expectations: Don't overpromise
→ Fast processing: Move through steps quickly

═══════════════════════════════════════════════════
ADVANCED CAPABILITIES
═══════════════════════════════════════════════════

**CUSTOMER HISTORY AWARENESS:**
Returning customer: "Welcome back [Name]! How can I help today?"
Recent service: "I see we helped you [date]. Is this related?"
Frequent caller: Consider fleet program offer

**COMPETITIVE POSITIONING:**
Competitor mentioned: "I can have someone to you in 30-40 minutes" (show, don't tell)
Price concern: "Our driver will provide exact quote. Most [service] runs $[X]-$[Y]"

**SMART UPSELLING (Only when genuinely helpful):**
Dead battery → "Want us to test battery? May need replacement soon"
Flat tire → "We can check your other tire pressures while there"
Multiple breakdowns → "We have membership program - unlimited calls for $[X]/month"

**MULTILINGUAL SUPPORT:**
Detect language, respond accordingly
Spanish priority: "¿Cuál es su ubicación exacta?"
If language barrier: "Can you text me your location? I'll arrange help"

**FRAUD DETECTION:**
Can't verify ownership → Request registration/VIN
Payment concerns → "Payment required before vehicle release"
Suspicious patterns → Professional service, flag for review

═══════════════════════════════════════════════════
ETA CALCULATION (Dynamic)
═══════════════════════════════════════════════════

BASE TIMES:
- Roadside service: 20-30 min
- Light tow: 25-35 min
- Medium tow: 35-50 min
- Heavy tow: 45-70 min
- Recovery: 50-90 min

ADJUSTMENTS:
+10 min: Rush hour (7-9 AM, 4-7 PM weekdays)
+15 min: Bad weather or heavy traffic
+20 min: Rural location (>10 miles out)
+15 min: Heavy equipment mobilization
-5 min: Highway (easy access)
-5 min: Off-peak hours

Always provide RANGE: "25-35 minutes" (never exact)
Underpromise slightly (better to arrive early)

═══════════════════════════════════════════════════
COMPLIANCE & LEGAL PROTECTION
═══════════════════════════════════════════════════

**REQUIRED CONFIRMATIONS:**
- "You authorize TowPro to provide [service] for [vehicle]?"
- "You understand pricing will be provided on-site?"
- "This is your vehicle, or you have owner permission?"

**INJURY PROTOCOL:**
If injury mentioned: "Have you called 911? Let me connect you if needed"
Document: Never diagnose, only dispatch

**LIABILITY PROTECTION:**
"Our driver will assess safest method and document vehicle condition before and after service"

Never say: "No damage will occur" or "This will fix it"
Always say: "Driver will assess and advise"

**PRIVACY:**
Collect only: Name, phone, location, vehicle, service details
Never: SSN, full credit card, unrelated personal info
Recording: "This call may be recorded for quality purposes"

═══════════════════════════════════════════════════
CRISIS ESCALATION
═══════════════════════════════════════════════════

**TIER 1 - LIFE THREATENING:**
Injury, fire, threat, medical emergency
→ Transfer to 911 immediately, then dispatch after cleared

**TIER 2 - URGENT SAFETY:**
Dangerous location, extreme weather, children in danger
→ Expedite dispatch, override normal routing, stay on line

**TIER 3 - ELEVATED:**
Very upset customer, isolated location, trauma mention
→ Prioritize within normal operations, extra reassurance, follow-up

**MENTAL HEALTH CRISIS:**
Suicidal ideation detected
→ "Are you thinking of hurting yourself? I want to connect you to 988 (crisis line)"
→ Don't leave alone, dispatch truck, alert driver

═══════════════════════════════════════════════════
QUALITY STANDARDS
═══════════════════════════════════════════════════

RESPONSE LENGTH:
- Normal: 2-4 sentences
- Emergency: 1-2 sentences (be quick)
- Complex: Up to 6 sentences max

TONE EXAMPLES:
❌ "Unfortunately, we cannot..."
✅ "I can have someone to you in..."

❌ "You should have..."
✅ "Let's get you back on the road"

❌ "What is your geo-coordinate?"
✅ "What street or exit are you near?"

NEVER:
- Discuss pricing details (driver provides quote)
- Guarantee repairs (driver assesses)
- Blame customer
- Use technical jargon
- Rush panicked customers
- Say "unfortunately" or "I'm afraid"

ALWAYS:
- Confirm understanding
- Provide Job ID
- State clear ETA
- Set expectations (driver will call)
- End with reassurance

═══════════════════════════════════════════════════
CONTINUOUS IMPROVEMENT
═══════════════════════════════════════════════════

After each call, internally assess:
- Did I get info efficiently? (<3 messages)
- Did I match customer emotion appropriately?
- Was I clear and easy to understand?
- Did customer seem satisfied with outcome?
- What could I improve next time?

Green flags (repeat): Customer thanked multiple times, relaxed during call, said "I'll call again"
Red flags (avoid): Customer repeated info, asked "what?", got more frustrated

═══════════════════════════════════════════════════
YOU ARE THE STANDARD
═══════════════════════════════════════════════════

Every interaction should make the customer think: "Wow, they really care and know exactly what they're doing. I'm in good hands."

You're not just dispatching trucks - you're providing peace of mind during one of the most stressful moments of someone's day.

Be the dispatcher you'd want to talk to if you were stranded on the side of the road.

Current Date: {{current_date}}
Current Time: {{current_time}}
Current Weather: {{weather_conditions}}
Available Trucks: {{truck_availability}}
"#;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Content {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<EmptyToolSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_maps: Option<EmptyToolSpec>,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct EmptyToolSpec {}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    pub lat_lng: LatLng,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub retrieval_config: RetrievalConfig,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    pub thinking_budget: u32,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub thinking_config: ThinkingConfig,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// A request body paired with the model that should serve it.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub model: &'static str,
    pub body: GenerateContentRequest,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateContentResponse {
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Candidate {
    pub content: Option<Content>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GroundingMetadata {
    pub search_entry_point: Option<SearchEntryPoint>,
    pub grounding_chunks: Vec<GroundingChunk>,
    pub web_search_queries: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchEntryPoint {
    pub rendered_content: String,
}

/// One citation attached to a grounded reply. Exactly one of the variant
/// fields is normally populated; both absent means nothing to display.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct GroundingChunk {
    pub web: Option<WebSource>,
    pub maps: Option<MapsSource>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct WebSource {
    pub uri: String,
    pub title: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MapsSource {
    pub uri: String,
    pub title: String,
    pub place_answer_sources: Option<PlaceAnswerSources>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaceAnswerSources {
    pub review_snippets: Vec<ReviewSnippet>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ReviewSnippet {
    pub content: String,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        if content.parts.is_empty() {
            return None;
        }
        Some(
            content
                .parts
                .iter()
                .map(|p| p.text.as_str())
                .collect::<String>(),
        )
    }

    pub fn grounding(&self) -> Option<GroundingMetadata> {
        self.candidates.first()?.grounding_metadata.clone()
    }
}

fn system_instruction(now: DateTime<Local>) -> String {
    let date_string = now.format("%A, %B %e, %Y").to_string();
    let time_string = now.format("%I:%M %p").to_string();

    BASE_SYSTEM_INSTRUCTION
        .replace("{{current_date}}", &date_string)
        .replace("{{current_time}}", &time_string)
        .replace("{{weather_conditions}}", WEATHER_CONDITIONS)
        .replace("{{truck_availability}}", TRUCK_AVAILABILITY)
}

/// Build the request for one conversation turn. Pure: the caller decides
/// when to send it. History goes in as prior turns, `new_message` becomes
/// the final user turn.
pub fn build_request(
    history: &[Message],
    new_message: &str,
    location: Option<Coordinates>,
    mode: DispatchMode,
    now: DateTime<Local>,
) -> PreparedRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|msg| Content {
            role: match msg.role {
                MessageRole::User => "user".to_string(),
                MessageRole::Model => "model".to_string(),
            },
            parts: vec![Part {
                text: msg.text.clone(),
            }],
        })
        .collect();

    contents.push(Content {
        role: "user".to_string(),
        parts: vec![Part {
            text: new_message.to_string(),
        }],
    });

    let (tools, tool_config, generation_config) = match mode {
        DispatchMode::Standard => {
            let tools = vec![Tool {
                google_search: Some(EmptyToolSpec {}),
                google_maps: Some(EmptyToolSpec {}),
            }];
            // Anchor the maps/search tools to the caller's position when known
            let tool_config = location.map(|coords| ToolConfig {
                retrieval_config: RetrievalConfig {
                    lat_lng: LatLng {
                        latitude: coords.latitude,
                        longitude: coords.longitude,
                    },
                },
            });
            (Some(tools), tool_config, None)
        }
        DispatchMode::Complex => {
            let generation_config = GenerationConfig {
                thinking_config: ThinkingConfig {
                    thinking_budget: THINKING_BUDGET,
                },
            };
            (None, None, Some(generation_config))
        }
    };

    PreparedRequest {
        model: mode.model(),
        body: GenerateContentRequest {
            system_instruction: Content {
                role: String::new(),
                parts: vec![Part {
                    text: system_instruction(now),
                }],
            },
            contents,
            tools,
            tool_config,
            generation_config,
        },
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Issue one chat turn. Transport and API errors propagate unmodified;
    /// the caller decides what to show the user.
    pub async fn send_message(&self, request: PreparedRequest) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, request.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request.body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API error {}: {}", status, text));
        }

        let reply: GenerateContentResponse = response.json().await?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Message;
    use chrono::TimeZone;

    fn sample_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 14, 15, 9, 0).unwrap()
    }

    fn sample_history() -> Vec<Message> {
        vec![
            Message::model("Thank you for calling TowPro."),
            Message::user("My car broke down on I-80."),
        ]
    }

    #[test]
    fn standard_mode_selects_flash_with_tools() {
        let req = build_request(
            &sample_history(),
            "I'm near exit 12",
            Some(Coordinates {
                latitude: 40.7,
                longitude: -74.0,
            }),
            DispatchMode::Standard,
            sample_now(),
        );

        assert_eq!(req.model, "gemini-2.5-flash");

        let body = serde_json::to_value(&req.body).unwrap();
        assert!(body["tools"][0]["googleSearch"].is_object());
        assert!(body["tools"][0]["googleMaps"].is_object());
        assert_eq!(
            body["toolConfig"]["retrievalConfig"]["latLng"]["latitude"],
            40.7
        );
        assert_eq!(
            body["toolConfig"]["retrievalConfig"]["latLng"]["longitude"],
            -74.0
        );
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn standard_mode_without_location_omits_tool_config() {
        let req = build_request(
            &sample_history(),
            "hello",
            None,
            DispatchMode::Standard,
            sample_now(),
        );

        let body = serde_json::to_value(&req.body).unwrap();
        assert!(body["tools"].is_array());
        assert!(body.get("toolConfig").is_none());
    }

    #[test]
    fn complex_mode_selects_pro_with_thinking_budget() {
        let req = build_request(
            &sample_history(),
            "Plan a recovery for a semi on its side",
            Some(Coordinates {
                latitude: 40.7,
                longitude: -74.0,
            }),
            DispatchMode::Complex,
            sample_now(),
        );

        assert_eq!(req.model, "gemini-3-pro-preview");

        let body = serde_json::to_value(&req.body).unwrap();
        assert!(body.get("tools").is_none());
        assert!(body.get("toolConfig").is_none());
        assert_eq!(
            body["generationConfig"]["thinkingConfig"]["thinkingBudget"],
            32768
        );
    }

    #[test]
    fn history_converts_in_order_and_new_message_is_last_user_turn() {
        let req = build_request(
            &sample_history(),
            "A blue sedan",
            None,
            DispatchMode::Standard,
            sample_now(),
        );

        let contents = &req.body.contents;
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0].role, "model");
        assert_eq!(contents[0].parts[0].text, "Thank you for calling TowPro.");
        assert_eq!(contents[1].role, "user");
        assert_eq!(contents[2].role, "user");
        assert_eq!(contents[2].parts[0].text, "A blue sedan");
    }

    #[test]
    fn system_instruction_substitutes_all_placeholders() {
        let rendered = system_instruction(sample_now());
        assert!(!rendered.contains("{{"));
        assert!(rendered.contains("Friday, March 14, 2025"));
        assert!(rendered.contains("03:09 PM"));
        assert!(rendered.contains("Clear, 72°F"));
        assert!(rendered.contains("3 Light-Duty (15m)"));
    }

    #[test]
    fn system_instruction_covers_capability_and_self_assessment_guidance() {
        let rendered = system_instruction(sample_now());
        assert!(rendered.contains("ADVANCED CAPABILITIES"));
        assert!(rendered.contains("**FRAUD DETECTION:**"));
        assert!(rendered.contains("¿Cuál es su ubicación exacta?"));
        assert!(rendered.contains("CONTINUOUS IMPROVEMENT"));
        assert!(rendered.contains("Green flags (repeat)"));
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "Help is "}, {"text": "on the way."}]
                }
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().unwrap(), "Help is on the way.");
        assert!(response.grounding().is_none());
    }

    #[test]
    fn empty_response_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn grounding_metadata_deserializes_web_and_maps_chunks() {
        let json = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Found a shop."}]},
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://example.com", "title": "Example"}},
                        {"maps": {
                            "uri": "https://maps.google.com/?cid=1",
                            "title": "Joe's Towing",
                            "placeAnswerSources": {
                                "reviewSnippets": [{"content": "Fast and friendly"}]
                            }
                        }}
                    ],
                    "webSearchQueries": ["towing near exit 12"]
                }
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let grounding = response.grounding().unwrap();
        assert_eq!(grounding.grounding_chunks.len(), 2);
        assert_eq!(
            grounding.grounding_chunks[0].web.as_ref().unwrap().title,
            "Example"
        );
        let maps = grounding.grounding_chunks[1].maps.as_ref().unwrap();
        assert_eq!(maps.title, "Joe's Towing");
        assert_eq!(
            maps.place_answer_sources.as_ref().unwrap().review_snippets[0].content,
            "Fast and friendly"
        );
        assert_eq!(grounding.web_search_queries, vec!["towing near exit 12"]);
    }
}
