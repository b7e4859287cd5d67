use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use chrono::{DateTime, Local};
use tokio::task::JoinHandle;

use crate::gemini::{GeminiClient, GenerateContentResponse, GroundingMetadata};

pub const GREETING: &str =
    "Thank you for calling TowPro. I'm here to help. What's your emergency?";

/// Shown when the API resolves but carries no usable text.
pub const EMPTY_REPLY_FALLBACK: &str =
    "I'm having trouble connecting to dispatch. Please call 911 if this is an emergency.";

/// Shown when the API call fails outright.
pub const CONNECTION_LOST_FALLBACK: &str = "System Error: Connection lost. Please call our \
     emergency line directly at 1-800-TOW-HELP or 911 for immediate safety concerns.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Standard,
    Complex,
}

impl DispatchMode {
    pub fn model(&self) -> &'static str {
        match self {
            DispatchMode::Standard => "gemini-2.5-flash",
            DispatchMode::Complex => "gemini-3-pro-preview",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            DispatchMode::Standard => DispatchMode::Complex,
            DispatchMode::Complex => DispatchMode::Standard,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DispatchMode::Standard => "Standard Dispatch",
            DispatchMode::Complex => "Complex Analysis",
        }
    }

    pub fn tagline(&self) -> &'static str {
        match self {
            DispatchMode::Standard => "Gemini 2.5 Flash + Maps",
            DispatchMode::Complex => "Gemini 3 Pro + Thinking",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DispatchMode::Standard => {
                "Standard Model (Gemini 2.5 Flash) enabled. Uses Google Maps & Search \
                 for location verification."
            }
            DispatchMode::Complex => {
                "Thinking Model (Gemini 3 Pro) enabled. Best for complex extraction \
                 planning, logistics, and difficult reasoning."
            }
        }
    }

    pub fn loading_caption(&self) -> &'static str {
        match self {
            DispatchMode::Standard => "Contacting driver",
            DispatchMode::Complex => "Analyzing situation (Thinking)",
        }
    }

    /// Synthetic transcript line appended when the user switches *to* this mode.
    pub fn switch_announcement(&self) -> &'static str {
        match self {
            DispatchMode::Standard => {
                "Switching to **Standard Dispatch** (Gemini 2.5 Flash). I am now connected \
                 to **Google Maps** and **Search** for real-time location data."
            }
            DispatchMode::Complex => {
                "Switching to **Complex Analysis** (Gemini 3 Pro + Thinking). I will use \
                 advanced reasoning to handle complex recovery scenarios and logistics."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationStatus {
    Idle,
    Requesting,
    Granted,
    Denied,
}

impl LocationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LocationStatus::Granted => "Active",
            LocationStatus::Requesting => "Locating...",
            LocationStatus::Idle | LocationStatus::Denied => "Disabled",
        }
    }
}

static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

/// One transcript entry. Never mutated once appended.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: u64,
    pub role: MessageRole,
    pub text: String,
    pub timestamp: DateTime<Local>,
    pub is_thinking: bool,
    pub grounding: Option<GroundingMetadata>,
}

impl Message {
    fn new(role: MessageRole, text: &str) -> Self {
        Self {
            id: NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed),
            role,
            text: text.to_string(),
            timestamp: Local::now(),
            is_thinking: false,
            grounding: None,
        }
    }

    pub fn user(text: &str) -> Self {
        Self::new(MessageRole::User, text)
    }

    pub fn model(text: &str) -> Self {
        Self::new(MessageRole::Model, text)
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub messages: Vec<Message>,
    pub input: String,
    pub input_cursor: usize, // char index into input
    pub loading: bool,
    pub mode: DispatchMode,

    // Location, captured once at startup
    pub location: Option<Coordinates>,
    pub location_status: LocationStatus,

    // Transcript scroll state (chat area dimensions updated during render)
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,
    pub total_chat_lines: u16,

    // Animation state (0-2 for ellipsis)
    pub animation_frame: u8,

    // In-flight work, polled from the main loop
    pub send_task: Option<JoinHandle<Result<GenerateContentResponse>>>,
    pub location_task: Option<JoinHandle<Result<Coordinates>>>,
    // Mode the in-flight request was built with
    in_flight_mode: Option<DispatchMode>,

    pub client: GeminiClient,
}

impl App {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            should_quit: false,
            messages: vec![Message::model(GREETING)],
            input: String::new(),
            input_cursor: 0,
            loading: false,
            mode: DispatchMode::Standard,

            location: None,
            location_status: LocationStatus::Idle,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            total_chat_lines: 0,

            animation_frame: 0,

            send_task: None,
            location_task: None,
            in_flight_mode: None,

            client,
        }
    }

    /// Take the pending input and turn it into an outgoing request.
    ///
    /// Appends exactly one user message and flips the loading flag; returns
    /// the prepared request for the event handler to spawn the API call with.
    /// Empty/whitespace input or an in-flight request is a no-op (`None`).
    pub fn submit(&mut self) -> Option<crate::gemini::PreparedRequest> {
        if self.input.trim().is_empty() || self.loading {
            return None;
        }

        let text = self.input.clone();
        // History snapshot excludes the message being sent; it rides along
        // as the new user turn instead.
        let request = crate::gemini::build_request(
            &self.messages,
            &text,
            self.location,
            self.mode,
            Local::now(),
        );

        self.messages.push(Message::user(&text));
        self.input.clear();
        self.input_cursor = 0;
        self.loading = true;
        self.in_flight_mode = Some(self.mode);
        self.scroll_to_bottom();

        Some(request)
    }

    /// Resolve the in-flight request with exactly one model message.
    pub fn complete_request(&mut self, result: Result<GenerateContentResponse>) {
        let was_complex = self.in_flight_mode.take() == Some(DispatchMode::Complex);

        match result {
            Ok(response) => {
                let text = response
                    .text()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string());
                let mut reply = Message::model(&text);
                reply.is_thinking = was_complex;
                reply.grounding = response.grounding();
                self.messages.push(reply);
            }
            Err(err) => {
                tracing::error!("dispatch request failed: {err:#}");
                self.messages.push(Message::model(CONNECTION_LOST_FALLBACK));
            }
        }

        self.loading = false;
        self.scroll_to_bottom();
    }

    /// Flip the dispatch mode and announce the switch in the transcript.
    /// No API round-trip; the new mode applies to the next request.
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.messages.push(Message::model(self.mode.switch_announcement()));
        self.scroll_to_bottom();
    }

    pub fn location_granted(&mut self, coords: Coordinates) {
        self.location = Some(coords);
        self.location_status = LocationStatus::Granted;
        tracing::info!(
            latitude = coords.latitude,
            longitude = coords.longitude,
            "location acquired"
        );
    }

    /// Silent downgrade: status only, no transcript entry.
    pub fn location_denied(&mut self) {
        self.location_status = LocationStatus::Denied;
    }

    // Transcript scrolling
    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let max_scroll = self.total_chat_lines.saturating_sub(self.chat_height);
        self.chat_scroll = self.chat_scroll.saturating_add(1).min(max_scroll);
    }

    pub fn scroll_half_page_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(self.chat_height / 2);
    }

    pub fn scroll_half_page_down(&mut self) {
        let max_scroll = self.total_chat_lines.saturating_sub(self.chat_height);
        self.chat_scroll = (self.chat_scroll + self.chat_height / 2).min(max_scroll);
    }

    /// Estimate the transcript height and pin the viewport to the newest
    /// entry. An estimate is enough: the next render recomputes exact totals.
    pub fn scroll_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            60
        };

        let mut total_lines: u16 = 0;
        for msg in &self.messages {
            total_lines += 1; // role line
            for line in msg.text.lines() {
                let char_count = line.chars().count();
                total_lines += (char_count / wrap_width + 1) as u16;
            }
            if let Some(grounding) = &msg.grounding {
                for chunk in &grounding.grounding_chunks {
                    if chunk.web.is_some() {
                        total_lines += 1;
                    } else if let Some(maps) = &chunk.maps {
                        total_lines += 1;
                        let has_snippet = maps
                            .place_answer_sources
                            .as_ref()
                            .is_some_and(|s| !s.review_snippets.is_empty());
                        if has_snippet {
                            total_lines += 1;
                        }
                    }
                }
            }
            total_lines += 2; // timestamp + blank separator
        }
        if self.loading {
            total_lines += 2; // role line + spinner caption
        }

        let visible = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.chat_scroll = total_lines.saturating_sub(visible);
    }

    /// Advance the ellipsis animation while a request is in flight.
    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::{DEFAULT_BASE_URL, GeminiClient, GenerateContentResponse};
    use anyhow::anyhow;

    fn test_app() -> App {
        App::new(GeminiClient::new("test-key", DEFAULT_BASE_URL))
    }

    fn response_with_text(text: &str) -> GenerateContentResponse {
        serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]}
            }]
        }))
        .unwrap()
    }

    #[test]
    fn starts_with_greeting() {
        let app = test_app();
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].role, MessageRole::Model);
        assert_eq!(app.messages[0].text, GREETING);
    }

    #[test]
    fn submit_appends_one_user_message_and_sets_loading() {
        let mut app = test_app();
        app.input = "Flat tire on I-80".to_string();

        let request = app.submit().expect("non-empty input should submit");

        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.messages[1].role, MessageRole::User);
        assert_eq!(app.messages[1].text, "Flat tire on I-80");
        assert!(app.input.is_empty());
        assert!(app.loading);
        // History excludes the just-appended user turn; the new text is the
        // final content entry instead.
        assert_eq!(request.body.contents.len(), 2);
        assert_eq!(
            request.body.contents.last().unwrap().parts[0].text,
            "Flat tire on I-80"
        );
    }

    #[test]
    fn submit_empty_or_whitespace_is_noop() {
        let mut app = test_app();

        assert!(app.submit().is_none());

        app.input = "   \n\t ".to_string();
        assert!(app.submit().is_none());
        assert_eq!(app.messages.len(), 1);
        assert!(!app.loading);
    }

    #[test]
    fn submit_while_loading_is_noop() {
        let mut app = test_app();
        app.input = "first".to_string();
        assert!(app.submit().is_some());

        app.input = "second".to_string();
        assert!(app.submit().is_none());
        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.input, "second");
    }

    #[test]
    fn complete_request_appends_exactly_one_model_message() {
        let mut app = test_app();
        app.input = "help".to_string();
        app.submit().unwrap();

        app.complete_request(Ok(response_with_text("A truck is on the way.")));

        assert_eq!(app.messages.len(), 3);
        let reply = app.messages.last().unwrap();
        assert_eq!(reply.role, MessageRole::Model);
        assert_eq!(reply.text, "A truck is on the way.");
        assert!(!reply.is_thinking);
        assert!(!app.loading);
    }

    #[test]
    fn empty_reply_substitutes_fallback_text() {
        let mut app = test_app();
        app.input = "help".to_string();
        app.submit().unwrap();

        app.complete_request(Ok(GenerateContentResponse::default()));

        assert_eq!(app.messages.last().unwrap().text, EMPTY_REPLY_FALLBACK);
        assert!(!app.loading);
    }

    #[test]
    fn api_error_appends_connection_lost_fallback_verbatim() {
        let mut app = test_app();
        app.input = "help".to_string();
        app.submit().unwrap();

        app.complete_request(Err(anyhow!("503 Service Unavailable")));

        assert_eq!(app.messages.len(), 3);
        assert_eq!(app.messages.last().unwrap().text, CONNECTION_LOST_FALLBACK);
        assert!(!app.loading);
    }

    #[test]
    fn complex_mode_reply_carries_thinking_badge() {
        let mut app = test_app();
        app.toggle_mode(); // Standard -> Complex, appends announcement
        app.input = "winch a semi out of a ditch".to_string();
        app.submit().unwrap();

        app.complete_request(Ok(response_with_text("Here is the recovery plan.")));

        assert!(app.messages.last().unwrap().is_thinking);
    }

    #[test]
    fn toggle_mode_appends_one_announcement_and_switches_model() {
        let mut app = test_app();
        assert_eq!(app.mode, DispatchMode::Standard);

        app.toggle_mode();

        assert_eq!(app.mode, DispatchMode::Complex);
        assert_eq!(app.messages.len(), 2);
        assert_eq!(
            app.messages.last().unwrap().text,
            DispatchMode::Complex.switch_announcement()
        );

        // The new mode drives the next request's configuration
        app.input = "hello".to_string();
        let request = app.submit().unwrap();
        assert_eq!(request.model, "gemini-3-pro-preview");

        app.complete_request(Ok(response_with_text("ok")));
        app.toggle_mode();
        assert_eq!(app.mode, DispatchMode::Standard);
        app.input = "hello again".to_string();
        let request = app.submit().unwrap();
        assert_eq!(request.model, "gemini-2.5-flash");
    }

    #[test]
    fn location_callbacks_update_status_once() {
        let mut app = test_app();
        app.location_status = LocationStatus::Requesting;

        app.location_granted(Coordinates {
            latitude: 37.77,
            longitude: -122.42,
        });
        assert_eq!(app.location_status, LocationStatus::Granted);
        assert_eq!(
            app.location,
            Some(Coordinates {
                latitude: 37.77,
                longitude: -122.42
            })
        );

        let mut denied = test_app();
        denied.location_status = LocationStatus::Requesting;
        denied.location_denied();
        assert_eq!(denied.location_status, LocationStatus::Denied);
        assert!(denied.location.is_none());
        // No transcript entry either way
        assert_eq!(denied.messages.len(), 1);
    }

    #[test]
    fn tick_animation_only_advances_while_loading() {
        let mut app = test_app();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);

        app.input = "help".to_string();
        app.submit().unwrap();
        app.tick_animation();
        app.tick_animation();
        assert_eq!(app.animation_frame, 2);
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);
    }
}
