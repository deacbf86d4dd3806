//! Search-box state machine: debounced geocode suggestions, keyboard
//! navigation and selection commit.
//!
//! Timers run as spawned tokio tasks and report back through a channel; all
//! state changes happen on the owner's task via [`SearchBox::apply`] (or the
//! [`SearchBox::settle`] helper), so no locking is needed.

use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    error::WeatherError,
    model::{GeoSuggestion, WeatherQuery},
    provider::Geocoder,
};

pub const DEBOUNCE: Duration = Duration::from_millis(300);
pub const BLUR_GRACE: Duration = Duration::from_millis(150);
pub const SUGGESTION_LIMIT: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Typing,
    SuggestionsVisible,
    Selected,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Enter,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// Dropdown hidden or empty; nothing happened.
    Ignored,
    Highlighted(usize),
    Selected(GeoSuggestion),
    /// Enter without a highlight submits the form. `None` when the text is blank.
    Submit(Option<WeatherQuery>),
}

/// Completion of a background timer.
#[derive(Debug)]
pub enum SearchEvent {
    Suggestions {
        seq: u64,
        result: Result<Vec<GeoSuggestion>, WeatherError>,
    },
    BlurElapsed {
        generation: u64,
    },
}

pub struct SearchBox {
    geocoder: Arc<dyn Geocoder>,
    debounce: Duration,
    blur_grace: Duration,

    text: String,
    suggestions: Vec<GeoSuggestion>,
    dropdown_open: bool,
    highlight: Option<usize>,
    selection: Option<GeoSuggestion>,
    phase: SearchPhase,

    latest_seq: u64,
    blur_generation: u64,
    pending_lookup: Option<JoinHandle<()>>,
    pending_close: Option<JoinHandle<()>>,

    events_tx: mpsc::UnboundedSender<SearchEvent>,
    events_rx: mpsc::UnboundedReceiver<SearchEvent>,
}

impl std::fmt::Debug for SearchBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchBox")
            .field("text", &self.text)
            .field("phase", &self.phase)
            .field("suggestions", &self.suggestions.len())
            .field("highlight", &self.highlight)
            .field("latest_seq", &self.latest_seq)
            .finish()
    }
}

impl SearchBox {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self::with_timings(geocoder, DEBOUNCE, BLUR_GRACE)
    }

    pub fn with_timings(geocoder: Arc<dyn Geocoder>, debounce: Duration, blur_grace: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            geocoder,
            debounce,
            blur_grace,
            text: String::new(),
            suggestions: Vec::new(),
            dropdown_open: false,
            highlight: None,
            selection: None,
            phase: SearchPhase::Idle,
            latest_seq: 0,
            blur_generation: 0,
            pending_lookup: None,
            pending_close: None,
            events_tx,
            events_rx,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn suggestions(&self) -> &[GeoSuggestion] {
        &self.suggestions
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    /// The committed suggestion, as long as the text still reads as its label.
    pub fn selection(&self) -> Option<&GeoSuggestion> {
        self.selection.as_ref().filter(|s| s.label() == self.text)
    }

    pub fn dropdown_visible(&self) -> bool {
        self.dropdown_open && !self.suggestions.is_empty()
    }

    /// Text edited: reschedule the lookup. A selection whose label no
    /// longer matches the text stops counting (see [`Self::selection`]).
    pub fn on_text_change(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.dropdown_open = true;
        self.highlight = None;
        self.phase = SearchPhase::Typing;

        let seq = self.bump_seq();

        let query = self.text.trim().to_string();
        if query.is_empty() {
            self.suggestions.clear();
            return;
        }

        let geocoder = Arc::clone(&self.geocoder);
        let tx = self.events_tx.clone();
        let delay = self.debounce;
        self.pending_lookup = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(seq, query = %query, "geocode lookup");
            let result = geocoder.search(&query, SUGGESTION_LIMIT).await;
            let _ = tx.send(SearchEvent::Suggestions { seq, result });
        }));
    }

    pub fn on_focus(&mut self) {
        self.blur_generation += 1;
        abort(&mut self.pending_close);
        self.dropdown_open = true;
        if self.phase == SearchPhase::Idle && !self.suggestions.is_empty() {
            self.phase = SearchPhase::SuggestionsVisible;
        }
    }

    /// Close the dropdown after the grace delay, so a click in flight still lands.
    pub fn on_blur(&mut self) {
        self.blur_generation += 1;
        let generation = self.blur_generation;

        abort(&mut self.pending_close);
        let tx = self.events_tx.clone();
        let delay = self.blur_grace;
        self.pending_close = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(SearchEvent::BlurElapsed { generation });
        }));
    }

    pub fn on_key(&mut self, key: NavKey) -> KeyOutcome {
        let visible = self.dropdown_visible();
        let n = self.suggestions.len();

        match key {
            NavKey::Down if visible => {
                let next = self.highlight.map_or(0, |i| (i + 1) % n);
                self.highlight = Some(next);
                KeyOutcome::Highlighted(next)
            }
            NavKey::Up if visible => {
                let next = self.highlight.map_or(n - 1, |i| (i + n - 1) % n);
                self.highlight = Some(next);
                KeyOutcome::Highlighted(next)
            }
            NavKey::Enter => match self.highlight.filter(|_| visible) {
                Some(i) => self.select(i).map_or(KeyOutcome::Ignored, KeyOutcome::Selected),
                None => KeyOutcome::Submit(self.submit()),
            },
            _ => KeyOutcome::Ignored,
        }
    }

    /// Commit the suggestion at `index`, as a mouse click would.
    pub fn select(&mut self, index: usize) -> Option<GeoSuggestion> {
        let chosen = self.suggestions.get(index)?.clone();

        // A lookup still pending would reopen the dropdown.
        self.bump_seq();
        self.text = chosen.label();
        self.selection = Some(chosen.clone());
        self.suggestions.clear();
        self.highlight = None;
        self.dropdown_open = false;
        self.phase = SearchPhase::Selected;

        Some(chosen)
    }

    /// Query by the selected coordinates, else by the trimmed text. Blank text yields `None`.
    pub fn submit(&mut self) -> Option<WeatherQuery> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let query = match self.selection() {
            Some(s) => WeatherQuery::Coordinates { lat: s.lat, lon: s.lon },
            None => WeatherQuery::City(trimmed.to_string()),
        };

        self.dropdown_open = false;
        self.phase = SearchPhase::Submitted;
        Some(query)
    }

    /// Apply a timer completion. Returns false when the event was stale.
    pub fn apply(&mut self, event: SearchEvent) -> bool {
        match event {
            SearchEvent::Suggestions { seq, result } => {
                if seq != self.latest_seq {
                    debug!(seq, latest = self.latest_seq, "discarding stale suggestions");
                    return false;
                }
                self.pending_lookup = None;
                self.highlight = None;

                match result {
                    Ok(found) => self.suggestions = found,
                    Err(err) => {
                        warn!(error = %err, "geocode lookup failed");
                        self.suggestions.clear();
                    }
                }

                if self.phase == SearchPhase::Typing && self.dropdown_visible() {
                    self.phase = SearchPhase::SuggestionsVisible;
                } else if self.phase == SearchPhase::SuggestionsVisible && self.suggestions.is_empty() {
                    self.phase = SearchPhase::Typing;
                }
                true
            }
            SearchEvent::BlurElapsed { generation } => {
                if generation != self.blur_generation {
                    return false;
                }
                self.pending_close = None;
                self.dropdown_open = false;
                self.highlight = None;
                self.phase = SearchPhase::Idle;
                true
            }
        }
    }

    /// Wait for the next timer completion and apply it.
    pub async fn settle(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => self.apply(event),
            // We hold a sender ourselves, so the channel never closes.
            None => false,
        }
    }

    fn bump_seq(&mut self) -> u64 {
        abort(&mut self.pending_lookup);
        self.latest_seq += 1;
        self.latest_seq
    }
}

impl Drop for SearchBox {
    fn drop(&mut self) {
        abort(&mut self.pending_lookup);
        abort(&mut self.pending_close);
    }
}

fn abort(handle: &mut Option<JoinHandle<()>>) {
    if let Some(h) = handle.take() {
        h.abort();
    }
}
