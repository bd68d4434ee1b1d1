//! Address search with autocomplete.
//!
//! The box never talks to the network itself: typing produces an
//! [`AutocompleteRequest`], choosing a suggestion produces a
//! [`GeocodeRequest`], and the shell feeds the completions back in.

use crate::core::config::SearchBias;
use crate::core::geo::LatLng;
use crate::services::{AutocompleteRequest, GeocodeRequest, ServiceResult, Suggestion};

/// State of the last suggestion refresh
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SuggestionStatus {
    #[default]
    Idle,
    Ok,
    ZeroResults,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SearchBox {
    query: String,
    ready: bool,
    status: SuggestionStatus,
    suggestions: Vec<Suggestion>,
    bias: SearchBias,
    last_failure: Option<String>,
}

impl SearchBox {
    pub fn new(bias: SearchBias) -> Self {
        Self {
            query: String::new(),
            ready: false,
            status: SuggestionStatus::Idle,
            suggestions: Vec::new(),
            bias,
            last_failure: None,
        }
    }

    /// Flips once the places library is available
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn status(&self) -> &SuggestionStatus {
        &self.status
    }

    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Suggestions worth showing: only those from a successful refresh
    pub fn visible_suggestions(&self) -> &[Suggestion] {
        match self.status {
            SuggestionStatus::Ok => &self.suggestions,
            _ => &[],
        }
    }

    pub fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.status = SuggestionStatus::Idle;
    }

    /// Records new input and returns the refresh to run, if any
    pub fn on_query_change(&mut self, text: impl Into<String>) -> Option<AutocompleteRequest> {
        if !self.ready {
            return None;
        }
        self.query = text.into();
        if self.query.trim().is_empty() {
            self.clear_suggestions();
            return None;
        }
        Some(AutocompleteRequest {
            input: self.query.clone(),
            bias: self.bias.clone(),
        })
    }

    /// Replaces the suggestion list wholesale. Whichever response arrives
    /// last wins, even if it answers an older query.
    pub fn apply_suggestions(&mut self, query: &str, result: ServiceResult<Vec<Suggestion>>) {
        match result {
            Ok(list) if list.is_empty() => {
                self.suggestions.clear();
                self.status = SuggestionStatus::ZeroResults;
            }
            Ok(list) => {
                self.suggestions = list;
                self.status = SuggestionStatus::Ok;
            }
            Err(e) => {
                log::warn!("autocomplete for {query:?} failed: {e}");
                self.suggestions.clear();
                self.status = SuggestionStatus::Failed(e.to_string());
            }
        }
    }

    /// Takes the chosen description as the query and asks for its location
    pub fn on_select(&mut self, description: impl Into<String>) -> GeocodeRequest {
        self.query = description.into();
        self.clear_suggestions();
        self.last_failure = None;
        GeocodeRequest {
            address: self.query.clone(),
        }
    }

    /// Consumes the geocode outcome; `Some` means the camera should move there.
    pub fn finish_resolve(&mut self, address: &str, result: ServiceResult<LatLng>) -> Option<LatLng> {
        match result {
            Ok(position) => Some(position),
            Err(e) => {
                log::warn!("could not resolve {address:?}: {e}");
                self.last_failure = Some(format!("No location found for \"{address}\""));
                None
            }
        }
    }
}

/// What the user did with the box this frame
#[derive(Debug, Clone, PartialEq)]
pub enum SearchAction {
    Edited(String),
    Picked(String),
}

#[cfg(feature = "egui")]
impl SearchBox {
    /// Draws the input, the suggestion list and the failure hint
    pub fn show(&self, ui: &mut egui::Ui) -> Option<SearchAction> {
        let mut text = self.query.clone();
        let input = ui.add_enabled(
            self.ready,
            egui::TextEdit::singleline(&mut text)
                .hint_text("Enter an address")
                .desired_width(320.0),
        );
        let mut action = input.changed().then_some(SearchAction::Edited(text));

        for suggestion in self.visible_suggestions() {
            if ui.selectable_label(false, &suggestion.description).clicked() {
                action = Some(SearchAction::Picked(suggestion.description.clone()));
            }
        }

        if let Some(hint) = &self.last_failure {
            ui.label(egui::RichText::new(hint).small().weak());
        }
        action
    }
}
