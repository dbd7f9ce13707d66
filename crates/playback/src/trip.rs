use model::place::{Coordinate, Endpoint, Place};
use serde::Serialize;

pub const PICK_INSTRUCTION: &str = "Select \"Pick\" then click on map.";
pub const READY_INSTRUCTION: &str = "Ready to Create Trip!";
pub const NOT_FOUND_INSTRUCTION: &str = "Location not found. Try again.";
pub const SEARCH_ERROR_INSTRUCTION: &str = "Search Error.";

/// State of the manual trip dashboard. Closing it forgets everything.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDraft {
    pub open: bool,
    pub picking: Option<Endpoint>,
    pub start: Option<Place>,
    pub end: Option<Place>,
    pub start_input: String,
    pub end_input: String,
    pub instruction: String,
}

impl Default for TripDraft {
    fn default() -> Self {
        Self {
            open: false,
            picking: None,
            start: None,
            end: None,
            start_input: String::new(),
            end_input: String::new(),
            instruction: PICK_INSTRUCTION.to_owned(),
        }
    }
}

impl TripDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        *self = Self {
            open: true,
            ..Self::default()
        };
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn place(&self, endpoint: Endpoint) -> Option<&Place> {
        match endpoint {
            Endpoint::Start => self.start.as_ref(),
            Endpoint::End => self.end.as_ref(),
        }
    }

    /// Both endpoints, once set.
    pub fn endpoints(&self) -> Option<(Coordinate, Coordinate)> {
        Some((self.start.as_ref()?.coordinate, self.end.as_ref()?.coordinate))
    }

    pub fn is_ready(&self) -> bool {
        self.endpoints().is_some()
    }

    /// Arms the next map click for `endpoint`.
    pub fn pick(&mut self, endpoint: Endpoint) -> bool {
        if !self.open {
            return false;
        }
        self.picking = Some(endpoint);
        self.instruction = format!("Click on Map to set {} Point", endpoint.label());
        true
    }

    /// Applies a map click. Returns the endpoint that was set, if the click
    /// was expected.
    pub fn click(&mut self, coordinate: Coordinate) -> Option<Endpoint> {
        if !self.open {
            return None;
        }
        let endpoint = self.picking.take()?;
        self.set(endpoint, Place::picked(coordinate));
        if self.is_ready() {
            self.instruction = READY_INSTRUCTION.to_owned();
        }
        Some(endpoint)
    }

    pub fn searching(&mut self, endpoint: Endpoint, query: &str) {
        *self.input_mut(endpoint) = query.to_owned();
        self.instruction = format!("Searching for \"{}\"...", query);
    }

    pub fn found(&mut self, endpoint: Endpoint, place: Place) {
        self.instruction = format!("Found: {}", place.name);
        self.set(endpoint, place);
    }

    pub fn not_found(&mut self) {
        self.instruction = NOT_FOUND_INSTRUCTION.to_owned();
    }

    pub fn search_failed(&mut self) {
        self.instruction = SEARCH_ERROR_INSTRUCTION.to_owned();
    }

    fn set(&mut self, endpoint: Endpoint, place: Place) {
        *self.input_mut(endpoint) = place.name.clone();
        match endpoint {
            Endpoint::Start => self.start = Some(place),
            Endpoint::End => self.end = Some(place),
        }
    }

    fn input_mut(&mut self, endpoint: Endpoint) -> &mut String {
        match endpoint {
            Endpoint::Start => &mut self.start_input,
            Endpoint::End => &mut self.end_input,
        }
    }
}
