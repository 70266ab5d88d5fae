use super::record::{parse_show_date, Act, MoneyFields, ShowPayload, ShowRecord, ShowType};
use crate::amount::parse_number;
use crate::constants::MIN_EVENT_NAME_LEN;
use crate::distance::DistanceRequest;
use crate::error::{Result, ShowsError};
use serde::{Deserialize, Serialize};

/// Create/edit form state. Every field is the raw text the user typed;
/// [`ShowForm::into_payload`] is the only place it gets interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowForm {
    pub show_date: String,
    pub artist: Act,
    pub show_type: ShowType,
    pub event_name: String,
    pub venue_name: String,

    pub address_text: String,
    pub maps_place_id: String,
    pub maps_lat: String,
    pub maps_lng: String,

    pub km_distance: String,

    pub hospitality: bool,
    pub hotel_name: String,
    pub rooms_count: String,

    pub show_cost: String,
    pub advance_paid: String,
    pub viaticos_cobrados: String,

    pub closed_date: String,
    pub notes: String,
}

impl Default for ShowForm {
    fn default() -> Self {
        Self {
            show_date: String::new(),
            artist: Act::Jeyf,
            show_type: ShowType::Showcase,
            event_name: String::new(),
            venue_name: String::new(),
            address_text: String::new(),
            maps_place_id: String::new(),
            maps_lat: String::new(),
            maps_lng: String::new(),
            km_distance: String::new(),
            hospitality: false,
            hotel_name: String::new(),
            rooms_count: String::new(),
            show_cost: String::new(),
            advance_paid: String::new(),
            viaticos_cobrados: String::new(),
            closed_date: String::new(),
            notes: String::new(),
        }
    }
}

/// What the places autocomplete reports when the user picks a suggestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceSelection {
    pub formatted_address: Option<String>,
    pub place_id: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl ShowForm {
    /// Prefills the edit form from a stored show.
    pub fn from_record(record: &ShowRecord) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let num = |v: Option<f64>| v.map(|n| n.to_string()).unwrap_or_default();

        Self {
            show_date: record.show_date.map(|d| d.to_string()).unwrap_or_default(),
            artist: record.artist.unwrap_or(Act::Jeyf),
            show_type: record.show_type.unwrap_or(ShowType::Showcase),
            event_name: text(&record.event_name),
            venue_name: text(&record.venue_name),
            address_text: text(&record.address_text),
            maps_place_id: text(&record.maps_place_id),
            maps_lat: num(record.maps_lat),
            maps_lng: num(record.maps_lng),
            km_distance: num(record.km_distance),
            hospitality: record.hospitality.unwrap_or(false),
            hotel_name: text(&record.hotel_name),
            rooms_count: record.rooms_count.map(|n| n.to_string()).unwrap_or_default(),
            show_cost: num(record.show_cost),
            advance_paid: num(record.advance_paid),
            viaticos_cobrados: num(record.viaticos_cobrados),
            closed_date: record.closed_date.map(|d| d.to_string()).unwrap_or_default(),
            notes: text(&record.notes),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn validate(&self) -> Result<()> {
        if self.show_date.trim().is_empty() {
            return Err(ShowsError::Validation("show_date is required".into()));
        }
        if parse_show_date(&self.show_date).is_none() {
            return Err(ShowsError::Validation(format!(
                "show_date must be YYYY-MM-DD, got '{}'",
                self.show_date
            )));
        }
        if self.event_name.trim().chars().count() < MIN_EVENT_NAME_LEN {
            return Err(ShowsError::Validation(format!(
                "event_name needs at least {} characters",
                MIN_EVENT_NAME_LEN
            )));
        }
        Ok(())
    }

    /// Validates and converts the form into a store payload. Money columns
    /// are only included when `include_money` is set.
    pub fn into_payload(&self, include_money: bool) -> Result<ShowPayload> {
        self.validate()?;

        let show_date = parse_show_date(&self.show_date)
            .ok_or_else(|| ShowsError::Validation("show_date is invalid".into()))?;
        let closed_date = match optional_text(&self.closed_date) {
            None => None,
            Some(text) => Some(parse_show_date(&text).ok_or_else(|| {
                ShowsError::Validation(format!("closed_date must be YYYY-MM-DD, got '{}'", text))
            })?),
        };

        let money = if include_money {
            Some(MoneyFields {
                show_cost: non_negative("show_cost", &self.show_cost)?,
                advance_paid: non_negative("advance_paid", &self.advance_paid)?,
                viaticos_cobrados: non_negative("viaticos_cobrados", &self.viaticos_cobrados)?,
            })
        } else {
            None
        };

        Ok(ShowPayload {
            show_date,
            artist: self.artist,
            show_type: self.show_type,
            event_name: self.event_name.trim().to_string(),
            venue_name: optional_text(&self.venue_name),
            address_text: optional_text(&self.address_text),
            maps_place_id: optional_text(&self.maps_place_id),
            maps_lat: parse_number(&self.maps_lat),
            maps_lng: parse_number(&self.maps_lng),
            km_distance: non_negative("km_distance", &self.km_distance)?,
            hospitality: self.hospitality,
            hotel_name: optional_text(&self.hotel_name),
            rooms_count: room_count(&self.rooms_count)?,
            closed_date,
            notes: optional_text(&self.notes),
            money,
        })
    }

    /// Merges an autocomplete pick into the form. The distance is cleared
    /// because it no longer matches the destination.
    pub fn apply_place(&mut self, selection: &PlaceSelection) {
        if let Some(address) = selection.formatted_address.as_deref().filter(|a| !a.is_empty()) {
            self.address_text = address.to_string();
        }
        self.maps_place_id = selection.place_id.clone().unwrap_or_default();
        if let Some(lat) = selection.lat {
            self.maps_lat = lat.to_string();
        }
        if let Some(lng) = selection.lng {
            self.maps_lng = lng.to_string();
        }
        self.km_distance.clear();
    }

    /// Distance lookup for the form's destination: place id when there is
    /// one, otherwise the typed address.
    pub fn distance_request(&self) -> DistanceRequest {
        match optional_text(&self.maps_place_id) {
            Some(place_id) => DistanceRequest::place_id(place_id),
            None => DistanceRequest {
                destination_place_id: None,
                destination_address: optional_text(&self.address_text),
            },
        }
    }
}

fn optional_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn non_negative(field: &str, text: &str) -> Result<Option<f64>> {
    match parse_number(text) {
        Some(n) if n < 0.0 => Err(ShowsError::Validation(format!("{} cannot be negative", field))),
        other => Ok(other),
    }
}

fn room_count(text: &str) -> Result<Option<u32>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| ShowsError::Validation(format!("rooms_count must be a whole number, got '{}'", trimmed)))
}
