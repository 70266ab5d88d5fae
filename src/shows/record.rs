use crate::amount::loose_number;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Performing act a show is booked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Act {
    #[serde(rename = "JEYF")]
    Jeyf,
    #[serde(rename = "ELGUDI")]
    Elgudi,
}

impl Act {
    pub const ALL: [Act; 2] = [Act::Jeyf, Act::Elgudi];

    pub fn code(self) -> &'static str {
        match self {
            Act::Jeyf => "JEYF",
            Act::Elgudi => "ELGUDI",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Act::Jeyf => "Jey F",
            Act::Elgudi => "El Gudi",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Act::ALL.into_iter().find(|a| a.code() == code)
    }
}

impl fmt::Display for Act {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShowType {
    Showcase,
    ShowCompleto,
}

/// A persisted show as the store returns it.
///
/// Rows are read leniently: an unknown act, an unparseable date or a
/// non-numeric amount becomes `None` instead of failing the whole list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowRecord {
    pub id: Uuid,
    pub created_at: Option<DateTime<Utc>>,

    #[serde(deserialize_with = "loose_date")]
    pub show_date: Option<NaiveDate>,
    #[serde(deserialize_with = "loose_enum")]
    pub artist: Option<Act>,
    #[serde(deserialize_with = "loose_enum")]
    pub show_type: Option<ShowType>,

    pub event_name: Option<String>,
    pub venue_name: Option<String>,

    pub address_text: Option<String>,
    pub maps_place_id: Option<String>,
    #[serde(deserialize_with = "loose_number")]
    pub maps_lat: Option<f64>,
    #[serde(deserialize_with = "loose_number")]
    pub maps_lng: Option<f64>,

    #[serde(deserialize_with = "loose_number")]
    pub km_distance: Option<f64>,

    pub hospitality: Option<bool>,
    pub hotel_name: Option<String>,
    #[serde(deserialize_with = "loose_count")]
    pub rooms_count: Option<u32>,

    #[serde(deserialize_with = "loose_date")]
    pub closed_date: Option<NaiveDate>,
    pub notes: Option<String>,

    // Only present when read from `shows`
    #[serde(deserialize_with = "loose_number")]
    pub show_cost: Option<f64>,
    #[serde(deserialize_with = "loose_number")]
    pub advance_paid: Option<f64>,
    #[serde(deserialize_with = "loose_number")]
    pub viaticos_cobrados: Option<f64>,
}

impl ShowRecord {
    pub fn strip_money(mut self) -> Self {
        self.show_cost = None;
        self.advance_paid = None;
        self.viaticos_cobrados = None;
        self
    }
}

/// Money columns of a write. Left out of the payload entirely when the
/// caller may not see money, so an edit never clears them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoneyFields {
    pub show_cost: Option<f64>,
    pub advance_paid: Option<f64>,
    pub viaticos_cobrados: Option<f64>,
}

/// Validated insert/update body for the `shows` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowPayload {
    pub show_date: NaiveDate,
    pub artist: Act,
    pub show_type: ShowType,
    pub event_name: String,
    pub venue_name: Option<String>,

    pub address_text: Option<String>,
    pub maps_place_id: Option<String>,
    pub maps_lat: Option<f64>,
    pub maps_lng: Option<f64>,

    pub km_distance: Option<f64>,

    pub hospitality: bool,
    pub hotel_name: Option<String>,
    pub rooms_count: Option<u32>,

    pub closed_date: Option<NaiveDate>,
    pub notes: Option<String>,

    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub money: Option<MoneyFields>,
}

impl ShowPayload {
    /// Overwrites the stored columns of `record` with this payload.
    pub fn apply_to(&self, record: &mut ShowRecord) {
        record.show_date = Some(self.show_date);
        record.artist = Some(self.artist);
        record.show_type = Some(self.show_type);
        record.event_name = Some(self.event_name.clone());
        record.venue_name = self.venue_name.clone();
        record.address_text = self.address_text.clone();
        record.maps_place_id = self.maps_place_id.clone();
        record.maps_lat = self.maps_lat;
        record.maps_lng = self.maps_lng;
        record.km_distance = self.km_distance;
        record.hospitality = Some(self.hospitality);
        record.hotel_name = self.hotel_name.clone();
        record.rooms_count = self.rooms_count;
        record.closed_date = self.closed_date;
        record.notes = self.notes.clone();
        if let Some(money) = &self.money {
            record.show_cost = money.show_cost;
            record.advance_paid = money.advance_paid;
            record.viaticos_cobrados = money.viaticos_cobrados;
        }
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_show_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

fn loose_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_str).and_then(parse_show_date))
}

fn loose_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(crate::amount::number_from_value)
        .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32))
}

/// Serde helper for enum fields; values outside the enum read as `None`.
pub fn loose_enum<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}
