use super::record::{Act, ShowRecord};
use crate::amount::amount_or_zero;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ArtistTab {
    #[default]
    All,
    Jeyf,
    Elgudi,
}

impl ArtistTab {
    pub fn act(self) -> Option<Act> {
        match self {
            ArtistTab::All => None,
            ArtistTab::Jeyf => Some(Act::Jeyf),
            ArtistTab::Elgudi => Some(Act::Elgudi),
        }
    }
}

/// List filters: act tab, free-text search and a `YYYY-MM` month.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShowFilter {
    pub artist: ArtistTab,
    pub q: String,
    pub month: String,
}

impl ShowFilter {
    pub fn matches(&self, record: &ShowRecord) -> bool {
        let artist_ok = match self.artist.act() {
            None => true,
            Some(act) => record.artist == Some(act),
        };

        let needle = self.q.trim().to_lowercase();
        let text_ok = needle.is_empty()
            || [&record.event_name, &record.venue_name, &record.address_text]
                .iter()
                .any(|field| {
                    field
                        .as_deref()
                        .map_or(false, |v| v.to_lowercase().contains(&needle))
                });

        let month = self.month.trim();
        let month_ok = month.is_empty()
            || record
                .show_date
                .map_or(false, |d| d.format("%Y-%m-%d").to_string().starts_with(month));

        artist_ok && text_ok && month_ok
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoneyTotals {
    pub show_cost: f64,
    pub advance: f64,
    pub viaticos: f64,
}

impl MoneyTotals {
    pub fn over<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ShowRecord>,
    {
        records.into_iter().fold(MoneyTotals::default(), |acc, r| MoneyTotals {
            show_cost: acc.show_cost + amount_or_zero(r.show_cost),
            advance: acc.advance + amount_or_zero(r.advance_paid),
            viaticos: acc.viaticos + amount_or_zero(r.viaticos_cobrados),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowListing {
    pub count: usize,
    pub shows: Vec<ShowRecord>,
    /// Only for roles allowed to see money.
    pub totals: Option<MoneyTotals>,
}

impl ShowListing {
    pub fn build(records: Vec<ShowRecord>, filter: &ShowFilter, include_money: bool) -> Self {
        let shows: Vec<ShowRecord> = records.into_iter().filter(|r| filter.matches(r)).collect();
        let totals = include_money.then(|| MoneyTotals::over(&shows));
        Self { count: shows.len(), shows, totals }
    }
}
