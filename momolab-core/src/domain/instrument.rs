use serde::{Deserialize, Serialize};

/// Venue-specific view of an instrument: where it trades and under what symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstrumentVariation {
    pub venue: String,
    pub symbol: String,
}

impl InstrumentVariation {
    /// Same symbol on the venue.
    pub fn identity(venue: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            venue: venue.into(),
            symbol: symbol.into(),
        }
    }
}

/// Resolved instrument: identity plus its venue variation. Immutable for the run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instrument {
    pub symbol: String,
    pub variation: InstrumentVariation,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, variation: InstrumentVariation) -> Self {
        Self {
            symbol: symbol.into(),
            variation,
        }
    }

    /// Instrument traded under its own symbol on `venue`.
    pub fn on_venue(symbol: &str, venue: &str) -> Self {
        Self::new(symbol, InstrumentVariation::identity(venue, symbol))
    }
}
