//! Domain types for the momentum-rotation engine.

pub mod bar;
pub mod fill;
pub mod instrument;
pub mod intent;
pub mod position;
pub mod trade;

pub use bar::Bar;
pub use fill::Fill;
pub use instrument::{Instrument, InstrumentVariation};
pub use intent::{IntentDirection, IntentReason, OrderIntent};
pub use position::{Sign, SignError};
pub use trade::Trade;
