#![deny(warnings)]

//! Year-end settlement, world events and the ECS-driven career session.

pub mod events;
pub mod session;
pub mod settlement;

pub use events::{standard_events, EventDeck, WorldEvent};
pub use session::{CareerError, CareerSession, ScheduledEvent, SessionParts};
pub use settlement::{
    resolve_promotion, settle_year, DeferredEvent, PendingState, PromotionOutcome,
    SettlementReport,
};
