//! Best-effort ad-tracking events.
//!
//! Handlers build an [`AnalyticsEvent`] and hand it to the
//! [`AnalyticsDispatcher`], which queues it without waiting. A background
//! worker POSTs queued events to the tracking endpoint. A full queue drops
//! the event; a failed POST is logged and dropped. Nothing is retried and
//! no failure reaches the buyer.

mod client;
mod dispatcher;
mod event;

pub use client::{AnalyticsError, TrackingClient};
pub use dispatcher::{AnalyticsDispatcher, DispatchOutcome};
pub use event::{AnalyticsEvent, ClickAttribution, EventContext, EventName, WEB_SOURCE};
