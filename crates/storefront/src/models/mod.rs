//! Session-held visitor state.

pub mod session;

pub use session::{IncentiveState, LandingPage, keys};
