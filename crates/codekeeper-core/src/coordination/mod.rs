//! Coordination of agents responding to the same change event

pub mod fanout;

pub use fanout::{FanOutCoordinator, FanOutRound, link_co_responders};
