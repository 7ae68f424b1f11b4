pub mod feed_controller;
pub mod overlay_controller;

pub use feed_controller::{FeedController, FeedFilter, FeedPhase, FeedState, PageRequest};
pub use overlay_controller::{DetailOverlayController, OpenTicket, OverlayPhase, OverlayState};
