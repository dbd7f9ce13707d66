pub mod controller;
pub mod synth;
pub mod task;
pub mod trip;
pub mod viewer;

pub use controller::{LoadOutcome, PlaybackController, Step, PLAYBACK_STEP};
pub use task::TaskHandle;
pub use trip::TripDraft;
pub use viewer::{ViewState, Viewer, ViewerSettings};
