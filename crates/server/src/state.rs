use std::sync::Arc;

use tokio::sync::watch;
use wastewatch_pipeline::Pipeline;

pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    /// Flips to `true` on shutdown; running batches stop starting sends.
    pub shutdown: watch::Receiver<bool>,
}
