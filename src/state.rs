use crate::config::Config;
use crate::moderation::ModerationWorkflow;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<ModerationWorkflow>,
    pub config: Arc<Config>,
}
