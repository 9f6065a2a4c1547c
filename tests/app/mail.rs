use std::sync::Arc;

use crate::config::Settings;

#[wiregen::singleton(realm = crate::AppModule, factory = SmtpMailer::create)]
pub struct SmtpMailer {
    pub sender: String,
    pub retries: u32,
}

impl SmtpMailer {
    pub fn create(settings: Arc<Settings>, retries: u32) -> Self {
        Self {
            sender: settings.sender.clone(),
            retries,
        }
    }
}
