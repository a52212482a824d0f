//! Terminal notification center: "delivers" alerts by printing them.

use super::types::{AuthorizationStatus, NotificationCategory, NotificationCenter, NotificationRequest};
use crate::error::Result;
use colored::Colorize;

/// Always authorized; prints each scheduled notification to stderr.
#[derive(Debug, Default)]
pub struct ConsoleNotificationCenter {
    categories: Vec<NotificationCategory>,
    delivered: usize,
}

impl ConsoleNotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }
}

impl NotificationCenter for ConsoleNotificationCenter {
    fn set_categories(&mut self, categories: Vec<NotificationCategory>) {
        self.categories = categories;
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        AuthorizationStatus::Authorized
    }

    fn request_authorization(&mut self) -> Result<bool> {
        Ok(true)
    }

    fn schedule(&mut self, request: NotificationRequest) -> Result<()> {
        let actions: Vec<&str> = self
            .categories
            .iter()
            .find(|c| c.identifier == request.category)
            .map(|c| c.actions.iter().map(|a| a.title.as_str()).collect())
            .unwrap_or_default();

        eprintln!(
            "  {} {} {}",
            "\u{1F514}".bold(),
            request.title.bold().yellow(),
            request.body
        );
        if !actions.is_empty() {
            eprintln!("     [{}]", actions.join("] ["));
        }
        self.delivered += 1;
        Ok(())
    }
}
