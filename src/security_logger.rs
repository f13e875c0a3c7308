//! Security-focused logging module to track authentication events
//!
//! Tokens are only ever logged as a short fingerprint and credentials are
//! never logged at all.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::constants::TOKEN_FINGERPRINT_LEN;

/// Types of security events to track
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityEvent {
    // Account events
    UserRegistered { user: String },
    RegistrationRejected { user: String, reason: String },

    // Authentication events
    LoginSucceeded { user: String },
    LoginFailed { user: String, reason: String },
    TokenRejected { fingerprint: Option<String>, reason: String },

    // Authorization events
    OwnershipDenied { user: String, resource: String },
    UnauthenticatedAccess { resource: String },
}

impl SecurityEvent {
    fn key(&self) -> &'static str {
        match self {
            SecurityEvent::UserRegistered { .. } => "user_registered",
            SecurityEvent::RegistrationRejected { .. } => "registration_rejected",
            SecurityEvent::LoginSucceeded { .. } => "login_succeeded",
            SecurityEvent::LoginFailed { .. } => "login_failed",
            SecurityEvent::TokenRejected { .. } => "token_rejected",
            SecurityEvent::OwnershipDenied { .. } => "ownership_denied",
            SecurityEvent::UnauthenticatedAccess { .. } => "unauthenticated_access",
        }
    }
}

/// Security logger for tracking and alerting on security events
pub struct SecurityLogger {
    events: Arc<RwLock<Vec<SecurityEvent>>>,
    event_counts: Arc<RwLock<HashMap<&'static str, usize>>>,
    max_events: usize,
    alert_thresholds: HashMap<&'static str, usize>,
}

impl SecurityLogger {
    /// Create a new security logger
    pub fn new() -> Self {
        let mut alert_thresholds = HashMap::new();
        alert_thresholds.insert("login_failed", 5);
        alert_thresholds.insert("token_rejected", 10);
        alert_thresholds.insert("ownership_denied", 5);
        alert_thresholds.insert("unauthenticated_access", 20);

        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            event_counts: Arc::new(RwLock::new(HashMap::new())),
            max_events: 10000,
            alert_thresholds,
        }
    }

    /// Log a security event
    pub async fn log_event(&self, event: SecurityEvent) {
        let event_key = event.key();

        {
            let mut events = self.events.write().await;
            events.push(event.clone());

            // Limit memory usage
            if events.len() > self.max_events {
                let events_to_remove = events.len() - self.max_events;
                events.drain(0..events_to_remove);
            }
        }

        // Update counters and check for alerts
        {
            let mut counts = self.event_counts.write().await;
            let count = counts.entry(event_key).or_insert(0);
            *count += 1;

            if let Some(&threshold) = self.alert_thresholds.get(event_key) {
                if *count >= threshold {
                    log::error!(
                        "SECURITY ALERT: {} events of type '{}' detected, latest: {:?}",
                        count,
                        event_key,
                        event
                    );
                    *count = 0; // Reset counter after alert
                }
            }
        }

        match event {
            SecurityEvent::UserRegistered { user } => {
                log::info!("SECURITY: User registered - User: {}", user);
            }
            SecurityEvent::RegistrationRejected { user, reason } => {
                log::info!("SECURITY: Registration rejected - User: {}, Reason: {}", user, reason);
            }
            SecurityEvent::LoginSucceeded { user } => {
                log::info!("SECURITY: Login success - User: {}", user);
            }
            SecurityEvent::LoginFailed { user, reason } => {
                log::warn!("SECURITY: Login failed - User: {}, Reason: {}", user, reason);
            }
            SecurityEvent::TokenRejected { fingerprint, reason } => {
                log::warn!(
                    "SECURITY: Token rejected - Token: {:?}, Reason: {}",
                    fingerprint,
                    reason
                );
            }
            SecurityEvent::OwnershipDenied { user, resource } => {
                log::warn!("SECURITY: Ownership denied - User: {}, Resource: {}", user, resource);
            }
            SecurityEvent::UnauthenticatedAccess { resource } => {
                log::debug!("SECURITY: Unauthenticated access - Resource: {}", resource);
            }
        }
    }

    /// Most recent events, oldest first
    pub async fn recent_events(&self, limit: usize) -> Vec<SecurityEvent> {
        let events = self.events.read().await;
        let skip = events.len().saturating_sub(limit);
        events.iter().skip(skip).cloned().collect()
    }

    /// Counts since the last alert for each event type
    pub async fn event_stats(&self) -> HashMap<&'static str, usize> {
        self.event_counts.read().await.clone()
    }
}

impl Default for SecurityLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Short, non-replayable prefix of a token for log correlation
pub fn token_fingerprint(token: &str) -> String {
    let prefix: String = token.chars().take(TOKEN_FINGERPRINT_LEN).collect();
    format!("{}…", prefix)
}
