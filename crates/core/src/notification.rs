//! Outbound notification manifests.
//!
//! Operations never deliver mail themselves. They return the notifications a
//! transition calls for alongside their result, and the caller hands them to
//! a [`Notifier`].

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::user::UserContact;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum NotificationTemplate {
    DraftAvailable { batch_id: i64 },
    SchedulePublished { batch_id: i64 },
}

impl NotificationTemplate {
    pub fn subject(&self) -> String {
        match self {
            NotificationTemplate::DraftAvailable { .. } => "A draft schedule is available".to_string(),
            NotificationTemplate::SchedulePublished { .. } => "Your schedule has been published".to_string(),
        }
    }

    pub fn body(&self, recipient: &Recipient) -> String {
        match self {
            NotificationTemplate::DraftAvailable { batch_id } => format!(
                "Hello {},\n\nA draft schedule (batch #{}) that includes you is ready for review.\nIt may still change before it is published.\n\n- Team\n",
                recipient.display_name, batch_id
            ),
            NotificationTemplate::SchedulePublished { batch_id } => format!(
                "Hello {},\n\nYour schedule (batch #{}) has just been published.\nPlease log in to view your assigned slots.\n\n- Team\n",
                recipient.display_name, batch_id
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub recipient: Recipient,
    pub template: NotificationTemplate,
}

impl Notification {
    pub fn subject(&self) -> String {
        self.template.subject()
    }

    pub fn body(&self) -> String {
        self.template.body(&self.recipient)
    }
}

/// One notification per distinct e-mail address, in first-seen order.
/// Contacts without an address are skipped.
pub fn manifest(contacts: &[UserContact], template: NotificationTemplate) -> Vec<Notification> {
    let mut seen = HashSet::new();
    contacts
        .iter()
        .filter_map(|contact| {
            let email = contact.email.as_deref()?.trim();
            if email.is_empty() || !seen.insert(email.to_string()) {
                return None;
            }
            Some(Notification {
                recipient: Recipient {
                    email: email.to_string(),
                    display_name: contact.display_name(),
                },
                template,
            })
        })
        .collect()
}

/// A result plus the side effects its caller is expected to drain.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub side_effects: Vec<Notification>,
}

impl<T> Outcome<T> {
    pub fn new(value: T, side_effects: Vec<Notification>) -> Self {
        Self { value, side_effects }
    }

    pub fn into_parts(self) -> (T, Vec<Notification>) {
        (self.value, self.side_effects)
    }
}

/// Delivery seam. Retries and transport are the implementor's concern.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> eyre::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn contact(id: i64, email: Option<&str>, first: &str) -> UserContact {
        UserContact {
            id,
            email: email.map(String::from),
            first_name: Some(first.to_string()),
            last_name: None,
        }
    }

    #[test]
    fn test_manifest_dedupes_by_email() {
        let contacts = vec![
            contact(1, Some("ana@example.com"), "Ana"),
            contact(2, Some("bo@example.com"), "Bo"),
            contact(3, Some("ana@example.com"), "Ana again"),
            contact(4, None, "Nobody"),
            contact(5, Some("  "), "Blank"),
        ];

        let notifications = manifest(&contacts, NotificationTemplate::SchedulePublished { batch_id: 9 });

        let emails: Vec<&str> = notifications.iter().map(|n| n.recipient.email.as_str()).collect();
        assert_eq!(emails, vec!["ana@example.com", "bo@example.com"]);
        assert_eq!(notifications[0].recipient.display_name, "Ana");
    }

    #[test]
    fn test_rendering() {
        let notification = manifest(
            &[contact(1, Some("ana@example.com"), "Ana")],
            NotificationTemplate::DraftAvailable { batch_id: 3 },
        )
        .remove(0);

        assert_eq!(notification.subject(), "A draft schedule is available");
        assert!(notification.body().starts_with("Hello Ana,"));
        assert!(notification.body().contains("batch #3"));
    }
}
