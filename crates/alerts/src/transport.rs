use std::sync::Mutex;

use crate::message::AlertMessage;

/// Outbound delivery of alert messages (SMTP, an email API, a chat hook).
///
/// Errors are opaque to the core: they are logged by the caller and never
/// affect stock.
pub trait AlertTransport: Send + Sync + 'static {
    fn send(&self, recipients: &[String], message: &AlertMessage) -> anyhow::Result<()>;
}

/// In-memory transport for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAlertTransport {
    sent: Mutex<Vec<(Vec<String>, AlertMessage)>>,
}

impl InMemoryAlertTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, in order.
    pub fn sent(&self) -> Vec<(Vec<String>, AlertMessage)> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AlertTransport for InMemoryAlertTransport {
    fn send(&self, recipients: &[String], message: &AlertMessage) -> anyhow::Result<()> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| anyhow::anyhow!("alert outbox lock poisoned"))?;
        sent.push((recipients.to_vec(), message.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_messages_in_send_order() {
        let transport = InMemoryAlertTransport::new();
        let message = AlertMessage {
            subject: "s".to_string(),
            text_body: "t".to_string(),
            html_body: "<p>t</p>".to_string(),
        };
        transport.send(&["a@example.com".to_string()], &message).unwrap();
        transport.send(&[], &message).unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, vec!["a@example.com".to_string()]);
        assert!(sent[1].0.is_empty());
    }
}
