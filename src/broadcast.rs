use crate::protocol::ServerEvent;
use crate::types::{ConnectionId, MessageId};
use std::collections::HashSet;

/// Capacity of the hub channel; slow connections past this start lagging
pub const HUB_CAPACITY: usize = 256;

/// Which connections an event is delivered to
#[derive(Debug, Clone, PartialEq)]
pub enum Audience {
    All,
    AllExcept(ConnectionId),
}

impl Audience {
    pub fn includes(&self, connection_id: &str) -> bool {
        match self {
            Audience::All => true,
            Audience::AllExcept(excluded) => excluded != connection_id,
        }
    }
}

/// An event on the hub channel, tagged with its audience
#[derive(Debug, Clone)]
pub struct Envelope {
    pub audience: Audience,
    pub event: ServerEvent,
}

impl Envelope {
    pub fn to_all(event: ServerEvent) -> Self {
        Self {
            audience: Audience::All,
            event,
        }
    }

    pub fn to_others(sender: &str, event: ServerEvent) -> Self {
        Self {
            audience: Audience::AllExcept(sender.to_string()),
            event,
        }
    }

    /// The event if `connection_id` is in its audience
    pub fn for_connection(&self, connection_id: &str) -> Option<&ServerEvent> {
        self.audience
            .includes(connection_id)
            .then_some(&self.event)
    }
}

/// One connection's view of the hub.
///
/// A connection subscribes when it opens, so a message sent just before it
/// joins can be both in its `load_history` snapshot and still queued on its
/// receiver. The feed remembers the snapshot and drops those queued copies.
#[derive(Debug)]
pub struct ConnectionFeed {
    connection_id: ConnectionId,
    in_snapshot: HashSet<MessageId>,
}

impl ConnectionFeed {
    pub fn new(connection_id: impl Into<ConnectionId>) -> Self {
        Self {
            connection_id: connection_id.into(),
            in_snapshot: HashSet::new(),
        }
    }

    /// Note a reply about to be sent to this connection
    pub fn record_reply(&mut self, event: &ServerEvent) {
        if let ServerEvent::LoadHistory(history) = event {
            self.in_snapshot = history.iter().map(|m| m.id.clone()).collect();
        }
    }

    /// The event to deliver for `envelope`, if any
    pub fn accept<'a>(&mut self, envelope: &'a Envelope) -> Option<&'a ServerEvent> {
        let event = envelope.for_connection(&self.connection_id)?;
        if let ServerEvent::ReceiveMessage(message) = event {
            if self.in_snapshot.remove(&message.id) {
                return None;
            }
        }
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChatMessage, TypingNotice};

    #[test]
    fn test_audience_filtering() {
        let event = ServerEvent::OnlineUsers(vec![]);

        let all = Envelope::to_all(event.clone());
        assert!(all.for_connection("a").is_some());
        assert!(all.for_connection("b").is_some());

        let others = Envelope::to_others("a", event);
        assert!(others.for_connection("a").is_none());
        assert!(others.for_connection("b").is_some());
    }

    #[test]
    fn test_feed_skips_messages_already_in_history() {
        let old = ChatMessage::new("A".to_string(), "old".to_string());
        let new = ChatMessage::new("A".to_string(), "new".to_string());

        let mut feed = ConnectionFeed::new("b");
        feed.record_reply(&ServerEvent::LoadHistory(vec![old.clone()]));

        let queued_old = Envelope::to_all(ServerEvent::ReceiveMessage(old));
        let queued_new = Envelope::to_all(ServerEvent::ReceiveMessage(new.clone()));
        assert!(feed.accept(&queued_old).is_none());
        assert_eq!(
            feed.accept(&queued_new),
            Some(&ServerEvent::ReceiveMessage(new))
        );

        // Only the one queued copy is dropped
        assert!(feed.accept(&queued_old).is_some());
    }

    #[test]
    fn test_feed_respects_audience() {
        let mut feed = ConnectionFeed::new("a");
        let typing = Envelope::to_others(
            "a",
            ServerEvent::UserTyping(TypingNotice {
                username: "A".to_string(),
            }),
        );
        assert!(feed.accept(&typing).is_none());
        assert!(feed
            .accept(&Envelope::to_all(ServerEvent::OnlineUsers(vec![])))
            .is_some());
    }
}
