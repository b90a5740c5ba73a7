use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{Candidate, QueryTicket, SuggestionSources};
use crate::config::SuggestConfig;

#[derive(Debug)]
pub enum SuggestionMessage {
    Results {
        token: u64,
        candidates: Vec<Candidate>,
    },
}

/// Runs suggestion queries off the editing path and reports back over a
/// channel. Only the latest ticket is kept in flight.
pub struct QueryDispatcher {
    sources: SuggestionSources,
    delay: Duration,
    tx: mpsc::UnboundedSender<SuggestionMessage>,
    inflight: Option<JoinHandle<()>>,
}

impl QueryDispatcher {
    pub fn new(
        sources: SuggestionSources,
        delay: Duration,
        tx: mpsc::UnboundedSender<SuggestionMessage>,
    ) -> Self {
        Self {
            sources,
            delay,
            tx,
            inflight: None,
        }
    }

    pub fn from_config(
        sources: SuggestionSources,
        config: &SuggestConfig,
        tx: mpsc::UnboundedSender<SuggestionMessage>,
    ) -> Self {
        Self::new(sources, config.query_debounce(), tx)
    }

    pub fn dispatch(&mut self, ticket: QueryTicket) {
        self.cancel();

        let source = self.sources.for_kind(ticket.kind);
        let tx = self.tx.clone();
        let delay = self.delay;
        self.inflight = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let candidates = source.query(&ticket.text).await;
            tracing::debug!(
                token = ticket.token,
                count = candidates.len(),
                "suggestion query finished"
            );
            // Receiver gone means the surface was torn down.
            let _ = tx.send(SuggestionMessage::Results {
                token: ticket.token,
                candidates,
            });
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.inflight.take() {
            handle.abort();
        }
    }
}

impl Drop for QueryDispatcher {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;
    use crate::suggest::{CollaboratorSuggestions, PageSuggestions, ReferenceKind};
    use crate::test_helpers::{make_member, make_page, WORKSPACE};

    fn sources() -> SuggestionSources {
        let store = Arc::new(MemoryStore::new());
        store.insert_page(make_page("p1", "Alpha", 0)).unwrap();
        store.insert_page(make_page("p2", "Beta", 1)).unwrap();
        store
            .insert_member(WORKSPACE, make_member("u1", Some("Ada"), None))
            .unwrap();
        let config = SuggestConfig::default();
        SuggestionSources {
            pages: Arc::new(PageSuggestions::new(store.clone(), WORKSPACE, &config)),
            collaborators: Arc::new(CollaboratorSuggestions::new(store, WORKSPACE, &config)),
        }
    }

    fn ticket(token: u64, kind: ReferenceKind, text: &str) -> QueryTicket {
        QueryTicket {
            token,
            kind,
            text: text.into(),
        }
    }

    #[tokio::test]
    async fn results_come_back_tagged_with_token() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatcher = QueryDispatcher::new(sources(), Duration::ZERO, tx);

        dispatcher.dispatch(ticket(7, ReferenceKind::Page, "alp"));

        let SuggestionMessage::Results { token, candidates } = rx.recv().await.unwrap();
        assert_eq!(token, 7);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "p1");
    }

    #[tokio::test]
    async fn routes_by_reference_kind() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatcher = QueryDispatcher::new(sources(), Duration::ZERO, tx);

        dispatcher.dispatch(ticket(1, ReferenceKind::Collaborator, ""));

        let SuggestionMessage::Results { candidates, .. } = rx.recv().await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, ReferenceKind::Collaborator);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_ticket_supersedes_scheduled_one() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatcher = QueryDispatcher::new(sources(), Duration::from_millis(150), tx);

        dispatcher.dispatch(ticket(1, ReferenceKind::Page, "a"));
        dispatcher.dispatch(ticket(2, ReferenceKind::Page, "al"));

        let SuggestionMessage::Results { token, .. } = rx.recv().await.unwrap();
        assert_eq!(token, 2);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn configured_delay_holds_back_the_query() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = SuggestConfig {
            query_debounce_ms: 200,
            ..SuggestConfig::default()
        };
        let mut dispatcher = QueryDispatcher::from_config(sources(), &config, tx);

        dispatcher.dispatch(ticket(3, ReferenceKind::Page, ""));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(100)).await;
        let SuggestionMessage::Results { token, candidates } = rx.recv().await.unwrap();
        assert_eq!(token, 3);
        assert_eq!(candidates.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_scheduled_query() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatcher = QueryDispatcher::new(sources(), Duration::from_millis(150), tx);

        dispatcher.dispatch(ticket(1, ReferenceKind::Page, ""));
        dispatcher.cancel();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }
}
