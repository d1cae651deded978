#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};
    use throne::api::{Commentary, CommentaryError, CommentaryProvider};
    use throne::db::kv::MemoryKv;
    use throne::db::records::RecordStore;
    use throne::libs::chat::Sender;
    use throne::libs::config::{Config, StorageConfig};
    use throne::libs::data_storage::DataStorage;
    use throne::libs::messages::Message;
    use throne::libs::record::{Annotation, Category, FinishedSession, SessionRecord};
    use throne::libs::session::{Preference, SessionError, View};
    use throne::libs::tracker::Tracker;
    use tokio::time::{sleep, timeout};

    const KEY: &str = "session_records";

    /// Scripted provider. Every answer is derived from the request so tests
    /// can tell which request a result belongs to.
    #[derive(Default)]
    struct FakeProvider {
        fail: bool,
        empty: bool,
        delay: Option<Duration>,
        chat_histories: Mutex<Vec<Vec<String>>>,
    }

    impl FakeProvider {
        async fn pause(&self) {
            if let Some(delay) = self.delay {
                sleep(delay).await;
            }
        }

        fn answer(&self, text: String) -> Result<String, CommentaryError> {
            if self.fail {
                Err(CommentaryError::Other("provider offline".to_string()))
            } else if self.empty {
                Ok(String::new())
            } else {
                Ok(text)
            }
        }
    }

    #[async_trait]
    impl CommentaryProvider for FakeProvider {
        async fn analyze(&self, category: Category, _color_tag: &str, duration_seconds: u64, _notes: &str) -> Result<String, CommentaryError> {
            self.pause().await;
            self.answer(format!("type {} after {}s", category.value(), duration_seconds))
        }

        async fn entertain(&self, preference: Preference) -> Result<String, CommentaryError> {
            self.pause().await;
            self.answer(format!("something for {}", preference))
        }

        async fn chat(&self, message: &str, history: &[String]) -> Result<String, CommentaryError> {
            self.chat_histories.lock().push(history.to_vec());
            self.pause().await;
            self.answer(format!("re: {}", message))
        }
    }

    fn tracker_with(provider: FakeProvider) -> (Tracker<MemoryKv>, MemoryKv, Arc<FakeProvider>) {
        let kv = MemoryKv::new();
        let provider = Arc::new(provider);
        let store = RecordStore::open(kv.clone(), KEY);
        let tracker = Tracker::new(store, Commentary::new(provider.clone()), &Config::default());
        (tracker, kv, provider)
    }

    fn annotation(category: i64) -> Annotation {
        Annotation {
            category: Category::new(category).unwrap(),
            notes: "spicy noodles".to_string(),
            ..Annotation::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cycle_persists_one_record() {
        let (mut tracker, _kv, _) = tracker_with(FakeProvider::default());

        tracker.start_session().unwrap();
        assert_eq!(tracker.view(), View::Active);
        assert_eq!(tracker.next_commentary().await, Some(true));
        assert_eq!(tracker.state().active().unwrap().entertainment(), Some("something for home"));

        sleep(Duration::from_millis(4_200)).await;
        assert_eq!(tracker.finish_session().unwrap(), 4);

        tracker.request_analysis(&annotation(5)).unwrap();
        assert_eq!(tracker.next_commentary().await, Some(true));
        let pending = tracker.state().pending().unwrap();
        assert_eq!(pending.commentary(), Some("type 5 after 4s"));
        assert_eq!(pending.analysis_display(), Some("type 5 after 4s"));

        let record = tracker.save(annotation(5)).unwrap();
        assert_eq!(tracker.view(), View::Report);
        assert_eq!(record.duration_seconds, 4);
        assert_eq!(record.commentary.as_deref(), Some("type 5 after 4s"));
        assert_eq!(record.notes, "spicy noodles");

        let stored = tracker.store().load_all().unwrap();
        assert_eq!(stored, vec![record.clone()]);

        let report = tracker.report();
        assert_eq!(report.count, 1);
        assert_eq!(report.average_duration_seconds, 4.0);
        assert_eq!(report.entries[0].id, record.id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_persists_nothing() {
        let (mut tracker, kv, _) = tracker_with(FakeProvider::default());

        tracker.start_session().unwrap();
        sleep(Duration::from_secs(2)).await;
        tracker.finish_session().unwrap();
        tracker.cancel().unwrap();

        assert_eq!(tracker.view(), View::Idle);
        assert!(tracker.store().is_empty());
        assert!(RecordStore::open(kv, KEY).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_analysis_still_saves() {
        let provider = FakeProvider {
            fail: true,
            ..FakeProvider::default()
        };
        let (mut tracker, _kv, _) = tracker_with(provider);

        tracker.start_session().unwrap();
        assert_eq!(tracker.next_commentary().await, Some(true));
        assert_eq!(
            tracker.state().active().unwrap().entertainment(),
            Some(Message::EntertainmentUnavailable.to_string().as_str())
        );

        tracker.finish_session().unwrap();
        tracker.request_analysis(&annotation(4)).unwrap();
        assert_eq!(tracker.next_commentary().await, Some(true));

        let pending = tracker.state().pending().unwrap();
        assert_eq!(pending.analysis_display(), Some(Message::AnalysisUnavailable.to_string().as_str()));
        assert_eq!(pending.commentary(), None);

        let record = tracker.save(annotation(4)).unwrap();
        assert_eq!(record.commentary, None);
        assert_eq!(tracker.store().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_analysis_uses_fallback() {
        let provider = FakeProvider {
            empty: true,
            ..FakeProvider::default()
        };
        let (mut tracker, _kv, _) = tracker_with(provider);

        tracker.start_session().unwrap();
        assert_eq!(tracker.next_commentary().await, Some(true));
        assert_eq!(
            tracker.state().active().unwrap().entertainment(),
            Some(Message::EntertainmentEmpty.to_string().as_str())
        );
        tracker.finish_session().unwrap();
        tracker.request_analysis(&annotation(4)).unwrap();
        assert_eq!(tracker.next_commentary().await, Some(true));

        let pending = tracker.state().pending().unwrap();
        assert_eq!(pending.analysis_display(), Some(Message::AnalysisEmpty.to_string().as_str()));
        assert_eq!(pending.commentary(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_analysis_is_discarded() {
        let provider = FakeProvider {
            delay: Some(Duration::from_secs(5)),
            ..FakeProvider::default()
        };
        let (mut tracker, _kv, _) = tracker_with(provider);

        tracker.start_session().unwrap();
        tracker.finish_session().unwrap();
        tracker.request_analysis(&annotation(3)).unwrap();
        tracker.cancel().unwrap();
        tracker.start_session().unwrap();

        // both requests of the first session plus the entertainment of the
        // second one; only the last belongs to the current state
        let mut applied = Vec::new();
        for _ in 0..3 {
            applied.push(tracker.next_commentary().await.unwrap());
        }
        assert_eq!(applied.iter().filter(|applied| **applied).count(), 1);

        let active = tracker.state().active().unwrap();
        assert_eq!(active.entertainment(), Some("something for home"));
        assert!(tracker.store().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_preference_change_discards_old_entertainment() {
        let provider = FakeProvider {
            delay: Some(Duration::from_secs(1)),
            ..FakeProvider::default()
        };
        let (mut tracker, _kv, _) = tracker_with(provider);

        tracker.start_session().unwrap();
        tracker.set_preference(Preference::Work).unwrap();
        assert_eq!(tracker.preference(), Preference::Work);

        let first = tracker.next_commentary().await.unwrap();
        let second = tracker.next_commentary().await.unwrap();
        assert!(first ^ second);
        assert_eq!(tracker.state().active().unwrap().entertainment(), Some("something for work"));
        assert_eq!(tracker.state().active().unwrap().preference(), Preference::Work);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failure_keeps_annotation_view() {
        let (mut tracker, kv, _) = tracker_with(FakeProvider::default());

        tracker.start_session().unwrap();
        sleep(Duration::from_millis(1_500)).await;
        tracker.finish_session().unwrap();

        kv.set_fail_writes(true);
        let error = tracker.save(annotation(6)).unwrap_err();
        assert!(matches!(error, SessionError::Store(ref e) if e.is_persistence()));
        assert_eq!(tracker.view(), View::Annotating);
        assert_eq!(tracker.state().pending().unwrap().finished().duration_seconds, 1);
        assert!(tracker.store().is_empty());

        kv.set_fail_writes(false);
        let record = tracker.save(annotation(6)).unwrap();
        assert_eq!(record.duration_seconds, 1);
        assert_eq!(tracker.view(), View::Report);
        assert_eq!(tracker.store().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_sends_recent_history() {
        let (mut tracker, _kv, provider) = tracker_with(FakeProvider::default());

        tracker.open_social().unwrap();
        tracker.send_chat("anyone there?").unwrap();
        assert_eq!(tracker.next_commentary().await, Some(true));

        let messages = tracker.state().social().unwrap().transcript().messages().to_vec();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2].sender, Sender::User);
        assert_eq!(messages[2].text, "anyone there?");
        assert_eq!(messages[3].sender, Sender::Ai);
        assert_eq!(messages[3].text, "re: anyone there?");

        let histories = provider.chat_histories.lock().clone();
        assert_eq!(
            histories[0],
            vec![
                format!("You: {}", Message::AnonymousNeighbourMessage),
                format!("You: {}", Message::CompanionGreeting),
            ]
        );

        for i in 0..3 {
            tracker.send_chat(&format!("line {}", i)).unwrap();
            tracker.next_commentary().await;
        }
        let histories = provider.chat_histories.lock().clone();
        let last = histories.last().unwrap();
        assert_eq!(last.len(), 5);
        assert_eq!(last[4], "You: re: line 1");
        assert_eq!(last[3], "Me: line 1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_reply_after_leaving_is_dropped() {
        let provider = FakeProvider {
            delay: Some(Duration::from_secs(2)),
            ..FakeProvider::default()
        };
        let (mut tracker, _kv, _) = tracker_with(provider);

        tracker.open_social().unwrap();
        tracker.send_chat("hello?").unwrap();
        tracker.go_idle().unwrap();
        assert_eq!(tracker.next_commentary().await, Some(false));
        assert_eq!(tracker.view(), View::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopening_social_keeps_pending_reply() {
        let provider = FakeProvider {
            delay: Some(Duration::from_secs(2)),
            ..FakeProvider::default()
        };
        let (mut tracker, _kv, _) = tracker_with(provider);

        tracker.open_social().unwrap();
        let generation = tracker.generation();
        tracker.send_chat("still there?").unwrap();
        tracker.open_social().unwrap();
        assert_eq!(tracker.generation(), generation);

        assert_eq!(tracker.next_commentary().await, Some(true));
        let messages = tracker.state().social().unwrap().transcript().messages().to_vec();
        assert_eq!(messages.last().unwrap().text, "re: still there?");
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_commentary_without_requests_returns_none() {
        let (mut tracker, _kv, _) = tracker_with(FakeProvider::default());

        let idle = timeout(Duration::from_secs(60), tracker.next_commentary()).await;
        assert_eq!(idle.unwrap(), None);

        tracker.start_session().unwrap();
        assert_eq!(tracker.next_commentary().await, Some(true));
        let drained = timeout(Duration::from_secs(60), tracker.next_commentary()).await;
        assert_eq!(drained.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_actions_outside_their_view_are_refused() {
        let (mut tracker, _kv, _) = tracker_with(FakeProvider::default());

        assert!(matches!(tracker.finish_session(), Err(SessionError::IllegalTransition { .. })));
        assert!(matches!(tracker.save(Annotation::default()), Err(SessionError::IllegalTransition { .. })));
        assert!(matches!(tracker.send_chat("hi"), Err(SessionError::IllegalTransition { .. })));
        assert!(matches!(tracker.request_analysis(&Annotation::default()), Err(SessionError::IllegalTransition { .. })));
        assert!(matches!(tracker.set_preference(Preference::Study), Err(SessionError::PreferenceLocked)));
        assert_eq!(tracker.view(), View::Idle);

        tracker.open_report().unwrap();
        assert!(tracker.open_social().is_err());
        assert!(tracker.start_session().is_err());
        assert_eq!(tracker.view(), View::Report);
        assert_eq!(tracker.find_location().to_string(), Message::LocationSearchSimulated.to_string());
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_sessions_in_a_row() {
        let (mut tracker, _kv, _) = tracker_with(FakeProvider::default());

        for (seconds, category) in [(3u64, 4i64), (61, 2)] {
            tracker.start_session().unwrap();
            sleep(Duration::from_millis(seconds * 1000 + 200)).await;
            tracker.finish_session().unwrap();
            tracker.save(annotation(category)).unwrap();
            tracker.go_idle().unwrap();
        }
        tracker.poll_commentary();

        let report = tracker.open_report().unwrap();
        assert_eq!(report.count, 2);
        assert_eq!(report.average_duration_seconds, 32.0);
        assert_eq!(report.recent.len(), 2);
        assert_eq!(report.recent[1].duration_minutes, 1);
        assert_eq!(report.entries[0].duration_label, "1m 1s");
    }

    struct StorageTestContext {
        temp_dir: TempDir,
    }

    impl TestContext for StorageTestContext {
        fn setup() -> Self {
            StorageTestContext {
                temp_dir: tempfile::tempdir().unwrap(),
            }
        }
    }

    #[test_context(StorageTestContext)]
    #[test]
    fn test_open_in_uses_configured_key(ctx: &mut StorageTestContext) {
        let storage = DataStorage::with_base(ctx.temp_dir.path());
        let config = Config {
            storage: Some(StorageConfig {
                records_key: "my_history".to_string(),
            }),
            ..Config::default()
        };
        config.save_to(&storage).unwrap();

        let tracker = Tracker::open_in(&storage).unwrap();
        assert_eq!(tracker.view(), View::Idle);
        assert_eq!(tracker.store().key(), "my_history");
        assert_eq!(tracker.report().count, 0);

        let finished = FinishedSession::new(75, Utc::now().timestamp_millis());
        let record = SessionRecord::from_session(&finished, &annotation(4), None, Utc::now());
        tracker.store().append(record.clone()).unwrap();
        drop(tracker);

        let reopened = Tracker::open_in(&storage).unwrap();
        assert_eq!(reopened.store().records(), vec![record]);
        assert_eq!(reopened.report().average_duration_minutes, 1);
    }
}
