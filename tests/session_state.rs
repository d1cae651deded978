#[cfg(test)]
mod tests {
    use chrono::Utc;
    use std::time::Duration;
    use throne::libs::record::{Annotation, Category, ValidationError};
    use throne::libs::session::{Action, AppState, Preference, SessionError, View};
    use tokio::time::sleep;

    fn now_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    fn assert_illegal(result: Result<AppState, throne::libs::session::Rejected>, from: View) -> AppState {
        let rejected = result.unwrap_err();
        assert!(matches!(rejected.error, SessionError::IllegalTransition { from: f, .. } if f == from));
        assert_eq!(rejected.state.view(), from);
        rejected.state
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cycle() {
        let state = AppState::default();
        assert_eq!(state.view(), View::Idle);

        let state = state.start(Preference::Work).unwrap();
        assert_eq!(state.view(), View::Active);
        assert_eq!(state.active().unwrap().elapsed(), 0);
        assert_eq!(state.active().unwrap().preference(), Preference::Work);

        sleep(Duration::from_millis(3_500)).await;
        let ended_at = now_ms();
        let state = state.finish(ended_at).unwrap();
        let pending = state.pending().unwrap();
        assert_eq!(pending.finished().duration_seconds, 3);
        assert_eq!(pending.finished().ended_at_ms, ended_at);
        assert!(pending.commentary().is_none());

        let annotation = Annotation {
            category: Category::new(2).unwrap(),
            ..Annotation::default()
        };
        let record = state.prepare_record(&annotation, Utc::now()).unwrap();
        assert_eq!(record.duration_seconds, 3);
        assert_eq!(record.end_time - record.start_time, 3_000);
        assert_eq!(record.category.value(), 2);

        let state = state.saved().unwrap();
        assert_eq!(state.view(), View::Report);
        let state = state.navigate(View::Idle).unwrap();
        assert_eq!(state.view(), View::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_returns_to_idle() {
        let state = AppState::Idle.start(Preference::Home).unwrap();
        let state = state.finish(now_ms()).unwrap();
        let state = state.cancel().unwrap();
        assert_eq!(state.view(), View::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_illegal_transitions_keep_state() {
        let state = assert_illegal(AppState::Idle.finish(now_ms()), View::Idle);
        let state = assert_illegal(state.cancel(), View::Idle);
        let state = assert_illegal(state.saved(), View::Idle);

        let state = state.start(Preference::Study).unwrap();
        let state = assert_illegal(state.start(Preference::Home), View::Active);
        let state = assert_illegal(state.navigate(View::Report), View::Active);
        let state = assert_illegal(state.cancel(), View::Active);
        assert_eq!(state.active().unwrap().preference(), Preference::Study);

        let state = state.finish(now_ms()).unwrap();
        let state = assert_illegal(state.start(Preference::Home), View::Annotating);
        let state = assert_illegal(state.finish(now_ms()), View::Annotating);
        let state = assert_illegal(state.navigate(View::Social), View::Annotating);
        assert!(state.pending().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation() {
        let state = AppState::Idle.navigate(View::Report).unwrap();
        let state = state.navigate(View::Report).unwrap();
        assert_eq!(state.view(), View::Report);
        let state = assert_illegal(state.navigate(View::Social), View::Report);
        let state = assert_illegal(state.start(Preference::Home), View::Report);
        let state = state.navigate(View::Idle).unwrap();

        let state = state.navigate(View::Social).unwrap();
        assert_eq!(state.social().unwrap().transcript().messages().len(), 2);
        let state = assert_illegal(state.navigate(View::Report), View::Social);
        let state = state.navigate(View::Idle).unwrap();
        assert_eq!(state.view(), View::Idle);

        let rejected = AppState::Idle.navigate(View::Active).unwrap_err();
        assert!(matches!(
            rejected.error,
            SessionError::IllegalTransition {
                action: Action::Navigate(View::Active),
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_preference_only_while_active() {
        let mut state = AppState::Idle;
        assert!(matches!(state.set_preference(Preference::Work), Err(SessionError::PreferenceLocked)));

        let mut state = state.start(Preference::Home).unwrap();
        state.set_preference(Preference::Work).unwrap();
        assert_eq!(state.active().unwrap().preference(), Preference::Work);

        let mut state = state.finish(now_ms()).unwrap();
        assert!(state.set_preference(Preference::Study).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_duration_is_fixed_at_finish() {
        let state = AppState::Idle.start(Preference::Study).unwrap();
        sleep(Duration::from_millis(2_200)).await;
        let state = state.finish(now_ms()).unwrap();

        sleep(Duration::from_secs(30)).await;
        let record = state.prepare_record(&Annotation::default(), Utc::now()).unwrap();
        assert_eq!(record.duration_seconds, 2);
        assert_eq!(record.duration_seconds, state.pending().unwrap().finished().duration_seconds);
        assert_eq!(record.end_time - record.start_time, 2_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prepare_record_requires_annotating() {
        let error = AppState::Idle.prepare_record(&Annotation::default(), Utc::now()).unwrap_err();
        assert!(matches!(
            error,
            SessionError::IllegalTransition {
                from: View::Idle,
                action: Action::Save
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_analysis_is_attached_only_when_generated() {
        let mut state = AppState::Idle.start(Preference::Home).unwrap().finish(now_ms()).unwrap();

        state.pending_mut().unwrap().set_analysis_fallback("busy".to_string());
        let record = state.prepare_record(&Annotation::default(), Utc::now()).unwrap();
        assert_eq!(state.pending().unwrap().analysis_display(), Some("busy"));
        assert_eq!(record.commentary, None);

        state.pending_mut().unwrap().set_analysis("All good".to_string());
        let record = state.prepare_record(&Annotation::default(), Utc::now()).unwrap();
        assert_eq!(record.commentary.as_deref(), Some("All good"));
    }

    #[test]
    fn test_start_without_runtime_is_rejected() {
        let rejected = AppState::Idle.start(Preference::Home).unwrap_err();
        assert_eq!(rejected.state.view(), View::Idle);
        assert!(matches!(rejected.error, SessionError::Timer(_)));
    }

    #[test]
    fn test_validation_error_converts() {
        let error: SessionError = ValidationError::EmptyId.into();
        assert_eq!(error.to_string(), "record id must not be empty");
    }
}
