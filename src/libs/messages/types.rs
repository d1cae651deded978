#[derive(Debug, Clone)]
pub enum Message {
    // === SESSION MESSAGES ===
    SessionStarted(String), // preference
    SessionFinished(u64),   // seconds
    SessionCancelled,
    SessionSaved(String), // record id
    IllegalTransition {
        from: String,
        action: String,
    },
    PreferenceChanged(String),
    PreferenceLocked,
    TimerStopped(u64), // seconds

    // === RECORD STORE MESSAGES ===
    RecordsLoaded(usize),
    RecordsNotFound,
    RecordsCorrupt(String), // error
    RecordsReadFailed(String),
    RecordsBackupCreated(String), // backup key
    RecordsBackupFailed(String),
    RecordsRecovered(usize),
    RecordsAppendRefused(String), // error
    RecordRejected(String),
    RecordsWriteFailed(String),

    // === COMMENTARY MESSAGES ===
    CredentialMissing(String), // variable name
    CommentaryFailed {
        touchpoint: String,
        error: String,
    },
    CommentaryDiscarded(String), // touchpoint
    AnalysisUnavailable,
    AnalysisEmpty,
    EntertainmentUnavailable,
    EntertainmentEmpty,
    ChatUnavailable,
    ChatEmpty,
    CompanionGreeting,
    AnonymousNeighbourMessage,

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigFileNotFound,
    ConfigParseError(String),

    // === LOCATION MESSAGES ===
    LocationSearchSimulated,
}
