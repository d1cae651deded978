#[cfg(test)]
mod tests {
    use std::fs;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};
    use throne::libs::config::{
        CommentaryConfig, Config, ReportConfig, StorageConfig, CONFIG_FILE_NAME, DEFAULT_MODEL, DEFAULT_RECENT_WINDOW,
    };
    use throne::libs::data_storage::DataStorage;

    /// Points the data directory at a fresh temporary directory.
    struct ConfigTestContext {
        _temp_dir: TempDir,
        storage: DataStorage,
    }

    impl TestContext for ConfigTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let storage = DataStorage::with_base(temp_dir.path().join("throne"));
            ConfigTestContext {
                _temp_dir: temp_dir,
                storage,
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.storage.is_none());
        assert!(config.commentary.is_none());
        assert!(config.report.is_none());

        assert_eq!(config.storage().records_key, "session_records");
        assert_eq!(config.commentary().model, DEFAULT_MODEL);
        assert_eq!(config.commentary().history_lines, 5);
        assert_eq!(config.report().recent_window, DEFAULT_RECENT_WINDOW);
        assert_eq!(config.report().long_session_minutes, 20);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_read_nonexistent_config(ctx: &mut ConfigTestContext) {
        let config = Config::read_from(&ctx.storage).unwrap();
        assert_eq!(config, Config::default());
        assert!(ctx.storage.base_path().exists());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_save_and_read_config(ctx: &mut ConfigTestContext) {
        let config = Config {
            storage: Some(StorageConfig {
                records_key: "history".to_string(),
            }),
            commentary: Some(CommentaryConfig {
                model: "gemini-2.0-flash".to_string(),
                history_lines: 3,
                ..CommentaryConfig::default()
            }),
            report: Some(ReportConfig {
                recent_window: 14,
                long_session_minutes: 15,
            }),
        };
        config.save_to(&ctx.storage).unwrap();

        let read_config = Config::read_from(&ctx.storage).unwrap();
        assert_eq!(read_config, config);
        assert_eq!(read_config.report().recent_window, 14);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_partial_config_uses_defaults(ctx: &mut ConfigTestContext) {
        let path = ctx.storage.get_path(CONFIG_FILE_NAME).unwrap();
        fs::write(&path, r#"{"report":{"recent_window":3,"long_session_minutes":10}}"#).unwrap();

        let config = Config::read_from(&ctx.storage).unwrap();
        assert!(config.storage.is_none());
        assert_eq!(config.storage().records_key, "session_records");
        assert_eq!(config.report().recent_window, 3);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_unset_sections_are_not_written(ctx: &mut ConfigTestContext) {
        Config::default().save_to(&ctx.storage).unwrap();
        let path = ctx.storage.get_path(CONFIG_FILE_NAME).unwrap();
        let raw = fs::read_to_string(path).unwrap();
        assert_eq!(raw.trim(), "{}");
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_corrupt_config_is_an_error(ctx: &mut ConfigTestContext) {
        let path = ctx.storage.get_path(CONFIG_FILE_NAME).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::read_from(&ctx.storage).is_err());
    }
}
