#[cfg(test)]
mod tests {
    use crate::config::*;
    use crate::error::Result;
    use std::path::PathBuf;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cycle_secs, 15);
        assert_eq!(config.proc_root, PathBuf::from("/proc"));
        assert!(config.alert_webhook.is_none());
        assert!(config.host.rules.is_empty());
        assert!(config.services.is_empty());
    }

    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
cycle_secs: 30
alert_webhook: https://alerts.example.com/hook
host:
  owner: ops
  rules:
    - metric: swap
      op: ">"
      threshold: 80
services:
  - name: nginx.service
    owner: web
    rules:
      - metric: memory
        field: rss
        op: ">"
        threshold: 268435456
        cycles: 3
        actions: [alert, log]
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.cycle_secs, 30);
        // Unset fields fall back to their defaults
        assert_eq!(config.proc_root, PathBuf::from("/proc"));
        assert_eq!(config.alert_webhook.as_deref(), Some("https://alerts.example.com/hook"));

        assert_eq!(config.host.owner.as_deref(), Some("ops"));
        assert_eq!(config.host.rules.len(), 1);
        assert_eq!(config.host.rules[0].metric, "swap");
        assert_eq!(config.host.rules[0].field, "");
        assert_eq!(config.host.rules[0].cycles, 1);

        assert_eq!(config.services.len(), 1);
        let svc = &config.services[0];
        assert_eq!(svc.name, "nginx.service");
        assert_eq!(svc.rules[0].cycles, 3);
        assert_eq!(svc.rules[0].actions, vec!["alert", "log"]);
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let mut config = Config::default();
        config.cycle_secs = 5;
        config.services.push(ServiceConfig {
            name: "redis.service".to_string(),
            owner: Some("data".to_string()),
            parameters: Default::default(),
            rules: vec![RuleConfig {
                metric: "threads".to_string(),
                field: String::new(),
                op: "<".to_string(),
                threshold: 2.0,
                cycles: 2,
                actions: vec!["log".to_string()],
            }],
        });

        let yaml = serde_yaml::to_string(&config).unwrap();
        let deserialized: Config = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(deserialized.cycle_secs, 5);
        assert_eq!(deserialized.services.len(), 1);
        assert_eq!(deserialized.services[0].rules[0].op, "<");
        assert_eq!(deserialized.services[0].rules[0].threshold, 2.0);
    }

    #[test]
    fn test_config_default_path() {
        let path = Config::default_path();
        assert!(path.is_ok());

        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("procwatch"));
        assert!(path.to_string_lossy().contains("config.yaml"));
    }

    #[test]
    fn test_config_load_missing() -> Result<()> {
        // Loading a non-existent config returns defaults
        let config = Config::load(Some("/nonexistent/config.yaml".into()))?;
        assert_eq!(config.cycle_secs, 15);

        Ok(())
    }

    #[test]
    fn test_config_save_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("config.yaml");

        let original = Config {
            cycle_secs: 7,
            ..Config::default()
        };

        original.save(config_path.clone())?;
        let loaded = Config::load(Some(config_path))?;

        assert_eq!(loaded.cycle_secs, 7);
        assert_eq!(loaded.proc_root, original.proc_root);

        Ok(())
    }
}
