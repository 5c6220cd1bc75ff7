#[cfg(test)]
mod tests {
    use crate::error::Result;
    use crate::init::systemd::{status_from_unit, unit_name, validate_unit_name};
    use crate::init::{InitSystem, LookupError, ManagerRegistry, ProcessState, ProcessStatus};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NamedManager(&'static str);

    #[async_trait]
    impl InitSystem for NamedManager {
        fn name(&self) -> &str {
            self.0
        }

        async fn lookup_service(&self, _service: &str) -> std::result::Result<ProcessStatus, LookupError> {
            Err(LookupError::NotFound)
        }

        async fn restart_service(&self, _service: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_registry_skips_absent_slots() {
        let mut registry = ManagerRegistry::new();
        registry.register_absent();
        let first = registry.register(Arc::new(NamedManager("upstart")));
        registry.register_absent();
        let second = registry.register(Arc::new(NamedManager("systemd")));

        let names: Vec<&str> = registry.iter().map(|(_, m)| m.name()).collect();
        assert_eq!(names, vec!["upstart", "systemd"]);
        assert_eq!(registry.available(), 2);
        assert!(!registry.is_empty());

        assert_eq!(registry.get(first).unwrap().name(), "upstart");
        assert_eq!(registry.handle(second).unwrap().name(), "systemd");
    }

    #[test]
    fn test_registry_empty() {
        let mut registry = ManagerRegistry::new();
        assert!(registry.is_empty());
        registry.register_absent();
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }

    #[test]
    fn test_process_status_constructors() {
        assert_eq!(
            ProcessStatus::unknown(),
            ProcessStatus { pid: 0, state: ProcessState::Unknown }
        );
        assert_eq!(ProcessStatus::up(42).pid, 42);
        assert_eq!(ProcessStatus::down().state, ProcessState::Down);
        assert_eq!(ProcessStatus::starting().pid, 0);
        assert_eq!(format!("{}", ProcessStatus::up(42)), "up (pid 42)");
        assert_eq!(format!("{}", ProcessStatus::down()), "down");
    }

    #[test]
    fn test_status_from_unit_mapping() {
        assert_eq!(status_from_unit("active", 1234), ProcessStatus::up(1234));
        assert_eq!(status_from_unit("reloading", 99), ProcessStatus::up(99));
        assert_eq!(status_from_unit("activating", 0), ProcessStatus::starting());
        assert_eq!(status_from_unit("inactive", 0), ProcessStatus::down());
        assert_eq!(status_from_unit("failed", 0), ProcessStatus::down());
        assert_eq!(status_from_unit("deactivating", 50), ProcessStatus::down());
        // Down always carries pid 0, even if systemd still reports one
        assert_eq!(status_from_unit("failed", 50).pid, 0);
    }

    #[test]
    fn test_unit_name_normalization() {
        assert_eq!(unit_name("nginx"), "nginx.service");
        assert_eq!(unit_name("nginx.service"), "nginx.service");
        assert_eq!(unit_name("cleanup.timer"), "cleanup.timer");
    }

    #[test]
    fn test_validate_unit_name() {
        assert!(validate_unit_name("").is_err());
        assert!(validate_unit_name("../etc/passwd.service").is_err());
        assert!(validate_unit_name("etc/passwd.service").is_err());
        assert!(validate_unit_name("invalid\0service").is_err());

        assert!(validate_unit_name("test.service").is_ok());
        assert!(validate_unit_name("nginx.service").is_ok());
    }
}
