// Systemd adapter over D-Bus using zbus

use crate::error::{AgentError, Result};
use crate::init::{InitSystem, LookupError, ProcessStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use zbus::Connection;

const MANAGER_DEST: &str = "org.freedesktop.systemd1";
const MANAGER_PATH: &str = "/org/freedesktop/systemd1";
const MANAGER_IFACE: &str = "org.freedesktop.systemd1.Manager";

const CONNECT_RETRIES: usize = 3;
const CONNECT_DELAY: Duration = Duration::from_millis(500);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Init system adapter speaking systemd's D-Bus API. One instance per bus:
/// the system bus manages system services, the session bus user services.
pub struct SystemdManager {
    connection: Connection,
    label: &'static str,
}

impl SystemdManager {
    /// Connect to the system bus manager
    pub async fn system() -> Result<Self> {
        let connection = connect_with_retry("system bus", Connection::system).await?;
        Ok(Self { connection, label: "systemd" })
    }

    /// Connect to the session (user) bus manager, if a session exists
    pub async fn session() -> Result<Self> {
        let connection = connect_with_retry("session bus", Connection::session).await?;
        Ok(Self { connection, label: "systemd-user" })
    }

    async fn manager_proxy(&self) -> Result<zbus::Proxy<'_>> {
        zbus::Proxy::new(&self.connection, MANAGER_DEST, MANAGER_PATH, MANAGER_IFACE)
            .await
            .map_err(|e| AgentError::BusConnection(e.to_string()).into())
    }

    /// Fetch all properties of a unit object
    async fn unit_properties(
        &self,
        unit_path: &zbus::zvariant::OwnedObjectPath,
    ) -> Result<HashMap<String, zbus::zvariant::OwnedValue>> {
        let props_proxy = zbus::fdo::PropertiesProxy::builder(&self.connection)
            .destination(MANAGER_DEST)?
            .path(unit_path.as_str())?
            .build()
            .await
            .map_err(|e| AgentError::BusConnection(e.to_string()))?;

        use zbus::zvariant::Optional;
        let props = props_proxy
            .get_all(Optional::default())
            .await
            .map_err(|e| AgentError::ServiceLookup {
                service: unit_path.to_string(),
                message: format!("Failed to get properties: {}", e),
            })?;

        Ok(props)
    }
}

#[async_trait]
impl InitSystem for SystemdManager {
    fn name(&self) -> &str {
        self.label
    }

    async fn lookup_service(&self, service: &str) -> std::result::Result<ProcessStatus, LookupError> {
        let unit = unit_name(service);
        validate_unit_name(&unit).map_err(LookupError::Failed)?;

        let proxy = self.manager_proxy().await.map_err(LookupError::Failed)?;

        // LoadUnit always yields a unit object; a unit file that doesn't
        // exist shows up as LoadState=not-found on that object.
        let unit_path: zbus::zvariant::OwnedObjectPath = proxy
            .call("LoadUnit", &(unit.as_str(),))
            .await
            .map_err(|e| {
                LookupError::Failed(
                    AgentError::ServiceLookup {
                        service: unit.clone(),
                        message: e.to_string(),
                    }
                    .into(),
                )
            })?;

        let props = self
            .unit_properties(&unit_path)
            .await
            .map_err(LookupError::Failed)?;

        let load_state = props
            .get("LoadState")
            .and_then(|v| v.downcast_ref::<String>().ok())
            .unwrap_or_default();
        if load_state == "not-found" {
            return Err(LookupError::NotFound);
        }

        let active_state = props
            .get("ActiveState")
            .and_then(|v| v.downcast_ref::<String>().ok())
            .unwrap_or_default();
        let main_pid = props
            .get("MainPID")
            .and_then(|v| v.downcast_ref::<u32>().ok())
            .unwrap_or(0);

        Ok(status_from_unit(&active_state, main_pid))
    }

    async fn restart_service(&self, service: &str) -> Result<()> {
        let unit = unit_name(service);
        validate_unit_name(&unit)?;

        let proxy = self.manager_proxy().await?;

        // RestartUnit returns the job object path
        let _job_path: zbus::zvariant::OwnedObjectPath = proxy
            .call("RestartUnit", &(unit.as_str(), "replace"))
            .await
            .map_err(|e| {
                let error_msg = e.to_string();
                if error_msg.contains("Access denied") || error_msg.contains("Authentication") {
                    AgentError::ServiceControl {
                        service: unit.clone(),
                        message: "Access denied. Run procwatch with sufficient privileges or configure polkit.".to_string(),
                    }
                } else {
                    AgentError::ServiceControl {
                        service: unit.clone(),
                        message: format!("Failed to restart: {}", e),
                    }
                }
            })?;

        Ok(())
    }
}

/// Map a unit's ActiveState and MainPID onto the process status model
pub(crate) fn status_from_unit(active_state: &str, main_pid: u32) -> ProcessStatus {
    match active_state {
        "active" | "reloading" => ProcessStatus::up(main_pid as i32),
        "activating" => ProcessStatus::starting(),
        _ => ProcessStatus::down(),
    }
}

/// Append the .service suffix when the name carries no unit suffix
pub(crate) fn unit_name(service: &str) -> String {
    if service.contains('.') {
        service.to_string()
    } else {
        format!("{}.service", service)
    }
}

/// Validate unit name format and prevent injection
pub(crate) fn validate_unit_name(unit: &str) -> Result<()> {
    if unit.is_empty() {
        return Err(anyhow::anyhow!("Service name cannot be empty"));
    }

    // Basic validation: no path traversal, no null bytes, reasonable length
    if unit.contains("..") || unit.contains('/') || unit.contains('\0') || unit.len() > 256 {
        return Err(anyhow::anyhow!("Invalid service name format"));
    }

    Ok(())
}

async fn connect_with_retry<F, Fut>(label: &str, connect: F) -> Result<Connection>
where
    F: Fn() -> Fut,
    Fut: Future<Output = zbus::Result<Connection>>,
{
    let mut last_error = None;

    for attempt in 1..=CONNECT_RETRIES {
        match tokio::time::timeout(CONNECT_TIMEOUT, connect()).await {
            Ok(Ok(connection)) => {
                if attempt > 1 {
                    tracing::info!("Connected to {} on attempt {}", label, attempt);
                }
                return Ok(connection);
            }
            Ok(Err(e)) => {
                tracing::warn!("Failed to connect to {} on attempt {}: {}", label, attempt, e);
                last_error = Some(AgentError::BusConnection(e.to_string()));
            }
            Err(_) => {
                tracing::warn!("Connection to {} timed out on attempt {}", label, attempt);
                last_error = Some(AgentError::BusConnection("Connection timeout".to_string()));
            }
        }

        if attempt < CONNECT_RETRIES {
            sleep(CONNECT_DELAY).await;
        }
    }

    Err(last_error
        .unwrap_or_else(|| AgentError::BusConnection("No connection attempt recorded".to_string()))
        .into())
}
