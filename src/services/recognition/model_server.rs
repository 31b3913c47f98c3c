use crate::error::ClassifierError;
use crate::models::config::RecognitionConfig;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Lifecycle state of the managed model server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Running,
    /// Restart budget exhausted; only `reinitialize` clears this
    HardFailed,
}

/// Model server lifecycle manager
///
/// Spawns the bundled classification server, watches its health endpoint,
/// and restarts it when it goes away. Restarts are capped: once the
/// budget is spent the manager latches into `HardFailed` and refuses to
/// spawn again until explicitly reinitialized. With no binary configured
/// the server is assumed externally managed and only probed.
pub struct ModelServerManager {
    process: Option<Child>,
    binary: Option<PathBuf>,
    base_url: String,
    client: reqwest::Client,
    state: ServerState,
    restart_attempts: u32,
    max_restart_attempts: u32,
    restart_backoff_ms: u64,
    ready_probe_attempts: u32,
    ready_probe_delay_ms: u64,
}

impl ModelServerManager {
    /// Create a new server manager
    pub fn new(
        config: &RecognitionConfig,
        binary: Option<PathBuf>,
    ) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| {
                ClassifierError::Request(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            process: None,
            binary,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            client,
            state: ServerState::Stopped,
            restart_attempts: 0,
            max_restart_attempts: config.max_restart_attempts,
            restart_backoff_ms: config.restart_backoff_ms,
            ready_probe_attempts: config.ready_probe_attempts,
            ready_probe_delay_ms: config.ready_probe_delay_ms,
        })
    }

    /// Start the model server and wait until it answers health checks
    pub async fn start(&mut self) -> Result<(), ClassifierError> {
        if self.state == ServerState::HardFailed {
            return Err(ClassifierError::Unavailable(self.restart_attempts));
        }

        if self.is_healthy().await {
            debug!("model server already running at {}", self.base_url);
            self.state = ServerState::Running;
            return Ok(());
        }

        self.spawn_process()?;
        self.wait_for_ready().await?;
        self.state = ServerState::Running;
        info!("model server ready at {}", self.base_url);

        Ok(())
    }

    /// Verify the server is reachable, restarting it if necessary
    ///
    /// Each unhealthy round burns one restart attempt with a growing
    /// backoff. A successful health check resets the budget.
    pub async fn ensure_running(&mut self) -> Result<(), ClassifierError> {
        if self.state == ServerState::HardFailed {
            return Err(ClassifierError::Unavailable(self.restart_attempts));
        }

        if self.is_healthy().await {
            self.state = ServerState::Running;
            self.restart_attempts = 0;
            return Ok(());
        }

        while self.restart_attempts < self.max_restart_attempts {
            self.restart_attempts += 1;
            let delay = self.restart_backoff_ms * self.restart_attempts as u64;
            warn!(
                "model server unhealthy, restart attempt {}/{} after {} ms",
                self.restart_attempts, self.max_restart_attempts, delay
            );
            sleep(Duration::from_millis(delay)).await;

            self.kill_process();
            if let Err(e) = self.spawn_process() {
                warn!("restart attempt {} failed to spawn: {}", self.restart_attempts, e);
                continue;
            }
            if self.wait_for_ready().await.is_ok() {
                self.state = ServerState::Running;
                self.restart_attempts = 0;
                return Ok(());
            }
        }

        self.state = ServerState::HardFailed;
        warn!(
            "model server hard-failed after {} restart attempts",
            self.max_restart_attempts
        );
        Err(ClassifierError::Unavailable(self.max_restart_attempts))
    }

    /// Clear the hard-failed latch and the restart budget
    pub fn reinitialize(&mut self) {
        self.restart_attempts = 0;
        if self.state == ServerState::HardFailed {
            self.state = ServerState::Stopped;
        }
        info!("model server manager reinitialized");
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    fn spawn_process(&mut self) -> Result<(), ClassifierError> {
        let binary = match &self.binary {
            Some(binary) => binary,
            // Externally managed: nothing to spawn, only probe
            None => return Ok(()),
        };

        if !binary.exists() {
            return Err(ClassifierError::SpawnFailed(format!(
                "model server binary not found at {:?}",
                binary
            )));
        }

        let workdir = binary.parent().unwrap_or_else(|| Path::new("."));
        let child = Command::new(binary)
            .current_dir(workdir)
            .spawn()
            .map_err(|e| ClassifierError::SpawnFailed(e.to_string()))?;

        self.process = Some(child);
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Poll the health endpoint until the server answers
    async fn wait_for_ready(&self) -> Result<(), ClassifierError> {
        let delay = Duration::from_millis(self.ready_probe_delay_ms);

        for attempt in 1..=self.ready_probe_attempts {
            if self.is_healthy().await {
                debug!("model server ready after {} probes", attempt);
                return Ok(());
            }
            sleep(delay).await;
        }

        Err(ClassifierError::NotReady(format!(
            "no answer from {} after {} probes",
            self.base_url, self.ready_probe_attempts
        )))
    }

    /// Stop the server, gracefully when it cooperates
    pub async fn stop(&mut self) {
        let url = format!("{}/shutdown", self.base_url);
        let graceful = self.client.post(&url).send().await.is_ok();
        if graceful {
            sleep(Duration::from_millis(300)).await;
        }

        self.kill_process();
        self.state = ServerState::Stopped;
        debug!("model server stopped");
    }

    fn kill_process(&mut self) {
        if let Some(mut child) = self.process.take() {
            if let Err(e) = child.kill() {
                warn!("failed to kill model server process: {}", e);
            }
            let _ = child.wait();
        }
    }
}

impl Drop for ModelServerManager {
    fn drop(&mut self) {
        self.kill_process();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Config pointing at a closed port with a tiny probe budget
    fn unreachable_config() -> RecognitionConfig {
        RecognitionConfig {
            server_url: "http://127.0.0.1:1".to_string(),
            max_restart_attempts: 2,
            restart_backoff_ms: 1,
            ready_probe_attempts: 1,
            ready_probe_delay_ms: 1,
            ..RecognitionConfig::default()
        }
    }

    #[tokio::test]
    async fn test_ensure_running_hard_fails_after_budget() {
        let mut manager = ModelServerManager::new(&unreachable_config(), None).unwrap();

        let err = manager.ensure_running().await.unwrap_err();
        assert!(matches!(err, ClassifierError::Unavailable(2)));
        assert_eq!(manager.state(), ServerState::HardFailed);
    }

    #[tokio::test]
    async fn test_hard_failed_rejects_without_restarting() {
        let mut manager = ModelServerManager::new(&unreachable_config(), None).unwrap();
        let _ = manager.ensure_running().await;
        assert_eq!(manager.state(), ServerState::HardFailed);

        // No more restart rounds are attempted once latched
        let err = manager.ensure_running().await.unwrap_err();
        assert!(matches!(err, ClassifierError::Unavailable(_)));

        let err = manager.start().await.unwrap_err();
        assert!(matches!(err, ClassifierError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_reinitialize_clears_the_latch() {
        let mut manager = ModelServerManager::new(&unreachable_config(), None).unwrap();
        let _ = manager.ensure_running().await;
        assert_eq!(manager.state(), ServerState::HardFailed);

        manager.reinitialize();
        assert_eq!(manager.state(), ServerState::Stopped);

        // The budget is fresh again: it fails, but by exhausting attempts
        let err = manager.ensure_running().await.unwrap_err();
        assert!(matches!(err, ClassifierError::Unavailable(2)));
    }

    #[tokio::test]
    async fn test_spawn_fails_for_missing_binary() {
        let config = unreachable_config();
        let missing = PathBuf::from("/no/such/model-server-binary");
        let mut manager = ModelServerManager::new(&config, Some(missing)).unwrap();

        // start() probes health first, then tries to spawn
        let err = manager.start().await.unwrap_err();
        assert!(matches!(err, ClassifierError::SpawnFailed(_)));
    }

    #[tokio::test]
    async fn test_stop_without_start_is_harmless() {
        let mut manager = ModelServerManager::new(&unreachable_config(), None).unwrap();
        manager.stop().await;
        assert_eq!(manager.state(), ServerState::Stopped);
    }
}
