pub mod config;
pub mod console;
pub mod drivers;
pub mod error;
pub mod query;
pub mod setup;
pub mod toggle;

#[cfg(test)]
mod testutil;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

pub use crate::config::{Config, ConfigStore};
pub use crate::error::RouterError;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

struct Client {}

#[async_trait]
impl russh::client::Handler for Client {
    type Error = russh::Error;
    // Host keys are never pinned: any key the router presents is accepted.
    async fn check_server_key(
        self,
        _server_public_key: &russh_keys::key::PublicKey,
    ) -> Result<(Self, bool), Self::Error> {
        Ok((self, true))
    }
}

/// Where and as whom to log in. The password only ever lives here, in memory.
#[derive(Clone)]
pub struct RouterTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    password: String,
}

impl RouterTarget {
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn from_config(config: &Config, password: &str) -> Self {
        Self::new(&config.router_ip, config.port, &config.username, password)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// One authenticated SSH connection to the router.
pub struct RouterSession {
    session: Option<russh::client::Handle<Client>>,
}

impl RouterSession {
    pub async fn connect(target: &RouterTarget, timeout: Duration) -> Result<Self, RouterError> {
        let config = russh::client::Config::default();
        let handler = Client {};
        debug!("Connecting to {} as {}", target.address(), target.username);
        let connecting = russh::client::connect(
            Arc::new(config),
            (target.host.as_str(), target.port),
            handler,
        );
        let mut session = tokio::time::timeout(timeout, connecting)
            .await
            .map_err(|_| RouterError::Timeout(target.address()))??;
        if !session
            .authenticate_password(&target.username, &target.password)
            .await?
        {
            return Err(RouterError::NotAuthenticated(target.username.clone()));
        }
        Ok(Self {
            session: Some(session),
        })
    }

    /// Runs `cmd` on its own exec channel and returns whatever it wrote to stdout.
    pub async fn exec(&mut self, cmd: &str) -> Result<String, RouterError> {
        let session = self
            .session
            .as_mut()
            .ok_or(RouterError::Ssh(russh::Error::Disconnect))?;
        let mut channel = session.channel_open_session().await?;
        channel.exec(true, cmd).await?;
        let mut output: Vec<u8> = Vec::new();
        while let Some(msg) = channel.wait().await {
            match msg {
                russh::ChannelMsg::Data { ref data } => {
                    output.extend_from_slice(data);
                }
                russh::ChannelMsg::ExitStatus { exit_status } => {
                    debug!("{} exited with {}", cmd, exit_status);
                }
                russh::ChannelMsg::Close => {
                    break;
                }
                _ => {}
            }
        }
        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    pub async fn disconnect(&mut self) -> Result<(), RouterError> {
        if let Some(session) = self.session.take() {
            session
                .disconnect(russh::Disconnect::ByApplication, "", "English")
                .await?;
        }
        Ok(())
    }
}

/// Runs single router commands. Implementations must not keep state between calls.
#[async_trait]
pub trait CommandExecutor: Send {
    async fn execute(&mut self, command: &str) -> Result<String, RouterError>;

    /// Like [`CommandExecutor::execute`], but a failure to reach the router becomes `None`.
    async fn safe_execute(&mut self, command: &str) -> Option<String> {
        match self.execute(command).await {
            Ok(output) => Some(output),
            Err(e) => {
                warn!("Command '{}' failed: {}", command, e);
                None
            }
        }
    }
}

/// Opens a fresh SSH session for every command and closes it afterwards.
pub struct SshExecutor {
    target: RouterTarget,
    timeout: Duration,
}

impl SshExecutor {
    pub fn new(target: RouterTarget) -> Self {
        Self {
            target,
            timeout: CONNECT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl CommandExecutor for SshExecutor {
    async fn execute(&mut self, command: &str) -> Result<String, RouterError> {
        let mut session = RouterSession::connect(&self.target, self.timeout).await?;
        debug!("Running '{}' on {}", command, self.target.address());
        let result = session.exec(command).await;
        if let Err(e) = session.disconnect().await {
            debug!("Disconnect from {} failed: {}", self.target.address(), e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ScriptedExecutor;

    #[test]
    fn target_from_config() {
        let config = Config::new("192.168.0.254", "admin", "OpenVPN0");
        let target = RouterTarget::from_config(&config, "secret");
        assert_eq!(target.address(), "192.168.0.254:22");
        assert_eq!(target.username, "admin");
    }

    #[tokio::test]
    async fn safe_execute_hides_connection_failure() {
        let mut executor = ScriptedExecutor::unreachable();
        assert!(executor.safe_execute("show interface").await.is_none());

        let mut executor = ScriptedExecutor::new().respond("show interface", "link: up");
        assert_eq!(
            executor.safe_execute("show interface").await.as_deref(),
            Some("link: up")
        );
    }

    #[tokio::test]
    async fn silent_router_times_out() {
        // Accepts TCP but never sends an SSH banner.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let target = RouterTarget::new("127.0.0.1", port, "admin", "secret");

        let result = RouterSession::connect(&target, Duration::from_millis(200)).await;

        match result {
            Err(RouterError::Timeout(address)) => assert_eq!(address, target.address()),
            Err(e) => panic!("expected a timeout, got {}", e),
            Ok(_) => panic!("expected a timeout, got a session"),
        }
        drop(listener);
    }

    #[tokio::test]
    async fn executor_reports_silent_router_as_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let target = RouterTarget::new("127.0.0.1", port, "admin", "secret");
        let mut executor = SshExecutor::new(target).with_timeout(Duration::from_millis(200));

        assert!(matches!(
            executor.execute("show interface").await,
            Err(RouterError::Timeout(_))
        ));
        assert!(executor.safe_execute("show interface").await.is_none());
        drop(listener);
    }
}
