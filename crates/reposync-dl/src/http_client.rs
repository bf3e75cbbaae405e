//! Process-wide HTTP agent shared by the forge client and downloads.

use std::{
    sync::{LazyLock, RwLock},
    time::Duration,
};

use ureq::Agent;

/// Settings the shared agent is built from.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub user_agent: Option<String>,
    /// Upper bound for a whole request, body included.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: Some(concat!("reposync/", env!("CARGO_PKG_VERSION")).to_string()),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Builds an agent that hands non-2xx responses back instead of erroring,
    /// so callers can report the status along with the URL.
    pub fn build(&self) -> Agent {
        let mut builder = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(self.timeout);
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        builder.build().into()
    }
}

struct Client {
    config: ClientConfig,
    agent: Agent,
}

static CLIENT: LazyLock<RwLock<Client>> = LazyLock::new(|| {
    let config = ClientConfig::default();
    RwLock::new(Client {
        agent: config.build(),
        config,
    })
});

/// Returns a handle to the shared agent. Handles share one connection pool.
pub fn agent() -> Agent {
    CLIENT
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .agent
        .clone()
}

/// Applies `update` to the current settings and rebuilds the shared agent.
///
/// ```
/// use reposync_dl::http_client::configure_http_client;
///
/// configure_http_client(|cfg| cfg.user_agent = Some("mirror-bot/2".into()));
/// ```
pub fn configure_http_client<F>(update: F)
where
    F: FnOnce(&mut ClientConfig),
{
    let mut client = CLIENT
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let mut config = client.config.clone();
    update(&mut config);
    client.agent = config.build();
    client.config = config;
}
