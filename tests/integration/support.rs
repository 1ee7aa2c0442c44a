/// Scripted provider shared by the integration tests
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use mcp_subfinder_server::*;

/// One scripted provider response
#[derive(Debug, Clone)]
pub enum Reply {
    Hosts(Vec<&'static str>),
    Fail(&'static str),
}

/// Provider answering from a per-domain queue of replies.
///
/// The last reply for a domain repeats once the queue is drained; unknown
/// domains get an empty result.
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<(String, u64)>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, domain: &str, reply: Reply) -> Self {
        self.script
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Domains queried so far, with the timeout each call received
    pub fn calls(&self) -> Vec<(String, u64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubdomainProvider for ScriptedProvider {
    async fn enumerate(
        &self,
        _ctx: &EnumerationContext,
        domain: &str,
        options: &ProviderOptions,
    ) -> Result<ResultSet, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((domain.to_string(), options.timeout_secs));

        let reply = {
            let mut script = self.script.lock().unwrap();
            match script.get_mut(domain) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Hosts(hosts)) => Ok(hosts
                .into_iter()
                .map(|host| (host.to_string(), BTreeSet::from(["scripted".to_string()])))
                .collect()),
            Some(Reply::Fail(message)) => Err(ProviderError::Other(message.to_string())),
            None => Ok(ResultSet::new()),
        }
    }
}
