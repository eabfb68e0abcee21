use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use vibecoder::agent::Agent as VibeAgent;
use vibecoder::models::message::AgentMessage;
use vibecoder::prompt_template::{analyst_prompt, swe_prompt};
use vibecoder::providers::anthropic::AnthropicProvider;
use vibecoder::providers::configs::{AnthropicProviderConfig, OpenAiProviderConfig};
use vibecoder::providers::openai::OpenAiProvider;
use vibecoder::tools::{analyst_tools, developer_tools};

use crate::agents::agent::Agent;
use crate::agents::mock_agent::MockAgent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Swe,
    Anthropic,
    Analyst,
    Mock,
}

impl Role {
    /// Comma separated list of every role name
    pub fn names() -> String {
        Role::iter()
            .map(|role| role.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Label shown in front of the role's responses
    pub fn speaker(&self) -> String {
        self.to_string().to_uppercase()
    }
}

pub type AgentFactory = Box<dyn Fn(Role) -> Result<Box<dyn Agent>> + Send>;

/// Build the agent behind `role`, working on files under `root`
pub fn build_agent(role: Role, root: &Path, history: Vec<AgentMessage>) -> Result<Box<dyn Agent>> {
    let agent: Box<dyn Agent> = match role {
        Role::Swe => {
            let provider = OpenAiProvider::new(OpenAiProviderConfig::from_env())?;
            let model = provider.default_model().to_string();
            let tools = developer_tools(root);
            let prompt = swe_prompt(&tools)?;
            Box::new(VibeAgent::new(Box::new(provider), tools, prompt, model).with_history(history))
        }
        Role::Anthropic => {
            let provider = AnthropicProvider::new(AnthropicProviderConfig::from_env())?;
            let model = provider.default_model().to_string();
            let tools = developer_tools(root);
            let prompt = swe_prompt(&tools)?;
            Box::new(VibeAgent::new(Box::new(provider), tools, prompt, model).with_history(history))
        }
        Role::Analyst => {
            let provider = OpenAiProvider::new(OpenAiProviderConfig::from_env())?;
            let model = provider.default_model().to_string();
            let tools = analyst_tools(root);
            let prompt = analyst_prompt(&tools)?;
            Box::new(VibeAgent::new(Box::new(provider), tools, prompt, model).with_history(history))
        }
        Role::Mock => Box::new(MockAgent::new()),
    };
    Ok(agent)
}

/// Factory used after startup: every role gets a fresh history
pub fn default_factory(root: PathBuf) -> AgentFactory {
    Box::new(move |role| build_agent(role, &root, Vec::new()))
}

/// Agents by role, built on first use and kept for the rest of the session
pub struct RoleRegistry {
    factory: AgentFactory,
    agents: HashMap<Role, Box<dyn Agent>>,
    active: Role,
}

impl RoleRegistry {
    pub fn new(active: Role, agent: Box<dyn Agent>, factory: AgentFactory) -> Self {
        let mut agents = HashMap::new();
        agents.insert(active, agent);
        Self {
            factory,
            agents,
            active,
        }
    }

    pub fn active(&self) -> Role {
        self.active
    }

    pub fn agent(&mut self) -> Result<&mut (dyn Agent + 'static)> {
        let active = self.active;
        self.agents
            .get_mut(&active)
            .map(|agent| &mut **agent)
            .ok_or_else(|| anyhow!("No agent registered for role {}", active))
    }

    #[cfg(test)]
    pub fn is_built(&self, role: Role) -> bool {
        self.agents.contains_key(&role)
    }

    /// Make `role` the active one, building its agent if this is the first use.
    /// A failed build leaves the current role active.
    pub fn activate(&mut self, role: Role) -> Result<()> {
        if !self.agents.contains_key(&role) {
            let agent = (self.factory)(role)?;
            tracing::debug!(%role, "constructed agent");
            self.agents.insert(role, agent);
        }
        self.active = role;
        Ok(())
    }
}
