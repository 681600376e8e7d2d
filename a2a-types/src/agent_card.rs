//! Agent discovery types, served at `/.well-known/agent.json`.

use serde::{Deserialize, Serialize};

/// Transports an agent can be reached over.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransportProtocol {
    #[default]
    #[serde(rename = "JSONRPC")]
    JsonRpc,
    #[serde(rename = "GRPC")]
    Grpc,
    #[serde(rename = "HTTP+JSON")]
    HttpJson,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentInterface {
    pub transport: TransportProtocol,
    pub url: String,
}

/// Optional protocol features an agent supports.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    /// `message/stream` and `tasks/resubscribe` are available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,
    /// Push notification configs can be stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_transition_history: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentProvider {
    pub organization: String,
    pub url: String,
}

/// Something the agent can do, advertised for discovery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_modes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_modes: Vec<String>,
}

impl AgentSkill {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            examples: Vec::new(),
            input_modes: Vec::new(),
            output_modes: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn add_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn add_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }
}

/// Self-describing manifest of an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub version: String,
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
    /// Endpoint that accepts JSON-RPC requests.
    pub url: String,
    #[serde(default)]
    pub preferred_transport: TransportProtocol,
    pub capabilities: AgentCapabilities,
    pub default_input_modes: Vec<String>,
    pub default_output_modes: Vec<String>,
    pub skills: Vec<AgentSkill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<AgentProvider>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_interfaces: Vec<AgentInterface>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

fn default_protocol_version() -> String {
    crate::PROTOCOL_VERSION.to_string()
}

impl AgentCard {
    /// A card with text-only modes, no skills and no optional capabilities.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: version.into(),
            protocol_version: default_protocol_version(),
            url: url.into(),
            preferred_transport: TransportProtocol::default(),
            capabilities: AgentCapabilities::default(),
            default_input_modes: vec!["text/plain".to_string()],
            default_output_modes: vec!["text/plain".to_string()],
            skills: Vec::new(),
            provider: None,
            additional_interfaces: Vec::new(),
            documentation_url: None,
            icon_url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.capabilities.streaming = Some(enabled);
        self
    }

    pub fn with_push_notifications(mut self, enabled: bool) -> Self {
        self.capabilities.push_notifications = Some(enabled);
        self
    }

    pub fn with_provider(mut self, organization: impl Into<String>, url: impl Into<String>) -> Self {
        self.provider = Some(AgentProvider {
            organization: organization.into(),
            url: url.into(),
        });
        self
    }

    pub fn add_skill(mut self, skill: AgentSkill) -> Self {
        self.skills.push(skill);
        self
    }

    /// Builds a skill in place and adds it.
    pub fn add_skill_with<F>(mut self, id: impl Into<String>, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(AgentSkill) -> AgentSkill,
    {
        self.skills.push(f(AgentSkill::new(id, name)));
        self
    }

    pub fn add_interface(mut self, transport: TransportProtocol, url: impl Into<String>) -> Self {
        self.additional_interfaces.push(AgentInterface {
            transport,
            url: url.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_card_builder() {
        let card = AgentCard::new("Echo", "Repeats input", "1.0.0", "http://localhost:3000")
            .with_streaming(true)
            .with_provider("Example Org", "https://example.org")
            .add_skill_with("echo", "Echo", |skill| {
                skill.with_description("Echoes text back").add_tag("demo")
            });

        assert_eq!(card.protocol_version, crate::PROTOCOL_VERSION);
        assert_eq!(card.capabilities.streaming, Some(true));
        assert_eq!(card.skills.len(), 1);
        assert_eq!(card.skills[0].tags, vec!["demo".to_string()]);
    }

    #[test]
    fn test_card_wire_names() {
        let card = AgentCard::new("Echo", "", "0.1.0", "http://a")
            .with_push_notifications(false)
            .add_interface(TransportProtocol::HttpJson, "http://a/rest");
        let value = serde_json::to_value(&card).unwrap();

        assert_eq!(value["protocolVersion"], json!("0.3.0"));
        assert_eq!(value["preferredTransport"], json!("JSONRPC"));
        assert_eq!(value["capabilities"]["pushNotifications"], json!(false));
        assert_eq!(value["additionalInterfaces"][0]["transport"], json!("HTTP+JSON"));
        assert_eq!(value["defaultInputModes"], json!(["text/plain"]));
    }

    #[test]
    fn test_card_parses_without_optional_fields() {
        let card: AgentCard = serde_json::from_value(json!({
            "name": "Minimal",
            "description": "d",
            "version": "1",
            "url": "http://x",
            "capabilities": {},
            "defaultInputModes": [],
            "defaultOutputModes": [],
            "skills": []
        }))
        .unwrap();
        assert_eq!(card.protocol_version, "0.3.0");
        assert_eq!(card.preferred_transport, TransportProtocol::JsonRpc);
    }
}
