//! Action payloads produced by the demo commands.
//!
//! Every field is always emitted, zero values included.

use serde::Serialize;

/// Options owned by the root command, shared by every action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GlobalOptions {
    pub region: String,
    pub profile: String,
    pub dry_run: bool,
}

/// Fully resolved request, serialised as one JSON object tagged by `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    /// Launch a demo host
    Up {
        #[serde(flatten)]
        globals: GlobalOptions,
        instance_type: String,
        spot: bool,
        ssm: bool,
        run_id: String,
    },
    /// Terminate a demo host
    Down {
        #[serde(flatten)]
        globals: GlobalOptions,
    },
    /// Show active runs
    List {
        #[serde(flatten)]
        globals: GlobalOptions,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Up { .. } => "up",
            Action::Down { .. } => "down",
            Action::List { .. } => "list",
        }
    }

    pub fn globals(&self) -> &GlobalOptions {
        match self {
            Action::Up { globals, .. } | Action::Down { globals } | Action::List { globals } => {
                globals
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_down_emits_zero_values() {
        let action = Action::Down {
            globals: GlobalOptions {
                region: "us-east-1".into(),
                ..Default::default()
            },
        };

        let value: serde_json::Value = serde_json::from_str(&action.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"action": "down", "region": "us-east-1", "profile": "", "dry_run": false})
        );
    }

    #[test]
    fn test_up_field_order() {
        let action = Action::Up {
            globals: GlobalOptions::default(),
            instance_type: "t3.micro".into(),
            spot: true,
            ssm: false,
            run_id: "123".into(),
        };

        assert_eq!(
            action.to_json().unwrap(),
            r#"{"action":"up","region":"","profile":"","dry_run":false,"instance_type":"t3.micro","spot":true,"ssm":false,"run_id":"123"}"#
        );
        assert_eq!(action.name(), "up");
    }
}
