//! Sensitive action classification
//!
//! An action's function name maps to a proposal type; the type decides
//! whether the action is sensitive and which warning copy applies.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use proposal_actions_core::DecodedAction;

/// Warning key used for actions that could not be decoded.
pub const CANNOT_DECODE_WARNING: &str = "ERROR_CANNOT_DECODE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassifierConfig {
    /// Proposal type -> sensitive flag.
    pub sensitive_proposal_types: HashMap<String, bool>,
    /// Function name -> proposal type it belongs to.
    pub action_to_proposal_type: HashMap<String, String>,
    /// Proposal type -> warning copy.
    pub proposal_type_warnings: HashMap<String, String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let sensitive_proposal_types = [
            ("ADD_SHAMAN", true),
            ("TOKEN_SETTINGS", true),
            ("UPDATE_GOV_SETTINGS", true),
            ("GUILDKICK", true),
            ("SAFE_MODULES", true),
            ("SAFE_OWNERS", true),
            ("ISSUE", false),
        ];
        let action_to_proposal_type = [
            ("setShamans", "ADD_SHAMAN"),
            ("setAdminConfig", "TOKEN_SETTINGS"),
            ("setGovernanceConfig", "UPDATE_GOV_SETTINGS"),
            ("lockAdmin", "UPDATE_GOV_SETTINGS"),
            ("lockManager", "UPDATE_GOV_SETTINGS"),
            ("lockGovernor", "UPDATE_GOV_SETTINGS"),
            ("mintShares", "ISSUE"),
            ("mintLoot", "ISSUE"),
            ("burnShares", "GUILDKICK"),
            ("burnLoot", "GUILDKICK"),
            ("enableModule", "SAFE_MODULES"),
            ("disableModule", "SAFE_MODULES"),
            ("addOwnerWithThreshold", "SAFE_OWNERS"),
            ("removeOwner", "SAFE_OWNERS"),
            ("swapOwner", "SAFE_OWNERS"),
            ("changeThreshold", "SAFE_OWNERS"),
        ];
        let proposal_type_warnings = [
            (
                "ADD_SHAMAN",
                "This proposal grants shaman permissions. Shamans can mint and burn shares and loot or change DAO settings without a vote.",
            ),
            (
                "TOKEN_SETTINGS",
                "This proposal changes whether shares and loot are transferable.",
            ),
            (
                "UPDATE_GOV_SETTINGS",
                "This proposal changes governance settings such as voting period, grace period or quorum.",
            ),
            ("GUILDKICK", "This proposal burns member shares or loot."),
            (
                "SAFE_MODULES",
                "This proposal changes the modules enabled on a DAO vault. Modules can move vault funds without a vote.",
            ),
            (
                "SAFE_OWNERS",
                "This proposal changes the owners or signing threshold of a DAO vault.",
            ),
            (
                CANNOT_DECODE_WARNING,
                "One or more actions could not be decoded. Review the raw transaction data before voting.",
            ),
        ];

        Self {
            sensitive_proposal_types: sensitive_proposal_types
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v))
                .collect(),
            action_to_proposal_type: action_to_proposal_type
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
            proposal_type_warnings: proposal_type_warnings
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub sensitive: bool,
    pub warning: Option<String>,
    /// Proposal type the action's function belongs to.
    pub action_type: Option<String>,
    /// Sensitive action whose type differs from the proposal's declared type.
    pub type_mismatch: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn classify(&self, proposal_type: &str, action: &DecodedAction) -> Classification {
        let name = match action {
            DecodedAction::DecodeError(_) => {
                return Classification {
                    sensitive: true,
                    warning: self.warning(CANNOT_DECODE_WARNING),
                    action_type: None,
                    type_mismatch: false,
                };
            }
            DecodedAction::Decoded(call) => call.name.as_str(),
        };

        let Some(action_type) = self.config.action_to_proposal_type.get(name) else {
            return Classification::default();
        };

        let sensitive = self
            .config
            .sensitive_proposal_types
            .get(action_type)
            .copied()
            .unwrap_or(false);

        Classification {
            sensitive,
            warning: if sensitive { self.warning(action_type) } else { None },
            action_type: Some(action_type.clone()),
            type_mismatch: sensitive && action_type != proposal_type,
        }
    }

    /// Banner copy for the proposal as a whole.
    pub fn proposal_warning(&self, proposal_type: &str, had_decode_error: bool) -> Option<String> {
        if had_decode_error {
            return self.warning(CANNOT_DECODE_WARNING);
        }
        let sensitive = self
            .config
            .sensitive_proposal_types
            .get(proposal_type)
            .copied()
            .unwrap_or(false);
        if sensitive {
            self.warning(proposal_type)
        } else {
            None
        }
    }

    fn warning(&self, key: &str) -> Option<String> {
        self.config.proposal_type_warnings.get(key).cloned()
    }
}
