//! Human and JSON views of a decoded proposal

use std::io::{self, Write};

use alloy::primitives::{hex, Address};
use serde::Serialize;

use proposal_actions_core::{
    DecodedAction, DecodedParam, Network, Operation, ParamValue, ProposalActions, ProposalRecord,
};
use proposal_actions_decode::{
    format_native, render, Classification, Classifier, RenderOptions, Rendered, RenderedField,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalReport {
    pub proposal_id: String,
    pub proposal_type: String,
    pub network: String,
    pub tx_url: Option<String>,
    /// Proposal-level banner.
    pub warning: Option<String>,
    pub had_decode_error: bool,
    pub actions: Vec<ActionReport>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionReport {
    pub index: usize,
    pub name: String,
    pub label: Option<String>,
    pub target: Option<Rendered>,
    pub value: Option<String>,
    pub delegate_call: bool,
    pub params: Vec<RenderedField>,
    pub classification: Classification,
    pub error: Option<String>,
    pub raw_data: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<ActionReport>,
}

pub fn build_report(
    proposal: &ProposalRecord,
    network: &Network,
    actions: &ProposalActions,
    classifier: &Classifier,
    options: &RenderOptions,
) -> ProposalReport {
    let reporter = Reporter {
        proposal_type: &proposal.proposal_type,
        network,
        classifier,
        options,
    };

    ProposalReport {
        proposal_id: proposal.proposal_id.clone(),
        proposal_type: proposal.proposal_type.clone(),
        network: network.name.to_owned(),
        tx_url: (!proposal.tx_hash.trim().is_empty()).then(|| network.tx_url(&proposal.tx_hash)),
        warning: classifier.proposal_warning(&proposal.proposal_type, actions.had_decode_error),
        had_decode_error: actions.had_decode_error,
        actions: reporter.actions(&actions.actions),
    }
}

struct Reporter<'a> {
    proposal_type: &'a str,
    network: &'a Network,
    classifier: &'a Classifier,
    options: &'a RenderOptions,
}

impl Reporter<'_> {
    fn actions(&self, actions: &[DecodedAction]) -> Vec<ActionReport> {
        actions
            .iter()
            .enumerate()
            .map(|(index, action)| self.action(index, action))
            .collect()
    }

    fn action(&self, index: usize, action: &DecodedAction) -> ActionReport {
        let classification = self.classifier.classify(self.proposal_type, action);
        match action {
            DecodedAction::Decoded(call) => ActionReport {
                index,
                name: call.name.clone(),
                label: call.label.clone(),
                target: Some(self.address(call.to)),
                value: (!call.value.is_zero()).then(|| format_native(call.value, self.network)),
                delegate_call: call.operation == Operation::DelegateCall,
                params: call
                    .params
                    .iter()
                    .map(|param| RenderedField {
                        name: param.name.clone(),
                        ty: param.ty.clone(),
                        rendered: render(param, Some(self.network), self.options),
                    })
                    .collect(),
                classification,
                error: None,
                raw_data: None,
                nested: self.actions(&call.nested),
            },
            DecodedAction::DecodeError(err) => ActionReport {
                index,
                name: "Decode error".to_owned(),
                label: None,
                target: err.to.map(|to| self.address(to)),
                value: err
                    .value
                    .filter(|v| !v.is_zero())
                    .map(|v| format_native(v, self.network)),
                delegate_call: false,
                params: vec![],
                classification,
                error: Some(err.message.clone()),
                raw_data: Some(format!("0x{}", hex::encode(&err.data))),
                nested: vec![],
            },
        }
    }

    fn address(&self, address: Address) -> Rendered {
        let param = DecodedParam {
            name: String::new(),
            ty: "address".to_owned(),
            value: ParamValue::Address(address),
        };
        render(&param, Some(self.network), self.options)
    }
}

/// Plain-text report.
pub fn write_text(report: &ProposalReport, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "Proposal {} ({}) on {}",
        report.proposal_id, report.proposal_type, report.network
    )?;
    if let Some(url) = &report.tx_url {
        writeln!(out, "  tx: {url}")?;
    }
    if let Some(warning) = &report.warning {
        writeln!(out, "  WARNING: {warning}")?;
    }
    writeln!(out)?;
    for action in &report.actions {
        write_action(action, 0, out)?;
    }
    Ok(())
}

fn write_action(action: &ActionReport, depth: usize, out: &mut impl Write) -> io::Result<()> {
    let pad = "  ".repeat(depth);
    let mut title = format!("{pad}Action {}: {}", action.index + 1, action.name);
    if let Some(label) = &action.label {
        title.push_str(&format!(" [{label}]"));
    }
    if action.classification.sensitive {
        title.push_str(" (sensitive)");
    }
    writeln!(out, "{title}")?;

    if let Some(target) = &action.target {
        writeln!(out, "{pad}  target: {}", target.to_display_string())?;
    }
    if let Some(value) = &action.value {
        writeln!(out, "{pad}  value: {value}")?;
    }
    if action.delegate_call {
        writeln!(out, "{pad}  operation: delegatecall")?;
    }
    for param in &action.params {
        writeln!(
            out,
            "{pad}  {} ({}): {}",
            param.name,
            param.ty,
            param.rendered.to_display_string()
        )?;
    }
    if let Some(error) = &action.error {
        writeln!(out, "{pad}  error: {error}")?;
    }
    if let Some(raw) = &action.raw_data {
        writeln!(out, "{pad}  data: {raw}")?;
    }
    if let Some(warning) = &action.classification.warning {
        writeln!(out, "{pad}  ! {warning}")?;
    }
    if action.classification.type_mismatch {
        writeln!(
            out,
            "{pad}  ! action type {} differs from the proposal type",
            action.classification.action_type.as_deref().unwrap_or("?")
        )?;
    }
    for nested in &action.nested {
        write_action(nested, depth + 1, out)?;
    }
    Ok(())
}
