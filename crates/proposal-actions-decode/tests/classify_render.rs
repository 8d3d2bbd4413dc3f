mod common;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, Bytes, U256};

use common::{encode_call, mainnet, recipient};
use proposal_actions_core::{
    network, ActionError, DecodedAction, DecodedParam, ParamValue, RawCall,
};
use proposal_actions_decode::{
    render, render_value, Classifier, Decoder, RenderOptions, Rendered,
};

fn set_shamans_action() -> DecodedAction {
    let data = encode_call(
        "setShamans(address[] _shamans, uint256[] _permissions)",
        &[
            DynSolValue::Array(vec![DynSolValue::Address(recipient())]),
            DynSolValue::Array(vec![DynSolValue::Uint(U256::from(7u8), 256)]),
        ],
    );
    let call = RawCall::new(0, common::dao(), U256::ZERO, data);
    Decoder::default().decode(mainnet(), &call, None)
}

#[test]
fn unmapped_action_is_not_sensitive() {
    let classifier = Classifier::default();
    let data = encode_call(
        "post(string content, string tag)",
        &[
            DynSolValue::String("gm".to_owned()),
            DynSolValue::String("daohaus.proposal".to_owned()),
        ],
    );
    let call = RawCall::new(0, common::dao(), U256::ZERO, data);
    let action = Decoder::default().decode(mainnet(), &call, None);

    let result = classifier.classify("SIGNAL", &action);
    assert!(!result.sensitive);
    assert!(result.warning.is_none());
    assert!(result.action_type.is_none());
}

#[test]
fn decode_error_is_sensitive() {
    let action = DecodedAction::DecodeError(ActionError {
        message: "Unknown action".to_owned(),
        to: None,
        value: None,
        data: Bytes::new(),
    });
    let result = Classifier::default().classify("SIGNAL", &action);
    assert!(result.sensitive);
    assert!(result.warning.is_some());
}

#[test]
fn shaman_change_is_sensitive_and_flags_type_mismatch() {
    let classifier = Classifier::default();
    let action = set_shamans_action();
    assert_eq!(action.name(), Some("setShamans"));

    let declared = classifier.classify("ADD_SHAMAN", &action);
    assert!(declared.sensitive);
    assert_eq!(declared.action_type.as_deref(), Some("ADD_SHAMAN"));
    assert!(!declared.type_mismatch);

    let hidden = classifier.classify("SIGNAL", &action);
    assert!(hidden.sensitive);
    assert!(hidden.type_mismatch);
}

#[test]
fn shaman_array_params_render_as_lists() {
    let action = set_shamans_action();
    let decoded = action.as_decoded().expect("decoded");
    let rendered = render(&decoded.params[0], Some(mainnet()), &RenderOptions::default());

    match rendered {
        Rendered::List { items } => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].name, "_shamans[0]");
            assert_eq!(items[0].ty, "address");
        }
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn address_links_to_network_explorer() {
    let gnosis = network("0x64").expect("gnosis");
    let param = DecodedParam {
        name: "to".to_owned(),
        ty: "address".to_owned(),
        value: ParamValue::Address(recipient()),
    };

    match render(&param, Some(gnosis), &RenderOptions::default()) {
        Rendered::Address {
            explorer_url,
            checksum,
            ..
        } => {
            assert_eq!(
                explorer_url.as_deref(),
                Some(format!("https://gnosisscan.io/address/{checksum}").as_str())
            );
        }
        other => panic!("expected address, got {other:?}"),
    }
}

#[test]
fn truncation_options_apply() {
    let options = RenderOptions {
        truncate_addresses: true,
        max_bytes_chars: 10,
        ..Default::default()
    };
    let address: Address = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045"
        .parse()
        .expect("address");
    let rendered = render_value("address", &address.to_string(), None, &options);
    assert_eq!(rendered.to_display_string(), "0xd8dA…6045");

    match render_value("bytes", "0x0123456789abcdef", None, &options) {
        Rendered::Bytes {
            display, truncated, ..
        } => {
            assert!(truncated);
            assert_eq!(display, "0x01234567…");
        }
        other => panic!("expected bytes, got {other:?}"),
    }
}

#[test]
fn non_amount_uint_is_not_scaled() {
    let param = DecodedParam {
        name: "_threshold".to_owned(),
        ty: "uint256".to_owned(),
        value: ParamValue::Uint(U256::from(2u8)),
    };
    assert_eq!(
        render(&param, None, &RenderOptions::default()),
        Rendered::Number {
            raw: "2".to_owned(),
            formatted: None,
        }
    );
}

#[test]
fn string_params_render_as_text() {
    let options = RenderOptions {
        max_bytes_chars: 5,
        ..Default::default()
    };
    let short = DecodedParam {
        name: "tag".to_owned(),
        ty: "string".to_owned(),
        value: ParamValue::String("gm".to_owned()),
    };
    let json = serde_json::to_value(render(&short, None, &options)).unwrap();
    assert_eq!(json["kind"], "text");
    assert_eq!(json["value"], "gm");
    assert!(json.get("full").is_none());

    let long = DecodedParam {
        value: ParamValue::String("daohaus.proposal".to_owned()),
        ..short
    };
    assert_eq!(
        render(&long, None, &options),
        Rendered::Text {
            value: "daoha…".to_owned(),
            full: Some("daohaus.proposal".to_owned()),
        }
    );
}

#[test]
fn render_value_parses_signed_ints() {
    let options = RenderOptions::default();
    assert_eq!(
        render_value("int256", "-42", None, &options),
        Rendered::Number {
            raw: "-42".to_owned(),
            formatted: None,
        }
    );
    assert_eq!(
        render_value("int8", "nope", None, &options),
        Rendered::text("nope")
    );
    assert_eq!(
        render_value("(address,uint256)", "(0x01, 2)", None, &options),
        Rendered::text("(0x01, 2)")
    );
}
