mod common;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Bytes, U256};

use common::{
    encode_call, mainnet, multisend_call, recipient, token, transfer_call, ONE_TOKEN,
};
use proposal_actions_core::{
    DecodedAction, Operation, ParamValue, RawCall, SubActionMeta, ETH_TRANSFER_ACTION,
    UNKNOWN_ACTION_MESSAGE,
};
use proposal_actions_decode::{render, split, Decoder, RenderOptions, Rendered};

#[test]
fn erc20_transfer_decodes_and_renders_one_token() {
    let decoder = Decoder::default();
    let data = transfer_call(recipient(), U256::from(ONE_TOKEN));
    let call = RawCall::new(0, token(), U256::ZERO, data);

    let action = decoder.decode(mainnet(), &call, None);
    let decoded = action.as_decoded().expect("transfer decodes");
    assert_eq!(decoded.name, "transfer");
    assert_eq!(decoded.signature, "transfer(address,uint256)");
    assert_eq!(decoded.to, token());

    let names: Vec<&str> = decoded.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["to", "amount"]);
    assert_eq!(decoded.params[0].value, ParamValue::Address(recipient()));

    let rendered = render(&decoded.params[1], Some(mainnet()), &RenderOptions::default());
    assert_eq!(
        rendered,
        Rendered::Number {
            raw: ONE_TOKEN.to_string(),
            formatted: Some("1.0".to_owned()),
        }
    );
}

#[test]
fn unknown_selector_keeps_raw_data() {
    let decoder = Decoder::default();
    let data = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]);
    let call = RawCall::new(0, token(), U256::from(5u8), data.clone());

    match decoder.decode(mainnet(), &call, None) {
        DecodedAction::DecodeError(err) => {
            assert_eq!(err.message, UNKNOWN_ACTION_MESSAGE);
            assert_eq!(err.data, data);
            assert_eq!(err.to, Some(token()));
            assert_eq!(err.value, Some(U256::from(5u8)));
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn truncated_arguments_become_decode_error() {
    let decoder = Decoder::default();
    let mut data = transfer_call(recipient(), U256::from(1u8)).to_vec();
    data.truncate(20);
    let call = RawCall::new(0, token(), U256::ZERO, data.into());

    let action = decoder.decode(mainnet(), &call, None);
    assert!(action.is_error());
}

#[test]
fn decoding_is_total_over_odd_inputs() {
    let decoder = Decoder::default();
    let inputs: Vec<Vec<u8>> = vec![
        vec![0x01],
        vec![0xa9, 0x05, 0x9c],
        vec![0xa9, 0x05, 0x9c, 0xbb],
        vec![0x8d, 0x80, 0xff, 0x0a, 0xff],
        vec![0u8; 300],
    ];
    for data in inputs {
        let call = RawCall::new(0, token(), U256::ZERO, data.into());
        // Must return a value, never panic
        let _ = decoder.decode(mainnet(), &call, None);
    }
}

#[test]
fn empty_calldata_is_eth_transfer() {
    let decoder = Decoder::default();
    let value = U256::from(ONE_TOKEN / 2);
    let call = RawCall::new(0, recipient(), value, Bytes::new());

    let action = decoder.decode(mainnet(), &call, None);
    let decoded = action.as_decoded().expect("eth transfer");
    assert_eq!(decoded.name, ETH_TRANSFER_ACTION);
    assert_eq!(decoded.value, value);
    assert!(decoded.params.is_empty());
}

#[test]
fn multisend_proposal_splits_in_order() {
    let data = multisend_call(&[
        (0, token(), U256::ZERO, transfer_call(recipient(), U256::from(1u8))),
        (0, recipient(), U256::from(7u8), Bytes::new()),
        (1, token(), U256::ZERO, Bytes::from(vec![0x12, 0x34, 0x56, 0x78])),
    ]);

    let calls = split(mainnet(), &data, common::dao(), None);
    assert_eq!(calls.len(), 3);
    for (i, (call, meta)) in calls.iter().enumerate() {
        assert_eq!(call.index, i);
        assert!(meta.is_none());
    }
    assert_eq!(calls[1].0.value, U256::from(7u8));
    assert_eq!(calls[2].0.operation, Operation::DelegateCall);

    let decoder = Decoder::default();
    let actions: Vec<DecodedAction> = calls
        .iter()
        .map(|(call, meta)| decoder.decode(mainnet(), call, *meta))
        .collect();
    assert_eq!(actions[0].name(), Some("transfer"));
    assert_eq!(actions[1].name(), Some(ETH_TRANSFER_ACTION));
    assert!(actions[2].is_error());
}

#[test]
fn metadata_count_mismatch_is_ignored() {
    let data = multisend_call(&[
        (0, token(), U256::ZERO, transfer_call(recipient(), U256::from(1u8))),
        (0, token(), U256::ZERO, transfer_call(recipient(), U256::from(2u8))),
    ]);
    let meta = vec![SubActionMeta {
        label: Some("Pay contributor".to_owned()),
        method: "transfer".to_owned(),
        abi: vec![],
    }];

    let calls = split(mainnet(), &data, common::dao(), Some(&meta));
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|(_, m)| m.is_none()));
}

#[test]
fn metadata_labels_matching_calls() {
    let data = multisend_call(&[
        (0, token(), U256::ZERO, transfer_call(recipient(), U256::from(1u8))),
        (0, token(), U256::ZERO, transfer_call(recipient(), U256::from(2u8))),
    ]);
    let meta = vec![
        SubActionMeta {
            label: Some("First".to_owned()),
            method: "transfer".to_owned(),
            abi: vec![],
        },
        SubActionMeta {
            label: Some("Second".to_owned()),
            method: "transfer".to_owned(),
            abi: vec![],
        },
    ];

    let decoder = Decoder::default();
    let labels: Vec<Option<String>> = split(mainnet(), &data, common::dao(), Some(&meta))
        .iter()
        .map(|(call, meta)| {
            decoder
                .decode(mainnet(), call, *meta)
                .as_decoded()
                .and_then(|d| d.label.clone())
        })
        .collect();
    assert_eq!(labels, [Some("First".to_owned()), Some("Second".to_owned())]);
}

#[test]
fn metadata_abi_decodes_unregistered_selector() {
    let data = encode_call(
        "claim(uint256 round, address beneficiary)",
        &[DynSolValue::Uint(U256::from(3u8), 256), DynSolValue::Address(recipient())],
    );
    let meta = SubActionMeta {
        label: None,
        method: "claim".to_owned(),
        abi: vec!["function claim(uint256 round, address beneficiary)".to_owned()],
    };
    let call = RawCall::new(0, token(), U256::ZERO, data);

    let decoder = Decoder::default();
    assert!(decoder.decode(mainnet(), &call, None).is_error());

    let action = decoder.decode(mainnet(), &call, Some(&meta));
    let decoded = action.as_decoded().expect("decoded via metadata abi");
    assert_eq!(decoded.name, "claim");
    assert_eq!(decoded.params[0].name, "round");
    assert_eq!(decoded.params[0].value, ParamValue::Uint(U256::from(3u8)));
}

#[test]
fn tuple_array_params_decode_and_render_recursively() {
    let data = encode_call(
        "pay((address,uint256)[] items)",
        &[DynSolValue::Array(vec![DynSolValue::Tuple(vec![
            DynSolValue::Address(recipient()),
            DynSolValue::Uint(U256::from(ONE_TOKEN), 256),
        ])])],
    );
    let meta = SubActionMeta {
        label: None,
        method: "pay".to_owned(),
        abi: vec!["function pay((address,uint256)[] items)".to_owned()],
    };
    let call = RawCall::new(0, common::dao(), U256::ZERO, data);

    let action = Decoder::default().decode(mainnet(), &call, Some(&meta));
    let decoded = action.as_decoded().expect("decoded via metadata abi");
    let items = &decoded.params[0];
    assert_eq!(items.name, "items");
    assert_eq!(items.ty, "(address,uint256)[]");

    let ParamValue::Array(elements) = &items.value else {
        panic!("expected array, got {:?}", items.value);
    };
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].name, "items[0]");
    assert_eq!(elements[0].ty, "(address,uint256)");

    let ParamValue::Tuple(fields) = &elements[0].value else {
        panic!("expected tuple, got {:?}", elements[0].value);
    };
    let shape: Vec<(&str, &str)> = fields
        .iter()
        .map(|f| (f.name.as_str(), f.ty.as_str()))
        .collect();
    assert_eq!(shape, [("0", "address"), ("1", "uint256")]);
    assert_eq!(fields[0].value, ParamValue::Address(recipient()));
    assert_eq!(fields[1].value, ParamValue::Uint(U256::from(ONE_TOKEN)));

    match render(items, Some(mainnet()), &RenderOptions::default()) {
        Rendered::List { items } => match &items[0].rendered {
            Rendered::List { items: fields } => {
                assert_eq!(fields.len(), 2);
                assert!(matches!(fields[0].rendered, Rendered::Address { .. }));
                assert_eq!(fields[1].rendered.to_display_string(), ONE_TOKEN.to_string());
            }
            other => panic!("expected nested list, got {other:?}"),
        },
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn malformed_envelope_falls_back_to_single_call() {
    let mut data = multisend_call(&[(0, token(), U256::ZERO, Bytes::new())]).to_vec();
    data.truncate(data.len() - 40);

    let calls = split(mainnet(), &data, common::dao(), None);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.to, common::dao());
    assert_eq!(calls[0].0.data.to_vec(), data);
}

#[test]
fn execute_as_baal_expands_nested_multisend() {
    let inner = multisend_call(&[
        (0, token(), U256::ZERO, transfer_call(recipient(), U256::from(ONE_TOKEN))),
        (0, recipient(), U256::from(1u8), Bytes::new()),
    ]);
    let data = encode_call(
        "executeAsBaal(address _to, uint256 _value, bytes _data)",
        &[
            DynSolValue::Address(common::dao()),
            DynSolValue::Uint(U256::ZERO, 256),
            DynSolValue::Bytes(inner.to_vec()),
        ],
    );
    let call = RawCall::new(0, common::dao(), U256::ZERO, data);

    let action = Decoder::default().decode(mainnet(), &call, None);
    let outer = action.as_decoded().expect("executeAsBaal decodes");
    assert_eq!(outer.name, "executeAsBaal");
    assert_eq!(outer.nested.len(), 1);

    let multisend = outer.nested[0].as_decoded().expect("inner multiSend decodes");
    assert_eq!(multisend.name, "multiSend");
    let names: Vec<Option<&str>> = multisend.nested.iter().map(|a| a.name()).collect();
    assert_eq!(names, [Some("transfer"), Some(ETH_TRANSFER_ACTION)]);
}

#[test]
fn nesting_stops_at_depth_limit() {
    let inner = transfer_call(recipient(), U256::from(1u8));
    let data = encode_call(
        "executeAsBaal(address _to, uint256 _value, bytes _data)",
        &[
            DynSolValue::Address(token()),
            DynSolValue::Uint(U256::ZERO, 256),
            DynSolValue::Bytes(inner.to_vec()),
        ],
    );
    let call = RawCall::new(0, common::dao(), U256::ZERO, data);

    let action = Decoder::default()
        .with_max_nested_depth(0)
        .decode(mainnet(), &call, None);
    let outer = action.as_decoded().expect("executeAsBaal decodes");
    assert!(outer.nested.is_empty());
}
