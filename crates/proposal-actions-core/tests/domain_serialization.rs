use alloy::primitives::{Address, Bytes, I256, U256};
use proposal_actions_core::{
    ActionError, ActionMetaTable, DecodedAction, DecodedCall, DecodedParam, Operation, ParamValue,
    ProposalActions, ProposalRecord, RawCall,
};

#[test]
fn proposal_record_reads_camel_case_json() {
    let json = r#"{
      "proposalId": "12",
      "proposalType": "TRANSFER_ERC20",
      "proposalData": "0xa9059cbb",
      "txHash": "0xabc",
      "target": "0x000000000000000000000000000000000000cafe"
    }"#;

    let record: ProposalRecord = serde_json::from_str(json).expect("parse record");
    assert_eq!(record.proposal_id, "12");
    assert_eq!(record.proposal_type, "TRANSFER_ERC20");
    assert_eq!(record.proposal_data, Bytes::from(vec![0xa9, 0x05, 0x9c, 0xbb]));
    assert_eq!(
        record.target,
        Some(
            "0x000000000000000000000000000000000000cafe"
                .parse::<Address>()
                .expect("address")
        )
    );
}

#[test]
fn proposal_record_fields_default_when_missing() {
    let record: ProposalRecord =
        serde_json::from_str(r#"{"proposalType": "SIGNAL"}"#).expect("parse record");
    assert!(record.proposal_data.is_empty());
    assert!(record.target.is_none());
}

#[test]
fn action_meta_table_parses() {
    let json = r#"{
      "ADD_SHAMAN": {
        "name": "Add Shaman",
        "actions": [
          { "label": "Baal", "method": "setShamans", "abi": ["setShamans(address[] shamans, uint256[] permissions)"] }
        ]
      }
    }"#;

    let table: ActionMetaTable = serde_json::from_str(json).expect("parse meta");
    let meta = table.get("ADD_SHAMAN").expect("entry");
    assert_eq!(meta.actions.len(), 1);
    assert_eq!(meta.actions[0].method, "setShamans");
    assert_eq!(meta.actions[0].label.as_deref(), Some("Baal"));
}

#[test]
fn decoded_actions_serialize_with_status_tag() {
    let decoded = DecodedAction::Decoded(DecodedCall {
        name: "transfer".to_owned(),
        signature: "transfer(address,uint256)".to_owned(),
        to: Address::ZERO,
        value: U256::ZERO,
        operation: Operation::Call,
        label: None,
        params: vec![DecodedParam {
            name: "amount".to_owned(),
            ty: "uint256".to_owned(),
            value: ParamValue::Uint(U256::from(5)),
        }],
        nested: vec![],
    });
    let error = DecodedAction::DecodeError(ActionError {
        message: "Unknown action".to_owned(),
        to: None,
        value: None,
        data: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
    });

    let json = serde_json::to_value(&decoded).expect("serialize decoded");
    assert_eq!(json["status"], "decoded");
    assert_eq!(json["params"][0]["type"], "uint256");
    assert_eq!(json["params"][0]["value"]["kind"], "uint");
    assert_eq!(json["params"][0]["value"]["value"], "5");
    assert_eq!(json["value"], "0");
    assert!(json.get("nested").is_none());

    let json = serde_json::to_value(&error).expect("serialize error");
    assert_eq!(json["status"], "decodeError");
    assert_eq!(json["data"], "0xdeadbeef");

    let actions = ProposalActions::new(vec![decoded, error]);
    assert!(actions.had_decode_error);
}

#[test]
fn amounts_serialize_as_decimal_strings() {
    let one_token = U256::from(1_000_000_000_000_000_000u128);

    let call = RawCall::new(0, Address::ZERO, one_token, Bytes::new());
    let json = serde_json::to_value(&call).expect("serialize call");
    assert_eq!(json["value"], "1000000000000000000");
    let back: RawCall = serde_json::from_value(json).expect("parse call");
    assert_eq!(back.value, one_token);

    let json = serde_json::to_value(ParamValue::Uint(one_token)).expect("serialize uint");
    assert_eq!(json["kind"], "uint");
    assert_eq!(json["value"], "1000000000000000000");

    let json = serde_json::to_value(ParamValue::Int(I256::try_from(-5i64).expect("i256")))
        .expect("serialize int");
    assert_eq!(json["value"], "-5");
    let back: ParamValue = serde_json::from_value(json).expect("parse int");
    assert_eq!(back, ParamValue::Int(I256::try_from(-5i64).expect("i256")));

    let error = ActionError {
        message: "Unknown action".to_owned(),
        to: None,
        value: Some(one_token),
        data: Bytes::new(),
    };
    let json = serde_json::to_value(&error).expect("serialize error");
    assert_eq!(json["value"], "1000000000000000000");
    let back: ActionError = serde_json::from_value(json).expect("parse error");
    assert_eq!(back.value, Some(one_token));
}

#[test]
fn hex_amounts_are_accepted_on_input() {
    let call: RawCall = serde_json::from_str(
        r#"{"index":0,"operation":"call","to":"0x0000000000000000000000000000000000000000","value":"0xde0b6b3a7640000","data":"0x"}"#,
    )
    .expect("parse call");
    assert_eq!(call.value, U256::from(1_000_000_000_000_000_000u128));
}
