use serde_json::Value;
use tx_decoder::{decode, decode_hex, run, Error};

const LEGACY_TX: &str = "010000000242d5c1d6f7308bbe95c0f6e1301dd73a8da77d2155b0773bc297ac47f9cd7380010000006a4730440220771361aae55e84496b9e7b06e0a53dd122a1425f85840af7a52b20fa329816070220221dd92132e82ef9c133cb1a106b64893892a11acf2cfa1adb7698dcdc02f01b0121030077be25dc482e7f4abad60115416881fe4ef98af33c924cd8b20ca4e57e8bd5feffffff75c87cc5f3150eefc1c04c0246e7e0b370e64b17d6226c44b333a6f4ca14b49c000000006b483045022100e0d85fece671d367c8d442a96230954cdda4b9cf95e9edc763616d05d93e944302202330d520408d909575c5f6976cc405b3042673b601f4f2140b2e4d447e671c47012103c43afccd37aae7107f5a43f5b7b223d034e7583b77c8cd1084d86895a7341abffeffffff02ebb10f00000000001976a9144ef88a0b04e3ad6d1888da4be260d6735e0d308488ac508c1e000000000017a91476c0c8f2fc403c5edaea365f6a284317b9cdf7258700000000";
const LEGACY_TXID: &str = "3c1804567a336c3944e30b3c2593970bfcbf5b15a40f4fc6b626a360ee0507f2";

const SEGWIT_TX: &str = "02000000000101d2467ec855e99689ec0ac5978708c30cf4206e49e30dd81a2377c411cce40f0c0100000000feffffff028f0b1f00000000001600146f048d1381aa546a3e89e87f7549efc45f150b7fa9ce0f0000000000160014d850c02b89821f0f189ca7e81756c102241f7f4002473044022036c03ad8796f865c9348403fb705d5b984a4ef9565e8b0c81a1069f0f36bbeeb022034e9d5679e9783a441586fae034c78c60854ed71b7b53e6ef169e4f58153356101210355dd8af3cbfe5c3d3424b441069455a59ce0c8d5fe628da0913dae55037ef928bff62400";
const SEGWIT_TXID: &str = "17e1fcaae34575d0d1566c1ae64bf4c9f7b7b9df0ff505015d3eb72460fe3a61";

fn assert_btc(value: &Value, expected: f64) {
    let amount = value.as_f64().expect("amount is a number");
    assert!((amount - expected).abs() < 1e-12, "{} != {}", amount, expected);
}

#[test]
fn test_legacy_transaction() {
    let tx = decode_hex(LEGACY_TX).unwrap();

    assert_eq!(tx.version(), 1);
    assert_eq!(tx.inputs().len(), 2);
    assert_eq!(tx.outputs().len(), 2);
    assert_eq!(tx.lock_time(), 0);
    assert!(!tx.is_segwit());
    assert!(tx.inputs().iter().all(|input| input.witness.is_empty()));
    assert_eq!(tx.txid().to_string(), LEGACY_TXID);

    // The legacy encoding reproduces the input exactly
    assert_eq!(hex::encode(tx.encode_legacy()), LEGACY_TX);
}

#[test]
fn test_segwit_transaction() {
    let tx = decode_hex(SEGWIT_TX).unwrap();

    assert_eq!(tx.version(), 2);
    assert_eq!(tx.inputs().len(), 1);
    assert_eq!(tx.inputs()[0].witness.len(), 2);
    assert!(tx.inputs()[0].script_sig.is_empty());
    assert_eq!(tx.inputs()[0].previous_vout, 1);
    assert_eq!(tx.inputs()[0].sequence, 0xffff_fffe);
    assert_eq!(tx.outputs().len(), 2);
    assert_eq!(tx.outputs()[0].amount.to_sat(), 2_034_575);
    assert_eq!(tx.outputs()[1].amount.to_sat(), 1_035_945);
    assert_eq!(tx.lock_time(), 2_422_463);
    assert_eq!(tx.txid().to_string(), SEGWIT_TXID);

    assert_eq!(hex::encode(tx.encode_with_witness()), SEGWIT_TX);
    assert_ne!(tx.wtxid(), tx.txid());
}

#[test]
fn test_decoding_is_deterministic() {
    let first = decode_hex(SEGWIT_TX).unwrap();
    let second = decode_hex(SEGWIT_TX).unwrap();
    assert_eq!(first.txid(), second.txid());
    assert_eq!(first, second);
}

#[test]
fn test_witness_excluded_from_txid() {
    let mut bytes = hex::decode(SEGWIT_TX).unwrap();
    // Flip a byte inside the public key witness item, just before the lock time
    let index = bytes.len() - 5;
    bytes[index] ^= 0xff;

    let original = decode_hex(SEGWIT_TX).unwrap();
    let tampered = decode(&bytes).unwrap();
    assert_ne!(original.inputs()[0].witness, tampered.inputs()[0].witness);
    assert_eq!(original.txid(), tampered.txid());
    assert_ne!(original.wtxid(), tampered.wtxid());
}

#[test]
fn test_unsupported_segwit_flag() {
    let mut bytes = hex::decode(SEGWIT_TX).unwrap();
    bytes[5] = 0x02;
    assert!(matches!(decode(&bytes), Err(Error::UnsupportedSegwitFlag(2))));
}

#[test]
fn test_truncated_buffer_fails_at_lock_time() {
    for raw in [LEGACY_TX, SEGWIT_TX] {
        let bytes = hex::decode(raw).unwrap();
        let truncated = &bytes[..bytes.len() - 1];

        match decode(truncated) {
            Err(Error::ShortRead { offset, needed, remaining }) => {
                assert_eq!(offset, bytes.len() - 4);
                assert_eq!(needed, 4);
                assert_eq!(remaining, 3);
            }
            other => panic!("expected ShortRead, got {:?}", other),
        }
    }
}

#[test]
fn test_trailing_bytes_are_ignored() {
    let padded = format!("{}00", LEGACY_TX);
    let tx = decode_hex(&padded).unwrap();
    assert_eq!(tx.txid().to_string(), LEGACY_TXID);
}

#[test]
fn test_invalid_hex() {
    let err = decode_hex("abc").unwrap_err();
    assert!(matches!(err, Error::InvalidHexInput(_)));
    assert!(err.to_string().starts_with("Hex decoding error: "));

    // Whitespace is not stripped
    let padded = format!(" {}\n", LEGACY_TX);
    assert!(matches!(decode_hex(&padded), Err(Error::InvalidHexInput(_))));

    let err = run("zz", true).unwrap_err();
    assert!(err.to_string().starts_with("Hex decoding error: "));
}

#[test]
fn test_empty_input() {
    assert!(matches!(decode(&[]), Err(Error::ShortRead { offset: 0, .. })));
}

#[test]
fn test_segwit_json() {
    let json: Value = serde_json::from_str(&run(SEGWIT_TX, true).unwrap()).unwrap();

    assert_eq!(json["transaction_id"], SEGWIT_TXID);
    assert_eq!(json["version"], 2);
    assert_eq!(json["locktime"], 2_422_463);

    let input = &json["inputs"][0];
    assert_eq!(
        input["txid"],
        "0c0fe4cc11c477231ad80de3496e20f40cc3088797c50aec8996e955c87e46d2"
    );
    assert_eq!(input["vout"], 1);
    assert_eq!(input["sequence"], 4_294_967_294_u64);
    assert!(input.get("scriptSig").is_none());
    assert_eq!(input["txinwitness"].as_array().unwrap().len(), 2);
    assert_eq!(
        input["txinwitness"][1],
        "0355dd8af3cbfe5c3d3424b441069455a59ce0c8d5fe628da0913dae55037ef928"
    );

    let outputs = json["outputs"].as_array().unwrap();
    assert_btc(&outputs[0]["amount"], 0.02034575);
    assert_btc(&outputs[1]["amount"], 0.01035945);
    assert_eq!(
        outputs[0]["script_pubkey"],
        "00146f048d1381aa546a3e89e87f7549efc45f150b7f"
    );
}

#[test]
fn test_legacy_json() {
    let json: Value = serde_json::from_str(&run(LEGACY_TX, false).unwrap()).unwrap();

    assert_eq!(json["transaction_id"], LEGACY_TXID);
    let inputs = json["inputs"].as_array().unwrap();
    assert_eq!(inputs.len(), 2);
    for input in inputs {
        assert!(input.get("txinwitness").is_none());
        let script_sig = input["scriptSig"].as_str().unwrap();
        // DER signature push followed by a compressed pubkey push
        assert!(script_sig.starts_with("47") || script_sig.starts_with("48"));
        assert!(script_sig.len() == 212 || script_sig.len() == 214);
    }
    assert_btc(&json["outputs"][0]["amount"], 0.01028587);
}
