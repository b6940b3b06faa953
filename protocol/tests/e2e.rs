//! End-to-end tests for the protocol primitives.
//!
//! These compose the pieces the ledger relies on: a key becomes an account
//! address, the address signs a domain-separated digest, and amounts parsed
//! from user input survive every serialization the ledger uses.

use levy_protocol::config::{
    BPS_DENOMINATOR, FORWARDER_DOMAIN_CONTEXT, FORWARD_REQUEST_CONTEXT, TAX_RATE_BPS, UNIT,
};
use levy_protocol::crypto::{domain_separated_hash, LevyKeypair, LevyPublicKey, LevySignature};
use levy_protocol::{Address, Amount};

// ---------------------------------------------------------------------------
// Identity and Signatures
// ---------------------------------------------------------------------------

#[test]
fn address_is_enough_to_verify_a_signature() {
    let keypair = LevyKeypair::from_seed(&[0x42; 32]);
    let address = Address::from(keypair.public_key());

    let digest = domain_separated_hash(FORWARD_REQUEST_CONTEXT, b"transfer 10 to bob");
    let signature = keypair.sign(&digest);

    // A verifier that only knows the address and the hex on the wire.
    let key = LevyPublicKey::try_from_bytes(*address.as_bytes()).unwrap();
    let wire = LevySignature::from_hex(&signature.to_hex()).unwrap();
    assert!(key.verify(&digest, &wire));
}

#[test]
fn digests_are_bound_to_their_context() {
    let keypair = LevyKeypair::from_seed(&[0x43; 32]);
    let a = domain_separated_hash(FORWARD_REQUEST_CONTEXT, b"payload");
    let b = domain_separated_hash(FORWARDER_DOMAIN_CONTEXT, b"payload");
    assert_ne!(a, b);

    let signature = keypair.sign(&a);
    assert!(!keypair.public_key().verify(&b, &signature));
}

#[test]
fn hex_secret_restores_the_same_account() {
    let keypair = LevyKeypair::generate();
    let restored = LevyKeypair::from_hex(&keypair.secret_key_hex()).unwrap();
    assert_eq!(
        Address::from(keypair.public_key()),
        Address::from(restored.public_key())
    );
}

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

#[test]
fn one_percent_of_ten_tokens() {
    let ten = Amount::parse_decimal("10").unwrap();
    let tax = ten.mul_div_floor(TAX_RATE_BPS, BPS_DENOMINATOR).unwrap();
    assert_eq!(tax, Amount::parse_decimal("0.1").unwrap());
    let (first, second) = tax.split_half();
    assert_eq!(first.to_string(), "0.05");
    assert_eq!(second.to_string(), "0.05");
    assert_eq!(ten.checked_sub(tax).unwrap().to_string(), "9.9");
}

#[test]
fn amounts_survive_json_and_bincode() {
    let amount = Amount::parse_decimal("8.91").unwrap();
    assert_eq!(amount.base_units(), 891 * UNIT / 100);

    let json = serde_json::to_string(&amount).unwrap();
    assert_eq!(serde_json::from_str::<Amount>(&json).unwrap(), amount);

    let bytes = bincode::serialize(&amount).unwrap();
    assert_eq!(bytes.len(), 16);
    assert_eq!(bincode::deserialize::<Amount>(&bytes).unwrap(), amount);
}

#[test]
fn rejects_more_precision_than_the_ledger_has() {
    assert!(Amount::parse_decimal("0.0000000000000000001").is_err());
    assert!(Amount::parse_decimal("-1").is_err());
    assert!(Amount::parse_decimal("1e3").is_err());
}
