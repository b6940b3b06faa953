//! # Authorization Forwarder
//!
//! Lets a relayer submit a call that someone else signed off-line. The signer
//! never touches the ledger directly; the forwarder checks the signature and
//! the signer's nonce, then calls the target with the signer attributed as
//! the original sender.
//!
//! ## Protocol
//!
//! 1. The signature must verify against the key named by `request.from`,
//!    over `domain_separator || canonical(request)`. The domain separator
//!    binds the forwarder's name, version, chain id and its own address, so
//!    a signature is only redeemable at one forwarder instance.
//! 2. `request.nonce` must equal `nonce_of(request.from)`.
//! 3. The nonce is incremented, then the target is invoked.
//!
//! Steps 1 and 2 never mutate anything. Once step 3 starts the nonce is
//! spent, whatever the target returns: the target's failure is reported
//! inside the [`Execution`], not as a forwarder error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

use levy_protocol::config::{
    FORWARDER_DOMAIN_CONTEXT, FORWARDER_DOMAIN_NAME, FORWARDER_DOMAIN_VERSION,
    FORWARD_REQUEST_CONTEXT,
};
use levy_protocol::crypto::{
    domain_separated_hash, domain_separated_hash_parts, LevyKeypair, LevyPublicKey, LevySignature,
};
use levy_protocol::{Address, Amount};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForwarderError {
    /// The signature does not verify against `request.from`.
    #[error("bad signature: not signed by {signer}")]
    BadSignature { signer: Address },

    /// The request's nonce is stale or from the future.
    #[error("bad nonce for {signer}: expected {expected}, got {got}")]
    BadNonce {
        signer: Address,
        expected: u64,
        got: u64,
    },

    /// The request names a different target than the one supplied.
    #[error("target mismatch: request is for {expected}, executed against {got}")]
    TargetMismatch { expected: Address, got: Address },

    #[error("nonce overflow for {signer}")]
    NonceOverflow { signer: Address },
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// What the signer authorizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardRequest {
    pub from: Address,
    pub to: Address,
    /// Signed but not transferred.
    pub value: Amount,
    /// Signed but not metered.
    pub gas: u64,
    pub nonce: u64,
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
}

impl ForwardRequest {
    /// Canonical encoding covered by the signature.
    ///
    /// ```text
    /// from(32) || to(32) || value(16, BE) || gas(8, BE) || nonce(8, BE)
    ///          || len(data)(8, BE) || data
    /// ```
    pub fn signable_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32 + 32 + 16 + 8 + 8 + 8 + self.data.len());
        buf.extend_from_slice(self.from.as_bytes());
        buf.extend_from_slice(self.to.as_bytes());
        buf.extend_from_slice(&self.value.base_units().to_be_bytes());
        buf.extend_from_slice(&self.gas.to_be_bytes());
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf.extend_from_slice(&(self.data.len() as u64).to_be_bytes());
        buf.extend_from_slice(&self.data);
        buf
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedForwardRequest {
    pub request: ForwardRequest,
    pub signature: LevySignature,
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// Something a forwarder can call into.
pub trait ForwardTarget {
    type Error;

    fn address(&self) -> Address;

    /// Runs `data` as if `sender` had called directly. `forwarder` is the
    /// relay the call arrived through.
    fn forwarded_call(
        &mut self,
        forwarder: Address,
        sender: Address,
        data: &[u8],
    ) -> Result<Vec<u8>, Self::Error>;
}

/// Outcome of a request that passed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution<E> {
    /// The nonce that was consumed.
    pub nonce: u64,
    pub outcome: Result<Vec<u8>, E>,
}

impl<E> Execution<E> {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

// ---------------------------------------------------------------------------
// Forwarder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forwarder {
    address: Address,
    chain_id: u64,
    nonces: BTreeMap<Address, u64>,
}

impl Forwarder {
    pub fn new(address: Address, chain_id: u64) -> Self {
        Self {
            address,
            chain_id,
            nonces: BTreeMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Next nonce `account` must sign with. Zero until its first request.
    pub fn nonce_of(&self, account: &Address) -> u64 {
        self.nonces.get(account).copied().unwrap_or(0)
    }

    pub fn domain_separator(&self) -> [u8; 32] {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(FORWARDER_DOMAIN_NAME.as_bytes());
        buf.push(0);
        buf.extend_from_slice(FORWARDER_DOMAIN_VERSION.as_bytes());
        buf.push(0);
        buf.extend_from_slice(&self.chain_id.to_be_bytes());
        buf.extend_from_slice(self.address.as_bytes());
        domain_separated_hash(FORWARDER_DOMAIN_CONTEXT, &buf)
    }

    /// The 32-byte message the signer signs.
    pub fn digest(&self, request: &ForwardRequest) -> [u8; 32] {
        domain_separated_hash_parts(
            FORWARD_REQUEST_CONTEXT,
            &[&self.domain_separator(), &request.signable_bytes()],
        )
    }

    /// Signs `request` for this forwarder. The request's `from` should be the
    /// keypair's address or verification will fail.
    pub fn sign_request(&self, keypair: &LevyKeypair, request: ForwardRequest) -> SignedForwardRequest {
        let signature = keypair.sign(&self.digest(&request));
        SignedForwardRequest { request, signature }
    }

    /// Checks signature and nonce without consuming anything.
    pub fn verify(&self, signed: &SignedForwardRequest) -> Result<(), ForwarderError> {
        let request = &signed.request;
        let signer = request.from;

        let key = LevyPublicKey::try_from_bytes(*signer.as_bytes())
            .map_err(|_| ForwarderError::BadSignature { signer })?;
        if !key.verify(&self.digest(request), &signed.signature) {
            return Err(ForwarderError::BadSignature { signer });
        }

        let expected = self.nonce_of(&signer);
        if request.nonce != expected {
            return Err(ForwarderError::BadNonce {
                signer,
                expected,
                got: request.nonce,
            });
        }
        Ok(())
    }

    /// Verifies, spends the nonce, then calls `target` on the signer's behalf.
    pub fn execute<T: ForwardTarget>(
        &mut self,
        signed: &SignedForwardRequest,
        target: &mut T,
    ) -> Result<Execution<T::Error>, ForwarderError> {
        let request = &signed.request;
        let signer = request.from;

        let target_address = target.address();
        if request.to != target_address {
            warn!(signer = %signer.short(), to = %request.to.short(), "forward request for another target");
            return Err(ForwarderError::TargetMismatch {
                expected: request.to,
                got: target_address,
            });
        }
        if let Err(e) = self.verify(signed) {
            warn!(signer = %signer.short(), error = %e, "forward request rejected");
            return Err(e);
        }

        let nonce = request.nonce;
        let next = nonce
            .checked_add(1)
            .ok_or(ForwarderError::NonceOverflow { signer })?;
        self.nonces.insert(signer, next);

        let outcome = target.forwarded_call(self.address, signer, &request.data);
        debug!(
            signer = %signer.short(),
            nonce,
            ok = outcome.is_ok(),
            "forward request executed"
        );
        Ok(Execution { nonce, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records calls and can be told to fail or to try a replay.
    struct Recorder {
        address: Address,
        calls: Vec<(Address, Vec<u8>)>,
        fail: bool,
    }

    impl ForwardTarget for Recorder {
        type Error = String;

        fn address(&self) -> Address {
            self.address
        }

        fn forwarded_call(
            &mut self,
            _forwarder: Address,
            sender: Address,
            data: &[u8],
        ) -> Result<Vec<u8>, String> {
            self.calls.push((sender, data.to_vec()));
            if self.fail {
                Err("target failed".into())
            } else {
                Ok(data.to_vec())
            }
        }
    }

    fn recorder() -> Recorder {
        Recorder {
            address: Address::repeat_byte(0x70),
            calls: Vec::new(),
            fail: false,
        }
    }

    fn request(kp: &LevyKeypair, to: Address, nonce: u64) -> ForwardRequest {
        ForwardRequest {
            from: Address::from(kp.public_key()),
            to,
            value: Amount::ZERO,
            gas: 100_000,
            nonce,
            data: b"payload".to_vec(),
        }
    }

    #[test]
    fn executes_once_per_nonce() {
        let kp = LevyKeypair::from_seed(&[1u8; 32]);
        let signer = Address::from(kp.public_key());
        let mut fwd = Forwarder::new(Address::repeat_byte(0xf0), 1);
        let mut target = recorder();

        let signed = fwd.sign_request(&kp, request(&kp, target.address, 0));
        let exec = fwd.execute(&signed, &mut target).unwrap();
        assert!(exec.succeeded());
        assert_eq!(exec.nonce, 0);
        assert_eq!(fwd.nonce_of(&signer), 1);
        assert_eq!(target.calls, vec![(signer, b"payload".to_vec())]);

        // Replay.
        assert_eq!(
            fwd.execute(&signed, &mut target),
            Err(ForwarderError::BadNonce {
                signer,
                expected: 1,
                got: 0
            })
        );
        assert_eq!(target.calls.len(), 1);
    }

    #[test]
    fn future_nonce_is_rejected_without_mutation() {
        let kp = LevyKeypair::from_seed(&[2u8; 32]);
        let mut fwd = Forwarder::new(Address::repeat_byte(0xf0), 1);
        let mut target = recorder();
        let signed = fwd.sign_request(&kp, request(&kp, target.address, 5));
        let before = fwd.clone();
        assert!(matches!(
            fwd.execute(&signed, &mut target),
            Err(ForwarderError::BadNonce { expected: 0, got: 5, .. })
        ));
        assert_eq!(fwd, before);
    }

    #[test]
    fn tampered_request_fails_signature() {
        let kp = LevyKeypair::from_seed(&[3u8; 32]);
        let mut fwd = Forwarder::new(Address::repeat_byte(0xf0), 1);
        let mut target = recorder();
        let mut signed = fwd.sign_request(&kp, request(&kp, target.address, 0));
        signed.request.gas += 1;
        assert!(matches!(
            fwd.execute(&signed, &mut target),
            Err(ForwarderError::BadSignature { .. })
        ));
        assert!(target.calls.is_empty());
    }

    #[test]
    fn signature_from_another_key_fails() {
        let kp = LevyKeypair::from_seed(&[4u8; 32]);
        let impostor = LevyKeypair::from_seed(&[5u8; 32]);
        let fwd = Forwarder::new(Address::repeat_byte(0xf0), 1);
        let signed = fwd.sign_request(&impostor, request(&kp, Address::repeat_byte(0x70), 0));
        assert!(matches!(
            fwd.verify(&signed),
            Err(ForwarderError::BadSignature { .. })
        ));
    }

    #[test]
    fn sender_that_is_not_a_curve_point_fails() {
        let kp = LevyKeypair::from_seed(&[10u8; 32]);
        let fwd = Forwarder::new(Address::repeat_byte(0xf0), 1);
        let mut off_curve = [0u8; 32];
        off_curve[0] = 2;
        let mut req = request(&kp, Address::repeat_byte(0x70), 0);
        req.from = Address::from_bytes(off_curve);
        let signed = fwd.sign_request(&kp, req);
        assert_eq!(
            fwd.verify(&signed),
            Err(ForwarderError::BadSignature {
                signer: Address::from_bytes(off_curve)
            })
        );
    }

    #[test]
    fn signatures_do_not_cross_forwarders() {
        let kp = LevyKeypair::from_seed(&[6u8; 32]);
        let a = Forwarder::new(Address::repeat_byte(0xf0), 1);
        let b = Forwarder::new(Address::repeat_byte(0xf1), 1);
        let other_chain = Forwarder::new(Address::repeat_byte(0xf0), 2);
        let signed = a.sign_request(&kp, request(&kp, Address::repeat_byte(0x70), 0));
        assert!(a.verify(&signed).is_ok());
        assert!(b.verify(&signed).is_err());
        assert!(other_chain.verify(&signed).is_err());
    }

    #[test]
    fn target_failure_still_spends_the_nonce() {
        let kp = LevyKeypair::from_seed(&[7u8; 32]);
        let mut fwd = Forwarder::new(Address::repeat_byte(0xf0), 1);
        let mut target = recorder();
        target.fail = true;
        let signed = fwd.sign_request(&kp, request(&kp, target.address, 0));
        let exec = fwd.execute(&signed, &mut target).unwrap();
        assert!(!exec.succeeded());
        assert_eq!(fwd.nonce_of(&Address::from(kp.public_key())), 1);
    }

    #[test]
    fn wrong_target_is_rejected() {
        let kp = LevyKeypair::from_seed(&[8u8; 32]);
        let mut fwd = Forwarder::new(Address::repeat_byte(0xf0), 1);
        let mut target = recorder();
        let signed = fwd.sign_request(&kp, request(&kp, Address::repeat_byte(0x71), 0));
        assert!(matches!(
            fwd.execute(&signed, &mut target),
            Err(ForwarderError::TargetMismatch { .. })
        ));
        assert_eq!(fwd.nonce_of(&Address::from(kp.public_key())), 0);
    }

    #[test]
    fn signable_bytes_cover_every_field() {
        let kp = LevyKeypair::from_seed(&[9u8; 32]);
        let base = request(&kp, Address::repeat_byte(0x70), 0);
        let mut value = base.clone();
        value.value = Amount::from_base_units(1);
        let mut data = base.clone();
        data.data.push(0);
        assert_ne!(base.signable_bytes(), value.signable_bytes());
        assert_ne!(base.signable_bytes(), data.signable_bytes());
    }
}
