//! A forwarder and the token that trusts it, persisted as one unit.
//!
//! Both addresses are derived from the deployment parameters, so the same
//! config always yields the same addresses and therefore the same forwarder
//! domain separator.

use serde::{Deserialize, Serialize};
use tracing::info;

use levy_protocol::config::{DEFAULT_FORWARD_GAS, DEPLOYMENT_ADDRESS_CONTEXT};
use levy_protocol::crypto::{domain_separated_hash, LevyKeypair};
use levy_protocol::{Address, Amount};

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::forwarder::{Execution, ForwardRequest, Forwarder, ForwarderError, SignedForwardRequest};
use crate::token::{LedgerCall, Token};
use crate::upgrade::{Activation, BehaviorVersion};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    config: LedgerConfig,
    forwarder: Forwarder,
    token: Token,
}

fn derive_address(role: &str, config: &LedgerConfig) -> Address {
    let mut buf = Vec::new();
    buf.extend_from_slice(role.as_bytes());
    buf.push(0);
    buf.extend_from_slice(config.admin.as_bytes());
    buf.extend_from_slice(&config.chain_id.to_be_bytes());
    buf.extend_from_slice(config.symbol.as_bytes());
    Address::from_bytes(domain_separated_hash(DEPLOYMENT_ADDRESS_CONTEXT, &buf))
}

impl Deployment {
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        let forwarder = Forwarder::new(derive_address("forwarder", &config), config.chain_id);
        let token = Token::deploy(derive_address("token", &config), &config, forwarder.address())?;
        info!(
            token = %token.address(),
            forwarder = %forwarder.address(),
            admin = %config.admin,
            "ledger deployed"
        );
        Ok(Self {
            config,
            forwarder,
            token,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn forwarder(&self) -> &Forwarder {
        &self.forwarder
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut Token {
        &mut self.token
    }

    /// Executes a signed request against this deployment's token.
    pub fn relay(
        &mut self,
        signed: &SignedForwardRequest,
    ) -> Result<Execution<LedgerError>, ForwarderError> {
        self.forwarder.execute(signed, &mut self.token)
    }

    /// A request from `signer` carrying `call`, at the signer's next nonce.
    pub fn request_for(&self, signer: Address, call: &LedgerCall) -> Result<ForwardRequest, LedgerError> {
        Ok(ForwardRequest {
            from: signer,
            to: self.token.address(),
            value: Amount::ZERO,
            gas: DEFAULT_FORWARD_GAS,
            nonce: self.forwarder.nonce_of(&signer),
            data: call.encode()?,
        })
    }

    pub fn sign_call(
        &self,
        keypair: &LevyKeypair,
        call: &LedgerCall,
    ) -> Result<SignedForwardRequest, LedgerError> {
        let request = self.request_for(Address::from(keypair.public_key()), call)?;
        Ok(self.forwarder.sign_request(keypair, request))
    }

    /// The activation for `version`, parameterized from the config.
    pub fn activation_for(&self, version: BehaviorVersion) -> Activation {
        match version {
            BehaviorVersion::V1 => Activation::V1 {
                initial_supply: self.config.initial_supply,
            },
            BehaviorVersion::V2 => Activation::V2 {
                fee_recipient: self.config.fee_recipient,
            },
        }
    }

    pub fn upgrade_to(&mut self, caller: Address, version: BehaviorVersion) -> Result<(), LedgerError> {
        let activation = self.activation_for(version);
        self.token.upgrade(caller, activation)
    }
}
