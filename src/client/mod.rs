//! Client Facade
//!
//! [`Client`] owns the shared collaborators (transport, codec, signer), the
//! lazily resolved [`NetworkContext`] and an optional default key source.
//! Per-chain views expose one `prepare_*` method per transaction kind; the
//! builders themselves live in the chain modules and take a [`BuildEnv`].

mod chains;

pub use chains::{CChain, PChain, XChain};

use crate::codec::{LinearCodec, TxCodec};
use crate::config::ClientConfig;
use crate::context::{resolve_context, NetworkContext};
use crate::error::{WalletError, WalletResult};
use crate::rpc::{HttpTransport, Transport};
use crate::signing::{self, KeyChain, Secp256k1Signer, Signer};
use crate::tx::broadcaster::{self, IssuedTx};
use crate::tx::builder::BuildEnv;
use crate::tx::tracker::{self, PollPolicy, TxStatus, TxStatusReport};
use crate::tx::unsigned::UnsignedTransaction;
use crate::types::{ChainAlias, EvmAddress, ShortId};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub struct Client {
    transport: Arc<dyn Transport>,
    codec: Arc<dyn TxCodec>,
    signer: Arc<dyn Signer>,
    config: ClientConfig,
    context: OnceCell<NetworkContext>,
    keys: Option<Arc<KeyChain>>,
    default_from: Vec<ShortId>,
    default_evm: Option<EvmAddress>,
}

impl Client {
    /// HTTP client for `config.node_url`.
    pub fn new(config: ClientConfig) -> WalletResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self {
            transport,
            codec: Arc::new(LinearCodec),
            signer: Arc::new(Secp256k1Signer),
            config,
            context: OnceCell::new(),
            keys: None,
            default_from: Vec::new(),
            default_evm: None,
        }
    }

    /// Skip resolution and use a known context.
    pub fn with_context(self, context: NetworkContext) -> Self {
        Self {
            context: OnceCell::new_with(Some(context)),
            ..self
        }
    }

    /// Bind a default key source: builders fall back to its addresses and
    /// `sign` to its keys.
    pub fn with_keychain(mut self, keys: KeyChain) -> Self {
        self.default_from = keys.short_ids();
        self.default_evm = keys.evm_addresses().first().copied();
        self.keys = Some(Arc::new(keys));
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn TxCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = signer;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn codec(&self) -> &dyn TxCodec {
        self.codec.as_ref()
    }

    /// Network context, resolved on first use and cached.
    pub async fn context(&self) -> WalletResult<&NetworkContext> {
        self.context
            .get_or_try_init(|| resolve_context(self.transport.as_ref()))
            .await
    }

    pub async fn build_env(&self) -> WalletResult<BuildEnv<'_>> {
        let context = self.context().await?;
        Ok(BuildEnv {
            transport: self.transport.as_ref(),
            codec: self.codec.as_ref(),
            context,
            config: &self.config,
            default_from: &self.default_from,
            default_evm: self.default_evm,
        })
    }

    pub fn p_chain(&self) -> PChain<'_> {
        PChain::new(self)
    }

    pub fn x_chain(&self) -> XChain<'_> {
        XChain::new(self)
    }

    pub fn c_chain(&self) -> CChain<'_> {
        CChain::new(self)
    }

    /// Sign with `keys`, or with the default key source when `None`.
    pub fn sign(&self, tx: UnsignedTransaction, keys: Option<&KeyChain>) -> WalletResult<UnsignedTransaction> {
        let keys = match keys {
            Some(keys) => keys,
            None => self.keys.as_deref().ok_or_else(|| {
                WalletError::invalid_parameters("keys", "no keys given and the client has no default key source")
            })?,
        };
        signing::sign(tx, keys, self.signer.as_ref())
    }

    pub async fn issue(&self, tx: &UnsignedTransaction) -> WalletResult<IssuedTx> {
        broadcaster::issue(self.transport.as_ref(), self.codec.as_ref(), tx).await
    }

    pub async fn tx_status(&self, chain: ChainAlias, tx_id: &str) -> WalletResult<TxStatusReport> {
        tracker::tx_status(self.transport.as_ref(), chain, tx_id).await
    }

    /// Poll with the configured interval and attempt bound.
    pub async fn wait_for_acceptance(&self, chain: ChainAlias, tx_id: &str) -> WalletResult<TxStatus> {
        let policy = PollPolicy {
            interval: self.config.poll_interval,
            attempts: self.config.poll_attempts,
        };
        tracker::wait_for_acceptance(self.transport.as_ref(), chain, tx_id, policy).await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("node_url", &self.config.node_url)
            .field("context_resolved", &self.context.initialized())
            .field("default_keys", &self.keys.as_ref().map(|k| k.len()))
            .finish()
    }
}
