//! Per-chain views over a [`Client`]

use super::Client;
use crate::cchain::{self, EvmExportParams, EvmImportParams};
use crate::error::WalletResult;
use crate::pchain::{
    self, AddPermissionlessDelegatorParams, AddPermissionlessValidatorParams, AddSubnetValidatorParams,
    ConvertSubnetToL1Params, CreateChainParams, CreateSubnetParams, DisableL1ValidatorParams,
    IncreaseL1ValidatorBalanceParams, RegisterL1ValidatorParams, RemoveSubnetValidatorParams,
    SetL1ValidatorWeightParams,
};
use crate::tx::unsigned::UnsignedTransaction;
use crate::tx::utxo_chain::{BaseTxParams, ExportTxParams, ImportTxParams};
use crate::xchain;

/// Generates `prepare_*` methods that resolve the build env and delegate.
macro_rules! prepare_methods {
    ($module:ident { $($(#[$doc:meta])* $name:ident => $builder:ident($params:ty);)* }) => {
        $(
            $(#[$doc])*
            pub async fn $name(&self, params: $params) -> WalletResult<UnsignedTransaction> {
                let env = self.client.build_env().await?;
                $module::$builder(&env, params).await
            }
        )*
    };
}

#[derive(Debug, Clone, Copy)]
pub struct PChain<'a> {
    client: &'a Client,
}

impl<'a> PChain<'a> {
    pub(super) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    prepare_methods!(pchain {
        prepare_base => build_base(BaseTxParams);
        prepare_export => build_export(ExportTxParams);
        prepare_import => build_import(ImportTxParams);
        prepare_create_subnet => build_create_subnet(CreateSubnetParams);
        /// Needs `auth_indices` into the subnet's control keys.
        prepare_create_chain => build_create_chain(CreateChainParams);
        prepare_add_subnet_validator => build_add_subnet_validator(AddSubnetValidatorParams);
        prepare_remove_subnet_validator => build_remove_subnet_validator(RemoveSubnetValidatorParams);
        prepare_convert_subnet_to_l1 => build_convert_subnet_to_l1(ConvertSubnetToL1Params);
        prepare_register_l1_validator => build_register_l1_validator(RegisterL1ValidatorParams);
        prepare_set_l1_validator_weight => build_set_l1_validator_weight(SetL1ValidatorWeightParams);
        prepare_increase_l1_validator_balance => build_increase_l1_validator_balance(IncreaseL1ValidatorBalanceParams);
        /// Needs `auth_indices` into the validator's deactivation owner.
        prepare_disable_l1_validator => build_disable_l1_validator(DisableL1ValidatorParams);
        prepare_add_permissionless_validator => build_add_permissionless_validator(AddPermissionlessValidatorParams);
        prepare_add_permissionless_delegator => build_add_permissionless_delegator(AddPermissionlessDelegatorParams);
    });
}

#[derive(Debug, Clone, Copy)]
pub struct XChain<'a> {
    client: &'a Client,
}

impl<'a> XChain<'a> {
    pub(super) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    prepare_methods!(xchain {
        prepare_base => build_base(BaseTxParams);
        prepare_export => build_export(ExportTxParams);
        prepare_import => build_import(ImportTxParams);
    });
}

#[derive(Debug, Clone, Copy)]
pub struct CChain<'a> {
    client: &'a Client,
}

impl<'a> CChain<'a> {
    pub(super) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    prepare_methods!(cchain {
        prepare_export => build_export(EvmExportParams);
        prepare_import => build_import(EvmImportParams);
    });
}
