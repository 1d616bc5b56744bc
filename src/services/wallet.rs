use std::sync::Arc;

use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use log::info;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::services::notification::Notification;

pub type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Authorized account plus the client that signs on its behalf.
#[derive(Debug, Clone)]
pub struct SigningContext {
    pub client: Arc<SignerClient>,
    pub account: Address,
}

const APPROVE_NOTICE: &str = "⚠️ Please approve this DApp to use it.";

/// Connects the configured wallet to the configured provider.
///
/// Failures are reported on `notification` and returned; on success the
/// approval notice is hidden again.
pub async fn connect(config: &Config, notification: &mut Notification) -> AppResult<SigningContext> {
    let (rpc_url, wallet_key) = match (&config.rpc_url, &config.wallet_key) {
        (Some(rpc_url), Some(wallet_key)) => (rpc_url, wallet_key),
        _ => {
            let err = AppError::ProviderMissing;
            notification.show(err.banner());
            return Err(err);
        }
    };

    notification.show(APPROVE_NOTICE);

    match authorize(rpc_url, wallet_key).await {
        Ok(context) => {
            notification.hide();
            info!("connected as 0x{}", hex::encode(context.account.as_bytes()));
            Ok(context)
        }
        Err(err) => {
            notification.show(err.banner());
            Err(err)
        }
    }
}

fn connection_failed(err: impl std::fmt::Display) -> AppError {
    AppError::ConnectionFailed(err.to_string())
}

async fn authorize(rpc_url: &str, wallet_key: &str) -> AppResult<SigningContext> {
    let wallet: LocalWallet = wallet_key.trim().parse().map_err(connection_failed)?;

    let provider = Provider::<Http>::try_from(rpc_url).map_err(connection_failed)?;
    let chain_id = provider.get_chainid().await.map_err(connection_failed)?;

    let wallet = wallet.with_chain_id(chain_id.as_u64());
    let account = wallet.address();
    let client = SignerMiddleware::new(provider, wallet);

    Ok(SigningContext {
        client: Arc::new(client),
        account,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(rpc_url: Option<&str>, wallet_key: Option<&str>) -> Config {
        Config {
            rpc_url: rpc_url.map(str::to_string),
            wallet_key: wallet_key.map(str::to_string),
            marketplace_address: Address::zero(),
            cusd_address: Address::zero(),
            page_path: PathBuf::from("marketplace.html"),
            log_file: PathBuf::from("logs/log.txt"),
        }
    }

    #[tokio::test]
    async fn missing_provider_is_reported() {
        let mut banner = Notification::default();

        let err = connect(&config(None, Some("0x01")), &mut banner)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ProviderMissing));
        assert!(banner.is_visible());
        assert_eq!(
            banner.text(),
            "⚠️ Please configure a wallet provider (RPC_URL and WALLET_KEY)."
        );
    }

    #[tokio::test]
    async fn malformed_key_fails_connection() {
        let mut banner = Notification::default();

        let err = connect(
            &config(Some("http://127.0.0.1:8545"), Some("not-a-key")),
            &mut banner,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::ConnectionFailed(_)));
        assert!(banner.text().starts_with("⚠️ Wallet connection failed"));
    }

    #[tokio::test]
    async fn malformed_url_fails_connection() {
        let mut banner = Notification::default();
        let key = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

        let err = connect(&config(Some("not a url"), Some(key)), &mut banner)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ConnectionFailed(_)));
        assert!(banner.is_visible());
    }
}
