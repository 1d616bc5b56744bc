use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::Detokenize;
use ethers::contract::{abigen, ContractCall};
use ethers::providers::Middleware;
use ethers::types::{Address, TransactionReceipt, U256, U64};

use crate::errors::{AppError, AppResult};
use crate::models::{HouseFields, ListingDraft, ListingId};

abigen!(
    HouseMarketplace,
    r#"[
        function getHousesLength() external view returns (uint256)
        function readHouse(uint256 _index) external view returns (address, string, string, string, string, uint256, uint256)
        function readSupply(uint256 _index) external view returns (uint256)
        function disableBuy(uint256 _index) external view returns (bool)
        function writeHouse(string _name, string _image, string _description, string _location, uint256 _price, uint256 _supply) external
        function buyHouse(uint256 _index) external
    ]"#
);

abigen!(
    StableToken,
    r#"[
        function balanceOf(address account) external view returns (uint256)
        function approve(address spender, uint256 amount) external returns (bool)
    ]"#
);

/// Read and write calls against the marketplace and its payment token.
///
/// Writes resolve once the transaction is mined; a reverted or dropped
/// transaction is a `TransactionFailed`.
#[async_trait]
pub trait MarketGateway: Send + Sync {
    async fn listing_count(&self) -> AppResult<U256>;

    async fn listing(&self, id: ListingId) -> AppResult<HouseFields>;

    async fn supply(&self, id: ListingId) -> AppResult<U256>;

    /// `true` while the house can still be bought.
    async fn purchasable(&self, id: ListingId) -> AppResult<bool>;

    /// Token balance in the smallest unit.
    async fn balance(&self, account: Address) -> AppResult<U256>;

    /// Lets the marketplace pull `amount` from the signing account.
    async fn approve_spend(&self, amount: U256) -> AppResult<TransactionReceipt>;

    async fn create_listing(&self, draft: &ListingDraft) -> AppResult<TransactionReceipt>;

    async fn purchase(&self, id: ListingId) -> AppResult<TransactionReceipt>;
}

pub struct ContractGateway<M> {
    marketplace: HouseMarketplace<M>,
    token: StableToken<M>,
}

impl<M: Middleware + 'static> ContractGateway<M> {
    pub fn new(client: Arc<M>, marketplace: Address, token: Address) -> Self {
        ContractGateway {
            marketplace: HouseMarketplace::new(marketplace, Arc::clone(&client)),
            token: StableToken::new(token, client),
        }
    }
}

async fn send_and_confirm<M, D>(call: ContractCall<M, D>) -> AppResult<TransactionReceipt>
where
    M: Middleware + 'static,
    D: Detokenize + Send + Sync,
{
    let pending = call.send().await.map_err(AppError::transaction)?;
    let tx_hash = *pending;

    let receipt = pending
        .await
        .map_err(AppError::transaction)?
        .ok_or_else(|| {
            AppError::TransactionFailed(format!("transaction {:?} was dropped", tx_hash))
        })?;

    if receipt.status == Some(U64::zero()) {
        return Err(AppError::TransactionFailed(format!(
            "transaction {:?} reverted",
            receipt.transaction_hash
        )));
    }

    Ok(receipt)
}

#[async_trait]
impl<M: Middleware + 'static> MarketGateway for ContractGateway<M> {
    async fn listing_count(&self) -> AppResult<U256> {
        self.marketplace
            .get_houses_length()
            .call()
            .await
            .map_err(AppError::read)
    }

    async fn listing(&self, id: ListingId) -> AppResult<HouseFields> {
        let house = self
            .marketplace
            .read_house(id.as_u256())
            .call()
            .await
            .map_err(AppError::read)?;

        Ok(HouseFields::from(house))
    }

    async fn supply(&self, id: ListingId) -> AppResult<U256> {
        self.marketplace
            .read_supply(id.as_u256())
            .call()
            .await
            .map_err(AppError::read)
    }

    async fn purchasable(&self, id: ListingId) -> AppResult<bool> {
        self.marketplace
            .disable_buy(id.as_u256())
            .call()
            .await
            .map_err(AppError::read)
    }

    async fn balance(&self, account: Address) -> AppResult<U256> {
        self.token
            .balance_of(account)
            .call()
            .await
            .map_err(AppError::read)
    }

    async fn approve_spend(&self, amount: U256) -> AppResult<TransactionReceipt> {
        send_and_confirm(self.token.approve(self.marketplace.address(), amount)).await
    }

    async fn create_listing(&self, draft: &ListingDraft) -> AppResult<TransactionReceipt> {
        send_and_confirm(self.marketplace.write_house(
            draft.name.clone(),
            draft.image_url.clone(),
            draft.description.clone(),
            draft.location.clone(),
            draft.price,
            draft.supply,
        ))
        .await
    }

    async fn purchase(&self, id: ListingId) -> AppResult<TransactionReceipt> {
        send_and_confirm(self.marketplace.buy_house(id.as_u256())).await
    }
}
