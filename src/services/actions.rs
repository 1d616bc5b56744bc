use std::sync::Arc;

use ethers::types::Address;
use log::warn;

use crate::errors::{AppError, AppResult};
use crate::models::amount::to_display;
use crate::models::{Listing, ListingId, NewListing};
use crate::services::data_loader::listings::get_all_listings;
use crate::services::gateway::MarketGateway;
use crate::services::notification::Notification;
use crate::services::render::{render_marketplace, MarketPage};

/// Everything a marketplace session owns: the gateway, the signing account,
/// the last loaded listings, the rendered page and the status banner.
pub struct App<G: ?Sized> {
    gateway: Arc<G>,
    account: Address,
    listings: Vec<Listing>,
    page: MarketPage,
    pub notification: Notification,
}

impl<G: MarketGateway + ?Sized + 'static> App<G> {
    pub fn new(gateway: Arc<G>, account: Address, notification: Notification) -> Self {
        App {
            gateway,
            account,
            listings: Vec::new(),
            page: MarketPage::default(),
            notification,
        }
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn page(&self) -> &MarketPage {
        &self.page
    }

    fn fail<T>(&mut self, err: AppError) -> AppResult<T> {
        warn!("{}", err);
        self.notification.show(err.banner());
        Err(err)
    }

    /// Initial page load: balance first, then listings.
    pub async fn start(&mut self) -> AppResult<()> {
        self.notification.show("⌛ Loading...");
        self.refresh_balance().await?;
        self.load_listings().await?;
        self.notification.hide();
        Ok(())
    }

    /// Replaces the listings and re-renders. On failure the previous
    /// listings and markup stay in place.
    pub async fn load_listings(&mut self) -> AppResult<()> {
        let activity_log = self.notification.activity_log().clone();

        match get_all_listings(Arc::clone(&self.gateway), activity_log).await {
            Ok(listings) => {
                self.page.marketplace = render_marketplace(&listings);
                self.listings = listings;
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    pub async fn refresh_balance(&mut self) -> AppResult<()> {
        match self.gateway.balance(self.account).await {
            Ok(balance) => {
                self.page.balance = to_display(balance);
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    /// Validates the form, submits `writeHouse` and reloads on success.
    pub async fn create_listing(&mut self, form: NewListing) -> AppResult<()> {
        let draft = match form.validate() {
            Ok(draft) => draft,
            Err(err) => return self.fail(err),
        };

        self.notification.show(format!("⌛ Adding \"{}\"...", draft.name));

        if let Err(err) = self.gateway.create_listing(&draft).await {
            return self.fail(err);
        }

        self.notification
            .show(format!("🎉 You successfully added \"{}\".", draft.name));
        self.load_listings().await
    }

    /// Approves the price, buys the house, then reloads listings and balance.
    pub async fn buy(&mut self, id: ListingId) -> AppResult<()> {
        let listing = self.listings.iter().find(|listing| listing.id == id).cloned();
        let listing = match listing {
            Some(listing) => listing,
            None => {
                return self.fail(AppError::ValidationFailed(format!(
                    "There is no house with id {}",
                    id
                )))
            }
        };

        self.notification.show("⌛ Waiting for payment approval...");
        if let Err(err) = self.gateway.approve_spend(listing.price).await {
            return self.fail(err);
        }

        self.notification
            .show(format!("⌛ Awaiting payment for \"{}\"...", listing.name));
        if let Err(err) = self.gateway.purchase(id).await {
            return self.fail(err);
        }

        self.notification
            .show(format!("🎉 You successfully bought \"{}\".", listing.name));

        let reloaded = self.load_listings().await;
        let refreshed = self.refresh_balance().await;
        reloaded.and(refreshed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use ethers::types::U256;

    use super::*;
    use crate::services::gateway::mock::{cusd, house, MockGateway};

    fn app(gateway: &Arc<MockGateway>) -> App<MockGateway> {
        App::new(
            Arc::clone(gateway),
            Address::from_low_u64_be(0xa11ce),
            Notification::default(),
        )
    }

    fn two_houses() -> Arc<MockGateway> {
        Arc::new(MockGateway::with_houses(
            vec![house("Villa", cusd(5), 2), house("Cabin", cusd(10), 1)],
            cusd(100),
        ))
    }

    fn form() -> NewListing {
        NewListing {
            name: "Loft".into(),
            image_url: "https://images.example/loft.png".into(),
            description: "Open plan".into(),
            location: "Nairobi".into(),
            price: "10".into(),
            supply: "4".into(),
        }
    }

    #[tokio::test]
    async fn start_loads_balance_and_listings() {
        let gateway = two_houses();
        let mut app = app(&gateway);

        app.start().await.unwrap();

        assert_eq!(app.page().balance, "100.00");
        assert_eq!(app.listings().len(), 2);
        assert!(app.page().marketplace.contains("Buy for 5.00 cUSD"));
        assert!(!app.notification.is_visible());
    }

    #[tokio::test]
    async fn buy_reloads_listings_and_balance_once() {
        let gateway = two_houses();
        let mut app = app(&gateway);
        app.start().await.unwrap();

        let loads_before = MockGateway::calls(&gateway.count_calls);
        let balance_before = MockGateway::calls(&gateway.balance_calls);

        app.buy(ListingId(0)).await.unwrap();

        assert_eq!(MockGateway::calls(&gateway.count_calls), loads_before + 1);
        assert_eq!(MockGateway::calls(&gateway.balance_calls), balance_before + 1);
        assert_eq!(app.notification.text(), "🎉 You successfully bought \"Villa\".");
        assert_eq!(app.page().balance, "95.00");
        assert_eq!(app.listings()[0].sold, U256::one());
        assert_eq!(app.listings()[0].supply, U256::one());
    }

    #[tokio::test]
    async fn buy_targets_the_listing_id_not_the_position() {
        let gateway = two_houses();
        let mut app = app(&gateway);
        app.load_listings().await.unwrap();
        app.listings.reverse();

        app.buy(ListingId(1)).await.unwrap();

        let houses = gateway.houses.lock().unwrap();
        assert_eq!(houses[1].fields.sold, U256::one());
        assert_eq!(houses[0].fields.sold, U256::zero());
    }

    #[tokio::test]
    async fn failed_approval_stops_before_purchase() {
        let gateway = two_houses();
        gateway.fail_approve.store(true, Ordering::SeqCst);
        let mut app = app(&gateway);
        app.load_listings().await.unwrap();

        let err = app.buy(ListingId(0)).await.unwrap_err();

        assert!(matches!(err, AppError::TransactionFailed(_)));
        assert_eq!(MockGateway::calls(&gateway.purchase_calls), 0);
        assert!(app.notification.text().starts_with("⚠️ Transaction failed"));
    }

    #[tokio::test]
    async fn failed_purchase_keeps_previous_listings() {
        let gateway = two_houses();
        gateway.fail_purchase.store(true, Ordering::SeqCst);
        let mut app = app(&gateway);
        app.load_listings().await.unwrap();
        let loads_before = MockGateway::calls(&gateway.count_calls);

        assert!(app.buy(ListingId(1)).await.is_err());

        assert_eq!(MockGateway::calls(&gateway.count_calls), loads_before);
        assert_eq!(app.listings().len(), 2);
        assert!(app.notification.text().starts_with("⚠️"));
    }

    #[tokio::test]
    async fn unknown_listing_is_rejected_without_transactions() {
        let gateway = two_houses();
        let mut app = app(&gateway);
        app.load_listings().await.unwrap();

        let err = app.buy(ListingId(9)).await.unwrap_err();

        assert!(matches!(err, AppError::ValidationFailed(_)));
        assert_eq!(MockGateway::calls(&gateway.approve_calls), 0);
    }

    #[tokio::test]
    async fn create_with_any_empty_field_sends_nothing() {
        let gateway = two_houses();
        let mut app = app(&gateway);

        for blank in 0..6 {
            let mut form = form();
            match blank {
                0 => form.name.clear(),
                1 => form.image_url.clear(),
                2 => form.description.clear(),
                3 => form.location.clear(),
                4 => form.price.clear(),
                _ => form.supply.clear(),
            }

            let err = app.create_listing(form).await.unwrap_err();

            assert!(matches!(err, AppError::ValidationFailed(_)));
            assert_eq!(
                app.notification.text(),
                "⚠️ Please fill in all the required fields."
            );
        }
        assert_eq!(MockGateway::calls(&gateway.create_calls), 0);
    }

    #[tokio::test]
    async fn create_scales_price_and_reloads() {
        let gateway = two_houses();
        let mut app = app(&gateway);

        app.create_listing(form()).await.unwrap();

        assert_eq!(app.listings().len(), 3);
        let loft = &app.listings()[2];
        assert_eq!(loft.id, ListingId(2));
        assert_eq!(loft.price, U256::from(10u64) * U256::exp10(18));
        assert!(app.page().marketplace.contains("Buy for 10.00 cUSD"));
        assert_eq!(app.notification.text(), "🎉 You successfully added \"Loft\".");
    }

    #[tokio::test]
    async fn failed_create_does_not_reload() {
        let gateway = two_houses();
        gateway.fail_create.store(true, Ordering::SeqCst);
        let mut app = app(&gateway);

        assert!(app.create_listing(form()).await.is_err());

        assert_eq!(MockGateway::calls(&gateway.count_calls), 0);
        assert!(app.notification.text().starts_with("⚠️ Transaction failed"));
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_page() {
        let gateway = two_houses();
        let mut app = app(&gateway);
        app.load_listings().await.unwrap();
        let markup = app.page().marketplace.clone();

        gateway.fail_reads.store(true, Ordering::SeqCst);
        assert!(app.load_listings().await.is_err());

        assert_eq!(app.page().marketplace, markup);
        assert_eq!(app.listings().len(), 2);
        assert!(app.notification.text().starts_with("⚠️ Read failed"));
    }
}
