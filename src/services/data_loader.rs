use std::sync::Arc;

use ethers::types::U256;
use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::errors::{AppError, AppResult};
use crate::models;
use crate::models::ListingId;
use crate::services::gateway::MarketGateway;
use crate::try_join_all;

mod logging {
    pub use super::super::logging::logger;
}
use logging::logger::ActivityLog;

pub mod listings {
    use super::*;

    type TaskListing = JoinHandle<AppResult<models::Listing>>;

    /// Fetches every listing, one task per index, three concurrent reads per
    /// task. Any failed read fails the whole load; an unwritable activity log
    /// does not.
    pub async fn get_all_listings<G>(
        gateway: Arc<G>,
        activity_log: ActivityLog,
    ) -> AppResult<Vec<models::Listing>>
    where
        G: MarketGateway + ?Sized + 'static,
    {
        let listing_count = gateway.listing_count().await?;
        if listing_count > U256::from(u64::MAX) {
            return Err(AppError::ReadFailed(format!(
                "listing count {} out of range",
                listing_count
            )));
        }
        let listing_count: u64 = listing_count.as_u64();

        let mut handles: Vec<TaskListing> = Vec::new();

        for i in 0..listing_count {
            let gateway_clone: Arc<G> = Arc::clone(&gateway);
            let log = activity_log.clone();
            let handle: TaskListing = tokio::spawn(async move {
                let id = ListingId(i);
                let (fields, supply, purchasable) = tokio::try_join!(
                    gateway_clone.listing(id),
                    gateway_clone.supply(id),
                    gateway_clone.purchasable(id),
                )?;

                let output = format!("Listing {} of {} fetched", i + 1, listing_count);
                debug!("{}", output);
                if let Err(err) = log.log_new_line(&output) {
                    warn!("activity log unavailable: {}", err);
                }

                Ok(models::Listing::new(id, fields, supply, purchasable))
            });

            handles.push(handle);
        }

        let results = try_join_all(handles)
            .await
            .map_err(|err| AppError::ReadFailed(format!("listing task failed: {}", err)))?;

        // join order is spawn order, so ids stay ascending
        results.into_iter().collect()
    }
}
