use std::fmt;

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// On-chain position of a house in the marketplace's listing array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListingId(pub u64);

impl ListingId {
    pub fn as_u256(self) -> U256 {
        U256::from(self.0)
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Static fields returned by `readHouse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseFields {
    pub owner: Address,
    pub name: String,
    pub image_url: String,
    pub description: String,
    pub location: String,
    pub price: U256,
    pub sold: U256,
}

impl From<(Address, String, String, String, String, U256, U256)> for HouseFields {
    fn from(
        (owner, name, image_url, description, location, price, sold): (
            Address,
            String,
            String,
            String,
            String,
            U256,
            U256,
        ),
    ) -> Self {
        HouseFields {
            owner,
            name,
            image_url,
            description,
            location,
            price,
            sold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub owner: Address,
    pub name: String,
    pub image_url: String,
    pub description: String,
    pub location: String,
    pub price: U256, // smallest unit
    pub sold: U256,
    pub supply: U256,
    pub purchasable: bool,
}

impl Listing {
    pub fn new(id: ListingId, fields: HouseFields, supply: U256, purchasable: bool) -> Self {
        Listing {
            id,
            owner: fields.owner,
            name: fields.name,
            image_url: fields.image_url,
            description: fields.description,
            location: fields.location,
            price: fields.price,
            sold: fields.sold,
            supply,
            purchasable,
        }
    }
}

/// Raw form input for a new house listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewListing {
    pub name: String,
    pub image_url: String,
    pub description: String,
    pub location: String,
    pub price: String,
    pub supply: String,
}

impl NewListing {
    pub fn fields(&self) -> [&str; 6] {
        [
            &self.name,
            &self.image_url,
            &self.description,
            &self.location,
            &self.price,
            &self.supply,
        ]
    }

    pub fn has_empty_field(&self) -> bool {
        self.fields().iter().any(|field| field.trim().is_empty())
    }

    /// Checks the form and scales the price into the token's smallest unit.
    pub fn validate(&self) -> AppResult<ListingDraft> {
        if self.has_empty_field() {
            return Err(AppError::ValidationFailed(
                "Please fill in all the required fields".to_string(),
            ));
        }

        Ok(ListingDraft {
            name: self.name.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            price: amount::to_smallest_unit(&self.price)?,
            supply: amount::parse_count(&self.supply)?,
        })
    }
}

/// A validated `NewListing`, ready for `writeHouse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDraft {
    pub name: String,
    pub image_url: String,
    pub description: String,
    pub location: String,
    pub price: U256,
    pub supply: U256,
}

pub mod amount {
    use ethers::types::U256;
    use ethers::utils::{parse_units, ParseUnits};

    use crate::errors::{AppError, AppResult};

    /// cUSD, like every Celo stable token, uses 18 decimals.
    pub const ERC20_DECIMALS: u32 = 18;

    const DISPLAY_DIGITS: u32 = 2;

    /// Smallest-unit integer to a decimal string with two fractional digits,
    /// rounding half up.
    pub fn to_display(amount: U256) -> String {
        let scale = U256::exp10((ERC20_DECIMALS - DISPLAY_DIGITS) as usize);
        let cents = amount.saturating_add(scale / 2) / scale;
        let hundred = U256::from(100u64);

        format!("{}.{:02}", cents / hundred, (cents % hundred).as_u64())
    }

    /// Decimal text such as `"10"` or `"2.5"` to the smallest-unit integer.
    pub fn to_smallest_unit(input: &str) -> AppResult<U256> {
        let input = input.trim();

        if let Some((_, fraction)) = input.split_once('.') {
            if fraction.len() > ERC20_DECIMALS as usize {
                return Err(AppError::ValidationFailed(format!(
                    "Price \"{}\" has more than {} decimal places",
                    input, ERC20_DECIMALS
                )));
            }
        }

        match parse_units(input, ERC20_DECIMALS) {
            Ok(ParseUnits::U256(value)) => Ok(value),
            Ok(ParseUnits::I256(_)) => Err(AppError::ValidationFailed(format!(
                "Price must not be negative: {}",
                input
            ))),
            Err(err) => Err(AppError::ValidationFailed(format!(
                "Invalid price \"{}\": {}",
                input, err
            ))),
        }
    }

    pub fn parse_count(input: &str) -> AppResult<U256> {
        let input = input.trim();

        U256::from_dec_str(input).map_err(|err| {
            AppError::ValidationFailed(format!("Invalid supply \"{}\": {}", input, err))
        })
    }
}
