use std::env;
use std::sync::Arc;

use eyre::Result;
use futures::future::try_join_all;

mod config;
mod errors;
mod models;

mod services {
    pub mod actions;
    pub mod data_loader;
    pub mod gateway;
    pub mod identicon;
    pub mod logging;
    pub mod notification;
    pub mod render;
    pub mod wallet;
}

use config::Config;
use errors::{AppError, AppResult};
use models::amount::to_display;
use models::{ListingId, NewListing};
use services::actions::App;
use services::gateway::ContractGateway;
use services::logging::logger::{self, ActivityLog};
use services::notification::Notification;
use services::render::{list_items, ListRegion};
use services::wallet::connect;

const USAGE: &str = "usage: house-market [list | balance | buy <id> | demo | \
create <name> <image-url> <description> <location> <price> <supply>]";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Balance,
    Create(NewListing),
    Buy(ListingId),
    Demo,
}

impl Command {
    fn parse(args: &[String]) -> AppResult<Command> {
        let usage = || AppError::ValidationFailed(USAGE.to_string());

        match args.first().map(String::as_str) {
            None | Some("list") => Ok(Command::List),
            Some("balance") => Ok(Command::Balance),
            Some("demo") => Ok(Command::Demo),
            Some("buy") => {
                let id = args.get(1).ok_or_else(usage)?;
                let id = id.trim().parse::<u64>().map_err(|_| usage())?;
                Ok(Command::Buy(ListingId(id)))
            }
            Some("create") => {
                let field = |i: usize| args.get(i).cloned().unwrap_or_default();
                Ok(Command::Create(NewListing {
                    name: field(1),
                    image_url: field(2),
                    description: field(3),
                    location: field(4),
                    price: field(5),
                    supply: field(6),
                }))
            }
            Some(_) => Err(usage()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    if command == Command::Demo {
        let mut region = ListRegion::new("myList");
        list_items(&mut region);
        println!("{}", region.markup());
        return Ok(());
    }

    let config = Config::from_env()?;
    logger::init();

    let mut notification = Notification::terminal(ActivityLog::new(&config.log_file));
    notification.show("⌛ Loading...");
    let signing = connect(&config, &mut notification).await?;

    let gateway = Arc::new(ContractGateway::new(
        Arc::clone(&signing.client),
        config.marketplace_address,
        config.cusd_address,
    ));
    let mut app = App::new(gateway, signing.account, notification);
    app.start().await?;

    match command {
        Command::List | Command::Demo => {}
        Command::Balance => println!("Balance: {} cUSD", app.page().balance),
        Command::Create(form) => app.create_listing(form).await?,
        Command::Buy(id) => app.buy(id).await?,
    }

    for listing in app.listings() {
        println!(
            "#{} {} ({}) {} cUSD, {} sold, {}",
            listing.id,
            listing.name,
            listing.location,
            to_display(listing.price),
            listing.sold,
            if listing.purchasable {
                format!("{} available", listing.supply)
            } else {
                "sold out".to_string()
            }
        );
    }

    app.page().write_to(&config.page_path)?;
    println!("Marketplace written to {}", config.page_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn no_arguments_lists() {
        assert_eq!(Command::parse(&[]).unwrap(), Command::List);
        assert_eq!(Command::parse(&args(&["demo"])).unwrap(), Command::Demo);
    }

    #[test]
    fn buy_takes_a_numeric_id() {
        assert_eq!(
            Command::parse(&args(&["buy", "3"])).unwrap(),
            Command::Buy(ListingId(3))
        );
        assert!(Command::parse(&args(&["buy", "three"])).is_err());
        assert!(Command::parse(&args(&["buy"])).is_err());
    }

    #[test]
    fn create_keeps_missing_fields_empty() {
        let command = Command::parse(&args(&["create", "Villa", "https://img", "Nice"])).unwrap();

        match command {
            Command::Create(form) => {
                assert_eq!(form.name, "Villa");
                assert!(form.location.is_empty());
                assert!(form.has_empty_field());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(Command::parse(&args(&["sell"])).is_err());
    }
}
