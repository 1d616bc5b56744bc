use std::fs;
use std::path::Path;

use hex::encode;

use crate::config::EXPLORER_URL;
use crate::errors::AppResult;
use crate::models::amount::to_display;
use crate::models::Listing;
use crate::services::identicon::Identicon;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Markup of the whole marketplace region, rebuilt from scratch.
pub fn render_marketplace(listings: &[Listing]) -> String {
    listings
        .iter()
        .map(|listing| format!("<div class=\"col-md-4\">{}</div>\n", house_template(listing)))
        .collect()
}

fn availability(listing: &Listing) -> String {
    if listing.purchasable {
        format!("{} houses", listing.supply)
    } else {
        "sold out".to_string()
    }
}

pub fn house_template(listing: &Listing) -> String {
    format!(
        r#"
    <div class="card mb-4">
      <img class="card-img-top" src="{image}" alt="...">
      <div class="position-absolute top-0 end-0 bg-warning mt-4 px-2 py-1 rounded-start">
        {sold} Sold
      </div>
      <div class="card-body text-left p-4 position-relative">
        <div class="translate-middle-y position-absolute top-0">
        {identicon}
        </div>
        <h2 class="card-title fs-4 fw-bold mt-2">{name}</h2>
        <p class="card-text mb-4" style="min-height: 82px">
          {description}
        </p>
        <p class="card-text mt-4">
          <i class="bi bi-geo-alt-fill"></i>
          <span>{location}</span>
          <span class="float-end bg-primary px-2 py-1 mb-2 text-white rounded-2">{availability}</span>
        </p>
        <div class="d-grid gap-2">
          <button class="btn btn-lg btn-outline-dark buyBtn fs-6 p-3" data-listing-id="{id}"{disabled}>
            Buy for {price} cUSD
          </button>
        </div>
      </div>
    </div>
"#,
        image = escape(&listing.image_url),
        sold = listing.sold,
        identicon = identicon_template(&format!("0x{}", encode(listing.owner.as_bytes()))),
        name = escape(&listing.name),
        description = escape(&listing.description),
        location = escape(&listing.location),
        availability = availability(listing),
        id = listing.id,
        disabled = if listing.purchasable { "" } else { " disabled" },
        price = to_display(listing.price),
    )
}

fn identicon_template(address: &str) -> String {
    format!(
        r#"<div class="rounded-circle overflow-hidden d-inline-block border border-white border-2 shadow-sm m-0">
          <a href="{explorer}/address/{address}/transactions" target="_blank" title="{address}">
            {icon}
          </a>
        </div>"#,
        explorer = EXPLORER_URL,
        address = address,
        icon = Identicon::new(address).to_svg(),
    )
}

/// Named display regions of the marketplace page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MarketPage {
    pub marketplace: String,
    pub balance: String,
}

impl MarketPage {
    pub fn to_html(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>House Market</title>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.0.2/dist/css/bootstrap.min.css">
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap-icons@1.5.0/font/bootstrap-icons.css">
</head>
<body>
  <div class="container mt-2">
    <nav class="navbar bg-white navbar-light">
      <span class="navbar-brand m-0 h4 fw-bold">House Market</span>
      <span class="nav-link border rounded-pill bg-light">
        <span id="balance">{balance}</span> cUSD
      </span>
    </nav>
    <div class="row" id="marketplace">
{marketplace}    </div>
  </div>
</body>
</html>
"#,
            balance = escape(&self.balance),
            marketplace = self.marketplace,
        )
    }

    pub fn write_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_html())?;
        Ok(())
    }
}

/// The `myList` region of the list-items demo page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRegion {
    pub id: String,
    pub items: Vec<String>,
}

impl ListRegion {
    pub fn new(id: &str) -> Self {
        ListRegion {
            id: id.to_string(),
            items: Vec::new(),
        }
    }

    pub fn markup(&self) -> String {
        let items: String = self
            .items
            .iter()
            .map(|item| format!("  <li>{}</li>\n", escape(item)))
            .collect();
        format!("<ul id=\"{}\">\n{}</ul>", escape(&self.id), items)
    }
}

/// Appends the three demo items to `region`.
pub fn list_items(region: &mut ListRegion) {
    let items = ["Item 1", "Item 2", "Item 3"];

    for item in items {
        region.items.push(item.to_string());
    }
}
