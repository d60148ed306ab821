mod actor_framework;
mod app_system;
mod category_actor;
mod checkout;
mod clients;
mod config;
mod domain;
mod messages;
mod notifications;
mod order_actor;
mod platform;
mod product_actor;
mod snapshot;
mod ticket_actor;

#[cfg(test)]
mod mock_framework;
#[cfg(test)]
mod integration_tests;

use std::sync::Arc;
use anyhow::Context;
use chrono::Utc;
use tracing::{error, info, Instrument};
use crate::app_system::{setup_tracing, StorefrontSystem};
use crate::checkout::Cart;
use crate::clients::ProductForm;
use crate::config::Config;
use crate::domain::{format_amount, Member, PaymentMethod};
use crate::platform::InMemoryChat;
use crate::snapshot::StoreSnapshot;

/// Runs one scripted purchase against an in-memory chat platform.
///
/// With `STOREFRONT_SNAPSHOT_PATH` set, state is loaded before and saved after,
/// so a deferred close left pending by one run is finished by the next.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    setup_tracing();

    let config = Config::from_env().context("loading STOREFRONT_* configuration")?;
    let system = StorefrontSystem::start(&config, Arc::new(InMemoryChat::new()));

    if let Some(path) = &config.snapshot_path {
        let snapshot = StoreSnapshot::load(path).await?;
        system.restore(snapshot).await?;
    }
    let recovered = system.recover_pending_closes().await?;
    info!(recovered, "Startup sweep done");

    let admin = Member::new(1).administrator();
    let buyer = Member::new(42);

    let span = tracing::info_span!("catalog_setup");
    let product = async {
        let category = system
            .catalog
            .add_category(&admin, "Robux".to_string(), Some("💎".to_string()))
            .await?;
        system
            .catalog
            .add_product(
                &admin,
                ProductForm {
                    name: "Robux 400".to_string(),
                    price: "10,50".to_string(),
                    stock: "5".to_string(),
                    category_id: category.id,
                    ..Default::default()
                },
            )
            .await
    }
    .instrument(span)
    .await?;
    info!(product_id = %product.id, price = %format_amount(product.price), "Catalog ready");

    let span = tracing::info_span!("purchase");
    let purchase = async {
        let now = Utc::now();
        let mut cart = Cart::open(buyer.id, &product, config.cart_timeout, now)?;
        cart.set_quantity_input("3", now)?;

        let ticket = system.checkout.finalize_cart(buyer.clone(), &cart, now).await?;
        system
            .checkout
            .choose_method(buyer.clone(), ticket.code.clone(), PaymentMethod::PixCopyPaste)
            .await?;
        system.checkout.approve(admin.clone(), ticket.code).await
    }
    .instrument(span)
    .await;

    match purchase {
        Ok(order) => info!(order_id = %order.id, total = %format_amount(order.total), "Purchase approved"),
        Err(e) => error!(error = %e, "Purchase failed"),
    }

    let report = system.reports.sales_report(&admin).await?;
    info!(
        approved = report.summary.approved_count,
        revenue = %format_amount(report.summary.revenue),
        "Sales so far"
    );

    if let Some(path) = &config.snapshot_path {
        system.snapshot().await?.save(path).await?;
    }
    system.shutdown().await?;

    info!("Storefront stopped");
    Ok(())
}
