//! `vivalife`: drive the storefront cart from the command line.
//!
//! State lives in the data directory (`VIVALIFE_DATA_DIR`, default
//! `{data_dir}/vivalife`), so successive runs share one cart.

mod command;

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;

use vivalife_cart::{AddOutcome, CartConfig, CartSignal, CartStore, CheckoutOutcome, LineItem, OrderSummary};
use vivalife_events::{EventBus, InMemoryEventBus};
use vivalife_products::{ProductCatalog, load_catalog};
use vivalife_storage::FileStore;

use command::Command;

fn main() -> anyhow::Result<()> {
    vivalife_observability::init();

    let command = Command::parse(std::env::args().skip(1))?;
    let config = CartConfig::from_env();

    let store = match std::env::var("VIVALIFE_DATA_DIR") {
        Ok(dir) => FileStore::open(dir),
        Err(_) => FileStore::open_default(),
    }
    .context("failed to open data directory")?;
    let store = Arc::new(store);
    tracing::info!(dir = %store.dir().display(), "using data directory");

    let today = chrono::Local::now().date_naive();
    let catalog = Arc::new(load_catalog(
        &*store,
        &config.inventory_key,
        &config.pharmacies_key,
        today,
    ));
    let oracle = config.stock_oracle(Arc::clone(&store), Arc::clone(&catalog));

    let bus = Arc::new(InMemoryEventBus::new());
    let mut cart = CartStore::open(Arc::clone(&store), Arc::clone(&catalog), oracle, Arc::clone(&bus), config)
        .context("failed to load cart")?;
    let signals = bus.subscribe();

    match command {
        Command::Show => print_cart(cart.items(), &cart.summary()),
        Command::Products { category, term } => {
            let products = catalog.search(category, &term);
            if products.is_empty() {
                println!("no products match");
            }
            for product in products {
                let rx = if product.prescription { "  [Rx]" } else { "" };
                println!("{:<10} {:<32} {}{rx}", product.id, product.name, product.price);
            }
        }
        Command::Add {
            product_id,
            quantity,
        } => {
            if cart.add_item(&product_id, quantity)? == AddOutcome::UnknownProduct {
                println!("no product `{product_id}` in the catalog");
            }
        }
        Command::Remove { product_id } => {
            cart.remove_item(&product_id)?;
        }
        Command::SetQuantity {
            product_id,
            quantity,
        } => {
            if !cart.set_quantity(&product_id, quantity)? {
                println!("nothing changed");
            }
        }
        Command::Clear { confirmed } => {
            cart.clear(|| confirmed || confirm_on_stdin("Are you sure you want to clear your cart?"))?;
        }
        Command::Validate => {
            if cart.validate()?.is_clean() {
                println!("cart matches current stock");
            }
        }
        Command::Checkout => {
            let outcome = cart.checkout(&mut |summary: &OrderSummary| {
                println!("Proceeding to checkout. Total: {}", summary.total);
            });
            if let CheckoutOutcome::PrescriptionRequired(items) = outcome {
                for id in items {
                    println!("  needs prescription: {id}");
                }
            }
        }
    }

    for signal in signals.drain() {
        match signal {
            CartSignal::Posted(notice) => println!("> {}", notice.message()),
            CartSignal::Refreshed(view) => print_cart(&view.items, &view.summary),
            CartSignal::Dismissed(_) => {}
        }
    }
    Ok(())
}

fn print_cart(items: &[LineItem], summary: &OrderSummary) {
    if items.is_empty() {
        println!("Your cart is empty");
    }
    for line in items {
        println!(
            "{:<10} {:<32} {:>3} x {} = {}",
            line.product_id,
            line.name,
            line.quantity,
            line.unit_price,
            line.line_total()
        );
    }
    println!("Items:    {}", summary.item_count);
    println!("Subtotal: {}", summary.subtotal);
    if summary.free_delivery {
        println!("Delivery: Free");
    } else {
        println!("Delivery: {}", summary.delivery_fee);
    }
    println!("Total:    {}", summary.total);
}

fn confirm_on_stdin(question: &str) -> bool {
    print!("{question} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
        Err(err) => {
            tracing::warn!(error = %err, "could not read confirmation");
            false
        }
    }
}
