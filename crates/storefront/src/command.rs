use anyhow::{Context, bail};

use vivalife_core::ProductId;
use vivalife_products::ProductCategory;

pub const USAGE: &str = "\
usage: vivalife <command>

commands:
  show                      print the cart (default)
  products [-c <category>] [term]
                            list the catalog, optionally filtered
  add <product-id> [qty]    add to cart (qty defaults to 1)
  remove <product-id>       remove from cart
  set <product-id> <qty>    overwrite a quantity (0 removes)
  clear [--yes]             empty the cart
  validate                  re-check the cart against current stock
  checkout                  proceed to checkout";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Products {
        category: Option<ProductCategory>,
        term: String,
    },
    Add { product_id: ProductId, quantity: u32 },
    Remove { product_id: ProductId },
    SetQuantity { product_id: ProductId, quantity: i64 },
    Clear { confirmed: bool },
    Validate,
    Checkout,
}

impl Command {
    pub fn parse<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        let mut args = args.iter().map(String::as_str);

        let Some(verb) = args.next() else {
            return Ok(Command::Show);
        };
        let command = match verb {
            "show" => Command::Show,
            "products" => {
                let mut category = None;
                let mut words = Vec::new();
                while let Some(arg) = args.next() {
                    if matches!(arg, "-c" | "--category") {
                        let raw = args.next().context("missing category")?;
                        category = Some(
                            ProductCategory::from_slug(raw)
                                .with_context(|| format!("unknown category `{raw}`"))?,
                        );
                    } else {
                        words.push(arg);
                    }
                }
                Command::Products {
                    category,
                    term: words.join(" "),
                }
            }
            "add" => Command::Add {
                product_id: product_arg(args.next())?,
                quantity: args
                    .next()
                    .map(|raw| raw.parse::<u32>().with_context(|| format!("invalid quantity `{raw}`")))
                    .transpose()?
                    .unwrap_or(1),
            },
            "remove" => Command::Remove {
                product_id: product_arg(args.next())?,
            },
            "set" => {
                let product_id = product_arg(args.next())?;
                let raw = args.next().context("missing quantity")?;
                Command::SetQuantity {
                    product_id,
                    quantity: raw
                        .parse()
                        .with_context(|| format!("invalid quantity `{raw}`"))?,
                }
            }
            "clear" => match args.next() {
                None => Command::Clear { confirmed: false },
                Some("--yes" | "-y") => Command::Clear { confirmed: true },
                Some(other) => bail!("unexpected argument `{other}`"),
            },
            "validate" => Command::Validate,
            "checkout" => Command::Checkout,
            "help" | "--help" | "-h" => bail!("{USAGE}"),
            other => bail!("unknown command `{other}`\n\n{USAGE}"),
        };

        if let Some(extra) = args.next() {
            bail!("unexpected argument `{extra}`");
        }
        Ok(command)
    }
}

fn product_arg(raw: Option<&str>) -> anyhow::Result<ProductId> {
    let raw = raw.context("missing product id")?;
    raw.parse()
        .with_context(|| format!("invalid product id `{raw}`"))
}
