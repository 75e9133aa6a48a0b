//! Checkout command.

use clap::Args;
use vitashop_storefront::Storefront;
use vitashop_storefront::checkout::{CheckoutError, CheckoutForm};
use vitashop_storefront::error::{Result, add_breadcrumb};

use super::money;

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: String,

    /// 10 to 15 digits
    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub address: String,

    /// Optional note for the order
    #[arg(long, default_value = "")]
    pub message: String,
}

impl From<CheckoutArgs> for CheckoutForm {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            address: args.address,
            message: args.message,
        }
    }
}

/// Submit the current cart as an order.
pub async fn run(storefront: &Storefront, args: CheckoutArgs) -> Result<()> {
    let form = CheckoutForm::from(args);
    let session = storefront.checkout();
    let total = storefront.cart().total_price();

    add_breadcrumb("checkout", "Submit order", None);

    match session.submit(&form).await {
        Ok(confirmation) => {
            println!("{}", confirmation.message);
            println!("Total charged: {}", money(total));
            Ok(())
        }
        Err(CheckoutError::Invalid(errors)) => {
            println!("Please fix the following:");
            for error in errors.errors() {
                println!("  {}: {}", error.field, error.message);
            }
            Err(CheckoutError::Invalid(errors).into())
        }
        Err(e) => {
            println!("{e}");
            Err(e.into())
        }
    }
}
