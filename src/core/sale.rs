//! Sale lifecycle business logic - Handles all sale-related operations.
//!
//! This module owns the stock reconciliation arithmetic: every sale creation,
//! edit and deletion computes the stock deltas it implies, validates that no
//! resulting stock would go negative, and only then writes. The sale row and
//! the stock adjustment are separate store calls with no transaction around
//! them; when a later write fails, the already-written rows are reverted
//! best-effort and the original error is surfaced.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    entities::{article, sale},
    errors::{Error, Result},
    store::{NewSale, Store},
};

/// How a sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    /// Paid in cash at the counter
    Cash,
    /// Paid by bank transfer, requires a bank name
    Transfer,
    /// Recorded without payment (credit sale)
    NoPayment,
}

impl PaymentMethod {
    /// The string stored on the sale row.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Transfer => "transfer",
            Self::NoPayment => "no-payment",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cash" => Ok(Self::Cash),
            "transfer" => Ok(Self::Transfer),
            "no-payment" => Ok(Self::NoPayment),
            other => Err(Error::InvalidPaymentMethod {
                value: other.to_string(),
            }),
        }
    }
}

/// Validated form input for creating or editing a sale.
#[derive(Debug, Clone)]
pub struct SaleInput {
    /// Article to sell (on edits: the article the sale should now reference)
    pub article_id: i64,
    /// Units to sell, must be positive
    pub quantity: i64,
    /// Buyer name, must be non-empty
    pub buyer: String,
    /// How the sale is paid
    pub payment_method: PaymentMethod,
    /// Bank name, required iff `payment_method` is [`PaymentMethod::Transfer`]
    pub bank_name: Option<String>,
    /// Amount already paid, clamped to 0 for [`PaymentMethod::NoPayment`]
    pub amount_paid: f64,
}

/// Applies the payment rules to the raw input.
///
/// `no-payment` forces the paid amount to 0; any method other than `transfer`
/// drops the bank name; `transfer` requires a non-blank bank name. The
/// surviving amount must be finite and within `[0, total]`.
fn normalize_payment(
    method: PaymentMethod,
    bank_name: Option<&str>,
    amount_paid: f64,
    total: f64,
) -> Result<(Option<String>, f64)> {
    let bank_name = match method {
        PaymentMethod::Transfer => {
            let bank = bank_name.map(str::trim).unwrap_or_default();
            if bank.is_empty() {
                return Err(Error::MissingBankName);
            }
            Some(bank.to_string())
        }
        PaymentMethod::Cash | PaymentMethod::NoPayment => None,
    };

    let amount_paid = if method == PaymentMethod::NoPayment {
        0.0
    } else {
        amount_paid
    };

    if !amount_paid.is_finite() || amount_paid < 0.0 {
        return Err(Error::InvalidAmount {
            amount: amount_paid,
        });
    }
    if amount_paid > total {
        return Err(Error::AmountExceedsTotal {
            paid: amount_paid,
            total,
        });
    }

    Ok((bank_name, amount_paid))
}

fn validated_buyer(buyer: &str) -> Result<String> {
    let buyer = buyer.trim();
    if buyer.is_empty() {
        return Err(Error::Config {
            message: "Buyer name cannot be empty".to_string(),
        });
    }
    Ok(buyer.to_string())
}

/// Retrieves all sales, newest first.
pub async fn list_sales(store: &dyn Store) -> Result<Vec<sale::Model>> {
    store.list_sales().await
}

/// Retrieves a specific sale by its unique ID.
pub async fn get_sale_by_id(store: &dyn Store, sale_id: i64) -> Result<Option<sale::Model>> {
    store.find_sale(sale_id).await
}

/// Retrieves all sales recorded against one article, newest first.
pub async fn get_sales_for_article(
    store: &dyn Store,
    article_id: i64,
) -> Result<Vec<sale::Model>> {
    store.sales_for_article(article_id).await
}

/// Records a sale and decrements the article's stock by the sold quantity.
///
/// The article's name and current price are denormalized onto the sale row,
/// and the total is computed from that price. The sale is rejected before any
/// write when the article is missing, the quantity is not positive, the stock
/// cannot cover it, or the payment input is inconsistent. If the stock write
/// fails after the sale row was persisted, the row is deleted again
/// best-effort and the stock error is surfaced.
pub async fn create_sale(store: &dyn Store, input: SaleInput) -> Result<sale::Model> {
    if input.quantity <= 0 {
        return Err(Error::InvalidQuantity {
            quantity: input.quantity,
        });
    }
    let buyer = validated_buyer(&input.buyer)?;

    let article = store
        .find_article(input.article_id)
        .await?
        .ok_or_else(|| Error::ArticleNotFound {
            id: input.article_id.to_string(),
        })?;

    if input.quantity > article.stock {
        return Err(Error::InsufficientStock {
            available: article.stock,
            requested: input.quantity,
        });
    }

    let total = article.price * input.quantity as f64;
    let (bank_name, amount_paid) = normalize_payment(
        input.payment_method,
        input.bank_name.as_deref(),
        input.amount_paid,
        total,
    )?;

    let sale = store
        .insert_sale(NewSale {
            article_id: article.id,
            article_name: article.name.clone(),
            unit_price: article.price,
            quantity: input.quantity,
            total_price: total,
            buyer,
            payment_method: input.payment_method.as_str().to_string(),
            bank_name,
            amount_paid,
            sold_at: chrono::Utc::now(),
        })
        .await?;

    match store.adjust_article_stock(article.id, -input.quantity).await {
        Ok(_) => Ok(sale),
        Err(err) => {
            // Compensate: the sale row is already persisted, take it back out
            if let Err(cleanup) = store.delete_sale(sale.id).await {
                warn!(sale_id = sale.id, error = %cleanup, "failed to roll back sale row after stock write failure");
            }
            Err(err)
        }
    }
}

/// Edits a sale, reconciling the stock of every article involved.
///
/// When the article reference is unchanged, the stock moves by
/// `original quantity - new quantity` in one adjustment; quantity increases
/// and decreases fall out of the same expression. When the sale is repointed
/// to a different article, the original article gets its quantity back and
/// the new article is decremented by the new quantity. Any resulting stock
/// below zero rejects the whole edit with nothing written.
///
/// The total is recomputed from the *current* price of the newly referenced
/// article and the denormalized name/price are refreshed to match; the sale
/// timestamp is preserved. The sale row is written first, then the stock
/// adjustments; on a stock failure the already-applied adjustments are
/// reversed and the original row restored, both best-effort.
pub async fn update_sale(store: &dyn Store, sale_id: i64, input: SaleInput) -> Result<sale::Model> {
    if input.quantity <= 0 {
        return Err(Error::InvalidQuantity {
            quantity: input.quantity,
        });
    }
    let buyer = validated_buyer(&input.buyer)?;

    let original = store
        .find_sale(sale_id)
        .await?
        .ok_or_else(|| Error::SaleNotFound {
            id: sale_id.to_string(),
        })?;

    let new_article = store
        .find_article(input.article_id)
        .await?
        .ok_or_else(|| Error::ArticleNotFound {
            id: input.article_id.to_string(),
        })?;

    // (article id, stock delta) pairs, applied in order after the row write
    let adjustments: Vec<(i64, i64)> = if original.article_id == new_article.id {
        let delta = original.quantity - input.quantity;
        if new_article.stock + delta < 0 {
            return Err(Error::InsufficientStock {
                available: new_article.stock + original.quantity,
                requested: input.quantity,
            });
        }
        vec![(new_article.id, delta)]
    } else {
        let original_article = store
            .find_article(original.article_id)
            .await?
            .ok_or_else(|| Error::ArticleNotFound {
                id: original.article_id.to_string(),
            })?;
        if new_article.stock - input.quantity < 0 {
            return Err(Error::InsufficientStock {
                available: new_article.stock,
                requested: input.quantity,
            });
        }
        vec![
            (original_article.id, original.quantity),
            (new_article.id, -input.quantity),
        ]
    };

    let total = new_article.price * input.quantity as f64;
    let (bank_name, amount_paid) = normalize_payment(
        input.payment_method,
        input.bank_name.as_deref(),
        input.amount_paid,
        total,
    )?;

    let updated = sale::Model {
        id: original.id,
        article_id: new_article.id,
        article_name: new_article.name.clone(),
        unit_price: new_article.price,
        quantity: input.quantity,
        total_price: total,
        buyer,
        payment_method: input.payment_method.as_str().to_string(),
        bank_name,
        amount_paid,
        sold_at: original.sold_at,
    };

    // Row first, then stock. A failure here leaves nothing persisted.
    let updated = store.update_sale(updated).await?;

    for (idx, &(article_id, delta)) in adjustments.iter().enumerate() {
        if let Err(err) = store.adjust_article_stock(article_id, delta).await {
            // Compensate: reverse the adjustments already applied, then
            // restore the original sale row
            for &(prev_id, prev_delta) in adjustments[..idx].iter().rev() {
                if let Err(cleanup) = store.adjust_article_stock(prev_id, -prev_delta).await {
                    warn!(article_id = prev_id, error = %cleanup, "failed to reverse stock adjustment after edit failure");
                }
            }
            if let Err(cleanup) = store.update_sale(original.clone()).await {
                warn!(sale_id = original.id, error = %cleanup, "failed to restore sale row after edit failure");
            }
            return Err(err);
        }
    }

    Ok(updated)
}

/// Deletes a sale and restores the sold quantity to the article's stock.
///
/// The stock is restored first, then the row removed; if the row delete
/// fails the restoration is taken back best-effort.
pub async fn delete_sale(store: &dyn Store, sale_id: i64) -> Result<()> {
    let sale = store
        .find_sale(sale_id)
        .await?
        .ok_or_else(|| Error::SaleNotFound {
            id: sale_id.to_string(),
        })?;

    let article: article::Model = store
        .find_article(sale.article_id)
        .await?
        .ok_or_else(|| Error::ArticleNotFound {
            id: sale.article_id.to_string(),
        })?;

    store.adjust_article_stock(article.id, sale.quantity).await?;

    if let Err(err) = store.delete_sale(sale.id).await {
        // Compensate: the restoration already went through, take it back
        if let Err(cleanup) = store.adjust_article_stock(article.id, -sale.quantity).await {
            warn!(article_id = article.id, error = %cleanup, "failed to reverse stock restoration after delete failure");
        }
        return Err(err);
    }

    Ok(())
}
