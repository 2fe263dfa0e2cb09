//! Report generation business logic.
//!
//! Structured summaries over the recorded sales history. Everything here is
//! UI-agnostic data for whatever layer renders it.

use std::collections::HashMap;

use crate::{errors::Result, store::Store};

/// Totals over a set of sales.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesSummary {
    /// Number of sales recorded
    pub sale_count: usize,
    /// Units sold across all sales
    pub units_sold: i64,
    /// Sum of total prices
    pub revenue: f64,
    /// Sum of amounts actually paid
    pub collected: f64,
    /// Revenue not yet collected (credit and partial payments)
    pub outstanding: f64,
}

/// Per-article sales totals.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleSales {
    /// The article the totals are for
    pub article_id: i64,
    /// Article name as denormalized on the most recent sale
    pub article_name: String,
    /// Units sold of this article
    pub units_sold: i64,
    /// Revenue from this article
    pub revenue: f64,
}

/// Computes the overall totals over the whole sales history.
pub async fn sales_summary(store: &dyn Store) -> Result<SalesSummary> {
    let sales = store.list_sales().await?;

    let mut summary = SalesSummary {
        sale_count: sales.len(),
        units_sold: 0,
        revenue: 0.0,
        collected: 0.0,
        outstanding: 0.0,
    };
    for sale in &sales {
        summary.units_sold += sale.quantity;
        summary.revenue += sale.total_price;
        summary.collected += sale.amount_paid;
    }
    summary.outstanding = summary.revenue - summary.collected;

    Ok(summary)
}

/// Computes per-article totals, sorted by revenue, highest first.
///
/// Sales are grouped by the referenced article id; the name shown is the one
/// denormalized on the newest sale of each group.
pub async fn sales_by_article(store: &dyn Store) -> Result<Vec<ArticleSales>> {
    let sales = store.list_sales().await?;

    // list_sales is newest first, so the first sale seen per article carries
    // the freshest denormalized name
    let mut by_article: HashMap<i64, ArticleSales> = HashMap::new();
    for sale in &sales {
        let entry = by_article
            .entry(sale.article_id)
            .or_insert_with(|| ArticleSales {
                article_id: sale.article_id,
                article_name: sale.article_name.clone(),
                units_sold: 0,
                revenue: 0.0,
            });
        entry.units_sold += sale.quantity;
        entry.revenue += sale.total_price;
    }

    let mut totals: Vec<ArticleSales> = by_article.into_values().collect();
    totals.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.article_name.cmp(&b.article_name))
    });
    Ok(totals)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::sale::{PaymentMethod, create_sale};
    use crate::test_utils::{cash_sale_input, create_test_article, setup_database_store};

    #[tokio::test]
    async fn test_sales_summary_empty() -> Result<()> {
        let store = setup_database_store().await?;

        let summary = sales_summary(&store).await?;
        assert_eq!(summary.sale_count, 0);
        assert_eq!(summary.units_sold, 0);
        assert_eq!(summary.revenue, 0.0);
        assert_eq!(summary.outstanding, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_sales_summary_tracks_outstanding() -> Result<()> {
        let store = setup_database_store().await?;
        let article = create_test_article(&store, "Sugar", 5.0, 20).await?;

        // 2 units fully paid in cash: 10.0 collected
        let mut paid = cash_sale_input(article.id, 2);
        paid.amount_paid = 10.0;
        create_sale(&store, paid).await?;

        // 3 units on credit: 15.0 outstanding
        let mut credit = cash_sale_input(article.id, 3);
        credit.payment_method = PaymentMethod::NoPayment;
        create_sale(&store, credit).await?;

        let summary = sales_summary(&store).await?;
        assert_eq!(summary.sale_count, 2);
        assert_eq!(summary.units_sold, 5);
        assert_eq!(summary.revenue, 25.0);
        assert_eq!(summary.collected, 10.0);
        assert_eq!(summary.outstanding, 15.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_sales_by_article_groups_and_sorts() -> Result<()> {
        let store = setup_database_store().await?;
        let sugar = create_test_article(&store, "Sugar", 5.0, 20).await?;
        let flour = create_test_article(&store, "Flour", 3.0, 20).await?;

        create_sale(&store, cash_sale_input(sugar.id, 2)).await?; // 10.0
        create_sale(&store, cash_sale_input(sugar.id, 1)).await?; // 5.0
        create_sale(&store, cash_sale_input(flour.id, 4)).await?; // 12.0

        let totals = sales_by_article(&store).await?;
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].article_name, "Sugar");
        assert_eq!(totals[0].units_sold, 3);
        assert_eq!(totals[0].revenue, 15.0);
        assert_eq!(totals[1].article_name, "Flour");
        assert_eq!(totals[1].revenue, 12.0);

        Ok(())
    }
}
