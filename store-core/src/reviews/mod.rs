//! Review Aggregation
//!
//! Reviews live on the author's user document; the product document carries
//! only the folded aggregate (`rating`, `review_count`). Submitting a review
//! prepends it to the author's list and folds the score into the product's
//! count-weighted mean in one pass, without rescanning the review history.

use std::sync::Arc;

use chrono::Utc;
use futures::{Stream, StreamExt, stream};
use rust_decimal::{Decimal, RoundingStrategy};
use shared::models::{Product, Review, UserAccount};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::catalog::CatalogMirror;
use crate::store::{SharedStore, StoreError};
use crate::utils::validation::{MAX_COMMENT_LEN, validate_optional_text};

/// Review errors
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Product not found: {0}")]
    UnknownProduct(String),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Committed state after a successful submission
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub review: Review,
    /// Product document with the new aggregate folded in
    pub product: Product,
    /// Author document with the review prepended
    pub account: UserAccount,
}

/// Display row for a product's review list
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewView {
    pub review: Review,
    pub author_email: String,
    /// Author's display name at the moment the row was produced
    pub author_name: String,
}

/// Fold one incoming score into a count-weighted mean, rounded to one
/// decimal with midpoints away from zero.
pub fn fold_rating(current: Decimal, count: u32, incoming: Decimal) -> Decimal {
    let total = current * Decimal::from(count) + incoming;
    (total / Decimal::from(count + 1))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Submits reviews and reads them back with author names joined live
pub struct ReviewAggregator {
    store: SharedStore,
    mirror: Arc<CatalogMirror>,
}

impl ReviewAggregator {
    pub fn new(store: SharedStore, mirror: Arc<CatalogMirror>) -> Self {
        Self { store, mirror }
    }

    /// Record a review: prepend it to the author's document, then fold the
    /// score into the product aggregate. Each step is atomic on its own
    /// document; a failure between the two leaves the review stored but the
    /// aggregate unfolded.
    pub async fn submit(
        &self,
        author_email: &str,
        product_id: &str,
        rating: Decimal,
        comment: &str,
    ) -> Result<ReviewOutcome, ReviewError> {
        if rating < Decimal::ONE || rating > Decimal::from(5) {
            return Err(ReviewError::Validation(format!(
                "Rating must be between 1 and 5, got {rating}"
            )));
        }
        validate_optional_text(comment, "comment", MAX_COMMENT_LEN)
            .map_err(ReviewError::Validation)?;

        let product = self
            .mirror
            .product(product_id)
            .ok_or_else(|| ReviewError::UnknownProduct(product_id.to_string()))?;

        let review = Review {
            id: format!("rev-{}", Uuid::new_v4()),
            product_id: product_id.to_string(),
            product_name: product.name.clone(),
            rating,
            comment: comment.to_string(),
            submitted_at: Utc::now(),
        };

        let pushed = review.clone();
        let account = self
            .store
            .mutate_user(
                author_email,
                Box::new(move |account| {
                    account.reviews.insert(0, pushed);
                    Ok(())
                }),
            )
            .await?;

        let product = self
            .store
            .mutate_product(
                product_id,
                Box::new(move |product| {
                    product.rating = fold_rating(product.rating, product.review_count, rating);
                    product.review_count += 1;
                    Ok(())
                }),
            )
            .await?;

        debug!(
            product_id = %product.id,
            rating = %product.rating,
            review_count = product.review_count,
            "Review folded into product aggregate"
        );

        Ok(ReviewOutcome {
            review,
            product,
            account,
        })
    }

    /// Reviews for one product, most recent first. The set of rows is fixed
    /// when this is called; author names are joined against the users cache
    /// as each row is produced, so a rename lands in rows not yet consumed.
    /// Call again for a fresh sequence.
    pub fn reviews_for(&self, product_id: &str) -> impl Stream<Item = ReviewView> + Send + 'static {
        let mut rows: Vec<(String, Review)> = self
            .mirror
            .users()
            .into_iter()
            .flat_map(|account| {
                let email = account.email.clone();
                account
                    .reviews
                    .into_iter()
                    .filter(|review| review.product_id == product_id)
                    .map(move |review| (email.clone(), review))
                    .collect::<Vec<_>>()
            })
            .collect();
        rows.sort_by(|a, b| b.1.submitted_at.cmp(&a.1.submitted_at));

        let mirror = Arc::clone(&self.mirror);
        stream::iter(rows).map(move |(email, review)| {
            let author_name = mirror
                .user(&email)
                .map(|account| account.display_name())
                .unwrap_or_else(|| email.clone());
            ReviewView {
                review,
                author_email: email,
                author_name,
            }
        })
    }
}
