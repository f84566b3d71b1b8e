//! # Dashboard Aggregation
//!
//! Turns raw counts from the repositories into what the dashboard shows.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Dashboard Assembly                                │
//! │                                                                         │
//! │  pharma-db                          pharma-core (THIS MODULE)          │
//! │  ─────────                          ─────────────────────────          │
//! │  stock_summary()      ──────────►   StockSummary (as is)               │
//! │  low_stock(5)         ──────────►   low-stock list (as is)             │
//! │  drug_counts()        ──────────►   top_categories()  → percentages    │
//! │                                     chart_series()    → top 5 + Other  │
//! │  role_breakdown()     ──(admins)─►  UserBreakdown, zeros otherwise     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Percentages
//! `percentage = round(count × 100 / total)` with round-half-to-even, so
//! 12.5 becomes 12 and 37.5 becomes 38. The rounded values are not adjusted
//! to add up to 100; three equal categories show 33 / 33 / 33.

use serde::Serialize;

use crate::types::{CategoryDrugCount, Drug};
use crate::{OTHER_BUCKET_LABEL, TOP_CATEGORY_LIMIT};

// =============================================================================
// Inputs
// =============================================================================

/// Drug counts by stock state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockSummary {
    pub total: i64,
    pub in_stock: i64,
    pub out_of_stock: i64,
}

/// User counts, shown to admins only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserBreakdown {
    pub total: i64,
    pub active: i64,
    pub disabled: i64,
    pub admins: i64,
    pub pharmacists: i64,
}

// =============================================================================
// Outputs
// =============================================================================

/// A ranked category with its share of all drugs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopCategory {
    pub category_id: i64,
    pub name: String,
    pub drug_count: i64,
    pub percentage: i64,
}

/// Parallel label / count arrays for the category chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub counts: Vec<i64>,
}

/// Everything the dashboard page renders.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stock: StockSummary,
    pub total_categories: i64,
    pub total_interactions: i64,
    pub low_stock: Vec<Drug>,
    pub categories_stats: Vec<CategoryDrugCount>,
    pub top_categories: Vec<TopCategory>,
    pub chart: ChartSeries,
    pub users: UserBreakdown,
}

impl Dashboard {
    /// Assembles the dashboard.
    ///
    /// ## Arguments
    /// * `categories_stats` - Every category with its drug count, in category order
    /// * `users` - `Some` only when the viewer is an admin
    pub fn build(
        stock: StockSummary,
        total_interactions: i64,
        low_stock: Vec<Drug>,
        categories_stats: Vec<CategoryDrugCount>,
        users: Option<UserBreakdown>,
    ) -> Self {
        let top_categories = top_categories(&categories_stats);
        let chart = chart_series(&categories_stats);

        Dashboard {
            stock,
            total_categories: categories_stats.len() as i64,
            total_interactions,
            low_stock,
            categories_stats,
            top_categories,
            chart,
            users: users.unwrap_or_default(),
        }
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// `round(count × 100 / total)`, ties to even. Zero when `total` is zero.
pub fn percentage(count: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }

    let scaled = count * 100;
    let quotient = scaled / total;
    let twice_remainder = (scaled % total) * 2;

    if twice_remainder > total || (twice_remainder == total && quotient % 2 != 0) {
        quotient + 1
    } else {
        quotient
    }
}

/// Categories by drug count, highest first. Ties keep category order.
fn ranked(stats: &[CategoryDrugCount]) -> Vec<&CategoryDrugCount> {
    let mut ranked: Vec<&CategoryDrugCount> = stats.iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.drug_count.cmp(&a.drug_count));
    ranked
}

/// The top [`TOP_CATEGORY_LIMIT`] categories with their percentage of all drugs.
pub fn top_categories(stats: &[CategoryDrugCount]) -> Vec<TopCategory> {
    let total: i64 = stats.iter().map(|s| s.drug_count).sum();

    ranked(stats)
        .into_iter()
        .take(TOP_CATEGORY_LIMIT)
        .map(|s| TopCategory {
            category_id: s.category_id,
            name: s.name.clone(),
            drug_count: s.drug_count,
            percentage: percentage(s.drug_count, total),
        })
        .collect()
}

/// Chart data: the top categories, then one "Other" bucket for the rest.
///
/// The bucket is left out when the remaining categories hold no drugs.
pub fn chart_series(stats: &[CategoryDrugCount]) -> ChartSeries {
    let ranked = ranked(stats);
    let split = ranked.len().min(TOP_CATEGORY_LIMIT);
    let (top, rest) = ranked.split_at(split);

    let mut series = ChartSeries {
        labels: top.iter().map(|s| s.name.clone()).collect(),
        counts: top.iter().map(|s| s.drug_count).collect(),
    };

    let other: i64 = rest.iter().map(|s| s.drug_count).sum();
    if other > 0 {
        series.labels.push(OTHER_BUCKET_LABEL.to_string());
        series.counts.push(other);
    }

    series
}

// =============================================================================
// Unit Tests
// =============================================================================
