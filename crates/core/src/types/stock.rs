//! Stock threshold tiers.
//!
//! Each product carries two thresholds set by the merchant: the yellow line
//! (running low) and the red line (reorder now). The tier is a pure function
//! of the current stock and those lines.

use serde::Serialize;

/// Warning tier for a product's stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockTier {
    /// Nothing left to sell.
    OutOfStock,
    /// At or below the red line.
    Critical,
    /// At or below the yellow line.
    Warning,
    /// Above both lines.
    Healthy,
}

impl StockTier {
    /// All tiers, most urgent first.
    pub const ALL: [Self; 4] = [Self::OutOfStock, Self::Critical, Self::Warning, Self::Healthy];

    /// Classify a stock level against the product's thresholds.
    ///
    /// ```
    /// use storedesk_core::StockTier;
    ///
    /// assert_eq!(StockTier::classify(0, 20, 5), StockTier::OutOfStock);
    /// assert_eq!(StockTier::classify(5, 20, 5), StockTier::Critical);
    /// assert_eq!(StockTier::classify(20, 20, 5), StockTier::Warning);
    /// assert_eq!(StockTier::classify(21, 20, 5), StockTier::Healthy);
    /// ```
    #[must_use]
    pub const fn classify(in_stock: i64, yellow_line: i64, red_line: i64) -> Self {
        if in_stock <= 0 {
            Self::OutOfStock
        } else if in_stock <= red_line {
            Self::Critical
        } else if in_stock <= yellow_line {
            Self::Warning
        } else {
            Self::Healthy
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OutOfStock => "Out of stock",
            Self::Critical => "Critical",
            Self::Warning => "Low",
            Self::Healthy => "In stock",
        }
    }

    /// Badge CSS classes.
    #[must_use]
    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::OutOfStock => "bg-gray-200 text-gray-700",
            Self::Critical => "bg-red-100 text-red-700",
            Self::Warning => "bg-yellow-100 text-yellow-700",
            Self::Healthy => "bg-green-100 text-green-700",
        }
    }

    /// Query-string form used by the products filter.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::OutOfStock => "out",
            Self::Critical => "critical",
            Self::Warning => "low",
            Self::Healthy => "healthy",
        }
    }

    /// Parse the query-string form.
    #[must_use]
    pub fn from_param(s: &str) -> Option<Self> {
        match s {
            "out" => Some(Self::OutOfStock),
            "critical" => Some(Self::Critical),
            "low" => Some(Self::Warning),
            "healthy" => Some(Self::Healthy),
            _ => None,
        }
    }

    /// Whether the merchant should be nudged to restock.
    #[must_use]
    pub const fn needs_attention(self) -> bool {
        !matches!(self, Self::Healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(StockTier::classify(-3, 10, 2), StockTier::OutOfStock);
        assert_eq!(StockTier::classify(1, 10, 2), StockTier::Critical);
        assert_eq!(StockTier::classify(2, 10, 2), StockTier::Critical);
        assert_eq!(StockTier::classify(3, 10, 2), StockTier::Warning);
        assert_eq!(StockTier::classify(10, 10, 2), StockTier::Warning);
        assert_eq!(StockTier::classify(11, 10, 2), StockTier::Healthy);
    }

    #[test]
    fn test_zero_thresholds_only_flag_empty_stock() {
        assert_eq!(StockTier::classify(1, 0, 0), StockTier::Healthy);
        assert_eq!(StockTier::classify(0, 0, 0), StockTier::OutOfStock);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(StockTier::OutOfStock < StockTier::Critical);
        assert!(StockTier::Critical < StockTier::Warning);
        assert!(StockTier::Warning < StockTier::Healthy);
        assert!(!StockTier::Healthy.needs_attention());
        assert!(StockTier::Warning.needs_attention());
    }

    #[test]
    fn test_param_round_trip() {
        for tier in [
            StockTier::OutOfStock,
            StockTier::Critical,
            StockTier::Warning,
            StockTier::Healthy,
        ] {
            assert_eq!(StockTier::from_param(tier.as_param()), Some(tier));
        }
    }
}
