//! Reference Code Generation
//!
//! Advisory catalog SKUs of the form `PREFIX-NNNN`. The prefix is a fixed
//! per-category mapping; the number continues the highest suffix already in
//! use under that prefix. Codes are advisory identifiers, not primary keys:
//! two operators generating for the same category at the same moment can
//! mint the same code, and the catalog accepts it.

use shared::models::Product;

/// Fixed category to SKU-prefix table
const CATEGORY_PREFIXES: [(&str, &str); 15] = [
    ("BREADBOARD PROJECTS", "BBP"),
    ("ARDUINO PROJECTS", "ARD"),
    ("ESP32 PROJECTS", "ESP"),
    ("STM32 PROJECTS", "STM"),
    ("CYBER PROJECTS", "CYB"),
    ("RASBERRY PI PROJECTS", "RPI"),
    ("BOT PROJECTS", "BOT"),
    ("INDUSTRIAL PROJECTS", "IND"),
    ("DRONE PROJECTS", "DRN"),
    ("DRONE BODY AND PARTS", "DBP"),
    ("3D PRINTED ACCESSORIES", "3DA"),
    ("3D PRINTER PARTS", "3DP"),
    ("BLUEPRINTS OF PROJECTS", "BLP"),
    ("PRESENTATION SLIDE OF PROJECTS", "SLD"),
    ("OPEN SOURCE CODES", "OSC"),
];

/// Prefix for categories without a mapping
const FALLBACK_PREFIX: &str = "REF";

/// First number issued under a fresh prefix
const FIRST_NUMBER: u64 = 1000;

/// SKU prefix for a category.
pub fn prefix_for(category: &str) -> &'static str {
    CATEGORY_PREFIXES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, prefix)| *prefix)
        .unwrap_or(FALLBACK_PREFIX)
}

/// Next reference code for `category`, continuing from the highest numeric
/// suffix already used under the category's prefix across the whole catalog.
/// References whose suffix is not a plain integer are skipped.
pub fn next_reference<'a>(
    category: &str,
    products: impl IntoIterator<Item = &'a Product>,
) -> String {
    let prefix = prefix_for(category);
    let marker = format!("{prefix}-");

    let highest = products
        .into_iter()
        .filter_map(|product| product.reference.strip_prefix(&marker))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max();

    let next = highest.map(|n| n + 1).unwrap_or(FIRST_NUMBER);
    format!("{prefix}-{next}")
}
