//! Catalog category set

/// Fixed category display names offered by the storefront.
///
/// Category is stored as its display string on the product document; this
/// list is the closed set drafts are validated against.
pub const CATEGORIES: [&str; 15] = [
    "BREADBOARD PROJECTS",
    "ARDUINO PROJECTS",
    "ESP32 PROJECTS",
    "STM32 PROJECTS",
    "CYBER PROJECTS",
    "RASBERRY PI PROJECTS",
    "BOT PROJECTS",
    "INDUSTRIAL PROJECTS",
    "DRONE PROJECTS",
    "DRONE BODY AND PARTS",
    "3D PRINTED ACCESSORIES",
    "3D PRINTER PARTS",
    "BLUEPRINTS OF PROJECTS",
    "PRESENTATION SLIDE OF PROJECTS",
    "OPEN SOURCE CODES",
];

/// Whether `name` is a member of the fixed category set.
pub fn is_known_category(name: &str) -> bool {
    CATEGORIES.contains(&name)
}
