//! Built-in product list used when no catalog has been stored yet, and as the
//! default reconciliation baseline for records saved without unit snapshots.

use rust_decimal_macros::dec;

use super::catalog::Catalog;
use super::product::{Category, Product};
use super::unit::Unit;

pub fn default_products() -> Vec<Product> {
    use Category::*;
    let rows = [
        // Fruits
        ("ananas", "Ananas", Fruits, Unit::Piece, 1, dec!(1.8)),
        ("aepfel", "Äpfel", Fruits, Unit::Kg, 2, dec!(1)),
        ("aepfel-schaelware", "Äpfel Schälware", Fruits, Unit::Kg, 3, dec!(1)),
        ("kiwi", "Kiwi", Fruits, Unit::Kg, 4, dec!(1)),
        ("mango", "Mango", Fruits, Unit::Piece, 5, dec!(0.3)),
        ("melone-can-char", "Melone Can/Char", Fruits, Unit::Piece, 6, dec!(2.5)),
        ("melone-galia", "Melone Galia", Fruits, Unit::Piece, 7, dec!(1.8)),
        ("melone-honig", "Melone Honig", Fruits, Unit::Piece, 8, dec!(2)),
        ("orangen", "Orangen", Fruits, Unit::Kg, 9, dec!(1)),
        ("trauben-rot", "Trauben rot", Fruits, Unit::Kg, 10, dec!(1)),
        ("wassermelonen", "Wassermelonen", Fruits, Unit::Piece, 11, dec!(8)),

        // Vegetables
        ("aubergine", "Aubergine", Vegetables, Unit::Kg, 12, dec!(1)),
        ("blumenkohl", "Blumenkohl", Vegetables, Unit::Piece, 13, dec!(1.2)),
        ("brokkoli", "Brokkoli", Vegetables, Unit::Piece, 14, dec!(0.5)),
        ("champignon", "Champignon Br./Weiß", Vegetables, Unit::Kg, 15, dec!(1)),
        ("fenchel", "Fenchel", Vegetables, Unit::Piece, 16, dec!(0.3)),
        ("gurken", "Gurken", Vegetables, Unit::Piece, 17, dec!(0.4)),
        ("karotten", "Karotten", Vegetables, Unit::Kg, 18, dec!(1)),
        ("kohlrabi", "Kohlrabi", Vegetables, Unit::Piece, 19, dec!(0.4)),
        ("kuerbis", "Kürbis", Vegetables, Unit::Kg, 20, dec!(1)),
        ("lauch", "Lauch", Vegetables, Unit::Kg, 21, dec!(1)),
        ("paprika", "Paprika R/Ge/Grü", Vegetables, Unit::Kg, 22, dec!(1)),
        ("radieschen", "Radieschen", Vegetables, Unit::Bunch, 23, dec!(0.1)),
        ("rote-bete", "Rote Bete", Vegetables, Unit::Kg, 24, dec!(1)),
        ("rettich-weiss", "Rettich weiß", Vegetables, Unit::Piece, 25, dec!(0.4)),
        ("rotkohl", "Rotkohl", Vegetables, Unit::Piece, 26, dec!(1.5)),
        ("sellerie", "Sellerie", Vegetables, Unit::Piece, 27, dec!(0.8)),
        ("tomaten", "Tomaten", Vegetables, Unit::Kg, 28, dec!(1)),
        ("weisskohl", "Weißkohl", Vegetables, Unit::Piece, 29, dec!(2)),
        ("wirsing", "Wirsing", Vegetables, Unit::Piece, 30, dec!(1.2)),
        ("zucchini", "Zucchini", Vegetables, Unit::Kg, 31, dec!(1)),
        ("zwiebeln", "Zwiebeln weiß / Rot", Vegetables, Unit::Kg, 32, dec!(1)),

        // Salads
        ("chinakohl", "Chinakohl", Salads, Unit::Piece, 33, dec!(1.2)),
        ("eisberg", "Eisberg", Salads, Unit::Piece, 34, dec!(0.8)),
        ("endivien", "Endivien", Salads, Unit::Piece, 35, dec!(0.5)),
        ("frisee", "Frisee", Salads, Unit::Piece, 36, dec!(0.4)),
        ("lollo-bionda", "Lollo Bionda", Salads, Unit::Piece, 37, dec!(0.3)),
        ("lollo-rosso", "Lollo Rosso", Salads, Unit::Piece, 38, dec!(0.3)),
        ("rhadiccio", "Rhadiccio", Salads, Unit::Piece, 39, dec!(0.4)),
        ("petersilie", "Petersilie", Salads, Unit::Bunch, 40, dec!(0.03)),
        ("schnittlauch", "Schnittlauch", Salads, Unit::Bunch, 41, dec!(0.02)),
        ("ruccula", "Ruccula", Salads, Unit::Kg, 42, dec!(1)),
    ];

    rows
        .into_iter()
        .map(|(id, name, category, unit, order, kg_factor)| {
            Product::new(id, name, category, unit, order, kg_factor)
        })
        .collect()
}

pub fn default_catalog() -> Catalog {
    Catalog::new(default_products())
}
