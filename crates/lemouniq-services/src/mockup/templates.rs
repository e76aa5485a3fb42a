//! Product templates offered by the mockup service.
//!
//! Plain lookup tables: one entry per product, variant ids and print placement
//! keyed by orientation.

use lemouniq_core::Orientation;
use serde::Serialize;

/// Print area and position of the artwork on the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub area_width: u32,
    pub area_height: u32,
    pub width: u32,
    pub height: u32,
    pub top: u32,
    pub left: u32,
}

impl Placement {
    const fn full(width: u32, height: u32) -> Self {
        Self {
            area_width: width,
            area_height: height,
            width,
            height,
            top: 0,
            left: 0,
        }
    }
}

const SQUARE_PLACEMENT: Placement = Placement::full(1800, 1800);
const VERTICAL_PLACEMENT: Placement = Placement::full(1800, 2400);
const HORIZONTAL_PLACEMENT: Placement = Placement::full(2400, 1800);

/// Placement shared by every template for a given orientation.
pub fn placement(orientation: Orientation) -> Placement {
    match orientation {
        Orientation::Square => SQUARE_PLACEMENT,
        Orientation::Vertical => VERTICAL_PLACEMENT,
        Orientation::Horizontal => HORIZONTAL_PLACEMENT,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantIds {
    pub square: u32,
    pub vertical: u32,
    pub horizontal: u32,
}

impl VariantIds {
    pub fn get(&self, orientation: Orientation) -> u32 {
        match orientation {
            Orientation::Square => self.square,
            Orientation::Vertical => self.vertical,
            Orientation::Horizontal => self.horizontal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductTemplate {
    /// Label appended to the file stem, e.g. `bird_canvas`
    pub name: &'static str,
    /// Path segment of the create-task endpoint
    pub product_id: u32,
    pub variants: VariantIds,
    pub option_groups: &'static [&'static str],
}

impl ProductTemplate {
    pub fn variant_id(&self, orientation: Orientation) -> u32 {
        self.variants.get(orientation)
    }

    pub fn product_type(&self, stem: &str) -> String {
        format!("{}_{}", stem, self.name)
    }
}

pub const CANVAS: ProductTemplate = ProductTemplate {
    name: "canvas",
    product_id: 3,
    variants: VariantIds {
        square: 823,
        vertical: 5,
        horizontal: 5,
    },
    option_groups: &[
        "Lifestyle",
        "Lifestyle 10",
        "Lifestyle 11",
        "Lifestyle 2",
        "Lifestyle 3",
        "Lifestyle 4",
        "Lifestyle 5",
        "Lifestyle 6",
        "Lifestyle 7",
        "Lifestyle 8",
        "Lifestyle 9",
        "Person",
        "Wall",
    ],
};

pub const POSTER: ProductTemplate = ProductTemplate {
    name: "poster",
    product_id: 171,
    variants: VariantIds {
        square: 6873,
        vertical: 6875,
        horizontal: 6875,
    },
    option_groups: &[
        "Flat",
        "Halloween",
        "Holiday season",
        "Lifestyle",
        "Lifestyle 10",
        "Lifestyle 2",
        "Lifestyle 3",
        "Lifestyle 4",
        "Lifestyle 5",
        "Lifestyle 6",
        "Lifestyle 7",
        "Lifestyle 8",
        "Lifestyle 9",
        "Lifestyle, Premium",
        "Person",
        "Spring/summer vibes",
    ],
};

/// Templates rendered for every upload, in submission order.
pub const TEMPLATES: [ProductTemplate; 2] = [CANVAS, POSTER];
