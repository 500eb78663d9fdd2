//! Mock product catalog for the competitor-selection example pipeline.
//! Simulates marketplace search results: a mix of real competitors,
//! marginal products, accessories, and premium outliers.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Product {
    pub asin: String,
    pub title: String,
    pub category: String,
    pub price: f64,
    pub rating: f64,
    pub reviews: u32,
}

fn product(asin: &str, title: &str, category: &str, price: f64, rating: f64, reviews: u32) -> Product {
    Product {
        asin: asin.to_string(),
        title: title.to_string(),
        category: category.to_string(),
        price,
        rating,
        reviews,
    }
}

const BOTTLES: &str = "Sports & Outdoors > Water Bottles";

/// The seller's reference product we are finding competitors for.
pub(crate) fn reference_product() -> Product {
    product(
        "B0XYZ123",
        "ProBrand Stainless Steel Water Bottle 32oz Insulated",
        BOTTLES,
        29.99,
        4.2,
        1247,
    )
}

/// 50 mock candidate products.
pub(crate) fn candidate_products() -> Vec<Product> {
    let mut products = vec![
        // Good competitors: high review count, good ratings, in-band price.
        product(
            "B0COMP01",
            "HydroFlask 32oz Wide Mouth Stainless Steel Water Bottle",
            BOTTLES,
            44.99,
            4.5,
            8932,
        ),
        product(
            "B0COMP02",
            "Yeti Rambler 26oz Vacuum Insulated Stainless Steel Bottle",
            BOTTLES,
            34.99,
            4.4,
            5621,
        ),
        product(
            "B0COMP07",
            "Stanley Adventure Quencher 30oz Insulated Tumbler",
            BOTTLES,
            35.00,
            4.3,
            4102,
        ),
        product(
            "B0COMP08",
            "Contigo AUTOSEAL Stainless Steel Travel Mug 24oz",
            BOTTLES,
            28.99,
            4.4,
            3854,
        ),
        product(
            "B0COMP09",
            "Simple Modern Summit Water Bottle 32oz Vacuum Insulated",
            BOTTLES,
            26.99,
            4.5,
            3201,
        ),
        product(
            "B0COMP10",
            "Thermos Stainless King 40oz Beverage Bottle",
            BOTTLES,
            32.99,
            4.3,
            2847,
        ),
        product(
            "B0COMP11",
            "CamelBak Chute Mag 32oz BPA Free Water Bottle",
            BOTTLES,
            18.99,
            4.2,
            2156,
        ),
        product(
            "B0COMP12",
            "Nalgene Tritan Wide Mouth BPA-Free Water Bottle 32oz",
            BOTTLES,
            15.99,
            4.6,
            1892,
        ),
        // Marginal products: pass some filters, fail others.
        product(
            "B0COMP13",
            "Iron Flask Sports Water Bottle 40oz",
            BOTTLES,
            29.99,
            3.7, // fails rating threshold
            1543,
        ),
        product(
            "B0COMP14",
            "MIRA Stainless Steel Vacuum Insulated Water Bottle 32oz",
            BOTTLES,
            24.99,
            4.4,
            87, // fails review count
        ),
        // Poor matches: fail multiple filters.
        product(
            "B0COMP03",
            "Generic Plastic Water Bottle 24oz",
            BOTTLES,
            8.99,
            3.2,
            45,
        ),
        product(
            "B0COMP15",
            "Budget Water Bottle 20oz BPA Free",
            BOTTLES,
            7.49,
            3.5,
            234,
        ),
        // Accessories and false positives.
        product(
            "B0COMP04",
            "Water Bottle Cleaning Brush Set with Sponge",
            "Sports & Outdoors > Cleaning Supplies",
            12.99,
            4.6,
            3421,
        ),
        product(
            "B0COMP05",
            "Replacement Lid for HydroFlask Wide Mouth Bottles",
            "Sports & Outdoors > Replacement Parts",
            9.99,
            4.3,
            892,
        ),
        product(
            "B0COMP06",
            "Insulated Water Bottle Carrier Bag with Shoulder Strap",
            "Sports & Outdoors > Bags & Cases",
            14.99,
            4.2,
            567,
        ),
        product(
            "B0COMP16",
            "Silicone Sleeve for 32oz Water Bottles - Protection Cover",
            "Sports & Outdoors > Accessories",
            11.99,
            4.1,
            423,
        ),
        // Premium products: fail the price band upward.
        product(
            "B0COMP17",
            "Premium Titanium Water Bottle 32oz Ultra-Light",
            BOTTLES,
            89.00,
            4.8,
            234,
        ),
        product(
            "B0COMP18",
            "Luxury Stainless Steel Bottle with Smart Temperature Display",
            "Sports & Outdoors > Smart Water Bottles",
            79.99,
            4.3,
            156,
        ),
        // Additional competitive products.
        product(
            "B0COMP19",
            "Owala FreeSip Insulated Stainless Steel Water Bottle 32oz",
            BOTTLES,
            32.99,
            4.6,
            1678,
        ),
        product(
            "B0COMP20",
            "Takeya Actives Insulated Stainless Steel Bottle 32oz",
            BOTTLES,
            24.99,
            4.5,
            1432,
        ),
    ];

    // Fill remaining slots with varied generated products.
    for i in 21u32..=50 {
        let is_competitor = i % 3 != 0; // ~67% are actual bottles
        let is_good_match = i % 4 == 0; // ~25% are good matches

        let price = if is_good_match {
            25.0 + f64::from(i % 20)
        } else if i % 2 == 0 {
            9.99
        } else {
            65.99
        };
        let rating = if is_good_match {
            4.0 + f64::from(i % 10) * 0.05
        } else {
            3.0 + f64::from(i % 8) * 0.1
        };
        let reviews = if is_good_match { 500 + i * 50 } else { 20 + i * 10 };

        products.push(product(
            &format!("B0COMP{i:02}"),
            &generated_title(i, is_competitor),
            if is_competitor {
                BOTTLES
            } else {
                "Sports & Outdoors > Accessories"
            },
            price,
            rating,
            reviews,
        ));
    }

    products
}

fn generated_title(index: u32, is_competitor: bool) -> String {
    if is_competitor {
        let brands = ["TechBottle", "AquaFlow", "HydroMax", "SteelPro", "CoolFlow"];
        let features = [
            "Insulated",
            "Vacuum Sealed",
            "Double Wall",
            "Leak-Proof",
            "Wide Mouth",
        ];
        let brand = brands[index as usize % brands.len()];
        let feature = features[index as usize % features.len()];
        let size = 20 + (index % 3) * 8; // 20, 28, or 36 oz
        format!("{brand} {feature} Stainless Steel Water Bottle {size}oz")
    } else {
        let accessories = [
            "Bottle Brush",
            "Carrying Strap",
            "Cleaning Tablets",
            "Ice Cube Tray",
        ];
        format!(
            "{} for Water Bottles",
            accessories[index as usize % accessories.len()]
        )
    }
}
