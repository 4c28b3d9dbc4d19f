use serde::Serialize;

/// Size cell value when the detail page lists no size options at all.
pub const OUT_OF_STOCK: &str = "OUT OF STOCK";

/// Fixed CSV header, in output order. Field order of `ProductRecord` must match.
pub const HEADERS: [&str; 16] = [
    "SKU",
    "Product Title",
    "Product Type",
    "Vendor",
    "Price",
    "Discounted Price",
    "Collection",
    "Color",
    "Tags",
    "Size",
    "Images",
    "Description",
    "Size & Fit",
    "Made in",
    "Composition",
    "Tissue",
];

/// One catalog product, fully assembled before it is written. Fields that
/// could not be extracted are empty strings (or None for accordion text),
/// never missing cells.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRecord {
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "Product Title")]
    pub title: String,
    #[serde(rename = "Product Type")]
    pub product_type: String,
    #[serde(rename = "Vendor")]
    pub vendor: String,
    #[serde(rename = "Price")]
    pub price: String,
    #[serde(rename = "Discounted Price")]
    pub discounted_price: String,
    #[serde(rename = "Collection")]
    pub collection: String,
    #[serde(rename = "Color")]
    pub color: String,
    #[serde(rename = "Tags")]
    pub tags: String,
    #[serde(rename = "Size")]
    pub size: String,
    #[serde(rename = "Images")]
    pub images: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Size & Fit")]
    pub size_and_fit: Option<String>,
    #[serde(rename = "Made in")]
    pub made_in: Option<String>,
    #[serde(rename = "Composition")]
    pub composition: Option<String>,
    #[serde(rename = "Tissue")]
    pub tissue: Option<String>,
}

/// SKU is the raw listing name with the vendor substring removed.
pub fn strip_vendor(raw_name: &str, vendor: &str) -> String {
    if vendor.is_empty() {
        return raw_name.trim().to_string();
    }
    raw_name.replace(vendor, "").trim().to_string()
}

pub fn build_tags(product_type: &str, color: &str, collection: &str) -> String {
    [product_type, color, collection].join(",")
}

/// Comma-join size texts; zero sizes means the product is out of stock,
/// which is distinct from "size field not extracted".
pub fn join_sizes(sizes: &[String]) -> String {
    if sizes.is_empty() {
        OUT_OF_STOCK.to_string()
    } else {
        sizes.join(",")
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProductRecord {
        ProductRecord {
            sku: "AB123".into(),
            title: "Leather belt".into(),
            product_type: "Belts".into(),
            vendor: "GUCCI".into(),
            price: "€ 250".into(),
            discounted_price: "€ 180".into(),
            collection: "FW24".into(),
            color: "Black".into(),
            tags: build_tags("Belts", "Black", "FW24"),
            size: join_sizes(&["85".into(), "90".into()]),
            images: "https://a/1.jpg,https://a/2.jpg".into(),
            description: Some("A belt.".into()),
            size_and_fit: None,
            made_in: Some("Italy".into()),
            composition: None,
            tissue: None,
        }
    }

    #[test]
    fn header_has_sixteen_fields() {
        assert_eq!(HEADERS.len(), 16);
    }

    #[test]
    fn serialized_row_matches_header_arity() {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(vec![]);
        wtr.write_record(HEADERS).unwrap();
        wtr.serialize(sample()).unwrap();
        let data = String::from_utf8(wtr.into_inner().unwrap()).unwrap();

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(data.as_bytes());
        for row in rdr.records() {
            assert_eq!(row.unwrap().len(), HEADERS.len());
        }
    }

    #[test]
    fn strip_vendor_removes_vendor_substring() {
        assert_eq!(strip_vendor("GUCCI AB123 XL", "GUCCI"), "AB123 XL");
        assert_eq!(strip_vendor("  AB123 ", ""), "AB123");
        // Vendor absent from the raw name: nothing to strip.
        assert_eq!(strip_vendor("AB123", "PRADA"), "AB123");
        assert!(!strip_vendor("MIU MIU 5AC13", "MIU MIU").contains("MIU"));
    }

    #[test]
    fn sizes_sentinel_only_when_empty() {
        assert_eq!(join_sizes(&[]), OUT_OF_STOCK);
        assert_eq!(join_sizes(&["S".into(), "M".into()]), "S,M");
    }

    #[test]
    fn tags_join_type_color_collection() {
        assert_eq!(build_tags("Bags", "Red", "SS25"), "Bags,Red,SS25");
    }
}
