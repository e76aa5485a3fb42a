use serde::{Deserialize, Serialize};

/// Marketing copy generated for one keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionPair {
    pub keyword: String,
    pub meta_description: String,
    pub product_description: String,
}

impl DescriptionPair {
    /// Text file contents with the two section headers.
    pub fn render(&self) -> String {
        format!(
            "Meta Description:\n{}\n\nProduct Description:\n{}",
            self.meta_description, self.product_description
        )
    }
}
