use garde::Validate;
use serde::{Deserialize, Serialize};

/// Label attributes claimed by the applicant, to be verified against the
/// text recovered from the label photograph.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LabelData {
    #[garde(length(min = 1, max = 200))]
    pub brand_name: String,

    #[garde(length(min = 1, max = 200))]
    pub product_type: String,

    /// Alcohol by volume as a percentage (e.g. 45.0 for 45%).
    #[garde(range(min = 0.0, max = 100.0))]
    pub alcohol_content: f64,

    /// Container volume such as "750 mL". Optional on the application form.
    #[garde(inner(length(min = 1, max = 100)))]
    pub net_contents: Option<String>,
}
