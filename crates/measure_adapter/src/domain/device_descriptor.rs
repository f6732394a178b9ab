use serde::Serialize;

/// Equipment identity parsed from a descriptor such as `"[ONT] HUAWEI HG8245"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    #[serde(rename = "type")]
    pub device_type: String,
    pub vendor: String,
    pub model: String,
}

impl DeviceDescriptor {
    /// Splits on single spaces: the first token (bracket delimiters removed)
    /// is the type, the second the vendor. Every later token replaces the
    /// model, so the model is the last token rather than the remainder.
    pub fn parse(equipment: &str) -> Self {
        let mut descriptor = Self::default();
        for (index, token) in equipment.split(' ').enumerate() {
            match index {
                0 => descriptor.device_type = strip_delimiters(token).to_uppercase(),
                1 => descriptor.vendor = token.to_uppercase(),
                _ => descriptor.model = token.to_uppercase(),
            }
        }
        descriptor
    }
}

/// Drops the first and last character; single-character tokens are kept as is.
fn strip_delimiters(token: &str) -> &str {
    let mut chars = token.chars();
    match (chars.next(), chars.next_back()) {
        (Some(_), Some(_)) => chars.as_str(),
        _ => token,
    }
}
