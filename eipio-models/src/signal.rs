use serde::{Deserialize, Serialize};

/// Direction of a signal relative to this gateway: `Output` values are
/// written into the originator-to-target buffer, `Input` values are decoded
/// from the target-to-originator buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    #[default]
    Input,
    Output,
}

/// Scalar type of a signal inside the raw assembly buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Bool,
    #[default]
    UInt8,
    UInt16,
    UInt32,
    SInt,
    Real32,
}

impl SignalType {
    /// Width of the type inside the raw buffer, in bytes.
    pub fn width_bytes(&self) -> usize {
        match self {
            SignalType::Bool | SignalType::UInt8 | SignalType::SInt => 1,
            SignalType::UInt16 => 2,
            SignalType::UInt32 | SignalType::Real32 => 4,
        }
    }
}

/// One labelled enumeration entry of a signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalEnumOption {
    #[serde(default)]
    pub value: i32,
    #[serde(default)]
    pub label: String,
}

/// A named signal inside a device's assembly buffers.
///
/// `byte_offset`/`bit_offset` locate the raw value, `scale` and
/// `engineering_offset` translate it into an engineering value:
/// `eng = raw * scale + engineering_offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalMapping {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub direction: SignalDirection,
    #[serde(default, rename = "type")]
    pub signal_type: SignalType,
    #[serde(default)]
    pub byte_offset: u16,
    /// Bit position inside the addressed byte, meaningful only for `Bool`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_offset: Option<u8>,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub engineering_offset: f64,
    #[serde(default)]
    pub units: String,
    /// Always serialized, even when empty, so a round trip preserves the
    /// empty list rather than dropping the field.
    #[serde(default)]
    pub enums: Vec<SignalEnumOption>,
}

fn default_scale() -> f64 {
    1.0
}

impl SignalMapping {
    pub fn width_bytes(&self) -> usize {
        self.signal_type.width_bytes()
    }

    /// Derive the raw value for an engineering value. A zero scale passes the
    /// engineering value through unscaled.
    pub fn raw_from_engineering(&self, engineering_value: f64) -> f64 {
        if self.scale != 0.0 {
            (engineering_value - self.engineering_offset) / self.scale
        } else {
            engineering_value
        }
    }
}

/// A mapping paired with its current engineering value and the raw value
/// derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalValue {
    #[serde(flatten)]
    pub mapping: SignalMapping,
    pub engineering_value: f64,
    pub raw_value: f64,
}

impl SignalValue {
    pub fn from_engineering(mapping: SignalMapping, engineering_value: f64) -> Self {
        let raw_value = mapping.raw_from_engineering(engineering_value);
        Self {
            mapping,
            engineering_value,
            raw_value,
        }
    }
}
