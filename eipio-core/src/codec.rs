use eipio_models::{SignalMapping, SignalType};

fn read_le16(data: &[u8], offset: usize) -> u16 {
    if offset + 2 > data.len() {
        return 0;
    }
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_le32(data: &[u8], offset: usize) -> u32 {
    if offset + 4 > data.len() {
        return 0;
    }
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Decode one signal's engineering value out of a raw buffer.
///
/// A buffer too short for the signal's width yields 0.0: a partially
/// populated live buffer is an expected transient, not a fault. Bit-level
/// bool decode is unscaled.
pub fn decode_value(mapping: &SignalMapping, data: &[u8]) -> f64 {
    let offset = mapping.byte_offset as usize;
    match mapping.signal_type {
        SignalType::Bool => {
            let Some(&byte) = data.get(offset) else {
                return 0.0;
            };
            let raw = match mapping.bit_offset {
                Some(bit) if bit < 8 => (byte >> bit) & 0x01,
                _ => byte,
            };
            if raw != 0 {
                1.0
            } else {
                0.0
            }
        }
        SignalType::UInt8 => match data.get(offset) {
            Some(&byte) => byte as f64 * mapping.scale + mapping.engineering_offset,
            None => 0.0,
        },
        SignalType::SInt => match data.get(offset) {
            Some(&byte) => byte as i8 as f64 * mapping.scale + mapping.engineering_offset,
            None => 0.0,
        },
        SignalType::UInt16 => {
            if offset + 2 > data.len() {
                return 0.0;
            }
            read_le16(data, offset) as f64 * mapping.scale + mapping.engineering_offset
        }
        SignalType::UInt32 => {
            if offset + 4 > data.len() {
                return 0.0;
            }
            read_le32(data, offset) as f64 * mapping.scale + mapping.engineering_offset
        }
        SignalType::Real32 => {
            if offset + 4 > data.len() {
                return 0.0;
            }
            f32::from_bits(read_le32(data, offset)) as f64 * mapping.scale
                + mapping.engineering_offset
        }
    }
}

/// Encode one signal's engineering value into a raw buffer, growing the
/// buffer to cover the signal's offset and width. A bit-addressed bool
/// touches only its own bit of the addressed byte.
pub fn encode_value(mapping: &SignalMapping, engineering_value: f64, buffer: &mut Vec<u8>) {
    let raw = mapping.raw_from_engineering(engineering_value);
    let offset = mapping.byte_offset as usize;
    let end = offset + mapping.width_bytes();
    if buffer.len() < end {
        buffer.resize(end, 0);
    }
    match mapping.signal_type {
        SignalType::Bool => {
            let set = raw.abs() >= 0.5;
            match mapping.bit_offset {
                Some(bit) if bit < 8 => {
                    if set {
                        buffer[offset] |= 1 << bit;
                    } else {
                        buffer[offset] &= !(1 << bit);
                    }
                }
                _ => buffer[offset] = set as u8,
            }
        }
        SignalType::UInt8 => buffer[offset] = raw.clamp(0.0, 255.0) as u8,
        SignalType::UInt16 => {
            let value = raw.clamp(0.0, 65535.0) as u16;
            buffer[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        }
        SignalType::UInt32 => {
            let value = raw.max(0.0) as u32;
            buffer[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        }
        SignalType::SInt => buffer[offset] = raw.round() as i8 as u8,
        SignalType::Real32 => {
            buffer[offset..offset + 4].copy_from_slice(&(raw as f32).to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eipio_models::SignalDirection;

    fn mapping(signal_type: SignalType, byte_offset: u16) -> SignalMapping {
        SignalMapping {
            name: "sig".into(),
            direction: SignalDirection::Input,
            signal_type,
            byte_offset,
            bit_offset: None,
            scale: 1.0,
            engineering_offset: 0.0,
            units: String::new(),
            enums: Vec::new(),
        }
    }

    #[test]
    fn scaled_uint16_scenario() {
        // raw 10 at bytes [2,3], scale 2.0, offset 5.0 -> 25.0
        let mut m = mapping(SignalType::UInt16, 2);
        m.scale = 2.0;
        m.engineering_offset = 5.0;
        assert_eq!(decode_value(&m, &[0, 0, 10, 0]), 25.0);

        let mut buffer = vec![0u8; 4];
        encode_value(&m, 25.0, &mut buffer);
        assert_eq!(buffer, vec![0, 0, 10, 0]);
    }

    #[test]
    fn short_buffer_decodes_to_zero() {
        let m = mapping(SignalType::UInt32, 2);
        assert_eq!(decode_value(&m, &[1, 2, 3]), 0.0);
        assert_eq!(decode_value(&mapping(SignalType::Real32, 0), &[]), 0.0);
        assert_eq!(decode_value(&mapping(SignalType::UInt8, 5), &[7]), 0.0);
    }

    #[test]
    fn bool_bit_writes_leave_other_bits_alone() {
        let mut m = mapping(SignalType::Bool, 0);
        m.bit_offset = Some(2);
        let mut buffer = vec![0b1010_0000];
        encode_value(&m, 1.0, &mut buffer);
        assert_eq!(buffer[0], 0b1010_0100);
        encode_value(&m, 0.0, &mut buffer);
        assert_eq!(buffer[0], 0b1010_0000);
    }

    #[test]
    fn bool_bit_decode_isolates_the_bit() {
        let mut m = mapping(SignalType::Bool, 0);
        m.bit_offset = Some(2);
        assert_eq!(decode_value(&m, &[0b0000_0100]), 1.0);
        assert_eq!(decode_value(&m, &[0b1111_1011]), 0.0);
        // Whole-byte bool without a bit offset.
        m.bit_offset = None;
        assert_eq!(decode_value(&m, &[0x40]), 1.0);
        assert_eq!(decode_value(&m, &[0x00]), 0.0);
    }

    #[test]
    fn sint_round_trips_negative_values() {
        let m = mapping(SignalType::SInt, 1);
        let mut buffer = Vec::new();
        encode_value(&m, -5.0, &mut buffer);
        assert_eq!(buffer.len(), 2);
        assert_eq!(decode_value(&m, &buffer), -5.0);
    }

    #[test]
    fn real32_round_trips() {
        let m = mapping(SignalType::Real32, 4);
        let mut buffer = Vec::new();
        encode_value(&m, 21.5, &mut buffer);
        assert_eq!(buffer.len(), 8);
        assert_eq!(decode_value(&m, &buffer), 21.5);
    }

    #[test]
    fn unsigned_encodes_clamp() {
        let m8 = mapping(SignalType::UInt8, 0);
        let mut buffer = Vec::new();
        encode_value(&m8, 300.0, &mut buffer);
        assert_eq!(buffer[0], 255);
        encode_value(&m8, -3.0, &mut buffer);
        assert_eq!(buffer[0], 0);

        let m16 = mapping(SignalType::UInt16, 0);
        let mut buffer = Vec::new();
        encode_value(&m16, 70_000.0, &mut buffer);
        assert_eq!(read_le16(&buffer, 0), 65535);

        let m32 = mapping(SignalType::UInt32, 0);
        let mut buffer = Vec::new();
        encode_value(&m32, -1.0, &mut buffer);
        assert_eq!(read_le32(&buffer, 0), 0);
    }

    #[test]
    fn encode_grows_the_buffer() {
        let m = mapping(SignalType::UInt16, 6);
        let mut buffer = vec![0xFF; 2];
        encode_value(&m, 1.0, &mut buffer);
        assert_eq!(buffer.len(), 8);
        assert_eq!(&buffer[..2], &[0xFF, 0xFF]);
        assert_eq!(read_le16(&buffer, 6), 1);
    }
}
