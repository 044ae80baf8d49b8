/// A CIP logical path: class, optional instance, optional attribute.
///
/// Packed in padded form: each segment uses the one-byte format when the
/// value fits in 8 bits, otherwise the padded 16-bit format with a pad byte
/// after the segment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EPath {
    pub class_id: u16,
    pub instance_id: Option<u16>,
    pub attribute_id: Option<u16>,
}

const CLASS_SEGMENT: u8 = 0x20;
const INSTANCE_SEGMENT: u8 = 0x24;
const ATTRIBUTE_SEGMENT: u8 = 0x30;

impl EPath {
    pub fn class(class_id: u16) -> Self {
        Self {
            class_id,
            instance_id: None,
            attribute_id: None,
        }
    }

    pub fn instance(class_id: u16, instance_id: u16) -> Self {
        Self {
            class_id,
            instance_id: Some(instance_id),
            attribute_id: None,
        }
    }

    pub fn attribute(class_id: u16, instance_id: u16, attribute_id: u16) -> Self {
        Self {
            class_id,
            instance_id: Some(instance_id),
            attribute_id: Some(attribute_id),
        }
    }

    /// Pack as a padded path, ready to embed into a connection path or an
    /// unconnected request.
    pub fn pack_padded(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(12);
        pack_segment(&mut out, CLASS_SEGMENT, self.class_id);
        if let Some(instance) = self.instance_id {
            pack_segment(&mut out, INSTANCE_SEGMENT, instance);
        }
        if let Some(attribute) = self.attribute_id {
            pack_segment(&mut out, ATTRIBUTE_SEGMENT, attribute);
        }
        out
    }
}

fn pack_segment(out: &mut Vec<u8>, segment: u8, value: u16) {
    if value <= u8::MAX as u16 {
        out.push(segment);
        out.push(value as u8);
    } else {
        // 16-bit logical format: segment type | 0x01, then a pad byte.
        out.push(segment | 0x01);
        out.push(0x00);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_eight_bit_segments() {
        let path = EPath::instance(0x04, 0x65);
        assert_eq!(path.pack_padded(), vec![0x20, 0x04, 0x24, 0x65]);
    }

    #[test]
    fn packs_padded_sixteen_bit_segments() {
        let path = EPath::instance(0x04, 0x0101);
        assert_eq!(path.pack_padded(), vec![0x20, 0x04, 0x25, 0x00, 0x01, 0x01]);
    }

    #[test]
    fn packs_attribute_paths() {
        let path = EPath::attribute(0x01, 1, 7);
        assert_eq!(path.pack_padded(), vec![0x20, 0x01, 0x24, 0x01, 0x30, 0x07]);
    }
}
