//! Flat-text rendition of a signal mapping table.
//!
//! One record per mapping, records separated by a blank line, fields as
//! `key: value` lines using the persisted field names. String values are
//! JSON-quoted so arbitrary labels survive a round trip; floats use the
//! shortest form that parses back to the identical value. Enumeration
//! entries sit indented under an `enums:` header, one per line.
//!
//! ```text
//! name: "Temp"
//! direction: input
//! type: uint16
//! byteOffset: 2
//! scale: 2
//! engineeringOffset: 5
//! units: "degC"
//! enums:
//!   value: 1, label: "Running"
//! ```

use crate::error::{CoreError, CoreResult};
use eipio_models::{SignalDirection, SignalEnumOption, SignalMapping, SignalType};
use std::fmt::Write as _;

fn direction_str(direction: SignalDirection) -> &'static str {
    match direction {
        SignalDirection::Input => "input",
        SignalDirection::Output => "output",
    }
}

fn type_str(signal_type: SignalType) -> &'static str {
    match signal_type {
        SignalType::Bool => "bool",
        SignalType::UInt8 => "uint8",
        SignalType::UInt16 => "uint16",
        SignalType::UInt32 => "uint32",
        SignalType::SInt => "sint",
        SignalType::Real32 => "real32",
    }
}

fn quote(s: &str) -> String {
    // serde_json string escaping keeps the format lossless for any label.
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

pub fn export_mappings(mappings: &[SignalMapping]) -> String {
    let mut out = String::new();
    for (i, mapping) in mappings.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "name: {}", quote(&mapping.name));
        let _ = writeln!(out, "direction: {}", direction_str(mapping.direction));
        let _ = writeln!(out, "type: {}", type_str(mapping.signal_type));
        let _ = writeln!(out, "byteOffset: {}", mapping.byte_offset);
        if let Some(bit) = mapping.bit_offset {
            let _ = writeln!(out, "bitOffset: {bit}");
        }
        let _ = writeln!(out, "scale: {}", mapping.scale);
        let _ = writeln!(out, "engineeringOffset: {}", mapping.engineering_offset);
        let _ = writeln!(out, "units: {}", quote(&mapping.units));
        let _ = writeln!(out, "enums:");
        for option in &mapping.enums {
            let _ = writeln!(
                out,
                "  value: {}, label: {}",
                option.value,
                quote(&option.label)
            );
        }
    }
    out
}

struct RecordBuilder {
    mapping: SignalMapping,
    in_enums: bool,
    started: bool,
}

impl RecordBuilder {
    fn new() -> Self {
        Self {
            mapping: SignalMapping {
                name: String::new(),
                direction: SignalDirection::Input,
                signal_type: SignalType::UInt8,
                byte_offset: 0,
                bit_offset: None,
                scale: 1.0,
                engineering_offset: 0.0,
                units: String::new(),
                enums: Vec::new(),
            },
            in_enums: false,
            started: false,
        }
    }
}

fn parse_err(line_no: usize, msg: impl std::fmt::Display) -> CoreError {
    CoreError::Parse(format!("line {line_no}: {msg}"))
}

fn parse_string(raw: &str, line_no: usize) -> CoreResult<String> {
    serde_json::from_str::<String>(raw.trim())
        .map_err(|_| parse_err(line_no, format!("expected a quoted string, got `{raw}`")))
}

fn parse_enum_entry(raw: &str, line_no: usize) -> CoreResult<SignalEnumOption> {
    let rest = raw
        .trim()
        .strip_prefix("value:")
        .ok_or_else(|| parse_err(line_no, "enum entry must start with `value:`"))?;
    let (value_part, label_part) = rest
        .split_once(',')
        .ok_or_else(|| parse_err(line_no, "enum entry must contain `, label:`"))?;
    let value: i32 = value_part
        .trim()
        .parse()
        .map_err(|_| parse_err(line_no, format!("invalid enum value `{}`", value_part.trim())))?;
    let label_raw = label_part
        .trim()
        .strip_prefix("label:")
        .ok_or_else(|| parse_err(line_no, "enum entry must contain `label:`"))?;
    Ok(SignalEnumOption {
        value,
        label: parse_string(label_raw, line_no)?,
    })
}

fn apply_field(
    record: &mut RecordBuilder,
    key: &str,
    value: &str,
    line_no: usize,
) -> CoreResult<()> {
    let mapping = &mut record.mapping;
    match key {
        "name" => mapping.name = parse_string(value, line_no)?,
        "direction" => {
            mapping.direction = match value.trim() {
                "input" => SignalDirection::Input,
                "output" => SignalDirection::Output,
                other => return Err(parse_err(line_no, format!("unknown direction `{other}`"))),
            }
        }
        "type" => {
            mapping.signal_type = match value.trim() {
                "bool" => SignalType::Bool,
                "uint8" => SignalType::UInt8,
                "uint16" => SignalType::UInt16,
                "uint32" => SignalType::UInt32,
                "sint" => SignalType::SInt,
                "real32" => SignalType::Real32,
                other => return Err(parse_err(line_no, format!("unknown type `{other}`"))),
            }
        }
        "byteOffset" => {
            mapping.byte_offset = value
                .trim()
                .parse()
                .map_err(|_| parse_err(line_no, format!("invalid byteOffset `{value}`")))?
        }
        "bitOffset" => {
            mapping.bit_offset = Some(
                value
                    .trim()
                    .parse()
                    .map_err(|_| parse_err(line_no, format!("invalid bitOffset `{value}`")))?,
            )
        }
        "scale" => {
            mapping.scale = value
                .trim()
                .parse()
                .map_err(|_| parse_err(line_no, format!("invalid scale `{value}`")))?
        }
        "engineeringOffset" => {
            mapping.engineering_offset = value
                .trim()
                .parse()
                .map_err(|_| parse_err(line_no, format!("invalid engineeringOffset `{value}`")))?
        }
        "units" => mapping.units = parse_string(value, line_no)?,
        other => return Err(parse_err(line_no, format!("unknown field `{other}`"))),
    }
    Ok(())
}

pub fn import_mappings(payload: &str) -> CoreResult<Vec<SignalMapping>> {
    let mut mappings = Vec::new();
    let mut record = RecordBuilder::new();

    for (idx, line) in payload.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            if record.started {
                mappings.push(record.mapping);
                record = RecordBuilder::new();
            }
            continue;
        }

        // Indented lines are enum entries of the current record.
        if line.starts_with(' ') || line.starts_with('\t') {
            if !record.in_enums {
                return Err(parse_err(line_no, "enum entry outside an `enums:` block"));
            }
            record.mapping.enums.push(parse_enum_entry(line, line_no)?);
            continue;
        }

        record.started = true;
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| parse_err(line_no, "expected `key: value`"))?;
        if key.trim() == "enums" {
            record.in_enums = true;
            continue;
        }
        record.in_enums = false;
        apply_field(&mut record, key.trim(), value, line_no)?;
    }

    if record.started {
        mappings.push(record.mapping);
    }
    Ok(mappings)
}
