// Fri Feb 13 2026 - Alex

use crate::scan::types::ScanDataType;
use crate::value::mem64::Mem64;

fn format_scalar<T>(value: Option<T>) -> String
where
    T: std::fmt::Display,
{
    match value {
        Some(v) => v.to_string(),
        None => "??".to_string(),
    }
}

fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decodes collected value bytes for display according to the scan data
/// type. Integer widths follow the byte count for the aggregated types.
pub fn format_value(bytes: &[u8], data_type: ScanDataType, reverse_endian: bool) -> String {
    let mem = Mem64::from_slice(bytes);
    match data_type {
        ScanDataType::Integer8 => format_scalar(mem.read::<i8>(reverse_endian)),
        ScanDataType::Integer16 => format_scalar(mem.read::<i16>(reverse_endian)),
        ScanDataType::Integer32 => format_scalar(mem.read::<i32>(reverse_endian)),
        ScanDataType::Integer64 => format_scalar(mem.read::<i64>(reverse_endian)),
        ScanDataType::Float32 => format_scalar(mem.read::<f32>(reverse_endian)),
        ScanDataType::Float64 => format_scalar(mem.read::<f64>(reverse_endian)),
        ScanDataType::AnyInteger | ScanDataType::AnyNumber => match bytes.len() {
            1 => format_scalar(mem.read::<i8>(reverse_endian)),
            2 => format_scalar(mem.read::<i16>(reverse_endian)),
            4 => format_scalar(mem.read::<i32>(reverse_endian)),
            8 => format_scalar(mem.read::<i64>(reverse_endian)),
            _ => hex_dump(bytes),
        },
        ScanDataType::AnyFloat => match bytes.len() {
            4 => format_scalar(mem.read::<f32>(reverse_endian)),
            8 => format_scalar(mem.read::<f64>(reverse_endian)),
            _ => hex_dump(bytes),
        },
        ScanDataType::Bytes => hex_dump(bytes),
        ScanDataType::String => String::from_utf8_lossy(bytes).into_owned(),
    }
}
