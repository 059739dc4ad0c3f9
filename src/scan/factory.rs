// Wed Feb 11 2026 - Alex

use crate::scan::bytes::make_bytearray_routine;
use crate::scan::numeric::{
    make_any_float_routine, make_any_integer_routine, make_any_number_routine,
    make_integer_routine, make_numeric_routine,
};
use crate::scan::string::make_string_routine;
use crate::scan::types::{ScanDataType, ScanError, ScanMatchType, ScanRoutine};
use crate::value::flags::MatchFlags;
use crate::value::user_value::UserValue;

/// Builds the matcher for a scan. This is the only place that knows how to
/// combine aggregated data types with the width filter carried in the user
/// value's flags; the returned routine does no further dispatch per window.
pub fn get_scan_routine(
    data_type: ScanDataType,
    match_type: ScanMatchType,
    user_flags: MatchFlags,
    reverse_endian: bool,
) -> Result<ScanRoutine, ScanError> {
    let unsupported = || ScanError::UnsupportedCombination {
        data_type,
        match_type,
    };

    if match_type == ScanMatchType::Regex && data_type != ScanDataType::String {
        return Err(unsupported());
    }
    if matches!(data_type, ScanDataType::Bytes)
        && !matches!(match_type, ScanMatchType::Any | ScanMatchType::EqualTo)
    {
        return Err(unsupported());
    }
    if matches!(data_type, ScanDataType::String)
        && !matches!(
            match_type,
            ScanMatchType::Any | ScanMatchType::EqualTo | ScanMatchType::Regex
        )
    {
        return Err(unsupported());
    }

    Ok(match data_type {
        ScanDataType::Integer8 => make_integer_routine::<i8, u8>(match_type, reverse_endian),
        ScanDataType::Integer16 => make_integer_routine::<i16, u16>(match_type, reverse_endian),
        ScanDataType::Integer32 => make_integer_routine::<i32, u32>(match_type, reverse_endian),
        ScanDataType::Integer64 => make_integer_routine::<i64, u64>(match_type, reverse_endian),
        ScanDataType::Float32 => make_numeric_routine::<f32>(match_type, reverse_endian),
        ScanDataType::Float64 => make_numeric_routine::<f64>(match_type, reverse_endian),
        ScanDataType::AnyInteger => {
            make_any_integer_routine(match_type, user_flags, reverse_endian)
        }
        ScanDataType::AnyFloat => make_any_float_routine(match_type, user_flags, reverse_endian),
        ScanDataType::AnyNumber => make_any_number_routine(match_type, user_flags, reverse_endian),
        ScanDataType::Bytes => make_bytearray_routine(match_type),
        ScanDataType::String => make_string_routine(match_type),
    })
}

/// Usage validation shared by the scan drivers: value-relative match types
/// require a user value with a valid payload.
pub fn validate_user_value(
    data_type: ScanDataType,
    match_type: ScanMatchType,
    user: Option<&UserValue>,
) -> Result<(), ScanError> {
    if !match_type.needs_user_value() {
        return Ok(());
    }
    let Some(user) = user else {
        return Err(ScanError::MissingUserValue);
    };
    match data_type {
        ScanDataType::Bytes => {
            if user.bytes.is_empty() {
                return Err(ScanError::MissingUserValue);
            }
            user.validate_mask()?;
        }
        ScanDataType::String => {
            if user.string.is_empty() {
                return Err(ScanError::MissingUserValue);
            }
        }
        _ => {}
    }
    Ok(())
}
