// Wed Feb 11 2026 - Alex

use crate::scan::types::{ScanMatchType, ScanRoutine};
use crate::value::flags::MatchFlags;
use crate::value::mem64::{Mem64, OldValue};
use crate::value::scalar::ScanScalar;
use crate::value::user_value::UserValue;

/// The per-width predicate behind every numeric matcher. Missing inputs
/// (no user value for a value-relative type, no old value for a
/// change-relative type) simply fail the match.
pub fn numeric_match_core<T: ScanScalar>(
    match_type: ScanMatchType,
    value: T,
    old: Option<T>,
    user: Option<&UserValue>,
) -> bool {
    match match_type {
        ScanMatchType::Any | ScanMatchType::Update => true,
        ScanMatchType::EqualTo => user.is_some_and(|u| value.matches_eq(T::from_user(u))),
        ScanMatchType::NotEqualTo => user.is_some_and(|u| !value.matches_eq(T::from_user(u))),
        ScanMatchType::GreaterThan => user.is_some_and(|u| value > T::from_user(u)),
        ScanMatchType::LessThan => user.is_some_and(|u| value < T::from_user(u)),
        ScanMatchType::Range => user.is_some_and(|u| {
            let mut low = T::from_user(u);
            let mut high = T::from_user_high(u);
            if high < low {
                std::mem::swap(&mut low, &mut high);
            }
            low <= value && value <= high
        }),
        ScanMatchType::NotChanged => old.is_some_and(|o| value.matches_eq(o)),
        ScanMatchType::Changed => old.is_some_and(|o| !value.matches_eq(o)),
        ScanMatchType::Increased => old.is_some_and(|o| value > o),
        ScanMatchType::Decreased => old.is_some_and(|o| value < o),
        ScanMatchType::IncreasedBy => match (old, user) {
            (Some(o), Some(u)) => value.delta_matches(o, T::from_user(u)),
            _ => false,
        },
        ScanMatchType::DecreasedBy => match (old, user) {
            (Some(o), Some(u)) => o.delta_matches(value, T::from_user(u)),
            _ => false,
        },
        ScanMatchType::Regex => false,
    }
}

fn eval_width<T: ScanScalar>(
    match_type: ScanMatchType,
    mem: &Mem64,
    old: Option<&OldValue>,
    user: Option<&UserValue>,
    reverse_endian: bool,
) -> bool {
    let Some(value) = T::decode(mem, reverse_endian) else {
        return false;
    };
    let old_value = old.and_then(|o| T::decode(&o.mem, reverse_endian));
    numeric_match_core(match_type, value, old_value, user)
}

/// Same width tried with both signednesses; the width flag is shared.
fn eval_width_pair<S: ScanScalar, U: ScanScalar>(
    match_type: ScanMatchType,
    mem: &Mem64,
    old: Option<&OldValue>,
    user: Option<&UserValue>,
    reverse_endian: bool,
) -> bool {
    eval_width::<S>(match_type, mem, old, user, reverse_endian)
        || eval_width::<U>(match_type, mem, old, user, reverse_endian)
}

/// Matcher for one concrete scalar shape.
pub fn make_numeric_routine<T: ScanScalar>(
    match_type: ScanMatchType,
    reverse_endian: bool,
) -> ScanRoutine {
    Box::new(move |mem, old, user, flags_out| {
        if eval_width::<T>(match_type, mem, old, user, reverse_endian) {
            if let Some(flags) = flags_out {
                *flags |= T::FLAG;
            }
            T::WIDTH
        } else {
            0
        }
    })
}

/// Matcher for a fixed integer width that accepts either signedness.
pub fn make_integer_routine<S: ScanScalar, U: ScanScalar>(
    match_type: ScanMatchType,
    reverse_endian: bool,
) -> ScanRoutine {
    Box::new(move |mem, old, user, flags_out| {
        if eval_width_pair::<S, U>(match_type, mem, old, user, reverse_endian) {
            if let Some(flags) = flags_out {
                *flags |= S::FLAG;
            }
            S::WIDTH
        } else {
            0
        }
    })
}

fn width_allowed(user_flags: MatchFlags, flag: MatchFlags) -> bool {
    user_flags.is_empty() || user_flags.intersects(flag)
}

fn any_integer_hits(
    match_type: ScanMatchType,
    user_flags: MatchFlags,
    reverse_endian: bool,
    mem: &Mem64,
    old: Option<&OldValue>,
    user: Option<&UserValue>,
) -> (usize, MatchFlags) {
    let mut widest = 0usize;
    let mut hits = MatchFlags::EMPTY;
    if width_allowed(user_flags, MatchFlags::B8)
        && eval_width_pair::<i8, u8>(match_type, mem, old, user, reverse_endian)
    {
        hits |= MatchFlags::B8;
        widest = 1;
    }
    if width_allowed(user_flags, MatchFlags::B16)
        && eval_width_pair::<i16, u16>(match_type, mem, old, user, reverse_endian)
    {
        hits |= MatchFlags::B16;
        widest = 2;
    }
    if width_allowed(user_flags, MatchFlags::B32)
        && eval_width_pair::<i32, u32>(match_type, mem, old, user, reverse_endian)
    {
        hits |= MatchFlags::B32;
        widest = 4;
    }
    if width_allowed(user_flags, MatchFlags::B64)
        && eval_width_pair::<i64, u64>(match_type, mem, old, user, reverse_endian)
    {
        hits |= MatchFlags::B64;
        widest = 8;
    }
    (widest, hits)
}

fn any_float_hits(
    match_type: ScanMatchType,
    user_flags: MatchFlags,
    reverse_endian: bool,
    mem: &Mem64,
    old: Option<&OldValue>,
    user: Option<&UserValue>,
) -> (usize, MatchFlags) {
    let mut widest = 0usize;
    let mut hits = MatchFlags::EMPTY;
    if width_allowed(user_flags, MatchFlags::F32)
        && eval_width::<f32>(match_type, mem, old, user, reverse_endian)
    {
        hits |= MatchFlags::F32;
        widest = 4;
    }
    if width_allowed(user_flags, MatchFlags::F64)
        && eval_width::<f64>(match_type, mem, old, user, reverse_endian)
    {
        hits |= MatchFlags::F64;
        widest = 8;
    }
    (widest, hits)
}

fn aggregated_routine(
    match_type: ScanMatchType,
    user_flags: MatchFlags,
    reverse_endian: bool,
    integers: bool,
    floats: bool,
) -> ScanRoutine {
    Box::new(move |mem, old, user, flags_out| {
        let mut widest = 0usize;
        let mut hits = MatchFlags::EMPTY;
        if integers {
            let (w, h) = any_integer_hits(match_type, user_flags, reverse_endian, mem, old, user);
            widest = widest.max(w);
            hits |= h;
        }
        if floats {
            let (w, h) = any_float_hits(match_type, user_flags, reverse_endian, mem, old, user);
            widest = widest.max(w);
            hits |= h;
        }
        if widest > 0 {
            if let Some(flags) = flags_out {
                *flags |= hits;
            }
        }
        widest
    })
}

/// Every integer width tried against the same window; the bitset keeps all
/// hits, the returned width is the widest so the engine can advance.
pub fn make_any_integer_routine(
    match_type: ScanMatchType,
    user_flags: MatchFlags,
    reverse_endian: bool,
) -> ScanRoutine {
    aggregated_routine(match_type, user_flags, reverse_endian, true, false)
}

pub fn make_any_float_routine(
    match_type: ScanMatchType,
    user_flags: MatchFlags,
    reverse_endian: bool,
) -> ScanRoutine {
    aggregated_routine(match_type, user_flags, reverse_endian, false, true)
}

pub fn make_any_number_routine(
    match_type: ScanMatchType,
    user_flags: MatchFlags,
    reverse_endian: bool,
) -> ScanRoutine {
    aggregated_routine(match_type, user_flags, reverse_endian, true, true)
}
