// Sat Feb 14 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetParseError {
    #[error("empty index set")]
    Empty,
    #[error("not an index: {0}")]
    NotAnIndex(String),
    #[error("index {index} out of range (have {max})")]
    OutOfRange { index: usize, max: usize },
    #[error("backwards range: {0}")]
    BackwardsRange(String),
}

/// Parses a comma-separated index set: plain decimals (`1,4,7`), `0x` hex,
/// inclusive ranges (`2..5`), and a leading `!` inverting the whole set
/// against `0..max`. Every index must be below `max`. The result is sorted
/// and deduplicated; a set that ends up selecting nothing is an error.
pub fn parse_uintset(text: &str, max: usize) -> Result<Vec<usize>, SetParseError> {
    let trimmed = text.trim();
    let (invert, body) = match trimmed.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    if body.is_empty() {
        return Err(SetParseError::Empty);
    }

    let mut picked = vec![false; max];
    for item in body.split(',') {
        let item = item.trim();
        if let Some((low, high)) = item.split_once("..") {
            let low = parse_index(low)?;
            let high = parse_index(high)?;
            if high < low {
                return Err(SetParseError::BackwardsRange(item.to_string()));
            }
            if high >= max {
                return Err(SetParseError::OutOfRange { index: high, max });
            }
            for slot in &mut picked[low..=high] {
                *slot = true;
            }
        } else {
            let index = parse_index(item)?;
            if index >= max {
                return Err(SetParseError::OutOfRange { index, max });
            }
            picked[index] = true;
        }
    }

    let indices: Vec<usize> = picked
        .iter()
        .enumerate()
        .filter_map(|(i, &p)| if p != invert { Some(i) } else { None })
        .collect();
    if indices.is_empty() {
        return Err(SetParseError::Empty);
    }
    Ok(indices)
}

fn parse_index(token: &str) -> Result<usize, SetParseError> {
    let token = token.trim();
    let parsed = if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16)
    } else {
        token.parse::<usize>()
    };
    parsed.map_err(|_| SetParseError::NotAnIndex(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_input() {
        assert_eq!(parse_uintset("1,2,3", 10).unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_uintset("0x1,0x2,0x3", 10).unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_uintset("1..3", 10).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_inverted_input() {
        assert_eq!(parse_uintset("!1,2,3", 5).unwrap(), vec![0, 4]);
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            parse_uintset("1..10", 5),
            Err(SetParseError::OutOfRange { index: 10, max: 5 })
        ));
        assert!(matches!(
            parse_uintset("abc", 10),
            Err(SetParseError::NotAnIndex(_))
        ));
        assert!(parse_uintset("1..", 10).is_err());
        assert!(matches!(
            parse_uintset("3..1", 10),
            Err(SetParseError::BackwardsRange(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_uintset("", 10), Err(SetParseError::Empty));
        assert_eq!(parse_uintset("!", 10), Err(SetParseError::Empty));
    }

    #[test]
    fn test_edge_cases() {
        assert_eq!(parse_uintset("0", 1).unwrap(), vec![0]);
        // Inverting the only index leaves nothing to select.
        assert_eq!(parse_uintset("!0", 1), Err(SetParseError::Empty));
    }

    #[test]
    fn test_overlap_is_deduplicated() {
        assert_eq!(parse_uintset("1..4,2,3", 10).unwrap(), vec![1, 2, 3, 4]);
    }
}
