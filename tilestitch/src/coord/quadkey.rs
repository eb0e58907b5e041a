//! Conversion between quadkeys and cartesian tile coordinates.
//!
//! Each quadkey digit picks one quadrant while descending from the root:
//!
//! ```text
//!   +---+---+
//!   | 0 | 1 |     0 = NW, 1 = NE
//!   +---+---+
//!   | 2 | 3 |     2 = SW, 3 = SE
//!   +---+---+
//! ```
//!
//! Digit `i` (counted from the most significant end) contributes bit
//! `zoom - i` of `x` when it carries the east bit and of `y` when it carries
//! the south bit. The south bit assumes north-origin rows; pass
//! [`YAxis::SouthOrigin`] to read or produce TMS rows instead.

use super::types::{CoordError, Quadkey, TileCoord, YAxis, QUADKEY_DIGITS};

/// Decodes a quadkey string into cartesian coordinates.
///
/// # Errors
///
/// Returns [`CoordError::EmptyQuadkey`] for `""` and
/// [`CoordError::InvalidQuadkeyDigit`] for any digit outside `0..=3`.
pub fn quadkey_to_cartesian(quadkey: &str, y_axis: YAxis) -> Result<TileCoord, CoordError> {
    let quadkey = Quadkey::new(quadkey)?;
    Ok(quadkey_to_tile(&quadkey, y_axis))
}

/// Decodes an already validated quadkey.
pub fn quadkey_to_tile(quadkey: &Quadkey, y_axis: YAxis) -> TileCoord {
    let zoom = quadkey.zoom();
    let mut x = 0u32;
    let mut y = 0u32;

    for (i, digit) in quadkey.as_str().bytes().enumerate() {
        let mask = 1u32 << (zoom as usize - 1 - i);
        let (east, south) = QUADKEY_DIGITS[(digit - b'0') as usize];
        if east == 1 {
            x |= mask;
        }
        if south == 1 {
            y |= mask;
        }
    }

    let tile = TileCoord { x, y, zoom };
    match y_axis {
        YAxis::NorthOrigin => tile,
        YAxis::SouthOrigin => tile.flip_y(),
    }
}

/// Encodes cartesian coordinates as a quadkey.
///
/// # Errors
///
/// Returns [`CoordError::EmptyQuadkey`] for zoom 0, which has no quadkey,
/// and [`CoordError::IndexOutOfRange`] for indices outside the grid.
pub fn cartesian_to_quadkey(tile: &TileCoord, y_axis: YAxis) -> Result<Quadkey, CoordError> {
    let tile = TileCoord::new(tile.x, tile.y, tile.zoom)?;
    if tile.zoom == 0 {
        return Err(CoordError::EmptyQuadkey);
    }
    let tile = match y_axis {
        YAxis::NorthOrigin => tile,
        YAxis::SouthOrigin => tile.flip_y(),
    };

    let mut digits = String::with_capacity(tile.zoom as usize);
    for i in (1..=tile.zoom).rev() {
        let mask = 1u32 << (i - 1);
        let mut digit = b'0';
        if tile.x & mask != 0 {
            digit += 1;
        }
        if tile.y & mask != 0 {
            digit += 2;
        }
        digits.push(char::from(digit));
    }

    Quadkey::new(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_quadkey() {
        // Canonical example from the Bing Maps tile system documentation
        let tile = TileCoord { x: 3, y: 5, zoom: 3 };
        let quadkey = cartesian_to_quadkey(&tile, YAxis::NorthOrigin).unwrap();
        assert_eq!(quadkey.as_str(), "213");

        let back = quadkey_to_cartesian("213", YAxis::NorthOrigin).unwrap();
        assert_eq!(back, tile);
    }

    #[test]
    fn test_single_digit_quadrants() {
        let expected = [(0, 0), (1, 0), (0, 1), (1, 1)];
        for (digit, (x, y)) in ["0", "1", "2", "3"].iter().zip(expected) {
            let tile = quadkey_to_cartesian(digit, YAxis::NorthOrigin).unwrap();
            assert_eq!((tile.x, tile.y, tile.zoom), (x, y, 1), "digit {}", digit);
        }
    }

    #[test]
    fn test_south_origin_flips_rows() {
        // "2" is the south-west quadrant: row 1 from the north, row 0 from the south
        let tile = quadkey_to_cartesian("2", YAxis::SouthOrigin).unwrap();
        assert_eq!((tile.x, tile.y), (0, 0));

        let quadkey = cartesian_to_quadkey(&tile, YAxis::SouthOrigin).unwrap();
        assert_eq!(quadkey.as_str(), "2");
    }

    #[test]
    fn test_invalid_digit_rejected() {
        let err = quadkey_to_cartesian("0142", YAxis::NorthOrigin).unwrap_err();
        assert!(matches!(
            err,
            CoordError::InvalidQuadkeyDigit { digit: '4', .. }
        ));
    }

    #[test]
    fn test_empty_quadkey_rejected() {
        assert_eq!(
            quadkey_to_cartesian("", YAxis::NorthOrigin).unwrap_err(),
            CoordError::EmptyQuadkey
        );
    }

    #[test]
    fn test_zoom_zero_has_no_quadkey() {
        let err = cartesian_to_quadkey(&TileCoord::root(), YAxis::NorthOrigin).unwrap_err();
        assert_eq!(err, CoordError::EmptyQuadkey);
    }

    #[test]
    fn test_out_of_range_tile_rejected() {
        let tile = TileCoord { x: 4, y: 0, zoom: 2 };
        assert!(matches!(
            cartesian_to_quadkey(&tile, YAxis::NorthOrigin),
            Err(CoordError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_round_trip_all_quadkeys_up_to_zoom_6() {
        for zoom in 1..=6u8 {
            let count = 1u32 << (2 * zoom);
            for index in 0..count {
                // Base-4 digits of `index`, most significant first
                let digits: String = (0..zoom)
                    .rev()
                    .map(|i| char::from(b'0' + ((index >> (2 * i)) & 3) as u8))
                    .collect();

                for y_axis in [YAxis::NorthOrigin, YAxis::SouthOrigin] {
                    let tile = quadkey_to_cartesian(&digits, y_axis).unwrap();
                    let back = cartesian_to_quadkey(&tile, y_axis).unwrap();
                    assert_eq!(back.as_str(), digits);
                }
            }
        }
    }
}
