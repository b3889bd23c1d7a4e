//! PNG scanline filters.

/// Bytes per pixel for 8-bit RGBA.
pub const BYTES_PER_PIXEL: usize = 4;

/// How to choose the filter for each row.
///
/// All variants except `Adaptive` use the same filter for every row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum FilterStrategy {
    None,
    Sub,
    Up,
    Average,
    Paeth,

    /// Pick, for each row, the filter whose output has the smallest sum of absolute
    /// values when read as signed bytes.
    #[default]
    Adaptive,
}

/// The filter types defined by PNG filter method 0.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum FilterType {
    None = 0,
    Sub = 1,
    Up = 2,
    Average = 3,
    Paeth = 4,
}

const ALL_FILTERS: [FilterType; 5] = [
    FilterType::None,
    FilterType::Sub,
    FilterType::Up,
    FilterType::Average,
    FilterType::Paeth,
];

impl FilterType {
    #[cfg(test)]
    pub fn from_u8(v: u8) -> Option<FilterType> {
        ALL_FILTERS.get(usize::from(v)).copied()
    }
}

#[inline]
fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = (p - i16::from(a)).abs();
    let pb = (p - i16::from(b)).abs();
    let pc = (p - i16::from(c)).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// The value that `kind` predicts for byte `i` of `row`.
///
/// `row` must hold the unfiltered bytes up to `i`.
#[inline]
fn predict(kind: FilterType, prev: &[u8], row: &[u8], i: usize) -> u8 {
    let left = if i >= BYTES_PER_PIXEL { row[i - BYTES_PER_PIXEL] } else { 0 };
    let up = prev[i];

    match kind {
        FilterType::None => 0,
        FilterType::Sub => left,
        FilterType::Up => up,
        FilterType::Average => ((u16::from(left) + u16::from(up)) / 2) as u8,
        FilterType::Paeth => {
            let upper_left = if i >= BYTES_PER_PIXEL { prev[i - BYTES_PER_PIXEL] } else { 0 };
            paeth_predictor(left, up, upper_left)
        }
    }
}

/// Filters `row` into `out`; `prev` is the unfiltered previous row, or zeros for the
/// first one.
pub fn filter_row(kind: FilterType, prev: &[u8], row: &[u8], out: &mut [u8]) {
    debug_assert!(prev.len() == row.len() && out.len() == row.len());

    for i in 0..row.len() {
        out[i] = row[i].wrapping_sub(predict(kind, prev, row, i));
    }
}

fn score(filtered: &[u8]) -> u64 {
    filtered
        .iter()
        .map(|&b| u64::from((b as i8).unsigned_abs()))
        .sum()
}

/// Filters a whole image of `stride` bytes per row.
///
/// The result has one filter-type byte in front of each row, ready for compression.
pub fn filter_image(data: &[u8], stride: usize, strategy: FilterStrategy) -> Vec<u8> {
    if stride == 0 {
        return Vec::new();
    }

    let rows = data.len() / stride;
    let mut out = Vec::with_capacity(rows * (stride + 1));

    let zeros = vec![0u8; stride];
    let mut scratch = vec![0u8; stride];
    let mut best = vec![0u8; stride];

    for (y, row) in data.chunks_exact(stride).enumerate() {
        let prev = if y == 0 {
            &zeros[..]
        } else {
            &data[(y - 1) * stride..y * stride]
        };

        let kind = match strategy {
            FilterStrategy::None => FilterType::None,
            FilterStrategy::Sub => FilterType::Sub,
            FilterStrategy::Up => FilterType::Up,
            FilterStrategy::Average => FilterType::Average,
            FilterStrategy::Paeth => FilterType::Paeth,

            FilterStrategy::Adaptive => {
                let mut best_kind = FilterType::None;
                let mut best_score = u64::MAX;

                for kind in ALL_FILTERS {
                    filter_row(kind, prev, row, &mut scratch);
                    let s = score(&scratch);

                    if s < best_score {
                        best_score = s;
                        best_kind = kind;
                        std::mem::swap(&mut best, &mut scratch);
                    }
                }

                out.push(best_kind as u8);
                out.extend_from_slice(&best);
                continue;
            }
        };

        filter_row(kind, prev, row, &mut scratch);
        out.push(kind as u8);
        out.extend_from_slice(&scratch);
    }

    out
}
