// US state lookup by Maidenhead grid square
// Source: grid.dat, a side table kept next to cty.dat
//
// grid.dat format:
//   EM<          starts a block for the two-letter field EM
//   10:TX,       square EM10 is in Texas
//   ...
//   99:MS>       last square of the block
//
// Only squares listed in the file are known. Irregular state boundaries mean
// a square maps to the state covering most of it, so treat the answer as a hint.

use std::io::BufRead;

use crate::error::CtyError;

/// Returned for any square that is not in the table
pub const UNKNOWN_STATE: &str = "**";

const SQUARES_PER_FIELD: usize = 100;

#[derive(Debug, Clone)]
struct GridBlock {
    prefix: String,
    states: Vec<Option<String>>,
}

impl GridBlock {
    fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            states: vec![None; SQUARES_PER_FIELD],
        }
    }
}

/// Two-letter grid field -> 100 per-square state codes
#[derive(Debug, Clone, Default)]
pub struct GridStateIndex {
    blocks: Vec<GridBlock>,
}

impl GridStateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse grid.dat content
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, CtyError> {
        let mut index = GridStateIndex::new();
        let mut in_block = false;

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = i + 1;

            if !in_block {
                if let Some((prefix, _)) = line.split_once('<') {
                    index.blocks.push(GridBlock::new(prefix.trim()));
                    in_block = true;
                }
                continue;
            }

            if line.len() <= 1 || !line.contains(':') {
                continue;
            }
            let last_cell = if line.contains(',') {
                false
            } else if line.contains('>') {
                true
            } else {
                continue;
            };

            let (square, state) = parse_cell(&line, line_number)?;
            if let Some(block) = index.blocks.last_mut() {
                if !state.is_empty() {
                    block.states[square] = Some(state.to_string());
                }
            }
            if last_cell {
                in_block = false;
            }
        }

        log::debug!("Loaded grid.dat with {} grid fields", index.blocks.len());
        Ok(index)
    }

    /// State code for a 4+ character grid square, or [`UNKNOWN_STATE`]
    pub fn lookup_state(&self, grid: &str) -> &str {
        let grid = grid.trim().to_uppercase();
        let (Some(prefix), Some(square)) = (grid.get(0..2), grid.get(2..4)) else {
            return UNKNOWN_STATE;
        };
        let Ok(square) = square.parse::<usize>() else {
            return UNKNOWN_STATE;
        };
        if square >= SQUARES_PER_FIELD {
            return UNKNOWN_STATE;
        }

        self.blocks
            .iter()
            .find(|b| b.prefix == prefix)
            .and_then(|b| b.states[square].as_deref())
            .unwrap_or(UNKNOWN_STATE)
    }

    /// Grid fields in load order
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|b| b.prefix.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Split "NN:ST," or "NN:ST>" into square number and state code
fn parse_cell(line: &str, line_number: usize) -> Result<(usize, &str), CtyError> {
    let invalid = || CtyError::InvalidGridCell {
        line: line_number,
        text: line.to_string(),
    };

    let (square, rest) = line.split_once(':').ok_or_else(invalid)?;
    let square: usize = square.trim().parse().map_err(|_| invalid())?;
    if square >= SQUARES_PER_FIELD {
        return Err(invalid());
    }
    let state = rest.split([',', '>']).next().unwrap_or("").trim();
    Ok((square, state))
}

/// Maidenhead locator check: 4 or 6 characters, `RR73` excluded
pub fn is_valid_grid(grid: &str) -> bool {
    let bytes = grid.as_bytes();
    if bytes.len() != 4 && bytes.len() != 6 {
        return false;
    }
    if grid.eq_ignore_ascii_case("RR73") {
        return false;
    }

    let field = |b: u8| matches!(b.to_ascii_uppercase(), b'A'..=b'R');
    let subsquare = |b: u8| matches!(b.to_ascii_uppercase(), b'A'..=b'X');

    field(bytes[0])
        && field(bytes[1])
        && bytes[2].is_ascii_digit()
        && bytes[3].is_ascii_digit()
        && (bytes.len() == 4 || (subsquare(bytes[4]) && subsquare(bytes[5])))
}
