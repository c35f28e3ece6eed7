//! Code 128 encoder (code sets B and C).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarcodeError {
    #[error("cannot encode an empty value")]
    Empty,
    #[error("character {ch:?} at position {index} is not encodable in Code 128")]
    InvalidChar { ch: char, index: usize },
}

const START_B: u8 = 104;
const START_C: u8 = 105;
const CODE_B: u8 = 100;
const CODE_C: u8 = 99;
const STOP: u8 = 106;

/// Bar/space widths for every symbol value, bar first.
const PATTERNS: [&str; 107] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312", "132212", "221213",
    "221312", "231212", "112232", "122132", "122231", "113222", "123122", "123221", "223211", "221132",
    "221231", "213212", "223112", "312131", "311222", "321122", "321221", "312212", "322112", "322211",
    "212123", "212321", "232121", "111323", "131123", "131321", "112313", "132113", "132311", "211313",
    "231113", "231311", "112133", "112331", "132131", "113123", "113321", "133121", "313121", "211331",
    "231131", "213113", "213311", "213131", "311123", "311321", "331121", "312113", "312311", "332111",
    "314111", "221411", "431111", "111224", "111422", "121124", "121421", "141122", "141221", "112214",
    "112412", "122114", "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111",
    "111242", "121142", "121241", "114212", "124112", "124211", "411212", "421112", "421211", "212141",
    "214121", "412121", "111143", "111341", "131141", "114113", "114311", "411113", "411311", "113141",
    "114131", "311141", "411131", "211412", "211214", "211232", "2331112",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeSet {
    B,
    C,
}

/// An encoded symbol: values from start to stop, checksum included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code128 {
    values: Vec<u8>,
}

impl Code128 {
    pub fn encode(data: &str) -> Result<Self, BarcodeError> {
        if data.is_empty() {
            return Err(BarcodeError::Empty);
        }
        if let Some((index, ch)) = data.char_indices().find(|(_, c)| !(' '..='~').contains(c)) {
            return Err(BarcodeError::InvalidChar { ch, index });
        }

        // printable ASCII only from here on, so bytes == chars
        let bytes = data.as_bytes();
        let mut values = Vec::with_capacity(bytes.len() + 4);
        let lead = digit_run(bytes, 0);
        let mut set = if lead >= 4 && lead % 2 == 0 {
            values.push(START_C);
            CodeSet::C
        } else {
            values.push(START_B);
            CodeSet::B
        };

        let mut i = 0;
        while i < bytes.len() {
            let run = digit_run(bytes, i);
            match set {
                CodeSet::C if run >= 2 => {
                    values.push((bytes[i] - b'0') * 10 + (bytes[i + 1] - b'0'));
                    i += 2;
                }
                CodeSet::C => {
                    values.push(CODE_B);
                    set = CodeSet::B;
                }
                CodeSet::B => {
                    let at_end = i + run == bytes.len();
                    let worth_switching = run >= 6 || (run >= 4 && at_end);
                    if worth_switching && run % 2 == 0 {
                        values.push(CODE_C);
                        set = CodeSet::C;
                    } else {
                        values.push(bytes[i] - b' ');
                        i += 1;
                    }
                }
            }
        }

        values.push(checksum(&values));
        values.push(STOP);
        Ok(Self { values })
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn checksum(&self) -> u8 {
        self.values[self.values.len() - 2]
    }

    /// Alternating bar/space run lengths in modules, starting with a bar.
    pub fn runs(&self) -> Vec<u8> {
        self.values
            .iter()
            .flat_map(|&v| PATTERNS[v as usize].bytes().map(|b| b - b'0'))
            .collect()
    }

    /// Bars as `(start module, width in modules)`.
    pub fn bars(&self) -> Vec<(u32, u32)> {
        let mut bars = Vec::new();
        let mut x = 0u32;
        for (i, w) in self.runs().into_iter().enumerate() {
            if i % 2 == 0 {
                bars.push((x, w as u32));
            }
            x += w as u32;
        }
        bars
    }

    /// Total symbol width in modules, quiet zones excluded.
    pub fn modules(&self) -> u32 {
        // 11 per symbol, 13 for stop
        self.values.len() as u32 * 11 + 2
    }
}

fn digit_run(bytes: &[u8], from: usize) -> usize {
    bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count()
}

fn checksum(values: &[u8]) -> u8 {
    let sum = values
        .iter()
        .enumerate()
        .map(|(pos, &v)| pos.max(1) as u32 * v as u32)
        .sum::<u32>();
    (sum % 103) as u8
}
