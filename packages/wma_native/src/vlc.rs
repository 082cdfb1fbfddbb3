//! Prefix code (VLC) tables and decoding.
//!
//! A [`Vlc`] is a two-level lookup table: the first `root_bits` of the stream
//! index the root table, and codes longer than that continue in a sub-table
//! sized for the longest code sharing the same root prefix.

use std::sync::LazyLock;

use log::debug;

use crate::{
    bitstream::BitReader,
    error::{Error, Result},
    tables::{COEF_CODEBOOKS, CoefCodebook, EXPONENT_BITS, EXPONENT_CODES, HGAIN_BITS, HGAIN_CODES},
};

const MAX_CODE_LEN: u32 = 32;

pub const EXPONENT_VLC_BITS: u32 = 8;
pub const HGAIN_VLC_BITS: u32 = 9;
pub const COEF_VLC_BITS: u32 = 9;

/// Symbol offset of a zero exponent delta.
pub const EXPONENT_DELTA_BIAS: i32 = 60;
/// Symbol offset of a zero high-band gain delta.
pub const HGAIN_DELTA_BIAS: i32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Empty,
    Symbol { symbol: u16, len: u8 },
    Table { offset: u32, bits: u8 },
}

#[derive(Debug, Clone)]
pub struct Vlc {
    root_bits: u32,
    table: Vec<Entry>,
    symbols: usize,
}

impl Vlc {
    /// Builds a table from explicit code patterns.
    ///
    /// `codes[i]` holds the low `lengths[i]` bits of the code for symbol `i`.
    /// Symbols with a length of zero are absent from the code.
    ///
    /// # Errors
    ///
    /// * `InitFailed` - If the codes overlap, are too long, or the inputs disagree
    pub fn from_codes(codes: &[u32], lengths: &[u8], root_bits: u32) -> Result<Self> {
        if codes.len() != lengths.len() {
            return Err(Error::InitFailed(format!(
                "VLC has {} codes but {} lengths",
                codes.len(),
                lengths.len()
            )));
        }
        if root_bits == 0 || root_bits > 16 {
            return Err(Error::InitFailed(format!(
                "VLC root table of {root_bits} bits is unsupported"
            )));
        }

        let mut entries = Vec::with_capacity(codes.len());
        for (symbol, (&code, &len)) in codes.iter().zip(lengths).enumerate() {
            let len = u32::from(len);
            if len == 0 {
                continue;
            }
            if len > MAX_CODE_LEN || (len < 32 && code >> len != 0) {
                return Err(Error::InitFailed(format!(
                    "VLC code {code:#x} for symbol {symbol} does not fit in {len} bits"
                )));
            }
            let symbol = u16::try_from(symbol)
                .map_err(|_| Error::InitFailed(format!("VLC symbol {symbol} out of range")))?;
            entries.push((code, len, symbol));
        }

        let mut vlc = Self {
            root_bits,
            table: vec![Entry::Empty; 1 << root_bits],
            symbols: entries.len(),
        };
        vlc.fill(&entries)?;
        Ok(vlc)
    }

    /// Builds a canonical code from code lengths.
    ///
    /// Symbols are ordered by `(length, symbol)` and assigned consecutive
    /// patterns, so any unused code space ends up at the all-ones end.
    ///
    /// # Errors
    ///
    /// * `InitFailed` - If the lengths over-subscribe the code space
    pub fn from_lengths(lengths: &[u8], root_bits: u32) -> Result<Self> {
        let codes = canonical_codes(lengths)?;
        Self::from_codes(&codes, lengths, root_bits)
    }

    #[must_use]
    pub const fn symbol_count(&self) -> usize {
        self.symbols
    }

    fn fill(&mut self, entries: &[(u32, u32, u16)]) -> Result<()> {
        let root = self.root_bits;

        for &(code, len, symbol) in entries.iter().filter(|e| e.1 <= root) {
            let start = (code << (root - len)) as usize;
            let span = 1_usize << (root - len);
            #[allow(clippy::cast_possible_truncation)]
            let entry = Entry::Symbol {
                symbol,
                len: len as u8,
            };
            fill_range(&mut self.table, start, span, entry)?;
        }

        let mut long: Vec<_> = entries.iter().filter(|e| e.1 > root).copied().collect();
        long.sort_by_key(|&(code, len, _)| code >> (len - root));

        for group in long.chunk_by(|a, b| a.0 >> (a.1 - root) == b.0 >> (b.1 - root)) {
            let prefix = (group[0].0 >> (group[0].1 - root)) as usize;
            let sub_bits = group.iter().map(|e| e.1 - root).max().unwrap_or(1);
            let offset = self.table.len();

            if self.table[prefix] != Entry::Empty {
                return Err(Error::InitFailed(format!(
                    "VLC prefix {prefix:#x} is both a code and a code prefix"
                )));
            }
            #[allow(clippy::cast_possible_truncation)]
            {
                self.table[prefix] = Entry::Table {
                    offset: offset as u32,
                    bits: sub_bits as u8,
                };
            }
            self.table
                .resize(offset + (1 << sub_bits), Entry::Empty);

            for &(code, len, symbol) in group {
                let rest = len - root;
                let low = code & ((1 << rest) - 1);
                let start = offset + ((low << (sub_bits - rest)) as usize);
                let span = 1_usize << (sub_bits - rest);
                #[allow(clippy::cast_possible_truncation)]
                let entry = Entry::Symbol {
                    symbol,
                    len: rest as u8,
                };
                fill_range(&mut self.table, start, span, entry)?;
            }
        }

        Ok(())
    }

    /// Decodes one symbol.
    ///
    /// # Errors
    ///
    /// * `CorruptStream` - If the bits do not form a code, or the code runs past
    ///   the end of the reader
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<u16> {
        let root = self.root_bits;
        let index = reader.peek_bits(root) as usize;

        match self.table[index] {
            Entry::Symbol { symbol, len } => {
                reader.skip_bits(usize::from(len))?;
                Ok(symbol)
            }
            Entry::Table { offset, bits } => {
                let bits = u32::from(bits);
                let window = reader.peek_bits(root + bits);
                let sub = (window & ((1 << bits) - 1)) as usize;
                match self.table[offset as usize + sub] {
                    Entry::Symbol { symbol, len } => {
                        reader.skip_bits(root as usize + usize::from(len))?;
                        Ok(symbol)
                    }
                    Entry::Empty | Entry::Table { .. } => Err(invalid_code(window, root + bits)),
                }
            }
            Entry::Empty => Err(invalid_code(index as u32, root)),
        }
    }
}

fn invalid_code(bits: u32, len: u32) -> Error {
    Error::CorruptStream(format!("invalid VLC code {bits:#0width$b}", width = len as usize + 2))
}

fn fill_range(table: &mut [Entry], start: usize, span: usize, entry: Entry) -> Result<()> {
    for slot in &mut table[start..start + span] {
        if *slot != Entry::Empty {
            return Err(Error::InitFailed("VLC codes overlap".to_string()));
        }
        *slot = entry;
    }
    Ok(())
}

/// Assigns canonical code patterns for `lengths`.
///
/// # Errors
///
/// * `InitFailed` - If the lengths describe more codes than fit
pub fn canonical_codes(lengths: &[u8]) -> Result<Vec<u32>> {
    let mut order: Vec<usize> = (0..lengths.len()).filter(|&s| lengths[s] > 0).collect();
    order.sort_by_key(|&s| (lengths[s], s));

    let mut codes = vec![0_u32; lengths.len()];
    let mut next = 0_u64;
    let mut prev_len = order.first().map_or(0, |&s| u32::from(lengths[s]));

    for symbol in order {
        let len = u32::from(lengths[symbol]);
        if len > MAX_CODE_LEN {
            return Err(Error::InitFailed(format!(
                "VLC code length {len} exceeds {MAX_CODE_LEN}"
            )));
        }
        next <<= len - prev_len;
        prev_len = len;
        if next >> len != 0 {
            return Err(Error::InitFailed(
                "VLC code lengths over-subscribe the code space".to_string(),
            ));
        }
        #[allow(clippy::cast_possible_truncation)]
        {
            codes[symbol] = next as u32;
        }
        next += 1;
    }

    Ok(codes)
}

/// Coefficient codebook with its symbol to `(run, level)` mapping.
#[derive(Debug, Clone)]
pub struct RunLevelVlc {
    pub vlc: Vlc,
    pub runs: Vec<u16>,
    pub levels: Vec<u16>,
}

/// Symbol introducing an explicitly coded level and run.
pub const COEF_ESCAPE: u16 = 0;
/// Symbol ending the coefficients of a block.
pub const COEF_END_OF_BLOCK: u16 = 1;

impl RunLevelVlc {
    /// # Errors
    ///
    /// * `InitFailed` - If the code lengths are invalid or do not match the
    ///   level layout
    pub fn new(book: &CoefCodebook) -> Result<Self> {
        let mut runs = vec![0, 0];
        let mut levels = vec![0, 0];
        for (level, &count) in (1_u16..).zip(book.levels) {
            for run in 0..count {
                runs.push(run);
                levels.push(level);
            }
        }
        if runs.len() != book.bits.len() {
            return Err(Error::InitFailed(format!(
                "coefficient codebook has {} codes for {} run/level pairs",
                book.bits.len(),
                runs.len()
            )));
        }

        Ok(Self {
            vlc: Vlc::from_lengths(book.bits, COEF_VLC_BITS)?,
            runs,
            levels,
        })
    }
}

/// Every prefix code used by the decoder.
#[derive(Debug)]
pub struct Codebooks {
    pub exponent: Vlc,
    pub hgain: Vlc,
    /// Indexed by `[rate class][0 = normal, 1 = mid/side side channel]`.
    pub coefs: Vec<[RunLevelVlc; 2]>,
}

impl Codebooks {
    fn build() -> Result<Self> {
        let exponent = Vlc::from_codes(&EXPONENT_CODES, &EXPONENT_BITS, EXPONENT_VLC_BITS)?;
        let hgain = Vlc::from_codes(&HGAIN_CODES, &HGAIN_BITS, HGAIN_VLC_BITS)?;
        let coefs = COEF_CODEBOOKS
            .iter()
            .map(|[normal, side]| Ok([RunLevelVlc::new(normal)?, RunLevelVlc::new(side)?]))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Built VLC tables: {} exponent codes, {} gain codes, {} coefficient books",
            exponent.symbol_count(),
            hgain.symbol_count(),
            coefs.len() * 2
        );

        Ok(Self {
            exponent,
            hgain,
            coefs,
        })
    }
}

static CODEBOOKS: LazyLock<Result<Codebooks>> = LazyLock::new(Codebooks::build);

/// Returns the process-wide codebooks, building them on first use.
///
/// # Errors
///
/// * `InitFailed` - If a built-in table is malformed
pub fn codebooks() -> Result<&'static Codebooks> {
    CODEBOOKS.as_ref().map_err(Clone::clone)
}
