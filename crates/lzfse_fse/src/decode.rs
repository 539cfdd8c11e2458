use lzfse_foundation::const_assert;
use lzfse_io::ReverseBitReader;

use crate::Error;

const MAX_SYMBOLS: usize = 256;

#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
struct State(u16);

/// Decodes literal bytes: one symbol per state transition, no extra bits.
pub struct Decoder<'t, const N: usize> {
    state: State,
    table: &'t DecodingTable<N>,
}

impl<'t, const N: usize> Decoder<'t, N> {
    pub fn new(table: &'t DecodingTable<N>, state: u16) -> Result<Self, Error> {
        if state as usize >= N {
            return Err(Error::InvalidState { state, n_states: N });
        }

        let state = State(state);
        tracing::trace!(
            "init FSE decoder; state={:?}; entry={:?}",
            state.0,
            table[state]
        );

        Ok(Self { state, table })
    }

    #[inline(always)]
    pub fn decode(&mut self, src: &mut ReverseBitReader) -> Result<u8, Error> {
        let entry = self.table[self.state];

        let bits = src.read(entry.n_bits)?;
        self.state = State(entry.baseline + bits as u16);
        debug_assert!((self.state.0 as usize) < N);

        Ok(entry.symbol)
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> u16 {
        self.state.0
    }
}

/// Decodes numeric values: the state transition and the value's extra bits
/// are read as one field.
pub struct ValueDecoder<'t, const N: usize> {
    state: State,
    table: &'t ValueTable<N>,
}

impl<'t, const N: usize> ValueDecoder<'t, N> {
    pub fn new(table: &'t ValueTable<N>, state: u16) -> Result<Self, Error> {
        if state as usize >= N {
            return Err(Error::InvalidState { state, n_states: N });
        }

        let state = State(state);
        tracing::trace!(
            "init FSE value decoder; state={:?}; entry={:?}",
            state.0,
            table[state]
        );

        Ok(Self { state, table })
    }

    #[inline(always)]
    pub fn decode(&mut self, src: &mut ReverseBitReader) -> Result<u32, Error> {
        let entry = self.table[self.state];

        let bits = src.read(entry.n_bits)? as u32;
        self.state = State(entry.baseline + (bits >> entry.v_bits) as u16);
        debug_assert!((self.state.0 as usize) < N);

        Ok(entry.v_base + (bits & ((1 << entry.v_bits) - 1)))
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> u16 {
        self.state.0
    }
}

/// Rejects tables whose weights need more slots than the decoder has states.
pub fn check_frequencies(freqs: &[u16], n_states: usize) -> Result<(), Error> {
    let sum: u32 = freqs.iter().map(|&f| f as u32).sum();
    if sum as usize > n_states {
        return Err(Error::FrequencyOverflow { sum, n_states });
    }

    Ok(())
}

/// Assigns `freqs[s]` consecutive slots to every symbol `s`, in symbol order,
/// and hands each slot's transition to `emit(slot, symbol, n_bits, baseline)`.
///
/// A symbol with weight `f` owns `f` slots. With `k = log2(N) - log2(f)`
/// (floored logs), the first `x = (2N >> k) - f` slots read `k` bits and
/// land in the top of the state range, the remaining ones read `k - 1` bits
/// and land at its bottom. Together the slots of one symbol cover every
/// state exactly once.
fn spread(
    freqs: &[u16],
    n_states: usize,
    mut emit: impl FnMut(usize, usize, u8, u16),
) -> Result<usize, Error> {
    assert!(n_states.is_power_of_two());

    let n = n_states as u32;
    let n_zero = n.leading_zeros();

    let mut slot = 0;
    for (symbol, &f) in freqs.iter().enumerate() {
        if f == 0 {
            continue;
        }

        if slot + f as usize > n_states {
            return Err(Error::TableOverflow(symbol));
        }

        let f = f as u32;
        let k = f.leading_zeros() - n_zero;
        let x = ((2 * n) >> k) - f;

        for j in 0..f {
            let (n_bits, baseline) = if j < x {
                (k, ((f + j) << k) - n)
            } else {
                (k - 1, (j - x) << (k - 1))
            };

            emit(slot, symbol, n_bits as u8, baseline as u16);
            slot += 1;
        }
    }

    Ok(slot)
}

#[derive(Clone, Copy, Default)]
#[repr(align(4))]
pub struct Entry {
    baseline: u16,
    n_bits: u8,
    symbol: u8,
}

impl Entry {
    const EMPTY: Self = Self {
        baseline: 0,
        n_bits: 0,
        symbol: 0,
    };
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("base_line", &self.baseline)
            .field("num_bits", &self.n_bits)
            .field("symbol", &self.symbol)
            .finish()
    }
}

const_assert!(std::mem::size_of::<Entry>() == 4);
const_assert!(std::mem::align_of::<Entry>() == 4);

#[derive(Clone, Copy, Default)]
pub struct ValueEntry {
    v_base: u32,
    baseline: u16,
    /// Transition bits plus `v_bits`.
    n_bits: u8,
    v_bits: u8,
}

impl ValueEntry {
    const EMPTY: Self = Self {
        v_base: 0,
        baseline: 0,
        n_bits: 0,
        v_bits: 0,
    };
}

impl std::fmt::Debug for ValueEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueEntry")
            .field("base_line", &self.baseline)
            .field("num_bits", &self.n_bits)
            .field("value_bits", &self.v_bits)
            .field("value_base", &self.v_base)
            .finish()
    }
}

const_assert!(std::mem::size_of::<ValueEntry>() == 8);

#[repr(align(64))]
#[derive(Debug)]
pub struct DecodingTable<const N: usize> {
    entries: [Entry; N],
}

const_assert!(std::mem::size_of::<DecodingTable<1024>>() % 64 == 0);

impl<const N: usize> Default for DecodingTable<N> {
    fn default() -> Self {
        Self {
            entries: [Entry::EMPTY; N],
        }
    }
}

impl<const N: usize> DecodingTable<N> {
    pub fn from_frequencies(freqs: &[u16]) -> Result<Self, Error> {
        let mut table = Self::default();
        table.rebuild(freqs)?;
        Ok(table)
    }

    /// Replaces every entry with the transitions for `freqs`. States left
    /// over when the weights sum to less than `N` decode symbol 0 and
    /// transition to state 0.
    pub fn rebuild(&mut self, freqs: &[u16]) -> Result<(), Error> {
        if freqs.len() > MAX_SYMBOLS {
            return Err(Error::TooManySymbols {
                got: freqs.len(),
                max: MAX_SYMBOLS,
            });
        }

        self.entries.fill(Entry::EMPTY);

        let entries = &mut self.entries;
        let used = spread(freqs, N, |slot, symbol, n_bits, baseline| {
            entries[slot] = Entry {
                baseline,
                n_bits,
                symbol: symbol as u8,
            };
        })?;

        tracing::debug!("rebuilt FSE table; states={N}; used={used}");
        Ok(())
    }

    #[inline(always)]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

impl<const N: usize> std::ops::Index<State> for DecodingTable<N> {
    type Output = Entry;

    #[inline(always)]
    fn index(&self, index: State) -> &Self::Output {
        debug_assert!((index.0 as usize) < N);
        &self.entries[index.0 as usize]
    }
}

#[repr(align(64))]
#[derive(Debug)]
pub struct ValueTable<const N: usize> {
    entries: [ValueEntry; N],
}

impl<const N: usize> Default for ValueTable<N> {
    fn default() -> Self {
        Self {
            entries: [ValueEntry::EMPTY; N],
        }
    }
}

impl<const N: usize> ValueTable<N> {
    pub fn from_frequencies(
        freqs: &[u16],
        v_bits: &[u8],
        v_base: &[u32],
    ) -> Result<Self, Error> {
        let mut table = Self::default();
        table.rebuild(freqs, v_bits, v_base)?;
        Ok(table)
    }

    /// Like [`DecodingTable::rebuild`], with symbol `s` decoding to
    /// `v_base[s]` plus `v_bits[s]` raw bits.
    pub fn rebuild(
        &mut self,
        freqs: &[u16],
        v_bits: &[u8],
        v_base: &[u32],
    ) -> Result<(), Error> {
        assert_eq!(v_bits.len(), v_base.len());

        if freqs.len() > v_bits.len() {
            return Err(Error::TooManySymbols {
                got: freqs.len(),
                max: v_bits.len(),
            });
        }

        self.entries.fill(ValueEntry::EMPTY);

        let entries = &mut self.entries;
        let used = spread(freqs, N, |slot, symbol, n_bits, baseline| {
            entries[slot] = ValueEntry {
                v_base: v_base[symbol],
                baseline,
                n_bits: n_bits + v_bits[symbol],
                v_bits: v_bits[symbol],
            };
        })?;

        tracing::debug!("rebuilt FSE value table; states={N}; used={used}");
        Ok(())
    }

    #[inline(always)]
    pub fn entries(&self) -> &[ValueEntry] {
        &self.entries
    }
}

impl<const N: usize> std::ops::Index<State> for ValueTable<N> {
    type Output = ValueEntry;

    #[inline(always)]
    fn index(&self, index: State) -> &Self::Output {
        debug_assert!((index.0 as usize) < N);
        &self.entries[index.0 as usize]
    }
}
