//! Versioned save/restore of the whole app state across two records.
//!
//! Each record is framed as `magic | version | postcard body | checksum32`.
//! The primary record carries every scalar field plus the longest prefix of
//! splits that still fits under [`MAX_RECORD_LEN`]; the remainder, if any,
//! goes to the secondary record. Splits are stored as fixed four-byte values,
//! so a full buffer fits the two records whatever the elapsed times are. A
//! failed write discards both records so the next load sees a clean slate
//! instead of half a state.

use heapless::Vec;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeSeq};

use crate::{
    app::{DisplayMode, RunState},
    options::{Appearance, Options, OverflowPolicy},
    storage::{MAX_RECORD_LEN, RecordKey, RecordStore},
    text::{DateText, Label, TimeText},
};

pub const PRIMARY_RECORD_KEY: RecordKey = 1;
pub const SPLITS_RECORD_KEY: RecordKey = 2;

const RECORD_MAGIC: u32 = 0x3157_4843; // "CHW1"
const RECORD_VERSION: u8 = 1;
const HEADER_LEN: usize = 5;
const CHECKSUM_LEN: usize = 4;
const BODY_CAPACITY: usize = MAX_RECORD_LEN - HEADER_LEN - CHECKSUM_LEN;

/// Everything that survives a close, as handed to and from the app.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PersistedState<const N: usize> {
    pub mode: DisplayMode,
    pub run: RunState,
    pub time_text: TimeText,
    pub date_text: DateText,
    pub elapsed_secs: u32,
    /// Wall clock at close, seconds since the Unix epoch.
    pub close_unix: i64,
    pub action_label: Label,
    pub has_been_reset: bool,
    pub options: Options,
    pub splits: Vec<u32, N>,
}

impl<const N: usize> Default for PersistedState<N> {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Clock,
            run: RunState::Stopped,
            time_text: TimeText::new(),
            date_text: DateText::new(),
            elapsed_secs: 0,
            close_unix: 0,
            action_label: Label::new(),
            has_been_reset: false,
            options: Options::default(),
            splits: Vec::new(),
        }
    }
}

impl<const N: usize> PersistedState<N> {
    /// Zero-based index of the newest split, `-1` when none are stored.
    pub fn split_index(&self) -> i16 {
        self.splits.len() as i16 - 1
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PrimaryRecord<S> {
    mode: DisplayMode,
    run: RunState,
    time_text: TimeText,
    date_text: DateText,
    elapsed_secs: u32,
    close_unix: i64,
    action_label: Label,
    has_been_reset: bool,
    appearance: Appearance,
    split_index: i16,
    reset_clears_splits: bool,
    splits_overflow: OverflowPolicy,
    /// Splits across both records.
    splits_total: u16,
    splits: S,
}

#[derive(Debug, Serialize, Deserialize)]
struct SplitsRecord<S> {
    splits: S,
}

/// One split on the wire, little-endian and always four bytes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct WireSplit(#[serde(with = "postcard::fixint::le")] u32);

/// Borrowed splits written as a sequence of [`WireSplit`].
struct WireSplits<'a>(&'a [u32]);

impl Serialize for WireSplits<'_> {
    fn serialize<Se>(&self, serializer: Se) -> Result<Se::Ok, Se::Error>
    where
        Se: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for value in self.0 {
            seq.serialize_element(&WireSplit(*value))?;
        }
        seq.end()
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PersistError<E> {
    Store(E),
    Encode,
    /// Not even the split remainder fits in the secondary record.
    RecordTooLarge,
    ShortWrite { expected: usize, written: usize },
}

/// Why a stored state could not be used.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LoadError<E> {
    Store(E),
    Truncated { len: usize },
    BadMagic,
    UnsupportedVersion(u8),
    Checksum,
    Decode,
    MissingSplits,
    SplitCount { expected: usize, found: usize },
}

/// Outcome of [`load`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Restore<const N: usize> {
    /// Nothing usable was stored; start from defaults.
    Defaults,
    Restored(PersistedState<N>),
}

impl<const N: usize> Restore<N> {
    pub fn into_state(self) -> Option<PersistedState<N>> {
        match self {
            Self::Defaults => None,
            Self::Restored(state) => Some(state),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum FrameError {
    Full,
    Encode,
}

pub fn save<S, const N: usize>(
    store: &mut S,
    state: &PersistedState<N>,
) -> Result<(), PersistError<S::Error>>
where
    S: RecordStore,
{
    match write_records(store, state) {
        Ok(split_at) => {
            info!(
                "persist: saved mode={:?} run={:?} elapsed={} splits={}+{}",
                state.mode,
                state.run,
                state.elapsed_secs,
                split_at,
                state.splits.len() - split_at
            );
            Ok(())
        }
        Err(err) => {
            warn!("persist: save failed, discarding stored state");
            discard(store);
            Err(err)
        }
    }
}

/// Restores the stored state, advancing a running chronometer by the time
/// that passed since `close_unix`. Any read problem yields defaults.
pub fn load<S, const N: usize>(store: &mut S, now_unix: i64) -> Restore<N>
where
    S: RecordStore,
    S::Error: core::fmt::Debug,
{
    match read_records::<S, N>(store) {
        Ok(Some(mut state)) => {
            if state.run == RunState::Running {
                let closed_for = closed_secs(state.close_unix, now_unix);
                state.elapsed_secs = state.elapsed_secs.saturating_add(closed_for);
                debug!("persist: chronometer ran {}s while closed", closed_for);
            }
            info!(
                "persist: restored mode={:?} run={:?} elapsed={} splits={}",
                state.mode,
                state.run,
                state.elapsed_secs,
                state.splits.len()
            );
            Restore::Restored(state)
        }
        Ok(None) => {
            info!("persist: no saved state");
            Restore::Defaults
        }
        Err(err) => {
            warn!("persist: ignoring saved state: {:?}", err);
            Restore::Defaults
        }
    }
}

/// Seconds between close and now. A clock that moved backwards counts as zero.
fn closed_secs(close_unix: i64, now_unix: i64) -> u32 {
    let gap = now_unix.saturating_sub(close_unix).max(0);
    u32::try_from(gap).unwrap_or(u32::MAX)
}

fn write_records<S, const N: usize>(
    store: &mut S,
    state: &PersistedState<N>,
) -> Result<usize, PersistError<S::Error>>
where
    S: RecordStore,
{
    let mut buf = [0u8; MAX_RECORD_LEN];
    let split_at = largest_primary_prefix(state, &mut buf)?;

    let primary_len =
        encode_record(&primary_record(state, split_at), &mut buf).map_err(frame_to_persist)?;
    write_exact(store, PRIMARY_RECORD_KEY, &buf[..primary_len])?;

    let rest = &state.splits[split_at..];
    if rest.is_empty() {
        // Leftovers from an earlier, longer save are never read; drop them anyway.
        if store.delete(SPLITS_RECORD_KEY).is_err() {
            debug!("persist: stale splits record not removed");
        }
        return Ok(split_at);
    }

    let splits_len = encode_record(&SplitsRecord { splits: WireSplits(rest) }, &mut buf)
        .map_err(frame_to_persist)?;
    write_exact(store, SPLITS_RECORD_KEY, &buf[..splits_len])?;
    Ok(split_at)
}

fn primary_record<const N: usize>(
    state: &PersistedState<N>,
    split_at: usize,
) -> PrimaryRecord<WireSplits<'_>> {
    PrimaryRecord {
        mode: state.mode,
        run: state.run,
        time_text: state.time_text.clone(),
        date_text: state.date_text.clone(),
        elapsed_secs: state.elapsed_secs,
        close_unix: state.close_unix,
        action_label: state.action_label.clone(),
        has_been_reset: state.has_been_reset,
        appearance: state.options.appearance,
        split_index: state.split_index(),
        reset_clears_splits: state.options.reset_clears_splits,
        splits_overflow: state.options.splits_overflow,
        splits_total: state.splits.len() as u16,
        splits: WireSplits(&state.splits[..split_at]),
    }
}

/// Largest `k` such that the primary record with the first `k` splits fits.
fn largest_primary_prefix<E, const N: usize>(
    state: &PersistedState<N>,
    buf: &mut [u8; MAX_RECORD_LEN],
) -> Result<usize, PersistError<E>> {
    if !primary_fits(state, 0, buf)? {
        return Err(PersistError::RecordTooLarge);
    }

    let (mut lo, mut hi) = (0usize, state.splits.len());
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        if primary_fits(state, mid, buf)? {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(lo)
}

fn primary_fits<E, const N: usize>(
    state: &PersistedState<N>,
    split_at: usize,
    buf: &mut [u8; MAX_RECORD_LEN],
) -> Result<bool, PersistError<E>> {
    match encode_record(&primary_record(state, split_at), buf) {
        Ok(_) => Ok(true),
        Err(FrameError::Full) => Ok(false),
        Err(FrameError::Encode) => Err(PersistError::Encode),
    }
}

fn encode_record<T: Serialize>(
    value: &T,
    buf: &mut [u8; MAX_RECORD_LEN],
) -> Result<usize, FrameError> {
    buf[..4].copy_from_slice(&RECORD_MAGIC.to_le_bytes());
    buf[4] = RECORD_VERSION;

    let body_len = postcard::to_slice(value, &mut buf[HEADER_LEN..HEADER_LEN + BODY_CAPACITY])
        .map_err(|err| match err {
            postcard::Error::SerializeBufferFull => FrameError::Full,
            _ => FrameError::Encode,
        })?
        .len();

    let end = HEADER_LEN + body_len;
    let checksum = checksum32(&buf[..end]);
    buf[end..end + CHECKSUM_LEN].copy_from_slice(&checksum.to_le_bytes());
    Ok(end + CHECKSUM_LEN)
}

fn frame_to_persist<E>(err: FrameError) -> PersistError<E> {
    match err {
        FrameError::Full => PersistError::RecordTooLarge,
        FrameError::Encode => PersistError::Encode,
    }
}

fn write_exact<S>(store: &mut S, key: RecordKey, bytes: &[u8]) -> Result<(), PersistError<S::Error>>
where
    S: RecordStore,
{
    let written = store.write(key, bytes).map_err(PersistError::Store)?;
    if written != bytes.len() {
        return Err(PersistError::ShortWrite {
            expected: bytes.len(),
            written,
        });
    }
    Ok(())
}

fn discard<S: RecordStore>(store: &mut S) {
    for key in [PRIMARY_RECORD_KEY, SPLITS_RECORD_KEY] {
        if store.delete(key).is_err() {
            warn!("persist: could not delete record key={}", key);
        }
    }
}

fn read_records<S, const N: usize>(
    store: &mut S,
) -> Result<Option<PersistedState<N>>, LoadError<S::Error>>
where
    S: RecordStore,
{
    if !store.exists(PRIMARY_RECORD_KEY).map_err(LoadError::Store)? {
        return Ok(None);
    }

    let mut buf = [0u8; MAX_RECORD_LEN];
    let body = read_body(store, PRIMARY_RECORD_KEY, &mut buf)?;
    let primary: PrimaryRecord<Vec<WireSplit, N>> =
        postcard::from_bytes(body).map_err(|_| LoadError::Decode)?;

    let total = primary.splits_total as usize;
    if total > N || primary.splits.len() > total {
        return Err(LoadError::SplitCount {
            expected: total,
            found: primary.splits.len(),
        });
    }

    let mut splits: Vec<u32, N> = primary.splits.iter().map(|split| split.0).collect();
    if splits.len() < total {
        if !store.exists(SPLITS_RECORD_KEY).map_err(LoadError::Store)? {
            return Err(LoadError::MissingSplits);
        }
        let body = read_body(store, SPLITS_RECORD_KEY, &mut buf)?;
        let rest: SplitsRecord<Vec<WireSplit, N>> =
            postcard::from_bytes(body).map_err(|_| LoadError::Decode)?;
        let found = splits.len() + rest.splits.len();
        if found != total || rest.splits.iter().any(|split| splits.push(split.0).is_err()) {
            return Err(LoadError::SplitCount {
                expected: total,
                found,
            });
        }
    }

    if primary.split_index != splits.len() as i16 - 1 {
        return Err(LoadError::SplitCount {
            expected: (primary.split_index + 1).max(0) as usize,
            found: splits.len(),
        });
    }

    Ok(Some(PersistedState {
        mode: primary.mode,
        run: primary.run,
        time_text: primary.time_text,
        date_text: primary.date_text,
        elapsed_secs: primary.elapsed_secs,
        close_unix: primary.close_unix,
        action_label: primary.action_label,
        has_been_reset: primary.has_been_reset,
        options: Options {
            reset_clears_splits: primary.reset_clears_splits,
            splits_overflow: primary.splits_overflow,
            appearance: primary.appearance,
        },
        splits,
    }))
}

/// Reads and unframes one record, returning its postcard body.
fn read_body<'b, S>(
    store: &mut S,
    key: RecordKey,
    buf: &'b mut [u8; MAX_RECORD_LEN],
) -> Result<&'b [u8], LoadError<S::Error>>
where
    S: RecordStore,
{
    let len = store.read(key, buf).map_err(LoadError::Store)?;
    if len < HEADER_LEN + CHECKSUM_LEN || len > MAX_RECORD_LEN {
        return Err(LoadError::Truncated { len });
    }

    let magic = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if magic != RECORD_MAGIC {
        return Err(LoadError::BadMagic);
    }
    if buf[4] != RECORD_VERSION {
        return Err(LoadError::UnsupportedVersion(buf[4]));
    }

    let body_end = len - CHECKSUM_LEN;
    let expected = u32::from_le_bytes([
        buf[body_end],
        buf[body_end + 1],
        buf[body_end + 2],
        buf[body_end + 3],
    ]);
    if checksum32(&buf[..body_end]) != expected {
        return Err(LoadError::Checksum);
    }

    Ok(&buf[HEADER_LEN..body_end])
}

fn checksum32(bytes: &[u8]) -> u32 {
    let mut hash = 0x811C9DC5u32;
    for b in bytes {
        hash ^= *b as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}
