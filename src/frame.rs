//! DDS frame geometry and cycle-time calculation
//!
//! Derives how many audio samples fit into one Ethernet frame for a given MTU,
//! and from that the protocol cycle time and packet rate.
//!
//! Frame layout (bytes):
//! - Ethernet header: 14
//! - DDS protocol header: 2
//! - VLAN tag reservation: 4 (budgeted against the MTU, not emitted)
//! - Audio payload: rounded down to an 8-byte boundary
//! - Frame check sequence: 4 (appended, not budgeted against the MTU)

use serde::Serialize;

/// Ethernet (link layer) header size
pub const ETH_HEADER: u32 = 14;
/// DDS protocol header size
pub const DDS_HEADER: u32 = 2;
/// Reservation for an 802.1Q VLAN tag
pub const VLAN_OVERHEAD: u32 = 4;
/// Trailing frame check sequence
pub const FCS: u32 = 4;

/// Fixed per-frame overhead charged against the MTU
pub const FRAME_OVERHEAD: u32 = ETH_HEADER + DDS_HEADER + VLAN_OVERHEAD;

/// Payload alignment requirement
const PAYLOAD_ALIGNMENT: u32 = 8;

/// Base rate the reference cycle time is derived from
pub const BASE_RATE_48K: u32 = 48_000;

/// Configured cycle times are expressed with this granularity (μs)
pub const CYCLE_TIME_GRANULARITY_US: f64 = 5.0;

/// Default MTU when none can be detected (jumbo frames)
pub const DEFAULT_MTU: u32 = 9024;

/// Audio sample encoding carried in the frame payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// One-bit stereo stream: 4 samples per byte
    Dsd,
    /// 24-bit stereo PCM: 6 bytes per sample
    Pcm,
}

impl Encoding {
    pub fn from_dsd_flag(is_dsd: bool) -> Self {
        if is_dsd {
            Encoding::Dsd
        } else {
            Encoding::Pcm
        }
    }

    pub fn is_dsd(self) -> bool {
        matches!(self, Encoding::Dsd)
    }

    /// Bytes per (stereo) sample
    pub fn bytes_per_sample(self) -> f64 {
        let (bytes, samples) = self.ratio();
        bytes as f64 / samples as f64
    }

    /// Multiplier applied to the 48 kHz base rate for this encoding
    pub fn base_rate_multiplier(self) -> u32 {
        match self {
            Encoding::Dsd => 256,
            Encoding::Pcm => 8,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Encoding::Dsd => "DSD",
            Encoding::Pcm => "PCM",
        }
    }

    // Bytes-per-sample as an exact (bytes, samples) ratio so the floors
    // below stay in integer arithmetic.
    fn ratio(self) -> (u64, u64) {
        match self {
            Encoding::Dsd => (1, 4),
            Encoding::Pcm => (6, 1),
        }
    }
}

/// Frame geometry and timing for one sample rate
///
/// Invariant: `audio_bytes <= mtu - FRAME_OVERHEAD`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameParameters {
    pub sample_rate: u32,
    pub is_dsd: bool,
    pub samples_per_frame: u64,
    pub audio_bytes: u64,
    pub total_frame_size: u64,
    pub cycle_time_us: f64,
    pub packet_rate_hz: f64,
}

impl FrameParameters {
    pub fn sample_rate_mhz(&self) -> f64 {
        self.sample_rate as f64 / 1_000_000.0
    }

    pub fn cycle_time_ms(&self) -> f64 {
        self.cycle_time_us / 1000.0
    }
}

/// Calculator bound to one network MTU
///
/// Callers are responsible for passing a sensible MTU; anything at or below
/// [`FRAME_OVERHEAD`] leaves no room for audio and yields a zero-sample frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCalculator {
    mtu: u32,
}

impl FrameCalculator {
    pub fn new(mtu: u32) -> Self {
        Self { mtu }
    }

    /// Bytes left for audio after the fixed overhead
    pub fn available_payload(&self) -> u32 {
        self.mtu.saturating_sub(FRAME_OVERHEAD)
    }

    /// Compute frame parameters for `sample_rate` in the given encoding
    ///
    /// # Example
    /// ```
    /// use ddscalc::frame::{Encoding, FrameCalculator};
    ///
    /// let params = FrameCalculator::new(9024).frame_params(12_288_000, Encoding::Dsd);
    /// assert_eq!(params.samples_per_frame, 36_000);
    /// assert_eq!(params.audio_bytes, 9_000);
    /// assert_eq!(params.total_frame_size, 9_020);
    /// ```
    pub fn frame_params(&self, sample_rate: u32, encoding: Encoding) -> FrameParameters {
        let aligned = (self.available_payload() / PAYLOAD_ALIGNMENT * PAYLOAD_ALIGNMENT) as u64;
        let (bytes, per_samples) = encoding.ratio();

        let samples_per_frame = aligned * per_samples / bytes;
        let audio_bytes = samples_per_frame * bytes / per_samples;

        let (cycle_time_us, packet_rate_hz) = if samples_per_frame == 0 || sample_rate == 0 {
            (0.0, 0.0)
        } else {
            (
                samples_per_frame as f64 / sample_rate as f64 * 1_000_000.0,
                sample_rate as f64 / samples_per_frame as f64,
            )
        };

        FrameParameters {
            sample_rate,
            is_dsd: encoding.is_dsd(),
            samples_per_frame,
            audio_bytes,
            total_frame_size: (ETH_HEADER + DDS_HEADER) as u64 + audio_bytes + FCS as u64,
            cycle_time_us,
            packet_rate_hz,
        }
    }

    /// Reference cycle time for the 48 kHz family, rounded to 5 μs
    ///
    /// Returns the rounded cycle time together with the unrounded parameters
    /// it was derived from.
    pub fn cycle_time_for_48k(&self, encoding: Encoding) -> (u32, FrameParameters) {
        let sample_rate = BASE_RATE_48K * encoding.base_rate_multiplier();
        let params = self.frame_params(sample_rate, encoding);
        (round_to_granularity(params.cycle_time_us), params)
    }
}

impl Default for FrameCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_MTU)
    }
}

/// Round a cycle time to the nearest multiple of 5 μs (ties to even)
pub fn round_to_granularity(cycle_time_us: f64) -> u32 {
    let steps = (cycle_time_us / CYCLE_TIME_GRANULARITY_US).round_ties_even();
    (steps * CYCLE_TIME_GRANULARITY_US) as u32
}
