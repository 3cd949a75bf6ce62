//! Optional loader for raw traffic captures (`traffic.pcap`).
//!
//! Not wired into the statistics path: the capture is an independent
//! collaborator a future correlation step can consume. Supports the classic
//! (legacy) pcap container in both byte orders, with microsecond or
//! nanosecond timestamp resolution, carrying Ethernet/IPv4 frames.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Legacy pcap magic, microsecond timestamps.
const MAGIC_MICROS: u32 = 0xa1b2_c3d4;
/// Legacy pcap magic, nanosecond timestamps.
const MAGIC_NANOS: u32 = 0xa1b2_3c4d;
/// Link type for Ethernet frames.
const LINKTYPE_ETHERNET: u32 = 1;

/// Error decoding a packet capture file.
#[derive(Debug)]
pub enum PcapError {
    /// File could not be read.
    Io(io::Error),
    /// Leading magic does not identify a legacy pcap file.
    BadMagic(u32),
    /// The capture uses a link type other than Ethernet.
    UnsupportedLinkType(u32),
    /// Header or packet record extends past the end of the file.
    Truncated {
        /// What was being read.
        what: &'static str,
    },
}

impl fmt::Display for PcapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PcapError::Io(e) => write!(f, "IO error: {}", e),
            PcapError::BadMagic(magic) => {
                write!(f, "not a legacy pcap file (magic {:#010x})", magic)
            }
            PcapError::UnsupportedLinkType(lt) => {
                write!(f, "unsupported pcap link type {}", lt)
            }
            PcapError::Truncated { what } => write!(f, "pcap truncated while reading {}", what),
        }
    }
}

impl std::error::Error for PcapError {}

impl From<io::Error> for PcapError {
    fn from(e: io::Error) -> Self {
        PcapError::Io(e)
    }
}

/// One captured packet with its transport-layer ports.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    /// Capture timestamp, seconds since the epoch.
    pub timestamp: f64,
    /// Source port.
    pub src_port: u16,
    /// Destination port.
    pub dst_port: u16,
    /// Captured length in bytes.
    pub captured_len: usize,
}

/// A traffic capture split around one configured port.
///
/// `sent` holds packets whose destination port matches the configured port;
/// `received` holds packets whose source port matches it. Packets that are
/// not IPv4 TCP/UDP, or that match neither side, are dropped.
#[derive(Debug, Clone, Default)]
pub struct PcapFile {
    /// Packets addressed to the configured port.
    pub sent: Vec<Packet>,
    /// Packets originating from the configured port.
    pub received: Vec<Packet>,
}

impl PcapFile {
    /// Read and split a capture file around `port`.
    pub fn load(path: &Path, port: u16) -> Result<Self, PcapError> {
        let bytes = fs::read(path)?;
        Self::parse(&bytes, port)
    }

    /// Split an in-memory capture around `port`.
    pub fn parse(bytes: &[u8], port: u16) -> Result<Self, PcapError> {
        if bytes.len() < 24 {
            return Err(PcapError::Truncated {
                what: "global header",
            });
        }

        let raw_magic = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let (big_endian, nanos) = match raw_magic {
            MAGIC_MICROS => (false, false),
            MAGIC_NANOS => (false, true),
            m if m.swap_bytes() == MAGIC_MICROS => (true, false),
            m if m.swap_bytes() == MAGIC_NANOS => (true, true),
            m => return Err(PcapError::BadMagic(m)),
        };
        let read_u32 = |chunk: &[u8]| -> u32 {
            let arr: [u8; 4] = chunk.try_into().unwrap();
            if big_endian {
                u32::from_be_bytes(arr)
            } else {
                u32::from_le_bytes(arr)
            }
        };

        let link_type = read_u32(&bytes[20..24]);
        if link_type != LINKTYPE_ETHERNET {
            return Err(PcapError::UnsupportedLinkType(link_type));
        }

        let frac_divisor = if nanos { 1e9 } else { 1e6 };
        let mut capture = PcapFile::default();
        let mut pos = 24;
        while pos < bytes.len() {
            if bytes.len() - pos < 16 {
                return Err(PcapError::Truncated {
                    what: "record header",
                });
            }
            let ts_sec = read_u32(&bytes[pos..pos + 4]);
            let ts_frac = read_u32(&bytes[pos + 4..pos + 8]);
            let incl_len = read_u32(&bytes[pos + 8..pos + 12]) as usize;
            pos += 16;

            if bytes.len() - pos < incl_len {
                return Err(PcapError::Truncated {
                    what: "packet data",
                });
            }
            let data = &bytes[pos..pos + incl_len];
            pos += incl_len;

            let Some((src_port, dst_port)) = transport_ports(data) else {
                continue;
            };
            let packet = Packet {
                timestamp: ts_sec as f64 + ts_frac as f64 / frac_divisor,
                src_port,
                dst_port,
                captured_len: incl_len,
            };
            if dst_port == port {
                capture.sent.push(packet);
            } else if src_port == port {
                capture.received.push(packet);
            }
        }

        Ok(capture)
    }

    /// Capture timestamps of the sent packets, in file order.
    pub fn sent_timestamps(&self) -> Vec<f64> {
        self.sent.iter().map(|p| p.timestamp).collect()
    }

    /// Capture timestamps of the received packets, in file order.
    pub fn received_timestamps(&self) -> Vec<f64> {
        self.received.iter().map(|p| p.timestamp).collect()
    }
}

/// Extract (src, dst) TCP/UDP ports from an Ethernet/IPv4 frame.
fn transport_ports(frame: &[u8]) -> Option<(u16, u16)> {
    // Ethernet header: 14 bytes, ethertype at 12.
    if frame.len() < 14 {
        return None;
    }
    let ethertype = u16::from_be_bytes([frame[12], frame[13]]);
    if ethertype != 0x0800 {
        return None;
    }

    let ip = &frame[14..];
    if ip.is_empty() || ip[0] >> 4 != 4 {
        return None;
    }
    let ihl = (ip[0] & 0x0f) as usize * 4;
    if ihl < 20 || ip.len() < ihl + 4 {
        return None;
    }
    let protocol = ip[9];
    // TCP and UDP both lead with source and destination port.
    if protocol != 6 && protocol != 17 {
        return None;
    }

    let l4 = &ip[ihl..];
    Some((
        u16::from_be_bytes([l4[0], l4[1]]),
        u16::from_be_bytes([l4[2], l4[3]]),
    ))
}
