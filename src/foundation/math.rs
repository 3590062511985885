use crate::foundation::core::FrameIndex;

/// Seeded FNV-1a 64.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new(seed: u64) -> Self {
        Self(Self::OFFSET_BASIS ^ seed)
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Deterministic jitter source (SplitMix64).
///
/// Every stochastic choice in the intro and the sphere widget draws from a `FrameRng`
/// seeded by [`FrameRng::for_frame`], so a frame renders identically no matter how many
/// times or in what order it is evaluated.
#[derive(Clone, Copy, Debug)]
pub struct FrameRng {
    state: u64,
}

impl FrameRng {
    /// Create a generator from a raw seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seed = FNV-1a(`seed`, `frame`, `salt`). `salt` separates independent effects that
    /// run on the same frame.
    pub fn for_frame(seed: u64, frame: FrameIndex, salt: &str) -> Self {
        let mut h = Fnv1a64::new(seed);
        h.write_u64(frame.0);
        h.write_bytes(salt.as_bytes());
        Self::new(h.finish())
    }

    /// Next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in `[0, 1)` with 53 bits of precision.
    pub fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform value in `[-0.5, 0.5)`.
    pub fn centered(&mut self) -> f64 {
        self.next_f64() - 0.5
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}
