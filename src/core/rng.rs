//! Pseudo-random number generation with independent per-pixel streams.

// lumen
use crate::core::geometry::Vector2f;
use crate::core::lumen::Float;

pub const FLOAT_ONE_MINUS_EPSILON: Float = 0.999_999_94;
pub const PCG32_DEFAULT_STATE: u64 = 0x853c_49e6_748f_ea9b;
pub const PCG32_DEFAULT_STREAM: u64 = 0xda3e_39cb_94b9_5bdb;
pub const PCG32_MULT: u64 = 0x5851_f42d_4c95_7f2d;

/// PCG32 random number generator. Each pixel owns one state; streams with
/// distinct sequence numbers never correlate.
#[derive(Debug, Copy, Clone)]
pub struct RngState {
    state: u64,
    inc: u64,
}

impl Default for RngState {
    fn default() -> Self {
        RngState {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
}

fn advance(rng: &mut RngState) -> u32 {
    let oldstate: u64 = rng.state;
    rng.state = oldstate.wrapping_mul(PCG32_MULT).wrapping_add(rng.inc | 1);
    let xorshifted: u32 = (((oldstate >> 18) ^ oldstate) >> 27) as u32;
    let rot: u32 = (oldstate >> 59) as u32;
    (xorshifted >> rot) | (xorshifted << (rot.wrapping_neg() & 31))
}

/// Create a generator seeded on the given state and sequence number.
pub fn make_rng(seed: u64, seq: u64) -> RngState {
    let mut rng = RngState { state: 0, inc: 0 };
    rng.inc = (seq << 1) | 1;
    advance(&mut rng);
    rng.state = rng.state.wrapping_add(seed);
    advance(&mut rng);
    rng
}

/// Next uniform float in [0, 1).
pub fn rand1f(rng: &mut RngState) -> Float {
    (advance(rng) as Float * 2.328_306_4e-10_f32).min(FLOAT_ONE_MINUS_EPSILON)
}

/// Next pair of uniform floats in [0, 1)^2.
pub fn rand2f(rng: &mut RngState) -> Vector2f {
    // sequenced to keep evaluation order deterministic
    let x: Float = rand1f(rng);
    let y: Float = rand1f(rng);
    Vector2f { x, y }
}

/// Next uniform integer in [0, n).
pub fn rand1i(rng: &mut RngState, n: u32) -> u32 {
    // rejection sampling avoids the modulo bias
    let threshold: u32 = n.wrapping_neg() % n;
    loop {
        let r: u32 = advance(rng);
        if r >= threshold {
            return r % n;
        }
    }
}
