//! The SHA-1 compression circuit over literal words, plus the plain 32-bit
//! reference evaluation used to obtain known-good (message, digest) pairs.
//!
//! The working-state history `a` is stored pre-rotated: `a[0..5)` is seeded
//! from the chaining input so that each round reads B unrotated and C, D, E
//! rotated left by 30, and the A-update rotates by 5. After `R` rounds the
//! digest is `h_in + a[R..R+5)` with the same re-rotations undone.

use anyhow::Result;

use super::gadgets::rotl;
use super::{Encoder, Lit};

pub const IV: [u32; 5] = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476, 0xc3d2e1f0];

pub const ROUND_CONSTANTS: [u32; 4] = [0x5a827999, 0x6ed9eba1, 0x8f1bbcdc, 0xca62c1d6];

/// One instantiated SHA-1 pipeline. Collision instances build two with
/// distinct name suffixes, giving them disjoint variables.
pub struct Sha1Circuit {
    /// Message words; `w[0..16)` are the only circuit inputs.
    pub w: Vec<Vec<Lit>>,
    pub h_in: Vec<Vec<Lit>>,
    pub h_out: Vec<Vec<Lit>>,
    /// Pre-rotated working-state history, `nr_rounds + 5` words.
    pub a: Vec<Vec<Lit>>,
}

impl Sha1Circuit {
    /// Builds the circuit for `nr_rounds` rounds. `decision_inputs` marks
    /// the 16 message words as branching variables when branching
    /// restriction is enabled.
    pub fn new(
        enc: &mut Encoder,
        nr_rounds: usize,
        name: &str,
        decision_inputs: bool,
    ) -> Result<Self> {
        debug_assert!((16..=80).contains(&nr_rounds));

        enc.comment("sha1");
        enc.comment(&format!("parameter nr_rounds = {}", nr_rounds));

        let mut w: Vec<Vec<Lit>> = Vec::with_capacity(nr_rounds);
        for i in 0..16 {
            w.push(enc.new_vars(&format!("w{}[{}]", name, i), 32, decision_inputs));
        }

        // Message schedule: the xor lands in a scratch word, the rotation is
        // wiring only.
        for i in 16..nr_rounds {
            let wt = enc.new_vars(&format!("w{}[{}]", name, i), 32, false);
            enc.xor4(&wt, &w[i - 3], &w[i - 8], &w[i - 14], &w[i - 16]);
            w.push(rotl(&wt, 1));
        }

        let mut k = Vec::with_capacity(4);
        for (i, &value) in ROUND_CONSTANTS.iter().enumerate() {
            k.push(enc.new_constant32(&format!("k[{}]", i), value));
        }

        let mut h_in = Vec::with_capacity(5);
        for (i, &value) in IV.iter().enumerate() {
            h_in.push(enc.new_constant32(&format!("h{}_in{}", name, i), value));
        }

        let mut a: Vec<Vec<Lit>> = Vec::with_capacity(nr_rounds + 5);
        a.push(rotl(&h_in[4], 2));
        a.push(rotl(&h_in[3], 2));
        a.push(rotl(&h_in[2], 2));
        a.push(rotl(&h_in[1], 0));
        a.push(rotl(&h_in[0], 0));
        for i in 0..nr_rounds {
            a.push(enc.new_vars(&format!("a{}[{}]", name, i + 5), 32, false));
        }

        for i in 0..nr_rounds {
            let prev_a = rotl(&a[i + 4], 5);
            let b = &a[i + 3];
            let c = rotl(&a[i + 2], 30);
            let d = rotl(&a[i + 1], 30);
            let e = rotl(&a[i], 30);

            let f = enc.new_vars(&format!("f{}[{}]", name, i), 32, false);
            match i / 20 {
                0 => enc.f_ch(&f, b, &c, &d),
                2 => enc.f_maj(&f, b, &c, &d),
                _ => enc.xor3(&f, b, &c, &d),
            }

            enc.add5(
                &format!("a{}[{}]", name, i + 5),
                &a[i + 5],
                &prev_a,
                &f,
                &e,
                &k[i / 20],
                &w[i],
            )?;
        }

        // Rotate C, D, E back before the final additions.
        let c = rotl(&a[nr_rounds + 2], 30);
        let d = rotl(&a[nr_rounds + 1], 30);
        let e = rotl(&a[nr_rounds], 30);

        let mut h_out = Vec::with_capacity(5);
        for i in 0..5 {
            h_out.push(enc.new_vars(&format!("h{}_out{}", name, i), 32, false));
        }
        enc.add2("h_out", &h_out[0], &h_in[0], &a[nr_rounds + 4])?;
        enc.add2("h_out", &h_out[1], &h_in[1], &a[nr_rounds + 3])?;
        enc.add2("h_out", &h_out[2], &h_in[2], &c)?;
        enc.add2("h_out", &h_out[3], &h_in[3], &d)?;
        enc.add2("h_out", &h_out[4], &h_in[4], &e)?;

        Ok(Self { w, h_in, h_out, a })
    }
}

/// Reduced-round SHA-1 over a single message block.
pub fn sha1_forward(nr_rounds: usize, message: &[u32; 16]) -> [u32; 5] {
    debug_assert!((16..=80).contains(&nr_rounds));

    let mut w = [0u32; 80];
    w[..16].copy_from_slice(message);
    for i in 16..nr_rounds {
        w[i] = (w[i - 3] ^ w[i - 8] ^ w[i - 14] ^ w[i - 16]).rotate_left(1);
    }

    let [mut a, mut b, mut c, mut d, mut e] = IV;

    for (i, &wi) in w.iter().enumerate().take(nr_rounds) {
        let f = match i / 20 {
            0 => (b & c) | (!b & d),
            2 => (b & c) | (b & d) | (c & d),
            _ => b ^ c ^ d,
        };

        let t = a
            .rotate_left(5)
            .wrapping_add(f)
            .wrapping_add(e)
            .wrapping_add(ROUND_CONSTANTS[i / 20])
            .wrapping_add(wi);
        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = t;
    }

    [
        IV[0].wrapping_add(a),
        IV[1].wrapping_add(b),
        IV[2].wrapping_add(c),
        IV[3].wrapping_add(d),
        IV[4].wrapping_add(e),
    ]
}
