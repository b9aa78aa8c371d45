//! Attack builders. Each one instantiates the SHA-1 pipeline(s), derives a
//! known-good (message, digest) pair from the reference evaluation and then
//! fixes a randomly chosen subset of message and digest bits.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use super::sha1::{sha1_forward, Sha1Circuit};
use super::Encoder;

#[derive(Clone, Copy, Debug)]
pub struct AttackParams {
    pub nr_rounds: usize,
    pub nr_message_bits: usize,
    pub nr_hash_bits: usize,
    pub seed: u64,
}

/// The message generator is seeded from the user seed; its first output
/// seeds the independent generator used for all bit-index shuffles.
fn rngs(seed: u64) -> (StdRng, StdRng) {
    let mut message_rng = StdRng::seed_from_u64(seed);
    let shuffle_rng = StdRng::seed_from_u64(message_rng.gen());
    (message_rng, shuffle_rng)
}

fn random_message(rng: &mut StdRng) -> [u32; 16] {
    let mut w = [0u32; 16];
    for word in &mut w {
        *word = rng.gen();
    }
    w
}

fn shuffled_indices(count: usize, rng: &mut StdRng) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..count).collect();
    indices.shuffle(rng);
    indices
}

pub fn preimage(enc: &mut Encoder, params: &AttackParams) -> Result<()> {
    let circuit = Sha1Circuit::new(enc, params.nr_rounds, "", true)?;

    let (mut message_rng, mut shuffle_rng) = rngs(params.seed);
    let w = random_message(&mut message_rng);
    let h = sha1_forward(params.nr_rounds, &w);

    enc.comment(&format!("Fix {} message bits", params.nr_message_bits));
    let message_bits = shuffled_indices(512, &mut shuffle_rng);
    for &p in message_bits.iter().take(params.nr_message_bits) {
        enc.constant(circuit.w[p / 32][p % 32], w[p / 32] >> (p % 32) & 1 != 0);
    }

    enc.comment(&format!("Fix {} hash bits", params.nr_hash_bits));
    let hash_bits = shuffled_indices(160, &mut shuffle_rng);
    for &p in hash_bits.iter().take(params.nr_hash_bits) {
        enc.constant(circuit.h_out[p / 32][p % 32], h[p / 32] >> (p % 32) & 1 != 0);
    }

    Ok(())
}

/// Like the preimage attack, except that the first of the fixed message bits
/// is fixed to the flipped value, forcing any solution to differ from the
/// reference message in at least that bit.
pub fn second_preimage(enc: &mut Encoder, params: &AttackParams) -> Result<()> {
    let circuit = Sha1Circuit::new(enc, params.nr_rounds, "", true)?;

    let (mut message_rng, mut shuffle_rng) = rngs(params.seed);
    let w = random_message(&mut message_rng);
    let h = sha1_forward(params.nr_rounds, &w);

    enc.comment(&format!("Fix {} message bits", params.nr_message_bits));
    let message_bits = shuffled_indices(512, &mut shuffle_rng);
    if params.nr_message_bits == 0 {
        debug!("no message bits fixed; the instance degenerates to a preimage");
    }
    for (i, &p) in message_bits.iter().take(params.nr_message_bits).enumerate() {
        let bit = w[p / 32] >> (p % 32) & 1 != 0;
        enc.constant(circuit.w[p / 32][p % 32], if i == 0 { !bit } else { bit });
    }

    enc.comment(&format!("Fix {} hash bits", params.nr_hash_bits));
    let hash_bits = shuffled_indices(160, &mut shuffle_rng);
    for &p in hash_bits.iter().take(params.nr_hash_bits) {
        enc.constant(circuit.h_out[p / 32][p % 32], h[p / 32] >> (p % 32) & 1 != 0);
    }

    Ok(())
}

/// Two pipelines with disjoint variables; the messages are forced to differ
/// in one random bit and the chosen digest bits are forced equal. No message
/// bit is fixed to a concrete value.
pub fn collision(enc: &mut Encoder, params: &AttackParams) -> Result<()> {
    let f = Sha1Circuit::new(enc, params.nr_rounds, "0", true)?;
    let g = Sha1Circuit::new(enc, params.nr_rounds, "1", false)?;

    if params.nr_message_bits > 0 {
        warn!("collision attacks do not use fixed message bits");
    }

    let (_message_rng, mut shuffle_rng) = rngs(params.seed);

    enc.comment(&format!("Fix {} message bits", params.nr_message_bits));
    let message_bits = shuffled_indices(512, &mut shuffle_rng);
    let p = message_bits[0];
    enc.neq(&[f.w[p / 32][p % 32]], &[g.w[p / 32][p % 32]]);

    enc.comment(&format!("Fix {} hash bits", params.nr_hash_bits));
    let hash_bits = shuffled_indices(160, &mut shuffle_rng);
    for &p in hash_bits.iter().take(params.nr_hash_bits) {
        enc.eq(&[f.h_out[p / 32][p % 32]], &[g.h_out[p / 32][p % 32]]);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::{Config, Encoder};
    use super::*;

    fn params(nr_message_bits: usize, nr_hash_bits: usize) -> AttackParams {
        AttackParams {
            nr_rounds: 16,
            nr_message_bits,
            nr_hash_bits,
            seed: 0x5eed,
        }
    }

    fn tseitin_encoder() -> Encoder {
        Encoder::new(Config {
            cnf: true,
            use_tseitin_adders: true,
            ..Config::default()
        })
    }

    #[test]
    fn preimage_is_deterministic_for_a_seed() {
        let build = || {
            let mut enc = tseitin_encoder();
            preimage(&mut enc, &params(64, 160)).unwrap();
            enc.cnf_instance()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn different_seeds_fix_different_bits() {
        let build = |seed| {
            let mut enc = tseitin_encoder();
            let p = AttackParams {
                seed,
                ..params(64, 160)
            };
            preimage(&mut enc, &p).unwrap();
            enc.cnf_instance()
        };
        assert_ne!(build(1), build(2));
    }

    #[test]
    fn preimage_fixes_the_requested_bit_counts() {
        let mut base = tseitin_encoder();
        preimage(&mut base, &params(0, 0)).unwrap();

        let mut full = tseitin_encoder();
        preimage(&mut full, &params(512, 160)).unwrap();

        assert_eq!(full.nr_clauses() - base.nr_clauses(), 512 + 160);
        assert_eq!(full.nr_variables(), base.nr_variables());
    }

    #[test]
    fn second_preimage_flips_exactly_one_unit_clause() {
        let mut first = tseitin_encoder();
        preimage(&mut first, &params(512, 160)).unwrap();

        let mut second = tseitin_encoder();
        second_preimage(&mut second, &params(512, 160)).unwrap();

        let first_cnf = first.cnf_instance();
        let second_cnf = second.cnf_instance();
        let differing: Vec<(&str, &str)> = first_cnf
            .lines()
            .zip(second_cnf.lines())
            .filter(|(a, b)| a != b)
            .map(|(a, b)| (a, b))
            .collect();
        assert_eq!(differing.len(), 1);
        let (a, b) = differing[0];
        assert_eq!(a.trim_start_matches('-'), b.trim_start_matches('-'));
    }

    #[test]
    fn second_preimage_without_message_bits_degenerates() {
        let mut first = tseitin_encoder();
        preimage(&mut first, &params(0, 160)).unwrap();

        let mut second = tseitin_encoder();
        second_preimage(&mut second, &params(0, 160)).unwrap();

        assert_eq!(first.cnf_instance(), second.cnf_instance());
    }

    #[test]
    fn collision_relates_two_pipelines() {
        let mut enc = tseitin_encoder();

        let mut lone = tseitin_encoder();
        let _ = Sha1Circuit::new(&mut lone, 16, "0", true).unwrap();
        let single_pipeline_clauses = lone.nr_clauses();

        collision(&mut enc, &params(0, 160)).unwrap();
        // Two pipelines, one disequality (two clauses), 160 equalities
        // (two clauses each).
        assert_eq!(
            enc.nr_clauses(),
            2 * single_pipeline_clauses + 2 + 2 * 160
        );
    }

    #[test]
    fn collision_fixes_no_concrete_message_bits() {
        let mut enc = tseitin_encoder();
        collision(&mut enc, &params(0, 8)).unwrap();
        // Unit clauses only come from the round constants and chaining
        // values, which appear in both pipelines equally.
        let mut lone = tseitin_encoder();
        let _ = Sha1Circuit::new(&mut lone, 16, "0", true).unwrap();
        let units = |enc: &Encoder| {
            super::super::test_util::parse_clauses(&enc.cnf)
                .into_iter()
                .filter(|c| c.len() == 1)
                .count()
        };
        assert_eq!(units(&enc), 2 * units(&lone));
    }
}
