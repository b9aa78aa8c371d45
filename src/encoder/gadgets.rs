//! Bit-sliced boolean gadgets. Each gadget appends clauses (or XOR clauses)
//! relating equal-width bit-vectors of literals; `rotl` is the one exception
//! and emits nothing, being a pure renaming of wires.

use super::{Encoder, Lit};

/// Rotate-left by `n` as wire renaming: `r[i] = x[(i + 32 - n) mod 32]`.
pub fn rotl(x: &[Lit], n: usize) -> Vec<Lit> {
    debug_assert_eq!(x.len(), 32);
    (0..32).map(|i| x[(i + 32 - n % 32) % 32]).collect()
}

impl Encoder {
    /// Per-bit biconditional `a[i] <-> b[i]`.
    pub fn eq(&mut self, a: &[Lit], b: &[Lit]) {
        debug_assert_eq!(a.len(), b.len());
        if self.config.use_xor_clauses {
            for i in 0..a.len() {
                self.xor_clause(&[-a[i], b[i]]);
            }
        } else {
            for i in 0..a.len() {
                self.clause(&[-a[i], b[i]]);
                self.clause(&[a[i], -b[i]]);
            }
        }
    }

    /// Per-bit disequality `a[i] xor b[i] = 1`.
    pub fn neq(&mut self, a: &[Lit], b: &[Lit]) {
        debug_assert_eq!(a.len(), b.len());
        if self.config.use_xor_clauses {
            for i in 0..a.len() {
                self.xor_clause(&[a[i], b[i]]);
            }
        } else {
            for i in 0..a.len() {
                self.clause(&[a[i], b[i]]);
                self.clause(&[-a[i], -b[i]]);
            }
        }
    }

    pub fn and2(&mut self, r: &[Lit], a: &[Lit], b: &[Lit]) {
        debug_assert!(r.len() == a.len() && r.len() == b.len());
        for i in 0..r.len() {
            self.clause(&[r[i], -a[i], -b[i]]);
            self.clause(&[-r[i], a[i]]);
            self.clause(&[-r[i], b[i]]);
        }
    }

    pub fn or2(&mut self, r: &[Lit], a: &[Lit], b: &[Lit]) {
        debug_assert!(r.len() == a.len() && r.len() == b.len());
        for i in 0..r.len() {
            self.clause(&[-r[i], a[i], b[i]]);
            self.clause(&[r[i], -a[i]]);
            self.clause(&[r[i], -b[i]]);
        }
    }

    pub fn xor2(&mut self, r: &[Lit], a: &[Lit], b: &[Lit]) {
        debug_assert!(r.len() == a.len() && r.len() == b.len());
        self.comment("xor2");
        if self.config.use_xor_clauses {
            for i in 0..r.len() {
                self.xor_clause(&[-r[i], a[i], b[i]]);
            }
        } else {
            for i in 0..r.len() {
                self.xor_table(&[r[i], a[i], b[i]]);
            }
        }
    }

    pub fn xor3(&mut self, r: &[Lit], a: &[Lit], b: &[Lit], c: &[Lit]) {
        debug_assert!(r.len() == a.len() && r.len() == b.len() && r.len() == c.len());
        self.comment("xor3");
        if self.config.use_xor_clauses {
            for i in 0..r.len() {
                self.xor_clause(&[-r[i], a[i], b[i], c[i]]);
            }
        } else {
            for i in 0..r.len() {
                self.xor_table(&[r[i], a[i], b[i], c[i]]);
            }
        }
    }

    pub fn xor4(&mut self, r: &[Lit], a: &[Lit], b: &[Lit], c: &[Lit], d: &[Lit]) {
        debug_assert!(r.len() == a.len() && r.len() == b.len());
        debug_assert!(r.len() == c.len() && r.len() == d.len());
        self.comment("xor4");
        if self.config.use_xor_clauses {
            for i in 0..r.len() {
                self.xor_clause(&[-r[i], a[i], b[i], c[i], d[i]]);
            }
        } else {
            for i in 0..r.len() {
                self.xor_table(&[r[i], a[i], b[i], c[i], d[i]]);
            }
        }
    }

    /// Plain-CNF encoding of `wires[0] = xor(wires[1..])`: one blocking
    /// clause per violating assignment, a literal negated iff the forbidden
    /// pattern has a 1 in its position.
    fn xor_table(&mut self, wires: &[Lit]) {
        let k = wires.len();
        for pattern in 0u32..(1 << k) {
            if pattern.count_ones() % 2 == 0 {
                continue;
            }
            let clause: Vec<Lit> = wires
                .iter()
                .enumerate()
                .map(|(i, &w)| if pattern >> i & 1 != 0 { -w } else { w })
                .collect();
            self.clause(&clause);
        }
    }

    /// Round function for rounds 0..20: `f = (b and c) or (not b and d)`,
    /// the canonical 3-input multiplexer on `b`.
    pub fn f_ch(&mut self, f: &[Lit], b: &[Lit], c: &[Lit], d: &[Lit]) {
        debug_assert!(f.len() == b.len() && f.len() == c.len() && f.len() == d.len());
        for j in 0..f.len() {
            self.clause(&[-f[j], -b[j], c[j]]);
            self.clause(&[-f[j], b[j], d[j]]);
            self.clause(&[-f[j], c[j], d[j]]);

            self.clause(&[f[j], -b[j], -c[j]]);
            self.clause(&[f[j], b[j], -d[j]]);
            self.clause(&[f[j], -c[j], -d[j]]);
        }
    }

    /// Round function for rounds 40..60: `f = maj(b, c, d)`. The six clauses
    /// are the complete set of prime implicants of the biconditional, three
    /// per polarity.
    pub fn f_maj(&mut self, f: &[Lit], b: &[Lit], c: &[Lit], d: &[Lit]) {
        debug_assert!(f.len() == b.len() && f.len() == c.len() && f.len() == d.len());
        for j in 0..f.len() {
            self.clause(&[-f[j], b[j], c[j]]);
            self.clause(&[-f[j], b[j], d[j]]);
            self.clause(&[-f[j], c[j], d[j]]);

            self.clause(&[f[j], -b[j], -c[j]]);
            self.clause(&[f[j], -b[j], -d[j]]);
            self.clause(&[f[j], -c[j], -d[j]]);
        }
    }
}
