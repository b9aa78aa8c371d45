//! Modular 32-bit adders in three interchangeable encodings: Tseitin
//! ripple-carry circuits, single compact pseudo-Boolean equalities, and the
//! default half-adder column decomposition whose per-column clause sets come
//! from the logic-minimiser oracle.

use std::fmt::Write;

use anyhow::Result;

use super::{espresso, Encoder, Lit};

impl Encoder {
    /// `r = a + b (mod 2^32)`.
    pub fn add2(&mut self, label: &str, r: &[Lit], a: &[Lit], b: &[Lit]) -> Result<()> {
        self.comment("add2");

        if self.config.use_tseitin_adders {
            self.add2_tseitin(r, a, b);
        } else if self.config.use_compact_adders {
            self.add_compact(r, &[a, b]);
        } else {
            self.add_columns(label, r, &[a, b])?;
        }
        Ok(())
    }

    /// `r = a + b + c + d + e (mod 2^32)`.
    pub fn add5(
        &mut self,
        label: &str,
        r: &[Lit],
        a: &[Lit],
        b: &[Lit],
        c: &[Lit],
        d: &[Lit],
        e: &[Lit],
    ) -> Result<()> {
        self.comment("add5");

        if self.config.use_tseitin_adders {
            let t0 = self.new_word("t0");
            let t1 = self.new_word("t1");
            let t2 = self.new_word("t2");

            self.add2(label, &t0, a, b)?;
            self.add2(label, &t1, c, d)?;
            self.add2(label, &t2, &t0, &t1)?;
            self.add2(label, r, &t2, e)?;
        } else if self.config.use_compact_adders {
            self.add_compact(r, &[a, b, c, d, e]);
        } else {
            self.add_columns(label, r, &[a, b, c, d, e])?;
        }
        Ok(())
    }

    /// Ripple-carry circuit over the gadget library. Bit 0 is the half-adder
    /// base case; bits 1..32 share the scratch vectors
    /// `t0 = a^b`, `t1 = a&b`, `t2 = t0&carry`.
    fn add2_tseitin(&mut self, r: &[Lit], a: &[Lit], b: &[Lit]) {
        let c = self.new_vars("carry", 31, false);
        let t0 = self.new_vars("t0", 31, false);
        let t1 = self.new_vars("t1", 31, false);
        let t2 = self.new_vars("t2", 31, false);

        self.and2(&c[0..1], &a[0..1], &b[0..1]);
        self.xor2(&r[0..1], &a[0..1], &b[0..1]);

        self.xor2(&t0, &a[1..], &b[1..]);
        self.and2(&t1, &a[1..], &b[1..]);
        self.and2(&t2, &t0, &c);
        self.or2(&c[1..], &t1[..30], &t2[..30]);
        self.xor2(&r[1..], &t0, &c);
    }

    /// Single OPB equality `sum(inputs) - sum(2^i r_i) = 0`. The carries out
    /// of bit 31 are deliberately left unconstrained; `r` is only 32 bits
    /// wide, so nothing downstream can observe them.
    fn add_compact(&mut self, r: &[Lit], inputs: &[&[Lit]]) {
        for input in inputs {
            for (i, &x) in input.iter().enumerate() {
                let _ = write!(self.opb, "{} x{} ", 1i64 << i, x);
            }
        }
        for (i, &x) in r.iter().enumerate() {
            let _ = write!(self.opb, "-{} x{} ", 1i64 << i, x);
        }
        self.opb.push_str("= 0;\n");

        self.nr_constraints += 1;
    }

    /// Half-adder decomposition. Column `i` collects the inputs' bit `i`
    /// plus every carry rippled in from lower columns; its popcount equals
    /// the word built from `r[i]` and `m` fresh carries, which feed the next
    /// `m` columns. Columns at 32 and above are never emitted.
    fn add_columns(&mut self, label: &str, r: &[Lit], inputs: &[&[Lit]]) -> Result<()> {
        let mut addends: Vec<Vec<Lit>> = vec![Vec::new(); 32 + 5];

        for i in 0..32 {
            for input in inputs {
                addends[i].push(input[i]);
            }

            let m = addends[i].len().ilog2() as usize;
            let mut rhs = Vec::with_capacity(1 + m);
            rhs.push(r[i]);
            rhs.extend(self.new_vars(&format!("{}_rhs[{}]", label, i), m, false));

            for j in 1..=m {
                addends[i + j].push(rhs[j]);
            }

            let lhs = std::mem::take(&mut addends[i]);
            self.halfadder(&lhs, &rhs)?;
        }
        Ok(())
    }

    /// `popcount(lhs) = value(rhs)`, `rhs` LSB-first. With half-adder
    /// clauses enabled this is a single `h` line; otherwise the minimised
    /// clause set from the oracle is substituted in. The OPB equality is
    /// emitted in both cases.
    pub fn halfadder(&mut self, lhs: &[Lit], rhs: &[Lit]) -> Result<()> {
        if self.config.use_halfadder_clauses {
            self.cnf.push_str("h ");
            for &x in lhs {
                let _ = write!(self.cnf, "{} ", x);
            }
            self.cnf.push_str("0 ");
            for &x in rhs {
                let _ = write!(self.cnf, "{} ", x);
            }
            self.cnf.push_str("0\n");
        } else {
            let key = (lhs.len(), rhs.len());
            let clauses = match self.halfadder_cache.get(&key) {
                Some(clauses) => clauses.clone(),
                None => {
                    let clauses = espresso::minimize_popcount(key.0, key.1)?;
                    self.halfadder_cache.insert(key, clauses.clone());
                    clauses
                }
            };

            for cube in &clauses {
                for &l in &espresso::substitute(cube, lhs, rhs) {
                    let _ = write!(self.cnf, "{} ", l);
                }
                self.cnf.push_str("0\n");

                self.nr_clauses += 1;
            }
        }

        for &x in lhs {
            let _ = write!(self.opb, "1 x{} ", x);
        }
        for (i, &x) in rhs.iter().enumerate() {
            let _ = write!(self.opb, "-{} x{} ", 1u64 << i, x);
        }
        self.opb.push_str("= 0;\n");

        self.nr_constraints += 1;
        Ok(())
    }
}
