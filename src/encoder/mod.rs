use std::collections::HashMap;
use std::fmt::Write;

pub mod adders;
pub mod attack;
pub mod espresso;
pub mod gadgets;
pub mod sha1;

/// Boolean literal in DIMACS convention: positive for the variable, negative
/// for its complement. Variable ids start at 1; 0 terminates a clause line.
pub type Lit = i32;

/// Format and encoding options for one generation run.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub cnf: bool,
    pub opb: bool,
    pub use_xor_clauses: bool,
    pub use_halfadder_clauses: bool,
    pub use_tseitin_adders: bool,
    pub use_compact_adders: bool,
    pub restrict_branching: bool,
}

/// Variable allocator and clause/constraint sink.
///
/// Both the CNF and the OPB text buffers are maintained during construction
/// regardless of which format is printed in the end: plain clauses mirror
/// into `>= 1` pseudo-Boolean rows, constants into unit rows of both kinds.
pub struct Encoder {
    pub config: Config,
    nr_variables: Lit,
    nr_clauses: u32,
    nr_xor_clauses: u32,
    nr_constraints: u32,
    cnf: String,
    opb: String,
    halfadder_cache: HashMap<(usize, usize), Vec<Vec<Lit>>>,
}

impl Encoder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            nr_variables: 0,
            nr_clauses: 0,
            nr_xor_clauses: 0,
            nr_constraints: 0,
            cnf: String::new(),
            opb: String::new(),
            halfadder_cache: HashMap::new(),
        }
    }

    pub fn nr_variables(&self) -> Lit {
        self.nr_variables
    }

    pub fn nr_clauses(&self) -> u32 {
        self.nr_clauses
    }

    pub fn nr_xor_clauses(&self) -> u32 {
        self.nr_xor_clauses
    }

    pub fn nr_constraints(&self) -> u32 {
        self.nr_constraints
    }

    pub fn comment(&mut self, text: &str) {
        let _ = writeln!(self.cnf, "c {}", text);
        let _ = writeln!(self.opb, "* {}", text);
    }

    /// Allocates `n` fresh consecutive variables under a human-readable label.
    /// With branching restriction enabled, each variable additionally gets a
    /// `d v 0` (decision) or `d -v 0` (non-decision) annotation in the CNF.
    pub fn new_vars(&mut self, label: &str, n: usize, decision: bool) -> Vec<Lit> {
        debug_assert!(n > 0);
        let mut vars = Vec::with_capacity(n);
        for _ in 0..n {
            self.nr_variables += 1;
            vars.push(self.nr_variables);
        }

        self.comment(&format!("var {}/{} {}", vars[0], n, label));

        if self.config.restrict_branching {
            for &v in &vars {
                if decision {
                    let _ = writeln!(self.cnf, "d {} 0", v);
                } else {
                    let _ = writeln!(self.cnf, "d -{} 0", v);
                }
            }
        }

        vars
    }

    /// Allocates a 32-bit word of non-decision variables.
    pub fn new_word(&mut self, label: &str) -> Vec<Lit> {
        self.new_vars(label, 32, false)
    }

    pub fn clause(&mut self, lits: &[Lit]) {
        debug_assert!(!lits.is_empty());
        for &l in lits {
            debug_assert!(l != 0 && l.abs() <= self.nr_variables);
            let _ = write!(self.cnf, "{} ", l);
            let _ = write!(self.opb, "1 {}x{} ", if l < 0 { "~" } else { "" }, l.abs());
        }
        self.cnf.push_str("0\n");
        self.opb.push_str(">= 1;\n");

        self.nr_clauses += 1;
        self.nr_constraints += 1;
    }

    /// Appends an XOR clause (the `x ...` solver extension); CNF only.
    pub fn xor_clause(&mut self, lits: &[Lit]) {
        debug_assert!(!lits.is_empty());
        self.cnf.push_str("x ");
        for &l in lits {
            debug_assert!(l != 0 && l.abs() <= self.nr_variables);
            let _ = write!(self.cnf, "{} ", l);
        }
        self.cnf.push_str("0\n");

        self.nr_xor_clauses += 1;
    }

    /// Fixes a single literal to a constant value.
    pub fn constant(&mut self, r: Lit, value: bool) {
        let _ = writeln!(self.cnf, "{}{} 0", if value { "" } else { "-" }, r);
        let _ = writeln!(self.opb, "1 x{} = {};", r, if value { 1 } else { 0 });

        self.nr_clauses += 1;
        self.nr_constraints += 1;
    }

    /// Fixes a 32-bit word to a constant, LSB first.
    pub fn constant32(&mut self, r: &[Lit], value: u32) {
        debug_assert_eq!(r.len(), 32);
        self.comment(&format!("constant32 ({:08x})", value));

        for (i, &l) in r.iter().enumerate() {
            self.constant(l, (value >> i) & 1 != 0);
        }
    }

    /// Allocates a fresh word and immediately fixes it.
    pub fn new_constant32(&mut self, label: &str, value: u32) -> Vec<Lit> {
        let r = self.new_word(label);
        self.constant32(&r, value);
        r
    }

    /// The complete CNF instance: `p cnf` header followed by the body.
    pub fn cnf_instance(&self) -> String {
        format!(
            "p cnf {} {}\n{}",
            self.nr_variables, self.nr_clauses, self.cnf
        )
    }

    /// The complete OPB instance: `* #variable=` header followed by the body.
    pub fn opb_instance(&self) -> String {
        format!(
            "* #variable= {} #constraint= {}\n{}",
            self.nr_variables, self.nr_constraints, self.opb
        )
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_are_fresh_and_consecutive() {
        let mut enc = Encoder::new(Config::default());
        let a = enc.new_vars("a", 3, false);
        let b = enc.new_vars("b", 2, false);
        assert_eq!(a, vec![1, 2, 3]);
        assert_eq!(b, vec![4, 5]);
        assert_eq!(enc.nr_variables(), 5);
    }

    #[test]
    fn clause_lines_match_declared_count() {
        let mut enc = Encoder::new(Config::default());
        let v = enc.new_vars("v", 3, false);
        enc.clause(&[v[0], -v[1]]);
        enc.clause(&[-v[0], v[1], v[2]]);
        enc.constant(v[2], true);

        let body_clauses = test_util::parse_clauses(&enc.cnf);
        assert_eq!(body_clauses.len() as u32, enc.nr_clauses());
        assert_eq!(body_clauses[0], vec![1, -2]);
        assert_eq!(body_clauses[2], vec![3]);

        let opb_rows = enc
            .opb
            .lines()
            .filter(|l| !l.starts_with('*') && l.ends_with(';'))
            .count();
        assert_eq!(opb_rows as u32, enc.nr_constraints());
    }

    #[test]
    fn clause_mirrors_into_opb() {
        let mut enc = Encoder::new(Config::default());
        let v = enc.new_vars("v", 2, false);
        enc.clause(&[v[0], -v[1]]);
        assert!(enc.opb.contains("1 x1 1 ~x2 >= 1;"));
    }

    #[test]
    fn xor_clause_is_cnf_only() {
        let mut enc = Encoder::new(Config::default());
        let v = enc.new_vars("v", 2, false);
        let constraints_before = enc.nr_constraints();
        enc.xor_clause(&[-v[0], v[1]]);
        assert_eq!(enc.nr_xor_clauses(), 1);
        assert_eq!(enc.nr_clauses(), 0);
        assert_eq!(enc.nr_constraints(), constraints_before);
        assert!(enc.cnf.contains("x -1 2 0\n"));
    }

    #[test]
    fn constant32_fixes_all_bits_lsb_first() {
        let mut enc = Encoder::new(Config::default());
        let w = enc.new_word("w");
        enc.constant32(&w, 0x8000_0001);
        let clauses = test_util::parse_clauses(&enc.cnf);
        assert_eq!(clauses.len(), 32);
        assert_eq!(clauses[0], vec![1]);
        assert_eq!(clauses[1], vec![-2]);
        assert_eq!(clauses[31], vec![32]);
    }

    #[test]
    fn decision_annotations_follow_hint() {
        let mut enc = Encoder::new(Config {
            restrict_branching: true,
            ..Config::default()
        });
        enc.new_vars("m", 2, true);
        enc.new_vars("t", 1, false);
        assert!(enc.cnf.contains("d 1 0\n"));
        assert!(enc.cnf.contains("d 2 0\n"));
        assert!(enc.cnf.contains("d -3 0\n"));
    }

    #[test]
    fn headers_carry_counts() {
        let mut enc = Encoder::new(Config::default());
        let v = enc.new_vars("v", 2, false);
        enc.clause(&[v[0], v[1]]);
        assert!(enc.cnf_instance().starts_with("p cnf 2 1\n"));
        assert!(enc
            .opb_instance()
            .starts_with("* #variable= 2 #constraint= 1\n"));
    }
}
