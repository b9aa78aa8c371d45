//! Client for the external logic minimiser. The minimiser is fed a truth
//! table for "the m-bit output does NOT equal the popcount of the n inputs"
//! (the on-set of the negation), so every cube it returns is a clause of the
//! minimised CNF for the half-adder relation itself.

use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use super::Lit;

/// Runs `espresso` over the popcount truth table for `n` inputs and `m`
/// output bits, returning the minimised clauses over local variables
/// `1..=n+m` (inputs first, then output bits MSB-first).
pub fn minimize_popcount(n: usize, m: usize) -> Result<Vec<Vec<Lit>>> {
    debug!(n, m, "invoking espresso");

    let mut child = Command::new("espresso")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .context("failed to spawn espresso")?;

    {
        let stdin = child
            .stdin
            .take()
            .context("espresso stdin was not captured")?;
        let mut stdin = std::io::BufWriter::new(stdin);
        write_truth_table(&mut stdin, n, m).context("failed to write espresso input")?;
        stdin.flush().context("failed to flush espresso input")?;
        // Dropping the handle closes the pipe so the minimiser terminates.
    }

    let stdout = child
        .stdout
        .take()
        .context("espresso stdout was not captured")?;
    let clauses = parse_cubes(BufReader::new(stdout), n + m)?;

    let status = child.wait().context("failed to wait for espresso")?;
    if !status.success() {
        warn!(%status, "espresso exited with an error");
    }

    Ok(clauses)
}

/// Writes the espresso input: `.i`/`.o` headers, one row per
/// `(inputs, output)` pair with every bit complemented and the row output
/// set iff `popcount(inputs) != output`, then `.e`.
pub(crate) fn write_truth_table(out: &mut impl Write, n: usize, m: usize) -> std::io::Result<()> {
    writeln!(out, ".i {}", n + m)?;
    writeln!(out, ".o 1")?;

    for i in 0..1u32 << n {
        for j in 0..1u32 << m {
            for k in (0..n).rev() {
                write!(out, "{}", 1 - (i >> k & 1))?;
            }
            for k in (0..m).rev() {
                write!(out, "{}", 1 - (j >> k & 1))?;
            }
            writeln!(out, " {}", u32::from(i.count_ones() != j))?;
        }
    }

    writeln!(out, ".e")
}

/// Parses the minimiser output into clauses over local variables. Position
/// `p` of a cube becomes variable `p + 1`: `'0'` a negative literal, `'1'`
/// positive, `'-'` absent. Reading stops at `.e` or EOF.
pub(crate) fn parse_cubes(reader: impl BufRead, width: usize) -> Result<Vec<Vec<Lit>>> {
    let mut clauses = Vec::new();

    for line in reader.lines() {
        let line = line.context("failed to read espresso output")?;
        if line.starts_with(".i") || line.starts_with(".o") || line.starts_with(".p") {
            continue;
        }
        if line.starts_with(".e") {
            break;
        }

        let cube: Vec<char> = line.chars().take(width).collect();
        if cube.len() < width {
            bail!("truncated espresso cube: {:?}", line);
        }

        let mut clause = Vec::new();
        for (p, c) in cube.into_iter().enumerate() {
            match c {
                '0' => clause.push(-(p as Lit + 1)),
                '1' => clause.push(p as Lit + 1),
                '-' => {}
                _ => bail!("malformed espresso cube: {:?}", line),
            }
        }
        clauses.push(clause);
    }

    Ok(clauses)
}

/// Maps a clause over the oracle's local variables onto actual literals:
/// local `v` in `[1..n]` is `lhs[v-1]`; local `v` in `[n+1..n+m]` is
/// `rhs[m-1-(v-n-1)]`, because the oracle numbers the output columns
/// MSB-first while `rhs` is LSB-first.
pub(crate) fn substitute(cube: &[Lit], lhs: &[Lit], rhs: &[Lit]) -> Vec<Lit> {
    let n = lhs.len();
    let m = rhs.len();
    cube.iter()
        .map(|&l| {
            let j = (l.abs() - 1) as usize;
            let var = if j < n { lhs[j] } else { rhs[m - 1 - (j - n)] };
            if l < 0 {
                -var
            } else {
                var
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truth_table_rows_complement_bits() {
        let mut buf = Vec::new();
        write_truth_table(&mut buf, 2, 2).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], ".i 4");
        assert_eq!(lines[1], ".o 1");
        assert_eq!(*lines.last().unwrap(), ".e");
        assert_eq!(lines.len(), 2 + 16 + 1);

        // popcount(0) == 0, complemented to all ones.
        assert_eq!(lines[2], "1111 0");
        // i=1 ("10" complemented to "01"... displayed MSB-first as "10"),
        // j=1: popcount matches, output 0.
        assert!(text.contains("1010 0"));
        assert!(text.contains("0110 0"));
        // i=3 (popcount 2), j=2: satisfied row.
        assert!(text.contains("0001 0"));
        // A violated row.
        assert!(text.contains("1110 1"));
    }

    #[test]
    fn truth_table_output_marks_mismatches() {
        let mut buf = Vec::new();
        write_truth_table(&mut buf, 3, 2).unwrap();
        let text = String::from_utf8(buf).unwrap();
        for line in text.lines() {
            let Some((bits, out)) = line.split_once(' ') else {
                continue;
            };
            let inputs = u32::from_str_radix(&bits[..3], 2).unwrap();
            let output = u32::from_str_radix(&bits[3..], 2).unwrap();
            // Bits are complemented on the wire.
            let popcount = (!inputs & 0b111).count_ones();
            let value = !output & 0b11;
            assert_eq!(out == "1", popcount != value, "row {:?}", line);
        }
    }

    #[test]
    fn cubes_parse_to_local_clauses() {
        let input = b".i 4\n.o 1\n.p 2\n01-1 1\n--00 1\n.e\n" as &[u8];
        let clauses = parse_cubes(input, 4).unwrap();
        assert_eq!(clauses, vec![vec![-1, 2, 4], vec![-3, -4]]);
    }

    #[test]
    fn parse_stops_at_terminator() {
        let input = b"11-- 1\n.e\ngarbage\n" as &[u8];
        let clauses = parse_cubes(input, 4).unwrap();
        assert_eq!(clauses, vec![vec![1, 2]]);
    }

    #[test]
    fn malformed_cube_is_fatal() {
        assert!(parse_cubes(b"0z-- 1\n" as &[u8], 4).is_err());
        assert!(parse_cubes(b"01 1\n" as &[u8], 4).is_err());
    }

    #[test]
    fn substitution_reverses_output_columns() {
        // n = 2 inputs, m = 2 output bits: local 3 is the MSB of the
        // output, which is rhs[1]; local 4 is the LSB, rhs[0].
        let lhs = [10, 11];
        let rhs = [20, 21];
        assert_eq!(substitute(&[1, -3, 4], &lhs, &rhs), vec![10, -21, 20]);
        assert_eq!(substitute(&[-2], &lhs, &rhs), vec![-11]);
    }
}
