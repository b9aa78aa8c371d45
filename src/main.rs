mod encoder;

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use encoder::attack::{self, AttackParams};
use encoder::{Config, Encoder};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Attack {
    Preimage,
    SecondPreimage,
    Collision,
}

/// Generates SAT (DIMACS CNF) or pseudo-Boolean (OPB) instances encoding
/// preimage, second-preimage and collision attacks on reduced-round SHA-1.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Random number seed (default: wall-clock seconds)
    #[arg(long)]
    seed: Option<u64>,

    /// Attack type (default: preimage)
    #[arg(long, value_enum, action = clap::ArgAction::Append)]
    attack: Vec<Attack>,

    /// Number of rounds
    #[arg(long, default_value_t = 80, value_parser = clap::value_parser!(u32).range(16..=80))]
    rounds: u32,

    /// Number of fixed message bits
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=512))]
    message_bits: u32,

    /// Number of fixed hash bits
    #[arg(long, default_value_t = 160, value_parser = clap::value_parser!(u32).range(0..=160))]
    hash_bits: u32,

    /// Generate CNF
    #[arg(long)]
    cnf: bool,

    /// Generate OPB
    #[arg(long)]
    opb: bool,

    /// Use the Tseitin encoding of the circuit representation of adders
    #[arg(long)]
    tseitin_adders: bool,

    /// Use XOR clauses (requires --cnf)
    #[arg(long)]
    xor: bool,

    /// Use half-adder clauses (requires --cnf)
    #[arg(long)]
    halfadder: bool,

    /// Restrict branching variables to message bits (requires --cnf)
    #[arg(long)]
    restrict_branching: bool,

    /// Use compact adders (requires --opb)
    #[arg(long)]
    compact_adders: bool,
}

fn attack_from(args: &Args) -> Result<Attack> {
    match args.attack.as_slice() {
        [] => Ok(Attack::Preimage),
        [attack] => Ok(*attack),
        _ => bail!("can only specify --attack once"),
    }
}

fn config_from(args: &Args) -> Result<Config> {
    if !args.cnf && !args.opb {
        bail!("must specify either --cnf or --opb");
    }
    if args.xor && !args.cnf {
        bail!("cannot specify --xor without --cnf");
    }
    if args.halfadder && !args.cnf {
        bail!("cannot specify --halfadder without --cnf");
    }
    if args.restrict_branching && !args.cnf {
        bail!("cannot specify --restrict-branching without --cnf");
    }
    if args.compact_adders && !args.opb {
        bail!("cannot specify --compact-adders without --opb");
    }
    if args.tseitin_adders && args.compact_adders {
        bail!("cannot specify both --tseitin-adders and --compact-adders");
    }

    Ok(Config {
        cnf: args.cnf,
        opb: args.opb,
        use_xor_clauses: args.xor,
        use_halfadder_clauses: args.halfadder,
        use_tseitin_adders: args.tseitin_adders,
        use_compact_adders: args.compact_adders,
        restrict_branching: args.restrict_branching,
    })
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let args = Args::parse();
    let attack = attack_from(&args)?;
    let config = config_from(&args)?;

    let seed = match args.seed {
        Some(seed) => seed,
        None => SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs(),
    };

    let mut enc = Encoder::new(config);

    enc.comment("");
    enc.comment("Instance generated by sha1-sat");
    enc.comment("");
    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    enc.comment(&format!("command line: {}", command_line));
    enc.comment(&format!("parameter seed = {}", seed));

    let params = AttackParams {
        nr_rounds: args.rounds as usize,
        nr_message_bits: args.message_bits as usize,
        nr_hash_bits: args.hash_bits as usize,
        seed,
    };

    debug!(?attack, rounds = params.nr_rounds, "building instance");
    match attack {
        Attack::Preimage => attack::preimage(&mut enc, &params)?,
        Attack::SecondPreimage => attack::second_preimage(&mut enc, &params)?,
        Attack::Collision => attack::collision(&mut enc, &params)?,
    }

    info!(
        variables = enc.nr_variables(),
        clauses = enc.nr_clauses(),
        xor_clauses = enc.nr_xor_clauses(),
        constraints = enc.nr_constraints(),
        "instance built"
    );

    // When both formats are requested, exactly one instance is printed;
    // CNF takes precedence.
    if enc.config.cnf {
        print!("{}", enc.cnf_instance());
    } else {
        print!("{}", enc.opb_instance());
    }

    Ok(())
}
