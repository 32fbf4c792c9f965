use clap::{value_parser, Arg, ArgAction, Command};

/// Parse a decimal or `0x`-prefixed hexadecimal integer
fn parse_number(input: &str) -> Result<u32, String> {
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("'{}' is not a valid number", input))
}

fn io_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("input")
                .help("Input file (stdin if omitted)")
                .required(false)
                .index(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output file (stdout if omitted)")
                .value_name("FILE"),
        )
}

pub fn build_cli() -> Command {
    Command::new("rsdev")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reed-Solomon encode/decode session over paired endpoints")
        .arg_required_else_help(true)
        .arg(
            Arg::new("symsize")
                .long("symsize")
                .help("Bits per symbol")
                .value_name("BITS")
                .global(true)
                .value_parser(parse_number),
        )
        .arg(
            Arg::new("gfpoly")
                .long("gfpoly")
                .help("Field generator polynomial (decimal or 0x hex)")
                .value_name("POLY")
                .global(true)
                .value_parser(parse_number),
        )
        .arg(
            Arg::new("fcr")
                .long("fcr")
                .help("First consecutive root, in index form")
                .value_name("N")
                .global(true)
                .value_parser(parse_number),
        )
        .arg(
            Arg::new("prim")
                .long("prim")
                .help("Primitive element, in index form")
                .value_name("N")
                .global(true)
                .value_parser(parse_number),
        )
        .arg(
            Arg::new("nroots")
                .long("nroots")
                .help("Number of parity symbols")
                .value_name("N")
                .global(true)
                .value_parser(parse_number),
        )
        .arg(
            Arg::new("wide-parity")
                .long("wide-parity")
                .help("Store each parity symbol as a native 16-bit unit")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(io_args(
            Command::new("encode")
                .visible_alias("e")
                .about("Encode one data block and emit data followed by parity"),
        ))
        .subcommand(io_args(
            Command::new("decode")
                .visible_alias("d")
                .about("Correct one data + parity block and emit the data"),
        ))
        .subcommand(
            Command::new("roundtrip")
                .visible_alias("r")
                .about("Encode, corrupt, decode and compare")
                .arg(
                    Arg::new("text")
                        .help("Text to protect (a trailing NUL is appended)")
                        .index(1)
                        .default_value("TEsting data for rs enodding"),
                )
                .arg(
                    Arg::new("errors")
                        .short('e')
                        .long("errors")
                        .help("Number of symbols to corrupt before decoding")
                        .value_name("N")
                        .default_value("0")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("seed")
                        .short('s')
                        .long("seed")
                        .help("Seed for choosing corrupted positions")
                        .value_name("SEED")
                        .default_value("0")
                        .value_parser(value_parser!(u64)),
                ),
        )
}

pub fn parse_args() -> clap::ArgMatches {
    build_cli().get_matches()
}
