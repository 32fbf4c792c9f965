//! rsdev - drive one Reed-Solomon session from the command line
//!
//! Each invocation opens a service, configures it from the flags, runs the
//! write/read protocol on its endpoints, and closes it again.

use std::fs;
use std::io::{self, Read, Write};

use anyhow::{bail, Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rsdev::args::parse_args;
use rsdev::service::{parameters_from_args, ParityLayout, RsService, ServiceConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let matches = parse_args();
    let config = ServiceConfig::from_args(&matches);
    let params = parameters_from_args(&matches);

    let service = RsService::open(config);
    service
        .set_parameters(params)
        .with_context(|| format!("Failed to configure codec with {}", params))?;

    let result = match matches.subcommand() {
        Some(("encode", sub)) => encode(&service, sub),
        Some(("decode", sub)) => decode(&service, sub),
        Some(("roundtrip", sub)) => roundtrip(&service, sub),
        _ => bail!("No command given"),
    };

    service.close();
    result
}

fn read_input(matches: &clap::ArgMatches) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    match matches.get_one::<String>("input") {
        Some(path) => {
            data = fs::read(path).with_context(|| format!("Failed to read {}", path))?;
        }
        None => {
            io::stdin()
                .read_to_end(&mut data)
                .context("Failed to read stdin")?;
        }
    }
    Ok(data)
}

fn write_output(matches: &clap::ArgMatches, bytes: &[u8]) -> Result<()> {
    match matches.get_one::<String>("output") {
        Some(path) => fs::write(path, bytes).with_context(|| format!("Failed to write {}", path)),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes).context("Failed to write stdout")?;
            stdout.flush().context("Failed to flush stdout")
        }
    }
}

fn encode(service: &RsService, matches: &clap::ArgMatches) -> Result<()> {
    let data = read_input(matches)?;
    let mut encoder = service.open_encoder();

    let written = encoder.write_bytes(&data).context("Encode failed")?;
    let block = encoder.read_to_end().context("Reading encoded block failed")?;
    info!("Encoded {} bytes into a {} byte block", written, block.len());

    write_output(matches, &block)
}

fn decode(service: &RsService, matches: &clap::ArgMatches) -> Result<()> {
    let block = read_input(matches)?;
    let layout = service.config().parity_layout;
    let nroots = service.parameters().map_or(0, |p| p.nroots as usize);
    let parity_len = layout.parity_len(nroots);

    let Some(data_len) = block.len().checked_sub(parity_len) else {
        bail!(
            "Block of {} bytes is shorter than the {} byte parity region",
            block.len(),
            parity_len
        );
    };

    // The decode endpoint sizes itself from the last encode
    service
        .open_encoder()
        .write_bytes(&vec![0u8; data_len])
        .context("Failed to size the session for decoding")?;

    let mut decoder = service.open_decoder();
    decoder.write_bytes(&block).context("Decode failed")?;
    let data = decoder.read_to_end().context("Reading decoded data failed")?;
    info!(
        "Decoded {} bytes with {} corrections",
        data.len(),
        decoder.last_corrections().unwrap_or(0)
    );

    write_output(matches, &data)
}

/// Flip one symbol of an encoded block by `mask`
fn corrupt_symbol(block: &mut [u8], data_len: usize, layout: ParityLayout, symbol: usize, mask: u8) {
    if symbol < data_len {
        block[symbol] ^= mask;
        return;
    }
    let width = layout.bytes_per_symbol();
    let start = data_len + (symbol - data_len) * width;
    match layout {
        ParityLayout::Packed => block[start] ^= mask,
        ParityLayout::Wide => {
            let unit = &mut block[start..start + width];
            let value = u16::from_ne_bytes([unit[0], unit[1]]) ^ mask as u16;
            unit.copy_from_slice(&value.to_ne_bytes());
        }
    }
}

fn roundtrip(service: &RsService, matches: &clap::ArgMatches) -> Result<()> {
    let text = matches
        .get_one::<String>("text")
        .map(String::as_str)
        .unwrap_or_default();
    let errors = matches.get_one::<usize>("errors").copied().unwrap_or(0);
    let seed = matches.get_one::<u64>("seed").copied().unwrap_or(0);

    let mut original = text.as_bytes().to_vec();
    original.push(0);

    let mut encoder = service.open_encoder();
    let mut decoder = service.open_decoder();

    let written = encoder.write_bytes(&original).context("Encode failed")?;
    println!("Successfully wrote {} bytes.", written);

    let mut block = encoder.read_to_end().context("Reading encoded block failed")?;
    println!("Successfully read {} bytes of encoded data.", block.len());

    let nroots = service.parameters().map_or(0, |p| p.nroots as usize);
    let symbols = original.len() + nroots;
    if errors > symbols {
        bail!("Cannot corrupt {} of {} symbols", errors, symbols);
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let layout = service.config().parity_layout;
    for symbol in rand::seq::index::sample(&mut rng, symbols, errors).into_iter() {
        let mask = rng.random_range(1..=u8::MAX);
        corrupt_symbol(&mut block, original.len(), layout, symbol, mask);
    }
    if errors > 0 {
        println!("Corrupted {} symbols (seed {}).", errors, seed);
    }

    let accepted = decoder.write_bytes(&block).context("Decode failed")?;
    println!("Successfully wrote {} bytes to the decoder.", accepted);

    let decoded = decoder.read_to_end().context("Reading decoded data failed")?;
    println!(
        "Successfully read {} bytes of decoded data ({} corrections).",
        decoded.len(),
        decoder.last_corrections().unwrap_or(0)
    );

    if decoded != original {
        bail!("Original data and decoded data do not match");
    }
    println!("Original data and decoded data match.");
    Ok(())
}
