//! End-to-end encode/decode sessions
//!
//! Drives a service through its endpoints the way a caller would: configure,
//! write data to the encode endpoint, read the block back, optionally corrupt
//! it, hand it to the decode endpoint and read the corrected data.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rsdev::reed_solomon::{CodecError, RsParameters};
use rsdev::service::{BufferState, ParityLayout, RsService, ServiceConfig, ServiceError};

const SAMPLE: &[u8] = b"TEsting data for rs enodding\0";

fn configured(layout: ParityLayout) -> RsService {
    let service = RsService::open(ServiceConfig::new(layout));
    service
        .set_parameters(RsParameters::new(8, 0x11D, 0, 1, 32))
        .unwrap();
    service
}

/// XOR `mask` into symbol `symbol` of a packed block
fn flip(block: &mut [u8], symbol: usize, mask: u8) {
    block[symbol] ^= mask;
}

// ============================================================================
// Clean Round Trip
// ============================================================================

#[test]
fn test_sample_round_trip_packed() {
    let service = configured(ParityLayout::Packed);
    let mut encoder = service.open_encoder();
    let mut decoder = service.open_decoder();

    assert_eq!(encoder.write_bytes(SAMPLE).unwrap(), 29);

    let block = encoder.read_vec(61).unwrap();
    assert_eq!(block.len(), 61);
    assert_eq!(&block[..29], SAMPLE);

    assert_eq!(decoder.write_bytes(&block).unwrap(), 61);
    assert_eq!(decoder.last_corrections(), Some(0));
    assert_eq!(service.buffer_state(), Some(BufferState::Decoded));

    let decoded = decoder.read_vec(29).unwrap();
    assert_eq!(decoded, SAMPLE);
}

#[test]
fn test_sample_round_trip_wide() {
    let service = configured(ParityLayout::Wide);
    let mut encoder = service.open_encoder();
    let mut decoder = service.open_decoder();

    encoder.write_bytes(SAMPLE).unwrap();
    let block = encoder.read_to_end().unwrap();
    assert_eq!(block.len(), 29 + 2 * 32);
    assert_eq!(service.expected_block_len(), Some(93));

    // Every stored parity unit must fit in one symbol
    for unit in block[29..].chunks_exact(2) {
        assert!(u16::from_ne_bytes([unit[0], unit[1]]) <= 0xFF);
    }

    decoder.write_bytes(&block).unwrap();
    assert_eq!(decoder.read_to_end().unwrap(), SAMPLE);
}

#[test]
fn test_small_reads_reassemble_block() {
    let service = configured(ParityLayout::Packed);
    let mut encoder = service.open_encoder();
    encoder.write_bytes(SAMPLE).unwrap();

    let mut block = Vec::new();
    loop {
        let chunk = encoder.read_vec(7).unwrap();
        if chunk.is_empty() {
            break;
        }
        block.extend_from_slice(&chunk);
    }
    assert_eq!(block.len(), 61);
    assert_eq!(encoder.position(), 61);

    let mut fresh = service.open_encoder();
    assert_eq!(fresh.read_to_end().unwrap(), block);
}

// ============================================================================
// Error Correction
// ============================================================================

#[test]
fn test_corrects_errors_in_data_and_parity() {
    let service = configured(ParityLayout::Packed);
    let mut encoder = service.open_encoder();
    let mut decoder = service.open_decoder();

    encoder.write_bytes(SAMPLE).unwrap();
    let mut block = encoder.read_to_end().unwrap();
    flip(&mut block, 0, 0x55);
    flip(&mut block, 10, 0xFF);
    flip(&mut block, 28, 0x01);
    flip(&mut block, 40, 0x80);
    flip(&mut block, 60, 0x3C);

    decoder.write_bytes(&block).unwrap();
    assert_eq!(decoder.last_corrections(), Some(5));
    assert_eq!(decoder.read_to_end().unwrap(), SAMPLE);
}

#[test]
fn test_corrects_full_capacity_for_many_seeds() {
    let service = configured(ParityLayout::Packed);
    let mut encoder = service.open_encoder();
    let mut decoder = service.open_decoder();

    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        encoder.write_bytes(SAMPLE).unwrap();
        let mut block = encoder.read_to_end().unwrap();

        for symbol in rand::seq::index::sample(&mut rng, block.len(), 16).into_iter() {
            flip(&mut block, symbol, rng.random_range(1..=u8::MAX));
        }

        decoder.write_bytes(&block).unwrap();
        assert_eq!(decoder.last_corrections(), Some(16), "seed {}", seed);
        assert_eq!(decoder.read_to_end().unwrap(), SAMPLE, "seed {}", seed);
    }
}

#[test]
fn test_wide_layout_corrects_parity_errors() {
    let service = configured(ParityLayout::Wide);
    let mut encoder = service.open_encoder();
    let mut decoder = service.open_decoder();

    encoder.write_bytes(SAMPLE).unwrap();
    let mut block = encoder.read_to_end().unwrap();
    block[3] ^= 0x20;
    for symbol in [0usize, 7, 31] {
        let start = 29 + 2 * symbol;
        let value = u16::from_ne_bytes([block[start], block[start + 1]]) ^ 0x5A;
        block[start..start + 2].copy_from_slice(&value.to_ne_bytes());
    }

    decoder.write_bytes(&block).unwrap();
    assert_eq!(decoder.last_corrections(), Some(4));
    assert_eq!(decoder.read_to_end().unwrap(), SAMPLE);
}

#[test]
fn test_too_many_errors_reported_uncorrectable() {
    let service = configured(ParityLayout::Packed);
    let mut encoder = service.open_encoder();
    let mut decoder = service.open_decoder();

    let mut rejected = 0;
    for seed in 0..10u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        encoder.write_bytes(SAMPLE).unwrap();
        let mut block = encoder.read_to_end().unwrap();

        for symbol in rand::seq::index::sample(&mut rng, block.len(), 40).into_iter() {
            flip(&mut block, symbol, rng.random_range(1..=u8::MAX));
        }

        match decoder.write_bytes(&block) {
            Err(err) => {
                assert_eq!(
                    err,
                    ServiceError::UncorrectableData(CodecError::Uncorrectable)
                );
                assert_eq!(err.errno(), -libc::EIO);
                assert_eq!(service.buffer_state(), Some(BufferState::Rejected));
                assert!(decoder.read_to_end().unwrap().is_empty());
                assert_eq!(decoder.last_corrections(), None);
                rejected += 1;
            }
            // A miscorrection lands on some other codeword
            Ok(_) => assert_ne!(decoder.read_to_end().unwrap(), SAMPLE),
        }
    }
    assert!(rejected > 0);
}

#[test]
fn test_new_encode_recovers_from_rejected_block() {
    let service = RsService::default();
    service
        .set_parameters(RsParameters::new(8, 0x11D, 0, 1, 2))
        .unwrap();
    let mut encoder = service.open_encoder();
    let mut decoder = service.open_decoder();

    encoder.write_bytes(SAMPLE).unwrap();
    let mut block = encoder.read_to_end().unwrap();
    assert_eq!(block.len(), 31);

    // Two equal errors are beyond what two parity symbols can fix
    flip(&mut block, 4, 0x66);
    flip(&mut block, 20, 0x66);
    assert_eq!(
        decoder.write_bytes(&block),
        Err(ServiceError::UncorrectableData(CodecError::Uncorrectable))
    );
    assert_eq!(service.buffer_state(), Some(BufferState::Rejected));
    assert!(encoder.read_to_end().unwrap().is_empty());
    assert!(decoder.read_to_end().unwrap().is_empty());

    encoder.write_bytes(SAMPLE).unwrap();
    assert_eq!(service.buffer_state(), Some(BufferState::Encoded));
    decoder.write_bytes(&encoder.read_to_end().unwrap()).unwrap();
    assert_eq!(decoder.read_to_end().unwrap(), SAMPLE);
}

#[test]
fn test_wide_layout_counts_high_byte_damage() {
    let service = configured(ParityLayout::Wide);
    let mut encoder = service.open_encoder();
    let mut decoder = service.open_decoder();

    encoder.write_bytes(SAMPLE).unwrap();
    let clean = encoder.read_to_end().unwrap();
    let mut block = clean.clone();
    let start = 29 + 2 * 5;
    let value = u16::from_ne_bytes([block[start], block[start + 1]]) | 0x0300;
    block[start..start + 2].copy_from_slice(&value.to_ne_bytes());

    decoder.write_bytes(&block).unwrap();
    assert_eq!(decoder.last_corrections(), Some(1));
    assert_eq!(decoder.read_to_end().unwrap(), SAMPLE);
    assert_eq!(service.open_encoder().read_to_end().unwrap(), clean);
}

// ============================================================================
// Alternate Parameter Sets
// ============================================================================

#[test]
fn test_ccsds_parameters_round_trip() {
    let service = RsService::default();
    service
        .set_parameters(RsParameters::new(8, 0x187, 112, 11, 32))
        .unwrap();

    let data: Vec<u8> = (0..223u32).map(|i| (i * 7 + 3) as u8).collect();
    let mut encoder = service.open_encoder();
    let mut decoder = service.open_decoder();

    encoder.write_bytes(&data).unwrap();
    let mut block = encoder.read_to_end().unwrap();
    assert_eq!(block.len(), 255);

    for symbol in (0..255).step_by(16) {
        flip(&mut block, symbol, 0xA5);
    }

    decoder.write_bytes(&block).unwrap();
    assert_eq!(decoder.last_corrections(), Some(16));
    assert_eq!(decoder.read_to_end().unwrap(), data);
}

#[test]
fn test_reconfigure_then_reencode() {
    let service = configured(ParityLayout::Packed);
    let mut encoder = service.open_encoder();
    let mut decoder = service.open_decoder();

    encoder.write_bytes(SAMPLE).unwrap();
    assert_eq!(encoder.read_to_end().unwrap().len(), 61);

    service
        .set_parameters(RsParameters::new(8, 0x11D, 1, 1, 8))
        .unwrap();
    encoder.write_bytes(SAMPLE).unwrap();
    let mut block = encoder.read_to_end().unwrap();
    assert_eq!(block.len(), 37);

    flip(&mut block, 2, 0x11);
    flip(&mut block, 33, 0x22);
    decoder.write_bytes(&block).unwrap();
    assert_eq!(decoder.last_corrections(), Some(2));
    assert_eq!(decoder.read_to_end().unwrap(), SAMPLE);
}
