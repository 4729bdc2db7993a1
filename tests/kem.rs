#![cfg(feature = "std")]

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use rand_chacha::ChaChaRng;
use rand_core::{CryptoRng, RngCore, SeedableRng};

use mlkem_core::{
    decapsulate, encapsulate, key_gen, key_gen_derand, Ciphertext, DecapsulationKey,
    EncapsulationKey, Error, ErrorKind, CIPHERTEXT_LEN, DECAPSULATION_KEY_LEN,
    ENCAPSULATION_KEY_LEN, SHARED_SECRET_LEN,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An RNG that returns a fixed byte sequence, cycling when it runs out.
struct SequenceRng {
    bytes: Vec<u8>,
    pos: usize,
}

impl SequenceRng {
    fn new(bytes: &[u8]) -> Self {
        SequenceRng { bytes: bytes.to_vec(), pos: 0 }
    }
}

impl RngCore for SequenceRng {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for b in dest {
            *b = self.bytes[self.pos % self.bytes.len()];
            self.pos += 1;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for SequenceRng {}

/// An RNG whose entropy source has gone away.
struct BrokenRng;

impl RngCore for BrokenRng {
    fn next_u32(&mut self) -> u32 {
        unimplemented!()
    }

    fn next_u64(&mut self) -> u64 {
        unimplemented!()
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {
        unimplemented!()
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
        Err(rand_core::Error::new("entropy source disconnected"))
    }
}

impl CryptoRng for BrokenRng {}

#[test]
fn sizes() {
    let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
    let kp = key_gen(&mut rng).expect("should generate keys");
    let (ct, ss) = encapsulate(kp.encapsulation_key(), &mut rng).expect("should encapsulate");

    assert_eq!(kp.encapsulation_key().as_ref().len(), ENCAPSULATION_KEY_LEN);
    assert_eq!(kp.decapsulation_key().as_bytes().len(), DECAPSULATION_KEY_LEN);
    assert_eq!(ct.as_ref().len(), CIPHERTEXT_LEN);
    assert_eq!(ss.as_bytes().len(), SHARED_SECRET_LEN);
}

#[test]
fn round_trip_many() {
    let mut rng = ChaChaRng::seed_from_u64(0xC0FFEE);
    for _ in 0..50 {
        let kp = key_gen(&mut rng).expect("should generate keys");
        for _ in 0..4 {
            let (ct, ss) =
                encapsulate(kp.encapsulation_key(), &mut rng).expect("should encapsulate");
            assert_eq!(decapsulate(kp.decapsulation_key(), &ct), ss);
        }
    }
}

#[test]
fn os_rng_round_trip() {
    let kp = key_gen(rand_core::OsRng).expect("should generate keys");
    let (ct, ss) =
        encapsulate(kp.encapsulation_key(), rand_core::OsRng).expect("should encapsulate");
    assert_eq!(decapsulate(kp.decapsulation_key(), &ct), ss);
}

#[test]
fn fixed_entropy_is_deterministic() {
    let seq: Vec<u8> = (0..=255).collect();

    let kp1 = key_gen(SequenceRng::new(&seq)).expect("should generate keys");
    let kp2 = key_gen(SequenceRng::new(&seq)).expect("should generate keys");
    assert_eq!(kp1.encapsulation_key(), kp2.encapsulation_key());
    assert_eq!(kp1.decapsulation_key().as_bytes(), kp2.decapsulation_key().as_bytes());

    let (ct1, ss1) = encapsulate(kp1.encapsulation_key(), SequenceRng::new(&[7]))
        .expect("should encapsulate");
    let (ct2, ss2) = encapsulate(kp1.encapsulation_key(), SequenceRng::new(&[7]))
        .expect("should encapsulate");
    assert_eq!(ct1, ct2);
    assert_eq!(ss1, ss2);

    // The RNG feeds d then z, so key_gen and key_gen_derand agree.
    let d: [u8; 32] = core::array::from_fn(|i| i as u8);
    let z: [u8; 32] = core::array::from_fn(|i| 32 + i as u8);
    let kp3 = key_gen_derand(&d, &z);
    assert_eq!(kp1.decapsulation_key().as_bytes(), kp3.decapsulation_key().as_bytes());
}

#[test]
fn all_zero_seeds() {
    let kp = key_gen(SequenceRng::new(&[0])).expect("should generate keys");
    let (ct, ss) =
        encapsulate(kp.encapsulation_key(), SequenceRng::new(&[0])).expect("should encapsulate");
    assert_eq!(decapsulate(kp.decapsulation_key(), &ct), ss);
    assert_eq!(kp.decapsulation_key().as_bytes()[DECAPSULATION_KEY_LEN - 32..], [0u8; 32]);
}

#[test]
fn tampered_ciphertext_is_rejected_implicitly() {
    init_logging();
    let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
    let kp = key_gen(&mut rng).expect("should generate keys");
    let (ct, ss) = encapsulate(kp.encapsulation_key(), &mut rng).expect("should encapsulate");

    for i in [0, 1, 319, 320, 959, 960, CIPHERTEXT_LEN - 1] {
        let mut bytes = *ct.as_bytes();
        bytes[i] ^= 1;
        let bad = Ciphertext::from(bytes);

        let ss_bad = decapsulate(kp.decapsulation_key(), &bad);
        assert_ne!(ss_bad, ss, "flipped bit in byte {i}");
        assert_eq!(ss_bad, decapsulate(kp.decapsulation_key(), &bad));
    }
}

#[test]
fn wrong_lengths() {
    init_logging();
    let buf = vec![0u8; 4096];

    for len in [0, 1, ENCAPSULATION_KEY_LEN - 1, ENCAPSULATION_KEY_LEN + 1] {
        let err = EncapsulationKey::try_from(&buf[..len]).expect_err("should reject");
        assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
    }
    for len in [0, DECAPSULATION_KEY_LEN - 1, DECAPSULATION_KEY_LEN + 1] {
        let err = DecapsulationKey::try_from(&buf[..len]).expect_err("should reject");
        assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
    }
    for len in [0, CIPHERTEXT_LEN - 1, CIPHERTEXT_LEN + 1] {
        let err = Ciphertext::try_from(&buf[..len]).expect_err("should reject");
        assert_eq!(
            err,
            Error::InvalidLength { object: "ciphertext", expected: CIPHERTEXT_LEN, actual: len }
        );
    }
}

#[test]
fn invalid_keys() {
    init_logging();
    let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
    let kp = key_gen(&mut rng).expect("should generate keys");

    let ek = kp.encapsulation_key().as_bytes();
    assert_eq!(EncapsulationKey::try_from(&ek[..]).as_ref(), Ok(kp.encapsulation_key()));

    // Set the first coefficient of t̂ to 0xFFF.
    let mut bad = *ek;
    bad[0] = 0xFF;
    bad[1] |= 0x0F;
    assert_eq!(
        EncapsulationKey::try_from(&bad[..]),
        Err(Error::UnreducedCoefficient { object: "encapsulation key" })
    );

    let dk = kp.decapsulation_key().as_bytes();
    let parsed = DecapsulationKey::try_from(&dk[..]).expect("should parse");
    assert_eq!(parsed.as_bytes(), dk);

    let mut bad = *dk;
    bad[1152] = 0xFF;
    bad[1153] |= 0x0F;
    assert_eq!(
        DecapsulationKey::try_from(&bad[..]).map(|_| ()),
        Err(Error::UnreducedCoefficient { object: "decapsulation key" })
    );

    let mut bad = *dk;
    bad[DECAPSULATION_KEY_LEN - 33] ^= 0x80;
    assert_eq!(DecapsulationKey::try_from(&bad[..]).map(|_| ()), Err(Error::KeyHashMismatch));
}

#[test]
fn entropy_failure() {
    init_logging();
    let err = key_gen(BrokenRng).expect_err("should fail");
    assert_eq!(err, Error::EntropyUnavailable);
    assert_eq!(err.to_string(), "entropy source unavailable");

    let kp = key_gen_derand(&[1; 32], &[2; 32]);
    let err = encapsulate(kp.encapsulation_key(), BrokenRng).expect_err("should fail");
    assert_eq!(err.kind(), ErrorKind::EntropyUnavailable);
}

#[test]
fn concurrent_use() {
    let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
    let kp = Arc::new(key_gen(&mut rng).expect("should generate keys"));

    let handles: Vec<_> = (0..8u64)
        .map(|i| {
            let kp = Arc::clone(&kp);
            thread::spawn(move || {
                let mut rng = ChaChaRng::seed_from_u64(i);
                for _ in 0..8 {
                    let (ct, ss) =
                        encapsulate(kp.encapsulation_key(), &mut rng).expect("should encapsulate");
                    assert_eq!(decapsulate(kp.decapsulation_key(), &ct), ss);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("thread should not panic");
    }
}

#[test]
fn decapsulation_timing_does_not_depend_on_validity() {
    // Wall-clock timing is noisy on shared hosts, so by default only gross differences fail.
    let strict = std::env::var_os("MLKEM_CORE_STRICT_TIMING").is_some();
    let (rounds, repeats, bound) = if strict { (2000, 5, 1.25) } else { (50, 7, 2.0) };

    let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
    let kp = key_gen(&mut rng).expect("should generate keys");
    let (valid, _) = encapsulate(kp.encapsulation_key(), &mut rng).expect("should encapsulate");
    let mut bytes = *valid.as_bytes();
    bytes[0] ^= 1;
    let invalid = Ciphertext::from(bytes);

    let time = |ct: &Ciphertext| {
        let start = Instant::now();
        for _ in 0..rounds {
            std::hint::black_box(decapsulate(kp.decapsulation_key(), std::hint::black_box(ct)));
        }
        start.elapsed().as_secs_f64()
    };

    // Warm up, then interleave and keep the fastest run of each to filter out preemption.
    time(&valid);
    let (mut t_valid, mut t_invalid) = (f64::MAX, f64::MAX);
    for _ in 0..repeats {
        t_valid = t_valid.min(time(&valid));
        t_invalid = t_invalid.min(time(&invalid));
    }
    let ratio = t_valid / t_invalid;
    assert!(
        (1.0 / bound..bound).contains(&ratio),
        "valid/invalid timing ratio {ratio:.3}, bound {bound}"
    );
}
