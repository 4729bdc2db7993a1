//! Reproduces the first NIST known-answer transcript for ML-KEM-768 and compares its SHA-256 hash
//! with the value published in PQClean's META.yml.

use aes::cipher::{BlockEncrypt, KeyInit};
use sha2::{Digest, Sha256};

use mlkem_core::{decapsulate, encapsulate_derand, key_gen_derand};

/// The AES-256-CTR DRBG from NIST's `rng.c`, used only to reproduce KAT inputs.
struct NistDrbg {
    key: [u8; 32],
    v: [u8; 16],
}

impl NistDrbg {
    fn new(entropy: &[u8; 48]) -> Self {
        let mut drbg = NistDrbg { key: [0; 32], v: [0; 16] };
        drbg.update(Some(entropy));
        drbg
    }

    fn next_block(&mut self) -> aes::Block {
        for b in self.v.iter_mut().rev() {
            *b = b.wrapping_add(1);
            if *b != 0 {
                break;
            }
        }
        let cipher = aes::Aes256::new(self.key.as_slice().into());
        let mut block = aes::Block::clone_from_slice(&self.v);
        cipher.encrypt_block(&mut block);
        block
    }

    fn update(&mut self, provided_data: Option<&[u8; 48]>) {
        let mut temp = [0u8; 48];
        for chunk in temp.chunks_exact_mut(16) {
            chunk.copy_from_slice(&self.next_block());
        }
        if let Some(data) = provided_data {
            for (t, d) in temp.iter_mut().zip(data) {
                *t ^= d;
            }
        }
        self.key.copy_from_slice(&temp[..32]);
        self.v.copy_from_slice(&temp[32..]);
    }

    fn fill_bytes(&mut self, buf: &mut [u8]) {
        for chunk in buf.chunks_mut(16) {
            let block = self.next_block();
            chunk.copy_from_slice(&block[..chunk.len()]);
        }
        self.update(None);
    }
}

#[test]
fn nist_kat_mlkem768() {
    let entropy: [u8; 48] = core::array::from_fn(|i| i as u8);
    let mut drbg = NistDrbg::new(&entropy);

    let mut seed = [0u8; 48];
    drbg.fill_bytes(&mut seed);
    let mut drbg = NistDrbg::new(&seed);

    let mut coins = [0u8; 64];
    drbg.fill_bytes(&mut coins);
    let (d, z) = coins.split_at(32);
    let kp = key_gen_derand(
        d.try_into().expect("should be 32 bytes"),
        z.try_into().expect("should be 32 bytes"),
    );

    let mut m = [0u8; 32];
    drbg.fill_bytes(&mut m);
    let (ct, ss) = encapsulate_derand(kp.encapsulation_key(), &m);
    assert_eq!(decapsulate(kp.decapsulation_key(), &ct), ss);

    let transcript = format!(
        "count = 0\nseed = {}\npk = {}\nsk = {}\nct = {}\nss = {}\n",
        hex::encode_upper(seed),
        hex::encode_upper(kp.encapsulation_key()),
        hex::encode_upper(kp.decapsulation_key().as_bytes()),
        hex::encode_upper(ct),
        hex::encode_upper(ss.as_bytes()),
    );
    assert_eq!(
        hex::encode(Sha256::digest(transcript.as_bytes())),
        "5352539586b6c3df58be6158a6250aeff402bd73060b0a3de68850ac074c17c3"
    );
}
