//! Ed25519 message signing and verification.

use adsettle_types::{PrivateKey, PublicKey, Signature};
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};

/// Sign a message with a private key, returning the signature.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    Signature(signing_key.sign(message).to_bytes())
}

/// Verify a signature against a message and public key.
///
/// Returns `true` if the signature is valid, `false` otherwise.
/// Uses strict verification, so weak keys and malleable signatures are rejected.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify_strict(message, &dalek_sig).is_ok()
}

/// The signing capability consumed by the contract engine.
pub trait Signer: Send + Sync {
    fn sign(&self, message: &[u8], key: &PrivateKey) -> Signature;

    fn verify(&self, message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool;
}

/// Ed25519 signer backed by `ed25519-dalek`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Signer;

impl Signer for Ed25519Signer {
    fn sign(&self, message: &[u8], key: &PrivateKey) -> Signature {
        sign_message(message, key)
    }

    fn verify(&self, message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
        verify_signature(message, signature, public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{generate_keypair, keypair_from_seed};

    #[test]
    fn sign_and_verify() {
        let kp = generate_keypair();
        let msg = b"{\"advertiserId\":\"adv\"}";
        let sig = sign_message(msg, &kp.private);
        assert!(verify_signature(msg, &sig, &kp.public));
    }

    #[test]
    fn wrong_message_fails() {
        let kp = generate_keypair();
        let sig = sign_message(b"correct message", &kp.private);
        assert!(!verify_signature(b"wrong message", &sig, &kp.public));
    }

    #[test]
    fn wrong_key_fails() {
        let kp1 = generate_keypair();
        let kp2 = generate_keypair();
        let sig = sign_message(b"test", &kp1.private);
        assert!(!verify_signature(b"test", &sig, &kp2.public));
    }

    #[test]
    fn signature_deterministic() {
        let kp = keypair_from_seed(&[99u8; 32]);
        let sig1 = sign_message(b"log", &kp.private);
        let sig2 = sign_message(b"log", &kp.private);
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn tampered_signature_fails() {
        let kp = keypair_from_seed(&[3u8; 32]);
        let mut sig = sign_message(b"contract", &kp.private);
        sig.0[10] ^= 0x01;
        assert!(!verify_signature(b"contract", &sig, &kp.public));
    }

    #[test]
    fn invalid_public_key() {
        let kp = generate_keypair();
        let sig = sign_message(b"test", &kp.private);
        assert!(!verify_signature(b"test", &sig, &PublicKey([0xFF; 32])));
    }

    #[test]
    fn trait_object_delegates() {
        let signer: &dyn Signer = &Ed25519Signer;
        let kp = keypair_from_seed(&[5u8; 32]);
        let sig = signer.sign(b"m", &kp.private);
        assert!(signer.verify(b"m", &sig, &kp.public));
    }
}
