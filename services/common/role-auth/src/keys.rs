use std::fs;
use std::path::Path;

use jsonwebtoken::DecodingKey;

use crate::error::{BuildError, BuildResult};

const PUBLIC_KEY_LABELS: [&str; 2] = ["-----BEGIN PUBLIC KEY-----", "-----BEGIN RSA PUBLIC KEY-----"];
const PEM_BEGIN: &str = "-----BEGIN ";

/// Loads the RSA public key used to verify bearer tokens.
///
/// Accepts SPKI (`PUBLIC KEY`) and PKCS#1 (`RSA PUBLIC KEY`) PEM blocks.
/// Only the first PEM block is decoded, so it must be the public key. Private
/// keys, certificates and keys of other algorithm families are rejected
/// rather than ignored.
pub fn load_public_key(path: &Path) -> BuildResult<DecodingKey> {
    let pem = fs::read(path).map_err(|source| BuildError::KeyRead {
        path: path.to_path_buf(),
        source,
    })?;
    decode_public_key(path, &pem)
}

fn decode_public_key(path: &Path, pem: &[u8]) -> BuildResult<DecodingKey> {
    let text = String::from_utf8_lossy(pem);
    let first_block = text
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(PEM_BEGIN));
    if !matches!(first_block, Some(label) if PUBLIC_KEY_LABELS.contains(&label)) {
        return Err(BuildError::KeyNotPublic(path.to_path_buf()));
    }

    DecodingKey::from_rsa_pem(pem).map_err(|err| BuildError::KeyDecode {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
    use rsa::pkcs8::EncodePublicKey;
    use rsa::rand_core::OsRng;
    use rsa::RsaPrivateKey;
    use std::io::Write;
    use std::sync::OnceLock;
    use tempfile::NamedTempFile;

    const EC_PUBLIC_KEY: &str = "-----BEGIN PUBLIC KEY-----
MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEqYMjoz3ymdJ4qdCXRsiHmqDiom3g
SIp7/x3hc8gmMEMgx60nbrJDyW2j35xsrao7rZyNiduJK4XtXN4a0e8NnQ==
-----END PUBLIC KEY-----
";

    fn private_key() -> &'static RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, 2048).expect("key generation"))
    }

    fn key_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write key");
        file
    }

    #[test]
    fn loads_pkcs1_public_key() {
        let pem = private_key()
            .to_public_key()
            .to_pkcs1_pem(LineEnding::LF)
            .expect("public pem");
        let file = key_file(&pem);
        load_public_key(file.path()).expect("pkcs1 key loads");
    }

    #[test]
    fn loads_spki_public_key() {
        let pem = private_key()
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .expect("spki pem");
        let file = key_file(&pem);
        load_public_key(file.path()).expect("spki key loads");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_public_key(&dir.path().join("absent.pem")).err().expect("missing key");
        assert!(matches!(err, BuildError::KeyRead { .. }));
    }

    #[test]
    fn private_key_is_rejected() {
        let pem = private_key()
            .to_pkcs1_pem(LineEnding::LF)
            .expect("private pem");
        let file = key_file(pem.as_str());
        let err = load_public_key(file.path()).err().expect("private key");
        assert!(matches!(err, BuildError::KeyNotPublic(_)));
    }

    #[test]
    fn private_key_ahead_of_public_key_is_rejected() {
        let private_pem = private_key()
            .to_pkcs1_pem(LineEnding::LF)
            .expect("private pem");
        let public_pem = private_key()
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .expect("spki pem");
        let file = key_file(&format!("{}{}", private_pem.as_str(), public_pem));
        let err = load_public_key(file.path()).err().expect("private key first");
        assert!(matches!(err, BuildError::KeyNotPublic(_)));
    }

    #[test]
    fn garbage_is_rejected() {
        let file = key_file("not a key");
        let err = load_public_key(file.path()).err().expect("garbage");
        assert!(matches!(err, BuildError::KeyNotPublic(_)));

        let file = key_file("-----BEGIN PUBLIC KEY-----\n!!!!\n-----END PUBLIC KEY-----\n");
        let err = load_public_key(file.path()).err().expect("undecodable");
        assert!(matches!(err, BuildError::KeyDecode { .. }));
    }

    #[test]
    fn non_rsa_key_is_rejected() {
        let file = key_file(EC_PUBLIC_KEY);
        let err = load_public_key(file.path()).err().expect("ec key");
        assert!(matches!(err, BuildError::KeyDecode { .. }));
    }
}
