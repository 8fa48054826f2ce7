use clap::ValueEnum;
use tfhe::boolean::{
    parameters::{
        BooleanParameters, DEFAULT_PARAMETERS, PARAMETERS_ERROR_PROB_2_POW_MINUS_165,
        TFHE_LIB_PARAMETERS,
    },
    prelude::{BinaryBooleanGates, Ciphertext, ClientKey, ServerKey},
};

use super::BooleanBackend;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FheParams {
    #[default]
    Default,
    /// Parameters of the TFHE C++ library.
    TfheLib,
    /// Failure probability of 2^-165 per bootstrap, slower.
    LowError,
}

impl FheParams {
    pub fn parameters(self) -> BooleanParameters {
        match self {
            FheParams::Default => DEFAULT_PARAMETERS,
            FheParams::TfheLib => TFHE_LIB_PARAMETERS,
            FheParams::LowError => PARAMETERS_ERROR_PROB_2_POW_MINUS_165,
        }
    }
}

/// Bits are TFHE boolean ciphertexts.
///
/// Gates only touch the server (evaluation) key; the client key is kept for
/// `encode`/`decode`. Each instance owns its own key pair.
pub struct FheBackend {
    client_key: ClientKey,
    server_key: ServerKey,
    // Real encryption of false: a trivial ciphertext would let gates skip bootstrapping.
    zero: Ciphertext,
}

impl FheBackend {
    /// Generates a fresh key pair. Takes seconds.
    pub fn new(params: FheParams) -> FheBackend {
        let client_key = ClientKey::new(&params.parameters());
        let server_key = ServerKey::new(&client_key);
        FheBackend::from_keys(client_key, server_key)
    }

    pub fn from_keys(client_key: ClientKey, server_key: ServerKey) -> FheBackend {
        let zero = client_key.encrypt(false);
        FheBackend {
            client_key,
            server_key,
            zero,
        }
    }
}

impl BooleanBackend for FheBackend {
    type Bit = Ciphertext;

    fn name(&self) -> &'static str {
        "homomorphic"
    }

    fn zero(&self) -> Ciphertext {
        self.zero.clone()
    }

    fn not(&self, a: &Ciphertext) -> Ciphertext {
        self.server_key.not(a)
    }

    fn and(&self, a: &Ciphertext, b: &Ciphertext) -> Ciphertext {
        self.server_key.and(a, b)
    }

    fn copy(&self, a: &Ciphertext) -> Ciphertext {
        a.clone()
    }

    fn encode(&self, value: bool) -> Ciphertext {
        self.client_key.encrypt(value)
    }

    fn decode(&self, a: &Ciphertext) -> bool {
        self.client_key.decrypt(a)
    }
}

#[cfg(test)]
mod tests {
    use itertools::iproduct;

    use super::*;

    #[test]
    fn encrypted_gates() {
        let backend = FheBackend::new(FheParams::Default);

        let zero = backend.zero();
        assert!(!backend.decode(&zero));
        assert!(backend.decode(&backend.one()));

        for (a, b) in iproduct!([false, true], [false, true]) {
            let (ca, cb) = (backend.encode(a), backend.encode(b));
            let res = backend.and(&ca, &cb);
            assert_eq!(backend.decode(&res), a & b);
            assert_eq!(backend.decode(&backend.not(&res)), !(a & b));
            assert_eq!(backend.decode(&backend.copy(&res)), a & b);
        }
    }

    #[test]
    fn decode_is_pure() {
        let backend = FheBackend::new(FheParams::Default);
        let ct = backend.not(&backend.zero());

        assert!(backend.decode(&ct));
        assert!(backend.decode(&ct));
        let res = backend.and(&ct, &ct);
        assert!(backend.decode(&res));
    }
}
