//! The boolean backend: the only thing that differs between the plaintext and
//! the homomorphic evaluation of a circuit.

pub mod fhe;
pub mod plain;

pub use fhe::{FheBackend, FheParams};
pub use plain::PlainBackend;

/// Gate-level operations over an opaque bit representation.
///
/// `zero`, `not`, `and` and `copy` are the evaluation path. `encode` and `decode`
/// exist for the harness only: forcing primary inputs and checking results. A
/// backend holding key material needs its secret key for these two and must not
/// be asked to run them while a cycle is being evaluated.
pub trait BooleanBackend {
    type Bit: Clone + Send + Sync + 'static;

    fn name(&self) -> &'static str;

    fn zero(&self) -> Self::Bit;

    fn one(&self) -> Self::Bit {
        self.not(&self.zero())
    }

    fn not(&self, a: &Self::Bit) -> Self::Bit;

    /// Operands arrive in the order captured from the gate's pins.
    fn and(&self, a: &Self::Bit, b: &Self::Bit) -> Self::Bit;

    /// Independent value equal to `a`, used to latch a register.
    fn copy(&self, a: &Self::Bit) -> Self::Bit;

    fn encode(&self, value: bool) -> Self::Bit;

    fn decode(&self, a: &Self::Bit) -> bool;
}
