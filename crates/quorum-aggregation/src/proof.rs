//! Proof backends
//!
//! Every program in this crate produces a proof object that carries its
//! public output and can be checked on its own. The programs are written
//! against [`Provable`] so the ordering, threshold and ledger rules are the
//! same whichever backend carries them.
//!
//! Two backends ship:
//! - [`SealedProof`]: SHA-256 seal binding the program, the field encoding
//!   of the output and the commitments of the premise proofs. It detects
//!   corruption and tampering of a transported proof. It is transparent:
//!   anyone can produce a seal, so it carries no soundness beyond the honesty
//!   of the prover and no zero-knowledge property.
//! - [`MockProof`]: output plus a "would verify" flag, for tests.

use serde::{Deserialize, Serialize};
use winter_math::ToElements;

use quorum_primitives::{felts_to_bytes, Felt, Hash256};

const SEAL_DOMAIN: &[u8] = b"QUORUM_PROOF_SEAL_V1";
const MOCK_COMMITMENT_DOMAIN: &[u8] = b"QUORUM_MOCK_PROOF_V1";

/// The program a proof attests to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Program {
    SignatureAggregationBase,
    SignatureAggregationStep,
    SettlementBase,
    SettlementStep,
}

impl Program {
    pub fn tag(&self) -> &'static str {
        match self {
            Program::SignatureAggregationBase => "signature_aggregation_base",
            Program::SignatureAggregationStep => "signature_aggregation_step",
            Program::SettlementBase => "settlement_base",
            Program::SettlementStep => "settlement_step",
        }
    }

    pub fn is_signature_aggregation(&self) -> bool {
        matches!(
            self,
            Program::SignatureAggregationBase | Program::SignatureAggregationStep
        )
    }

    pub fn is_settlement(&self) -> bool {
        matches!(self, Program::SettlementBase | Program::SettlementStep)
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// A proof of some program's execution with public output `O`
pub trait Provable<O>: Sized {
    /// Public output the proof attests to
    fn public_output(&self) -> &O;

    /// Program that produced this proof
    fn program(&self) -> Program;

    /// Whether the proof checks out
    fn verify(&self) -> bool;

    /// Binding commitment to this proof, used as a premise by later proofs
    fn commitment(&self) -> Hash256;

    /// Produce a proof that `program`, given the proofs committed to by
    /// `premises`, yields `output`
    fn prove(program: Program, output: O, premises: &[Hash256]) -> Self;
}

/// Transparent SHA-256 sealed proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedProof<O> {
    program: Program,
    output: O,
    premises: Vec<Hash256>,
    seal: Hash256,
}

impl<O: ToElements<Felt>> SealedProof<O> {
    fn compute_seal(program: Program, output: &O, premises: &[Hash256]) -> Hash256 {
        let output_bytes = felts_to_bytes(&output.to_elements());
        let mut parts: Vec<&[u8]> = Vec::with_capacity(premises.len() + 2);
        parts.push(program.tag().as_bytes());
        parts.push(&output_bytes);
        parts.extend(premises.iter().map(|p| p.as_bytes().as_slice()));
        Hash256::sha256_parts(SEAL_DOMAIN, &parts)
    }

    /// Commitments of the proofs this one was built on
    pub fn premises(&self) -> &[Hash256] {
        &self.premises
    }

    pub fn seal(&self) -> Hash256 {
        self.seal
    }
}

impl<O: ToElements<Felt>> Provable<O> for SealedProof<O> {
    fn public_output(&self) -> &O {
        &self.output
    }

    fn program(&self) -> Program {
        self.program
    }

    fn verify(&self) -> bool {
        Self::compute_seal(self.program, &self.output, &self.premises) == self.seal
    }

    fn commitment(&self) -> Hash256 {
        self.seal
    }

    fn prove(program: Program, output: O, premises: &[Hash256]) -> Self {
        let seal = Self::compute_seal(program, &output, premises);
        Self {
            program,
            output,
            premises: premises.to_vec(),
            seal,
        }
    }
}

/// Test backend: verifies iff constructed as valid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockProof<O> {
    pub program: Program,
    pub output: O,
    pub valid: bool,
}

impl<O> MockProof<O> {
    /// A proof of `output` that will fail verification
    pub fn invalid(program: Program, output: O) -> Self {
        Self {
            program,
            output,
            valid: false,
        }
    }
}

impl<O: ToElements<Felt>> Provable<O> for MockProof<O> {
    fn public_output(&self) -> &O {
        &self.output
    }

    fn program(&self) -> Program {
        self.program
    }

    fn verify(&self) -> bool {
        self.valid
    }

    fn commitment(&self) -> Hash256 {
        let output_bytes = felts_to_bytes(&self.output.to_elements());
        Hash256::sha256_parts(
            MOCK_COMMITMENT_DOMAIN,
            &[self.program.tag().as_bytes(), output_bytes.as_slice()],
        )
    }

    fn prove(program: Program, output: O, _premises: &[Hash256]) -> Self {
        Self {
            program,
            output,
            valid: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_primitives::felt_from_u64;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Counter(u64);

    impl ToElements<Felt> for Counter {
        fn to_elements(&self) -> Vec<Felt> {
            vec![felt_from_u64(self.0)]
        }
    }

    #[test]
    fn test_sealed_proof_verifies() {
        let proof = SealedProof::prove(Program::SettlementBase, Counter(7), &[]);
        assert!(proof.verify());
        assert_eq!(proof.public_output(), &Counter(7));
        assert_eq!(proof.program(), Program::SettlementBase);
    }

    #[test]
    fn test_tampered_output_detected() {
        let mut proof = SealedProof::prove(Program::SettlementBase, Counter(7), &[]);
        proof.output = Counter(8);
        assert!(!proof.verify());
    }

    #[test]
    fn test_seal_binds_program_and_premises() {
        let premise = SealedProof::prove(Program::SettlementBase, Counter(1), &[]);
        let a = SealedProof::prove(Program::SettlementStep, Counter(2), &[premise.commitment()]);
        let b = SealedProof::prove(Program::SettlementStep, Counter(2), &[]);
        let c = SealedProof::prove(Program::SettlementBase, Counter(2), &[premise.commitment()]);
        assert_ne!(a.commitment(), b.commitment());
        assert_ne!(a.commitment(), c.commitment());

        let mut relabelled = a.clone();
        relabelled.program = Program::SettlementBase;
        assert!(!relabelled.verify());
    }

    #[test]
    fn test_mock_proof() {
        let good = MockProof::prove(Program::SignatureAggregationBase, Counter(3), &[]);
        let bad = MockProof::invalid(Program::SignatureAggregationBase, Counter(3));
        assert!(good.verify());
        assert!(!bad.verify());
        assert_eq!(good.commitment(), bad.commitment());
    }

    #[test]
    fn test_program_families() {
        assert!(Program::SignatureAggregationStep.is_signature_aggregation());
        assert!(!Program::SignatureAggregationStep.is_settlement());
        assert!(Program::SettlementStep.is_settlement());
        assert_eq!(
            serde_json::to_string(&Program::SettlementStep).unwrap(),
            "\"settlement_step\""
        );
    }
}
