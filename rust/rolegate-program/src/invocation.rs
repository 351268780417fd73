use ed25519_dalek::{Signature, SigningKey, VerifyingKey};
use rolegate_common::Address;
use signature::{Signer, Verifier};

use crate::{Instruction, ProcessError};

/// An [`Instruction`] together with proof of who asked for it.
///
/// Mutating instructions must be signed by the key they act on behalf of: the
/// controlling key of the root authority they touch (or, for
/// [`Instruction::Initialize`], the key the new root will belong to).
#[derive(Debug, Clone)]
pub struct Invocation {
    instruction: Instruction,
    signer: Option<(Address, Signature)>,
}

impl Invocation {
    /// Signs `instruction` with `key` for the program at `program_id`.
    pub fn signed(program_id: &Address, instruction: Instruction, key: &SigningKey) -> Self {
        let signature = key.sign(&instruction.signing_bytes(program_id));
        Self {
            instruction,
            signer: Some((Address::from(key), signature)),
        }
    }

    /// Assembles an invocation from a signature produced elsewhere.
    pub fn from_parts(instruction: Instruction, signer: Address, signature: Signature) -> Self {
        Self {
            instruction,
            signer: Some((signer, signature)),
        }
    }

    /// An invocation without a signer. Only read-only instructions accept it.
    pub fn unsigned(instruction: Instruction) -> Self {
        Self {
            instruction,
            signer: None,
        }
    }

    /// The instruction being invoked.
    pub fn instruction(&self) -> &Instruction {
        &self.instruction
    }

    /// The claimed signer, verified or not.
    pub fn signer(&self) -> Option<&Address> {
        self.signer.as_ref().map(|(signer, _)| signer)
    }

    /// Checks the signature and returns the signer, if there is one.
    pub fn verify(&self, program_id: &Address) -> Result<Option<Address>, ProcessError> {
        let Some((signer, signature)) = &self.signer else {
            return Ok(None);
        };

        let key =
            VerifyingKey::from_bytes(signer.bytes()).map_err(|_| ProcessError::InvalidSignature)?;
        key.verify(&self.instruction.signing_bytes(program_id), signature)
            .map_err(|_| ProcessError::InvalidSignature)?;

        Ok(Some(*signer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    #[test]
    fn it_verifies_its_own_signature() -> anyhow::Result<()> {
        let program = Address::from([1u8; 32]);
        let signer = key(7);
        let invocation = Invocation::signed(&program, Instruction::Initialize, &signer);

        assert_eq!(invocation.verify(&program)?, Some(Address::from(&signer)));
        Ok(())
    }

    #[test]
    fn it_rejects_a_signature_for_another_instruction() {
        let program = Address::from([1u8; 32]);
        let signer = key(7);
        let root = Address::from([2u8; 32]);

        let genuine = Invocation::signed(
            &program,
            Instruction::CreateRole {
                root,
                name: "viewer".into(),
            },
            &signer,
        );
        let Some((address, signature)) = genuine.signer else {
            panic!("signed invocation has a signer");
        };
        let forged = Invocation::from_parts(
            Instruction::CreateRole {
                root,
                name: "admin".into(),
            },
            address,
            signature,
        );

        assert!(matches!(
            forged.verify(&program),
            Err(ProcessError::InvalidSignature)
        ));
    }

    #[test]
    fn it_rejects_a_signature_from_another_program() {
        let signer = key(7);
        let invocation =
            Invocation::signed(&Address::from([1u8; 32]), Instruction::Initialize, &signer);

        assert!(matches!(
            invocation.verify(&Address::from([2u8; 32])),
            Err(ProcessError::InvalidSignature)
        ));
    }

    #[test]
    fn it_passes_through_unsigned_invocations() -> anyhow::Result<()> {
        let invocation = Invocation::unsigned(Instruction::Initialize);
        assert_eq!(invocation.verify(&Address::default())?, None);
        Ok(())
    }
}
