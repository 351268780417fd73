#![warn(missing_docs)]

//! Role-based access control kept entirely in deterministically addressed
//! records.
//!
//! A tenant is a [`RootAuthority`] controlled by one Ed25519 key. Under it the
//! key creates [`Role`]s and [`Permission`]s, binds permissions to roles
//! ([`RolePermission`]) and assigns roles to users ([`UserRole`]), optionally
//! until some point in time. Every record lives at an address derived from
//! its parents and name, so "does this exist" is a single lookup and two
//! attempts to create the same thing collide by construction.
//!
//! Anybody can then ask whether a user holds a permission: the answer is yes
//! exactly when the assignment and the binding exist, link up and the
//! assignment has not expired.
//!
//! ```rust
//! # async fn example() -> anyhow::Result<()> {
//! use ed25519_dalek::SigningKey;
//! use rolegate_common::Address;
//! use rolegate_program::{
//!     Engine, Instruction, Invocation, NEVER_EXPIRES, PermissionQuery, permission_address,
//!     role_address, root_address,
//! };
//! use rolegate_storage::MemoryRecordStore;
//!
//! let engine = Engine::new(MemoryRecordStore::default());
//! let program_id = engine.settings().program_id;
//! let authority = SigningKey::from_bytes(&[1u8; 32]);
//! let user = Address::from(&SigningKey::from_bytes(&[2u8; 32]));
//!
//! let (root, _) = root_address(&program_id, &Address::from(&authority))?;
//! let (role, _) = role_address(&program_id, &root, "editor")?;
//! let (permission, _) = permission_address(&program_id, &root, "write")?;
//!
//! for instruction in [
//!     Instruction::Initialize,
//!     Instruction::CreateRole { root, name: "editor".into() },
//!     Instruction::CreatePermission { root, name: "write".into() },
//!     Instruction::BindPermissionToRole { root, role, permission },
//!     Instruction::AssignRoleToUser { root, user, role, expires_at: NEVER_EXPIRES },
//! ] {
//!     engine
//!         .process(&Invocation::signed(&program_id, instruction, &authority))
//!         .await?;
//! }
//!
//! assert!(engine.has_permission(&PermissionQuery { root, user, role, permission }).await?);
//! # Ok(())
//! # }
//! ```

mod error;
pub use error::*;

mod settings;
pub use settings::*;

mod record;
pub use record::*;

mod seeds;
pub use seeds::*;

mod instruction;
pub use instruction::*;

mod invocation;
pub use invocation::*;

mod operation;
pub use operation::*;

mod checker;
pub use checker::*;

pub mod query;
pub use query::RecordFilter;

mod engine;
pub use engine::*;
