//! Command implementations for the `everkeep` operator tool.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use everkeep_crypto::{
    DEFAULT_MASTER_SECRET_ENV, FieldCipher, KeyDeriver, MasterSecret, SealConfig, ValueKind, classify,
};
use everkeep_token::{ShareGrant, ShareTokens};
use everkeep_types::{ContextId, OwnerId, ResourceId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "everkeep")]
#[command(about = "Seal fields and manage share tokens for Everkeep")]
pub struct Args {
    /// Base64 master secret (overrides --secret-env)
    #[arg(long, global = true)]
    pub master_secret: Option<String>,

    /// Environment variable holding the base64 master secret
    #[arg(long, default_value = DEFAULT_MASTER_SECRET_ENV, global = true)]
    pub secret_env: String,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a fresh base64 master secret
    GenSecret,

    /// Seal a plaintext value for an owner and context
    Seal {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        context: String,
        plaintext: String,
    },

    /// Open a stored value, falling back to the placeholder context
    Open {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        context: String,
        value: String,
    },

    /// Report whether a stored value is a sealed envelope
    Inspect { value: String },

    /// Issue a share token for a resource
    IssueToken {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        resource: String,
        /// Token lifetime in seconds
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Verify a share token
    VerifyToken { token: String },
}

/// Text to print and whether the command succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub success: bool,
}

impl Outcome {
    fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: true,
        }
    }

    fn failed(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: false,
        }
    }
}

/// Verified grant as printed by `verify-token`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GrantView {
    pub owner: String,
    pub resource: String,
    pub token_id: String,
    pub issued_at: String,
    pub expires_at: String,
}

impl From<&ShareGrant> for GrantView {
    fn from(grant: &ShareGrant) -> Self {
        Self {
            owner: grant.owner().to_string(),
            resource: grant.resource().to_string(),
            token_id: grant.token_id().to_string(),
            issued_at: rfc3339(grant.issued_at_secs()),
            expires_at: rfc3339(grant.expires_at_secs()),
        }
    }
}

fn rfc3339(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}

impl Args {
    /// Sealing configuration selected by the command line.
    pub fn config(&self) -> SealConfig {
        SealConfig {
            master_secret_env: self.secret_env.clone(),
            ..SealConfig::default()
        }
    }
}

fn key_deriver(args: &Args, config: &SealConfig) -> Result<KeyDeriver> {
    match args.master_secret.as_deref() {
        Some(encoded) => {
            let secret = MasterSecret::from_base64(encoded).context("loading master secret")?;
            Ok(KeyDeriver::new(secret))
        }
        None => config.key_deriver().with_context(|| {
            format!(
                "master secret required: set {} or pass --master-secret",
                config.master_secret_env
            )
        }),
    }
}

/// Runs the parsed command.
pub fn execute(args: &Args) -> Result<Outcome> {
    let config = args.config();

    match &args.command {
        Command::GenSecret => Ok(Outcome::ok(MasterSecret::generate().to_base64())),

        Command::Seal {
            owner,
            context,
            plaintext,
        } => {
            let cipher = FieldCipher::new(key_deriver(args, &config)?);
            let owner = OwnerId::new(owner.as_str()).context("invalid --owner")?;
            let context = ContextId::new(context.as_str()).context("invalid --context")?;
            let sealed = cipher
                .encrypt_text(plaintext, &owner, &context)
                .context("sealing value")?;
            Ok(Outcome::ok(sealed))
        }

        Command::Open {
            owner,
            context,
            value,
        } => {
            let cipher = FieldCipher::new(key_deriver(args, &config)?);
            let owner = OwnerId::new(owner.as_str()).context("invalid --owner")?;
            let context = ContextId::new(context.as_str()).context("invalid --context")?;
            let resolved = cipher.resolve(value, &owner, &context);
            debug!(needs_reseal = resolved.needs_reseal(), "value resolved");
            if resolved.is_unreadable() {
                return Ok(Outcome::failed("unreadable: no context opens this value"));
            }
            Ok(Outcome::ok(resolved.into_string()))
        }

        Command::Inspect { value } => {
            let kind = match classify(value) {
                ValueKind::Empty => "empty".to_string(),
                ValueKind::Envelope => "envelope".to_string(),
                ValueKind::UnsupportedVersion(v) => format!("envelope (unsupported version {v})"),
                ValueKind::Plaintext => "plaintext".to_string(),
            };
            Ok(Outcome::ok(kind))
        }

        Command::IssueToken {
            owner,
            resource,
            ttl,
        } => {
            let tokens = ShareTokens::new(key_deriver(args, &config)?);
            let owner = OwnerId::new(owner.as_str()).context("invalid --owner")?;
            let resource = ResourceId::new(resource.as_str()).context("invalid --resource")?;
            let ttl = ttl.map_or_else(|| config.share_token_ttl(), Duration::from_secs);
            let token = tokens
                .issue(&owner, &resource, ttl)
                .context("issuing share token")?;
            Ok(Outcome::ok(token))
        }

        Command::VerifyToken { token } => {
            let tokens = ShareTokens::new(key_deriver(args, &config)?);
            match tokens.verify(token) {
                Ok(grant) => Ok(Outcome::ok(serde_json::to_string_pretty(&GrantView::from(
                    &grant,
                ))?)),
                Err(e) => Ok(Outcome::failed(e.to_string())),
            }
        }
    }
}
