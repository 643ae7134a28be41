//! Global git author identity (`user.name` / `user.email`).
use anyhow::Result;

use crate::steps::Context;

/// The global git author identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitIdentity {
    /// `user.name`, if set.
    pub name: Option<String>,
    /// `user.email`, if set.
    pub email: Option<String>,
}

impl GitIdentity {
    /// Read the identity from `git config --global`.
    ///
    /// # Errors
    ///
    /// Returns an error only if `git` cannot be spawned.
    pub fn read(ctx: &Context) -> Result<Self> {
        Ok(Self {
            name: get(ctx, "user.name")?,
            email: get(ctx, "user.email")?,
        })
    }

    /// Both fields are set.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.name.is_some() && self.email.is_some()
    }

    /// Write both fields to `git config --global`.
    ///
    /// # Errors
    ///
    /// Returns an error if either `git config` call fails.
    pub fn write(&self, ctx: &Context) -> Result<()> {
        if let Some(name) = &self.name {
            ctx.run("git", &["config", "--global", "user.name", name])?;
        }
        if let Some(email) = &self.email {
            ctx.run("git", &["config", "--global", "user.email", email])?;
        }
        Ok(())
    }
}

impl std::fmt::Display for GitIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} <{}>",
            self.name.as_deref().unwrap_or("?"),
            self.email.as_deref().unwrap_or("?")
        )
    }
}

fn get(ctx: &Context, key: &str) -> Result<Option<String>> {
    let result = ctx.run_unchecked("git", &["config", "--global", "--get", key])?;
    let value = result.stdout.trim();
    Ok((result.success && !value.is_empty()).then(|| value.to_string()))
}
