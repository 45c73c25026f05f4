//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod publish;

pub(crate) use check::CheckArgs;
pub(crate) use publish::PublishArgs;
