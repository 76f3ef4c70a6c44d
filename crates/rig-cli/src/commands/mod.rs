//! Command dispatch and handler modules.

mod check;
mod resolve;
mod schema;
mod tree;
mod variants;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    tracing::debug!("dispatching {:?}", cli.command);
    match cli.command {
        Command::Resolve {
            descriptor,
            variant,
            schema,
            format,
            output,
        } => resolve::exec(descriptor, variant, schema, format, output),
        Command::Check { descriptor, schema } => check::exec(descriptor, schema),
        Command::Tree {
            descriptor,
            depth,
            inverted,
        } => tree::exec(descriptor, depth, inverted),
        Command::Variants { descriptor, schema } => variants::exec(descriptor, schema),
        Command::Schema { schema } => schema::exec(schema),
    }
}
