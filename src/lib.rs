//! blogen: a static blog generator.
//!
//! Pages are written in a small markup language ([`markup`]), rendered to
//! HTML with embedded commands resolved by a [`command::CommandProcessor`],
//! and placed into line-oriented [`template`]s. The [`build`] module wires
//! these to the filesystem using a [`config::BlogConfig`].

pub mod build;
pub mod command;
pub mod config;
pub mod markup;
pub mod template;
pub mod util;
