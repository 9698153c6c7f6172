// ethcompat/cli/src/commands/mod.rs

pub mod inspect;
