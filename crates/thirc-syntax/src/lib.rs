//! # thirc-syntax
//!
//! Lexer and recursive-descent parser for the `thirc` source language.
//!
//! This crate is an "external collaborator" relative to the dependency-driven
//! typed lowering pipeline in `thirc-core`: it owns tokenization and grammar,
//! and knows nothing about types, scopes, or dependency ordering. It hands
//! `thirc-core` a `Program` — an arena-allocated AST with every node's
//! source location and syntactic parent already attached — and nothing more.

#[macro_use]
mod arena;
pub mod ast;
mod lexer;
mod parser;
mod token;

pub use ast::{Arena, AstId, AstNode};
pub use lexer::Lexer;
pub use parser::{parse, Parser};
pub use token::{Token, TokenKind};
