//! The core pipeline: source text in, textual IR out. Every stage is
//! synchronous and fail-fast — the first error returned aborts the whole
//! compilation, per the driver's exit-status contract.

use std::time::Instant;

use tracing::info;

use thirc_backend::{Backend, TextIrBackend};
use thirc_core::context::CompilationContext;
use thirc_core::{lower_program, ThirNode};
use thirc_error::{Error, Result};
use thirc_syntax::ast::Arena as AstArena;

use crate::options::ThircOptions;

/// Runs the whole pipeline — lex, parse, build the dependency graph, lower
/// to THIR, emit textual IR — over one source file's contents.
///
/// The entry-point check (`@entry` function present) is the driver's
/// responsibility, not the core's: spec.md §7 marks `EntryPointMissing`
/// "(Driver responsibility)", so it is applied here, after `lower_program`
/// returns a successfully built THIR, rather than inside core lowering.
pub fn compile(opts: &ThircOptions, source: &str) -> Result<String> {
    let parse_start = Instant::now();
    let ast_arena = AstArena::default();
    let program = thirc_syntax::parse(&opts.input, source, &ast_arena)?;
    info!("parsed {} top-level declaration(s) in {:.3}s", program.decls.len(), parse_start.elapsed().as_secs_f64());

    let lower_start = Instant::now();
    let ctx = CompilationContext::new();
    let thir = lower_program(program, &ctx)?;
    info!("lowered to THIR in {:.3}s", lower_start.elapsed().as_secs_f64());
    check_entry_point(&thir)?;

    if opts.print_thir {
        eprintln!("{}", thirc_core::pretty_print(&thir, &ctx.types));
    }

    let emit_start = Instant::now();
    let backend = TextIrBackend::new(opts.opt_level);
    let ir = backend.emit(&thir, &ctx.types)?;
    info!("emitted textual IR in {:.3}s", emit_start.elapsed().as_secs_f64());
    Ok(ir)
}

/// `EntryPointMissing` is a driver-level check (spec.md §7), not a core
/// lowering error: an empty or entry-less program still lowers cleanly to
/// a `Program` THIR, and it's the driver that refuses to hand it to the
/// backend without an `@entry` function to start from.
fn check_entry_point(thir: &ThirNode<'_>) -> Result<()> {
    let statements = match thir {
        ThirNode::Program(p) => &p.statements,
        _ => unreachable!("lower_program always returns a Program node"),
    };
    let has_entry = statements
        .iter()
        .any(|s| matches!(s, ThirNode::Function(f) if f.is_entry));
    if has_entry {
        Ok(())
    } else {
        Err(Error::entry_point_missing())
    }
}
