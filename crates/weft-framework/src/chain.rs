//! Continuation dispatch.
//!
//! A [`Chain`] runs an ordered list of candidates. Each candidate receives a
//! [`Next`] that runs the rest of the list. When a candidate returns
//! [`Interrupt::Pass`], the chain resumes with the candidate after it.
//!
//! The chain keeps one shared cursor. A pass is absorbed by the innermost
//! running chain loop: if B passes from inside A's `next` call, that same
//! `next` call goes on to C, and A sees the result of C. Wrapping candidates
//! therefore keep wrapping whatever candidate finally accepts:
//!
//! ```text
//! [A, B, C]   A calls next -> B passes -> C runs inside A's next
//!             (A's next returns C's result, A continues after it)
//! ```
//!
//! A pass from the last candidate, or a `next` call from it, returns
//! [`Interrupt::Pass`] to whoever ran the chain.

use std::cell::Cell;
use std::sync::Arc;

use tracing::trace;
use weft_core::{Input, Output};

use crate::error::FrameworkResult;
use crate::handler::{BoxedHandler, Handler};
use crate::signal::{HandlerResult, Interrupt};

/// A handler that may borrow from its surroundings for the length of one
/// dispatch.
pub type Invokable<'a> = Arc<dyn Handler + 'a>;

/// Narrows a shared handler to an [`Invokable`].
pub fn invokable<'a>(handler: BoxedHandler) -> Invokable<'a> {
    handler
}

// =============================================================================
// Next
// =============================================================================

/// Something that can run the remainder of a dispatch.
pub trait Continuation {
    /// Advances past the current candidate and runs the rest.
    fn proceed(&self, input: &mut Input, output: &mut Output) -> HandlerResult;
}

/// The continuation handed to every handler.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    rest: Option<&'a dyn Continuation>,
}

impl<'a> Next<'a> {
    /// Wraps a continuation.
    pub fn new(rest: &'a dyn Continuation) -> Self {
        Self { rest: Some(rest) }
    }

    /// A continuation with nothing after it. Calling it passes.
    pub fn end() -> Self {
        Self { rest: None }
    }

    /// Runs the remainder of the chain.
    pub fn call(self, input: &mut Input, output: &mut Output) -> HandlerResult {
        match self.rest {
            Some(rest) => rest.proceed(input, output),
            None => Err(Interrupt::Pass),
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("terminal", &self.rest.is_none())
            .finish()
    }
}

// =============================================================================
// Chain
// =============================================================================

/// One pass over an ordered candidate list.
///
/// Candidates are turned into handlers lazily by `build`, so an unresolvable
/// entry only fails when the chain actually reaches it.
pub struct Chain<'a, C, B> {
    label: &'static str,
    candidates: &'a [C],
    build: B,
    cursor: Cell<usize>,
}

impl<'a, C, B> Chain<'a, C, B>
where
    B: Fn(&C) -> FrameworkResult<Invokable<'a>>,
{
    /// Creates a chain over `candidates`. `label` names the chain in traces.
    pub fn new(label: &'static str, candidates: &'a [C], build: B) -> Self {
        Self {
            label,
            candidates,
            build,
            cursor: Cell::new(0),
        }
    }

    /// Runs the chain from its first candidate.
    ///
    /// Returns [`Interrupt::Pass`] when the list is empty or every remaining
    /// candidate passed.
    pub fn run(&self, input: &mut Input, output: &mut Output) -> HandlerResult {
        if self.candidates.is_empty() {
            return Err(Interrupt::Pass);
        }
        self.cursor.set(0);
        self.run_from_cursor(input, output)
    }

    fn run_from_cursor(&self, input: &mut Input, output: &mut Output) -> HandlerResult {
        loop {
            let index = self.cursor.get();
            trace!(chain = self.label, index, "Invoking candidate");

            let handler = (self.build)(&self.candidates[index])?;
            match handler.call(input, output, Next::new(self)) {
                Err(Interrupt::Pass) => {
                    let following = self.cursor.get() + 1;
                    if following >= self.candidates.len() {
                        trace!(chain = self.label, "Chain exhausted");
                        return Err(Interrupt::Pass);
                    }
                    trace!(chain = self.label, index = self.cursor.get(), "Candidate passed");
                    self.cursor.set(following);
                }
                other => return other,
            }
        }
    }
}

impl<'a, C, B> Continuation for Chain<'a, C, B>
where
    B: Fn(&C) -> FrameworkResult<Invokable<'a>>,
{
    fn proceed(&self, input: &mut Input, output: &mut Output) -> HandlerResult {
        let following = self.cursor.get() + 1;
        if following >= self.candidates.len() {
            return Err(Interrupt::Pass);
        }
        self.cursor.set(following);
        self.run_from_cursor(input, output)
    }
}

/// Runs `candidates` as one chain.
pub fn dispatch<'a, C, B>(
    label: &'static str,
    candidates: &'a [C],
    build: B,
    input: &mut Input,
    output: &mut Output,
) -> HandlerResult
where
    B: Fn(&C) -> FrameworkResult<Invokable<'a>>,
{
    Chain::new(label, candidates, build).run(input, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrameworkError;
    use crate::handler::handler_fn;
    use crate::signal::pass;

    fn run_all(handlers: &[BoxedHandler], output: &mut Output) -> HandlerResult {
        dispatch(
            "test",
            handlers,
            |h: &BoxedHandler| Ok(invokable(h.clone())),
            &mut Input::default(),
            output,
        )
    }

    fn writer(text: &'static str) -> BoxedHandler {
        handler_fn(move |_, output, _| {
            output.write(text);
            Ok(())
        })
    }

    #[test]
    fn test_empty_chain_passes() {
        let mut output = Output::new();
        assert!(matches!(run_all(&[], &mut output), Err(Interrupt::Pass)));
    }

    #[test]
    fn test_wrapping_middleware() {
        let wrap = handler_fn(|input, output, next| {
            output.write("X");
            next.call(input, output)?;
            output.write("Y");
            Ok(())
        });
        let mut output = Output::new();

        run_all(&[wrap, writer("body")], &mut output).unwrap();
        assert_eq!(output.body(), "XbodyY");
    }

    #[test]
    fn test_pass_advances_to_next_candidate() {
        let mut output = Output::new();
        run_all(&[handler_fn(|_, _, _| pass()), writer("second")], &mut output).unwrap();
        assert_eq!(output.body(), "second");
    }

    #[test]
    fn test_pass_from_last_candidate_propagates() {
        let mut output = Output::new();
        let result = run_all(&[writer("a"), handler_fn(|_, _, _| pass())], &mut output);
        // The first candidate completed without calling next, so the chain
        // ends there.
        assert!(result.is_ok());

        let result = run_all(&[handler_fn(|_, _, _| pass())], &mut output);
        assert!(matches!(result, Err(Interrupt::Pass)));
    }

    #[test]
    fn test_pass_inside_next_runs_following_candidate_within_wrapper() {
        let outer = handler_fn(|input, output, next| {
            output.write("A");
            next.call(input, output)?;
            output.write("Z");
            Ok(())
        });
        let mut output = Output::new();

        let result = run_all(
            &[outer, handler_fn(|_, _, _| pass()), writer("C")],
            &mut output,
        );
        assert!(result.is_ok());
        assert_eq!(output.body(), "ACZ");
    }

    #[test]
    fn test_every_inner_candidate_passing_reaches_wrapper() {
        let outer = handler_fn(|input, output, next| {
            output.write("A");
            match next.call(input, output) {
                Err(Interrupt::Pass) => {
                    output.write("-declined");
                    Ok(())
                }
                other => other,
            }
        });
        let mut output = Output::new();

        let result = run_all(
            &[outer, handler_fn(|_, _, _| pass()), handler_fn(|_, _, _| pass())],
            &mut output,
        );
        assert!(result.is_ok());
        assert_eq!(output.body(), "A-declined");
    }

    #[test]
    fn test_next_from_last_candidate_passes() {
        let last = handler_fn(|input, output, next| {
            output.write("L");
            next.call(input, output)
        });
        let mut output = Output::new();

        assert!(matches!(run_all(&[last], &mut output), Err(Interrupt::Pass)));
        assert_eq!(output.body(), "L");
    }

    #[test]
    fn test_stop_short_circuits() {
        let mut output = Output::new();
        let result = run_all(
            &[
                handler_fn(|_, output, _| {
                    output.write("done");
                    Err(Interrupt::Stop)
                }),
                writer("skipped"),
            ],
            &mut output,
        );
        assert!(matches!(result, Err(Interrupt::Stop)));
        assert_eq!(output.body(), "done");
    }

    fn named_candidate<'a>(name: &str) -> FrameworkResult<Invokable<'a>> {
        match name {
            "ok" => Ok(invokable(handler_fn(|input, output, next| {
                output.write("ok;");
                next.call(input, output)
            }))),
            other => Err(FrameworkError::invalid_handler(other)),
        }
    }

    fn prefixed(prefix: &str) -> Invokable<'_> {
        Arc::new(move |_: &mut Input, output: &mut Output, _: Next<'_>| {
            output.write(prefix);
            Ok(())
        })
    }

    #[test]
    fn test_build_failure_is_lazy() {
        let names = ["ok", "missing"];
        let mut output = Output::new();

        let result = dispatch(
            "test",
            &names,
            |name: &&str| named_candidate(name),
            &mut Input::default(),
            &mut output,
        );
        assert!(matches!(
            result,
            Err(Interrupt::Failed(FrameworkError::InvalidHandler { ref identifier }))
                if identifier == "missing"
        ));
        assert_eq!(output.body(), "ok;");
    }

    #[test]
    fn test_borrowing_candidate() {
        let prefix = String::from(">");
        let names = ["a"];
        let mut output = Output::new();

        dispatch(
            "test",
            &names,
            |_: &&str| Ok(prefixed(&prefix)),
            &mut Input::default(),
            &mut output,
        )
        .unwrap();
        assert_eq!(output.body(), ">");
    }
}
