//! Control signals.
//!
//! Every handler returns a [`HandlerResult`]. The error side carries the two
//! control signals alongside genuine failures, so `?` inside a handler exits
//! exactly like a non-local jump would:
//!
//! - [`Interrupt::Pass`]: this candidate declines, try the next one in the
//!   current chain.
//! - [`Interrupt::Stop`]: the response is final, abandon every chain.
//! - [`Interrupt::Failed`]: an error, caught once by the application.

use weft_core::{InjectorError, Output};

use crate::error::{FrameworkError, PatternError};

/// A non-local exit from a handler.
#[derive(Debug)]
pub enum Interrupt {
    /// Decline; the dispatcher advances to the next candidate.
    Pass,
    /// Finalize; the application renders the current output and stops.
    Stop,
    /// Fail; the application routes the error to its error page.
    Failed(FrameworkError),
}

impl Interrupt {
    /// Returns `true` for [`Interrupt::Pass`].
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns `true` for [`Interrupt::Stop`].
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }

    /// Fails with an arbitrary error.
    pub fn failed<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Failed(FrameworkError::custom(error))
    }
}

impl From<FrameworkError> for Interrupt {
    fn from(error: FrameworkError) -> Self {
        Self::Failed(error)
    }
}

impl From<InjectorError> for Interrupt {
    fn from(error: InjectorError) -> Self {
        Self::Failed(error.into())
    }
}

impl From<PatternError> for Interrupt {
    fn from(error: PatternError) -> Self {
        Self::Failed(error.into())
    }
}

/// The return type of every handler.
pub type HandlerResult = Result<(), Interrupt>;

/// Declines the current candidate.
pub fn pass() -> HandlerResult {
    Err(Interrupt::Pass)
}

/// Finalizes the response.
pub fn stop() -> HandlerResult {
    Err(Interrupt::Stop)
}

/// Stop-signal helpers on [`Output`].
pub trait OutputExt {
    /// Finalizes the response as it stands.
    fn stop(&self) -> HandlerResult;

    /// Replaces status and body, then finalizes the response.
    fn halt(&mut self, status: u16, body: impl Into<String>) -> HandlerResult;

    /// Appends `chunk`, then finalizes the response.
    fn end(&mut self, chunk: impl AsRef<str>) -> HandlerResult;
}

impl OutputExt for Output {
    fn stop(&self) -> HandlerResult {
        stop()
    }

    fn halt(&mut self, status: u16, body: impl Into<String>) -> HandlerResult {
        self.set_status(status).set_body(body);
        stop()
    }

    fn end(&mut self, chunk: impl AsRef<str>) -> HandlerResult {
        self.write(chunk);
        stop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_missing() -> HandlerResult {
        Err(InjectorError::unknown("db"))?;
        Ok(())
    }

    #[test]
    fn test_question_mark_converts_to_failed() {
        match resolve_missing() {
            Err(Interrupt::Failed(FrameworkError::Injector(InjectorError::UnknownKey { key }))) => {
                assert_eq!(key, "db");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_halt_sets_output() {
        let mut output = Output::new();
        let result = output.halt(403, "forbidden");
        assert!(result.unwrap_err().is_stop());
        assert_eq!(output.status(), 403);
        assert_eq!(output.body(), "forbidden");
    }
}
