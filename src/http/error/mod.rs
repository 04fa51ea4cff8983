use crate::types;
use error_stack::{Context, Report};
use thiserror::Error as ThisError;
use tracing_error::SpanTrace;

mod impls;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError)]
#[error("Failed to process request")]
pub struct RequestFailed;

/// Error returned by request handlers.
///
/// Only the client facing [`types::Error`] crosses the boundary; the
/// report and span trace stay in the server logs.
pub struct Error {
  error_type: types::Error,
  report: Report<RequestFailed>,
  trace: SpanTrace,
}

impl Error {
  #[must_use]
  pub fn from_context(error_type: types::Error, context: impl Context) -> Self {
    Self::from_report(error_type, Report::new(context))
  }

  #[must_use]
  pub fn from_report(error_type: types::Error, report: Report<impl Context>) -> Self {
    Self {
      error_type,
      report: report.change_context(RequestFailed),
      trace: SpanTrace::capture(),
    }
  }
}

impl Error {
  #[must_use]
  pub fn as_type(&self) -> &types::Error {
    &self.error_type
  }

  #[must_use]
  pub fn report(&self) -> &Report<RequestFailed> {
    &self.report
  }

  #[must_use]
  pub fn attach_printable<A>(mut self, attachment: A) -> Self
  where
    A: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
  {
    self.report = self.report.attach_printable(attachment);
    self
  }

  #[must_use]
  pub fn change_type(mut self, error_type: types::Error) -> Self {
    self.error_type = error_type;
    self
  }

  #[must_use]
  pub fn downcast_ref<F: Context>(&self) -> Option<&F> {
    self.report.downcast_ref::<F>()
  }
}

impl std::fmt::Debug for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Error")
      .field("type", &self.error_type)
      .field("report", &self.report)
      .field("trace", &self.trace)
      .finish()
  }
}

impl std::fmt::Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}: ", &self.error_type)?;
    writeln!(f, "{:?}", self.report)?;
    std::fmt::Display::fmt(&self.trace, f)
  }
}
