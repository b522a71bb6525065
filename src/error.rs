/// A native error object as reported by the collaborator library.
///
/// Implementations own the underlying allocation and release it on `Drop`,
/// so converting one into a [`RealsenseError`] frees it exactly once.
pub trait NativeError {
    /// Human-readable error message.
    fn message(&self) -> String;
    /// Name of the native function that failed.
    fn failed_function(&self) -> String;
    /// Formatted argument list of the failed call.
    fn failed_args(&self) -> String;
}

/// Error raised when a call into librealsense fails.
///
/// `Display` yields the native message; the failing function and its
/// arguments are kept alongside for callers that introspect them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RealsenseError {
    message: String,
    function: String,
    args: String,
}

impl RealsenseError {
    pub fn new(
        message: impl Into<String>,
        function: impl Into<String>,
        args: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            function: function.into(),
            args: args.into(),
        }
    }

    /// Consume a native error object, copying out its fields.
    pub fn from_native<E: NativeError>(err: E) -> Self {
        let mapped = Self::new(err.message(), err.failed_function(), err.failed_args());
        drop(err);
        mapped
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn failed_function(&self) -> &str {
        &self.function
    }

    pub fn failed_args(&self) -> &str {
        &self.args
    }
}

/// Run exactly one collaborator call with a fresh error slot.
///
/// The slot starts empty. If the call fills it, the value the call returned
/// is discarded and the mapped error is returned instead.
pub fn check<E, T, F>(call: F) -> crate::Result<T>
where
    E: NativeError,
    F: FnOnce(&mut Option<E>) -> T,
{
    let mut slot: Option<E> = None;
    let value = call(&mut slot);
    match slot {
        Some(err) => Err(RealsenseError::from_native(err)),
        None => Ok(value),
    }
}
