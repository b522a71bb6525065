use crate::device::Device;
use crate::driver::{Driver, Geometry};
use crate::error::check;
use crate::sys::RS_API_VERSION;
use crate::Result;
use std::ffi::c_int;

/// Owner of a native librealsense context.
///
/// The context is created on construction and deleted on drop. Devices
/// borrow from it, so none of them can outlive it. The driver itself stays
/// private, so the context has no second owner:
///
/// ```compile_fail
/// fn steal<D: realsense::Driver>(ctx: &realsense::Context<D>) -> &D {
///     ctx.driver()
/// }
/// ```
pub struct Context<D: Driver> {
    driver: D,
    handle: D::ContextHandle,
}

impl<D: Driver> Context<D> {
    /// Create a context for the API version this crate was built against.
    pub fn new(driver: D) -> Result<Self> {
        Self::with_api_version(driver, RS_API_VERSION)
    }

    /// Create a context requesting an explicit API version. Fails if the
    /// library does not support it.
    pub fn with_api_version(driver: D, api_version: c_int) -> Result<Self> {
        let handle = check(|err| driver.create_context(api_version, err))?;
        log::info!("Created librealsense context (API version {})", api_version);
        Ok(Self { driver, handle })
    }

    pub(crate) fn driver(&self) -> &D {
        &self.driver
    }

    /// Projection helpers of the driver, for [`Intrinsics::deproject`] and
    /// friends.
    ///
    /// [`Intrinsics::deproject`]: crate::Intrinsics::deproject
    pub fn geometry(&self) -> &(dyn Geometry + '_)
    where
        D: Geometry,
    {
        &self.driver
    }

    /// Raw native handle. Deleted when `self` is dropped.
    pub fn handle(&self) -> D::ContextHandle {
        self.handle
    }

    /// Number of devices enumerated when the context was created.
    pub fn device_count(&self) -> Result<usize> {
        // SAFETY: `self.handle` is live until `drop`.
        let count = check(|err| unsafe { self.driver.device_count(self.handle, err) })?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Borrow the device at `index`. Fails if `index >= device_count()`.
    pub fn device(&self, index: usize) -> Result<Device<'_, D>> {
        // Out-of-range indices are rejected by the library itself.
        let index = c_int::try_from(index).unwrap_or(c_int::MAX);
        // SAFETY: `self.handle` is live until `drop`.
        let handle = check(|err| unsafe { self.driver.device(self.handle, index, err) })?;
        Ok(Device::new(self, handle))
    }

    /// Every enumerated device, in index order.
    pub fn devices(&self) -> Result<Vec<Device<'_, D>>> {
        (0..self.device_count()?).map(|i| self.device(i)).collect()
    }
}

impl<D: Driver> Drop for Context<D> {
    fn drop(&mut self) {
        // Teardown must not fail; the error is only logged.
        // SAFETY: the handle is owned by `self` and deleted only here.
        if let Err(e) = check(|err| unsafe { self.driver.delete_context(self.handle, err) }) {
            log::warn!(
                "Ignoring error while deleting context: {} ({}: {})",
                e,
                e.failed_function(),
                e.failed_args()
            );
        }
    }
}
